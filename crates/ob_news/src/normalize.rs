//! Headline cleanup for scraped archive titles: repair of UTF-8-as-Latin-1
//! mojibake and removal of site-name boilerplate around the real title.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

/// Known mojibake sequences and their intended characters. Some source
/// sequences end in control or punctuation codepoints that render
/// invisibly, those are written as escapes. Duplicate keys are collapsed
/// at map construction, first mapping wins.
const REPLACEMENTS: &[(&str, &str)] = &[
    ("Ã¡", "á"),
    ("Ã ", "à"),
    ("Ã£", "ã"),
    ("Ã¢", "â"),
    ("Ã\u{81}", "Á"),
    ("Ã©", "é"),
    ("Ãª", "ê"),
    ("Ã¨", "è"),
    ("Ã³", "ó"),
    ("Ãµ", "õ"),
    ("Ã´", "ô"),
    ("Ãº", "ú"),
    ("Ã\u{9a}", "Ú"),
    ("Ã¼", "ü"),
    ("Ã§", "ç"),
    ("Ã\u{201c}", "Ó"),
    ("Ã\u{ad}", "í"),
    ("Ã\u{2030}", "É"),
    ("Ã\u{2018}", "Ñ"),
    ("Ã\u{2122}", "Ù"),
    ("Ã\u{201e}", "Ä"),
    ("Ã\u{2013}", "Ö"),
    ("Ã¤", "ä"),
    ("Ã¶", "ö"),
    ("Ã\u{178}", "ß"),
    // Lingering malformed marker, dropped outright.
    ("Â", ""),
];

lazy_static! {
    static ref REPLACEMENT_MAP: HashMap<&'static str, &'static str> = {
        let mut map = HashMap::new();
        for &(from, to) in REPLACEMENTS {
            map.entry(from).or_insert(to);
        }
        map
    };
    static ref REPLACEMENT_RE: Regex = {
        let mut keys: Vec<&str> = REPLACEMENT_MAP.keys().copied().collect();
        // Longest key first so a one-codepoint key can never shadow a
        // longer sequence sharing its prefix.
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        let pattern = keys
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&pattern).expect("replacement alternation is valid")
    };
    static ref LEADING_CLAUSE_RE: Regex =
        Regex::new(r#"^(["A-Za-z0-9_\s/']+)(-|—|\||>|:)\s"#).expect("valid pattern");
    static ref TRAILING_CLAUSE_RE: Regex =
        Regex::new(r"(-|—|\||>|/)\s[\w\s(),.'&/-]+$").expect("valid pattern");
}

/// Replaces known mis-decoded multi-byte sequences with the intended
/// character. Best effort: sequences outside the table pass through
/// unchanged, this is not an encoding detector.
///
/// Replacement runs to a fixed point: dropping a stray marker can join
/// its neighbours into a sequence the table knows (double-encoded
/// input), and every pass strictly shrinks the string, so this
/// terminates.
pub fn repair_encoding(raw: &str) -> String {
    let mut current = raw.to_string();
    loop {
        let next = REPLACEMENT_RE
            .replace_all(&current, |caps: &regex::Captures| {
                REPLACEMENT_MAP.get(&caps[0]).copied().unwrap_or_default()
            })
            .into_owned();
        if next == current {
            return next;
        }
        current = next;
    }
}

/// Strips site-name boilerplate: soft hyphens, leading "Site - " clauses
/// (ASCII word class, so an accented headline is never mistaken for a
/// site prefix) and chained trailing " - Site" clauses.
pub fn clean_title(raw: &str) -> String {
    let mut title = raw.replace('\u{ad}', "");

    while let Some(end) = LEADING_CLAUSE_RE.find(&title).map(|m| m.end()) {
        title.replace_range(..end, "");
    }

    while let Some(start) = TRAILING_CLAUSE_RE.find(&title).map(|m| m.start()) {
        title.truncate(start);
    }

    title.trim().to_string()
}

/// Full headline cleanup: encoding repair, then boilerplate stripping.
/// Total and idempotent, a cleaned title passes through unchanged.
pub fn normalize_title(raw: &str) -> String {
    clean_title(&repair_encoding(raw))
}
