//! The article processing pipeline: dedup, validation, year filtering,
//! source grouping, per-group ranking, round-robin interleaving and
//! final formatting. Every stage is pure; the whole pipeline is a
//! synchronous function of its inputs once raw articles are in hand.

use std::collections::{HashSet, VecDeque};

use chrono::NaiveDate;
use indexmap::IndexMap;
use lazy_static::lazy_static;
use ob_core::{NewsArticle, RawArticle};
use regex::Regex;

use crate::rank::rank_by_relevance;

lazy_static! {
    static ref YEAR_RE: Regex = Regex::new(r"\b(19|20)\d{2}\b").expect("valid pattern");
}

/// Drops later occurrences of the same headline, compared lowercased and
/// trimmed. Duplicates routinely arrive from different query strings
/// hitting the same page.
pub fn dedupe(articles: Vec<RawArticle>) -> Vec<RawArticle> {
    let mut seen = HashSet::new();
    articles
        .into_iter()
        .filter(|article| {
            let key = article.headline.trim().to_lowercase();
            !key.is_empty() && seen.insert(key)
        })
        .collect()
}

/// Drops articles whose headline is empty or whitespace only.
pub fn filter_valid(articles: Vec<RawArticle>) -> Vec<RawArticle> {
    articles
        .into_iter()
        .filter(|article| !article.headline.trim().is_empty())
        .collect()
}

/// Keeps an article only when every 4-digit year its headline mentions
/// equals `target_year`. A headline with no year mention always survives.
/// A headline mentioning the target year next to any other year is
/// dropped, which suppresses retrospective and comparative pieces that
/// would confuse a single-year view.
pub fn filter_by_year_mention(articles: Vec<RawArticle>, target_year: &str) -> Vec<RawArticle> {
    articles
        .into_iter()
        .filter(|article| {
            let headline = article.headline.to_lowercase();
            YEAR_RE
                .find_iter(&headline)
                .all(|m| m.as_str() == target_year)
        })
        .collect()
}

/// Groups by origin domain, leading "www." stripped. Insertion order of
/// the domains is preserved so later interleaving is deterministic.
pub fn group_by_source(articles: Vec<RawArticle>) -> IndexMap<String, Vec<RawArticle>> {
    let mut grouped: IndexMap<String, Vec<RawArticle>> = IndexMap::new();
    for article in articles {
        let source = strip_www(&article.domain).to_string();
        grouped.entry(source).or_default().push(article);
    }
    grouped
}

/// Round-robin merge: every group contributes its current head each
/// round, in group insertion order, until all groups are exhausted. Each
/// source's own items keep their ranked order; no single source can
/// dominate the head of the feed.
pub fn interleave(grouped: IndexMap<String, Vec<RawArticle>>) -> Vec<RawArticle> {
    let mut queues: Vec<VecDeque<RawArticle>> =
        grouped.into_values().map(VecDeque::from).collect();
    let mut interleaved = Vec::new();

    let mut exhausted = false;
    while !exhausted {
        exhausted = true;
        for queue in queues.iter_mut() {
            if let Some(article) = queue.pop_front() {
                interleaved.push(article);
                exhausted = false;
            }
        }
    }
    interleaved
}

/// Shapes the first `limit` articles of an already ordered list into the
/// public contract. Ids are `"{prefix}-{index}"`, unique within one
/// pipeline invocation.
pub fn format_articles(articles: &[RawArticle], id_prefix: &str, limit: usize) -> Vec<NewsArticle> {
    articles
        .iter()
        .take(limit)
        .enumerate()
        .map(|(index, article)| NewsArticle {
            id: format!("{id_prefix}-{index}"),
            title: article.headline.clone(),
            date: article.datetime.format("%Y-%m-%d").to_string(),
            source: strip_www(&article.domain).to_string(),
            summary: String::new(),
            url: article.url.clone(),
        })
        .collect()
}

fn strip_www(domain: &str) -> &str {
    domain.strip_prefix("www.").unwrap_or(domain)
}

#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub keywords: Vec<String>,
    pub id_prefix: String,
    pub limit: usize,
    pub sort_by_relevance: bool,
    pub special_word: String,
    /// When set, articles mentioning a year other than this date's year
    /// are dropped.
    pub from_date: Option<NaiveDate>,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            id_prefix: String::new(),
            limit: 10,
            sort_by_relevance: true,
            special_word: String::new(),
            from_date: None,
        }
    }
}

/// Runs the full pipeline in its fixed stage order: dedupe, validate,
/// year filter, group, rank within each group, interleave, format.
pub fn process_articles(raw: Vec<RawArticle>, options: &ProcessOptions) -> Vec<NewsArticle> {
    let mut processed = dedupe(raw);
    processed = filter_valid(processed);

    if let Some(from_date) = options.from_date {
        let target_year = from_date.format("%Y").to_string();
        processed = filter_by_year_mention(processed, &target_year);
    }

    let mut grouped = group_by_source(processed);
    if options.sort_by_relevance {
        for group in grouped.values_mut() {
            let items = std::mem::take(group);
            *group = rank_by_relevance(items, &options.keywords, &options.special_word);
        }
    }

    let interleaved = interleave(grouped);
    format_articles(&interleaved, &options.id_prefix, options.limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn article(headline: &str, domain: &str) -> RawArticle {
        RawArticle {
            headline: headline.to_string(),
            datetime: Utc.with_ymd_and_hms(2021, 6, 1, 9, 30, 0).unwrap(),
            domain: domain.to_string(),
            url: format!("https://arquivo.pt/{domain}/{headline}"),
        }
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let articles = vec![
            article("Orçamento aprovado", "publico.pt"),
            article("  orçamento APROVADO ", "dn.pt"),
            article("Outra notícia qualquer", "dn.pt"),
        ];
        let deduped = dedupe(articles);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].domain, "publico.pt");
    }

    #[test]
    fn test_filter_valid_drops_blank_headlines() {
        let articles = vec![
            article("", "publico.pt"),
            article("   ", "dn.pt"),
            article("Notícia real", "rtp.pt"),
        ];
        let valid = filter_valid(articles);
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].headline, "Notícia real");
    }

    #[test]
    fn test_year_filter_is_strict() {
        let articles = vec![
            article("Orçamento 2021 vs 2020 comparado", "publico.pt"),
            article("Orçamento de 2021 aprovado", "publico.pt"),
            article("Execução orçamental", "publico.pt"),
            article("Retrospetiva 1999", "publico.pt"),
        ];
        let kept = filter_by_year_mention(articles, "2021");
        let headlines: Vec<_> = kept.iter().map(|a| a.headline.as_str()).collect();
        assert_eq!(
            headlines,
            vec!["Orçamento de 2021 aprovado", "Execução orçamental"]
        );
    }

    #[test]
    fn test_year_filter_ignores_out_of_range_numbers() {
        // 4-digit tokens outside 19xx/20xx are not year mentions.
        let articles = vec![article("Despesa de 1500 milhões em 2021", "publico.pt")];
        assert_eq!(filter_by_year_mention(articles, "2021").len(), 1);
    }

    #[test]
    fn test_group_by_source_strips_www_and_keeps_order() {
        let articles = vec![
            article("a", "www.publico.pt"),
            article("b", "dn.pt"),
            article("c", "publico.pt"),
        ];
        let grouped = group_by_source(articles);
        let keys: Vec<_> = grouped.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["publico.pt", "dn.pt"]);
        assert_eq!(grouped["publico.pt"].len(), 2);
    }

    #[test]
    fn test_interleave_round_robin_until_exhaustion() {
        let mut grouped = IndexMap::new();
        grouped.insert(
            "a.pt".to_string(),
            (0..5).map(|i| article(&format!("a{i}"), "a.pt")).collect(),
        );
        grouped.insert(
            "b.pt".to_string(),
            (0..3).map(|i| article(&format!("b{i}"), "b.pt")).collect(),
        );
        grouped.insert(
            "c.pt".to_string(),
            (0..1).map(|i| article(&format!("c{i}"), "c.pt")).collect(),
        );

        let merged = interleave(grouped);
        let domains: Vec<_> = merged.iter().map(|a| a.domain.as_str()).collect();
        assert_eq!(
            domains,
            vec!["a.pt", "b.pt", "c.pt", "a.pt", "b.pt", "a.pt", "b.pt", "a.pt", "a.pt"]
        );
        let headlines: Vec<_> = merged.iter().map(|a| a.headline.as_str()).collect();
        assert_eq!(
            headlines,
            vec!["a0", "b0", "c0", "a1", "b1", "a2", "b2", "a3", "a4"]
        );
    }

    #[test]
    fn test_format_truncates_and_numbers_ids() {
        let articles: Vec<_> = (0..10).map(|i| article(&format!("t{i}"), "www.dn.pt")).collect();
        let formatted = format_articles(&articles, "p", 3);
        assert_eq!(formatted.len(), 3);
        let ids: Vec<_> = formatted.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["p-0", "p-1", "p-2"]);
        assert_eq!(formatted[0].title, "t0");
        assert_eq!(formatted[0].date, "2021-06-01");
        assert_eq!(formatted[0].source, "dn.pt");
        assert_eq!(formatted[0].summary, "");
    }

    #[test]
    fn test_process_articles_full_order() {
        let raw = vec![
            article("Orçamento da Saúde reforçado em 2021", "www.publico.pt"),
            article("Orçamento da Saúde reforçado em 2021", "dn.pt"),
            article("", "dn.pt"),
            article("Orçamento 2021 vs 2020", "rtp.pt"),
            article("Saúde", "dn.pt"),
            article("Mais uma notícia sobre saúde e hospitais", "dn.pt"),
        ];
        let options = ProcessOptions {
            special_word: "saúde".to_string(),
            from_date: NaiveDate::from_ymd_opt(2021, 1, 1),
            id_prefix: "saude".to_string(),
            ..ProcessOptions::default()
        };
        let result = process_articles(raw, &options);

        // Duplicate, blank and multi-year headlines are gone; sources
        // alternate publico/dn; within dn the special word ordering holds.
        let titles: Vec<_> = result.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Orçamento da Saúde reforçado em 2021",
                "Mais uma notícia sobre saúde e hospitais",
                "Saúde",
            ]
        );
        assert_eq!(result[0].source, "publico.pt");
        assert_eq!(result[1].source, "dn.pt");
        let ids: Vec<_> = result.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["saude-0", "saude-1", "saude-2"]);
    }

    #[test]
    fn test_no_duplicate_headlines_survive() {
        let raw = vec![
            article("A mesma manchete", "publico.pt"),
            article("a mesma manchete", "dn.pt"),
            article("A MESMA MANCHETE", "rtp.pt"),
        ];
        let result = process_articles(raw, &ProcessOptions::default());
        assert_eq!(result.len(), 1);
    }
}
