//! Headline relevance scoring, applied within one source group at a time.

use std::cmp::Ordering;

use ob_core::RawArticle;

/// Additive quality heuristic over a cleaned headline.
///
/// Substantive headlines (more than four words) beat navigation labels,
/// keyword matches add to that, and `special_word` — the sector or
/// district the caller is looking at — is a strong boost that floats
/// on-topic headlines to the top of their group.
pub fn relevance_score(headline: &str, keywords: &[String], special_word: &str) -> f64 {
    let headline = headline.trim();
    let word_count = headline.split_whitespace().count();
    let lowered = headline.to_lowercase();

    let mut score = 0.0;
    if word_count > 4 {
        score += 5.0;
    }
    for keyword in keywords {
        if lowered.contains(&keyword.to_lowercase()) {
            score += 3.0;
        }
    }
    if !special_word.is_empty() && lowered.contains(&special_word.to_lowercase()) {
        score += 10.0;
    }

    // Mild length preference as a tie-breaker.
    score + word_count as f64 * 0.5
}

/// Stable sort by descending score, equal scores keep their input order.
pub fn rank_by_relevance(
    articles: Vec<RawArticle>,
    keywords: &[String],
    special_word: &str,
) -> Vec<RawArticle> {
    let mut scored: Vec<(f64, RawArticle)> = articles
        .into_iter()
        .map(|article| {
            (
                relevance_score(&article.headline, keywords, special_word),
                article,
            )
        })
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    scored.into_iter().map(|(_, article)| article).collect()
}
