//! Client for the Arquivo.pt full-text search API.
//!
//! One HTTP request per query string, all queries of a batch issued
//! concurrently. A failed query never fails the batch, it contributes
//! zero results.

use async_trait::async_trait;
use chrono::{NaiveDateTime, TimeZone, Utc};
use futures::future::join_all;
use ob_core::{Error, RawArticle, Result, SearchWindow};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::normalize::normalize_title;

pub const DEFAULT_ARCHIVE_URL: &str = "https://arquivo.pt/textsearch";

/// Result cap sent upstream when the caller does not pick one.
pub const DEFAULT_RESULT_LIMIT: u32 = 100;

/// Only the fields the pipeline consumes, keeps upstream payloads small.
const RESPONSE_FIELDS: &str = "originalURL,title,tstamp,encoding,linkToArchive";
const DEDUP_VALUE: &str = "250";

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    #[serde(default)]
    response_items: Vec<TextSearchItem>,
}

#[derive(Debug, Deserialize)]
struct TextSearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    tstamp: String,
    #[serde(rename = "originalURL", default)]
    original_url: String,
    #[serde(rename = "linkToArchive", default)]
    link_to_archive: String,
}

/// Seam over the archive search backend. The production implementation is
/// [`ArquivoClient`]; tests substitute scripted ones.
#[async_trait]
pub trait ArchiveSearch: Send + Sync {
    async fn search(
        &self,
        query: &str,
        window: &SearchWindow,
        domains: &[String],
        limit: u32,
    ) -> Result<Vec<RawArticle>>;
}

#[derive(Debug, Clone)]
pub struct ArquivoClient {
    http: reqwest::Client,
    base_url: String,
}

impl ArquivoClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_ARCHIVE_URL)
    }

    /// Point the client at a mirror or a local stand-in.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for ArquivoClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArchiveSearch for ArquivoClient {
    async fn search(
        &self,
        query: &str,
        window: &SearchWindow,
        domains: &[String],
        limit: u32,
    ) -> Result<Vec<RawArticle>> {
        let site_search = domains
            .iter()
            .filter_map(|domain| host_of(domain))
            .collect::<Vec<_>>()
            .join(",");
        let from = window.from_stamp();
        let to = window.to_stamp();
        let max_items = limit.to_string();
        let params = [
            ("q", query),
            ("from", from.as_str()),
            ("to", to.as_str()),
            ("siteSearch", site_search.as_str()),
            ("maxItems", max_items.as_str()),
            ("dedupValue", DEDUP_VALUE),
            ("type", "html"),
            ("fields", RESPONSE_FIELDS),
        ];

        debug!(query, from = %from, to = %to, "archive search");
        let response = self
            .http
            .get(self.base_url.as_str())
            .query(&params)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::Archive(format!(
                "archive search returned {} for query {:?}",
                response.status(),
                query
            )));
        }

        let body: TextSearchResponse = response.json().await?;
        Ok(body
            .response_items
            .into_iter()
            .filter_map(|item| to_article(item, window))
            .collect())
    }
}

/// Maps one upstream hit into a pipeline article. Hits outside the window
/// are discarded even when the upstream returned them, its boundary
/// handling is imprecise. Hits whose stamp or origin host cannot be
/// parsed are discarded rather than guessed at.
fn to_article(item: TextSearchItem, window: &SearchWindow) -> Option<RawArticle> {
    if !window.contains_stamp(&item.tstamp) {
        return None;
    }
    let naive = NaiveDateTime::parse_from_str(&item.tstamp, "%Y%m%d%H%M%S").ok()?;
    let domain = host_of(&item.original_url)?;

    Some(RawArticle {
        headline: normalize_title(&item.title),
        datetime: Utc.from_utc_datetime(&naive),
        domain,
        url: item.link_to_archive,
    })
}

fn host_of(value: &str) -> Option<String> {
    Url::parse(value)
        .ok()
        .and_then(|url| url.host_str().map(|host| host.to_string()))
}

/// Fan-out over all queries, fan-in of every successful batch. Failures
/// are isolated per query: the query contributes nothing and is logged
/// unless `silent`. Result order is not significant, downstream grouping
/// and ranking impose the real order.
pub async fn fetch_articles(
    client: &dyn ArchiveSearch,
    queries: &[String],
    window: &SearchWindow,
    domains: &[String],
    silent: bool,
    limit: u32,
) -> Vec<RawArticle> {
    let fetches = queries.iter().map(|query| async move {
        match client.search(query, window, domains, limit).await {
            Ok(articles) => articles,
            Err(err) => {
                if !silent {
                    warn!(query = %query, error = %err, "archive query failed, skipping");
                }
                Vec::new()
            }
        }
    });

    join_all(fetches).await.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn window() -> SearchWindow {
        SearchWindow::new(
            NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2022, 12, 31).unwrap(),
        )
    }

    #[test]
    fn test_host_of() {
        assert_eq!(host_of("http://www.rtp.pt/"), Some("www.rtp.pt".to_string()));
        assert_eq!(
            host_of("https://jornaleconomico.sapo.pt/noticias/x"),
            Some("jornaleconomico.sapo.pt".to_string())
        );
        assert_eq!(host_of("not a url"), None);
    }

    #[test]
    fn test_to_article_maps_fields() {
        let item = TextSearchItem {
            title: "OrÃ§amento aprovado - PÃºblico".to_string(),
            tstamp: "20220315120000".to_string(),
            original_url: "http://www.publico.pt/noticia/1".to_string(),
            link_to_archive: "https://arquivo.pt/wayback/1".to_string(),
        };
        let article = to_article(item, &window()).unwrap();
        assert_eq!(article.headline, "Orçamento aprovado");
        assert_eq!(article.domain, "www.publico.pt");
        assert_eq!(article.url, "https://arquivo.pt/wayback/1");
        assert_eq!(article.datetime.format("%Y-%m-%d %H:%M:%S").to_string(), "2022-03-15 12:00:00");
    }

    #[test]
    fn test_to_article_enforces_window() {
        let item = TextSearchItem {
            title: "fora da janela".to_string(),
            tstamp: "20230101000000".to_string(),
            original_url: "http://publico.pt/".to_string(),
            link_to_archive: "https://arquivo.pt/wayback/2".to_string(),
        };
        assert!(to_article(item, &window()).is_none());
    }

    #[test]
    fn test_to_article_rejects_bad_stamp_and_host() {
        let bad_stamp = TextSearchItem {
            title: "t".to_string(),
            tstamp: "20220101".to_string(),
            original_url: "http://publico.pt/".to_string(),
            link_to_archive: "u".to_string(),
        };
        assert!(to_article(bad_stamp, &window()).is_none());

        let bad_host = TextSearchItem {
            title: "t".to_string(),
            tstamp: "20220601000000".to_string(),
            original_url: "::::".to_string(),
            link_to_archive: "u".to_string(),
        };
        assert!(to_article(bad_host, &window()).is_none());
    }

    #[test]
    fn test_parses_upstream_payload() {
        let payload = r#"{
            "response_items": [
                {
                    "title": "DÃ©fice orÃ§amental cai",
                    "tstamp": "20220710083000",
                    "originalURL": "https://www.jn.pt/economia/x",
                    "linkToArchive": "https://arquivo.pt/wayback/3"
                }
            ]
        }"#;
        let parsed: TextSearchResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(parsed.response_items.len(), 1);
        let article = to_article(parsed.response_items.into_iter().next().unwrap(), &window()).unwrap();
        assert_eq!(article.headline, "Défice orçamental cai");
        assert_eq!(article.domain, "www.jn.pt");
    }

    struct ScriptedSearch;

    #[async_trait]
    impl ArchiveSearch for ScriptedSearch {
        async fn search(
            &self,
            query: &str,
            window: &SearchWindow,
            _domains: &[String],
            _limit: u32,
        ) -> Result<Vec<RawArticle>> {
            if query == "boom" {
                return Err(Error::Archive("upstream down".to_string()));
            }
            Ok(vec![RawArticle {
                headline: query.to_string(),
                datetime: Utc.from_utc_datetime(
                    &NaiveDateTime::parse_from_str(&window.from_stamp(), "%Y%m%d%H%M%S").unwrap(),
                ),
                domain: "publico.pt".to_string(),
                url: format!("https://arquivo.pt/{query}"),
            }])
        }
    }

    struct CannedUpstream;

    #[async_trait]
    impl ArchiveSearch for CannedUpstream {
        async fn search(
            &self,
            _query: &str,
            window: &SearchWindow,
            _domains: &[String],
            _limit: u32,
        ) -> Result<Vec<RawArticle>> {
            let payload = r#"{
                "response_items": [
                    {
                        "title": "Orçamento Educação 2022 - Público",
                        "tstamp": "20220315120000",
                        "originalURL": "http://www.publico.pt/noticia/educacao",
                        "linkToArchive": "https://arquivo.pt/wayback/educacao"
                    },
                    {
                        "title": "",
                        "tstamp": "20220401000000",
                        "originalURL": "http://www.publico.pt/noticia/vazia",
                        "linkToArchive": "https://arquivo.pt/wayback/vazia"
                    }
                ]
            }"#;
            let parsed: TextSearchResponse = serde_json::from_str(payload).unwrap();
            Ok(parsed
                .response_items
                .into_iter()
                .filter_map(|item| to_article(item, window))
                .collect())
        }
    }

    #[tokio::test]
    async fn test_fetch_and_process_end_to_end() {
        use crate::pipeline::{process_articles, ProcessOptions};

        let window = window();
        let raw = fetch_articles(
            &CannedUpstream,
            &["orçamento educação 2022".to_string()],
            &window,
            &["http://publico.pt/".to_string()],
            false,
            DEFAULT_RESULT_LIMIT,
        )
        .await;
        assert_eq!(raw.len(), 2);

        let options = ProcessOptions {
            id_prefix: "news".to_string(),
            from_date: Some(window.from),
            ..ProcessOptions::default()
        };
        let result = process_articles(raw, &options);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "news-0");
        assert_eq!(result[0].title, "Orçamento Educação 2022");
        assert_eq!(result[0].date, "2022-03-15");
        assert_eq!(result[0].source, "publico.pt");
        assert_eq!(result[0].summary, "");
        assert_eq!(result[0].url, "https://arquivo.pt/wayback/educacao");
    }

    #[tokio::test]
    async fn test_fetch_articles_isolates_failures() {
        let queries = vec![
            "orçamento 2022".to_string(),
            "boom".to_string(),
            "despesa 2022".to_string(),
        ];
        let articles = fetch_articles(
            &ScriptedSearch,
            &queries,
            &window(),
            &["http://publico.pt/".to_string()],
            true,
            DEFAULT_RESULT_LIMIT,
        )
        .await;

        let headlines: Vec<_> = articles.iter().map(|a| a.headline.as_str()).collect();
        assert_eq!(headlines, vec!["orçamento 2022", "despesa 2022"]);
    }
}
