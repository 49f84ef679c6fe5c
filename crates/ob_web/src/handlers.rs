use std::sync::Arc;

use axum::{
    extract::{Query, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use ob_core::SearchWindow;
use ob_news::archive::DEFAULT_RESULT_LIMIT;
use ob_news::{fetch_articles, process_articles, queries, ArchiveSearch, ProcessOptions};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::AppState;

/// Keywords the district view scores headlines against.
const DISTRICT_KEYWORDS: &[&str] = &[
    "orçamento",
    "despesa",
    "investimento",
    "financiamento",
    "transferências",
];

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

#[derive(Debug)]
struct ArquivoParams {
    query: String,
    window: SearchWindow,
    domains: Vec<String>,
}

/// Pulls `query`, `from`, `to` and every repeated `domain` out of the raw
/// query string. Axum's map extractor collapses repeated keys, so this
/// walks the pairs itself.
fn parse_arquivo_params(raw: &str) -> std::result::Result<ArquivoParams, &'static str> {
    let mut query = None;
    let mut from = None;
    let mut to = None;
    let mut domains = Vec::new();

    for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
        match key.as_ref() {
            "query" => query = Some(value.into_owned()),
            "from" => from = Some(value.into_owned()),
            "to" => to = Some(value.into_owned()),
            "domain" => domains.push(value.into_owned()),
            _ => {}
        }
    }

    let (Some(query), Some(from), Some(to)) = (query, from, to) else {
        return Err("Missing query, from, to, or domain parameters");
    };
    if domains.is_empty() {
        return Err("Missing query, from, to, or domain parameters");
    }

    let (Ok(from), Ok(to)) = (
        NaiveDate::parse_from_str(&from, "%Y-%m-%d"),
        NaiveDate::parse_from_str(&to, "%Y-%m-%d"),
    ) else {
        return Err("Invalid from or to date");
    };

    Ok(ArquivoParams {
        query,
        window: SearchWindow::new(from, to),
        domains,
    })
}

/// GET /api/arquivo — one archive search, normalized titles, band-passed
/// timestamps. Missing parameters fail fast; upstream failures map to 500.
pub async fn arquivo_search(
    State(state): State<Arc<AppState>>,
    RawQuery(raw): RawQuery,
) -> Response {
    let params = match parse_arquivo_params(raw.as_deref().unwrap_or_default()) {
        Ok(params) => params,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    match state
        .archive
        .search(
            &params.query,
            &params.window,
            &params.domains,
            DEFAULT_RESULT_LIMIT,
        )
        .await
    {
        Ok(results) => Json(json!({ "results": results })).into_response(),
        Err(err) => {
            error!(query = %params.query, error = %err, "archive proxy request failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Arquivo.pt request failed")
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LiveNewsParams {
    year: Option<i32>,
    sector: Option<String>,
    district: Option<String>,
    limit: Option<usize>,
}

struct FetchPlan {
    window: SearchWindow,
    queries: Vec<String>,
    keywords: Vec<String>,
    special_word: String,
    id_prefix: String,
    from_date: Option<NaiveDate>,
}

fn calendar_year_window(year: i32) -> Option<SearchWindow> {
    Some(SearchWindow::new(
        NaiveDate::from_ymd_opt(year, 1, 1)?,
        NaiveDate::from_ymd_opt(year, 12, 31)?,
    ))
}

/// September of the previous year through August: the window the
/// year-wide view uses, covering the budget debate cycle.
fn budget_cycle_window(year: i32) -> Option<SearchWindow> {
    Some(SearchWindow::new(
        NaiveDate::from_ymd_opt(year - 1, 9, 1)?,
        NaiveDate::from_ymd_opt(year, 8, 31)?,
    ))
}

fn build_fetch_plan(year: i32, sector: Option<&str>, district: Option<&str>) -> Option<FetchPlan> {
    if let Some(district) = district {
        let window = calendar_year_window(year)?;
        return Some(FetchPlan {
            window,
            queries: queries::district_queries(district, year),
            keywords: DISTRICT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            special_word: queries::district_display_name(district).to_string(),
            id_prefix: "district".to_string(),
            from_date: Some(window.from),
        });
    }
    if let Some(sector) = sector {
        let window = calendar_year_window(year)?;
        return Some(FetchPlan {
            window,
            queries: queries::sector_queries(sector, year),
            keywords: queries::sector_keywords(sector)
                .iter()
                .map(|k| k.to_string())
                .collect(),
            special_word: queries::sector_display_name(sector).to_string(),
            id_prefix: sector.to_string(),
            from_date: Some(window.from),
        });
    }

    let window = budget_cycle_window(year)?;
    Some(FetchPlan {
        window,
        queries: queries::general_queries(year),
        keywords: Vec::new(),
        special_word: String::new(),
        id_prefix: "news".to_string(),
        // The window spans two calendar years, a single-year mention
        // filter does not apply.
        from_date: None,
    })
}

/// GET /api/news/live — fans queries out to the archive and runs the full
/// processing pipeline. An empty array is a valid "no articles" answer.
pub async fn live_news(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LiveNewsParams>,
) -> Response {
    let Some(year) = params.year else {
        return error_response(StatusCode::BAD_REQUEST, "Missing year parameter");
    };
    if !(1900..=2100).contains(&year) {
        return error_response(StatusCode::BAD_REQUEST, "Invalid year parameter");
    }
    let Some(plan) = build_fetch_plan(year, params.sector.as_deref(), params.district.as_deref())
    else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid year parameter");
    };

    let domains = queries::default_news_domains();
    let raw = fetch_articles(
        &state.archive,
        &plan.queries,
        &plan.window,
        &domains,
        false,
        DEFAULT_RESULT_LIMIT,
    )
    .await;
    info!(year, fetched = raw.len(), queries = plan.queries.len(), "archive fan-out settled");

    let options = ProcessOptions {
        keywords: plan.keywords,
        id_prefix: plan.id_prefix,
        limit: params.limit.unwrap_or(10),
        sort_by_relevance: true,
        special_word: plan.special_word,
        from_date: plan.from_date,
    };
    Json(process_articles(raw, &options)).into_response()
}

#[derive(Debug, Deserialize)]
pub struct NewsTableParams {
    year: Option<String>,
    limit: Option<usize>,
}

/// Flattens the per-year table into one list with year-prefixed unique
/// ids, most recent first.
fn flatten_news_table(table: &Value, limit: Option<usize>) -> Vec<Value> {
    let mut all: Vec<Value> = Vec::new();
    if let Some(years) = table.as_object() {
        for (year, articles) in years {
            if let Some(articles) = articles.as_array() {
                for article in articles {
                    let mut entry = article.clone();
                    if let Some(obj) = entry.as_object_mut() {
                        let unique = format!("{}-{}", year, article["id"]);
                        obj.insert("uniqueId".to_string(), Value::String(unique));
                    }
                    all.push(entry);
                }
            }
        }
    }
    all.sort_by(|a, b| {
        b["date"]
            .as_str()
            .unwrap_or_default()
            .cmp(a["date"].as_str().unwrap_or_default())
    });
    if let Some(limit) = limit {
        all.truncate(limit);
    }
    all
}

/// GET /api/news — the curated per-year table.
pub async fn news_table(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NewsTableParams>,
) -> Response {
    // A zero limit means no limit, as does an absent one.
    let limit = params.limit.filter(|limit| *limit > 0);

    if let Some(year) = &params.year {
        return match state.news.get(year) {
            Some(articles) => {
                let mut articles = articles.clone();
                if let (Some(limit), Some(list)) = (limit, articles.as_array_mut()) {
                    list.truncate(limit);
                }
                Json(articles).into_response()
            }
            None => error_response(StatusCode::NOT_FOUND, "Year not found"),
        };
    }

    Json(flatten_news_table(&state.news, limit)).into_response()
}

#[derive(Debug, Deserialize)]
pub struct BudgetParams {
    year: Option<String>,
    sector: Option<String>,
    #[serde(rename = "startYear")]
    start_year: Option<i32>,
    #[serde(rename = "endYear")]
    end_year: Option<i32>,
}

/// GET /api/budget — proposed/expended totals per year and sector.
pub async fn budget(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BudgetParams>,
) -> Response {
    let years = &state.budget["years"];

    match (&params.year, &params.sector) {
        (Some(year), None) => match years.get(year) {
            Some(data) => Json(data.clone()).into_response(),
            None => error_response(StatusCode::NOT_FOUND, "Year not found"),
        },
        (Some(year), Some(sector)) => {
            match years.get(year).and_then(|data| data["sectors"].get(sector)) {
                Some(data) => Json(data.clone()).into_response(),
                None => error_response(StatusCode::NOT_FOUND, "Year or sector not found"),
            }
        }
        (None, _) => {
            if let (Some(start), Some(end)) = (params.start_year, params.end_year) {
                if !(1900..=2100).contains(&start) || !(1900..=2100).contains(&end) {
                    return error_response(StatusCode::BAD_REQUEST, "Invalid year range");
                }
                let mut range = serde_json::Map::new();
                for year in start..=end {
                    let key = year.to_string();
                    if let Some(data) = years.get(&key) {
                        range.insert(key, data.clone());
                    }
                }
                if range.is_empty() {
                    return error_response(
                        StatusCode::NOT_FOUND,
                        "No data found for the specified range",
                    );
                }
                return Json(Value::Object(range)).into_response();
            }
            Json(state.budget.clone()).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DistrictsParams {
    year: Option<String>,
    district: Option<String>,
}

/// GET /api/districts — per-district figures keyed by year.
pub async fn districts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DistrictsParams>,
) -> Response {
    match (&params.year, &params.district) {
        (Some(year), Some(district)) => {
            let found = state
                .districts
                .get(year)
                .and_then(Value::as_array)
                .and_then(|list| {
                    list.iter()
                        .find(|entry| entry["id"].as_str() == Some(district.as_str()))
                });
            match found {
                Some(entry) => Json(entry.clone()).into_response(),
                None => error_response(StatusCode::NOT_FOUND, "Year or district not found"),
            }
        }
        (Some(year), None) => match state.districts.get(year) {
            Some(data) => Json(data.clone()).into_response(),
            None => error_response(StatusCode::NOT_FOUND, "Year not found"),
        },
        (None, _) => Json(state.districts.clone()).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct DespesaParams {
    year: Option<String>,
    sector: Option<String>,
}

/// GET /api/despesa — the per-year expense breakdown file.
pub async fn despesa(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DespesaParams>,
) -> Response {
    let year = params.year.as_deref().unwrap_or("2023");

    let data = match state.datasets.read_year("despesa", year).await {
        Ok(data) => data,
        Err(err) => {
            error!(year, error = %err, "failed to read expense data");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load budget data");
        }
    };

    if let Some(sector) = &params.sector {
        return match data["sectors"].get(sector) {
            Some(sector_data) => {
                Json(json!({ "sector": sector, "data": sector_data })).into_response()
            }
            None => error_response(StatusCode::NOT_FOUND, "Sector not found"),
        };
    }
    Json(data).into_response()
}

#[derive(Debug, Deserialize)]
pub struct BalanceParams {
    #[serde(rename = "startYear")]
    start_year: Option<i32>,
    #[serde(rename = "endYear")]
    end_year: Option<i32>,
}

/// GET /api/balance — merges the per-year balance files over a range.
/// Years whose file is missing or invalid are skipped, never fatal.
pub async fn balance(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BalanceParams>,
) -> Response {
    let start = params.start_year.unwrap_or(2018);
    let end = params.end_year.unwrap_or(2023);
    if !(1900..=2100).contains(&start) || !(1900..=2100).contains(&end) {
        return error_response(StatusCode::BAD_REQUEST, "Invalid year range");
    }

    let mut merged = serde_json::Map::new();
    for year in start..=end {
        let key = year.to_string();
        match state.datasets.read_year("balanco", &key).await {
            Ok(data) => {
                merged.insert(key, data);
            }
            Err(err) => error!(year, error = %err, "skipping balance year"),
        }
    }
    Json(Value::Object(merged)).into_response()
}

#[derive(Debug, Deserialize)]
pub struct TransfersParams {
    year: Option<String>,
    level: Option<String>,
}

/// GET /api/transfers — municipality transfer totals with each
/// district's national share attached.
pub async fn transfers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TransfersParams>,
) -> Response {
    let year = params.year.as_deref().unwrap_or("2023");
    let level = params.level.as_deref().unwrap_or("district");

    let mut data = match state.datasets.read_year("municipality_transfers", year).await {
        Ok(data) => data,
        Err(err) => {
            error!(year, error = %err, "failed to read transfer data");
            return error_response(
                StatusCode::NOT_FOUND,
                &format!("No data available for year {year}"),
            );
        }
    };

    let national_total = data["Total"].as_f64().unwrap_or_default();
    if let Some(districts) = data.get_mut("Districts").and_then(Value::as_array_mut) {
        for district in districts.iter_mut() {
            let share = district["Total"].as_f64().unwrap_or_default();
            let percentage = if national_total > 0.0 {
                share / national_total * 100.0
            } else {
                0.0
            };
            if let Some(entry) = district.as_object_mut() {
                entry.insert(
                    "NationalPercentage".to_string(),
                    Value::String(percentage.to_string()),
                );
            }
        }
    }

    if level == "municipality" {
        return Json(data).into_response();
    }

    let district_summaries: Vec<Value> = data["Districts"]
        .as_array()
        .map(|list| {
            list.iter()
                .map(|entry| {
                    json!({
                        "District": entry["District"],
                        "Total": entry["Total"],
                        "NationalPercentage": entry["NationalPercentage"],
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    Json(json!({
        "Country": data["Country"],
        "Year": data["Year"],
        "Total": data["Total"],
        "Districts": district_summaries,
    }))
    .into_response()
}
