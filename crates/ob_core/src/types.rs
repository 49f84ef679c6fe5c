use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One archive hit after title cleanup. This is the unit the processing
/// stages operate on and the element type of the `/api/arquivo` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawArticle {
    pub headline: String,
    pub datetime: DateTime<Utc>,
    pub domain: String,
    pub url: String,
}

/// The article shape handed to the dashboard. `summary` is always empty,
/// no summarization is performed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsArticle {
    pub id: String,
    pub title: String,
    pub date: String,
    pub source: String,
    pub summary: String,
    pub url: String,
}

/// Inclusive calendar-date window for archive searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl SearchWindow {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// Calendar year of the window start, e.g. "2021".
    pub fn target_year(&self) -> String {
        self.from.format("%Y").to_string()
    }

    /// 14-digit `YYYYMMDDHHMMSS` stamp of the window start, midnight UTC.
    pub fn from_stamp(&self) -> String {
        stamp(self.from)
    }

    /// 14-digit stamp of the window end, midnight UTC.
    pub fn to_stamp(&self) -> String {
        stamp(self.to)
    }

    /// Band-pass check on an upstream 14-digit stamp. Lexicographic
    /// comparison works because the format is fixed-width, most
    /// significant field first.
    pub fn contains_stamp(&self, value: &str) -> bool {
        value >= self.from_stamp().as_str() && value <= self.to_stamp().as_str()
    }
}

fn stamp(date: NaiveDate) -> String {
    format!("{}000000", date.format("%Y%m%d"))
}
