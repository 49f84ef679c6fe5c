//! Year-keyed JSON file lookups under the data directory. The files are
//! opaque to the server, they pass through as `serde_json::Value`.

use std::path::PathBuf;

use ob_core::{Error, Result};
use serde_json::Value;

pub struct DatasetStore {
    data_dir: PathBuf,
}

impl DatasetStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Reads `{data_dir}/{collection}/{year}.json`. The year must be a
    /// plain 4-digit number, anything else never touches the filesystem.
    pub async fn read_year(&self, collection: &str, year: &str) -> Result<Value> {
        if !is_plain_year(year) {
            return Err(Error::Dataset(format!("invalid year {year:?}")));
        }
        let path = self.data_dir.join(collection).join(format!("{year}.json"));
        let raw = tokio::fs::read_to_string(&path).await?;
        Ok(serde_json::from_str(&raw)?)
    }
}

fn is_plain_year(value: &str) -> bool {
    value.len() == 4 && value.bytes().all(|b| b.is_ascii_digit())
}
