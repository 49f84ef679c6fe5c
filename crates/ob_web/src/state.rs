use std::path::{Path, PathBuf};

use ob_news::ArquivoClient;
use serde_json::Value;
use tracing::warn;

use crate::datasets::DatasetStore;

/// Shared per-process state: the archive client, the file-backed dataset
/// store and the small tables loaded once at startup. Everything is
/// read-only after construction.
pub struct AppState {
    pub archive: ArquivoClient,
    pub datasets: DatasetStore,
    pub news: Value,
    pub budget: Value,
    pub districts: Value,
}

impl AppState {
    pub async fn load(archive_url: &str, data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let news = load_table(&data_dir, "news.json").await;
        let budget = load_table(&data_dir, "budget.json").await;
        let districts = load_table(&data_dir, "districts.json").await;

        Self {
            archive: ArquivoClient::with_base_url(archive_url),
            datasets: DatasetStore::new(data_dir),
            news,
            budget,
            districts,
        }
    }
}

/// Missing or unreadable tables degrade to an empty object; the routes
/// they back then answer 404 instead of failing startup.
async fn load_table(data_dir: &Path, name: &str) -> Value {
    let path = data_dir.join(name);
    match tokio::fs::read_to_string(&path).await {
        Ok(raw) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "dataset table is not valid JSON");
                Value::Object(Default::default())
            }
        },
        Err(err) => {
            warn!(path = %path.display(), error = %err, "dataset table missing");
            Value::Object(Default::default())
        }
    }
}
