pub mod archive;
pub mod normalize;
pub mod pipeline;
pub mod queries;
pub mod rank;

pub use archive::{fetch_articles, ArchiveSearch, ArquivoClient};
pub use pipeline::{process_articles, ProcessOptions};

pub mod prelude {
    pub use super::archive::{fetch_articles, ArchiveSearch, ArquivoClient};
    pub use super::pipeline::{process_articles, ProcessOptions};
    pub use ob_core::{Error, NewsArticle, RawArticle, Result, SearchWindow};
}
