pub mod error;
pub mod types;

pub use error::Error;
pub use types::{NewsArticle, RawArticle, SearchWindow};

pub type Result<T> = std::result::Result<T, Error>;
