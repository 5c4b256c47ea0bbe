use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("query contains no ingredient terms")]
    EmptyIngredients,

    #[error("unknown category filter: {0}")]
    UnknownFilter(String),

    #[error("malformed recipe record: {0}")]
    MalformedRecord(String),

    #[error("embedding error: {0}")]
    Embedding(String),

    #[error("vector store error: {0}")]
    Store(String),

    #[error("generation error: {0}")]
    Generation(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
