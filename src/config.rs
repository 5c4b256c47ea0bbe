use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub dataset: DatasetConfig,
    pub extractor: ExtractorConfig,
    pub store: StoreConfig,
    pub retrieval: RetrievalConfig,
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Path to the extracted cookbook text (form-feed separated pages).
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Maximum length of a line considered as a category label.
    pub label_max_len: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// LanceDB database directory.
    pub db_path: PathBuf,
    /// Table holding the recipe vectors.
    pub table: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of candidates fetched from the vector store.
    pub top_k: usize,
    /// Maximum candidates kept in the assembled context.
    pub context_budget: usize,
    /// Character cap applied to ingredients/method fields in the context.
    pub max_field_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Anthropic API key. Optional so that extract/ingest/search work without it.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        let dataset_path = std::env::var("DATASET_PATH")
            .unwrap_or_else(|_| "./data/cookbook.txt".to_string())
            .into();

        let label_max_len = std::env::var("CATEGORY_LABEL_MAX_LEN")
            .unwrap_or_else(|_| "32".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid CATEGORY_LABEL_MAX_LEN value".to_string()))?;

        let db_path = std::env::var("VECTOR_DB_PATH")
            .unwrap_or_else(|_| "./data/larder.lancedb".to_string())
            .into();

        let table = std::env::var("VECTOR_TABLE").unwrap_or_else(|_| "recipes".to_string());

        let top_k = std::env::var("TOP_K")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid TOP_K value".to_string()))?;

        let context_budget = std::env::var("CONTEXT_BUDGET")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid CONTEXT_BUDGET value".to_string()))?;

        let max_field_chars = std::env::var("CONTEXT_MAX_FIELD_CHARS")
            .unwrap_or_else(|_| "2000".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid CONTEXT_MAX_FIELD_CHARS value".to_string()))?;

        let api_key = std::env::var("ANTHROPIC_API_KEY").ok();

        let base_url = std::env::var("ANTHROPIC_BASE_URL")
            .unwrap_or_else(|_| "https://api.anthropic.com".to_string());

        let model = std::env::var("ANTHROPIC_MODEL")
            .unwrap_or_else(|_| "claude-3-5-haiku-20241022".to_string());

        let max_tokens = std::env::var("GENERATION_MAX_TOKENS")
            .unwrap_or_else(|_| "2000".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid GENERATION_MAX_TOKENS value".to_string()))?;

        Ok(Settings {
            dataset: DatasetConfig { path: dataset_path },
            extractor: ExtractorConfig { label_max_len },
            store: StoreConfig { db_path, table },
            retrieval: RetrievalConfig {
                top_k,
                context_budget,
                max_field_chars,
            },
            generation: GenerationConfig {
                api_key,
                base_url,
                model,
                max_tokens,
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.extractor.label_max_len == 0 {
            return Err(Error::Config(
                "Category label length threshold must be non-zero".to_string(),
            ));
        }

        if self.retrieval.top_k == 0 {
            return Err(Error::Config("TOP_K must be non-zero".to_string()));
        }

        if self.retrieval.context_budget == 0 {
            return Err(Error::Config("Context budget must be non-zero".to_string()));
        }

        if self.store.table.is_empty() {
            return Err(Error::Config("Table name must not be empty".to_string()));
        }

        Ok(())
    }

    /// API key, or a configuration error naming the missing variable.
    pub fn require_api_key(&self) -> Result<&str> {
        self.generation
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Config("ANTHROPIC_API_KEY is not set".to_string()))
    }
}
