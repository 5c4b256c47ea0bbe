// Embedding wrapper around fastembed.
//
// `TextEmbedding` is synchronous and CPU-bound, so all embed calls are
// dispatched through `tokio::task::spawn_blocking`; the model is held in an
// `Arc` and only touched from blocking tasks. The all-MiniLM-L6-v2 model
// takes plain inputs (no task prefixes) and produces 384-dimensional vectors.
use crate::error::{Error, Result};
use crate::model::RecipeRecord;
use std::sync::Arc;
use tracing::info;

/// Number of characters of method text included in the embedded document.
const METHOD_PREVIEW_CHARS: usize = 500;

pub struct Embedder {
    model: Arc<fastembed::TextEmbedding>,
}

impl Embedder {
    /// Initialize the embedding model (all-MiniLM-L6-v2).
    ///
    /// Downloads the model on first run; the download happens synchronously
    /// inside a blocking task.
    pub async fn new() -> Result<Self> {
        info!("Loading embedding model");
        let model = tokio::task::spawn_blocking(|| {
            let options = fastembed::InitOptions::new(fastembed::EmbeddingModel::AllMiniLML6V2);
            fastembed::TextEmbedding::try_new(options)
        })
        .await
        .map_err(|e| Error::Embedding(format!("spawn_blocking join error: {e}")))?
        .map_err(|e| Error::Embedding(format!("model initialization failed: {e}")))?;

        Ok(Self {
            model: Arc::new(model),
        })
    }

    /// Embed documents for indexing, in small batches to bound peak memory.
    pub async fn embed_documents(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let model = Arc::clone(&self.model);
        tokio::task::spawn_blocking(move || model.embed(texts, Some(8)))
            .await
            .map_err(|e| Error::Embedding(format!("spawn_blocking join error: {e}")))?
            .map_err(|e| Error::Embedding(format!("document embedding failed: {e}")))
    }

    /// Embed a single query for search.
    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        let input = vec![query.to_string()];
        let model = Arc::clone(&self.model);
        let mut results = tokio::task::spawn_blocking(move || model.embed(input, None))
            .await
            .map_err(|e| Error::Embedding(format!("spawn_blocking join error: {e}")))?
            .map_err(|e| Error::Embedding(format!("query embedding failed: {e}")))?;
        results
            .pop()
            .ok_or_else(|| Error::Embedding("empty embedding result".to_string()))
    }

    /// Dimensionality of the embedding vectors (384 for all-MiniLM-L6-v2).
    pub fn dimensions(&self) -> usize {
        384
    }
}

/// Compose the text embedded for one record.
///
/// The header is repeated to weight the recipe name, followed by the
/// category, the full ingredients list, a method preview and the tip.
pub fn document_text(record: &RecipeRecord) -> String {
    let mut parts = vec![format!("{} {}", record.header, record.header)];

    parts.push(record.category_label().to_string());
    parts.push(record.ingredients.replace('\n', " "));

    if !record.method.is_empty() {
        let preview: String = record.method.chars().take(METHOD_PREVIEW_CHARS).collect();
        parts.push(preview.replace('\n', " "));
    }

    if let Some(tip) = record.tip.as_deref() {
        if !tip.is_empty() {
            parts.push(tip.to_string());
        }
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{record_id, Category, SourcePosition};

    #[test]
    fn test_document_text_weights_header() {
        let record = RecipeRecord {
            id: record_id("GREEK SALAD", 0),
            header: "GREEK SALAD".to_string(),
            category: Some(Category::StartersAndSalads),
            ingredients: "2 tomatoes\n1 cucumber".to_string(),
            method: "Chop and combine.".to_string(),
            tip: Some("Use ripe tomatoes.".to_string()),
            position: SourcePosition { page: 1, line: 1 },
        };

        let text = document_text(&record);
        assert!(text.starts_with("GREEK SALAD GREEK SALAD"));
        assert!(text.contains("STARTERS & SALADS"));
        assert!(text.contains("2 tomatoes 1 cucumber"));
        assert!(text.contains("Use ripe tomatoes."));
        assert!(!text.contains('\n'));
    }

    #[test]
    fn test_document_text_skips_empty_sections() {
        let record = RecipeRecord {
            id: record_id("PANCAKES", 0),
            header: "PANCAKES".to_string(),
            category: None,
            ingredients: "2 eggs".to_string(),
            method: String::new(),
            tip: None,
            position: SourcePosition::default(),
        };

        let text = document_text(&record);
        assert!(text.contains("UNCATEGORIZED"));
        assert!(text.ends_with("2 eggs"));
    }
}
