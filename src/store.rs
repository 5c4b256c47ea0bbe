// LanceDB vector store for recipe records.
//
// Table schema:
// - id: Utf8 (not null)
// - header: Utf8 (not null)
// - category: Utf8 (not null), canonical label or UNCATEGORIZED, filterable
// - ingredients: Utf8 (not null)
// - method: Utf8 (not null)
// - tip: Utf8 (nullable)
// - page: Int64 (not null)
// - line: Int64 (not null)
// - embedding: FixedSizeList<Float32, dim> (not null)
use crate::context::ScoredRecord;
use crate::error::{Error, Result};
use crate::model::{Category, RecipeRecord, SourcePosition};
use arrow_array::{
    Array, ArrayRef, FixedSizeListArray, Float32Array, Int64Array, RecordBatch,
    RecordBatchIterator, StringArray,
};
use arrow_schema::{DataType, Field, Schema};
use lancedb::query::{ExecutableQuery, QueryBase};
use std::sync::Arc;
use tracing::{debug, info};

pub struct RecipeStore {
    db: lancedb::Connection,
    table: String,
}

impl RecipeStore {
    /// Connect to a LanceDB database at the given filesystem path.
    pub async fn connect(path: &str, table: &str) -> Result<Self> {
        let db = lancedb::connect(path)
            .execute()
            .await
            .map_err(|e| Error::Store(format!("connection failed: {e}")))?;
        Ok(Self {
            db,
            table: table.to_string(),
        })
    }

    /// Replace the table contents with the given records and embeddings.
    ///
    /// Drops the existing table (if any) and creates a fresh one. A cookbook
    /// corpus is a few hundred records, so full re-indexing is cheap.
    pub async fn replace_all(
        &self,
        records: &[RecipeRecord],
        embeddings: &[Vec<f32>],
        dimensions: usize,
    ) -> Result<usize> {
        if records.len() != embeddings.len() {
            return Err(Error::Store(format!(
                "record/embedding count mismatch: {} vs {}",
                records.len(),
                embeddings.len()
            )));
        }

        let batch = build_record_batch(records, embeddings, dimensions)?;
        let schema = batch.schema();

        // Table may not exist yet; ignore the drop error.
        let _ = self.db.drop_table(&self.table).await;

        let batch_iter = RecordBatchIterator::new(vec![batch].into_iter().map(Ok), schema);
        self.db
            .create_table(&self.table, Box::new(batch_iter))
            .execute()
            .await
            .map_err(|e| Error::Store(format!("create table failed: {e}")))?;

        info!(table = %self.table, records = records.len(), "vector table created");
        Ok(records.len())
    }

    /// Nearest-neighbour search, optionally restricted to one category.
    ///
    /// Results come back best-first; LanceDB distances are converted to
    /// similarity scores as `(1 - distance).max(0)` so that higher means
    /// more relevant.
    pub async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
        category: Option<Category>,
    ) -> Result<Vec<ScoredRecord>> {
        let table = self
            .db
            .open_table(&self.table)
            .execute()
            .await
            .map_err(|e| Error::Store(format!("open table failed: {e}")))?;

        let mut query = table
            .vector_search(query_embedding)
            .map_err(|e| Error::Store(format!("vector search setup failed: {e}")))?
            .limit(limit);

        if let Some(category) = category {
            // LanceDB filters use DataFusion SQL syntax.
            let filter = format!("category = '{}'", category.as_str().replace('\'', "''"));
            debug!(filter = %filter, "applying category filter");
            query = query.only_if(filter);
        }

        let stream = query
            .execute()
            .await
            .map_err(|e| Error::Store(format!("vector search failed: {e}")))?;

        let batches: Vec<RecordBatch> = futures::TryStreamExt::try_collect(stream)
            .await
            .map_err(|e| Error::Store(format!("collecting search results failed: {e}")))?;

        extract_scored_records(&batches)
    }

    /// Number of records in the table.
    pub async fn count(&self) -> Result<usize> {
        let table = self
            .db
            .open_table(&self.table)
            .execute()
            .await
            .map_err(|e| Error::Store(format!("open table failed: {e}")))?;

        table
            .count_rows(None)
            .await
            .map_err(|e| Error::Store(format!("count failed: {e}")))
    }
}

/// Build an Arrow RecordBatch from records and their embeddings.
fn build_record_batch(
    records: &[RecipeRecord],
    embeddings: &[Vec<f32>],
    dimensions: usize,
) -> Result<RecordBatch> {
    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    let headers: Vec<&str> = records.iter().map(|r| r.header.as_str()).collect();
    let categories: Vec<&str> = records.iter().map(|r| r.category_label()).collect();
    let ingredients: Vec<&str> = records.iter().map(|r| r.ingredients.as_str()).collect();
    let methods: Vec<&str> = records.iter().map(|r| r.method.as_str()).collect();
    let tips: Vec<Option<&str>> = records.iter().map(|r| r.tip.as_deref()).collect();
    let pages: Vec<i64> = records.iter().map(|r| r.position.page as i64).collect();
    let lines: Vec<i64> = records.iter().map(|r| r.position.line as i64).collect();

    let flat_values: Vec<f32> = embeddings.iter().flat_map(|e| e.iter().copied()).collect();
    let embedding_array: ArrayRef = Arc::new(
        FixedSizeListArray::try_new(
            Arc::new(Field::new("item", DataType::Float32, true)),
            dimensions as i32,
            Arc::new(Float32Array::from(flat_values)),
            None,
        )
        .map_err(|e| Error::Store(format!("failed to build embedding array: {e}")))?,
    );

    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("header", DataType::Utf8, false),
        Field::new("category", DataType::Utf8, false),
        Field::new("ingredients", DataType::Utf8, false),
        Field::new("method", DataType::Utf8, false),
        Field::new("tip", DataType::Utf8, true),
        Field::new("page", DataType::Int64, false),
        Field::new("line", DataType::Int64, false),
        Field::new(
            "embedding",
            DataType::FixedSizeList(
                Arc::new(Field::new("item", DataType::Float32, true)),
                dimensions as i32,
            ),
            false,
        ),
    ]));

    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(StringArray::from(headers)),
            Arc::new(StringArray::from(categories)),
            Arc::new(StringArray::from(ingredients)),
            Arc::new(StringArray::from(methods)),
            Arc::new(StringArray::from(tips)),
            Arc::new(Int64Array::from(pages)),
            Arc::new(Int64Array::from(lines)),
            embedding_array,
        ],
    )
    .map_err(|e| Error::Store(format!("failed to build record batch: {e}")))
}

/// Decode search result batches into scored records.
fn extract_scored_records(batches: &[RecordBatch]) -> Result<Vec<ScoredRecord>> {
    let mut results = Vec::new();

    for batch in batches {
        let schema = batch.schema();

        let ids = string_column(batch, &schema, "id")?;
        let headers = string_column(batch, &schema, "header")?;
        let categories = string_column(batch, &schema, "category")?;
        let ingredients = string_column(batch, &schema, "ingredients")?;
        let methods = string_column(batch, &schema, "method")?;
        let tips = string_column(batch, &schema, "tip")?;
        let pages = int_column(batch, &schema, "page")?;
        let lines = int_column(batch, &schema, "line")?;
        let distances = float_column(batch, &schema, "_distance").ok();

        for row in 0..batch.num_rows() {
            let distance = distances.map(|c| c.value(row)).unwrap_or(0.0);
            let score = (1.0_f32 - distance).max(0.0);

            let record = RecipeRecord {
                id: ids.value(row).to_string(),
                header: headers.value(row).to_string(),
                category: Category::parse(categories.value(row)),
                ingredients: ingredients.value(row).to_string(),
                method: methods.value(row).to_string(),
                tip: (!tips.is_null(row)).then(|| tips.value(row).to_string()),
                position: SourcePosition {
                    page: pages.value(row) as usize,
                    line: lines.value(row) as usize,
                },
            };

            results.push(ScoredRecord { record, score });
        }
    }

    Ok(results)
}

fn string_column<'a>(
    batch: &'a RecordBatch,
    schema: &arrow_schema::Schema,
    name: &str,
) -> Result<&'a StringArray> {
    column(batch, schema, name)
}

fn int_column<'a>(
    batch: &'a RecordBatch,
    schema: &arrow_schema::Schema,
    name: &str,
) -> Result<&'a Int64Array> {
    column(batch, schema, name)
}

fn float_column<'a>(
    batch: &'a RecordBatch,
    schema: &arrow_schema::Schema,
    name: &str,
) -> Result<&'a Float32Array> {
    column(batch, schema, name)
}

fn column<'a, T: 'static>(
    batch: &'a RecordBatch,
    schema: &arrow_schema::Schema,
    name: &str,
) -> Result<&'a T> {
    let idx = schema
        .index_of(name)
        .map_err(|_| Error::Store(format!("result batch missing column '{name}'")))?;
    batch
        .column(idx)
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| Error::Store(format!("unexpected type for column '{name}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(header: &str, category: Option<Category>, seq: usize) -> RecipeRecord {
        RecipeRecord {
            id: crate::model::record_id(header, seq),
            header: header.to_string(),
            category,
            ingredients: format!("ingredients for {header}"),
            method: "Cook.".to_string(),
            tip: (seq % 2 == 0).then(|| "A tip.".to_string()),
            position: SourcePosition {
                page: seq + 1,
                line: 1,
            },
        }
    }

    // Synthetic 4-dimensional vectors keep the round-trip tests independent
    // of the embedding model.
    fn axis(idx: usize) -> Vec<f32> {
        let mut v = vec![0.0; 4];
        v[idx] = 1.0;
        v
    }

    #[tokio::test]
    async fn test_replace_all_and_count() {
        let dir = tempdir().unwrap();
        let store = RecipeStore::connect(dir.path().to_str().unwrap(), "recipes")
            .await
            .unwrap();

        let records = vec![
            record("GREEK SALAD", Some(Category::StartersAndSalads), 0),
            record("BEEF BURGER", Some(Category::Burgers), 1),
        ];
        let embeddings = vec![axis(0), axis(1)];

        let uploaded = store.replace_all(&records, &embeddings, 4).await.unwrap();
        assert_eq!(uploaded, 2);
        assert_eq!(store.count().await.unwrap(), 2);

        // Replacing again does not accumulate rows
        store.replace_all(&records, &embeddings, 4).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_search_round_trip() {
        let dir = tempdir().unwrap();
        let store = RecipeStore::connect(dir.path().to_str().unwrap(), "recipes")
            .await
            .unwrap();

        let records = vec![
            record("GREEK SALAD", Some(Category::StartersAndSalads), 0),
            record("BEEF BURGER", Some(Category::Burgers), 1),
            record("PANCAKES", None, 2),
        ];
        let embeddings = vec![axis(0), axis(1), axis(2)];
        store.replace_all(&records, &embeddings, 4).await.unwrap();

        let results = store.search(&axis(1), 2, None).await.unwrap();
        assert!(!results.is_empty());
        assert_eq!(results[0].record.header, "BEEF BURGER");
        assert_eq!(results[0].record.category, Some(Category::Burgers));
        assert_eq!(results[0].record.tip, None);
        assert_eq!(results[0].record.position.page, 2);

        // Best match has the highest score
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn test_search_with_category_filter() {
        let dir = tempdir().unwrap();
        let store = RecipeStore::connect(dir.path().to_str().unwrap(), "recipes")
            .await
            .unwrap();

        let records = vec![
            record("GREEK SALAD", Some(Category::StartersAndSalads), 0),
            record("BEEF BURGER", Some(Category::Burgers), 1),
        ];
        let embeddings = vec![axis(0), axis(1)];
        store.replace_all(&records, &embeddings, 4).await.unwrap();

        // The nearest vector is the salad, but the filter excludes it.
        let results = store
            .search(&axis(0), 5, Some(Category::Burgers))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].record.header, "BEEF BURGER");
    }
}
