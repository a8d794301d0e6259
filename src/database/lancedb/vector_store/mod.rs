
use arrow::array::{Array, FixedSizeListArray, Float32Array, RecordBatchIterator, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use futures::TryStreamExt;
use itertools::Itertools;
use lancedb::{
    Connection, DistanceType, Table,
    query::{ExecutableQuery, QueryBase},
};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::database::{EmbeddingRecord, IndexHit, StoredDocument, VectorIndex};
use crate::{RecipeError, Result};

/// Vector database store using LanceDB for similarity search.
///
/// The table is created lazily on the first upsert, once the vector
/// dimension is known.
pub struct VectorStore {
    connection: Connection,
    table_name: String,
    vector_dimension: Mutex<Option<usize>>,
}

fn store_error(context: &str, e: impl std::fmt::Display) -> RecipeError {
    RecipeError::StoreUnavailable(format!("{context}: {e}"))
}

impl VectorStore {
    /// Open (or create) the LanceDB database at `db_path` and bind to `table_name`
    #[inline]
    pub async fn new(db_path: &Path, table_name: &str) -> Result<Self> {
        debug!("Initializing LanceDB at path: {:?}", db_path);

        std::fs::create_dir_all(db_path)
            .map_err(|e| store_error("Failed to create vector database directory", e))?;

        let uri = db_path.to_string_lossy().to_string();
        let connection = lancedb::connect(&uri)
            .execute()
            .await
            .map_err(|e| store_error("Failed to connect to LanceDB", e))?;

        let store = Self {
            connection,
            table_name: table_name.to_string(),
            vector_dimension: Mutex::new(None),
        };

        if let Some(table) = store.open_table().await? {
            let dim = Self::detect_vector_dimension(&table).await?;
            info!(
                "Opened existing table '{}' with vector dimension {}",
                store.table_name, dim
            );
            *store.vector_dimension.lock().await = Some(dim);
        }

        info!("Vector store initialized successfully");
        Ok(store)
    }

    #[inline]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn open_table(&self) -> Result<Option<Table>> {
        let table_names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| store_error("Failed to list tables", e))?;

        if !table_names.contains(&self.table_name) {
            return Ok(None);
        }

        self.connection
            .open_table(&self.table_name)
            .execute()
            .await
            .map(Some)
            .map_err(|e| store_error("Failed to open table", e))
    }

    async fn detect_vector_dimension(table: &Table) -> Result<usize> {
        let schema = table
            .schema()
            .await
            .map_err(|e| store_error("Failed to get table schema", e))?;

        schema
            .fields()
            .iter()
            .find(|field| field.name() == "vector")
            .and_then(|field| match field.data_type() {
                DataType::FixedSizeList(_, size) => usize::try_from(*size).ok(),
                _ => None,
            })
            .ok_or_else(|| {
                RecipeError::StoreUnavailable(
                    "Could not find vector column or determine dimension".to_string(),
                )
            })
    }

    fn create_schema(vector_dim: usize) -> Result<Arc<Schema>> {
        let dim = i32::try_from(vector_dim)
            .map_err(|_| RecipeError::InvalidDocument(format!("Vector too large: {vector_dim}")))?;

        Ok(Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new(
                "vector",
                DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim),
                false,
            ),
            Field::new("text", DataType::Utf8, false),
            Field::new("metadata", DataType::Utf8, false),
        ])))
    }

    /// Make sure a table with the given vector dimension exists, recreating it
    /// when the embedding model changed dimension
    async fn ensure_table(&self, vector_dim: usize) -> Result<Table> {
        let mut current = self.vector_dimension.lock().await;

        if let Some(existing) = *current {
            if existing != vector_dim {
                warn!(
                    "Vector dimension changed from {} to {}, recreating table",
                    existing, vector_dim
                );
                self.drop_table_if_exists().await?;
                *current = None;
            }
        }

        if let Some(table) = self.open_table().await? {
            *current = Some(vector_dim);
            return Ok(table);
        }

        info!(
            "Creating table '{}' with {} dimensions",
            self.table_name, vector_dim
        );
        let table = self
            .connection
            .create_empty_table(&self.table_name, Self::create_schema(vector_dim)?)
            .execute()
            .await
            .map_err(|e| store_error("Failed to create table", e))?;
        *current = Some(vector_dim);
        Ok(table)
    }

    fn create_record_batch(records: &[EmbeddingRecord], vector_dim: usize) -> Result<RecordBatch> {
        let mut flat_values = Vec::with_capacity(records.len() * vector_dim);
        for record in records {
            if record.vector.len() != vector_dim {
                return Err(RecipeError::InvalidDocument(format!(
                    "Embedding for {} has {} dimensions, expected {}",
                    record.id,
                    record.vector.len(),
                    vector_dim
                )));
            }
            flat_values.extend_from_slice(&record.vector);
        }

        let metadata: Vec<String> = records.iter().map(|r| r.metadata.to_string()).collect();
        let schema = Self::create_schema(vector_dim)?;
        let dim = i32::try_from(vector_dim)
            .map_err(|_| RecipeError::InvalidDocument(format!("Vector too large: {vector_dim}")))?;

        let field = Arc::new(Field::new("item", DataType::Float32, true));
        let vector_array =
            FixedSizeListArray::try_new(field, dim, Arc::new(Float32Array::from(flat_values)), None)
                .map_err(|e| store_error("Failed to create vector array", e))?;

        let arrays: Vec<Arc<dyn Array>> = vec![
            Arc::new(StringArray::from_iter_values(records.iter().map(|r| r.id.as_str()))),
            Arc::new(vector_array),
            Arc::new(StringArray::from_iter_values(records.iter().map(|r| r.text.as_str()))),
            Arc::new(StringArray::from_iter_values(metadata.iter().map(String::as_str))),
        ];

        RecordBatch::try_new(schema, arrays)
            .map_err(|e| store_error("Failed to create record batch", e))
    }

    fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
        batch
            .column_by_name(name)
            .ok_or_else(|| RecipeError::StoreUnavailable(format!("Missing {name} column")))?
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| RecipeError::StoreUnavailable(format!("Invalid {name} column type")))
    }

    /// Parse rows of a result batch; `_distance` is present only for vector queries
    fn parse_batch(batch: &RecordBatch) -> Result<Vec<IndexHit>> {
        let ids = Self::string_column(batch, "id")?;
        let texts = Self::string_column(batch, "text")?;
        let metadata = Self::string_column(batch, "metadata")?;
        let distances = batch
            .column_by_name("_distance")
            .and_then(|col| col.as_any().downcast_ref::<Float32Array>());

        let mut hits = Vec::with_capacity(batch.num_rows());
        for row in 0..batch.num_rows() {
            let metadata = serde_json::from_str(metadata.value(row)).unwrap_or_else(|e| {
                warn!("Unreadable metadata for {}: {}", ids.value(row), e);
                Value::Null
            });
            let distance = distances.map_or(0.0, |d| if d.is_null(row) { 0.0 } else { d.value(row) });

            hits.push(IndexHit {
                document: StoredDocument {
                    id: ids.value(row).to_string(),
                    text: texts.value(row).to_string(),
                    metadata,
                },
                distance,
            });
        }

        Ok(hits)
    }

    async fn collect_stream(
        mut results: lancedb::arrow::SendableRecordBatchStream,
    ) -> Result<Vec<IndexHit>> {
        let mut hits = Vec::new();
        while let Some(batch) = results
            .try_next()
            .await
            .map_err(|e| store_error("Failed to read result stream", e))?
        {
            hits.extend(Self::parse_batch(&batch)?);
        }
        Ok(hits)
    }

    async fn drop_table_if_exists(&self) -> Result<()> {
        let table_names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| store_error("Failed to list tables for drop", e))?;

        if table_names.contains(&self.table_name) {
            info!("Dropping table '{}'", self.table_name);
            self.connection
                .drop_table(&self.table_name)
                .await
                .map_err(|e| store_error("Failed to drop table", e))?;
        }

        Ok(())
    }
}

/// One record per id, the last occurrence winning
fn last_per_id(records: Vec<EmbeddingRecord>) -> Vec<EmbeddingRecord> {
    let mut unique: Vec<EmbeddingRecord> = records
        .into_iter()
        .rev()
        .unique_by(|r| r.id.clone())
        .collect();
    unique.reverse();
    unique
}

/// SQL string literal with single quotes escaped
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[async_trait]
impl VectorIndex for VectorStore {
    async fn upsert(&self, records: Vec<EmbeddingRecord>) -> Result<()> {
        let records = last_per_id(records);
        let Some(first) = records.first() else {
            debug!("No embeddings to store");
            return Ok(());
        };

        let vector_dim = first.vector.len();
        let batch = Self::create_record_batch(&records, vector_dim)?;
        let table = self.ensure_table(vector_dim).await?;

        let predicate = format!(
            "id IN ({})",
            records.iter().map(|r| quote(&r.id)).collect::<Vec<_>>().join(", ")
        );
        table
            .delete(&predicate)
            .await
            .map_err(|e| store_error("Failed to replace existing documents", e))?;

        let schema = batch.schema();
        let reader = RecordBatchIterator::new(std::iter::once(Ok(batch)), schema);
        table
            .add(reader)
            .execute()
            .await
            .map_err(|e| store_error("Failed to insert documents", e))?;

        debug!("Stored {} documents in '{}'", records.len(), self.table_name);
        Ok(())
    }

    async fn query(&self, vector: &[f32], limit: usize) -> Result<Vec<IndexHit>> {
        let Some(table) = self.open_table().await? else {
            return Ok(Vec::new());
        };

        let results = table
            .vector_search(vector)
            .map_err(|e| store_error("Failed to create vector search", e))?
            .column("vector")
            .distance_type(DistanceType::Cosine)
            .limit(limit)
            .execute()
            .await
            .map_err(|e| store_error("Failed to execute search", e))?;

        let mut hits = Self::collect_stream(results).await?;
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        Ok(hits)
    }

    async fn get_all(&self) -> Result<Vec<StoredDocument>> {
        let Some(table) = self.open_table().await? else {
            return Ok(Vec::new());
        };

        let total = table
            .count_rows(None)
            .await
            .map_err(|e| store_error("Failed to count rows", e))?;
        if total == 0 {
            return Ok(Vec::new());
        }

        let results = table
            .query()
            .limit(total)
            .execute()
            .await
            .map_err(|e| store_error("Failed to scan table", e))?;

        let mut documents: Vec<StoredDocument> = Self::collect_stream(results)
            .await?
            .into_iter()
            .map(|hit| hit.document)
            .collect();
        documents.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(documents)
    }

    async fn delete_all(&self) -> Result<()> {
        let mut current = self.vector_dimension.lock().await;
        self.drop_table_if_exists().await?;
        *current = None;
        info!("Cleared collection '{}'", self.table_name);
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        let Some(table) = self.open_table().await? else {
            return Ok(0);
        };

        table
            .count_rows(None)
            .await
            .map_err(|e| store_error("Failed to count rows", e))
    }
}
