// Database module
// Vector index capability (LanceDB or in-memory) and the recipe store adapter on top of it

pub mod in_memory;
pub mod lancedb;
pub mod store;

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;

pub use self::lancedb::VectorStore;
pub use in_memory::InMemoryIndex;
pub use store::{CollectionStats, RecipeStore};

/// A document with its embedding, ready to be written to an index
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingRecord {
    pub id: String,
    pub vector: Vec<f32>,
    pub text: String,
    /// Recipe metadata as stored, kept as raw JSON so one malformed row
    /// cannot fail a whole query
    pub metadata: Value,
}

/// A stored document without its vector
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub text: String,
    pub metadata: Value,
}

/// Result of a nearest-neighbour query
#[derive(Debug, Clone, PartialEq)]
pub struct IndexHit {
    pub document: StoredDocument,
    pub distance: f32,
}

/// Persistent vector index keyed by document id.
///
/// Implementations are not required to make `upsert` and `delete_all`
/// atomic across concurrent writers.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert records, replacing any existing record with the same id
    async fn upsert(&self, records: Vec<EmbeddingRecord>) -> Result<()>;

    /// Up to `limit` nearest documents, closest first
    async fn query(&self, vector: &[f32], limit: usize) -> Result<Vec<IndexHit>>;

    async fn get_all(&self) -> Result<Vec<StoredDocument>>;

    /// Remove every document; succeeds on an empty index
    async fn delete_all(&self) -> Result<()>;

    async fn count(&self) -> Result<usize>;
}
