//! Recipe-level adapter over a [`VectorIndex`].
//!
//! Embeds document text through the [`Embedder`] capability and turns raw
//! index hits into ranked [`RetrievedPassage`]s.


use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::Result;
use crate::database::{EmbeddingRecord, VectorIndex};
use crate::embeddings::Embedder;
use crate::recipe::{RecipeDocument, RecipeMetadata, RetrievedPassage};

/// Collection totals reported by [`RecipeStore::stats`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionStats {
    pub collection: String,
    pub total_recipes: usize,
    /// Sorted union of the metadata keys present across all documents
    pub fields: Vec<String>,
}

/// Owns one named recipe collection
pub struct RecipeStore {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn Embedder>,
    collection: String,
}

impl RecipeStore {
    #[inline]
    pub fn new(
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn Embedder>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            index,
            embedder,
            collection: collection.into(),
        }
    }

    #[inline]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Store or overwrite a single document
    ///
    /// # Errors
    /// [`crate::RecipeError::InvalidDocument`] for an empty id or text,
    /// [`crate::RecipeError::StoreUnavailable`] when the index cannot be written.
    #[inline]
    pub async fn upsert(&self, id: &str, text: &str, metadata: RecipeMetadata) -> Result<()> {
        let document = RecipeDocument::new(id, text, metadata)?;
        self.upsert_documents(&[document]).await
    }

    /// Embed and store a batch of validated documents in one index write
    #[inline]
    pub async fn upsert_documents(&self, documents: &[RecipeDocument]) -> Result<()> {
        if documents.is_empty() {
            return Ok(());
        }

        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts)?;
        if vectors.len() != documents.len() {
            return Err(crate::RecipeError::Embedding(format!(
                "Expected {} embeddings, got {}",
                documents.len(),
                vectors.len()
            )));
        }

        let records = documents
            .iter()
            .zip(vectors)
            .map(|(document, vector)| {
                Ok(EmbeddingRecord {
                    id: document.id.clone(),
                    vector,
                    text: document.text.clone(),
                    metadata: document.metadata.to_value()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        self.index.upsert(records).await?;
        debug!(
            "Upserted {} documents into '{}'",
            documents.len(),
            self.collection
        );
        Ok(())
    }

    /// Up to `k` passages closest to `query`, ranked from 1
    #[inline]
    pub async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<RetrievedPassage>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let vector = self.embedder.embed(query)?;
        let hits = self.index.query(&vector, k).await?;
        debug!("Similarity search returned {} hits for {:?}", hits.len(), query);

        Ok(hits
            .into_iter()
            .take(k)
            .enumerate()
            .map(|(i, hit)| RetrievedPassage {
                id: hit.document.id,
                content: hit.document.text,
                metadata: hit.document.metadata,
                distance: hit.distance,
                rank: i + 1,
            })
            .collect())
    }

    /// Document count and metadata field names, from a full collection scan
    #[inline]
    pub async fn stats(&self) -> Result<CollectionStats> {
        let documents = self.index.get_all().await?;

        let fields: BTreeSet<String> = documents
            .iter()
            .filter_map(|d| d.metadata.as_object())
            .flat_map(|object| object.keys().cloned())
            .collect();

        Ok(CollectionStats {
            collection: self.collection.clone(),
            total_recipes: documents.len(),
            fields: fields.into_iter().collect(),
        })
    }

    /// Values of one metadata field across the collection, with their counts
    #[inline]
    pub async fn field_values(&self, field: &str) -> Result<Vec<(String, usize)>> {
        let documents = self.index.get_all().await?;
        let mut counts = std::collections::BTreeMap::<String, usize>::new();

        for value in documents.iter().filter_map(|d| d.metadata.get(field)) {
            match value {
                Value::String(s) if !s.trim().is_empty() => *counts.entry(s.clone()).or_default() += 1,
                Value::Array(items) => {
                    for s in items.iter().filter_map(Value::as_str) {
                        *counts.entry(s.to_string()).or_default() += 1;
                    }
                }
                _ => {}
            }
        }

        Ok(counts.into_iter().collect())
    }

    #[inline]
    pub async fn count(&self) -> Result<usize> {
        self.index.count().await
    }

    /// Remove every document in the collection
    #[inline]
    pub async fn delete_all(&self) -> Result<()> {
        self.index.delete_all().await?;
        info!("Deleted all documents from '{}'", self.collection);
        Ok(())
    }
}
