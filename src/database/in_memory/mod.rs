
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;
use tracing::debug;

use crate::database::{EmbeddingRecord, IndexHit, StoredDocument, VectorIndex};
use crate::{RecipeError, Result};

/// Brute-force vector index held in process memory.
///
/// Distances are cosine distances, matching the persistent store.
#[derive(Debug, Default)]
pub struct InMemoryIndex {
    records: RwLock<BTreeMap<String, EmbeddingRecord>>,
}

impl InMemoryIndex {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> RecipeError {
    RecipeError::StoreUnavailable("In-memory index lock poisoned".to_string())
}

/// `1 - cosine similarity`; zero vectors are maximally distant
#[inline]
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn upsert(&self, records: Vec<EmbeddingRecord>) -> Result<()> {
        let mut stored = self.records.write().map_err(|_| poisoned())?;
        for record in records {
            stored.insert(record.id.clone(), record);
        }
        debug!("In-memory index now holds {} documents", stored.len());
        Ok(())
    }

    async fn query(&self, vector: &[f32], limit: usize) -> Result<Vec<IndexHit>> {
        let stored = self.records.read().map_err(|_| poisoned())?;

        let mut hits: Vec<IndexHit> = stored
            .values()
            .map(|record| IndexHit {
                document: StoredDocument {
                    id: record.id.clone(),
                    text: record.text.clone(),
                    metadata: record.metadata.clone(),
                },
                distance: cosine_distance(vector, &record.vector),
            })
            .collect();

        // Stable sort keeps id order for equal distances
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn get_all(&self) -> Result<Vec<StoredDocument>> {
        let stored = self.records.read().map_err(|_| poisoned())?;
        Ok(stored
            .values()
            .map(|record| StoredDocument {
                id: record.id.clone(),
                text: record.text.clone(),
                metadata: record.metadata.clone(),
            })
            .collect())
    }

    async fn delete_all(&self) -> Result<()> {
        self.records.write().map_err(|_| poisoned())?.clear();
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.read().map_err(|_| poisoned())?.len())
    }
}
