// Retrieval module
// Similarity search followed by per-passage relevance compression


use std::sync::Arc;
use tracing::debug;

use crate::Result;
use crate::database::RecipeStore;
use crate::generation::{Generator, prompts};
use crate::recipe::RetrievedPassage;

/// Number of passages fetched per conversational query
pub const RETRIEVAL_WIDTH: usize = 6;

/// Reduces a passage to the parts relevant to a question.
///
/// `Ok(None)` means nothing in the passage is relevant.
pub trait Compressor: Send + Sync {
    fn compress(&self, question: &str, passage: &str) -> Result<Option<String>>;
}

/// Compression by asking the generative model to extract relevant text verbatim
pub struct LlmCompressor {
    generator: Arc<dyn Generator>,
}

impl LlmCompressor {
    #[inline]
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }
}

impl Compressor for LlmCompressor {
    fn compress(&self, question: &str, passage: &str) -> Result<Option<String>> {
        let extracted = self
            .generator
            .complete(&prompts::compression_prompt(question, passage))?;
        let extracted = extracted.trim();

        if extracted.is_empty() || extracted == prompts::NO_OUTPUT {
            Ok(None)
        } else {
            Ok(Some(extracted.to_string()))
        }
    }
}

/// Store-backed retriever with compression
pub struct Retriever {
    store: Arc<RecipeStore>,
    compressor: Arc<dyn Compressor>,
    width: usize,
}

impl Retriever {
    #[inline]
    pub fn new(store: Arc<RecipeStore>, compressor: Arc<dyn Compressor>) -> Self {
        Self {
            store,
            compressor,
            width: RETRIEVAL_WIDTH,
        }
    }

    #[inline]
    pub fn store(&self) -> &Arc<RecipeStore> {
        &self.store
    }

    /// Retrieve and compress passages for `query`, keeping ranking order.
    ///
    /// Passages that compress to nothing are dropped; a compression failure
    /// fails the whole retrieval.
    #[inline]
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedPassage>> {
        let passages = self.store.similarity_search(query, self.width).await?;
        let fetched = passages.len();

        let mut kept = Vec::with_capacity(fetched);
        for mut passage in passages {
            match self.compressor.compress(query, &passage.content)? {
                Some(content) => {
                    passage.content = content;
                    kept.push(passage);
                }
                None => debug!("Dropped irrelevant passage {}", passage.id),
            }
        }

        debug!("Kept {} of {} retrieved passages", kept.len(), fetched);
        Ok(kept)
    }
}
