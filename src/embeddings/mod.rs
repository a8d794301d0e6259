// Embeddings module
// The embedding capability and its Ollama backend

pub mod ollama;

use crate::Result;

pub use ollama::OllamaClient;

/// Turns text into vectors for similarity comparison
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed several texts, preserving input order
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}
