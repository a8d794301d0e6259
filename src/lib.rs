//! Conversational recipe assistant over a local vector store.
//!
//! Recipe feeds are ingested into a LanceDB collection ([`database`]),
//! answered conversationally with retrieval and a sliding memory window
//! ([`assistant`], [`memory`]) and searched with structured filters
//! ([`search`]). [`chatbot::RecipeChatbot`] wires these together.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecipeError>;

/// Errors surfaced by the library.
///
/// Answer and search paths degrade to fallback responses rather than
/// returning these; they reach callers from ingestion, configuration
/// and direct store access.
#[derive(Error, Debug)]
pub enum RecipeError {
    /// Invalid configuration or a missing credential
    #[error("Configuration error: {0}")]
    Config(String),

    /// The vector index could not be reached or failed an operation
    #[error("Recipe store unavailable: {0}")]
    StoreUnavailable(String),

    /// A feed record or document with no usable content
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Stored metadata that cannot be read back
    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<config::ConfigError> for RecipeError {
    #[inline]
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

pub mod assistant;
pub mod chatbot;
pub mod commands;
pub mod config;
pub mod database;
pub mod embeddings;
pub mod generation;
pub mod ingest;
pub mod memory;
pub mod recipe;
pub mod retrieval;
pub mod search;

#[cfg(test)]
pub(crate) mod testing;
