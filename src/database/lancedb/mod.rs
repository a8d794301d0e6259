// LanceDB vector database module
// Persistent storage and similarity search for recipe embeddings

pub mod vector_store;

pub use vector_store::VectorStore;
