//! Deterministic capability stubs shared by unit tests.

use async_trait::async_trait;
use serde_json::json;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::database::{
    EmbeddingRecord, InMemoryIndex, IndexHit, RecipeStore, StoredDocument, VectorIndex,
};
use crate::embeddings::Embedder;
use crate::generation::Generator;
use crate::recipe::{RecipeDocument, RecipeMetadata, compose_recipe_text};
use crate::{RecipeError, Result};

const DIMENSIONS: usize = 512;

/// Bag-of-words embedder: each lowercase word bumps one hashed bucket
pub struct KeywordEmbedder;

impl Embedder for KeywordEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0; DIMENSIONS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            let bucket = usize::try_from(hasher.finish() % DIMENSIONS as u64).unwrap_or(0);
            vector[bucket] += 1.0;
        }
        Ok(vector)
    }
}

/// Generator that answers by prompt kind and records every prompt.
///
/// Compression prompts echo the passage back unchanged, description
/// prompts get a fixed blurb and everything else gets `answer`.
pub struct ScriptedGenerator {
    answer: String,
    fail_when: Option<&'static str>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            fail_when: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Fail any prompt containing `marker`
    pub fn failing_when(mut self, marker: &'static str) -> Self {
        self.fail_when = Some(marker);
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt log poisoned").clone()
    }
}

pub const DESCRIPTION_BLURB: &str = "A comforting dish worth making.";

impl Generator for ScriptedGenerator {
    fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts
            .lock()
            .expect("prompt log poisoned")
            .push(prompt.to_string());

        if self.fail_when.is_some_and(|marker| prompt.contains(marker)) {
            return Err(RecipeError::Generation("scripted failure".to_string()));
        }

        if prompt.contains("Extracted relevant parts:") {
            let passage = prompt
                .split(">>>\n")
                .nth(1)
                .and_then(|rest| rest.split("\n>>>").next())
                .unwrap_or_default();
            return Ok(passage.to_string());
        }
        if prompt.starts_with("Write a concise, engaging description") {
            return Ok(DESCRIPTION_BLURB.to_string());
        }
        Ok(self.answer.clone())
    }
}

/// Wraps an [`InMemoryIndex`] and counts similarity queries
#[derive(Default)]
pub struct CountingIndex {
    inner: InMemoryIndex,
    pub queries: AtomicUsize,
}

impl CountingIndex {
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VectorIndex for CountingIndex {
    async fn upsert(&self, records: Vec<EmbeddingRecord>) -> Result<()> {
        self.inner.upsert(records).await
    }

    async fn query(&self, vector: &[f32], limit: usize) -> Result<Vec<IndexHit>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.query(vector, limit).await
    }

    async fn get_all(&self) -> Result<Vec<StoredDocument>> {
        self.inner.get_all().await
    }

    async fn delete_all(&self) -> Result<()> {
        self.inner.delete_all().await
    }

    async fn count(&self) -> Result<usize> {
        self.inner.count().await
    }
}

/// Index whose every operation reports the store as unreachable
pub struct UnavailableIndex;

#[async_trait]
impl VectorIndex for UnavailableIndex {
    async fn upsert(&self, _records: Vec<EmbeddingRecord>) -> Result<()> {
        Err(RecipeError::StoreUnavailable("connection refused".to_string()))
    }

    async fn query(&self, _vector: &[f32], _limit: usize) -> Result<Vec<IndexHit>> {
        Err(RecipeError::StoreUnavailable("connection refused".to_string()))
    }

    async fn get_all(&self) -> Result<Vec<StoredDocument>> {
        Err(RecipeError::StoreUnavailable("connection refused".to_string()))
    }

    async fn delete_all(&self) -> Result<()> {
        Err(RecipeError::StoreUnavailable("connection refused".to_string()))
    }

    async fn count(&self) -> Result<usize> {
        Err(RecipeError::StoreUnavailable("connection refused".to_string()))
    }
}

pub fn store_over(index: Arc<dyn VectorIndex>) -> RecipeStore {
    RecipeStore::new(index, Arc::new(KeywordEmbedder), "recipes")
}

/// A recipe document with the given name, ingredients and instructions
pub fn recipe(id: &str, metadata: RecipeMetadata, ingredients: &str, instructions: &str) -> RecipeDocument {
    let text = compose_recipe_text(&metadata.name, ingredients, instructions, "Calories 300");
    RecipeDocument::new(id, text, metadata).expect("fixture recipe is valid")
}

/// Small corpus covering the filter dimensions
pub fn kitchen_corpus() -> Vec<RecipeDocument> {
    let metadata = |value: serde_json::Value| -> RecipeMetadata {
        serde_json::from_value(value).expect("fixture metadata is valid")
    };

    vec![
        recipe(
            "recipe_0",
            metadata(json!({
                "name": "Chicken Fried Rice",
                "rating": 4.6,
                "cuisine": "Chinese",
                "category": "Main Dishes",
                "difficulty": "Easy",
                "total_time_minutes": 25,
                "servings": 4,
                "diet": "non-vegetarian",
                "meal_tags": ["dinner", "main"],
                "main_ingredients": ["chicken", "rice", "eggs"],
                "image_url": "https://img.example/rice.jpg",
                "source": "test-feed"
            })),
            "• 2 cups cooked rice\n• 1 chicken breast\n• 2 eggs",
            "Fry the chicken in a hot wok. Add the rice and eggs and stir fry until golden.",
        ),
        recipe(
            "recipe_1",
            metadata(json!({
                "name": "Apple Pie",
                "rating": 4.5,
                "servings": 4,
                "category": "Desserts",
                "diet": "vegetarian",
                "meal_tags": ["dessert"],
                "source": "test-feed"
            })),
            "• 6 apples\n• 1 pie crust\n• 1 cup sugar",
            "Slice the apples and toss with sugar. Fill the crust and bake until bubbling.",
        ),
        recipe(
            "recipe_2",
            metadata(json!({
                "name": "Slow Beef Stew",
                "rating": 4.8,
                "cuisine": "American",
                "total_time_minutes": 180,
                "servings": 6,
                "diet": "non-vegetarian",
                "meal_tags": ["dinner", "main"],
                "source": "test-feed"
            })),
            "• 2 pounds beef chuck\n• 4 carrots\n• 3 potatoes",
            "Brown the beef, add vegetables and simmer for three hours. This stew serves 6 hungry people.",
        ),
        recipe(
            "recipe_3",
            metadata(json!({
                "name": "Veggie Rice Bowl",
                "cuisine": "Asian",
                "total_time_minutes": 20,
                "diet": "vegetarian",
                "meal_tags": ["lunch", "main"],
                "source": "test-feed"
            })),
            "• 1 cup rice\n• 1 avocado\n• 1 cup edamame",
            "Cook the rice and top with sliced avocado and edamame. Serves 2 as a light lunch.",
        ),
    ]
}

/// Store over a counting in-memory index, pre-loaded with [`kitchen_corpus`]
pub async fn seeded_store() -> (Arc<RecipeStore>, Arc<CountingIndex>) {
    let index = Arc::new(CountingIndex::default());
    let store = store_over(Arc::clone(&index) as Arc<dyn VectorIndex>);
    store
        .upsert_documents(&kitchen_corpus())
        .await
        .expect("seeding should succeed");
    (Arc::new(store), index)
}
