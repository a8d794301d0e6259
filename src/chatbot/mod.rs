// Chatbot module
// Host-owned facade wiring the store, answer pipeline and filtered search together


use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::assistant::{ChatResponse, ChatSession, RecipeAssistant};
use crate::config::Config;
use crate::database::{CollectionStats, RecipeStore, VectorStore};
use crate::embeddings::OllamaClient;
use crate::generation::{Generator, LlmDescriber};
use crate::recipe::RecipeInfo;
use crate::retrieval::{LlmCompressor, Retriever};
use crate::search::{DEFAULT_COOKING_TIME_LIMIT, FilterOptions, RecipeCard, RecipeSearch};
use crate::{RecipeError, Result};

/// Recipes proposed for a list of available ingredients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientSuggestions {
    pub recipes: Vec<RecipeInfo>,
    pub answer: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ComponentHealth {
    Healthy,
    Unavailable(String),
    NotConfigured,
}

impl ComponentHealth {
    #[inline]
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub backend: ComponentHealth,
    pub store: ComponentHealth,
    pub recipe_count: Option<usize>,
}

/// One conversational assistant instance with its own session.
///
/// Not meant to be shared between concurrent callers; construct one per
/// conversation and hand out `&mut` access.
pub struct RecipeChatbot {
    assistant: RecipeAssistant,
    search: RecipeSearch,
    store: Arc<RecipeStore>,
    session: ChatSession,
    backend: Option<Arc<OllamaClient>>,
}

impl RecipeChatbot {
    /// Wire a chatbot around an existing store, using `generator` for answers,
    /// passage compression and recipe descriptions
    #[inline]
    pub fn new(store: Arc<RecipeStore>, generator: Arc<dyn Generator>) -> Self {
        let retriever = Retriever::new(
            Arc::clone(&store),
            Arc::new(LlmCompressor::new(Arc::clone(&generator))),
        );
        let describer = Arc::new(LlmDescriber::new(Arc::clone(&generator)));

        Self {
            assistant: RecipeAssistant::new(retriever, generator, describer),
            search: RecipeSearch::new(Arc::clone(&store)),
            store,
            session: ChatSession::new(),
            backend: None,
        }
    }

    /// Build the Ollama backend and the LanceDB collection named in `config`.
    ///
    /// # Errors
    /// [`RecipeError::Config`] for an invalid configuration or a missing
    /// credential, [`RecipeError::StoreUnavailable`] when the vector database
    /// cannot be opened.
    #[inline]
    pub async fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let api_key = config.ollama.resolve_api_key()?;

        let client = OllamaClient::new(config)
            .map_err(|e| RecipeError::Config(format!("{e:#}")))?
            .with_api_key(api_key);
        let client = Arc::new(client);

        let index = VectorStore::new(&config.vector_database_path(), &config.store.collection).await?;
        let store = Arc::new(RecipeStore::new(
            Arc::new(index),
            Arc::clone(&client) as _,
            config.store.collection.clone(),
        ));

        info!(
            "Recipe chatbot ready on collection '{}'",
            config.store.collection
        );

        let mut chatbot = Self::new(store, Arc::clone(&client) as _);
        chatbot.backend = Some(client);
        Ok(chatbot)
    }

    #[inline]
    pub fn store(&self) -> &Arc<RecipeStore> {
        &self.store
    }

    #[inline]
    pub fn session_id(&self) -> Uuid {
        self.session.id()
    }

    /// Answer one user input, remembering the exchange on success
    #[inline]
    pub async fn answer(&mut self, input: &str) -> ChatResponse {
        self.assistant.answer(&mut self.session, input).await
    }

    /// Filtered search; `cooking_time` defaults to 30 minutes
    #[inline]
    pub async fn search(&self, query: &str, filters: &[String], cooking_time: Option<u32>) -> Vec<RecipeCard> {
        self.search
            .search_tags(
                query,
                filters,
                cooking_time.unwrap_or(DEFAULT_COOKING_TIME_LIMIT),
            )
            .await
    }

    /// Forget the conversation so far. Returns whether memory is now empty.
    #[inline]
    pub fn clear_memory(&mut self) -> bool {
        self.session.memory.clear();
        info!("Memory cleared for session {}", self.session.id());
        self.session.memory.is_empty()
    }

    #[inline]
    pub fn memory_summary(&self) -> Vec<String> {
        self.session.memory.summary()
    }

    #[inline]
    pub async fn collection_stats(&self) -> Result<CollectionStats> {
        self.store.stats().await
    }

    /// Ask for recipes using `ingredients`. Returns `None` when no
    /// non-blank ingredient is given.
    #[inline]
    pub async fn suggest_by_ingredients<S: AsRef<str>>(
        &mut self,
        ingredients: &[S],
    ) -> Option<IngredientSuggestions> {
        let ingredients: Vec<&str> = ingredients
            .iter()
            .map(|i| i.as_ref().trim())
            .filter(|i| !i.is_empty())
            .collect();
        if ingredients.is_empty() {
            return None;
        }

        let query = format!("recipes with {}", ingredients.join(", "));
        let response = self.answer(&query).await;
        if let Some(error) = &response.error {
            warn!("Ingredient suggestion failed: {}", error);
        }

        Some(IngredientSuggestions {
            count: response.recipes.len(),
            recipes: response.recipes,
            answer: response.answer,
        })
    }

    #[inline]
    pub async fn filter_options(&self) -> FilterOptions {
        FilterOptions::for_store(&self.store).await
    }

    /// Probe the model server (when one is configured) and the store
    #[inline]
    pub async fn health(&self) -> HealthReport {
        let backend = match &self.backend {
            Some(client) => match client.health_check() {
                Ok(()) => ComponentHealth::Healthy,
                Err(e) => ComponentHealth::Unavailable(format!("{e:#}")),
            },
            None => ComponentHealth::NotConfigured,
        };

        let (store, recipe_count) = match self.store.count().await {
            Ok(count) => (ComponentHealth::Healthy, Some(count)),
            Err(e) => (ComponentHealth::Unavailable(e.to_string()), None),
        };

        HealthReport {
            backend,
            store,
            recipe_count,
        }
    }
}
