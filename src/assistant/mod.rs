//! Conversational answer pipeline.
//!
//! [`RecipeAssistant`] is stateless and can serve any number of
//! [`ChatSession`]s; each session owns its memory window. An answer moves
//! through the [`Stage`]s in order and either ends in [`Stage::Success`] or
//! drops to [`Stage::Failed`], which turns into an apologetic response.

#[cfg(test)]
mod tests;

pub mod extract;
pub mod format;
pub mod query;
pub mod suggestions;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::Result;
use crate::generation::{Generator, RecipeDescriber, prompts};
use crate::memory::MemoryWindow;
use crate::recipe::{RecipeInfo, RetrievedPassage};
use crate::retrieval::Retriever;

pub use extract::{SourceRef, collect_sources, extract_recipes};
pub use format::format_answer;
pub use query::enhance_query;
pub use suggestions::follow_up_suggestions;

pub const GREETING: &str = "Hello! I'm your recipe assistant. Ask me about recipes, cooking tips, or tell me what ingredients you have and I'll suggest some delicious dishes you can make!";

pub const APOLOGY: &str = "I'm sorry, I encountered an issue while searching for recipes. Please try rephrasing your question or ask about a specific dish or ingredient.";

/// Pipeline stages, in the order an answer passes through them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    EmptyInput,
    GreetingResponse,
    Enhancing,
    Retrieving,
    Extracting,
    Formatting,
    Success,
    Failed,
    ErrorResponse,
}

impl fmt::Display for Stage {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::EmptyInput => "EMPTY_INPUT",
            Self::GreetingResponse => "GREETING_RESPONSE",
            Self::Enhancing => "ENHANCING",
            Self::Retrieving => "RETRIEVING",
            Self::Extracting => "EXTRACTING",
            Self::Formatting => "FORMATTING",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::ErrorResponse => "ERROR_RESPONSE",
        };
        f.write_str(name)
    }
}

/// Everything returned for one user input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatResponse {
    pub answer: String,
    pub sources: Vec<SourceRef>,
    pub recipes: Vec<RecipeInfo>,
    pub suggestions: Vec<String>,
    pub error: Option<String>,
    /// Terminal stage the pipeline reached
    #[serde(skip)]
    pub stage: Stage,
}

impl ChatResponse {
    /// Canned reply for empty input
    #[inline]
    pub fn greeting() -> Self {
        Self {
            answer: GREETING.to_string(),
            sources: Vec::new(),
            recipes: Vec::new(),
            suggestions: suggestions::to_owned(&suggestions::GREETING_SUGGESTIONS),
            error: None,
            stage: Stage::GreetingResponse,
        }
    }

    #[inline]
    pub fn failure(detail: String) -> Self {
        Self {
            answer: APOLOGY.to_string(),
            sources: Vec::new(),
            recipes: Vec::new(),
            suggestions: suggestions::to_owned(&suggestions::ERROR_SUGGESTIONS),
            error: Some(detail),
            stage: Stage::ErrorResponse,
        }
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// One conversation: an id and the memory window it owns
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    pub memory: MemoryWindow,
}

impl Default for ChatSession {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    #[inline]
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            memory: MemoryWindow::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[inline]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

/// Retrieval-augmented answer pipeline
pub struct RecipeAssistant {
    retriever: Retriever,
    generator: Arc<dyn Generator>,
    describer: Arc<dyn RecipeDescriber>,
}

/// Output of a successful pipeline run, before it is recorded in memory
struct Composed {
    response: ChatResponse,
    raw_answer: String,
}

impl RecipeAssistant {
    #[inline]
    pub fn new(
        retriever: Retriever,
        generator: Arc<dyn Generator>,
        describer: Arc<dyn RecipeDescriber>,
    ) -> Self {
        Self {
            retriever,
            generator,
            describer,
        }
    }

    #[inline]
    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Answer `input` within `session`. Never fails: errors become an
    /// apologetic response carrying the error detail.
    #[inline]
    pub async fn answer(&self, session: &mut ChatSession, input: &str) -> ChatResponse {
        let input = input.trim();
        if input.is_empty() {
            debug!("Stage {} -> {}", Stage::EmptyInput, Stage::GreetingResponse);
            return ChatResponse::greeting();
        }

        let mut stage = Stage::Enhancing;
        match self.compose(&session.memory, input, &mut stage).await {
            Ok(Composed {
                response,
                raw_answer,
            }) => {
                session.memory.record(input, raw_answer);
                info!(
                    "Answered in session {} with {} recipes",
                    session.id,
                    response.recipes.len()
                );
                response
            }
            Err(e) => {
                error!("Stage {} failed in session {}: {}", stage, session.id, e);
                debug!("Stage {} -> {}", Stage::Failed, Stage::ErrorResponse);
                ChatResponse::failure(e.to_string())
            }
        }
    }

    async fn compose(&self, memory: &MemoryWindow, input: &str, stage: &mut Stage) -> Result<Composed> {
        debug!("Stage {}", stage);
        let query = enhance_query(input);

        advance(stage, Stage::Retrieving);
        let passages = self.retriever.retrieve(&query).await?;
        let raw_answer = self.generate_answer(memory, &query, &passages)?;

        advance(stage, Stage::Extracting);
        let recipes = extract_recipes(&passages);
        let sources = collect_sources(&passages);
        let suggestions = follow_up_suggestions(input, &recipes);

        advance(stage, Stage::Formatting);
        let answer = format_answer(&raw_answer, &recipes, self.describer.as_ref());

        advance(stage, Stage::Success);
        Ok(Composed {
            response: ChatResponse {
                answer,
                sources,
                recipes,
                suggestions,
                error: None,
                stage: Stage::Success,
            },
            raw_answer,
        })
    }

    fn generate_answer(
        &self,
        memory: &MemoryWindow,
        query: &str,
        passages: &[RetrievedPassage],
    ) -> Result<String> {
        let context = passages
            .iter()
            .map(|p| p.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let prompt = prompts::answer_prompt(&context, &memory.render(), query);
        Ok(self.generator.complete(&prompt)?.trim().to_string())
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    debug!("Stage {} -> {}", stage, next);
    *stage = next;
}
