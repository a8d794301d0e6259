// Generation module
// The generative capability, prompt templates and per-recipe descriptions

#[cfg(test)]
mod tests;

pub mod prompts;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::Result;
use crate::recipe::RecipeInfo;

/// Given a prompt, return text
pub trait Generator: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// Produces the short description shown next to each recipe in a formatted answer
pub trait RecipeDescriber: Send + Sync {
    fn describe(&self, recipe: &RecipeInfo) -> Result<String>;
}

const MAX_DESCRIPTION_WORDS: usize = 200;

/// Describes recipes by prompting the generative model
pub struct LlmDescriber {
    generator: Arc<dyn Generator>,
}

impl LlmDescriber {
    #[inline]
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }
}

impl RecipeDescriber for LlmDescriber {
    fn describe(&self, recipe: &RecipeInfo) -> Result<String> {
        debug!("Generating description for {}", recipe.name);
        let prompt = prompts::description_prompt(recipe);
        let description = self.generator.complete(&prompt)?;
        Ok(clamp_words(description.trim(), MAX_DESCRIPTION_WORDS))
    }
}

/// Describe a recipe, falling back to a templated line when generation fails
#[inline]
pub fn describe_or_fallback(describer: &dyn RecipeDescriber, recipe: &RecipeInfo) -> String {
    match describer.describe(recipe) {
        Ok(description) if !description.trim().is_empty() => description,
        Ok(_) => fallback_description(recipe),
        Err(e) => {
            warn!("Error generating description for {}: {}", recipe.name, e);
            fallback_description(recipe)
        }
    }
}

/// One-line description built only from the recipe's own metadata
#[inline]
pub fn fallback_description(recipe: &RecipeInfo) -> String {
    format!(
        "A {} {} recipe with {} difficulty.",
        recipe.cuisine,
        recipe.category.to_lowercase(),
        recipe.difficulty.to_lowercase()
    )
}

fn clamp_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        text.to_string()
    } else {
        format!("{}...", words[..max_words].join(" "))
    }
}
