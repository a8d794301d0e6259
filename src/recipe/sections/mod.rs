#[cfg(test)]
mod tests;

use std::sync::LazyLock;

use fancy_regex::Regex;

use super::{INGREDIENTS_HEADER, INSTRUCTIONS_HEADER, NUTRITION_HEADER};

const DESCRIPTION_WORDS: usize = 20;

static SERVES_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\bserves\s+(\S+)").ok());

/// Sections of a stored recipe text, split on blank lines and recognised
/// by their literal headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeSections {
    pub ingredients: Option<String>,
    pub instructions: Option<String>,
    pub nutrition: Option<String>,
}

impl RecipeSections {
    #[inline]
    pub fn parse(text: &str) -> Self {
        let mut sections = Self::default();

        for block in text.split("\n\n") {
            let block = block.trim_start();
            if let Some(rest) = block.strip_prefix(INGREDIENTS_HEADER) {
                sections.ingredients = Some(rest.trim().to_string());
            } else if let Some(rest) = block.strip_prefix(INSTRUCTIONS_HEADER) {
                sections.instructions = Some(rest.trim().to_string());
            } else if let Some(rest) = block.strip_prefix(NUTRITION_HEADER) {
                sections.nutrition = Some(rest.trim().to_string());
            }
        }

        sections
    }

    /// First twenty words of the instructions followed by an ellipsis
    #[inline]
    pub fn description(&self) -> Option<String> {
        let instructions = self.instructions.as_deref()?;
        let words: Vec<&str> = instructions
            .split_whitespace()
            .take(DESCRIPTION_WORDS)
            .collect();
        Some(format!("{}...", words.join(" ")))
    }

    /// Raw token following a "serves" phrase in the instructions, e.g. "4" or "6-8"
    #[inline]
    pub fn servings_phrase(&self) -> Option<String> {
        let instructions = self.instructions.as_deref()?;
        let pattern = SERVES_PATTERN.as_ref()?;
        let captures = pattern.captures(instructions).ok()??;
        captures.get(1).map(|m| m.as_str().to_string())
    }
}
