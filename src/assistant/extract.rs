//! Recipe and source extraction from retrieved passages.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

use crate::recipe::{RecipeInfo, RetrievedPassage};

/// Passages considered when building recipe info
pub const MAX_EXTRACTED_PASSAGES: usize = 6;
/// Sources attached to one response
pub const MAX_SOURCES: usize = 5;
/// Characters of passage content shown in a source preview
pub const PREVIEW_CHARS: usize = 150;

/// Attribution for one passage used in an answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub source: String,
    pub recipe_name: String,
    pub content_preview: String,
}

/// Structured recipes from the leading passages, first occurrence of each name wins
#[inline]
pub fn extract_recipes(passages: &[RetrievedPassage]) -> Vec<RecipeInfo> {
    let mut seen = HashSet::new();
    let mut recipes = Vec::new();

    for passage in passages.iter().take(MAX_EXTRACTED_PASSAGES) {
        let name = passage.recipe_name();
        if seen.contains(&name) {
            continue;
        }

        match RecipeInfo::from_passage(passage) {
            Ok(info) => {
                seen.insert(name);
                recipes.push(info);
            }
            Err(e) => warn!("Skipping passage {}: {}", passage.id, e),
        }
    }

    recipes
}

/// Unique sources keyed by source id and recipe name, capped
#[inline]
pub fn collect_sources(passages: &[RetrievedPassage]) -> Vec<SourceRef> {
    let mut seen = HashSet::new();

    passages
        .iter()
        .filter_map(|passage| {
            let source = passage.source();
            let recipe_name = passage.recipe_name();
            seen.insert((source.clone(), recipe_name.clone()))
                .then(|| SourceRef {
                    source,
                    recipe_name,
                    content_preview: preview(&passage.content),
                })
        })
        .take(MAX_SOURCES)
        .collect()
}

/// At most [`PREVIEW_CHARS`] characters, with an ellipsis when cut
#[inline]
pub fn preview(content: &str) -> String {
    if content.chars().count() > PREVIEW_CHARS {
        let cut: String = content.chars().take(PREVIEW_CHARS).collect();
        format!("{cut}...")
    } else {
        content.to_string()
    }
}
