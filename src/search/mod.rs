// Search module
// Non-conversational path: similarity search narrowed by structured filters


pub mod filters;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::database::RecipeStore;
use crate::recipe::{
    Diet, NOT_RATED, RecipeMetadata, RecipeSections, RetrievedPassage, UNKNOWN_RECIPE,
};

pub use filters::{
    Candidate, DEFAULT_COOKING_TIME_LIMIT, FilterError, FilterSpec, MEAL_TIME_TAGS,
    MEAL_TYPE_TAGS, ServingsBucket,
};

/// Candidates fetched before filtering
pub const SEARCH_WIDTH: usize = 20;
/// Cards returned after filtering
pub const MAX_RESULTS: usize = 10;

const UNKNOWN_SERVINGS: &str = "N/A";
const UNCLASSIFIED: &str = "Unclassified";

/// Compact result shown for each recipe in a filtered search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeCard {
    pub name: String,
    pub image: String,
    pub rating: String,
    /// Dietary classification label, e.g. "Vegetarian"
    #[serde(rename = "type")]
    pub kind: String,
    pub servings: String,
    pub description: String,
}

impl RecipeCard {
    fn build(metadata: &RecipeMetadata, sections: &RecipeSections) -> Self {
        let servings = filters::servings_of(&Candidate { metadata, sections })
            .map_or_else(|_| UNKNOWN_SERVINGS.to_string(), |n| n.to_string());

        Self {
            name: if metadata.name.trim().is_empty() {
                UNKNOWN_RECIPE.to_string()
            } else {
                metadata.name.clone()
            },
            image: metadata.image_url.clone().unwrap_or_default(),
            rating: metadata
                .rating
                .map_or_else(|| NOT_RATED.to_string(), |r| r.to_string()),
            kind: metadata
                .diet
                .map_or(UNCLASSIFIED, Diet::label)
                .to_string(),
            servings,
            description: sections.description().unwrap_or_default(),
        }
    }
}

/// Filtered recipe search over the shared store
pub struct RecipeSearch {
    store: Arc<RecipeStore>,
}

impl RecipeSearch {
    #[inline]
    pub fn new(store: Arc<RecipeStore>) -> Self {
        Self { store }
    }

    /// Search with filter tags as sent by a client
    #[inline]
    pub async fn search_tags<S: AsRef<str>>(
        &self,
        query: &str,
        tags: &[S],
        cooking_time_limit: u32,
    ) -> Vec<RecipeCard> {
        self.search(query, &FilterSpec::from_tags(tags), cooking_time_limit)
            .await
    }

    /// Up to ten recipe cards matching `query` and every filter, in ranking
    /// order. Never fails: store errors are logged and yield no results.
    #[inline]
    pub async fn search(&self, query: &str, spec: &FilterSpec, cooking_time_limit: u32) -> Vec<RecipeCard> {
        let passages = match self.store.similarity_search(query, SEARCH_WIDTH).await {
            Ok(passages) => passages,
            Err(e) => {
                error!("Error in recipe search: {}", e);
                return Vec::new();
            }
        };

        let cards: Vec<RecipeCard> = passages
            .iter()
            .filter_map(|passage| Self::card_if_accepted(passage, spec, cooking_time_limit))
            .take(MAX_RESULTS)
            .collect();

        debug!(
            "Search for {:?} kept {} of {} candidates",
            query,
            cards.len(),
            passages.len()
        );
        cards
    }

    fn card_if_accepted(
        passage: &RetrievedPassage,
        spec: &FilterSpec,
        cooking_time_limit: u32,
    ) -> Option<RecipeCard> {
        let metadata = passage.recipe_metadata().unwrap_or_else(|e| {
            warn!("Unreadable metadata on {}, filtering by name only: {}", passage.id, e);
            RecipeMetadata::named(passage.recipe_name())
        });
        let sections = RecipeSections::parse(&passage.content);

        spec.accepts(
            &Candidate {
                metadata: &metadata,
                sections: &sections,
            },
            cooking_time_limit,
        )
        .then(|| RecipeCard::build(&metadata, &sections))
    }
}

/// A selectable filter value and its display label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterChoice {
    pub tag: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub label: String,
    pub minutes: u32,
}

/// Filter vocabulary a client can offer, plus the cuisines and categories
/// present in the collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub diets: Vec<FilterChoice>,
    pub meal_times: Vec<FilterChoice>,
    pub meal_types: Vec<FilterChoice>,
    pub servings: Vec<FilterChoice>,
    pub time_ranges: Vec<TimeRange>,
    pub difficulty_levels: Vec<String>,
    pub dietary_options: Vec<String>,
    pub cuisines: Vec<String>,
    pub categories: Vec<String>,
}

fn choice(tag: &str, label: &str) -> FilterChoice {
    FilterChoice {
        tag: tag.to_string(),
        label: label.to_string(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

impl FilterOptions {
    /// The fixed vocabulary, with no collection-derived values
    #[inline]
    pub fn standard() -> Self {
        Self {
            diets: [Diet::Vegetarian, Diet::NonVegetarian]
                .into_iter()
                .map(|diet| choice(filters::diet_tag(diet), diet.label()))
                .collect(),
            meal_times: MEAL_TIME_TAGS
                .iter()
                .map(|tag| choice(tag, &capitalize(tag)))
                .collect(),
            meal_types: vec![
                choice("dessert", "Dessert"),
                choice("snacks", "Snacks"),
                choice("main", "Main Course"),
            ],
            servings: ServingsBucket::ALL
                .into_iter()
                .map(|bucket| choice(bucket.tag(), bucket.label()))
                .collect(),
            time_ranges: [
                ("Quick (under 30 min)", 30),
                ("Medium (30-60 min)", 60),
                ("Long (1-2 hours)", 120),
                ("Extended (2+ hours)", 240),
            ]
            .into_iter()
            .map(|(label, minutes)| TimeRange {
                label: label.to_string(),
                minutes,
            })
            .collect(),
            difficulty_levels: Vec::from(["Easy", "Medium", "Hard"].map(String::from)),
            dietary_options: Vec::from(crate::ingest::DIETARY_OPTIONS.map(String::from)),
            cuisines: Vec::new(),
            categories: Vec::new(),
        }
    }

    /// Standard vocabulary plus cuisines and categories found in `store`.
    /// A store error leaves the collection-derived lists empty.
    #[inline]
    pub async fn for_store(store: &RecipeStore) -> Self {
        let mut options = Self::standard();
        for (field, target) in [
            ("cuisine", &mut options.cuisines),
            ("category", &mut options.categories),
        ] {
            match store.field_values(field).await {
                Ok(values) => *target = values.into_iter().map(|(value, _)| value).collect(),
                Err(e) => warn!("Could not list {} values: {}", field, e),
            }
        }
        options
    }
}
