//! Recipe record model.
//!
//! [`RecipeDocument`] is the unit stored in the vector index: a stable id,
//! the multi-section text that gets embedded, and a fixed set of metadata
//! fields. [`RetrievedPassage`] is what a similarity query hands back, and
//! [`RecipeInfo`] is the structured view surfaced to callers.


pub(crate) mod lenient;
pub mod sections;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{RecipeError, Result};

pub use sections::RecipeSections;

pub const UNKNOWN_RECIPE: &str = "Unknown Recipe";
pub const NOT_RATED: &str = "Not rated";
pub const DEFAULT_CUISINE: &str = "International";
pub const DEFAULT_CATEGORY: &str = "General";
pub const UNKNOWN_DIFFICULTY: &str = "Unknown";
pub const DEFAULT_SOURCE: &str = "Recipe Database";

pub const INGREDIENTS_HEADER: &str = "Ingredients:";
pub const INSTRUCTIONS_HEADER: &str = "Instructions:";
pub const NUTRITION_HEADER: &str = "Nutrition Information:";

/// Build the default document id for the recipe at `index` in an ingestion batch
#[inline]
pub fn recipe_id(index: usize) -> String {
    format!("recipe_{index}")
}

/// Dietary classification carried by each recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Diet {
    Vegetarian,
    NonVegetarian,
}

impl Diet {
    #[inline]
    pub fn label(self) -> &'static str {
        match self {
            Self::Vegetarian => "Vegetarian",
            Self::NonVegetarian => "Non-Vegetarian",
        }
    }
}

/// Metadata stored alongside each recipe document.
///
/// Every field is optional on the wire: absent keys take their defaults,
/// and a value of the wrong type decodes as absent. Only present fields are serialized, so the stored JSON doubles as the
/// record of which metadata fields a document actually carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipeMetadata {
    #[serde(alias = "recipe_name", alias = "title", deserialize_with = "lenient::text_or_empty")]
    pub name: String,
    #[serde(deserialize_with = "lenient::float", skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Identifier of the collection or feed the recipe came from
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(alias = "url", deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(alias = "main_category", deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(alias = "cuisine_type", deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    #[serde(alias = "difficulty_level", deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub prep_time_minutes: Option<u32>,
    #[serde(deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub cook_time_minutes: Option<u32>,
    #[serde(deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub total_time_minutes: Option<u32>,
    #[serde(deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
    #[serde(deserialize_with = "lenient::diet", skip_serializing_if = "Option::is_none")]
    pub diet: Option<Diet>,
    /// Meal slots and courses, e.g. "breakfast", "dinner", "dessert"
    #[serde(deserialize_with = "lenient::tags", skip_serializing_if = "Vec::is_empty")]
    pub meal_tags: Vec<String>,
    #[serde(alias = "dietary_info", deserialize_with = "lenient::tags", skip_serializing_if = "Vec::is_empty")]
    pub dietary_tags: Vec<String>,
    #[serde(deserialize_with = "lenient::tags", skip_serializing_if = "Vec::is_empty")]
    pub cooking_methods: Vec<String>,
    #[serde(deserialize_with = "lenient::tags", skip_serializing_if = "Vec::is_empty")]
    pub main_ingredients: Vec<String>,
}

impl RecipeMetadata {
    #[inline]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Decode metadata from a stored JSON value.
    ///
    /// # Errors
    /// [`RecipeError::Extraction`] when `value` is not a JSON object.
    #[inline]
    pub fn from_value(value: &Value) -> Result<Self> {
        if !value.is_object() {
            return Err(RecipeError::Extraction(format!(
                "Recipe metadata is not an object: {value}"
            )));
        }
        serde_json::from_value(value.clone())
            .map_err(|e| RecipeError::Extraction(format!("Malformed recipe metadata: {e}")))
    }

    #[inline]
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self)
            .map_err(|e| RecipeError::InvalidDocument(format!("Unserializable metadata: {e}")))
    }

    /// Preparation time to compare against a cooking-time limit
    #[inline]
    pub fn effective_time_minutes(&self) -> Option<u32> {
        self.total_time_minutes.or(self.cook_time_minutes)
    }
}

/// The embeddable unit kept in the recipe store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDocument {
    pub id: String,
    pub text: String,
    pub metadata: RecipeMetadata,
}

impl RecipeDocument {
    /// Create a document, rejecting empty ids and blank text
    #[inline]
    pub fn new(id: impl Into<String>, text: impl Into<String>, metadata: RecipeMetadata) -> Result<Self> {
        let id = id.into();
        let text = text.into();

        if id.trim().is_empty() {
            return Err(RecipeError::InvalidDocument(
                "Document id cannot be empty".to_string(),
            ));
        }
        if text.trim().is_empty() {
            return Err(RecipeError::InvalidDocument(format!(
                "Document {id} has empty text"
            )));
        }

        Ok(Self { id, text, metadata })
    }
}

/// Serialize recipe parts into the sectioned text that gets embedded.
///
/// Sections are separated by blank lines and introduced by the literal
/// headers that [`RecipeSections::parse`] looks for.
#[inline]
pub fn compose_recipe_text(
    name: &str,
    ingredients: &str,
    instructions: &str,
    nutrition: &str,
) -> String {
    format!(
        "Recipe: {name}\n\n{INGREDIENTS_HEADER}\n{ingredients}\n\n{INSTRUCTIONS_HEADER}\n{instructions}\n\n{NUTRITION_HEADER}\n{nutrition}"
    )
    .trim()
    .to_string()
}

/// One hit from a similarity query. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedPassage {
    pub id: String,
    pub content: String,
    pub metadata: Value,
    pub distance: f32,
    pub rank: usize,
}

impl RetrievedPassage {
    /// Recipe name as stored, tolerating legacy keys and missing values
    #[inline]
    pub fn recipe_name(&self) -> String {
        ["name", "recipe_name", "title"]
            .iter()
            .find_map(|key| self.metadata.get(*key).and_then(Value::as_str))
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(UNKNOWN_RECIPE)
            .to_string()
    }

    /// Source identifier used for attribution
    #[inline]
    pub fn source(&self) -> String {
        self.metadata
            .get("source")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_SOURCE)
            .to_string()
    }

    #[inline]
    pub fn recipe_metadata(&self) -> Result<RecipeMetadata> {
        RecipeMetadata::from_value(&self.metadata)
    }
}

/// Structured, de-duplicated view of a retrieved recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeInfo {
    pub name: String,
    pub rating: String,
    pub prep_time: Option<u32>,
    pub cook_time: Option<u32>,
    pub total_time: Option<u32>,
    pub servings: Option<u32>,
    pub difficulty: String,
    pub cuisine: String,
    pub category: String,
    pub main_ingredients: Vec<String>,
    pub cooking_methods: Vec<String>,
    pub dietary_info: Vec<String>,
    pub has_image: bool,
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    pub instructions: String,
}

impl RecipeInfo {
    /// Build the caller-facing view from a passage, applying field defaults.
    ///
    /// # Errors
    /// Returns [`RecipeError::Extraction`] when the stored metadata is not an object.
    #[inline]
    pub fn from_passage(passage: &RetrievedPassage) -> Result<Self> {
        let metadata = passage.recipe_metadata()?;
        Ok(Self::from_metadata(metadata, &passage.content))
    }

    #[inline]
    pub fn from_metadata(metadata: RecipeMetadata, content: &str) -> Self {
        let name = if metadata.name.trim().is_empty() {
            UNKNOWN_RECIPE.to_string()
        } else {
            metadata.name
        };
        let image_url = metadata.image_url.filter(|url| !url.trim().is_empty());

        let mut dietary_info = metadata.dietary_tags;
        if let Some(diet) = metadata.diet {
            let label = diet.label().to_lowercase();
            if !dietary_info.contains(&label) {
                dietary_info.insert(0, label);
            }
        }

        Self {
            name,
            rating: metadata
                .rating
                .map_or_else(|| NOT_RATED.to_string(), |r| r.to_string()),
            prep_time: metadata.prep_time_minutes,
            cook_time: metadata.cook_time_minutes,
            total_time: metadata.total_time_minutes,
            servings: metadata.servings,
            difficulty: metadata
                .difficulty
                .unwrap_or_else(|| UNKNOWN_DIFFICULTY.to_string()),
            cuisine: metadata
                .cuisine
                .unwrap_or_else(|| DEFAULT_CUISINE.to_string()),
            category: metadata
                .category
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            main_ingredients: metadata.main_ingredients,
            cooking_methods: metadata.cooking_methods,
            dietary_info,
            has_image: image_url.is_some(),
            image_url,
            source_url: metadata.source_url,
            instructions: content.to_string(),
        }
    }

    #[inline]
    pub fn is_rated(&self) -> bool {
        self.rating != NOT_RATED
    }
}
