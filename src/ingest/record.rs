//! Input schema for recipe feeds.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::derive;
use crate::recipe::lenient;
use crate::recipe::{
    RecipeDocument, RecipeMetadata, UNKNOWN_RECIPE, compose_recipe_text, recipe_id,
};
use crate::{RecipeError, Result};

/// One recipe as it appears in a feed.
///
/// Every field is optional; a field of the wrong JSON type is treated as
/// absent rather than rejecting the record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RecipeRecord {
    #[serde(deserialize_with = "lenient::text")]
    pub id: Option<String>,
    #[serde(alias = "name", alias = "title", deserialize_with = "lenient::text")]
    pub recipe_name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub prep_time: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub cook_time: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub total_time: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub servings: Option<String>,
    #[serde(rename = "yield", deserialize_with = "lenient::text")]
    pub yields: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub ingredients: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub directions: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub rating: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub url: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub cuisine_path: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub nutrition: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub img_src: Option<String>,
}

/// Text, or an array of strings joined by commas
fn lenient_list<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Array(items) => {
            let items: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            (!items.is_empty()).then(|| items.join(", "))
        }
        _ => None,
    })
}

impl RecipeRecord {
    #[inline]
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(RecipeError::InvalidDocument(format!(
                "Expected a recipe object, found {value}"
            )));
        }
        serde_json::from_value(value)
            .map_err(|e| RecipeError::InvalidDocument(format!("Unreadable recipe record: {e}")))
    }

    /// Build the stored document for the record at `index` in its feed
    ///
    /// # Errors
    /// [`RecipeError::InvalidDocument`] when the record has no name, no
    /// ingredients and no directions.
    #[inline]
    pub fn into_document(self, index: usize, source: &str) -> Result<RecipeDocument> {
        let name = self.recipe_name.clone().unwrap_or_default();
        let ingredients_text = self.ingredients.clone().unwrap_or_default();
        let directions_text = self.directions.clone().unwrap_or_default();

        if name.is_empty() && ingredients_text.is_empty() && directions_text.is_empty() {
            return Err(RecipeError::InvalidDocument(format!(
                "Record {index} has no name, ingredients or directions"
            )));
        }

        let ingredients = derive::split_ingredients(&ingredients_text);
        let nutrition = self.nutrition.clone().unwrap_or_default();
        let path = self.cuisine_path.clone().unwrap_or_default();
        let display_name = if name.is_empty() { UNKNOWN_RECIPE } else { &name };

        let text = compose_recipe_text(
            display_name,
            &derive::format_ingredients(&ingredients),
            &derive::format_directions(&directions_text),
            &nutrition,
        );

        let prep = self.prep_time.as_deref().and_then(derive::parse_minutes);
        let cook = self.cook_time.as_deref().and_then(derive::parse_minutes);
        let total = self
            .total_time
            .as_deref()
            .and_then(derive::parse_minutes)
            .or_else(|| match (prep, cook) {
                (Some(p), Some(c)) => Some(p.saturating_add(c)),
                _ => None,
            });
        let diet = derive::classify_diet(&ingredients);

        let metadata = RecipeMetadata {
            name: display_name.to_string(),
            rating: self
                .rating
                .as_deref()
                .and_then(|r| r.parse::<f64>().ok())
                .filter(|r| (0.0..=5.0).contains(r)),
            source: Some(source.to_string()),
            source_url: self.url.clone(),
            category: derive::category_from_path(&path),
            image_url: self.img_src.clone(),
            cuisine: derive::cuisine_from_path(&path),
            difficulty: Some(derive::difficulty(total, ingredients.len()).to_string()),
            prep_time_minutes: prep,
            cook_time_minutes: cook,
            total_time_minutes: total,
            servings: self
                .servings
                .as_deref()
                .and_then(derive::leading_number)
                .or_else(|| self.yields.as_deref().and_then(derive::leading_number))
                .filter(|s| *s > 0),
            diet,
            meal_tags: derive::meal_tags(&path, &name),
            dietary_tags: derive::dietary_tags(diet, &ingredients, &nutrition),
            cooking_methods: derive::cooking_methods(&directions_text),
            main_ingredients: derive::main_ingredients(&ingredients),
        };

        let id = self.id.unwrap_or_else(|| recipe_id(index));
        RecipeDocument::new(id, text, metadata)
    }
}
