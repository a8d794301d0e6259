//! Structured filters applied to similarity-search candidates.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::recipe::{Diet, RecipeMetadata, RecipeSections};

/// Cooking-time limit applied when the caller gives none
pub const DEFAULT_COOKING_TIME_LIMIT: u32 = 30;

pub const MEAL_TIME_TAGS: [&str; 3] = ["breakfast", "lunch", "dinner"];
pub const MEAL_TYPE_TAGS: [&str; 3] = ["dessert", "snacks", "main"];

/// Servings ranges a search can be narrowed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServingsBucket {
    #[serde(rename = "servings-1-2")]
    OneToTwo,
    #[serde(rename = "servings-3-4")]
    ThreeToFour,
    #[serde(rename = "servings-5+")]
    FivePlus,
}

impl ServingsBucket {
    pub const ALL: [Self; 3] = [Self::OneToTwo, Self::ThreeToFour, Self::FivePlus];

    #[inline]
    pub fn tag(self) -> &'static str {
        match self {
            Self::OneToTwo => "servings-1-2",
            Self::ThreeToFour => "servings-3-4",
            Self::FivePlus => "servings-5+",
        }
    }

    #[inline]
    pub fn label(self) -> &'static str {
        match self {
            Self::OneToTwo => "1-2",
            Self::ThreeToFour => "3-4",
            Self::FivePlus => "5+",
        }
    }

    #[inline]
    pub fn contains(self, servings: u32) -> bool {
        match self {
            Self::OneToTwo => (1..=2).contains(&servings),
            Self::ThreeToFour => (3..=4).contains(&servings),
            Self::FivePlus => servings >= 5,
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|bucket| bucket.tag() == tag)
    }
}

/// Tag used on the wire for each diet
#[inline]
pub fn diet_tag(diet: Diet) -> &'static str {
    match diet {
        Diet::Vegetarian => "veg",
        Diet::NonVegetarian => "non-veg",
    }
}

/// Request-scoped search filters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub diets: Vec<Diet>,
    pub meal_times: Vec<String>,
    pub meal_types: Vec<String>,
    pub servings: Vec<ServingsBucket>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FilterError {
    #[error("servings are not recorded for this recipe")]
    MissingServings,

    #[error("unreadable servings value: {0}")]
    UnparseableServings(String),
}

/// The parts of a candidate the filters look at
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub metadata: &'a RecipeMetadata,
    pub sections: &'a RecipeSections,
}

impl FilterSpec {
    /// Parse UI filter tags such as `veg`, `dinner` or `servings-5+`.
    /// Unrecognised tags are logged and ignored.
    #[inline]
    pub fn from_tags<S: AsRef<str>>(tags: &[S]) -> Self {
        let mut spec = Self::default();

        for tag in tags {
            let tag = tag.as_ref().trim().to_lowercase();
            match tag.as_str() {
                "veg" | "vegetarian" => push_unique(&mut spec.diets, Diet::Vegetarian),
                "non-veg" | "non-vegetarian" => push_unique(&mut spec.diets, Diet::NonVegetarian),
                t if MEAL_TIME_TAGS.contains(&t) => push_unique(&mut spec.meal_times, tag.clone()),
                t if MEAL_TYPE_TAGS.contains(&t) => push_unique(&mut spec.meal_types, tag.clone()),
                t => match ServingsBucket::from_tag(t) {
                    Some(bucket) => push_unique(&mut spec.servings, bucket),
                    None => warn!("Ignoring unknown filter tag {:?}", t),
                },
            }
        }

        spec
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.diets.is_empty()
            && self.meal_times.is_empty()
            && self.meal_types.is_empty()
            && self.servings.is_empty()
    }

    /// Whether `candidate` passes every filter.
    ///
    /// A filter that cannot be evaluated lets the candidate through.
    #[inline]
    pub fn accepts(&self, candidate: &Candidate<'_>, cooking_time_limit: u32) -> bool {
        match self.evaluate(candidate, cooking_time_limit) {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(
                    "Could not apply filters to {}: {}; keeping it",
                    candidate.metadata.name, e
                );
                true
            }
        }
    }

    /// Conjunctive filter evaluation, cheapest checks first
    #[inline]
    pub fn evaluate(&self, candidate: &Candidate<'_>, cooking_time_limit: u32) -> Result<bool, FilterError> {
        let metadata = candidate.metadata;

        if let Some(diet) = metadata.diet {
            if self.diets.iter().any(|wanted| *wanted != diet) {
                return Ok(false);
            }
        }

        if !self.meal_times.is_empty() && !has_any_tag(metadata, &self.meal_times) {
            return Ok(false);
        }
        if !self.meal_types.is_empty() && !has_any_tag(metadata, &self.meal_types) {
            return Ok(false);
        }

        if metadata
            .effective_time_minutes()
            .is_some_and(|minutes| minutes > cooking_time_limit)
        {
            return Ok(false);
        }

        if !self.servings.is_empty() {
            let servings = servings_of(candidate)?;
            if !self.servings.iter().any(|bucket| bucket.contains(servings)) {
                return Ok(false);
            }
        }

        Ok(true)
    }
}

/// Servings from a "serves N" phrase, else from metadata
#[inline]
pub fn servings_of(candidate: &Candidate<'_>) -> Result<u32, FilterError> {
    match candidate.sections.servings_phrase() {
        Some(phrase) => parse_servings(&phrase),
        None => candidate.metadata.servings.ok_or(FilterError::MissingServings),
    }
}

/// Leading integer of a servings token such as "4", "4." or "6-8"
fn parse_servings(phrase: &str) -> Result<u32, FilterError> {
    let digits: String = phrase.chars().take_while(char::is_ascii_digit).collect();
    digits
        .parse()
        .map_err(|_| FilterError::UnparseableServings(phrase.to_string()))
}

fn has_any_tag(metadata: &RecipeMetadata, wanted: &[String]) -> bool {
    metadata
        .meal_tags
        .iter()
        .any(|tag| wanted.iter().any(|w| w.eq_ignore_ascii_case(tag)))
}

fn push_unique<T: PartialEq>(values: &mut Vec<T>, value: T) {
    if !values.contains(&value) {
        values.push(value);
    }
}
