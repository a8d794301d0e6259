//! Follow-up suggestions offered after each answer.

use super::query::mentions_any;
use crate::recipe::RecipeInfo;

/// Suggestions returned with every response
pub const SUGGESTION_COUNT: usize = 3;

pub const GREETING_SUGGESTIONS: [&str; SUGGESTION_COUNT] = [
    "What ingredients do you have?",
    "Show me quick dinner recipes",
    "I need a vegetarian meal",
];

pub const ERROR_SUGGESTIONS: [&str; SUGGESTION_COUNT] = [
    "Try asking about a specific ingredient",
    "Search for a cuisine type",
    "Ask for cooking tips",
];

const INGREDIENT_SUGGESTIONS: [&str; SUGGESTION_COUNT] = [
    "Show me the full recipe for the first suggestion",
    "What can I substitute if I'm missing an ingredient?",
    "How long will this take to prepare?",
];

const QUICK_SUGGESTIONS: [&str; SUGGESTION_COUNT] = [
    "Show me recipes under 30 minutes",
    "What are some meal prep options?",
    "Give me beginner-friendly recipes",
];

const GENERIC_SUGGESTIONS: [&str; SUGGESTION_COUNT] = [
    "Show me ingredients and instructions",
    "What cuisine type would you recommend?",
    "Give me cooking tips for beginners",
];

const INGREDIENT_SIGNALS: &[&str] = &["ingredient", "have"];
const QUICK_SIGNALS: &[&str] = &["quick", "fast", "easy"];

/// Exactly three suggestions chosen from the user's intent and the recipes found
#[inline]
pub fn follow_up_suggestions(input: &str, recipes: &[RecipeInfo]) -> Vec<String> {
    let lowered = input.to_lowercase();

    let mut suggestions: Vec<String> =
        if mentions_any(&lowered, INGREDIENT_SIGNALS) {
            to_owned(&INGREDIENT_SUGGESTIONS)
        } else if mentions_any(&lowered, QUICK_SIGNALS) {
            to_owned(&QUICK_SUGGESTIONS)
        } else if let [top, _, ..] = recipes {
            vec![
                format!("Tell me more about {}", top.name),
                "Compare the difficulty of these recipes".to_string(),
                "Which recipe has the highest rating?".to_string(),
            ]
        } else {
            Vec::new()
        };

    if suggestions.len() < SUGGESTION_COUNT {
        suggestions.extend(to_owned(&GENERIC_SUGGESTIONS));
    }
    suggestions.truncate(SUGGESTION_COUNT);
    suggestions
}

#[inline]
pub fn to_owned(suggestions: &[&str]) -> Vec<String> {
    suggestions.iter().map(ToString::to_string).collect()
}
