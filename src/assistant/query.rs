//! Query enhancement: append retrieval hints for recognised intents.
//!
//! Signals are plain substrings of the lowercased input, so "hours",
//! "Italian-style" and "haven't" all count.

const INGREDIENT_SIGNALS: &[&str] = &["have", "using", "with", "got"];
const TIME_SIGNALS: &[&str] = &["quick", "fast", "easy", "30 min", "hour"];
const DIETARY_SIGNALS: &[&str] = &["vegetarian", "vegan", "gluten-free", "low-fat"];
pub(crate) const CUISINE_SIGNALS: &[&str] = &[
    "italian", "mexican", "asian", "indian", "american", "chinese", "thai",
];

pub const INGREDIENT_HINT: &str = "recipe ingredients";
pub const TIME_HINT: &str = "cooking time";
pub const DIETARY_HINT: &str = "dietary";
pub const CUISINE_HINT: &str = "cuisine";

/// Whether the already-lowercased `text` contains any of `signals`
pub(crate) fn mentions_any(lowered: &str, signals: &[&str]) -> bool {
    signals.iter().any(|s| lowered.contains(s))
}

/// Retrieval hints triggered by `input`, each at most once, in fixed order
#[inline]
pub fn intent_hints(input: &str) -> Vec<&'static str> {
    let lowered = input.to_lowercase();

    [
        (INGREDIENT_SIGNALS, INGREDIENT_HINT),
        (TIME_SIGNALS, TIME_HINT),
        (DIETARY_SIGNALS, DIETARY_HINT),
        (CUISINE_SIGNALS, CUISINE_HINT),
    ]
    .into_iter()
    .filter(|(signals, _)| mentions_any(&lowered, signals))
    .map(|(_, hint)| hint)
    .collect()
}

/// The input with its intent hints appended, or the input unchanged
#[inline]
pub fn enhance_query(input: &str) -> String {
    let hints = intent_hints(input);
    if hints.is_empty() {
        input.to_string()
    } else {
        format!("{input} {}", hints.join(" "))
    }
}
