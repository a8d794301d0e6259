//! Metadata derived from raw recipe fields during ingestion.

use fancy_regex::Regex;
use std::sync::LazyLock;

use crate::recipe::Diet;

static DURATION_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*(days?|d|hours?|hrs?|h|minutes?|mins?|m)\b").ok()
});

static NUTRIENT_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)(total fat|sodium|dietary fiber)\s+(\d+(?:\.\d+)?)\s*(mg|g)").ok()
});

const KNOWN_CUISINES: &[&str] = &[
    "Italian",
    "Mexican",
    "Asian",
    "Indian",
    "American",
    "Chinese",
    "Thai",
    "French",
    "Greek",
    "Japanese",
    "Korean",
    "Vietnamese",
    "Mediterranean",
    "Middle Eastern",
    "Spanish",
    "Caribbean",
    "German",
];

/// (keyword in the category path or name, meal tag)
const MEAL_KEYWORDS: &[(&str, &str)] = &[
    ("breakfast", "breakfast"),
    ("brunch", "breakfast"),
    ("lunch", "lunch"),
    ("sandwich", "lunch"),
    ("salad", "lunch"),
    ("dinner", "dinner"),
    ("main dish", "dinner"),
    ("main dish", "main"),
    ("entree", "main"),
    ("dessert", "dessert"),
    ("pie", "dessert"),
    ("cake", "dessert"),
    ("cookie", "dessert"),
    ("snack", "snacks"),
    ("appetizer", "snacks"),
];

const MEAT_KEYWORDS: &[&str] = &[
    "anchovy", "bacon", "beef", "chicken", "chorizo", "clam", "crab", "duck", "fish",
    "gelatin", "ham", "lamb", "lobster", "meat", "mussel", "pepperoni", "pork",
    "prosciutto", "salami", "salmon", "sausage", "shrimp", "tuna", "turkey", "veal",
];

const DAIRY_KEYWORDS: &[&str] = &["butter", "cheese", "cream", "milk", "yogurt"];

const GLUTEN_KEYWORDS: &[&str] = &[
    "barley", "bread", "cracker", "flour", "noodle", "pasta", "rye", "tortilla", "wheat",
];

const COOKING_METHODS: &[(&str, &str)] = &[
    ("bake", "baking"),
    ("roast", "roasting"),
    ("grill", "grilling"),
    ("fry", "frying"),
    ("saute", "sauteing"),
    ("sauté", "sauteing"),
    ("simmer", "simmering"),
    ("boil", "boiling"),
    ("steam", "steaming"),
    ("broil", "broiling"),
    ("braise", "braising"),
    ("blend", "blending"),
    ("chill", "chilling"),
];

const UNITS: &[&str] = &[
    "cup", "cups", "tablespoon", "tablespoons", "tbsp", "teaspoon", "teaspoons", "tsp",
    "pound", "pounds", "lb", "lbs", "ounce", "ounces", "oz", "g", "kg", "ml", "l", "pinch",
    "dash", "clove", "cloves", "can", "cans", "package", "packages", "slice", "slices",
    "large", "medium", "small", "whole", "quart", "quarts", "pint", "pints", "stick", "sticks",
];

/// Tags offered by the dietary filter options
pub const DIETARY_OPTIONS: [&str; 6] = [
    "vegetarian-friendly",
    "dairy-free-option",
    "gluten-free-option",
    "low-fat",
    "low-sodium",
    "high-fiber",
];

const MAIN_INGREDIENT_COUNT: usize = 5;

/// Parse durations like "1 hrs 20 mins", "45 mins" or a bare "30" into minutes
#[inline]
pub fn parse_minutes(text: &str) -> Option<u32> {
    let text = text.trim();
    if let Ok(minutes) = text.parse::<u32>() {
        return Some(minutes);
    }

    let pattern = DURATION_PATTERN.as_ref()?;
    let mut total = 0u32;
    let mut matched = false;

    for captures in pattern.captures_iter(text).flatten() {
        let (Some(amount), Some(unit)) = (captures.get(1), captures.get(2)) else {
            continue;
        };
        let Ok(amount) = amount.as_str().parse::<u32>() else {
            continue;
        };
        let factor = match unit.as_str().to_lowercase().chars().next() {
            Some('d') => 24 * 60,
            Some('h') => 60,
            _ => 1,
        };
        total = total.saturating_add(amount.saturating_mul(factor));
        matched = true;
    }

    matched.then_some(total)
}

/// Leading whole number of a text such as "8 servings" or "4"
#[inline]
pub fn leading_number(text: &str) -> Option<u32> {
    let digits: String = text
        .trim()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Non-empty segments of a category path such as "/Desserts/Pies/Apple Pie Recipes/"
fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').map(str::trim).filter(|s| !s.is_empty())
}

#[inline]
pub fn category_from_path(path: &str) -> Option<String> {
    path_segments(path).next().map(str::to_string)
}

#[inline]
pub fn cuisine_from_path(path: &str) -> Option<String> {
    let lowered = path.to_lowercase();
    KNOWN_CUISINES
        .iter()
        .find(|cuisine| lowered.contains(&cuisine.to_lowercase()))
        .map(|cuisine| (*cuisine).to_string())
}

/// Meal slots and courses suggested by the category path and recipe name
#[inline]
pub fn meal_tags(path: &str, name: &str) -> Vec<String> {
    let haystack = format!("{} {}", path, name).to_lowercase();
    let mut tags: Vec<String> = Vec::new();
    for (keyword, tag) in MEAL_KEYWORDS {
        if haystack.contains(keyword) && !tags.iter().any(|t| t == tag) {
            tags.push((*tag).to_string());
        }
    }
    tags
}

/// Split an ingredient list on commas or newlines, dropping bullets
#[inline]
pub fn split_ingredients(text: &str) -> Vec<String> {
    text.split([',', '\n'])
        .map(|item| item.trim().trim_start_matches('•').trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether any word of any item starts with one of `keywords`
fn mentions(items: &[String], keywords: &[&str]) -> bool {
    items.iter().any(|item| {
        item.to_lowercase()
            .split(|c: char| !c.is_alphabetic())
            .any(|word| keywords.iter().any(|keyword| word.starts_with(keyword)))
    })
}

/// Vegetarian unless an ingredient names meat or fish; unknown without ingredients
#[inline]
pub fn classify_diet(ingredients: &[String]) -> Option<Diet> {
    if ingredients.is_empty() {
        return None;
    }
    if mentions(ingredients, MEAT_KEYWORDS) {
        Some(Diet::NonVegetarian)
    } else {
        Some(Diet::Vegetarian)
    }
}

/// Grams or milligrams of a nutrient in a label like "Total Fat 19g 24%, Sodium 210mg"
fn nutrient_amount(nutrition: &str, nutrient: &str) -> Option<f64> {
    let pattern = NUTRIENT_PATTERN.as_ref()?;
    pattern
        .captures_iter(nutrition)
        .flatten()
        .find(|captures| {
            captures
                .get(1)
                .is_some_and(|m| m.as_str().eq_ignore_ascii_case(nutrient))
        })
        .and_then(|captures| captures.get(2)?.as_str().parse().ok())
}

#[inline]
pub fn dietary_tags(diet: Option<Diet>, ingredients: &[String], nutrition: &str) -> Vec<String> {
    let mut tags = Vec::new();

    if diet == Some(Diet::Vegetarian) {
        tags.push(DIETARY_OPTIONS[0]);
    }
    if !ingredients.is_empty() {
        if !mentions(ingredients, DAIRY_KEYWORDS) {
            tags.push(DIETARY_OPTIONS[1]);
        }
        if !mentions(ingredients, GLUTEN_KEYWORDS) {
            tags.push(DIETARY_OPTIONS[2]);
        }
    }
    if nutrient_amount(nutrition, "total fat").is_some_and(|g| g <= 3.0) {
        tags.push(DIETARY_OPTIONS[3]);
    }
    if nutrient_amount(nutrition, "sodium").is_some_and(|mg| mg <= 140.0) {
        tags.push(DIETARY_OPTIONS[4]);
    }
    if nutrient_amount(nutrition, "dietary fiber").is_some_and(|g| g >= 5.0) {
        tags.push(DIETARY_OPTIONS[5]);
    }

    tags.into_iter().map(str::to_string).collect()
}

#[inline]
pub fn cooking_methods(directions: &str) -> Vec<String> {
    let lowered = directions.to_lowercase();
    let mut methods: Vec<String> = Vec::new();
    for (keyword, method) in COOKING_METHODS {
        if lowered.contains(keyword) && !methods.iter().any(|m| m == method) {
            methods.push((*method).to_string());
        }
    }
    methods
}

/// Ingredient name without its leading quantity and unit
#[inline]
pub fn ingredient_name(item: &str) -> String {
    let mut depth = 0usize;
    let item: String = item
        .chars()
        .filter(|c| match c {
            '(' => {
                depth += 1;
                false
            }
            ')' => {
                depth = depth.saturating_sub(1);
                false
            }
            _ => depth == 0,
        })
        .collect();
    item.split_whitespace()
        .skip_while(|word| {
            let word = word.to_lowercase();
            let word = word.trim_end_matches('.');
            word.chars().all(|c| c.is_ascii_digit() || "/½¼¾⅓⅔-.".contains(c))
                || UNITS.contains(&word)
        })
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[inline]
pub fn main_ingredients(ingredients: &[String]) -> Vec<String> {
    ingredients
        .iter()
        .map(|item| ingredient_name(item))
        .filter(|name| !name.is_empty())
        .take(MAIN_INGREDIENT_COUNT)
        .collect()
}

/// Easy, Medium or Hard from total time and ingredient count
#[inline]
pub fn difficulty(total_minutes: Option<u32>, ingredient_count: usize) -> &'static str {
    let long = total_minutes.is_some_and(|m| m > 90);
    let short = total_minutes.is_none_or(|m| m <= 30);

    if long || ingredient_count > 15 {
        "Hard"
    } else if short && ingredient_count <= 8 {
        "Easy"
    } else {
        "Medium"
    }
}

/// Ingredient list as one bulleted line per item
#[inline]
pub fn format_ingredients(ingredients: &[String]) -> String {
    ingredients
        .iter()
        .map(|item| format!("• {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split directions into sentences at a period followed by an uppercase letter
fn sentences(line: &str) -> Vec<String> {
    let mut steps = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        current.push(c);
        if c != '.' {
            continue;
        }
        let mut lookahead = chars.clone();
        let next = loop {
            match lookahead.next() {
                Some(n) if n.is_whitespace() => {}
                other => break other,
            }
        };
        if next.is_some_and(char::is_uppercase) {
            steps.push(std::mem::take(&mut current));
        }
    }
    steps.push(current);
    steps
}

/// Directions as numbered steps; fragments of ten characters or fewer are dropped
#[inline]
pub fn format_directions(directions: &str) -> String {
    directions
        .replace("\\n", "\n")
        .lines()
        .flat_map(sentences)
        .map(|step| step.split_whitespace().collect::<Vec<_>>().join(" "))
        .map(|step| step.trim_end_matches('.').to_string())
        .filter(|step| step.chars().count() > 10)
        .enumerate()
        .map(|(i, step)| format!("{}. {}", i + 1, step))
        .collect::<Vec<_>>()
        .join("\n")
}
