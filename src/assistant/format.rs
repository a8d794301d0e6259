//! Markdown summary appended to answers that surface several recipes.

use std::fmt::Write as _;

use crate::generation::{RecipeDescriber, describe_or_fallback};
use crate::recipe::RecipeInfo;

/// Recipes listed in the summary
pub const SUMMARY_RECIPES: usize = 3;

/// Append the recipe summary to `answer` when more than one recipe was found
#[inline]
pub fn format_answer(answer: &str, recipes: &[RecipeInfo], describer: &dyn RecipeDescriber) -> String {
    if recipes.len() <= 1 {
        return answer.to_string();
    }

    let mut formatted = answer.to_string();
    let _ = write!(
        formatted,
        "\n\n📚 **Found {} recipes for you:**\n",
        recipes.len()
    );

    for (i, recipe) in recipes.iter().take(SUMMARY_RECIPES).enumerate() {
        let time = recipe
            .total_time
            .or(recipe.cook_time)
            .map(|minutes| format!(" • ⏱️ {minutes} min"))
            .unwrap_or_default();
        let rating = if recipe.is_rated() {
            format!(" • ⭐ {}/5", recipe.rating)
        } else {
            String::new()
        };

        let _ = writeln!(
            formatted,
            "{}. **{}** ({}){}{}",
            i + 1,
            recipe.name,
            recipe.difficulty,
            time,
            rating
        );
        if let Some(url) = &recipe.image_url {
            let _ = writeln!(formatted, "   ![{}]({})", recipe.name, url);
        }
        let _ = write!(
            formatted,
            "   {}\n\n",
            describe_or_fallback(describer, recipe)
        );
    }

    formatted
}
