use super::*;
use crate::recipe::compose_recipe_text;

fn apple_pie_text() -> String {
    compose_recipe_text(
        "Apple Pie",
        "• 6 apples\n• 1 cup sugar\n• 2 pie crusts",
        "1. Preheat the oven to 425 degrees F and line a pie dish with one crust\n2. Toss the sliced apples with sugar and cinnamon then fill the crust\n3. Bake for 45 minutes. Serves 8",
        "Calories: 410",
    )
}

#[test]
fn parse_all_sections() {
    let sections = RecipeSections::parse(&apple_pie_text());

    assert_eq!(
        sections.ingredients.as_deref(),
        Some("• 6 apples\n• 1 cup sugar\n• 2 pie crusts")
    );
    assert!(
        sections
            .instructions
            .as_deref()
            .is_some_and(|i| i.starts_with("1. Preheat"))
    );
    assert_eq!(sections.nutrition.as_deref(), Some("Calories: 410"));
}

#[test]
fn parse_ignores_unknown_blocks() {
    let sections = RecipeSections::parse("Recipe: Toast\n\nNotes:\nUse good bread");
    assert_eq!(sections, RecipeSections::default());
}

#[test]
fn description_takes_twenty_words() {
    let sections = RecipeSections::parse(&apple_pie_text());
    let description = sections.description().expect("instructions present");

    assert!(description.ends_with("..."));
    let words = description.trim_end_matches("...").split_whitespace().count();
    assert_eq!(words, 20);
    assert!(description.starts_with("1. Preheat the oven"));
}

#[test]
fn description_of_short_instructions() {
    let sections = RecipeSections::parse("Instructions:\nStir well");
    assert_eq!(sections.description().as_deref(), Some("Stir well..."));
}

#[test]
fn servings_phrase_is_case_insensitive() {
    let sections = RecipeSections::parse(&apple_pie_text());
    assert_eq!(sections.servings_phrase().as_deref(), Some("8"));

    let sections = RecipeSections::parse("Instructions:\nmix everything; serves 4-6 people");
    assert_eq!(sections.servings_phrase().as_deref(), Some("4-6"));
}

#[test]
fn missing_servings_phrase() {
    let sections = RecipeSections::parse("Instructions:\nBake until golden");
    assert_eq!(sections.servings_phrase(), None);
    assert_eq!(RecipeSections::default().servings_phrase(), None);
}
