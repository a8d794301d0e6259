use super::*;
use crate::database::VectorIndex;
use crate::generation::LlmDescriber;
use crate::retrieval::LlmCompressor;
use crate::testing::{
    CountingIndex, DESCRIPTION_BLURB, ScriptedGenerator, UnavailableIndex, seeded_store,
    store_over,
};
use serde_json::json;

fn assistant_over(
    store: Arc<crate::database::RecipeStore>,
    generator: Arc<ScriptedGenerator>,
) -> RecipeAssistant {
    let compressor = Arc::new(LlmCompressor::new(Arc::clone(&generator) as Arc<dyn Generator>));
    let describer = Arc::new(LlmDescriber::new(Arc::clone(&generator) as Arc<dyn Generator>));
    RecipeAssistant::new(Retriever::new(store, compressor), generator, describer)
}

fn passage(id: &str, metadata: serde_json::Value, content: &str) -> RetrievedPassage {
    RetrievedPassage {
        id: id.to_string(),
        content: content.to_string(),
        metadata,
        distance: 0.1,
        rank: 1,
    }
}

#[tokio::test]
async fn empty_input_greets_without_retrieval() {
    let (store, index) = seeded_store().await;
    let assistant = assistant_over(store, Arc::new(ScriptedGenerator::answering("unused")));
    let mut session = ChatSession::new();

    for input in ["", "   ", "\n\t"] {
        let response = assistant.answer(&mut session, input).await;
        assert_eq!(response.answer, GREETING);
        assert_eq!(response.stage, Stage::GreetingResponse);
        assert_eq!(response.suggestions.len(), 3);
        assert!(response.error.is_none());
    }

    assert_eq!(index.query_count(), 0);
    assert!(session.memory.is_empty());
}

#[tokio::test]
async fn ingredient_question_gets_substitution_suggestion() {
    let (store, index) = seeded_store().await;
    let generator = Arc::new(ScriptedGenerator::answering(
        "Chicken fried rice is a great fit.",
    ));
    let assistant = assistant_over(store, Arc::clone(&generator));
    let mut session = ChatSession::new();

    let response = assistant
        .answer(&mut session, "I have chicken and rice")
        .await;

    assert!(response.error.is_none());
    assert_eq!(response.stage, Stage::Success);
    assert!(!response.recipes.is_empty());
    assert_eq!(response.suggestions.len(), 3);
    assert!(
        response
            .suggestions
            .iter()
            .any(|s| s.contains("substitute"))
    );
    assert!(response.answer.starts_with("Chicken fried rice is a great fit."));
    assert_eq!(index.query_count(), 1);

    let answer_prompt = generator
        .prompts()
        .into_iter()
        .find(|p| p.starts_with("You are a helpful recipe assistant"))
        .expect("answer prompt was sent");
    assert!(answer_prompt.contains("Question: I have chicken and rice recipe ingredients"));
}

#[tokio::test]
async fn successful_answers_are_remembered() {
    let (store, _index) = seeded_store().await;
    let generator = Arc::new(ScriptedGenerator::answering("Try the stew."));
    let assistant = assistant_over(store, Arc::clone(&generator));
    let mut session = ChatSession::new();

    assistant.answer(&mut session, "Something hearty").await;
    assistant.answer(&mut session, "Anything lighter?").await;

    let turns = session.memory.snapshot();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].question, "Something hearty");
    assert_eq!(turns[0].answer, "Try the stew.");

    let last_answer_prompt = generator
        .prompts()
        .into_iter()
        .filter(|p| p.starts_with("You are a helpful recipe assistant"))
        .last()
        .expect("answer prompts were sent");
    assert!(last_answer_prompt.contains("Human: Something hearty\nAssistant: Try the stew."));
}

#[tokio::test]
async fn several_recipes_get_a_formatted_summary() {
    let (store, _index) = seeded_store().await;
    let assistant = assistant_over(store, Arc::new(ScriptedGenerator::answering("Here you go.")));
    let mut session = ChatSession::new();

    let response = assistant.answer(&mut session, "rice dishes").await;

    assert_eq!(response.recipes.len(), 4);
    assert!(response.answer.contains("📚 **Found 4 recipes for you:**"));
    assert_eq!(response.answer.matches(DESCRIPTION_BLURB).count(), 3);
    assert!(response.sources.len() <= extract::MAX_SOURCES);
    assert_eq!(response.suggestions[0], format!("Tell me more about {}", response.recipes[0].name));
}

#[tokio::test]
async fn description_failures_fall_back_to_template() {
    let (store, _index) = seeded_store().await;
    let generator = Arc::new(
        ScriptedGenerator::answering("Here you go.")
            .failing_when("Write a concise, engaging description"),
    );
    let assistant = assistant_over(store, generator);
    let mut session = ChatSession::new();

    let response = assistant.answer(&mut session, "rice dishes").await;

    assert!(response.error.is_none());
    assert!(!response.answer.contains(DESCRIPTION_BLURB));
    assert!(response.answer.contains("recipe with"));
}

#[tokio::test]
async fn unavailable_store_yields_apology() {
    let store = Arc::new(store_over(Arc::new(UnavailableIndex)));
    let assistant = assistant_over(store, Arc::new(ScriptedGenerator::answering("unused")));
    let mut session = ChatSession::new();

    let response = assistant.answer(&mut session, "pasta please").await;

    assert_eq!(response.answer, APOLOGY);
    assert_eq!(response.stage, Stage::ErrorResponse);
    assert!(response.recipes.is_empty());
    assert!(response.sources.is_empty());
    assert_eq!(response.suggestions.len(), 3);
    assert!(
        response
            .error
            .as_deref()
            .is_some_and(|e| e.contains("connection refused"))
    );
    assert!(session.memory.is_empty());
}

#[tokio::test]
async fn generation_failure_yields_apology() {
    let (store, _index) = seeded_store().await;
    let generator = Arc::new(
        ScriptedGenerator::answering("unused").failing_when("You are a helpful recipe assistant"),
    );
    let assistant = assistant_over(store, generator);
    let mut session = ChatSession::new();

    let response = assistant.answer(&mut session, "soup").await;
    assert!(response.is_error());
    assert!(session.memory.is_empty());
}

#[tokio::test]
async fn empty_store_answers_without_recipes() {
    let store = Arc::new(store_over(
        Arc::new(CountingIndex::default()) as Arc<dyn VectorIndex>
    ));
    let assistant = assistant_over(store, Arc::new(ScriptedGenerator::answering("I don't know.")));
    let mut session = ChatSession::new();

    let response = assistant.answer(&mut session, "tacos").await;
    assert!(response.error.is_none());
    assert!(response.recipes.is_empty());
    assert_eq!(response.answer, "I don't know.");
}

#[test]
fn query_enhancement_appends_hints_once() {
    assert_eq!(enhance_query("pancakes"), "pancakes");

    let enhanced = enhance_query("I have eggs, what can I make with them?");
    assert!(enhanced.starts_with("I have eggs, what can I make with them?"));
    assert_eq!(enhanced.matches(query::INGREDIENT_HINT).count(), 1);

    assert_eq!(
        enhance_query("quick vegan thai curry using tofu"),
        "quick vegan thai curry using tofu recipe ingredients cooking time dietary cuisine"
    );
    assert_eq!(
        enhance_query("dinner in 30 minutes"),
        "dinner in 30 minutes cooking time"
    );
    assert_eq!(
        enhance_query("something that takes 2 hours"),
        "something that takes 2 hours cooking time"
    );
    assert_eq!(enhance_query("Italian-style lasagna"), "Italian-style lasagna cuisine");
    assert_eq!(enhance_query("quickly made soup"), "quickly made soup cooking time");
    assert_eq!(
        enhance_query("a vegetarian-friendly curry"),
        "a vegetarian-friendly curry dietary"
    );
    assert_eq!(enhance_query("something to shave time"), "something to shave time recipe ingredients");
}

#[test]
fn duplicate_names_extract_once() {
    let passages = vec![
        passage("a", json!({"name": "Pancakes", "rating": 4.0}), "first"),
        passage("b", json!({"name": "Pancakes", "rating": 2.0}), "second"),
        passage("c", json!({"name": "Waffles"}), "third"),
    ];

    let recipes = extract_recipes(&passages);
    assert_eq!(recipes.len(), 2);
    assert_eq!(recipes[0].name, "Pancakes");
    assert_eq!(recipes[0].rating, "4");
    assert_eq!(recipes[0].instructions, "first");
    assert_eq!(recipes[1].rating, "Not rated");
    assert_eq!(recipes[1].cuisine, "International");
    assert_eq!(recipes[1].difficulty, "Unknown");
    assert_eq!(recipes[1].category, "General");
}

#[test]
fn extraction_skips_malformed_and_stops_after_six() {
    let mut passages = vec![passage("bad", json!("Broken"), "x")];
    passages.extend(
        (0..8).map(|i| passage(&format!("p{i}"), json!({"name": format!("Dish {i}")}), "y")),
    );

    let recipes = extract_recipes(&passages);
    let names: Vec<&str> = recipes.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Dish 0", "Dish 1", "Dish 2", "Dish 3", "Dish 4"]);
}

#[test]
fn sources_are_deduplicated_capped_and_previewed() {
    let long = "a".repeat(400);
    let mut passages = vec![
        passage("1", json!({"name": "Soup", "source": "feed"}), &long),
        passage("2", json!({"name": "Soup", "source": "feed"}), "dup"),
        passage("3", json!({"name": "Soup", "source": "other"}), "short"),
    ];
    passages.extend((0..6).map(|i| passage(&format!("x{i}"), json!({"name": format!("R{i}")}), "z")));

    let sources = collect_sources(&passages);
    assert_eq!(sources.len(), extract::MAX_SOURCES);
    assert!(sources.iter().all(|s| s.content_preview.chars().count() <= 153));
    assert_eq!(sources[0].content_preview.len(), 153);
    assert!(sources[0].content_preview.ends_with("..."));
    assert_eq!(sources[1].source, "other");
    assert_eq!(sources[1].content_preview, "short");
    assert_eq!(sources[2].source, "Recipe Database");
}

#[test]
fn suggestions_always_three() {
    let recipe = |name: &str| RecipeInfo::from_metadata(crate::recipe::RecipeMetadata::named(name), "");

    let cases: Vec<(&str, Vec<RecipeInfo>)> = vec![
        ("what ingredients go in pesto", vec![]),
        ("quick lunch", vec![recipe("A"), recipe("B")]),
        ("soup", vec![recipe("Minestrone"), recipe("Pho")]),
        ("soup", vec![recipe("Minestrone")]),
        ("soup", vec![]),
    ];

    for (input, recipes) in cases {
        let suggestions = follow_up_suggestions(input, &recipes);
        assert_eq!(suggestions.len(), 3, "input {input:?}");
    }

    for input in ["I haven't got much in the fridge", "What haves are there?"] {
        assert_eq!(
            follow_up_suggestions(input, &[])[1],
            "What can I substitute if I'm missing an ingredient?"
        );
    }
    assert_eq!(
        follow_up_suggestions("quick lunch", &[])[0],
        "Show me recipes under 30 minutes"
    );
    assert_eq!(
        follow_up_suggestions("soup", &[recipe("Minestrone"), recipe("Pho")])[0],
        "Tell me more about Minestrone"
    );
    assert_eq!(
        follow_up_suggestions("soup", &[])[0],
        "Show me ingredients and instructions"
    );
}

#[test]
fn single_recipe_answer_is_left_alone() {
    let describer = LlmDescriber::new(Arc::new(ScriptedGenerator::answering("unused")));
    let recipes = vec![RecipeInfo::from_metadata(
        crate::recipe::RecipeMetadata::named("Solo"),
        "",
    )];
    assert_eq!(format_answer("Just one.", &recipes, &describer), "Just one.");
}

#[test]
fn sessions_have_distinct_ids() {
    assert_ne!(ChatSession::new().id(), ChatSession::new().id());
}
