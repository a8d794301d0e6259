use super::*;
use crate::RecipeError;
use crate::recipe::{RecipeMetadata, RecipeInfo};
use std::sync::Mutex;

struct ScriptedGenerator {
    reply: Result<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            reply: Err(RecipeError::Generation("model offline".to_string())),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

impl Generator for ScriptedGenerator {
    fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts
            .lock()
            .expect("prompt log poisoned")
            .push(prompt.to_string());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(e) => Err(RecipeError::Generation(e.to_string())),
        }
    }
}

fn risotto() -> RecipeInfo {
    RecipeInfo::from_metadata(
        RecipeMetadata {
            cuisine: Some("Italian".to_string()),
            category: Some("Main Dishes".to_string()),
            difficulty: Some("Medium".to_string()),
            main_ingredients: vec!["arborio rice".to_string(), "mushrooms".to_string()],
            cooking_methods: vec!["simmer".to_string()],
            ..RecipeMetadata::named("Mushroom Risotto")
        },
        "Instructions:\nToast the rice, add stock gradually.",
    )
}

#[test]
fn description_prompt_mentions_recipe_details() {
    let generator = Arc::new(ScriptedGenerator::replying("  Creamy and earthy.  "));
    let describer = LlmDescriber::new(Arc::clone(&generator) as Arc<dyn Generator>);

    let description = describer.describe(&risotto()).expect("description succeeds");
    assert_eq!(description, "Creamy and earthy.");

    let prompts = generator.prompts.lock().expect("prompt log poisoned");
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Name: Mushroom Risotto"));
    assert!(prompts[0].contains("Ingredients: arborio rice, mushrooms"));
    assert!(prompts[0].contains("Cuisine: Italian"));
}

#[test]
fn long_descriptions_are_clamped() {
    let long = vec!["tasty"; 250].join(" ");
    let describer = LlmDescriber::new(Arc::new(ScriptedGenerator::replying(&long)));

    let description = describer.describe(&risotto()).expect("description succeeds");
    assert!(description.ends_with("..."));
    assert_eq!(
        description.trim_end_matches("...").split_whitespace().count(),
        MAX_DESCRIPTION_WORDS
    );
}

#[test]
fn failed_generation_falls_back_to_template() {
    let describer = LlmDescriber::new(Arc::new(ScriptedGenerator::failing()));
    let description = describe_or_fallback(&describer, &risotto());
    assert_eq!(
        description,
        "A Italian main dishes recipe with medium difficulty."
    );
}

#[test]
fn blank_generation_falls_back_to_template() {
    let describer = LlmDescriber::new(Arc::new(ScriptedGenerator::replying("   ")));
    let description = describe_or_fallback(&describer, &risotto());
    assert_eq!(description, fallback_description(&risotto()));
}

#[test]
fn compression_prompt_embeds_question_and_passage() {
    let prompt = prompts::compression_prompt("quick pasta", "Recipe: Carbonara");
    assert!(prompt.contains("> Question: quick pasta"));
    assert!(prompt.contains("Recipe: Carbonara"));
    assert!(prompt.contains(prompts::NO_OUTPUT));
}

#[test]
fn answer_prompt_threads_history() {
    let prompt = prompts::answer_prompt("ctx", "Human: hi\nAssistant: hello", "soup?");
    assert!(prompt.contains("Context: ctx"));
    assert!(prompt.contains("Human: hi\nAssistant: hello"));
    assert!(prompt.trim_end().ends_with("Answer:"));
}
