use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input};
use std::path::Path;
use tracing::{error, info};

use crate::assistant::ChatResponse;
use crate::chatbot::{ComponentHealth, RecipeChatbot};
use crate::config::Config;
use crate::ingest::{IngestOptions, ingest_file};
use crate::search::RecipeCard;

async fn open_chatbot(config: &Config) -> Result<RecipeChatbot> {
    RecipeChatbot::from_config(config)
        .await
        .context("Failed to start the recipe assistant")
}

fn print_response(response: &ChatResponse) {
    println!();
    println!("{}", response.answer);

    if !response.sources.is_empty() {
        println!();
        println!("{}", style("Sources:").bold());
        for source in &response.sources {
            println!("  📖 {} ({})", source.recipe_name, source.source);
        }
    }

    println!();
    println!("{}", style("You could also ask:").dim());
    for suggestion in &response.suggestions {
        println!("  💡 {}", suggestion);
    }
}

fn print_cards(cards: &[RecipeCard]) {
    if cards.is_empty() {
        println!("No recipes matched your search.");
        return;
    }

    println!("🍽️  {} recipes found:", cards.len());
    println!();
    for card in cards {
        println!("{} ({})", style(&card.name).bold(), card.kind);
        println!("   ⭐ {}   🍴 Serves {}", card.rating, card.servings);
        if !card.description.is_empty() {
            println!("   {}", card.description);
        }
        if !card.image.is_empty() {
            println!("   🖼️  {}", style(&card.image).dim());
        }
    }
}

/// Load a recipe feed into the configured collection
#[inline]
pub async fn ingest_recipes(config: &Config, file: &Path, reset: bool) -> Result<()> {
    let chatbot = open_chatbot(config).await?;
    let options = IngestOptions {
        reset,
        batch_size: config.ollama.batch_size as usize,
    };

    let report = ingest_file(chatbot.store(), file, options)
        .await
        .with_context(|| format!("Failed to ingest {}", file.display()))?;

    println!("✅ Ingestion complete");
    println!("   Records read: {}", report.total);
    println!("   Recipes stored: {}", report.ingested);
    if report.skipped > 0 {
        println!("   Skipped (invalid): {}", report.skipped);
    }
    Ok(())
}

/// Interactive conversation until the user quits
#[inline]
pub async fn chat(config: &Config) -> Result<()> {
    let mut chatbot = open_chatbot(config).await?;
    info!("Starting chat session {}", chatbot.session_id());

    println!("{}", style("🍳 Recipe Assistant").bold().cyan());
    println!("Type 'quit' to exit, 'clear' to forget the conversation, 'stats' for collection info, 'history' for recent messages.");

    loop {
        println!();
        let input: String = Input::new()
            .with_prompt("You")
            .allow_empty(true)
            .interact_text()?;

        match input.trim().to_lowercase().as_str() {
            "quit" | "exit" | "q" => {
                println!("Happy cooking! 👋");
                break;
            }
            "clear" => {
                if chatbot.clear_memory() {
                    println!("🧹 Conversation memory cleared.");
                }
            }
            "stats" => match chatbot.collection_stats().await {
                Ok(stats) => {
                    println!("📊 {} recipes in '{}'", stats.total_recipes, stats.collection);
                    println!("   Fields: {}", stats.fields.join(", "));
                }
                Err(e) => println!("❌ Could not read collection stats - {}", e),
            },
            "history" => {
                let messages = chatbot.memory_summary();
                if messages.is_empty() {
                    println!("No conversation yet.");
                }
                for message in messages {
                    println!("  • {}", message);
                }
            }
            _ => {
                let response = chatbot.answer(&input).await;
                print_response(&response);
            }
        }
    }

    Ok(())
}

/// Answer a single question and exit
#[inline]
pub async fn ask(config: &Config, question: &str, json: bool) -> Result<()> {
    let mut chatbot = open_chatbot(config).await?;
    let response = chatbot.answer(question).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_response(&response);
    }

    if let Some(detail) = &response.error {
        error!("Answer failed: {}", detail);
    }
    Ok(())
}

/// Filtered search, printed as cards or JSON
#[inline]
pub async fn search_recipes(
    config: &Config,
    query: &str,
    filters: &[String],
    cooking_time: Option<u32>,
    json: bool,
) -> Result<()> {
    let chatbot = open_chatbot(config).await?;
    let cards = chatbot.search(query, filters, cooking_time).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&cards)?);
    } else {
        print_cards(&cards);
    }
    Ok(())
}

/// Recipes for the ingredients at hand
#[inline]
pub async fn suggest(config: &Config, ingredients: &[String], json: bool) -> Result<()> {
    let mut chatbot = open_chatbot(config).await?;
    let Some(suggestions) = chatbot.suggest_by_ingredients(ingredients).await else {
        anyhow::bail!("No ingredients provided");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
        return Ok(());
    }

    println!("{}", suggestions.answer);
    println!();
    println!("🥕 {} matching recipes", suggestions.count);
    for recipe in &suggestions.recipes {
        println!("  • {} ({}, {})", recipe.name, recipe.cuisine, recipe.difficulty);
    }
    Ok(())
}

#[inline]
pub async fn show_stats(config: &Config) -> Result<()> {
    let chatbot = open_chatbot(config).await?;
    let stats = chatbot
        .collection_stats()
        .await
        .context("Failed to read collection stats")?;

    println!("📊 Collection '{}'", stats.collection);
    println!("   Recipes: {}", stats.total_recipes);
    if stats.fields.is_empty() {
        println!("   Fields: none");
    } else {
        println!("   Fields: {}", stats.fields.join(", "));
    }

    let options = chatbot.filter_options().await;
    if !options.cuisines.is_empty() {
        println!("   Cuisines: {}", options.cuisines.join(", "));
    }
    if !options.categories.is_empty() {
        println!("   Categories: {}", options.categories.join(", "));
    }
    Ok(())
}

/// Delete every recipe in the configured collection
#[inline]
pub async fn reset_collection(config: &Config, yes: bool) -> Result<()> {
    let confirmed = yes
        || Confirm::new()
            .with_prompt(format!(
                "Delete all recipes from '{}'?",
                config.store.collection
            ))
            .default(false)
            .interact()?;
    if !confirmed {
        println!("Reset cancelled.");
        return Ok(());
    }

    let chatbot = open_chatbot(config).await?;
    chatbot
        .store()
        .delete_all()
        .await
        .context("Failed to reset collection")?;
    println!("🗑️  Collection '{}' is now empty", config.store.collection);
    Ok(())
}

/// Check the model server, both models and the store
#[inline]
pub async fn health(config: &Config) -> Result<()> {
    let chatbot = open_chatbot(config).await?;
    let report = chatbot.health().await;

    println!("🩺 Recipe Assistant Health");
    println!("{}", "=".repeat(40));

    match &report.backend {
        ComponentHealth::Healthy => println!(
            "   ✅ Ollama: Connected ({}:{}), models {} and {} available",
            config.ollama.host,
            config.ollama.port,
            config.ollama.embedding_model,
            config.ollama.chat_model
        ),
        ComponentHealth::Unavailable(detail) => println!("   ❌ Ollama: {}", detail),
        ComponentHealth::NotConfigured => println!("   ⚠️  Ollama: not configured"),
    }

    match (&report.store, report.recipe_count) {
        (ComponentHealth::Healthy, Some(count)) => {
            println!("   ✅ Recipe store: {} recipes", count);
        }
        (ComponentHealth::Unavailable(detail), _) => println!("   ❌ Recipe store: {}", detail),
        _ => println!("   ⚠️  Recipe store: unknown"),
    }

    if !(report.backend.is_healthy() && report.store.is_healthy()) {
        anyhow::bail!("Health check failed");
    }
    Ok(())
}
