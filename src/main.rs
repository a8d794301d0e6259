use clap::{Parser, Subcommand};
use recipe_assistant::Result;
use recipe_assistant::commands::{
    ask, chat, health, ingest_recipes, reset_collection, search_recipes, show_stats, suggest,
};
use recipe_assistant::config::{Config, run_interactive_config, show_config};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "recipe-assistant")]
#[command(about = "A conversational recipe assistant backed by a local vector store")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure Ollama connection and settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Load recipes from a JSON or JSON Lines file
    Ingest {
        /// Path to the recipe feed
        file: PathBuf,
        /// Empty the collection before loading
        #[arg(long)]
        reset: bool,
    },
    /// Start an interactive conversation
    Chat,
    /// Ask a single question
    Ask {
        question: String,
        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search recipes with filters
    Search {
        query: String,
        /// Filter tag, e.g. veg, non-veg, dinner, dessert, servings-3-4 (repeatable)
        #[arg(long = "filter", short = 'f')]
        filters: Vec<String>,
        /// Maximum cooking time in minutes (default 30)
        #[arg(long)]
        cooking_time: Option<u32>,
        /// Print cards as JSON
        #[arg(long)]
        json: bool,
    },
    /// Suggest recipes for the ingredients you have
    Suggest {
        #[arg(required = true)]
        ingredients: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Show collection statistics
    Stats,
    /// Delete every recipe in the collection
    Reset {
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Check Ollama, the configured models and the recipe store
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                run_interactive_config()?;
            }
        }
        Commands::Ingest { file, reset } => {
            ingest_recipes(&Config::load_default()?, &file, reset).await?;
        }
        Commands::Chat => {
            chat(&Config::load_default()?).await?;
        }
        Commands::Ask { question, json } => {
            ask(&Config::load_default()?, &question, json).await?;
        }
        Commands::Search {
            query,
            filters,
            cooking_time,
            json,
        } => {
            search_recipes(&Config::load_default()?, &query, &filters, cooking_time, json).await?;
        }
        Commands::Suggest { ingredients, json } => {
            suggest(&Config::load_default()?, &ingredients, json).await?;
        }
        Commands::Stats => {
            show_stats(&Config::load_default()?).await?;
        }
        Commands::Reset { yes } => {
            reset_collection(&Config::load_default()?, yes).await?;
        }
        Commands::Health => {
            health(&Config::load_default()?).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn cli_parsing() {
        let cli = Cli::try_parse_from(["recipe-assistant", "stats"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            assert!(matches!(parsed.command, Commands::Stats));
        }
    }

    #[test]
    fn ingest_command_with_reset() {
        let cli = Cli::try_parse_from(["recipe-assistant", "ingest", "recipes.jsonl", "--reset"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Ingest { file, reset } = parsed.command {
                assert_eq!(file, PathBuf::from("recipes.jsonl"));
                assert!(reset);
            }
        }
    }

    #[test]
    fn search_command_with_filters() {
        let cli = Cli::try_parse_from([
            "recipe-assistant",
            "search",
            "pasta",
            "--filter",
            "veg",
            "-f",
            "dinner",
            "--cooking-time",
            "45",
        ]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Search {
                query,
                filters,
                cooking_time,
                json,
            } = parsed.command
            {
                assert_eq!(query, "pasta");
                assert_eq!(filters, vec!["veg", "dinner"]);
                assert_eq!(cooking_time, Some(45));
                assert!(!json);
            }
        }
    }

    #[test]
    fn suggest_requires_ingredients() {
        let cli = Cli::try_parse_from(["recipe-assistant", "suggest"]);
        assert!(cli.is_err());

        let cli = Cli::try_parse_from(["recipe-assistant", "suggest", "chicken", "rice"]);
        if let Ok(parsed) = cli {
            if let Commands::Suggest { ingredients, .. } = parsed.command {
                assert_eq!(ingredients, vec!["chicken", "rice"]);
            }
        }
    }

    #[test]
    fn config_show_flag() {
        let cli = Cli::try_parse_from(["recipe-assistant", "config", "--show"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Config { show } = parsed.command {
                assert!(show);
            }
        }
    }

    #[test]
    fn invalid_command() {
        let cli = Cli::try_parse_from(["recipe-assistant", "invalid"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
        }
    }

    #[test]
    fn help_message() {
        let cli = Cli::try_parse_from(["recipe-assistant", "--help"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        }
    }
}
