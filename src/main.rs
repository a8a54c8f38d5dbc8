use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use docchat_cli::{
    clear_screen, display_banner, handle_input_with_history, init_logging, print_answer,
    print_help, print_history, print_sources, print_turn_error, startup_config,
    ConversationMemory, ConversationOrchestrator, EmbedderKind, LogConfig, SessionState,
    TurnOutcome,
};
use docchat_core::{EmbeddingProvider, Error, LLMProvider};
use docchat_gemini::{GeminiClient, GeminiEmbedder};
use docchat_rag::{FlatIndex, HashingEmbedder, MmrRetriever};

#[derive(Parser)]
#[command(name = "docchat")]
#[command(about = "Chat with the GitLab Handbook and Direction documents", long_about = None)]
struct Cli {
    /// Ask a single question and exit
    #[arg(short, long)]
    question: Option<String>,

    /// Directory holding the vector index
    #[arg(long)]
    index_dir: Option<PathBuf>,

    /// Embedding provider the index was built with
    #[arg(long, value_enum)]
    embedder: Option<EmbedderKind>,

    /// Rewrite follow-up questions into standalone ones before retrieval
    #[arg(long)]
    condense_followups: bool,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_logging(&LogConfig {
        file: cli.log_file.clone(),
        ..Default::default()
    })?;

    let (gemini, mut settings) = match startup_config(|key| env::var(key).ok()) {
        Ok(config) => config,
        Err(Error::StartupConfig(message)) => {
            eprintln!("{} {}", "❌".red(), message.red());
            std::process::exit(2);
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(dir) = cli.index_dir {
        settings.index_dir = dir;
    }
    if let Some(kind) = cli.embedder {
        settings.embedder = kind;
    }
    settings.condense_followups |= cli.condense_followups;

    let embedder: Arc<dyn EmbeddingProvider> = match settings.embedder {
        EmbedderKind::Hashing => Arc::new(HashingEmbedder::default()),
        EmbedderKind::Gemini => Arc::new(GeminiEmbedder::new(gemini.clone())?),
    };

    let index = FlatIndex::load_for(&settings.index_dir, embedder.as_ref()).with_context(|| {
        format!(
            "Could not load the vector index from {} (run docchat-index first)",
            settings.index_dir.display()
        )
    })?;
    tracing::info!(stats = %index.stats(), "Vector index loaded");
    let index_summary = format!(
        "Index: {} passages · {}",
        index.len(),
        index.manifest().embedding_model
    );

    let retriever = Arc::new(MmrRetriever::with_config(
        embedder,
        Arc::new(index),
        settings.retrieval.clone(),
    ));
    let llm = Arc::new(GeminiClient::new(gemini)?);
    let orchestrator = ConversationOrchestrator::with_config(
        llm.clone(),
        retriever,
        settings.orchestrator_config(llm.model_id()),
    );

    let mut state = SessionState::new(ConversationMemory::with_config(llm, settings.memory.clone()));
    tracing::debug!(session = %state.id, "Session started");

    if let Some(question) = cli.question {
        let (_, outcome) = state.handle_question(&orchestrator, &question).await;
        match outcome {
            TurnOutcome::Answered(answer) => {
                print_answer(&answer);
                print_sources(Some(&answer.sources));
                return Ok(());
            }
            TurnOutcome::Failed(e) => {
                print_turn_error(&e);
                std::process::exit(1);
            }
        }
    }

    display_banner(Some(&index_summary));

    let mut input_history = Vec::new();

    loop {
        let Some(input) = handle_input_with_history(&mut input_history).await? else {
            break;
        };

        if input.is_empty() {
            continue;
        }

        match input.to_lowercase().as_str() {
            "exit" | "quit" => {
                println!("{}", "👋 Goodbye!".green());
                break;
            }
            "help" => {
                print_help();
                continue;
            }
            "history" => {
                print_history(&state.history);
                continue;
            }
            "sources" => {
                print_sources(state.last_sources.as_ref());
                continue;
            }
            "clear" => {
                state.reset();
                clear_screen()?;
                display_banner(Some(&index_summary));
                continue;
            }
            _ => {}
        }

        println!("{}", "🤖 Thinking... generating response...".dimmed());
        let (next, outcome) = state.handle_question(&orchestrator, &input).await;
        state = next;

        match outcome {
            TurnOutcome::Answered(answer) => print_answer(&answer),
            TurnOutcome::Failed(e) => print_turn_error(&e),
        }
    }

    Ok(())
}
