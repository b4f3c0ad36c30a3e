//! # GuideBot — grounded Q&A over a product user manual
//!
//! Usage:
//!   guidebot serve                         # Start the HTTP gateway
//!   guidebot ingest --pages pages.json     # Build the knowledge base
//!   guidebot ask "how do I print a receipt?"

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use guidebot_core::config::GuideBotConfig;
use guidebot_engine::{EngineOptions, RagEngine};

#[derive(Parser)]
#[command(
    name = "guidebot",
    version,
    about = "📖 GuideBot — grounded question answering over a product user manual"
)]
struct Cli {
    /// Path to config TOML (default: ~/.guidebot/config.toml)
    #[arg(long)]
    config: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP gateway
    Serve {
        /// Override listen host
        #[arg(long)]
        host: Option<String>,
        /// Override listen port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Build the knowledge base from extracted manual pages
    Ingest {
        /// Extracted pages JSON produced by the PDF/vision extractor
        #[arg(long)]
        pages: String,
    },
    /// Ask a single question from the command line
    Ask {
        #[arg(required = true)]
        question: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "guidebot=debug,tower_http=debug"
    } else {
        "guidebot=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config = match &cli.config {
        Some(path) => {
            let expanded = shellexpand::tilde(path).to_string();
            GuideBotConfig::load_from(Path::new(&expanded))?
        }
        None => GuideBotConfig::load()?,
    };

    match cli.command {
        Command::Serve { host, port } => {
            let mut config = config;
            if let Some(host) = host {
                config.gateway.host = host;
            }
            if let Some(port) = port {
                config.gateway.port = port;
            }
            guidebot_gateway::start(&config).await
        }
        Command::Ingest { pages } => ingest(&config, &pages).await,
        Command::Ask { question } => ask(&config, &question.join(" ")).await,
    }
}

/// Chunk, embed, and write the knowledge base from an extracted-pages file.
async fn ingest(config: &GuideBotConfig, pages_path: &str) -> Result<()> {
    let path = shellexpand::tilde(pages_path).to_string();
    let content =
        std::fs::read_to_string(&path).with_context(|| format!("reading pages file {path}"))?;
    let doc: guidebot_ingest::ExtractedPages =
        serde_json::from_str(&content).context("parsing extracted pages")?;

    let embedder = guidebot_providers::create_embedding_provider(config)?;
    let store = guidebot_knowledge::create_store(config)?;

    let kb = guidebot_ingest::build_knowledge_base(
        &doc.pages,
        embedder.as_ref(),
        &config.ingest,
        &config.embedding.model,
        &doc.vision_model,
    )
    .await?;
    let status = store.rebuild(kb).await?;

    tracing::info!(
        "✅ Knowledge base ready: {} chunks ({} backend)",
        status.chunk_count,
        store.name()
    );
    Ok(())
}

/// One-shot question from the command line.
async fn ask(config: &GuideBotConfig, question: &str) -> Result<()> {
    let question = question.trim();
    if question.is_empty() {
        anyhow::bail!("Question is required");
    }

    let embedder = guidebot_providers::create_embedding_provider(config)?;
    let completer = guidebot_providers::create_completion_provider(config)?;
    let store = guidebot_knowledge::create_store(config)?;
    let engine = RagEngine::new(
        embedder,
        completer,
        store,
        EngineOptions::from_config(config),
    );

    let answer = engine.ask(question).await;
    println!("{}", answer.answer);
    if !answer.sources.is_empty() {
        println!();
        println!("Sources:");
        for source in &answer.sources {
            println!(
                "— page {} (similarity {:.2}): {}",
                source.page, source.similarity, source.text
            );
        }
    }
    Ok(())
}
