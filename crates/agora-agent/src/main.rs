//! # agora-agent
//!
//! Board tick binary: resolves the schedule for the current instant,
//! generates the round's posts, and writes the mutated document back.
//! Meant to be invoked by an external scheduler (cron or a CI workflow),
//! one tick per invocation.

#![deny(unsafe_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use agora_core::topic::TopicCatalog;
use agora_engine::Engine;
use agora_llm::AnthropicBackend;
use agora_llm::anthropic::DEFAULT_MODEL;

/// Agora debate board tick runner.
#[derive(Parser, Debug)]
#[command(name = "agora-agent", about = "Agora debate board tick runner")]
struct Cli {
    /// Path to the board document.
    #[arg(long, default_value = "public/index.html")]
    document: PathBuf,

    /// Path to the topic catalog.
    #[arg(long, default_value = "public/topics.json")]
    topics: PathBuf,

    /// Model identifier passed to the generation backend.
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Tick instant as RFC 3339; defaults to the current time.
    #[arg(long)]
    now: Option<String>,

    /// Pause between backend calls, in milliseconds.
    #[arg(long, default_value_t = 500)]
    api_delay_ms: u64,
}

fn load_catalog(path: &Path) -> Result<TopicCatalog> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read topic catalog {}", path.display()))?;
    let catalog = TopicCatalog::from_json(&raw)
        .with_context(|| format!("failed to parse topic catalog {}", path.display()))?;
    Ok(catalog)
}

fn parse_now(arg: Option<&str>) -> Result<DateTime<Utc>> {
    match arg {
        Some(raw) => {
            let instant = DateTime::parse_from_rfc3339(raw)
                .with_context(|| format!("invalid --now instant: {raw}"))?;
            Ok(instant.with_timezone(&Utc))
        }
        None => Ok(Utc::now()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Cli::parse();
    let now = parse_now(args.now.as_deref())?;

    let catalog = load_catalog(&args.topics)?;
    let document = std::fs::read_to_string(&args.document)
        .with_context(|| format!("failed to read document {}", args.document.display()))?;

    let backend = Arc::new(AnthropicBackend::from_env(args.model.clone())?);
    info!(model = %args.model, document = %args.document.display(), "starting tick");

    let engine = Engine::with_api_delay(backend, Duration::from_millis(args.api_delay_ms));
    let (mutated, report) = engine.run_tick(now, &document, &catalog).await?;

    std::fs::write(&args.document, mutated)
        .with_context(|| format!("failed to write document {}", args.document.display()))?;
    info!(
        action = ?report.action,
        posts_added = report.posts_added,
        degraded = report.degraded_replies,
        skipped = report.skipped_fragments,
        failed = report.failed_generations,
        "tick persisted"
    );
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
