//! solace: interactive companion REPL. Loads the corpus, wires the engine,
//! and processes turns against a session in the configured store.

mod assembly;
mod logger;

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use corpus::CorpusStore;
use session_store::Session;
use tracing::info;

#[derive(Parser)]
#[command(name = "solace", about = "A listening companion grounded in a wisdom corpus")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive conversation.
    Run {
        /// Path to the corpus JSON file with precomputed embeddings.
        #[arg(long)]
        corpus: PathBuf,
        /// SQLite session database path; in-memory sessions when omitted.
        #[arg(long)]
        db: Option<String>,
        /// Session idle expiry, in minutes.
        #[arg(long, default_value_t = 60)]
        ttl_minutes: i64,
        /// Optional log file; console logging is always on.
        #[arg(long)]
        log_file: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            corpus,
            db,
            ttl_minutes,
            log_file,
        } => run(corpus, db, ttl_minutes, log_file).await,
    }
}

async fn run(
    corpus_path: PathBuf,
    db: Option<String>,
    ttl_minutes: i64,
    log_file: Option<String>,
) -> Result<()> {
    logger::init_tracing(log_file.as_deref())?;

    let corpus = Arc::new(
        CorpusStore::load_from_json(&corpus_path)
            .with_context(|| format!("failed to load corpus from {}", corpus_path.display()))?,
    );
    let store = assembly::build_session_store(db.as_deref(), ttl_minutes).await?;
    let controller = assembly::build_controller(corpus)?;

    let session = Session::new();
    let session_id = session.id;
    store.put(session).await?;
    info!(%session_id, "session started");

    println!("I'm here to listen. Share what's on your mind, or type :quit to leave.");

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if message == ":quit" || message == ":q" {
            break;
        }

        let outcome = controller
            .process_stored_turn(store.as_ref(), session_id, message)
            .await?;

        println!("\n{}\n", outcome.response);
        if outcome.is_guidance_turn && !outcome.citations.is_empty() {
            println!("Sources:");
            for citation in &outcome.citations {
                println!("  - {} ({:.2})", citation.reference, citation.score);
            }
            println!();
        }
    }

    store.evict_expired().await?;
    info!(%session_id, "session ended");
    Ok(())
}
