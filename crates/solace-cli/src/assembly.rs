//! Assembly: builds every component once from config and wires the
//! controller. No globals; everything is passed by `Arc`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use corpus::CorpusStore;
use embedding::{Embedder, EnvEmbeddingConfig, NullEmbedder, OpenAIEmbedder};
use engine::{ConversationController, EngineConfig, ResponseComposer};
use generator::{EnvGeneratorConfig, Generator, OpenAIGenerator};
use memory_model::{Extractor, GeneratorExtractor, HeuristicExtractor, MemoryModel};
use retrieval::RetrievalEngine;
use safety::SafetyGate;
use session_store::{InMemorySessionStore, SessionStore, SqliteSessionStore};
use tracing::{info, warn};

/// Selects the session store: SQLite when a path is given, in-memory
/// otherwise.
pub async fn build_session_store(
    db_path: Option<&str>,
    ttl_minutes: i64,
) -> Result<Arc<dyn SessionStore>> {
    match db_path {
        Some(path) => {
            info!(path, ttl_minutes, "using SQLite session store");
            let store = SqliteSessionStore::new(path, ttl_minutes)
                .await
                .with_context(|| format!("failed to open session database at {}", path))?;
            Ok(Arc::new(store))
        }
        None => {
            info!(ttl_minutes, "using in-memory session store");
            Ok(Arc::new(InMemorySessionStore::new(ttl_minutes)))
        }
    }
}

/// Builds the controller from environment config and the loaded corpus.
///
/// Degrades explicitly: without a generator key the composer is
/// template-only and extraction is heuristic; without an embedding key the
/// query embedder produces zero vectors and retrieval returns nothing.
pub fn build_controller(corpus: Arc<CorpusStore>) -> Result<ConversationController> {
    let engine_config = EngineConfig::from_env();

    let generator_config = EnvGeneratorConfig::from_env()?;
    let generator: Option<Arc<dyn Generator>> = if generator_config.is_configured() {
        info!(model = %generator_config.model, "generator configured");
        Some(Arc::new(
            OpenAIGenerator::with_base_url(
                generator_config.api_key.clone(),
                generator_config.model.clone(),
                generator_config.base_url.as_deref(),
            )
            .with_timeout(Duration::from_secs(generator_config.timeout_secs)),
        ))
    } else {
        warn!("no generator API key; responses use the template bank");
        None
    };

    let embedding_config = EnvEmbeddingConfig::from_env()?;
    let embedder: Arc<dyn Embedder> = if embedding_config.is_configured() {
        info!(model = %embedding_config.model, "embedder configured");
        Arc::new(OpenAIEmbedder::with_base_url(
            embedding_config.api_key.clone(),
            embedding_config.model.clone(),
            embedding_config.base_url.as_deref(),
        ))
    } else {
        warn!("no embedding API key; retrieval will find nothing");
        Arc::new(NullEmbedder::new(
            corpus.dimension().unwrap_or(embedding_config.dimension),
        ))
    };

    let extractor: Arc<dyn Extractor> = match &generator {
        Some(generator) if extractor_strategy() == "generator" => {
            info!("using generator-assisted extraction");
            Arc::new(GeneratorExtractor::new(generator.clone()))
        }
        _ => {
            info!("using heuristic extraction");
            Arc::new(HeuristicExtractor::new())
        }
    };

    let composer = match &generator {
        Some(generator) => ResponseComposer::new(
            generator.clone(),
            Duration::from_secs(engine_config.generator_timeout_secs),
        ),
        None => ResponseComposer::without_generator(),
    };

    let safety = if crisis_detection_enabled() {
        Arc::new(SafetyGate::new())
    } else {
        warn!("crisis detection disengaged via config");
        Arc::new(SafetyGate::disabled())
    };

    Ok(ConversationController::new(
        MemoryModel::new(extractor),
        composer,
        Arc::new(RetrievalEngine::new(corpus)),
        embedder,
        safety,
        engine_config,
    ))
}

fn extractor_strategy() -> String {
    std::env::var("EXTRACTOR_STRATEGY").unwrap_or_else(|_| "heuristic".to_string())
}

fn crisis_detection_enabled() -> bool {
    std::env::var("ENABLE_CRISIS_DETECTION")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(true)
}
