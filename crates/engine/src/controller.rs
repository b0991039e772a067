//! Per-turn orchestration.
//!
//! For each incoming message: safety gate, phase evaluation on the
//! accumulated understanding, memory update, then the composition path for
//! the resulting phase. Guidance turns run query synthesis, embedding,
//! retrieval and composition, and finish with the oscillation control
//! (readiness reset plus last_guidance_turn bookkeeping).
//!
//! The controller holds only shared, read-only or internally-synchronized
//! components and takes the session by `&mut`: callers serialize turns per
//! session, independent sessions run in parallel.

use std::sync::Arc;

use embedding::Embedder;
use memory_model::MemoryModel;
use retrieval::{RetrievalEngine, ScoredPassage, SearchRequest};
use safety::SafetyGate;
use session_store::{Phase, Role, Session, SessionStore};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::composer::ResponseComposer;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::phase::PhaseMachine;
use crate::synthesizer::synthesize;

/// A citation for one passage used in a guidance response.
#[derive(Debug, Clone)]
pub struct Citation {
    pub reference: String,
    pub source: String,
    pub excerpt: String,
    pub score: f32,
}

/// Citations surfaced per guidance turn.
const CITATION_LIMIT: usize = 2;

/// Result of processing one turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub response: String,
    pub phase: Phase,
    pub is_guidance_turn: bool,
    pub citations: Vec<Citation>,
}

/// Orchestrates one conversation turn across all components.
pub struct ConversationController {
    memory_model: MemoryModel,
    phase_machine: PhaseMachine,
    composer: ResponseComposer,
    retrieval: Arc<RetrievalEngine>,
    embedder: Arc<dyn Embedder>,
    safety: Arc<SafetyGate>,
    config: EngineConfig,
}

impl ConversationController {
    pub fn new(
        memory_model: MemoryModel,
        composer: ResponseComposer,
        retrieval: Arc<RetrievalEngine>,
        embedder: Arc<dyn Embedder>,
        safety: Arc<SafetyGate>,
        config: EngineConfig,
    ) -> Self {
        Self {
            memory_model,
            phase_machine: PhaseMachine::new(config.clone()),
            composer,
            retrieval,
            embedder,
            safety,
            config,
        }
    }

    /// Processes one user message against a session the caller owns.
    ///
    /// Always produces a response; internal failures resolve to fallback
    /// paths inside the turn.
    pub async fn process_turn(&self, session: &mut Session, message: &str) -> TurnOutcome {
        // Crisis interception leaves phase and turn count exactly as they
        // were; only the exchange is recorded.
        if let Some(payload) = self.safety.check_crisis(message) {
            let response = payload.render();
            session.add_message(Role::User, message);
            session.add_message(Role::Assistant, response.clone());
            info!(session_id = %session.id, "crisis interception");
            return TurnOutcome {
                response,
                phase: session.phase,
                is_guidance_turn: false,
                citations: Vec::new(),
            };
        }

        session.turn_count += 1;
        session.add_message(Role::User, message);
        let turn = session.turn_count;

        // Phase is decided on the understanding accumulated so far: readiness
        // that crosses the threshold during this turn's update makes the NEXT
        // turn the guidance turn.
        let phase = self.phase_machine.evaluate(session, message);

        self.memory_model
            .update(&mut session.memory, turn, message)
            .await;

        debug!(
            session_id = %session.id,
            turn,
            readiness = session.memory.readiness_for_wisdom,
            phase = phase.as_str(),
            "turn evaluated"
        );

        let (response, citations) = match phase {
            Phase::Guidance => self.guidance_turn(session).await,
            Phase::Listening => (self.composer.next_question(&session.memory, turn), Vec::new()),
            Phase::Closure => (self.composer.closure_response(), Vec::new()),
        };

        let response = self.safety.sanitize_response(&response);

        session.phase = phase;
        session.add_message(Role::Assistant, response.clone());

        TurnOutcome {
            response,
            phase,
            is_guidance_turn: phase == Phase::Guidance,
            citations,
        }
    }

    /// Loads a session from the store, processes the turn, and writes it
    /// back. Absent or expired sessions surface as [`EngineError::SessionNotFound`].
    pub async fn process_stored_turn(
        &self,
        store: &dyn SessionStore,
        id: Uuid,
        message: &str,
    ) -> Result<TurnOutcome, EngineError> {
        let mut session = store
            .get(id)
            .await
            .map_err(EngineError::Store)?
            .ok_or(EngineError::SessionNotFound(id))?;

        let outcome = self.process_turn(&mut session, message).await;

        store.put(session).await.map_err(EngineError::Store)?;
        Ok(outcome)
    }

    async fn guidance_turn(&self, session: &mut Session) -> (String, Vec<Citation>) {
        let (query, directives) = synthesize(&session.memory);

        let query_vector = match self.embedder.embed(&query).await {
            Ok(vector) => vector,
            Err(e) => {
                // Zero vector scores nothing; composition proceeds on
                // templates alone.
                warn!(error = %e, "query embedding failed, retrieving nothing");
                vec![0.0; self.retrieval.corpus().dimension().unwrap_or(0)]
            }
        };

        let request = SearchRequest {
            allowed_sources: directives.allowed_sources.clone(),
            boost_concepts: directives.concepts.clone(),
            language: self.config.language.clone(),
            min_score: self.config.min_similarity,
            top_k: self.config.top_k,
        };
        let passages = self.retrieval.search(&query_vector, &request);

        let response = self
            .composer
            .compose_guidance(&directives, &passages, &session.memory)
            .await;

        // Oscillation control: force listening before guidance can recur.
        session.last_guidance_turn = Some(session.turn_count);
        session.memory.readiness_for_wisdom = self.config.readiness_reset;
        info!(
            session_id = %session.id,
            turn = session.turn_count,
            passages = passages.len(),
            "guidance turn composed"
        );

        (response, citations_from(&passages))
    }
}

fn citations_from(passages: &[ScoredPassage]) -> Vec<Citation> {
    passages
        .iter()
        .take(CITATION_LIMIT)
        .map(|p| Citation {
            reference: p.passage.reference.clone(),
            source: p.passage.source.clone(),
            excerpt: p.passage.text.chars().take(200).collect(),
            score: p.score,
        })
        .collect()
}
