//! Engine tunables.
//!
//! The threshold, cooldown and reset constants varied across deployments of
//! the predecessor system, so all of them live here as plain configuration
//! with one consistent default set, overridable from the environment.

use std::env;

/// Tunable thresholds and retrieval parameters.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Readiness at or above this transitions to guidance.
    pub readiness_threshold: f32,
    /// Readiness is forced down to this after every guidance turn, so the
    /// next turns go back to listening before guidance can recur.
    pub readiness_reset: f32,
    /// Minimum turns between two guidance turns.
    pub guidance_cooldown_turns: u32,
    /// Hard cap: guidance is offered by this turn even if readiness never
    /// crosses the threshold.
    pub max_listening_turns: u32,
    /// Passages requested per retrieval.
    pub top_k: usize,
    /// Passages scoring below this are never used.
    pub min_similarity: f32,
    /// Language filter for retrieved passages.
    pub language: String,
    /// Upper bound on one generator call during composition.
    pub generator_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            readiness_threshold: 0.7,
            readiness_reset: 0.3,
            guidance_cooldown_turns: 2,
            max_listening_turns: 8,
            top_k: 7,
            min_similarity: 0.15,
            language: "en".to_string(),
            generator_timeout_secs: 20,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl EngineConfig {
    /// Loads config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            readiness_threshold: env_parse("READINESS_THRESHOLD", defaults.readiness_threshold),
            readiness_reset: env_parse("READINESS_RESET", defaults.readiness_reset),
            guidance_cooldown_turns: env_parse(
                "GUIDANCE_COOLDOWN_TURNS",
                defaults.guidance_cooldown_turns,
            ),
            max_listening_turns: env_parse("MAX_LISTENING_TURNS", defaults.max_listening_turns),
            top_k: env_parse("RETRIEVAL_TOP_K", defaults.top_k),
            min_similarity: env_parse("MIN_SIMILARITY_SCORE", defaults.min_similarity),
            language: env::var("RESPONSE_LANGUAGE").unwrap_or(defaults.language),
            generator_timeout_secs: env_parse(
                "GENERATOR_TIMEOUT_SECS",
                defaults.generator_timeout_secs,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_consistent() {
        let config = EngineConfig::default();
        assert!(config.readiness_reset < config.readiness_threshold);
        assert!(config.readiness_threshold <= 1.0);
        assert!(config.guidance_cooldown_turns >= 1);
        assert!(config.max_listening_turns > config.guidance_cooldown_turns);
    }
}
