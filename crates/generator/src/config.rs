//! Generator configuration loaded from environment variables.

use anyhow::Result;
use std::env;

/// Generator config loaded from environment variables.
///
/// `GENERATOR_API_KEY` falls back to `OPENAI_API_KEY`. When neither is set,
/// the assembly runs without a generator and every turn uses the template
/// fallback path.
#[derive(Debug, Clone)]
pub struct EnvGeneratorConfig {
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

impl EnvGeneratorConfig {
    /// Load from environment variables.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("GENERATOR_API_KEY")
            .or_else(|_| env::var("OPENAI_API_KEY"))
            .unwrap_or_default();
        let base_url = env::var("GENERATOR_BASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());
        let model = env::var("GENERATOR_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let timeout_secs = env::var("GENERATOR_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(20);
        Ok(Self {
            api_key,
            base_url,
            model,
            timeout_secs,
        })
    }

    /// True when an API key is present and the real generator can be built.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}
