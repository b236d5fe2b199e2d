//! Application-wide constants
//!
//! Model parameters, credential names and fixed messages live here so the
//! analyst, the config defaults and the tests agree on one value.

/// Credential lookup constants
pub mod credentials {
    /// Canonical environment variable holding the Groq API key
    pub const CANONICAL_ENV_VAR: &str = "GROQ_API_KEY";

    /// Legacy misspelling still found in older deployments
    pub const LEGACY_ENV_VAR: &str = "GROK_API_KEY";

    /// Names accepted by the environment and secrets-file tiers, in lookup order
    pub const ENV_VARS: [&str; 2] = [CANONICAL_ENV_VAR, LEGACY_ENV_VAR];

    /// Secrets file searched for from the working directory upward
    pub const SECRETS_FILE_NAME: &str = ".env";
}

/// Hosted model constants
pub mod llm {
    /// Groq's OpenAI-compatible API root
    pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

    pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

    /// Low temperature favors consistent answers over creative ones
    pub const TEMPERATURE: f32 = 0.4;

    /// Output ceiling per response
    pub const MAX_TOKENS: u32 = 512;

    /// Always sent ahead of the task prompt
    pub const SYSTEM_PROMPT: &str =
        "You are a specialized trading AI. Output strictly valid JSON.";
}

/// Trade-level sanity band (reward multiple of risk)
pub mod risk_reward {
    pub const MIN: f64 = 1.5;
    pub const MAX: f64 = 3.0;
}

/// Server defaults
pub mod server {
    pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
    pub const CONFIG_PATH: &str = "config.yaml";
}
