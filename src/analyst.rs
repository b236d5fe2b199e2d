//! Market analyst
//!
//! [`MarketAnalyst`] turns a symbol and a [`MarketSnapshot`] into one of four
//! structured insights by asking the hosted model exactly once. Failures never
//! escape: every operation answers with an [`AnalystResponse`], which is either
//! the typed result or `{"error": "..."}`.
//!
//! Instances come from an [`AnalystFactory`]. [`AnalystHandle`] keeps one built
//! instance around and can rebuild it to pick up a new credential;
//! [`get_market_analyst`] is a process-wide handle over the default factory.

use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::AnalystConfig;
use crate::constants::credentials::ENV_VARS;
use crate::credentials::{ApiKey, CredentialChain, CredentialSource, SecretsLocation};
use crate::error::AnalystError;
use crate::llm::{ChatBackend, ChatRequest, LLMClient};
use crate::snapshot::MarketSnapshot;
use crate::tasks::{
    AnalysisTask, MarketSummary, MarketSummaryTask, RegimeClassification, RegimeTask,
    RiskAssessment, RiskGuardrailTask, TradeLevels, TradeLevelsTask,
};

/// Result of one analysis call, serialized as either the result's own fields
/// or a single `error` field.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalystResponse<T> {
    Ready(T),
    Failed { error: String },
}

impl<T> AnalystResponse<T> {
    pub fn failed(error: impl ToString) -> Self {
        AnalystResponse::Failed {
            error: error.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, AnalystResponse::Failed { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AnalystResponse::Failed { error } => Some(error),
            AnalystResponse::Ready(_) => None,
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            AnalystResponse::Ready(value) => Some(value),
            AnalystResponse::Failed { .. } => None,
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match self {
            AnalystResponse::Ready(value) => Ok(value),
            AnalystResponse::Failed { error } => Err(error),
        }
    }
}

impl<T: Serialize> AnalystResponse<T> {
    /// The response as a plain JSON mapping, the shape the dashboard renders.
    pub fn to_mapping(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|e| json!({ "error": e.to_string() }))
    }
}

/// What the dashboard shows in its AI status badge.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalystStatus {
    pub enabled: bool,
    pub model: String,
    pub credential_source: Option<String>,
}

pub struct MarketAnalyst {
    config: AnalystConfig,
    backend: Option<Arc<dyn ChatBackend>>,
    credential_source: Option<CredentialSource>,
}

impl MarketAnalyst {
    /// Resolves a key (explicit, then environment, then `.env`) and builds an
    /// analyst with default settings. Never fails; see [`MarketAnalyst::is_enabled`].
    pub fn new(api_key: Option<String>) -> Self {
        let mut factory = AnalystFactory::new(AnalystConfig::default());
        if let Some(key) = api_key {
            factory = factory.with_api_key(key);
        }
        factory.build()
    }

    /// An analyst with no credential; every call answers `AI Service Disabled`.
    pub fn disabled(config: AnalystConfig) -> Self {
        Self {
            config,
            backend: None,
            credential_source: None,
        }
    }

    pub fn with_backend(
        config: AnalystConfig,
        backend: Arc<dyn ChatBackend>,
        credential_source: Option<CredentialSource>,
    ) -> Self {
        Self {
            config,
            backend: Some(backend),
            credential_source,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub fn config(&self) -> &AnalystConfig {
        &self.config
    }

    pub fn credential_source(&self) -> Option<&CredentialSource> {
        self.credential_source.as_ref()
    }

    pub fn status(&self) -> AnalystStatus {
        AnalystStatus {
            enabled: self.is_enabled(),
            model: self.config.model.clone(),
            credential_source: self.credential_source.as_ref().map(ToString::to_string),
        }
    }

    /// Short summary with a directional bias and confidence.
    pub async fn generate_market_summary(
        &self,
        symbol: &str,
        snapshot: &MarketSnapshot,
    ) -> AnalystResponse<MarketSummary> {
        self.run(&MarketSummaryTask, symbol, snapshot).await
    }

    /// One of TREND, RANGE, BREAKOUT, HIGH_VOLATILITY or LOW_LIQUIDITY.
    pub async fn detect_regime(
        &self,
        symbol: &str,
        snapshot: &MarketSnapshot,
    ) -> AnalystResponse<RegimeClassification> {
        self.run(&RegimeTask, symbol, snapshot).await
    }

    /// Pre-trade LOW/MEDIUM/HIGH risk check.
    pub async fn check_risk_guardrail(
        &self,
        symbol: &str,
        snapshot: &MarketSnapshot,
    ) -> AnalystResponse<RiskAssessment> {
        self.run(&RiskGuardrailTask, symbol, snapshot).await
    }

    /// Stop-loss and take-profit derived from ATR and VWAP distance.
    pub async fn suggest_trade_levels(
        &self,
        symbol: &str,
        snapshot: &MarketSnapshot,
    ) -> AnalystResponse<TradeLevels> {
        self.run(&TradeLevelsTask, symbol, snapshot).await
    }

    /// Builds the task prompt, makes one model call and parses the answer.
    pub async fn run<T: AnalysisTask>(
        &self,
        task: &T,
        symbol: &str,
        snapshot: &MarketSnapshot,
    ) -> AnalystResponse<T::Output> {
        let request_id = Uuid::new_v4();
        let span = info_span!("analysis", task = task.name(), symbol, %request_id);

        let outcome = async {
            let raw = self.call_model(task.prompt(symbol, snapshot)).await?;
            task.parse(&raw)
        }
        .instrument(span)
        .await;

        match outcome {
            Ok(output) => AnalystResponse::Ready(output),
            Err(AnalystError::Disabled) => {
                warn!("⚠️ {} skipped for {}: AI service disabled", task.name(), symbol);
                AnalystResponse::failed(AnalystError::Disabled)
            }
            Err(e) => {
                error!("LLM call failed ({} for {}): {}", task.name(), symbol, e);
                AnalystResponse::failed(e)
            }
        }
    }

    async fn call_model(&self, user_prompt: String) -> Result<String, AnalystError> {
        let backend = self.backend.as_ref().ok_or(AnalystError::Disabled)?;
        let request = ChatRequest::json(&self.config, user_prompt);
        backend.complete(&request).await
    }
}

pub type BackendBuilder =
    Arc<dyn Fn(&ApiKey, &AnalystConfig) -> Arc<dyn ChatBackend> + Send + Sync>;

/// Builds [`MarketAnalyst`]s. Each [`AnalystFactory::build`] re-resolves the key.
#[derive(Clone)]
pub struct AnalystFactory {
    config: AnalystConfig,
    api_key: Option<String>,
    env_vars: Vec<String>,
    backend: BackendBuilder,
}

impl AnalystFactory {
    pub fn new(config: AnalystConfig) -> Self {
        Self {
            config,
            api_key: None,
            env_vars: ENV_VARS.iter().map(|name| name.to_string()).collect(),
            backend: Arc::new(|key: &ApiKey, config: &AnalystConfig| -> Arc<dyn ChatBackend> {
                Arc::new(LLMClient::from_config(key, config))
            }),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Environment variables to consult, in order.
    pub fn with_env_vars<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.env_vars = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_secrets_file(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.config.secrets_file = Some(path.into());
        self
    }

    /// Replaces the hosted-model client, e.g. with a local stand-in.
    pub fn with_backend<F>(mut self, builder: F) -> Self
    where
        F: Fn(&ApiKey, &AnalystConfig) -> Arc<dyn ChatBackend> + Send + Sync + 'static,
    {
        self.backend = Arc::new(builder);
        self
    }

    pub fn config(&self) -> &AnalystConfig {
        &self.config
    }

    pub fn credential_chain(&self) -> CredentialChain {
        CredentialChain::standard(
            self.api_key.clone(),
            &self.env_vars,
            SecretsLocation::from_config(self.config.secrets_file.clone()),
        )
    }

    pub fn build(&self) -> MarketAnalyst {
        info!("🧠 Initializing AI Service (model: {})", self.config.model);

        match self.credential_chain().resolve() {
            Some(found) => {
                let backend = (self.backend)(&found.key, &self.config);
                MarketAnalyst::with_backend(self.config.clone(), backend, Some(found.source))
            }
            None => {
                error!("❌ AI service disabled: no API key available");
                MarketAnalyst::disabled(self.config.clone())
            }
        }
    }
}

/// Lazily built analyst that can be rebuilt in place.
///
/// A rebuild swaps the shared instance; calls already holding the previous
/// `Arc` finish against it.
pub struct AnalystHandle {
    factory: AnalystFactory,
    current: RwLock<Option<Arc<MarketAnalyst>>>,
}

impl AnalystHandle {
    pub fn new(factory: AnalystFactory) -> Self {
        Self {
            factory,
            current: RwLock::new(None),
        }
    }

    pub fn get(&self) -> Arc<MarketAnalyst> {
        self.get_or_refresh(false)
    }

    /// Drops the current instance and builds a new one, re-resolving the key.
    pub fn refresh(&self) -> Arc<MarketAnalyst> {
        self.get_or_refresh(true)
    }

    pub fn get_or_refresh(&self, force_refresh: bool) -> Arc<MarketAnalyst> {
        if !force_refresh {
            let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(analyst) = current.as_ref() {
                return Arc::clone(analyst);
            }
        }

        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if !force_refresh {
            if let Some(analyst) = current.as_ref() {
                return Arc::clone(analyst);
            }
        }

        info!("🔄 Refreshing AI Service Instance");
        let analyst = Arc::new(self.factory.build());
        *current = Some(Arc::clone(&analyst));
        analyst
    }
}

static SHARED: OnceLock<AnalystHandle> = OnceLock::new();

/// Process-wide handle over the default factory.
pub fn shared_handle() -> &'static AnalystHandle {
    SHARED.get_or_init(|| AnalystHandle::new(AnalystFactory::new(AnalystConfig::default())))
}

pub fn get_market_analyst(force_refresh: bool) -> Arc<MarketAnalyst> {
    shared_handle().get_or_refresh(force_refresh)
}
