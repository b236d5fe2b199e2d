pub mod levels;
pub mod regime;
pub mod risk;
pub mod summary;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::AnalystError;
use crate::snapshot::MarketSnapshot;

pub use levels::{RiskReward, TradeLevels, TradeLevelsTask};
pub use regime::{Regime, RegimeClassification, RegimeTask};
pub use risk::{RiskAssessment, RiskGuardrailTask, RiskLevel};
pub use summary::{Bias, MarketSummary, MarketSummaryTask};

/// One kind of analysis: how to ask, and what shape the answer must have.
pub trait AnalysisTask: Send + Sync {
    type Output: DeserializeOwned + Serialize + Send;

    fn name(&self) -> &'static str;
    fn prompt(&self, symbol: &str, snapshot: &MarketSnapshot) -> String;

    /// Checks beyond what deserialization already enforces.
    fn validate(&self, _output: &Self::Output) -> Result<(), AnalystError> {
        Ok(())
    }

    fn parse(&self, raw: &str) -> Result<Self::Output, AnalystError> {
        let value: Value = serde_json::from_str(raw.trim())?;
        if !value.is_object() {
            return Err(AnalystError::invalid_field("response", "expected a JSON object"));
        }
        let output: Self::Output = serde_json::from_value(value)?;
        self.validate(&output)?;
        Ok(output)
    }
}

/// Appended to every prompt so the model sees the raw indicators.
pub(crate) fn snapshot_block(snapshot: &MarketSnapshot) -> String {
    format!("Snapshot: {}", snapshot.to_prompt_json())
}

pub(crate) fn check_confidence(value: f64) -> Result<(), AnalystError> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(AnalystError::invalid_field("confidence", value))
    }
}

/// Accepts `42`, `42.5`, `"42"` or `"42%"`.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(s) => s
            .trim()
            .trim_end_matches('%')
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("expected a number, got '{}'", s))),
    }
}

/// Upper-cases and maps spaces/dashes to underscores: `"high volatility"` -> `HIGH_VOLATILITY`.
pub(crate) fn normalize_label(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            other => other.to_ascii_uppercase(),
        })
        .collect()
}
