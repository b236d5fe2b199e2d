use serde::{Deserialize, Serialize};

use super::{normalize_label, snapshot_block, AnalysisTask};
use crate::error::AnalystError;
use crate::snapshot::MarketSnapshot;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl TryFrom<String> for RiskLevel {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        match normalize_label(&raw).as_str() {
            "LOW" => Ok(RiskLevel::Low),
            "MEDIUM" => Ok(RiskLevel::Medium),
            "HIGH" => Ok(RiskLevel::High),
            _ => Err(format!("unknown risk_level '{}'", raw)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_level: RiskLevel,
    pub explanation: String,
}

pub struct RiskGuardrailTask;

impl AnalysisTask for RiskGuardrailTask {
    type Output = RiskAssessment;

    fn name(&self) -> &'static str {
        "risk-guardrail"
    }

    fn prompt(&self, symbol: &str, snapshot: &MarketSnapshot) -> String {
        format!(
            r#"Evaluate trade safety for {symbol}.
Consider: Spread, Liquidity, Volatility, Session.
Return JSON with:
- risk_level: LOW / MEDIUM / HIGH
- explanation: 1 sentence reason

{snapshot}
"#,
            symbol = symbol,
            snapshot = snapshot_block(snapshot)
        )
    }

    fn validate(&self, output: &RiskAssessment) -> Result<(), AnalystError> {
        if output.explanation.trim().is_empty() {
            return Err(AnalystError::invalid_field("explanation", "empty"));
        }
        Ok(())
    }
}
