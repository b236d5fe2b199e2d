use serde::{Deserialize, Serialize};

use super::{check_confidence, lenient_f64, normalize_label, snapshot_block, AnalysisTask};
use crate::error::AnalystError;
use crate::snapshot::MarketSnapshot;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum Regime {
    Trend,
    Range,
    Breakout,
    HighVolatility,
    LowLiquidity,
}

impl Regime {
    pub const ALL: [Regime; 5] = [
        Regime::Trend,
        Regime::Range,
        Regime::Breakout,
        Regime::HighVolatility,
        Regime::LowLiquidity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Regime::Trend => "TREND",
            Regime::Range => "RANGE",
            Regime::Breakout => "BREAKOUT",
            Regime::HighVolatility => "HIGH_VOLATILITY",
            Regime::LowLiquidity => "LOW_LIQUIDITY",
        }
    }
}

impl TryFrom<String> for Regime {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        let label = normalize_label(&raw);
        Regime::ALL
            .into_iter()
            .find(|regime| regime.as_str() == label)
            .ok_or_else(|| format!("unknown regime '{}'", raw))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegimeClassification {
    pub regime: Regime,
    #[serde(deserialize_with = "lenient_f64")]
    pub confidence: f64,
    pub reason: String,
}

pub struct RegimeTask;

impl AnalysisTask for RegimeTask {
    type Output = RegimeClassification;

    fn name(&self) -> &'static str {
        "regime-detection"
    }

    fn prompt(&self, symbol: &str, snapshot: &MarketSnapshot) -> String {
        let choices: Vec<&str> = Regime::ALL.iter().map(Regime::as_str).collect();
        format!(
            r#"Classify the current market regime for {symbol}.
Choose exactly ONE of: [{choices}]
Return JSON with: regime, confidence (0-100), reason.

{snapshot}
"#,
            symbol = symbol,
            choices = choices.join(", "),
            snapshot = snapshot_block(snapshot)
        )
    }

    fn validate(&self, output: &RegimeClassification) -> Result<(), AnalystError> {
        check_confidence(output.confidence)
    }
}
