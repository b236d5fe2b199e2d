use serde::{Deserialize, Serialize};

use super::{check_confidence, lenient_f64, normalize_label, snapshot_block, AnalysisTask};
use crate::error::AnalystError;
use crate::snapshot::MarketSnapshot;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum Bias {
    Bullish,
    Bearish,
    Neutral,
}

impl TryFrom<String> for Bias {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        match normalize_label(&raw).as_str() {
            "BULLISH" => Ok(Bias::Bullish),
            "BEARISH" => Ok(Bias::Bearish),
            "NEUTRAL" => Ok(Bias::Neutral),
            _ => Err(format!("unknown bias '{}'", raw)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketSummary {
    pub summary: String,
    pub bias: Bias,
    #[serde(deserialize_with = "lenient_f64")]
    pub confidence: f64,
}

pub struct MarketSummaryTask;

impl AnalysisTask for MarketSummaryTask {
    type Output = MarketSummary;

    fn name(&self) -> &'static str {
        "market-summary"
    }

    fn prompt(&self, symbol: &str, snapshot: &MarketSnapshot) -> String {
        format!(
            r#"You are a professional trading assistant.
Analyze the market snapshot for {symbol} and produce:
1. A 1-2 sentence market summary
2. Bias: BULLISH / BEARISH / NEUTRAL
3. Confidence score (0-100)

Rules:
- Do NOT predict future prices
- Focus on momentum, volume and context

Return JSON with: summary, bias, confidence

{snapshot}
"#,
            symbol = symbol,
            snapshot = snapshot_block(snapshot)
        )
    }

    fn validate(&self, output: &MarketSummary) -> Result<(), AnalystError> {
        if output.summary.trim().is_empty() {
            return Err(AnalystError::invalid_field("summary", "empty"));
        }
        check_confidence(output.confidence)
    }
}
