use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use super::{lenient_f64, snapshot_block, AnalysisTask};
use crate::constants::risk_reward;
use crate::error::AnalystError;
use crate::snapshot::MarketSnapshot;

/// Reward as a multiple of risk. Accepts `2.0`, `"2"`, `"1:2"` or `"1:2.5"`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RiskReward(pub f64);

impl RiskReward {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let multiple = match raw.split_once(':') {
            Some((risk, reward)) => {
                let risk: f64 = risk.trim().parse().ok()?;
                let reward: f64 = reward.trim().parse().ok()?;
                if risk <= 0.0 {
                    return None;
                }
                reward / risk
            }
            None => raw.parse().ok()?,
        };
        multiple.is_finite().then_some(Self(multiple))
    }

    pub fn within_band(&self) -> bool {
        (risk_reward::MIN..=risk_reward::MAX).contains(&self.0)
    }
}

impl<'de> Deserialize<'de> for RiskReward {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum NumberOrRatio {
            Number(f64),
            Ratio(String),
        }

        match NumberOrRatio::deserialize(deserializer)? {
            NumberOrRatio::Number(n) => Ok(RiskReward(n)),
            NumberOrRatio::Ratio(s) => RiskReward::parse(&s)
                .ok_or_else(|| D::Error::custom(format!("invalid risk_reward '{}'", s))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TradeLevels {
    #[serde(deserialize_with = "lenient_f64")]
    pub stop_loss: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub take_profit: f64,
    pub risk_reward: RiskReward,
    pub reason: String,
}

pub struct TradeLevelsTask;

impl AnalysisTask for TradeLevelsTask {
    type Output = TradeLevels;

    fn name(&self) -> &'static str {
        "trade-levels"
    }

    fn prompt(&self, symbol: &str, snapshot: &MarketSnapshot) -> String {
        format!(
            r#"Suggest stop-loss and take-profit levels for {symbol}.
Rules:
- Use ATR, VWAP distance and volatility
- Risk-reward between 1:{min} and 1:{max}
- No price prediction language

Return JSON with: stop_loss, take_profit, risk_reward, reason

{snapshot}
"#,
            symbol = symbol,
            min = risk_reward::MIN,
            max = risk_reward::MAX,
            snapshot = snapshot_block(snapshot)
        )
    }

    fn validate(&self, output: &TradeLevels) -> Result<(), AnalystError> {
        if !output.stop_loss.is_finite() || output.stop_loss <= 0.0 {
            return Err(AnalystError::invalid_field("stop_loss", output.stop_loss));
        }
        if !output.take_profit.is_finite() || output.take_profit <= 0.0 {
            return Err(AnalystError::invalid_field("take_profit", output.take_profit));
        }
        if !output.risk_reward.0.is_finite() || output.risk_reward.0 <= 0.0 {
            return Err(AnalystError::invalid_field("risk_reward", output.risk_reward.0));
        }
        if !output.risk_reward.within_band() {
            warn!(
                "⚠️ Model suggested risk/reward {:.2} outside the 1:{}-1:{} band",
                output.risk_reward.0,
                risk_reward::MIN,
                risk_reward::MAX
            );
        }
        Ok(())
    }
}
