use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Point-in-time market indicators for one symbol.
///
/// Opaque to the analyst: keys and values are passed to the model as-is.
/// Keys serialize in sorted order, so the prompt text is deterministic.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarketSnapshot(Map<String, Value>);

impl MarketSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compact JSON text embedded at the end of every prompt.
    pub fn to_prompt_json(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }
}

impl From<Map<String, Value>> for MarketSnapshot {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
