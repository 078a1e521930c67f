//! Compile metadata side channel.
//!
//! The driver publishes the final region-to-plan-key mapping here so a
//! runtime shape dispatcher can pick the right kernel variant.

use serde_json::Value;
use std::collections::BTreeMap;

/// Key under which the driver records `{case key: region bounds}`.
pub const TILING_RANGE: &str = "tiling_range";
/// Key under which the driver records the dispatch mode.
pub const TILING_MODE: &str = "tiling_mode";

/// Receiver of compile metadata.
pub trait MetadataSink {
    fn record(&mut self, key: &str, value: Value);
}

/// Metadata kept in memory, e.g. for serialization next to the kernels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemorySink {
    entries: BTreeMap<String, Value>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// All entries as one JSON object.
    pub fn to_json(&self) -> Value {
        Value::Object(self.entries.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}

impl MetadataSink for InMemorySink {
    fn record(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl MetadataSink for NullSink {
    fn record(&mut self, _key: &str, _value: Value) {}
}
