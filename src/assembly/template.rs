// ABOUTME: Opaque stack template document.
// ABOUTME: Only the resource count is interpreted; diffing belongs to an external engine.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Template(Value);

impl Template {
    pub fn new(document: Value) -> Self {
        Self(document)
    }

    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input).map(Self)
    }

    /// Number of entries under the top-level `Resources` key.
    pub fn resource_count(&self) -> usize {
        self.0
            .get("Resources")
            .and_then(Value::as_object)
            .map(|resources| resources.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.resource_count() == 0
    }

    pub fn document(&self) -> &Value {
        &self.0
    }
}
