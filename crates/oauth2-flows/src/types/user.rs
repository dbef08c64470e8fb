//! Resource owner type.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A resource owner as seen by the flows.
///
/// Storage backends and consent checks may attach arbitrary attributes;
/// the flows only ever read `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Stable user identifier.
    pub id: String,

    /// Additional attributes supplied by the backend.
    #[serde(flatten)]
    pub attributes: HashMap<String, serde_json::Value>,
}

impl User {
    /// Creates a user carrying only an identifier.
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: HashMap::new(),
        }
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }
}
