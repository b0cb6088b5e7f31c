//! Parameter types for actor operations

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A browser cookie as a free-form record (`name`, `value`, `domain`, ...)
pub type Cookie = BTreeMap<String, Value>;

/// Where a scroll action goes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollTarget {
    /// Scroll by a pixel offset
    By { x: f64, y: f64 },

    /// Scroll to the bottom of the page
    Bottom,
}

/// Raw DevTools protocol command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CdpCommand {
    /// Domain-qualified method, e.g. `Page.reload`
    pub cmd: String,
    #[serde(default)]
    pub params: Value,
}

/// In-page HTTP request issued through the page's fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub url: String,
    #[serde(default)]
    pub headers: BTreeMap<String, Value>,
    /// JSON body; only sent by POST
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn with_headers(mut self, headers: BTreeMap<String, Value>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}
