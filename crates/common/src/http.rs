use crate::block::MemoryBlock;
use crate::error::ShimError;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

/// JSON envelope handed to the host's `http_request` primitive.
///
/// The body travels separately as its own handle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
    pub url: String,
    #[serde(default = "default_method")]
    pub method: String,
    /// written as `headers`, the key the extism host's request type reads; `header` is
    /// accepted when parsing
    #[serde(default, alias = "header", skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

fn default_method() -> String {
    "GET".into()
}

impl HttpRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: default_method(),
            headers: BTreeMap::new(),
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn to_json(&self) -> Result<Vec<u8>, ShimError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, ShimError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// What came back from the host: a status code and a body still living on the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: MemoryBlock,
}
