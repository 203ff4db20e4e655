use crate::arena::MemoryArena;
use crate::error::HostError;
use extism_shim_common::ImportNamespace;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

/// How a plugin is set up before its first call.
///
/// ```json
/// { "config": { "name": "John" }, "namespace": "legacy", "memory_max": 65536 }
/// ```
///
/// Every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Manifest {
    pub config: BTreeMap<String, String>,
    pub namespace: ImportNamespace,
    /// upper bound on the arena size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_max: Option<u64>,
}

impl Manifest {
    pub fn from_json(json: &str) -> Result<Self, HostError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    pub fn with_namespace(mut self, namespace: ImportNamespace) -> Self {
        self.namespace = namespace;
        self
    }

    pub fn with_memory_max(mut self, memory_max: u64) -> Self {
        self.memory_max = Some(memory_max);
        self
    }

    /// a fresh arena configured by this manifest
    pub fn arena(&self) -> MemoryArena {
        let arena = MemoryArena::new().with_config(self.config.clone());
        match self.memory_max {
            Some(limit) => arena.with_limit(limit),
            None => arena,
        }
    }
}
