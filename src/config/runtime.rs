use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// Runtime-configurable limits. Changes via PUT /api/admin/config take effect immediately
/// without restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub body_size_limit_bytes: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            body_size_limit_bytes: 1_048_576, // 1 MB
        }
    }
}

impl RuntimeConfig {
    /// Build from env vars, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();

        if let Some(v) = lookup("WORLDCAST_BODY_SIZE_LIMIT_BYTES") {
            if let Ok(n) = v.parse::<usize>() {
                cfg.body_size_limit_bytes = n;
            }
        }

        cfg
    }
}

pub type SharedRuntimeConfig = Arc<RwLock<RuntimeConfig>>;

pub fn new_runtime_config() -> SharedRuntimeConfig {
    Arc::new(RwLock::new(RuntimeConfig::from_env()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_override_applies() {
        let cfg = RuntimeConfig::from_lookup(|key| {
            (key == "WORLDCAST_BODY_SIZE_LIMIT_BYTES").then(|| "2048".to_string())
        });
        assert_eq!(cfg.body_size_limit_bytes, 2048);
    }

    #[test]
    fn unparsable_env_value_keeps_default() {
        let cfg = RuntimeConfig::from_lookup(|_| Some("lots".to_string()));
        assert_eq!(cfg.body_size_limit_bytes, 1_048_576);
    }
}
