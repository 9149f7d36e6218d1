//! API key resolution.
//!
//! Resolution order: explicit override, then the environment variable, then
//! a key file. The Vite-era placeholder string counts as unconfigured so a
//! checked-in template env file never reaches the wire.

use std::path::PathBuf;

/// Environment variable consulted for the generation-service API key.
pub const KEY_ENV_VAR: &str = "OPENAI_API_KEY";

/// Placeholder value treated as "not configured".
pub const KEY_PLACEHOLDER: &str = "your_openai_api_key_here";

/// Where the generation-service API key comes from.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    explicit: Option<String>,
    key_file: Option<PathBuf>,
}

impl Credentials {
    /// Resolve from environment, falling back to `key_file` if given.
    pub fn from_env_or_file(key_file: Option<PathBuf>) -> Self {
        Self {
            explicit: None,
            key_file,
        }
    }

    /// Use a fixed key, bypassing environment and file lookup.
    pub fn fixed(key: impl Into<String>) -> Self {
        Self {
            explicit: Some(key.into()),
            key_file: None,
        }
    }

    /// Resolve the key, re-reading the environment and file each call so a
    /// key configured mid-session is picked up without a restart.
    ///
    /// An explicit override is authoritative: when set, the environment and
    /// file are never consulted, even if the override is unusable.
    pub fn resolve(&self) -> Option<String> {
        if let Some(key) = &self.explicit {
            return is_usable(key).then(|| key.trim().to_string());
        }
        if let Ok(key) = std::env::var(KEY_ENV_VAR)
            && is_usable(&key)
        {
            return Some(key.trim().to_string());
        }
        if let Some(path) = &self.key_file
            && let Ok(key) = std::fs::read_to_string(path)
            && is_usable(&key)
        {
            return Some(key.trim().to_string());
        }
        None
    }

    pub fn is_configured(&self) -> bool {
        self.resolve().is_some()
    }
}

fn is_usable(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && key != KEY_PLACEHOLDER
}
