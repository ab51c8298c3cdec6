//! CLI configuration.
//!
//! Values come from the environment, with global command-line flags taking
//! precedence. Defaults keep everything under `.zkpip/` so the tool works
//! without any setup.

use std::path::{Path, PathBuf};

use zkpip_crypto::keystore::{check_key_id_length, DEFAULT_KEY_ID_LENGTH};

/// Resolved configuration for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZkpipConfig {
    /// Exit the process directly with the mapped code on failure.
    pub hard_exit: bool,
    /// Explicit schema root; discovered from the working directory when unset.
    pub schemas_dir: Option<PathBuf>,
    pub keys_dir: PathBuf,
    pub vectors_dir: PathBuf,
    pub key_id_length: usize,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?} ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl ZkpipConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `ZKPIP_HARD_EXIT` (`1`/`true` or `0`/`false`, default `0`)
    /// - `ZKPIP_SCHEMAS_DIR` (default: discovered `schemas/`)
    /// - `ZKPIP_KEYS_DIR` (default: `~/.zkpip/keys`, else `./.zkpip/keys`)
    /// - `ZKPIP_VECTORS_DIR` (default: `./.zkpip/vectors`)
    /// - `ZKPIP_KEY_ID_LENGTH` (default: 16, range 8..=52)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let hard_exit = match lookup("ZKPIP_HARD_EXIT").as_deref().map(str::trim) {
            None | Some("") | Some("0") | Some("false") => false,
            Some("1") | Some("true") => true,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    var: "ZKPIP_HARD_EXIT",
                    value: other.to_string(),
                    reason: "expected 0 or 1".into(),
                })
            }
        };

        let key_id_length = match lookup("ZKPIP_KEY_ID_LENGTH") {
            None => DEFAULT_KEY_ID_LENGTH,
            Some(raw) => {
                let invalid = |reason: String| ConfigError::InvalidValue {
                    var: "ZKPIP_KEY_ID_LENGTH",
                    value: raw.clone(),
                    reason,
                };
                let n: usize = raw.trim().parse().map_err(|e| invalid(format!("{e}")))?;
                check_key_id_length(n).map_err(|e| invalid(e.to_string()))?
            }
        };

        let keys_dir = lookup("ZKPIP_KEYS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| default_keys_dir(lookup("HOME").as_deref()));

        Ok(Self {
            hard_exit,
            schemas_dir: lookup("ZKPIP_SCHEMAS_DIR").map(PathBuf::from),
            keys_dir,
            vectors_dir: lookup("ZKPIP_VECTORS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".zkpip/vectors")),
            key_id_length,
        })
    }

    /// Apply command-line overrides.
    pub fn with_overrides(
        mut self,
        keys_dir: Option<PathBuf>,
        schemas_dir: Option<PathBuf>,
        vectors_dir: Option<PathBuf>,
    ) -> Self {
        if let Some(dir) = keys_dir {
            self.keys_dir = dir;
        }
        if schemas_dir.is_some() {
            self.schemas_dir = schemas_dir;
        }
        if let Some(dir) = vectors_dir {
            self.vectors_dir = dir;
        }
        self
    }

    /// The schema root: the configured one, else the nearest `schemas/`
    /// directory at or above `start` holding the core schema.
    pub fn resolve_schemas_dir(&self, start: &Path) -> Option<PathBuf> {
        if let Some(dir) = &self.schemas_dir {
            return Some(dir.clone());
        }
        let mut dir = start;
        loop {
            let candidate = dir.join("schemas");
            if candidate.join("mvs.core.schema.json").is_file() {
                return Some(candidate);
            }
            dir = dir.parent()?;
        }
    }
}

fn default_keys_dir(home: Option<&str>) -> PathBuf {
    match home.filter(|h| !h.is_empty()) {
        Some(home) => Path::new(home).join(".zkpip/keys"),
        None => PathBuf::from(".zkpip/keys"),
    }
}
