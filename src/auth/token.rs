//! On-disk token persistence.
//!
//! The token file is plain JSON next to the config (path configurable).
//! Loading is lenient: a missing or unreadable file only means there is no
//! usable stored token yet, and the provider falls through to refresh or
//! consent. Failures are surfaced later, when no flow can produce a token.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredToken {
    pub access_token: String,

    #[serde(default)]
    pub refresh_token: Option<String>,

    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

impl StoredToken {
    /// A token without a recorded expiry counts as expired so it gets
    /// refreshed rather than trusted.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry.is_none_or(|expiry| expiry <= now)
    }
}

#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored token, if any. A missing file yields `None`; a
    /// corrupt or unreadable file is reported and also yields `None`.
    #[must_use]
    pub fn load(&self) -> Option<StoredToken> {
        if !self.path.exists() {
            return None;
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!(
                    "Warning: failed to read token file {}: {e}",
                    self.path.display()
                );
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(token) => Some(token),
            Err(e) => {
                eprintln!(
                    "Warning: failed to parse token file {}: {e}",
                    self.path.display()
                );
                None
            }
        }
    }

    /// Persist the token, creating parent directories as needed.
    ///
    /// # Errors
    /// Returns an error if the directories cannot be created or the file
    /// cannot be written.
    pub fn save(&self, token: &StoredToken) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(token)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "token_tests.rs"]
mod tests;
