//! Credential acquisition.
//!
//! The pipeline only ever asks one question: "get me a working credential
//! or tell me it failed". [`CredentialProvider`] is that capability.
//! [`FileCredentialProvider`] implements it with the usual three-step
//! flow: stored token if still fresh, silent refresh through the OAuth
//! token endpoint when expired, interactive consent as the last resort.
//! The consent mechanism is a separate trait so platforms can swap in a
//! local-browser flow; the default is headless and refuses.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{PixReportError, Result};
use crate::net::HttpClient;

use super::token::{StoredToken, TokenStore};

/// A working credential for the mail API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
}

pub trait CredentialProvider {
    /// Produce a valid credential, or fail. A failure here is fatal for
    /// the whole run, before any other work begins.
    ///
    /// # Errors
    /// Returns an `Auth` error when no flow can produce a usable token.
    fn get_valid_credential(&self) -> Result<Credential>;
}

/// OAuth client secrets, loaded from the client-secret JSON file. Both the
/// flat form and the `{"installed": {...}}` nesting used by common consoles
/// are accepted.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,

    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl ClientSecrets {
    /// # Errors
    /// Returns an `Auth` error if the file is missing, unreadable or not a
    /// client-secret document.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PixReportError::Auth(format!(
                "cannot read client secrets file {}: {e}",
                path.display()
            ))
        })?;
        let document: Value = serde_json::from_str(&content).map_err(|e| {
            PixReportError::Auth(format!(
                "client secrets file {} is not valid JSON: {e}",
                path.display()
            ))
        })?;

        let secrets = document
            .get("installed")
            .or_else(|| document.get("web"))
            .unwrap_or(&document);

        serde_json::from_value(secrets.clone()).map_err(|e| {
            PixReportError::Auth(format!(
                "client secrets file {} is missing required fields: {e}",
                path.display()
            ))
        })
    }
}

/// Interactive consent seam, swappable per target platform.
pub trait ConsentFlow {
    /// Obtain a fresh token with user involvement.
    ///
    /// # Errors
    /// Returns an `Auth` error if consent cannot be obtained.
    fn authorize(&self, secrets: &ClientSecrets) -> Result<StoredToken>;
}

/// Default consent for unattended runs: there is no browser to open, so the
/// operator must seed the token file out of band.
#[derive(Debug, Default)]
pub struct HeadlessConsent;

impl ConsentFlow for HeadlessConsent {
    fn authorize(&self, _secrets: &ClientSecrets) -> Result<StoredToken> {
        Err(PixReportError::Auth(
            "interactive consent is not available in this environment; \
             obtain a token interactively and place it at the configured token path"
                .to_string(),
        ))
    }
}

pub struct FileCredentialProvider<'a, C: HttpClient, F: ConsentFlow> {
    store: TokenStore,
    secrets_path: PathBuf,
    http: &'a C,
    consent: F,
}

impl<'a, C: HttpClient, F: ConsentFlow> FileCredentialProvider<'a, C, F> {
    pub fn new(
        store: TokenStore,
        secrets_path: impl Into<PathBuf>,
        http: &'a C,
        consent: F,
    ) -> Self {
        Self {
            store,
            secrets_path: secrets_path.into(),
            http,
            consent,
        }
    }

    fn refresh(&self, expired: &StoredToken, refresh_token: &str) -> Result<StoredToken> {
        let secrets = ClientSecrets::load(&self.secrets_path)?;
        let params = [
            ("client_id", secrets.client_id.as_str()),
            ("client_secret", secrets.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http
            .post_form(&secrets.token_uri, &params)
            .map_err(|e| PixReportError::Auth(format!("token refresh failed: {e}")))?;

        let parsed: Value = serde_json::from_str(&response).map_err(|e| {
            PixReportError::Auth(format!("token endpoint returned malformed JSON: {e}"))
        })?;

        let access_token = parsed
            .get("access_token")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                PixReportError::Auth("token endpoint response is missing access_token".to_string())
            })?
            .to_string();

        let expiry = parsed
            .get("expires_in")
            .and_then(Value::as_i64)
            .map(|secs| Utc::now() + Duration::seconds(secs));

        // The endpoint may rotate the refresh token; keep the old one
        // otherwise.
        let refresh_token = parsed
            .get("refresh_token")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| expired.refresh_token.clone());

        Ok(StoredToken {
            access_token,
            refresh_token,
            expiry,
        })
    }
}

impl<C: HttpClient, F: ConsentFlow> CredentialProvider for FileCredentialProvider<'_, C, F> {
    fn get_valid_credential(&self) -> Result<Credential> {
        let now = Utc::now();
        let stored = self.store.load();

        if let Some(token) = &stored
            && !token.is_expired(now)
        {
            return Ok(Credential {
                access_token: token.access_token.clone(),
            });
        }

        // Refresh failure is fatal; there is no fallback to consent once a
        // refresh token exists.
        let renewed = if let Some(token) = &stored
            && let Some(refresh_token) = token.refresh_token.clone()
        {
            self.refresh(token, &refresh_token)?
        } else {
            let secrets = ClientSecrets::load(&self.secrets_path)?;
            self.consent.authorize(&secrets)?
        };

        self.store
            .save(&renewed)
            .map_err(|e| PixReportError::Auth(format!("failed to persist token: {e}")))?;

        Ok(Credential {
            access_token: renewed.access_token,
        })
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
