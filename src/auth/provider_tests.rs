use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{Duration, Utc};
use tempfile::TempDir;

use crate::error::{PixReportError, Result};
use crate::net::HttpClient;

use super::*;

struct MockHttpClient {
    form_response: std::result::Result<String, String>,
    form_calls: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl MockHttpClient {
    fn success(body: &str) -> Self {
        Self {
            form_response: Ok(body.to_string()),
            form_calls: Mutex::new(Vec::new()),
        }
    }

    fn error(message: &str) -> Self {
        Self {
            form_response: Err(message.to_string()),
            form_calls: Mutex::new(Vec::new()),
        }
    }

    fn form_call_count(&self) -> usize {
        self.form_calls.lock().unwrap().len()
    }
}

impl HttpClient for MockHttpClient {
    fn get(&self, _url: &str) -> Result<String> {
        panic!("credential provider must never GET");
    }

    fn post_json(
        &self,
        _url: &str,
        _bearer: Option<&str>,
        _body: &serde_json::Value,
    ) -> Result<String> {
        panic!("credential provider must never POST JSON");
    }

    fn post_form(&self, url: &str, params: &[(&str, &str)]) -> Result<String> {
        self.form_calls.lock().unwrap().push((
            url.to_string(),
            params
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        ));
        self.form_response
            .clone()
            .map_err(PixReportError::Http)
    }
}

struct MockConsent {
    outcome: std::result::Result<StoredToken, String>,
    calls: AtomicUsize,
}

impl MockConsent {
    fn granting(token: StoredToken) -> Self {
        Self {
            outcome: Ok(token),
            calls: AtomicUsize::new(0),
        }
    }

    fn denying(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ConsentFlow for MockConsent {
    fn authorize(&self, _secrets: &ClientSecrets) -> Result<StoredToken> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome
            .clone()
            .map_err(PixReportError::Auth)
    }
}

fn write_secrets(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("credentials.json");
    fs::write(
        &path,
        r#"{"installed":{"client_id":"cid-1","client_secret":"cs-1","token_uri":"https://oauth.example.com/token"}}"#,
    )
    .unwrap();
    path
}

fn fresh_token() -> StoredToken {
    StoredToken {
        access_token: "fresh-access".to_string(),
        refresh_token: Some("refresh-1".to_string()),
        expiry: Some(Utc::now() + Duration::hours(1)),
    }
}

fn expired_token() -> StoredToken {
    StoredToken {
        access_token: "stale-access".to_string(),
        refresh_token: Some("refresh-1".to_string()),
        expiry: Some(Utc::now() - Duration::hours(1)),
    }
}

#[test]
fn client_secrets_load_flat_form() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials.json");
    fs::write(
        &path,
        r#"{"client_id":"cid-1","client_secret":"cs-1"}"#,
    )
    .unwrap();

    let secrets = ClientSecrets::load(&path).unwrap();
    assert_eq!(secrets.client_id, "cid-1");
    assert_eq!(secrets.token_uri, "https://oauth2.googleapis.com/token");
}

#[test]
fn client_secrets_load_installed_nesting() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_secrets(&dir);

    let secrets = ClientSecrets::load(&path).unwrap();
    assert_eq!(secrets.client_id, "cid-1");
    assert_eq!(secrets.token_uri, "https://oauth.example.com/token");
}

#[test]
fn client_secrets_missing_file_is_auth_error() {
    let err = ClientSecrets::load(std::path::Path::new("/nonexistent/credentials.json"))
        .unwrap_err();
    assert!(matches!(err, PixReportError::Auth(_)));
}

#[test]
fn fresh_stored_token_is_used_without_any_network_call() {
    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("token.json"));
    store.save(&fresh_token()).unwrap();

    let http = MockHttpClient::success("{}");
    let consent = MockConsent::denying("must not be called");
    let provider =
        FileCredentialProvider::new(store, write_secrets(&dir), &http, consent);

    let credential = provider.get_valid_credential().unwrap();
    assert_eq!(credential.access_token, "fresh-access");
    assert_eq!(http.form_call_count(), 0);
}

#[test]
fn expired_token_with_refresh_token_is_refreshed_and_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("token.json"));
    store.save(&expired_token()).unwrap();

    let http = MockHttpClient::success(
        r#"{"access_token":"renewed-access","expires_in":3600,"token_type":"Bearer"}"#,
    );
    let consent = MockConsent::denying("must not be called");
    let provider = FileCredentialProvider::new(
        TokenStore::new(dir.path().join("token.json")),
        write_secrets(&dir),
        &http,
        consent,
    );

    let credential = provider.get_valid_credential().unwrap();
    assert_eq!(credential.access_token, "renewed-access");

    // Refresh request went to the configured token endpoint with the
    // refresh_token grant.
    let calls = http.form_calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "https://oauth.example.com/token");
    assert!(
        calls[0]
            .1
            .contains(&("grant_type".to_string(), "refresh_token".to_string()))
    );
    drop(calls);

    // The renewed token was written back, keeping the old refresh token.
    let persisted = store.load().unwrap();
    assert_eq!(persisted.access_token, "renewed-access");
    assert_eq!(persisted.refresh_token.as_deref(), Some("refresh-1"));
    assert!(!persisted.is_expired(Utc::now()));
}

#[test]
fn rotated_refresh_token_replaces_the_old_one() {
    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("token.json"));
    store.save(&expired_token()).unwrap();

    let http = MockHttpClient::success(
        r#"{"access_token":"renewed","refresh_token":"refresh-2","expires_in":3600}"#,
    );
    let provider = FileCredentialProvider::new(
        TokenStore::new(dir.path().join("token.json")),
        write_secrets(&dir),
        &http,
        MockConsent::denying("unused"),
    );

    provider.get_valid_credential().unwrap();
    assert_eq!(store.load().unwrap().refresh_token.as_deref(), Some("refresh-2"));
}

#[test]
fn refresh_failure_is_fatal_and_does_not_fall_back_to_consent() {
    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("token.json"));
    store.save(&expired_token()).unwrap();

    let http = MockHttpClient::error("503 from token endpoint");
    let consent = MockConsent::granting(fresh_token());
    let provider = FileCredentialProvider::new(store, write_secrets(&dir), &http, consent);

    let err = provider.get_valid_credential().unwrap_err();
    assert!(matches!(err, PixReportError::Auth(_)));
    assert!(err.to_string().contains("token refresh failed"));
}

#[test]
fn missing_token_file_runs_consent_and_persists_result() {
    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("token.json"));

    let http = MockHttpClient::success("{}");
    let consent = MockConsent::granting(fresh_token());
    let provider = FileCredentialProvider::new(
        TokenStore::new(dir.path().join("token.json")),
        write_secrets(&dir),
        &http,
        consent,
    );

    let credential = provider.get_valid_credential().unwrap();
    assert_eq!(credential.access_token, "fresh-access");
    assert_eq!(http.form_call_count(), 0);
    assert!(store.load().is_some());
}

#[test]
fn expired_token_without_refresh_token_runs_consent() {
    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("token.json"));
    store
        .save(&StoredToken {
            access_token: "stale".to_string(),
            refresh_token: None,
            expiry: Some(Utc::now() - Duration::hours(1)),
        })
        .unwrap();

    let http = MockHttpClient::success("{}");
    let consent = MockConsent::granting(fresh_token());
    let provider = FileCredentialProvider::new(store, write_secrets(&dir), &http, consent);

    provider.get_valid_credential().unwrap();
    assert_eq!(provider.consent.call_count(), 1);
}

#[test]
fn denied_consent_is_an_auth_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("token.json"));

    let http = MockHttpClient::success("{}");
    let consent = MockConsent::denying("user closed the browser");
    let provider = FileCredentialProvider::new(store, write_secrets(&dir), &http, consent);

    let err = provider.get_valid_credential().unwrap_err();
    assert!(err.to_string().contains("user closed the browser"));
}

#[test]
fn headless_consent_always_refuses() {
    let secrets = ClientSecrets {
        client_id: "cid".to_string(),
        client_secret: "cs".to_string(),
        token_uri: "https://oauth.example.com/token".to_string(),
    };
    let err = HeadlessConsent.authorize(&secrets).unwrap_err();
    assert!(matches!(err, PixReportError::Auth(_)));
}
