use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::net::ProxyConfig;

/// Year-month identifier in the `YYYYMM` form the statistics endpoint
/// expects, e.g. `202501`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    raw: String,
    year: i32,
    month: u32,
}

impl Period {
    /// Parse a `YYYYMM` string.
    ///
    /// # Errors
    /// Returns a description of the problem if the string is not six ASCII
    /// digits naming a valid month.
    pub fn parse(s: &str) -> Result<Self, String> {
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("period must be six digits (YYYYMM), got '{s}'"));
        }
        let year: i32 = s[..4].parse().map_err(|_| format!("invalid year in '{s}'"))?;
        let month: u32 = s[4..].parse().map_err(|_| format!("invalid month in '{s}'"))?;
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(format!("'{s}' does not name a valid month"));
        }
        Ok(Self {
            raw: s.to_string(),
            year,
            month,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Human-readable label, e.g. `January 2025`. Used when the config file
    /// does not override the label.
    #[must_use]
    pub fn default_label(&self) -> String {
        // Validity was established at parse time.
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map_or_else(|| self.raw.clone(), |d| d.format("%B %Y").to_string())
    }
}

impl TryFrom<String> for Period {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.raw
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Report section: which periods to compare and how to name the outputs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportConfig {
    /// Most recent comparison period.
    #[serde(default = "default_current_period")]
    pub current_period: Period,

    /// Baseline comparison period.
    #[serde(default = "default_previous_period")]
    pub previous_period: Period,

    /// Series label for the current period (derived from the period when
    /// unset).
    #[serde(default)]
    pub current_label: Option<String>,

    /// Series label for the previous period (derived when unset).
    #[serde(default)]
    pub previous_label: Option<String>,

    /// Base name for rendered image files (`<basename>_fig<n>.png`).
    #[serde(default = "default_basename")]
    pub basename: String,
}

impl ReportConfig {
    #[must_use]
    pub fn current_label(&self) -> String {
        self.current_label
            .clone()
            .unwrap_or_else(|| self.current_period.default_label())
    }

    #[must_use]
    pub fn previous_label(&self) -> String {
        self.previous_label
            .clone()
            .unwrap_or_else(|| self.previous_period.default_label())
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            current_period: default_current_period(),
            previous_period: default_previous_period(),
            current_label: None,
            previous_label: None,
            basename: default_basename(),
        }
    }
}

/// Statistics endpoint section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    /// OData entity URL, without the `(Database=...)` parameter suffix.
    #[serde(default = "default_api_base_url")]
    pub base_url: String,

    /// Row cap passed as `$top`.
    #[serde(default = "default_top")]
    pub top: u32,

    /// Bounded request timeout for all network calls.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            top: default_top(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Mail section: addressing, message text and credential file locations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MailConfig {
    #[serde(default = "default_sender")]
    pub sender: String,

    #[serde(default = "default_recipients")]
    pub recipients: Vec<String>,

    #[serde(default = "default_subject")]
    pub subject: String,

    /// Plain text shown above the embedded charts.
    #[serde(default = "default_body")]
    pub body: String,

    /// Logical user id for the mail API ("me" addresses the authenticated
    /// account).
    #[serde(default = "default_user_id")]
    pub user_id: String,

    /// Base URL of the REST mail API.
    #[serde(default = "default_send_base_url")]
    pub send_base_url: String,

    /// OAuth client-secret file.
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,

    /// Persisted token file.
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            sender: default_sender(),
            recipients: default_recipients(),
            subject: default_subject(),
            body: default_body(),
            user_id: default_user_id(),
            send_base_url: default_send_base_url(),
            credentials_path: default_credentials_path(),
            token_path: default_token_path(),
        }
    }
}

/// Optional proxy section. Credentials are intentionally NOT part of the
/// config file; they come from the `PROXY_USERNAME`/`PROXY_PASSWORD`
/// environment variables, read once at resolution time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProxySettings {
    pub host: String,
    pub port: u16,
}

impl ProxySettings {
    /// Combine the configured endpoint with explicit credentials. Absence
    /// of either credential means unproxied operation, not an error.
    #[must_use]
    pub fn resolve(&self, username: Option<&str>, password: Option<&str>) -> Option<ProxyConfig> {
        match (username, password) {
            (Some(user), Some(pass)) => Some(ProxyConfig::new(&self.host, self.port, user, pass)),
            _ => None,
        }
    }

    /// Resolve using the process environment.
    #[must_use]
    pub fn resolve_from_env(&self) -> Option<ProxyConfig> {
        let username = std::env::var("PROXY_USERNAME").ok();
        let password = std::env::var("PROXY_PASSWORD").ok();
        self.resolve(username.as_deref(), password.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub mail: MailConfig,

    #[serde(default)]
    pub proxy: Option<ProxySettings>,
}

fn default_current_period() -> Period {
    Period {
        raw: "202501".to_string(),
        year: 2025,
        month: 1,
    }
}

fn default_previous_period() -> Period {
    Period {
        raw: "202412".to_string(),
        year: 2024,
        month: 12,
    }
}

fn default_basename() -> String {
    "dashboard_pix".to_string()
}

fn default_api_base_url() -> String {
    "https://olinda.bcb.gov.br/olinda/servico/Pix_DadosAbertos/versao/v1/odata/EstatisticasTransacoesPix".to_string()
}

const fn default_top() -> u32 {
    100
}

const fn default_timeout_secs() -> u64 {
    30
}

fn default_sender() -> String {
    "sender@example.com".to_string()
}

fn default_recipients() -> Vec<String> {
    vec!["recipient@example.com".to_string()]
}

fn default_subject() -> String {
    "PIX monthly comparison report".to_string()
}

fn default_body() -> String {
    "Monthly PIX comparison charts are embedded below.".to_string()
}

fn default_user_id() -> String {
    "me".to_string()
}

fn default_send_base_url() -> String {
    "https://gmail.googleapis.com/gmail/v1".to_string()
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from("credentials.json")
}

fn default_token_path() -> PathBuf {
    PathBuf::from("token.json")
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
