use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PixReportError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Statistics endpoint returned HTTP {status} for {url}")]
    ApiStatus { url: String, status: u16 },

    #[error("Malformed response from {url}: {detail}")]
    MalformedResponse { url: String, detail: String },

    #[error("Failed to render chart: {0}")]
    ChartRender(String),

    #[error("Failed to read image file: {path}")]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Delivery error: {0}")]
    Delivery(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PixReportError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
