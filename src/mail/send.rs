use serde_json::Value;

use crate::error::{PixReportError, Result};
use crate::net::HttpClient;

/// Mail submission abstraction. Production submits through the REST mail
/// API; tests inject their own implementation.
pub trait MailTransport {
    /// Submit a raw encoded message on behalf of `user_id` and return the
    /// provider-assigned message id.
    ///
    /// # Errors
    /// Returns a `Delivery` error on any submission failure. The pipeline
    /// never retries.
    fn send(&self, user_id: &str, raw_message: &str) -> Result<String>;
}

/// REST transport: POSTs `{"raw": ...}` with a bearer token.
pub struct RestMailTransport<'a, C: HttpClient> {
    http: &'a C,
    base_url: &'a str,
    access_token: &'a str,
}

impl<'a, C: HttpClient> RestMailTransport<'a, C> {
    pub const fn new(http: &'a C, base_url: &'a str, access_token: &'a str) -> Self {
        Self {
            http,
            base_url,
            access_token,
        }
    }

    fn send_url(&self, user_id: &str) -> String {
        format!(
            "{}/users/{user_id}/messages/send",
            self.base_url.trim_end_matches('/')
        )
    }
}

impl<C: HttpClient> MailTransport for RestMailTransport<'_, C> {
    fn send(&self, user_id: &str, raw_message: &str) -> Result<String> {
        let url = self.send_url(user_id);
        let body = serde_json::json!({ "raw": raw_message });

        let response = self
            .http
            .post_json(&url, Some(self.access_token), &body)
            .map_err(|e| PixReportError::Delivery(e.to_string()))?;

        let parsed: Value = serde_json::from_str(&response).map_err(|e| {
            PixReportError::Delivery(format!("malformed send response: {e}"))
        })?;

        parsed
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                PixReportError::Delivery("send response is missing the message id".to_string())
            })
    }
}

#[cfg(test)]
#[path = "send_tests.rs"]
mod tests;
