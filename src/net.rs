use std::time::Duration;

use crate::error::{PixReportError, Result};

/// HTTP client abstraction for dependency injection.
pub trait HttpClient {
    /// Perform a GET request and return the response body.
    fn get(&self, url: &str) -> Result<String>;

    /// POST a JSON body, optionally with a bearer token, and return the
    /// response body.
    fn post_json(&self, url: &str, bearer: Option<&str>, body: &serde_json::Value)
    -> Result<String>;

    /// POST a form-urlencoded body and return the response body.
    fn post_form(&self, url: &str, params: &[(&str, &str)]) -> Result<String>;
}

/// Authenticated proxy endpoint, resolved once at startup and handed to the
/// client at construction. Never written into the process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub url: String,
}

impl ProxyConfig {
    #[must_use]
    pub fn new(host: &str, port: u16, username: &str, password: &str) -> Self {
        Self {
            url: format!("http://{username}:{password}@{host}:{port}"),
        }
    }
}

/// Production HTTP client using reqwest.
///
/// This implementation cannot be unit tested without a real HTTP server,
/// so it is excluded from coverage measurement.
#[derive(Debug)]
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

#[cfg(not(tarpaulin_include))]
impl ReqwestClient {
    /// Build a client with a bounded request timeout and an optional
    /// authenticated proxy.
    ///
    /// # Errors
    /// Returns an error if the proxy URL is rejected or the underlying
    /// client cannot be constructed.
    pub fn new(timeout: Duration, proxy: Option<&ProxyConfig>) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder().timeout(timeout);

        if let Some(proxy) = proxy {
            let proxy = reqwest::Proxy::all(&proxy.url)
                .map_err(|e| PixReportError::Config(format!("Invalid proxy configuration: {e}")))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| PixReportError::Http(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    fn read_response(url: &str, response: reqwest::blocking::Response) -> Result<String> {
        let status = response.status();
        if !status.is_success() {
            return Err(PixReportError::ApiStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .map_err(|e| PixReportError::Http(format!("Failed to read response from {url}: {e}")))
    }

    fn map_transport_error(url: &str, e: &reqwest::Error) -> PixReportError {
        if e.is_timeout() {
            PixReportError::Http(format!("Request timeout for {url}"))
        } else if e.is_connect() {
            PixReportError::Http(format!("Failed to connect to {url}"))
        } else {
            PixReportError::Http(format!("Request to {url} failed: {e}"))
        }
    }
}

#[cfg(not(tarpaulin_include))]
impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Self::map_transport_error(url, &e))?;
        Self::read_response(url, response)
    }

    fn post_json(
        &self,
        url: &str,
        bearer: Option<&str>,
        body: &serde_json::Value,
    ) -> Result<String> {
        let mut request = self.client.post(url).json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .map_err(|e| Self::map_transport_error(url, &e))?;
        Self::read_response(url, response)
    }

    fn post_form(&self, url: &str, params: &[(&str, &str)]) -> Result<String> {
        let response = self
            .client
            .post(url)
            .form(params)
            .send()
            .map_err(|e| Self::map_transport_error(url, &e))?;
        Self::read_response(url, response)
    }
}

#[cfg(test)]
#[path = "net_tests.rs"]
mod tests;
