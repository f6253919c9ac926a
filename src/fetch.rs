//! Statistics endpoint client.
//!
//! One GET per period against the OData entity, with a fixed column
//! projection and row cap. The public boundary is fail-open: any transport,
//! status or parse failure is reported and collapsed into an empty table so
//! the rest of the pipeline keeps running.

use serde_json::Value;

use crate::config::{ApiConfig, Period};
use crate::error::{PixReportError, Result};
use crate::net::HttpClient;
use crate::table::{Row, Table};

/// Fixed projection requested via `$select`.
pub const SELECT_COLUMNS: &str = "AnoMes,PAG_PFPJ,PAG_REGIAO,PAG_IDADE,VALOR,QUANTIDADE";

pub struct StatsFetcher<'a, C: HttpClient> {
    http: &'a C,
    api: &'a ApiConfig,
}

impl<'a, C: HttpClient> StatsFetcher<'a, C> {
    pub const fn new(http: &'a C, api: &'a ApiConfig) -> Self {
        Self { http, api }
    }

    /// Full request URL for one period, OData-style: the period rides in a
    /// `@Database` parameter alias.
    #[must_use]
    pub fn period_url(&self, period: &Period) -> String {
        format!(
            "{base}(Database=@Database)?@Database='{period}'&$top={top}&$format=json&$select={SELECT_COLUMNS}",
            base = self.api.base_url,
            top = self.api.top,
        )
    }

    /// Typed fetch. Callers inside the pipeline should use
    /// [`Self::fetch_period_or_empty`] instead.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-success status or a body
    /// that is not an object with a `value` array of row objects.
    pub fn fetch_period(&self, period: &Period) -> Result<Table> {
        let url = self.period_url(period);
        let body = self.http.get(&url)?;
        let mut rows = parse_rows(&url, &body)?;
        // The server honors $top, but the cap is our contract either way.
        rows.truncate(self.api.top as usize);
        Ok(Table::from_rows(rows))
    }

    /// Fail-open boundary: an unreachable endpoint, an error status or a
    /// malformed body yields an empty table, never an error. The failure is
    /// reported to stderr.
    #[must_use]
    pub fn fetch_period_or_empty(&self, period: &Period) -> Table {
        match self.fetch_period(period) {
            Ok(table) => table,
            Err(e) => {
                eprintln!("Warning: failed to fetch statistics for period {period}: {e}");
                Table::new()
            }
        }
    }
}

fn parse_rows(url: &str, body: &str) -> Result<Vec<Row>> {
    let parsed: Value =
        serde_json::from_str(body).map_err(|e| PixReportError::MalformedResponse {
            url: url.to_string(),
            detail: format!("body is not valid JSON: {e}"),
        })?;

    let values = parsed
        .get("value")
        .and_then(Value::as_array)
        .ok_or_else(|| PixReportError::MalformedResponse {
            url: url.to_string(),
            detail: "missing 'value' array".to_string(),
        })?;

    values
        .iter()
        .map(|entry| {
            entry
                .as_object()
                .cloned()
                .ok_or_else(|| PixReportError::MalformedResponse {
                    url: url.to_string(),
                    detail: "'value' entries must be objects".to_string(),
                })
        })
        .collect()
}

#[cfg(test)]
#[path = "fetch_tests.rs"]
mod tests;
