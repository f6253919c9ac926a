//! Linear pipeline driver.
//!
//! States progress strictly forward: Fetching, Merging, Charting,
//! Exporting, Composing, Sending, Done. There is no retry and no re-entry;
//! a fatal error at a strict stage (exporting, composing) halts the run,
//! while fetch failures and missing chart columns have already been
//! downgraded by their owning stages. A failed send is reported but does
//! not fail the run.

use std::path::PathBuf;

use crate::chart::{build_charts, export_charts};
use crate::config::Config;
use crate::error::Result;
use crate::fetch::StatsFetcher;
use crate::mail::{MailTransport, compose_with_images};
use crate::net::HttpClient;
use crate::table::Table;

/// What a completed run produced. `message_id` is `None` when the send
/// attempt failed (already reported to the operator).
#[derive(Debug)]
pub struct PipelineOutcome {
    pub merged_rows: usize,
    pub images: Vec<PathBuf>,
    pub message_id: Option<String>,
}

pub struct Pipeline<'a, C: HttpClient, T: MailTransport> {
    config: &'a Config,
    http: &'a C,
    transport: &'a T,
    quiet: bool,
}

impl<'a, C: HttpClient, T: MailTransport> Pipeline<'a, C, T> {
    pub const fn new(config: &'a Config, http: &'a C, transport: &'a T) -> Self {
        Self {
            config,
            http,
            transport,
            quiet: false,
        }
    }

    #[must_use]
    pub const fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Execute the whole pipeline once.
    ///
    /// # Errors
    /// Returns an error only from the strict stages: chart export and mail
    /// composition. Fetch failures yield empty tables and a failed send
    /// yields an outcome without a message id.
    pub fn run(&self) -> Result<PipelineOutcome> {
        let report = &self.config.report;
        let mail = &self.config.mail;

        // 1. Fetch both periods (fail-open, possibly empty).
        self.banner("Fetching data...");
        let fetcher = StatsFetcher::new(self.http, &self.config.api);
        let current = fetcher.fetch_period_or_empty(&report.current_period);
        let previous = fetcher.fetch_period_or_empty(&report.previous_period);

        // 2. Merge into the labeled comparison table.
        self.banner("Comparing data...");
        let merged = Table::labeled_union(
            current,
            &report.current_label(),
            previous,
            &report.previous_label(),
        );

        // 3. Derive charts (independently gated on columns).
        self.banner("Building charts...");
        let (value_chart, count_chart) = build_charts(&merged);

        // 4. Rasterize to PNG files.
        self.banner("Saving chart images...");
        let images = export_charts(&[value_chart, count_chart], &report.basename)?;

        // 5. Compose the message. Strict: every image path must be readable.
        self.banner("Composing email...");
        let message = compose_with_images(
            &mail.sender,
            &mail.recipients,
            &mail.subject,
            &mail.body,
            &images,
        )?;

        // 6. Submit. A delivery failure ends the run without failing it.
        self.banner("Sending email...");
        let message_id = match self.transport.send(&mail.user_id, message.raw()) {
            Ok(id) => {
                if !self.quiet {
                    println!("Email sent! Message id: {id}");
                }
                Some(id)
            }
            Err(e) => {
                eprintln!("Failed to send email: {e}");
                None
            }
        };

        Ok(PipelineOutcome {
            merged_rows: merged.len(),
            images,
            message_id,
        })
    }

    fn banner(&self, text: &str) {
        if !self.quiet {
            println!("{text}");
        }
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
