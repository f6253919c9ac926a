use std::fs;
use std::path::PathBuf;

use crate::error::Result;

use super::model::ChartSpec;
use super::render::render_png;

/// Render each present chart to `<basename>_fig<n>.png`, where `n` is the
/// chart's 1-indexed original slot number (never compacted). Empty slots are
/// skipped with a reported warning and produce no file.
///
/// Returns the paths actually written, in slot order.
///
/// # Errors
/// Returns an error if rendering or writing a present chart fails. Skipped
/// slots never raise.
pub fn export_charts(charts: &[Option<ChartSpec>], basename: &str) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for (index, slot) in charts.iter().enumerate() {
        let figure_number = index + 1;
        match slot {
            Some(chart) => {
                let path = PathBuf::from(format!("{basename}_fig{figure_number}.png"));
                let png = render_png(chart)?;
                fs::write(&path, png)?;
                written.push(path);
            }
            None => {
                eprintln!(
                    "Warning: chart {figure_number} was not generated; no image will be saved"
                );
            }
        }
    }

    Ok(written)
}

#[cfg(test)]
#[path = "export_tests.rs"]
mod tests;
