//! `ransomwatch report` command handler

use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use ransomwatch_core::config::RansomwatchConfig;
use ransomwatch_core::types::Severity;
use ransomwatch_detector::read_alerts;
use ransomwatch_detector::sink::count_by_severity;

use crate::cli::ReportArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Width of the longest bar in the text histogram.
const MAX_BAR_WIDTH: usize = 40;

/// Execute the `report` command.
///
/// A missing alerts file is an error; an empty one renders "No alerts found".
pub async fn execute(
    args: ReportArgs,
    config: &RansomwatchConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let path = args
        .alerts
        .unwrap_or_else(|| PathBuf::from(&config.output.alerts_path));

    info!(path = %path.display(), "reading alerts");

    let rows = read_alerts(&path).await?;
    let report = SeverityReport::new(path, count_by_severity(&rows));

    writer.render(&report)?;

    Ok(())
}

/// One histogram bar.
#[derive(Debug, Serialize)]
pub struct SeverityBucket {
    pub severity: String,
    pub count: usize,
}

/// Severity histogram over an alerts CSV.
#[derive(Debug, Serialize)]
pub struct SeverityReport {
    pub source: PathBuf,
    pub total: usize,
    pub counts: Vec<SeverityBucket>,
}

impl SeverityReport {
    fn new(source: PathBuf, counts: Vec<(String, usize)>) -> Self {
        let total = counts.iter().map(|(_, n)| n).sum();
        let counts = counts
            .into_iter()
            .map(|(severity, count)| SeverityBucket { severity, count })
            .collect();
        Self {
            source,
            total,
            counts,
        }
    }
}

/// Bar length scaled to the largest bucket; non-empty buckets get at least one cell.
fn bar_width(count: usize, max: usize) -> usize {
    if count == 0 || max == 0 {
        return 0;
    }
    (count * MAX_BAR_WIDTH / max).max(1)
}

impl Render for SeverityReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if self.total == 0 {
            return writeln!(w, "No alerts found in {}", self.source.display());
        }

        writeln!(
            w,
            "Alert severity distribution ({})",
            self.source.display().to_string().bold()
        )?;
        writeln!(w)?;

        let max = self.counts.iter().map(|b| b.count).max().unwrap_or(0);
        let label_width = self
            .counts
            .iter()
            .map(|b| b.severity.len())
            .max()
            .unwrap_or(0);

        for bucket in &self.counts {
            let bar = "#".repeat(bar_width(bucket.count, max));
            let bar = match Severity::from_str_loose(&bucket.severity) {
                Some(Severity::High) => bar.red(),
                Some(Severity::Medium) => bar.yellow(),
                None => bar.normal(),
            };
            writeln!(
                w,
                "  {:<width$} | {} {}",
                bucket.severity,
                bar,
                bucket.count,
                width = label_width
            )?;
        }

        writeln!(w)?;
        writeln!(w, "Total: {}", self.total)?;

        Ok(())
    }
}
