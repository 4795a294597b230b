//! `ransomwatch scan` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use ransomwatch_core::config::RansomwatchConfig;
use ransomwatch_core::types::Severity;
use ransomwatch_detector::{
    DetectionPipeline, DetectorConfig, DetectorConfigBuilder, ParseStats, RunSummary,
    SeverityCounts,
};

use crate::cli::ScanArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `scan` command.
pub async fn execute(
    args: ScanArgs,
    config: &RansomwatchConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let detector_config = build_detector_config(args, config)?;

    info!(
        dns_log = %detector_config.dns_log_path.display(),
        proxy_log = %detector_config.proxy_log_path.display(),
        "starting scan"
    );

    let summary = DetectionPipeline::new(detector_config).run().await?;
    let report = ScanReport::from(summary);

    writer.render(&report)?;

    Ok(())
}

/// Apply command-line overrides on top of the loaded configuration.
fn build_detector_config(
    args: ScanArgs,
    config: &RansomwatchConfig,
) -> Result<DetectorConfig, CliError> {
    let mut builder = DetectorConfigBuilder::from_config(DetectorConfig::from_core(config));

    if let Some(path) = args.dns_log {
        builder = builder.dns_log_path(path);
    }
    if let Some(path) = args.proxy_log {
        builder = builder.proxy_log_path(path);
    }
    if let Some(path) = args.blocklist {
        builder = builder.blocklist_path(path);
    }
    if let Some(url) = args.remote_feed {
        builder = builder.remote_feed_url(Some(url));
    }
    if let Some(path) = args.alerts_out {
        builder = builder.alerts_path(path);
    }
    if let Some(bytes) = args.threshold {
        builder = builder.large_transfer_threshold_bytes(bytes);
    }

    Ok(builder.build()?)
}

/// Scan result report.
#[derive(Serialize)]
pub struct ScanReport {
    #[serde(flatten)]
    pub summary: RunSummary,
    pub severity: SeverityCounts,
}

impl From<RunSummary> for ScanReport {
    fn from(summary: RunSummary) -> Self {
        let severity = summary.severity_counts();
        Self { summary, severity }
    }
}

fn render_log_stats(w: &mut dyn Write, label: &str, stats: &ParseStats) -> std::io::Result<()> {
    if !stats.file_found {
        return writeln!(w, "  {label}: not found, skipped");
    }

    writeln!(
        w,
        "  {label}: {} lines, {} parsed, {} skipped",
        stats.lines_read,
        stats.records_parsed,
        stats.skipped.count()
    )?;
    for sample in stats.skipped.samples() {
        writeln!(
            w,
            "    line {}: {} ({})",
            sample.line_number, sample.reason, sample.line
        )?;
    }
    Ok(())
}

impl Render for ScanReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let summary = &self.summary;

        if summary.alerts.is_empty() {
            writeln!(w, "{}", "No ransomware indicators detected.".green())?;
        } else {
            for alert in &summary.alerts {
                let tag = format!("[{}]", alert.severity());
                let tag = match alert.severity() {
                    Severity::High => tag.red().bold(),
                    Severity::Medium => tag.yellow().bold(),
                };
                writeln!(
                    w,
                    "{} {} at {}: Client {} -> {}",
                    tag,
                    alert.alert_type(),
                    alert.timestamp,
                    alert.client_ip,
                    alert.target()
                )?;
            }
        }

        writeln!(w)?;
        writeln!(
            w,
            "Blocklist: {} ({} domains)",
            summary.blocklist_source, summary.blocklist_size
        )?;
        render_log_stats(w, "DNS log", &summary.dns)?;
        render_log_stats(w, "Proxy log", &summary.proxy)?;
        writeln!(
            w,
            "Alerts: {} total ({} High, {} Medium)",
            self.severity.total(),
            self.severity.high,
            self.severity.medium
        )?;
        writeln!(
            w,
            "Alerts saved to {}",
            summary.alerts_path.display().to_string().bold()
        )?;

        Ok(())
    }
}
