//! `ransomwatch config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use ransomwatch_core::config::RansomwatchConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Known top-level sections of `ransomwatch.toml`.
const SECTIONS: [&str; 4] = ["general", "blocklist", "detection", "output"];

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Execute the config validate subcommand.
///
/// Unlike the other commands, a missing file is reported as invalid here.
///
/// # Errors
///
/// Returns `CliError::Config` if validation fails (missing file, invalid values, parse errors).
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let report = match RansomwatchConfig::load(config_path).await {
        Ok(_) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: false,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Execute the config show subcommand.
///
/// Displays the effective configuration (file + env overrides + defaults).
///
/// # Errors
///
/// Returns `CliError::Config` if loading fails or `CliError::Command` if section name is invalid.
async fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %config_path.display(), "loading configuration");

    let config = RansomwatchConfig::load_or_default(config_path).await?;
    let report = build_config_report(&config, config_path, section.as_deref())?;
    writer.render(&report)?;

    Ok(())
}

fn build_config_report(
    config: &RansomwatchConfig,
    config_path: &Path,
    section: Option<&str>,
) -> Result<ConfigReport, CliError> {
    let source = config_path.display().to_string();

    let Some(section_name) = section else {
        return section_report(source, None, config);
    };

    match section_name {
        "general" => section_report(source, Some(section_name), &config.general),
        "blocklist" => section_report(source, Some(section_name), &config.blocklist),
        "detection" => section_report(source, Some(section_name), &config.detection),
        "output" => section_report(source, Some(section_name), &config.output),
        _ => Err(CliError::Command(format!(
            "unknown section: {} (expected: {})",
            section_name,
            SECTIONS.join(", ")
        ))),
    }
}

fn section_report<T: Serialize>(
    source: String,
    section: Option<&str>,
    value: &T,
) -> Result<ConfigReport, CliError> {
    Ok(ConfigReport {
        source,
        section: section.map(str::to_owned),
        config: serde_json::to_value(value)?,
        config_toml: toml::to_string_pretty(value)
            .unwrap_or_else(|e| format!("(serialization error: {})", e)),
    })
}

/// Configuration display report.
///
/// The `config_toml` field is only used for text rendering.
#[derive(Serialize)]
pub struct ConfigReport {
    /// Configuration file path
    pub source: String,
    /// Optional section name (None = full config)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Effective configuration values
    pub config: serde_json::Value,
    /// Serialized TOML configuration
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if let Some(ref section) = self.section {
            let section_label = format!("[{}]", section);
            writeln!(
                w,
                "Configuration {} (source: {})",
                section_label.bold(),
                self.source
            )?;
        } else {
            writeln!(w, "Configuration (source: {})", self.source.bold())?;
        }

        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;

        Ok(())
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    /// Configuration file path
    pub source: String,
    /// Whether the configuration is valid
    pub valid: bool,
    /// Validation error messages (empty if valid)
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;

        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(report: &impl Render) -> String {
        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("text rendering should succeed");
        String::from_utf8(buffer).expect("valid UTF-8")
    }

    #[test]
    fn test_full_config_report_contains_every_section() {
        let config = RansomwatchConfig::default();
        let report = build_config_report(&config, Path::new("ransomwatch.toml"), None)
            .expect("report should build");

        assert!(report.section.is_none());
        for section in SECTIONS {
            assert!(
                report.config_toml.contains(&format!("[{section}]")),
                "missing [{section}] in:\n{}",
                report.config_toml
            );
        }
        assert_eq!(
            report.config["detection"]["large_transfer_threshold_bytes"],
            5_000_000
        );
    }

    #[test]
    fn test_section_report_detection() {
        let config = RansomwatchConfig::default();
        let report =
            build_config_report(&config, Path::new("ransomwatch.toml"), Some("detection"))
                .expect("report should build");

        let output = render(&report);
        assert!(output.contains("[detection]"), "should show section name");
        assert!(output.contains("dns_log_path"), "should show config content");
        assert_eq!(report.config["max_skip_samples"], 10);
    }

    #[test]
    fn test_unknown_section_is_command_error() {
        let config = RansomwatchConfig::default();
        let result = build_config_report(&config, Path::new("ransomwatch.toml"), Some("ebpf"));
        match result {
            Err(CliError::Command(msg)) => {
                assert!(msg.contains("unknown section: ebpf"));
                assert!(msg.contains("blocklist"));
            }
            _ => panic!("expected Command error"),
        }
    }

    #[test]
    fn test_config_report_json_skips_toml_text() {
        let config = RansomwatchConfig::default();
        let report = build_config_report(&config, Path::new("test.toml"), Some("output"))
            .expect("report should build");

        let json = serde_json::to_value(&report).expect("JSON serialization should succeed");
        assert_eq!(json["source"].as_str(), Some("test.toml"));
        assert_eq!(json["section"].as_str(), Some("output"));
        assert_eq!(json["config"]["alerts_path"].as_str(), Some("data/alerts.csv"));
        assert!(json.get("config_toml").is_none(), "config_toml should be skipped");
    }

    #[test]
    fn test_config_validation_report_valid() {
        let report = ConfigValidationReport {
            source: "ransomwatch.toml".to_owned(),
            valid: true,
            errors: Vec::new(),
        };
        let output = render(&report);
        assert!(output.contains("Config Validation"));
        assert!(output.contains("VALID"));
        assert!(!output.contains("Error:"));
    }

    #[test]
    fn test_config_validation_report_invalid() {
        let report = ConfigValidationReport {
            source: "bad.toml".to_owned(),
            valid: false,
            errors: vec!["invalid config value for 'general.log_level'".to_owned()],
        };
        let output = render(&report);
        assert!(output.contains("INVALID"));
        assert!(output.contains("Error:"));
        assert!(output.contains("general.log_level"));
    }

    #[tokio::test]
    async fn test_validate_missing_file_fails() {
        let writer = OutputWriter::new(crate::cli::OutputFormat::Json);
        let result = execute_validate(Path::new("/nonexistent/ransomwatch.toml"), &writer).await;
        assert!(matches!(result, Err(CliError::Config(_))));
    }
}
