//! `ransomwatch blocklist` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use ransomwatch_core::config::RansomwatchConfig;
use ransomwatch_detector::{
    Blocklist, BlocklistSource, DetectionPipeline, DetectorConfig, DetectorConfigBuilder,
};

use crate::cli::BlocklistArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `blocklist` command.
///
/// Loads the blocklist exactly as `scan` would, including the remote feed
/// and fallback rules.
pub async fn execute(
    args: BlocklistArgs,
    config: &RansomwatchConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let mut builder = DetectorConfigBuilder::from_config(DetectorConfig::from_core(config));
    if let Some(url) = args.remote {
        builder = builder.remote_feed_url(Some(url));
    }
    let detector_config = builder.build()?;

    info!(path = %detector_config.blocklist_path.display(), "loading blocklist");

    let blocklist = DetectionPipeline::new(detector_config).load_blocklist().await;
    let report = BlocklistReport::new(&blocklist, args.list);

    writer.render(&report)?;

    Ok(())
}

/// Effective blocklist description.
#[derive(Debug, Serialize)]
pub struct BlocklistReport {
    pub source: BlocklistSource,
    pub size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domains: Option<Vec<String>>,
}

impl BlocklistReport {
    fn new(blocklist: &Blocklist, list: bool) -> Self {
        let domains = list.then(|| {
            blocklist
                .sorted_domains()
                .into_iter()
                .map(str::to_owned)
                .collect()
        });
        Self {
            source: blocklist.source().clone(),
            size: blocklist.len(),
            domains,
        }
    }
}

impl Render for BlocklistReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let source = self.source.to_string();
        let source = match self.source {
            BlocklistSource::Fallback => source.yellow(),
            BlocklistSource::File(_) | BlocklistSource::Remote(_) => source.green(),
        };
        writeln!(w, "Blocklist: {}", source)?;
        writeln!(w, "  Domains: {}", self.size)?;

        if let Some(ref domains) = self.domains {
            writeln!(w)?;
            for domain in domains {
                writeln!(w, "  {}", domain)?;
            }
        }

        Ok(())
    }
}
