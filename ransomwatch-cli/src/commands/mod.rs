//! Command handlers -- one module per subcommand

pub mod blocklist;
pub mod config;
pub mod report;
pub mod scan;
