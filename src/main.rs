//! CLI entry point for Sholl analysis of segmented cell masks

use clap::Parser;
use shollscan::io::cli::{Cli, MaskProcessor};

fn main() -> shollscan::Result<()> {
    // Logging is best-effort; a failed logger init must not block analysis
    let _logger = flexi_logger::Logger::try_with_env_or_str("info")
        .ok()
        .and_then(|logger| logger.log_to_stderr().start().ok());

    let cli = Cli::parse();
    let mut processor = MaskProcessor::new(cli);
    processor.process()
}
