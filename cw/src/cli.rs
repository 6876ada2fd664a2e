//! CLI argument parsing for cronsweep

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cw")]
#[command(author, version, about = "Census of cron schedules in GitHub Actions workflows", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Account whose repositories to scan; scans the whole search index
    /// when omitted
    pub account: Option<String>,
}
