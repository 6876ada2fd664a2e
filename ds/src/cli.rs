//! CLI argument parsing for docstore

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ds")]
#[command(author, version, about = "Keyed JSON document store", long_about = None)]
pub struct Cli {
    /// Store root directory
    #[arg(short, long, default_value = "data")]
    pub root: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List document keys in the store
    List,

    /// Print a document to stdout
    Cat {
        /// Document key
        #[arg(required = true)]
        key: String,
    },
}
