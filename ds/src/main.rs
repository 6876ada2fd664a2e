use clap::Parser;
use colored::*;
use eyre::{Context, Result};

use docstore::DocStore;
use docstore::cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let store = DocStore::open(&cli.root).context("Failed to open document store")?;

    match cli.command {
        Command::List => {
            let keys = store.keys()?;
            if keys.is_empty() {
                println!("No documents found in {}", cli.root.display());
            } else {
                for key in keys {
                    println!("{}", key.cyan());
                }
            }
        }
        Command::Cat { key } => {
            if !store.contains(&key) {
                return Err(eyre::eyre!("No document for key '{}'", key));
            }
            let content = std::fs::read_to_string(store.doc_path(&key))?;
            print!("{}", content);
        }
    }

    Ok(())
}
