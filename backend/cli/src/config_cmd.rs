//! `broadsheet config` subcommands.

use std::path::Path;

use anyhow::{bail, Result};
use clap::Subcommand;

use broadsheet_config::{redact, validate, write_config, BroadsheetConfig};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective config with secrets masked
    Show,
    /// Write a config file with every default filled in
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Report config errors and warnings
    Check,
}

pub async fn run(action: ConfigAction, config: &BroadsheetConfig, path: &Path) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("# {}", path.display());
            print!("{}", render_redacted(config)?);
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                bail!("{} already exists; pass --force to overwrite", path.display());
            }
            write_config(&BroadsheetConfig::default(), path).await?;
            println!("Wrote {}", path.display());
        }
        ConfigAction::Check => {
            let report = validate(config);
            for warning in &report.warnings {
                println!("warning: {warning}");
            }
            for error in &report.errors {
                println!("error: {error}");
            }
            if !report.is_valid() {
                bail!("{} config error(s) in {}", report.errors.len(), path.display());
            }
            println!("{} is valid", path.display());
        }
    }
    Ok(())
}

fn render_redacted(config: &BroadsheetConfig) -> Result<String> {
    let value = redact(&serde_json::to_value(config)?);
    Ok(serde_yaml::to_string(&value)?)
}
