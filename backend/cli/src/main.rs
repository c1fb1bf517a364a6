mod config_cmd;
mod pipeline;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use broadsheet_config::BroadsheetConfig;
use broadsheet_core::FieldExtractor;
use broadsheet_logging::{init_logger, LoggerOptions};

use pipeline::{build_extractor, read_fields, read_image, Annotator, Pipeline};

#[derive(Parser)]
#[command(name = "broadsheet")]
#[command(about = "Broadsheet: newspaper field extraction and headline localization")]
#[command(version)]
struct Cli {
    /// Config file (default: $BROADSHEET_CONFIG, ./broadsheet.yaml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract fields, localize the headline and write `<stem>_result.<ext>`
    Run {
        image: PathBuf,
    },
    /// Extract fields only and print them as JSON
    Extract {
        image: PathBuf,
    },
    /// Localize a known headline without calling the model
    Localize {
        image: PathBuf,
        /// Headline line; repeat for multi-line headlines
        #[arg(long, conflicts_with = "fields")]
        headline: Vec<String>,
        /// JSON fields file as printed by `broadsheet extract`
        #[arg(long)]
        fields: Option<PathBuf>,
    },
    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: config_cmd::ConfigAction,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = broadsheet_config::resolve_config_path(cli.config.as_deref());
    let env: HashMap<String, String> = std::env::vars().collect();
    let config = broadsheet_config::load_with(&config_path, &env).await?;

    init_logger(&LoggerOptions {
        level: config.logging.level.clone(),
        dir: config.logging.dir.clone(),
        json: config.logging.json,
    });

    match cli.command {
        Commands::Config { action } => config_cmd::run(action, &config, &config_path).await,
        Commands::Run { image } => {
            broadsheet_config::check(&config)?;
            run(&config, &image).await
        }
        Commands::Extract { image } => {
            broadsheet_config::check(&config)?;
            extract(&config, &image).await
        }
        Commands::Localize {
            image,
            headline,
            fields,
        } => {
            broadsheet_config::check(&config)?;
            localize(&config, &image, headline, fields.as_deref()).await
        }
    }
}

async fn run(config: &BroadsheetConfig, image: &Path) -> Result<()> {
    let pipeline = Pipeline::from_config(config)?;
    let report = pipeline
        .run(image)
        .await
        .with_context(|| format!("Failed to process {}", image.display()))?;

    println!("{}", serde_json::to_string_pretty(&report.document)?);
    println!(
        "Annotated {} headline region(s) -> {}",
        report.annotation.localization.regions.len(),
        report.annotation.output.display()
    );
    Ok(())
}

async fn extract(config: &BroadsheetConfig, image: &Path) -> Result<()> {
    let extractor = build_extractor(config)?;
    let bytes = read_image(image).await?;
    let document = extractor
        .extract(&bytes)
        .await
        .with_context(|| format!("Failed to extract fields from {}", image.display()))?;
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

async fn localize(
    config: &BroadsheetConfig,
    image: &Path,
    headline: Vec<String>,
    fields: Option<&Path>,
) -> Result<()> {
    let headline = match fields {
        Some(path) => read_fields(path).await?.headline,
        None if headline.is_empty() => bail!("Pass --headline <text> or --fields <json>"),
        None => headline,
    };
    info!(headline = %headline.join(" "), "Localizing headline");

    let annotator = Annotator::from_config(config)?;
    let annotation = annotator
        .annotate_file(image, &headline)
        .await
        .with_context(|| format!("Failed to localize headline in {}", image.display()))?;

    println!("{}", serde_json::to_string_pretty(&annotation)?);
    Ok(())
}
