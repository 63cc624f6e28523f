use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::{Args, Parser, Subcommand};
use cityweather_core::{
    Config, Pipeline, PipelineOutcome, PipelineRequest, Region, SourceId, StateSelector,
    source::{city_source_from_config, weather_source_from_config},
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "cityweather",
    version,
    about = "Fetch the 50 most populous cities of a German state and their current weather",
    args_conflicts_with_subcommands = true,
    subcommand_negates_reqs = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub fetch: FetchArgs,
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// State code, e.g. "13" for Sachsen. All states when omitted.
    #[arg(long, value_parser = parse_region)]
    pub state: Option<Region>,

    /// Directory where the CSV files are written; created if missing.
    #[arg(long, required = true)]
    pub output: Option<PathBuf>,

    /// Weather fields to drop, e.g. `--exclude humidity weather_description`.
    #[arg(long, num_args = 0..)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the credential for a data source.
    Configure {
        /// Source short name: "geonames" or "openweather".
        source: String,
    },
}

fn parse_region(value: &str) -> Result<Region, String> {
    Region::try_from(value).map_err(|e| e.to_string())
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Command::Configure { source }) => configure(&source),
            None => fetch(self.fetch).await,
        }
    }
}

fn configure(source: &str) -> anyhow::Result<()> {
    let id = SourceId::try_from(source)?;
    let mut config = Config::load()?;

    let prompt = format!("{}:", id.credential_label());
    let credential = match id {
        SourceId::GeoNames => inquire::Text::new(&prompt).prompt(),
        SourceId::OpenWeather => inquire::Password::new(&prompt)
            .with_display_mode(inquire::PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt(),
    }
    .context("Failed to read credential")?;

    let credential = credential.trim();
    if credential.is_empty() {
        return Err(anyhow!("Empty {}, nothing saved.", id.credential_label()));
    }

    config.upsert_credential(id, credential.to_string());
    config.save()?;

    tracing::info!("Saved {} to {}", id.credential_label(), Config::config_file_path()?.display());
    Ok(())
}

async fn fetch(args: FetchArgs) -> anyhow::Result<()> {
    let output_dir = args.output.ok_or_else(|| anyhow!("--output <dir> is required"))?;
    let output_dir = std::path::absolute(&output_dir)
        .with_context(|| format!("Invalid output directory: {}", output_dir.display()))?;

    let config = Config::load()?;
    let pipeline =
        Pipeline::new(city_source_from_config(&config)?, weather_source_from_config(&config)?);

    let request = PipelineRequest {
        selector: StateSelector::from(args.state),
        output_dir,
        exclude: args.exclude,
    };

    let outcome = pipeline.run(&request).await?;
    exit_status(&outcome, request.selector)
}

/// A written or skipped file is success; an empty city set fails the process.
fn exit_status(outcome: &PipelineOutcome, selector: StateSelector) -> anyhow::Result<()> {
    match outcome {
        PipelineOutcome::Written { .. } | PipelineOutcome::Skipped { .. } => Ok(()),
        PipelineOutcome::NoCities => Err(anyhow!("No city data fetched for {selector}")),
    }
}
