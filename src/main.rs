//! trackhit CLI — run the training pipeline end to end.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use trackhit::config::{PipelineConfig, SCHEMA_FILE_PATH};
use trackhit::data::CsvFileProvider;
use trackhit::schema::DatasetSchema;
use trackhit::store::LocalObjectStore;
use trackhit::TrainingPipeline;

/// Batch training pipeline for hit-song classification
#[derive(Parser, Debug)]
#[command(name = "trackhit", version, about, long_about = None)]
struct Cli {
    /// CSV dataset to train on
    data: PathBuf,

    /// Dataset schema file
    #[arg(short, long, default_value = SCHEMA_FILE_PATH)]
    schema: PathBuf,

    /// Root directory for run artifacts
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Root directory of the model registry store
    #[arg(short, long, default_value = "registry")]
    registry: PathBuf,

    /// Hyperparameter trial budget
    #[arg(short, long)]
    trials: Option<usize>,

    /// Fraction of rows held out for test
    #[arg(long)]
    split_ratio: Option<f64>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let schema = DatasetSchema::load(&cli.schema)?;
    let mut config = PipelineConfig::new(&cli.workspace);
    if let Some(trials) = cli.trials {
        config.trainer.n_trials = trials;
    }
    if let Some(ratio) = cli.split_ratio {
        config.ingestion.split_ratio = ratio;
    }

    let provider = Box::new(CsvFileProvider::new(&cli.data));
    let store = Arc::new(LocalObjectStore::new(&cli.registry));

    let mut pipeline = TrainingPipeline::new(config, schema, provider, store)?;
    let artifact = pipeline.run().await?;

    match artifact.pushed_key {
        Some(key) => println!("model promoted to {key}"),
        None => println!("model rejected, champion unchanged"),
    }
    Ok(())
}
