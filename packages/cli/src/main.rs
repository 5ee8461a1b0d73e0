#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! County accident-risk pipeline.
//!
//! ```text
//! accident_risk run <incidents.csv> <population.csv> [--output-dir output]
//! accident_risk population <population.csv>
//! accident_risk sniff <incidents.csv> <population.csv> [--limit 1000]
//! ```
//!
//! Every subcommand reads its defaults from the TOML file named by
//! `--config` (or `ACCIDENT_RISK_CONFIG`); flags override the file.

mod config;
mod output;
mod pipeline;
mod report;

use std::path::{Path, PathBuf};

use accident_risk_analytics::ranking::{riskiest, safest};
use accident_risk_cli_utils::{IndicatifProgress, MultiProgress};
use accident_risk_geography::normalize::sniff_state_format;
use accident_risk_geography::population::sniff_population_schema;
use accident_risk_geography_models::PopulationSheet;
use accident_risk_ingest::clean::clean_incidents;
use accident_risk_ingest::load::{read_incidents_file, read_population_file};
use accident_risk_ingest::progress::null_progress;
use accident_risk_ingest_models::LoadOptions;
use clap::{Parser, Subcommand};

use crate::config::{CONFIG_ENV, Overrides, PipelineConfig};

#[derive(Parser)]
#[command(
    name = "accident_risk",
    about = "Score US counties by traffic accident risk"
)]
struct Cli {
    /// Pipeline config file (TOML)
    #[arg(long, global = true, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and write the score tables
    Run {
        /// Incident CSV file
        incidents: PathBuf,
        /// Population extract CSV file
        population: PathBuf,
        /// Directory for the CSV tables and run summary
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,
        /// Year scored on its own
        #[arg(long)]
        focus_year: Option<i32>,
        /// Counties listed in each ranking
        #[arg(long)]
        top_n: Option<usize>,
        /// Maximum incident records to read
        #[arg(long)]
        limit: Option<u64>,
        /// Caption lines before the population extract's labels
        #[arg(long)]
        population_skip_rows: Option<usize>,
        /// Ridge penalty strength
        #[arg(long)]
        l2: Option<f64>,
        /// Share of counties held out for evaluation
        #[arg(long)]
        test_fraction: Option<f64>,
        /// Train/test shuffle seed
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Build the population table and print summary statistics
    Population {
        /// Population extract CSV file
        population: PathBuf,
        /// Caption lines before the population extract's labels
        #[arg(long)]
        population_skip_rows: Option<usize>,
    },
    /// Print the detected state format and population layout
    Sniff {
        /// Incident CSV file
        incidents: PathBuf,
        /// Population extract CSV file
        population: PathBuf,
        /// Incident records to sample
        #[arg(long, default_value = "1000")]
        limit: u64,
        /// Caption lines before the population extract's labels
        #[arg(long)]
        population_skip_rows: Option<usize>,
    },
}

fn load_population(
    path: &Path,
    config: &PipelineConfig,
) -> Result<PopulationSheet, Box<dyn std::error::Error>> {
    let options = LoadOptions {
        limit: None,
        skip_rows: config.population_skip_rows,
    };
    Ok(read_population_file(path, &options)?)
}

fn run(
    multi: &MultiProgress,
    config: &PipelineConfig,
    incidents: &Path,
    population: &Path,
    output_dir: &Path,
    limit: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let reading = IndicatifProgress::records_bar(multi, "Reading incidents");
    let raw = read_incidents_file(
        incidents,
        &LoadOptions {
            limit,
            skip_rows: 0,
        },
        &reading,
    )?;
    let sheet = load_population(population, config)?;

    let stages = IndicatifProgress::stages_bar(multi, "Pipeline");
    let output = pipeline::run(&raw, &sheet, config, &stages)?;

    let written = output::write_outputs(output_dir, &output)?;

    println!();
    report::print_ranking(
        &format!("Top {} riskiest counties (accidents per 1000)", config.top_n),
        &riskiest(&output.all_years, config.top_n),
    );
    println!();
    report::print_ranking(
        &format!("Top {} safest counties (accidents per 1000)", config.top_n),
        &safest(&output.all_years, config.top_n),
    );
    println!();
    report::print_importances(&output.summary.feature_importances);
    println!();
    for path in &written {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn summarize_population(
    config: &PipelineConfig,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let sheet = load_population(path, config)?;
    let (records, resolved) = pipeline::prepare_population(&sheet);
    if !resolved {
        eprintln!("Population extract has no State/County labels in its first row");
        std::process::exit(1);
    }

    println!("{} counties with driving-age population", records.len());
    report::print_population(report::describe_population(&records).as_ref());
    Ok(())
}

fn sniff(
    config: &PipelineConfig,
    incidents: &Path,
    population: &Path,
    limit: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = LoadOptions {
        limit: Some(limit),
        skip_rows: 0,
    };
    let raw = read_incidents_file(incidents, &options, &null_progress())?;
    let (cleaned, _) = clean_incidents(&raw);
    let sheet = load_population(population, config)?;

    let report = serde_json::json!({
        "incidentStates": sniff_state_format(&cleaned),
        "populationSchema": sniff_population_schema(&sheet),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = accident_risk_cli_utils::init_logger();
    let cli = Cli::parse();

    let file_config = PipelineConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            incidents,
            population,
            output_dir,
            focus_year,
            top_n,
            limit,
            population_skip_rows,
            l2,
            test_fraction,
            seed,
        } => {
            let config = file_config.with_overrides(&Overrides {
                focus_year,
                population_skip_rows,
                top_n,
                l2,
                test_fraction,
                seed,
            });
            run(&multi, &config, &incidents, &population, &output_dir, limit)?;
        }
        Commands::Population {
            population,
            population_skip_rows,
        } => {
            let config = file_config.with_overrides(&Overrides {
                population_skip_rows,
                ..Overrides::default()
            });
            summarize_population(&config, &population)?;
        }
        Commands::Sniff {
            incidents,
            population,
            limit,
            population_skip_rows,
        } => {
            let config = file_config.with_overrides(&Overrides {
                population_skip_rows,
                ..Overrides::default()
            });
            sniff(&config, &incidents, &population, limit)?;
        }
    }

    Ok(())
}
