#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Route weathering analysis from the command line.
//!
//! ```text
//! weathering analyze --input route.csv [--material asphalt] [--output results.csv]
//!                    [--climate-out climate.json] [--seed 42]
//! weathering reanalyze --climate climate.json --material metal
//! weathering materials
//! ```
//!
//! `analyze` queries NASA POWER once per proximity cluster of route days.
//! `reanalyze` re-derives results from a saved climate snapshot and never
//! touches the network.
//!
//! Uses `indicatif-log-bridge` (via [`weathering_cli_utils::init_logger`])
//! so log lines and the cluster progress bar share the terminal.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng as _;
use rand_chacha::ChaCha8Rng;
use weathering_cli_utils::IndicatifProgress;
use weathering_climate::power::PowerClient;
use weathering_climate::service_registry::{self, ProviderService};
use weathering_pipeline::{
    AggregationLevel, AnalysisConfig, ConfigError, PipelineError, export, snapshot,
};
use weathering_surface_models::{
    AnalysisResult, InvalidSurfaceError, MaterialType, RiskLevel, SurfaceProperties,
};

#[derive(Parser)]
#[command(
    name = "weathering",
    about = "Estimate weathering stress on a surface carried along a route"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve climate for a route and analyze it
    Analyze {
        /// Route file (CSV or JSON array of positions)
        #[arg(long, short)]
        input: PathBuf,

        /// TOML analysis configuration
        #[arg(long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        surface: SurfaceArgs,

        /// First day of interest (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<NaiveDate>,

        /// Last day of interest (YYYY-MM-DD)
        #[arg(long)]
        end_date: Option<NaiveDate>,

        /// Temporal granularity (only `daily` is supported)
        #[arg(long)]
        aggregation: Option<AggregationLevel>,

        /// Seed for synthetic fallback values
        #[arg(long)]
        seed: Option<u64>,

        /// Results CSV path (stdout if omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Save resolved climate records for `reanalyze`
        #[arg(long)]
        climate_out: Option<PathBuf>,

        /// Override the provider endpoint
        #[arg(long)]
        provider_url: Option<String>,
    },
    /// Re-derive results from a climate snapshot without network access
    Reanalyze {
        /// Snapshot written by `analyze --climate-out`
        #[arg(long)]
        climate: PathBuf,

        /// TOML analysis configuration (only the surface is used)
        #[arg(long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        surface: SurfaceArgs,

        /// Results CSV path (stdout if omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// List material presets
    Materials,
}

#[derive(Args, Debug, Clone, Copy, Default)]
struct SurfaceArgs {
    /// Material preset (wood, concrete, asphalt, metal, plastic, custom)
    #[arg(long, short)]
    material: Option<MaterialType>,

    /// Surface albedo, 0..=1
    #[arg(long)]
    albedo: Option<f64>,

    /// Surface emissivity, (0, 1]
    #[arg(long)]
    emissivity: Option<f64>,
}

impl SurfaceArgs {
    /// Applies the flags on top of `base`.
    ///
    /// A material flag starts from that material's preset; bare albedo or
    /// emissivity flags adjust `base`.
    fn apply(self, base: SurfaceProperties) -> Result<SurfaceProperties, InvalidSurfaceError> {
        match self.material {
            Some(material) => {
                SurfaceProperties::with_overrides(material, self.albedo, self.emissivity)
            }
            None if self.albedo.is_some() || self.emissivity.is_some() => SurfaceProperties::new(
                base.material_type(),
                self.albedo.unwrap_or_else(|| base.albedo()),
                self.emissivity.unwrap_or_else(|| base.emissivity()),
            ),
            None => Ok(base),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = weathering_cli_utils::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            config,
            surface,
            start_date,
            end_date,
            aggregation,
            seed,
            output,
            climate_out,
            provider_url,
        } => {
            let mut config = load_config(config.as_deref())?;
            config.surface = surface.apply(config.surface)?;
            config.start_date = start_date.or(config.start_date);
            config.end_date = end_date.or(config.end_date);
            if let Some(aggregation) = aggregation {
                config.aggregation = aggregation;
            }
            config.validate()?;

            let service = provider_service(provider_url)?;
            config.request_delay_ms = config.request_delay_ms.max(service.rate_limit_ms);
            let provider = PowerClient::new(service)?;

            let samples = weathering_route::parsing::load_path(&input)?;

            let seed = seed.unwrap_or_else(rand::random);
            log::info!("Synthetic fallback seed: {seed}");
            let mut rng = ChaCha8Rng::seed_from_u64(seed);

            let progress = IndicatifProgress::clusters_bar(&multi, "Resolving climate");
            let analysis =
                weathering_pipeline::run(&provider, &samples, &config, &mut rng, Some(&progress))
                    .await?;

            if let Some(path) = climate_out {
                snapshot::save(&path, &analysis.climate)?;
            }
            write_results(output.as_deref(), &analysis.results)?;

            let report = analysis.report;
            eprintln!(
                "{} days analyzed: {} from provider, {} synthetic, {} dropped ({} requests)",
                analysis.results.len(),
                report.provider_records,
                report.synthetic_records,
                report.dropped_points,
                report.provider_requests
            );
            print_risk_summary(&analysis.results);
        }
        Commands::Reanalyze {
            climate,
            config,
            surface,
            output,
        } => {
            let config = load_config(config.as_deref())?;
            let properties = surface.apply(config.surface)?;

            let records = snapshot::load(&climate)?;
            let results = weathering_pipeline::reanalyze(&records, &properties);

            write_results(output.as_deref(), &results)?;
            eprintln!(
                "{} days re-analyzed for {} (albedo {:.2}, emissivity {:.2})",
                results.len(),
                properties.material_type(),
                properties.albedo(),
                properties.emissivity()
            );
            print_risk_summary(&results);
        }
        Commands::Materials => {
            println!("{:<10} {:>7} {:>11}", "MATERIAL", "ALBEDO", "EMISSIVITY");
            for material in MaterialType::presets() {
                if let Some((albedo, emissivity)) = material.optical_values() {
                    println!("{material:<10} {albedo:>7.2} {emissivity:>11.2}");
                }
            }
            println!(
                "{:<10} {:>7} {:>11}",
                MaterialType::Custom.as_ref(),
                "--albedo",
                "--emissivity"
            );
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig, ConfigError> {
    path.map_or_else(|| Ok(AnalysisConfig::default()), AnalysisConfig::load)
}

fn provider_service(
    base_url: Option<String>,
) -> Result<ProviderService, Box<dyn std::error::Error>> {
    let service = service_registry::service(service_registry::NASA_POWER)
        .ok_or("NASA POWER service configuration missing")?;
    Ok(match base_url {
        Some(url) => service.with_base_url(url),
        None => service,
    })
}

fn write_results(path: Option<&Path>, results: &[AnalysisResult]) -> Result<(), PipelineError> {
    match path {
        Some(path) => export::write_csv_file(path, results),
        None => export::write_csv(std::io::stdout().lock(), results),
    }
}

fn print_risk_summary(results: &[AnalysisResult]) {
    let count = |level: RiskLevel| {
        results
            .iter()
            .filter(|r| r.risk_assessment.cracking_risk == level)
            .count()
    };
    let peak_aging = results
        .iter()
        .map(|r| r.risk_assessment.aging_rate)
        .reduce(f64::max);

    eprintln!(
        "Cracking risk: {} high, {} medium, {} low",
        count(RiskLevel::High),
        count(RiskLevel::Medium),
        count(RiskLevel::Low)
    );
    if let Some(rate) = peak_aging {
        eprintln!("Peak aging rate: {rate:.2}x");
    }
}
