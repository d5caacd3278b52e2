use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use itertools::Itertools;
use log::{error, info, warn};

use mip_profiles::config::{Args, Command, Config};
use mip_profiles::csv_parser;
use mip_profiles::dataset::*;
use mip_profiles::integrity;
use mip_profiles::profiles::{self, ProfileKind};
use mip_profiles::summary;

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbosity.log_level_filter())
        .init();
    let config = match Config::from_cli(&args) {
        Ok(config) => config,
        Err(err) => {
            error!("Invalid configuration: {err:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };
    match &args.command {
        Command::Init { instances } => init(&config, instances),
        Command::Merge { partials } => merge(&config, partials),
        Command::Combine { with, drop } => combine(&config, with, drop),
        Command::Aggregate => aggregate(&config),
        Command::Gaps => gaps(&config),
        Command::Check => {
            let dataset = AggregatedDataset::from_path(config.dataset_path()?)?;
            ensure_feasible(&dataset, &config);
            info!("All {} instances are feasible", dataset.len());
            Ok(())
        }
        Command::Profile { kind } => profile(&config, *kind),
        Command::Summary => summarize(&config),
        Command::Export => export(&config),
    }
}

fn init(config: &Config, instances: &Path) -> Result<()> {
    let instances = csv_parser::read_instances(instances)?;
    let dataset = RawDataset::skeleton(
        &instances,
        &config.reference,
        &config.algorithms,
        &config.seeds,
    )?;
    info!(
        "Created {} instances with {} pending runs",
        dataset.len(),
        dataset.pending_runs()
    );
    dataset.write(config.dataset_path()?, config.dry_run)
}

fn merge(config: &Config, partials: &[PathBuf]) -> Result<()> {
    let path = config.dataset_path()?;
    let mut dataset = RawDataset::from_path(path)?;
    for partial in partials {
        let updated = dataset.merge_partial(read_partial_results(partial)?)?;
        info!("Merged {updated} runs from {partial:?}");
    }
    match dataset.pending_runs() {
        0 => info!("All runs have reported"),
        pending => warn!("{pending} runs are still pending"),
    }
    dataset.write(path, config.dry_run)
}

fn combine(config: &Config, with: &Path, drop: &[String]) -> Result<()> {
    // the shape of the results does not matter for combining
    let base = Dataset::<serde_json::Value>::from_path(config.dataset_path()?)?;
    let other = Dataset::<serde_json::Value>::from_path(with)?;
    let mut combined = base.combine(other)?;
    let dropped = combined.drop_algorithms(drop);
    info!(
        "Combined dataset has algorithms [{}], dropped {dropped} results",
        combined.algorithms()?.join(", ")
    );
    combined.write(config.out_path()?, config.dry_run)
}

fn aggregate(config: &Config) -> Result<()> {
    let raw = RawDataset::from_path(config.dataset_path()?)?;
    let aggregated = raw.aggregate(&config.reference, config.horizon)?;
    aggregated.write(config.out_path()?, config.dry_run)
}

fn gaps(config: &Config) -> Result<()> {
    let aggregated = AggregatedDataset::from_path(config.dataset_path()?)?;
    ensure_feasible(&aggregated, config);
    aggregated
        .into_gaps()
        .write(config.out_path()?, config.dry_run)
}

/// Exits with `DATAERR` if any result beats the reference objective.
fn ensure_feasible(dataset: &AggregatedDataset, config: &Config) {
    if let Err(err) = integrity::ensure_feasible(dataset, &config.reference) {
        error!("{:?}: {err}", config.dataset);
        std::process::exit(exitcode::DATAERR);
    }
}

fn profile(config: &Config, kind: ProfileKind) -> Result<()> {
    let dataset = AggregatedDataset::from_path(config.dataset_path()?)?;
    ensure_feasible(&dataset, config);
    let profile = match kind {
        ProfileKind::Time => {
            profiles::time_profile(&dataset, config.horizon, config.num_buckets)?
        }
        ProfileKind::Gap => {
            profiles::gap_profile(&dataset, config.num_buckets)?
        }
    };
    for (algorithm, integral) in profile.integrals() {
        info!("{kind} integral of {algorithm}: {integral}");
    }
    let out = config.out_path()?;
    csv_parser::df_to_csv(
        csv_parser::profile_table(&profile)?,
        &out.with_extension("csv"),
        config.delimiter_byte(),
        config.dry_run,
    )?;
    profile.write_integrals(&out.with_extension("txt"), config.dry_run)
}

fn summarize(config: &Config) -> Result<()> {
    let dataset = AggregatedDataset::from_path(config.dataset_path()?)?;
    ensure_feasible(&dataset, config);
    let summaries = summary::summarize(&dataset, config.horizon)?;
    let report = summaries.iter().join("\n");
    println!("{report}");
    if config.out.as_os_str().is_empty() || config.dry_run {
        return Ok(());
    }
    fs::write(&config.out, report + "\n")?;
    info!("Summary saved to {:?}", config.out);
    Ok(())
}

fn export(config: &Config) -> Result<()> {
    // gap datasets are only written by `gaps`, which rejects infeasible input
    let dataset = GapDataset::from_path(config.dataset_path()?)?;
    let table = csv_parser::gap_table(&dataset, &config.reference)?;
    csv_parser::df_to_csv(
        table,
        config.out_path()?,
        config.delimiter_byte(),
        config.dry_run,
    )
}
