use clap::Parser;
use std::collections::BTreeMap;
use std::{fs, path::PathBuf};

use anyhow::{ensure, Result};
use log::info;
use mip_profiles::dataset::{InstanceRecord, RawDataset, RawResult};
use mip_profiles::datastructures::{Horizon, Outcome, SeedRun};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
struct AlgorithmConfig {
    name: String,
    /// Mean and spread of the relative gap to the reference objective
    mean_gap: f64,
    std_gap: f64,
    /// Probability that a run finds no solution
    failure_rate: f64,
    mean_time: f64,
    std_time: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct DataGeneratorConfig {
    algorithm_configs: Vec<AlgorithmConfig>,
    num_instances: usize,
    objective_mean: f64,
    objective_std: f64,
    #[serde(default = "default_reference")]
    reference: String,
    reference_mean_time: f64,
    seeds: Vec<u64>,
    #[serde(default)]
    horizon: Horizon,
    seed: u64,
    out_path: PathBuf,
}

fn default_reference() -> String {
    "CPLEX".to_string()
}

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to the json config
    #[arg(short, long)]
    pub config: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config: DataGeneratorConfig =
        serde_json::from_str(&fs::read_to_string(args.config)?)?;
    let out_path = config.out_path.clone();
    let dataset = generate_data(&config)?;
    info!(
        "Generated {} instances with {} algorithms",
        dataset.len(),
        config.algorithm_configs.len()
    );
    dataset.write(&out_path, false)
}

fn generate_data(config: &DataGeneratorConfig) -> Result<RawDataset> {
    ensure!(!config.seeds.is_empty(), "at least one seed is required");
    ensure!(
        config
            .algorithm_configs
            .iter()
            .all(|algo| (0.0..=1.0).contains(&algo.failure_rate)),
        "failure rates must be probabilities"
    );
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let horizon = config.horizon;
    let objectives = Normal::new(
        config.objective_mean,
        (config.objective_mean * config.objective_std).abs(),
    )?;
    let reference_times = Normal::new(
        config.reference_mean_time,
        config.reference_mean_time / 2.0,
    )?;
    let algorithm_distributions = config
        .algorithm_configs
        .iter()
        .map(|algo| -> Result<(Normal<f64>, Normal<f64>)> {
            Ok((
                Normal::new(algo.mean_gap, algo.std_gap)?,
                Normal::new(algo.mean_time, algo.std_time)?,
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((0..config.num_instances)
        .map(|i| {
            let objective = objectives.sample(&mut rng).round();
            let mut record = InstanceRecord::new(objective);
            let reference_time =
                horizon.clamp(reference_times.sample(&mut rng).abs());
            record.results.insert(
                config.reference.clone(),
                RawResult::Single(SeedRun::new(
                    Outcome::Solved(objective),
                    reference_time,
                )),
            );
            for (algo, (gaps, times)) in config
                .algorithm_configs
                .iter()
                .zip(algorithm_distributions.iter())
            {
                let runs: BTreeMap<String, SeedRun> = config
                    .seeds
                    .iter()
                    .map(|seed| {
                        let time = horizon.clamp(times.sample(&mut rng).abs());
                        let incumbent = if rng.gen_bool(algo.failure_rate) {
                            Outcome::NoSolution
                        } else {
                            let gap = gaps.sample(&mut rng).abs();
                            Outcome::Solved(objective + objective.abs() * gap)
                        };
                        (seed.to_string(), SeedRun::new(incumbent, time))
                    })
                    .collect();
                record
                    .results
                    .insert(algo.name.clone(), RawResult::Seeds(runs));
            }
            (format!("{}{}", "instance", i), record)
        })
        .collect())
}
