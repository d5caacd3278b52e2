use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};
use clap_verbosity_flag::Verbosity;
use serde::{Deserialize, Serialize};

use crate::datastructures::*;
use crate::profiles::ProfileKind;

/// Settings shared by every pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Input dataset of the stage
    #[serde(default)]
    pub dataset: PathBuf,
    /// Output file of the stage
    #[serde(default)]
    pub out: PathBuf,
    /// Time limit of the solver runs
    #[serde(default)]
    pub horizon: Horizon,
    /// Resolution of the success rate curves
    #[serde(default = "default_num_buckets")]
    pub num_buckets: usize,
    /// Tag of the exact reference solver
    #[serde(default = "default_reference")]
    pub reference: Algorithm,
    /// Seeded algorithm tags, only needed to create a new dataset
    #[serde(default)]
    pub algorithms: Vec<Algorithm>,
    /// Seeds of the algorithm runs, only needed to create a new dataset
    #[serde(default)]
    pub seeds: Vec<u64>,
    /// Column delimiter of exported tables
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Run every computation but skip all writes
    #[serde(default)]
    pub dry_run: bool,
}

fn default_num_buckets() -> usize {
    100
}

fn default_reference() -> Algorithm {
    "CPLEX".to_string()
}

fn default_delimiter() -> char {
    ','
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset: PathBuf::new(),
            out: PathBuf::new(),
            horizon: Horizon::default(),
            num_buckets: default_num_buckets(),
            reference: default_reference(),
            algorithms: vec![],
            seeds: vec![],
            delimiter: default_delimiter(),
            dry_run: false,
        }
    }
}

impl Config {
    /// Reads a json config, missing keys take their defaults.
    pub fn from_path(path: &Path) -> Result<Config> {
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {path:?}"))?;
        serde_json::from_str(&config_str)
            .with_context(|| format!("malformed config {path:?}"))
    }

    /// Reads the json config if one is given and applies the command line
    /// overrides on top of it.
    pub fn from_cli(args: &Args) -> Result<Config> {
        let mut config = match &args.config {
            Some(path) => Config::from_path(path)?,
            None => Config::default(),
        };
        if let Some(dataset) = &args.dataset {
            config.dataset = dataset.to_path_buf();
        }
        if let Some(out) = &args.out {
            config.out = out.to_path_buf();
        }
        if let Some(horizon) = args.horizon {
            config.horizon = horizon;
        }
        if let Some(num_buckets) = args.num_buckets {
            config.num_buckets = num_buckets;
        }
        if let Some(reference) = &args.reference {
            config.reference = reference.clone();
        }
        if let Some(algorithms) = &args.algorithms {
            config.algorithms = algorithms.to_vec();
        }
        if let Some(seeds) = &args.seeds {
            config.seeds = seeds.to_vec();
        }
        if let Some(delimiter) = args.delimiter {
            config.delimiter = delimiter;
        }
        config.dry_run |= args.dry_run;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.num_buckets > 0, "number of buckets must be positive");
        ensure!(
            self.delimiter.is_ascii(),
            "delimiter {:?} is not an ascii character",
            self.delimiter
        );
        ensure!(!self.reference.is_empty(), "reference tag must not be empty");
        Ok(())
    }

    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }

    pub fn dataset_path(&self) -> Result<&Path> {
        ensure!(
            !self.dataset.as_os_str().is_empty(),
            "no dataset given, use --dataset or the config file"
        );
        Ok(&self.dataset)
    }

    pub fn out_path(&self) -> Result<&Path> {
        ensure!(
            !self.out.as_os_str().is_empty(),
            "no output file given, use --out or the config file"
        );
        Ok(&self.out)
    }
}

/// Command line of the pipeline, global options override the config file.
#[derive(Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Path to the json config
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Path to the input dataset
    #[arg(short, long, global = true, value_name = "FILE")]
    pub dataset: Option<PathBuf>,
    /// Path to the output file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub out: Option<PathBuf>,
    /// Time limit of the solver runs in seconds
    #[arg(short = 't', long, global = true, value_parser)]
    pub horizon: Option<Horizon>,
    /// Number of buckets the time horizon and gap range are split into
    #[arg(short = 'b', long, global = true)]
    pub num_buckets: Option<usize>,
    /// Tag of the exact reference solver
    #[arg(short, long, global = true)]
    pub reference: Option<Algorithm>,
    /// Seeded algorithm tags
    #[arg(long, global = true, value_delimiter = ' ', num_args = 0..)]
    pub algorithms: Option<Vec<Algorithm>>,
    /// Random seeds every algorithm is run with
    #[arg(long, global = true, value_delimiter = ' ', num_args = 0..)]
    pub seeds: Option<Vec<u64>>,
    /// Column delimiter of exported tables
    #[arg(long, global = true)]
    pub delimiter: Option<char>,
    /// Compute everything but do not write any file
    #[arg(long, global = true)]
    pub dry_run: bool,
    #[command(flatten)]
    pub verbosity: Verbosity,
    #[command(subcommand)]
    pub command: Command,
}

/// Pipeline stage to run.
#[derive(Subcommand)]
pub enum Command {
    /// Create a raw dataset with pending runs from a csv instance list
    Init {
        /// CSV file with `Instance` and `Objective` columns
        #[arg(short, long, value_name = "FILE")]
        instances: PathBuf,
    },
    /// Store the runs of partial result files in the raw dataset
    Merge {
        /// JSON files with results of finished runs
        #[arg(required = true, num_args = 1..)]
        partials: Vec<PathBuf>,
    },
    /// Add the algorithms of another dataset over the same instances
    Combine {
        /// Dataset whose algorithms are added
        #[arg(short, long, value_name = "FILE")]
        with: PathBuf,
        /// Algorithm tags to remove from the combined dataset
        #[arg(long, value_delimiter = ' ', num_args = 0..)]
        drop: Vec<Algorithm>,
    },
    /// Collapse the seeds of every algorithm into a single result
    Aggregate,
    /// Replace aggregated values by their relative gap
    Gaps,
    /// Report results that beat the reference objective
    Check,
    /// Build success rate curves and their integrals
    Profile {
        /// Measure success over time or over gap thresholds
        #[arg(short, long, value_enum, default_value_t = ProfileKind::Time)]
        kind: ProfileKind,
    },
    /// Print per-algorithm statistics
    Summary,
    /// Write the gap table for performance profile tools
    Export,
}
