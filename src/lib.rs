#![warn(missing_docs)]
//! Aggregate randomized solver benchmarks into comparable performance
//! profiles.
//!
//! A benchmark consists of a set of instances with a known reference objective,
//! an exact reference solver that is run once per instance, and a number of
//! randomized algorithm variants that are run once per instance and seed. The
//! per-seed results are noisy and partially fail, so they are first collapsed
//! into a single `(value, time)` pair per instance and algorithm, using a
//! majority rule for runs without a solution and for runs that hit the time
//! limit.
//!
//! From the aggregated data two kinds of empirical curves are built: the
//! fraction of instances solved over time and the fraction of instances solved
//! within a relative gap to the reference objective. The area under each
//! curve is used to rank the algorithm variants.
//!
//! The datasets are stored as json (one object per instance, `_obj` holds the
//! reference objective) and every transformation consumes its input type, so
//! a raw dataset can be aggregated exactly once.
//!
//! Example
//! ```rust
//! use mip_profiles::dataset::{AggregatedDataset, RawDataset};
//! use mip_profiles::datastructures::Horizon;
//! use mip_profiles::{integrity, profiles};
//! # use std::path::Path;
//! # use anyhow::Result;
//!
//! fn example() -> Result<()> {
//!     let horizon = Horizon::default(); // 300 seconds
//!     let num_buckets = 100;
//!
//!     let raw = RawDataset::from_path(Path::new("raw.json"))?;
//!     let aggregated: AggregatedDataset = raw.aggregate("CPLEX", horizon)?;
//!
//!     // results below the reference objective point to a solver bug
//!     let violations = integrity::check(&aggregated, "CPLEX");
//!     if !violations.is_empty() {
//!         for violation in violations {
//!             eprintln!("{violation}");
//!         }
//!         std::process::exit(exitcode::DATAERR);
//!     }
//!
//!     let profile = profiles::time_profile(&aggregated, horizon, num_buckets)?;
//!     for (algorithm, integral) in profile.integrals() {
//!         println!("{algorithm}: {integral}");
//!     }
//!     Ok(())
//! }
//! ```

/// Censored aggregation of seeded runs and relative gaps.
pub mod aggregation;

/// Pipeline configuration and command line arguments.
pub mod config;

/// Reading instance lists and writing tables through polars.
pub mod csv_parser;

/// Raw, aggregated and gap datasets and their json representation.
pub mod dataset;

/// Data structures for single runs and their aggregates.
pub mod datastructures;

/// Feasibility check of aggregated results against the reference objective.
pub mod integrity;

/// Empirical success rate curves and their integrals.
pub mod profiles;

/// Per-algorithm summary statistics.
pub mod summary;
