use core::fmt;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use itertools::Itertools;
use log::info;
use ndarray::{Array1, Axis};
use serde::{Deserialize, Serialize};

use crate::aggregation::sample_gap;
use crate::dataset::AggregatedDataset;
use crate::datastructures::*;

/// Which threshold the success rate of a profile is measured against.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    /// Fraction of instances solved within a time budget
    Time,
    /// Fraction of instances solved within a relative gap
    Gap,
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileKind::Time => write!(f, "time"),
            ProfileKind::Gap => write!(f, "gap"),
        }
    }
}

/// Index of the time bucket `time` falls into when the horizon is split into
/// `num_buckets` buckets of equal width.
///
/// Times are truncated, a time at or beyond the horizon lands in the last
/// bucket.
pub fn time_bucket(time: f64, horizon: Horizon, num_buckets: usize) -> usize {
    let width = horizon.seconds() / num_buckets as f64;
    let bucket = (time / width).floor().max(0.0) as usize;
    bucket.min(num_buckets.saturating_sub(1))
}

/// Index of the gap bucket for `gap`, rounding up so that only an exact
/// match lands in bucket 0. Index `num_buckets` is shared with the runs that
/// found no solution.
pub fn gap_bucket(gap: f64, num_buckets: usize) -> usize {
    let bucket = (gap * num_buckets as f64).ceil().max(0.0) as usize;
    bucket.min(num_buckets)
}

/// Cumulative success rate of one algorithm.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub algorithm: Algorithm,
    pub fractions: Array1<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub kind: ProfileKind,
    pub x_values: Array1<f64>,
    pub curves: Vec<Curve>,
}

/// Success rate over time: an instance counts as solved from the bucket of
/// its aggregated time onwards, if a solution was found at all.
///
/// x-values are the upper edges of the time buckets.
pub fn time_profile(
    dataset: &AggregatedDataset,
    horizon: Horizon,
    num_buckets: usize,
) -> Result<Profile> {
    let width = horizon.seconds() / num_buckets as f64;
    let x_values =
        Array1::from_shape_fn(num_buckets, |k| (k + 1) as f64 * width);
    build_profile(dataset, ProfileKind::Time, x_values, |_, sample| {
        sample
            .value
            .is_solved()
            .then(|| time_bucket(sample.time, horizon, num_buckets))
    })
}

/// Success rate over the relative gap to the reference objective. Runs
/// without a solution are counted in the last bucket, so every curve ends
/// at 1.
///
/// x-values are gap thresholds in percent.
pub fn gap_profile(
    dataset: &AggregatedDataset,
    num_buckets: usize,
) -> Result<Profile> {
    let x_values = Array1::from_shape_fn(num_buckets + 1, |k| {
        k as f64 * 100.0 / num_buckets as f64
    });
    build_profile(dataset, ProfileKind::Gap, x_values, |objective, sample| {
        Some(match sample.value {
            Outcome::NoSolution => num_buckets,
            Outcome::Solved(_) => {
                gap_bucket(sample_gap(objective, sample), num_buckets)
            }
        })
    })
}

fn build_profile<F>(
    dataset: &AggregatedDataset,
    kind: ProfileKind,
    x_values: Array1<f64>,
    bucket_of: F,
) -> Result<Profile>
where
    F: Fn(f64, &Sample) -> Option<usize>,
{
    let algorithms = dataset.algorithms()?;
    let num_instances = dataset.len() as f64;
    let curves = algorithms
        .into_iter()
        .map(|algorithm| -> Result<Curve> {
            let mut counts = Array1::<f64>::zeros(x_values.len());
            for (name, record) in dataset.instances() {
                let sample =
                    record.results.get(&algorithm).with_context(|| {
                        format!("instance {name} has no result for {algorithm}")
                    })?;
                if let Some(bucket) = bucket_of(record.objective, sample) {
                    counts[bucket] += 1.0;
                }
            }
            counts.accumulate_axis_inplace(Axis(0), |&prev, curr| {
                *curr += prev
            });
            Ok(Curve {
                algorithm,
                fractions: counts / num_instances,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Profile {
        kind,
        x_values,
        curves,
    })
}

/// Area under `curve` over `x_values` by the trapezoidal rule.
pub fn integral(curve: &Array1<f64>, x_values: &Array1<f64>) -> f64 {
    debug_assert_eq!(curve.len(), x_values.len());
    x_values
        .iter()
        .tuple_windows()
        .zip(curve.iter().tuple_windows())
        .map(|((x0, x1), (y0, y1))| (x1 - x0) * (y0 + y1) / 2.0)
        .sum()
}

impl Profile {
    /// Integral of every curve, in curve order. Higher is better.
    pub fn integrals(&self) -> Vec<(&str, f64)> {
        self.curves
            .iter()
            .map(|curve| {
                (
                    curve.algorithm.as_str(),
                    integral(&curve.fractions, &self.x_values),
                )
            })
            .collect()
    }

    pub fn curve(&self, algorithm: &str) -> Option<&Curve> {
        self.curves.iter().find(|curve| curve.algorithm == algorithm)
    }

    /// Writes one `<algorithm>: <integral>` line per curve.
    pub fn write_integrals(&self, path: &Path, dry_run: bool) -> Result<()> {
        if dry_run {
            info!("Dry run: skipped writing integrals to {path:?}");
            return Ok(());
        }
        let file = fs::File::create(path)
            .with_context(|| format!("failed to create {path:?}"))?;
        let mut writer = BufWriter::new(file);
        write!(writer, "{self}")?;
        writer.flush()?;
        info!("Integral values saved to {path:?}");
        Ok(())
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--------------------INTEGRAL VALUES--------------------")?;
        for (algorithm, value) in self.integrals() {
            writeln!(f, "{algorithm}: {value}")?;
        }
        writeln!(f, "-------------------------------------------------------")
    }
}
