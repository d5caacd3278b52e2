use core::fmt;

use anyhow::{Context, Result};

use crate::aggregation::sample_gap;
use crate::dataset::AggregatedDataset;
use crate::datastructures::*;

/// Shift in seconds applied before taking the geometric mean of times, so
/// that near-zero times do not dominate the mean.
pub const TIME_SHIFT: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct AlgorithmSummary {
    pub algorithm: Algorithm,
    pub instances: usize,
    /// Instances with a solution
    pub solved: usize,
    /// Instances that finished before the horizon
    pub finished: usize,
    pub mean_gap: f64,
    pub sgm_time: f64,
}

impl fmt::Display for AlgorithmSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: solved={}/{} finished={}/{} mean_gap={:.4} sgm_time={:.2}",
            self.algorithm,
            self.solved,
            self.instances,
            self.finished,
            self.instances,
            self.mean_gap,
            self.sgm_time
        )
    }
}

pub fn shifted_geometric_mean(values: &[f64], shift: f64) -> f64 {
    let log_sum = values.iter().map(|v| (v + shift).ln()).sum::<f64>();
    (log_sum / values.len() as f64).exp() - shift
}

/// Per-algorithm statistics over all instances of an aggregated dataset.
pub fn summarize(
    dataset: &AggregatedDataset,
    horizon: Horizon,
) -> Result<Vec<AlgorithmSummary>> {
    let algorithms = dataset.algorithms()?;
    let instances = dataset.len();
    algorithms
        .into_iter()
        .map(|algorithm| -> Result<AlgorithmSummary> {
            let samples = dataset
                .instances()
                .map(|(name, record)| {
                    record
                        .results
                        .get(&algorithm)
                        .map(|sample| (record.objective, *sample))
                        .with_context(|| {
                            format!("instance {name} has no result for {algorithm}")
                        })
                })
                .collect::<Result<Vec<_>>>()?;
            let solved =
                samples.iter().filter(|(_, s)| s.value.is_solved()).count();
            let finished = samples
                .iter()
                .filter(|(_, s)| !horizon.is_reached(s.time))
                .count();
            let mean_gap = samples
                .iter()
                .map(|(objective, s)| sample_gap(*objective, s))
                .sum::<f64>()
                / instances as f64;
            let times = samples.iter().map(|(_, s)| s.time).collect::<Vec<_>>();
            Ok(AlgorithmSummary {
                algorithm,
                instances,
                solved,
                finished,
                mean_gap,
                sgm_time: shifted_geometric_mean(&times, TIME_SHIFT),
            })
        })
        .collect()
}
