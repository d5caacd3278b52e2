use core::fmt;

use anyhow::{ensure, Result};
use itertools::Itertools;
use log::warn;

use crate::dataset::AggregatedDataset;
use crate::datastructures::*;

/// A candidate value below the reference objective of its instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub instance: String,
    pub algorithm: Algorithm,
    pub objective: f64,
    pub value: f64,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -- objective: {} | {}: {}",
            self.instance, self.objective, self.algorithm, self.value
        )
    }
}

/// Lists every non-reference result whose value beats the reference
/// objective. For a minimization problem this can only come from a data or
/// solver bug. Runs without a solution are never reported.
pub fn check(dataset: &AggregatedDataset, reference: &str) -> Vec<Violation> {
    let violations: Vec<Violation> = dataset
        .instances()
        .flat_map(|(instance, record)| {
            record
                .results
                .iter()
                .filter(move |(algorithm, _)| *algorithm != reference)
                .filter_map(move |(algorithm, sample)| match sample.value {
                    Outcome::Solved(value) if value < record.objective => {
                        Some(Violation {
                            instance: instance.clone(),
                            algorithm: algorithm.clone(),
                            objective: record.objective,
                            value,
                        })
                    }
                    _ => None,
                })
        })
        .collect();
    if !violations.is_empty() {
        warn!(
            "{} of {} instances have infeasible results",
            violations.iter().map(|v| &v.instance).dedup().count(),
            dataset.len()
        );
    }
    violations
}

/// Fails if any result beats the reference objective. The error lists every
/// violation, one per line.
pub fn ensure_feasible(dataset: &AggregatedDataset, reference: &str) -> Result<()> {
    let violations = check(dataset, reference);
    ensure!(
        violations.is_empty(),
        "found {} infeasible results\n{}",
        violations.len(),
        violations.iter().join("\n")
    );
    Ok(())
}
