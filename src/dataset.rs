use std::collections::{btree_map, BTreeMap};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{bail, ensure, Context, Result};
use itertools::Itertools;
use log::{debug, info};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::datastructures::*;

/// Results of one algorithm on one instance before aggregation.
///
/// The reference solver has no seed dimension and is stored as a single
/// run; every other algorithm maps seeds to runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawResult {
    Single(SeedRun),
    Seeds(BTreeMap<String, SeedRun>),
}

/// All results recorded for a single instance together with its reference
/// objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceRecord<T> {
    #[serde(rename = "_obj")]
    pub objective: f64,
    #[serde(flatten)]
    pub results: BTreeMap<Algorithm, T>,
}

impl<T> InstanceRecord<T> {
    pub fn new(objective: f64) -> Self {
        Self {
            objective,
            results: BTreeMap::new(),
        }
    }
}

/// Benchmark dataset keyed by instance name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset<T> {
    instances: BTreeMap<String, InstanceRecord<T>>,
}

pub type RawDataset = Dataset<RawResult>;
pub type AggregatedDataset = Dataset<Sample>;
pub type GapDataset = Dataset<GapSample>;

/// Results reported by finished jobs, without objectives.
pub type PartialResults = BTreeMap<String, BTreeMap<Algorithm, RawResult>>;

impl<T> Default for Dataset<T> {
    fn default() -> Self {
        Self {
            instances: BTreeMap::new(),
        }
    }
}

impl<T> FromIterator<(String, InstanceRecord<T>)> for Dataset<T> {
    fn from_iter<I: IntoIterator<Item = (String, InstanceRecord<T>)>>(
        iter: I,
    ) -> Self {
        Self {
            instances: iter.into_iter().collect(),
        }
    }
}

impl<T> IntoIterator for Dataset<T> {
    type Item = (String, InstanceRecord<T>);
    type IntoIter = btree_map::IntoIter<String, InstanceRecord<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.instances.into_iter()
    }
}

impl<T> Dataset<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn get(&self, instance: &str) -> Option<&InstanceRecord<T>> {
        self.instances.get(instance)
    }

    pub fn insert(
        &mut self,
        instance: String,
        record: InstanceRecord<T>,
    ) -> Option<InstanceRecord<T>> {
        self.instances.insert(instance, record)
    }

    pub fn instances(
        &self,
    ) -> impl Iterator<Item = (&String, &InstanceRecord<T>)> {
        self.instances.iter()
    }

    /// Algorithm tags present in the dataset.
    ///
    /// Fails if the dataset is empty or if the instances disagree on the set
    /// of algorithms.
    pub fn algorithms(&self) -> Result<Vec<Algorithm>> {
        let Some((first_name, first)) = self.instances.iter().next() else {
            bail!("dataset contains no instances");
        };
        let algorithms = first.results.keys().cloned().collect_vec();
        for (name, record) in &self.instances {
            ensure!(
                record.results.keys().eq(algorithms.iter()),
                "instance {name} has algorithms [{}] but {first_name} has [{}]",
                record.results.keys().join(", "),
                algorithms.join(", ")
            );
        }
        Ok(algorithms)
    }

    /// Adds the results of `other` to the instances of `self`.
    ///
    /// Both datasets must cover the same instances with the same objectives.
    /// Algorithms present in both are taken from `other`.
    pub fn combine(mut self, other: Dataset<T>) -> Result<Self> {
        ensure!(
            self.len() == other.len(),
            "cannot combine datasets with {} and {} instances",
            self.len(),
            other.len()
        );
        for (name, record) in other {
            let Some(target) = self.instances.get_mut(&name) else {
                bail!("instance {name} is missing from the base dataset");
            };
            ensure!(
                target.objective == record.objective,
                "objective mismatch for instance {name}: {} vs {}",
                target.objective,
                record.objective
            );
            target.results.extend(record.results);
        }
        Ok(self)
    }

    /// Removes the given algorithm tags from every instance and returns how
    /// many entries were dropped.
    pub fn drop_algorithms(&mut self, algorithms: &[Algorithm]) -> usize {
        self.instances
            .values_mut()
            .map(|record| {
                algorithms
                    .iter()
                    .filter(|algo| record.results.remove(*algo).is_some())
                    .count()
            })
            .sum()
    }
}

impl<T: DeserializeOwned> Dataset<T> {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read dataset {path:?}"))?;
        let dataset: Self = serde_json::from_str(&content)
            .with_context(|| format!("malformed dataset {path:?}"))?;
        debug!("Read {} instances from {path:?}", dataset.len());
        Ok(dataset)
    }
}

impl<T: Serialize> Dataset<T> {
    /// Writes the dataset as pretty printed json. Nothing is written on a
    /// dry run.
    pub fn write(&self, path: &Path, dry_run: bool) -> Result<()> {
        if dry_run {
            info!("Dry run: skipped writing {} instances to {path:?}", self.len());
            return Ok(());
        }
        let file = fs::File::create(path)
            .with_context(|| format!("failed to create {path:?}"))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer
            .flush()
            .with_context(|| format!("failed to write {path:?}"))?;
        info!("Wrote {} instances to {path:?}", self.len());
        Ok(())
    }
}

impl RawDataset {
    /// Creates a dataset with one pending run for the reference solver and
    /// one pending run per seed for every other algorithm.
    pub fn skeleton(
        instances: &[(String, f64)],
        reference: &str,
        algorithms: &[Algorithm],
        seeds: &[u64],
    ) -> Result<Self> {
        ensure!(
            algorithms.is_empty() || !seeds.is_empty(),
            "algorithms [{}] are declared without any seeds",
            algorithms.join(", ")
        );
        ensure!(
            !algorithms.iter().any(|algo| algo == reference),
            "algorithm tag {reference} is reserved for the reference solver"
        );
        let mut dataset = Self::new();
        for (name, objective) in instances {
            let mut record = InstanceRecord::new(*objective);
            record
                .results
                .insert(reference.to_string(), RawResult::Single(SeedRun::pending()));
            for algorithm in algorithms {
                let runs = seeds
                    .iter()
                    .map(|seed| (seed.to_string(), SeedRun::pending()))
                    .collect();
                record
                    .results
                    .insert(algorithm.clone(), RawResult::Seeds(runs));
            }
            if dataset.insert(name.clone(), record).is_some() {
                bail!("instance {name} is listed more than once");
            }
        }
        Ok(dataset)
    }

    /// Stores the runs reported in `partial` and returns how many runs were
    /// updated.
    ///
    /// Every reported instance, algorithm and seed must already exist in the
    /// dataset.
    pub fn merge_partial(&mut self, partial: PartialResults) -> Result<usize> {
        let mut updated = 0;
        for (name, results) in partial {
            let Some(record) = self.instances.get_mut(&name) else {
                bail!("reported instance {name} is not part of the dataset");
            };
            for (algorithm, result) in results {
                let Some(target) = record.results.get_mut(&algorithm) else {
                    bail!("instance {name} has no algorithm {algorithm}");
                };
                match (target, result) {
                    (RawResult::Single(run), RawResult::Single(reported)) => {
                        *run = reported;
                        updated += 1;
                    }
                    (RawResult::Seeds(runs), RawResult::Seeds(reported)) => {
                        for (seed, reported) in reported {
                            let Some(run) = runs.get_mut(&seed) else {
                                bail!("{name}/{algorithm} has no seed {seed}");
                            };
                            *run = reported;
                            updated += 1;
                        }
                    }
                    _ => bail!(
                        "result shape of {name}/{algorithm} does not match the dataset"
                    ),
                }
            }
        }
        Ok(updated)
    }

    /// Number of runs that have not reported yet.
    pub fn pending_runs(&self) -> usize {
        self.instances
            .values()
            .flat_map(|record| record.results.values())
            .map(|result| match result {
                RawResult::Single(run) => usize::from(run.is_pending()),
                RawResult::Seeds(runs) => {
                    runs.values().filter(|run| run.is_pending()).count()
                }
            })
            .sum()
    }
}

pub fn read_partial_results(path: &Path) -> Result<PartialResults> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read partial results {path:?}"))?;
    serde_json::from_str(&content)
        .with_context(|| format!("malformed partial results {path:?}"))
}

#[cfg(test)]
mod tests;
