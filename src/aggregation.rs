use anyhow::{bail, ensure, Context, Result};
use itertools::{Either, Itertools};
use log::debug;

use crate::datastructures::*;
use crate::dataset::*;

/// Relative gap between the reference objective and a candidate incumbent.
///
/// A missing candidate yields `None`. Runs without a solution and
/// candidates whose sign differs from the reference get the worst gap of
/// `1`, exact matches get `0`. Everything else is
/// `|reference - candidate| / max(|reference|, |candidate|)`.
pub fn relative_gap(reference: f64, candidate: Option<Outcome>) -> Option<f64> {
    let value = match candidate? {
        Outcome::NoSolution => return Some(1.0),
        Outcome::Solved(value) => value,
    };
    if reference * value < 0.0 {
        Some(1.0)
    } else if reference == value {
        Some(0.0)
    } else {
        Some((reference - value).abs() / reference.abs().max(value.abs()))
    }
}

/// Gap of a finished sample, which is always defined.
pub fn sample_gap(reference: f64, sample: &Sample) -> f64 {
    relative_gap(reference, Some(sample.value)).unwrap_or(1.0)
}

fn is_minority(count: usize, total: usize) -> bool {
    2 * count < total
}

/// Collapses the per-seed samples of one instance/algorithm pair into a
/// single representative sample.
///
/// The value is the mean over the solved seeds unless at least half of the
/// seeds found no solution. The time is the mean over the seeds that
/// finished before the horizon unless at least half of them timed out, in
/// which case it is the horizon itself. Both decisions are independent.
pub fn aggregate_seeds(samples: &[Sample], horizon: Horizon) -> Result<Sample> {
    ensure!(!samples.is_empty(), "cannot aggregate an empty set of seeds");
    let total = samples.len();

    let (solved, failed): (Vec<f64>, Vec<()>) =
        samples.iter().partition_map(|sample| match sample.value {
            Outcome::Solved(value) => Either::Left(value),
            Outcome::NoSolution => Either::Right(()),
        });
    let value = if is_minority(failed.len(), total) {
        Outcome::Solved(mean(&solved))
    } else {
        Outcome::NoSolution
    };

    let (finished, timed_out): (Vec<f64>, Vec<f64>) = samples
        .iter()
        .map(|sample| horizon.clamp(sample.time))
        .partition(|&time| !horizon.is_reached(time));
    let time = if is_minority(timed_out.len(), total) {
        mean(&finished)
    } else {
        horizon.seconds()
    };

    Ok(Sample::new(value, time))
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

impl RawDataset {
    /// Replaces the seeded runs of every algorithm by their aggregate.
    ///
    /// The reference solver's single run is kept as is, apart from clamping
    /// its time to the horizon. Pending runs and single runs for seeded
    /// algorithms are rejected, the latter usually means the dataset was
    /// aggregated before.
    pub fn aggregate(
        self,
        reference: &str,
        horizon: Horizon,
    ) -> Result<AggregatedDataset> {
        self.into_iter()
            .map(|(name, record)| -> Result<(String, InstanceRecord<Sample>)> {
                let results = record
                    .results
                    .into_iter()
                    .map(|(algorithm, result)| -> Result<(Algorithm, Sample)> {
                        let sample = aggregate_result(
                            algorithm == reference,
                            result,
                            horizon,
                        )
                        .with_context(|| {
                            format!("failed to aggregate {name}/{algorithm}")
                        })?;
                        debug!(
                            "{name}/{algorithm}: {} in {}s",
                            sample.value, sample.time
                        );
                        Ok((algorithm, sample))
                    })
                    .collect::<Result<_>>()?;
                Ok((
                    name,
                    InstanceRecord {
                        objective: record.objective,
                        results,
                    },
                ))
            })
            .collect()
    }
}

fn aggregate_result(
    is_reference: bool,
    result: RawResult,
    horizon: Horizon,
) -> Result<Sample> {
    match (is_reference, result) {
        (true, RawResult::Single(run)) => {
            let Some(sample) = run.sample() else {
                bail!("reference run has not reported yet");
            };
            Ok(Sample::new(sample.value, horizon.clamp(sample.time)))
        }
        (true, RawResult::Seeds(_)) => {
            bail!("reference results must not have a seed dimension")
        }
        (false, RawResult::Single(_)) => {
            bail!("expected seeded runs, found a single result (already aggregated?)")
        }
        (false, RawResult::Seeds(runs)) => {
            let samples = runs
                .iter()
                .map(|(seed, run)| {
                    run.sample()
                        .with_context(|| format!("seed {seed} has not reported yet"))
                })
                .collect::<Result<Vec<_>>>()?;
            aggregate_seeds(&samples, horizon)
        }
    }
}

impl AggregatedDataset {
    /// Replaces every value by its relative gap to the instance objective.
    pub fn into_gaps(self) -> GapDataset {
        self.into_iter()
            .map(|(name, record)| {
                let objective = record.objective;
                let results = record
                    .results
                    .into_iter()
                    .map(|(algorithm, sample)| {
                        let gap = GapSample {
                            gap: sample_gap(objective, &sample),
                            time: sample.time,
                        };
                        (algorithm, gap)
                    })
                    .collect();
                (name, InstanceRecord { objective, results })
            })
            .collect()
    }
}
