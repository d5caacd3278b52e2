use core::fmt;
use std::str::FromStr;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

pub type Algorithm = String;

/// Sentinel written for runs that did not find any feasible solution.
pub const NO_SOLUTION: &str = "NO SOL";
const NO_SOLUTION_LONG: &str = "NO SOLUTION";

/// Incumbent reported by a solver run.
///
/// In the dataset files a solved run is a plain number and a failed run is
/// the string `"NO SOL"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "OutcomeRepr", into = "OutcomeRepr")]
pub enum Outcome {
    Solved(f64),
    NoSolution,
}

impl Outcome {
    pub fn value(&self) -> Option<f64> {
        match self {
            Outcome::Solved(value) => Some(*value),
            Outcome::NoSolution => None,
        }
    }

    pub fn is_solved(&self) -> bool {
        matches!(self, Outcome::Solved(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Solved(value) => write!(f, "{value}"),
            Outcome::NoSolution => write!(f, "{NO_SOLUTION}"),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum OutcomeRepr {
    Value(f64),
    Sentinel(String),
}

impl TryFrom<OutcomeRepr> for Outcome {
    type Error = String;

    fn try_from(repr: OutcomeRepr) -> Result<Self, Self::Error> {
        match repr {
            OutcomeRepr::Value(value) => Ok(Outcome::Solved(value)),
            OutcomeRepr::Sentinel(s)
                if s == NO_SOLUTION || s == NO_SOLUTION_LONG =>
            {
                Ok(Outcome::NoSolution)
            }
            OutcomeRepr::Sentinel(s) => {
                Err(format!("expected a number or \"{NO_SOLUTION}\", got {s:?}"))
            }
        }
    }
}

impl From<Outcome> for OutcomeRepr {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Solved(value) => OutcomeRepr::Value(value),
            Outcome::NoSolution => OutcomeRepr::Sentinel(NO_SOLUTION.into()),
        }
    }
}

/// One seeded run as stored in a raw dataset: `[value, time]`.
///
/// Both fields are `null` until the run has reported back.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(
    from = "(Option<Outcome>, Option<f64>)",
    into = "(Option<Outcome>, Option<f64>)"
)]
pub struct SeedRun {
    pub incumbent: Option<Outcome>,
    pub elapsed: Option<f64>,
}

impl SeedRun {
    pub fn new(incumbent: Outcome, elapsed: f64) -> Self {
        Self {
            incumbent: Some(incumbent),
            elapsed: Some(elapsed),
        }
    }

    pub fn pending() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.incumbent.is_none() || self.elapsed.is_none()
    }

    /// The finished run as a sample, or `None` while it is still pending.
    pub fn sample(&self) -> Option<Sample> {
        Some(Sample::new(self.incumbent?, self.elapsed?))
    }
}

impl From<(Option<Outcome>, Option<f64>)> for SeedRun {
    fn from((incumbent, elapsed): (Option<Outcome>, Option<f64>)) -> Self {
        Self { incumbent, elapsed }
    }
}

impl From<SeedRun> for (Option<Outcome>, Option<f64>) {
    fn from(run: SeedRun) -> Self {
        (run.incumbent, run.elapsed)
    }
}

/// A finished `(value, time)` pair, either a single run or the aggregate of
/// several seeds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(Outcome, f64)", into = "(Outcome, f64)")]
pub struct Sample {
    pub value: Outcome,
    pub time: f64,
}

impl Sample {
    pub fn new(value: Outcome, time: f64) -> Self {
        Self { value, time }
    }

    pub fn solved(value: f64, time: f64) -> Self {
        Self::new(Outcome::Solved(value), time)
    }

    pub fn no_solution(time: f64) -> Self {
        Self::new(Outcome::NoSolution, time)
    }
}

impl From<(Outcome, f64)> for Sample {
    fn from((value, time): (Outcome, f64)) -> Self {
        Self { value, time }
    }
}

impl From<Sample> for (Outcome, f64) {
    fn from(sample: Sample) -> Self {
        (sample.value, sample.time)
    }
}

/// An aggregated sample whose value was replaced by its relative gap to the
/// instance objective: `[gap, time]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct GapSample {
    pub gap: f64,
    pub time: f64,
}

impl From<(f64, f64)> for GapSample {
    fn from((gap, time): (f64, f64)) -> Self {
        Self { gap, time }
    }
}

impl From<GapSample> for (f64, f64) {
    fn from(sample: GapSample) -> Self {
        (sample.gap, sample.time)
    }
}

/// Time budget in seconds every solver run is capped at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Horizon(f64);

impl Horizon {
    pub fn new(seconds: f64) -> Result<Self> {
        ensure!(
            seconds.is_finite() && seconds > 0.0,
            "time horizon must be a positive number of seconds, got {seconds}"
        );
        Ok(Self(seconds))
    }

    pub fn seconds(&self) -> f64 {
        self.0
    }

    pub fn clamp(&self, time: f64) -> f64 {
        time.clamp(0.0, self.0)
    }

    pub fn is_reached(&self, time: f64) -> bool {
        time >= self.0
    }
}

impl Default for Horizon {
    fn default() -> Self {
        Self(300.0)
    }
}

impl TryFrom<f64> for Horizon {
    type Error = anyhow::Error;

    fn try_from(seconds: f64) -> Result<Self> {
        Self::new(seconds)
    }
}

impl From<Horizon> for f64 {
    fn from(horizon: Horizon) -> Self {
        horizon.0
    }
}

impl FromStr for Horizon {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let seconds = s
            .parse::<f64>()
            .with_context(|| format!("invalid time horizon {s:?}"))?;
        Self::new(seconds)
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}
