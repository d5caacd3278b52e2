use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use itertools::Itertools;
use log::info;
use polars::prelude::*;

use crate::dataset::GapDataset;
use crate::profiles::{Profile, ProfileKind};

/// Reads the benchmark instance list.
///
/// The csv needs an `Instance` column with the instance names and an
/// `Objective` column with the reference objective of each instance. Lines
/// starting with `#` are ignored.
pub fn read_instances(path: &Path) -> Result<Vec<(String, f64)>> {
    let df = CsvReader::from_path(path)
        .with_context(|| format!("failed to open instance list {path:?}"))?
        .with_comment_char(Some(b'#'))
        .has_header(true)
        .finish()?
        .lazy()
        .select([
            col("Instance").cast(DataType::Utf8),
            col("Objective").cast(DataType::Float64),
        ])
        .collect()?;
    let names = df.column("Instance")?.utf8()?;
    let objectives = df.column("Objective")?.f64()?;
    names
        .into_iter()
        .zip(objectives.into_iter())
        .enumerate()
        .map(|(row, entry)| match entry {
            (Some(name), Some(objective)) => Ok((name.to_string(), objective)),
            (name, _) => bail!(
                "row {row} of {path:?}: instance {name:?} has no numeric objective"
            ),
        })
        .collect()
}

/// One row per instance and one column per algorithm holding its relative
/// gap. The objective is not part of the table.
///
/// The reference comes first, followed by numeric tags in numeric order and
/// then all other tags.
pub fn gap_table(dataset: &GapDataset, reference: &str) -> Result<DataFrame> {
    let mut algorithms = dataset.algorithms()?;
    algorithms.sort_by_cached_key(|algorithm| {
        (
            algorithm != reference,
            algorithm.parse::<u64>().map_err(|_| algorithm.clone()),
        )
    });
    let instances = dataset
        .instances()
        .map(|(name, _)| name.as_str())
        .collect_vec();
    let mut columns = vec![Series::new("instance", instances)];
    for algorithm in &algorithms {
        let gaps = dataset
            .instances()
            .map(|(_, record)| record.results.get(algorithm).map(|s| s.gap))
            .collect::<Vec<Option<f64>>>();
        columns.push(Series::new(algorithm.as_str(), gaps));
    }
    Ok(DataFrame::new(columns)?)
}

/// The x-values of a profile followed by one column per curve.
pub fn profile_table(profile: &Profile) -> Result<DataFrame> {
    let x_label = match profile.kind {
        ProfileKind::Time => "time",
        ProfileKind::Gap => "gap_percent",
    };
    let mut columns = vec![Series::new(x_label, profile.x_values.to_vec())];
    columns.extend(profile.curves.iter().map(|curve| {
        Series::new(curve.algorithm.as_str(), curve.fractions.to_vec())
    }));
    Ok(DataFrame::new(columns)?)
}

pub fn df_to_csv(
    mut df: DataFrame,
    path: &Path,
    delimiter: u8,
    dry_run: bool,
) -> Result<()> {
    if dry_run {
        info!(
            "Dry run: skipped writing {}x{} table to {path:?}",
            df.height(),
            df.width()
        );
        return Ok(());
    }
    let mut file = fs::File::create(path)
        .with_context(|| format!("failed to create {path:?}"))?;
    CsvWriter::new(&mut file)
        .has_header(true)
        .with_delimiter(delimiter)
        .finish(&mut df)?;
    info!("Wrote {} rows to {path:?}", df.height());
    Ok(())
}
