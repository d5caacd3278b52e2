#![allow(dead_code)]

use std::path::PathBuf;

use mip_profiles::dataset::{AggregatedDataset, RawDataset};
use mip_profiles::datastructures::Horizon;

pub const REFERENCE: &str = "CPLEX";

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from("data/test").join(name)
}

pub fn aggregated_fixture() -> AggregatedDataset {
    RawDataset::from_path(&fixture("raw.json"))
        .unwrap()
        .aggregate(REFERENCE, Horizon::default())
        .unwrap()
}
