use std::collections::BTreeMap;

use super::*;

fn instances() -> Vec<(String, f64)> {
    vec![("air04".to_string(), 56137.0), ("p0201".into(), 7615.0)]
}

#[test]
fn test_parse_raw_dataset() {
    let json = r#"{
        "air04": {
            "_obj": 56137,
            "CPLEX": [56137, 12.5],
            "0": { "1": [56140.5, 10.0], "2": ["NO SOL", 300], "3": [null, null] }
        }
    }"#;
    let dataset: RawDataset = serde_json::from_str(json).unwrap();
    let record = dataset.get("air04").unwrap();
    assert_eq!(record.objective, 56137.0);
    assert_eq!(
        record.results["CPLEX"],
        RawResult::Single(SeedRun::new(Outcome::Solved(56137.0), 12.5))
    );
    let RawResult::Seeds(runs) = &record.results["0"] else {
        panic!("expected seeded runs");
    };
    assert_eq!(runs["1"], SeedRun::new(Outcome::Solved(56140.5), 10.0));
    assert_eq!(runs["2"], SeedRun::new(Outcome::NoSolution, 300.0));
    assert!(runs["3"].is_pending());
    assert_eq!(dataset.pending_runs(), 1);
}

#[test]
fn test_missing_objective_is_rejected() {
    let json = r#"{ "air04": { "CPLEX": [56137, 12.5] } }"#;
    assert!(serde_json::from_str::<RawDataset>(json).is_err());
}

#[test]
fn test_unknown_sentinel_is_rejected() {
    let json = r#"{ "air04": { "_obj": 1.0, "CPLEX": ["FAILED", 12.5] } }"#;
    assert!(serde_json::from_str::<AggregatedDataset>(json).is_err());
}

#[test]
fn test_aggregated_dataset_roundtrip_shape() {
    let mut record = InstanceRecord::new(-50.0);
    record
        .results
        .insert("CPLEX".to_string(), Sample::solved(-50.0, 4.0));
    record
        .results
        .insert("0".to_string(), Sample::no_solution(300.0));
    let dataset: AggregatedDataset =
        [("neos".to_string(), record)].into_iter().collect();
    let value = serde_json::to_value(&dataset).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "neos": { "_obj": -50.0, "CPLEX": [-50.0, 4.0], "0": ["NO SOL", 300.0] }
        })
    );
}

#[test]
fn test_skeleton() {
    let dataset = RawDataset::skeleton(
        &instances(),
        "CPLEX",
        &["0".to_string(), "1".into()],
        &[38472910, 56473829],
    )
    .unwrap();
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.algorithms().unwrap(), vec!["0", "1", "CPLEX"]);
    assert_eq!(dataset.pending_runs(), 2 * (1 + 2 * 2));
    let RawResult::Seeds(runs) = &dataset.get("p0201").unwrap().results["1"]
    else {
        panic!("expected seeded runs");
    };
    assert_eq!(runs.keys().collect::<Vec<_>>(), vec!["38472910", "56473829"]);
}

#[test]
fn test_skeleton_rejects_duplicates_and_missing_seeds() {
    let duplicated = vec![("air04".to_string(), 1.0), ("air04".into(), 2.0)];
    assert!(RawDataset::skeleton(&duplicated, "CPLEX", &[], &[]).is_err());
    assert!(
        RawDataset::skeleton(&instances(), "CPLEX", &["0".into()], &[])
            .is_err()
    );
    assert!(
        RawDataset::skeleton(&instances(), "CPLEX", &["CPLEX".into()], &[1])
            .is_err()
    );
}

#[test]
fn test_merge_partial() {
    let mut dataset = RawDataset::skeleton(
        &instances(),
        "CPLEX",
        &["0".to_string()],
        &[1, 2],
    )
    .unwrap();
    let partial: PartialResults = serde_json::from_str(
        r#"{
            "air04": { "CPLEX": [56137, 80.0], "0": { "2": ["NO SOL", 300] } },
            "p0201": { "0": { "1": [7615, 2.5], "2": [7700, 3.5] } }
        }"#,
    )
    .unwrap();
    assert_eq!(dataset.merge_partial(partial).unwrap(), 4);
    assert_eq!(dataset.pending_runs(), 2);
    assert_eq!(
        dataset.get("air04").unwrap().results["CPLEX"],
        RawResult::Single(SeedRun::new(Outcome::Solved(56137.0), 80.0))
    );
}

#[test]
fn test_merge_partial_rejects_unknown_entries() {
    let mut dataset =
        RawDataset::skeleton(&instances(), "CPLEX", &["0".to_string()], &[1])
            .unwrap();
    let unknown_seed: PartialResults = serde_json::from_str(
        r#"{ "air04": { "0": { "7": [1.0, 1.0] } } }"#,
    )
    .unwrap();
    assert!(dataset.merge_partial(unknown_seed).is_err());
    let unknown_instance: PartialResults =
        serde_json::from_str(r#"{ "neos": { "CPLEX": [1.0, 1.0] } }"#)
            .unwrap();
    assert!(dataset.merge_partial(unknown_instance).is_err());
    let wrong_shape: PartialResults =
        serde_json::from_str(r#"{ "air04": { "0": [1.0, 1.0] } }"#).unwrap();
    assert!(dataset.merge_partial(wrong_shape).is_err());
}

#[test]
fn test_inconsistent_algorithms() {
    let mut first = InstanceRecord::new(1.0);
    first.results.insert("0".to_string(), Sample::solved(1.0, 1.0));
    let mut second = InstanceRecord::new(1.0);
    second.results.insert("1".to_string(), Sample::solved(1.0, 1.0));
    let dataset: AggregatedDataset =
        [("a".to_string(), first), ("b".to_string(), second)]
            .into_iter()
            .collect();
    assert!(dataset.algorithms().is_err());
    assert!(AggregatedDataset::new().algorithms().is_err());
}

#[test]
fn test_combine_and_drop() {
    let record = |algo: &str| {
        let mut record = InstanceRecord::new(10.0);
        record.results.insert("CPLEX".to_string(), Sample::solved(10.0, 1.0));
        record.results.insert(algo.to_string(), Sample::solved(11.0, 2.0));
        record
    };
    let standard: AggregatedDataset =
        [("a".to_string(), record("ACS_Rho_0.5"))].into_iter().collect();
    let dynamic: AggregatedDataset =
        [("a".to_string(), record("ACS_Dyn_0.5"))].into_iter().collect();
    let mut combined = standard.combine(dynamic).unwrap();
    assert_eq!(
        combined.algorithms().unwrap(),
        vec!["ACS_Dyn_0.5", "ACS_Rho_0.5", "CPLEX"]
    );
    assert_eq!(combined.drop_algorithms(&["ACS_Rho_0.5".to_string()]), 1);
    assert_eq!(
        combined.algorithms().unwrap(),
        vec!["ACS_Dyn_0.5", "CPLEX"]
    );

    let mut other = BTreeMap::new();
    other.insert("b".to_string(), record("x"));
    let mismatched: AggregatedDataset = other.into_iter().collect();
    assert!(combined.combine(mismatched).is_err());
}

#[test]
#[cfg(target_os = "linux")]
fn test_write_reports_full_device() {
    let mut dataset = AggregatedDataset::new();
    let mut record = InstanceRecord::new(100.0);
    record
        .results
        .insert("CPLEX".to_string(), Sample::solved(100.0, 1.0));
    dataset.insert("graph1".to_string(), record);
    assert!(dataset.write(Path::new("/dev/full"), false).is_err());
    assert!(dataset.write(Path::new("/dev/full"), true).is_ok());
}
