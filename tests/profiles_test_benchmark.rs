use itertools::Itertools;
use mip_profiles::{datastructures::Horizon, profiles};
mod common;
use common::*;

#[test]
fn test_time_profile_fixture() {
    let profile =
        profiles::time_profile(&aggregated_fixture(), Horizon::default(), 100)
            .unwrap();
    assert_eq!(profile.x_values.len(), 100);
    assert_eq!(profile.x_values[0], 3.0);
    assert_eq!(profile.x_values[99], 300.0);

    let cplex = &profile.curve("CPLEX").unwrap().fractions;
    assert_eq!(cplex[3], 0.0);
    assert_eq!(cplex[4], 1.0 / 3.0);
    assert_eq!(cplex[32], 1.0 / 3.0);
    assert_eq!(cplex[33], 2.0 / 3.0);
    assert_eq!(cplex[99], 2.0 / 3.0);

    let first = &profile.curve("0").unwrap().fractions;
    assert_eq!(first[0], 1.0 / 3.0);
    assert_eq!(first[5], 2.0 / 3.0);
    assert_eq!(first[20], 1.0);
    assert_eq!(first[99], 1.0);

    let second = &profile.curve("1").unwrap().fractions;
    assert_eq!(second[9], 0.0);
    assert_eq!(second[10], 1.0 / 3.0);
    assert_eq!(second[50], 2.0 / 3.0);
    assert_eq!(second[99], 2.0 / 3.0);

    for curve in &profile.curves {
        assert!(curve.fractions.iter().tuple_windows().all(|(a, b)| a <= b));
        assert!(curve.fractions.iter().all(|f| (0.0..=1.0).contains(f)));
    }
    let integrals = profile.integrals();
    let integral = |algorithm: &str| {
        integrals.iter().find(|(a, _)| *a == algorithm).unwrap().1
    };
    assert!(integral("0") > integral("1"));
    assert!(integral("0") > integral("CPLEX"));
}

#[test]
fn test_gap_profile_fixture() {
    let profile = profiles::gap_profile(&aggregated_fixture(), 100).unwrap();
    assert_eq!(profile.x_values.len(), 101);
    assert_eq!(profile.x_values[4], 4.0);

    let cplex = &profile.curve("CPLEX").unwrap().fractions;
    assert_eq!(cplex[0], 2.0 / 3.0);
    assert_eq!(cplex[99], 2.0 / 3.0);

    let first = &profile.curve("0").unwrap().fractions;
    assert_eq!(first[0], 2.0 / 3.0);
    assert_eq!(first[99], 2.0 / 3.0);

    let second = &profile.curve("1").unwrap().fractions;
    assert_eq!(second[2], 0.0);
    assert_eq!(second[3], 1.0 / 3.0);
    assert_eq!(second[19], 1.0 / 3.0);
    assert_eq!(second[25], 2.0 / 3.0);
    assert_eq!(second[99], 2.0 / 3.0);

    for curve in &profile.curves {
        assert_eq!(curve.fractions[100], 1.0);
    }
}
