/*
MIT License with diffpy.srreal Attribution

Copyright (c) 2026 srreal-rs contributors

Based on or developed using diffpy.srreal
Copyright (c) 2009 Trustees of the Columbia University
in the City of New York. All rights reserved.
*/

use approx::assert_relative_eq;
use srreal_rs::bvs::{BondValenceCalculator, BondValenceConfig};
use srreal_rs::structure::{AtomSite, AtomicStructure, Lattice, Vector3D};
use srreal_rs::Error;

fn rock_salt(a: f64) -> AtomicStructure {
    let mut crystal = AtomicStructure::with_lattice(Lattice::cubic(a).unwrap());
    let cation_positions = [
        [0.0, 0.0, 0.0],
        [0.5, 0.5, 0.0],
        [0.5, 0.0, 0.5],
        [0.0, 0.5, 0.5],
    ];
    let anion_positions = [
        [0.5, 0.0, 0.0],
        [0.0, 0.5, 0.0],
        [0.0, 0.0, 0.5],
        [0.5, 0.5, 0.5],
    ];
    for frac in cation_positions {
        crystal
            .add_site_fractional(AtomSite::new("Na+", Vector3D::zero()), frac)
            .unwrap();
    }
    for frac in anion_positions {
        crystal
            .add_site_fractional(AtomSite::new("Cl-", Vector3D::zero()), frac)
            .unwrap();
    }
    crystal
}

#[test]
fn test_rock_salt_sums_match_nominal_charges() {
    let crystal = rock_salt(5.64);
    let mut calc = BondValenceCalculator::new();
    let valences = calc.eval(&crystal).unwrap();

    for i in 0..4 {
        assert!(valences[i] > 0.9 && valences[i] < 1.1);
    }
    for i in 4..8 {
        assert_relative_eq!(valences[i], -valences[i - 4], epsilon = 1e-10);
    }
    assert!(calc.bvrmsdiff() < 0.05);
    assert_relative_eq!(calc.bvmsdiff(), calc.bvrmsdiff().powi(2), epsilon = 1e-15);
}

#[test]
fn test_compressed_lattice_overestimates_valence() {
    let mut relaxed = BondValenceCalculator::new();
    relaxed.eval(&rock_salt(5.64)).unwrap();
    let nominal = relaxed.valences()[0];

    let mut compressed = BondValenceCalculator::new();
    compressed.eval(&rock_salt(5.0)).unwrap();
    assert!(compressed.valences()[0] > nominal);
    assert!(compressed.bvrmsdiff() > relaxed.bvrmsdiff());
}

#[test]
fn test_parallel_matches_serial() {
    let crystal = rock_salt(5.64);

    let mut serial = BondValenceCalculator::new();
    let reference = serial.eval(&crystal).unwrap();

    let mut parallel = BondValenceCalculator::new();
    parallel
        .set_config(BondValenceConfig {
            workers: 4,
            ..BondValenceConfig::default()
        })
        .unwrap();
    let result = parallel.eval(&crystal).unwrap();

    for (a, b) in result.iter().zip(reference.iter()) {
        assert_relative_eq!(a, b, max_relative = 1e-10, epsilon = 1e-12);
    }
}

#[test]
fn test_bvdiff_signs() {
    let crystal = rock_salt(5.64);
    let mut calc = BondValenceCalculator::new();
    calc.eval(&crystal).unwrap();

    // expected minus observed: positive when the sum falls short
    let diff = calc.bvdiff();
    let expected = calc.expected_valences();
    for i in 0..8 {
        assert_relative_eq!(
            diff[i],
            expected[i] - calc.valences()[i],
            epsilon = 1e-15
        );
    }
}

#[test]
fn test_unparseable_species_is_rejected() {
    let mut molecule = AtomicStructure::new();
    molecule.add_site(AtomSite::new("!!", Vector3D::zero()));
    let mut calc = BondValenceCalculator::new();
    assert!(matches!(calc.eval(&molecule), Err(Error::Structure(_))));
}

#[test]
fn test_invalid_range_is_rejected() {
    let mut calc = BondValenceCalculator::new();
    assert!(matches!(
        calc.set_config(BondValenceConfig {
            rmin: 5.0,
            rmax: 2.0,
            workers: 1,
        }),
        Err(Error::Range(_))
    ));
}
