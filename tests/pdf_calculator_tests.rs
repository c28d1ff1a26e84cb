/*
MIT License with diffpy.srreal Attribution

Copyright (c) 2026 srreal-rs contributors

Based on or developed using diffpy.srreal
Copyright (c) 2009 Trustees of the Columbia University
in the City of New York. All rights reserved.
*/

use anyhow::Result;
use approx::assert_relative_eq;
use rstest::rstest;
use srreal_rs::pdf::{PdfCalculator, PdfCalculatorConfig, PdfEnvelope, QResolutionEnvelope};
use srreal_rs::registry;
use srreal_rs::structure::{AtomSite, AtomicStructure, Lattice, Vector3D};
use srreal_rs::Error;

fn nickel_fcc() -> AtomicStructure {
    let a = 3.52;
    let mut crystal = AtomicStructure::with_lattice(Lattice::cubic(a).unwrap());
    let fractional = [
        [0.0, 0.0, 0.0],
        [0.5, 0.5, 0.0],
        [0.5, 0.0, 0.5],
        [0.0, 0.5, 0.5],
    ];
    for frac in fractional {
        crystal
            .add_site_fractional(AtomSite::new("Ni", Vector3D::zero()).with_uiso(0.005), frac)
            .unwrap();
    }
    crystal
}

#[test]
fn test_fcc_first_peak_position() {
    let crystal = nickel_fcc();
    let mut calc = PdfCalculator::new();
    calc.set_range(0.0, 5.0, 0.01).unwrap();
    let pdf = calc.eval(&crystal).unwrap();
    let rgrid = calc.rgrid().unwrap();

    // nearest neighbors sit at a/sqrt(2) = 2.489
    let (imax, _) = pdf
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .unwrap();
    assert_relative_eq!(rgrid[imax], 3.52 / 2.0_f64.sqrt(), epsilon = 0.02);
}

#[rstest]
#[case(2)]
#[case(4)]
#[case(7)]
fn test_parallel_matches_serial(#[case] workers: usize) -> Result<()> {
    let crystal = nickel_fcc();

    let mut serial = PdfCalculator::new();
    serial.set_range(0.0, 12.0, 0.02)?;
    let reference = serial.eval(&crystal)?;

    let mut parallel = PdfCalculator::new();
    let mut config = parallel.config().clone();
    config.rmin = 0.0;
    config.rmax = 12.0;
    config.rstep = 0.02;
    config.workers = workers;
    parallel.set_config(config)?;
    let result = parallel.eval(&crystal)?;

    assert_eq!(result.len(), reference.len());
    for (a, b) in result.iter().zip(reference.iter()) {
        assert_relative_eq!(a, b, max_relative = 1e-10, epsilon = 1e-12);
    }
    Ok(())
}

#[test]
fn test_qresolution_envelope_damps_tail() {
    let crystal = nickel_fcc();
    let mut plain = PdfCalculator::new();
    plain.set_range(0.0, 15.0, 0.02).unwrap();
    let undamped = plain.eval(&crystal).unwrap();

    let mut damped_calc = PdfCalculator::new();
    damped_calc.set_range(0.0, 15.0, 0.02).unwrap();
    damped_calc.add_envelope(Box::new(QResolutionEnvelope::new(0.15).unwrap()));
    let damped = damped_calc.eval(&crystal).unwrap();

    let rgrid = plain.rgrid().unwrap();
    let tail_energy = |curve: &ndarray::Array1<f64>| -> f64 {
        curve
            .iter()
            .zip(rgrid.iter())
            .filter(|(_, &r)| r > 10.0)
            .map(|(v, _)| v * v)
            .sum()
    };
    assert!(tail_energy(&damped) < 0.2 * tail_energy(&undamped));
}

#[test]
fn test_config_json_round_trip() {
    let mut config = PdfCalculatorConfig::default();
    config.rmax = 25.0;
    config.rstep = 0.005;
    config.scale = 1.5;
    config.workers = 4;

    let text = serde_json::to_string(&config).unwrap();
    let restored: PdfCalculatorConfig = serde_json::from_str(&text).unwrap();
    assert_relative_eq!(restored.rmax, 25.0, epsilon = 1e-15);
    assert_relative_eq!(restored.rstep, 0.005, epsilon = 1e-15);
    assert_relative_eq!(restored.scale, 1.5, epsilon = 1e-15);
    assert_eq!(restored.workers, 4);
}

#[test]
fn test_strategy_selection_by_name() {
    let mut calc = PdfCalculator::new();
    calc.set_peak_width_model_by_type("jeong").unwrap();
    calc.set_peak_profile_by_type("croppedgaussian").unwrap();
    calc.set_scattering_factor_table_by_type("neutron").unwrap();
    calc.set_baseline_by_type("zero").unwrap();
    calc.add_envelope_by_type("sphericalshape").unwrap();

    assert_eq!(calc.peak_width_model().type_name(), "jeong");
    assert_eq!(calc.peak_profile().type_name(), "croppedgaussian");
    assert_eq!(calc.scattering_factor_table().radiation(), "N");
    assert_eq!(calc.baseline().type_name(), "zero");
    assert_eq!(calc.envelopes().len(), 1);

    assert!(matches!(
        calc.set_peak_width_model_by_type("does-not-exist"),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn test_registered_custom_envelope_is_selectable() {
    #[derive(Clone)]
    struct Halving;
    impl PdfEnvelope for Halving {
        fn type_name(&self) -> &str {
            "halving"
        }
        fn value(&self, _r: f64) -> f64 {
            0.5
        }
        fn clone_boxed(&self) -> Box<dyn PdfEnvelope> {
            Box::new(self.clone())
        }
    }

    registry::register_pdf_envelope("halving", || Box::new(Halving));

    let crystal = nickel_fcc();
    let mut plain = PdfCalculator::new();
    plain.set_range(0.0, 6.0, 0.02).unwrap();
    let reference = plain.eval(&crystal).unwrap();

    let mut halved_calc = PdfCalculator::new();
    halved_calc.set_range(0.0, 6.0, 0.02).unwrap();
    halved_calc.add_envelope_by_type("halving").unwrap();
    let halved = halved_calc.eval(&crystal).unwrap();

    for (h, f) in halved.iter().zip(reference.iter()) {
        assert_relative_eq!(*h, 0.5 * f, max_relative = 1e-12, epsilon = 1e-12);
    }
}

#[test]
fn test_abort_interrupts_evaluation() {
    let crystal = nickel_fcc();
    let mut calc = PdfCalculator::new();
    calc.set_range(0.0, 20.0, 0.01).unwrap();
    calc.abort_signal()
        .store(true, std::sync::atomic::Ordering::SeqCst);

    assert!(matches!(calc.eval(&crystal), Err(Error::Interrupted)));
    // the accumulator must be left clean after the interruption
    assert!(calc.rdf().unwrap().iter().all(|&v| v == 0.0));
}

#[test]
fn test_unknown_species_fails_before_accumulation() {
    let mut molecule = AtomicStructure::new();
    molecule.add_site(AtomSite::new("Zz", Vector3D::zero()));
    molecule.add_site(AtomSite::new("Ni", Vector3D::new(2.0, 0.0, 0.0)));

    let mut calc = PdfCalculator::new();
    assert!(matches!(calc.eval(&molecule), Err(Error::Structure(_))));
}
