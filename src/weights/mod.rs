/*
MIT License with diffpy.srreal Attribution

Copyright (c) 2026 srreal-rs contributors

Based on or developed using diffpy.srreal
Copyright (c) 2009 Trustees of the Columbia University
in the City of New York. All rights reserved.
*/

//! Pair-weighting through scattering-factor tables
//!
//! A scattering-factor table maps a species identifier to a complex
//! scattering amplitude for one radiation type. The built-in tables
//! return purely real factors (electron counts for X-rays, coherent
//! scattering lengths for neutrons); the complex return type leaves
//! room for anomalous terms in custom tables. Factors are constant
//! over one calculation — any momentum-transfer dependence is the
//! caller's concern.

mod element;

pub use element::{atomic_number, neutron_coherent_b, parse_species};

use std::collections::HashMap;

use num_complex::Complex64;

use crate::errors::{Error, Result};

/// Strategy supplying per-species scattering amplitudes
pub trait ScatteringFactorTable: Send + Sync {
    /// Stable registry identifier, e.g. "xray"
    fn type_name(&self) -> &str;

    /// Radiation-type tag this table applies to
    fn radiation(&self) -> &str;

    /// Scattering amplitude for one species.
    ///
    /// Fails with a structure error for species the table does not
    /// know; custom overrides take precedence over built-in values.
    fn lookup(&self, species: &str) -> Result<Complex64>;

    /// Override the factor of one species
    fn set_custom(&mut self, species: &str, value: Complex64);

    /// Drop all per-species overrides
    fn clear_custom(&mut self);

    /// Clone into an owning box
    fn clone_boxed(&self) -> Box<dyn ScatteringFactorTable>;
}

impl Clone for Box<dyn ScatteringFactorTable> {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

/// X-ray scattering factors at Q = 0: the electron count of the
/// species, with ionic charges honored ("Na+" scatters as 10
/// electrons).
#[derive(Debug, Clone, Default)]
pub struct XrayScatteringFactors {
    custom: HashMap<String, Complex64>,
}

impl XrayScatteringFactors {
    /// Create a table with no overrides
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScatteringFactorTable for XrayScatteringFactors {
    fn type_name(&self) -> &str {
        "xray"
    }

    fn radiation(&self) -> &str {
        "X"
    }

    fn lookup(&self, species: &str) -> Result<Complex64> {
        if let Some(&value) = self.custom.get(species) {
            return Ok(value);
        }
        let (symbol, charge) = parse_species(species)?;
        let z = atomic_number(symbol).ok_or_else(|| {
            Error::Structure(format!("unknown element '{}' in species '{}'", symbol, species))
        })?;
        let electrons = f64::from(z) - f64::from(charge);
        if electrons < 0.0 {
            return Err(Error::Structure(format!(
                "species '{}' has negative electron count",
                species
            )));
        }
        Ok(Complex64::new(electrons, 0.0))
    }

    fn set_custom(&mut self, species: &str, value: Complex64) {
        self.custom.insert(species.to_string(), value);
    }

    fn clear_custom(&mut self) {
        self.custom.clear();
    }

    fn clone_boxed(&self) -> Box<dyn ScatteringFactorTable> {
        Box::new(self.clone())
    }
}

/// Coherent neutron scattering lengths in fm; charge suffixes are
/// ignored since neutron scattering does not see the electron shell.
#[derive(Debug, Clone, Default)]
pub struct NeutronScatteringFactors {
    custom: HashMap<String, Complex64>,
}

impl NeutronScatteringFactors {
    /// Create a table with no overrides
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScatteringFactorTable for NeutronScatteringFactors {
    fn type_name(&self) -> &str {
        "neutron"
    }

    fn radiation(&self) -> &str {
        "N"
    }

    fn lookup(&self, species: &str) -> Result<Complex64> {
        if let Some(&value) = self.custom.get(species) {
            return Ok(value);
        }
        let (symbol, _charge) = parse_species(species)?;
        let b = neutron_coherent_b(symbol).ok_or_else(|| {
            Error::Structure(format!(
                "no neutron scattering length for element '{}'",
                symbol
            ))
        })?;
        Ok(Complex64::new(b, 0.0))
    }

    fn set_custom(&mut self, species: &str, value: Complex64) {
        self.custom.insert(species.to_string(), value);
    }

    fn clear_custom(&mut self) {
        self.custom.clear();
    }

    fn clone_boxed(&self) -> Box<dyn ScatteringFactorTable> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_xray_charge_adjustment() {
        let table = XrayScatteringFactors::new();
        assert_relative_eq!(table.lookup("Na").unwrap().re, 11.0, epsilon = 1e-12);
        assert_relative_eq!(table.lookup("Na+").unwrap().re, 10.0, epsilon = 1e-12);
        assert_relative_eq!(table.lookup("O2-").unwrap().re, 10.0, epsilon = 1e-12);
        assert!(table.lookup("Qq").is_err());
    }

    #[test]
    fn test_neutron_lengths() {
        let table = NeutronScatteringFactors::new();
        assert!(table.lookup("H").unwrap().re < 0.0);
        assert!(table.lookup("Ti").unwrap().re < 0.0);
        // charge suffix is ignored
        assert_relative_eq!(
            table.lookup("O2-").unwrap().re,
            table.lookup("O").unwrap().re,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_custom_override() {
        let mut table = NeutronScatteringFactors::new();
        table.set_custom("D", Complex64::new(6.671, 0.0));
        assert_relative_eq!(table.lookup("D").unwrap().re, 6.671, epsilon = 1e-12);
        table.clear_custom();
        assert!(table.lookup("D").is_err());
    }
}
