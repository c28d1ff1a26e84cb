/*
MIT License with diffpy.srreal Attribution

Copyright (c) 2026 srreal-rs contributors

Based on or developed using diffpy.srreal
Copyright (c) 2009 Trustees of the Columbia University
in the City of New York. All rights reserved.
*/

//! Bond valence sums from the Brese-O'Keeffe empirical model
//!
//! Each cation-anion pair contributes `exp((r0 - d) / b)` to the
//! valence of both sites, positive for cations and negative for
//! anions. Comparing the accumulated sums against the nominal charges
//! of the species is a quick sanity check on refined structures.

use log::{debug, info};
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::bonds::Bond;
use crate::errors::{Error, Result};
use crate::quantity::{evaluate_with, AbortSignal, EvalOptions, PairQuantity};
use crate::structure::StructureAdapter;
use crate::weights::parse_species;

/// Bond-valence parameters (r0, b) in Å for a cation-anion pair from
/// the Brese-O'Keeffe 1991 compilation. Unlisted pairs have no
/// parametrization and contribute nothing to the sums.
fn builtin_bv_params(cation: &str, cation_charge: i32, anion: &str, anion_charge: i32) -> Option<(f64, f64)> {
    let r0 = match (cation, cation_charge, anion, anion_charge) {
        // oxides
        ("Li", 1, "O", -2) => 1.466,
        ("Na", 1, "O", -2) => 1.803,
        ("K", 1, "O", -2) => 2.132,
        ("Rb", 1, "O", -2) => 2.263,
        ("Cs", 1, "O", -2) => 2.417,
        ("Be", 2, "O", -2) => 1.381,
        ("Mg", 2, "O", -2) => 1.693,
        ("Ca", 2, "O", -2) => 1.967,
        ("Sr", 2, "O", -2) => 2.118,
        ("Ba", 2, "O", -2) => 2.285,
        ("B", 3, "O", -2) => 1.371,
        ("Al", 3, "O", -2) => 1.651,
        ("Ga", 3, "O", -2) => 1.730,
        ("Si", 4, "O", -2) => 1.624,
        ("Ge", 4, "O", -2) => 1.748,
        ("Sn", 4, "O", -2) => 1.905,
        ("P", 5, "O", -2) => 1.617,
        ("Ti", 4, "O", -2) => 1.815,
        ("Zr", 4, "O", -2) => 1.937,
        ("V", 5, "O", -2) => 1.803,
        ("Nb", 5, "O", -2) => 1.911,
        ("Mo", 6, "O", -2) => 1.907,
        ("W", 6, "O", -2) => 1.917,
        ("Cr", 3, "O", -2) => 1.724,
        ("Mn", 2, "O", -2) => 1.790,
        ("Fe", 2, "O", -2) => 1.734,
        ("Fe", 3, "O", -2) => 1.759,
        ("Co", 2, "O", -2) => 1.692,
        ("Ni", 2, "O", -2) => 1.654,
        ("Cu", 1, "O", -2) => 1.593,
        ("Cu", 2, "O", -2) => 1.679,
        ("Zn", 2, "O", -2) => 1.704,
        ("Cd", 2, "O", -2) => 1.904,
        ("Pb", 2, "O", -2) => 2.112,
        ("Y", 3, "O", -2) => 2.019,
        ("La", 3, "O", -2) => 2.172,
        ("Ce", 3, "O", -2) => 2.151,
        // fluorides
        ("Li", 1, "F", -1) => 1.360,
        ("Na", 1, "F", -1) => 1.677,
        ("K", 1, "F", -1) => 1.992,
        ("Mg", 2, "F", -1) => 1.581,
        ("Ca", 2, "F", -1) => 1.842,
        ("Al", 3, "F", -1) => 1.545,
        // chlorides
        ("Li", 1, "Cl", -1) => 1.910,
        ("Na", 1, "Cl", -1) => 2.15,
        ("K", 1, "Cl", -1) => 2.519,
        ("Rb", 1, "Cl", -1) => 2.652,
        ("Cs", 1, "Cl", -1) => 2.791,
        ("Ag", 1, "Cl", -1) => 2.09,
        // sulfides
        ("Mn", 2, "S", -2) => 2.22,
        ("Fe", 2, "S", -2) => 2.125,
        ("Cu", 1, "S", -2) => 1.898,
        ("Zn", 2, "S", -2) => 2.09,
        ("Ag", 1, "S", -2) => 2.119,
        ("Cd", 2, "S", -2) => 2.304,
        ("Pb", 2, "S", -2) => 2.541,
        _ => return None,
    };
    Some((r0, 0.37))
}

/// Scalar configuration of a [`BondValenceCalculator`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondValenceConfig {
    /// Shortest contributing bond distance in Å
    pub rmin: f64,
    /// Longest contributing bond distance in Å
    pub rmax: f64,
    /// Number of evaluation workers; 0 or 1 runs serially
    pub workers: usize,
}

impl Default for BondValenceConfig {
    fn default() -> Self {
        Self {
            rmin: 0.0,
            rmax: 10.0,
            workers: 1,
        }
    }
}

impl BondValenceConfig {
    fn validate(&self) -> Result<()> {
        if !(self.rmin.is_finite() && self.rmax.is_finite())
            || self.rmin < 0.0
            || self.rmax <= self.rmin
        {
            return Err(Error::Range(format!(
                "invalid bond valence range [{}, {}]",
                self.rmin, self.rmax
            )));
        }
        Ok(())
    }
}

/// Bond valence sum calculator.
///
/// Produces one signed valence per site. Species must carry explicit
/// charges ("Na+", "O2-"); neutral species never contribute.
#[derive(Clone)]
pub struct BondValenceCalculator {
    config: BondValenceConfig,
    custom_params: HashMap<(String, i32, String, i32), (f64, f64)>,
    abort: AbortSignal,

    // per-evaluation context, captured by prepare()
    value: Array1<f64>,
    charges: Vec<i32>,
    symbols: Vec<String>,
    site_count: usize,
}

impl Default for BondValenceCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl BondValenceCalculator {
    /// Create a calculator with the built-in parameter table
    pub fn new() -> Self {
        Self {
            config: BondValenceConfig::default(),
            custom_params: HashMap::new(),
            abort: AbortSignal::default(),
            value: Array1::zeros(0),
            charges: Vec::new(),
            symbols: Vec::new(),
            site_count: 0,
        }
    }

    /// Current scalar configuration
    pub fn config(&self) -> &BondValenceConfig {
        &self.config
    }

    /// Replace the scalar configuration; validated immediately
    pub fn set_config(&mut self, config: BondValenceConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Override or add bond-valence parameters for one cation-anion
    /// pair
    pub fn set_bv_params(
        &mut self,
        cation: &str,
        cation_charge: i32,
        anion: &str,
        anion_charge: i32,
        r0: f64,
        b: f64,
    ) -> Result<()> {
        if !(r0.is_finite() && b.is_finite()) || r0 <= 0.0 || b <= 0.0 {
            return Err(Error::Configuration(format!(
                "bond valence parameters must be positive, got r0 = {}, b = {}",
                r0, b
            )));
        }
        if cation_charge <= 0 || anion_charge >= 0 {
            return Err(Error::Configuration(format!(
                "expected a cation-anion pair, got charges {} and {}",
                cation_charge, anion_charge
            )));
        }
        self.custom_params.insert(
            (cation.to_string(), cation_charge, anion.to_string(), anion_charge),
            (r0, b),
        );
        Ok(())
    }

    /// Shared flag for cancelling a running evaluation
    pub fn abort_signal(&self) -> AbortSignal {
        AbortSignal::clone(&self.abort)
    }

    fn bv_params(
        &self,
        cation: &str,
        cation_charge: i32,
        anion: &str,
        anion_charge: i32,
    ) -> Option<(f64, f64)> {
        let key = (
            cation.to_string(),
            cation_charge,
            anion.to_string(),
            anion_charge,
        );
        self.custom_params
            .get(&key)
            .copied()
            .or_else(|| builtin_bv_params(cation, cation_charge, anion, anion_charge))
    }

    fn prepare(&mut self, structure: &dyn StructureAdapter) -> Result<()> {
        self.config.validate()?;
        structure.validate()?;

        let count = structure.count_sites();
        let mut charges = Vec::with_capacity(count);
        let mut symbols = Vec::with_capacity(count);
        for i in 0..count {
            let (symbol, charge) = parse_species(structure.species(i))?;
            charges.push(charge);
            symbols.push(symbol.to_string());
        }
        debug!("bond valence evaluation prepared for {} sites", count);

        self.charges = charges;
        self.symbols = symbols;
        self.site_count = count;
        Ok(())
    }

    /// Evaluate bond valence sums over one structure
    pub fn eval(&mut self, structure: &dyn StructureAdapter) -> Result<Array1<f64>> {
        self.prepare(structure)?;
        let options = EvalOptions {
            workers: self.config.workers,
            abort: Some(self.abort_signal()),
        };
        evaluate_with(self, structure, &options)?;
        info!(
            "bond valence sums evaluated for {} sites",
            self.site_count
        );
        Ok(self.value.clone())
    }

    /// Accumulated signed valence per site; zeros before the first
    /// evaluation
    pub fn valences(&self) -> ArrayView1<'_, f64> {
        self.value.view()
    }

    /// Nominal valences from the species charges of the last evaluated
    /// structure
    pub fn expected_valences(&self) -> Array1<f64> {
        Array1::from_iter(self.charges.iter().map(|&c| f64::from(c)))
    }

    /// Per-site difference between nominal and accumulated valence
    pub fn bvdiff(&self) -> Array1<f64> {
        self.expected_valences() - &self.value
    }

    /// Mean square valence difference over all sites
    pub fn bvmsdiff(&self) -> f64 {
        if self.site_count == 0 {
            return 0.0;
        }
        let diff = self.bvdiff();
        diff.iter().map(|d| d * d).sum::<f64>() / self.site_count as f64
    }

    /// Root mean square valence difference over all sites
    pub fn bvrmsdiff(&self) -> f64 {
        self.bvmsdiff().sqrt()
    }
}

impl PairQuantity for BondValenceCalculator {
    fn value(&self) -> ArrayView1<'_, f64> {
        self.value.view()
    }

    fn value_mut(&mut self) -> &mut Array1<f64> {
        &mut self.value
    }

    fn bond_range(&self) -> (f64, f64) {
        (self.config.rmin, self.config.rmax)
    }

    fn reset_value(&mut self) {
        self.value = Array1::zeros(self.site_count);
    }

    fn add_pair_contribution(
        &mut self,
        bond: &Bond,
        structure: &dyn StructureAdapter,
    ) -> Result<()> {
        let charge0 = self.charges[bond.site0];
        let charge1 = self.charges[bond.site1];
        // only opposite-charge pairs carry valence
        if charge0 == 0 || charge1 == 0 || (charge0 > 0) == (charge1 > 0) {
            return Ok(());
        }

        let (cation, anion) = if charge0 > 0 {
            (bond.site0, bond.site1)
        } else {
            (bond.site1, bond.site0)
        };
        let params = self.bv_params(
            &self.symbols[cation],
            self.charges[cation],
            &self.symbols[anion],
            self.charges[anion],
        );
        let (r0, b) = match params {
            Some(params) => params,
            None => {
                debug!(
                    "no bond valence parameters for {}{} - {}{}",
                    self.symbols[cation],
                    self.charges[cation],
                    self.symbols[anion],
                    self.charges[anion]
                );
                return Ok(());
            }
        };

        let valence = ((r0 - bond.distance) / b).exp();
        if !valence.is_finite() {
            return Err(Error::Numeric(format!(
                "non-finite bond valence for pair at d = {}",
                bond.distance
            )));
        }
        let sign = if charge0 > 0 { 1.0 } else { -1.0 };
        self.value[bond.site0] += sign * structure.occupancy(bond.site1) * valence;
        Ok(())
    }

    fn finish_value(&mut self, _structure: &dyn StructureAdapter) -> Result<()> {
        if self.value.iter().any(|v| !v.is_finite()) {
            return Err(Error::Numeric(
                "non-finite value in accumulated bond valences".to_string(),
            ));
        }
        Ok(())
    }
}
