/*
MIT License with diffpy.srreal Attribution

Copyright (c) 2026 srreal-rs contributors

Based on or developed using diffpy.srreal
Copyright (c) 2009 Trustees of the Columbia University
in the City of New York. All rights reserved.
*/

//! Reciprocal-space PDF calculation through the Debye scattering sum
//!
//! Each bond contributes `amp * sin(Q d)/(Q d) * exp(-sigma² Q²/2)`
//! over the momentum-transfer grid; the accumulated reduced structure
//! function is transformed to a real-space PDF on demand. This path
//! pays a trigonometric evaluation per Q point per bond, so it is the
//! natural place for the parallel worker split.

use log::{debug, info};
use ndarray::{Array1, ArrayView1};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::bonds::Bond;
use crate::constants::DEFAULT_PEAK_EXTENSION;
use crate::errors::{Error, Result};
use crate::peaks::{DebyeWallerPeakWidth, PeakWidthModel};
use crate::quantity::{evaluate_with, AbortSignal, EvalOptions, Grid, PairQuantity};
use crate::registry;
use crate::structure::StructureAdapter;
use crate::weights::{ScatteringFactorTable, XrayScatteringFactors};

/// Scalar configuration of a [`DebyePdfCalculator`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebyePdfCalculatorConfig {
    /// Lower bound of the momentum-transfer grid in Å⁻¹
    pub qmin: f64,
    /// Upper bound of the momentum-transfer grid in Å⁻¹
    pub qmax: f64,
    /// Momentum-transfer step in Å⁻¹; `None` selects the optimum
    /// step pi / (rmax + peak_extension) derived from the requested
    /// real-space range
    pub qstep: Option<f64>,
    /// Lower bound of the transformed real-space grid in Å
    pub rmin: f64,
    /// Upper bound of the transformed real-space grid in Å
    pub rmax: f64,
    /// Real-space grid step in Å
    pub rstep: f64,
    /// Padding of the real-space range used when deriving the optimum
    /// qstep, in Å
    pub peak_extension: f64,
    /// Overall scale factor applied to the transformed curve
    pub scale: f64,
    /// Relative term size below which the per-bond Q sum is truncated
    pub debye_precision: f64,
    /// Number of evaluation workers; 0 or 1 runs serially
    pub workers: usize,
}

impl Default for DebyePdfCalculatorConfig {
    fn default() -> Self {
        Self {
            qmin: 0.0,
            qmax: 25.0,
            qstep: None,
            rmin: 0.0,
            rmax: 10.0,
            rstep: 0.01,
            peak_extension: DEFAULT_PEAK_EXTENSION,
            scale: 1.0,
            debye_precision: 1e-25,
            workers: 1,
        }
    }
}

impl DebyePdfCalculatorConfig {
    /// The momentum-transfer step that will actually be used
    pub fn effective_qstep(&self) -> f64 {
        match self.qstep {
            Some(step) => step,
            None => std::f64::consts::PI / (self.rmax + self.peak_extension),
        }
    }

    fn validate(&self) -> Result<()> {
        Grid::from_range(self.rmin, self.rmax, self.rstep)?;
        Grid::from_range(self.qmin, self.qmax, self.effective_qstep())?;
        if self.qmin < 0.0 || self.rmin < 0.0 {
            return Err(Error::Range(
                "qmin and rmin must be non-negative".to_string(),
            ));
        }
        if !(self.scale.is_finite() && self.debye_precision.is_finite())
            || self.debye_precision < 0.0
        {
            return Err(Error::Configuration(
                "scale must be finite and debye_precision non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Reciprocal-space PDF calculator using direct Debye summation.
///
/// Same lifecycle as the real-space calculator: configure, call
/// [`DebyePdfCalculator::eval`], then read the reduced structure
/// function with [`DebyePdfCalculator::fq`] or the transformed PDF
/// with [`DebyePdfCalculator::pdf`].
#[derive(Clone)]
pub struct DebyePdfCalculator {
    config: DebyePdfCalculatorConfig,
    width_model: Box<dyn PeakWidthModel>,
    table: Box<dyn ScatteringFactorTable>,
    abort: AbortSignal,

    // per-evaluation context, captured by prepare()
    value: Array1<f64>,
    qgrid: Option<Grid>,
    site_factors: Vec<Complex64>,
    mean_factor: f64,
    total_occupancy: f64,
}

impl Default for DebyePdfCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl DebyePdfCalculator {
    /// Create a calculator with X-ray weights and Debye-Waller widths
    pub fn new() -> Self {
        Self {
            config: DebyePdfCalculatorConfig::default(),
            width_model: Box::new(DebyeWallerPeakWidth::new()),
            table: Box::new(XrayScatteringFactors::new()),
            abort: AbortSignal::default(),
            value: Array1::zeros(0),
            qgrid: None,
            site_factors: Vec::new(),
            mean_factor: 0.0,
            total_occupancy: 0.0,
        }
    }

    /// Current scalar configuration
    pub fn config(&self) -> &DebyePdfCalculatorConfig {
        &self.config
    }

    /// Replace the scalar configuration; validated immediately
    pub fn set_config(&mut self, config: DebyePdfCalculatorConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Use an explicit momentum-transfer step
    pub fn set_qstep(&mut self, qstep: f64) -> Result<()> {
        let mut config = self.config.clone();
        config.qstep = Some(qstep);
        self.set_config(config)
    }

    /// Derive the momentum-transfer step from the real-space range
    /// (optimum-step mode)
    pub fn use_optimum_qstep(&mut self) {
        self.config.qstep = None;
    }

    /// Selected peak-width model
    pub fn peak_width_model(&self) -> &dyn PeakWidthModel {
        self.width_model.as_ref()
    }

    /// Replace the peak-width model
    pub fn set_peak_width_model(&mut self, model: Box<dyn PeakWidthModel>) {
        self.width_model = model;
    }

    /// Select a peak-width model by registered type name
    pub fn set_peak_width_model_by_type(&mut self, name: &str) -> Result<()> {
        self.width_model = registry::create_peak_width_model(name)?;
        Ok(())
    }

    /// Replace the scattering-factor table
    pub fn set_scattering_factor_table(&mut self, table: Box<dyn ScatteringFactorTable>) {
        self.table = table;
    }

    /// Select a scattering-factor table by registered type name
    pub fn set_scattering_factor_table_by_type(&mut self, name: &str) -> Result<()> {
        self.table = registry::create_scattering_factor_table(name)?;
        Ok(())
    }

    /// Shared flag for cancelling a running evaluation
    pub fn abort_signal(&self) -> AbortSignal {
        AbortSignal::clone(&self.abort)
    }

    fn prepare(&mut self, structure: &dyn StructureAdapter) -> Result<()> {
        self.config.validate()?;
        structure.validate()?;

        let count = structure.count_sites();
        let mut factors = Vec::with_capacity(count);
        let mut factor_sum = 0.0;
        let mut occupancy_sum = 0.0;
        for i in 0..count {
            let f = self.table.lookup(structure.species(i))?;
            let w = structure.occupancy(i) * structure.site_multiplicity(i);
            factor_sum += w * f.re;
            occupancy_sum += w;
            factors.push(f);
        }
        if occupancy_sum <= 0.0 {
            return Err(Error::Structure(
                "structure contains no scattering atoms".to_string(),
            ));
        }
        let mean_factor = factor_sum / occupancy_sum;
        if mean_factor.abs() < 1e-12 {
            return Err(Error::Numeric(
                "mean scattering factor is zero; structure function is undefined".to_string(),
            ));
        }

        let qgrid = Grid::from_range(self.config.qmin, self.config.qmax, self.config.effective_qstep())?;
        debug!(
            "debye evaluation prepared: {} sites, qgrid [{}, {}] step {:.5} x {}",
            count,
            self.config.qmin,
            self.config.qmax,
            qgrid.step(),
            qgrid.len()
        );

        self.site_factors = factors;
        self.mean_factor = mean_factor;
        self.total_occupancy = occupancy_sum;
        self.qgrid = Some(qgrid);
        Ok(())
    }

    /// Run the Debye sum over one structure and return the
    /// transformed real-space PDF.
    pub fn eval(&mut self, structure: &dyn StructureAdapter) -> Result<Array1<f64>> {
        self.prepare(structure)?;
        let options = EvalOptions {
            workers: self.config.workers,
            abort: Some(self.abort_signal()),
        };
        evaluate_with(self, structure, &options)?;
        info!(
            "debye evaluation finished over q in [{}, {}] Å⁻¹",
            self.config.qmin, self.config.qmax
        );
        self.pdf()
    }

    /// The momentum-transfer grid
    pub fn qgrid(&self) -> Result<Array1<f64>> {
        let grid = Grid::from_range(self.config.qmin, self.config.qmax, self.config.effective_qstep())?;
        Ok(grid.points())
    }

    /// The requested real-space grid
    pub fn rgrid(&self) -> Result<Array1<f64>> {
        let grid = Grid::from_range(self.config.rmin, self.config.rmax, self.config.rstep)?;
        Ok(grid.points())
    }

    /// Total structure function S(Q); zeros + 1 before the first
    /// evaluation
    pub fn sq(&self) -> Result<Array1<f64>> {
        Ok(self.sq_minus_one()? + 1.0)
    }

    /// Reduced structure function F(Q) = Q [S(Q) - 1]
    pub fn fq(&self) -> Result<Array1<f64>> {
        let grid = Grid::from_range(self.config.qmin, self.config.qmax, self.config.effective_qstep())?;
        Ok(grid.points() * self.sq_minus_one()?)
    }

    /// Real-space PDF from the sine transform of the cached F(Q):
    /// `G(r) = scale * 2/pi * sum_k F(Q_k) sin(Q_k r) qstep`
    pub fn pdf(&self) -> Result<Array1<f64>> {
        let rgrid = Grid::from_range(self.config.rmin, self.config.rmax, self.config.rstep)?;
        let qgrid = Grid::from_range(self.config.qmin, self.config.qmax, self.config.effective_qstep())?;
        let fq = self.fq()?;

        let prefactor = self.config.scale * 2.0 / std::f64::consts::PI * qgrid.step();
        let mut pdf = Array1::zeros(rgrid.len());
        for i in 0..rgrid.len() {
            let r = rgrid.point(i);
            let mut sum = 0.0;
            for k in 0..qgrid.len() {
                sum += fq[k] * (qgrid.point(k) * r).sin();
            }
            pdf[i] = prefactor * sum;
        }
        Ok(pdf)
    }

    fn sq_minus_one(&self) -> Result<Array1<f64>> {
        let grid = Grid::from_range(self.config.qmin, self.config.qmax, self.config.effective_qstep())?;
        if self.value.len() != grid.len() {
            return Ok(Array1::zeros(grid.len()));
        }
        Ok(self.value.clone())
    }
}

impl PairQuantity for DebyePdfCalculator {
    fn value(&self) -> ArrayView1<'_, f64> {
        self.value.view()
    }

    fn value_mut(&mut self) -> &mut Array1<f64> {
        &mut self.value
    }

    fn bond_range(&self) -> (f64, f64) {
        // pad the summation range so shells just outside [rmin, rmax]
        // still damp the transform instead of leaving a hard cutoff
        ((self.config.rmin - self.config.peak_extension).max(0.0),
         self.config.rmax + self.config.peak_extension)
    }

    fn reset_value(&mut self) {
        match self.qgrid {
            Some(grid) => self.value = Array1::zeros(grid.len()),
            None => self.value = Array1::zeros(0),
        }
    }

    fn add_pair_contribution(
        &mut self,
        bond: &Bond,
        structure: &dyn StructureAdapter,
    ) -> Result<()> {
        let grid = self.qgrid.ok_or_else(|| {
            Error::Configuration("debye contribution invoked without preparation".to_string())
        })?;

        let fi = self.site_factors[bond.site0];
        let fj = self.site_factors[bond.site1];
        let weight = (fi * fj.conj()).re;
        let amplitude = bond.occupancy_product * bond.multiplicity * weight;
        let width = self.width_model.calculate(bond, structure)?;
        if !(amplitude.is_finite() && width.is_finite()) {
            return Err(Error::Numeric(format!(
                "non-finite debye term for bond {}-{} at d = {}",
                bond.site0, bond.site1, bond.distance
            )));
        }

        let d = bond.distance;
        let sigma2 = width * width;
        for k in 0..grid.len() {
            let q = grid.point(k);
            let qd = q * d;
            let sinc = if qd.abs() < 1e-12 { 1.0 } else { qd.sin() / qd };
            let damping = (-0.5 * sigma2 * q * q).exp();
            self.value[k] += amplitude * damping * sinc;

            // remaining terms only get smaller once q*d passes 1
            if qd > 1.0 && damping / qd < self.config.debye_precision {
                break;
            }
        }
        Ok(())
    }

    fn finish_value(&mut self, _structure: &dyn StructureAdapter) -> Result<()> {
        let norm = self.total_occupancy * self.mean_factor * self.mean_factor;
        self.value /= norm;
        if self.value.iter().any(|v| !v.is_finite()) {
            return Err(Error::Numeric(
                "non-finite value in accumulated structure function".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::{AtomSite, AtomicStructure, Vector3D};
    use approx::assert_relative_eq;

    fn nickel_pair(distance: f64, uiso: f64) -> AtomicStructure {
        let mut molecule = AtomicStructure::new();
        molecule.add_site(AtomSite::new("Ni", Vector3D::zero()).with_uiso(uiso));
        molecule.add_site(AtomSite::new("Ni", Vector3D::new(distance, 0.0, 0.0)).with_uiso(uiso));
        molecule
    }

    #[test]
    fn test_two_atom_structure_function() {
        let d = 2.5;
        let mut calc = DebyePdfCalculator::new();
        let mut config = DebyePdfCalculatorConfig::default();
        config.qmin = 0.0;
        config.qmax = 20.0;
        config.qstep = Some(0.05);
        calc.set_config(config).unwrap();
        calc.eval(&nickel_pair(d, 0.0)).unwrap();

        // S(Q) - 1 = sinc(Q d) for an unbroadened two-atom model
        let qgrid = calc.qgrid().unwrap();
        let sq = calc.sq().unwrap();
        for (k, &q) in qgrid.iter().enumerate() {
            let qd: f64 = q * d;
            let expected = if qd.abs() < 1e-12 { 1.0 } else { qd.sin() / qd };
            assert_relative_eq!(sq[k] - 1.0, expected, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_optimum_qstep_mode() {
        let mut calc = DebyePdfCalculator::new();
        calc.use_optimum_qstep();
        let expected = std::f64::consts::PI / (calc.config().rmax + calc.config().peak_extension);
        assert_relative_eq!(calc.config().effective_qstep(), expected, epsilon = 1e-12);

        calc.set_qstep(0.02).unwrap();
        assert_relative_eq!(calc.config().effective_qstep(), 0.02, epsilon = 1e-15);
    }

    #[test]
    fn test_fq_is_odd_in_grid_sense() {
        // F(0) must vanish since F(Q) = Q [S(Q) - 1]
        let mut calc = DebyePdfCalculator::new();
        calc.set_qstep(0.1).unwrap();
        calc.eval(&nickel_pair(2.0, 0.004)).unwrap();
        let fq = calc.fq().unwrap();
        assert_relative_eq!(fq[0], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_transformed_peak_position() {
        let d = 3.0;
        let mut calc = DebyePdfCalculator::new();
        let mut config = DebyePdfCalculatorConfig::default();
        config.qmax = 30.0;
        config.qstep = Some(0.02);
        config.rmax = 6.0;
        config.rstep = 0.01;
        calc.set_config(config).unwrap();
        let pdf = calc.eval(&nickel_pair(d, 0.01)).unwrap();
        let rgrid = calc.rgrid().unwrap();

        let (imax, _) = pdf
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .unwrap();
        assert_relative_eq!(rgrid[imax], d, epsilon = 0.03);
    }
}
