/*
MIT License with diffpy.srreal Attribution

Copyright (c) 2026 srreal-rs contributors

Based on or developed using diffpy.srreal
Copyright (c) 2009 Trustees of the Columbia University
in the City of New York. All rights reserved.
*/

//! Real-space PDF calculator
//!
//! Accumulates one broadened peak per bond onto a distance grid and
//! post-processes the raw curve with baseline and envelope
//! corrections. The raw accumulation is cached: swapping a baseline
//! or an envelope only changes the post-processed curve and never
//! requires re-running the pair sum.

use log::{debug, info};
use ndarray::{s, Array1, ArrayView1};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::bonds::Bond;
use crate::constants::{DEFAULT_PEAK_EXTENSION, GRID_EPSILON};
use crate::errors::{Error, Result};
use crate::peaks::{DebyeWallerPeakWidth, GaussianProfile, PeakProfile, PeakWidthModel};
use crate::quantity::{evaluate_with, AbortSignal, EvalOptions, Grid, PairQuantity};
use crate::registry;
use crate::structure::StructureAdapter;
use crate::weights::{ScatteringFactorTable, XrayScatteringFactors};

use super::baseline::{LinearBaseline, PdfBaseline};
use super::envelope::PdfEnvelope;

/// Scalar configuration of a [`PdfCalculator`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfCalculatorConfig {
    /// Lower bound of the output distance grid in Å
    pub rmin: f64,
    /// Upper bound of the output distance grid in Å
    pub rmax: f64,
    /// Distance grid step in Å
    pub rstep: f64,
    /// Overall scale factor applied to the post-processed curve
    pub scale: f64,
    /// Padding of the internal calculation range beyond [rmin, rmax]
    /// so near-edge peak tails are not truncated, in Å
    pub peak_extension: f64,
    /// Number of evaluation workers; 0 or 1 runs serially
    pub workers: usize,
}

impl Default for PdfCalculatorConfig {
    fn default() -> Self {
        Self {
            rmin: 0.0,
            rmax: 10.0,
            rstep: 0.01,
            scale: 1.0,
            peak_extension: DEFAULT_PEAK_EXTENSION,
            workers: 1,
        }
    }
}

impl PdfCalculatorConfig {
    fn validate(&self) -> Result<()> {
        // Grid construction re-checks bounds; catch the rest here.
        Grid::from_range(self.rmin, self.rmax, self.rstep)?;
        if self.rmin < 0.0 {
            return Err(Error::Range(format!(
                "rmin must be non-negative, got {}",
                self.rmin
            )));
        }
        if !(self.scale.is_finite() && self.peak_extension.is_finite())
            || self.peak_extension < 0.0
        {
            return Err(Error::Configuration(
                "scale and peak_extension must be finite, peak_extension non-negative"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Real-space pair distribution function calculator.
///
/// Lifecycle: configure strategies and ranges, call
/// [`PdfCalculator::eval`], then read [`PdfCalculator::pdf`],
/// [`PdfCalculator::rdf`] and [`PdfCalculator::rgrid`]. Another
/// configure + eval cycle is always legal on the same instance.
#[derive(Clone)]
pub struct PdfCalculator {
    config: PdfCalculatorConfig,
    width_model: Box<dyn PeakWidthModel>,
    profile: Box<dyn PeakProfile>,
    table: Box<dyn ScatteringFactorTable>,
    baseline: Box<dyn PdfBaseline>,
    envelopes: Vec<Box<dyn PdfEnvelope>>,
    abort: AbortSignal,

    // per-evaluation context, captured by prepare()
    value: Array1<f64>,
    extended: Option<(Grid, usize)>,
    site_factors: Vec<Complex64>,
    mean_factor: f64,
    total_occupancy: f64,
    num_density: Option<f64>,
}

impl Default for PdfCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfCalculator {
    /// Create a calculator with the default X-ray/Gaussian/
    /// Debye-Waller/linear-baseline configuration
    pub fn new() -> Self {
        Self {
            config: PdfCalculatorConfig::default(),
            width_model: Box::new(DebyeWallerPeakWidth::new()),
            profile: Box::new(GaussianProfile::new()),
            table: Box::new(XrayScatteringFactors::new()),
            baseline: Box::new(LinearBaseline::new()),
            envelopes: Vec::new(),
            abort: AbortSignal::default(),
            value: Array1::zeros(0),
            extended: None,
            site_factors: Vec::new(),
            mean_factor: 0.0,
            total_occupancy: 0.0,
            num_density: None,
        }
    }

    /// Current scalar configuration
    pub fn config(&self) -> &PdfCalculatorConfig {
        &self.config
    }

    /// Replace the scalar configuration; validated immediately
    pub fn set_config(&mut self, config: PdfCalculatorConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Set the output range and step in one call
    pub fn set_range(&mut self, rmin: f64, rmax: f64, rstep: f64) -> Result<()> {
        let mut config = self.config.clone();
        config.rmin = rmin;
        config.rmax = rmax;
        config.rstep = rstep;
        self.set_config(config)
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

    /// Selected peak profile
    pub fn peak_profile(&self) -> &dyn PeakProfile {
        self.profile.as_ref()
    }

    /// Replace the peak profile
    pub fn set_peak_profile(&mut self, profile: Box<dyn PeakProfile>) {
        self.profile = profile;
    }

    /// Select a peak profile by registered type name
    pub fn set_peak_profile_by_type(&mut self, name: &str) -> Result<()> {
        self.profile = registry::create_peak_profile(name)?;
        Ok(())
    }

    /// Selected scattering-factor table
    pub fn scattering_factor_table(&self) -> &dyn ScatteringFactorTable {
        self.table.as_ref()
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

    /// Selected baseline
    pub fn baseline(&self) -> &dyn PdfBaseline {
        self.baseline.as_ref()
    }

    /// Replace the baseline; the cached raw curve is untouched
    pub fn set_baseline(&mut self, baseline: Box<dyn PdfBaseline>) {
        self.baseline = baseline;
    }

    /// Select a baseline by registered type name
    pub fn set_baseline_by_type(&mut self, name: &str) -> Result<()> {
        self.baseline = registry::create_pdf_baseline(name)?;
        Ok(())
    }

    /// Currently applied envelopes
    pub fn envelopes(&self) -> &[Box<dyn PdfEnvelope>] {
        &self.envelopes
    }

    /// Append an envelope; the cached raw curve is untouched
    pub fn add_envelope(&mut self, envelope: Box<dyn PdfEnvelope>) {
        self.envelopes.push(envelope);
    }

    /// Append an envelope by registered type name
    pub fn add_envelope_by_type(&mut self, name: &str) -> Result<()> {
        self.envelopes.push(registry::create_pdf_envelope(name)?);
        Ok(())
    }

    /// Remove all envelopes
    pub fn clear_envelopes(&mut self) {
        self.envelopes.clear();
    }

    /// Shared flag for cancelling a running evaluation from another
    /// thread
    pub fn abort_signal(&self) -> AbortSignal {
        AbortSignal::clone(&self.abort)
    }

    /// Capture the per-evaluation context: site scattering factors,
    /// normalization terms, density and the extended calculation grid.
    /// Any configuration or structure problem surfaces here, before a
    /// single bond is accumulated.
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
                "mean scattering factor is zero; PDF normalization is undefined".to_string(),
            ));
        }

        // Extend the calculation grid below rmin (never past zero) and
        // above rmax so edge peaks keep their tails; rmin stays exactly
        // on a grid point.
        let config = &self.config;
        let pad_lo = ((config.peak_extension / config.rstep).ceil() as usize)
            .min((config.rmin / config.rstep + GRID_EPSILON).floor() as usize);
        let calclo = config.rmin - pad_lo as f64 * config.rstep;
        let calchi = config.rmax + config.peak_extension;
        let extended_grid = Grid::from_range(calclo, calchi, config.rstep)?;

        self.site_factors = factors;
        self.mean_factor = mean_factor;
        self.total_occupancy = occupancy_sum;
        self.num_density = structure.num_density();
        self.extended = Some((extended_grid, pad_lo));
        debug!(
            "pdf evaluation prepared: {} sites, <f> = {:.4}, grid [{:.3}, {:.3}] x {}",
            count,
            mean_factor,
            calclo,
            calchi,
            extended_grid.len()
        );
        Ok(())
    }

    /// Run the pair sum over one structure and return the
    /// post-processed PDF.
    ///
    /// Fails atomically: on any error the accumulator is reset and no
    /// partial curve is observable.
    pub fn eval(&mut self, structure: &dyn StructureAdapter) -> Result<Array1<f64>> {
        self.prepare(structure)?;
        let options = EvalOptions {
            workers: self.config.workers,
            abort: Some(self.abort_signal()),
        };
        evaluate_with(self, structure, &options)?;
        info!(
            "pdf evaluation finished over [{}, {}] Å",
            self.config.rmin, self.config.rmax
        );
        self.pdf()
    }

    /// The requested output grid
    pub fn rgrid(&self) -> Result<Array1<f64>> {
        let grid = Grid::from_range(self.config.rmin, self.config.rmax, self.config.rstep)?;
        Ok(grid.points())
    }

    /// Raw radial distribution function R(r) on the output grid.
    ///
    /// This is the cached pre-baseline, pre-envelope accumulation;
    /// zeros before the first evaluation.
    pub fn rdf(&self) -> Result<Array1<f64>> {
        let grid = Grid::from_range(self.config.rmin, self.config.rmax, self.config.rstep)?;
        let Some((_, offset)) = self.extended else {
            return Ok(Array1::zeros(grid.len()));
        };
        if self.value.len() < offset + grid.len() {
            return Ok(Array1::zeros(grid.len()));
        }
        Ok(self.value.slice(s![offset..offset + grid.len()]).to_owned())
    }

    /// Post-processed pair distribution function G(r):
    /// `scale * envelopes(r) * (R(r)/r + baseline(r))`
    pub fn pdf(&self) -> Result<Array1<f64>> {
        let grid = Grid::from_range(self.config.rmin, self.config.rmax, self.config.rstep)?;
        let rdf = self.rdf()?;
        let mut pdf = Array1::zeros(grid.len());
        for k in 0..grid.len() {
            let r = grid.point(k);
            let peak_term = if r < 1e-12 { 0.0 } else { rdf[k] / r };
            let mut g = peak_term + self.baseline.value(r, self.num_density);
            for envelope in &self.envelopes {
                g *= envelope.value(r);
            }
            pdf[k] = self.config.scale * g;
        }
        Ok(pdf)
    }
}

impl PairQuantity for PdfCalculator {
    fn value(&self) -> ArrayView1<'_, f64> {
        self.value.view()
    }

    fn value_mut(&mut self) -> &mut Array1<f64> {
        &mut self.value
    }

    fn bond_range(&self) -> (f64, f64) {
        let lo = (self.config.rmin - self.config.peak_extension).max(0.0);
        let hi = self.config.rmax + self.config.peak_extension;
        (lo, hi)
    }

    fn reset_value(&mut self) {
        // the accumulator grows back as pair distances are observed
        self.value = Array1::zeros(0);
    }

    fn add_pair_contribution(
        &mut self,
        bond: &Bond,
        structure: &dyn StructureAdapter,
    ) -> Result<()> {
        let (grid, _) = self.extended.ok_or_else(|| {
            Error::Configuration("pdf contribution invoked without preparation".to_string())
        })?;

        let fi = self.site_factors[bond.site0];
        let fj = self.site_factors[bond.site1];
        let weight = (fi * fj.conj()).re;
        let amplitude = bond.occupancy_product * bond.multiplicity * weight;
        let width = self.width_model.calculate(bond, structure)?;
        if !(amplitude.is_finite() && width.is_finite()) {
            return Err(Error::Numeric(format!(
                "non-finite peak for bond {}-{} at d = {}",
                bond.site0, bond.site1, bond.distance
            )));
        }

        // grow the accumulator just enough to hold this peak
        let reach = bond.distance + self.profile.support_half_width(width);
        let needed = (grid.fractional_index(reach).ceil().max(0.0) as usize + 1).min(grid.len());
        self.resize_value(needed);

        self.profile
            .spread(&mut self.value, &grid, bond.distance, width, amplitude);
        Ok(())
    }

    fn finish_value(&mut self, _structure: &dyn StructureAdapter) -> Result<()> {
        let (grid, _) = self.extended.ok_or_else(|| {
            Error::Configuration("pdf finalization invoked without preparation".to_string())
        })?;
        self.resize_value(grid.len());
        let norm = self.total_occupancy * self.mean_factor * self.mean_factor;
        self.value /= norm;
        if self.value.iter().any(|v| !v.is_finite()) {
            return Err(Error::Numeric(
                "non-finite value in accumulated PDF".to_string(),
            ));
        }
        Ok(())
    }
}
