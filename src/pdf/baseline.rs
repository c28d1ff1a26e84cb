/*
MIT License with diffpy.srreal Attribution

Copyright (c) 2026 srreal-rs contributors

Based on or developed using diffpy.srreal
Copyright (c) 2009 Trustees of the Columbia University
in the City of New York. All rights reserved.
*/

//! Additive baseline corrections for the real-space PDF

use crate::errors::{Error, Result};

/// Additive baseline under the PDF curve.
///
/// Baselines are pure functions of the distance coordinate plus the
/// structure's number density, so swapping one in never requires a
/// re-evaluation of the pair sum.
pub trait PdfBaseline: Send + Sync {
    /// Stable registry identifier, e.g. "linear"
    fn type_name(&self) -> &str;

    /// Baseline value at distance `r`, given the number density of
    /// the evaluated structure (None for aperiodic models)
    fn value(&self, r: f64, num_density: Option<f64>) -> f64;

    /// Clone into an owning box
    fn clone_boxed(&self) -> Box<dyn PdfBaseline>;
}

impl Clone for Box<dyn PdfBaseline> {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

/// No baseline; appropriate for molecular structures
#[derive(Debug, Clone, Default)]
pub struct ZeroBaseline;

impl ZeroBaseline {
    /// Create a zero baseline
    pub fn new() -> Self {
        Self
    }
}

impl PdfBaseline for ZeroBaseline {
    fn type_name(&self) -> &str {
        "zero"
    }

    fn value(&self, _r: f64, _num_density: Option<f64>) -> f64 {
        0.0
    }

    fn clone_boxed(&self) -> Box<dyn PdfBaseline> {
        Box::new(self.clone())
    }
}

/// Linear baseline -4*pi*rho0*r of a uniform number density.
///
/// The slope is derived from the evaluated structure's density unless
/// pinned to an explicit value.
#[derive(Debug, Clone, Default)]
pub struct LinearBaseline {
    slope: Option<f64>,
}

impl LinearBaseline {
    /// Create a baseline whose slope follows the structure density
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the slope to an explicit value (per Å²)
    pub fn with_slope(slope: f64) -> Result<Self> {
        if !slope.is_finite() {
            return Err(Error::Configuration(format!(
                "baseline slope must be finite, got {}",
                slope
            )));
        }
        Ok(Self { slope: Some(slope) })
    }

    /// The pinned slope, if any
    pub fn slope(&self) -> Option<f64> {
        self.slope
    }
}

impl PdfBaseline for LinearBaseline {
    fn type_name(&self) -> &str {
        "linear"
    }

    fn value(&self, r: f64, num_density: Option<f64>) -> f64 {
        let slope = self
            .slope
            .unwrap_or_else(|| match num_density {
                Some(rho0) => -4.0 * std::f64::consts::PI * rho0,
                None => 0.0,
            });
        slope * r
    }

    fn clone_boxed(&self) -> Box<dyn PdfBaseline> {
        Box::new(self.clone())
    }
}
