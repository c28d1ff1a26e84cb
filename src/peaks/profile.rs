/*
MIT License with diffpy.srreal Attribution

Copyright (c) 2026 srreal-rs contributors

Based on or developed using diffpy.srreal
Copyright (c) 2009 Trustees of the Columbia University
in the City of New York. All rights reserved.
*/

//! Peak-shape strategies
//!
//! A peak profile converts a (center, width, amplitude) triple into
//! contributions on a distance grid. Kernels have unit area, so the
//! integrated contribution of one bond equals its amplitude. The
//! support of each peak is bounded by a configurable precision — the
//! relative kernel amplitude below which contributions are dropped —
//! which keeps the work per bond proportional to the peak width, not
//! to the grid size.

use ndarray::Array1;

use crate::constants::{DEFAULT_PEAK_PRECISION, WIDTH_EPSILON};
use crate::errors::{Error, Result};
use crate::quantity::Grid;

const SQRT_2PI: f64 = 2.506628274631000502;

/// Strategy spreading one peak onto a grid
pub trait PeakProfile: Send + Sync {
    /// Stable registry identifier, e.g. "gaussian"
    fn type_name(&self) -> &str;

    /// Kernel value at offset `x` from the peak center; unit area
    /// over x for any positive width
    fn y(&self, x: f64, width: f64) -> f64;

    /// Relative-amplitude floor bounding the peak support
    fn precision(&self) -> f64;

    /// Set the precision; must lie in (0, 1)
    fn set_precision(&mut self, precision: f64) -> Result<()>;

    /// Half-width of the effective support window for the given peak
    /// width
    fn support_half_width(&self, width: f64) -> f64;

    /// Clone into an owning box
    fn clone_boxed(&self) -> Box<dyn PeakProfile>;

    /// Add one peak to `values`, touching only grid points inside the
    /// support window.
    ///
    /// `values` holds density per grid point: summing it times the
    /// grid step recovers the integrated amplitude. A width at or
    /// below `WIDTH_EPSILON` degenerates to a spike split between the
    /// two grid points bracketing the center with linear weights, so
    /// the integrated mass is conserved exactly.
    fn spread(
        &self,
        values: &mut Array1<f64>,
        grid: &Grid,
        center: f64,
        width: f64,
        amplitude: f64,
    ) {
        if values.is_empty() {
            return;
        }
        let last = values.len() - 1;

        if width <= WIDTH_EPSILON {
            let t = grid.fractional_index(center);
            if t < 0.0 || t > last as f64 {
                return;
            }
            let k = (t.floor() as usize).min(last);
            let frac = t - k as f64;
            let spike = amplitude / grid.step();
            values[k] += spike * (1.0 - frac);
            if frac > 0.0 && k < last {
                values[k + 1] += spike * frac;
            }
            return;
        }

        let half = self.support_half_width(width);
        let Some((lo, hi)) = grid.window(center - half, center + half) else {
            return;
        };
        let hi = hi.min(last);
        for k in lo..=hi {
            values[k] += amplitude * self.y(grid.point(k) - center, width);
        }
    }
}

impl Clone for Box<dyn PeakProfile> {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

/// Gaussian kernel with precision-bounded tails
#[derive(Debug, Clone)]
pub struct GaussianProfile {
    precision: f64,
}

impl GaussianProfile {
    /// Create a Gaussian profile with the default precision
    pub fn new() -> Self {
        Self {
            precision: DEFAULT_PEAK_PRECISION,
        }
    }
}

impl Default for GaussianProfile {
    fn default() -> Self {
        Self::new()
    }
}

impl PeakProfile for GaussianProfile {
    fn type_name(&self) -> &str {
        "gaussian"
    }

    fn y(&self, x: f64, width: f64) -> f64 {
        (-x * x / (2.0 * width * width)).exp() / (width * SQRT_2PI)
    }

    fn precision(&self) -> f64 {
        self.precision
    }

    fn set_precision(&mut self, precision: f64) -> Result<()> {
        validate_precision(precision)?;
        self.precision = precision;
        Ok(())
    }

    fn support_half_width(&self, width: f64) -> f64 {
        width * (-2.0 * self.precision.ln()).sqrt()
    }

    fn clone_boxed(&self) -> Box<dyn PeakProfile> {
        Box::new(self.clone())
    }
}

/// Gaussian kernel cropped at the precision bound and rescaled so the
/// cropped shape still integrates to one.
///
/// Useful when exact mass conservation matters more than smooth tails:
/// the plain Gaussian loses the tail mass beyond its support window.
#[derive(Debug, Clone)]
pub struct CroppedGaussianProfile {
    precision: f64,
    /// Fraction of the full Gaussian area inside the support window;
    /// recomputed whenever the precision changes.
    enclosed_area: f64,
}

impl CroppedGaussianProfile {
    /// Create a cropped Gaussian with the default precision
    pub fn new() -> Self {
        let precision = DEFAULT_PEAK_PRECISION;
        Self {
            precision,
            enclosed_area: enclosed_gaussian_area(precision),
        }
    }
}

impl Default for CroppedGaussianProfile {
    fn default() -> Self {
        Self::new()
    }
}

impl PeakProfile for CroppedGaussianProfile {
    fn type_name(&self) -> &str {
        "croppedgaussian"
    }

    fn y(&self, x: f64, width: f64) -> f64 {
        let half = self.support_half_width(width);
        if x.abs() > half {
            return 0.0;
        }
        (-x * x / (2.0 * width * width)).exp() / (width * SQRT_2PI * self.enclosed_area)
    }

    fn precision(&self) -> f64 {
        self.precision
    }

    fn set_precision(&mut self, precision: f64) -> Result<()> {
        validate_precision(precision)?;
        self.precision = precision;
        self.enclosed_area = enclosed_gaussian_area(precision);
        Ok(())
    }

    fn support_half_width(&self, width: f64) -> f64 {
        width * (-2.0 * self.precision.ln()).sqrt()
    }

    fn clone_boxed(&self) -> Box<dyn PeakProfile> {
        Box::new(self.clone())
    }
}

fn validate_precision(precision: f64) -> Result<()> {
    if !(precision.is_finite() && precision > 0.0 && precision < 1.0) {
        return Err(Error::Configuration(format!(
            "peak precision must lie in (0, 1), got {}",
            precision
        )));
    }
    Ok(())
}

/// Fraction of a unit Gaussian's area inside +-support for the given
/// precision: erf(t / sqrt(2)) with t = sqrt(-2 ln precision).
fn enclosed_gaussian_area(precision: f64) -> f64 {
    let t = (-2.0 * precision.ln()).sqrt();
    erf(t / std::f64::consts::SQRT_2)
}

/// Abramowitz & Stegun 7.1.26 rational approximation of erf,
/// max absolute error 1.5e-7 — ample for area normalization.
fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + 0.3275911 * x);
    let poly = t
        * (0.254829592
            + t * (-0.284496736 + t * (1.421413741 + t * (-1.453152027 + t * 1.061405429))));
    sign * (1.0 - poly * (-x * x).exp())
}
