/*
MIT License with diffpy.srreal Attribution

Copyright (c) 2026 srreal-rs contributors

Based on or developed using diffpy.srreal
Copyright (c) 2009 Trustees of the Columbia University
in the City of New York. All rights reserved.
*/

//! Multiplicative envelope corrections for the real-space PDF

use crate::errors::{Error, Result};

/// Multiplicative damping/scaling envelope over the PDF curve.
///
/// Envelopes are pure functions of the distance coordinate; they are
/// applied after accumulation and may be swapped without re-running
/// the pair sum.
pub trait PdfEnvelope: Send + Sync {
    /// Stable registry identifier, e.g. "qresolution"
    fn type_name(&self) -> &str;

    /// Envelope factor at distance `r`
    fn value(&self, r: f64) -> f64;

    /// Clone into an owning box
    fn clone_boxed(&self) -> Box<dyn PdfEnvelope>;
}

impl Clone for Box<dyn PdfEnvelope> {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

/// Uniform scaling factor
#[derive(Debug, Clone)]
pub struct ScaleEnvelope {
    scale: f64,
}

impl ScaleEnvelope {
    /// Create a scale envelope; the factor must be finite
    pub fn new(scale: f64) -> Result<Self> {
        if !scale.is_finite() {
            return Err(Error::Configuration(format!(
                "envelope scale must be finite, got {}",
                scale
            )));
        }
        Ok(Self { scale })
    }
}

impl Default for ScaleEnvelope {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

impl PdfEnvelope for ScaleEnvelope {
    fn type_name(&self) -> &str {
        "scale"
    }

    fn value(&self, _r: f64) -> f64 {
        self.scale
    }

    fn clone_boxed(&self) -> Box<dyn PdfEnvelope> {
        Box::new(self.clone())
    }
}

/// Gaussian damping exp(-(r*qdamp)²/2) from limited momentum-transfer
/// resolution of the probe
#[derive(Debug, Clone, Default)]
pub struct QResolutionEnvelope {
    qdamp: f64,
}

impl QResolutionEnvelope {
    /// Create an envelope with damping coefficient `qdamp` in Å⁻¹
    pub fn new(qdamp: f64) -> Result<Self> {
        if !qdamp.is_finite() || qdamp < 0.0 {
            return Err(Error::Configuration(format!(
                "qdamp must be non-negative, got {}",
                qdamp
            )));
        }
        Ok(Self { qdamp })
    }
}

impl PdfEnvelope for QResolutionEnvelope {
    fn type_name(&self) -> &str {
        "qresolution"
    }

    fn value(&self, r: f64) -> f64 {
        if self.qdamp <= 0.0 {
            return 1.0;
        }
        let x = r * self.qdamp;
        (-x * x / 2.0).exp()
    }

    fn clone_boxed(&self) -> Box<dyn PdfEnvelope> {
        Box::new(self.clone())
    }
}

/// Attenuation from a spherical particle of finite diameter.
///
/// The envelope is the sphere self-overlap function; it reaches zero
/// at r equal to the particle diameter. A non-positive diameter
/// disables the correction.
#[derive(Debug, Clone, Default)]
pub struct SphericalShapeEnvelope {
    spdiameter: f64,
}

impl SphericalShapeEnvelope {
    /// Create an envelope for a particle diameter in Å
    pub fn new(spdiameter: f64) -> Result<Self> {
        if !spdiameter.is_finite() {
            return Err(Error::Configuration(format!(
                "particle diameter must be finite, got {}",
                spdiameter
            )));
        }
        Ok(Self { spdiameter })
    }
}

impl PdfEnvelope for SphericalShapeEnvelope {
    fn type_name(&self) -> &str {
        "sphericalshape"
    }

    fn value(&self, r: f64) -> f64 {
        if self.spdiameter <= 0.0 {
            return 1.0;
        }
        if r >= self.spdiameter {
            return 0.0;
        }
        let x = r / self.spdiameter;
        1.0 - 1.5 * x + 0.5 * x.powi(3)
    }

    fn clone_boxed(&self) -> Box<dyn PdfEnvelope> {
        Box::new(self.clone())
    }
}

/// Hard cutoff that zeroes the PDF beyond a distance.
/// A non-positive cutoff disables the correction.
#[derive(Debug, Clone, Default)]
pub struct StepCutEnvelope {
    stepcut: f64,
}

impl StepCutEnvelope {
    /// Create an envelope cutting at `stepcut` Å
    pub fn new(stepcut: f64) -> Result<Self> {
        if !stepcut.is_finite() {
            return Err(Error::Configuration(format!(
                "step cutoff must be finite, got {}",
                stepcut
            )));
        }
        Ok(Self { stepcut })
    }
}

impl PdfEnvelope for StepCutEnvelope {
    fn type_name(&self) -> &str {
        "stepcut"
    }

    fn value(&self, r: f64) -> f64 {
        if self.stepcut <= 0.0 || r <= self.stepcut {
            1.0
        } else {
            0.0
        }
    }

    fn clone_boxed(&self) -> Box<dyn PdfEnvelope> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_scale_envelope() {
        let envelope = ScaleEnvelope::new(2.5).unwrap();
        assert_relative_eq!(envelope.value(7.0), 2.5, epsilon = 1e-12);
        assert!(ScaleEnvelope::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_qresolution_damping() {
        let envelope = QResolutionEnvelope::new(0.05).unwrap();
        assert_relative_eq!(envelope.value(0.0), 1.0, epsilon = 1e-12);
        assert!(envelope.value(20.0) < envelope.value(10.0));
        assert_relative_eq!(envelope.value(10.0), (-0.125_f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_spherical_shape_reaches_zero_at_diameter() {
        let envelope = SphericalShapeEnvelope::new(20.0).unwrap();
        assert_relative_eq!(envelope.value(0.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(envelope.value(20.0), 0.0, epsilon = 1e-12);
        assert_relative_eq!(envelope.value(25.0), 0.0, epsilon = 1e-12);
        assert!(envelope.value(10.0) > 0.0 && envelope.value(10.0) < 1.0);

        // disabled for non-positive diameter
        let disabled = SphericalShapeEnvelope::new(0.0).unwrap();
        assert_relative_eq!(disabled.value(100.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_stepcut() {
        let envelope = StepCutEnvelope::new(8.0).unwrap();
        assert_eq!(envelope.value(7.9), 1.0);
        assert_eq!(envelope.value(8.0), 1.0);
        assert_eq!(envelope.value(8.1), 0.0);
    }
}
