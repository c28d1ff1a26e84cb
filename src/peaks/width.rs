/*
MIT License with diffpy.srreal Attribution

Copyright (c) 2026 srreal-rs contributors

Based on or developed using diffpy.srreal
Copyright (c) 2009 Trustees of the Columbia University
in the City of New York. All rights reserved.
*/

//! Peak-width strategies
//!
//! A peak-width model turns a bond plus the displacement data of its
//! two sites into a Gaussian standard deviation in Å. Widths are
//! always non-negative.

use crate::bonds::Bond;
use crate::errors::{Error, Result};
use crate::structure::{StructureAdapter, Vector3D};

/// Strategy computing the broadening width of one bond.
///
/// Implementations are read-only during evaluation and cloneable so
/// every calculator owns a private copy; two calculators never share
/// a mutable model by accident.
pub trait PeakWidthModel: Send + Sync {
    /// Stable registry identifier, e.g. "constant"
    fn type_name(&self) -> &str;

    /// Peak width (standard deviation, Å) for one bond; >= 0
    fn calculate(&self, bond: &Bond, structure: &dyn StructureAdapter) -> Result<f64>;

    /// Clone into an owning box
    fn clone_boxed(&self) -> Box<dyn PeakWidthModel>;
}

impl Clone for Box<dyn PeakWidthModel> {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

impl std::fmt::Debug for dyn PeakWidthModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PeakWidthModel({})", self.type_name())
    }
}

/// The same width for every bond
#[derive(Debug, Clone)]
pub struct ConstantPeakWidth {
    width: f64,
}

impl ConstantPeakWidth {
    /// Create a constant-width model; the width must be non-negative
    pub fn new(width: f64) -> Result<Self> {
        if !width.is_finite() || width < 0.0 {
            return Err(Error::Configuration(format!(
                "peak width must be non-negative, got {}",
                width
            )));
        }
        Ok(Self { width })
    }

    /// The configured width in Å
    pub fn width(&self) -> f64 {
        self.width
    }
}

impl Default for ConstantPeakWidth {
    fn default() -> Self {
        Self { width: 0.1 }
    }
}

impl PeakWidthModel for ConstantPeakWidth {
    fn type_name(&self) -> &str {
        "constant"
    }

    fn calculate(&self, _bond: &Bond, _structure: &dyn StructureAdapter) -> Result<f64> {
        Ok(self.width)
    }

    fn clone_boxed(&self) -> Box<dyn PeakWidthModel> {
        Box::new(self.clone())
    }
}

/// Mean-square displacement of site `i` projected on a direction.
///
/// Uses the anisotropic Cartesian tensor when the structure carries
/// one, the isotropic Uiso otherwise.
fn projected_msd(structure: &dyn StructureAdapter, i: usize, direction: &Vector3D) -> f64 {
    match structure.displacement_tensor(i) {
        Some(u) => {
            let d = [direction.x, direction.y, direction.z];
            let mut msd = 0.0;
            for (row, &di) in u.iter().zip(&d) {
                for (&uij, &dj) in row.iter().zip(&d) {
                    msd += di * uij * dj;
                }
            }
            msd.max(0.0)
        }
        None => structure.uiso(i),
    }
}

/// Width from the displacement parameters of the two bonded sites.
///
/// The pair variance is the sum of both sites' mean-square
/// displacements projected on the bond direction; correlated motion is
/// not modeled here (see [`JeongPeakWidth`] for the empirical
/// correction).
#[derive(Debug, Clone, Default)]
pub struct DebyeWallerPeakWidth;

impl DebyeWallerPeakWidth {
    /// Create the Debye-Waller width model
    pub fn new() -> Self {
        Self
    }

    /// Pair variance sigma² for one bond in Å²
    pub fn pair_variance(bond: &Bond, structure: &dyn StructureAdapter) -> f64 {
        let msd0 = projected_msd(structure, bond.site0, &bond.direction);
        let msd1 = projected_msd(structure, bond.site1, &bond.direction);
        (msd0 + msd1).max(0.0)
    }
}

impl PeakWidthModel for DebyeWallerPeakWidth {
    fn type_name(&self) -> &str {
        "debye-waller"
    }

    fn calculate(&self, bond: &Bond, structure: &dyn StructureAdapter) -> Result<f64> {
        Ok(Self::pair_variance(bond, structure).sqrt())
    }

    fn clone_boxed(&self) -> Box<dyn PeakWidthModel> {
        Box::new(self.clone())
    }
}

/// Debye-Waller width sharpened by empirical correlated-motion
/// parameters.
///
/// sigma(r) = sigma_DW * sqrt(1 - delta1/r - delta2/r² + qbroad²·r²),
/// clamped at zero when the correction term goes negative at short r.
#[derive(Debug, Clone, Default)]
pub struct JeongPeakWidth {
    delta1: f64,
    delta2: f64,
    qbroad: f64,
}

impl JeongPeakWidth {
    /// Create a model with the given sharpening coefficients
    /// (delta1 in Å, delta2 in Å², qbroad in Å⁻¹)
    pub fn new(delta1: f64, delta2: f64, qbroad: f64) -> Result<Self> {
        if qbroad < 0.0 {
            return Err(Error::Configuration(format!(
                "qbroad must be non-negative, got {}",
                qbroad
            )));
        }
        Ok(Self {
            delta1,
            delta2,
            qbroad,
        })
    }

    /// Low-r sharpening coefficient delta1 in Å
    pub fn delta1(&self) -> f64 {
        self.delta1
    }

    /// Low-r sharpening coefficient delta2 in Å²
    pub fn delta2(&self) -> f64 {
        self.delta2
    }

    /// Resolution broadening coefficient in Å⁻¹
    pub fn qbroad(&self) -> f64 {
        self.qbroad
    }
}

impl PeakWidthModel for JeongPeakWidth {
    fn type_name(&self) -> &str {
        "jeong"
    }

    fn calculate(&self, bond: &Bond, structure: &dyn StructureAdapter) -> Result<f64> {
        let r = bond.distance;
        let variance = DebyeWallerPeakWidth::pair_variance(bond, structure);
        let correction =
            1.0 - self.delta1 / r - self.delta2 / (r * r) + self.qbroad * self.qbroad * r * r;
        Ok((variance * correction.max(0.0)).sqrt())
    }

    fn clone_boxed(&self) -> Box<dyn PeakWidthModel> {
        Box::new(self.clone())
    }
}
