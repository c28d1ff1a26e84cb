/*
MIT License with diffpy.srreal Attribution

Copyright (c) 2026 srreal-rs contributors

Based on or developed using diffpy.srreal
Copyright (c) 2009 Trustees of the Columbia University
in the City of New York. All rights reserved.
*/

//! Periodic lattice for crystal structures

use serde::{Deserialize, Serialize};

use super::vector::Vector3D;
use crate::errors::{Error, Result};

/// A periodic lattice defined by three Cartesian basis vectors.
///
/// Rows of the basis are the cell edges a, b, c in Å.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    basis: [[f64; 3]; 3],
}

impl Lattice {
    /// Create a lattice from three Cartesian basis vectors.
    ///
    /// Fails with a structure error when the cell volume is
    /// numerically zero.
    pub fn new(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> Result<Self> {
        let lattice = Self { basis: [a, b, c] };
        if lattice.volume() < 1e-12 {
            return Err(Error::Structure(
                "degenerate lattice with zero cell volume".to_string(),
            ));
        }
        Ok(lattice)
    }

    /// Create a cubic lattice with edge length `a`
    pub fn cubic(a: f64) -> Result<Self> {
        Self::new([a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a])
    }

    /// Create an orthorhombic lattice with edge lengths `a`, `b`, `c`
    pub fn orthorhombic(a: f64, b: f64, c: f64) -> Result<Self> {
        Self::new([a, 0.0, 0.0], [0.0, b, 0.0], [0.0, 0.0, c])
    }

    /// Basis vector for axis 0, 1 or 2
    pub fn axis(&self, i: usize) -> Vector3D {
        let [x, y, z] = self.basis[i];
        Vector3D::new(x, y, z)
    }

    /// Cell volume in Å³
    pub fn volume(&self) -> f64 {
        self.determinant().abs()
    }

    /// Signed triple product of the basis vectors
    fn determinant(&self) -> f64 {
        let a = self.axis(0);
        let b = self.axis(1);
        let c = self.axis(2);
        a.dot(&b.cross(&c))
    }

    /// Convert fractional coordinates to a Cartesian position
    pub fn cartesian(&self, fractional: [f64; 3]) -> Vector3D {
        self.axis(0) * fractional[0] + self.axis(1) * fractional[1] + self.axis(2) * fractional[2]
    }

    /// Fractional coordinates of a Cartesian position
    pub fn fractional(&self, position: Vector3D) -> [f64; 3] {
        let det = self.determinant();
        let mut fractional = [0.0; 3];
        for (i, f) in fractional.iter_mut().enumerate() {
            let reciprocal = self.axis((i + 1) % 3).cross(&self.axis((i + 2) % 3));
            *f = position.dot(&reciprocal) / det;
        }
        fractional
    }

    /// Equivalent Cartesian position with fractional coordinates
    /// reduced into [0, 1)
    pub fn wrap(&self, position: Vector3D) -> Vector3D {
        let fractional = self.fractional(position);
        self.cartesian([
            fractional[0].rem_euclid(1.0),
            fractional[1].rem_euclid(1.0),
            fractional[2].rem_euclid(1.0),
        ])
    }

    /// Perpendicular spacing between lattice planes normal to axis `i`.
    ///
    /// Used to bound how many periodic images along each axis can fall
    /// inside a cutoff sphere.
    pub fn plane_spacing(&self, i: usize) -> f64 {
        let b = self.axis((i + 1) % 3);
        let c = self.axis((i + 2) % 3);
        let cross_area = b.cross(&c).length();
        if cross_area < 1e-12 {
            return 0.0;
        }
        self.volume() / cross_area
    }

    /// Smallest number of image repeats per axis that covers a sphere
    /// of radius `cutoff` around any point of the cell.
    pub fn image_bounds(&self, cutoff: f64) -> [i32; 3] {
        let mut bounds = [0i32; 3];
        for (i, bound) in bounds.iter_mut().enumerate() {
            let spacing = self.plane_spacing(i);
            *bound = if spacing > 0.0 {
                (cutoff / spacing).ceil() as i32
            } else {
                0
            };
        }
        bounds
    }
}
