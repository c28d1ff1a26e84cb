/*
MIT License with diffpy.srreal Attribution

Copyright (c) 2026 srreal-rs contributors

Based on or developed using diffpy.srreal
Copyright (c) 2009 Trustees of the Columbia University
in the City of New York. All rights reserved.
*/

//! Evenly spaced output grid for distance and momentum-transfer axes

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::constants::GRID_EPSILON;
use crate::errors::{Error, Result};

/// An ordered, evenly spaced coordinate grid.
///
/// Grid points are `min + k * step` for `k in 0..len`. The length rule
/// is `floor((max - min) / step + GRID_EPSILON) + 1`, so a maximum
/// landing exactly on a grid point is included and never flaps due to
/// floating-point rounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    min: f64,
    step: f64,
    len: usize,
}

impl Grid {
    /// Create a grid spanning [min, max] with the given step.
    ///
    /// Fails with a range error for a non-positive step or an empty
    /// span.
    pub fn from_range(min: f64, max: f64, step: f64) -> Result<Self> {
        if !(min.is_finite() && max.is_finite() && step.is_finite()) || step <= 0.0 {
            return Err(Error::Range(format!(
                "invalid grid specification: min {}, max {}, step {}",
                min, max, step
            )));
        }
        if max < min {
            return Err(Error::Range(format!(
                "grid maximum {} below minimum {}",
                max, min
            )));
        }
        let len = ((max - min) / step + GRID_EPSILON).floor() as usize + 1;
        Ok(Self { min, step, len })
    }

    /// First grid point
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Grid spacing
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Last grid point
    pub fn max(&self) -> f64 {
        self.point(self.len - 1)
    }

    /// Number of grid points
    pub fn len(&self) -> usize {
        self.len
    }

    /// True for a zero-length grid (never produced by `from_range`)
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Coordinate of point `k`
    pub fn point(&self, k: usize) -> f64 {
        self.min + self.step * k as f64
    }

    /// All grid points as an array
    pub fn points(&self) -> Array1<f64> {
        Array1::from_iter((0..self.len).map(|k| self.point(k)))
    }

    /// Fractional grid index of coordinate `x`
    pub fn fractional_index(&self, x: f64) -> f64 {
        (x - self.min) / self.step
    }

    /// Indices of the grid points inside [lo, hi], clipped to the
    /// grid; `None` when the window misses the grid entirely.
    pub fn window(&self, lo: f64, hi: f64) -> Option<(usize, usize)> {
        if hi < self.min || lo > self.max() {
            return None;
        }
        let first = (self.fractional_index(lo).ceil().max(0.0)) as usize;
        let last = (self.fractional_index(hi).floor() as usize).min(self.len - 1);
        if first > last {
            return None;
        }
        Some((first, last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_length_rule() {
        // exact span: endpoint included
        let grid = Grid::from_range(0.0, 10.0, 0.01).unwrap();
        assert_eq!(grid.len(), 1001);
        assert_relative_eq!(grid.max(), 10.0, epsilon = 1e-12);

        // span just short of a full step still rounds down
        let grid = Grid::from_range(0.0, 0.99, 0.1).unwrap();
        assert_eq!(grid.len(), 10);

        // degenerate single-point grid
        let grid = Grid::from_range(2.0, 2.0, 0.5).unwrap();
        assert_eq!(grid.len(), 1);
        assert_relative_eq!(grid.point(0), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_ranges() {
        assert!(Grid::from_range(0.0, 10.0, 0.0).is_err());
        assert!(Grid::from_range(0.0, 10.0, -0.1).is_err());
        assert!(Grid::from_range(5.0, 1.0, 0.1).is_err());
        assert!(Grid::from_range(0.0, f64::INFINITY, 0.1).is_err());
    }

    #[test]
    fn test_window() {
        let grid = Grid::from_range(1.0, 5.0, 0.5).unwrap();
        assert_eq!(grid.window(2.1, 3.4), Some((3, 4)));
        assert_eq!(grid.window(0.0, 10.0), Some((0, 8)));
        assert_eq!(grid.window(5.4, 9.0), None);
        assert_eq!(grid.window(2.05, 2.15), None);
    }

    #[test]
    fn test_points() {
        let grid = Grid::from_range(0.0, 1.0, 0.25).unwrap();
        let points = grid.points();
        assert_eq!(points.len(), 5);
        assert_relative_eq!(points[3], 0.75, epsilon = 1e-12);
    }
}
