/*
MIT License with diffpy.srreal Attribution

Copyright (c) 2026 srreal-rs contributors

Based on or developed using diffpy.srreal
Copyright (c) 2009 Trustees of the Columbia University
in the City of New York. All rights reserved.
*/

//! Numerical tolerances and physical constants used across the crate
//!
//! The tie-break constants below are part of the documented behavior:
//! tests rely on them and they must not drift between components.

/// Tolerance for including a bond at the cutoff edge, in Å.
///
/// A bond participates in a pair sum iff
/// `rmin - DISTANCE_EPSILON <= d <= rmax + DISTANCE_EPSILON`.
/// The same constant deduplicates periodic images that land exactly on
/// the cutoff sphere.
pub const DISTANCE_EPSILON: f64 = 1e-8;

/// Bonds shorter than this are treated as a site paired with itself
/// and are excluded from enumeration.
pub const MIN_BOND_DISTANCE: f64 = 1e-8;

/// Tie-break used when deriving a grid length from (min, max, step):
/// `len = floor((max - min) / step + GRID_EPSILON) + 1`, so a maximum
/// that lands exactly on a grid point is always included.
pub const GRID_EPSILON: f64 = 1e-8;

/// Peak widths at or below this value degenerate to a spike deposited
/// on the two grid points bracketing the peak center.
pub const WIDTH_EPSILON: f64 = 1e-12;

/// Default relative-amplitude floor bounding a peak profile's support.
pub const DEFAULT_PEAK_PRECISION: f64 = 3.33e-6;

/// Default padding of the internal calculation range beyond
/// [rmin, rmax], in Å, so that peaks centered just outside the
/// requested range still contribute their tails.
pub const DEFAULT_PEAK_EXTENSION: f64 = 2.0;
