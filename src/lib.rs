/*
MIT License with diffpy.srreal Attribution

Copyright (c) 2026 srreal-rs contributors

Based on or developed using diffpy.srreal
Copyright (c) 2009 Trustees of the Columbia University
in the City of New York. All rights reserved.
*/

//! # srreal-rs
//!
//! Pair distribution function (PDF) calculators and related pair
//! quantities for atomic structures.
//!
//! The crate evaluates real-space PDFs by direct summation over atom
//! pairs ([`pdf::PdfCalculator`]), reciprocal-space PDFs through the
//! Debye scattering equation ([`debye::DebyePdfCalculator`]), and bond
//! valence sums ([`bvs::BondValenceCalculator`]). All calculators run
//! on any structure exposed through the
//! [`structure::StructureAdapter`] trait, periodic or not, and share
//! the same accumulation protocol so they evaluate serially or across
//! a rayon worker pool with identical results.
//!
//! ```
//! use srreal_rs::pdf::PdfCalculator;
//! use srreal_rs::structure::{AtomSite, AtomicStructure, Lattice, Vector3D};
//!
//! # fn main() -> srreal_rs::Result<()> {
//! let mut crystal = AtomicStructure::with_lattice(Lattice::cubic(3.52)?);
//! crystal.add_site_fractional(AtomSite::new("Ni", Vector3D::zero()), [0.0, 0.0, 0.0])?;
//! crystal.add_site_fractional(AtomSite::new("Ni", Vector3D::zero()), [0.5, 0.5, 0.0])?;
//! crystal.add_site_fractional(AtomSite::new("Ni", Vector3D::zero()), [0.5, 0.0, 0.5])?;
//! crystal.add_site_fractional(AtomSite::new("Ni", Vector3D::zero()), [0.0, 0.5, 0.5])?;
//!
//! let mut calc = PdfCalculator::new();
//! let pdf = calc.eval(&crystal)?;
//! assert_eq!(pdf.len(), calc.rgrid()?.len());
//! # Ok(())
//! # }
//! ```

pub mod bonds;
pub mod bvs;
pub mod constants;
pub mod debye;
pub mod errors;
pub mod pdf;
pub mod peaks;
pub mod quantity;
pub mod registry;
pub mod structure;
pub mod weights;

pub use errors::{Error, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
