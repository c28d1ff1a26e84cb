/*
MIT License with diffpy.srreal Attribution

Copyright (c) 2026 srreal-rs contributors

Based on or developed using diffpy.srreal
Copyright (c) 2009 Trustees of the Columbia University
in the City of New York. All rights reserved.
*/

//! Error types shared by all pair-quantity calculators

/// Error kinds reported by structure adapters, bond generators,
/// strategy objects and calculators.
///
/// Evaluation is atomic: a calculator either returns a fully consistent
/// (grid, values) pair or fails with one of these kinds, never with a
/// partially accumulated curve.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed structure data, e.g. negative occupancy or a
    /// degenerate lattice.
    #[error("Invalid structure: {0}")]
    Structure(String),

    /// Missing or incompatible strategy selection, or an unknown
    /// strategy type name requested from a registry.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Non-finite value detected during accumulation.
    #[error("Numeric error: {0}")]
    Numeric(String),

    /// Requested grid bounds produce an empty or negative-length grid.
    #[error("Invalid range: {0}")]
    Range(String),

    /// Evaluation was cancelled through an abort signal; the
    /// accumulator has been reset to its pre-evaluation state.
    #[error("Evaluation interrupted before completion")]
    Interrupted,
}

/// Result type for calculator operations
pub type Result<T> = std::result::Result<T, Error>;
