/*
MIT License with diffpy.srreal Attribution

Copyright (c) 2026 srreal-rs contributors

Based on or developed using diffpy.srreal
Copyright (c) 2009 Trustees of the Columbia University
in the City of New York. All rights reserved.
*/

//! Bond enumeration over periodic and aperiodic structures

mod generator;

pub use generator::{Bond, BondGenerator, BondIter};
