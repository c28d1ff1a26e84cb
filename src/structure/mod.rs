/*
MIT License with diffpy.srreal Attribution

Copyright (c) 2026 srreal-rs contributors

Based on or developed using diffpy.srreal
Copyright (c) 2009 Trustees of the Columbia University
in the City of New York. All rights reserved.
*/

//! Structure model abstraction: adapter trait, built-in structure
//! type, lattice and vector math

mod adapter;
mod lattice;
mod vector;

pub use adapter::{AtomSite, AtomicStructure, StructureAdapter};
pub use lattice::Lattice;
pub use vector::Vector3D;
