/*
MIT License with diffpy.srreal Attribution

Copyright (c) 2026 srreal-rs contributors

Based on or developed using diffpy.srreal
Copyright (c) 2009 Trustees of the Columbia University
in the City of New York. All rights reserved.
*/

//! Peak-width and peak-shape strategies for pair broadening

mod profile;
mod width;

pub use profile::{CroppedGaussianProfile, GaussianProfile, PeakProfile};
pub use width::{ConstantPeakWidth, DebyeWallerPeakWidth, JeongPeakWidth, PeakWidthModel};
