/*
MIT License with diffpy.srreal Attribution

Copyright (c) 2026 srreal-rs contributors

Based on or developed using diffpy.srreal
Copyright (c) 2009 Trustees of the Columbia University
in the City of New York. All rights reserved.
*/

//! Real-space PDF calculation: calculator, baselines and envelopes

mod baseline;
mod calculator;
mod envelope;

pub use baseline::{LinearBaseline, PdfBaseline, ZeroBaseline};
pub use calculator::{PdfCalculator, PdfCalculatorConfig};
pub use envelope::{
    PdfEnvelope, QResolutionEnvelope, ScaleEnvelope, SphericalShapeEnvelope, StepCutEnvelope,
};
