/*
MIT License with diffpy.srreal Attribution

Copyright (c) 2026 srreal-rs contributors

Based on or developed using diffpy.srreal
Copyright (c) 2009 Trustees of the Columbia University
in the City of New York. All rights reserved.
*/

//! String-keyed registries of the pluggable calculation strategies
//!
//! Each strategy kind (peak widths, peak profiles, scattering-factor
//! tables, baselines, envelopes) has a process-wide registry mapping
//! type names to constructors. Built-in strategies are registered on
//! first use; callers may add their own with the `register_*`
//! functions and then select them by name on any calculator.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

use crate::errors::{Error, Result};
use crate::pdf::{
    LinearBaseline, PdfBaseline, PdfEnvelope, QResolutionEnvelope, ScaleEnvelope,
    SphericalShapeEnvelope, StepCutEnvelope, ZeroBaseline,
};
use crate::peaks::{
    ConstantPeakWidth, CroppedGaussianProfile, DebyeWallerPeakWidth, GaussianProfile,
    JeongPeakWidth, PeakProfile, PeakWidthModel,
};
use crate::weights::{NeutronScatteringFactors, ScatteringFactorTable, XrayScatteringFactors};

type Constructor<T> = Arc<dyn Fn() -> Box<T> + Send + Sync>;

struct Registry<T: ?Sized> {
    kind: &'static str,
    entries: RwLock<HashMap<String, Constructor<T>>>,
}

impl<T: ?Sized> Registry<T> {
    fn new(kind: &'static str, builtins: Vec<(&str, Constructor<T>)>) -> Self {
        let entries = builtins
            .into_iter()
            .map(|(name, ctor)| (name.to_string(), ctor))
            .collect();
        Self {
            kind,
            entries: RwLock::new(entries),
        }
    }

    fn register(&self, name: &str, constructor: Constructor<T>) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(name.to_string(), constructor);
    }

    fn create(&self, name: &str) -> Result<Box<T>> {
        let entries = self
            .entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match entries.get(name) {
            Some(constructor) => Ok(constructor()),
            None => {
                let mut known: Vec<&str> = entries.keys().map(String::as_str).collect();
                known.sort_unstable();
                Err(Error::Configuration(format!(
                    "unknown {} type '{}'; registered types: {}",
                    self.kind,
                    name,
                    known.join(", ")
                )))
            }
        }
    }

    fn known_types(&self) -> Vec<String> {
        let entries = self
            .entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut names: Vec<String> = entries.keys().cloned().collect();
        names.sort_unstable();
        names
    }
}

static PEAK_WIDTH_MODELS: Lazy<Registry<dyn PeakWidthModel>> = Lazy::new(|| {
    Registry::new(
        "peak width model",
        vec![
            (
                "constant",
                Arc::new(|| Box::new(ConstantPeakWidth::default()) as Box<dyn PeakWidthModel>)
                    as Constructor<dyn PeakWidthModel>,
            ),
            (
                "debye-waller",
                Arc::new(|| Box::new(DebyeWallerPeakWidth::new()) as Box<dyn PeakWidthModel>),
            ),
            (
                "jeong",
                Arc::new(|| Box::new(JeongPeakWidth::default()) as Box<dyn PeakWidthModel>),
            ),
        ],
    )
});

static PEAK_PROFILES: Lazy<Registry<dyn PeakProfile>> = Lazy::new(|| {
    Registry::new(
        "peak profile",
        vec![
            (
                "gaussian",
                Arc::new(|| Box::new(GaussianProfile::new()) as Box<dyn PeakProfile>)
                    as Constructor<dyn PeakProfile>,
            ),
            (
                "croppedgaussian",
                Arc::new(|| Box::new(CroppedGaussianProfile::new()) as Box<dyn PeakProfile>),
            ),
        ],
    )
});

static SCATTERING_FACTOR_TABLES: Lazy<Registry<dyn ScatteringFactorTable>> = Lazy::new(|| {
    Registry::new(
        "scattering factor table",
        vec![
            (
                "xray",
                Arc::new(|| {
                    Box::new(XrayScatteringFactors::new()) as Box<dyn ScatteringFactorTable>
                }) as Constructor<dyn ScatteringFactorTable>,
            ),
            (
                "neutron",
                Arc::new(|| {
                    Box::new(NeutronScatteringFactors::new()) as Box<dyn ScatteringFactorTable>
                }),
            ),
        ],
    )
});

static PDF_BASELINES: Lazy<Registry<dyn PdfBaseline>> = Lazy::new(|| {
    Registry::new(
        "PDF baseline",
        vec![
            (
                "zero",
                Arc::new(|| Box::new(ZeroBaseline::new()) as Box<dyn PdfBaseline>)
                    as Constructor<dyn PdfBaseline>,
            ),
            (
                "linear",
                Arc::new(|| Box::new(LinearBaseline::new()) as Box<dyn PdfBaseline>),
            ),
        ],
    )
});

static PDF_ENVELOPES: Lazy<Registry<dyn PdfEnvelope>> = Lazy::new(|| {
    Registry::new(
        "PDF envelope",
        vec![
            (
                "scale",
                Arc::new(|| Box::new(ScaleEnvelope::default()) as Box<dyn PdfEnvelope>)
                    as Constructor<dyn PdfEnvelope>,
            ),
            (
                "qresolution",
                Arc::new(|| Box::new(QResolutionEnvelope::default()) as Box<dyn PdfEnvelope>),
            ),
            (
                "sphericalshape",
                Arc::new(|| Box::new(SphericalShapeEnvelope::default()) as Box<dyn PdfEnvelope>),
            ),
            (
                "stepcut",
                Arc::new(|| Box::new(StepCutEnvelope::default()) as Box<dyn PdfEnvelope>),
            ),
        ],
    )
});

/// Register a peak-width model constructor under a type name,
/// replacing any previous entry with that name
pub fn register_peak_width_model<F>(name: &str, constructor: F)
where
    F: Fn() -> Box<dyn PeakWidthModel> + Send + Sync + 'static,
{
    PEAK_WIDTH_MODELS.register(name, Arc::new(constructor));
}

/// Construct a registered peak-width model by type name
pub fn create_peak_width_model(name: &str) -> Result<Box<dyn PeakWidthModel>> {
    PEAK_WIDTH_MODELS.create(name)
}

/// Registered peak-width model type names, sorted
pub fn peak_width_model_types() -> Vec<String> {
    PEAK_WIDTH_MODELS.known_types()
}

/// Register a peak-profile constructor under a type name
pub fn register_peak_profile<F>(name: &str, constructor: F)
where
    F: Fn() -> Box<dyn PeakProfile> + Send + Sync + 'static,
{
    PEAK_PROFILES.register(name, Arc::new(constructor));
}

/// Construct a registered peak profile by type name
pub fn create_peak_profile(name: &str) -> Result<Box<dyn PeakProfile>> {
    PEAK_PROFILES.create(name)
}

/// Registered peak-profile type names, sorted
pub fn peak_profile_types() -> Vec<String> {
    PEAK_PROFILES.known_types()
}

/// Register a scattering-factor table constructor under a type name
pub fn register_scattering_factor_table<F>(name: &str, constructor: F)
where
    F: Fn() -> Box<dyn ScatteringFactorTable> + Send + Sync + 'static,
{
    SCATTERING_FACTOR_TABLES.register(name, Arc::new(constructor));
}

/// Construct a registered scattering-factor table by type name
pub fn create_scattering_factor_table(name: &str) -> Result<Box<dyn ScatteringFactorTable>> {
    SCATTERING_FACTOR_TABLES.create(name)
}

/// Registered scattering-factor table type names, sorted
pub fn scattering_factor_table_types() -> Vec<String> {
    SCATTERING_FACTOR_TABLES.known_types()
}

/// Register a baseline constructor under a type name
pub fn register_pdf_baseline<F>(name: &str, constructor: F)
where
    F: Fn() -> Box<dyn PdfBaseline> + Send + Sync + 'static,
{
    PDF_BASELINES.register(name, Arc::new(constructor));
}

/// Construct a registered baseline by type name
pub fn create_pdf_baseline(name: &str) -> Result<Box<dyn PdfBaseline>> {
    PDF_BASELINES.create(name)
}

/// Registered baseline type names, sorted
pub fn pdf_baseline_types() -> Vec<String> {
    PDF_BASELINES.known_types()
}

/// Register an envelope constructor under a type name
pub fn register_pdf_envelope<F>(name: &str, constructor: F)
where
    F: Fn() -> Box<dyn PdfEnvelope> + Send + Sync + 'static,
{
    PDF_ENVELOPES.register(name, Arc::new(constructor));
}

/// Construct a registered envelope by type name
pub fn create_pdf_envelope(name: &str) -> Result<Box<dyn PdfEnvelope>> {
    PDF_ENVELOPES.create(name)
}

/// Registered envelope type names, sorted
pub fn pdf_envelope_types() -> Vec<String> {
    PDF_ENVELOPES.known_types()
}
