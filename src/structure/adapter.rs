/*
MIT License with diffpy.srreal Attribution

Copyright (c) 2026 srreal-rs contributors

Based on or developed using diffpy.srreal
Copyright (c) 2009 Trustees of the Columbia University
in the City of New York. All rights reserved.
*/

//! Read-only structure view consumed by the pair-quantity engine
//!
//! Calculators never hold a concrete structure type; they see atoms
//! through the [`StructureAdapter`] trait so that any host
//! representation can be plugged in. [`AtomicStructure`] is the
//! built-in adapter used directly and by the test suites.

use serde::{Deserialize, Serialize};

use super::lattice::Lattice;
use super::vector::Vector3D;
use crate::errors::{Error, Result};

/// Read-only view of an atomic structure model.
///
/// Implementations must be cheap to query per site; the bond generator
/// calls these accessors inside its enumeration loop. All methods are
/// immutable and the trait requires `Send + Sync` so one adapter can be
/// shared across evaluation workers.
pub trait StructureAdapter: Send + Sync {
    /// Number of atom sites in the model
    fn count_sites(&self) -> usize;

    /// Cartesian position of site `i` in Å
    fn position(&self, i: usize) -> Vector3D;

    /// Occupancy of site `i`, in [0, 1]
    fn occupancy(&self, i: usize) -> f64;

    /// Species identifier of site `i`, an element symbol with an
    /// optional ionic charge suffix, e.g. "Na", "Na+", "O2-"
    fn species(&self, i: usize) -> &str;

    /// Isotropic mean-square displacement Uiso of site `i` in Å²
    fn uiso(&self, i: usize) -> f64;

    /// Anisotropic Cartesian displacement tensor of site `i` in Å²,
    /// when the model carries one
    fn displacement_tensor(&self, _i: usize) -> Option<[[f64; 3]; 3]> {
        None
    }

    /// Periodic lattice, or `None` for an aperiodic (molecular) model
    fn lattice(&self) -> Option<&Lattice> {
        None
    }

    /// Multiplicity of a symmetry-compressed site; 1 for fully
    /// expanded models
    fn site_multiplicity(&self, _i: usize) -> f64 {
        1.0
    }

    /// Occupancy-weighted number of atoms represented by the model
    fn total_occupancy(&self) -> f64 {
        (0..self.count_sites())
            .map(|i| self.occupancy(i) * self.site_multiplicity(i))
            .sum()
    }

    /// Number density in atoms/Å³ for periodic models, `None` for
    /// aperiodic ones
    fn num_density(&self) -> Option<f64> {
        self.lattice()
            .map(|lattice| self.total_occupancy() / lattice.volume())
    }

    /// Check the model for data the pair sum cannot digest.
    ///
    /// The default implementation rejects out-of-range occupancies,
    /// negative displacement parameters and non-finite positions.
    fn validate(&self) -> Result<()> {
        for i in 0..self.count_sites() {
            let occupancy = self.occupancy(i);
            if !(0.0..=1.0).contains(&occupancy) {
                return Err(Error::Structure(format!(
                    "site {} has occupancy {} outside [0, 1]",
                    i, occupancy
                )));
            }
            if self.uiso(i) < 0.0 {
                return Err(Error::Structure(format!(
                    "site {} has negative displacement parameter",
                    i
                )));
            }
            let p = self.position(i);
            if !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()) {
                return Err(Error::Structure(format!(
                    "site {} has a non-finite position",
                    i
                )));
            }
        }
        Ok(())
    }
}

/// A single atom site of an [`AtomicStructure`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtomSite {
    /// Species identifier, e.g. "Cu" or "O2-"
    species: String,
    /// Cartesian position in Å
    position: Vector3D,
    /// Site occupancy in [0, 1]
    occupancy: f64,
    /// Isotropic mean-square displacement in Å²
    uiso: f64,
    /// Optional anisotropic Cartesian displacement tensor in Å²
    uaniso: Option<[[f64; 3]; 3]>,
    /// Symmetry multiplicity of the site
    multiplicity: f64,
}

impl AtomSite {
    /// Create a fully occupied, static site
    pub fn new(species: &str, position: Vector3D) -> Self {
        Self {
            species: species.to_string(),
            position,
            occupancy: 1.0,
            uiso: 0.0,
            uaniso: None,
            multiplicity: 1.0,
        }
    }

    /// Set the site occupancy
    pub fn with_occupancy(mut self, occupancy: f64) -> Self {
        self.occupancy = occupancy;
        self
    }

    /// Set the isotropic displacement parameter Uiso in Å²
    pub fn with_uiso(mut self, uiso: f64) -> Self {
        self.uiso = uiso;
        self
    }

    /// Set an anisotropic Cartesian displacement tensor in Å².
    /// The isotropic equivalent is kept as the tensor trace / 3.
    pub fn with_uaniso(mut self, uaniso: [[f64; 3]; 3]) -> Self {
        self.uiso = (uaniso[0][0] + uaniso[1][1] + uaniso[2][2]) / 3.0;
        self.uaniso = Some(uaniso);
        self
    }

    /// Set the symmetry multiplicity
    pub fn with_multiplicity(mut self, multiplicity: f64) -> Self {
        self.multiplicity = multiplicity;
        self
    }

    /// Species identifier
    pub fn species(&self) -> &str {
        &self.species
    }

    /// Cartesian position in Å
    pub fn position(&self) -> Vector3D {
        self.position
    }
}

/// Built-in structure adapter for molecular and periodic models
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AtomicStructure {
    sites: Vec<AtomSite>,
    lattice: Option<Lattice>,
}

impl AtomicStructure {
    /// Create an empty aperiodic (molecular) structure
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty periodic structure on the given lattice
    pub fn with_lattice(lattice: Lattice) -> Self {
        Self {
            sites: Vec::new(),
            lattice: Some(lattice),
        }
    }

    /// Add a site with a Cartesian position; returns its index
    pub fn add_site(&mut self, site: AtomSite) -> usize {
        self.sites.push(site);
        self.sites.len() - 1
    }

    /// Add a site at fractional coordinates of the lattice.
    ///
    /// Fails with a configuration error when the structure is
    /// aperiodic.
    pub fn add_site_fractional(&mut self, site: AtomSite, fractional: [f64; 3]) -> Result<usize> {
        let lattice = self.lattice.ok_or_else(|| {
            Error::Configuration(
                "fractional coordinates need a lattice; use add_site for molecular models"
                    .to_string(),
            )
        })?;
        let mut site = site;
        site.position = lattice.cartesian(fractional);
        Ok(self.add_site(site))
    }

    /// Access a site by index
    pub fn site(&self, i: usize) -> Option<&AtomSite> {
        self.sites.get(i)
    }

    /// All sites
    pub fn sites(&self) -> &[AtomSite] {
        &self.sites
    }
}

impl StructureAdapter for AtomicStructure {
    fn count_sites(&self) -> usize {
        self.sites.len()
    }

    fn position(&self, i: usize) -> Vector3D {
        self.sites[i].position
    }

    fn occupancy(&self, i: usize) -> f64 {
        self.sites[i].occupancy
    }

    fn species(&self, i: usize) -> &str {
        &self.sites[i].species
    }

    fn uiso(&self, i: usize) -> f64 {
        self.sites[i].uiso
    }

    fn displacement_tensor(&self, i: usize) -> Option<[[f64; 3]; 3]> {
        self.sites[i].uaniso
    }

    fn lattice(&self) -> Option<&Lattice> {
        self.lattice.as_ref()
    }

    fn site_multiplicity(&self, i: usize) -> f64 {
        self.sites[i].multiplicity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rock_salt() -> AtomicStructure {
        let mut structure = AtomicStructure::with_lattice(Lattice::cubic(5.64).unwrap());
        let na = AtomSite::new("Na+", Vector3D::zero()).with_uiso(0.005);
        let cl = AtomSite::new("Cl-", Vector3D::zero()).with_uiso(0.005);
        for frac in [
            [0.0, 0.0, 0.0],
            [0.5, 0.5, 0.0],
            [0.5, 0.0, 0.5],
            [0.0, 0.5, 0.5],
        ] {
            structure.add_site_fractional(na.clone(), frac).unwrap();
        }
        for frac in [
            [0.5, 0.0, 0.0],
            [0.0, 0.5, 0.0],
            [0.0, 0.0, 0.5],
            [0.5, 0.5, 0.5],
        ] {
            structure.add_site_fractional(cl.clone(), frac).unwrap();
        }
        structure
    }

    #[test]
    fn test_periodic_structure() {
        let structure = rock_salt();
        assert_eq!(structure.count_sites(), 8);
        assert_relative_eq!(structure.total_occupancy(), 8.0, epsilon = 1e-12);
        let rho0 = structure.num_density().unwrap();
        assert_relative_eq!(rho0, 8.0 / 5.64_f64.powi(3), epsilon = 1e-12);
        assert!(structure.validate().is_ok());
    }

    #[test]
    fn test_molecular_structure_has_no_density() {
        let mut molecule = AtomicStructure::new();
        molecule.add_site(AtomSite::new("C", Vector3D::zero()));
        molecule.add_site(AtomSite::new("O", Vector3D::new(1.13, 0.0, 0.0)));
        assert!(molecule.lattice().is_none());
        assert!(molecule.num_density().is_none());
        assert!(molecule.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_occupancy() {
        let mut structure = AtomicStructure::new();
        structure.add_site(AtomSite::new("Cu", Vector3D::zero()).with_occupancy(-0.25));
        assert!(matches!(
            structure.validate(),
            Err(crate::errors::Error::Structure(_))
        ));
    }

    #[test]
    fn test_fractional_site_needs_lattice() {
        let mut molecule = AtomicStructure::new();
        let result = molecule.add_site_fractional(AtomSite::new("C", Vector3D::zero()), [0.5; 3]);
        assert!(result.is_err());
    }

    #[test]
    fn test_uaniso_sets_isotropic_equivalent() {
        let site = AtomSite::new("Ti", Vector3D::zero()).with_uaniso([
            [0.006, 0.0, 0.0],
            [0.0, 0.009, 0.0],
            [0.0, 0.0, 0.003],
        ]);
        let mut structure = AtomicStructure::new();
        structure.add_site(site);
        assert_relative_eq!(structure.uiso(0), 0.006, epsilon = 1e-12);
        assert!(structure.displacement_tensor(0).is_some());
    }
}
