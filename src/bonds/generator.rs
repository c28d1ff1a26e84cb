/*
MIT License with diffpy.srreal Attribution

Copyright (c) 2026 srreal-rs contributors

Based on or developed using diffpy.srreal
Copyright (c) 2009 Trustees of the Columbia University
in the City of New York. All rights reserved.
*/

//! Lazy, restartable enumeration of atom pairs within a cutoff
//!
//! The generator yields every ordered pair (i, j) with
//! `0 < d <= rmax`, covering all periodic images that can fall inside
//! the cutoff sphere when the structure reports a lattice. Iteration
//! order is fixed by site and image indices, so repeated passes
//! produce the identical bond sequence — calculators rely on this for
//! reproducible re-evaluation.

use log::debug;

use crate::constants::{DISTANCE_EPSILON, MIN_BOND_DISTANCE};
use crate::errors::{Error, Result};
use crate::structure::{StructureAdapter, Vector3D};

/// A single ordered atom-pair observation.
///
/// Bonds are produced transiently during enumeration and consumed
/// immediately by the accumulator; they are never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bond {
    /// Pair distance in Å, always positive
    pub distance: f64,
    /// Unit vector from site0 towards site1 (including image shift)
    pub direction: Vector3D,
    /// Index of the anchor site
    pub site0: usize,
    /// Index of the partner site
    pub site1: usize,
    /// Symmetry multiplicity inherited from the anchor site
    pub multiplicity: f64,
    /// Product of the two site occupancies
    pub occupancy_product: f64,
}

/// Enumerates bonds of one structure up to a distance cutoff.
///
/// The generator owns no mutable state; [`BondGenerator::iter`]
/// returns a fresh pass every time.
pub struct BondGenerator<'a> {
    structure: &'a dyn StructureAdapter,
    rmin: f64,
    rmax: f64,
    anchors: Option<Vec<usize>>,
    /// Site positions wrapped into the unit cell for periodic
    /// structures; the image-shift bounds assume every site lies
    /// inside one cell, so out-of-cell positions must be reduced or
    /// their distant images would be missed.
    positions: Vec<Vector3D>,
    /// Cartesian shifts of every lattice image that can reach into the
    /// cutoff sphere; a single zero shift for aperiodic structures.
    image_shifts: Vec<Vector3D>,
}

impl<'a> BondGenerator<'a> {
    /// Create a generator for bonds with `rmin <= d <= rmax`.
    ///
    /// Validates the structure and the distance range up front so the
    /// evaluation loop never starts on malformed input.
    pub fn new(structure: &'a dyn StructureAdapter, rmin: f64, rmax: f64) -> Result<Self> {
        structure.validate()?;
        if !(rmax.is_finite() && rmin.is_finite()) || rmax <= 0.0 || rmax < rmin {
            return Err(Error::Range(format!(
                "invalid bond distance range [{}, {}]",
                rmin, rmax
            )));
        }

        let positions = match structure.lattice() {
            Some(lattice) => (0..structure.count_sites())
                .map(|i| lattice.wrap(structure.position(i)))
                .collect(),
            None => (0..structure.count_sites())
                .map(|i| structure.position(i))
                .collect(),
        };

        let image_shifts = match structure.lattice() {
            Some(lattice) => {
                let bounds = lattice.image_bounds(rmax + DISTANCE_EPSILON);
                let mut shifts = Vec::new();
                for na in -bounds[0]..=bounds[0] {
                    for nb in -bounds[1]..=bounds[1] {
                        for nc in -bounds[2]..=bounds[2] {
                            shifts.push(
                                lattice.axis(0) * f64::from(na)
                                    + lattice.axis(1) * f64::from(nb)
                                    + lattice.axis(2) * f64::from(nc),
                            );
                        }
                    }
                }
                debug!(
                    "bond generator covers {} lattice images within rmax = {}",
                    shifts.len(),
                    rmax
                );
                shifts
            }
            None => vec![Vector3D::zero()],
        };

        Ok(Self {
            structure,
            rmin,
            rmax,
            anchors: None,
            positions,
            image_shifts,
        })
    }

    /// Restrict enumeration to bonds anchored at the given sites.
    ///
    /// Out-of-range anchor indices are rejected.
    pub fn with_anchors(mut self, anchors: Vec<usize>) -> Result<Self> {
        let count = self.structure.count_sites();
        if let Some(&bad) = anchors.iter().find(|&&i| i >= count) {
            return Err(Error::Configuration(format!(
                "anchor site {} out of range for {} sites",
                bad, count
            )));
        }
        self.anchors = Some(anchors);
        Ok(self)
    }

    /// Number of anchor sites covered by one pass
    fn anchor_count(&self) -> usize {
        match &self.anchors {
            Some(anchors) => anchors.len(),
            None => self.structure.count_sites(),
        }
    }

    fn anchor(&self, idx: usize) -> usize {
        match &self.anchors {
            Some(anchors) => anchors[idx],
            None => idx,
        }
    }

    /// Start a fresh enumeration pass
    pub fn iter(&self) -> BondIter<'_> {
        BondIter {
            generator: self,
            anchor_idx: 0,
            partner: 0,
            shift: 0,
        }
    }

    /// Collect the whole pass into a vector; used by the parallel
    /// evaluation driver to partition work across threads.
    pub fn generate_all(&self) -> Vec<Bond> {
        self.iter().collect()
    }
}

/// One enumeration pass over a [`BondGenerator`]
pub struct BondIter<'a> {
    generator: &'a BondGenerator<'a>,
    anchor_idx: usize,
    partner: usize,
    shift: usize,
}

impl Iterator for BondIter<'_> {
    type Item = Bond;

    fn next(&mut self) -> Option<Bond> {
        let generator = self.generator;
        let structure = generator.structure;
        let site_count = structure.count_sites();

        while self.anchor_idx < generator.anchor_count() {
            let i = generator.anchor(self.anchor_idx);
            let pos_i = generator.positions[i];

            while self.partner < site_count {
                let j = self.partner;
                let pos_j = generator.positions[j];

                while self.shift < generator.image_shifts.len() {
                    let shift = generator.image_shifts[self.shift];
                    self.shift += 1;

                    let rij = pos_j + shift - pos_i;
                    let distance = rij.length();
                    if distance < MIN_BOND_DISTANCE
                        || distance < generator.rmin - DISTANCE_EPSILON
                        || distance > generator.rmax + DISTANCE_EPSILON
                    {
                        continue;
                    }

                    return Some(Bond {
                        distance,
                        direction: rij * (1.0 / distance),
                        site0: i,
                        site1: j,
                        multiplicity: structure.site_multiplicity(i),
                        occupancy_product: structure.occupancy(i) * structure.occupancy(j),
                    });
                }
                self.shift = 0;
                self.partner += 1;
            }
            self.partner = 0;
            self.anchor_idx += 1;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::{AtomSite, AtomicStructure, Lattice};
    use approx::assert_relative_eq;

    fn dimer(separation: f64) -> AtomicStructure {
        let mut molecule = AtomicStructure::new();
        molecule.add_site(AtomSite::new("C", Vector3D::zero()));
        molecule.add_site(AtomSite::new("C", Vector3D::new(separation, 0.0, 0.0)));
        molecule
    }

    fn simple_cubic(a: f64) -> AtomicStructure {
        let mut crystal = AtomicStructure::with_lattice(Lattice::cubic(a).unwrap());
        crystal
            .add_site_fractional(AtomSite::new("Po", Vector3D::zero()), [0.0; 3])
            .unwrap();
        crystal
    }

    #[test]
    fn test_dimer_bonds() {
        let molecule = dimer(1.5);
        let generator = BondGenerator::new(&molecule, 0.0, 5.0).unwrap();
        let bonds = generator.generate_all();

        // both ordered directions of the single pair
        assert_eq!(bonds.len(), 2);
        assert_relative_eq!(bonds[0].distance, 1.5, epsilon = 1e-12);
        assert_eq!((bonds[0].site0, bonds[0].site1), (0, 1));
        assert_eq!((bonds[1].site0, bonds[1].site1), (1, 0));
        assert_relative_eq!(bonds[0].direction.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(bonds[1].direction.x, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_simple_cubic_coordination_shells() {
        let crystal = simple_cubic(3.0);
        // first shell only: 6 nearest neighbors at a
        let generator = BondGenerator::new(&crystal, 0.0, 3.0).unwrap();
        assert_eq!(generator.generate_all().len(), 6);

        // second shell adds 12 face diagonals at a*sqrt(2) = 4.243
        let generator = BondGenerator::new(&crystal, 0.0, 4.3).unwrap();
        assert_eq!(generator.generate_all().len(), 18);

        // lower cutoff can exclude the first shell again
        let generator = BondGenerator::new(&crystal, 3.5, 4.3).unwrap();
        assert_eq!(generator.generate_all().len(), 12);
    }

    #[test]
    fn test_out_of_cell_sites_keep_their_periodic_bonds() {
        // a site placed two cells outside the unit cell must produce
        // the same bonds as its wrapped equivalent
        let lattice = Lattice::cubic(3.0).unwrap();

        let mut displaced = AtomicStructure::with_lattice(lattice);
        displaced.add_site(AtomSite::new("Na+", Vector3D::zero()));
        displaced.add_site(AtomSite::new("Cl-", Vector3D::new(7.0, 0.0, 0.0)));

        let mut wrapped = AtomicStructure::with_lattice(lattice);
        wrapped.add_site(AtomSite::new("Na+", Vector3D::zero()));
        wrapped.add_site(AtomSite::new("Cl-", Vector3D::new(1.0, 0.0, 0.0)));

        let bonds_displaced = BondGenerator::new(&displaced, 0.0, 2.0)
            .unwrap()
            .generate_all();
        let bonds_wrapped = BondGenerator::new(&wrapped, 0.0, 2.0)
            .unwrap()
            .generate_all();

        assert_eq!(bonds_displaced.len(), 4);
        assert_eq!(bonds_displaced.len(), bonds_wrapped.len());
        for (a, b) in bonds_displaced.iter().zip(&bonds_wrapped) {
            assert_relative_eq!(a.distance, b.distance, epsilon = 1e-12);
            assert_eq!((a.site0, a.site1), (b.site0, b.site1));
        }
    }

    #[test]
    fn test_cutoff_edge_is_inclusive() {
        // distance exactly at rmax must be included, just beyond must not
        let molecule = dimer(2.0);
        let at_edge = BondGenerator::new(&molecule, 0.0, 2.0).unwrap();
        assert_eq!(at_edge.generate_all().len(), 2);

        let below_edge = BondGenerator::new(&molecule, 0.0, 2.0 - 1e-6).unwrap();
        assert_eq!(below_edge.generate_all().len(), 0);
    }

    #[test]
    fn test_reiteration_is_deterministic() {
        let crystal = simple_cubic(3.0);
        let generator = BondGenerator::new(&crystal, 0.0, 7.0).unwrap();
        let first = generator.generate_all();
        let second = generator.generate_all();
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_anchor_restriction() {
        let molecule = dimer(1.5);
        let generator = BondGenerator::new(&molecule, 0.0, 5.0)
            .unwrap()
            .with_anchors(vec![0])
            .unwrap();
        let bonds = generator.generate_all();
        assert_eq!(bonds.len(), 1);
        assert_eq!(bonds[0].site0, 0);

        let bad = BondGenerator::new(&molecule, 0.0, 5.0)
            .unwrap()
            .with_anchors(vec![7]);
        assert!(bad.is_err());
    }

    #[test]
    fn test_malformed_structure_is_rejected() {
        let mut molecule = AtomicStructure::new();
        molecule.add_site(AtomSite::new("Cu", Vector3D::zero()).with_occupancy(1.5));
        assert!(matches!(
            BondGenerator::new(&molecule, 0.0, 5.0),
            Err(Error::Structure(_))
        ));
    }

    #[test]
    fn test_invalid_range_is_rejected() {
        let molecule = dimer(1.5);
        assert!(matches!(
            BondGenerator::new(&molecule, 0.0, -1.0),
            Err(Error::Range(_))
        ));
        assert!(matches!(
            BondGenerator::new(&molecule, 5.0, 2.0),
            Err(Error::Range(_))
        ));
    }

    #[test]
    fn test_occupancy_product() {
        let mut molecule = AtomicStructure::new();
        molecule.add_site(AtomSite::new("Ni", Vector3D::zero()).with_occupancy(0.5));
        molecule.add_site(AtomSite::new("Mg", Vector3D::new(2.0, 0.0, 0.0)).with_occupancy(0.8));
        let generator = BondGenerator::new(&molecule, 0.0, 5.0).unwrap();
        let bonds = generator.generate_all();
        assert_relative_eq!(bonds[0].occupancy_product, 0.4, epsilon = 1e-12);
    }
}
