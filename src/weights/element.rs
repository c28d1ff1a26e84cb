/*
MIT License with diffpy.srreal Attribution

Copyright (c) 2026 srreal-rs contributors

Based on or developed using diffpy.srreal
Copyright (c) 2009 Trustees of the Columbia University
in the City of New York. All rights reserved.
*/

//! Element data backing the built-in scattering-factor tables

use crate::errors::{Error, Result};

/// Atomic number for an element symbol
pub fn atomic_number(symbol: &str) -> Option<u32> {
    let z = match symbol {
        "H" => 1,
        "He" => 2,
        "Li" => 3,
        "Be" => 4,
        "B" => 5,
        "C" => 6,
        "N" => 7,
        "O" => 8,
        "F" => 9,
        "Ne" => 10,
        "Na" => 11,
        "Mg" => 12,
        "Al" => 13,
        "Si" => 14,
        "P" => 15,
        "S" => 16,
        "Cl" => 17,
        "Ar" => 18,
        "K" => 19,
        "Ca" => 20,
        "Sc" => 21,
        "Ti" => 22,
        "V" => 23,
        "Cr" => 24,
        "Mn" => 25,
        "Fe" => 26,
        "Co" => 27,
        "Ni" => 28,
        "Cu" => 29,
        "Zn" => 30,
        "Ga" => 31,
        "Ge" => 32,
        "As" => 33,
        "Se" => 34,
        "Br" => 35,
        "Kr" => 36,
        "Rb" => 37,
        "Sr" => 38,
        "Y" => 39,
        "Zr" => 40,
        "Nb" => 41,
        "Mo" => 42,
        "Tc" => 43,
        "Ru" => 44,
        "Rh" => 45,
        "Pd" => 46,
        "Ag" => 47,
        "Cd" => 48,
        "In" => 49,
        "Sn" => 50,
        "Sb" => 51,
        "Te" => 52,
        "I" => 53,
        "Xe" => 54,
        "Cs" => 55,
        "Ba" => 56,
        "La" => 57,
        "Ce" => 58,
        "Pr" => 59,
        "Nd" => 60,
        "Pm" => 61,
        "Sm" => 62,
        "Eu" => 63,
        "Gd" => 64,
        "Tb" => 65,
        "Dy" => 66,
        "Ho" => 67,
        "Er" => 68,
        "Tm" => 69,
        "Yb" => 70,
        "Lu" => 71,
        "Hf" => 72,
        "Ta" => 73,
        "W" => 74,
        "Re" => 75,
        "Os" => 76,
        "Ir" => 77,
        "Pt" => 78,
        "Au" => 79,
        "Hg" => 80,
        "Tl" => 81,
        "Pb" => 82,
        "Bi" => 83,
        "Po" => 84,
        "At" => 85,
        "Rn" => 86,
        "Fr" => 87,
        "Ra" => 88,
        "Ac" => 89,
        "Th" => 90,
        "Pa" => 91,
        "U" => 92,
        _ => return None,
    };
    Some(z)
}

/// Bound coherent neutron scattering length in fm
/// (natural-abundance values, Sears tables)
pub fn neutron_coherent_b(symbol: &str) -> Option<f64> {
    let b = match symbol {
        "H" => -3.739,
        "C" => 6.646,
        "N" => 9.36,
        "O" => 5.803,
        "F" => 5.654,
        "Na" => 3.63,
        "Mg" => 5.375,
        "Al" => 3.449,
        "Si" => 4.149,
        "P" => 5.13,
        "S" => 2.847,
        "Cl" => 9.577,
        "K" => 3.67,
        "Ca" => 4.70,
        "Ti" => -3.438,
        "V" => -0.3824,
        "Cr" => 3.635,
        "Mn" => -3.73,
        "Fe" => 9.45,
        "Co" => 2.49,
        "Ni" => 10.3,
        "Cu" => 7.718,
        "Zn" => 5.680,
        "Ga" => 7.288,
        "Ge" => 8.185,
        "As" => 6.58,
        "Se" => 7.970,
        "Br" => 6.795,
        "Rb" => 7.09,
        "Sr" => 7.02,
        "Y" => 7.75,
        "Zr" => 7.16,
        "Nb" => 7.054,
        "Mo" => 6.715,
        "Ag" => 5.922,
        "Cd" => 4.87,
        "In" => 4.065,
        "Sn" => 6.225,
        "Sb" => 5.57,
        "Te" => 5.80,
        "I" => 5.28,
        "Cs" => 5.42,
        "Ba" => 5.07,
        "La" => 8.24,
        "Ce" => 4.84,
        "W" => 4.86,
        "Pt" => 9.60,
        "Au" => 7.63,
        "Hg" => 12.692,
        "Pb" => 9.405,
        "Bi" => 8.532,
        "U" => 8.417,
        _ => return None,
    };
    Some(b)
}

/// Split a species identifier into its element symbol and ionic
/// charge, e.g. "Na+" -> ("Na", 1), "O2-" -> ("O", -2), "Fe" -> ("Fe", 0).
pub fn parse_species(species: &str) -> Result<(&str, i32)> {
    let symbol_len = species.chars().take_while(|c| c.is_ascii_alphabetic()).count();
    if symbol_len == 0 {
        return Err(Error::Structure(format!(
            "cannot parse species identifier '{}'",
            species
        )));
    }
    let (symbol, suffix) = species.split_at(symbol_len);
    if suffix.is_empty() {
        return Ok((symbol, 0));
    }

    let (digits, sign) = suffix.split_at(suffix.len() - 1);
    let magnitude = if digits.is_empty() {
        1
    } else {
        digits.parse::<i32>().map_err(|_| {
            Error::Structure(format!("cannot parse species identifier '{}'", species))
        })?
    };
    let charge = match sign {
        "+" => magnitude,
        "-" => -magnitude,
        _ => {
            return Err(Error::Structure(format!(
                "cannot parse species identifier '{}'",
                species
            )))
        }
    };
    Ok((symbol, charge))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_numbers() {
        assert_eq!(atomic_number("H"), Some(1));
        assert_eq!(atomic_number("Cu"), Some(29));
        assert_eq!(atomic_number("U"), Some(92));
        assert_eq!(atomic_number("Xx"), None);
    }

    #[test]
    fn test_negative_scattering_lengths() {
        assert!(neutron_coherent_b("H").unwrap() < 0.0);
        assert!(neutron_coherent_b("Ti").unwrap() < 0.0);
        assert!(neutron_coherent_b("Ni").unwrap() > 0.0);
    }

    #[test]
    fn test_parse_species() {
        assert_eq!(parse_species("Fe").unwrap(), ("Fe", 0));
        assert_eq!(parse_species("Na+").unwrap(), ("Na", 1));
        assert_eq!(parse_species("O2-").unwrap(), ("O", -2));
        assert_eq!(parse_species("Ca2+").unwrap(), ("Ca", 2));
        assert!(parse_species("2+").is_err());
        assert!(parse_species("Na2*").is_err());
    }
}
