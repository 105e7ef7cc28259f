//! Element symbols by atomic number

/// Symbols for Z = 1..=118, index 0 is the dummy species
const SYMBOLS: [&str; 119] = [
    "X", //
    "H", "He", //
    "Li", "Be", "B", "C", "N", "O", "F", "Ne", //
    "Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar", //
    "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As", "Se",
    "Br", "Kr", //
    "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In", "Sn", "Sb", "Te",
    "I", "Xe", //
    "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb",
    "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl", "Pb", "Bi", "Po", "At", "Rn", //
    "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf", "Es", "Fm", "Md", "No",
    "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

/// Number of species in the fallback table for headers without symbols
pub(crate) const FALLBACK_SPECIES: usize = 10;

/// Element symbol for an atomic number
///
/// Zero, negative, or unknown atomic numbers give the dummy species `X`.
///
/// ```rust
/// # use voltools_volumetric::symbol_from_atomic_number;
/// assert_eq!(symbol_from_atomic_number(8), "O");
/// assert_eq!(symbol_from_atomic_number(0), "X");
/// assert_eq!(symbol_from_atomic_number(200), "X");
/// ```
pub fn symbol_from_atomic_number(z: i64) -> &'static str {
    usize::try_from(z)
        .ok()
        .and_then(|z| SYMBOLS.get(z))
        .copied()
        .unwrap_or(SYMBOLS[0])
}

/// Placeholder symbol for species `index` when a file declares no symbols
///
/// Cycles through H..Ne. This is a known approximation: systems with more
/// than ten species, or species in any other order, are mislabelled.
pub(crate) fn fallback_symbol(index: usize) -> &'static str {
    SYMBOLS[1 + index % FALLBACK_SPECIES]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_aligned() {
        assert_eq!(symbol_from_atomic_number(1), "H");
        assert_eq!(symbol_from_atomic_number(26), "Fe");
        assert_eq!(symbol_from_atomic_number(79), "Au");
        assert_eq!(symbol_from_atomic_number(118), "Og");
        assert_eq!(symbol_from_atomic_number(-3), "X");
    }

    #[test]
    fn fallback_cycles() {
        assert_eq!(fallback_symbol(0), "H");
        assert_eq!(fallback_symbol(9), "Ne");
        assert_eq!(fallback_symbol(10), "H");
    }
}
