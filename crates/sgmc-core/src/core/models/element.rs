use phf::phf_map;

/// Static table of element data keyed by symbol.
///
/// Each entry maps an element symbol to its atomic number and standard atomic
/// mass in unified atomic mass units. The table covers the elements commonly
/// encountered in surface-science slabs and adsorbates; it is not exhaustive.
static ELEMENTS: phf::Map<&'static str, (u32, f64)> = phf_map! {
    "H" => (1, 1.008),
    "He" => (2, 4.0026),
    "Li" => (3, 6.94),
    "Be" => (4, 9.0122),
    "B" => (5, 10.81),
    "C" => (6, 12.011),
    "N" => (7, 14.007),
    "O" => (8, 15.999),
    "F" => (9, 18.998),
    "Ne" => (10, 20.180),
    "Na" => (11, 22.990),
    "Mg" => (12, 24.305),
    "Al" => (13, 26.982),
    "Si" => (14, 28.085),
    "P" => (15, 30.974),
    "S" => (16, 32.06),
    "Cl" => (17, 35.45),
    "Ar" => (18, 39.948),
    "K" => (19, 39.098),
    "Ca" => (20, 40.078),
    "Ti" => (22, 47.867),
    "V" => (23, 50.942),
    "Cr" => (24, 51.996),
    "Mn" => (25, 54.938),
    "Fe" => (26, 55.845),
    "Co" => (27, 58.933),
    "Ni" => (28, 58.693),
    "Cu" => (29, 63.546),
    "Zn" => (30, 65.38),
    "Ga" => (31, 69.723),
    "Ge" => (32, 72.630),
    "As" => (33, 74.922),
    "Se" => (34, 78.971),
    "Br" => (35, 79.904),
    "Sr" => (38, 87.62),
    "Y" => (39, 88.906),
    "Zr" => (40, 91.224),
    "Nb" => (41, 92.906),
    "Mo" => (42, 95.95),
    "Ru" => (44, 101.07),
    "Rh" => (45, 102.91),
    "Pd" => (46, 106.42),
    "Ag" => (47, 107.87),
    "Cd" => (48, 112.41),
    "In" => (49, 114.82),
    "Sn" => (50, 118.71),
    "Sb" => (51, 121.76),
    "Te" => (52, 127.60),
    "I" => (53, 126.90),
    "Ba" => (56, 137.33),
    "Ta" => (73, 180.95),
    "W" => (74, 183.84),
    "Re" => (75, 186.21),
    "Os" => (76, 190.23),
    "Ir" => (77, 192.22),
    "Pt" => (78, 195.08),
    "Au" => (79, 196.97),
    "Hg" => (80, 200.59),
    "Pb" => (82, 207.2),
    "Bi" => (83, 208.98),
};

/// Returns the atomic number for an element symbol, if known.
///
/// # Arguments
///
/// * `symbol` - The case-sensitive element symbol (e.g., "Cu", "O").
pub fn atomic_number(symbol: &str) -> Option<u32> {
    ELEMENTS.get(symbol).map(|&(z, _)| z)
}

/// Returns the standard atomic mass for an element symbol, if known.
///
/// # Arguments
///
/// * `symbol` - The case-sensitive element symbol (e.g., "Cu", "O").
pub fn atomic_mass(symbol: &str) -> Option<f64> {
    ELEMENTS.get(symbol).map(|&(_, m)| m)
}

/// Returns `true` if the symbol names a known element.
pub fn is_known(symbol: &str) -> bool {
    ELEMENTS.contains_key(symbol)
}
