//! The periodic table and Hill-notation chemical formula parsing.

use crate::error::Error;
use std::collections::BTreeMap;

/// An immutable periodic-table entry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AtomicElement {
    /// Atomic number.
    pub z: i32,
    /// Element symbol, e.g. `"Fe"`.
    pub symbol: &'static str,
    /// Element name, e.g. `"Iron"`.
    pub name: &'static str,
    /// Molar mass in g/mol.
    pub molar_mass: f64,
}

mod periodic_table;
use periodic_table::PERIODIC_TABLE;

/// Looks up an element by atomic number `z`.
///
/// # Errors
///
/// Returns [`Error::BadZ`] if `z` is outside `1..=118`.
pub fn by_z(z: i32) -> Result<&'static AtomicElement, Error> {
    usize::try_from(z - 1)
        .ok()
        .and_then(|idx| PERIODIC_TABLE.get(idx))
        .ok_or(Error::BadZ(z))
}

/// Looks up an element by its symbol (case-sensitive, e.g. `"Na"`, not `"NA"`).
///
/// # Errors
///
/// Returns [`Error::UnknownElement`] if no element has that symbol.
pub fn by_symbol(symbol: &str) -> Result<&'static AtomicElement, Error> {
    PERIODIC_TABLE
        .iter()
        .find(|element| element.symbol == symbol)
        .ok_or_else(|| Error::UnknownElement(symbol.to_string()))
}

/// Parses a Hill-notation chemical formula (`"H2O"`, `"CaCO3"`, `"Al2O3"`) into
/// mole counts keyed by atomic number.
///
/// # Errors
///
/// Returns [`Error::UnknownElement`] if a symbol is not in the periodic table, or
/// [`Error::BadComposition`] if the formula is syntactically malformed.
pub fn parse_formula(formula: &str) -> Result<BTreeMap<i32, f64>, Error> {
    let mut counts = BTreeMap::new();
    let chars: Vec<char> = formula.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        if !chars[i].is_ascii_uppercase() {
            return Err(Error::BadComposition(format!(
                "unexpected character `{}` in formula `{formula}`",
                chars[i]
            )));
        }

        let start = i;
        i += 1;
        while i < chars.len() && chars[i].is_ascii_lowercase() {
            i += 1;
        }
        let symbol: String = chars[start..i].iter().collect();
        let element = by_symbol(&symbol)?;

        let num_start = i;
        while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
            i += 1;
        }
        let count: f64 = if num_start == i {
            1.0
        } else {
            chars[num_start..i]
                .iter()
                .collect::<String>()
                .parse()
                .map_err(|_| {
                    Error::BadComposition(format!("bad stoichiometry count in `{formula}`"))
                })?
        };

        if count <= 0.0 {
            return Err(Error::BadComposition(format!(
                "non-positive stoichiometry count in `{formula}`"
            )));
        }

        *counts.entry(element.z).or_insert(0.0) += count;
    }

    if counts.is_empty() {
        return Err(Error::BadComposition(format!("empty formula `{formula}`")));
    }

    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_hydrogen_and_uranium() {
        assert_eq!(by_z(1).unwrap().symbol, "H");
        assert_eq!(by_symbol("U").unwrap().z, 92);
    }

    #[test]
    fn rejects_bad_z() {
        assert_eq!(by_z(0), Err(Error::BadZ(0)));
        assert_eq!(by_z(119), Err(Error::BadZ(119)));
    }

    #[test]
    fn parses_water() {
        let counts = parse_formula("H2O").unwrap();
        assert_eq!(counts.get(&1), Some(&2.0));
        assert_eq!(counts.get(&8), Some(&1.0));
    }

    #[test]
    fn parses_calcium_carbonate() {
        let counts = parse_formula("CaCO3").unwrap();
        assert_eq!(counts.get(&20), Some(&1.0));
        assert_eq!(counts.get(&6), Some(&1.0));
        assert_eq!(counts.get(&8), Some(&3.0));
    }

    #[test]
    fn rejects_unknown_symbol() {
        assert!(matches!(parse_formula("Xx2"), Err(Error::UnknownElement(_))));
    }
}
