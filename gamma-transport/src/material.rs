//! Materials: compositions of elements, resolved into canonical mole vectors,
//! and the registry that compiles them into [`crate::xsection::CrossSectionTable`]s.

use crate::element::{self, AtomicElement};
use crate::error::{Error, Result};
use crate::xsection::{CrossSectionTable, XSectionConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named material: a composition, resolved to a canonical element-mole
/// vector plus derived bulk quantities.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialDefinition {
    /// Material name, used as the [`MaterialRegistry`] key.
    pub name: String,
    /// Canonical mole fractions, keyed by atomic number, normalized to sum to 1.
    mole_fractions: BTreeMap<i32, f64>,
    /// Molar mass of the material in g/mol.
    pub molar_mass: f64,
}

impl MaterialDefinition {
    /// Builds a material from a Hill-notation chemical formula, e.g. `"H2O"`.
    ///
    /// # Errors
    ///
    /// See [`element::parse_formula`].
    pub fn from_formula(name: impl Into<String>, formula: &str) -> Result<Self> {
        let counts = element::parse_formula(formula)?;
        Self::from_mole_counts(name, counts)
    }

    /// Builds a material from explicit mole fractions (or unnormalized mole
    /// counts; they are renormalized).
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadComposition`] if a fraction is non-positive or the
    /// sum is zero, or [`Error::BadZ`] if an atomic number is out of range.
    pub fn from_mole_counts(name: impl Into<String>, counts: BTreeMap<i32, f64>) -> Result<Self> {
        normalize_and_validate(&counts)?;
        let mole_fractions = normalize(counts);
        let molar_mass = molar_mass_of(&mole_fractions)?;
        Ok(Self {
            name: name.into(),
            mole_fractions,
            molar_mass,
        })
    }

    /// Builds a material from mass fractions of elements, converting to mole
    /// fractions via each element's molar mass.
    ///
    /// # Errors
    ///
    /// As [`Self::from_mole_counts`].
    pub fn from_mass_fractions(
        name: impl Into<String>,
        mass_fractions: &BTreeMap<i32, f64>,
    ) -> Result<Self> {
        normalize_and_validate(mass_fractions)?;
        let mut moles = BTreeMap::new();
        for (&z, &mass_fraction) in mass_fractions {
            let element = element::by_z(z)?;
            *moles.entry(z).or_insert(0.0) += mass_fraction / element.molar_mass;
        }
        Self::from_mole_counts(name, moles)
    }

    /// Builds a material from mass fractions of other (already-resolved)
    /// materials, e.g. a concrete mix of sub-materials.
    ///
    /// # Errors
    ///
    /// As [`Self::from_mole_counts`].
    pub fn from_sub_materials(
        name: impl Into<String>,
        components: &[(f64, MaterialDefinition)],
    ) -> Result<Self> {
        let fractions: BTreeMap<i32, f64> = components
            .iter()
            .map(|(fraction, _)| *fraction)
            .enumerate()
            .map(|(i, f)| (i as i32, f))
            .collect();
        normalize_and_validate(&fractions)?;

        let mut moles = BTreeMap::new();
        for (mass_fraction, sub) in components {
            // Sub-material moles-per-gram is its mole fractions divided by its
            // molar mass; scale by this material's mass fraction of the sub-material.
            for (&z, &x) in &sub.mole_fractions {
                *moles.entry(z).or_insert(0.0) += mass_fraction * x / sub.molar_mass;
            }
        }
        Self::from_mole_counts(name, moles)
    }

    /// Canonical mole fractions, keyed by atomic number, summing to 1.
    #[must_use]
    pub fn mole_fractions(&self) -> &BTreeMap<i32, f64> {
        &self.mole_fractions
    }

    /// Electron density per unit mass (electrons per gram), via the molar
    /// electron count `sum_i x_i Z_i` divided by the molar mass.
    #[must_use]
    pub fn electron_density_per_mass(&self) -> f64 {
        let electrons_per_mole: f64 = self
            .mole_fractions
            .iter()
            .map(|(&z, &x)| x * f64::from(z))
            .sum();
        const AVOGADRO: f64 = 6.022_140_76e23;
        AVOGADRO * electrons_per_mole / self.molar_mass
    }

    /// Mole-weighted mean atomic number, used as the `Z_eff` of approximate
    /// per-material scattering-function and absorption-edge models.
    #[must_use]
    pub fn effective_z(&self) -> f64 {
        self.mole_fractions.iter().map(|(&z, &x)| x * f64::from(z)).sum()
    }

    /// Two materials are equal iff their canonical mole vectors agree within `1e-12`.
    #[must_use]
    pub fn approx_eq(&self, other: &Self) -> bool {
        let keys: std::collections::BTreeSet<_> = self
            .mole_fractions
            .keys()
            .chain(other.mole_fractions.keys())
            .collect();
        keys.into_iter().all(|z| {
            let a = self.mole_fractions.get(z).copied().unwrap_or(0.0);
            let b = other.mole_fractions.get(z).copied().unwrap_or(0.0);
            (a - b).abs() < 1e-12
        })
    }
}

fn normalize_and_validate(fractions: &BTreeMap<i32, f64>) -> Result<()> {
    if fractions.is_empty() {
        return Err(Error::BadComposition("empty composition".to_string()));
    }
    let total: f64 = fractions.values().sum();
    if total <= 0.0 {
        return Err(Error::BadComposition(
            "composition fractions sum to zero or less".to_string(),
        ));
    }
    for (&z, &fraction) in fractions {
        if fraction <= 0.0 {
            return Err(Error::BadComposition(format!(
                "non-positive fraction {fraction} for Z={z}"
            )));
        }
    }
    Ok(())
}

fn normalize(counts: BTreeMap<i32, f64>) -> BTreeMap<i32, f64> {
    let total: f64 = counts.values().sum();
    counts.into_iter().map(|(z, x)| (z, x / total)).collect()
}

fn molar_mass_of(mole_fractions: &BTreeMap<i32, f64>) -> Result<f64> {
    let mut mass = 0.0;
    for (&z, &x) in mole_fractions {
        let element: &AtomicElement = element::by_z(z)?;
        mass += x * element.molar_mass;
    }
    Ok(mass)
}

/// A compiled material: its definition plus the cross-section tables derived
/// from it by additivity over elements. Immutable once produced by
/// [`MaterialRegistry::compile`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MaterialRecord {
    /// The material's definition.
    pub definition: MaterialDefinition,
    /// The compiled per-process cross-section table.
    pub table: CrossSectionTable,
}

/// Maps material names to their (possibly uncompiled) definitions, and, after
/// [`Self::compile`], to their [`MaterialRecord`]s.
///
/// Materials can be registered at any time before the first `compile()`.
/// After compilation the registry is frozen until [`Self::recompile`] is
/// called explicitly.
#[derive(Clone, Debug, Default)]
pub struct MaterialRegistry {
    definitions: BTreeMap<String, MaterialDefinition>,
    records: BTreeMap<String, MaterialRecord>,
    compiled: bool,
}

impl MaterialRegistry {
    /// Creates an empty, uncompiled registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a material definition. No-op on the compiled state; call
    /// [`Self::recompile`] afterwards to pick up the new material.
    pub fn register(&mut self, definition: MaterialDefinition) {
        self.definitions.insert(definition.name.clone(), definition);
    }

    /// Compiles every registered material's cross-section tables. Idempotent:
    /// calling it again with no new materials is a no-op.
    pub fn compile(&mut self, config: &XSectionConfig) {
        if self.compiled {
            return;
        }
        self.recompile(config);
    }

    /// Forces a fresh compilation of every registered material, even if
    /// already compiled.
    pub fn recompile(&mut self, config: &XSectionConfig) {
        self.records = self
            .definitions
            .iter()
            .map(|(name, definition)| {
                let table = CrossSectionTable::compile(definition, config);
                (name.clone(), MaterialRecord {
                    definition: definition.clone(),
                    table,
                })
            })
            .collect();
        self.compiled = true;
    }

    /// Looks up a compiled material record by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCompiled`] if the registry has not been compiled,
    /// or [`Error::UnknownElement`]-style lookup failure if the name is
    /// unregistered (reported as [`Error::BadComposition`] for the material
    /// name, since it is not an element).
    pub fn get(&self, name: &str) -> Result<&MaterialRecord> {
        if !self.compiled {
            return Err(Error::NotCompiled);
        }
        self.records
            .get(name)
            .ok_or_else(|| Error::BadComposition(format!("unknown material `{name}`")))
    }

    /// Whether [`Self::compile`] has run at least once since the last mutation.
    #[must_use]
    pub const fn is_compiled(&self) -> bool {
        self.compiled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn water_mole_fractions() {
        let water = MaterialDefinition::from_formula("water", "H2O").unwrap();
        assert!((water.mole_fractions()[&1] - 2.0 / 3.0).abs() < 1e-12);
        assert!((water.mole_fractions()[&8] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn water_effective_z_between_hydrogen_and_oxygen() {
        let water = MaterialDefinition::from_formula("water", "H2O").unwrap();
        let z_eff = water.effective_z();
        assert!(z_eff > 1.0 && z_eff < 8.0);
    }

    #[test]
    fn mass_fractions_convert_to_mole_fractions() {
        // Roughly air: 76% N, 23% O, 1% Ar by mass.
        let mut mass = BTreeMap::new();
        mass.insert(7, 0.76);
        mass.insert(8, 0.23);
        mass.insert(18, 0.01);
        let air = MaterialDefinition::from_mass_fractions("air", &mass).unwrap();
        let sum: f64 = air.mole_fractions().values().sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_non_positive_fraction() {
        let mut mass = BTreeMap::new();
        mass.insert(1, 0.0);
        assert!(matches!(
            MaterialDefinition::from_mass_fractions("bad", &mass),
            Err(Error::BadComposition(_))
        ));
    }

    #[test]
    fn equal_materials_compare_equal() {
        let a = MaterialDefinition::from_formula("a", "H2O").unwrap();
        let b = MaterialDefinition::from_formula("b", "H2O").unwrap();
        assert!(a.approx_eq(&b));
    }

    #[test]
    fn registry_requires_compile_before_get() {
        let mut registry = MaterialRegistry::new();
        registry.register(MaterialDefinition::from_formula("water", "H2O").unwrap());
        assert_eq!(registry.get("water").unwrap_err(), Error::NotCompiled);
        registry.compile(&XSectionConfig::default());
        assert!(registry.get("water").is_ok());
        assert!(matches!(
            registry.get("vacuum"),
            Err(Error::BadComposition(_))
        ));
    }
}
