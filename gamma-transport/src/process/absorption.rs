//! Photoelectric absorption: terminal, no outgoing sample.

use crate::xsection::CrossSectionTable;

/// Absorption cross-section lookup for a compiled material. Absorption never
/// produces an outgoing sample; selecting this channel in `INTERACT`
/// terminates the trajectory with `TransportStatus::Absorption`.
#[must_use]
pub fn cross_section(energies: &[f64], table: &CrossSectionTable) -> Vec<f64> {
    table.absorption.at_batch(energies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialDefinition;
    use crate::xsection::XSectionConfig;

    #[test]
    fn absorption_decreases_with_energy() {
        let lead = MaterialDefinition::from_formula("lead", "Pb").unwrap();
        let table = CrossSectionTable::compile(&lead, &XSectionConfig::default());
        let low = cross_section(&[1.0e-2], &table)[0];
        let high = cross_section(&[1.0], &table)[0];
        assert!(low > high);
    }
}
