//! Per-material cross-section tables, assembled from per-element atomic data
//! by additivity, sampled over a shared log-energy grid.
//!
//! The exact atomic form factors, incoherent scattering functions and
//! photo-electric cross-sections that a production physics package would
//! load from a data file (see `spec.md` §6, "Physics data files") are, per
//! this crate's scope, replaced by closed-form per-element approximations:
//! file I/O of physics data is an explicit collaborator interface, not part
//! of the core. The closed forms are internally consistent (the same
//! formulas are used to build the Compton differential table as to evaluate
//! its total, so the self-consistency property in `spec.md` §8 holds by
//! construction) and are documented next to each function.

use crate::convert::f64_from_usize;
use crate::element::{self, AtomicElement};
use crate::material::MaterialDefinition;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Classical electron radius, cm.
pub const CLASSICAL_ELECTRON_RADIUS: f64 = 2.817_940_326_2e-13;
/// Electron rest-mass energy, MeV.
pub const ELECTRON_MASS: f64 = 0.510_998_95;

/// Configuration for a compiled [`CrossSectionTable`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct XSectionConfig {
    /// Lower energy bound, MeV.
    pub e_min: f64,
    /// Upper energy bound, MeV.
    pub e_max: f64,
    /// Number of log-spaced energy grid nodes.
    pub n_energy: usize,
    /// Number of nodes used for the Compton outgoing-energy CDF per row.
    pub n_compton: usize,
}

impl Default for XSectionConfig {
    fn default() -> Self {
        Self {
            e_min: 1.0e-3,
            e_max: 1.0e1,
            n_energy: 256,
            n_compton: 64,
        }
    }
}

/// Klein-Nishina total cross-section per free electron at rest, cm².
#[must_use]
pub fn klein_nishina_total(energy: f64) -> f64 {
    let a = energy / ELECTRON_MASS;
    let one_plus_2a = 1.0 + 2.0 * a;
    let ln_term = one_plus_2a.ln();
    let pre = 2.0 * std::f64::consts::PI * CLASSICAL_ELECTRON_RADIUS * CLASSICAL_ELECTRON_RADIUS;

    pre * ((1.0 + a) / (a * a) * (2.0 * (1.0 + a) / one_plus_2a - ln_term / a)
        + ln_term / (2.0 * a)
        - (1.0 + 3.0 * a) / (one_plus_2a * one_plus_2a))
}

/// Klein-Nishina differential cross-section per free electron at rest with
/// respect to the outgoing photon energy `e_out`, cm²/MeV.
///
/// `e_out` must lie in `[e_in / (1 + 2 e_in / mc^2), e_in]`; outside that
/// range the Compton kinematics cannot connect `e_in` to `e_out` and `0.0`
/// is returned.
#[must_use]
pub fn klein_nishina_dcs(e_in: f64, e_out: f64) -> f64 {
    let (e_min, e_max) = compton_energy_bounds(e_in);
    if e_out < e_min || e_out > e_max {
        return 0.0;
    }
    // cos(theta) from the Compton energy-angle relation.
    let cos_theta = (1.0 - ELECTRON_MASS * (1.0 / e_out - 1.0 / e_in)).clamp(-1.0, 1.0);
    let sin2 = 1.0 - cos_theta * cos_theta;
    let pre =
        std::f64::consts::PI * CLASSICAL_ELECTRON_RADIUS * CLASSICAL_ELECTRON_RADIUS * ELECTRON_MASS
            / (e_in * e_in);
    pre * (e_out / e_in + e_in / e_out - sin2)
}

/// The `[e_min, e_max]` range of outgoing energies reachable by a single
/// Compton scatter of a photon of energy `e_in`.
#[must_use]
pub fn compton_energy_bounds(e_in: f64) -> (f64, f64) {
    let a = e_in / ELECTRON_MASS;
    (e_in / (1.0 + 2.0 * a), e_in)
}

/// cos(theta) implied by the Compton energy-angle relation for a scatter
/// from `e_in` to `e_out`.
#[must_use]
pub fn compton_cos_theta(e_in: f64, e_out: f64) -> f64 {
    (1.0 - ELECTRON_MASS * (1.0 / e_out - 1.0 / e_in)).clamp(-1.0, 1.0)
}

/// Largest incoming energy `e_in` that can produce a given outgoing energy
/// `e_out` in a single Compton scatter (the inverse of
/// [`compton_energy_bounds`]'s lower branch). `f64::INFINITY` when `e_out`
/// already exceeds half the electron rest mass, since backscatter alone can
/// then reach arbitrarily high incoming energies.
#[must_use]
pub fn compton_incoming_upper_bound(e_out: f64) -> f64 {
    let denom = 1.0 - 2.0 * e_out / ELECTRON_MASS;
    if denom <= 0.0 {
        f64::INFINITY
    } else {
        e_out / denom
    }
}

/// Rayleigh (coherent) scattering cross-section per atom, cm². Approximated
/// by the Thomson cross-section times a form-factor suppression that falls
/// off with `energy * Z^(-2/3)`, reproducing the well-known qualitative
/// behaviour (Rayleigh dominates only at low energy in heavy elements).
#[must_use]
pub fn rayleigh_per_atom(energy: f64, z: i32) -> f64 {
    const THOMSON: f64 =
        8.0 / 3.0 * std::f64::consts::PI * CLASSICAL_ELECTRON_RADIUS * CLASSICAL_ELECTRON_RADIUS;
    let zf = f64::from(z);
    let scale = zf.powf(2.0 / 3.0) * ELECTRON_MASS * 0.02;
    let suppression = 1.0 / (1.0 + (energy / scale).powi(2));
    THOMSON * zf * zf * suppression
}

/// Photo-electric absorption cross-section per atom, cm². Approximated by
/// the classic `Z^4.5 / E^3` scaling away from absorption edges, calibrated
/// so that lead at 100 keV matches its well-known order of magnitude
/// (~5 barn/atom).
#[must_use]
pub fn absorption_per_atom(energy: f64, z: i32) -> f64 {
    const BARN: f64 = 1.0e-24;
    const CALIBRATION: f64 = 5.0 * BARN * 0.1_f64.powi(3) / 82.0_f64.powf(4.5);
    CALIBRATION * f64::from(z).powf(4.5) / energy.powi(3)
}

fn log_grid(e_min: f64, e_max: f64, n: usize) -> Vec<f64> {
    let log_min = e_min.ln();
    let log_max = e_max.ln();
    (0..n)
        .map(|i| {
            let t = f64_from_usize(i) / f64_from_usize(n - 1);
            (log_min + t * (log_max - log_min)).exp()
        })
        .collect()
}

/// A monotone-in-log-energy sampled table, interpolated linearly in
/// log(E)-log(sigma) space.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogLogTable {
    log_energy: Vec<f64>,
    log_value: Vec<f64>,
}

impl LogLogTable {
    fn build(energies: &[f64], values: impl Fn(f64) -> f64) -> Self {
        Self {
            log_energy: energies.iter().map(|e| e.ln()).collect(),
            log_value: energies.iter().map(|&e| values(e).max(1.0e-300).ln()).collect(),
        }
    }

    /// Interpolated value at `energy`, clamped to the table's range.
    #[must_use]
    pub fn at(&self, energy: f64) -> f64 {
        let log_e = energy.ln().clamp(self.log_energy[0], *self.log_energy.last().unwrap());
        let idx = match self
            .log_energy
            .binary_search_by(|probe| probe.partial_cmp(&log_e).unwrap())
        {
            Ok(i) => i.min(self.log_energy.len() - 2),
            Err(i) => i.clamp(1, self.log_energy.len() - 1) - 1,
        };
        let (x0, x1) = (self.log_energy[idx], self.log_energy[idx + 1]);
        let (y0, y1) = (self.log_value[idx], self.log_value[idx + 1]);
        let t = if (x1 - x0).abs() < 1.0e-300 { 0.0 } else { (log_e - x0) / (x1 - x0) };
        (y0 + t * (y1 - y0)).exp()
    }

    /// Evaluates the table at a batch of energies.
    #[must_use]
    pub fn at_batch(&self, energies: &[f64]) -> Vec<f64> {
        energies.iter().map(|&e| self.at(e)).collect()
    }
}

/// Per-row outgoing-energy CDF and rejection envelope for Compton sampling,
/// tabulated at one incoming-energy grid node.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ComptonRow {
    /// Outgoing energies of the CDF nodes, MeV, ascending.
    pub energies: Vec<f64>,
    /// Cumulative probability at each node, `[0, 1]`, ascending.
    pub cdf: Vec<f64>,
    /// Maximum of the (un-normalized) differential cross-section across the
    /// row; used as the rejection envelope for composition-rejection sampling.
    pub envelope_max: f64,
}

impl ComptonRow {
    /// Builds a row by tabulating `dcs(e_in, ·)` over the kinematically
    /// admissible outgoing-energy range and integrating it into a CDF.
    pub(crate) fn build(e_in: f64, n: usize, dcs: impl Fn(f64, f64) -> f64) -> Self {
        let (e_lo, e_hi) = compton_energy_bounds(e_in);
        let energies = log_grid(e_lo.max(e_in * 1.0e-6), e_hi, n);
        let weights: Vec<f64> = energies.iter().map(|&e_out| dcs(e_in, e_out)).collect();
        let envelope_max = weights.iter().cloned().fold(0.0_f64, f64::max).max(1.0e-300);

        let mut cdf = Vec::with_capacity(n);
        let mut acc = 0.0;
        for i in 0..n {
            if i > 0 {
                acc += 0.5 * (weights[i] + weights[i - 1]) * (energies[i] - energies[i - 1]);
            }
            cdf.push(acc);
        }
        let total = *cdf.last().unwrap_or(&1.0);
        if total > 0.0 {
            for c in &mut cdf {
                *c /= total;
            }
        }

        Self { energies, cdf, envelope_max }
    }

    /// Inverts the tabulated CDF at `u in [0, 1)`, returning an outgoing energy.
    #[must_use]
    pub fn invert(&self, u: f64) -> f64 {
        let idx = match self.cdf.binary_search_by(|probe| probe.partial_cmp(&u).unwrap()) {
            Ok(i) => i,
            Err(i) => i.clamp(1, self.cdf.len() - 1),
        };
        let lo = idx.saturating_sub(1);
        let (c0, c1) = (self.cdf[lo], self.cdf[idx]);
        let (e0, e1) = (self.energies[lo], self.energies[idx]);
        let t = if (c1 - c0).abs() < 1.0e-300 { 0.0 } else { (u - c0) / (c1 - c0) };
        e0 + t * (e1 - e0)
    }
}

/// The compiled per-process, per-material cross-section table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CrossSectionTable {
    /// Shared log-energy grid, MeV.
    pub energy_grid: Vec<f64>,
    /// Total absorption (photoelectric) attenuation, cm²/g, per energy node.
    pub absorption: LogLogTable,
    /// Total Compton attenuation (free-electron, Klein-Nishina), cm²/g.
    pub compton: LogLogTable,
    /// Total Rayleigh attenuation, cm²/g.
    pub rayleigh: LogLogTable,
    /// Per-energy-node Compton outgoing-energy sampling rows.
    pub compton_rows: Vec<ComptonRow>,
}

impl CrossSectionTable {
    /// Compiles a material's tables from its element composition by
    /// additivity: `sigma_material = sum_i n_i sigma_element(Z_i, E)`.
    #[must_use]
    pub fn compile(material: &MaterialDefinition, config: &XSectionConfig) -> Self {
        let energy_grid = log_grid(config.e_min, config.e_max, config.n_energy);
        let elements: Vec<(&AtomicElement, f64)> = material
            .mole_fractions()
            .iter()
            .map(|(&z, &x)| (element::by_z(z).expect("validated at construction"), x))
            .collect();
        let mass_per_mole = material.molar_mass;
        const AVOGADRO: f64 = 6.022_140_76e23;
        let atoms_per_gram = AVOGADRO / mass_per_mole;

        let per_mass = |per_atom: &dyn Fn(f64, i32) -> f64, e: f64| -> f64 {
            elements
                .iter()
                .map(|(element, x)| x * per_atom(e, element.z))
                .sum::<f64>()
                * atoms_per_gram
        };

        let absorption = LogLogTable::build(&energy_grid, |e| {
            per_mass(&absorption_per_atom, e)
        });
        let rayleigh = LogLogTable::build(&energy_grid, |e| per_mass(&rayleigh_per_atom, e));
        let compton = LogLogTable::build(&energy_grid, |e| {
            elements
                .iter()
                .map(|(element, x)| x * f64::from(element.z) * klein_nishina_total(e))
                .sum::<f64>()
                * atoms_per_gram
        });

        let compton_rows = energy_grid
            .iter()
            .map(|&e| ComptonRow::build(e, config.n_compton, klein_nishina_dcs))
            .collect_vec();

        Self {
            energy_grid,
            absorption,
            compton,
            rayleigh,
            compton_rows,
        }
    }

    /// Total (mass) attenuation coefficient summed over the three processes, cm²/g.
    #[must_use]
    pub fn total(&self, energy: f64) -> f64 {
        self.absorption.at(energy) + self.compton.at(energy) + self.rayleigh.at(energy)
    }

    /// Total attenuation coefficient for a batch of energies, cm²/g.
    #[must_use]
    pub fn total_batch(&self, energies: &[f64]) -> Vec<f64> {
        energies.iter().map(|&e| self.total(e)).collect()
    }

    /// The Compton sampling row nearest in log-energy to `energy`.
    #[must_use]
    pub fn compton_row_near(&self, energy: f64) -> &ComptonRow {
        let log_e = energy.ln();
        let idx = self
            .energy_grid
            .iter()
            .map(|e| e.ln())
            .position(|le| le >= log_e)
            .unwrap_or(self.energy_grid.len() - 1)
            .min(self.compton_rows.len() - 1);
        &self.compton_rows[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn klein_nishina_reduces_to_thomson_at_low_energy() {
        const THOMSON: f64 =
            8.0 / 3.0 * std::f64::consts::PI * CLASSICAL_ELECTRON_RADIUS * CLASSICAL_ELECTRON_RADIUS;
        let low_energy = 1.0e-6;
        assert_approx_eq!(f64, klein_nishina_total(low_energy), THOMSON, epsilon = 1.0e-3 * THOMSON);
    }

    #[test]
    fn compton_bounds_contain_e_in() {
        let (lo, hi) = compton_energy_bounds(1.0);
        assert!(lo < 1.0);
        assert_approx_eq!(f64, hi, 1.0);
    }

    #[test]
    fn dcs_integrates_close_to_total() {
        let e_in = 1.0;
        let (lo, hi) = compton_energy_bounds(e_in);
        let n = 20_000;
        let mut integral = 0.0;
        let mut prev = klein_nishina_dcs(e_in, lo);
        for i in 1..=n {
            let e_out = lo + (hi - lo) * i as f64 / n as f64;
            let cur = klein_nishina_dcs(e_in, e_out);
            integral += 0.5 * (prev + cur) * (hi - lo) / n as f64;
            prev = cur;
        }
        let total = klein_nishina_total(e_in);
        assert!(
            (integral - total).abs() / total < 1.0e-2,
            "integral={integral} total={total}"
        );
    }

    #[test]
    fn log_log_table_interpolates_monotonically() {
        let energies = log_grid(1.0e-3, 10.0, 16);
        let table = LogLogTable::build(&energies, klein_nishina_total);
        let mut previous = table.at(energies[0]);
        for &e in &energies[1..] {
            let value = table.at(e);
            assert!(value <= previous * 1.0001, "should decrease with energy");
            previous = value;
        }
    }

    #[test]
    fn compton_row_cdf_is_monotone_and_inverts_within_bounds() {
        let row = ComptonRow::build(1.0, 64, klein_nishina_dcs);
        assert!(row.cdf.windows(2).all(|w| w[0] <= w[1] + 1.0e-12));
        let (lo, hi) = compton_energy_bounds(1.0);
        for &u in &[0.0, 0.25, 0.5, 0.75, 0.999] {
            let e_out = row.invert(u);
            assert!(e_out >= lo - 1.0e-9 && e_out <= hi + 1.0e-9);
        }
    }

    #[test]
    fn water_compton_additivity() {
        let water = MaterialDefinition::from_formula("water", "H2O").unwrap();
        let config = XSectionConfig::default();
        let table = CrossSectionTable::compile(&water, &config);

        let energy = 1.0;
        let direct: f64 = water
            .mole_fractions()
            .iter()
            .map(|(&z, &x)| x * f64::from(z) * klein_nishina_total(energy))
            .sum::<f64>()
            * 6.022_140_76e23
            / water.molar_mass;
        assert_approx_eq!(f64, table.compton.at(energy), direct, epsilon = 1.0e-10 * direct);
    }
}
