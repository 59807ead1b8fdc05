//! Incoherent (Compton) scattering, in five configurable flavors
//! (`spec.md` §4.F, §6): the cross product of `method` (how the outgoing
//! state is sampled), `mode` (forward/direct vs. backward/adjoint) and
//! `model` (the physical approximation for the differential cross-section).
//!
//! `examples/processes.py` in `original_source/` confirms the public shape:
//! a process object configured once, exposing `cross_section`, `dcs` and
//! `sample` over a batch of energies; we mirror that as inherent methods on
//! [`ComptonProcess`].

use crate::convert::{f64_from_usize, usize_from_f64};
use crate::error::{Error, Result};
use crate::material::MaterialDefinition;
use crate::random::Random;
use crate::xsection::{self, CrossSectionTable, ELECTRON_MASS};
use serde::{Deserialize, Serialize};

/// How the outgoing (or, in adjoint mode, incoming) energy is drawn from the
/// configured differential cross-section.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ComptonMethod {
    /// Closed-form (or tabulated-CDF) inversion.
    InverseTransform,
    /// Composition-rejection against a tabulated envelope.
    RejectionSampling,
}

/// Forward (`Direct`) or backward (`Adjoint`/`Inverse`) transport.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ComptonMode {
    /// Samples the outgoing energy of a photon of known incoming energy.
    Direct,
    /// Samples an incoming energy consistent with a known outgoing energy,
    /// via the adjoint kernel `K̃(E' -> E) = K(E -> E') E^2 / E'^2`.
    Adjoint,
    /// Synonym accepted for configuration compatibility; routes through the
    /// same adjoint sampler as `Adjoint` (`spec.md` §6 lists it as a distinct
    /// `mode` value but documents no behaviour beyond `Direct`/`Adjoint`).
    Inverse,
}

/// The physical approximation used for the differential cross-section.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ComptonModel {
    /// Free-electron-at-rest Klein-Nishina formula.
    KleinNishina,
    /// Klein-Nishina weighted by the incoherent scattering function.
    ScatteringFunction,
    /// Impulse approximation with Doppler broadening.
    Penelope,
}

/// The outcome of a single Compton sample.
#[derive(Clone, Copy, Debug)]
pub struct ComptonSample {
    /// In `Direct` mode, the outgoing photon energy; in `Adjoint`/`Inverse`
    /// mode, the sampled incoming energy (MeV).
    pub e_out: f64,
    /// Cosine of the scattering angle implied by the energy change.
    pub cos_theta: f64,
    /// Multiplicative weight correction. `1.0` in direct mode;
    /// `sigma_total(E', m) / sigma_tilde_total(E', m)` in adjoint mode
    /// (`spec.md` §4.F).
    pub weight: f64,
}

/// A configured Compton sampler. Invalid `(mode, model, method)` triples are
/// rejected at construction, before any physics runs (`spec.md` §7).
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ComptonProcess {
    method: ComptonMethod,
    mode: ComptonMode,
    model: ComptonModel,
    precision: f64,
}

impl ComptonProcess {
    /// Builds a Compton sampler.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadSampling`] if `precision` is not a finite positive
    /// number, if `model` is [`ComptonModel::Penelope`] with an adjoint-like
    /// `mode`, or if `method` is [`ComptonMethod::InverseTransform`] with
    /// `model` [`ComptonModel::Penelope`] (`spec.md` §6).
    pub fn new(
        method: ComptonMethod,
        mode: ComptonMode,
        model: ComptonModel,
        precision: f64,
    ) -> Result<Self> {
        if !(precision.is_finite() && precision > 0.0) {
            return Err(Error::BadSampling(format!(
                "precision must be a finite positive number, got {precision}"
            )));
        }
        let adjoint_like = matches!(mode, ComptonMode::Adjoint | ComptonMode::Inverse);
        if matches!(model, ComptonModel::Penelope) && adjoint_like {
            return Err(Error::BadSampling(
                "Penelope scattering is not supported in adjoint mode".to_string(),
            ));
        }
        if matches!(method, ComptonMethod::InverseTransform) && matches!(model, ComptonModel::Penelope) {
            return Err(Error::BadSampling(
                "Penelope scattering has no closed-form inverse-transform sampler".to_string(),
            ));
        }
        Ok(Self { method, mode, model, precision })
    }

    /// The configured sampling method.
    #[must_use]
    pub const fn method(&self) -> ComptonMethod {
        self.method
    }

    /// The configured transport mode.
    #[must_use]
    pub const fn mode(&self) -> ComptonMode {
        self.mode
    }

    /// The configured physical model.
    #[must_use]
    pub const fn model(&self) -> ComptonModel {
        self.model
    }

    /// Total Compton cross-section for a batch of energies, cm²/g.
    #[must_use]
    pub fn cross_section(&self, energies: &[f64], table: &CrossSectionTable) -> Vec<f64> {
        table.compton.at_batch(energies)
    }

    /// Differential cross-section with respect to outgoing energy, weighted
    /// per the configured model.
    #[must_use]
    pub fn dcs(&self, e_in: f64, e_out: f64, material: &MaterialDefinition) -> f64 {
        let base = xsection::klein_nishina_dcs(e_in, e_out);
        match self.model {
            ComptonModel::KleinNishina | ComptonModel::Penelope => base,
            ComptonModel::ScatteringFunction => {
                base * scattering_function_suppression(e_in, e_out, material.effective_z())
            }
        }
    }

    /// Samples one Compton interaction.
    ///
    /// `energy` is the incoming photon energy in `Direct` mode, or the
    /// photon's current (final) energy in `Adjoint`/`Inverse` mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadEnergy`] if `energy` is not finite and positive,
    /// or [`Error::Numerical`] if no admissible incoming energy exists in
    /// adjoint mode (the material's tabulated grid does not extend far
    /// enough above `energy`).
    pub fn sample(
        &self,
        energy: f64,
        material: &MaterialDefinition,
        table: &CrossSectionTable,
        rng: &mut Random,
    ) -> Result<ComptonSample> {
        if !(energy.is_finite() && energy > 0.0) {
            return Err(Error::BadEnergy(energy));
        }
        match self.mode {
            ComptonMode::Direct => self.sample_direct(energy, material, table, rng),
            ComptonMode::Adjoint | ComptonMode::Inverse => {
                self.sample_adjoint(energy, material, table, rng)
            }
        }
    }

    fn sample_direct(
        &self,
        e_in: f64,
        material: &MaterialDefinition,
        table: &CrossSectionTable,
        rng: &mut Random,
    ) -> Result<ComptonSample> {
        let (e_lo, e_hi) = xsection::compton_energy_bounds(e_in);
        let z_eff = material.effective_z();

        let e_out = match self.model {
            ComptonModel::KleinNishina => sample_klein_nishina(e_in, table, rng),
            ComptonModel::ScatteringFunction => {
                let mut candidate = sample_klein_nishina(e_in, table, rng);
                for _ in 0..1000 {
                    let suppression = scattering_function_suppression(e_in, candidate, z_eff);
                    if rng.uniform01() < suppression {
                        break;
                    }
                    candidate = sample_klein_nishina(e_in, table, rng);
                }
                candidate
            }
            ComptonModel::Penelope => {
                let candidate = sample_klein_nishina(e_in, table, rng);
                doppler_broaden(candidate, z_eff, e_lo, e_hi, rng)
            }
        };

        Ok(ComptonSample {
            e_out,
            cos_theta: xsection::compton_cos_theta(e_in, e_out),
            weight: 1.0,
        })
    }

    fn sample_adjoint(
        &self,
        e_final: f64,
        material: &MaterialDefinition,
        table: &CrossSectionTable,
        rng: &mut Random,
    ) -> Result<ComptonSample> {
        let e_max_table = *table.energy_grid.last().expect("non-empty grid");
        let n = usize_from_precision(self.precision);
        let row = AdjointRow::build(e_final, e_max_table, n);
        if row.sigma_tilde_total <= 0.0 {
            return Err(Error::Numerical(format!(
                "no admissible incoming energy above {e_final} MeV in this material's tabulated range"
            )));
        }

        let e_in = row.invert(rng.uniform01());
        let electron_density = material.electron_density_per_mass();
        let sigma_total = table.total(e_final);
        let sigma_tilde_total = electron_density * row.sigma_tilde_total;

        Ok(ComptonSample {
            e_out: e_in,
            cos_theta: xsection::compton_cos_theta(e_in, e_final),
            weight: sigma_total / sigma_tilde_total,
        })
    }
}

fn usize_from_precision(precision: f64) -> usize {
    usize_from_f64((64.0 * precision).round().clamp(16.0, 4096.0))
}

/// Draws an outgoing energy from the exact Klein-Nishina differential
/// cross-section by inverting the material's precompiled sampling row
/// (`CrossSectionTable::compton_row_near`), rather than rebuilding a fresh
/// table on every call (`spec.md` §2, Component B). The distribution sampled
/// is identical regardless of `ComptonMethod`; the configured method only
/// changes performance characteristics a precomputed table is meant to
/// capture, not the statistics sampled here.
fn sample_klein_nishina(e_in: f64, table: &CrossSectionTable, rng: &mut Random) -> f64 {
    table.compton_row_near(e_in).invert(rng.uniform01())
}

/// Incoherent scattering function suppression, normalized to `[0, 1]`,
/// approximated as a function of momentum transfer `q ~ E sin(theta/2)` and
/// the material's effective atomic number (`crate::xsection::rayleigh_per_atom`
/// uses the same functional form for the coherent channel).
fn scattering_function_suppression(e_in: f64, e_out: f64, z_eff: f64) -> f64 {
    let cos_theta = xsection::compton_cos_theta(e_in, e_out);
    let sin_half_sq = (0.5 * (1.0 - cos_theta)).max(0.0);
    let q = e_in * sin_half_sq.sqrt();
    let q0 = 0.02 * z_eff.cbrt();
    1.0 - (-(q / q0).powi(2)).exp()
}

/// A simplified Doppler broadening of the Compton-scattered energy,
/// approximating the electron momentum spread of the impulse approximation.
/// The broadening width is implementation-defined (`spec.md` §9, Open
/// Questions); we scale it down with `z_eff` as tighter-bound inner-shell
/// electrons contribute a narrower net profile at these energies.
fn doppler_broaden(e_out: f64, z_eff: f64, e_lo: f64, e_hi: f64, rng: &mut Random) -> f64 {
    let sigma = 0.01 * ELECTRON_MASS / z_eff.sqrt().max(1.0);
    let u1 = rng.uniform01().max(1.0e-12);
    let u2 = rng.uniform01();
    let gaussian = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    (e_out + sigma * gaussian).clamp(e_lo, e_hi)
}

/// Tabulated adjoint-kernel CDF for a fixed final energy `e_final`,
/// integrating `K(E -> e_final) * E^2 / e_final^2` over admissible incoming
/// energies `E in [e_final, min(compton_incoming_upper_bound(e_final),
/// e_max_table)]`.
struct AdjointRow {
    energies: Vec<f64>,
    cdf: Vec<f64>,
    sigma_tilde_total: f64,
}

impl AdjointRow {
    fn build(e_final: f64, e_max_table: f64, n: usize) -> Self {
        let upper = xsection::compton_incoming_upper_bound(e_final).min(e_max_table);
        if !(upper > e_final) {
            return Self { energies: vec![e_final], cdf: vec![1.0], sigma_tilde_total: 0.0 };
        }

        let kernel = |e_in: f64| {
            xsection::klein_nishina_dcs(e_in, e_final) * (e_in / e_final).powi(2)
        };

        let log_lo = (e_final * (1.0 + 1.0e-9)).ln();
        let log_hi = upper.ln();
        let energies: Vec<f64> = (0..n)
            .map(|i| {
                let t = f64_from_usize(i) / f64_from_usize(n - 1);
                (log_lo + t * (log_hi - log_lo)).exp()
            })
            .collect();
        let weights: Vec<f64> = energies.iter().map(|&e| kernel(e)).collect();

        let mut cdf = Vec::with_capacity(n);
        let mut acc = 0.0;
        for i in 0..n {
            if i > 0 {
                acc += 0.5 * (weights[i] + weights[i - 1]) * (energies[i] - energies[i - 1]);
            }
            cdf.push(acc);
        }
        let total = *cdf.last().unwrap_or(&0.0);
        if total > 0.0 {
            for c in &mut cdf {
                *c /= total;
            }
        }

        Self { energies, cdf, sigma_tilde_total: total }
    }

    fn invert(&self, u: f64) -> f64 {
        if self.cdf.len() < 2 {
            return self.energies[0];
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xsection::XSectionConfig;

    fn water() -> (MaterialDefinition, CrossSectionTable) {
        let material = MaterialDefinition::from_formula("water", "H2O").unwrap();
        let table = CrossSectionTable::compile(&material, &XSectionConfig::default());
        (material, table)
    }

    #[test]
    fn rejects_penelope_in_adjoint_mode() {
        let result = ComptonProcess::new(
            ComptonMethod::RejectionSampling,
            ComptonMode::Adjoint,
            ComptonModel::Penelope,
            1.0,
        );
        assert!(matches!(result, Err(Error::BadSampling(_))));
    }

    #[test]
    fn rejects_inverse_transform_with_penelope() {
        let result = ComptonProcess::new(
            ComptonMethod::InverseTransform,
            ComptonMode::Direct,
            ComptonModel::Penelope,
            1.0,
        );
        assert!(matches!(result, Err(Error::BadSampling(_))));
    }

    #[test]
    fn rejects_non_positive_precision() {
        let result = ComptonProcess::new(
            ComptonMethod::RejectionSampling,
            ComptonMode::Direct,
            ComptonModel::KleinNishina,
            0.0,
        );
        assert!(matches!(result, Err(Error::BadSampling(_))));
    }

    #[test]
    fn direct_klein_nishina_mean_matches_analytic_first_moment() {
        let (material, table) = water();
        let process =
            ComptonProcess::new(ComptonMethod::InverseTransform, ComptonMode::Direct, ComptonModel::KleinNishina, 1.0)
                .unwrap();
        let mut rng = Random::new(123);
        let e_in = 1.0;
        let n = 200_000;
        let mean: f64 = (0..n)
            .map(|_| process.sample(e_in, &material, &table, &mut rng).unwrap().e_out)
            .sum::<f64>()
            / n as f64;

        // Analytic first moment: integral e_out dcs(e_out) de_out / sigma_total.
        let (e_lo, e_hi) = xsection::compton_energy_bounds(e_in);
        let steps = 20_000;
        let mut numerator = 0.0;
        let mut prev = e_lo * xsection::klein_nishina_dcs(e_in, e_lo);
        for i in 1..=steps {
            let e = e_lo + (e_hi - e_lo) * i as f64 / steps as f64;
            let cur = e * xsection::klein_nishina_dcs(e_in, e);
            numerator += 0.5 * (prev + cur) * (e_hi - e_lo) / steps as f64;
            prev = cur;
        }
        let analytic_mean = numerator / xsection::klein_nishina_total(e_in);
        assert!(
            (mean - analytic_mean).abs() / analytic_mean < 5.0e-3,
            "mean={mean} analytic={analytic_mean}"
        );
    }

    #[test]
    fn adjoint_sample_never_decreases_energy() {
        let (material, table) = water();
        let process = ComptonProcess::new(
            ComptonMethod::RejectionSampling,
            ComptonMode::Adjoint,
            ComptonModel::ScatteringFunction,
            1.0,
        )
        .unwrap();
        let mut rng = Random::new(7);
        for _ in 0..200 {
            let sample = process.sample(5.0e-2, &material, &table, &mut rng).unwrap();
            assert!(sample.e_out >= 5.0e-2);
            assert!(sample.weight.is_finite() && sample.weight > 0.0);
        }
    }
}
