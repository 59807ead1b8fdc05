//! Discrete source-energy priors for forward and backward transport
//! (`spec.md` §4.H), confirmed against `original_source/examples/transport/backward.py`'s
//! photo-peak/background split.

use crate::random::Random;
use serde::{Deserialize, Serialize};

/// A discrete emission spectrum: a set of `(energy, intensity)` lines plus
/// the background-fraction split used for backward sampling.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiscreteSpectrum {
    /// Line energies, MeV, ascending or arbitrary order.
    energies: Vec<f64>,
    /// Normalized cumulative intensities, same length as `energies`, last
    /// entry `1.0`.
    cdf: Vec<f64>,
    /// Fraction of backward draws that land exactly on a source line (the
    /// "photo-peak"); the remainder ("background") are drawn log-uniformly
    /// below the line.
    pub background_fraction: f64,
    /// Lower energy cutoff for the background branch, MeV.
    pub e_min: f64,
}

/// One backward-mode draw: the state's initial (final, detector-side)
/// energy and weight, plus the source-energy target passed on to the
/// transport engine's energy-constraint stop rule.
#[derive(Clone, Copy, Debug)]
pub struct BackwardDraw {
    /// Initial photon energy for the backward trajectory, MeV.
    pub final_energy: f64,
    /// Prior weight correction.
    pub weight: f64,
    /// Source-energy target the engine stops at.
    pub source_energy: f64,
}

impl DiscreteSpectrum {
    /// Builds a spectrum from parallel `energies`/`intensities` arrays.
    /// Intensities need not be normalized; they are divided by their sum.
    #[must_use]
    pub fn new(energies: Vec<f64>, intensities: &[f64], background_fraction: f64, e_min: f64) -> Self {
        debug_assert_eq!(energies.len(), intensities.len());
        debug_assert!(!energies.is_empty());
        let total: f64 = intensities.iter().sum();
        let mut cdf = Vec::with_capacity(intensities.len());
        let mut acc = 0.0;
        for &w in intensities {
            acc += w / total;
            cdf.push(acc);
        }
        *cdf.last_mut().unwrap() = 1.0;
        Self { energies, cdf, background_fraction, e_min }
    }

    fn source_energy(&self, u: f64) -> f64 {
        let idx = match self.cdf.binary_search_by(|probe| probe.partial_cmp(&u).unwrap()) {
            Ok(i) => i,
            Err(i) => i.min(self.cdf.len() - 1),
        };
        self.energies[idx]
    }

    /// Forward mode: draws one source-line energy, intensity-weighted.
    #[must_use]
    pub fn sample_forward(&self, rng: &mut Random) -> f64 {
        self.source_energy(rng.uniform01())
    }

    /// Forward mode, batch variant.
    #[must_use]
    pub fn sample_forward_batch(&self, n: usize, rng: &mut Random) -> Vec<f64> {
        (0..n).map(|_| self.sample_forward(rng)).collect()
    }

    /// Backward mode: draws a source-energy target, then the state's
    /// initial (final) energy and prior weight per the photo-peak/background
    /// split.
    #[must_use]
    pub fn sample_backward(&self, rng: &mut Random) -> BackwardDraw {
        let source_energy = self.source_energy(rng.uniform01());
        let alpha = self.background_fraction;

        if rng.uniform01() < alpha {
            BackwardDraw { final_energy: source_energy, weight: 1.0 / alpha, source_energy }
        } else {
            let ln_range = (source_energy / self.e_min).ln();
            let final_energy = self.e_min * (ln_range * rng.uniform01()).exp();
            let weight = ln_range * final_energy / (1.0 - alpha);
            BackwardDraw { final_energy, weight, source_energy }
        }
    }

    /// Backward mode, batch variant.
    #[must_use]
    pub fn sample_backward_batch(&self, n: usize, rng: &mut Random) -> Vec<BackwardDraw> {
        (0..n).map(|_| self.sample_backward(rng)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pb214() -> DiscreteSpectrum {
        DiscreteSpectrum::new(vec![0.242, 0.295, 0.352], &[7.3, 18.4, 35.6], 0.5, 1.0e-2)
    }

    #[test]
    fn forward_samples_are_one_of_the_lines() {
        let spectrum = pb214();
        let mut rng = Random::new(1);
        for _ in 0..1000 {
            let e = spectrum.sample_forward(&mut rng);
            assert!(spectrum.energies.contains(&e));
        }
    }

    #[test]
    fn backward_photopeak_fraction_matches_alpha() {
        let spectrum = pb214();
        let mut rng = Random::new(2);
        let n = 200_000;
        let draws = spectrum.sample_backward_batch(n, &mut rng);
        let photopeaks = draws
            .iter()
            .filter(|d| (d.final_energy - d.source_energy).abs() < 1.0e-12)
            .count();
        let fraction = photopeaks as f64 / n as f64;
        assert!((fraction - 0.5).abs() < 5.0e-3, "fraction={fraction}");
    }

    #[test]
    fn backward_background_energy_stays_between_e_min_and_source() {
        let spectrum = pb214();
        let mut rng = Random::new(3);
        for _ in 0..10_000 {
            let draw = spectrum.sample_backward(&mut rng);
            if (draw.final_energy - draw.source_energy).abs() > 1.0e-12 {
                assert!(draw.final_energy >= spectrum.e_min);
                assert!(draw.final_energy <= draw.source_energy);
                assert!(draw.weight > 0.0);
            }
        }
    }
}
