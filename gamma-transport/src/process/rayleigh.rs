//! Rayleigh (coherent) scattering: purely deflective, energy preserved,
//! symmetric under time reversal so the same sampler serves forward and
//! backward transport.

use crate::random::Random;
use crate::xsection::CrossSectionTable;

/// Rayleigh cross-section lookup for a compiled material.
#[must_use]
pub fn cross_section(energies: &[f64], table: &CrossSectionTable) -> Vec<f64> {
    table.rayleigh.at_batch(energies)
}

/// Samples `cos(theta)` for a Rayleigh scatter at `energy` off a material
/// with effective atomic number `z_eff`, by rejection against a Thomson
/// dipole pattern `(1 + cos^2(theta))` suppressed at large momentum
/// transfer by the same form-factor approximation used for the total
/// cross-section (`crate::xsection::rayleigh_per_atom`).
#[must_use]
pub fn sample_cos_theta(energy: f64, z_eff: f64, rng: &mut Random) -> f64 {
    let q0 = 0.02 * z_eff.cbrt();
    for _ in 0..1000 {
        let cos_theta = 2.0 * rng.uniform01() - 1.0;
        let sin_half_sq = (0.5 * (1.0 - cos_theta)).max(0.0);
        let q = energy * sin_half_sq.sqrt();
        let suppression = (-(q / q0).powi(2)).exp();
        let density = 0.5 * (1.0 + cos_theta * cos_theta) * suppression;
        if rng.uniform01() < density {
            return cos_theta;
        }
    }
    // Rejection failed to terminate (pathological z_eff/energy): fall back to
    // the unsuppressed forward direction rather than loop unboundedly.
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampled_cosine_stays_in_range() {
        let mut rng = Random::new(11);
        for _ in 0..1000 {
            let c = sample_cos_theta(1.0e-2, 82.0, &mut rng);
            assert!((-1.0..=1.0).contains(&c));
        }
    }

    #[test]
    fn low_q_forward_bias_grows_with_z() {
        // Heavier elements have a smaller q0, so scattering should be more
        // forward-peaked on average.
        let mut rng_light = Random::new(3);
        let mut rng_heavy = Random::new(3);
        let light: f64 = (0..2000).map(|_| sample_cos_theta(1.0e-1, 6.0, &mut rng_light)).sum();
        let heavy: f64 = (0..2000).map(|_| sample_cos_theta(1.0e-1, 82.0, &mut rng_heavy)).sum();
        assert!(heavy > light);
    }
}
