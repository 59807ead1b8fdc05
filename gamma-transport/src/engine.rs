//! The transport engine: the central `LOCATE` -> `DRAW_STEP` -> `TRANSPORT`
//! -> `CHECK_BOUNDARY` -> `INTERACT` -> `BACKWARD_WEIGHT` -> `CHECK_ENERGY`
//! -> `STEP_LIMITS` state machine (`spec.md` §4.G), over both a single state
//! ([`TransportEngine::step_one`]) and a batch
//! ([`TransportEngine::transport`]), the latter optionally data-parallel
//! over `rayon` (`spec.md` §5, §9).

use crate::geometry::{Geometry, GeometryModel, SectorLocation, Vector3};
use crate::material::MaterialRegistry;
use crate::process::{rayleigh, ComptonProcess, ComptonMode};
use crate::random::Random;
use crate::state::{ParticleState, TransportStatus};
use rayon::prelude::*;
use std::sync::Arc;

/// A ray has no sector boundary closer than this is treated as unbounded;
/// density integrals need a finite (if astronomically large) upper bound.
const MAX_STEP_DISTANCE: f64 = 1.0e15;
/// Tie-break tolerance for "interaction lands exactly on a sector boundary"
/// (`spec.md` §4.G).
const BOUNDARY_TIE_TOLERANCE: f64 = 1.0e-12;
/// Backward energy-constraint tolerance, relative to the source energy.
const ENERGY_CONSTRAINT_TOLERANCE: f64 = 1.0e-6;
/// Energies below this flip a state to `ERROR` rather than `ENERGY_MIN`
/// (`spec.md` §4.G, "Numerical guards").
const ENERGY_FLOOR: f64 = 1.0e-10;

/// Forward or backward (adjoint) transport.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransportMode {
    /// Photons travel from source to detector; energy is non-increasing.
    Forward,
    /// Photons are traced from detector towards a candidate source; energy
    /// is non-decreasing, and a state stops when it reaches its target.
    Backward,
}

/// The user-set explicit boundary (`spec.md` §4.G): either a sector whose
/// entry is itself terminal, an arbitrary predicate over the post-step
/// state, or no explicit boundary at all.
#[derive(Clone)]
pub enum Boundary {
    /// No explicit boundary; only the outer geometry and absorption/energy
    /// limits terminate a trajectory.
    None,
    /// Entering this sector index terminates the trajectory.
    Sector(usize),
    /// An arbitrary shape test; entering it (the test returning `true` on
    /// the state after the step) terminates the trajectory.
    Enters(Arc<dyn Fn(&ParticleState) -> bool + Send + Sync>),
}

impl std::fmt::Debug for Boundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "Boundary::None"),
            Self::Sector(i) => write!(f, "Boundary::Sector({i})"),
            Self::Enters(_) => write!(f, "Boundary::Enters(..)"),
        }
    }
}

/// A configured transport engine. Borrows the compiled registry and
/// geometry for its lifetime; owns its random stream exclusively
/// (`spec.md` §5).
#[derive(Debug)]
pub struct TransportEngine<'a> {
    geometry: &'a GeometryModel,
    registry: &'a MaterialRegistry,
    compton: ComptonProcess,
    mode: TransportMode,
    boundary: Boundary,
    e_min: f64,
    step_max: u32,
    random: Random,
}

impl<'a> TransportEngine<'a> {
    /// Builds an engine. `compton`'s configured mode must agree with
    /// `mode` ([`ComptonMode::Direct`] for [`TransportMode::Forward`],
    /// [`ComptonMode::Adjoint`] or [`ComptonMode::Inverse`] for
    /// [`TransportMode::Backward`]).
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::BadSampling`] on a mode mismatch.
    pub fn new(
        geometry: &'a GeometryModel,
        registry: &'a MaterialRegistry,
        compton: ComptonProcess,
        mode: TransportMode,
        e_min: f64,
        step_max: u32,
        random: Random,
    ) -> crate::error::Result<Self> {
        let consistent = match mode {
            TransportMode::Forward => matches!(compton.mode(), ComptonMode::Direct),
            TransportMode::Backward => {
                matches!(compton.mode(), ComptonMode::Adjoint | ComptonMode::Inverse)
            }
        };
        if !consistent {
            return Err(crate::error::Error::BadSampling(format!(
                "ComptonProcess mode {:?} is inconsistent with transport mode {mode:?}",
                compton.mode()
            )));
        }
        Ok(Self {
            geometry,
            registry,
            compton,
            mode,
            boundary: Boundary::None,
            e_min,
            step_max,
            random,
        })
    }

    /// Sets the explicit engine boundary.
    pub fn set_boundary(&mut self, boundary: Boundary) {
        self.boundary = boundary;
    }

    /// The configured transport mode.
    #[must_use]
    pub const fn mode(&self) -> TransportMode {
        self.mode
    }

    /// Runs one state to a terminal status, deriving its random sub-stream
    /// from `state.random_stream` so the result is independent of any other
    /// state's trajectory (`spec.md` §5).
    pub fn step_one(&self, state: &mut ParticleState, source_energy: Option<f64>) -> TransportStatus {
        let mut rng = self.random.substream(state.random_stream);
        self.run(state, &mut rng, source_energy)
    }

    /// Runs a batch of states to their terminal statuses. In backward mode,
    /// `source_energies[i]` is state `i`'s energy-constraint target.
    /// Internally parallelized over `rayon` when more than one state is
    /// present; safe because each state's random sub-stream is independent
    /// of visitation order.
    pub fn transport(
        &self,
        states: &mut [ParticleState],
        statuses: &mut [TransportStatus],
        source_energies: Option<&[f64]>,
    ) {
        states
            .par_iter_mut()
            .zip(statuses.par_iter_mut())
            .enumerate()
            .for_each(|(i, (state, status))| {
                let target = source_energies.map(|s| s[i]);
                *status = self.step_one(state, target);
            });
    }

    fn run(&self, state: &mut ParticleState, rng: &mut Random, source_energy: Option<f64>) -> TransportStatus {
        let mut steps_left = self.step_max;

        loop {
            // 1. LOCATE
            let SectorLocation::Sector(sector_idx) = self.geometry.locate(state.position) else {
                return TransportStatus::Exit;
            };
            if matches!(self.boundary, Boundary::Sector(b) if b == sector_idx) {
                return TransportStatus::Boundary;
            }

            let sector = &self.geometry.sectors()[sector_idx];
            let Ok(record) = self.registry.get(&sector.material) else {
                return TransportStatus::Error;
            };
            let sigma_tot = record.table.total(state.energy);
            if !(sigma_tot.is_finite() && sigma_tot > 0.0) {
                return TransportStatus::Error;
            }

            // 2. DRAW_STEP
            let u = rng.uniform01().max(f64::MIN_POSITIVE);
            let lambda = -u.ln() / sigma_tot;

            // 3. TRANSPORT
            let trace = self.geometry.trace(state.position, state.direction);
            let t_b = if trace.distance.is_finite() { trace.distance } else { MAX_STEP_DISTANCE };
            let Ok(lambda_b) = self.geometry.column_density(state.position, state.direction, t_b) else {
                return TransportStatus::Error;
            };
            let lambda_b = lambda_b.max(0.0);

            let crosses = lambda >= lambda_b - BOUNDARY_TIE_TOLERANCE;
            let t = if crosses {
                t_b
            } else {
                match self.geometry.inverse_column(state.position, state.direction, lambda) {
                    Ok(Some(t)) => t,
                    Ok(None) | Err(_) => return TransportStatus::Error,
                }
            };

            state.position = state.position + state.direction * t;
            state.length += t;

            // 4. CHECK_BOUNDARY
            if let Boundary::Enters(enters) = &self.boundary {
                if enters(state) {
                    return TransportStatus::Boundary;
                }
            }
            let new_location = self.geometry.locate(state.position);
            let SectorLocation::Sector(new_sector_idx) = new_location else {
                return TransportStatus::Exit;
            };
            if matches!(self.boundary, Boundary::Sector(b) if b == new_sector_idx) {
                return TransportStatus::Boundary;
            }

            if crosses {
                steps_left = match steps_left.checked_sub(1) {
                    Some(remaining) => remaining,
                    None => return TransportStatus::StepMax,
                };
                if steps_left == 0 {
                    return TransportStatus::StepMax;
                }
                continue;
            }

            // 5. INTERACT
            let e_in = state.energy;
            let material = &record.definition;
            let p_abs = record.table.absorption.at(state.energy);
            let p_compton = record.table.compton.at(state.energy);
            let p_rayleigh = record.table.rayleigh.at(state.energy);
            let p_total = p_abs + p_compton + p_rayleigh;
            if !(p_total.is_finite() && p_total > 0.0) {
                return TransportStatus::Error;
            }
            let draw = rng.uniform01() * p_total;

            if draw < p_abs {
                return TransportStatus::Absorption;
            } else if draw < p_abs + p_rayleigh {
                let cos_theta = rayleigh::sample_cos_theta(state.energy, material.effective_z(), rng);
                let phi = 2.0 * std::f64::consts::PI * rng.uniform01();
                state.direction = rotate(state.direction, cos_theta, phi);
            } else {
                let Ok(sample) = self.compton.sample(state.energy, material, &record.table, rng) else {
                    return TransportStatus::Error;
                };
                let phi = 2.0 * std::f64::consts::PI * rng.uniform01();
                state.direction = rotate(state.direction, sample.cos_theta, phi);
                state.energy = sample.e_out;

                // 6. BACKWARD_WEIGHT: `ComptonProcess::sample` already
                // returns `sigma_total(E_old, m) / sigma_tilde_total(E_old,
                // m)` as `sample.weight` (`spec.md` §4.F); we take that as
                // authoritative over §4.G's restated ratio, which reuses the
                // same E/E' symbols for the opposite pair of energies.
                if self.mode == TransportMode::Backward {
                    state.weight *= sample.weight;
                }
            }

            if !state.weight.is_finite() || state.weight <= 0.0 {
                return TransportStatus::Error;
            }
            if state.energy < ENERGY_FLOOR {
                return TransportStatus::Error;
            }

            // 7. CHECK_ENERGY
            match self.mode {
                TransportMode::Forward => {
                    if state.energy < self.e_min {
                        return TransportStatus::EnergyMin;
                    }
                }
                TransportMode::Backward => {
                    if let Some(target) = source_energy {
                        if state.energy >= target * (1.0 - ENERGY_CONSTRAINT_TOLERANCE) {
                            // Last-step weight correction (`spec.md` §4.G,
                            // "Backward energy-constraint semantics", MUST):
                            // the Compton step that crossed `target` sampled
                            // an outgoing energy uniformly over the whole
                            // adjoint kernel's support above `e_in`, but only
                            // the fraction of that support at or below
                            // `target` actually corresponds to a source at
                            // exactly `target`; reweight by that fraction so
                            // the estimator stays unbiased for the overshoot.
                            let fraction = ((target - e_in) / (state.energy - e_in)).clamp(0.0, 1.0);
                            state.weight *= fraction;
                            return TransportStatus::EnergyConstraint;
                        }
                    }
                }
            }

            // 8. STEP_LIMITS
            steps_left = match steps_left.checked_sub(1) {
                Some(remaining) => remaining,
                None => return TransportStatus::StepMax,
            };
            if steps_left == 0 {
                return TransportStatus::StepMax;
            }
        }
    }
}

/// Rotates `d` by polar angle `acos(cos_theta)` and azimuth `phi` about
/// itself, returning the new (unit) direction.
fn rotate(d: Vector3, cos_theta: f64, phi: f64) -> Vector3 {
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let reference = if d.x.abs() < 0.9 { Vector3::new(1.0, 0.0, 0.0) } else { Vector3::new(0.0, 1.0, 0.0) };
    let u = d.cross(reference).normalized();
    let v = d.cross(u);
    (d * cos_theta + u * (sin_theta * phi.cos()) + v * (sin_theta * phi.sin())).normalized()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::density::{DensityModel, Uniform};
    use crate::geometry::{stratified::StratifiedGeometry, Sector};
    use crate::material::MaterialDefinition;
    use crate::process::{ComptonMethod, ComptonModel};
    use crate::xsection::XSectionConfig;

    fn water_sphere_geometry() -> GeometryModel {
        let sector = Sector {
            description: "Water".into(),
            material: "water".into(),
            density: DensityModel::Uniform(Uniform { rho0: 1.0 }),
        };
        // A single very thick slab stands in for a sphere for this
        // straight-line-direction test: the photon only ever travels along
        // +z, so a half-space at z=100 behaves identically to a bounding
        // sphere of that radius for this ray.
        GeometryModel::Stratified(StratifiedGeometry::new(100.0, vec![sector], vec![]))
    }

    fn registry() -> MaterialRegistry {
        let mut registry = MaterialRegistry::new();
        registry.register(MaterialDefinition::from_formula("water", "H2O").unwrap());
        registry.compile(&XSectionConfig::default());
        registry
    }

    #[test]
    fn forward_photon_in_thick_slab_exits_top() {
        let geometry = water_sphere_geometry();
        let registry = registry();
        let compton =
            ComptonProcess::new(ComptonMethod::InverseTransform, ComptonMode::Direct, ComptonModel::KleinNishina, 1.0)
                .unwrap();
        let engine =
            TransportEngine::new(&geometry, &registry, compton, TransportMode::Forward, 1.0e-3, 10_000, Random::new(1))
                .unwrap();

        let mut state = ParticleState::new(1.0, Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0), 1.0, 0);
        let status = engine.step_one(&mut state, None);
        assert!(matches!(
            status,
            TransportStatus::Exit | TransportStatus::EnergyMin | TransportStatus::Absorption
        ));
        assert!(state.is_valid() || status == TransportStatus::Error);
    }

    #[test]
    fn null_geometry_exits_immediately_with_unchanged_weight() {
        let geometry = water_sphere_geometry();
        let registry = registry();
        let compton =
            ComptonProcess::new(ComptonMethod::InverseTransform, ComptonMode::Direct, ComptonModel::KleinNishina, 1.0)
                .unwrap();
        let engine =
            TransportEngine::new(&geometry, &registry, compton, TransportMode::Forward, 1.0e-3, 10_000, Random::new(2))
                .unwrap();

        let mut state = ParticleState::new(1.0, Vector3::new(0.0, 0.0, 200.0), Vector3::new(0.0, 0.0, 1.0), 1.0, 0);
        let status = engine.step_one(&mut state, None);
        assert_eq!(status, TransportStatus::Exit);
        assert_eq!(state.weight, 1.0);
    }

    #[test]
    fn deterministic_for_the_same_seed_and_stream_index() {
        let geometry = water_sphere_geometry();
        let registry = registry();
        let compton =
            ComptonProcess::new(ComptonMethod::InverseTransform, ComptonMode::Direct, ComptonModel::KleinNishina, 1.0)
                .unwrap();
        let make_state = || ParticleState::new(1.0, Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0), 1.0, 42);

        let engine_a =
            TransportEngine::new(&geometry, &registry, compton, TransportMode::Forward, 1.0e-3, 10_000, Random::new(9))
                .unwrap();
        let engine_b =
            TransportEngine::new(&geometry, &registry, compton, TransportMode::Forward, 1.0e-3, 10_000, Random::new(9))
                .unwrap();

        let mut state_a = make_state();
        let mut state_b = make_state();
        let status_a = engine_a.step_one(&mut state_a, None);
        let status_b = engine_b.step_one(&mut state_b, None);
        assert_eq!(status_a, status_b);
        assert_eq!(state_a, state_b);
    }

    #[test]
    fn rejects_mismatched_compton_and_transport_mode() {
        let geometry = water_sphere_geometry();
        let registry = registry();
        let compton = ComptonProcess::new(
            ComptonMethod::RejectionSampling,
            ComptonMode::Adjoint,
            ComptonModel::ScatteringFunction,
            1.0,
        )
        .unwrap();
        let result =
            TransportEngine::new(&geometry, &registry, compton, TransportMode::Forward, 1.0e-3, 10_000, Random::new(1));
        assert!(result.is_err());
    }
}
