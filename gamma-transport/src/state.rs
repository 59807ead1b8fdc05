//! Particle state and the batch layout the transport engine operates on
//! (`spec.md` §3, §6).

use crate::geometry::Vector3;
use serde::{Deserialize, Serialize};

/// Terminal reason a particle's trajectory ended, or `0` ("still running",
/// never observed outside the engine's internal loop).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[repr(i32)]
pub enum TransportStatus {
    /// Backward stop: energy reached the source target within tolerance.
    EnergyConstraint = 1,
    /// Entered the explicit engine boundary.
    Boundary = 2,
    /// Left the outer geometry.
    Exit = 3,
    /// Photoelectric absorption removed the photon.
    Absorption = 4,
    /// Energy fell below the forward cutoff.
    EnergyMin = 5,
    /// Per-state step budget exhausted.
    StepMax = 6,
    /// A numerical guard triggered.
    Error = 7,
}

/// One photon's Monte Carlo state.
///
/// Invariants enforced by the engine after every step: `|direction| = 1 ±
/// 1e-6`, `energy > 0`, `weight > 0` and finite.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticleState {
    /// Photon energy, MeV.
    pub energy: f64,
    /// Position, cm.
    pub position: Vector3,
    /// Direction of travel, unit vector.
    pub direction: Vector3,
    /// Monte Carlo weight.
    pub weight: f64,
    /// Cumulative path length travelled, cm.
    pub length: f64,
    /// Index into the engine's random stream, used to derive this state's
    /// deterministic sub-stream (`spec.md` §5).
    pub random_stream: u64,
}

impl ParticleState {
    /// Builds a state with zero accumulated path length.
    #[must_use]
    pub const fn new(
        energy: f64,
        position: Vector3,
        direction: Vector3,
        weight: f64,
        random_stream: u64,
    ) -> Self {
        Self { energy, position, direction, weight, length: 0.0, random_stream }
    }

    /// Whether the invariants in `spec.md` §8 hold for this state.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.energy.is_finite()
            && self.energy > 0.0
            && self.weight.is_finite()
            && self.weight > 0.0
            && self.direction.is_unit(1.0e-6)
    }
}

/// Structure-of-arrays batch layout, binary-compatible with the C ABI
/// (`spec.md` §6): `energy`, `position[3]`, `direction[3]`, `weight`,
/// `length`, `status` (i32, `0` while running), `random_stream` (u64), one
/// slot per state.
#[derive(Clone, Debug, Default)]
pub struct BatchState {
    /// Per-state energies, MeV.
    pub energy: Vec<f64>,
    /// Per-state positions, cm, flattened `[x0, y0, z0, x1, y1, z1, ...]`.
    pub position: Vec<f64>,
    /// Per-state directions, flattened like `position`.
    pub direction: Vec<f64>,
    /// Per-state weights.
    pub weight: Vec<f64>,
    /// Per-state cumulative path length, cm.
    pub length: Vec<f64>,
    /// Per-state terminal status; `0` while the state has not yet finished.
    pub status: Vec<i32>,
    /// Per-state random-stream index.
    pub random_stream: Vec<u64>,
}

impl BatchState {
    /// Allocates a batch of `n` zeroed states.
    #[must_use]
    pub fn with_capacity(n: usize) -> Self {
        Self {
            energy: vec![0.0; n],
            position: vec![0.0; 3 * n],
            direction: vec![0.0; 3 * n],
            weight: vec![1.0; n],
            length: vec![0.0; n],
            status: vec![0; n],
            random_stream: (0..n as u64).collect(),
        }
    }

    /// Number of states in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.energy.len()
    }

    /// Whether the batch holds no states.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.energy.is_empty()
    }

    /// Extracts state `i` as an owned [`ParticleState`].
    #[must_use]
    pub fn get(&self, i: usize) -> ParticleState {
        ParticleState {
            energy: self.energy[i],
            position: Vector3::new(self.position[3 * i], self.position[3 * i + 1], self.position[3 * i + 2]),
            direction: Vector3::new(self.direction[3 * i], self.direction[3 * i + 1], self.direction[3 * i + 2]),
            weight: self.weight[i],
            length: self.length[i],
            random_stream: self.random_stream[i],
        }
    }

    /// Writes `state` back into slot `i`.
    pub fn set(&mut self, i: usize, state: ParticleState) {
        self.energy[i] = state.energy;
        self.position[3 * i] = state.position.x;
        self.position[3 * i + 1] = state.position.y;
        self.position[3 * i + 2] = state.position.z;
        self.direction[3 * i] = state.direction.x;
        self.direction[3 * i + 1] = state.direction.y;
        self.direction[3 * i + 2] = state.direction.z;
        self.weight[i] = state.weight;
        self.length[i] = state.length;
        self.random_stream[i] = state.random_stream;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_round_trips_through_batch() {
        let state = ParticleState::new(1.0, Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0), 1.0, 3);
        let mut batch = BatchState::with_capacity(1);
        batch.set(0, state);
        assert_eq!(batch.get(0), state);
    }

    #[test]
    fn fresh_batch_states_are_valid() {
        let batch = BatchState::with_capacity(4);
        for i in 0..4 {
            let mut state = batch.get(i);
            state.direction = Vector3::new(0.0, 0.0, 1.0);
            state.energy = 1.0;
            assert!(state.is_valid());
        }
    }
}
