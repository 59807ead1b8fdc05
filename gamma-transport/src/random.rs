//! The deterministic, seedable uniform(0,1) random stream used by the
//! transport engine.
//!
//! Built on [`rand_pcg::Pcg64`] (a PCG-family generator, as `spec.md` §4.C
//! suggests). Each engine owns exactly one [`Random`]; parallel batches are
//! reproduced deterministically by splitting into one sub-stream per state
//! index via [`Random::substream`], which selects a distinct PCG output
//! stream (not merely a distinct seed) so sub-streams do not correlate.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64;

/// A seedable, equidistributed uniform(0,1) generator with batch fill and
/// deterministic per-index sub-streams.
#[derive(Clone, Debug)]
pub struct Random {
    seed: u128,
    rng: Pcg64,
}

impl Random {
    /// Seeds a stream from an explicit 128-bit seed. Deterministic: the same
    /// seed always produces the same sequence.
    #[must_use]
    pub fn new(seed: u128) -> Self {
        Self {
            seed,
            rng: Pcg64::new(seed, 0xa02b_dbf7_bb3c_0a7a_c28f_a16a_64ab_f96b),
        }
    }

    /// Seeds a stream from OS entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        let mut seed_bytes = [0u8; 16];
        rand::rngs::OsRng.fill_bytes(&mut seed_bytes);
        Self::new(u128::from_le_bytes(seed_bytes))
    }

    /// The seed this stream was constructed from.
    #[must_use]
    pub const fn seed(&self) -> u128 {
        self.seed
    }

    /// Draws one value uniformly in `[0, 1)`.
    pub fn uniform01(&mut self) -> f64 {
        // 53 significant bits, matching the precision of an f64 mantissa.
        let bits = self.rng.next_u64() >> 11;
        (bits as f64) * (1.0 / (1u64 << 53) as f64)
    }

    /// Fills a pre-allocated buffer with independent uniform(0,1) draws.
    pub fn fill_uniform01(&mut self, buffer: &mut [f64]) {
        for slot in buffer {
            *slot = self.uniform01();
        }
    }

    /// Derives a deterministic sub-stream for batch index `index`, by
    /// selecting a distinct PCG output stream derived from the parent seed
    /// and the index. Splitting by index (rather than by drawing sequential
    /// blocks from a single stream) keeps results reproducible regardless of
    /// the order in which a batch's states are visited (`spec.md` §5).
    #[must_use]
    pub fn substream(&self, index: u64) -> Self {
        let stream = splitmix64(self.seed as u64 ^ index.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        Self {
            seed: self.seed,
            rng: Pcg64::new(self.seed ^ u128::from(index), u128::from(stream) | 1),
        }
    }
}

/// A small, fast integer mixer used only to derive distinct PCG stream
/// selectors per batch index; not itself a user-facing RNG.
const fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_is_deterministic() {
        let mut a = Random::new(42);
        let mut b = Random::new(42);
        let draws_a: Vec<f64> = (0..100).map(|_| a.uniform01()).collect();
        let draws_b: Vec<f64> = (0..100).map(|_| b.uniform01()).collect();
        assert_eq!(draws_a, draws_b);
    }

    #[test]
    fn draws_are_in_unit_interval() {
        let mut rng = Random::new(7);
        for _ in 0..10_000 {
            let u = rng.uniform01();
            assert!((0.0..1.0).contains(&u));
        }
    }

    #[test]
    fn distinct_substreams_diverge() {
        let parent = Random::new(1);
        let mut s0 = parent.substream(0);
        let mut s1 = parent.substream(1);
        let seq0: Vec<f64> = (0..32).map(|_| s0.uniform01()).collect();
        let seq1: Vec<f64> = (0..32).map(|_| s1.uniform01()).collect();
        assert_ne!(seq0, seq1);
    }

    #[test]
    fn same_substream_index_is_reproducible() {
        let parent = Random::new(99);
        let mut a = parent.substream(5);
        let mut b = parent.substream(5);
        let seq_a: Vec<f64> = (0..16).map(|_| a.uniform01()).collect();
        let seq_b: Vec<f64> = (0..16).map(|_| b.uniform01()).collect();
        assert_eq!(seq_a, seq_b);
    }

    #[test]
    fn batch_fill_matches_scalar_draws() {
        let mut a = Random::new(3);
        let mut b = Random::new(3);
        let mut buffer = vec![0.0; 50];
        a.fill_uniform01(&mut buffer);
        let scalar: Vec<f64> = (0..50).map(|_| b.uniform01()).collect();
        assert_eq!(buffer, scalar);
    }
}
