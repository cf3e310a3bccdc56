//! Direction vectors used to probe polytope boundaries.
//!
//! The LP-driven aggregation algorithms evaluate a polytope's support
//! function along each direction of a [`SignalVectorSet`]; the set therefore
//! controls how faithfully the true aggregate is reconstructed. Generation is
//! deterministic for fixed `(periods, growth)` so that algorithm comparisons
//! are reproducible across runs: sampling runs on an explicitly seeded RNG,
//! never on process-global randomness.

use std::collections::HashSet;

use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FlexError, Result};

/// Directions shorter than this are resampled; they carry no direction
/// information after normalization.
const MIN_SAMPLE_NORM: f64 = 1e-9;

/// Resolution for collapsing near-identical directions.
const DIRECTION_RESOLUTION: f64 = 1e-9;

/// A unit direction in power-time space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalVector(Vec<f64>);

impl SignalVector {
    pub fn components(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn key(&self) -> Vec<OrderedFloat<f64>> {
        self.0
            .iter()
            .map(|v| OrderedFloat((v / DIRECTION_RESOLUTION).round() * DIRECTION_RESOLUTION))
            .collect()
    }
}

/// An ordered, duplicate-free set of probing directions.
///
/// Shared read-only across all aggregations of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalVectorSet {
    periods: usize,
    growth: usize,
    vectors: Vec<SignalVector>,
}

impl SignalVectorSet {
    /// Generates the direction set for a `periods`-dimensional space.
    ///
    /// The first round always contains the per-period axis directions
    /// `±e_t` and the two energy diagonals `±(1,…,1)/√T`, which expose the
    /// monotone power/energy trade-off extremes of storage polytopes. Every
    /// further round (growth − 1 of them) adds `2·periods` seeded
    /// standard-normal directions, normalized and deduplicated.
    pub fn generate(periods: usize, growth: usize) -> Result<Self> {
        if periods == 0 {
            return Err(FlexError::invalid_parameter(
                "signal vectors need at least one period",
            ));
        }
        if growth < 1 {
            return Err(FlexError::invalid_parameter(
                "signal-vector growth must be at least 1",
            ));
        }

        let mut seen: HashSet<Vec<OrderedFloat<f64>>> = HashSet::new();
        let mut vectors: Vec<SignalVector> = Vec::new();
        let mut push = |candidate: SignalVector, vectors: &mut Vec<SignalVector>| {
            if seen.insert(candidate.key()) {
                vectors.push(candidate);
            }
        };

        for t in 0..periods {
            for sign in [1.0, -1.0] {
                let mut axis = vec![0.0; periods];
                axis[t] = sign;
                push(SignalVector(axis), &mut vectors);
            }
        }
        let diagonal = 1.0 / (periods as f64).sqrt();
        for sign in [1.0, -1.0] {
            push(
                SignalVector(vec![sign * diagonal; periods]),
                &mut vectors,
            );
        }

        for round in 1..growth {
            let mut rng = StdRng::seed_from_u64(round_seed(periods, round));
            for _ in 0..(2 * periods) {
                push(sample_unit(&mut rng, periods), &mut vectors);
            }
        }

        debug!(
            periods,
            growth,
            directions = vectors.len(),
            "generated signal-vector set"
        );

        Ok(Self {
            periods,
            growth,
            vectors,
        })
    }

    /// Growth level that targets roughly `10 · 2^min(T,7)` directions — the
    /// density at which storage polytopes in low dimension are reconstructed
    /// essentially exactly, saturated so long horizons stay tractable.
    pub fn recommended_growth(periods: usize) -> usize {
        let target = 10usize * (1usize << periods.min(7));
        let base = 2 * periods + 2;
        if target <= base {
            return 1;
        }
        1 + (target - base).div_ceil(2 * periods)
    }

    pub fn periods(&self) -> usize {
        self.periods
    }

    pub fn growth(&self) -> usize {
        self.growth
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SignalVector> {
        self.vectors.iter()
    }

    pub fn vectors(&self) -> &[SignalVector] {
        &self.vectors
    }

    /// The first `cap` directions, in generation order. The axis and
    /// diagonal probes come first, so a truncated set still spans the
    /// per-period and total-energy extremes.
    pub(crate) fn truncated(&self, cap: usize) -> &[SignalVector] {
        &self.vectors[..self.vectors.len().min(cap)]
    }
}

fn round_seed(periods: usize, round: usize) -> u64 {
    (periods as u64)
        .wrapping_mul(0x9e37_79b9_7f4a_7c15)
        .wrapping_add(round as u64)
}

fn sample_unit(rng: &mut StdRng, periods: usize) -> SignalVector {
    loop {
        let raw: Vec<f64> = (0..periods).map(|_| rng.sample(StandardNormal)).collect();
        let norm = raw.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > MIN_SAMPLE_NORM {
            return SignalVector(raw.into_iter().map(|v| v / norm).collect());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_growth() {
        assert!(matches!(
            SignalVectorSet::generate(2, 0),
            Err(FlexError::InvalidParameter { .. })
        ));
        assert!(matches!(
            SignalVectorSet::generate(0, 1),
            Err(FlexError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_base_round_spans_axes_and_diagonals() {
        let set = SignalVectorSet::generate(2, 1).unwrap();
        assert_eq!(set.len(), 6);
        let has = |target: &[f64]| {
            set.iter().any(|v| {
                v.components()
                    .iter()
                    .zip(target)
                    .all(|(a, b)| (a - b).abs() < 1e-12)
            })
        };
        assert!(has(&[1.0, 0.0]));
        assert!(has(&[-1.0, 0.0]));
        assert!(has(&[0.0, 1.0]));
        let d = 1.0 / 2.0_f64.sqrt();
        assert!(has(&[d, d]));
        assert!(has(&[-d, -d]));
    }

    #[test]
    fn test_generation_is_deterministic_and_grows() {
        let a = SignalVectorSet::generate(3, 4).unwrap();
        let b = SignalVectorSet::generate(3, 4).unwrap();
        assert_eq!(a, b);

        let small = SignalVectorSet::generate(3, 2).unwrap();
        assert!(a.len() > small.len());

        for v in a.iter() {
            let norm = v.components().iter().map(|x| x * x).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_recommended_growth_targets_density() {
        let g = SignalVectorSet::recommended_growth(2);
        let set = SignalVectorSet::generate(2, g).unwrap();
        assert!(set.len() >= 38, "expected a dense 2-period set, got {}", set.len());
        assert!(SignalVectorSet::recommended_growth(24) >= 1);
    }

    #[test]
    fn test_truncation_keeps_leading_directions() {
        let set = SignalVectorSet::generate(2, 3).unwrap();
        let head = set.truncated(6);
        assert_eq!(head.len(), 6);
        assert_eq!(head, &set.vectors()[..6]);
        assert_eq!(set.truncated(1000).len(), set.len());
    }
}
