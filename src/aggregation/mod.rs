//! Fleet aggregation: many flexibility polytopes in, one virtual polytope
//! out, with the bookkeeping needed to turn aggregate decisions back into
//! per-device operation points.

mod exact;
mod iabvg;
mod lpvg;
pub mod types;

pub use types::*;

use tracing::debug;

use crate::domain::Algorithm;
use crate::error::{FlexError, Result};
use crate::geometry::{FlexibilitySet, SignalVectorSet};
use crate::physical::PhysicalResource;

/// Entry point for the three interchangeable aggregation algorithms.
///
/// The algorithm is selected by [`Algorithm`] tag; all three produce an
/// [`AggregatedFlexibilitySet`] with consistent disaggregation tables, so
/// callers can swap fidelity against runtime without touching dispatch
/// code.
pub struct Aggregator;

impl Aggregator {
    /// Aggregates a fleet of commissioned resources.
    pub fn from_physical(
        resources: &[PhysicalResource],
        algorithm: Algorithm,
        signals: Option<&SignalVectorSet>,
        limits: AggregationLimits,
    ) -> Result<AggregatedFlexibilitySet> {
        let ids = resources.iter().map(|r| r.id().to_string()).collect();
        let sets: Vec<&FlexibilitySet> = resources.iter().map(|r| r.flexibility()).collect();
        Self::run(&sets, ids, algorithm, signals, limits)
    }

    /// Aggregates bare flexibility sets (synthetic ids `set-0`, `set-1`, …).
    pub fn from_sets(
        sets: &[FlexibilitySet],
        algorithm: Algorithm,
        signals: Option<&SignalVectorSet>,
        limits: AggregationLimits,
    ) -> Result<AggregatedFlexibilitySet> {
        let ids = (0..sets.len()).map(|i| format!("set-{i}")).collect();
        let refs: Vec<&FlexibilitySet> = sets.iter().collect();
        Self::run(&refs, ids, algorithm, signals, limits)
    }

    fn run(
        sets: &[&FlexibilitySet],
        ids: Vec<String>,
        algorithm: Algorithm,
        signals: Option<&SignalVectorSet>,
        limits: AggregationLimits,
    ) -> Result<AggregatedFlexibilitySet> {
        if sets.is_empty() {
            return Err(FlexError::invalid_argument(
                "cannot aggregate an empty resource list",
            ));
        }
        let periods = sets[0].periods();
        for set in sets.iter().skip(1) {
            if set.periods() != periods {
                return Err(FlexError::dimension_mismatch(
                    "aggregation input",
                    periods,
                    set.periods(),
                ));
            }
        }

        if let Some(s) = signals {
            if s.periods() != periods {
                return Err(FlexError::dimension_mismatch(
                    "signal-vector set",
                    periods,
                    s.periods(),
                ));
            }
        }

        debug!(
            %algorithm,
            resources = sets.len(),
            periods,
            "starting aggregation"
        );

        let (vertices, decompositions) = match (algorithm, signals) {
            (Algorithm::Exact, _) => exact::aggregate(sets)?,
            (Algorithm::Lpvg, Some(signals)) => lpvg::aggregate(sets, signals)?,
            (Algorithm::Iabvg, Some(signals)) => {
                iabvg::aggregate(sets, signals, limits.vertex_cap)?
            }
            (_, None) => return Err(FlexError::MissingSignalVectors { algorithm }),
        };

        AggregatedFlexibilitySet::new(algorithm, ids, vertices, decompositions)
    }
}
