use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{FlexError, Result};

/// Aggregation algorithm selector.
///
/// The three algorithms are interchangeable behind [`crate::aggregation::Aggregator`]:
/// `Exact` is the combinatorial ground truth, `Lpvg` and `Iabvg` are
/// LP-driven approximations whose feasible regions are contained in the
/// exact one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Algorithm {
    /// Minkowski sum over all vertex combinations, reduced to extreme points.
    Exact,
    /// LP-based vertex generation: one joint LP per signal vector.
    Lpvg,
    /// Incremental approximate bounded vertex generation: folds the fleet
    /// one resource at a time under a fixed vertex cap.
    Iabvg,
}

impl Algorithm {
    /// Whether this algorithm probes polytope boundaries with signal vectors.
    pub fn needs_signal_vectors(self) -> bool {
        matches!(self, Algorithm::Lpvg | Algorithm::Iabvg)
    }
}

/// Dispatch objective selector.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ObjectiveKind {
    /// Minimize the deviation of total power (fleet + baseline demand) from zero.
    Power,
    /// Minimize the energy cost of total power over the horizon.
    Cost,
}

/// The time discretization shared by every entity in a run.
///
/// All series, schedules and polytopes are validated against one horizon;
/// a length disagreement anywhere is a [`FlexError::DimensionMismatch`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeHorizon {
    periods: usize,
    dt_hours: f64,
}

impl TimeHorizon {
    pub fn new(periods: usize, dt_hours: f64) -> Result<Self> {
        if periods == 0 {
            return Err(FlexError::invalid_parameter(
                "time horizon must have at least one period",
            ));
        }
        if !dt_hours.is_finite() || dt_hours <= 0.0 {
            return Err(FlexError::invalid_parameter(format!(
                "period duration must be a positive number of hours, got {dt_hours}"
            )));
        }
        Ok(Self { periods, dt_hours })
    }

    /// Number of time periods T.
    pub fn periods(&self) -> usize {
        self.periods
    }

    /// Duration of one period in hours.
    pub fn dt_hours(&self) -> f64 {
        self.dt_hours
    }

    /// Total horizon span in hours.
    pub fn span_hours(&self) -> f64 {
        self.periods as f64 * self.dt_hours
    }

    /// Checks that `actual` matches this horizon's period count.
    pub fn ensure(&self, entity: &str, actual: usize) -> Result<()> {
        if actual != self.periods {
            return Err(FlexError::dimension_mismatch(entity, self.periods, actual));
        }
        Ok(())
    }
}
