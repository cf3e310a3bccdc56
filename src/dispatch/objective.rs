//! System-wide dispatch objectives.
//!
//! Both controllers minimize the same objective; only the feasible region
//! differs (native per-device polytopes vs. the aggregate's vertex hull).
//! The power objective penalizes the deviation of total power — fleet plus
//! baseline demand — from zero. Its natural form is a Euclidean norm; the
//! LP backend is linear, so the solve minimizes the L1 norm and the
//! Euclidean deviation is reported separately on the dispatch result.

use good_lp::{constraint, variable, Constraint, Expression, ProblemVariables};
use serde::{Deserialize, Serialize};

use crate::domain::{DemandSeries, ObjectiveKind, OperationPoint, PriceSeries, TimeHorizon};
use crate::error::{FlexError, Result};

/// Objective function plus the external series it is evaluated against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DispatchObjective {
    /// Minimize `Σ_t |Σ_i x_{i,t} + demand_t|`.
    PowerDeviation { demand: DemandSeries },
    /// Minimize `Σ_t price_t · (Σ_i x_{i,t} + demand_t) · dt`.
    EnergyCost {
        demand: DemandSeries,
        prices: PriceSeries,
        dt_hours: f64,
    },
}

impl DispatchObjective {
    pub fn power(demand: DemandSeries) -> Self {
        Self::PowerDeviation { demand }
    }

    pub fn cost(
        demand: DemandSeries,
        prices: PriceSeries,
        horizon: &TimeHorizon,
    ) -> Result<Self> {
        horizon.ensure("cost objective demand", demand.len())?;
        horizon.ensure("cost objective prices", prices.len())?;
        Ok(Self::EnergyCost {
            demand,
            prices,
            dt_hours: horizon.dt_hours(),
        })
    }

    pub fn kind(&self) -> ObjectiveKind {
        match self {
            Self::PowerDeviation { .. } => ObjectiveKind::Power,
            Self::EnergyCost { .. } => ObjectiveKind::Cost,
        }
    }

    pub fn periods(&self) -> usize {
        match self {
            Self::PowerDeviation { demand } => demand.len(),
            Self::EnergyCost { demand, .. } => demand.len(),
        }
    }

    pub fn demand(&self) -> &DemandSeries {
        match self {
            Self::PowerDeviation { demand } => demand,
            Self::EnergyCost { demand, .. } => demand,
        }
    }

    /// Builds the LP objective over the per-period fleet totals.
    ///
    /// Returns the expression to minimize and any auxiliary constraints
    /// (the L1 linearization rows for the power objective).
    pub(crate) fn install(
        &self,
        vars: &mut ProblemVariables,
        totals: &[Expression],
    ) -> (Expression, Vec<Constraint>) {
        match self {
            Self::PowerDeviation { demand } => {
                let deviations = vars.add_vector(variable().min(0.0), totals.len());
                let mut constraints = Vec::with_capacity(2 * totals.len());
                for (t, total) in totals.iter().enumerate() {
                    let d = demand.as_slice()[t];
                    // u_t >= ±(total_t + demand_t)
                    constraints.push(constraint!(deviations[t] >= total.clone() + d));
                    constraints.push(constraint!(deviations[t] + total.clone() >= -d));
                }
                let objective: Expression =
                    deviations.iter().map(|u| *u * 1.0).sum();
                (objective, constraints)
            }
            Self::EnergyCost {
                prices, dt_hours, ..
            } => {
                let objective: Expression = totals
                    .iter()
                    .zip(prices.as_slice())
                    .map(|(total, price)| (price * dt_hours) * total.clone())
                    .sum();
                (objective, Vec::new())
            }
        }
    }

    /// The minimized quantity, evaluated at a concrete aggregate trajectory.
    ///
    /// Power: L1 deviation of fleet plus demand. Cost: total energy cost of
    /// fleet plus demand over the horizon.
    pub fn evaluate(&self, aggregate: &OperationPoint) -> Result<f64> {
        if aggregate.len() != self.periods() {
            return Err(FlexError::dimension_mismatch(
                "objective evaluation",
                self.periods(),
                aggregate.len(),
            ));
        }
        Ok(match self {
            Self::PowerDeviation { demand } => aggregate
                .iter()
                .zip(demand.as_slice())
                .map(|(x, d)| (x + d).abs())
                .sum(),
            Self::EnergyCost {
                demand,
                prices,
                dt_hours,
            } => aggregate
                .iter()
                .zip(demand.as_slice())
                .zip(prices.as_slice())
                .map(|((x, d), p)| p * (x + d) * dt_hours)
                .sum(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn horizon() -> TimeHorizon {
        TimeHorizon::new(2, 12.0).unwrap()
    }

    #[test]
    fn test_cost_objective_checks_series_lengths() {
        let h = horizon();
        let demand = DemandSeries::new(&h, vec![0.3, 0.3]).unwrap();
        let prices = PriceSeries::new(&h, vec![0.2, 0.8]).unwrap();
        let objective = DispatchObjective::cost(demand, prices, &h).unwrap();
        assert_eq!(objective.kind(), ObjectiveKind::Cost);
        assert_eq!(objective.periods(), 2);
    }

    #[test]
    fn test_power_evaluation_is_the_l1_deviation() {
        let h = horizon();
        let demand = DemandSeries::new(&h, vec![0.3, -0.2]).unwrap();
        let objective = DispatchObjective::power(demand);
        let value = objective
            .evaluate(&OperationPoint::new(vec![0.1, 0.1]).unwrap())
            .unwrap();
        assert!((value - (0.4 + 0.1)).abs() < 1e-12);
    }

    #[test]
    fn test_cost_evaluation_includes_baseline_demand() {
        let h = horizon();
        let demand = DemandSeries::new(&h, vec![1.0, 1.0]).unwrap();
        let prices = PriceSeries::new(&h, vec![0.5, 0.25]).unwrap();
        let objective = DispatchObjective::cost(demand, prices, &h).unwrap();
        let value = objective
            .evaluate(&OperationPoint::new(vec![1.0, 3.0]).unwrap())
            .unwrap();
        // 12 h * (0.5 * 2 + 0.25 * 4)
        assert!((value - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_evaluation_rejects_wrong_horizon() {
        let h = horizon();
        let demand = DemandSeries::new(&h, vec![0.0, 0.0]).unwrap();
        let objective = DispatchObjective::power(demand);
        assert!(objective
            .evaluate(&OperationPoint::new(vec![0.0]).unwrap())
            .is_err());
    }
}
