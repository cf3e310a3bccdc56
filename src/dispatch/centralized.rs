//! Centralized dispatch: one joint optimization over the fleet's native
//! feasible sets.
//!
//! This controller sees every device's constraints directly, so its optimum
//! is the reference value any aggregation-based dispatch is measured
//! against.

use good_lp::{default_solver, Expression, ProblemVariables, Solution, SolverModel, Variable};
use tracing::debug;

use crate::dispatch::{Dispatch, DispatchObjective};
use crate::domain::OperationPoint;
use crate::error::{FlexError, Result};
use crate::physical::PhysicalResource;
use crate::solver;

pub struct CentralizedController {
    objective: DispatchObjective,
}

impl CentralizedController {
    pub fn new(objective: DispatchObjective) -> Self {
        Self { objective }
    }

    pub fn objective(&self) -> &DispatchObjective {
        &self.objective
    }

    /// Solves the system objective jointly over all resources.
    pub fn optimize(&self, resources: &[PhysicalResource]) -> Result<Dispatch> {
        if resources.is_empty() {
            return Err(FlexError::invalid_argument(
                "centralized dispatch needs at least one resource",
            ));
        }
        let periods = self.objective.periods();
        for resource in resources {
            if resource.flexibility().periods() != periods {
                return Err(FlexError::dimension_mismatch(
                    format!("resource '{}'", resource.id()),
                    periods,
                    resource.flexibility().periods(),
                ));
            }
        }

        let mut vars = ProblemVariables::new();
        let memberships = resources
            .iter()
            .map(|r| solver::set_membership(&mut vars, r.flexibility()))
            .collect::<Result<Vec<_>>>()?;
        let points: Vec<Vec<Variable>> =
            memberships.iter().map(|m| m.point.clone()).collect();

        let totals: Vec<Expression> = (0..periods)
            .map(|t| points.iter().map(|point| point[t] * 1.0).sum())
            .collect();
        let (objective, extra) = self.objective.install(&mut vars, &totals);

        let mut model = vars.minimise(objective).using(default_solver);
        for membership in memberships {
            for constraint in membership.constraints {
                model = model.with(constraint);
            }
        }
        for constraint in extra {
            model = model.with(constraint);
        }

        let solution = model
            .solve()
            .map_err(|e| solver::failure(e, "solving the centralized dispatch"))?;

        let per_resource: Vec<OperationPoint> = points
            .iter()
            .map(|point| {
                OperationPoint::new(point.iter().map(|v| solution.value(*v)).collect())
            })
            .collect::<Result<_>>()?;
        let aggregate = OperationPoint::sum_of(per_resource.iter())?;
        let objective_value = self.objective.evaluate(&aggregate)?;

        debug!(
            resources = resources.len(),
            objective = %self.objective.kind(),
            objective_value,
            "centralized dispatch solved"
        );

        Ok(Dispatch {
            aggregate,
            per_resource,
            objective_value,
            weights: None,
        })
    }
}
