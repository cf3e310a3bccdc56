//! Vertex-based dispatch over an aggregated flexibility set.
//!
//! The fleet's joint feasible region is replaced by the convex hull of the
//! aggregate's vertices, so the optimization runs over combination weights
//! whose dimension is the vertex count, not the fleet size. The chosen
//! weights are then pushed through the aggregate's decomposition table to
//! recover per-resource operation points. Because the hull is contained in
//! the true joint region, the achieved objective is weakly worse than the
//! centralized optimum for minimization; for an exact aggregate it matches.

use good_lp::{constraint, default_solver, variable, Expression, ProblemVariables, Solution, SolverModel};
use tracing::debug;

use crate::aggregation::AggregatedFlexibilitySet;
use crate::dispatch::{Dispatch, DispatchObjective};
use crate::domain::OperationPoint;
use crate::error::{FlexError, Result};
use crate::solver;

pub struct VertexBasedController {
    objective: DispatchObjective,
}

impl VertexBasedController {
    pub fn new(objective: DispatchObjective) -> Self {
        Self { objective }
    }

    pub fn objective(&self) -> &DispatchObjective {
        &self.objective
    }

    /// Optimizes over the aggregate's vertex hull and disaggregates the
    /// result back to per-resource operation points.
    pub fn optimize(&self, aggregate: &AggregatedFlexibilitySet) -> Result<Dispatch> {
        let periods = self.objective.periods();
        if aggregate.periods() != periods {
            return Err(FlexError::dimension_mismatch(
                "aggregated flexibility set",
                periods,
                aggregate.periods(),
            ));
        }

        let vertices = aggregate.vertices();
        let mut vars = ProblemVariables::new();
        let lambdas = vars.add_vector(variable().min(0.0), vertices.len());

        let totals: Vec<Expression> = (0..periods)
            .map(|t| {
                lambdas
                    .iter()
                    .zip(vertices)
                    .map(|(l, v)| *l * v[t])
                    .sum()
            })
            .collect();
        let (objective, extra) = self.objective.install(&mut vars, &totals);
        let weight_sum: Expression = lambdas.iter().map(|l| *l * 1.0).sum();

        let mut model = vars.minimise(objective).using(default_solver);
        model = model.with(constraint!(weight_sum == 1.0));
        for c in extra {
            model = model.with(c);
        }

        let solution = model
            .solve()
            .map_err(|e| solver::failure(e, "solving the vertex-based dispatch"))?;

        let weights: Vec<f64> = lambdas.iter().map(|l| solution.value(*l)).collect();
        let per_resource = aggregate.disaggregate(&weights)?;
        let fleet = OperationPoint::sum_of(per_resource.iter())?;
        let objective_value = self.objective.evaluate(&fleet)?;

        debug!(
            vertices = vertices.len(),
            resources = aggregate.n_resources(),
            objective = %self.objective.kind(),
            objective_value,
            "vertex-based dispatch solved"
        );

        Ok(Dispatch {
            aggregate: fleet,
            per_resource,
            objective_value,
            weights: Some(weights),
        })
    }
}
