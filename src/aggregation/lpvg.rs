//! LP-based vertex generation.
//!
//! For each signal vector, solves one linear program over all resources
//! jointly: maximize the direction against the summed operation point,
//! subject to every resource staying inside its own polytope. Each optimum
//! is an extreme point of the true Minkowski sum, so the collected vertex
//! set spans a polytope contained in the exact aggregate; coverage is
//! controlled entirely by the signal-vector set.

use std::collections::HashSet;

use good_lp::{default_solver, Expression, ProblemVariables, Solution, SolverModel};
use ordered_float::OrderedFloat;
use tracing::debug;

use crate::domain::OperationPoint;
use crate::error::Result;
use crate::geometry::{FlexibilitySet, SignalVectorSet};
use crate::solver;

pub(crate) fn aggregate(
    sets: &[&FlexibilitySet],
    signals: &SignalVectorSet,
) -> Result<(Vec<OperationPoint>, Vec<Vec<OperationPoint>>)> {
    let mut seen: HashSet<Vec<OrderedFloat<f64>>> = HashSet::new();
    let mut vertices = Vec::new();
    let mut decompositions = Vec::new();

    for (index, signal) in signals.iter().enumerate() {
        let direction = signal.components();

        let mut vars = ProblemVariables::new();
        let memberships = sets
            .iter()
            .map(|set| solver::set_membership(&mut vars, set))
            .collect::<Result<Vec<_>>>()?;

        let objective: Expression = memberships
            .iter()
            .flat_map(|m| {
                m.point
                    .iter()
                    .zip(direction)
                    .map(|(v, d)| *v * *d)
            })
            .sum();

        let points: Vec<Vec<good_lp::Variable>> =
            memberships.iter().map(|m| m.point.clone()).collect();
        let mut model = vars.maximise(objective).using(default_solver);
        for membership in memberships {
            for constraint in membership.constraints {
                model = model.with(constraint);
            }
        }

        // A non-optimal status changes the shape of the resulting polytope,
        // so it is surfaced instead of skipping the direction.
        let solution = model.solve().map_err(|e| {
            solver::failure(e, &format!("generating a vertex for signal direction {index}"))
        })?;

        let parts: Vec<OperationPoint> = points
            .iter()
            .map(|point| {
                OperationPoint::new(point.iter().map(|v| solution.value(*v)).collect())
            })
            .collect::<Result<_>>()?;
        let vertex = OperationPoint::sum_of(parts.iter())?;

        if seen.insert(vertex.dedup_key()) {
            vertices.push(vertex);
            decompositions.push(parts);
        }
    }

    debug!(
        resources = sets.len(),
        directions = signals.len(),
        vertices = vertices.len(),
        "lpvg aggregation finished"
    );

    Ok((vertices, decompositions))
}
