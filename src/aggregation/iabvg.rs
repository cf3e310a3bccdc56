//! Incremental approximate bounded vertex generation.
//!
//! Folds the fleet one resource at a time: each step probes the Minkowski
//! sum of the *already aggregated* partial polytope (as a convex hull of at
//! most `vertex_cap` vertices) and the next resource, instead of re-solving
//! against all raw resources jointly. Per-step cost and the final vertex
//! count are bounded by the cap regardless of fleet size, at the price of
//! additional approximation error compounding across steps.

use std::collections::HashMap;

use good_lp::{constraint, default_solver, Expression, ProblemVariables, Solution, SolverModel};
use ordered_float::OrderedFloat;
use tracing::debug;

use crate::domain::OperationPoint;
use crate::error::{FlexError, Result};
use crate::geometry::{FlexibilitySet, SignalVector, SignalVectorSet};
use crate::solver;

type PartialVertex = (OperationPoint, Vec<OperationPoint>);

pub(crate) fn aggregate(
    sets: &[&FlexibilitySet],
    signals: &SignalVectorSet,
    vertex_cap: usize,
) -> Result<(Vec<OperationPoint>, Vec<Vec<OperationPoint>>)> {
    let periods = sets[0].periods();
    if vertex_cap < periods + 1 {
        return Err(FlexError::invalid_parameter(format!(
            "vertex cap {vertex_cap} cannot span a {periods}-period polytope; \
             need at least {}",
            periods + 1
        )));
    }

    // The cap bounds the probing directions, and dedup keeps the vertex
    // count at or below the direction count, so the bound holds at every
    // step of the fold.
    let directions = signals.truncated(vertex_cap);

    let mut partial: Vec<PartialVertex> = init_from_first(sets[0], directions)?;
    for (step, set) in sets.iter().enumerate().skip(1) {
        partial = fold_step(&partial, set, directions, step)?;
        debug!(
            step,
            partial_vertices = partial.len(),
            "incremental aggregation step finished"
        );
    }

    debug!(
        resources = sets.len(),
        directions = directions.len(),
        vertices = partial.len(),
        vertex_cap,
        "iabvg aggregation finished"
    );

    Ok(partial.into_iter().unzip())
}

/// Probes the first resource alone; its support points seed the partial
/// aggregate.
fn init_from_first(
    set: &FlexibilitySet,
    directions: &[SignalVector],
) -> Result<Vec<PartialVertex>> {
    let mut seen: HashMap<Vec<OrderedFloat<f64>>, ()> = HashMap::new();
    let mut partial = Vec::new();
    for direction in directions {
        let point = set.support(direction.components())?;
        if seen.insert(point.dedup_key(), ()).is_none() {
            partial.push((point.clone(), vec![point]));
        }
    }
    Ok(partial)
}

/// One fold step: probes hull(partial) ⊕ next resource along every
/// direction and rebuilds the partial aggregate from the optima.
fn fold_step(
    partial: &[PartialVertex],
    set: &FlexibilitySet,
    directions: &[SignalVector],
    step: usize,
) -> Result<Vec<PartialVertex>> {
    let n_prior = partial[0].1.len();
    let periods = set.periods();
    let mut seen: HashMap<Vec<OrderedFloat<f64>>, ()> = HashMap::new();
    let mut next = Vec::new();

    for (index, direction) in directions.iter().enumerate() {
        let d = direction.components();

        let mut vars = ProblemVariables::new();
        let lambdas = vars.add_vector(good_lp::variable().min(0.0), partial.len());
        let membership = solver::set_membership(&mut vars, set)?;

        // direction · (Σ_j λ_j u_j + x)
        let hull_term: Expression = lambdas
            .iter()
            .zip(partial)
            .map(|(l, (u, _))| *l * u.dot(d))
            .sum();
        let resource_term: Expression = membership
            .point
            .iter()
            .zip(d)
            .map(|(v, c)| *v * *c)
            .sum();
        let objective = hull_term + resource_term;

        let weight_sum: Expression = lambdas.iter().map(|l| *l * 1.0).sum();
        let resource_point = membership.point.clone();

        let mut model = vars.maximise(objective).using(default_solver);
        model = model.with(constraint!(weight_sum == 1.0));
        for c in membership.constraints {
            model = model.with(c);
        }

        let solution = model.solve().map_err(|e| {
            solver::failure(
                e,
                &format!("incremental step {step}, signal direction {index}"),
            )
        })?;

        // Clamp solver noise on the weights before mixing decompositions.
        let mut weights: Vec<f64> = lambdas
            .iter()
            .map(|l| solution.value(*l).max(0.0))
            .collect();
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(FlexError::SolverFailure {
                status: "degenerate convex weights".to_string(),
                context: format!("incremental step {step}, signal direction {index}"),
            });
        }
        for w in &mut weights {
            *w /= total;
        }

        // Per-resource contribution of the partial hull point, resource by
        // resource, so the new vertex is the exact sum of its decomposition.
        let mut parts = Vec::with_capacity(n_prior + 1);
        for resource in 0..n_prior {
            let mut mixed = OperationPoint::zero(periods);
            for (w, (_, decomposition)) in weights.iter().zip(partial) {
                if *w > 0.0 {
                    mixed = mixed.add(&decomposition[resource].scale(*w))?;
                }
            }
            parts.push(mixed);
        }
        let own = OperationPoint::new(
            resource_point
                .iter()
                .map(|v| solution.value(*v))
                .collect(),
        )?;
        parts.push(own);

        let vertex = OperationPoint::sum_of(parts.iter())?;
        if seen.insert(vertex.dedup_key(), ()).is_none() {
            next.push((vertex, parts));
        }
    }

    Ok(next)
}
