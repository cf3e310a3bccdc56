//! Shared good_lp plumbing for the aggregation algorithms and controllers.
//!
//! Every solve is a pure function of its inputs; a non-optimal status is
//! mapped to [`FlexError::SolverFailure`] and surfaced immediately, never
//! retried.

use good_lp::{
    constraint, default_solver, variable, Constraint, Expression, ProblemVariables,
    ResolutionError, Solution, SolverModel, Variable,
};

use crate::domain::OperationPoint;
use crate::error::{FlexError, Result};
use crate::geometry::FlexibilitySet;

/// LP variables and constraints pinning a point inside one flexibility set.
pub(crate) struct SetMembership {
    /// One variable per period: the resource's operation point.
    pub point: Vec<Variable>,
    /// Convex-combination weights, present for vertex-form sets.
    pub lambdas: Option<Vec<Variable>>,
    /// Constraints to attach to the model.
    pub constraints: Vec<Constraint>,
}

/// Encodes `x ∈ set` for the given problem.
///
/// Half-space form adds one row per inequality; vertex form introduces
/// convex-combination weights over the vertex list.
pub(crate) fn set_membership(
    vars: &mut ProblemVariables,
    set: &FlexibilitySet,
) -> Result<SetMembership> {
    let periods = set.periods();
    let point = vars.add_vector(variable(), periods);
    let mut constraints = Vec::new();

    if let Some(system) = set.halfspaces() {
        for (normal, offset) in system.rows() {
            let lhs: Expression = point
                .iter()
                .zip(normal)
                .map(|(v, c)| *v * *c)
                .sum();
            constraints.push(constraint!(lhs <= offset));
        }
        return Ok(SetMembership {
            point,
            lambdas: None,
            constraints,
        });
    }

    let vertices = set
        .vertices()
        .ok_or_else(|| FlexError::invalid_argument("flexibility set has no representation"))?;
    let lambdas = vars.add_vector(variable().min(0.0), vertices.len());
    let weight_sum: Expression = lambdas.iter().map(|l| *l * 1.0).sum();
    constraints.push(constraint!(weight_sum == 1.0));
    for t in 0..periods {
        let combo: Expression = lambdas
            .iter()
            .zip(vertices)
            .map(|(l, v)| *l * v[t])
            .sum();
        let xt = point[t] * 1.0;
        constraints.push(constraint!(combo - xt == 0.0));
    }

    Ok(SetMembership {
        point,
        lambdas: Some(lambdas),
        constraints,
    })
}

/// Maximizes `direction · x` over `set` and returns the optimal point.
pub(crate) fn support_point(set: &FlexibilitySet, direction: &[f64]) -> Result<OperationPoint> {
    let mut vars = ProblemVariables::new();
    let membership = set_membership(&mut vars, set)?;
    let objective: Expression = membership
        .point
        .iter()
        .zip(direction)
        .map(|(v, d)| *v * *d)
        .sum();

    let mut model = vars.maximise(objective).using(default_solver);
    for c in membership.constraints {
        model = model.with(c);
    }
    let solution = model
        .solve()
        .map_err(|e| failure(e, "evaluating a support function"))?;

    OperationPoint::new(
        membership
            .point
            .iter()
            .map(|v| solution.value(*v))
            .collect(),
    )
}

/// Whether `point` is a convex combination of `vertices`, within `tol`.
pub(crate) fn point_in_hull(
    vertices: &[OperationPoint],
    point: &OperationPoint,
    tol: f64,
) -> Result<bool> {
    if vertices.is_empty() {
        return Err(FlexError::invalid_argument(
            "hull membership needs at least one vertex",
        ));
    }
    let periods = point.len();
    let mut vars = ProblemVariables::new();
    let lambdas = vars.add_vector(variable().min(0.0), vertices.len());

    let mut constraints = Vec::with_capacity(2 * periods + 1);
    let weight_sum: Expression = lambdas.iter().map(|l| *l * 1.0).sum();
    constraints.push(constraint!(weight_sum == 1.0));
    for t in 0..periods {
        let combo: Expression = lambdas
            .iter()
            .zip(vertices)
            .map(|(l, v)| *l * v[t])
            .sum();
        constraints.push(constraint!(combo.clone() <= point[t] + tol));
        constraints.push(constraint!(combo >= point[t] - tol));
    }

    let objective: Expression = lambdas.iter().map(|l| *l * 1.0).sum();
    let mut model = vars.minimise(objective).using(default_solver);
    for c in constraints {
        model = model.with(c);
    }
    match model.solve() {
        Ok(_) => Ok(true),
        Err(ResolutionError::Infeasible) => Ok(false),
        Err(e) => Err(failure(e, "testing hull membership")),
    }
}

/// Whether the set admits any operation point at all.
pub(crate) fn is_feasible(set: &FlexibilitySet) -> Result<bool> {
    let mut vars = ProblemVariables::new();
    let membership = set_membership(&mut vars, set)?;
    // Zero objective: the solve is a pure feasibility probe.
    let objective: Expression = membership.point.iter().map(|v| *v * 0.0).sum();
    let mut model = vars.minimise(objective).using(default_solver);
    for c in membership.constraints {
        model = model.with(c);
    }
    match model.solve() {
        Ok(_) => Ok(true),
        Err(ResolutionError::Infeasible) => Ok(false),
        Err(e) => Err(failure(e, "probing feasibility")),
    }
}

/// Maps an LP backend status to the crate error type.
pub(crate) fn failure(err: ResolutionError, context: &str) -> FlexError {
    let status = match &err {
        ResolutionError::Unbounded => "unbounded".to_string(),
        ResolutionError::Infeasible => "infeasible".to_string(),
        other => other.to_string(),
    };
    FlexError::SolverFailure {
        status,
        context: context.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::HalfspaceSystem;

    fn square() -> FlexibilitySet {
        FlexibilitySet::from_halfspaces(
            HalfspaceSystem::builder(2)
                .interval(0, 0.0, 1.0)
                .unwrap()
                .interval(1, 0.0, 1.0)
                .unwrap()
                .build()
                .unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_support_point_reaches_the_far_corner() {
        let p = support_point(&square(), &[1.0, 1.0]).unwrap();
        assert!(p.distance(&OperationPoint::new(vec![1.0, 1.0]).unwrap()) < 1e-6);
    }

    #[test]
    fn test_support_point_reports_unbounded_directions() {
        let halfplane = FlexibilitySet::from_halfspaces(
            HalfspaceSystem::builder(2)
                .leq(vec![1.0, 0.0], 1.0)
                .unwrap()
                .leq(vec![0.0, 1.0], 1.0)
                .unwrap()
                .build()
                .unwrap(),
        )
        .unwrap();
        let err = support_point(&halfplane, &[-1.0, 0.0]).unwrap_err();
        assert!(matches!(err, FlexError::SolverFailure { .. }));
    }

    #[test]
    fn test_point_in_hull() {
        let corners: Vec<OperationPoint> = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]]
            .into_iter()
            .map(|c| OperationPoint::new(c.to_vec()).unwrap())
            .collect();
        let inside = OperationPoint::new(vec![0.25, 0.75]).unwrap();
        let outside = OperationPoint::new(vec![1.25, 0.5]).unwrap();
        assert!(point_in_hull(&corners, &inside, 1e-7).unwrap());
        assert!(!point_in_hull(&corners, &outside, 1e-7).unwrap());
    }

    #[test]
    fn test_feasibility_probe() {
        assert!(is_feasible(&square()).unwrap());
        let empty = FlexibilitySet::from_halfspaces(
            HalfspaceSystem::builder(1)
                .leq(vec![1.0], 0.0)
                .unwrap()
                .geq(vec![1.0], 1.0)
                .unwrap()
                .build()
                .unwrap(),
        )
        .unwrap();
        assert!(!is_feasible(&empty).unwrap());
    }
}
