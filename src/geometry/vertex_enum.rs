//! Vertex enumeration for half-space systems.
//!
//! Walks all T-subsets of the inequality rows, solves the corresponding
//! square linear system and keeps the solutions that satisfy every
//! inequality. Combinatorial in the row count, which is acceptable for the
//! short horizons and small constraint systems the exact aggregation path is
//! meant for; the LP-based algorithms never enumerate.

use std::collections::BTreeMap;

use itertools::Itertools;
use nalgebra::{DMatrix, DVector};
use ordered_float::OrderedFloat;
use tracing::debug;

use crate::domain::OperationPoint;
use crate::error::{FlexError, Result};
use crate::geometry::HalfspaceSystem;

/// Feasibility slack when accepting an intersection point as a vertex.
const FEASIBILITY_TOL: f64 = 1e-7;

/// Enumerates the vertices of the polytope `{ x | A x <= b }`.
///
/// The system must describe a bounded polytope; for unbounded input the
/// result only covers the basic feasible points and is not a complete
/// description. Returns an empty list when the system is infeasible.
pub fn enumerate_vertices(system: &HalfspaceSystem) -> Result<Vec<OperationPoint>> {
    let dim = system.dim();
    let rows = system.len();
    if rows < dim {
        return Err(FlexError::invalid_argument(format!(
            "cannot enumerate vertices: {rows} half-spaces in {dim} dimensions \
             describe an unbounded region"
        )));
    }

    // BTreeMap keyed on rounded coordinates: deduplicates degenerate
    // intersections and fixes a deterministic output order.
    let mut found: BTreeMap<Vec<OrderedFloat<f64>>, OperationPoint> = BTreeMap::new();
    let mut combinations = 0usize;

    for subset in (0..rows).combinations(dim) {
        combinations += 1;
        let mut flat = Vec::with_capacity(dim * dim);
        let mut rhs = Vec::with_capacity(dim);
        for &row in &subset {
            flat.extend_from_slice(system.normal(row));
            rhs.push(system.offset(row));
        }
        let a = DMatrix::from_row_slice(dim, dim, &flat);
        let b = DVector::from_vec(rhs);

        let Some(solution) = a.full_piv_lu().solve(&b) else {
            continue;
        };
        let point: Vec<f64> = solution.iter().copied().collect();
        if point.iter().any(|v| !v.is_finite()) {
            continue;
        }
        if !system.contains(&point, FEASIBILITY_TOL)? {
            continue;
        }
        let vertex = OperationPoint::new(point)?;
        found.entry(vertex.dedup_key()).or_insert(vertex);
    }

    debug!(
        rows,
        dim,
        combinations,
        vertices = found.len(),
        "enumerated half-space system"
    );

    Ok(found.into_values().collect())
}
