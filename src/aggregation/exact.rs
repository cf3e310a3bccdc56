//! Exact aggregation: the Minkowski sum of the input polytopes.
//!
//! Sums every combination of one vertex per input set and keeps the sums
//! that are extreme points of the result. Cost is the product of the
//! per-resource vertex counts; this path is the fidelity reference and is
//! meant for small fleets over short horizons.

use std::collections::BTreeMap;

use itertools::Itertools;
use ordered_float::OrderedFloat;
use tracing::debug;

use crate::domain::OperationPoint;
use crate::error::Result;
use crate::geometry::FlexibilitySet;
use crate::solver;

/// Slack when discarding a candidate as interior to the hull of the rest.
const HULL_TOL: f64 = 1e-7;

pub(crate) fn aggregate(
    sets: &[&FlexibilitySet],
) -> Result<(Vec<OperationPoint>, Vec<Vec<OperationPoint>>)> {
    let vertex_lists: Vec<Vec<OperationPoint>> = sets
        .iter()
        .map(|set| set.to_vertices())
        .collect::<Result<_>>()?;

    // One candidate per combination of per-resource vertices. The map is
    // keyed on rounded coordinates: coinciding sums collapse to the first
    // decomposition found, and iteration order is deterministic.
    let mut candidates: BTreeMap<Vec<OrderedFloat<f64>>, (OperationPoint, Vec<OperationPoint>)> =
        BTreeMap::new();
    for combo in vertex_lists.iter().multi_cartesian_product() {
        let total = OperationPoint::sum_of(combo.iter().copied())?;
        candidates
            .entry(total.dedup_key())
            .or_insert_with(|| (total, combo.into_iter().cloned().collect()));
    }

    let pool: Vec<(OperationPoint, Vec<OperationPoint>)> = candidates.into_values().collect();
    let mut vertices = Vec::new();
    let mut decompositions = Vec::new();

    for index in 0..pool.len() {
        if pool.len() > 1 {
            let others: Vec<OperationPoint> = pool
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != index)
                .map(|(_, (p, _))| p.clone())
                .collect();
            // A candidate expressible by the remaining candidates is not an
            // extreme point of the sum.
            if solver::point_in_hull(&others, &pool[index].0, HULL_TOL)? {
                continue;
            }
        }
        let (vertex, parts) = pool[index].clone();
        vertices.push(vertex);
        decompositions.push(parts);
    }

    debug!(
        resources = sets.len(),
        candidates = pool.len(),
        vertices = vertices.len(),
        "exact aggregation finished"
    );

    Ok((vertices, decompositions))
}
