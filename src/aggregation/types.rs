use serde::{Deserialize, Serialize};

use crate::domain::{Algorithm, OperationPoint};
use crate::error::{FlexError, Result};
use crate::geometry::FlexibilitySet;
use crate::solver;

/// Default bound on the vertex count of an incremental aggregation.
pub const DEFAULT_VERTEX_CAP: usize = 64;

/// Per-coordinate slack allowed between an aggregate vertex and the sum of
/// its recorded per-resource decomposition.
const DECOMPOSITION_TOL: f64 = 1e-5;

/// Weight-vector slack accepted by [`AggregatedFlexibilitySet::disaggregate`].
const WEIGHT_TOL: f64 = 1e-6;

/// Tunables for the approximate aggregation algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationLimits {
    /// Hard bound on the vertex count an incremental aggregation may emit.
    pub vertex_cap: usize,
}

impl Default for AggregationLimits {
    fn default() -> Self {
        Self {
            vertex_cap: DEFAULT_VERTEX_CAP,
        }
    }
}

/// The virtualized fleet: one polytope standing in for many resources.
///
/// Besides the vertex-form [`FlexibilitySet`], it carries a side-table
/// mapping each aggregate vertex to the per-resource operation points it was
/// built from. That table is what makes a vertex-based dispatch decision
/// translatable back into per-device set-points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedFlexibilitySet {
    algorithm: Algorithm,
    resource_ids: Vec<String>,
    flexibility: FlexibilitySet,
    decompositions: Vec<Vec<OperationPoint>>,
}

impl AggregatedFlexibilitySet {
    pub(crate) fn new(
        algorithm: Algorithm,
        resource_ids: Vec<String>,
        vertices: Vec<OperationPoint>,
        decompositions: Vec<Vec<OperationPoint>>,
    ) -> Result<Self> {
        if vertices.len() != decompositions.len() {
            return Err(FlexError::invalid_argument(format!(
                "aggregate has {} vertices but {} decomposition rows",
                vertices.len(),
                decompositions.len()
            )));
        }
        for (vertex, parts) in vertices.iter().zip(&decompositions) {
            if parts.len() != resource_ids.len() {
                return Err(FlexError::invalid_argument(format!(
                    "decomposition row covers {} of {} resources",
                    parts.len(),
                    resource_ids.len()
                )));
            }
            let total = OperationPoint::sum_of(parts.iter())?;
            for (a, b) in total.iter().zip(vertex.iter()) {
                if (a - b).abs() > DECOMPOSITION_TOL * (1.0 + b.abs()) {
                    return Err(FlexError::invalid_argument(format!(
                        "decomposition sums to {a:.6}, vertex coordinate is {b:.6}"
                    )));
                }
            }
        }
        let flexibility = FlexibilitySet::from_vertices(vertices)?;
        Ok(Self {
            algorithm,
            resource_ids,
            flexibility,
            decompositions,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Ids of the aggregated resources, in decomposition order.
    pub fn resource_ids(&self) -> &[String] {
        &self.resource_ids
    }

    pub fn n_resources(&self) -> usize {
        self.resource_ids.len()
    }

    pub fn periods(&self) -> usize {
        self.flexibility.periods()
    }

    pub fn flexibility(&self) -> &FlexibilitySet {
        &self.flexibility
    }

    pub fn vertices(&self) -> &[OperationPoint] {
        self.flexibility
            .vertices()
            .expect("aggregate is always vertex-form")
    }

    pub fn n_vertices(&self) -> usize {
        self.vertices().len()
    }

    /// The per-resource operation points recorded for vertex `index`.
    pub fn decomposition(&self, index: usize) -> &[OperationPoint] {
        &self.decompositions[index]
    }

    /// Whether `point` lies in the aggregate polytope, within `tol`.
    pub fn contains(&self, point: &OperationPoint, tol: f64) -> Result<bool> {
        solver::point_in_hull(self.vertices(), point, tol)
    }

    /// Maps convex-combination weights over the aggregate vertices to one
    /// operation point per resource.
    ///
    /// The weights must be non-negative and sum to one (within solver
    /// slack); tiny negative values are clamped and the vector is
    /// renormalized before mixing.
    pub fn disaggregate(&self, weights: &[f64]) -> Result<Vec<OperationPoint>> {
        if weights.len() != self.n_vertices() {
            return Err(FlexError::dimension_mismatch(
                "disaggregation weights",
                self.n_vertices(),
                weights.len(),
            ));
        }
        if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < -WEIGHT_TOL) {
            return Err(FlexError::invalid_argument(format!(
                "disaggregation weight {bad} is negative or non-finite"
            )));
        }
        let clamped: Vec<f64> = weights.iter().map(|w| w.max(0.0)).collect();
        let total: f64 = clamped.iter().sum();
        if (total - 1.0).abs() > WEIGHT_TOL * self.n_vertices() as f64 + WEIGHT_TOL {
            return Err(FlexError::invalid_argument(format!(
                "disaggregation weights sum to {total}, expected 1"
            )));
        }

        let periods = self.periods();
        let mut per_resource =
            vec![OperationPoint::zero(periods); self.n_resources()];
        for (weight, parts) in clamped.iter().zip(&self.decompositions) {
            let w = weight / total;
            if w == 0.0 {
                continue;
            }
            for (acc, part) in per_resource.iter_mut().zip(parts) {
                *acc = acc.add(&part.scale(w))?;
            }
        }
        Ok(per_resource)
    }
}
