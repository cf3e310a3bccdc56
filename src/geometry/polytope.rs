//! Convex feasible-operation polytopes.

use serde::{Deserialize, Serialize};

use crate::domain::OperationPoint;
use crate::error::{FlexError, Result};
use crate::geometry::vertex_enum::enumerate_vertices;
use crate::geometry::HalfspaceSystem;
use crate::solver;

/// Slack allowed when cross-checking declared vertices against declared
/// half-spaces at construction.
const CONSISTENCY_TOL: f64 = 1e-6;

/// The feasible power-time region of one resource or of an aggregate: a
/// convex polytope in ℝ^T held as an explicit vertex list, a half-space
/// system, or both.
///
/// Immutable after construction. When both representations are present,
/// every declared vertex satisfies every declared half-space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlexibilitySet {
    periods: usize,
    vertices: Option<Vec<OperationPoint>>,
    halfspaces: Option<HalfspaceSystem>,
}

impl FlexibilitySet {
    /// A polytope given as the convex hull of explicit operation points.
    pub fn from_vertices(vertices: Vec<OperationPoint>) -> Result<Self> {
        Self::new(vertices.first().map(|v| v.len()).unwrap_or(0), Some(vertices), None)
    }

    /// A polytope given as an inequality system `A x <= b`.
    pub fn from_halfspaces(halfspaces: HalfspaceSystem) -> Result<Self> {
        Self::new(halfspaces.dim(), None, Some(halfspaces))
    }

    /// A polytope carrying both representations.
    pub fn with_representations(
        vertices: Vec<OperationPoint>,
        halfspaces: HalfspaceSystem,
    ) -> Result<Self> {
        Self::new(halfspaces.dim(), Some(vertices), Some(halfspaces))
    }

    fn new(
        periods: usize,
        vertices: Option<Vec<OperationPoint>>,
        halfspaces: Option<HalfspaceSystem>,
    ) -> Result<Self> {
        match (&vertices, &halfspaces) {
            (None, None) => {
                return Err(FlexError::invalid_argument(
                    "flexibility set needs a vertex or half-space representation",
                ))
            }
            (Some(vs), _) if vs.is_empty() => {
                return Err(FlexError::invalid_argument(
                    "flexibility set vertex list is empty",
                ))
            }
            _ => {}
        }
        if periods == 0 {
            return Err(FlexError::invalid_argument(
                "flexibility set needs at least one period",
            ));
        }
        if let Some(vs) = &vertices {
            for v in vs {
                if v.len() != periods {
                    return Err(FlexError::dimension_mismatch(
                        "flexibility set vertex",
                        periods,
                        v.len(),
                    ));
                }
            }
        }
        if let Some(hs) = &halfspaces {
            if hs.dim() != periods {
                return Err(FlexError::dimension_mismatch(
                    "flexibility set half-spaces",
                    periods,
                    hs.dim(),
                ));
            }
            if let Some(vs) = &vertices {
                for v in vs {
                    if !hs.contains(v.as_slice(), CONSISTENCY_TOL)? {
                        return Err(FlexError::invalid_argument(format!(
                            "declared vertex {:?} violates the declared half-spaces by {:.3e}",
                            v.as_slice(),
                            hs.violation(v.as_slice())?
                        )));
                    }
                }
            }
        }
        Ok(Self {
            periods,
            vertices,
            halfspaces,
        })
    }

    pub fn periods(&self) -> usize {
        self.periods
    }

    pub fn vertices(&self) -> Option<&[OperationPoint]> {
        self.vertices.as_deref()
    }

    pub fn halfspaces(&self) -> Option<&HalfspaceSystem> {
        self.halfspaces.as_ref()
    }

    /// The vertex representation: the stored list, or an enumeration of the
    /// half-space system for sets built from inequalities alone.
    ///
    /// Enumeration is combinatorial in the constraint count and intended for
    /// the short horizons the exact aggregation path targets.
    pub fn to_vertices(&self) -> Result<Vec<OperationPoint>> {
        if let Some(vs) = &self.vertices {
            return Ok(vs.clone());
        }
        let system = self
            .halfspaces
            .as_ref()
            .expect("constructor guarantees one representation");
        let vertices = enumerate_vertices(system)?;
        if vertices.is_empty() {
            return Err(FlexError::invalid_argument(
                "half-space system admits no vertices",
            ));
        }
        Ok(vertices)
    }

    /// A boundary point maximizing `direction · x` over the polytope.
    pub fn support(&self, direction: &[f64]) -> Result<OperationPoint> {
        if direction.len() != self.periods {
            return Err(FlexError::dimension_mismatch(
                "support direction",
                self.periods,
                direction.len(),
            ));
        }
        if direction.iter().any(|d| !d.is_finite()) {
            return Err(FlexError::invalid_argument(
                "support direction contains a non-finite component",
            ));
        }
        if let Some(vs) = &self.vertices {
            let best = vs
                .iter()
                .max_by(|a, b| {
                    a.dot(direction)
                        .partial_cmp(&b.dot(direction))
                        .expect("finite dot products")
                })
                .expect("vertex list is non-empty");
            return Ok(best.clone());
        }
        solver::support_point(self, direction)
    }

    /// Whether `point` lies in the polytope, within `tol`.
    ///
    /// Uses the half-space test when available, otherwise a convex-hull
    /// membership LP over the vertex list.
    pub fn contains(&self, point: &OperationPoint, tol: f64) -> Result<bool> {
        if point.len() != self.periods {
            return Err(FlexError::dimension_mismatch(
                "polytope membership",
                self.periods,
                point.len(),
            ));
        }
        if let Some(hs) = &self.halfspaces {
            return hs.contains(point.as_slice(), tol);
        }
        let vertices = self.vertices.as_ref().expect("one representation present");
        solver::point_in_hull(vertices, point, tol)
    }
}
