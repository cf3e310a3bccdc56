use serde::{Deserialize, Serialize};

use crate::error::{FlexError, Result};

/// A finite system of linear inequalities `a_i · x <= b_i` over ℝ^T.
///
/// Rows are kept in insertion order; the builder is the only mutation point
/// and the system is frozen once handed to a polytope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HalfspaceSystem {
    dim: usize,
    normals: Vec<Vec<f64>>,
    offsets: Vec<f64>,
}

impl HalfspaceSystem {
    pub fn builder(dim: usize) -> HalfspaceBuilder {
        HalfspaceBuilder {
            dim,
            normals: Vec::new(),
            offsets: Vec::new(),
        }
    }

    /// Space dimension T.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of inequality rows.
    pub fn len(&self) -> usize {
        self.normals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.normals.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = (&[f64], f64)> {
        self.normals
            .iter()
            .map(|n| n.as_slice())
            .zip(self.offsets.iter().copied())
    }

    pub fn normal(&self, row: usize) -> &[f64] {
        &self.normals[row]
    }

    pub fn offset(&self, row: usize) -> f64 {
        self.offsets[row]
    }

    /// Whether `point` satisfies every inequality within `tol`.
    pub fn contains(&self, point: &[f64], tol: f64) -> Result<bool> {
        if point.len() != self.dim {
            return Err(FlexError::dimension_mismatch(
                "half-space membership",
                self.dim,
                point.len(),
            ));
        }
        Ok(self.rows().all(|(normal, offset)| {
            let lhs: f64 = normal.iter().zip(point).map(|(a, x)| a * x).sum();
            lhs <= offset + tol
        }))
    }

    /// Largest violation of any inequality at `point` (zero when inside).
    pub fn violation(&self, point: &[f64]) -> Result<f64> {
        if point.len() != self.dim {
            return Err(FlexError::dimension_mismatch(
                "half-space violation",
                self.dim,
                point.len(),
            ));
        }
        Ok(self
            .rows()
            .map(|(normal, offset)| {
                let lhs: f64 = normal.iter().zip(point).map(|(a, x)| a * x).sum();
                lhs - offset
            })
            .fold(0.0_f64, f64::max))
    }
}

/// Incremental builder for a [`HalfspaceSystem`].
#[derive(Debug)]
pub struct HalfspaceBuilder {
    dim: usize,
    normals: Vec<Vec<f64>>,
    offsets: Vec<f64>,
}

impl HalfspaceBuilder {
    /// Adds the inequality `normal · x <= offset`.
    pub fn leq(mut self, normal: Vec<f64>, offset: f64) -> Result<Self> {
        if normal.len() != self.dim {
            return Err(FlexError::dimension_mismatch(
                "half-space row",
                self.dim,
                normal.len(),
            ));
        }
        if normal.iter().any(|v| !v.is_finite()) || !offset.is_finite() {
            return Err(FlexError::invalid_argument(
                "half-space row contains a non-finite coefficient",
            ));
        }
        self.normals.push(normal);
        self.offsets.push(offset);
        Ok(self)
    }

    /// Adds `normal · x >= offset` as the flipped inequality.
    pub fn geq(self, normal: Vec<f64>, offset: f64) -> Result<Self> {
        let flipped = normal.into_iter().map(|v| -v).collect();
        self.leq(flipped, -offset)
    }

    /// Adds a per-coordinate interval bound `lo <= x_i <= hi`.
    pub fn interval(mut self, coord: usize, lo: f64, hi: f64) -> Result<Self> {
        if lo > hi {
            return Err(FlexError::invalid_argument(format!(
                "interval bound is inverted: [{lo}, {hi}]"
            )));
        }
        let mut unit = vec![0.0; self.dim];
        unit[coord] = 1.0;
        self = self.leq(unit.clone(), hi)?;
        unit[coord] = -1.0;
        self.leq(unit, -lo)
    }

    pub fn build(self) -> Result<HalfspaceSystem> {
        if self.normals.is_empty() {
            return Err(FlexError::invalid_argument(
                "half-space system needs at least one row",
            ));
        }
        Ok(HalfspaceSystem {
            dim: self.dim,
            normals: self.normals,
            offsets: self.offsets,
        })
    }
}
