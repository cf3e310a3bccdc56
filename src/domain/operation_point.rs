use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::{FlexError, Result};

/// Resolution used when collapsing nearly identical points into one.
/// Two coordinates closer than this are considered the same vertex.
pub(crate) const DEDUP_RESOLUTION: f64 = 1e-7;

/// One feasible power trajectory: a net power value (kW, charging positive)
/// per time period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationPoint(Vec<f64>);

impl OperationPoint {
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(FlexError::invalid_argument(
                "an operation point needs at least one period",
            ));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(FlexError::invalid_argument(format!(
                "operation point contains a non-finite power value: {bad}"
            )));
        }
        Ok(Self(values))
    }

    /// The all-idle trajectory.
    pub fn zero(periods: usize) -> Self {
        Self(vec![0.0; periods])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.0.iter()
    }

    /// Element-wise sum of two trajectories of the same length.
    pub fn add(&self, other: &OperationPoint) -> Result<OperationPoint> {
        if self.len() != other.len() {
            return Err(FlexError::dimension_mismatch(
                "operation point sum",
                self.len(),
                other.len(),
            ));
        }
        Ok(Self(
            self.0
                .iter()
                .zip(other.iter())
                .map(|(a, b)| a + b)
                .collect(),
        ))
    }

    /// Sums a non-empty collection of trajectories.
    pub fn sum_of<'a, I>(points: I) -> Result<OperationPoint>
    where
        I: IntoIterator<Item = &'a OperationPoint>,
    {
        let mut iter = points.into_iter();
        let first = iter
            .next()
            .ok_or_else(|| FlexError::invalid_argument("cannot sum zero operation points"))?;
        let mut total = first.clone();
        for p in iter {
            total = total.add(p)?;
        }
        Ok(total)
    }

    pub fn scale(&self, factor: f64) -> OperationPoint {
        Self(self.0.iter().map(|v| v * factor).collect())
    }

    pub fn dot(&self, direction: &[f64]) -> f64 {
        self.0
            .iter()
            .zip(direction)
            .map(|(a, b)| a * b)
            .sum::<f64>()
    }

    /// Euclidean norm of the trajectory.
    pub fn norm(&self) -> f64 {
        self.0.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    pub fn distance(&self, other: &OperationPoint) -> f64 {
        self.0
            .iter()
            .zip(other.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }

    /// Canonical key for deduplicating numerically identical points.
    pub(crate) fn dedup_key(&self) -> Vec<OrderedFloat<f64>> {
        self.0
            .iter()
            .map(|v| OrderedFloat((v / DEDUP_RESOLUTION).round() * DEDUP_RESOLUTION))
            .collect()
    }
}

impl std::ops::Index<usize> for OperationPoint {
    type Output = f64;

    fn index(&self, period: usize) -> &f64 {
        &self.0[period]
    }
}

impl From<OperationPoint> for Vec<f64> {
    fn from(point: OperationPoint) -> Self {
        point.0
    }
}
