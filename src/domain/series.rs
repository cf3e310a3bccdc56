//! External time-series inputs consumed by the controllers.
//!
//! The engine treats demand and price data as plain, read-only values; how
//! they are produced (measurement files, random scenario generators) is the
//! data-loading collaborator's concern.

use serde::{Deserialize, Serialize};

use crate::domain::TimeHorizon;
use crate::error::{FlexError, Result};

/// Baseline household power demand per period (kW).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DemandSeries(Vec<f64>);

impl DemandSeries {
    pub fn new(horizon: &TimeHorizon, values: Vec<f64>) -> Result<Self> {
        horizon.ensure("demand series", values.len())?;
        ensure_finite("demand series", &values)?;
        Ok(Self(values))
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
}

/// Energy price per period (currency per kWh).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceSeries(Vec<f64>);

impl PriceSeries {
    pub fn new(horizon: &TimeHorizon, values: Vec<f64>) -> Result<Self> {
        horizon.ensure("price series", values.len())?;
        ensure_finite("price series", &values)?;
        Ok(Self(values))
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
}

/// Per-household demand rows sharing one horizon.
///
/// Controllers only consume the aggregate; the per-household rows are kept
/// so that callers can attribute baseline demand when reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandTable {
    rows: Vec<Vec<f64>>,
    periods: usize,
}

impl DemandTable {
    pub fn new(horizon: &TimeHorizon, rows: Vec<Vec<f64>>) -> Result<Self> {
        if rows.is_empty() {
            return Err(FlexError::invalid_argument(
                "demand table needs at least one household row",
            ));
        }
        for row in &rows {
            horizon.ensure("demand table row", row.len())?;
            ensure_finite("demand table row", row)?;
        }
        Ok(Self {
            rows,
            periods: horizon.periods(),
        })
    }

    pub fn households(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Sum over households, period by period.
    pub fn aggregate(&self, horizon: &TimeHorizon) -> Result<DemandSeries> {
        let mut total = vec![0.0; self.periods];
        for row in &self.rows {
            for (t, v) in row.iter().enumerate() {
                total[t] += v;
            }
        }
        DemandSeries::new(horizon, total)
    }
}

/// Price scenarios sharing one horizon, one row per cost vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTable {
    rows: Vec<Vec<f64>>,
    periods: usize,
}

impl PriceTable {
    pub fn new(horizon: &TimeHorizon, rows: Vec<Vec<f64>>) -> Result<Self> {
        if rows.is_empty() {
            return Err(FlexError::invalid_argument(
                "price table needs at least one cost vector",
            ));
        }
        for row in &rows {
            horizon.ensure("price table row", row.len())?;
            ensure_finite("price table row", row)?;
        }
        Ok(Self {
            rows,
            periods: horizon.periods(),
        })
    }

    pub fn scenarios(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Period-wise mean over all cost vectors.
    pub fn mean_series(&self, horizon: &TimeHorizon) -> Result<PriceSeries> {
        let n = self.rows.len() as f64;
        let mut mean = vec![0.0; self.periods];
        for row in &self.rows {
            for (t, v) in row.iter().enumerate() {
                mean[t] += v / n;
            }
        }
        PriceSeries::new(horizon, mean)
    }
}

fn ensure_finite(entity: &str, values: &[f64]) -> Result<()> {
    if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(FlexError::invalid_argument(format!(
            "{entity} contains a non-finite value: {bad}"
        )));
    }
    Ok(())
}
