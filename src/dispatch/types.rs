use serde::{Deserialize, Serialize};

use crate::domain::{DemandSeries, OperationPoint, PriceSeries};
use crate::error::Result;

/// The outcome of one dispatch optimization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dispatch {
    /// Fleet-level power trajectory (sum of the per-resource points).
    pub aggregate: OperationPoint,
    /// One operation point per resource, in input order.
    pub per_resource: Vec<OperationPoint>,
    /// Value of the minimized objective at the solution.
    pub objective_value: f64,
    /// Convex-combination weights over the aggregate's vertices, present
    /// for vertex-based dispatches.
    pub weights: Option<Vec<f64>>,
}

impl Dispatch {
    /// Euclidean deviation of total power (fleet + baseline demand).
    pub fn deviation(&self, demand: &DemandSeries) -> Result<f64> {
        let baseline = OperationPoint::new(demand.as_slice().to_vec())?;
        Ok(self.aggregate.add(&baseline)?.norm())
    }

    /// Energy cost of total power (fleet + baseline demand) over the run.
    pub fn energy_cost(
        &self,
        prices: &PriceSeries,
        demand: &DemandSeries,
        dt_hours: f64,
    ) -> Result<f64> {
        let baseline = OperationPoint::new(demand.as_slice().to_vec())?;
        let total = self.aggregate.add(&baseline)?;
        Ok(total
            .iter()
            .zip(prices.as_slice())
            .map(|(x, p)| p * x * dt_hours)
            .sum())
    }
}
