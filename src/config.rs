//! Engine configuration.
//!
//! Loaded from a TOML file merged with `FLEXPOOL__`-prefixed environment
//! variables, then validated into the core's typed parameters. The engine
//! itself never reads configuration implicitly; drivers load a config and
//! pass the resulting values in.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

use crate::aggregation::AggregationLimits;
use crate::domain::{Algorithm, ObjectiveKind, TimeHorizon};
use crate::error::{FlexError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    pub horizon: HorizonConfig,
    pub aggregation: AggregationConfig,
    pub dispatch: DispatchConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HorizonConfig {
    /// Number of time periods T.
    pub periods: usize,
    /// Duration of one period in hours.
    pub dt_hours: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregationConfig {
    pub algorithm: Algorithm,
    /// Signal-vector growth level (sampling rounds).
    pub signal_growth: usize,
    /// Vertex bound for the incremental algorithm.
    pub vertex_cap: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    pub objective: ObjectiveKind,
}

impl EngineConfig {
    /// Loads `flexpool.toml` merged with `FLEXPOOL__`-prefixed environment
    /// variables (`FLEXPOOL__HORIZON__PERIODS=24`, ...).
    pub fn load() -> Result<Self> {
        Self::extract(
            Figment::new()
                .merge(Toml::file("flexpool.toml"))
                .merge(Env::prefixed("FLEXPOOL__").split("__")),
        )
    }

    pub fn from_file(path: &str) -> Result<Self> {
        Self::extract(Figment::new().merge(Toml::file(path)))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Self::extract(Figment::new().merge(Toml::string(raw)))
    }

    fn extract(figment: Figment) -> Result<Self> {
        let config: Self = figment
            .extract()
            .map_err(|e| FlexError::invalid_parameter(format!("configuration error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Cross-field validation beyond what deserialization enforces.
    pub fn validate(&self) -> Result<()> {
        let horizon = self.horizon()?;
        if self.aggregation.signal_growth < 1 {
            return Err(FlexError::invalid_parameter(
                "aggregation.signal_growth must be at least 1",
            ));
        }
        if self.aggregation.algorithm == Algorithm::Iabvg
            && self.aggregation.vertex_cap < horizon.periods() + 1
        {
            return Err(FlexError::invalid_parameter(format!(
                "aggregation.vertex_cap {} cannot span a {}-period polytope",
                self.aggregation.vertex_cap,
                horizon.periods()
            )));
        }
        Ok(())
    }

    pub fn horizon(&self) -> Result<TimeHorizon> {
        TimeHorizon::new(self.horizon.periods, self.horizon.dt_hours)
    }

    pub fn limits(&self) -> AggregationLimits {
        AggregationLimits {
            vertex_cap: self.aggregation.vertex_cap,
        }
    }
}
