//! Read-only export surface for rendering and reporting collaborators.
//!
//! Plotting lives outside the engine; what it needs is the vertex and
//! inequality data of the polytopes plus the dispatched trajectories, as
//! plain JSON. The engine has no opinion on how any of it is drawn.

use serde::Serialize;

use crate::error::{FlexError, Result};

/// Serializes any engine entity to a JSON value.
///
/// All core types ([`crate::geometry::FlexibilitySet`],
/// [`crate::aggregation::AggregatedFlexibilitySet`],
/// [`crate::dispatch::Dispatch`], the series types) derive `Serialize`, so
/// this is the whole export contract.
pub fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value> {
    serde_json::to_value(value)
        .map_err(|e| FlexError::invalid_argument(format!("export serialization failed: {e}")))
}

/// Serializes any engine entity to a JSON string.
pub fn to_json_string<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| FlexError::invalid_argument(format!("export serialization failed: {e}")))
}
