//! flexpool - virtual flexibility aggregation and dispatch for distributed
//! energy storage.
//!
//! The engine models each storage device's feasible power-time behavior as a
//! convex polytope ([`geometry::FlexibilitySet`]), combines fleets of them
//! into one virtual polytope ([`aggregation::Aggregator`], with exact and
//! LP-driven approximate algorithms), and dispatches against a system
//! objective either directly over the physical fleet
//! ([`dispatch::CentralizedController`]) or over the aggregate's vertex hull
//! with exact disaggregation bookkeeping
//! ([`dispatch::VertexBasedController`]).
//!
//! The crate is a batch computational library: entities are built once per
//! run and immutable afterwards, every solve is a pure function of its
//! inputs, and all randomness lives behind explicit seeds. Demand and price
//! series, device parameter tables and result rendering belong to external
//! collaborators and enter or leave as plain data.

pub mod aggregation;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod error;
pub mod export;
pub mod geometry;
pub mod physical;
pub(crate) mod solver;

pub use aggregation::{AggregatedFlexibilitySet, AggregationLimits, Aggregator};
pub use config::EngineConfig;
pub use dispatch::{CentralizedController, Dispatch, DispatchObjective, VertexBasedController};
pub use domain::{
    Algorithm, DemandSeries, ObjectiveKind, OperationPoint, PriceSeries, TimeHorizon,
};
pub use error::{FlexError, Result};
pub use geometry::{FlexibilitySet, SignalVector, SignalVectorSet};
pub use physical::{ElectricVehicle, PhysicalResource, StorageHardware, UsageSchedule};
