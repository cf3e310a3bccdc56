use serde::{Deserialize, Serialize};

use crate::domain::TimeHorizon;
use crate::geometry::FlexibilitySet;
use crate::physical::{StorageHardware, UsageSchedule};

/// One commissioned device: its parameters, its usage window and the
/// flexibility polytope derived from them.
///
/// Built once by a device adapter and never mutated; the driver that owns a
/// fleet lends resources by reference to the aggregator and the centralized
/// controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalResource {
    id: String,
    hardware: StorageHardware,
    schedule: UsageSchedule,
    horizon: TimeHorizon,
    flexibility: FlexibilitySet,
}

impl PhysicalResource {
    pub(crate) fn new(
        id: String,
        hardware: StorageHardware,
        schedule: UsageSchedule,
        horizon: TimeHorizon,
        flexibility: FlexibilitySet,
    ) -> Self {
        Self {
            id,
            hardware,
            schedule,
            horizon,
            flexibility,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn hardware(&self) -> &StorageHardware {
        &self.hardware
    }

    pub fn schedule(&self) -> &UsageSchedule {
        &self.schedule
    }

    pub fn horizon(&self) -> &TimeHorizon {
        &self.horizon
    }

    /// The device's feasible operation region.
    pub fn flexibility(&self) -> &FlexibilitySet {
        &self.flexibility
    }
}
