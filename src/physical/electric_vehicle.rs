//! Electric-vehicle adapter: turns hardware limits and a usage schedule
//! into a flexibility polytope.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::TimeHorizon;
use crate::error::{FlexError, Result};
use crate::geometry::{FlexibilitySet, HalfspaceSystem};
use crate::physical::{PhysicalResource, StorageHardware, UsageSchedule};
use crate::solver;

/// Adapter for one electric vehicle.
///
/// The feasible region is a per-period power box (clamped to zero while the
/// vehicle is away) coupled through running stored-energy bounds and an
/// optional departure energy target. All coupling is linear, so the region
/// is a convex polytope encoded as a half-space system; the exact
/// aggregation path vertex-enumerates it on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectricVehicle {
    id: String,
    hardware: StorageHardware,
    schedule: UsageSchedule,
}

impl ElectricVehicle {
    pub fn new(
        id: impl Into<String>,
        hardware: StorageHardware,
        schedule: UsageSchedule,
    ) -> Self {
        Self {
            id: id.into(),
            hardware,
            schedule,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Encodes the device constraints over `horizon`.
    ///
    /// Power convention: charging positive, discharging negative, net kW at
    /// the connection point. Stored energy after period `t` is
    /// `initial + dt · (x_0 + … + x_t)`.
    pub fn to_flexibility_set(&self, horizon: &TimeHorizon) -> Result<FlexibilitySet> {
        self.hardware.validate()?;
        self.schedule.validate(horizon)?;

        let periods = horizon.periods();
        let dt = horizon.dt_hours();
        let e0 = self.schedule.initial_energy_kwh;
        let mut builder = HalfspaceSystem::builder(periods);

        for (t, &connected) in self.schedule.availability.iter().enumerate() {
            if connected {
                builder = builder.interval(
                    t,
                    -self.hardware.max_discharge_kw,
                    self.hardware.max_charge_kw,
                )?;
            } else {
                builder = builder.interval(t, 0.0, 0.0)?;
            }
        }

        // Running energy bounds: e_min <= e0 + dt * prefix_sum(x, t) <= e_max.
        for t in 0..periods {
            let mut prefix = vec![0.0; periods];
            for coeff in prefix.iter_mut().take(t + 1) {
                *coeff = dt;
            }
            builder = builder.leq(prefix.clone(), self.hardware.energy_max_kwh - e0)?;
            builder = builder.geq(prefix, self.hardware.energy_min_kwh - e0)?;
        }

        if let Some(required) = self.schedule.required_final_energy_kwh {
            let departure = self.schedule.departure_period().unwrap_or(periods - 1);
            let mut prefix = vec![0.0; periods];
            for coeff in prefix.iter_mut().take(departure + 1) {
                *coeff = dt;
            }
            builder = builder.geq(prefix, required - e0)?;
        }

        let set = FlexibilitySet::from_halfspaces(builder.build()?)?;

        if !solver::is_feasible(&set)? {
            return Err(FlexError::InfeasibleResource {
                id: self.id.clone(),
            });
        }

        debug!(
            id = %self.id,
            periods,
            connected = self.schedule.connected_periods(),
            constraints = set.halfspaces().map(|h| h.len()).unwrap_or(0),
            "derived electric-vehicle flexibility set"
        );

        Ok(set)
    }

    /// Builds the immutable [`PhysicalResource`] for this vehicle.
    pub fn commission(self, horizon: &TimeHorizon) -> Result<PhysicalResource> {
        let flexibility = self.to_flexibility_set(horizon)?;
        Ok(PhysicalResource::new(
            self.id,
            self.hardware,
            self.schedule,
            *horizon,
            flexibility,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OperationPoint;

    fn hardware() -> StorageHardware {
        StorageHardware {
            energy_min_kwh: 0.0,
            energy_max_kwh: 100.0,
            max_charge_kw: 10.0,
            max_discharge_kw: 10.0,
        }
    }

    #[test]
    fn test_always_connected_vehicle_is_a_box_with_energy_coupling() {
        let horizon = TimeHorizon::new(2, 1.0).unwrap();
        let ev = ElectricVehicle::new(
            "ev-0",
            hardware(),
            UsageSchedule::always_connected(&horizon, 50.0),
        );
        let set = ev.to_flexibility_set(&horizon).unwrap();

        assert!(set
            .contains(&OperationPoint::new(vec![10.0, -10.0]).unwrap(), 1e-9)
            .unwrap());
        assert!(!set
            .contains(&OperationPoint::new(vec![11.0, 0.0]).unwrap(), 1e-9)
            .unwrap());

        let vertices = set.to_vertices().unwrap();
        assert_eq!(vertices.len(), 4);
    }

    #[test]
    fn test_energy_ceiling_cuts_the_charge_corner() {
        // 60 kWh of headroom, up to 40 kWh per period: charging flat out in
        // both periods would overshoot the ceiling.
        let horizon = TimeHorizon::new(2, 4.0).unwrap();
        let ev = ElectricVehicle::new(
            "ev-0",
            StorageHardware {
                energy_min_kwh: 0.0,
                energy_max_kwh: 100.0,
                max_charge_kw: 10.0,
                max_discharge_kw: 0.0,
            },
            UsageSchedule::always_connected(&horizon, 40.0),
        );
        let set = ev.to_flexibility_set(&horizon).unwrap();
        assert!(!set
            .contains(&OperationPoint::new(vec![10.0, 10.0]).unwrap(), 1e-9)
            .unwrap());
        assert!(set
            .contains(&OperationPoint::new(vec![10.0, 5.0]).unwrap(), 1e-9)
            .unwrap());
    }

    #[test]
    fn test_disconnected_periods_pin_power_to_zero() {
        let horizon = TimeHorizon::new(3, 1.0).unwrap();
        let ev = ElectricVehicle::new(
            "ev-0",
            hardware(),
            UsageSchedule {
                availability: vec![true, false, true],
                initial_energy_kwh: 50.0,
                required_final_energy_kwh: None,
            },
        );
        let set = ev.to_flexibility_set(&horizon).unwrap();
        assert!(set
            .contains(&OperationPoint::new(vec![5.0, 0.0, -5.0]).unwrap(), 1e-9)
            .unwrap());
        assert!(!set
            .contains(&OperationPoint::new(vec![5.0, 1.0, 0.0]).unwrap(), 1e-9)
            .unwrap());
    }

    #[test]
    fn test_unreachable_departure_target_is_infeasible() {
        let horizon = TimeHorizon::new(2, 1.0).unwrap();
        let ev = ElectricVehicle::new(
            "ev-late",
            StorageHardware {
                energy_min_kwh: 0.0,
                energy_max_kwh: 100.0,
                max_charge_kw: 5.0,
                max_discharge_kw: 0.0,
            },
            UsageSchedule {
                availability: vec![true, true],
                initial_energy_kwh: 10.0,
                // 5 kW for 2 h can add at most 10 kWh.
                required_final_energy_kwh: Some(30.0),
            },
        );
        let err = ev.commission(&horizon).unwrap_err();
        match err {
            FlexError::InfeasibleResource { id } => assert_eq!(id, "ev-late"),
            other => panic!("expected InfeasibleResource, got {other:?}"),
        }
    }

    #[test]
    fn test_initial_energy_above_ceiling_is_infeasible_when_parked() {
        let horizon = TimeHorizon::new(2, 1.0).unwrap();
        let ev = ElectricVehicle::new(
            "ev-full",
            StorageHardware {
                energy_min_kwh: 0.0,
                energy_max_kwh: 40.0,
                max_charge_kw: 10.0,
                max_discharge_kw: 0.0,
            },
            UsageSchedule {
                availability: vec![false, false],
                initial_energy_kwh: 50.0,
                required_final_energy_kwh: None,
            },
        );
        assert!(matches!(
            ev.to_flexibility_set(&horizon),
            Err(FlexError::InfeasibleResource { .. })
        ));
    }

    #[test]
    fn test_commission_carries_the_derived_set() {
        let horizon = TimeHorizon::new(2, 1.0).unwrap();
        let resource = ElectricVehicle::new(
            "ev-7",
            hardware(),
            UsageSchedule::always_connected(&horizon, 50.0),
        )
        .commission(&horizon)
        .unwrap();
        assert_eq!(resource.id(), "ev-7");
        assert_eq!(resource.flexibility().periods(), 2);
        assert_eq!(resource.horizon().periods(), 2);
    }
}
