use serde::{Deserialize, Serialize};

use crate::domain::TimeHorizon;
use crate::error::{FlexError, Result};

/// Hardware envelope of one storage device.
///
/// Concrete per-model parameter tables live with the data-loading
/// collaborator; the engine only consumes the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StorageHardware {
    /// Lowest usable stored energy (kWh).
    pub energy_min_kwh: f64,
    /// Highest usable stored energy (kWh).
    pub energy_max_kwh: f64,
    /// Charging power limit (kW, >= 0).
    pub max_charge_kw: f64,
    /// Discharging power limit (kW, >= 0; 0 for unidirectional chargers).
    pub max_discharge_kw: f64,
}

impl StorageHardware {
    pub fn validate(&self) -> Result<()> {
        let values = [
            self.energy_min_kwh,
            self.energy_max_kwh,
            self.max_charge_kw,
            self.max_discharge_kw,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(FlexError::invalid_parameter(
                "storage hardware contains a non-finite value",
            ));
        }
        if self.energy_min_kwh < 0.0 || self.energy_max_kwh < self.energy_min_kwh {
            return Err(FlexError::invalid_parameter(format!(
                "storage energy bounds are inverted or negative: [{}, {}] kWh",
                self.energy_min_kwh, self.energy_max_kwh
            )));
        }
        if self.max_charge_kw < 0.0 || self.max_discharge_kw < 0.0 {
            return Err(FlexError::invalid_parameter(
                "storage power limits must be non-negative",
            ));
        }
        Ok(())
    }

    /// Usable energy span (kWh).
    pub fn usable_energy_kwh(&self) -> f64 {
        self.energy_max_kwh - self.energy_min_kwh
    }
}

/// When a device is connected and what its energy state must look like.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageSchedule {
    /// Per-period connection flag; a disconnected period pins power to zero.
    pub availability: Vec<bool>,
    /// Stored energy at the start of the horizon (kWh).
    pub initial_energy_kwh: f64,
    /// Energy that must be on board at the last connected period, if any.
    pub required_final_energy_kwh: Option<f64>,
}

impl UsageSchedule {
    /// A device connected for the whole horizon with no departure target.
    pub fn always_connected(horizon: &TimeHorizon, initial_energy_kwh: f64) -> Self {
        Self {
            availability: vec![true; horizon.periods()],
            initial_energy_kwh,
            required_final_energy_kwh: None,
        }
    }

    pub fn validate(&self, horizon: &TimeHorizon) -> Result<()> {
        horizon.ensure("usage schedule", self.availability.len())?;
        if !self.initial_energy_kwh.is_finite() {
            return Err(FlexError::invalid_parameter(
                "initial energy must be finite",
            ));
        }
        if let Some(req) = self.required_final_energy_kwh {
            if !req.is_finite() || req < 0.0 {
                return Err(FlexError::invalid_parameter(format!(
                    "required final energy must be finite and non-negative, got {req}"
                )));
            }
        }
        Ok(())
    }

    /// Index of the last connected period, if the device connects at all.
    pub fn departure_period(&self) -> Option<usize> {
        self.availability.iter().rposition(|&connected| connected)
    }

    pub fn connected_periods(&self) -> usize {
        self.availability.iter().filter(|&&c| c).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hardware_validation() {
        let good = StorageHardware {
            energy_min_kwh: 10.0,
            energy_max_kwh: 100.0,
            max_charge_kw: 11.0,
            max_discharge_kw: 0.0,
        };
        assert!(good.validate().is_ok());
        assert!((good.usable_energy_kwh() - 90.0).abs() < 1e-12);

        let inverted = StorageHardware {
            energy_min_kwh: 50.0,
            energy_max_kwh: 10.0,
            ..good
        };
        assert!(inverted.validate().is_err());

        let negative_power = StorageHardware {
            max_charge_kw: -1.0,
            ..good
        };
        assert!(negative_power.validate().is_err());
    }

    #[test]
    fn test_schedule_departure_period() {
        let horizon = TimeHorizon::new(4, 6.0).unwrap();
        let schedule = UsageSchedule {
            availability: vec![false, true, true, false],
            initial_energy_kwh: 20.0,
            required_final_energy_kwh: Some(40.0),
        };
        assert!(schedule.validate(&horizon).is_ok());
        assert_eq!(schedule.departure_period(), Some(2));
        assert_eq!(schedule.connected_periods(), 2);

        let parked = UsageSchedule {
            availability: vec![false; 4],
            initial_energy_kwh: 20.0,
            required_final_energy_kwh: None,
        };
        assert_eq!(parked.departure_period(), None);
    }

    #[test]
    fn test_schedule_length_must_match_horizon() {
        let horizon = TimeHorizon::new(4, 6.0).unwrap();
        let short = UsageSchedule {
            availability: vec![true; 3],
            initial_energy_kwh: 0.0,
            required_final_energy_kwh: None,
        };
        assert!(matches!(
            short.validate(&horizon),
            Err(FlexError::DimensionMismatch { .. })
        ));
    }
}
