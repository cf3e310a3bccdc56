//! Shared fleet fixtures for the integration suites.

#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use flexpool::{
    ElectricVehicle, PhysicalResource, StorageHardware, TimeHorizon, UsageSchedule,
};

pub fn horizon2() -> TimeHorizon {
    TimeHorizon::new(2, 1.0).unwrap()
}

/// A charge-only vehicle whose feasible region over two 1 h periods is the
/// unit square [0, 1]^2: ample energy headroom, 1 kW charge limit.
pub fn unit_square_vehicle(id: &str, horizon: &TimeHorizon) -> PhysicalResource {
    ElectricVehicle::new(
        id,
        StorageHardware {
            energy_min_kwh: 0.0,
            energy_max_kwh: 1000.0,
            max_charge_kw: 1.0,
            max_discharge_kw: 0.0,
        },
        UsageSchedule::always_connected(horizon, 500.0),
    )
    .commission(horizon)
    .unwrap()
}

/// A deterministic fleet of vehicles with varied parameters.
///
/// Every second vehicle is bidirectional; connection windows are sampled
/// per period. Seeded explicitly so every test run sees the same fleet.
pub fn mixed_fleet(n: usize, seed: u64, horizon: &TimeHorizon) -> Vec<PhysicalResource> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let energy_max_kwh = rng.gen_range(40.0..100.0);
            let initial = rng.gen_range(0.2..0.8) * energy_max_kwh;
            let max_charge_kw = rng.gen_range(3.0..11.0);
            let max_discharge_kw = if i % 2 == 0 {
                rng.gen_range(1.0..max_charge_kw)
            } else {
                0.0
            };
            let mut availability: Vec<bool> = (0..horizon.periods())
                .map(|_| rng.gen_bool(0.8))
                .collect();
            if availability.iter().all(|&c| !c) {
                availability[0] = true;
            }
            ElectricVehicle::new(
                format!("ev-{i}"),
                StorageHardware {
                    energy_min_kwh: 0.0,
                    energy_max_kwh,
                    max_charge_kw,
                    max_discharge_kw,
                },
                UsageSchedule {
                    availability,
                    initial_energy_kwh: initial,
                    required_final_energy_kwh: None,
                },
            )
            .commission(horizon)
            .unwrap()
        })
        .collect()
}
