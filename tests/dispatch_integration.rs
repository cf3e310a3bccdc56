//! End-to-end dispatch scenarios over physical fleets and aggregates.

mod common;

use common::{horizon2, mixed_fleet, unit_square_vehicle};
use flexpool::{
    AggregationLimits, Aggregator, Algorithm, CentralizedController, DemandSeries,
    DispatchObjective, FlexError, OperationPoint, PriceSeries, SignalVectorSet, TimeHorizon,
    VertexBasedController,
};

const TOL: f64 = 1e-6;

fn dense_signals(periods: usize) -> SignalVectorSet {
    SignalVectorSet::generate(periods, SignalVectorSet::recommended_growth(periods)).unwrap()
}

#[test]
fn test_two_unit_squares_against_small_demand() {
    let horizon = horizon2();
    let fleet = vec![
        unit_square_vehicle("ev-0", &horizon),
        unit_square_vehicle("ev-1", &horizon),
    ];
    let demand = DemandSeries::new(&horizon, vec![0.3, 0.3]).unwrap();

    // Charge-only vehicles cannot offset positive demand, so the best the
    // fleet can do is stay idle.
    let centralized = CentralizedController::new(DispatchObjective::power(demand.clone()));
    let dispatch = centralized.optimize(&fleet).unwrap();

    assert!(dispatch.aggregate.norm() < TOL);
    for point in &dispatch.per_resource {
        assert!(point.norm() < TOL);
    }
    let expected = 0.3 * 2.0_f64.sqrt();
    assert!((dispatch.deviation(&demand).unwrap() - expected).abs() < 1e-6);

    // The exact aggregate is the doubled square; the vertex-based dispatch
    // over it reaches the same optimum.
    let exact = Aggregator::from_physical(
        &fleet,
        Algorithm::Exact,
        None,
        AggregationLimits::default(),
    )
    .unwrap();
    assert_eq!(exact.n_vertices(), 4);
    for corner in [[0.0, 0.0], [2.0, 0.0], [0.0, 2.0], [2.0, 2.0]] {
        let target = OperationPoint::new(corner.to_vec()).unwrap();
        assert!(exact.vertices().iter().any(|v| v.distance(&target) < 1e-7));
    }

    let vertex_based = VertexBasedController::new(DispatchObjective::power(demand.clone()));
    let aggregate_dispatch = vertex_based.optimize(&exact).unwrap();
    assert!((aggregate_dispatch.objective_value - dispatch.objective_value).abs() < TOL);
    assert!(aggregate_dispatch.aggregate.norm() < TOL);
}

#[test]
fn test_centralized_is_never_worse_than_approximate_vertex_dispatch() {
    let horizon = horizon2();
    let fleet = mixed_fleet(4, 37, &horizon);
    let demand = DemandSeries::new(&horizon, vec![4.0, 2.5]).unwrap();
    let signals = dense_signals(horizon.periods());

    let centralized = CentralizedController::new(DispatchObjective::power(demand.clone()));
    let reference = centralized.optimize(&fleet).unwrap();

    for algorithm in [Algorithm::Lpvg, Algorithm::Iabvg] {
        let aggregate = Aggregator::from_physical(
            &fleet,
            algorithm,
            Some(&signals),
            AggregationLimits::default(),
        )
        .unwrap();
        let vertex_based =
            VertexBasedController::new(DispatchObjective::power(demand.clone()));
        let dispatch = vertex_based.optimize(&aggregate).unwrap();
        assert!(
            reference.objective_value <= dispatch.objective_value + TOL,
            "{algorithm}: centralized {} beat by vertex-based {}",
            reference.objective_value,
            dispatch.objective_value
        );
    }
}

#[test]
fn test_exact_aggregate_matches_the_centralized_optimum() {
    let horizon = horizon2();
    let fleet = mixed_fleet(2, 91, &horizon);
    let demand = DemandSeries::new(&horizon, vec![3.0, 1.0]).unwrap();

    let centralized = CentralizedController::new(DispatchObjective::power(demand.clone()));
    let reference = centralized.optimize(&fleet).unwrap();

    let exact = Aggregator::from_physical(
        &fleet,
        Algorithm::Exact,
        None,
        AggregationLimits::default(),
    )
    .unwrap();
    let vertex_based = VertexBasedController::new(DispatchObjective::power(demand));
    let dispatch = vertex_based.optimize(&exact).unwrap();

    assert!(
        (reference.objective_value - dispatch.objective_value).abs() < TOL,
        "centralized {} vs exact vertex-based {}",
        reference.objective_value,
        dispatch.objective_value
    );
}

#[test]
fn test_disaggregation_round_trip_reproduces_the_aggregate() {
    let horizon = horizon2();
    let small_fleet = mixed_fleet(2, 53, &horizon);
    let large_fleet = mixed_fleet(5, 53, &horizon);
    let demand = DemandSeries::new(&horizon, vec![6.0, 4.0]).unwrap();
    let signals = dense_signals(horizon.periods());

    // The combinatorial exact path runs on the small fleet; the LP-driven
    // algorithms scale to the larger one.
    for (algorithm, fleet) in [
        (Algorithm::Exact, &small_fleet),
        (Algorithm::Lpvg, &large_fleet),
        (Algorithm::Iabvg, &large_fleet),
    ] {
        let aggregate = Aggregator::from_physical(
            fleet,
            algorithm,
            Some(&signals),
            AggregationLimits::default(),
        )
        .unwrap();
        let dispatch = VertexBasedController::new(DispatchObjective::power(demand.clone()))
            .optimize(&aggregate)
            .unwrap();

        assert_eq!(dispatch.per_resource.len(), fleet.len());
        let summed = OperationPoint::sum_of(dispatch.per_resource.iter()).unwrap();
        assert!(
            summed.distance(&dispatch.aggregate) < TOL,
            "{algorithm}: per-resource sum drifts from the aggregate point"
        );

        // The chosen point must be expressible by the aggregate itself.
        assert!(aggregate.contains(&dispatch.aggregate, TOL).unwrap());

        // And every disaggregated set-point must be feasible for its device.
        for (resource, point) in fleet.iter().zip(&dispatch.per_resource) {
            assert!(
                resource.flexibility().contains(point, TOL).unwrap(),
                "{algorithm}: dispatch for {} is outside its feasible set",
                resource.id()
            );
        }
    }
}

#[test]
fn test_cost_dispatch_shifts_charging_into_the_cheap_period() {
    let horizon = horizon2();
    let fleet = vec![
        unit_square_vehicle("ev-0", &horizon),
        unit_square_vehicle("ev-1", &horizon),
    ];
    let demand = DemandSeries::new(&horizon, vec![0.0, 0.0]).unwrap();
    let prices = PriceSeries::new(&horizon, vec![-0.2, 0.6]).unwrap();

    // A negative price in the first period pays the fleet to charge; the
    // expensive second period stays idle.
    let objective =
        DispatchObjective::cost(demand.clone(), prices.clone(), &horizon).unwrap();
    let dispatch = CentralizedController::new(objective.clone())
        .optimize(&fleet)
        .unwrap();

    assert!((dispatch.aggregate[0] - 2.0).abs() < TOL);
    assert!(dispatch.aggregate[1].abs() < TOL);
    assert!(
        (dispatch.energy_cost(&prices, &demand, horizon.dt_hours()).unwrap()
            - dispatch.objective_value)
            .abs()
            < TOL
    );

    let exact = Aggregator::from_physical(
        &fleet,
        Algorithm::Exact,
        None,
        AggregationLimits::default(),
    )
    .unwrap();
    let vertex_dispatch = VertexBasedController::new(objective)
        .optimize(&exact)
        .unwrap();
    assert!((vertex_dispatch.objective_value - dispatch.objective_value).abs() < TOL);
}

#[test]
fn test_horizon_disagreement_is_rejected() {
    let horizon = horizon2();
    let fleet = vec![unit_square_vehicle("ev-0", &horizon)];

    let wide = TimeHorizon::new(3, 1.0).unwrap();
    let demand = DemandSeries::new(&wide, vec![0.1, 0.1, 0.1]).unwrap();
    let err = CentralizedController::new(DispatchObjective::power(demand))
        .optimize(&fleet)
        .unwrap_err();
    assert!(matches!(err, FlexError::DimensionMismatch { .. }));
}

#[test]
fn test_vertex_controller_rejects_mismatched_aggregate() {
    let horizon = horizon2();
    let fleet = vec![unit_square_vehicle("ev-0", &horizon)];
    let exact = Aggregator::from_physical(
        &fleet,
        Algorithm::Exact,
        None,
        AggregationLimits::default(),
    )
    .unwrap();

    let wide = TimeHorizon::new(3, 1.0).unwrap();
    let demand = DemandSeries::new(&wide, vec![0.1, 0.1, 0.1]).unwrap();
    let err = VertexBasedController::new(DispatchObjective::power(demand))
        .optimize(&exact)
        .unwrap_err();
    assert!(matches!(err, FlexError::DimensionMismatch { .. }));
}
