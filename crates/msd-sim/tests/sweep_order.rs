//! Integration test: parallel sweeps return one independent result per value, in order.

use msd_model::{Law, Msd, State};
use msd_sim::{SimOptions, SweepDefinition, SweepType, run_sweep, run_sweep_with};

#[test]
fn stiffening_sweep_in_input_order() {
    let values = [1.0, 3.0, 5.0, 7.0];
    let opts = SimOptions::adaptive(1e-10, 1e-10);
    let points = run_sweep(
        &values,
        |p| Ok(Msd::default().with_elastic(Law::power(1.0, p as i32))),
        0.0,
        100.0,
        State::new(0.0, 1.0),
        &opts,
    )
    .unwrap();

    assert_eq!(points.len(), values.len());
    for (point, value) in points.iter().zip(values) {
        assert_eq!(point.value, value);
        assert!(point.record.success());
        assert_eq!(point.record.x[0], State::new(0.0, 1.0));
    }

    // Different springs give different trajectories.
    let ends: Vec<f64> = points.iter().map(|p| p.record.last().unwrap().1.x).collect();
    assert!(ends.windows(2).all(|w| (w[0] - w[1]).abs() > 1e-9));
}

#[test]
fn sweep_matches_individual_runs() {
    let def = SweepDefinition::new(0.5, 2.0, 4, SweepType::Linear).unwrap();
    let values = def.generate_points();
    let opts = SimOptions::default();
    let build = |k: f64| Msd::default().with_elastic(Law::linear(k));

    let points = run_sweep(&values, |k| Ok(build(k)), 0.0, 10.0, State::new(1.0, 0.0), &opts).unwrap();

    for point in &points {
        let single = msd_sim::run_sim(
            &msd_sim::MsdSystem::new(build(point.value)),
            0.0,
            10.0,
            State::new(1.0, 0.0),
            &opts,
        )
        .unwrap();
        assert_eq!(single.t, point.record.t);
        assert_eq!(single.x, point.record.x);
    }
}

#[test]
fn sweep_with_per_point_initial_state() {
    // Dead load swept; each run starts at its own static deflection.
    let values = [10.0, 20.0, 40.0];
    let points = run_sweep_with(
        &values,
        |f0| {
            let model = Msd::default()
                .with_elastic(Law::linear(40.0))
                .with_forcing(Law::constant(f0));
            let x0 = State::new(model.static_deflection(0.0), 0.0);
            Ok((model, x0))
        },
        0.0,
        5.0,
        &SimOptions::default(),
    )
    .unwrap();

    for (point, f0) in points.iter().zip(values) {
        let (_, last) = point.record.last().unwrap();
        assert!((last.x - f0 / 40.0).abs() < 1e-6);
    }
}
