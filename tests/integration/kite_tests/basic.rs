use approx::assert_relative_eq;
use kiteflyer::components::{Force, ForceCategory, KiteBody, ReferenceFrame};
use kiteflyer::resources::{PhysicsConfig, Side};
use kiteflyer::{SimulationConfig, WindUpdate};
use nalgebra::Vector3;

use crate::common::{
    assert_position_eq, assert_state_valid, assert_within_limits, create_scenario_config,
    max_line_distance, simulate_duration, TestAppBuilder, FRAME_DT,
};

#[test]
fn test_scenario_stays_on_the_lines() {
    let config = create_scenario_config();
    let physics = config.physics.clone();
    let mut app = TestAppBuilder::new().with_config(config).build();

    // 5 simulated seconds at 60 Hz, bar neutral
    let mut lowest_late = f64::INFINITY;
    app.run_checked(300, 0.0, |engine| {
        let state = engine.state().expect("kite state");
        assert_state_valid(state);
        assert_within_limits(state, &engine.safety_flags(), &physics);
        assert!(
            max_line_distance(engine) <= 15.0 * 1.01,
            "Line stretched to {}",
            max_line_distance(engine)
        );
        assert!(state.position.y > 0.0, "Kite hit the ground: {:?}", state.position);

        // After the launch transient the kite must be airborne on its lines
        if engine.step_count() > 180 {
            assert!(
                !engine.safety_flags().ground_contact,
                "Ground contact at step {}",
                engine.step_count()
            );
            lowest_late = lowest_late.min(state.position.y);
        }
    });
    assert!(lowest_late > 2.0, "Kite sank to {} m", lowest_late);
    let lines = app.engine.lines().expect("line system");
    assert!(lines.left.taut && lines.right.taut);
    assert_eq!(app.engine.step_count(), 300);
    assert_relative_eq!(app.engine.simulated_time(), 5.0, epsilon = 1e-9);
}

#[test]
fn test_zero_wind_kite_falls_and_rests_on_ground() {
    let mut app = TestAppBuilder::new().with_wind(0.0, 0.0, 0.0).build();
    let start = app.engine.position();

    let positions = simulate_duration(&mut app.engine, 5.0, 0.0);
    assert!(positions.iter().all(|p| p.iter().all(|v| v.is_finite())));
    assert!(positions.iter().all(|p| p[1] >= 0.0));

    let end = app.engine.position();
    assert!(end.y < start.y, "Kite did not descend: {:?}", end);
    assert_state_valid(app.engine.state().unwrap());

    // Resting: friction and damping have bled off sliding and spin
    let velocity = app.engine.velocity();
    let horizontal = (velocity.x * velocity.x + velocity.z * velocity.z).sqrt();
    assert!(horizontal < 0.05, "Still sliding at {} m/s", horizontal);
    assert!(
        app.engine.angular_velocity().norm() < 0.05,
        "Still spinning at {:?}",
        app.engine.angular_velocity()
    );
}

#[test]
fn test_symmetric_flight_stays_centred() {
    let mut app = TestAppBuilder::new().with_wind(18.0, 0.0, 0.0).build();
    app.run_steps(60, 0.0);

    let position = app.engine.position();
    assert!(position.x.abs() < 1e-6, "Lateral drift {}", position.x);
    assert_relative_eq!(
        app.engine.line_tension(Side::Left),
        app.engine.line_tension(Side::Right),
        epsilon = 1e-6,
        max_relative = 1e-6
    );
}

#[test]
fn test_huge_force_hits_acceleration_clamp() {
    let mut app = TestAppBuilder::new().build();
    let entity = app.engine.entity();
    app.engine
        .app_mut()
        .world_mut()
        .get_mut::<KiteBody>(entity)
        .unwrap()
        .add_force(Force {
            vector: Vector3::new(10_000.0, 0.0, 0.0),
            point: None,
            frame: ReferenceFrame::World,
            category: ForceCategory::Custom("gust".to_string()),
        });

    app.run_frame(0.0);

    let flags = app.engine.safety_flags();
    assert!(!flags.force_rejected);
    assert!(flags.acceleration_exceeded);
    assert_relative_eq!(
        flags.last_acceleration.norm(),
        PhysicsConfig::default().max_acceleration,
        epsilon = 1e-9
    );
    app.run_steps(10, 0.0);
    assert_state_valid(app.engine.state().unwrap());
    assert!(app.engine.velocity().norm() <= PhysicsConfig::default().max_velocity);
}

#[test]
fn test_identical_inputs_give_identical_runs() {
    let run = || {
        let mut app = TestAppBuilder::new().with_wind(22.0, 15.0, 20.0).build();
        for frame in 0..240 {
            let bar = if frame < 120 { 0.3 } else { -0.2 };
            app.run_frame(bar);
        }
        app.engine.telemetry()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_bar_ramps_then_returns_to_exact_zero() {
    let mut app = TestAppBuilder::new().build();
    let config = SimulationConfig::default().control_bar;

    // Held at max for 2 s
    app.run_steps(120, 10.0);
    assert_eq!(app.engine.bar_rotation(), config.max_rotation);

    app.run_frame(0.0);
    assert_relative_eq!(
        app.engine.bar_rotation(),
        config.max_rotation - config.return_rate * FRAME_DT,
        epsilon = 1e-12
    );

    let bound = (config.max_rotation / (config.return_rate * FRAME_DT)).ceil() as usize;
    app.run_steps(bound, 0.0);
    assert_eq!(app.engine.bar_rotation(), 0.0);
}

#[test]
fn test_parameter_changes_apply_on_next_update() {
    let mut app = TestAppBuilder::new().build();
    app.engine.set_line_length(22.0);
    app.engine.set_wind_params(WindUpdate {
        speed: Some(30.0),
        ..Default::default()
    });
    assert_eq!(app.engine.line_length(), 15.0);
    assert_eq!(app.engine.wind_params().speed, 18.0);

    app.run_frame(0.0);
    assert_eq!(app.engine.line_length(), 22.0);
    assert_eq!(app.engine.wind_params().speed, 30.0);
    assert_eq!(app.engine.lines().unwrap().line_length, 22.0);
}

#[test]
fn test_paused_update_applies_parameters_only() {
    let mut app = TestAppBuilder::new().build();
    let before = app.engine.state().cloned();
    app.engine.set_bridle_factor(1.2);
    app.engine.update(FRAME_DT, 0.4, true);

    assert_eq!(app.engine.bridle_factor(), 1.2);
    assert_eq!(app.engine.state().cloned(), before);
    assert_eq!(app.engine.step_count(), 0);
}

#[test]
fn test_reset_keeps_parameters() {
    let mut app = TestAppBuilder::new().build();
    app.engine.set_line_length(20.0);
    app.engine.set_wind_params(WindUpdate {
        speed: Some(25.0),
        direction: Some(30.0),
        ..Default::default()
    });
    app.run_steps(90, 0.3);

    app.engine.reset();

    assert_eq!(app.engine.line_length(), 20.0);
    assert_eq!(app.engine.wind_params().speed, 25.0);
    assert_eq!(app.engine.step_count(), 0);
    assert_eq!(app.engine.bar_rotation(), 0.0);
    assert_eq!(app.engine.velocity(), Vector3::zeros());

    let bar = SimulationConfig::default().control_bar.position;
    assert_relative_eq!((app.engine.position() - bar).norm(), 20.0 * 0.95, epsilon = 1e-9);
    assert_relative_eq!(app.engine.position().y, 7.0, epsilon = 1e-12);

    // The fresh kite steps normally
    app.run_frame(0.0);
    assert_eq!(app.engine.step_count(), 1);
}

#[test]
fn test_fixed_step_is_frame_rate_independent() {
    let build = || {
        let mut config = SimulationConfig::default();
        config.timestep.fixed_step = Some(1.0 / 120.0);
        TestAppBuilder::new().with_config(config).build()
    };

    let mut slow = build();
    for _ in 0..60 {
        slow.engine.update(1.0 / 60.0, 0.2, false);
    }
    let mut fast = build();
    for _ in 0..120 {
        fast.engine.update(1.0 / 120.0, 0.2, false);
    }

    assert_eq!(slow.engine.step_count(), 120);
    assert_eq!(fast.engine.step_count(), 120);
    assert_position_eq(&slow.engine.position(), &fast.engine.position(), 1e-12);
}

#[test]
fn test_telemetry_serializes_state() {
    let mut app = TestAppBuilder::new().build();
    app.run_steps(30, 0.0);

    let telemetry = app.engine.telemetry();
    assert_eq!(telemetry.steps, 30);
    assert_eq!(telemetry.position, app.engine.position());

    let json: serde_json::Value = serde_json::from_str(&telemetry.to_json().unwrap()).unwrap();
    assert_eq!(json["line_length"], 15.0);
    assert_eq!(json["wind"]["speed"], 18.0);
}
