use kiteflyer::resources::Side;
use kiteflyer::SimulationConfig;

use crate::common::{assert_state_valid, max_line_distance, TestAppBuilder};

#[test]
fn test_slack_lines_carry_no_tension() {
    // Released at 95% of 50 m: both lines start slack
    let mut app = TestAppBuilder::new().with_line_length(50.0).build();
    app.run_frame(0.0);

    for side in Side::BOTH {
        let reading = app.engine.line_reading(side).unwrap();
        assert!(!reading.taut, "{:?} line taut at {} m", side, reading.distance);
        assert_eq!(reading.tension, 0.0);
    }
    assert!(app.engine.lines().unwrap().total_force.norm() == 0.0);
}

#[test]
fn test_taut_lines_pull_toward_the_pilot() {
    let mut app = TestAppBuilder::new().with_wind(30.0, 0.0, 0.0).build();
    app.run_steps(150, 0.0);

    let lines = app.engine.lines().unwrap();
    assert!(
        lines.left.taut && lines.right.taut,
        "Lines slack after 2.5 s: {:?} {:?}",
        lines.left,
        lines.right
    );
    assert!(lines.left.tension > 0.0 && lines.right.tension > 0.0);
    // Kite flies at -Z, the pilot sits at the origin
    assert!(lines.total_force.z > 0.0, "Line force {:?}", lines.total_force);
    assert!(max_line_distance(&app.engine) <= 15.0 + 1e-4);
}

#[test]
fn test_line_length_change_is_enforced() {
    let mut app = TestAppBuilder::new().with_wind(25.0, 0.0, 0.0).build();
    app.run_steps(60, 0.0);

    app.engine.set_line_length(10.0);
    app.run_checked(120, 0.0, |engine| {
        assert!(max_line_distance(engine) <= 10.0 + 1e-4);
    });
    assert_state_valid(app.engine.state().unwrap());
}

#[test]
fn test_spring_lines_stay_bounded() {
    let config = SimulationConfig::default();
    let limit = config.lines.line_length * (1.0 + config.lines.tolerance);
    let max_tension = config.lines.max_tension;
    let mut app = TestAppBuilder::new().with_model("spring").build();

    app.run_checked(300, 0.0, |engine| {
        assert_state_valid(engine.state().unwrap());
        assert!(max_line_distance(engine) <= limit + 1e-4);
        for side in Side::BOTH {
            let tension = engine.line_tension(side);
            assert!((0.0..=max_tension).contains(&tension), "Tension {}", tension);
        }
    });
}

#[test]
fn test_bridled_lines_report_bridle_tensions() {
    let mut app = TestAppBuilder::new()
        .with_model("pbd-bridled")
        .with_wind(22.0, 0.0, 0.0)
        .build();
    app.engine.set_bridle_factor(1.2);
    app.run_steps(90, 0.0);

    for side in Side::BOTH {
        let bridle = app.engine.bridle(side).expect("bridle reading");
        assert!(bridle.tensions.iter().all(|t| *t >= 0.0 && t.is_finite()));
        assert!(bridle.rest_lengths.iter().all(|l| *l > 0.0));
    }
    assert!(max_line_distance(&app.engine) <= 15.0 + 1e-4);
    assert_state_valid(app.engine.state().unwrap());
}

#[test]
fn test_direct_lines_have_no_bridle_readings() {
    let mut app = TestAppBuilder::new().build();
    app.run_steps(5, 0.0);
    assert!(app.engine.bridle(Side::Left).is_none());
    assert!(app.engine.bridle(Side::Right).is_none());
}
