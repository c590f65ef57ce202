use kiteflyer::resources::{BridleMode, LineConfig, LineStrategy};
use kiteflyer::{ConfigError, FlightEngine, FlightModel, FlightModelRegistry};

use crate::common::{assert_state_valid, TestAppBuilder};

#[test]
fn test_every_builtin_model_flies() {
    let registry = FlightModelRegistry::default();
    for id in registry.ids() {
        let mut app = TestAppBuilder::new().with_model(id).build();
        app.run_steps(120, 0.2);
        assert_state_valid(app.engine.state().unwrap());

        let model = registry.get(id).unwrap();
        let lines = app.engine.app().world().resource::<LineConfig>();
        assert_eq!(lines.strategy, model.strategy, "model {}", id);
        assert_eq!(lines.bridles, model.bridles, "model {}", id);
    }
}

#[test]
fn test_unknown_model_fails_to_build() {
    let result = FlightEngine::builder().with_model("paraglider").build();
    assert!(matches!(result, Err(ConfigError::UnknownModel(id)) if id == "paraglider"));
}

#[test]
fn test_custom_registry_model() {
    let mut registry = FlightModelRegistry::empty();
    registry.register(FlightModel {
        id: "training",
        strategy: LineStrategy::Spring,
        bridles: BridleMode::Bridled,
        description: "Soft lines for tuning",
    });

    let engine = FlightEngine::builder()
        .with_registry(registry)
        .with_model("training")
        .build()
        .unwrap();
    let lines = engine.app().world().resource::<LineConfig>();
    assert_eq!(lines.strategy, LineStrategy::Spring);
    assert_eq!(lines.bridles, BridleMode::Bridled);

    let result = FlightEngine::builder()
        .with_registry(FlightModelRegistry::empty())
        .with_model(FlightModelRegistry::DEFAULT_MODEL)
        .build();
    assert!(result.is_err());
}
