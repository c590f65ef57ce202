use kiteflyer::resources::PhysicsConfig;
use kiteflyer::{FlightEngine, FlightModelRegistry, SimulationConfig, WindParams};

pub const FRAME_DT: f64 = 1.0 / 60.0;

// Builder for a flight engine with test-friendly defaults
pub struct TestAppBuilder {
    config: SimulationConfig,
    model: String,
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self {
            config: SimulationConfig::default(),
            model: FlightModelRegistry::DEFAULT_MODEL.to_string(),
        }
    }
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_wind(mut self, speed_kmh: f64, direction: f64, turbulence: f64) -> Self {
        self.config.wind = WindParams {
            speed: speed_kmh,
            direction,
            turbulence,
        };
        self
    }

    pub fn with_physics(mut self, physics: PhysicsConfig) -> Self {
        self.config.physics = physics;
        self
    }

    pub fn with_line_length(mut self, length: f64) -> Self {
        self.config.lines.line_length = length;
        self
    }

    pub fn build(self) -> TestApp {
        let engine = FlightEngine::builder()
            .with_config(self.config)
            .with_model(self.model)
            .build()
            .expect("test engine should build");
        TestApp { engine }
    }
}

/// Main test application wrapper
pub struct TestApp {
    pub engine: FlightEngine,
}

impl TestApp {
    pub fn run_steps(&mut self, steps: usize, bar: f64) {
        for _ in 0..steps {
            self.engine.update(FRAME_DT, bar, false);
        }
    }

    pub fn run_frame(&mut self, bar: f64) {
        self.engine.update(FRAME_DT, bar, false);
    }

    /// Runs `steps` frames, calling `check` after each one.
    pub fn run_checked<F>(&mut self, steps: usize, bar: f64, mut check: F)
    where
        F: FnMut(&FlightEngine),
    {
        for _ in 0..steps {
            self.engine.update(FRAME_DT, bar, false);
            check(&self.engine);
        }
    }
}
