use bevy::log::LogPlugin;
use bevy::prelude::*;
use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::components::{
    AeroForces, BridleReading, ControlBar, HandlePositions, Kite, KiteState, LineReading,
    LineSystemState, SafetyFlags,
};
use crate::plugins::{FlightModelRegistry, KiteFlightPlugin};
use crate::resources::{
    KiteGeometry, LineConfig, Side, SimulationConfig, StepCounter, StepInput, TimestepConfig,
    WindField, WindParams, WindUpdate,
};
use crate::systems::ParameterChange;
use crate::utils::ConfigError;

/// Builder for [`FlightEngine`].
pub struct FlightEngineBuilder {
    config: SimulationConfig,
    model: Option<String>,
    registry: FlightModelRegistry,
    geometry: KiteGeometry,
    logging: bool,
}

impl Default for FlightEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FlightEngineBuilder {
    pub fn new() -> Self {
        Self {
            config: SimulationConfig::default(),
            model: None,
            registry: FlightModelRegistry::default(),
            geometry: KiteGeometry::delta(),
            logging: false,
        }
    }

    pub fn with_config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }

    /// Selects a registered flight model; overrides the line strategy and
    /// bridle mode of the config.
    pub fn with_model(mut self, id: impl Into<String>) -> Self {
        self.model = Some(id.into());
        self
    }

    pub fn with_registry(mut self, registry: FlightModelRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_geometry(mut self, geometry: KiteGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_wind(mut self, wind: WindParams) -> Self {
        self.config.wind = wind;
        self
    }

    pub fn with_line_length(mut self, length: f64) -> Self {
        self.config.lines.line_length = length;
        self
    }

    /// Installs Bevy's `LogPlugin` so `RUST_LOG` filtering applies.
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.logging = enabled;
        self
    }

    /// Builds and starts the engine. Only configuration errors are fatal; a
    /// flawed geometry is logged and flown with the affected parts skipped.
    pub fn build(self) -> Result<FlightEngine, ConfigError> {
        let issues = self.geometry.issues();
        let plugin = match &self.model {
            Some(id) => self.registry.build_plugin(id, self.config)?,
            None => {
                self.config.validate()?;
                KiteFlightPlugin::new(self.config)
            }
        }
        .with_geometry(self.geometry);
        let timestep = plugin.config().timestep.clone();

        let mut app = App::new();
        if self.logging {
            app.add_plugins(LogPlugin::default());
        }
        for issue in &issues {
            warn!("Kite geometry: {}, its contribution is skipped", issue);
        }
        app.add_plugins(plugin);
        // Runs Startup, which spawns the kite; dt is zero so nothing steps
        app.update();

        let kite = app
            .world_mut()
            .query_filtered::<Entity, With<Kite>>()
            .iter(app.world())
            .next()
            .ok_or_else(|| ConfigError::invalid("kite", "not spawned"))?;

        info!(
            "Flight engine ready (dt <= {:.4}s, fixed step {:?})",
            timestep.max_dt, timestep.fixed_step
        );
        Ok(FlightEngine {
            app,
            kite,
            timestep,
            accumulator: 0.0,
        })
    }
}

/// The kite flight model behind a frame-driven interface.
///
/// Call [`FlightEngine::update`] once per frame. Parameter setters queue
/// their change; it takes effect at the start of the next update.
pub struct FlightEngine {
    app: App,
    kite: Entity,
    timestep: TimestepConfig,
    accumulator: f64,
}

impl FlightEngine {
    pub fn builder() -> FlightEngineBuilder {
        FlightEngineBuilder::new()
    }

    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        FlightEngineBuilder::new().with_config(config).build()
    }

    /// Advances the simulation by one frame of `dt` seconds.
    ///
    /// `dt` is clamped to the configured maximum. With a fixed step
    /// configured, the frame is split into whole steps and the remainder
    /// carried to the next frame.
    pub fn update(&mut self, dt: f64, target_bar_rotation: f64, paused: bool) {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.timestep.max_dt)
        } else {
            0.0
        };
        if paused {
            self.step(0.0, target_bar_rotation, true);
            return;
        }

        let Some(step) = self.timestep.fixed_step else {
            self.step(dt, target_bar_rotation, false);
            return;
        };

        self.accumulator += dt;
        let mut substeps = 0;
        while self.accumulator >= step && substeps < self.timestep.max_substeps {
            self.step(step, target_bar_rotation, false);
            self.accumulator -= step;
            substeps += 1;
        }
        if substeps == 0 {
            // Still apply queued parameter changes
            self.step(0.0, target_bar_rotation, true);
        }
        if self.accumulator >= step {
            debug!("Dropping {:.4}s of simulation backlog", self.accumulator);
            self.accumulator = 0.0;
        }
    }

    fn step(&mut self, dt: f64, target_bar_rotation: f64, paused: bool) {
        self.app.insert_resource(StepInput {
            dt,
            target_bar_rotation,
            paused,
        });
        self.app.update();
    }

    pub fn set_wind_params(&mut self, update: WindUpdate) {
        self.app
            .world_mut()
            .send_event(ParameterChange::Wind(update));
    }

    pub fn set_line_length(&mut self, length: f64) {
        self.app
            .world_mut()
            .send_event(ParameterChange::LineLength(length));
    }

    pub fn set_bridle_factor(&mut self, factor: f64) {
        self.app
            .world_mut()
            .send_event(ParameterChange::BridleFactor(factor));
    }

    /// Puts the kite back in its starting pose. Wind, line length and bridle
    /// factor keep their current values.
    pub fn reset(&mut self) {
        let world = self.app.world_mut();
        let lines = world.resource::<LineConfig>().clone();
        let mut config = world.resource::<SimulationConfig>().clone();
        config.wind = world.resource::<WindField>().params().clone();
        config.lines.line_length = lines.line_length;
        config.lines.bridle_factor = lines.bridle_factor;
        let geometry = world.resource::<KiteGeometry>().clone();

        world.despawn(self.kite);
        self.kite = world
            .spawn(KiteFlightPlugin::kite_bundle(&config, &geometry))
            .id();
        world.resource_mut::<WindField>().reset_clock();
        *world.resource_mut::<StepCounter>() = StepCounter::default();
        self.accumulator = 0.0;

        info!(
            "Flight reset (line length {:.1} m, bridle factor {:.2})",
            lines.line_length, lines.bridle_factor
        );
    }

    /// The simulated kite; changes on [`FlightEngine::reset`].
    pub fn entity(&self) -> Entity {
        self.kite
    }

    fn component<T: Component>(&self) -> Option<&T> {
        self.app.world().get::<T>(self.kite)
    }

    pub fn state(&self) -> Option<&KiteState> {
        self.component::<KiteState>()
    }

    pub fn position(&self) -> Vector3<f64> {
        self.state().map(|s| s.position).unwrap_or_else(Vector3::zeros)
    }

    pub fn velocity(&self) -> Vector3<f64> {
        self.state().map(|s| s.velocity).unwrap_or_else(Vector3::zeros)
    }

    pub fn orientation(&self) -> UnitQuaternion<f64> {
        self.state()
            .map(|s| s.orientation)
            .unwrap_or_else(UnitQuaternion::identity)
    }

    pub fn angular_velocity(&self) -> Vector3<f64> {
        self.state()
            .map(|s| s.angular_velocity)
            .unwrap_or_else(Vector3::zeros)
    }

    pub fn lines(&self) -> Option<&LineSystemState> {
        self.component::<LineSystemState>()
    }

    pub fn line_reading(&self, side: Side) -> Option<&LineReading> {
        self.lines().map(|lines| lines.reading(side))
    }

    pub fn line_tension(&self, side: Side) -> f64 {
        self.line_reading(side).map_or(0.0, |r| r.tension)
    }

    pub fn line_taut(&self, side: Side) -> bool {
        self.line_reading(side).is_some_and(|r| r.taut)
    }

    pub fn bridle(&self, side: Side) -> Option<&BridleReading> {
        self.lines().and_then(|lines| lines.bridle(side))
    }

    pub fn aero(&self) -> Option<&AeroForces> {
        self.component::<AeroForces>()
    }

    /// Aerodynamic force fed to the integrator (smoothed when enabled).
    pub fn aero_force(&self) -> Vector3<f64> {
        self.aero().map(|a| a.force()).unwrap_or_else(Vector3::zeros)
    }

    pub fn aero_torque(&self) -> Vector3<f64> {
        self.aero().map(|a| a.torque()).unwrap_or_else(Vector3::zeros)
    }

    pub fn aero_force_magnitude(&self) -> f64 {
        self.aero_force().norm()
    }

    pub fn aero_torque_magnitude(&self) -> f64 {
        self.aero_torque().norm()
    }

    pub fn handle_positions(&self) -> HandlePositions {
        self.component::<ControlBar>()
            .map(|bar| bar.handles)
            .unwrap_or_default()
    }

    pub fn bar_rotation(&self) -> f64 {
        self.component::<ControlBar>().map_or(0.0, |bar| bar.rotation)
    }

    pub fn safety_flags(&self) -> SafetyFlags {
        self.component::<SafetyFlags>().cloned().unwrap_or_default()
    }

    pub fn wind_params(&self) -> WindParams {
        self.app.world().resource::<WindField>().params().clone()
    }

    pub fn line_length(&self) -> f64 {
        self.app.world().resource::<LineConfig>().line_length
    }

    pub fn bridle_factor(&self) -> f64 {
        self.app.world().resource::<LineConfig>().bridle_factor
    }

    pub fn step_count(&self) -> u64 {
        self.app.world().resource::<StepCounter>().steps
    }

    pub fn simulated_time(&self) -> f64 {
        self.app.world().resource::<StepCounter>().simulated_time
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    pub fn telemetry(&self) -> FlightTelemetry {
        let state = self.state().cloned().unwrap_or_default();
        let aero = self.aero().cloned().unwrap_or_default();
        let lines = self.lines();
        FlightTelemetry {
            time: self.simulated_time(),
            steps: self.step_count(),
            position: state.position,
            velocity: state.velocity,
            orientation: state.orientation,
            angular_velocity: state.angular_velocity,
            aero_force: aero.force(),
            aero_torque: aero.torque(),
            aero_force_magnitude: self.aero_force_magnitude(),
            aero_torque_magnitude: self.aero_torque_magnitude(),
            raw_aero_force: aero.raw.lift,
            apparent_wind: aero.apparent_wind,
            angle_of_attack: aero.raw.angle_of_attack,
            left_line: lines.map(|l| l.left.clone()).unwrap_or_default(),
            right_line: lines.map(|l| l.right.clone()).unwrap_or_default(),
            left_bridle: lines.and_then(|l| l.left_bridle.clone()),
            right_bridle: lines.and_then(|l| l.right_bridle.clone()),
            handles: self.handle_positions(),
            bar_rotation: self.bar_rotation(),
            flags: self.safety_flags(),
            wind: self.wind_params(),
            line_length: self.line_length(),
            bridle_factor: self.bridle_factor(),
        }
    }
}

/// Snapshot of everything the engine exposes, for logging and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightTelemetry {
    pub time: f64,
    pub steps: u64,
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub orientation: UnitQuaternion<f64>,
    pub angular_velocity: Vector3<f64>,
    pub aero_force: Vector3<f64>,
    pub aero_torque: Vector3<f64>,
    pub aero_force_magnitude: f64,
    pub aero_torque_magnitude: f64,
    pub raw_aero_force: Vector3<f64>,
    pub apparent_wind: Vector3<f64>,
    pub angle_of_attack: f64,
    pub left_line: LineReading,
    pub right_line: LineReading,
    pub left_bridle: Option<BridleReading>,
    pub right_bridle: Option<BridleReading>,
    pub handles: HandlePositions,
    pub bar_rotation: f64,
    pub flags: SafetyFlags,
    pub wind: WindParams,
    pub line_length: f64,
    pub bridle_factor: f64,
}

impl FlightTelemetry {
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }
}
