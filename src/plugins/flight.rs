use bevy::prelude::*;

use crate::components::{
    AeroForces, ControlBar, Kite, KiteBody, KiteState, LineSystemState, SafetyFlags,
};
use crate::resources::{
    flight_running, KiteGeometry, SimulationConfig, StepCounter, StepInput, WindField,
};
use crate::systems::lines::resolve_attachments;
use crate::systems::{
    aero_force_system, air_data_system, apply_parameter_changes_system, control_bar_system,
    force_calculator_system, line_diagnostics_system, physics_integrator_system,
    spring_line_force_system, spring_lines_active, step_counter_system, ParameterChange,
};

/// Stages of one flight step, run in this order.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub enum KiteFlightSet {
    /// Queued parameter changes; runs even while paused
    Parameters,
    Control,
    AirData,
    Aerodynamics,
    Lines,
    Forces,
    Integration,
    Diagnostics,
}

/// Plugin running the kite flight model on `Update`.
///
/// Each `App::update` is one step; the step duration, bar target and pause
/// flag are read from [`StepInput`], so the caller owns the clock.
pub struct KiteFlightPlugin {
    config: SimulationConfig,
    geometry: KiteGeometry,
}

impl KiteFlightPlugin {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            geometry: KiteGeometry::delta(),
        }
    }

    pub fn with_geometry(mut self, geometry: KiteGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Components of a kite at rest in its starting pose.
    pub fn kite_bundle(config: &SimulationConfig, geometry: &KiteGeometry) -> impl Bundle {
        let lines = &config.lines;
        let (position, orientation) = config.start.initial_pose(
            &config.control_bar.position,
            lines.line_length,
            config.wind.direction,
        );
        let state = KiteState::at_rest(position, orientation);

        let mut bar = ControlBar::new(config.control_bar.clone());
        bar.handles = bar.handle_positions(&position);
        let attachments = resolve_attachments(geometry, lines.bridles, lines.bridle_factor);

        (
            Kite,
            Name::new("Kite"),
            state.to_transform(),
            state,
            KiteBody::new(config.physics.mass, config.physics.inertia()),
            AeroForces::default(),
            LineSystemState::new(lines.line_length, lines.bridle_factor, attachments),
            bar,
            SafetyFlags::default(),
        )
    }

    fn setup_kite(mut commands: Commands, config: SimulationConfig, geometry: KiteGeometry) {
        info!(
            "Spawning kite: {:?} lines, {:?}, length {:.1} m",
            config.lines.strategy, config.lines.bridles, config.lines.line_length
        );
        commands.spawn(Self::kite_bundle(&config, &geometry));
    }
}

/// Mirrors the kite state into its `Transform` for render layers.
pub fn sync_transform_system(mut query: Query<(&KiteState, &mut Transform), With<Kite>>) {
    for (state, mut transform) in query.iter_mut() {
        *transform = state.to_transform();
    }
}

impl Plugin for KiteFlightPlugin {
    fn build(&self, app: &mut App) {
        let config = self.config.clone();
        let geometry = self.geometry.clone();
        let mut wind = WindField::new(self.config.wind.clone());
        wind.max_apparent_speed = self.config.aerodynamics.max_apparent_wind;

        // 1. Shared resources
        app.insert_resource(self.geometry.clone())
            .insert_resource(self.config.clone())
            .insert_resource(wind)
            .insert_resource(self.config.physics.clone())
            .insert_resource(self.config.aerodynamics.clone())
            .insert_resource(self.config.lines.clone())
            .init_resource::<StepInput>()
            .init_resource::<StepCounter>()
            .add_event::<ParameterChange>();

        // 2. Step order:
        // Parameters -> Control -> AirData -> Aerodynamics -> Lines -> Forces
        //   -> Integration -> Diagnostics
        app.configure_sets(
            Update,
            (
                KiteFlightSet::Parameters,
                KiteFlightSet::Control,
                KiteFlightSet::AirData,
                KiteFlightSet::Aerodynamics,
                KiteFlightSet::Lines,
                KiteFlightSet::Forces,
                KiteFlightSet::Integration,
                KiteFlightSet::Diagnostics,
            )
                .chain(),
        );
        for set in [
            KiteFlightSet::Control,
            KiteFlightSet::AirData,
            KiteFlightSet::Aerodynamics,
            KiteFlightSet::Lines,
            KiteFlightSet::Forces,
            KiteFlightSet::Integration,
            KiteFlightSet::Diagnostics,
        ] {
            app.configure_sets(Update, set.run_if(flight_running));
        }

        // 3. Spawn the kite
        app.add_systems(Startup, move |commands: Commands| {
            Self::setup_kite(commands, config.clone(), geometry.clone())
        });

        // 4. Flight systems
        app.add_systems(
            Update,
            (
                apply_parameter_changes_system.in_set(KiteFlightSet::Parameters),
                control_bar_system.in_set(KiteFlightSet::Control),
                air_data_system.in_set(KiteFlightSet::AirData),
                aero_force_system.in_set(KiteFlightSet::Aerodynamics),
                spring_line_force_system
                    .run_if(spring_lines_active)
                    .in_set(KiteFlightSet::Lines),
                force_calculator_system.in_set(KiteFlightSet::Forces),
                physics_integrator_system.in_set(KiteFlightSet::Integration),
                (
                    line_diagnostics_system,
                    step_counter_system,
                    sync_transform_system,
                )
                    .in_set(KiteFlightSet::Diagnostics),
            ),
        );
    }
}
