use crate::plugins::KiteFlightPlugin;
use crate::resources::{BridleMode, LineConfig, LineStrategy, SimulationConfig};
use crate::utils::ConfigError;

/// A named combination of line strategy and bridle mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlightModel {
    pub id: &'static str,
    pub strategy: LineStrategy,
    pub bridles: BridleMode,
    pub description: &'static str,
}

impl FlightModel {
    pub fn apply(&self, lines: &mut LineConfig) {
        lines.strategy = self.strategy;
        lines.bridles = self.bridles;
    }
}

/// Explicit lookup from model identifier to flight model.
#[derive(Debug, Clone)]
pub struct FlightModelRegistry {
    models: Vec<FlightModel>,
}

impl Default for FlightModelRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl FlightModelRegistry {
    pub const DEFAULT_MODEL: &'static str = "pbd";

    pub fn empty() -> Self {
        Self { models: Vec::new() }
    }

    pub fn with_builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(FlightModel {
            id: "pbd",
            strategy: LineStrategy::PositionBased,
            bridles: BridleMode::Direct,
            description: "Position-based lines on the control points",
        });
        registry.register(FlightModel {
            id: "pbd-bridled",
            strategy: LineStrategy::PositionBased,
            bridles: BridleMode::Bridled,
            description: "Position-based lines on bridle convergence points",
        });
        registry.register(FlightModel {
            id: "spring",
            strategy: LineStrategy::Spring,
            bridles: BridleMode::Direct,
            description: "Spring lines on the control points",
        });
        registry.register(FlightModel {
            id: "spring-bridled",
            strategy: LineStrategy::Spring,
            bridles: BridleMode::Bridled,
            description: "Spring lines on bridle convergence points",
        });
        registry
    }

    /// Adds a model, replacing any model with the same id.
    pub fn register(&mut self, model: FlightModel) {
        match self.models.iter_mut().find(|m| m.id == model.id) {
            Some(existing) => *existing = model,
            None => self.models.push(model),
        }
    }

    pub fn get(&self, id: &str) -> Option<&FlightModel> {
        self.models.iter().find(|m| m.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.models.iter().map(|m| m.id)
    }

    /// Applies model `id` to `config` and returns the configured plugin.
    pub fn build_plugin(
        &self,
        id: &str,
        mut config: SimulationConfig,
    ) -> Result<KiteFlightPlugin, ConfigError> {
        let model = self
            .get(id)
            .ok_or_else(|| ConfigError::UnknownModel(id.to_string()))?;
        model.apply(&mut config.lines);
        config.validate()?;
        Ok(KiteFlightPlugin::new(config))
    }
}
