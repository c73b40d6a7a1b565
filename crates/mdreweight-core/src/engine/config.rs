use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_CUTOFF: f64 = 12.0;
pub const DEFAULT_BOLTZMANN_CONSTANT: f64 = 1.0;
pub const DEFAULT_TEMPERATURE: f64 = 1.0;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Parameter '{name}' must be positive and finite, got {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// Which distances a frame's perturbation energy is summed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistanceMode {
    /// Every atom pair within the cutoff.
    AllPairs,
    /// The closest approach of every pair of molecule blocks within the cutoff.
    #[default]
    MinimumPerMolecule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct ReweightConfig {
    pub cutoff: f64,
    pub boltzmann_constant: f64,
    pub temperature: f64,
    pub mode: DistanceMode,
}

impl Default for ReweightConfig {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_CUTOFF,
            boltzmann_constant: DEFAULT_BOLTZMANN_CONSTANT,
            temperature: DEFAULT_TEMPERATURE,
            mode: DistanceMode::default(),
        }
    }
}

impl ReweightConfig {
    pub fn builder() -> ReweightConfigBuilder {
        ReweightConfigBuilder::new()
    }

    /// The thermal energy `k * T` dividing perturbation energies in the Boltzmann factor.
    #[inline]
    pub fn kt(&self) -> f64 {
        self.boltzmann_constant * self.temperature
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("cutoff", self.cutoff),
            ("boltzmann_constant", self.boltzmann_constant),
            ("temperature", self.temperature),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }

    /// Parses and validates a configuration from TOML text; missing keys take defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigLoadError> {
        Self::parse(content, "<string>")
    }

    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::parse(&content, &path.to_string_lossy())
    }

    fn parse(content: &str, origin: &str) -> Result<Self, ConfigLoadError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigLoadError::Toml {
            path: origin.to_string(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Default)]
pub struct ReweightConfigBuilder {
    cutoff: Option<f64>,
    boltzmann_constant: Option<f64>,
    temperature: Option<f64>,
    mode: Option<DistanceMode>,
}

impl ReweightConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = Some(cutoff);
        self
    }
    pub fn boltzmann_constant(mut self, k: f64) -> Self {
        self.boltzmann_constant = Some(k);
        self
    }
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
    pub fn mode(mut self, mode: DistanceMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn build(self) -> Result<ReweightConfig, ConfigError> {
        let config = ReweightConfig {
            cutoff: self.cutoff.unwrap_or(DEFAULT_CUTOFF),
            boltzmann_constant: self
                .boltzmann_constant
                .unwrap_or(DEFAULT_BOLTZMANN_CONSTANT),
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            mode: self.mode.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}
