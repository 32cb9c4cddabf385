//! Session configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::symbols::WeightTable;
use crate::timing::{TimingConfig, TimingProfile};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Continue rate {0} is not one of the offered rates")]
    InvalidContinueRate(f64),

    #[error("Probability '{name}' must be within [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },

    #[error("Duration '{name}' must be finite and non-negative, got {value} ms")]
    InvalidDuration { name: &'static str, value: f64 },

    #[error("Weight for '{symbol}' must be finite and non-negative, got {weight}")]
    InvalidWeight { symbol: &'static str, weight: f64 },

    #[error("Weight table is empty")]
    EmptyWeightTable,

    #[error("Weight table has no symbol with positive weight")]
    NoReachableSymbol,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Player-selected base probability of surviving a round with no hit
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ContinueRate(f64);

impl ContinueRate {
    /// Rates offered on the menu screen
    pub const OFFERED: [f64; 6] = [0.29, 0.50, 0.70, 0.81, 0.90, 0.99];

    /// Accept one of the offered rates
    pub fn new(rate: f64) -> Result<Self, ConfigError> {
        Self::OFFERED
            .iter()
            .find(|&&offered| (offered - rate).abs() < 1e-9)
            .map(|&offered| Self(offered))
            .ok_or(ConfigError::InvalidContinueRate(rate))
    }

    /// All offered rates
    pub fn offered() -> impl Iterator<Item = ContinueRate> {
        Self::OFFERED.into_iter().map(Self)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Menu label, e.g. "81%"
    pub fn percent_label(self) -> String {
        format!("{:.0}%", self.0 * 100.0)
    }
}

impl Default for ContinueRate {
    fn default() -> Self {
        Self(0.81)
    }
}

impl TryFrom<f64> for ContinueRate {
    type Error = ConfigError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ContinueRate> for f64 {
    fn from(rate: ContinueRate) -> f64 {
        rate.0
    }
}

/// Odds used by the resolver, the premium gate and the revival check
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverOdds {
    /// Bonus reveal chance when exactly two cherries landed
    pub two_cherry_reveal: f64,
    /// Bonus reveal chance on a small yaku without cherries
    pub small_yaku_reveal: f64,
    /// Chance the premium coin lands on "double"
    pub premium_double: f64,
    /// Per-spin chance the spin is forced to the premium set
    pub premium_gate: f64,
    /// Chance that leaving after termination silently resumes play
    pub revival: f64,
}

impl Default for ResolverOdds {
    fn default() -> Self {
        Self {
            two_cherry_reveal: 0.3,
            small_yaku_reveal: 0.2,
            premium_double: 0.5,
            premium_gate: 0.001,
            revival: 0.2,
        }
    }
}

impl ResolverOdds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("two_cherry_reveal", self.two_cherry_reveal),
            ("small_yaku_reveal", self.small_yaku_reveal),
            ("premium_double", self.premium_double),
            ("premium_gate", self.premium_gate),
            ("revival", self.revival),
        ];
        for (name, value) in checks {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { name, value });
            }
        }
        Ok(())
    }
}

/// Complete session configuration, accepted once per session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Base continue rate
    pub continue_rate: ContinueRate,

    /// Symbol weights
    #[serde(default)]
    pub weights: WeightTable,

    /// Resolver and side-event odds
    #[serde(default)]
    pub odds: ResolverOdds,

    /// Phase durations
    #[serde(default)]
    pub timing: TimingConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            continue_rate: ContinueRate::default(),
            weights: WeightTable::standard(),
            odds: ResolverOdds::default(),
            timing: TimingConfig::normal(),
        }
    }
}

impl GameConfig {
    /// Default config with a chosen continue rate
    pub fn with_rate(continue_rate: ContinueRate) -> Self {
        Self {
            continue_rate,
            ..Default::default()
        }
    }

    /// Zero-delay config for tests and headless simulation
    pub fn instant(continue_rate: ContinueRate) -> Self {
        Self {
            continue_rate,
            timing: TimingConfig::from_profile(TimingProfile::Instant),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        self.odds.validate()?;
        self.timing.validate()?;
        Ok(())
    }

    /// Parse and validate JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, format picked by extension (`.yaml`/`.yml`, otherwise JSON)
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        log::debug!("Loading game config from {}", path.display());

        if is_yaml {
            Self::from_yaml(&text)
        } else {
            Self::from_json(&text)
        }
    }

    /// Export config as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
