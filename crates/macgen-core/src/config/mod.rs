//! Typed run configuration.
//!
//! The original tooling merged a loose key/value mapping with defaults; here
//! each construction mode is a tagged-union variant with explicitly typed,
//! eagerly validated fields. The JSON shape keeps the `mode` discriminator:
//!
//! ```json
//! { "mode": "range", "gps_mode": "custom", "num_events": 500,
//!   "species": [ { "species": "e-", "energy_min": 0.3, "energy_max": 2.0,
//!                  "delta": 0.1, "count_min": 5, "count_max": 20 } ] }
//! ```

use crate::common::precision::EnergyPrecision;
use crate::domain::{MacGenError, MacGenResult, Species};
use serde::Deserialize;

/// Beam-on count used when the configuration leaves `num_events` unset.
pub const DEFAULT_NUM_EVENTS: u64 = 100;

/// Rendering dialect for the source block of the macro file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GpsMode {
    /// Per-event custom source: each event releases the configured counts.
    #[default]
    Custom,
    /// Native GPS: each event draws one particle in proportion to weights.
    Native,
}

impl GpsMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Custom => "custom",
            Self::Native => "native",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    #[serde(flatten)]
    pub source: SourceConfig,
    #[serde(default)]
    pub num_events: Option<u64>,
    #[serde(default)]
    pub scale_factor: Option<u64>,
    #[serde(default)]
    pub gps_mode: GpsMode,
    #[serde(default)]
    pub energy_decimals: Option<i32>,
    #[serde(default)]
    pub verbose_level: u8,
    /// Output-file base path handed to `/MySim/setSaveName` (no extension).
    #[serde(default)]
    pub output_name: Option<String>,
    /// Run profile used for macro file naming; generated when absent.
    #[serde(default)]
    pub profile: Option<String>,
}

impl RunConfig {
    pub fn from_json_str(source: &str) -> MacGenResult<Self> {
        serde_json::from_str(source).map_err(|source| {
            MacGenError::config(
                "INPUT.CONFIG_PARSE",
                format!("failed to parse run configuration: {source}"),
            )
        })
    }

    pub fn mode_name(&self) -> &'static str {
        self.source.mode_name()
    }

    pub fn num_events_or_default(&self) -> u64 {
        self.num_events.unwrap_or(DEFAULT_NUM_EVENTS)
    }

    pub fn energy_precision(&self) -> MacGenResult<EnergyPrecision> {
        match self.energy_decimals {
            Some(decimals) => EnergyPrecision::new(decimals),
            None => Ok(EnergyPrecision::default()),
        }
    }

    pub fn validate(&self) -> MacGenResult<()> {
        self.energy_precision()?;
        self.source.validate()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum SourceConfig {
    Manual {
        species: Vec<ManualSpeciesConfig>,
    },
    Range {
        species: Vec<RangeSpeciesConfig>,
    },
    Weighted {
        species: Vec<WeightedSpeciesConfig>,
    },
    Random {
        species: Vec<RandomSpeciesConfig>,
    },
    Single {
        species: Species,
        energy: f64,
        count: u32,
    },
}

impl SourceConfig {
    pub fn mode_name(&self) -> &'static str {
        match self {
            Self::Manual { .. } => "manual",
            Self::Range { .. } => "range",
            Self::Weighted { .. } => "weighted",
            Self::Random { .. } => "random",
            Self::Single { .. } => "single",
        }
    }

    pub fn validate(&self) -> MacGenResult<()> {
        match self {
            Self::Manual { species } => species.iter().try_for_each(ManualSpeciesConfig::validate),
            Self::Range { species } => species.iter().try_for_each(RangeSpeciesConfig::validate),
            Self::Weighted { species } => {
                species.iter().try_for_each(WeightedSpeciesConfig::validate)
            }
            Self::Random { species } => species.iter().try_for_each(RandomSpeciesConfig::validate),
            Self::Single { species, energy, .. } => validate_energy_value(
                "INPUT.SINGLE_ENERGY",
                species,
                *energy,
            ),
        }
    }
}

/// Manual mode: parallel energy/count lists, zipped pairwise. Surplus
/// energies without a matching count are ignored, as are count-zero pairs.
#[derive(Debug, Clone, Deserialize)]
pub struct ManualSpeciesConfig {
    pub species: Species,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub energies: Vec<f64>,
    pub counts: Vec<u32>,
}

impl ManualSpeciesConfig {
    fn validate(&self) -> MacGenResult<()> {
        for energy in &self.energies {
            validate_energy_value("INPUT.MANUAL_ENERGIES", &self.species, *energy)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RangeSpeciesConfig {
    pub species: Species,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub energy_min: f64,
    pub energy_max: f64,
    pub delta: f64,
    pub count_min: u32,
    pub count_max: u32,
}

impl RangeSpeciesConfig {
    fn validate(&self) -> MacGenResult<()> {
        validate_energy_value("INPUT.RANGE_BOUNDS", &self.species, self.energy_min)?;
        validate_energy_value("INPUT.RANGE_BOUNDS", &self.species, self.energy_max)?;
        if self.energy_min > self.energy_max {
            return Err(MacGenError::config(
                "INPUT.RANGE_BOUNDS",
                format!(
                    "species '{}': energy bounds must satisfy min <= max, got [{}, {}]",
                    self.species, self.energy_min, self.energy_max
                ),
            ));
        }
        if !(self.delta > 0.0) || !self.delta.is_finite() {
            return Err(MacGenError::config(
                "INPUT.RANGE_DELTA",
                format!(
                    "species '{}': energy grid delta must be positive, got {}",
                    self.species, self.delta
                ),
            ));
        }
        validate_count_bounds(&self.species, self.count_min, self.count_max)
    }
}

/// Random mode: range-style grid plus a bounded random sub-selection of
/// distinct energies ("type count").
#[derive(Debug, Clone, Deserialize)]
pub struct RandomSpeciesConfig {
    #[serde(flatten)]
    pub range: RangeSpeciesConfig,
    #[serde(default = "default_types_bound")]
    pub types_min: usize,
    #[serde(default = "default_types_bound")]
    pub types_max: usize,
    #[serde(default = "default_enabled")]
    pub randomize_types: bool,
}

impl RandomSpeciesConfig {
    fn validate(&self) -> MacGenResult<()> {
        self.range.validate()?;
        if self.types_min > self.types_max {
            return Err(MacGenError::config(
                "INPUT.RANDOM_TYPES",
                format!(
                    "species '{}': type-count bounds must satisfy min <= max, got [{}, {}]",
                    self.range.species, self.types_min, self.types_max
                ),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightedSpeciesConfig {
    pub species: Species,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub energies: Vec<f64>,
    pub weights: Vec<f64>,
    /// Minimum sample count the least-probable energy of this species must
    /// realize (`N_min` in the beam-on estimate).
    pub min_count: u32,
}

impl WeightedSpeciesConfig {
    fn validate(&self) -> MacGenResult<()> {
        if self.energies.len() != self.weights.len() {
            return Err(MacGenError::config(
                "INPUT.WEIGHTED_LISTS",
                format!(
                    "species '{}': energies ({}) and weights ({}) must have equal length",
                    self.species,
                    self.energies.len(),
                    self.weights.len()
                ),
            ));
        }
        for energy in &self.energies {
            validate_energy_value("INPUT.WEIGHTED_ENERGIES", &self.species, *energy)?;
        }
        if self.weights.iter().any(|weight| !weight.is_finite()) {
            return Err(MacGenError::config(
                "INPUT.WEIGHTED_WEIGHTS",
                format!("species '{}': weights must be finite", self.species),
            ));
        }
        if self.enabled && !self.weights.iter().any(|weight| *weight > 0.0) {
            return Err(MacGenError::config(
                "INPUT.WEIGHTED_WEIGHTS",
                format!(
                    "species '{}': weighted mode requires at least one positive weight",
                    self.species
                ),
            ));
        }
        Ok(())
    }

    pub fn positive_weights(&self) -> impl Iterator<Item = f64> + '_ {
        self.weights.iter().copied().filter(|weight| *weight > 0.0)
    }
}

fn validate_energy_value(placeholder: &str, species: &Species, energy: f64) -> MacGenResult<()> {
    if !energy.is_finite() || energy < 0.0 {
        return Err(MacGenError::config(
            placeholder,
            format!("species '{species}': energy must be a non-negative real, got {energy}"),
        ));
    }
    Ok(())
}

fn validate_count_bounds(species: &Species, count_min: u32, count_max: u32) -> MacGenResult<()> {
    if count_min > count_max {
        return Err(MacGenError::config(
            "INPUT.RANGE_COUNTS",
            format!(
                "species '{species}': count bounds must satisfy min <= max, got [{count_min}, {count_max}]"
            ),
        ));
    }
    Ok(())
}

fn default_enabled() -> bool {
    true
}

fn default_types_bound() -> usize {
    1
}
