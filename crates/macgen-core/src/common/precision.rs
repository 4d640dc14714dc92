use crate::domain::{MacGenError, MacGenResult};

pub const DEFAULT_ENERGY_DECIMALS: u32 = 2;

/// Upper bound keeps the integer dedup key exact for MeV-scale energies.
pub const MAX_ENERGY_DECIMALS: u32 = 9;

/// Decimal precision applied to every energy at entry construction time.
///
/// Owned by the caller and threaded through the builder explicitly; there is
/// no process-wide rounding state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnergyPrecision {
    decimals: u32,
}

impl Default for EnergyPrecision {
    fn default() -> Self {
        Self {
            decimals: DEFAULT_ENERGY_DECIMALS,
        }
    }
}

impl EnergyPrecision {
    pub fn new(decimals: i32) -> MacGenResult<Self> {
        if decimals < 0 {
            return Err(MacGenError::config(
                "INPUT.ENERGY_DECIMALS",
                format!("energy decimal precision must be non-negative, got {decimals}"),
            ));
        }
        let decimals = decimals as u32;
        if decimals > MAX_ENERGY_DECIMALS {
            return Err(MacGenError::config(
                "INPUT.ENERGY_DECIMALS",
                format!(
                    "energy decimal precision must be at most {MAX_ENERGY_DECIMALS}, got {decimals}"
                ),
            ));
        }
        Ok(Self { decimals })
    }

    pub fn decimals(&self) -> usize {
        self.decimals as usize
    }

    fn scale(&self) -> f64 {
        10f64.powi(self.decimals as i32)
    }

    pub fn round(&self, energy: f64) -> f64 {
        let scale = self.scale();
        (energy * scale).round() / scale
    }

    /// Exact integer key for `(species, rounded-energy)` deduplication.
    pub fn key(&self, energy: f64) -> i64 {
        (energy * self.scale()).round() as i64
    }

    pub fn format(&self, energy: f64) -> String {
        format!("{:.*}", self.decimals(), energy)
    }
}
