use crate::common::precision::EnergyPrecision;
use crate::config::GpsMode;
use crate::domain::Species;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// One resolved `(species, energy)` line of the spectrum.
///
/// `count` is the per-event multiplicity (authoritative in custom mode);
/// `weight` is the relative sampling probability (authoritative in native
/// mode). A stored weight is always positive: non-positive weights are
/// normalized to `None` at insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleEntry {
    pub species: Species,
    pub energy: f64,
    pub count: u32,
    pub weight: Option<f64>,
}

impl Display for ParticleEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.weight {
            Some(weight) => write!(
                f,
                "{} x {} MeV {} (weight {})",
                self.count, self.energy, self.species, weight
            ),
            None => write!(f, "{} x {} MeV {}", self.count, self.energy, self.species),
        }
    }
}

/// Insertion-ordered, deduplicated particle spectrum.
///
/// Entries are keyed by `(species, rounded-energy)`; the order of first
/// insertion is preserved so macro rendering stays reproducible. Merge
/// policy on duplicate insert: counts are summed and a newly supplied
/// positive weight replaces the stored one, while an absent or non-positive
/// new weight leaves the stored weight untouched.
#[derive(Debug, Clone)]
pub struct Spectrum {
    entries: Vec<ParticleEntry>,
    index: HashMap<(Species, i64), usize>,
    precision: EnergyPrecision,
    source_mode: GpsMode,
}

impl Spectrum {
    pub fn new(precision: EnergyPrecision, source_mode: GpsMode) -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            precision,
            source_mode,
        }
    }

    /// Default spectrum from the original tooling: 10 x 1 MeV electrons,
    /// 5 x 5 MeV protons, 20 x 1 MeV gammas.
    pub fn default_spectrum() -> Self {
        let mut spectrum = Self::new(EnergyPrecision::default(), GpsMode::Custom);
        spectrum
            .add_particle(Species::Electron, 1.0, 10, None)
            .add_particle(Species::Proton, 5.0, 5, None)
            .add_particle(Species::Gamma, 1.0, 20, None);
        spectrum
    }

    pub fn add_particle(
        &mut self,
        species: Species,
        energy: f64,
        count: u32,
        weight: Option<f64>,
    ) -> &mut Self {
        let energy = self.precision.round(energy);
        let weight = weight.filter(|weight| *weight > 0.0);
        let key = (species.clone(), self.precision.key(energy));

        match self.index.get(&key) {
            Some(&slot) => {
                let entry = &mut self.entries[slot];
                entry.count = entry.count.saturating_add(count);
                if weight.is_some() {
                    entry.weight = weight;
                }
            }
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(ParticleEntry {
                    species,
                    energy,
                    count,
                    weight,
                });
            }
        }
        self
    }

    pub fn clear(&mut self) -> &mut Self {
        self.entries.clear();
        self.index.clear();
        self
    }

    pub fn entries(&self) -> &[ParticleEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Total particles released per simulated event (custom-mode figure).
    pub fn total_particles(&self) -> u64 {
        self.entries.iter().map(|entry| u64::from(entry.count)).sum()
    }

    pub fn precision(&self) -> EnergyPrecision {
        self.precision
    }

    pub fn source_mode(&self) -> GpsMode {
        self.source_mode
    }
}

impl Display for Spectrum {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (position, entry) in self.entries.iter().enumerate() {
            if position > 0 {
                writeln!(f)?;
            }
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}
