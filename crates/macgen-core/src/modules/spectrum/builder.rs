use super::model::Spectrum;
use crate::common::precision::EnergyPrecision;
use crate::config::{
    ManualSpeciesConfig, RandomSpeciesConfig, RangeSpeciesConfig, RunConfig, SourceConfig,
    WeightedSpeciesConfig,
};
use crate::domain::{MacGenResult, Species};
use rand::Rng;
use rand::seq::index;

/// Builds the resolved spectrum for a validated run configuration.
///
/// Randomness is injected: range/random modes draw counts and energy
/// sub-selections from `rng`, so callers control determinism by seeding.
pub fn build_spectrum<R: Rng>(config: &RunConfig, rng: &mut R) -> MacGenResult<Spectrum> {
    config.validate()?;
    let precision = config.energy_precision()?;
    let mut spectrum = Spectrum::new(precision, config.gps_mode);

    match &config.source {
        SourceConfig::Manual { species } => {
            for block in species.iter().filter(|block| block.enabled) {
                add_manual_species(&mut spectrum, block);
            }
        }
        SourceConfig::Range { species } => {
            for block in species.iter().filter(|block| block.enabled) {
                add_range_species(&mut spectrum, block, precision, rng);
            }
        }
        SourceConfig::Weighted { species } => {
            for block in species.iter().filter(|block| block.enabled) {
                add_weighted_species(&mut spectrum, block);
            }
        }
        SourceConfig::Random { species } => {
            for block in species.iter().filter(|block| block.range.enabled) {
                add_random_species(&mut spectrum, block, precision, rng);
            }
        }
        SourceConfig::Single {
            species,
            energy,
            count,
        } => {
            add_single(&mut spectrum, species.clone(), *energy, *count);
        }
    }

    Ok(spectrum)
}

fn add_manual_species(spectrum: &mut Spectrum, block: &ManualSpeciesConfig) {
    for (&energy, &count) in block.energies.iter().zip(block.counts.iter()) {
        if count > 0 {
            spectrum.add_particle(block.species.clone(), energy, count, Some(f64::from(count)));
        }
    }
}

fn add_range_species<R: Rng>(
    spectrum: &mut Spectrum,
    block: &RangeSpeciesConfig,
    precision: EnergyPrecision,
    rng: &mut R,
) {
    for energy in energy_grid(block.energy_min, block.energy_max, block.delta, precision) {
        let count = rng.gen_range(block.count_min..=block.count_max);
        if count > 0 {
            spectrum.add_particle(block.species.clone(), energy, count, Some(f64::from(count)));
        }
    }
}

fn add_weighted_species(spectrum: &mut Spectrum, block: &WeightedSpeciesConfig) {
    let Some(min_weight) = block
        .positive_weights()
        .min_by(|left, right| left.total_cmp(right))
    else {
        return;
    };

    for (&energy, &weight) in block.energies.iter().zip(block.weights.iter()) {
        if weight > 0.0 {
            // Count proportional to relative weight, anchored so the
            // least-probable energy realizes min_count; never below 1.
            let scaled = (f64::from(block.min_count) * weight / min_weight).round();
            let count = (scaled as u32).max(1);
            spectrum.add_particle(block.species.clone(), energy, count, Some(weight));
        }
    }
}

fn add_random_species<R: Rng>(
    spectrum: &mut Spectrum,
    block: &RandomSpeciesConfig,
    precision: EnergyPrecision,
    rng: &mut R,
) {
    let range = &block.range;
    let grid = energy_grid(range.energy_min, range.energy_max, range.delta, precision);
    if grid.is_empty() {
        return;
    }

    let lower = block.types_min.min(grid.len());
    let upper = block.types_max.min(grid.len());
    let selected = if block.randomize_types {
        rng.gen_range(lower..=upper)
    } else {
        upper
    }
    .max(lower);

    if selected == 0 {
        return;
    }

    for pick in index::sample(rng, grid.len(), selected) {
        let count = rng.gen_range(range.count_min..=range.count_max);
        if count > 0 {
            spectrum.add_particle(
                range.species.clone(),
                grid[pick],
                count,
                Some(f64::from(count)),
            );
        }
    }
}

fn add_single(spectrum: &mut Spectrum, species: Species, energy: f64, count: u32) {
    if count > 0 {
        spectrum.add_particle(species, energy, count, Some(f64::from(count)));
    }
}

/// Inclusive energy grid over `[min, max]` with step `delta`. The right
/// endpoint is included via a half-step tolerance, then values are rounded
/// and deduplicated while keeping ascending order.
pub(crate) fn energy_grid(
    energy_min: f64,
    energy_max: f64,
    delta: f64,
    precision: EnergyPrecision,
) -> Vec<f64> {
    let mut grid = Vec::new();
    let mut last_key = None;
    let mut step = 0u32;

    loop {
        let energy = energy_min + f64::from(step) * delta;
        if energy > energy_max + delta / 2.0 {
            break;
        }
        let rounded = precision.round(energy);
        let key = precision.key(rounded);
        if last_key != Some(key) {
            grid.push(rounded);
            last_key = Some(key);
        }
        step += 1;
    }

    grid
}
