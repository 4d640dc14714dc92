//! Beam-on count estimation for weighted native-GPS runs.
//!
//! With native GPS sampling each event draws exactly one particle, chosen in
//! proportion to the configured weights (unnormalized). The estimate picks
//! the smallest event count for which the least-probable energy of every
//! species is still expected to be drawn at least `min_count` times.

use crate::config::{GpsMode, RunConfig, SourceConfig, WeightedSpeciesConfig};
use crate::modules::spectrum::Spectrum;
use rand::Rng;
use tracing::{info, warn};

/// Resolves the `/run/beamOn` count for a configuration.
///
/// Only weighted-mode configurations rendered in the native dialect get an
/// estimate; everything else passes the configured `num_events` (or its
/// default) through untouched, without scaling.
pub fn required_events<R: Rng>(config: &RunConfig, rng: &mut R) -> u64 {
    let fallback = config.num_events_or_default();

    let SourceConfig::Weighted { species } = &config.source else {
        return fallback;
    };
    if config.gps_mode != GpsMode::Native {
        return fallback;
    }

    let base = base_estimate(species).unwrap_or(fallback);
    apply_scale(base, config.scale_factor, rng)
}

/// Maximum per-species requirement, or `None` when no species produced a
/// valid estimate. Species with no positive weight or a zero `min_count`
/// are skipped with a warning rather than aborting the run.
fn base_estimate(species: &[WeightedSpeciesConfig]) -> Option<u64> {
    let mut required: Option<u64> = None;

    for block in species.iter().filter(|block| block.enabled) {
        let positive: Vec<f64> = block.positive_weights().collect();
        if positive.is_empty() {
            warn!(
                species = %block.species,
                "beam-on estimate skips species without positive weights"
            );
            continue;
        }
        if block.min_count == 0 {
            warn!(
                species = %block.species,
                "beam-on estimate skips species with zero min_count"
            );
            continue;
        }

        let sum: f64 = positive.iter().sum();
        let min = positive
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min);
        let estimate = (f64::from(block.min_count) * sum / min).ceil() as u64;
        required = Some(required.map_or(estimate, |current| current.max(estimate)));
    }

    required
}

/// Optional randomized inflation: a `scale_factor` of `k >= 2` multiplies
/// the base by a uniform real in `[1, k]`, truncated. `1` or unset leaves
/// the base unchanged; `0` is invalid and ignored with a warning.
fn apply_scale<R: Rng>(base: u64, scale_factor: Option<u64>, rng: &mut R) -> u64 {
    match scale_factor {
        None | Some(1) => base,
        Some(0) => {
            warn!("invalid scale_factor 0 ignored, keeping base estimate");
            base
        }
        Some(factor) => {
            let multiplier = rng.gen_range(1.0..=factor as f64);
            (base as f64 * multiplier) as u64
        }
    }
}

/// Logs the expected particle distribution for a native-mode run: with
/// `num_events` single-particle draws, each entry is expected about
/// `num_events * weight / total_weight` times.
pub fn log_expected_distribution(spectrum: &Spectrum, num_events: u64) {
    let total_weight: f64 = spectrum
        .entries()
        .iter()
        .filter_map(|entry| entry.weight)
        .sum();
    if total_weight <= 0.0 {
        warn!("native GPS spectrum has no positive weights, distribution unknown");
        return;
    }

    for entry in spectrum.entries() {
        let Some(weight) = entry.weight else { continue };
        let expected = num_events as f64 * weight / total_weight;
        info!(
            species = %entry.species,
            energy = entry.energy,
            weight,
            expected,
            "expected draws"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::required_events;
    use crate::config::RunConfig;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(11)
    }

    fn weighted_config(extra: &str) -> RunConfig {
        let source = format!(
            r#"{{
                "mode": "weighted",
                "gps_mode": "native",
                "species": [
                    {{ "species": "gamma", "energies": [1.0, 2.0],
                       "weights": [1.0, 2.0], "min_count": 5 }}
                ]{extra}
            }}"#
        );
        RunConfig::from_json_str(&source).expect("weighted config parses")
    }

    #[test]
    fn rarest_species_coverage_drives_the_estimate() {
        // min weight 1.0, sum 3.0 -> ceil(5 * 3 / 1) = 15
        assert_eq!(required_events(&weighted_config(""), &mut rng()), 15);
    }

    #[test]
    fn estimate_takes_the_maximum_over_species() {
        let config = RunConfig::from_json_str(
            r#"{
                "mode": "weighted",
                "gps_mode": "native",
                "species": [
                    { "species": "gamma", "energies": [1.0, 2.0],
                      "weights": [1.0, 2.0], "min_count": 5 },
                    { "species": "e-", "energies": [0.5, 1.5],
                      "weights": [1.0, 9.0], "min_count": 10 }
                ]
            }"#,
        )
        .expect("config parses");
        // gamma needs 15, e- needs ceil(10 * 10 / 1) = 100.
        assert_eq!(required_events(&config, &mut rng()), 100);
    }

    #[test]
    fn estimate_grows_with_min_count_and_with_rarer_minimum_weight() {
        let base = required_events(&weighted_config(""), &mut rng());

        let higher_min_count = RunConfig::from_json_str(
            r#"{
                "mode": "weighted", "gps_mode": "native",
                "species": [
                    { "species": "gamma", "energies": [1.0, 2.0],
                      "weights": [1.0, 2.0], "min_count": 8 }
                ]
            }"#,
        )
        .expect("config parses");
        assert!(required_events(&higher_min_count, &mut rng()) >= base);

        let rarer_minimum = RunConfig::from_json_str(
            r#"{
                "mode": "weighted", "gps_mode": "native",
                "species": [
                    { "species": "gamma", "energies": [1.0, 2.0],
                      "weights": [0.5, 2.0], "min_count": 5 }
                ]
            }"#,
        )
        .expect("config parses");
        assert!(required_events(&rarer_minimum, &mut rng()) >= base);
    }

    #[test]
    fn custom_dialect_passes_configured_events_through() {
        let config = RunConfig::from_json_str(
            r#"{
                "mode": "weighted",
                "gps_mode": "custom",
                "num_events": 42,
                "species": [
                    { "species": "gamma", "energies": [1.0],
                      "weights": [1.0], "min_count": 5 }
                ]
            }"#,
        )
        .expect("config parses");
        assert_eq!(required_events(&config, &mut rng()), 42);
    }

    #[test]
    fn non_weighted_modes_use_default_when_unset() {
        let config = RunConfig::from_json_str(
            r#"{ "mode": "single", "species": "e-", "energy": 1.0, "count": 1 }"#,
        )
        .expect("config parses");
        assert_eq!(required_events(&config, &mut rng()), 100);
    }

    #[test]
    fn skipped_species_fall_back_to_configured_events() {
        // min_count 0 produces no valid estimate, so num_events applies.
        let config = RunConfig::from_json_str(
            r#"{
                "mode": "weighted", "gps_mode": "native", "num_events": 250,
                "species": [
                    { "species": "gamma", "energies": [1.0],
                      "weights": [1.0], "min_count": 0 }
                ]
            }"#,
        )
        .expect("config parses");
        assert_eq!(required_events(&config, &mut rng()), 250);
    }

    #[test]
    fn unit_scale_factor_is_deterministic() {
        let config = weighted_config(r#", "scale_factor": 1"#);
        let first = required_events(&config, &mut StdRng::seed_from_u64(1));
        let second = required_events(&config, &mut StdRng::seed_from_u64(2));
        assert_eq!(first, 15);
        assert_eq!(second, 15);
    }

    #[test]
    fn scale_factor_bounds_the_inflated_estimate() {
        let config = weighted_config(r#", "scale_factor": 3"#);
        for seed in 0..32 {
            let events = required_events(&config, &mut StdRng::seed_from_u64(seed));
            assert!(
                (15..=45).contains(&events),
                "seed {seed} produced {events}, outside [15, 45]"
            );
        }
    }

    #[test]
    fn zero_scale_factor_is_ignored() {
        let config = weighted_config(r#", "scale_factor": 0"#);
        assert_eq!(required_events(&config, &mut rng()), 15);
    }
}
