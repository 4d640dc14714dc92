//! Macro-file rendering: serializes a resolved spectrum and an event count
//! into the command text consumed by the simulation engine.
//!
//! The renderer performs no I/O and never second-guesses the event count it
//! is handed; persisting the text is the CLI's job.

use crate::config::GpsMode;
use crate::modules::spectrum::Spectrum;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct MacRenderOptions {
    pub num_events: u64,
    pub verbose_level: u8,
    /// Output-file base path for `/MySim/setSaveName` (no extension).
    pub output_name: Option<String>,
}

impl Default for MacRenderOptions {
    fn default() -> Self {
        Self {
            num_events: 10,
            verbose_level: 0,
            output_name: None,
        }
    }
}

pub fn render_mac(spectrum: &Spectrum, options: &MacRenderOptions) -> String {
    let mut lines = Vec::with_capacity(spectrum.len() * 6 + 16);

    lines.push("# GPS multi-particle source macro".to_string());
    lines.push(String::new());
    lines.push("# basic initialization".to_string());
    lines.push(format!("/control/verbose {}", options.verbose_level));
    lines.push(format!("/run/verbose {}", options.verbose_level));
    lines.push(format!("/tracking/verbose {}", options.verbose_level));
    lines.push("/control/cout/ignoreThreadsExcept 0".to_string());
    lines.push("/run/initialize".to_string());

    if let Some(output_name) = &options.output_name {
        lines.push(String::new());
        lines.push("# output file base path".to_string());
        lines.push(format!("/MySim/setSaveName {output_name}"));
    }

    lines.push(String::new());
    lines.push("# disable the default particle gun".to_string());
    lines.push("/CompScintSim/generator/useParticleGun false".to_string());
    lines.push(String::new());

    match spectrum.source_mode() {
        GpsMode::Custom => render_custom_block(spectrum, &mut lines),
        GpsMode::Native => render_native_block(spectrum, &mut lines),
    }

    lines.push(String::new());
    lines.push("# launch the run".to_string());
    lines.push(format!("/run/beamOn {}", options.num_events));

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Custom dialect: one add command per entry with a positive count; each
/// event then releases every configured particle deterministically.
fn render_custom_block(spectrum: &Spectrum, lines: &mut Vec<String>) {
    let precision = spectrum.precision();

    lines.push("# clear previously defined custom sources".to_string());
    lines.push("/gps/my_source/clear".to_string());
    lines.push(String::new());

    let mut emitted = 0usize;
    for entry in spectrum.entries().iter().filter(|entry| entry.count > 0) {
        if emitted == 0 {
            lines.push("# add particle sources (count per event)".to_string());
        }
        lines.push(format!(
            "/gps/my_source/add {} {} MeV {}",
            entry.species,
            precision.format(entry.energy),
            entry.count
        ));
        emitted += 1;
    }

    if emitted == 0 {
        warn!("custom source block is empty, emitting marker comment");
        lines.push("# WARNING: no custom sources defined (all counts are zero)".to_string());
        return;
    }

    lines.push(String::new());
    lines.push("# list all defined sources".to_string());
    lines.push("/gps/my_source/list".to_string());
}

/// Native dialect: a five-line block per weighted entry. Indices are
/// zero-based and assigned only to entries that pass the weight check, so
/// skipped entries never consume an index slot.
fn render_native_block(spectrum: &Spectrum, lines: &mut Vec<String>) {
    let precision = spectrum.precision();

    lines.push("# clear previously defined GPS sources".to_string());
    lines.push("/gps/source/clear".to_string());

    let mut index = 0usize;
    for entry in spectrum.entries() {
        let Some(weight) = entry.weight else { continue };

        let energy = precision.format(entry.energy);
        lines.push(String::new());
        lines.push(format!(
            "# source {index}: {} @ {energy} MeV, weight {}",
            entry.species,
            format_weight(weight)
        ));
        lines.push(format!("/gps/source/add {}", format_weight(weight)));
        lines.push(format!("/gps/source/set {index}"));
        lines.push(format!("/gps/particle {}", entry.species));
        lines.push("/gps/ene/type Mono".to_string());
        lines.push(format!("/gps/energy {energy} MeV"));
        index += 1;
    }

    if index == 0 {
        warn!("native source block is empty, emitting marker comment");
        lines.push(String::new());
        lines.push("# WARNING: no native sources defined (no positive weights)".to_string());
        return;
    }

    lines.push(String::new());
    lines.push("# one particle per event, drawn by relative weight".to_string());
    lines.push("/gps/source/multiplevertex false".to_string());
}

/// Weights print as integers when whole, otherwise with their natural
/// shortest representation.
fn format_weight(weight: f64) -> String {
    if (weight - weight.round()).abs() < 1.0e-9 {
        format!("{}", weight.round() as i64)
    } else {
        format!("{weight}")
    }
}

#[cfg(test)]
mod tests {
    use super::{MacRenderOptions, format_weight, render_mac};
    use crate::common::precision::EnergyPrecision;
    use crate::config::GpsMode;
    use crate::modules::spectrum::Spectrum;
    use crate::domain::Species;

    fn options(num_events: u64) -> MacRenderOptions {
        MacRenderOptions {
            num_events,
            verbose_level: 0,
            output_name: None,
        }
    }

    #[test]
    fn custom_dialect_renders_one_add_per_positive_count() {
        let mut spectrum = Spectrum::new(EnergyPrecision::default(), GpsMode::Custom);
        spectrum
            .add_particle(Species::Electron, 1.0, 10, None)
            .add_particle(Species::Proton, 5.0, 0, None)
            .add_particle(Species::Gamma, 1.0, 20, None);

        let text = render_mac(&spectrum, &options(10));
        assert!(text.contains("/gps/my_source/clear\n"));
        assert!(text.contains("/gps/my_source/add e- 1.00 MeV 10\n"));
        assert!(text.contains("/gps/my_source/add gamma 1.00 MeV 20\n"));
        assert!(!text.contains("proton"), "zero-count entry must be skipped");
        assert!(text.contains("/gps/my_source/list\n"));
        assert!(text.ends_with("/run/beamOn 10\n"));
    }

    #[test]
    fn preamble_carries_verbosity_and_initialization() {
        let spectrum = Spectrum::default_spectrum();
        let text = render_mac(
            &spectrum,
            &MacRenderOptions {
                num_events: 10,
                verbose_level: 2,
                output_name: None,
            },
        );
        let expected_preamble = "/control/verbose 2\n\
             /run/verbose 2\n\
             /tracking/verbose 2\n\
             /control/cout/ignoreThreadsExcept 0\n\
             /run/initialize";
        assert!(text.contains(expected_preamble));
        assert!(text.contains("/CompScintSim/generator/useParticleGun false\n"));
        assert!(!text.contains("/MySim/setSaveName"));
    }

    #[test]
    fn output_name_adds_save_directive() {
        let spectrum = Spectrum::default_spectrum();
        let text = render_mac(
            &spectrum,
            &MacRenderOptions {
                num_events: 10,
                verbose_level: 0,
                output_name: Some("Data/RawData/run_001".to_string()),
            },
        );
        assert!(text.contains("/MySim/setSaveName Data/RawData/run_001\n"));
    }

    #[test]
    fn native_dialect_indexes_only_weighted_entries() {
        let mut spectrum = Spectrum::new(EnergyPrecision::default(), GpsMode::Native);
        spectrum
            .add_particle(Species::Electron, 1.0, 1, Some(1.0))
            .add_particle(Species::Proton, 5.0, 1, None)
            .add_particle(Species::Gamma, 2.5, 1, Some(2.5));

        let text = render_mac(&spectrum, &options(15));
        assert!(text.contains("/gps/source/clear\n"));
        assert!(text.contains("/gps/source/add 1\n/gps/source/set 0\n/gps/particle e-\n"));
        // The weightless proton is skipped and does not consume an index.
        assert!(text.contains("/gps/source/add 2.5\n/gps/source/set 1\n/gps/particle gamma\n"));
        assert!(!text.contains("/gps/source/set 2"));
        assert!(!text.contains("proton"));
        assert!(text.contains("/gps/ene/type Mono\n/gps/energy 1.00 MeV\n"));
        assert!(text.contains("/gps/source/multiplevertex false\n"));
        assert!(text.ends_with("/run/beamOn 15\n"));
    }

    #[test]
    fn empty_native_block_renders_warning_marker() {
        let mut spectrum = Spectrum::new(EnergyPrecision::default(), GpsMode::Native);
        spectrum
            .add_particle(Species::Gamma, 1.0, 3, None)
            .add_particle(Species::Gamma, 2.0, 3, Some(-1.0));

        let text = render_mac(&spectrum, &options(100));
        assert!(text.contains("/gps/source/clear\n"));
        assert!(text.contains("# WARNING: no native sources defined"));
        assert!(!text.contains("/gps/source/add"));
        assert!(!text.contains("/gps/source/multiplevertex"));
        assert!(text.ends_with("/run/beamOn 100\n"));
    }

    #[test]
    fn empty_custom_block_renders_warning_marker() {
        let spectrum = Spectrum::new(EnergyPrecision::default(), GpsMode::Custom);
        let text = render_mac(&spectrum, &options(100));
        assert!(text.contains("# WARNING: no custom sources defined"));
        assert!(!text.contains("/gps/my_source/add"));
        assert!(!text.contains("/gps/my_source/list"));
    }

    #[test]
    fn energies_render_with_spectrum_precision() {
        let precision = EnergyPrecision::new(3).expect("valid precision");
        let mut spectrum = Spectrum::new(precision, GpsMode::Custom);
        spectrum.add_particle(Species::Electron, 1.5, 4, None);

        let text = render_mac(&spectrum, &options(1));
        assert!(text.contains("/gps/my_source/add e- 1.500 MeV 4\n"));
    }

    #[test]
    fn whole_weights_print_without_decimals() {
        assert_eq!(format_weight(1.0), "1");
        assert_eq!(format_weight(12.0), "12");
        assert_eq!(format_weight(2.5), "2.5");
    }
}
