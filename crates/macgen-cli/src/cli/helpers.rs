use macgen_core::{
    GpsMode, MacGenError, MacGenResult, MacRenderOptions, RunConfig, Spectrum, build_spectrum,
    log_expected_distribution, render_mac, required_events,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

#[derive(Debug)]
pub(super) struct ResolvedRun {
    pub(super) config: RunConfig,
    pub(super) spectrum: Spectrum,
    pub(super) num_events: u64,
    pub(super) mac_text: String,
}

/// Runs the core pipeline for one configuration file: parse, build the
/// spectrum, resolve the beam-on count, render the macro text.
pub(super) fn resolve_run(config_path: &Path, seed: Option<u64>) -> MacGenResult<ResolvedRun> {
    let config = load_config(config_path)?;
    let mut rng = make_rng(seed);

    let spectrum = build_spectrum(&config, &mut rng)?;
    let num_events = required_events(&config, &mut rng);

    info!(
        mode = config.mode_name(),
        gps_mode = config.gps_mode.as_str(),
        entries = spectrum.len(),
        num_events,
        "spectrum resolved"
    );
    match config.gps_mode {
        GpsMode::Native => log_expected_distribution(&spectrum, num_events),
        GpsMode::Custom => info!(
            particles_per_event = spectrum.total_particles(),
            total_particles = spectrum.total_particles() * num_events,
            "custom source totals"
        ),
    }

    let options = MacRenderOptions {
        num_events,
        verbose_level: config.verbose_level,
        output_name: config.output_name.clone(),
    };
    let mac_text = render_mac(&spectrum, &options);

    Ok(ResolvedRun {
        config,
        spectrum,
        num_events,
        mac_text,
    })
}

pub(super) fn load_config(config_path: &Path) -> MacGenResult<RunConfig> {
    let source = fs::read_to_string(config_path).map_err(|source| {
        MacGenError::io_system(
            "IO.CONFIG_READ",
            format!(
                "failed to read run configuration '{}': {}",
                config_path.display(),
                source
            ),
        )
    })?;
    RunConfig::from_json_str(&source)
}

pub(super) fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Default run profile when the configuration supplies none.
pub(super) fn resolve_profile(config: &RunConfig) -> MacGenResult<String> {
    if let Some(profile) = &config.profile {
        return Ok(profile.clone());
    }
    Ok(format!("{}_sim_{}", config.mode_name(), unix_seconds()?))
}

/// Writes the macro text under `<out_dir>/<name>.mac`, creating the
/// directory when missing. An existing file is never overwritten: the new
/// file gets a timestamp suffix and both names are reported as warnings.
pub(super) fn write_mac_file(
    out_dir: &Path,
    name: &str,
    mac_text: &str,
) -> MacGenResult<PathBuf> {
    fs::create_dir_all(out_dir).map_err(|source| {
        MacGenError::io_system(
            "IO.MAC_DIRECTORY",
            format!(
                "failed to create macro directory '{}': {}",
                out_dir.display(),
                source
            ),
        )
    })?;

    let mut path = out_dir.join(format!("{name}.mac"));
    if path.exists() {
        warn!(existing = %path.display(), "macro file already exists");
        path = out_dir.join(format!("{name}_{}.mac", unix_seconds()?));
        warn!(renamed = %path.display(), "writing under a timestamped name");
    }

    fs::write(&path, mac_text).map_err(|source| {
        MacGenError::io_system(
            "IO.MAC_WRITE",
            format!("failed to write macro file '{}': {}", path.display(), source),
        )
    })?;

    Ok(path)
}

fn unix_seconds() -> MacGenResult<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .map_err(|source| {
            MacGenError::internal(
                "SYS.CLI_TIME",
                format!("system clock is before the unix epoch: {source}"),
            )
        })
}
