use super::CliError;
use super::helpers::{load_config, make_rng, resolve_profile, resolve_run, write_mac_file};
use macgen_core::required_events;
use std::path::PathBuf;
use tracing::info;

#[derive(clap::Args)]
pub struct GenerateArgs {
    /// Path to the JSON run configuration
    #[arg(long)]
    pub config: PathBuf,
    /// Directory receiving the generated macro file
    #[arg(long, default_value = "mac")]
    pub out_dir: PathBuf,
    /// Macro file name without extension; defaults to the run profile
    #[arg(long)]
    pub name: Option<String>,
    /// Seed for reproducible sampling; entropy-seeded when absent
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(clap::Args)]
pub struct PreviewArgs {
    /// Path to the JSON run configuration
    #[arg(long)]
    pub config: PathBuf,
    /// Seed for reproducible sampling; entropy-seeded when absent
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(clap::Args)]
pub struct EstimateArgs {
    /// Path to the JSON run configuration
    #[arg(long)]
    pub config: PathBuf,
    /// Seed for reproducible sampling; entropy-seeded when absent
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn run_generate_command(args: GenerateArgs) -> Result<i32, CliError> {
    let resolved = resolve_run(&args.config, args.seed)?;
    let profile = match args.name {
        Some(name) => name,
        None => resolve_profile(&resolved.config)?,
    };

    let written = write_mac_file(&args.out_dir, &profile, &resolved.mac_text)?;
    info!(
        profile = %profile,
        num_events = resolved.num_events,
        "macro file written"
    );
    println!("{}", written.display());
    Ok(0)
}

pub fn run_preview_command(args: PreviewArgs) -> Result<i32, CliError> {
    let resolved = resolve_run(&args.config, args.seed)?;
    print!("{}", resolved.mac_text);
    Ok(0)
}

pub fn run_estimate_command(args: EstimateArgs) -> Result<i32, CliError> {
    let config = load_config(&args.config)?;
    config.validate().map_err(CliError::Compute)?;
    let mut rng = make_rng(args.seed);
    println!("{}", required_events(&config, &mut rng));
    Ok(0)
}
