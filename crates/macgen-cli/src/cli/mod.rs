mod commands;
mod helpers;

use clap::Parser;
use macgen_core::MacGenError;

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().collect();
    match parse_and_dispatch(args) {
        Ok(code) => code,
        Err(error) => {
            let diagnostic = error.as_macgen_error();
            eprintln!("{}", diagnostic.diagnostic_line());
            if let Some(summary_line) = diagnostic.fatal_exit_line() {
                eprintln!("{summary_line}");
            }
            diagnostic.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("macgen".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => dispatch_parsed(cli.command),
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{err}");
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(name = "macgen", about = "Geant4 GPS macro generator for CompScintSim runs")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Build the spectrum and write the macro file
    Generate(commands::GenerateArgs),
    /// Build the spectrum and print the macro text to stdout
    Preview(commands::PreviewArgs),
    /// Print the resolved beam-on event count
    Estimate(commands::EstimateArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Generate(args) => commands::run_generate_command(args),
        CliCommand::Preview(args) => commands::run_preview_command(args),
        CliCommand::Estimate(args) => commands::run_estimate_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(MacGenError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<MacGenError> for CliError {
    fn from(error: MacGenError) -> Self {
        Self::Compute(error)
    }
}

impl CliError {
    fn as_macgen_error(&self) -> MacGenError {
        match self {
            Self::Usage(message) => MacGenError::config("INPUT.CLI_USAGE", message.clone()),
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => MacGenError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}
