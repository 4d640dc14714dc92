//! Core library for preparing Geant4 GPS macro files.
//!
//! The pipeline is: typed run configuration -> resolved particle spectrum ->
//! beam-on event count -> rendered macro text. File writing and process
//! invocation live in the CLI crate; everything here is a pure in-memory
//! computation apart from `tracing` warnings.

pub mod common;
pub mod config;
pub mod domain;
pub mod modules;

pub use common::precision::EnergyPrecision;
pub use config::{GpsMode, RunConfig, SourceConfig};
pub use domain::{MacGenError, MacGenErrorCategory, MacGenResult, Species};
pub use modules::beamon::{log_expected_distribution, required_events};
pub use modules::macfile::{MacRenderOptions, render_mac};
pub use modules::spectrum::{ParticleEntry, Spectrum, build_spectrum};
