mod builder;
mod model;

pub use builder::build_spectrum;
pub use model::{ParticleEntry, Spectrum};
