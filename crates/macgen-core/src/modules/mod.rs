pub mod beamon;
pub mod macfile;
pub mod spectrum;
