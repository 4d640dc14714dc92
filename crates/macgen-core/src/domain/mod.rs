pub mod errors;

pub use errors::{MacGenError, MacGenErrorCategory, MacGenResult};

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Particle species identifier, carried by its Geant4 name in configuration
/// files and macro commands. Unknown names are preserved verbatim rather than
/// rejected so the generator stays open to the full Geant4 particle table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Species {
    Electron,
    Positron,
    Proton,
    Gamma,
    Neutron,
    Alpha,
    Other(String),
}

impl Species {
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "e-" => Self::Electron,
            "e+" => Self::Positron,
            "proton" => Self::Proton,
            "gamma" => Self::Gamma,
            "neutron" => Self::Neutron,
            "alpha" => Self::Alpha,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Electron => "e-",
            Self::Positron => "e+",
            Self::Proton => "proton",
            Self::Gamma => "gamma",
            Self::Neutron => "neutron",
            Self::Alpha => "alpha",
            Self::Other(name) => name,
        }
    }
}

impl Display for Species {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Species {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Species {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}
