use std::fmt::{Display, Formatter};

pub type MacGenResult<T> = Result<T, MacGenError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacGenErrorCategory {
    /// Malformed or inconsistent run configuration. Fatal before any rendering.
    ConfigError,
    /// Filesystem failure surfaced from a collaborator, underlying cause kept.
    IoSystemError,
    /// Contract violation inside the pipeline itself.
    InternalError,
}

impl MacGenErrorCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigError => "config",
            Self::IoSystemError => "io",
            Self::InternalError => "internal",
        }
    }

    pub const fn exit_code(self) -> i32 {
        match self {
            Self::ConfigError => 2,
            Self::IoSystemError => 3,
            Self::InternalError => 4,
        }
    }
}

impl Display for MacGenErrorCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// Error value shared across the whole pipeline. Every failure carries a
/// stable placeholder code (`INPUT.*`, `IO.*`, `SYS.*`) naming the offending
/// key or subsystem so the CLI boundary can report it without re-deriving
/// context.
#[derive(Debug, Clone, thiserror::Error)]
#[error("[{placeholder}] {message}")]
pub struct MacGenError {
    category: MacGenErrorCategory,
    placeholder: String,
    message: String,
}

impl MacGenError {
    pub fn config(placeholder: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category: MacGenErrorCategory::ConfigError,
            placeholder: placeholder.into(),
            message: message.into(),
        }
    }

    pub fn io_system(placeholder: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category: MacGenErrorCategory::IoSystemError,
            placeholder: placeholder.into(),
            message: message.into(),
        }
    }

    pub fn internal(placeholder: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category: MacGenErrorCategory::InternalError,
            placeholder: placeholder.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> MacGenErrorCategory {
        self.category
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        format!(
            "macgen {} error [{}]: {}",
            self.category, self.placeholder, self.message
        )
    }

    pub fn fatal_exit_line(&self) -> Option<String> {
        match self.category {
            MacGenErrorCategory::ConfigError => None,
            _ => Some(format!(
                "macgen: fatal {} failure, exiting with code {}",
                self.category,
                self.exit_code()
            )),
        }
    }
}
