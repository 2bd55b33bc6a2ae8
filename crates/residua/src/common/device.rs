//! Device selection.

use std::fmt;
use std::str::FromStr;

use crate::common::ResiduaError;

/// Execution device for the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Device {
    /// Run on CPU (default, always available).
    #[default]
    Cpu,

    /// Pick the best available device.
    Auto,
}

impl Device {
    /// Resolve `Auto` to a concrete device. Only the CPU backend exists.
    pub fn resolve(self) -> Self {
        match self {
            Self::Auto => Self::Cpu,
            other => other,
        }
    }

    pub fn is_cpu(&self) -> bool {
        matches!(self.resolve(), Self::Cpu)
    }
}

impl FromStr for Device {
    type Err = ResiduaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cpu" => Ok(Device::Cpu),
            "auto" => Ok(Device::Auto),
            other => Err(ResiduaError::InvalidConfig(format!(
                "unsupported device '{}' (expected 'cpu' or 'auto')",
                other
            ))),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Auto => write!(f, "auto"),
        }
    }
}
