//! The shared config structures for the Azure ML provisioner

use tracing_core::LevelFilter;

/// The levels to emit logs at
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Do not emit any logs
    Off,
    /// Only emit error logs
    Error,
    /// Emit info logs and up
    #[default]
    Info,
    /// Emit debug logs and up
    Debug,
    /// Emit all logs
    Trace,
}

impl LogLevel {
    /// Convert this log level to a tracing level filter
    #[must_use]
    pub fn to_filter(self) -> LevelFilter {
        // cast our log level to the right filter
        match self {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    /// Parse a log level from a string
    ///
    /// # Arguments
    ///
    /// * `raw` - The raw log level to parse
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        // match case insensitively
        match raw.to_ascii_lowercase().as_str() {
            "off" => Ok(LogLevel::Off),
            "error" => Ok(LogLevel::Error),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!("Unknown log level: {raw}")),
        }
    }
}

impl std::fmt::Display for LogLevel {
    /// Display this log level in a easily readable format
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            LogLevel::Off => write!(f, "off"),
            LogLevel::Error => write!(f, "error"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LogLevel;

    #[test]
    fn parse_levels() {
        // levels parse case insensitively
        assert_eq!("info".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        // unknown levels are rejected
        assert!("verbose".parse::<LogLevel>().is_err());
    }
}
