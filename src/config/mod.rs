//! Configuration loading
//!
//! Built-in defaults, optionally overridden by a TOML settings file; CLI
//! flags take precedence over both.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{SplitXError, SplitXResult};
use crate::source::DEFAULT_SIZE_LIMIT;

/// Job settings with file-level overrides
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Nominal chunk length in seconds
    pub chunk_length: f64,
    /// Ceiling on remote source size in bytes
    pub size_limit: u64,
    /// Per-segment processing bound in seconds
    pub segment_timeout_secs: u64,
    /// Parallel segment jobs for the stream-copy strategy
    pub jobs: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chunk_length: 1500.0,
            size_limit: DEFAULT_SIZE_LIMIT,
            segment_timeout_secs: 300,
            jobs: 1,
        }
    }
}

impl Settings {
    /// Load settings from `path`, or defaults when no file is given.
    pub fn load(path: Option<&Path>) -> SplitXResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path).map_err(|e| SplitXError::ConfigError {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        let settings: Settings =
            toml::from_str(&content).map_err(|e| SplitXError::ConfigError {
                message: format!("failed to parse {}: {}", path.display(), e),
            })?;

        settings.validate()?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    fn validate(&self) -> SplitXResult<()> {
        if self.chunk_length <= 0.0 {
            return Err(SplitXError::ConfigError {
                message: format!("chunk_length must be positive, got {}", self.chunk_length),
            });
        }
        if self.segment_timeout_secs == 0 {
            return Err(SplitXError::ConfigError {
                message: "segment_timeout_secs must be positive".to_string(),
            });
        }
        if self.jobs == 0 {
            return Err(SplitXError::ConfigError {
                message: "jobs must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.chunk_length, 1500.0);
        assert_eq!(settings.size_limit, DEFAULT_SIZE_LIMIT);
        assert_eq!(settings.segment_timeout_secs, 300);
        assert_eq!(settings.jobs, 1);
    }

    #[test]
    fn test_partial_file_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chunk_length = 600.0\njobs = 4").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.chunk_length, 600.0);
        assert_eq!(settings.jobs, 4);
        assert_eq!(settings.segment_timeout_secs, 300);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chunk_length = -5.0").unwrap();
        assert!(Settings::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_rejects_unknown_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chunk_minutes = 25").unwrap();
        assert!(Settings::load(Some(file.path())).is_err());
    }
}
