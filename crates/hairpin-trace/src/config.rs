//! Conversion parameters
//!
//! Every knob of the conversion lives in [`PrepareConfig`]. The defaults are
//! the values the emulator traces are prepared with; a JSON file may override
//! any subset of them.

use crate::error::{Result, TraceError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What the reader does with a line it cannot parse
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedLinePolicy {
    /// Abort on the first malformed line
    #[default]
    FailFast,
    /// Log the line and continue with the next one
    Skip,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepareConfig {
    /// Length of one trace sample in milliseconds
    pub period_ms: u32,
    /// Bytes per emulated packet
    pub packet_size_bytes: u32,
    /// Samples per window in split mode
    pub target_trace_len: usize,
    /// Mean bandwidth every emitted window is rescaled to
    pub target_mean_bandwidth: f64,
    /// Exact number of lossy samples kept per emitted window
    pub target_loss_events: usize,
    /// Lossy-line count a trace must exceed to be selected
    pub loss_select_threshold: usize,
    /// Optional random seed for deterministic thinning
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub malformed_lines: MalformedLinePolicy,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            period_ms: 30,
            packet_size_bytes: 1500,
            target_trace_len: 600,
            target_mean_bandwidth: 30.0,
            target_loss_events: 10,
            loss_select_threshold: 1000,
            seed: None, // Random by default
            malformed_lines: MalformedLinePolicy::FailFast,
        }
    }
}

impl PrepareConfig {
    /// Load a configuration from a JSON file; absent fields keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| TraceError::io(path, e))?;
        let config: PrepareConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.period_ms == 0 {
            return Err(TraceError::Config("period_ms must be positive".into()));
        }
        if self.packet_size_bytes == 0 {
            return Err(TraceError::Config(
                "packet_size_bytes must be positive".into(),
            ));
        }
        if self.target_trace_len == 0 {
            return Err(TraceError::Config(
                "target_trace_len must be positive".into(),
            ));
        }
        if !(self.target_mean_bandwidth > 0.0) {
            return Err(TraceError::Config(format!(
                "target_mean_bandwidth must be positive, got {}",
                self.target_mean_bandwidth
            )));
        }
        if self.target_loss_events > self.target_trace_len {
            return Err(TraceError::Config(format!(
                "target_loss_events ({}) exceeds target_trace_len ({})",
                self.target_loss_events, self.target_trace_len
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = PrepareConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.period_ms, 30);
        assert_eq!(config.packet_size_bytes, 1500);
        assert_eq!(config.target_trace_len, 600);
        assert_eq!(config.target_loss_events, 10);
        assert_eq!(config.malformed_lines, MalformedLinePolicy::FailFast);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"seed": 7, "malformed_lines": "skip"}}"#).unwrap();

        let config = PrepareConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.malformed_lines, MalformedLinePolicy::Skip);
        assert_eq!(config.period_ms, 30);
        assert_eq!(config.target_mean_bandwidth, 30.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = PrepareConfig {
            period_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PrepareConfig {
            target_loss_events: 700,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PrepareConfig {
            target_mean_bandwidth: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = PrepareConfig::from_json_file("/nonexistent/config.json").unwrap_err();
        assert!(matches!(err, TraceError::Io { .. }));
    }
}
