// Copyright 2025 Cowboy AI, LLC.

//! Deployment configuration consumed by the stack builder
//!
//! Three scalar parameters feed the topology: the container port the
//! services listen on, and the CPU/memory quotas for each task. All three
//! have defaults and are validated on construction so a bad value fails
//! before any descriptor is built.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::{TopologyError, TopologyResult};

const DEFAULT_CONTAINER_PORT: u16 = 5000;
const DEFAULT_CPU: u32 = 512;
const DEFAULT_MEMORY_MIB: u32 = 128;

/// Scalar parameters for the web/api deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Port the application containers listen on
    #[serde(default = "default_container_port")]
    pub container_port: u16,
    /// CPU units allocated to each task
    #[serde(default = "default_cpu")]
    pub cpu: u32,
    /// Memory in MiB allocated to each task
    #[serde(default = "default_memory")]
    pub memory: u32,
}

fn default_container_port() -> u16 {
    DEFAULT_CONTAINER_PORT
}

fn default_cpu() -> u32 {
    DEFAULT_CPU
}

fn default_memory() -> u32 {
    DEFAULT_MEMORY_MIB
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            container_port: DEFAULT_CONTAINER_PORT,
            cpu: DEFAULT_CPU,
            memory: DEFAULT_MEMORY_MIB,
        }
    }
}

impl DeploymentConfig {
    /// Create a configuration with explicit values, validating each
    pub fn new(container_port: u16, cpu: u32, memory: u32) -> TopologyResult<Self> {
        let config = Self {
            container_port,
            cpu,
            memory,
        };
        config.validate()?;
        Ok(config)
    }

    /// Build from a string key/value map, falling back to defaults
    ///
    /// Recognized keys are `containerPort`, `cpu`, and `memory`. Unparsable
    /// values are configuration errors rather than silent fallbacks.
    pub fn from_lookup(values: &HashMap<String, String>) -> TopologyResult<Self> {
        let container_port = parse_or(values, "containerPort", DEFAULT_CONTAINER_PORT)?;
        let cpu = parse_or(values, "cpu", DEFAULT_CPU)?;
        let memory = parse_or(values, "memory", DEFAULT_MEMORY_MIB)?;

        Self::new(container_port, cpu, memory)
    }

    /// Validate the configuration, failing fast on non-positive values
    pub fn validate(&self) -> TopologyResult<()> {
        if self.container_port == 0 {
            return Err(TopologyError::InvalidConfiguration(
                "containerPort must be positive".into(),
            ));
        }
        if self.cpu == 0 {
            return Err(TopologyError::InvalidConfiguration(
                "cpu must be positive".into(),
            ));
        }
        if self.memory == 0 {
            return Err(TopologyError::InvalidConfiguration(
                "memory must be positive".into(),
            ));
        }
        Ok(())
    }
}

fn parse_or<T: std::str::FromStr>(
    values: &HashMap<String, String>,
    key: &str,
    default: T,
) -> TopologyResult<T> {
    match values.get(key) {
        Some(raw) => raw.parse().map_err(|_| {
            TopologyError::InvalidConfiguration(format!("{} is not a valid integer: {}", key, raw))
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_defaults() {
        let config = DeploymentConfig::default();
        assert_eq!(config.container_port, 5000);
        assert_eq!(config.cpu, 512);
        assert_eq!(config.memory, 128);
        assert!(config.validate().is_ok());
    }

    #[test_case(0, 512, 128 ; "zero port")]
    #[test_case(5000, 0, 128 ; "zero cpu")]
    #[test_case(5000, 512, 0 ; "zero memory")]
    fn test_non_positive_values_fail(port: u16, cpu: u32, memory: u32) {
        assert!(DeploymentConfig::new(port, cpu, memory).is_err());
    }

    #[test]
    fn test_from_lookup_with_overrides() {
        let mut values = HashMap::new();
        values.insert("containerPort".to_string(), "8080".to_string());
        values.insert("cpu".to_string(), "1024".to_string());

        let config = DeploymentConfig::from_lookup(&values).unwrap();
        assert_eq!(config.container_port, 8080);
        assert_eq!(config.cpu, 1024);
        assert_eq!(config.memory, 128); // default
    }

    #[test]
    fn test_from_lookup_rejects_garbage() {
        let mut values = HashMap::new();
        values.insert("containerPort".to_string(), "not-a-port".to_string());

        assert!(DeploymentConfig::from_lookup(&values).is_err());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: DeploymentConfig = serde_json::from_str(r#"{"container_port": 9000}"#).unwrap();
        assert_eq!(config.container_port, 9000);
        assert_eq!(config.cpu, 512);
        assert_eq!(config.memory, 128);
    }
}
