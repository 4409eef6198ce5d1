use std::io;

use thiserror::Error;

/// Structural misconfiguration, rejected before any cycle runs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
  #[error("coprocessor needs at least one lane")]
  ZeroLanes,

  #[error("multiply pipeline depth must be at least 1")]
  ZeroDepth,

  #[error("{field} is {nbits} bits, expected {min}..={max}")]
  Width {
    field: &'static str,
    nbits: u32,
    min: u32,
    max: u32,
  },

  #[error("memory needs at least one port")]
  ZeroPorts,

  #[error("workload: {0}")]
  Workload(String),
}

#[derive(Debug, Error)]
pub enum SimError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error(transparent)]
  Io(#[from] io::Error),

  #[error("failed to parse config: {0}")]
  Toml(#[from] toml::de::Error),

  #[error("simulation did not finish within {cycles} cycles")]
  Timeout { cycles: u64 },

  #[error("result mismatch: expected {expected:?}, got {actual:?}")]
  Mismatch { expected: Vec<u32>, actual: Vec<u32> },
}

pub type Result<T, E = SimError> = std::result::Result<T, E>;
