use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::AccelConfig;
use crate::error::{Result, SimError};
use crate::harness::Workload;

/// Test memory parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MemorySection {
  /// Extra cycles before a response becomes valid
  #[serde(default)]
  pub delay: u64,
  #[serde(default = "default_mem_size")]
  pub size_bytes: usize,
}

fn default_mem_size() -> usize {
  1 << 16
}

impl Default for MemorySection {
  fn default() -> Self {
    Self {
      delay: 0,
      size_bytes: default_mem_size(),
    }
  }
}

/// Simulation run parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationSection {
  #[serde(default)]
  pub quiet: bool,
  #[serde(default)]
  pub step_mode: bool,
  /// JSON-lines cycle trace, disabled when empty
  #[serde(default)]
  pub trace_file: String,
  #[serde(default = "default_max_cycles")]
  pub max_cycles: u64,
  /// Idle cycles between command messages
  #[serde(default)]
  pub src_delay: u32,
}

fn default_max_cycles() -> u64 {
  10_000
}

impl Default for SimulationSection {
  fn default() -> Self {
    Self {
      quiet: false,
      step_mode: false,
      trace_file: String::new(),
      max_cycles: default_max_cycles(),
      src_delay: 0,
    }
  }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
  #[serde(default)]
  pub accel: AccelConfig,
  #[serde(default)]
  pub memory: MemorySection,
  #[serde(default)]
  pub simulation: SimulationSection,
  #[serde(default)]
  pub workload: Workload,
}

impl AppConfig {
  pub fn validate(&self) -> Result<()> {
    self.accel.validate()?;
    self.workload.validate(self.accel.nlanes, self.memory.size_bytes)?;
    Ok(())
  }
}

/// Load the shipped `configs/default.toml`
pub fn load_default_config() -> Result<AppConfig> {
  let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
  load_config_file(&manifest_dir.join("configs").join("default.toml"))
}

/// Load a configuration file
pub fn load_config_file(path: &Path) -> Result<AppConfig> {
  let content = fs::read_to_string(path).map_err(|e| {
    SimError::Io(std::io::Error::new(
      e.kind(),
      format!("cannot read config file {:?}: {}", path, e),
    ))
  })?;
  parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<AppConfig> {
  Ok(toml::from_str::<AppConfig>(content)?)
}

/// Command-line values that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
  pub lanes: Option<usize>,
  pub stages: Option<usize>,
  pub mem_delay: Option<u64>,
  pub max_cycles: Option<u64>,
  pub quiet: bool,
  pub step: bool,
  pub trace_file: Option<String>,
}

pub fn apply_cli_overrides(config: &mut AppConfig, cli: &CliOverrides) {
  if let Some(lanes) = cli.lanes {
    config.accel.nlanes = lanes;
  }
  if let Some(stages) = cli.stages {
    config.accel.nmul_stages = stages;
  }
  if let Some(delay) = cli.mem_delay {
    config.memory.delay = delay;
  }
  if let Some(max_cycles) = cli.max_cycles {
    config.simulation.max_cycles = max_cycles;
  }
  if cli.quiet {
    config.simulation.quiet = true;
  }
  if cli.step {
    config.simulation.step_mode = true;
  }
  if let Some(trace_file) = &cli.trace_file {
    config.simulation.trace_file = trace_file.clone();
  }
}
