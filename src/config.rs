/// Accelerator structural parameters, fixed at construction.
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Bytes per word for row/vector indexing.
pub const WORD_BYTES: u32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccelConfig {
  /// Number of dot-product lanes
  pub nlanes: usize,
  /// Stages in the multiply pipeline
  pub nmul_stages: usize,
  /// Register index width on the command channel
  pub cop_addr_nbits: u32,
  /// Value width on the command channel
  pub cop_data_nbits: u32,
  pub mem_addr_nbits: u32,
  pub mem_data_nbits: u32,
}

impl AccelConfig {
  pub fn new(nlanes: usize, nmul_stages: usize) -> Self {
    Self {
      nlanes,
      nmul_stages,
      ..Self::default()
    }
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.nlanes == 0 {
      return Err(ConfigError::ZeroLanes);
    }
    if self.nmul_stages == 0 {
      return Err(ConfigError::ZeroDepth);
    }
    // index 5 (row stride) is the highest register, so three bits is the floor
    check_width("cop_addr_nbits", self.cop_addr_nbits, 3, 8)?;
    check_width("cop_data_nbits", self.cop_data_nbits, 1, 32)?;
    check_width("mem_addr_nbits", self.mem_addr_nbits, 1, 32)?;
    check_width("mem_data_nbits", self.mem_data_nbits, 1, 32)?;
    Ok(())
  }

  pub fn cop_addr_mask(&self) -> u32 {
    mask(self.cop_addr_nbits)
  }

  pub fn cop_data_mask(&self) -> u32 {
    mask(self.cop_data_nbits)
  }

  pub fn addr_mask(&self) -> u32 {
    mask(self.mem_addr_nbits)
  }

  pub fn data_mask(&self) -> u32 {
    mask(self.mem_data_nbits)
  }
}

impl Default for AccelConfig {
  fn default() -> Self {
    Self {
      nlanes: 1,
      nmul_stages: 1,
      cop_addr_nbits: 5,
      cop_data_nbits: 32,
      mem_addr_nbits: 32,
      mem_data_nbits: 32,
    }
  }
}

fn check_width(field: &'static str, nbits: u32, min: u32, max: u32) -> Result<(), ConfigError> {
  if nbits < min || nbits > max {
    return Err(ConfigError::Width { field, nbits, min, max });
  }
  Ok(())
}

/// Low `nbits` set.
pub fn mask(nbits: u32) -> u32 {
  if nbits >= 32 {
    u32::MAX
  } else {
    (1u32 << nbits) - 1
  }
}
