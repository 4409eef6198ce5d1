/// A matrix-vector problem, its memory layout and its software reference result.
use serde::{Deserialize, Serialize};

use super::harness::matvec_config;
use super::test_memory::TestMemory;
use crate::accel::mem_msg::CopReq;
use crate::config::WORD_BYTES;
use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Workload {
  pub matrix: Vec<Vec<u32>>,
  pub vector: Vec<u32>,
  pub row_base: u32,
  pub vec_base: u32,
  pub dest_base: u32,
  /// Words between row starts; rows are packed when unset
  pub row_stride: Option<u32>,
  /// Filler stored in the gap between padded rows
  pub pad_word: u32,
}

impl Workload {
  pub fn new(matrix: Vec<Vec<u32>>, vector: Vec<u32>) -> Self {
    Self {
      matrix,
      vector,
      ..Self::default()
    }
  }

  pub fn size(&self) -> u32 {
    self.vector.len() as u32
  }

  pub fn stride(&self) -> u32 {
    self.row_stride.unwrap_or_else(|| self.size())
  }

  pub fn validate(&self, nlanes: usize, mem_size: usize) -> Result<(), ConfigError> {
    if self.matrix.len() < nlanes {
      return Err(ConfigError::Workload(format!(
        "{} lanes but only {} matrix rows",
        nlanes,
        self.matrix.len()
      )));
    }
    if let Some(i) = self.matrix.iter().position(|row| row.len() != self.vector.len()) {
      return Err(ConfigError::Workload(format!(
        "row {} has {} elements, vector has {}",
        i,
        self.matrix[i].len(),
        self.vector.len()
      )));
    }
    if self.stride() < self.size() {
      return Err(ConfigError::Workload(format!(
        "row stride {} is shorter than a row ({} words)",
        self.stride(),
        self.size()
      )));
    }
    let word = WORD_BYTES as u64;
    let rows = self.matrix.len() as u64;
    let ends = [
      self.row_base as u64 + rows * self.stride() as u64 * word,
      self.vec_base as u64 + self.size() as u64 * word,
      self.dest_base as u64 + nlanes as u64 * word,
    ];
    if let Some(end) = ends.iter().copied().find(|&end| end > mem_size as u64) {
      return Err(ConfigError::Workload(format!(
        "layout reaches byte 0x{:x}, memory has 0x{:x}",
        end, mem_size
      )));
    }
    Ok(())
  }

  /// Lay the matrix and vector out in memory.
  pub fn load(&self, mem: &mut TestMemory) {
    let stride = self.stride() as usize;
    for (j, row) in self.matrix.iter().enumerate() {
      let mut words = row.clone();
      if j + 1 < self.matrix.len() {
        words.resize(stride, self.pad_word);
      }
      let base = self.row_base.wrapping_add((j * stride) as u32 * WORD_BYTES);
      mem.load_words(base, &words);
    }
    mem.load_words(self.vec_base, &self.vector);
  }

  pub fn config_msgs(&self) -> Vec<CopReq> {
    matvec_config(self.size(), self.row_base, self.vec_base, self.dest_base, self.row_stride)
  }

  /// Expected destination vector for the first `nlanes` rows.
  pub fn expected(&self, nlanes: usize, data_mask: u32) -> Vec<u32> {
    self
      .matrix
      .iter()
      .take(nlanes)
      .map(|row| reference_dot(row, &self.vector, data_mask))
      .collect()
  }
}

impl Default for Workload {
  /// The 3x3 reference problem.
  fn default() -> Self {
    Self {
      matrix: vec![vec![5, 1, 3], vec![1, 1, 1], vec![1, 2, 1]],
      vector: vec![1, 2, 3],
      row_base: 0,
      vec_base: 80,
      dest_base: 160,
      row_stride: None,
      pad_word: 99,
    }
  }
}

/// Wrapping dot product at the given data width.
pub fn reference_dot(row: &[u32], vector: &[u32], data_mask: u32) -> u32 {
  row
    .iter()
    .zip(vector)
    .fold(0u32, |acc, (&a, &b)| acc.wrapping_add(a.wrapping_mul(b) & data_mask) & data_mask)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reference_matches_known_results() {
    let w = Workload::default();
    assert_eq!(w.expected(3, u32::MAX), vec![16, 6, 8]);
    assert_eq!(reference_dot(&[5, 1, 3, 9, 10], &[1, 2, 3, 9, 0], u32::MAX), 97);
    assert_eq!(reference_dot(&[], &[], u32::MAX), 0);
  }

  #[test]
  fn padded_layout_puts_filler_between_rows() {
    let w = Workload {
      row_stride: Some(4),
      ..Workload::default()
    };
    let mut mem = TestMemory::new("mem", 1, 0, 256).unwrap();
    w.load(&mut mem);
    assert_eq!(mem.read_words(0, 11), vec![5, 1, 3, 99, 1, 1, 1, 99, 1, 2, 1]);
    assert_eq!(mem.read_words(80, 3), vec![1, 2, 3]);
  }

  #[test]
  fn validate_catches_bad_shapes() {
    let w = Workload::default();
    assert!(w.validate(3, 256).is_ok());
    assert!(w.validate(4, 256).is_err());
    assert!(w.validate(3, 100).is_err());

    let ragged = Workload::new(vec![vec![1, 2], vec![1]], vec![1, 2]);
    assert!(ragged.validate(1, 256).is_err());

    let overlapping = Workload {
      row_stride: Some(2),
      ..Workload::default()
    };
    assert!(overlapping.validate(1, 256).is_err());
  }
}
