/// Coprocessor configuration register file
use serde::{Deserialize, Serialize};

use crate::config::WORD_BYTES;

pub const REG_GO: u32 = 0;
pub const REG_SIZE: u32 = 1;
pub const REG_ROW_BASE: u32 = 2;
pub const REG_VEC_BASE: u32 = 3;
pub const REG_DEST_BASE: u32 = 4;
/// Optional: words between row starts, defaults to `size`
pub const REG_ROW_STRIDE: u32 = 5;

const REQUIRED: u8 = (1 << REG_SIZE) | (1 << REG_ROW_BASE) | (1 << REG_VEC_BASE) | (1 << REG_DEST_BASE);

/// Snapshot of the registers taken when a `go` is accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispatch {
  pub size: u32,
  pub row_base: u32,
  pub vec_base: u32,
  pub dest_base: u32,
  pub row_stride: u32,
}

impl Dispatch {
  /// First byte of the row handled by `lane`.
  pub fn lane_row_base(&self, lane: usize) -> u32 {
    let lane = lane as u32;
    self
      .row_base
      .wrapping_add(lane.wrapping_mul(self.row_stride).wrapping_mul(WORD_BYTES))
  }

  /// Where `lane` writes its result.
  pub fn dest_addr(&self, lane: usize) -> u32 {
    self.dest_base.wrapping_add((lane as u32).wrapping_mul(WORD_BYTES))
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegWrite {
  Stored,
  Go(Dispatch),
  /// `go` before every required register was written; nothing happens
  IgnoredGo,
  Unknown(u32),
}

#[derive(Clone, Debug, Default)]
pub struct CopRegs {
  size: u32,
  row_base: u32,
  vec_base: u32,
  dest_base: u32,
  row_stride: Option<u32>,
  written: u8,
}

impl CopRegs {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn write(&mut self, addr: u32, value: u32) -> RegWrite {
    match addr {
      REG_GO => {
        if !self.is_complete() {
          return RegWrite::IgnoredGo;
        }
        let dispatch = Dispatch {
          size: self.size,
          row_base: self.row_base,
          vec_base: self.vec_base,
          dest_base: self.dest_base,
          row_stride: self.row_stride.unwrap_or(self.size),
        };
        self.written = 0;
        self.row_stride = None;
        return RegWrite::Go(dispatch);
      },
      REG_SIZE => self.size = value,
      REG_ROW_BASE => self.row_base = value,
      REG_VEC_BASE => self.vec_base = value,
      REG_DEST_BASE => self.dest_base = value,
      REG_ROW_STRIDE => self.row_stride = Some(value),
      _ => return RegWrite::Unknown(addr),
    }
    self.written |= 1 << addr;
    RegWrite::Stored
  }

  /// Every required register written since the last dispatch.
  pub fn is_complete(&self) -> bool {
    self.written & REQUIRED == REQUIRED
  }

  pub fn reset(&mut self) {
    *self = Self::default();
  }
}
