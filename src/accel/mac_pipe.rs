/// Pipelined multiplier feeding an accumulator.
use std::collections::VecDeque;

use crate::error::ConfigError;

/// `depth` multiply stages in series; the product leaving the last stage is added into the
/// accumulator. A `push` in cycle t shows up in `read()` from cycle t + depth.
#[derive(Clone, Debug)]
pub struct MulAccPipeline {
  slots: VecDeque<Option<u32>>,
  input: Option<u32>,
  acc: u32,
  mask: u32,
}

impl MulAccPipeline {
  pub fn new(depth: usize, mask: u32) -> Result<Self, ConfigError> {
    if depth == 0 {
      return Err(ConfigError::ZeroDepth);
    }
    Ok(Self {
      slots: VecDeque::from(vec![None; depth]),
      input: None,
      acc: 0,
      mask,
    })
  }

  pub fn depth(&self) -> usize {
    self.slots.len()
  }

  /// Multiply `a * b` into slot 0 at the next clock edge. At most once per cycle.
  pub fn push(&mut self, a: u32, b: u32) {
    debug_assert!(self.input.is_none(), "two pushes into the multiply pipeline in one cycle");
    self.input = Some(a.wrapping_mul(b) & self.mask);
  }

  pub fn read(&self) -> u32 {
    self.acc
  }

  /// No product is waiting to reach the accumulator.
  pub fn is_drained(&self) -> bool {
    self.input.is_none() && self.slots.iter().all(Option::is_none)
  }

  /// Clock edge: shift every slot forward, retire the last one into the accumulator.
  pub fn run(&mut self) {
    self.slots.pop_back();
    self.slots.push_front(self.input.take());
    if let Some(product) = self.slots.back_mut().and_then(Option::take) {
      self.acc = self.acc.wrapping_add(product) & self.mask;
    }
  }

  pub fn reset(&mut self) {
    self.slots.iter_mut().for_each(|s| *s = None);
    self.input = None;
    self.acc = 0;
  }

  pub fn line_trace(&self) -> String {
    self
      .slots
      .iter()
      .map(|s| if s.is_some() { '*' } else { '.' })
      .collect()
  }
}
