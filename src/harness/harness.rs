/// Test harnesses wiring a command source and a test memory around the accelerator.
use log::trace;

use super::test_memory::TestMemory;
use super::test_source::TestSource;
use crate::accel::cop_regs::{REG_DEST_BASE, REG_GO, REG_ROW_BASE, REG_ROW_STRIDE, REG_SIZE, REG_VEC_BASE};
use crate::accel::dot_product::{DotProductLane, LANE_GO, LANE_ROW_ADDR, LANE_SIZE, LANE_VEC_ADDR};
use crate::accel::mem_msg::CopReq;
use crate::accel::mvmult::MatrixVec;
use crate::builtin::{connect, Module};
use crate::config::AccelConfig;
use crate::error::{Result, SimError};

/// Command message writing `value` to register `addr`.
pub fn config_msg(addr: u32, value: u32) -> CopReq {
  CopReq::new(addr, value)
}

/// Register writes plus `go` for one matrix-vector multiply.
pub fn matvec_config(size: u32, row_base: u32, vec_base: u32, dest_base: u32, row_stride: Option<u32>) -> Vec<CopReq> {
  let mut msgs = vec![
    config_msg(REG_SIZE, size),
    config_msg(REG_ROW_BASE, row_base),
    config_msg(REG_VEC_BASE, vec_base),
    config_msg(REG_DEST_BASE, dest_base),
  ];
  if let Some(stride) = row_stride {
    msgs.push(config_msg(REG_ROW_STRIDE, stride));
  }
  msgs.push(config_msg(REG_GO, 1));
  msgs
}

/// Lane command sequence for one dot product.
pub fn dot_config(size: u32, row_addr: u32, vec_addr: u32) -> Vec<CopReq> {
  vec![
    config_msg(LANE_SIZE, size),
    config_msg(LANE_ROW_ADDR, row_addr),
    config_msg(LANE_VEC_ADDR, vec_addr),
    config_msg(LANE_GO, 1),
  ]
}

/// Common driver loop over a harness.
pub trait Harness {
  fn cycle(&mut self);

  fn done(&self) -> bool;

  fn ncycles(&self) -> u64;

  fn line_trace(&self) -> String;

  /// Cycle until `done`, failing after `max_cycles`.
  fn run(&mut self, max_cycles: u64) -> Result<u64> {
    while !self.done() {
      if self.ncycles() >= max_cycles {
        return Err(SimError::Timeout { cycles: max_cycles });
      }
      self.cycle();
      trace!("{:>4}: {}", self.ncycles(), self.line_trace());
    }
    Ok(self.ncycles())
  }
}

/// Source -> coprocessor -> memory, one memory port per lane.
#[derive(Debug)]
pub struct MatrixVecHarness {
  pub src: TestSource<CopReq>,
  pub cop: MatrixVec,
  pub mem: TestMemory,
  ncycles: u64,
}

impl MatrixVecHarness {
  pub fn new(config: &AccelConfig, mem_delay: u64, mem_size: usize, src_delay: u32, msgs: Vec<CopReq>) -> Result<Self> {
    let cop = MatrixVec::new("cop", config)?;
    let mem = TestMemory::new("mem", config.nlanes, mem_delay, mem_size)?;
    Ok(Self {
      src: TestSource::new("src", msgs, src_delay),
      cop,
      mem,
      ncycles: 0,
    })
  }

  pub fn reset(&mut self) {
    self.src.reset();
    self.cop.reset();
    self.mem.reset();
    self.ncycles = 0;
  }
}

impl Harness for MatrixVecHarness {
  fn cycle(&mut self) {
    self.src.comb();
    self.cop.comb();
    self.mem.comb();

    connect(&mut self.src.out, &mut self.cop.from_cpu);
    for j in 0..self.cop.nlanes() {
      connect(&mut self.cop.lane_req[j], &mut self.mem.reqs[j]);
      connect(&mut self.mem.resps[j], &mut self.cop.lane_resp[j]);
    }

    self.src.run();
    self.cop.run();
    self.mem.run();
    self.ncycles += 1;
  }

  fn done(&self) -> bool {
    self.src.done() && self.cop.is_ready()
  }

  fn ncycles(&self) -> u64 {
    self.ncycles
  }

  fn line_trace(&self) -> String {
    format!("{} > {} || {}", self.src.line_trace(), self.cop.line_trace(), self.mem.line_trace())
  }
}

/// Source -> single lane -> single-port memory.
#[derive(Debug)]
pub struct DotProductHarness {
  pub src: TestSource<CopReq>,
  pub lane: DotProductLane,
  pub mem: TestMemory,
  ncycles: u64,
}

impl DotProductHarness {
  pub fn new(config: &AccelConfig, mem_delay: u64, mem_size: usize, msgs: Vec<CopReq>) -> Result<Self> {
    Ok(Self {
      src: TestSource::new("src", msgs, 0),
      lane: DotProductLane::new("lane", config)?,
      mem: TestMemory::new("mem", 1, mem_delay, mem_size)?,
      ncycles: 0,
    })
  }

  /// The lane's result once it is valid.
  pub fn result(&self) -> Option<u32> {
    self.lane.response()
  }
}

impl Harness for DotProductHarness {
  fn cycle(&mut self) {
    self.src.comb();
    self.lane.comb();
    self.mem.comb();

    connect(&mut self.src.out, &mut self.lane.cpu_req);
    connect(&mut self.lane.mem_req, &mut self.mem.reqs[0]);
    connect(&mut self.mem.resps[0], &mut self.lane.mem_resp);

    self.src.run();
    self.lane.run();
    self.mem.run();
    self.ncycles += 1;
  }

  fn done(&self) -> bool {
    self.src.done() && self.lane.response().is_some()
  }

  fn ncycles(&self) -> u64 {
    self.ncycles
  }

  fn line_trace(&self) -> String {
    format!("{} > {} || {}", self.src.line_trace(), self.lane.line_trace(), self.mem.line_trace())
  }
}
