/// Dot-product lane: streams one row and the shared vector from memory through the
/// multiply-accumulate pipeline and reports the scalar result.
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use super::mac_pipe::MulAccPipeline;
use super::mem_msg::{CopReq, MemMsgType, MemReq, MemResp};
use crate::builtin::{Channel, Module, Wire};
use crate::config::{AccelConfig, WORD_BYTES};
use crate::error::ConfigError;

/// Lane command register indices.
pub const LANE_GO: u32 = 0;
pub const LANE_SIZE: u32 = 1;
pub const LANE_ROW_ADDR: u32 = 2;
pub const LANE_VEC_ADDR: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaneState {
  Idle,
  ReqRow,
  WaitRow,
  ReqVec,
  WaitVec,
  Accumulate,
  Done,
}

#[derive(Clone, Debug)]
pub struct DotProductLane {
  name: String,

  // command in / result out
  pub cpu_req: Channel<CopReq>,
  pub cpu_resp: Wire<u32>,

  // memory port
  pub mem_req: Channel<MemReq>,
  pub mem_resp: Channel<MemResp>,

  state: LaneState,
  size: u32,
  row_addr: u32,
  vec_addr: u32,
  idx: u32,
  row_data: u32,
  result_valid: bool,
  pipe: MulAccPipeline,

  addr_mask: u32,
  data_mask: u32,
  cop_addr_mask: u32,
  cop_data_mask: u32,
}

impl DotProductLane {
  pub fn new(name: impl Into<String>, config: &AccelConfig) -> Result<Self, ConfigError> {
    config.validate()?;
    Ok(Self {
      name: name.into(),
      cpu_req: Channel::default(),
      cpu_resp: Wire::default(),
      mem_req: Channel::default(),
      mem_resp: Channel::default(),
      state: LaneState::Idle,
      size: 0,
      row_addr: 0,
      vec_addr: 0,
      idx: 0,
      row_data: 0,
      result_valid: false,
      pipe: MulAccPipeline::new(config.nmul_stages, config.data_mask())?,
      addr_mask: config.addr_mask(),
      data_mask: config.data_mask(),
      cop_addr_mask: config.cop_addr_mask(),
      cop_data_mask: config.cop_data_mask(),
    })
  }

  pub fn state(&self) -> LaneState {
    self.state
  }

  /// Accumulated value; the final result once `cpu_resp` is valid.
  pub fn result(&self) -> u32 {
    self.pipe.read()
  }

  /// Result held from completion until the next command is accepted.
  pub fn response(&self) -> Option<u32> {
    if self.result_valid {
      Some(self.pipe.read())
    } else {
      None
    }
  }

  pub fn is_idle(&self) -> bool {
    self.state == LaneState::Idle
  }

  fn elem_addr(&self, base: u32) -> u32 {
    base.wrapping_add(self.idx.wrapping_mul(WORD_BYTES)) & self.addr_mask
  }

  fn waiting_on_memory(&self) -> bool {
    matches!(self.state, LaneState::WaitRow | LaneState::WaitVec)
  }

  fn accept_cmd(&mut self, cmd: CopReq) {
    self.result_valid = false;
    let value = cmd.data & self.cop_data_mask;
    match cmd.addr & self.cop_addr_mask {
      LANE_GO => {
        self.pipe.reset();
        self.idx = 0;
        self.state = if self.size == 0 {
          LaneState::Done
        } else {
          LaneState::ReqRow
        };
        debug!(
          "[{}] go: size={}, row=0x{:x}, vec=0x{:x}",
          self.name, self.size, self.row_addr, self.vec_addr
        );
      },
      LANE_SIZE => self.size = value,
      LANE_ROW_ADDR => self.row_addr = value,
      LANE_VEC_ADDR => self.vec_addr = value,
      other => log::warn!("[{}] ignoring write to unknown register {}", self.name, other),
    }
  }
}

impl Module for DotProductLane {
  fn comb(&mut self) {
    self.cpu_req.rdy = self.state == LaneState::Idle;

    match self.response() {
      Some(result) => self.cpu_resp.set(result),
      None => self.cpu_resp.clear(),
    }

    let req = match self.state {
      LaneState::ReqRow => Some(MemReq::read(self.elem_addr(self.row_addr))),
      LaneState::ReqVec => Some(MemReq::read(self.elem_addr(self.vec_addr))),
      _ => None,
    };
    match req {
      Some(req) => self.mem_req.send(req),
      None => self.mem_req.idle(),
    }

    self.mem_resp.rdy = self.waiting_on_memory();
  }

  fn run(&mut self) {
    debug_assert!(
      !self.mem_resp.val || self.waiting_on_memory(),
      "[{}] memory response with no outstanding request",
      self.name
    );

    let prev = self.state;
    match self.state {
      LaneState::Idle => {
        if let Some(cmd) = self.cpu_req.fired().copied() {
          self.accept_cmd(cmd);
        }
      },
      LaneState::ReqRow => {
        if self.mem_req.fire() {
          self.state = LaneState::WaitRow;
        }
      },
      LaneState::WaitRow => {
        if let Some(resp) = self.mem_resp.fired() {
          debug_assert_eq!(resp.kind, MemMsgType::Read);
          self.row_data = resp.data & self.data_mask;
          self.state = LaneState::ReqVec;
        }
      },
      LaneState::ReqVec => {
        if self.mem_req.fire() {
          self.state = LaneState::WaitVec;
        }
      },
      LaneState::WaitVec => {
        if let Some(resp) = self.mem_resp.fired() {
          debug_assert_eq!(resp.kind, MemMsgType::Read);
          let vec_data = resp.data & self.data_mask;
          self.pipe.push(self.row_data, vec_data);
          self.idx += 1;
          self.state = LaneState::Accumulate;
        }
      },
      LaneState::Accumulate => {
        if self.idx < self.size {
          self.state = LaneState::ReqRow;
        } else if self.pipe.is_drained() {
          self.state = LaneState::Done;
        }
      },
      LaneState::Done => {
        self.result_valid = true;
        self.state = LaneState::Idle;
        debug!("[{}] done: result={}", self.name, self.pipe.read());
      },
    }

    self.pipe.run();

    if prev != self.state {
      trace!("[{}] {:?} -> {:?}", self.name, prev, self.state);
    }
  }

  fn reset(&mut self) {
    self.cpu_req = Channel::default();
    self.cpu_resp = Wire::default();
    self.mem_req = Channel::default();
    self.mem_resp = Channel::default();
    self.state = LaneState::Idle;
    self.size = 0;
    self.row_addr = 0;
    self.vec_addr = 0;
    self.idx = 0;
    self.row_data = 0;
    self.result_valid = false;
    self.pipe.reset();
  }

  fn name(&self) -> &str {
    &self.name
  }

  fn line_trace(&self) -> String {
    let state = match self.state {
      LaneState::Idle => "I ",
      LaneState::ReqRow => "RR",
      LaneState::WaitRow => "WR",
      LaneState::ReqVec => "RV",
      LaneState::WaitVec => "WV",
      LaneState::Accumulate => "AC",
      LaneState::Done => "D ",
    };
    format!("{}[{}]{:>3}:{:08x}", state, self.pipe.line_trace(), self.idx, self.pipe.read())
  }
}
