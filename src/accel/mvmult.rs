/// Matrix-vector coprocessor: N dot-product lanes behind one configuration interface.
///
/// A `go` broadcasts the configuration to every lane (lane j gets row j), waits until all
/// lanes report a result, then writes result j to `dest_base + 4*j` through lane j's memory
/// port. Lane count and pipeline depth are fixed at construction.
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::cop_regs::{CopRegs, Dispatch, RegWrite};
use super::dot_product::{DotProductLane, LANE_GO, LANE_ROW_ADDR, LANE_SIZE, LANE_VEC_ADDR};
use super::mem_msg::{CopReq, MemMsgType, MemReq, MemResp};
use crate::builtin::{connect_bwd, connect_fwd, Channel, Module};
use crate::config::AccelConfig;
use crate::error::ConfigError;

const LANE_CMDS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CopState {
  Idle,
  /// Sending size/row/vec/go to the lanes
  Config,
  /// Lanes computing
  Compute,
  /// Writing results back
  WriteBack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WbState {
  Send,
  Wait,
  Acked,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopStats {
  pub dispatches: u64,
  pub ignored_dispatches: u64,
  pub busy_cycles: u64,
}

#[derive(Clone, Debug)]
pub struct MatrixVec {
  name: String,

  // command channel from the host
  pub from_cpu: Channel<CopReq>,

  // one memory port per lane
  pub lane_req: Vec<Channel<MemReq>>,
  pub lane_resp: Vec<Channel<MemResp>>,

  lanes: Vec<DotProductLane>,
  regs: CopRegs,
  state: CopState,
  dispatch: Option<Dispatch>,
  cfg_idx: Vec<usize>,
  wb: Vec<WbState>,
  results: Vec<u32>,
  stats: CopStats,

  addr_mask: u32,
  cop_addr_mask: u32,
  cop_data_mask: u32,
}

impl MatrixVec {
  pub fn new(name: impl Into<String>, config: &AccelConfig) -> Result<Self, ConfigError> {
    config.validate()?;
    let name = name.into();
    let nlanes = config.nlanes;
    let lanes = (0..nlanes)
      .map(|i| DotProductLane::new(format!("{}.lane{}", name, i), config))
      .collect::<Result<Vec<_>, _>>()?;

    Ok(Self {
      name,
      from_cpu: Channel::default(),
      lane_req: vec![Channel::default(); nlanes],
      lane_resp: vec![Channel::default(); nlanes],
      lanes,
      regs: CopRegs::new(),
      state: CopState::Idle,
      dispatch: None,
      cfg_idx: vec![LANE_CMDS; nlanes],
      wb: vec![WbState::Acked; nlanes],
      results: vec![0; nlanes],
      stats: CopStats::default(),
      addr_mask: config.addr_mask(),
      cop_addr_mask: config.cop_addr_mask(),
      cop_data_mask: config.cop_data_mask(),
    })
  }

  pub fn nlanes(&self) -> usize {
    self.lanes.len()
  }

  pub fn lanes(&self) -> &[DotProductLane] {
    &self.lanes
  }

  pub fn state(&self) -> CopState {
    self.state
  }

  /// Ready for a new command.
  pub fn is_ready(&self) -> bool {
    self.state == CopState::Idle
  }

  /// Results of the last completed computation, one per lane.
  pub fn results(&self) -> &[u32] {
    &self.results
  }

  pub fn stats(&self) -> CopStats {
    self.stats
  }

  fn lane_cmd(&self, dispatch: &Dispatch, lane: usize, step: usize) -> CopReq {
    match step {
      0 => CopReq::new(LANE_SIZE, dispatch.size),
      1 => CopReq::new(LANE_ROW_ADDR, dispatch.lane_row_base(lane) & self.addr_mask),
      2 => CopReq::new(LANE_VEC_ADDR, dispatch.vec_base),
      _ => CopReq::new(LANE_GO, 1),
    }
  }

  fn accept_cmd(&mut self, cmd: CopReq) {
    let addr = cmd.addr & self.cop_addr_mask;
    match self.regs.write(addr, cmd.data & self.cop_data_mask) {
      RegWrite::Stored => debug!("[{}] reg[{}] <- 0x{:x}", self.name, addr, cmd.data),
      RegWrite::Go(dispatch) => {
        info!(
          "[{}] dispatch: size={}, row_base=0x{:x}, stride={}, vec_base=0x{:x}, dest_base=0x{:x}, lanes={}",
          self.name,
          dispatch.size,
          dispatch.row_base,
          dispatch.row_stride,
          dispatch.vec_base,
          dispatch.dest_base,
          self.lanes.len()
        );
        self.dispatch = Some(dispatch);
        self.cfg_idx.iter_mut().for_each(|i| *i = 0);
        self.stats.dispatches += 1;
        self.state = CopState::Config;
      },
      RegWrite::IgnoredGo => {
        // Partial configuration is tolerated rather than rejected.
        self.stats.ignored_dispatches += 1;
        warn!("[{}] go before size/row/vec/dest were all written, ignored", self.name);
      },
      RegWrite::Unknown(other) => warn!("[{}] ignoring write to unknown register {}", self.name, other),
    }
  }

  fn routes_lane_memory(&self) -> bool {
    self.state != CopState::WriteBack
  }
}

impl Module for MatrixVec {
  fn comb(&mut self) {
    self.from_cpu.rdy = self.state == CopState::Idle;

    for lane in self.lanes.iter_mut() {
      lane.comb();
    }

    // lane command broadcast
    for j in 0..self.lanes.len() {
      let cmd = match (&self.dispatch, self.state) {
        (Some(d), CopState::Config) if self.cfg_idx[j] < LANE_CMDS => Some(self.lane_cmd(d, j, self.cfg_idx[j])),
        _ => None,
      };
      match cmd {
        Some(cmd) => self.lanes[j].cpu_req.send(cmd),
        None => self.lanes[j].cpu_req.idle(),
      }
    }

    if self.routes_lane_memory() {
      for ((lane, req), resp) in self.lanes.iter().zip(self.lane_req.iter_mut()).zip(self.lane_resp.iter_mut()) {
        connect_fwd(&lane.mem_req, req);
        connect_bwd(resp, &lane.mem_resp);
      }
    } else {
      let dispatch = self.dispatch;
      for (j, ((req, resp), wb)) in self
        .lane_req
        .iter_mut()
        .zip(self.lane_resp.iter_mut())
        .zip(self.wb.iter())
        .enumerate()
      {
        match (*wb, &dispatch) {
          (WbState::Send, Some(d)) => req.send(MemReq::write(d.dest_addr(j) & self.addr_mask, self.results[j])),
          _ => req.idle(),
        }
        resp.rdy = *wb == WbState::Wait;
      }
    }
  }

  fn run(&mut self) {
    if self.state != CopState::Idle {
      self.stats.busy_cycles += 1;
    }

    if self.routes_lane_memory() {
      for ((lane, req), resp) in self.lanes.iter_mut().zip(self.lane_req.iter()).zip(self.lane_resp.iter()) {
        connect_bwd(&mut lane.mem_req, req);
        connect_fwd(resp, &mut lane.mem_resp);
      }
    } else {
      for lane in self.lanes.iter_mut() {
        lane.mem_req.rdy = false;
        lane.mem_resp.val = false;
      }
    }

    match self.state {
      CopState::Idle => {
        if let Some(cmd) = self.from_cpu.fired().copied() {
          self.accept_cmd(cmd);
        }
      },
      CopState::Config => {
        for (lane, idx) in self.lanes.iter().zip(self.cfg_idx.iter_mut()) {
          if lane.cpu_req.fire() {
            *idx += 1;
          }
        }
        if self.cfg_idx.iter().all(|&i| i >= LANE_CMDS) {
          debug!("[{}] all lanes launched", self.name);
          self.state = CopState::Compute;
        }
      },
      CopState::Compute => {
        if self.lanes.iter().all(|l| l.cpu_resp.valid) {
          for (result, lane) in self.results.iter_mut().zip(self.lanes.iter()) {
            *result = lane.cpu_resp.value;
          }
          debug!("[{}] lanes done: {:?}", self.name, self.results);
          self.wb.iter_mut().for_each(|w| *w = WbState::Send);
          self.state = CopState::WriteBack;
        }
      },
      CopState::WriteBack => {
        for (j, wb) in self.wb.iter_mut().enumerate() {
          if *wb == WbState::Send && self.lane_req[j].fire() {
            *wb = WbState::Wait;
          } else if let Some(resp) = self.lane_resp[j].fired() {
            debug_assert!(*wb == WbState::Wait, "[{}] write ack on port {} with no outstanding request", self.name, j);
            debug_assert_eq!(resp.kind, MemMsgType::Write, "[{}] write ack of the wrong type on port {}", self.name, j);
            *wb = WbState::Acked;
          }
        }
        if self.wb.iter().all(|&w| w == WbState::Acked) {
          info!("[{}] computation complete: {:?}", self.name, self.results);
          self.state = CopState::Idle;
        }
      },
    }

    for lane in self.lanes.iter_mut() {
      lane.run();
    }
  }

  fn reset(&mut self) {
    let nlanes = self.lanes.len();
    self.from_cpu = Channel::default();
    self.lane_req = vec![Channel::default(); nlanes];
    self.lane_resp = vec![Channel::default(); nlanes];
    for lane in self.lanes.iter_mut() {
      lane.reset();
    }
    self.regs.reset();
    self.state = CopState::Idle;
    self.dispatch = None;
    self.cfg_idx = vec![LANE_CMDS; nlanes];
    self.wb = vec![WbState::Acked; nlanes];
    self.results = vec![0; nlanes];
    self.stats = CopStats::default();
  }

  fn name(&self) -> &str {
    &self.name
  }

  fn line_trace(&self) -> String {
    let state = match self.state {
      CopState::Idle => "I ",
      CopState::Config => "C ",
      CopState::Compute => "X ",
      CopState::WriteBack => "W ",
    };
    let lanes: Vec<String> = self.lanes.iter().map(|l| l.line_trace()).collect();
    format!("{} {}", state, lanes.join(" | "))
  }
}
