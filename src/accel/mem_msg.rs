/// Memory request/response messages carried on a memory port.
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemMsgType {
  #[default]
  Read,
  Write,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemReq {
  pub kind: MemMsgType,
  /// Byte address, word aligned
  pub addr: u32,
  /// Length in words
  pub len: u32,
  pub data: u32,
}

impl MemReq {
  pub fn read(addr: u32) -> Self {
    Self {
      kind: MemMsgType::Read,
      addr,
      len: 1,
      data: 0,
    }
  }

  pub fn write(addr: u32, data: u32) -> Self {
    Self {
      kind: MemMsgType::Write,
      addr,
      len: 1,
      data,
    }
  }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemResp {
  pub kind: MemMsgType,
  pub len: u32,
  pub data: u32,
}

impl MemResp {
  pub fn read(data: u32) -> Self {
    Self {
      kind: MemMsgType::Read,
      len: 1,
      data,
    }
  }

  pub fn write() -> Self {
    Self {
      kind: MemMsgType::Write,
      len: 1,
      data: 0,
    }
  }
}

impl fmt::Display for MemReq {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.kind {
      MemMsgType::Read => write!(f, "rd:{:08x}", self.addr),
      MemMsgType::Write => write!(f, "wr:{:08x}:{:08x}", self.addr, self.data),
    }
  }
}

impl fmt::Display for MemResp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.kind {
      MemMsgType::Read => write!(f, "rd:{:08x}", self.data),
      MemMsgType::Write => write!(f, "wr"),
    }
  }
}

/// Command written to a lane or the coprocessor: `(register index, value)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopReq {
  pub addr: u32,
  pub data: u32,
}

impl CopReq {
  pub fn new(addr: u32, data: u32) -> Self {
    Self { addr, data }
  }
}

impl fmt::Display for CopReq {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{:08x}", self.addr, self.data)
  }
}
