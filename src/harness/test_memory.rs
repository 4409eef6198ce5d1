/// Byte-addressable test memory with a fixed response delay on every port.
use std::collections::VecDeque;

use log::warn;

use crate::accel::mem_msg::{MemMsgType, MemReq, MemResp};
use crate::builtin::{Channel, Module};
use crate::config::WORD_BYTES;
use crate::error::ConfigError;

/// Responses a port may hold before it stops accepting requests.
const PORT_QUEUE_DEPTH: usize = 2;

#[derive(Clone, Debug, Default)]
struct Port {
  pending: VecDeque<(u64, MemResp)>,
  reads: u64,
  writes: u64,
}

#[derive(Clone, Debug)]
pub struct TestMemory {
  name: String,

  pub reqs: Vec<Channel<MemReq>>,
  pub resps: Vec<Channel<MemResp>>,

  mem: Vec<u8>,
  ports: Vec<Port>,
  delay: u64,
  cycle: u64,
}

impl TestMemory {
  /// A request accepted in cycle t is answered from cycle t + 1 + `delay`.
  pub fn new(name: impl Into<String>, nports: usize, delay: u64, size_bytes: usize) -> Result<Self, ConfigError> {
    if nports == 0 {
      return Err(ConfigError::ZeroPorts);
    }
    Ok(Self {
      name: name.into(),
      reqs: vec![Channel::default(); nports],
      resps: vec![Channel::default(); nports],
      mem: vec![0; size_bytes],
      ports: vec![Port::default(); nports],
      delay,
      cycle: 0,
    })
  }

  /// Store little-endian words starting at byte `base`.
  pub fn load_words(&mut self, base: u32, words: &[u32]) {
    for (i, &word) in words.iter().enumerate() {
      let addr = base.wrapping_add(i as u32 * WORD_BYTES);
      self.write_word(addr, word);
    }
  }

  pub fn read_word(&self, addr: u32) -> u32 {
    let addr = addr as usize;
    match self.mem.get(addr..addr + WORD_BYTES as usize) {
      Some(bytes) => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
      None => {
        warn!("[{}] read out of range at 0x{:x}", self.name, addr);
        0
      },
    }
  }

  pub fn read_words(&self, base: u32, count: usize) -> Vec<u32> {
    (0..count)
      .map(|i| self.read_word(base.wrapping_add(i as u32 * WORD_BYTES)))
      .collect()
  }

  pub fn write_word(&mut self, addr: u32, data: u32) {
    let addr = addr as usize;
    match self.mem.get_mut(addr..addr + WORD_BYTES as usize) {
      Some(bytes) => bytes.copy_from_slice(&data.to_le_bytes()),
      None => warn!("[{}] write out of range at 0x{:x} dropped", self.name, addr),
    }
  }

  /// Read requests accepted on `port`.
  pub fn reads(&self, port: usize) -> u64 {
    self.ports[port].reads
  }

  /// Write requests accepted on `port`.
  pub fn writes(&self, port: usize) -> u64 {
    self.ports[port].writes
  }

  pub fn total_requests(&self) -> u64 {
    self.ports.iter().map(|p| p.reads + p.writes).sum()
  }

  fn access(&mut self, req: &MemReq) -> MemResp {
    debug_assert_eq!(req.len, 1, "[{}] only single-word accesses are modelled", self.name);
    match req.kind {
      MemMsgType::Read => MemResp::read(self.read_word(req.addr)),
      MemMsgType::Write => {
        self.write_word(req.addr, req.data);
        MemResp::write()
      },
    }
  }
}

impl Module for TestMemory {
  fn comb(&mut self) {
    for ((port, req), resp) in self.ports.iter().zip(self.reqs.iter_mut()).zip(self.resps.iter_mut()) {
      req.rdy = port.pending.len() < PORT_QUEUE_DEPTH;
      match port.pending.front() {
        Some(&(ready_at, msg)) if ready_at <= self.cycle => resp.send(msg),
        _ => resp.idle(),
      }
    }
  }

  fn run(&mut self) {
    for j in 0..self.ports.len() {
      if self.resps[j].fire() {
        self.ports[j].pending.pop_front();
      }
      if let Some(req) = self.reqs[j].fired().copied() {
        let resp = self.access(&req);
        let port = &mut self.ports[j];
        match req.kind {
          MemMsgType::Read => port.reads += 1,
          MemMsgType::Write => port.writes += 1,
        }
        port.pending.push_back((self.cycle + 1 + self.delay, resp));
      }
    }
    self.cycle += 1;
  }

  fn reset(&mut self) {
    let nports = self.ports.len();
    self.reqs = vec![Channel::default(); nports];
    self.resps = vec![Channel::default(); nports];
    self.ports = vec![Port::default(); nports];
    self.cycle = 0;
  }

  fn name(&self) -> &str {
    &self.name
  }

  fn line_trace(&self) -> String {
    let ports: Vec<String> = self
      .reqs
      .iter()
      .zip(self.resps.iter())
      .map(|(req, resp)| {
        let req = if req.fire() { req.msg.to_string() } else { String::new() };
        let resp = if resp.fire() { resp.msg.to_string() } else { String::new() };
        format!("{:>21}>{:<11}", req, resp)
      })
      .collect();
    ports.join("|")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn tick(mem: &mut TestMemory, req: Option<MemReq>) -> Option<MemResp> {
    mem.comb();
    match req {
      Some(r) => mem.reqs[0].send(r),
      None => mem.reqs[0].idle(),
    }
    mem.resps[0].rdy = true;
    let out = mem.resps[0].fired().copied();
    mem.run();
    out
  }

  #[test]
  fn words_are_little_endian() {
    let mut mem = TestMemory::new("mem", 1, 0, 64).unwrap();
    mem.load_words(8, &[0x0403_0201, 5]);
    assert_eq!(mem.read_word(8), 0x0403_0201);
    assert_eq!(mem.read_words(8, 2), vec![0x0403_0201, 5]);
    assert_eq!(mem.mem[8], 1);
  }

  #[test]
  fn zero_delay_answers_next_cycle() {
    let mut mem = TestMemory::new("mem", 1, 0, 64).unwrap();
    mem.load_words(4, &[42]);
    assert_eq!(tick(&mut mem, Some(MemReq::read(4))), None);
    assert_eq!(tick(&mut mem, None), Some(MemResp::read(42)));
    assert_eq!(tick(&mut mem, None), None);
    assert_eq!(mem.reads(0), 1);
  }

  #[test]
  fn delay_postpones_response() {
    let mut mem = TestMemory::new("mem", 1, 5, 64).unwrap();
    tick(&mut mem, Some(MemReq::write(0, 7)));
    for _ in 0..5 {
      assert_eq!(tick(&mut mem, None), None);
    }
    assert_eq!(tick(&mut mem, None), Some(MemResp::write()));
    assert_eq!(mem.read_word(0), 7);
    assert_eq!(mem.writes(0), 1);
  }

  #[test]
  fn out_of_range_reads_zero() {
    let mut mem = TestMemory::new("mem", 1, 0, 8).unwrap();
    assert_eq!(mem.read_word(6), 0);
    mem.write_word(100, 1);
    assert_eq!(mem.total_requests(), 0);
  }

  #[test]
  fn zero_ports_rejected() {
    assert_eq!(TestMemory::new("mem", 0, 0, 8).unwrap_err(), ConfigError::ZeroPorts);
  }
}
