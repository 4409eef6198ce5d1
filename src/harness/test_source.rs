/// Feeds a fixed list of messages into a ready/valid channel.
use std::collections::VecDeque;
use std::fmt::Display;

use crate::builtin::{Channel, Module};

#[derive(Clone, Debug)]
pub struct TestSource<T: Clone + Default> {
  name: String,
  pub out: Channel<T>,
  msgs: VecDeque<T>,
  initial: Vec<T>,
  /// Idle cycles inserted before each message
  delay: u32,
  wait: u32,
}

impl<T: Clone + Default + Display> TestSource<T> {
  pub fn new(name: impl Into<String>, msgs: Vec<T>, delay: u32) -> Self {
    Self {
      name: name.into(),
      out: Channel::default(),
      msgs: msgs.iter().cloned().collect(),
      initial: msgs,
      delay,
      wait: delay,
    }
  }

  /// Queue more messages behind the ones still pending.
  pub fn extend(&mut self, msgs: impl IntoIterator<Item = T>) {
    self.msgs.extend(msgs);
  }

  /// Every message has been accepted.
  pub fn done(&self) -> bool {
    self.msgs.is_empty()
  }

  pub fn remaining(&self) -> usize {
    self.msgs.len()
  }
}

impl<T: Clone + Default + Display> Module for TestSource<T> {
  fn comb(&mut self) {
    match self.msgs.front() {
      Some(msg) if self.wait == 0 => self.out.send(msg.clone()),
      _ => self.out.idle(),
    }
  }

  fn run(&mut self) {
    if self.out.fire() {
      self.msgs.pop_front();
      self.wait = self.delay;
    } else if self.wait > 0 {
      self.wait -= 1;
    }
  }

  fn reset(&mut self) {
    self.out = Channel::default();
    self.msgs = self.initial.iter().cloned().collect();
    self.wait = self.delay;
  }

  fn name(&self) -> &str {
    &self.name
  }

  fn line_trace(&self) -> String {
    if self.out.fire() {
      format!("{:>11}", self.out.msg)
    } else if self.out.val {
      format!("{:>11}", "#")
    } else {
      format!("{:>11}", ".")
    }
  }
}
