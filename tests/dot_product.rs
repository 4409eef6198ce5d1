use mvmac::accel::LaneState;
use mvmac::config::AccelConfig;
use mvmac::harness::{dot_config, DotProductHarness, Harness};
use mvmac::log::init_test_log;

const MEM_SIZE: usize = 1 << 10;
const MAX_CYCLES: u64 = 500;

const ROW_ADDR: u32 = 0;
const VEC_ADDR: u32 = 80;

fn harness(stages: usize, delay: u64, row: &[u32], vector: &[u32]) -> DotProductHarness {
  let msgs = dot_config(vector.len() as u32, ROW_ADDR, VEC_ADDR);
  let mut h = DotProductHarness::new(&AccelConfig::new(1, stages), delay, MEM_SIZE, msgs).unwrap();
  h.mem.load_words(ROW_ADDR, row);
  h.mem.load_words(VEC_ADDR, vector);
  h
}

macro_rules! test_case {
  ($name:ident, $stages:literal, $delay:literal, $row:expr, $vector:expr, $expected:literal) => {
    #[test]
    fn $name() {
      init_test_log();
      let row: &[u32] = &$row;
      let vector: &[u32] = &$vector;
      let mut h = harness($stages, $delay, row, vector);

      h.run(MAX_CYCLES).unwrap();

      assert_eq!(h.result(), Some($expected));
      assert_eq!(h.lane.state(), LaneState::Idle);
      assert_eq!(h.mem.reads(0), 2 * vector.len() as u64);
      assert_eq!(h.mem.writes(0), 0);
    }
  };
}

test_case!(small_stages1_delay0, 1, 0, [5, 1, 3], [1, 2, 3], 16);
test_case!(small_stages1_delay5, 1, 5, [5, 1, 3], [1, 2, 3], 16);
test_case!(small_stages4_delay0, 4, 0, [5, 1, 3], [1, 2, 3], 16);
test_case!(small_stages4_delay5, 4, 5, [5, 1, 3], [1, 2, 3], 16);
test_case!(five_stages1_delay0, 1, 0, [5, 1, 3, 9, 10], [1, 2, 3, 9, 0], 97);
test_case!(five_stages1_delay5, 1, 5, [5, 1, 3, 9, 10], [1, 2, 3, 9, 0], 97);
test_case!(five_stages4_delay0, 4, 0, [5, 1, 3, 9, 10], [1, 2, 3, 9, 0], 97);
test_case!(five_stages4_delay5, 4, 5, [5, 1, 3, 9, 10], [1, 2, 3, 9, 0], 97);
test_case!(single_element, 3, 2, [7], [6], 42);
test_case!(wrapping_product, 2, 1, [0x8000_0000, 3], [2, 5], 15);

#[test]
fn zero_size_makes_no_requests() {
  init_test_log();
  let mut h = harness(4, 5, &[], &[]);
  h.run(MAX_CYCLES).unwrap();
  assert_eq!(h.result(), Some(0));
  assert_eq!(h.mem.total_requests(), 0);
}

#[test]
fn result_held_until_next_command() {
  init_test_log();
  let mut h = harness(2, 1, &[5, 1, 3], &[1, 2, 3]);
  h.run(MAX_CYCLES).unwrap();
  for _ in 0..10 {
    h.cycle();
    assert_eq!(h.result(), Some(16));
  }
}

#[test]
fn back_to_back_commands() {
  init_test_log();
  let mut msgs = dot_config(3, ROW_ADDR, VEC_ADDR);
  msgs.extend(dot_config(3, 16, VEC_ADDR));
  let mut h = DotProductHarness::new(&AccelConfig::new(1, 3), 2, MEM_SIZE, msgs).unwrap();
  h.mem.load_words(ROW_ADDR, &[5, 1, 3]);
  h.mem.load_words(16, &[1, 2, 1]);
  h.mem.load_words(VEC_ADDR, &[1, 2, 3]);

  h.run(MAX_CYCLES).unwrap();

  assert_eq!(h.result(), Some(8));
  assert_eq!(h.mem.reads(0), 12);
}

#[test]
fn depth_does_not_change_the_result() {
  init_test_log();
  let row = [11, 0, 7, 250, 3, 3];
  let vector = [2, 9, 1, 4, 100, 0];
  let results: Vec<_> = (1..=6)
    .map(|stages| {
      let mut h = harness(stages, 1, &row, &vector);
      h.run(MAX_CYCLES).unwrap();
      h.result()
    })
    .collect();
  assert!(results.iter().all(|&r| r == Some(1329)), "{:?}", results);
}
