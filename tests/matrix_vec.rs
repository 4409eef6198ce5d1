use mvmac::accel::CopState;
use mvmac::config::{mask, AccelConfig};
use mvmac::harness::{config_msg, matvec_config, Harness, MatrixVecHarness, Workload};
use mvmac::log::init_test_log;

const MEM_SIZE: usize = 1 << 12;
const MAX_CYCLES: u64 = 1000;

fn harness(config: &AccelConfig, delay: u64, workload: &Workload) -> MatrixVecHarness {
  let mut h = MatrixVecHarness::new(config, delay, MEM_SIZE, 0, workload.config_msgs()).unwrap();
  workload.load(&mut h.mem);
  h
}

fn padded_reference() -> Workload {
  Workload {
    row_stride: Some(4),
    ..Workload::default()
  }
}

/// Cycles a correct run must fit in: per element two memory round trips plus
/// the request and accumulate states, then drain, writeback and configuration.
fn cycle_bound(size: u64, stages: u64, delay: u64) -> u64 {
  30 + size * (6 + 2 * delay) + stages + delay
}

macro_rules! test_case {
  ($name:ident, $workload:expr, $lanes:literal, $stages:literal, $delay:literal) => {
    #[test]
    fn $name() {
      init_test_log();
      let config = AccelConfig::new($lanes, $stages);
      let workload: Workload = $workload;
      let mut h = harness(&config, $delay, &workload);

      let cycles = h.run(MAX_CYCLES).unwrap();

      let expected: &[u32] = &[16, 6, 8][..$lanes];
      assert_eq!(h.mem.read_words(workload.dest_base, $lanes), expected);
      assert_eq!(h.cop.results(), expected);
      assert_eq!(h.cop.state(), CopState::Idle);
      assert!(cycles <= cycle_bound(3, $stages, $delay), "took {} cycles", cycles);
      for port in 0..$lanes {
        assert_eq!(h.mem.reads(port), 6);
        assert_eq!(h.mem.writes(port), 1);
      }
    }
  };
}

test_case!(packed_lanes1_stages1_delay0, Workload::default(), 1, 1, 0);
test_case!(packed_lanes1_stages1_delay5, Workload::default(), 1, 1, 5);
test_case!(packed_lanes1_stages4_delay0, Workload::default(), 1, 4, 0);
test_case!(packed_lanes1_stages4_delay5, Workload::default(), 1, 4, 5);
test_case!(packed_lanes3_stages1_delay0, Workload::default(), 3, 1, 0);
test_case!(packed_lanes3_stages1_delay5, Workload::default(), 3, 1, 5);
test_case!(packed_lanes3_stages4_delay0, Workload::default(), 3, 4, 0);
test_case!(packed_lanes3_stages4_delay5, Workload::default(), 3, 4, 5);
test_case!(padded_lanes1_stages1_delay0, padded_reference(), 1, 1, 0);
test_case!(padded_lanes1_stages1_delay5, padded_reference(), 1, 1, 5);
test_case!(padded_lanes1_stages4_delay0, padded_reference(), 1, 4, 0);
test_case!(padded_lanes1_stages4_delay5, padded_reference(), 1, 4, 5);
test_case!(padded_lanes3_stages1_delay0, padded_reference(), 3, 1, 0);
test_case!(padded_lanes3_stages1_delay5, padded_reference(), 3, 1, 5);
test_case!(padded_lanes3_stages4_delay0, padded_reference(), 3, 4, 0);
test_case!(padded_lanes3_stages4_delay5, padded_reference(), 3, 4, 5);

#[test]
fn reference_run_finishes_within_eighty_cycles() {
  init_test_log();
  let mut h = harness(&AccelConfig::new(3, 4), 5, &padded_reference());
  let cycles = h.run(80).unwrap();
  assert!(cycles < 80);
}

#[test]
fn five_element_row() {
  init_test_log();
  let workload = Workload {
    matrix: vec![vec![5, 1, 3, 9, 10], vec![0, 0, 0, 0, 1]],
    vector: vec![1, 2, 3, 9, 0],
    ..Workload::default()
  };
  let mut h = harness(&AccelConfig::new(2, 3), 2, &workload);
  h.run(MAX_CYCLES).unwrap();
  assert_eq!(h.mem.read_words(workload.dest_base, 2), vec![97, 0]);
}

#[test]
fn zero_size_writes_zeros_without_reads() {
  init_test_log();
  let workload = Workload::new(vec![vec![], vec![]], vec![]);
  let mut h = harness(&AccelConfig::new(2, 4), 3, &workload);
  h.mem.load_words(workload.dest_base, &[7, 7]);

  h.run(MAX_CYCLES).unwrap();

  assert_eq!(h.mem.read_words(workload.dest_base, 2), vec![0, 0]);
  for port in 0..2 {
    assert_eq!(h.mem.reads(port), 0);
    assert_eq!(h.mem.writes(port), 1);
  }
}

#[test]
fn narrow_data_wraps() {
  init_test_log();
  let mut config = AccelConfig::new(1, 2);
  config.mem_data_nbits = 8;
  let workload = Workload::new(vec![vec![200, 3]], vec![2, 100]);
  let mut h = harness(&config, 0, &workload);
  h.run(MAX_CYCLES).unwrap();

  // 400 & 0xff = 144, 300 & 0xff = 44
  assert_eq!(workload.expected(1, mask(8)), vec![188]);
  assert_eq!(h.mem.read_word(workload.dest_base), 188);
}

#[test]
fn incomplete_configuration_is_ignored() {
  init_test_log();
  let workload = padded_reference();
  let msgs = vec![config_msg(1, 3), config_msg(2, 0), config_msg(0, 1)];
  let mut h = MatrixVecHarness::new(&AccelConfig::new(3, 1), 0, MEM_SIZE, 0, msgs).unwrap();
  workload.load(&mut h.mem);

  h.run(MAX_CYCLES).unwrap();

  assert_eq!(h.cop.stats().ignored_dispatches, 1);
  assert_eq!(h.cop.stats().dispatches, 0);
  assert_eq!(h.mem.total_requests(), 0);
  assert_eq!(h.mem.read_words(workload.dest_base, 3), vec![0, 0, 0]);
}

#[test]
fn second_dispatch_reuses_the_coprocessor() {
  init_test_log();
  let workload = padded_reference();
  let mut msgs = workload.config_msgs();
  msgs.extend(matvec_config(3, 0, 80, 200, Some(4)));
  let mut h = MatrixVecHarness::new(&AccelConfig::new(3, 2), 2, MEM_SIZE, 1, msgs).unwrap();
  workload.load(&mut h.mem);

  h.run(MAX_CYCLES).unwrap();

  assert_eq!(h.cop.stats().dispatches, 2);
  assert_eq!(h.mem.read_words(160, 3), vec![16, 6, 8]);
  assert_eq!(h.mem.read_words(200, 3), vec![16, 6, 8]);
}

#[test]
fn repeated_configuration_reproduces_the_result() {
  init_test_log();
  let workload = Workload::default();
  let mut h = harness(&AccelConfig::new(3, 4), 5, &workload);
  h.src.extend(workload.config_msgs());

  h.run(MAX_CYCLES).unwrap();

  assert_eq!(h.cop.stats().dispatches, 2);
  assert_eq!(h.cop.stats().ignored_dispatches, 0);
  assert_eq!(h.mem.read_words(workload.dest_base, 3), vec![16, 6, 8]);
  for port in 0..3 {
    assert_eq!(h.mem.reads(port), 12);
    assert_eq!(h.mem.writes(port), 2);
  }
}

#[test]
fn command_channel_blocks_while_busy() {
  init_test_log();
  let workload = padded_reference();
  let mut h = harness(&AccelConfig::new(3, 1), 3, &workload);

  let mut saw_busy = false;
  while !h.done() {
    let busy = !h.cop.is_ready();
    h.cycle();
    if busy {
      saw_busy = true;
      assert!(!h.cop.from_cpu.fire());
    }
  }
  assert!(saw_busy);
  assert!(h.cop.stats().busy_cycles > 0);
}

#[test]
fn reset_allows_a_clean_rerun() {
  init_test_log();
  let workload = padded_reference();
  let mut h = harness(&AccelConfig::new(3, 1), 0, &workload);
  let first = h.run(MAX_CYCLES).unwrap();

  h.reset();
  h.mem.load_words(workload.dest_base, &[0, 0, 0]);
  let second = h.run(MAX_CYCLES).unwrap();

  assert_eq!(first, second);
  assert_eq!(h.mem.read_words(workload.dest_base, 3), vec![16, 6, 8]);
}
