//! Experiment driver producing `runtime_<POLICY>.csv`: one summary row per
//! policy over a single mixed workload run.

use std::fs::File;
use std::io::{self, Write};
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tdmm::{Allocator, Policy};

const OPS: usize = 5_000;
const MAX_REQUEST: usize = 4096;

fn policy_name(policy: Policy) -> &'static str {
  match policy {
    Policy::FirstFit => "FIRST_FIT",
    Policy::BestFit => "BEST_FIT",
    Policy::WorstFit => "WORST_FIT",
  }
}

fn run_policy(policy: Policy) -> (u128, tdmm::Metrics, usize, usize) {
  let mut alloc = Allocator::new();
  alloc.init_with_policy(policy);
  let mut rng = StdRng::seed_from_u64(0xFEED_FACE);
  let mut live: Vec<*mut u8> = Vec::new();
  let mut max_overhead = alloc.overhead_bytes();

  let start = Instant::now();
  for i in 0..OPS {
    if i % 2 == 0 || live.is_empty() {
      let req = rng.gen_range(1..=MAX_REQUEST);
      let p = alloc.allocate(req);
      if !p.is_null() {
        live.push(p);
      }
    } else {
      let idx = rng.gen_range(0..live.len());
      let p = live.swap_remove(idx);
      alloc.release(p);
    }
    max_overhead = max_overhead.max(alloc.overhead_bytes());
  }
  for p in live {
    alloc.release(p);
  }
  max_overhead = max_overhead.max(alloc.overhead_bytes());
  let elapsed = start.elapsed().as_nanos();

  let overhead_end = alloc.overhead_bytes();
  (elapsed, alloc.metrics(), overhead_end, max_overhead)
}

fn main() -> io::Result<()> {
  for policy in [Policy::FirstFit, Policy::BestFit, Policy::WorstFit] {
    let path = format!("runtime_{}.csv", policy_name(policy));
    let mut file = File::create(&path)?;
    let (total_runtime_ns, m, overhead_end, overhead_peak) = run_policy(policy);

    writeln!(file, "policy,total_runtime_ns,avg_util,peak_util,os_bytes,samples,overhead_end,overhead_peak")?;
    writeln!(
      file,
      "{},{},{:.6},{:.6},{},{},{},{}",
      policy_name(policy),
      total_runtime_ns,
      m.avg_utilization(),
      m.peak_utilization(),
      m.bytes_from_os,
      m.num_util,
      overhead_end,
      overhead_peak,
    )?;
    println!("wrote {path}");
  }
  Ok(())
}
