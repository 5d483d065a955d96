//! Experiment driver producing `speed_<POLICY>.csv`: average malloc/free
//! latency for a handful of fixed request sizes, per policy.

use std::fs::File;
use std::io::{self, Write};

use tdmm::{Allocator, Policy};

const SIZES: &[usize] = &[16, 64, 256, 1024, 4096];
const ITERS: usize = 2_000;

fn policy_name(policy: Policy) -> &'static str {
  match policy {
    Policy::FirstFit => "FIRST_FIT",
    Policy::BestFit => "BEST_FIT",
    Policy::WorstFit => "WORST_FIT",
  }
}

fn run_speed(policy: Policy, out: &mut impl Write) -> io::Result<()> {
  writeln!(out, "policy,size_bytes,iters,avg_malloc_ns,avg_free_ns,overhead_bytes")?;

  for &size in SIZES {
    let mut alloc = Allocator::new();
    alloc.init_with_policy(policy);

    for _ in 0..ITERS {
      let p = alloc.allocate(size);
      if !p.is_null() {
        alloc.release(p);
      }
    }

    let m = alloc.metrics();
    let avg_malloc_ns = m.malloc_ns_total as f64 / ITERS as f64;
    let avg_free_ns = m.free_ns_total as f64 / ITERS as f64;

    writeln!(
      out,
      "{},{},{},{:.2},{:.2},{}",
      policy_name(policy),
      size,
      ITERS,
      avg_malloc_ns,
      avg_free_ns,
      alloc.overhead_bytes(),
    )?;
  }

  Ok(())
}

fn main() -> io::Result<()> {
  for policy in [Policy::FirstFit, Policy::BestFit, Policy::WorstFit] {
    let path = format!("speed_{}.csv", policy_name(policy));
    let mut file = File::create(&path)?;
    run_speed(policy, &mut file)?;
    println!("wrote {path}");
  }
  Ok(())
}
