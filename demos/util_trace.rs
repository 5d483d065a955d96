//! Experiment driver producing `util_trace_<POLICY>.csv`.
//!
//! This binary is an external collaborator of the allocator: it only calls
//! the public `Allocator` API and records what it observes. It is not part
//! of the library's contract (see the crate's Non-goals around experiment
//! drivers).

use std::fs::File;
use std::io::{self, Write};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tdmm::{Allocator, Policy};

const PHASES: usize = 400;
const MAX_REQUEST: usize = 8 * 1024;

fn policy_name(policy: Policy) -> &'static str {
  match policy {
    Policy::FirstFit => "FIRST_FIT",
    Policy::BestFit => "BEST_FIT",
    Policy::WorstFit => "WORST_FIT",
  }
}

fn run_trace(policy: Policy, out: &mut impl Write) -> io::Result<()> {
  let mut alloc = Allocator::new();
  alloc.init_with_policy(policy);
  let mut rng = StdRng::seed_from_u64(0xC0FFEE);
  let mut live: Vec<*mut u8> = Vec::new();
  let mut max_overhead = alloc.overhead_bytes();

  writeln!(out, "policy,event,op,req_bytes,utilization,cur_inuse_bytes,overhead_bytes")?;

  for i in 0..PHASES {
    // Alternate allocation-heavy and release-heavy phases, like the original
    // workload generator's phase scheduler.
    let do_alloc = (i % 3 != 0) || live.is_empty();

    if do_alloc {
      let req = rng.gen_range(1..=MAX_REQUEST);
      let p = alloc.allocate(req);
      let m = alloc.metrics();
      let overhead = alloc.overhead_bytes();
      max_overhead = max_overhead.max(overhead);
      writeln!(
        out,
        "{},{},malloc,{},{:.6},{},{}",
        policy_name(policy),
        i,
        req,
        m.avg_utilization(),
        m.cur_inuse_bytes,
        overhead,
      )?;
      if !p.is_null() {
        live.push(p);
      }
    } else {
      let idx = rng.gen_range(0..live.len());
      let p = live.swap_remove(idx);
      alloc.release(p);
      let m = alloc.metrics();
      let overhead = alloc.overhead_bytes();
      max_overhead = max_overhead.max(overhead);
      writeln!(
        out,
        "{},{},free,0,{:.6},{},{}",
        policy_name(policy),
        i,
        m.avg_utilization(),
        m.cur_inuse_bytes,
        overhead,
      )?;
    }
  }

  for p in live {
    alloc.release(p);
  }
  max_overhead = max_overhead.max(alloc.overhead_bytes());

  let m = alloc.metrics();
  writeln!(out, "{},SUMMARY,avg_util,{:.6},,,", policy_name(policy), m.avg_utilization())?;
  writeln!(out, "{},SUMMARY,peak_util,{:.6},,,", policy_name(policy), m.peak_utilization())?;
  writeln!(out, "{},SUMMARY,os_bytes,{},,,", policy_name(policy), m.bytes_from_os)?;
  writeln!(out, "{},SUMMARY,samples,{},,,", policy_name(policy), m.num_util)?;
  writeln!(out, "{},SUMMARY,overhead_end,{},,,", policy_name(policy), alloc.overhead_bytes())?;
  writeln!(out, "{},SUMMARY,overhead_peak,{},,,", policy_name(policy), max_overhead)?;
  Ok(())
}

fn main() -> io::Result<()> {
  for policy in [Policy::FirstFit, Policy::BestFit, Policy::WorstFit] {
    let path = format!("util_trace_{}.csv", policy_name(policy));
    let mut file = File::create(&path)?;
    run_trace(policy, &mut file)?;
    println!("wrote {path}");
  }
  Ok(())
}
