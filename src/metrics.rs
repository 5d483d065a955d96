//! Observational counters updated at every allocate/release event.
//!
//! Nothing in this module ever feeds back into allocator decisions; it only
//! watches.

use std::fmt;

/// A point-in-time snapshot of the allocator's telemetry.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Metrics {
  /// Total bytes obtained from the OS for the arena (fixed after `init`).
  pub bytes_from_os: usize,
  /// Sum of `size` over all currently non-free blocks.
  pub cur_inuse_bytes: usize,
  /// Running maximum of `cur_inuse_bytes` observed so far.
  pub peak_inuse_bytes: usize,
  /// Running sum of `cur_inuse_bytes / bytes_from_os` sampled at every event.
  pub util_sum: f64,
  /// Number of samples folded into `util_sum`.
  pub num_util: usize,
  /// Total monotonic nanoseconds spent inside `allocate` calls, successful or not.
  pub malloc_ns_total: u64,
  /// Total monotonic nanoseconds spent inside `release` calls, successful or not.
  pub free_ns_total: u64,
}

impl Metrics {
  pub(crate) const fn zero() -> Self {
    Self {
      bytes_from_os: 0,
      cur_inuse_bytes: 0,
      peak_inuse_bytes: 0,
      util_sum: 0.0,
      num_util: 0,
      malloc_ns_total: 0,
      free_ns_total: 0,
    }
  }

  /// `util_sum / num_util`, or `0.0` if no sample has ever been taken.
  pub fn avg_utilization(&self) -> f64 {
    if self.num_util == 0 { 0.0 } else { self.util_sum / self.num_util as f64 }
  }

  /// `peak_inuse_bytes / bytes_from_os`, or `0.0` before the arena exists.
  pub fn peak_utilization(&self) -> f64 {
    if self.bytes_from_os == 0 { 0.0 } else { self.peak_inuse_bytes as f64 / self.bytes_from_os as f64 }
  }
}

impl fmt::Display for Metrics {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "===== TDMM METRICS =====")?;
    writeln!(f, "OS bytes (mmap):        {}", self.bytes_from_os)?;
    writeln!(f, "Current in-use bytes:   {}", self.cur_inuse_bytes)?;
    writeln!(f, "Peak in-use bytes:      {}", self.peak_inuse_bytes)?;
    writeln!(f, "Peak utilization:       {:.6}", self.peak_utilization())?;
    writeln!(f, "Average utilization:    {:.6}", self.avg_utilization())?;
    writeln!(f, "Total malloc time (ns): {}", self.malloc_ns_total)?;
    writeln!(f, "Total free time (ns):   {}", self.free_ns_total)?;
    if self.num_util > 0 {
      writeln!(f, "Samples taken:          {}", self.num_util)?;
    }
    write!(f, "========================")
  }
}
