//! Monotonic timing for the `malloc_ns_total` / `free_ns_total` metrics.
//!
//! `Instant::saturating_duration_since` never panics and clamps to zero when
//! the platform's clock samples out of order, which is exactly the "if
//! `t1 < t0`, the delta is treated as zero" rule the spec calls for.

use std::time::Instant;

#[inline]
pub(crate) fn elapsed_ns(t0: Instant) -> u64 {
  Instant::now().saturating_duration_since(t0).as_nanos() as u64
}
