//! A thin module-level facade over one global [`Allocator`] instance.
//!
//! This preserves the original C call sites (`t_init` / `t_malloc` /
//! `t_free`, here `init` / `allocate` / `release`) for callers who just want
//! a process-wide allocator and don't need to juggle an [`Allocator`] value
//! themselves. Like the rest of this crate, it is single-threaded only: the
//! global cell has no lock, matching the spec's "no locking is performed"
//! resource model.

use std::cell::UnsafeCell;
use std::ptr::NonNull;

use crate::allocator::Allocator;
use crate::config::Config;
use crate::error::AllocError;
use crate::metrics::Metrics;
use crate::policy::Policy;

struct GlobalAllocator(UnsafeCell<Allocator>);

// Safety: the crate's Non-goals explicitly leave concurrent use undefined;
// this unblocks placing an otherwise-!Sync Allocator in a `static` for the
// single-threaded call sites this facade targets.
unsafe impl Sync for GlobalAllocator {}

static GLOBAL: GlobalAllocator = GlobalAllocator(UnsafeCell::new(Allocator::new()));

#[allow(clippy::mut_from_ref)]
fn global() -> &'static mut Allocator {
  unsafe { &mut *GLOBAL.0.get() }
}

/// Initializes the process-wide allocator with `policy` and the default
/// 64 MiB arena.
pub fn init(policy: Policy) {
  global().init_with_policy(policy);
}

/// Initializes the process-wide allocator with a fully custom [`Config`].
pub fn init_with_config(config: Config) {
  global().init(config);
}

/// Allocates `size` bytes from the process-wide allocator, or null on failure.
pub fn allocate(size: usize) -> *mut u8 {
  global().allocate(size)
}

/// Same as [`allocate`] but reports the failure reason instead of collapsing
/// it to null.
pub fn allocate_checked(size: usize) -> Result<NonNull<u8>, AllocError> {
  global().allocate_checked(size)
}

/// Releases `ptr` back to the process-wide allocator. No-op on any invalid input.
pub fn release(ptr: *mut u8) {
  global().release(ptr);
}

/// Same as [`release`] but reports why the call was a no-op, if it was.
pub fn release_checked(ptr: *mut u8) -> Result<(), AllocError> {
  global().release_checked(ptr)
}

/// Test-only teardown: releases the mapping and zeroes all state.
pub fn reset() {
  global().reset();
}

/// A snapshot of the process-wide allocator's telemetry.
pub fn metrics() -> Metrics {
  global().metrics()
}

/// `H * (live block count)` for the process-wide allocator.
pub fn overhead_bytes() -> usize {
  global().overhead_bytes()
}

#[cfg(test)]
mod tests {
  use super::*;

  // This module owns the only test touching the shared global allocator;
  // the facade itself has no lock (see the Sync impl above), so a second
  // test here would race under cargo's default parallel test execution.
  #[test]
  fn facade_round_trips_through_reset() {
    reset();
    init(Policy::FirstFit);

    let p = allocate(64);
    assert!(!p.is_null());
    release(p);

    assert_eq!(metrics().cur_inuse_bytes, 0);
    reset();
  }
}
