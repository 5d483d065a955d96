//! Compile-time-ish knobs, generalized into a small value type so tests can
//! run against a far smaller arena than the 64 MiB production baseline.

use crate::policy::Policy;

/// The spec's baseline arena size: 64 MiB, rounded up to the OS page size by
/// [`crate::arena::Arena::map`].
pub const DEFAULT_ARENA_BYTES: usize = 64 * 1024 * 1024;

/// Arena size and placement policy for a call to [`crate::Allocator::init`].
#[derive(Debug, Clone, Copy)]
pub struct Config {
  /// Requested arena size in bytes, before page rounding.
  pub arena_bytes: usize,
  /// Placement policy used for every subsequent `allocate` until the next `init`.
  pub policy: Policy,
}

impl Default for Config {
  fn default() -> Self {
    Self { arena_bytes: DEFAULT_ARENA_BYTES, policy: Policy::default() }
  }
}
