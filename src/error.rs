//! Typed failure reasons backing the opt-in `*_checked` API.
//!
//! The plain [`crate::Allocator::allocate`] / [`crate::Allocator::release`]
//! surface stays silent (null / no-op) as the spec requires; these variants
//! exist for callers who want to tell the failure kinds apart, and for the
//! `log` diagnostics emitted alongside them.

use thiserror::Error;

/// Why an `allocate_checked` or `release_checked` call failed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AllocError {
  /// `allocate(0)` was called; the spec treats this as an always-null request.
  #[error("zero-sized allocation requested")]
  ZeroSizeRequest,

  /// The arena has not been mapped yet (implicit `init` failed, or `init` was
  /// never called and the OS refused the mapping).
  #[error("arena is unavailable (mmap failed or allocator not initialized)")]
  ArenaUnavailable,

  /// No free block was large enough to satisfy the request.
  #[error("out of memory: requested {requested} bytes, arena holds {available_hint} bytes total")]
  OutOfMemory { requested: usize, available_hint: usize },

  /// `release` was handed a pointer that cannot be a live allocation.
  #[error("invalid release: {reason}")]
  InvalidRelease { reason: &'static str },
}
