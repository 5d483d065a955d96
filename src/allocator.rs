//! The `init/allocate/release/reset` operations and the invariants that tie
//! the arena, block list, and metrics together.

use std::ptr::{self, NonNull};
use std::time::Instant;

use crate::align4;
use crate::arena::Arena;
use crate::block::{BlockHeader, header_of, header_size, payload_of};
use crate::clock::elapsed_ns;
use crate::config::Config;
use crate::error::AllocError;
use crate::metrics::Metrics;
use crate::policy::{self, Policy};

/// A single free-list allocator instance: one arena, one block list, one
/// metrics record.
///
/// Not `Send`/`Sync` — the raw `*mut BlockHeader` head pointer makes that
/// automatic, which is the correct reflection of the spec's "concurrent use
/// is undefined" Non-goal. Single-threaded callers construct one with
/// [`Allocator::new`]; the [`crate::facade`] module wraps a single global
/// instance for callers that want the original C call-site shape
/// (`init`/`allocate`/`release`/`reset` as free functions).
pub struct Allocator {
  arena: Option<Arena>,
  head: *mut BlockHeader,
  policy: Policy,
  metrics: Metrics,
}

impl Allocator {
  /// An allocator with no arena mapped yet. `init` (explicit or implicit on
  /// first `allocate`) performs the actual `mmap`.
  pub const fn new() -> Self {
    Self { arena: None, head: ptr::null_mut(), policy: Policy::FirstFit, metrics: Metrics::zero() }
  }

  /// Maps the arena described by `config` and writes a single free head
  /// block covering it. On mapping failure the allocator is left
  /// uninitialized (subsequent `allocate` calls fail) but `config.policy`
  /// is still recorded, matching the spec's "whatever policy was last
  /// requested" rule for implicit init.
  pub fn init(&mut self, config: Config) {
    self.policy = config.policy;

    match Arena::map(config.arena_bytes) {
      Some(arena) => {
        let hsz = header_size();
        let head = arena.base() as *mut BlockHeader;
        unsafe {
          (*head).size = arena.size().saturating_sub(hsz);
          (*head).free = true;
          (*head).prev = ptr::null_mut();
          (*head).next = ptr::null_mut();
        }

        self.metrics = Metrics::zero();
        self.metrics.bytes_from_os = arena.size();
        self.head = head;
        self.arena = Some(arena);

        log::debug!("tdmm: initialized {} byte arena, policy={:?}", self.metrics.bytes_from_os, self.policy);
      }
      None => {
        self.arena = None;
        self.head = ptr::null_mut();
      }
    }
  }

  /// Convenience wrapper matching the spec's literal `init(policy)` signature;
  /// uses [`Config::default`] for the arena size.
  pub fn init_with_policy(&mut self, policy: Policy) {
    self.init(Config { policy, ..Config::default() });
  }

  /// Releases the mapping and zeroes all state, as if the allocator had
  /// never been initialized. Test-only teardown per the spec.
  pub fn reset(&mut self) {
    self.arena = None;
    self.head = ptr::null_mut();
    self.metrics = Metrics::zero();
  }

  /// A snapshot of the current telemetry.
  pub fn metrics(&self) -> Metrics {
    self.metrics
  }

  /// `H * (live block count)`, recomputed by a live walk of the list rather
  /// than cached.
  pub fn overhead_bytes(&self) -> usize {
    let hsz = header_size();
    let mut count = 0usize;
    let mut cur = self.head;
    unsafe {
      while !cur.is_null() {
        count += 1;
        cur = (*cur).next;
      }
    }
    count * hsz
  }

  /// `H` from the spec: the fixed per-block header size in bytes, rounded up
  /// to a multiple of 4. Exposed so callers can reason about
  /// [`Allocator::overhead_bytes`] (e.g. the known single-block overhead of a
  /// freshly collapsed list) without reaching into the crate's private
  /// block-layout module.
  pub fn header_size() -> usize {
    crate::block::header_size()
  }

  fn ensure_initialized(&mut self) -> bool {
    if self.arena.is_none() {
      self.init_with_policy(self.policy);
    }
    self.arena.is_some()
  }

  /// Allocates `size` bytes, returning null on any failure. See
  /// [`Allocator::allocate_checked`] for the reason behind a failure.
  pub fn allocate(&mut self, size: usize) -> *mut u8 {
    match self.allocate_checked(size) {
      Ok(p) => p.as_ptr(),
      Err(_) => ptr::null_mut(),
    }
  }

  /// Same as [`Allocator::allocate`], but reports *why* a request failed
  /// instead of collapsing every failure into null.
  pub fn allocate_checked(&mut self, size: usize) -> Result<NonNull<u8>, AllocError> {
    let t0 = Instant::now();

    if size == 0 {
      self.record_malloc_event(0, false, t0);
      return Err(AllocError::ZeroSizeRequest);
    }

    if !self.ensure_initialized() {
      self.record_malloc_event(0, false, t0);
      return Err(AllocError::ArenaUnavailable);
    }

    let need = align4!(size);

    let chosen = unsafe { policy::select(self.head, need, self.policy) };
    if chosen.is_null() {
      log::debug!("tdmm: out of memory for {size} bytes (need {need} after rounding)");
      self.record_malloc_event(0, false, t0);
      return Err(AllocError::OutOfMemory { requested: size, available_hint: self.metrics.bytes_from_os });
    }

    unsafe { split(chosen, need) };
    unsafe { (*chosen).free = false };

    let payload = unsafe { payload_of(chosen) };
    if (payload as usize) % 4 != 0 {
      // Defensive: invariant 5 guarantees this never happens.
      unsafe { (*chosen).free = true };
      self.record_malloc_event(0, false, t0);
      return Err(AllocError::ArenaUnavailable);
    }

    self.record_malloc_event(need, true, t0);
    Ok(unsafe { NonNull::new_unchecked(payload) })
  }

  /// Marks the block backing `ptr` free and merges it with free neighbours.
  /// A no-op for null, out-of-arena, or already-free pointers.
  pub fn release(&mut self, ptr: *mut u8) {
    let _ = self.release_checked(ptr);
  }

  /// Same as [`Allocator::release`], but reports why the call was a no-op.
  pub fn release_checked(&mut self, ptr: *mut u8) -> Result<(), AllocError> {
    let t0 = Instant::now();

    if ptr.is_null() {
      self.record_free_event(0, false, t0);
      return Err(AllocError::InvalidRelease { reason: "null pointer" });
    }

    let Some(arena) = self.arena.as_ref() else {
      self.record_free_event(0, false, t0);
      return Err(AllocError::ArenaUnavailable);
    };

    if !arena.contains(ptr as *const u8) {
      self.record_free_event(0, false, t0);
      return Err(AllocError::InvalidRelease { reason: "pointer outside arena" });
    }

    let block = unsafe { header_of(ptr) };
    if !arena.contains(block as *const u8) {
      self.record_free_event(0, false, t0);
      return Err(AllocError::InvalidRelease { reason: "header outside arena" });
    }

    if unsafe { (*block).free } {
      log::trace!("tdmm: double free ignored at {ptr:p}");
      self.record_free_event(0, false, t0);
      return Err(AllocError::InvalidRelease { reason: "block already free" });
    }

    let freed = unsafe { (*block).size };
    unsafe {
      (*block).free = true;
      coalesce(block);
    }

    self.record_free_event(freed, true, t0);
    Ok(())
  }

  fn record_malloc_event(&mut self, accounted: usize, success: bool, t0: Instant) {
    self.metrics.malloc_ns_total += elapsed_ns(t0);
    if success {
      self.metrics.cur_inuse_bytes += accounted;
      self.metrics.peak_inuse_bytes = self.metrics.peak_inuse_bytes.max(self.metrics.cur_inuse_bytes);
    }
    self.sample_utilization();
  }

  fn record_free_event(&mut self, accounted: usize, success: bool, t0: Instant) {
    self.metrics.free_ns_total += elapsed_ns(t0);
    if success {
      self.metrics.cur_inuse_bytes = self.metrics.cur_inuse_bytes.saturating_sub(accounted);
    }
    self.sample_utilization();
  }

  fn sample_utilization(&mut self) {
    if self.metrics.bytes_from_os > 0 {
      let u = self.metrics.cur_inuse_bytes as f64 / self.metrics.bytes_from_os as f64;
      self.metrics.util_sum += u;
      self.metrics.num_util += 1;
    }
  }
}

impl Default for Allocator {
  fn default() -> Self {
    Self::new()
  }
}

/// Shrinks `block` to `need` bytes, carving a new free block out of the
/// remainder when the remainder can hold a header plus at least 4 bytes of
/// payload. Leaves `block` untouched (whole-block handout) otherwise.
///
/// # Safety
///
/// `block` must be a valid, currently-free block with `size >= need`.
unsafe fn split(block: *mut BlockHeader, need: usize) {
  unsafe {
    let hsz = header_size();
    let remaining = (*block).size - need;
    if remaining < hsz + 4 {
      return;
    }

    let new_block = payload_of(block).add(need) as *mut BlockHeader;
    (*new_block).size = remaining - hsz;
    (*new_block).free = true;
    (*new_block).prev = block;
    (*new_block).next = (*block).next;

    if !(*block).next.is_null() {
      (*(*block).next).prev = new_block;
    }
    (*block).next = new_block;
    (*block).size = need;
  }
}

/// Walks left while the previous block is free, then absorbs every
/// immediately-following free block. Re-establishes invariant 4 (no two
/// adjacent free blocks).
///
/// # Safety
///
/// `block` must be a valid, currently-free block belonging to a well-formed list.
unsafe fn coalesce(block: *mut BlockHeader) {
  unsafe {
    let mut b = block;
    while !(*b).prev.is_null() && (*(*b).prev).free {
      b = (*b).prev;
    }

    let hsz = header_size();
    while !(*b).next.is_null() && (*(*b).next).free {
      let n = (*b).next;
      (*b).size += hsz + (*n).size;
      (*b).next = (*n).next;
      if !(*b).next.is_null() {
        (*(*b).next).prev = b;
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn small_config(policy: Policy) -> Config {
    // A handful of pages is plenty for unit tests and keeps them fast;
    // still rounded up to a full page by `Arena::map`.
    Config { arena_bytes: 64 * 1024, policy }
  }

  #[test]
  fn allocate_zero_returns_null_without_touching_metrics() {
    let mut a = Allocator::new();
    a.init(small_config(Policy::FirstFit));
    let before = a.metrics();
    assert!(a.allocate(0).is_null());
    let after = a.metrics();
    assert_eq!(before.cur_inuse_bytes, after.cur_inuse_bytes);
  }

  #[test]
  fn allocations_are_4_aligned_and_distinct() {
    let mut a = Allocator::new();
    a.init(small_config(Policy::FirstFit));

    let p1 = a.allocate(13);
    let p2 = a.allocate(57);
    assert!(!p1.is_null() && !p2.is_null());
    assert_eq!(p1 as usize % 4, 0);
    assert_eq!(p2 as usize % 4, 0);
    assert_ne!(p1, p2);
  }

  #[test]
  fn release_null_is_noop() {
    let mut a = Allocator::new();
    a.init(small_config(Policy::FirstFit));
    a.release(ptr::null_mut());
    assert_eq!(a.metrics().cur_inuse_bytes, 0);
  }

  #[test]
  fn split_and_reuse() {
    let mut a = Allocator::new();
    a.init(small_config(Policy::FirstFit));

    let p = a.allocate(1024);
    assert!(!p.is_null());
    a.release(p);

    let q = a.allocate(128);
    assert_eq!(p, q);
  }

  #[test]
  fn double_free_is_ignored() {
    let mut a = Allocator::new();
    a.init(small_config(Policy::FirstFit));

    let p = a.allocate(64);
    a.release(p);
    a.release(p);

    let q = a.allocate(64);
    assert!(!q.is_null());
  }

  #[test]
  fn invalid_release_is_ignored() {
    let mut a = Allocator::new();
    a.init(small_config(Policy::FirstFit));

    let local = 123i32;
    a.release(&local as *const i32 as *mut u8);
    a.release(0x1234_5678usize as *mut u8);

    let p = a.allocate(64);
    assert!(!p.is_null());
  }

  #[test]
  fn out_of_memory_then_recovery() {
    let mut a = Allocator::new();
    a.init(small_config(Policy::FirstFit));

    let too_big = a.metrics().bytes_from_os;
    assert!(a.allocate(too_big).is_null());

    let q = a.allocate(64);
    assert!(!q.is_null());
  }

  #[test]
  fn whole_arena_minus_header_succeeds_then_exhausts() {
    let mut a = Allocator::new();
    a.init(small_config(Policy::FirstFit));

    let whole_payload = a.metrics().bytes_from_os - Allocator::header_size();
    let p = a.allocate(whole_payload);
    assert!(!p.is_null());
    assert_eq!(a.metrics().cur_inuse_bytes, whole_payload);

    assert!(a.allocate(1).is_null());
  }

  #[test]
  fn releasing_everything_collapses_to_one_free_block() {
    let mut a = Allocator::new();
    a.init(small_config(Policy::FirstFit));

    let x = a.allocate(256);
    let y = a.allocate(256);
    let z = a.allocate(256);
    a.release(x);
    a.release(y);
    a.release(z);

    assert_eq!(a.metrics().cur_inuse_bytes, 0);
    assert_eq!(a.overhead_bytes(), header_size());
  }

  #[test]
  fn best_fit_picks_the_tight_hole() {
    let mut a = Allocator::new();
    a.init(small_config(Policy::BestFit));

    let x = a.allocate(64);
    let y = a.allocate(256);
    let z = a.allocate(64);
    a.release(y);

    let w = a.allocate(200);
    assert_eq!(w, y);
    let _ = (x, z);
  }

  #[test]
  fn worst_fit_picks_the_large_remainder() {
    let mut a = Allocator::new();
    a.init(small_config(Policy::WorstFit));

    let x = a.allocate(64);
    let y = a.allocate(256);
    let z = a.allocate(64);
    a.release(y);

    let w = a.allocate(64);
    assert_ne!(w, y);
    let _ = (x, z);
  }

  #[test]
  fn implicit_init_uses_last_requested_policy() {
    let mut a = Allocator::new();
    // No explicit init: first allocate should implicitly init with the
    // default policy (first-fit) and succeed.
    let p = a.allocate(32);
    assert!(!p.is_null());
    assert!(a.metrics().bytes_from_os > 0);
  }

  #[test]
  fn reset_allows_reinitialization() {
    let mut a = Allocator::new();
    a.init(small_config(Policy::FirstFit));
    let p = a.allocate(64);
    assert!(!p.is_null());

    a.reset();
    assert_eq!(a.metrics().bytes_from_os, 0);

    a.init(small_config(Policy::BestFit));
    let q = a.allocate(64);
    assert!(!q.is_null());
  }
}
