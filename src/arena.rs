//! The single anonymous OS mapping backing the whole allocator.
//!
//! One [`Arena`] owns one contiguous, page-aligned, read/write region
//! obtained from `mmap`. It is never grown, shrunk, or reused for anything
//! other than holding the block list; it is released back to the OS only
//! when the `Arena` itself is dropped (process teardown, or an explicit
//! `reset`).

use std::ptr;

use libc::{MAP_ANONYMOUS, MAP_FAILED, MAP_PRIVATE, PROT_READ, PROT_WRITE, c_void, _SC_PAGESIZE};

/// A contiguous `[base, base + size)` byte region obtained from `mmap`.
pub(crate) struct Arena {
  base: *mut u8,
  size: usize,
}

impl Arena {
  /// Requests an anonymous private mapping of at least `requested_bytes`,
  /// rounded up to the OS page size.
  ///
  /// Returns `None` on mapping failure; the caller is left uninitialized,
  /// matching the spec's "arena unavailable" failure kind.
  pub(crate) fn map(requested_bytes: usize) -> Option<Self> {
    let size = page_round_up(requested_bytes);

    let addr = unsafe {
      libc::mmap(
        ptr::null_mut(),
        size,
        PROT_READ | PROT_WRITE,
        MAP_PRIVATE | MAP_ANONYMOUS,
        -1,
        0,
      )
    };

    if addr == MAP_FAILED {
      log::warn!("tdmm: mmap of {size} bytes failed, allocator left uninitialized");
      return None;
    }

    log::debug!("tdmm: mapped {size} bytes at {addr:p}");
    Some(Self { base: addr as *mut u8, size })
  }

  pub(crate) fn base(&self) -> *mut u8 {
    self.base
  }

  pub(crate) fn size(&self) -> usize {
    self.size
  }

  /// Whether `ptr` lies within `[base, base + size)`.
  pub(crate) fn contains(&self, ptr: *const u8) -> bool {
    let p = ptr as usize;
    let b = self.base as usize;
    p >= b && p < b + self.size
  }
}

impl Drop for Arena {
  fn drop(&mut self) {
    unsafe {
      if libc::munmap(self.base as *mut c_void, self.size) != 0 {
        log::warn!("tdmm: munmap of {:p} ({} bytes) failed", self.base, self.size);
      }
    }
  }
}

fn page_round_up(n: usize) -> usize {
  let page_size = unsafe { libc::sysconf(_SC_PAGESIZE) };
  let page_size = if page_size > 0 { page_size as usize } else { 4096 };
  (n + page_size - 1) / page_size * page_size
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn map_rounds_up_to_page_size() {
    let arena = Arena::map(1).expect("mmap should succeed for a tiny request");
    assert!(arena.size() >= 1);
    assert_eq!(arena.size() % 4096, 0);
  }

  #[test]
  fn contains_respects_bounds() {
    let arena = Arena::map(4096).expect("mmap should succeed");
    let base = arena.base();

    assert!(arena.contains(base));
    assert!(arena.contains(unsafe { base.add(arena.size() - 1) }));
    assert!(!arena.contains(unsafe { base.add(arena.size()) }));

    let local = 0u8;
    assert!(!arena.contains(&local as *const u8));
  }
}
