//! The intrusive block header embedded directly in the arena.
//!
//! Every byte of the arena belongs to exactly one [`BlockHeader`] (the
//! metadata) followed by its payload. Headers form a doubly-linked,
//! address-ordered list; all pointer arithmetic that crosses from "header" to
//! "payload" and back lives in this module so the rest of the crate never
//! has to reason about raw offsets directly.

use std::mem;

use crate::align4;

/// Metadata prefixing every block in the arena.
///
/// `repr(C)` pins the field layout so `header_size()` is stable and so the
/// struct can be written directly into raw arena memory via pointer casts.
#[repr(C)]
pub(crate) struct BlockHeader {
  pub size: usize,
  pub free: bool,
  pub prev: *mut BlockHeader,
  pub next: *mut BlockHeader,
}

/// `H` from the spec: the header size, rounded up to a multiple of 4.
///
/// Computed on demand rather than cached in a `const` because `align4!`
/// isn't usable in a `const` position here without pinning down
/// `mem::size_of` as a const-evaluated value; the cost is negligible next to
/// the mmap/placement-scan work that surrounds every call site.
#[inline]
pub(crate) fn header_size() -> usize {
  align4!(mem::size_of::<BlockHeader>())
}

/// The payload address for a block whose header starts at `header`.
///
/// # Safety
///
/// `header` must point to a valid, initialized `BlockHeader`.
#[inline]
pub(crate) unsafe fn payload_of(header: *mut BlockHeader) -> *mut u8 {
  unsafe { (header as *mut u8).add(header_size()) }
}

/// Recovers the header address for a payload pointer previously produced by
/// [`payload_of`].
///
/// # Safety
///
/// `payload` must lie at least `header_size()` bytes past the start of a
/// mapping; the caller is responsible for bounds-checking before
/// dereferencing the result (see `Arena::contains`).
#[inline]
pub(crate) unsafe fn header_of(payload: *mut u8) -> *mut BlockHeader {
  unsafe { payload.sub(header_size()) as *mut BlockHeader }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn header_size_is_4_aligned() {
    assert_eq!(header_size() % 4, 0);
  }

  #[test]
  fn payload_and_header_roundtrip() {
    let hsz = header_size();
    let mut buf = vec![0u8; hsz + 64];
    let header = buf.as_mut_ptr() as *mut BlockHeader;

    unsafe {
      let payload = payload_of(header);
      assert_eq!(payload as usize, header as usize + hsz);
      assert_eq!(header_of(payload), header);
    }
  }
}
