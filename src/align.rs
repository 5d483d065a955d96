/// Rounds `value` up to the nearest multiple of 4.
///
/// The allocator guarantees payloads are 4-byte aligned only (see the crate's
/// Non-goals); this is the single rounding rule every size in the arena goes
/// through, for both user requests (`need`) and the block header itself (`H`).
///
/// # Examples
///
/// ```rust
/// use tdmm::align4;
///
/// assert_eq!(align4!(1), 4);
/// assert_eq!(align4!(4), 4);
/// assert_eq!(align4!(5), 8);
/// ```
#[macro_export]
macro_rules! align4 {
  ($value:expr) => {
    ($value + 3) & !3
  };
}

#[cfg(test)]
mod tests {
  #[test]
  fn test_align4() {
    for i in 0..40usize {
      let expected = (i + 3) / 4 * 4;
      assert_eq!(expected, align4!(i));
    }
  }

  #[test]
  fn test_align4_already_aligned() {
    for i in (0..64usize).step_by(4) {
      assert_eq!(i, align4!(i));
    }
  }
}
