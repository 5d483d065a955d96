//! Smoke test mirroring the original C driver:
//! `t_init(BEST_FIT); malloc(100); malloc(200); free; free; display_metrics();`

use tdmm::{Policy, facade};

fn main() {
  facade::init(Policy::BestFit);

  let a = facade::allocate(100);
  let b = facade::allocate(200);

  assert!(!a.is_null() && !b.is_null());

  facade::release(a);
  facade::release(b);

  println!("{}", facade::metrics());
}
