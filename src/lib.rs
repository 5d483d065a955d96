//! # tdmm - a teaching free-list heap allocator
//!
//! `tdmm` implements the classical free-list allocator mechanics — block
//! headers, placement policy (first/best/worst fit), splitting, and
//! coalescing — over a single large anonymous `mmap` obtained once from the
//! OS. It exists to make those mechanics directly observable: every header
//! lives inside the arena it manages, and the [`Metrics`] snapshot exposes
//! utilization, structural overhead, and per-call latency so placement
//! policies can be compared experimentally.
//!
//! ## Crate Structure
//!
//! ```text
//!   tdmm
//!   ├── align      - the align4! rounding macro
//!   ├── arena      - the single OS mapping (mmap/munmap)
//!   ├── block      - the intrusive block header and its pointer arithmetic
//!   ├── policy     - first/best/worst-fit selection over free blocks
//!   ├── allocator  - init/allocate/release/reset + split/coalesce + metrics
//!   ├── metrics    - the telemetry snapshot and its Display impl
//!   ├── error      - typed failure reasons for the opt-in checked API
//!   ├── config     - arena size + policy, as a constructible value
//!   └── facade     - free functions over one process-wide Allocator
//! ```
//!
//! ## Two ways to use it
//!
//! Own an [`Allocator`] value directly:
//!
//! ```rust
//! use tdmm::{Allocator, Policy};
//!
//! let mut heap = Allocator::new();
//! heap.init_with_policy(Policy::BestFit);
//!
//! let p = heap.allocate(128);
//! assert!(!p.is_null());
//! heap.release(p);
//! ```
//!
//! Or use the process-wide facade, which mirrors the original `t_init` /
//! `t_malloc` / `t_free` call sites:
//!
//! ```rust
//! use tdmm::{facade, Policy};
//!
//! facade::init(Policy::FirstFit);
//! let p = facade::allocate(64);
//! facade::release(p);
//! # facade::reset();
//! ```
//!
//! ## Safety
//!
//! This crate deals in raw arena pointers by necessity: block headers are
//! intrusive, living in the same bytes they describe. All such arithmetic is
//! confined to [`block`] and the private `split`/`coalesce` helpers in
//! [`allocator`]; the public API (`allocate`/`release`, checked or not) is
//! safe to call; only a handful of internal functions are `unsafe`.
//!
//! ## Limitations
//!
//! - Single-threaded only: see the Non-goals in the crate's design notes.
//! - No arena growth: exhaustion is reported as allocation failure.
//! - 4-byte payload alignment only; there is no `realloc`.

pub mod align;
mod arena;
mod block;
mod clock;

mod allocator;
mod config;
mod error;
pub mod facade;
mod metrics;
mod policy;

pub use allocator::Allocator;
pub use config::{Config, DEFAULT_ARENA_BYTES};
pub use error::AllocError;
pub use metrics::Metrics;
pub use policy::Policy;
