//! # Random Number Generation
//!
//! The benchmark needs a generator that is cheap to copy, fully reproducible
//! and, above all, able to jump to an arbitrary position of its stream in
//! `O(log n)`. That last property is what lets every lookup of a parallel
//! simulation derive its samples from its own index, so the result never
//! depends on which worker ran it or in which order.
//!
//! ## Module Structure
//!
//! - [`lcg`]: the 63-bit linear congruential generator [`XsRng`] with
//!   skip-ahead support
//!
//! ## Usage Example
//!
//! ```rust
//! use xs_core::rng::XsRng;
//!
//! let mut rng = XsRng::from_seed(1070);
//! let energy = rng.gen_uniform();
//! assert!((0.0..1.0).contains(&energy));
//!
//! // Position a second generator four draws further along the same stream
//! let mut ahead = XsRng::at(1070, 4);
//! for _ in 0..3 {
//!     rng.gen_uniform();
//! }
//! assert_eq!(rng.gen_uniform(), ahead.gen_uniform());
//! ```

mod lcg;

pub use lcg::XsRng;
