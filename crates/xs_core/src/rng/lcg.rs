//! 63-bit linear congruential generator with logarithmic skip-ahead.

use rand::{RngCore, SeedableRng};

/// LCG multiplier.
const LCG_MULT: u64 = 2_806_196_910_506_780_709;
/// LCG increment.
const LCG_ADD: u64 = 1;
/// Modulus is 2^63; reduction is a mask.
const LCG_MASK: u64 = (1 << 63) - 1;
/// 2^-53, scales a 53-bit integer into [0, 1).
const UNIT_SCALE: f64 = 1.0 / (1u64 << 53) as f64;

/// Seedable generator used for grid construction and lookup sampling.
///
/// The state is a single `u64` in `[0, 2^63)`, so the generator is `Copy`
/// and can be handed to each worker by value. [`XsRng::advance`] moves the
/// stream forward by `n` draws in `O(log n)` steps.
///
/// # Examples
///
/// ```rust
/// use xs_core::rng::XsRng;
///
/// let mut a = XsRng::from_seed(42);
/// let mut b = XsRng::from_seed(42);
/// assert_eq!(a.gen_uniform(), b.gen_uniform());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct XsRng {
    state: u64,
}

impl XsRng {
    /// Creates a generator whose state is `seed` reduced modulo 2^63.
    #[inline]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            state: seed & LCG_MASK,
        }
    }

    /// Creates a generator positioned `n` draws after `seed`.
    ///
    /// Equivalent to `from_seed(seed)` followed by `n` calls to
    /// [`gen_uniform`](Self::gen_uniform), but runs in `O(log n)`.
    #[inline]
    pub fn at(seed: u64, n: u64) -> Self {
        let mut rng = Self::from_seed(seed);
        rng.advance(n);
        rng
    }

    /// Returns the raw generator state.
    #[inline]
    pub fn state(&self) -> u64 {
        self.state
    }

    #[inline(always)]
    fn step(&mut self) -> u64 {
        self.state = LCG_MULT
            .wrapping_mul(self.state)
            .wrapping_add(LCG_ADD)
            & LCG_MASK;
        self.state
    }

    /// Generates a uniform value in `[0, 1)` from the top 53 bits of the
    /// state.
    #[inline(always)]
    pub fn gen_uniform(&mut self) -> f64 {
        (self.step() >> 10) as f64 * UNIT_SCALE
    }

    /// Skips `n` draws ahead.
    ///
    /// Composes the affine map `x -> a*x + c` with itself by repeated
    /// squaring. All arithmetic wraps modulo 2^64, which is consistent with
    /// the final reduction modulo 2^63.
    pub fn advance(&mut self, mut n: u64) {
        let mut mult = LCG_MULT;
        let mut add = LCG_ADD;
        let mut acc_mult: u64 = 1;
        let mut acc_add: u64 = 0;

        while n > 0 {
            if n & 1 == 1 {
                acc_mult = acc_mult.wrapping_mul(mult);
                acc_add = acc_add.wrapping_mul(mult).wrapping_add(add);
            }
            add = mult.wrapping_add(1).wrapping_mul(add);
            mult = mult.wrapping_mul(mult);
            n >>= 1;
        }

        self.state = acc_mult.wrapping_mul(self.state).wrapping_add(acc_add) & LCG_MASK;
    }
}

impl SeedableRng for XsRng {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        XsRng::from_seed(u64::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        XsRng::from_seed(state)
    }
}

// `rand` adapters use the high bits of each word; the low bit of
// `next_u64` is always zero because the state has 63 bits.
impl RngCore for XsRng {
    #[inline(always)]
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    #[inline(always)]
    fn next_u64(&mut self) -> u64 {
        self.step() << 1
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut chunks = dest.chunks_exact_mut(8);
        for chunk in &mut chunks {
            chunk.copy_from_slice(&self.next_u64().to_le_bytes());
        }
        let rest = chunks.into_remainder();
        if !rest.is_empty() {
            let bytes = self.next_u64().to_le_bytes();
            rest.copy_from_slice(&bytes[..rest.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = XsRng::from_seed(12345);
        let mut b = XsRng::from_seed(12345);

        for _ in 0..100 {
            assert_eq!(a.gen_uniform(), b.gen_uniform());
        }
    }

    #[test]
    fn test_uniform_range() {
        let mut rng = XsRng::from_seed(42);

        for _ in 0..10_000 {
            let u = rng.gen_uniform();
            assert!((0.0..1.0).contains(&u), "value {} out of [0, 1)", u);
        }
    }

    #[test]
    fn test_advance_matches_stepping() {
        for n in [0u64, 1, 2, 7, 64, 1000, 12_345] {
            let mut stepped = XsRng::from_seed(1070);
            for _ in 0..n {
                stepped.gen_uniform();
            }
            let jumped = XsRng::at(1070, n);
            assert_eq!(stepped, jumped, "skip-ahead diverged at n = {}", n);
        }
    }

    #[test]
    fn test_advance_is_additive() {
        let mut twice = XsRng::from_seed(7);
        twice.advance(300);
        twice.advance(700);

        assert_eq!(twice, XsRng::at(7, 1000));
    }

    #[test]
    fn test_seed_is_reduced() {
        let rng = XsRng::from_seed(u64::MAX);
        assert_eq!(rng.state(), LCG_MASK);
    }

    #[test]
    fn test_works_as_rand_rng() {
        let mut rng = XsRng::from_seed(3);

        for _ in 0..1000 {
            let k: usize = rng.gen_range(0..17);
            assert!(k < 17);
        }
        let _: f64 = rng.gen();
        let mut bytes = [0u8; 13];
        rng.fill_bytes(&mut bytes);
    }
}
