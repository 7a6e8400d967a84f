//! Verification checksum.
//!
//! Every lookup contributes `1 + argmax(macro_xs)`: the position of its
//! largest channel, first one on ties. Contributions are summed as `u64`
//! (order independent, so per-worker partials can be combined freely) and
//! the sum is reported modulo [`VERIFICATION_MODULUS`].

use xs_core::XsVector;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Modulus applied to the raw checksum for reporting.
pub const VERIFICATION_MODULUS: u64 = 999_983;

/// Contribution of a single lookup result, in `1..=N_XS`.
#[inline]
pub fn lookup_score(xs: &XsVector) -> u64 {
    let mut best = 0;
    for k in 1..xs.len() {
        if xs[k] > xs[best] {
            best = k;
        }
    }
    best as u64 + 1
}

/// Reported verification value of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Verification {
    checksum: u64,
}

impl Verification {
    /// Wraps a raw checksum.
    #[inline]
    pub fn new(checksum: u64) -> Self {
        Self { checksum }
    }

    /// Raw (unreduced) checksum.
    #[inline]
    pub fn checksum(&self) -> u64 {
        self.checksum
    }

    /// Checksum modulo [`VERIFICATION_MODULUS`].
    #[inline]
    pub fn value(&self) -> u64 {
        self.checksum % VERIFICATION_MODULUS
    }

    /// Compares against a known-good value, if one was supplied.
    pub fn check(&self, expected: Option<u64>) -> VerificationOutcome {
        match expected {
            None => VerificationOutcome::Unchecked,
            Some(expected) if expected == self.value() => VerificationOutcome::Passed,
            Some(expected) => VerificationOutcome::Failed {
                expected,
                actual: self.value(),
            },
        }
    }
}

/// Result of comparing a run against a known-good verification value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "outcome", rename_all = "snake_case"))]
pub enum VerificationOutcome {
    /// Matched the expected value.
    Passed,
    /// Did not match.
    Failed {
        /// Value the run should have produced.
        expected: u64,
        /// Value the run produced.
        actual: u64,
    },
    /// No expected value was configured.
    Unchecked,
}

impl VerificationOutcome {
    /// True unless the run failed verification.
    #[inline]
    pub fn is_ok(&self) -> bool {
        !matches!(self, VerificationOutcome::Failed { .. })
    }
}
