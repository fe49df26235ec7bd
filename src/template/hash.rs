//! Order-independent fingerprints of template geometry.
//!
//! Each coordinate value `v` in `0..=W` is assigned the `v`-th prime. The
//! values of one axis (`x`, `y`, `width` or `height`) over all rectangles are
//! folded into the product of their primes, which only depends on the multiset
//! of values. The four products and the rectangle count are then packed as
//! digits in base `R = P^4 + 1`, where `P` is the largest prime in use, so
//! axes never bleed into each other.
//!
//! Distinct geometries can share a fingerprint: `{(0,0), (3,3)}` and
//! `{(3,0), (0,3)}` have identical per-axis multisets. Callers must confirm
//! equality on a hit.

use crate::template::WaveletTemplate;
use crate::util::math::{checked_pow_u128, first_primes};
use crate::util::{HaarError, HaarResult};

/// Largest rectangle count the packing can represent without overlap.
const MAX_HASHED_RECTS: usize = 4;

/// Largest window whose packed hash fits in `u128`.
pub const MAX_SAMPLE_SIZE: usize = 49;

/// Precomputed primes and radix for one window size.
#[derive(Clone, Debug)]
pub struct CanonicalHasher {
    primes: Vec<u64>,
    radix: u128,
}

impl CanonicalHasher {
    /// Builds a hasher for coordinates in `0..=sample_size`.
    pub fn new(sample_size: usize) -> HaarResult<Self> {
        const TOO_LARGE: HaarError = HaarError::InvalidConfiguration {
            reason: "window too large for canonical hashing",
        };
        if sample_size > MAX_SAMPLE_SIZE {
            return Err(TOO_LARGE);
        }
        let primes = first_primes(sample_size + 1);
        let largest = *primes.last().ok_or(TOO_LARGE)?;
        let radix = checked_pow_u128(u128::from(largest), MAX_HASHED_RECTS as u32)
            .and_then(|v| v.checked_add(1))
            .ok_or(TOO_LARGE)?;
        // The most significant digit holds the rectangle count.
        checked_pow_u128(radix, 4)
            .and_then(|v| v.checked_mul(MAX_HASHED_RECTS as u128 + 1))
            .ok_or(TOO_LARGE)?;
        Ok(Self { primes, radix })
    }

    /// Returns the window size this hasher covers.
    pub fn sample_size(&self) -> usize {
        self.primes.len() - 1
    }

    /// Computes the canonical hash of a template.
    pub fn hash(&self, tpl: &WaveletTemplate) -> HaarResult<u128> {
        if tpl.dimensions() > MAX_HASHED_RECTS {
            return Err(HaarError::InvalidTemplate {
                reason: "canonical hash supports at most 4 rectangles",
            });
        }
        let rects = tpl.rects();
        let px = self.axis_product(rects.iter().map(|r| r.x))?;
        let py = self.axis_product(rects.iter().map(|r| r.y))?;
        let pw = self.axis_product(rects.iter().map(|r| r.width))?;
        let ph = self.axis_product(rects.iter().map(|r| r.height))?;

        let r = self.radix;
        let mut hash = tpl.dimensions() as u128;
        for digit in [ph, pw, py, px] {
            hash = hash * r + digit;
        }
        Ok(hash)
    }

    fn axis_product(&self, values: impl Iterator<Item = usize>) -> HaarResult<u128> {
        let mut product = 1u128;
        for value in values {
            let prime = self
                .primes
                .get(value)
                .ok_or(HaarError::InvalidTemplate {
                    reason: "coordinate outside the hashed window",
                })?;
            product *= u128::from(*prime);
        }
        Ok(product)
    }
}
