//! Integer helpers for canonical hashing.

/// Returns the first `count` primes in increasing order.
pub(crate) fn first_primes(count: usize) -> Vec<u64> {
    let mut primes: Vec<u64> = Vec::with_capacity(count);
    let mut candidate = 2u64;
    while primes.len() < count {
        let is_prime = primes
            .iter()
            .take_while(|&&p| p * p <= candidate)
            .all(|&p| candidate % p != 0);
        if is_prime {
            primes.push(candidate);
        }
        candidate += 1;
    }
    primes
}

/// Computes `base^exp` in `u128`, returning `None` on overflow.
pub(crate) fn checked_pow_u128(base: u128, exp: u32) -> Option<u128> {
    let mut acc = 1u128;
    for _ in 0..exp {
        acc = acc.checked_mul(base)?;
    }
    Some(acc)
}

#[cfg(test)]
mod tests {
    use super::{checked_pow_u128, first_primes};

    #[test]
    fn first_primes_lists_expected_values() {
        assert_eq!(first_primes(0), Vec::<u64>::new());
        assert_eq!(first_primes(8), vec![2, 3, 5, 7, 11, 13, 17, 19]);
        assert_eq!(*first_primes(21).last().unwrap(), 73);
    }

    #[test]
    fn checked_pow_detects_overflow() {
        assert_eq!(checked_pow_u128(73, 4), Some(28_398_241));
        assert_eq!(checked_pow_u128(7, 0), Some(1));
        assert!(checked_pow_u128(u128::MAX, 2).is_none());
    }
}
