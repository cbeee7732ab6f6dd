//! Oblivious permutation of secret-shared batches.
//!
//! One party knows a permutation `order` of `0..size`, the other party learns
//! nothing about it. Permuting `src` to `order` yields `out[j] = src[order[j]]`.
use std::future::Future;

use thiserror::Error;

use crate::engine::{self, Plaintext, SecretBatch, SecretBatchOps};

mod as_waksman;
mod parameters;

pub use as_waksman::AsWaksmanPermuter;
pub use parameters::{AsWaksmanParameterCalculator, AsWaksmanParameters};

/// Errors raised by the permuter and the shuffler.
#[derive(Debug, Error)]
pub enum Error {
    /// The order is not a permutation of `0..size`. Raised before any round.
    #[error("invalid order: {0}")]
    InvalidOrder(String),
    /// The batch does not contain `size` elements.
    #[error("expected {expected} elements, but got {actual}")]
    SizeMismatch {
        /// The requested size.
        expected: usize,
        /// The length of the batch.
        actual: usize,
    },
    /// The substrate failed.
    #[error(transparent)]
    Engine(#[from] engine::Error),
}

/// Permutes secret-shared batches to an order known to one of the parties.
///
/// Both parties call the same number of operations with the same sizes: the
/// party holding the order calls [`Permuter::permute_to_order`], its peer
/// calls [`Permuter::permute`].
pub trait Permuter {
    /// Permutes `src` to the order chosen by the peer.
    fn permute<T: Plaintext>(
        &self,
        engine: &impl SecretBatchOps,
        src: SecretBatch<T>,
        size: usize,
    ) -> impl Future<Output = Result<SecretBatch<T>, Error>>;

    /// Permutes `src` to `order` without checking that `order` is a permutation.
    fn permute_to_order_unchecked<T: Plaintext>(
        &self,
        engine: &impl SecretBatchOps,
        src: SecretBatch<T>,
        size: usize,
        order: &[u32],
    ) -> impl Future<Output = Result<SecretBatch<T>, Error>>;

    /// Permutes `src` to `order`, a permutation of `0..size` known to this party.
    fn permute_to_order<T: Plaintext>(
        &self,
        engine: &impl SecretBatchOps,
        src: SecretBatch<T>,
        size: usize,
        order: &[u32],
    ) -> impl Future<Output = Result<SecretBatch<T>, Error>> {
        async move {
            check_order(order, size)?;
            check_size(&src, size)?;
            self.permute_to_order_unchecked(engine, src, size, order)
                .await
        }
    }
}

/// Checks that `order` is a bijection of `0..size`.
pub fn check_order(order: &[u32], size: usize) -> Result<(), Error> {
    if order.len() != size {
        return Err(Error::InvalidOrder(format!(
            "order has {} targets for size {size}",
            order.len()
        )));
    }
    let mut seen = vec![false; size];
    for &target in order {
        match seen.get_mut(target as usize) {
            None => {
                return Err(Error::InvalidOrder(format!(
                    "target {target} is out of range for size {size}"
                )));
            }
            Some(true) => {
                return Err(Error::InvalidOrder(format!(
                    "target {target} appears more than once"
                )));
            }
            Some(seen) => *seen = true,
        }
    }
    Ok(())
}

pub(crate) fn check_size<T: Plaintext>(src: &SecretBatch<T>, size: usize) -> Result<(), Error> {
    if src.len() == size {
        Ok(())
    } else {
        Err(Error::SizeMismatch {
            expected: size,
            actual: src.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_validation() {
        assert!(check_order(&[2, 0, 1], 3).is_ok());
        assert!(check_order(&[], 0).is_ok());
        assert!(matches!(
            check_order(&[0, 1], 3),
            Err(Error::InvalidOrder(_))
        ));
        assert!(matches!(
            check_order(&[0, 3, 1], 3),
            Err(Error::InvalidOrder(_))
        ));
        assert!(matches!(
            check_order(&[0, 1, 1], 3),
            Err(Error::InvalidOrder(_))
        ));
    }

    #[test]
    fn size_validation() {
        let src = SecretBatch::from_values(&[1_u8, 2, 3]);
        assert!(check_size(&src, 3).is_ok());
        assert!(matches!(
            check_size(&src, 4),
            Err(Error::SizeMismatch {
                expected: 4,
                actual: 3
            })
        ));
    }
}
