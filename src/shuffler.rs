//! Oblivious shuffling of secret-shared batches.
use std::future::Future;

use rand::seq::SliceRandom;
use tracing::{Level, debug, instrument};

use crate::{
    crypto::AesRng,
    engine::{Plaintext, SecretBatch, SecretBatchOps},
    permuter::{Error, Permuter, check_size},
};

/// Shuffles secret-shared batches to an order neither party knows.
pub trait Shuffler {
    /// Applies a uniformly random permutation to the `size` elements of `src`.
    fn shuffle<T: Plaintext>(
        &self,
        engine: &impl SecretBatchOps,
        src: SecretBatch<T>,
        size: usize,
    ) -> impl Future<Output = Result<SecretBatch<T>, Error>>;
}

/// A shuffler composing one random permutation per party.
///
/// Each party draws a private permutation and the batch is permuted to both,
/// using two invocations of the underlying [`Permuter`]. The composition is
/// uniformly random as long as one party is honest.
#[derive(Debug, Clone)]
pub struct PermuteBasedShuffler<P> {
    my_id: usize,
    peer_id: usize,
    permuter: P,
}

impl<P: Permuter> PermuteBasedShuffler<P> {
    /// Creates a shuffler for the party `my_id` and its peer.
    pub fn new(my_id: usize, peer_id: usize, permuter: P) -> Self {
        Self {
            my_id,
            peer_id,
            permuter,
        }
    }
}

/// Draws a uniformly random permutation of `0..size` with Fisher-Yates.
fn random_order(size: usize) -> Result<Vec<u32>, Error> {
    let size = u32::try_from(size)
        .map_err(|_| Error::InvalidOrder(format!("size {size} does not fit into an order")))?;
    let mut order: Vec<u32> = (0..size).collect();
    order.shuffle(&mut AesRng::new());
    Ok(order)
}

impl<P: Permuter> Shuffler for PermuteBasedShuffler<P> {
    #[instrument(level = Level::DEBUG, skip_all, fields(size = size), err)]
    async fn shuffle<T: Plaintext>(
        &self,
        engine: &impl SecretBatchOps,
        src: SecretBatch<T>,
        size: usize,
    ) -> Result<SecretBatch<T>, Error> {
        check_size(&src, size)?;
        let order = random_order(size)?;
        if self.my_id < self.peer_id {
            debug!("permuting to own order first");
            let src = self
                .permuter
                .permute_to_order(engine, src, size, &order)
                .await?;
            self.permuter.permute(engine, src, size).await
        } else {
            debug!("permuting to peer order first");
            let src = self.permuter.permute(engine, src, size).await?;
            self.permuter
                .permute_to_order(engine, src, size, &order)
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_orders_are_permutations() {
        for size in [0, 1, 2, 7, 100] {
            let mut order = random_order(size).unwrap();
            order.sort_unstable();
            assert_eq!(order, (0..size as u32).collect::<Vec<_>>());
        }
    }

    #[test]
    fn random_orders_differ() {
        let first = random_order(64).unwrap();
        assert!((0..4).any(|_| random_order(64).unwrap() != first));
    }
}
