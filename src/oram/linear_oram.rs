//! A write-only ORAM that touches every cell on every write.
use rand::Rng;
use tracing::{Level, debug, instrument};

use crate::{
    channel::{recv_from, send_to},
    crypto::AesRng,
    engine::{AdditiveGroup, SecretBatch, SecretBatchOps},
    oram::{Error, Role, WriteOnlyOram, check_add_batch, check_index},
    utils::covering_len,
};

/// A write-only ORAM based on conditional expansion.
///
/// Every secret value is expanded into `size` secret values, all zero except
/// at the secret index, by one layer of oblivious swaps per index bit. The
/// expanded values are converted into additive shares: Alice contributes a
/// fresh random mask and Bob learns the masked difference.
pub struct LinearOram<T> {
    memory: Vec<T>,
    role: Role,
    party0_id: usize,
    party1_id: usize,
    rng: AesRng,
}

impl<T: AdditiveGroup> LinearOram<T> {
    /// Creates an ORAM of `size` zero cells.
    pub fn new(size: usize, role: Role, party0_id: usize, party1_id: usize) -> Self {
        Self {
            memory: vec![T::default(); size],
            role,
            party0_id,
            party1_id,
            rng: AesRng::new(),
        }
    }

    fn party_id(&self, role: Role) -> usize {
        match role {
            Role::Alice => self.party0_id,
            Role::Bob => self.party1_id,
        }
    }

    /// Expands every value of the batch over all cells, most significant index bit first.
    ///
    /// Returns one batch per cell; cell `i` holds the value where the index equals `i`
    /// and zero elsewhere.
    async fn expand(
        &self,
        engine: &impl SecretBatchOps,
        index: &[SecretBatch<bool>],
        value: SecretBatch<T>,
    ) -> Result<Vec<SecretBatch<T>>, Error> {
        let batch_size = value.len();
        let mut cells = vec![value];
        for (level, bit) in index.iter().rev().enumerate() {
            let remaining = index.len() - 1 - level;
            let count = cells.len();
            let mut cells_iter = cells.into_iter();
            let candidates = match cells_iter.next() {
                Some(first) => first.batching_with(cells_iter),
                None => return Ok(vec![]),
            };
            let zero = engine.constant(&vec![T::default(); batch_size * count]);
            let (kept, moved) = engine
                .oblivious_swap(candidates, zero, &bit.repeat(count))
                .await?;
            let kept = kept.unbatching(&vec![batch_size; count])?;
            let moved = moved.unbatching(&vec![batch_size; count])?;
            cells = kept
                .into_iter()
                .zip(moved)
                .flat_map(|(left, right)| [left, right])
                .take(covering_len(self.memory.len(), remaining))
                .collect();
        }
        Ok(cells)
    }
}

impl<T: AdditiveGroup> WriteOnlyOram<T> for LinearOram<T> {
    fn size(&self) -> usize {
        self.memory.len()
    }

    async fn public_read(
        &self,
        engine: &impl SecretBatchOps,
        index: usize,
        receiver: Role,
    ) -> Result<T, Error> {
        check_index(index, self.memory.len())?;
        let share = self.memory[index];
        if self.role != receiver {
            send_to(engine.channel(), self.party_id(receiver), "ORAM read", &share).await?;
            Ok(T::default())
        } else {
            let other = match self.role {
                Role::Alice => self.party1_id,
                Role::Bob => self.party0_id,
            };
            let theirs: T = recv_from(engine.channel(), other, "ORAM read").await?;
            Ok(share.group_add(theirs))
        }
    }

    fn secret_read(&self, index: usize) -> Result<T, Error> {
        check_index(index, self.memory.len())?;
        Ok(self.memory[index])
    }

    #[instrument(level = Level::DEBUG, skip_all, fields(size = self.memory.len()), err)]
    async fn oblivious_add_batch(
        &mut self,
        engine: &impl SecretBatchOps,
        index_shares: &[Vec<bool>],
        value_shares: &[Vec<bool>],
    ) -> Result<(), Error> {
        let batch_size = check_add_batch::<T>(self.memory.len(), index_shares, value_shares)?;
        let size = self.memory.len();
        debug!(batch_size, width = index_shares.len(), "linear ORAM write");

        let index = index_shares
            .iter()
            .map(|row| engine.recover_shared(row))
            .collect::<Vec<SecretBatch<bool>>>();
        let value = engine.recover_shared_bits::<T>(value_shares.to_vec())?;
        let cells = self.expand(engine, &index, value).await?;
        let mut cells_iter = cells.into_iter();
        let Some(first) = cells_iter.next() else {
            return Ok(());
        };
        let expanded = first.batching_with(cells_iter);

        let masks: Vec<T> = match self.role {
            Role::Alice => (0..size * batch_size)
                .map(|_| T::from_key(self.rng.random()))
                .collect(),
            Role::Bob => vec![T::default(); size * batch_size],
        };
        let secret_masks = engine.input(&masks, self.party0_id).await?;
        let masked = engine.sub(&expanded, &secret_masks).await?;
        // Alice keeps the masks, Bob learns the masked values. Memory is only
        // touched once every round succeeded.
        let shares = engine
            .open_to_party(&masked, self.party1_id)
            .await?
            .unwrap_or(masks);
        for (cell, shares) in self.memory.iter_mut().zip(shares.chunks(batch_size)) {
            for share in shares {
                *cell = cell.group_add(*share);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{channel::SimpleChannel, engine::XorEngine};

    fn engines() -> (XorEngine<SimpleChannel>, XorEngine<SimpleChannel>) {
        let [ch0, ch1]: [SimpleChannel; 2] = SimpleChannel::channels(2)
            .try_into()
            .expect("parties is 2");
        let seed = rand::random();
        (
            XorEngine::with_shared_seed(ch0, 0, 1, seed),
            XorEngine::with_shared_seed(ch1, 1, 0, seed),
        )
    }

    #[tokio::test]
    async fn expansion_places_value_at_index() -> Result<(), Error> {
        let (e0, e1) = engines();
        let alice = LinearOram::<u8>::new(5, Role::Alice, 0, 1);
        let bob = LinearOram::<u8>::new(5, Role::Bob, 0, 1);
        // index 3 = 0b011, shared as (bits, zeros)
        let index0: Vec<SecretBatch<bool>> = [true, true, false]
            .iter()
            .map(|&b| SecretBatch::from_values(&[b]))
            .collect();
        let index1: Vec<SecretBatch<bool>> =
            (0..3).map(|_| SecretBatch::from_values(&[false])).collect();
        let value0 = SecretBatch::from_values(&[9_u8]);
        let value1 = SecretBatch::from_values(&[0_u8]);
        let (cells0, cells1) = tokio::try_join!(
            alice.expand(&e0, &index0, value0),
            bob.expand(&e1, &index1, value1)
        )?;
        assert_eq!(cells0.len(), 5);
        for (i, (c0, c1)) in cells0.iter().zip(&cells1).enumerate() {
            let (v, _) = tokio::try_join!(e0.reveal(c0), e1.reveal(c1))?;
            assert_eq!(v, vec![if i == 3 { 9 } else { 0 }]);
        }
        Ok(())
    }

    #[test]
    fn reads_check_bounds() {
        let oram = LinearOram::<u32>::new(4, Role::Bob, 0, 1);
        assert_eq!(oram.secret_read(3).unwrap(), 0);
        assert!(oram.secret_read(4).is_err());
        assert_eq!(oram.size(), 4);
    }
}
