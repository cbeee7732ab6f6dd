//! A write-only ORAM built from single-point arrays.
use tracing::{Level, debug, instrument};

use crate::{
    channel::{recv_from, send_to},
    engine::{AdditiveGroup, SecretBatchOps},
    oram::{
        DifferenceCalculator, Error, Role, SinglePointArrayGenerator, WriteOnlyOram,
        check_add_batch, check_index,
    },
};

/// A write-only ORAM whose writes cost `O(log size)` rounds of communication.
///
/// The memory is shared subtractively: the stored value is Alice's share minus
/// Bob's share. Each write derives a mask per cell from the keys of a
/// single-point array; the masks of both parties agree everywhere except at
/// the secret index, where a jointly computed correction turns the mask
/// difference into the written value.
pub struct PointFunctionOram<T> {
    memory: Vec<T>,
    role: Role,
    party0_id: usize,
    party1_id: usize,
    generator: SinglePointArrayGenerator,
    calculator: DifferenceCalculator,
}

impl<T: AdditiveGroup> PointFunctionOram<T> {
    /// Creates an ORAM of `size` zero cells.
    pub fn new(size: usize, role: Role, party0_id: usize, party1_id: usize) -> Self {
        Self {
            memory: vec![T::default(); size],
            role,
            party0_id,
            party1_id,
            generator: SinglePointArrayGenerator::new(role == Role::Alice),
            calculator: DifferenceCalculator::new(party0_id, party1_id),
        }
    }

    fn signed(&self, share: T) -> T {
        match self.role {
            Role::Alice => share,
            Role::Bob => share.group_neg(),
        }
    }
}

impl<T: AdditiveGroup> WriteOnlyOram<T> for PointFunctionOram<T> {
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
        let (me, other) = match self.role {
            Role::Alice => (self.party0_id, self.party1_id),
            Role::Bob => (self.party1_id, self.party0_id),
        };
        if self.role != receiver {
            send_to(engine.channel(), other, "ORAM read", &share).await?;
            Ok(T::default())
        } else {
            debug!(party = me, index, "reading ORAM cell");
            let theirs: T = recv_from(engine.channel(), other, "ORAM read").await?;
            Ok(self.signed(share.group_sub(theirs)))
        }
    }

    fn secret_read(&self, index: usize) -> Result<T, Error> {
        check_index(index, self.memory.len())?;
        Ok(self.signed(self.memory[index]))
    }

    #[instrument(level = Level::DEBUG, skip_all, fields(size = self.memory.len()), err)]
    async fn oblivious_add_batch(
        &mut self,
        engine: &impl SecretBatchOps,
        index_shares: &[Vec<bool>],
        value_shares: &[Vec<bool>],
    ) -> Result<(), Error> {
        let size = self.memory.len();
        let batch_size = check_add_batch::<T>(size, index_shares, value_shares)?;
        let arrays = self
            .generator
            .generate_single_point_arrays(engine, index_shares, size)
            .await?;

        let mut masks = Vec::with_capacity(batch_size);
        let mut indicator_sums = Vec::with_capacity(batch_size);
        let mut mask_sums = Vec::with_capacity(batch_size);
        for array in &arrays {
            let element_masks: Vec<T> = array.keys.iter().map(|key| T::from_key(*key)).collect();
            indicator_sums.push(
                array
                    .indicators
                    .iter()
                    .fold(0_u8, |sum, &bit| sum.wrapping_add(u8::from(bit))),
            );
            mask_sums.push(
                element_masks
                    .iter()
                    .fold(T::default(), |sum, mask| sum.group_add(*mask)),
            );
            masks.push(element_masks);
        }
        let corrections = self
            .calculator
            .calculate_difference_batch(engine, &indicator_sums, value_shares, &mask_sums)
            .await?;

        for ((array, element_masks), correction) in arrays.iter().zip(masks).zip(corrections) {
            for ((cell, mask), &indicator) in self
                .memory
                .iter_mut()
                .zip(element_masks)
                .zip(&array.indicators)
            {
                *cell = cell.group_add(mask);
                if indicator {
                    *cell = cell.group_add(correction);
                }
            }
        }
        Ok(())
    }
}
