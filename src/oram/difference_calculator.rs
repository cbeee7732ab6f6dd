//! Signed differences between a XOR-shared and a subtractively shared value.
use tracing::{Level, instrument};

use crate::{
    engine::{AdditiveGroup, SecretBatchOps},
    oram::Error,
};

/// Computes `s * (minuend - subtrahend)` for every element of a batch.
///
/// * `minuend` is XOR-shared bit by bit,
/// * `subtrahend = subtrahend_0 - subtrahend_1` is shared subtractively,
/// * `s = indicator_0 - indicator_1` (wrapping, 8 bits) must be `1` or `-1`.
///
/// Index `0` refers to the party with id `party0_id`. Both parties learn the
/// result.
#[derive(Debug, Clone)]
pub struct DifferenceCalculator {
    party0_id: usize,
    party1_id: usize,
}

impl DifferenceCalculator {
    /// Creates a calculator for the given parties.
    pub fn new(party0_id: usize, party1_id: usize) -> Self {
        Self {
            party0_id,
            party1_id,
        }
    }

    /// Computes the signed differences of a batch.
    #[instrument(level = Level::DEBUG, skip_all, fields(batch_size = indicator_shares.len()), err)]
    pub async fn calculate_difference_batch<T: AdditiveGroup>(
        &self,
        engine: &impl SecretBatchOps,
        indicator_shares: &[u8],
        minuend_shares: &[Vec<bool>],
        subtrahend_shares: &[T],
    ) -> Result<Vec<T>, Error> {
        let n = indicator_shares.len();
        if subtrahend_shares.len() != n {
            return Err(Error::InvalidArgument(format!(
                "{} subtrahends for {n} indicators",
                subtrahend_shares.len()
            )));
        }
        if minuend_shares.len() != T::WIDTH || minuend_shares.iter().any(|row| row.len() != n) {
            return Err(Error::InvalidArgument(
                "minuend shares do not match the batch".into(),
            ));
        }
        let minuend = engine.recover_shared_bits::<T>(minuend_shares.to_vec())?;

        // Each party inputs its (indicator, subtrahend) pair, only the
        // owner's values are read.
        let mine: Vec<(u8, T)> = indicator_shares
            .iter()
            .copied()
            .zip(subtrahend_shares.iter().copied())
            .collect();
        let from_party0 = engine.input(&mine, self.party0_id).await?;
        let from_party1 = engine.input(&mine, self.party1_id).await?;
        let (indicator, subtrahend) = engine.sub(&from_party0, &from_party1).await?.unpair();
        let negative = indicator.bit(u8::BITS as usize - 1)?;

        let (minuend, subtrahend) = engine
            .oblivious_swap(minuend, subtrahend, &negative)
            .await?;
        let difference = engine.sub(&minuend, &subtrahend).await?;
        Ok(engine.reveal(&difference).await?)
    }
}
