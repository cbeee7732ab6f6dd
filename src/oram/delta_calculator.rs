//! Correction words for one level of a two-party GGM tree.
use tracing::{Level, instrument};

use crate::{
    block::Block,
    engine::SecretBatchOps,
    oram::Error,
};

/// Computes the GGM correction word of a level from XOR-shared inputs.
///
/// For every element, given shares of the two candidate words `delta0`,
/// `delta1` and of the index bit `alpha`, both parties learn
///
/// * `delta = alpha ? delta0 : delta1`, the correction for the child that
///   leaves the path to the secret index,
/// * `t0 = lsb(delta0) ^ !alpha` and `t1 = lsb(delta1) ^ alpha`.
///
/// Nothing else about the inputs is opened.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObliviousDeltaCalculator;

/// The public outputs of [`ObliviousDeltaCalculator::calculate_delta`].
pub type DeltaOutput = (Vec<Block>, Vec<bool>, Vec<bool>);

impl ObliviousDeltaCalculator {
    /// Computes `(delta, t0, t1)` for a batch, in a single opening round.
    #[instrument(level = Level::DEBUG, skip_all, fields(batch_size = alpha_shares.len()), err)]
    pub async fn calculate_delta(
        &self,
        engine: &impl SecretBatchOps,
        delta0_shares: &[Block],
        delta1_shares: &[Block],
        alpha_shares: &[bool],
    ) -> Result<DeltaOutput, Error> {
        if delta0_shares.len() != delta1_shares.len() || delta0_shares.len() != alpha_shares.len()
        {
            return Err(Error::InvalidArgument(format!(
                "delta calculator inputs differ in size: {}, {} and {}",
                delta0_shares.len(),
                delta1_shares.len(),
                alpha_shares.len()
            )));
        }
        if alpha_shares.is_empty() {
            return Ok((vec![], vec![], vec![]));
        }
        let delta0 = engine.recover_shared(delta0_shares);
        let delta1 = engine.recover_shared(delta1_shares);
        let alpha = engine.recover_shared(alpha_shares);

        let t0 = delta0.bit(0)?.xor(&engine.not(alpha.clone()));
        let t1 = delta1.bit(0)?.xor(&alpha);
        let (delta, _) = engine.oblivious_swap(delta1, delta0, &alpha).await?;

        let opened = engine.reveal(&delta.pair(t0.pair(t1)?)?).await?;
        let mut deltas = Vec::with_capacity(opened.len());
        let mut t0 = Vec::with_capacity(opened.len());
        let mut t1 = Vec::with_capacity(opened.len());
        for (delta, (b0, b1)) in opened {
            deltas.push(delta);
            t0.push(b0);
            t1.push(b1);
        }
        Ok((deltas, t0, t1))
    }
}
