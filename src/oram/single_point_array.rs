//! Two-party generation of single-point arrays by GGM tree expansion.
use rand::Rng;
use tracing::{Level, debug, instrument};

use crate::{
    block::Block,
    crypto::Expander,
    engine::SecretBatchOps,
    oram::{Error, ObliviousDeltaCalculator},
    utils::covering_len,
};

/// One party's share of a single-point array.
///
/// XORing the indicators of both parties yields `true` exactly at the secret
/// index. XORing the keys yields zero everywhere except at the secret index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinglePointArray {
    /// Shares of the indicator bits.
    pub indicators: Vec<bool>,
    /// Shares of the keys.
    pub keys: Vec<Block>,
}

impl SinglePointArray {
    /// Number of positions.
    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    /// Whether the array has no positions.
    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }
}

/// Generates single-point arrays at secret indices.
#[derive(Debug, Clone)]
pub struct SinglePointArrayGenerator {
    first_share: bool,
    delta_calculator: ObliviousDeltaCalculator,
}

impl SinglePointArrayGenerator {
    /// Creates a generator. The two parties must pass different `first_share`s.
    pub fn new(first_share: bool) -> Self {
        Self {
            first_share,
            delta_calculator: ObliviousDeltaCalculator,
        }
    }

    /// Generates one array of `length` positions per secret index.
    ///
    /// `index_shares[j]` holds this party's shares of bit `j` (least
    /// significant first) of every index in the batch. The tree is expanded
    /// from the most significant bit down, one delta calculation per level.
    #[instrument(level = Level::DEBUG, skip_all, fields(length = length), err)]
    pub async fn generate_single_point_arrays(
        &self,
        engine: &impl SecretBatchOps,
        index_shares: &[Vec<bool>],
        length: usize,
    ) -> Result<Vec<SinglePointArray>, Error> {
        let width = index_shares.len();
        let Some(first_row) = index_shares.first() else {
            return Err(Error::InvalidArgument("index input cannot be empty".into()));
        };
        let batch_size = first_row.len();
        if batch_size == 0 {
            return Err(Error::InvalidArgument("index batch cannot be empty".into()));
        }
        if width >= 64 {
            return Err(Error::InvalidArgument(format!(
                "index width {width} would overflow"
            )));
        }
        if index_shares.iter().any(|row| row.len() != batch_size) {
            return Err(Error::InvalidArgument("index input size is inconsistent".into()));
        }
        if length == 0 || length as u64 > 1_u64 << width {
            return Err(Error::InvalidArgument(format!(
                "cannot cover {length} positions with {width} index bits"
            )));
        }
        debug!(width, batch_size, "expanding GGM trees");

        let mut arrays: Vec<SinglePointArray> = {
            let mut rng = rand::rng();
            (0..batch_size)
                .map(|_| SinglePointArray {
                    indicators: vec![self.first_share],
                    keys: vec![rng.random()],
                })
                .collect()
        };

        let expander = Expander::fixed();
        for level in 0..width {
            let remaining = width - 1 - level;
            let children: Vec<Vec<Block>> = arrays
                .iter()
                .map(|array| expander.expand(&array.keys))
                .collect();
            let (delta0, delta1): (Vec<Block>, Vec<Block>) = children
                .iter()
                .map(|keys| {
                    keys.chunks_exact(2).fold((Block::ZERO, Block::ZERO), |(d0, d1), pair| {
                        (d0 ^ pair[0], d1 ^ pair[1])
                    })
                })
                .unzip();
            let (delta, t0, t1) = self
                .delta_calculator
                .calculate_delta(engine, &delta0, &delta1, &index_shares[remaining])
                .await?;

            let target_len = covering_len(length, remaining);
            for (e, (array, mut keys)) in arrays.iter_mut().zip(children).enumerate() {
                let mut indicators = Vec::with_capacity(keys.len());
                for (parent, pair) in array.indicators.iter().zip(keys.chunks_exact_mut(2)) {
                    let (mut left, mut right) = (pair[0].lsb(), pair[1].lsb());
                    if *parent {
                        left ^= t0[e];
                        right ^= t1[e];
                        pair[0] ^= delta[e];
                        pair[1] ^= delta[e];
                    }
                    indicators.push(left);
                    indicators.push(right);
                }
                indicators.truncate(target_len);
                keys.truncate(target_len);
                array.indicators = indicators;
                array.keys = keys;
            }
        }
        Ok(arrays)
    }
}
