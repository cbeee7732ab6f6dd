//! Write-only oblivious RAM for two parties.
//!
//! A write-only ORAM stores additively shared values and supports adding a
//! secret value at a secret index without revealing the index. Reads are only
//! possible at public indices.
//!
//! Two implementations share the [`WriteOnlyOram`] interface:
//!
//! * [`LinearOram`] expands every value over all cells with oblivious swaps,
//!   costing `O(size)` communication per element,
//! * [`PointFunctionOram`] builds GGM single-point arrays, costing
//!   `O(log size)` communication and `O(size)` local work per element.
use std::future::Future;

use thiserror::Error;

use crate::{
    channel, engine,
    engine::{AdditiveGroup, SecretBatchOps},
};

mod delta_calculator;
mod difference_calculator;
mod linear_oram;
mod point_function_oram;
mod single_point_array;

pub use delta_calculator::{DeltaOutput, ObliviousDeltaCalculator};
pub use difference_calculator::DifferenceCalculator;
pub use linear_oram::LinearOram;
pub use point_function_oram::PointFunctionOram;
pub use single_point_array::{SinglePointArray, SinglePointArrayGenerator};

/// Errors raised by the ORAM gadgets.
#[derive(Debug, Error)]
pub enum Error {
    /// The inputs violate a precondition. Raised before any communication.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A public index is outside of the memory.
    #[error("ORAM index {index} is out of range for size {size}")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The size of the ORAM.
        size: usize,
    },
    /// The substrate failed.
    #[error(transparent)]
    Engine(#[from] engine::Error),
    /// An error occurred while trying to communicate over the channel.
    #[error(transparent)]
    Channel(#[from] channel::Error),
}

/// The fixed role of a party in the ORAM protocols.
///
/// Alice is the party with id `party0_id`; she draws the masks that turn a
/// secret value into shares. Bob receives the masked differences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The party with id `party0_id`.
    Alice,
    /// The party with id `party1_id`.
    Bob,
}

/// A write-only ORAM over an additive group.
pub trait WriteOnlyOram<T: AdditiveGroup> {
    /// Number of cells.
    fn size(&self) -> usize;

    /// Reconstructs the value at a public index for `receiver`. The other
    /// party gets `T::default()`.
    fn public_read(
        &self,
        engine: &impl SecretBatchOps,
        index: usize,
        receiver: Role,
    ) -> impl Future<Output = Result<T, Error>>;

    /// This party's share of the value at a public index, without communication.
    ///
    /// The shares of both parties add up to the stored value.
    fn secret_read(&self, index: usize) -> Result<T, Error>;

    /// Obliviously adds a batch of secret values at secret indices.
    ///
    /// `index_shares[j]` holds the XOR shares of bit `j` (least significant
    /// first) of every index, `value_shares[i]` the XOR shares of bit `i` of
    /// every value.
    fn oblivious_add_batch(
        &mut self,
        engine: &impl SecretBatchOps,
        index_shares: &[Vec<bool>],
        value_shares: &[Vec<bool>],
    ) -> impl Future<Output = Result<(), Error>>;
}

/// Validates the inputs of an `oblivious_add_batch` call, returning the batch size.
pub(crate) fn check_add_batch<T: AdditiveGroup>(
    size: usize,
    index_shares: &[Vec<bool>],
    value_shares: &[Vec<bool>],
) -> Result<usize, Error> {
    let width = index_shares.len();
    if width == 0 || value_shares.is_empty() {
        return Err(Error::InvalidArgument("input cannot be empty".into()));
    }
    if width >= 64 {
        return Err(Error::InvalidArgument(format!(
            "index width {width} would overflow"
        )));
    }
    if (1_u64 << width) < size as u64 {
        return Err(Error::InvalidArgument(format!(
            "{width} index bits cannot address {size} cells"
        )));
    }
    if value_shares.len() != T::WIDTH {
        return Err(Error::InvalidArgument(format!(
            "expected {} value bit rows, got {}",
            T::WIDTH,
            value_shares.len()
        )));
    }
    let batch_size = index_shares[0].len();
    if batch_size == 0 {
        return Err(Error::InvalidArgument("input batch cannot be empty".into()));
    }
    if index_shares
        .iter()
        .chain(value_shares)
        .any(|row| row.len() != batch_size)
    {
        return Err(Error::InvalidArgument("input size is inconsistent".into()));
    }
    Ok(batch_size)
}

/// Checks a public index against the size of the memory.
pub(crate) fn check_index(index: usize, size: usize) -> Result<(), Error> {
    if index < size {
        Ok(())
    } else {
        Err(Error::IndexOutOfRange { index, size })
    }
}
