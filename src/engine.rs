//! The secret-sharing substrate the oblivious gadgets are built from.
//!
//! [`SecretBatchOps`] is the capability every gadget of this crate consumes:
//! secret inputs, AND layers and openings are required, while swaps and
//! subtraction are derived from them. [`XorEngine`] implements it over XOR
//! shares with Beaver triples.

use std::future::Future;

use crate::{
    channel::{self, Channel},
    utils::xor_inplace,
};

mod plaintext;
mod secret_batch;
mod tuples;
mod xor_engine;

pub use plaintext::{AdditiveGroup, Plaintext};
pub use secret_batch::SecretBatch;
pub use tuples::{BooleanTuples, SharedSeedTupleGenerator, TupleGenerator};
pub use xor_engine::XorEngine;

/// Errors raised by the substrate.
#[derive(Debug)]
pub enum Error {
    /// Two batches (or a batch and a plaintext vector) differ in length.
    SizeMismatch {
        /// The expected number of values.
        expected: usize,
        /// The number of values that were provided.
        actual: usize,
    },
    /// The number of bit rows does not match the width of the plaintext type.
    WidthMismatch {
        /// The width of the plaintext type.
        expected: usize,
        /// The number of rows that were provided or requested.
        actual: usize,
    },
    /// The party id is neither this party nor its peer.
    UnknownParty(usize),
    /// An error occurred while trying to communicate over the channel.
    Channel(channel::Error),
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::SizeMismatch { expected, actual } => {
                write!(f, "Expected {expected} values, but got {actual}")
            }
            Error::WidthMismatch { expected, actual } => {
                write!(f, "Expected {expected} bit rows, but got {actual}")
            }
            Error::UnknownParty(p) => write!(f, "Party {p} does not take part in the protocol"),
            Error::Channel(e) => write!(f, "Channel error: {e}"),
        }
    }
}

impl From<channel::Error> for Error {
    fn from(e: channel::Error) -> Self {
        Error::Channel(e)
    }
}

/// Operations on batches of secret-shared values between two parties.
///
/// All asynchronous operations communicate with the peer and must be called
/// by both parties in the same order with batches of the same lengths.
pub trait SecretBatchOps {
    /// The channel used to talk to the peer.
    type Channel: Channel;

    /// The id of this party.
    fn my_id(&self) -> usize;

    /// The id of the other party.
    fn peer_id(&self) -> usize;

    /// The channel to the peer, for gadgets that exchange plaintext shares.
    fn channel(&self) -> &Self::Channel;

    /// Whether this party holds the public part of constants.
    fn is_first(&self) -> bool {
        self.my_id() < self.peer_id()
    }

    /// Secret shares the `values` of `owner`.
    ///
    /// The other party passes placeholder values of the same length; only the
    /// length is read.
    fn input<T: Plaintext>(
        &self,
        values: &[T],
        owner: usize,
    ) -> impl Future<Output = Result<SecretBatch<T>, Error>>;

    /// Element-wise AND of two secret bit vectors, in one round.
    fn and(&self, x: &[bool], y: &[bool]) -> impl Future<Output = Result<Vec<bool>, Error>>;

    /// Reveals the batch to `party`, who receives `Some(values)`. The other
    /// party learns nothing and receives `None`.
    fn open_to_party<T: Plaintext>(
        &self,
        secret: &SecretBatch<T>,
        party: usize,
    ) -> impl Future<Output = Result<Option<Vec<T>>, Error>>;

    /// Reveals the batch to both parties.
    fn reveal<T: Plaintext>(
        &self,
        secret: &SecretBatch<T>,
    ) -> impl Future<Output = Result<Vec<T>, Error>>;

    /// Treats this party's local values as its XOR shares of a batch.
    fn recover_shared<T: Plaintext>(&self, shares: &[T]) -> SecretBatch<T> {
        SecretBatch::from_values(shares)
    }

    /// Treats bit rows (row `i` holds bit `i` of every value) as this party's
    /// XOR shares of a batch.
    fn recover_shared_bits<T: Plaintext>(
        &self,
        rows: Vec<Vec<bool>>,
    ) -> Result<SecretBatch<T>, Error> {
        SecretBatch::from_rows(rows)
    }

    /// A sharing of public values.
    fn constant<T: Plaintext>(&self, values: &[T]) -> SecretBatch<T> {
        if self.is_first() {
            SecretBatch::from_values(values)
        } else {
            SecretBatch::zeros(values.len())
        }
    }

    /// Bitwise negation, without communication.
    fn not<T: Plaintext>(&self, a: SecretBatch<T>) -> SecretBatch<T> {
        if self.is_first() { a.flip() } else { a }
    }

    /// Returns `(x, y)` with `x = c ? b : a` and `y = c ? a : b`, in one round.
    fn oblivious_swap<T: Plaintext>(
        &self,
        a: SecretBatch<T>,
        b: SecretBatch<T>,
        c: &SecretBatch<bool>,
    ) -> impl Future<Output = Result<(SecretBatch<T>, SecretBatch<T>), Error>> {
        async move {
            let n = a.len();
            for len in [b.len(), c.len()] {
                if len != n {
                    return Err(Error::SizeMismatch {
                        expected: n,
                        actual: len,
                    });
                }
            }
            let diff = a.xor(&b).flatten();
            let selector = c.flatten().repeat(T::WIDTH);
            let t = SecretBatch::from_flat(self.and(&diff, &selector).await?, n)?;
            Ok((a.xor(&t), b.xor(&t)))
        }
    }

    /// Wrapping subtraction `a - b`, lane by lane.
    ///
    /// Uses a ripple-carry adder on `a + !b + 1`, one round per bit of the
    /// widest lane.
    fn sub<T: AdditiveGroup>(
        &self,
        a: &SecretBatch<T>,
        b: &SecretBatch<T>,
    ) -> impl Future<Output = Result<SecretBatch<T>, Error>> {
        async move {
            let n = a.len();
            if b.len() != n {
                return Err(Error::SizeMismatch {
                    expected: n,
                    actual: b.len(),
                });
            }
            if n == 0 {
                return Ok(SecretBatch::zeros(0));
            }
            let negated = self.not(b.clone());
            let (a_rows, b_rows) = (a.rows(), negated.rows());
            let mut lanes = vec![];
            let mut start = 0;
            for width in T::lane_widths() {
                lanes.push((start, width));
                start += width;
            }
            let mut carries = vec![vec![self.is_first(); n]; lanes.len()];
            let mut out = vec![vec![]; T::WIDTH];
            let max_width = lanes.iter().map(|&(_, w)| w).max().unwrap_or(0);
            for i in 0..max_width {
                let (mut xs, mut ys, mut pending) = (vec![], vec![], vec![]);
                for (lane, &(start, width)) in lanes.iter().enumerate() {
                    if i >= width {
                        continue;
                    }
                    let row = start + i;
                    let carry = &carries[lane];
                    let mut a_c = a_rows[row].clone();
                    xor_inplace(&mut a_c, carry);
                    let mut b_c = b_rows[row].clone();
                    xor_inplace(&mut b_c, carry);
                    let mut sum = a_c.clone();
                    xor_inplace(&mut sum, &b_rows[row]);
                    out[row] = sum;
                    if i + 1 < width {
                        xs.extend(a_c);
                        ys.extend(b_c);
                        pending.push(lane);
                    }
                }
                if pending.is_empty() {
                    continue;
                }
                let products = self.and(&xs, &ys).await?;
                for (&lane, product) in pending.iter().zip(products.chunks(n)) {
                    xor_inplace(&mut carries[lane], product);
                }
            }
            SecretBatch::from_rows(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{block::Block, channel::SimpleChannel};

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

    async fn share<T: Plaintext>(
        e0: &XorEngine<SimpleChannel>,
        e1: &XorEngine<SimpleChannel>,
        values: &[T],
    ) -> (SecretBatch<T>, SecretBatch<T>) {
        let placeholder = vec![T::default(); values.len()];
        tokio::try_join!(e0.input(values, 0), e1.input(&placeholder, 0)).unwrap()
    }

    #[tokio::test]
    async fn input_and_reveal() -> Result<(), Error> {
        let (e0, e1) = engines();
        let values = [3_u32, 0, u32::MAX, 42];
        let placeholder = [0_u32; 4];
        let (s0, s1) = tokio::try_join!(e0.input(&placeholder, 1), e1.input(&values, 1))?;
        assert_ne!(s1.values(), values.to_vec());
        let (r0, r1) = tokio::try_join!(e0.reveal(&s0), e1.reveal(&s1))?;
        assert_eq!(r0, values.to_vec());
        assert_eq!(r1, values.to_vec());
        Ok(())
    }

    #[tokio::test]
    async fn open_to_one_party() -> Result<(), Error> {
        let (e0, e1) = engines();
        let values = [Block::from(7_u128), Block::ONES];
        let (s0, s1) = share(&e0, &e1, &values).await;
        let (o0, o1) = tokio::try_join!(e0.open_to_party(&s0, 1), e1.open_to_party(&s1, 1))?;
        assert_eq!(o0, None);
        assert_eq!(o1, Some(values.to_vec()));
        Ok(())
    }

    #[tokio::test]
    async fn and_gates() -> Result<(), Error> {
        let (e0, e1) = engines();
        let x = [false, false, true, true];
        let y = [false, true, false, true];
        let (x0, x1) = share(&e0, &e1, &x).await;
        let (y0, y1) = share(&e0, &e1, &y).await;
        let (x0, y0) = (x0.flatten(), y0.flatten());
        let (x1, y1) = (x1.flatten(), y1.flatten());
        let (z0, z1) = tokio::try_join!(e0.and(&x0, &y0), e1.and(&x1, &y1))?;
        let z: Vec<bool> = z0.iter().zip(&z1).map(|(a, b)| a ^ b).collect();
        assert_eq!(z, vec![false, false, false, true]);
        Ok(())
    }

    #[tokio::test]
    async fn swap_conservation() -> Result<(), Error> {
        let (e0, e1) = engines();
        let a = [1_u32, 2, 3, 4];
        let b = [10_u32, 20, 30, 40];
        let c = [false, true, false, true];
        let (a0, a1) = share(&e0, &e1, &a).await;
        let (b0, b1) = share(&e0, &e1, &b).await;
        let (c0, c1) = share(&e0, &e1, &c).await;
        let ((x0, y0), (x1, y1)) = tokio::try_join!(
            e0.oblivious_swap(a0, b0, &c0),
            e1.oblivious_swap(a1, b1, &c1)
        )?;
        let (x, _) = tokio::try_join!(e0.reveal(&x0), e1.reveal(&x1))?;
        let (y, _) = tokio::try_join!(e0.reveal(&y0), e1.reveal(&y1))?;
        for i in 0..a.len() {
            assert_eq!(x[i], if c[i] { b[i] } else { a[i] });
            assert_eq!(y[i], a[i] ^ b[i] ^ x[i]);
        }
        Ok(())
    }

    #[tokio::test]
    async fn subtraction_wraps_per_lane() -> Result<(), Error> {
        let (e0, e1) = engines();
        let a = [(5_u8, 100_u32), (0, 0), (255, 7)];
        let b = [(7_u8, 1_u32), (1, 1), (255, 8)];
        let (a0, a1) = share(&e0, &e1, &a).await;
        let (b0, b1) = share(&e0, &e1, &b).await;
        let (d0, d1) = tokio::try_join!(e0.sub(&a0, &b0), e1.sub(&a1, &b1))?;
        let (d, _) = tokio::try_join!(e0.reveal(&d0), e1.reveal(&d1))?;
        let expected: Vec<_> = a.iter().zip(&b).map(|(a, b)| a.group_sub(*b)).collect();
        assert_eq!(d, expected);
        Ok(())
    }

    #[tokio::test]
    async fn constants_and_not() -> Result<(), Error> {
        let (e0, e1) = engines();
        let c0 = e0.not(e0.constant(&[0b1010_u8]));
        let c1 = e1.not(e1.constant(&[0b1010_u8]));
        let (v, _) = tokio::try_join!(e0.reveal(&c0), e1.reveal(&c1))?;
        assert_eq!(v, vec![!0b1010_u8]);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_party_is_rejected() {
        let (e0, _e1) = engines();
        let err = e0.input(&[true], 7).await.unwrap_err();
        assert!(matches!(err, Error::UnknownParty(7)));
    }
}
