//! Boolean multiplication (Beaver) triples.
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::utils::{packed_len, unpack_bits};

/// This party's shares of `count` random triples with `c = a & b`.
#[derive(Debug, Clone, Default)]
pub struct BooleanTuples {
    /// Shares of the first factors.
    pub a: Vec<bool>,
    /// Shares of the second factors.
    pub b: Vec<bool>,
    /// Shares of the products.
    pub c: Vec<bool>,
}

/// A source of correlated randomness for AND gates.
///
/// Both parties must request the same counts in the same order.
pub trait TupleGenerator {
    /// Produces this party's shares of `count` fresh triples.
    fn and_tuples(&mut self, count: usize) -> BooleanTuples;
}

/// Deals triples from a seed known to both parties.
///
/// Each party can compute the other party's shares, so this generator is
/// only suitable for tests and benchmarks.
#[derive(Debug, Clone)]
pub struct SharedSeedTupleGenerator {
    rng: ChaCha20Rng,
    first: bool,
}

impl SharedSeedTupleGenerator {
    /// Creates a generator. The two parties must use the same seed and
    /// different values for `first`.
    pub fn new(seed: [u8; 32], first: bool) -> Self {
        Self {
            rng: ChaCha20Rng::from_seed(seed),
            first,
        }
    }
}

impl TupleGenerator for SharedSeedTupleGenerator {
    fn and_tuples(&mut self, count: usize) -> BooleanTuples {
        let words = packed_len(count);
        let (mut a, mut b, mut c) = (
            Vec::with_capacity(words),
            Vec::with_capacity(words),
            Vec::with_capacity(words),
        );
        for _ in 0..words {
            let a0 = self.rng.next_u64();
            let b0 = self.rng.next_u64();
            let c0 = self.rng.next_u64();
            let a1 = self.rng.next_u64();
            let b1 = self.rng.next_u64();
            let c1 = ((a0 ^ a1) & (b0 ^ b1)) ^ c0;
            let (mine_a, mine_b, mine_c) = if self.first {
                (a0, b0, c0)
            } else {
                (a1, b1, c1)
            };
            a.push(mine_a);
            b.push(mine_b);
            c.push(mine_c);
        }
        BooleanTuples {
            a: unpack_bits(&a, count),
            b: unpack_bits(&b, count),
            c: unpack_bits(&c, count),
        }
    }
}
