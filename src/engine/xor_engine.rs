//! A boolean XOR-sharing engine for two parties.
use std::sync::{Mutex, PoisonError};

use rand::RngCore;
use tracing::trace;

use crate::{
    channel::{self, Channel, recv_from, recv_vec_from, send_to},
    crypto::AesRng,
    engine::{
        Error, Plaintext, SecretBatch, SecretBatchOps, SharedSeedTupleGenerator, TupleGenerator,
    },
    utils::{pack_bits, packed_len, unpack_bits},
};

/// Evaluates the substrate operations over XOR shares, one AND layer per round.
///
/// The channel, the tuple generator and the local randomness are owned by the
/// engine. Operations must be awaited in the same order by both parties.
pub struct XorEngine<C, G = SharedSeedTupleGenerator> {
    channel: C,
    my_id: usize,
    peer_id: usize,
    tuples: Mutex<G>,
    rng: Mutex<AesRng>,
}

impl<C: Channel, G: TupleGenerator> XorEngine<C, G> {
    /// Creates an engine for party `my_id`, talking to `peer_id` over `channel`.
    pub fn new(channel: C, my_id: usize, peer_id: usize, tuples: G) -> Self {
        Self {
            channel,
            my_id,
            peer_id,
            tuples: Mutex::new(tuples),
            rng: Mutex::new(AesRng::new()),
        }
    }

    /// Consumes the engine, returning its channel.
    pub fn into_channel(self) -> C {
        self.channel
    }

    fn random_bits(&self, count: usize) -> Vec<bool> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let words: Vec<u64> = (0..packed_len(count)).map(|_| rng.next_u64()).collect();
        unpack_bits(&words, count)
    }

    async fn recv_bits(&self, phase: &str, count: usize) -> Result<Vec<bool>, Error> {
        let words: Vec<u64> =
            recv_vec_from(&self.channel, self.peer_id, phase, packed_len(count)).await?;
        Ok(unpack_bits(&words, count))
    }

    fn check_party(&self, party: usize) -> Result<(), Error> {
        if party == self.my_id || party == self.peer_id {
            Ok(())
        } else {
            Err(Error::UnknownParty(party))
        }
    }
}

impl<C: Channel> XorEngine<C, SharedSeedTupleGenerator> {
    /// Creates an engine whose triples are dealt from a seed shared with the peer.
    ///
    /// Insecure, see [`SharedSeedTupleGenerator`].
    pub fn with_shared_seed(channel: C, my_id: usize, peer_id: usize, seed: [u8; 32]) -> Self {
        let tuples = SharedSeedTupleGenerator::new(seed, my_id < peer_id);
        Self::new(channel, my_id, peer_id, tuples)
    }
}

impl<C: Channel, G: TupleGenerator> SecretBatchOps for XorEngine<C, G> {
    type Channel = C;

    fn my_id(&self) -> usize {
        self.my_id
    }

    fn peer_id(&self) -> usize {
        self.peer_id
    }

    fn channel(&self) -> &C {
        &self.channel
    }

    async fn input<T: Plaintext>(
        &self,
        values: &[T],
        owner: usize,
    ) -> Result<SecretBatch<T>, Error> {
        self.check_party(owner)?;
        let len = values.len();
        let count = T::WIDTH * len;
        if owner == self.my_id {
            let mask = self.random_bits(count);
            send_to(&self.channel, self.peer_id, "input mask", &pack_bits(&mask)).await?;
            let mask = SecretBatch::from_flat(mask, len)?;
            Ok(SecretBatch::from_values(values).xor(&mask))
        } else {
            let mask = self.recv_bits("input mask", count).await?;
            SecretBatch::from_flat(mask, len)
        }
    }

    async fn and(&self, x: &[bool], y: &[bool]) -> Result<Vec<bool>, Error> {
        if x.len() != y.len() {
            return Err(Error::SizeMismatch {
                expected: x.len(),
                actual: y.len(),
            });
        }
        let n = x.len();
        if n == 0 {
            return Ok(vec![]);
        }
        trace!(gates = n, "AND layer");
        let tuples = self
            .tuples
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .and_tuples(n);
        let d: Vec<bool> = x.iter().zip(&tuples.a).map(|(x, a)| x ^ a).collect();
        let e: Vec<bool> = y.iter().zip(&tuples.b).map(|(y, b)| y ^ b).collect();
        let phase = "beaver openings";
        send_to(&self.channel, self.peer_id, phase, &(pack_bits(&d), pack_bits(&e))).await?;
        let (their_d, their_e): (Vec<u64>, Vec<u64>) =
            recv_from(&self.channel, self.peer_id, phase).await?;
        if their_d.len() != packed_len(n) || their_e.len() != packed_len(n) {
            return Err(channel::Error {
                phase: phase.to_string(),
                reason: channel::ErrorKind::InvalidLength,
            }
            .into());
        }
        let their_d = unpack_bits(&their_d, n);
        let their_e = unpack_bits(&their_e, n);
        let first = self.is_first();
        let z = (0..n)
            .map(|i| {
                let d = d[i] ^ their_d[i];
                let e = e[i] ^ their_e[i];
                tuples.c[i] ^ (d & tuples.b[i]) ^ (e & tuples.a[i]) ^ (first & d & e)
            })
            .collect();
        Ok(z)
    }

    async fn open_to_party<T: Plaintext>(
        &self,
        secret: &SecretBatch<T>,
        party: usize,
    ) -> Result<Option<Vec<T>>, Error> {
        self.check_party(party)?;
        let mine = secret.flatten();
        if party == self.my_id {
            let theirs = self.recv_bits("opening", mine.len()).await?;
            let theirs = SecretBatch::<T>::from_flat(theirs, secret.len())?;
            Ok(Some(secret.xor(&theirs).values()))
        } else {
            send_to(&self.channel, self.peer_id, "opening", &pack_bits(&mine)).await?;
            Ok(None)
        }
    }

    async fn reveal<T: Plaintext>(&self, secret: &SecretBatch<T>) -> Result<Vec<T>, Error> {
        let mine = secret.flatten();
        send_to(&self.channel, self.peer_id, "reveal", &pack_bits(&mine)).await?;
        let theirs = self.recv_bits("reveal", mine.len()).await?;
        let theirs = SecretBatch::<T>::from_flat(theirs, secret.len())?;
        Ok(secret.xor(&theirs).values())
    }
}
