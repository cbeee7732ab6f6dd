#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use oblivious_2pc::{
    channel::{AsyncRecvError, AsyncSendError, Channel, SimpleChannel},
    engine::{self, Plaintext, SecretBatch, SecretBatchOps, XorEngine},
};
use rand::Rng;
use tracing_subscriber::EnvFilter;

pub type Engine = XorEngine<SimpleChannel>;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Two engines talking to each other, party 0 first.
pub fn engines() -> (Engine, Engine) {
    init_tracing();
    let [ch0, ch1]: [SimpleChannel; 2] = SimpleChannel::channels(2)
        .try_into()
        .expect("parties is 2");
    let seed = rand::random();
    (
        XorEngine::with_shared_seed(ch0, 0, 1, seed),
        XorEngine::with_shared_seed(ch1, 1, 0, seed),
    )
}

/// A [`SimpleChannel`] that counts its sends and fails once `send_limit` is reached.
pub struct CountingChannel {
    inner: SimpleChannel,
    sends: AtomicUsize,
    send_limit: usize,
}

impl CountingChannel {
    /// Number of messages sent so far, one per round this party speaks in.
    pub fn sends(&self) -> usize {
        self.sends.load(Ordering::Relaxed)
    }
}

impl Channel for CountingChannel {
    type SendError = AsyncSendError;
    type RecvError = AsyncRecvError;

    async fn send_bytes_to(
        &self,
        party: usize,
        msg: Vec<u8>,
        phase: &str,
    ) -> Result<(), AsyncSendError> {
        if self.sends.fetch_add(1, Ordering::Relaxed) >= self.send_limit {
            return Err(AsyncSendError::Closed);
        }
        self.inner.send_bytes_to(party, msg, phase).await
    }

    async fn recv_bytes_from(&self, party: usize, phase: &str) -> Result<Vec<u8>, AsyncRecvError> {
        self.inner.recv_bytes_from(party, phase).await
    }
}

/// Two counting engines, party 0 failing after `send_limit` sends.
pub fn counting_engines(
    send_limit: usize,
) -> (XorEngine<CountingChannel>, XorEngine<CountingChannel>) {
    init_tracing();
    let [ch0, ch1]: [SimpleChannel; 2] = SimpleChannel::channels(2)
        .try_into()
        .expect("parties is 2");
    let counting = |inner: SimpleChannel, send_limit: usize| CountingChannel {
        inner,
        sends: AtomicUsize::new(0),
        send_limit,
    };
    let seed = rand::random();
    (
        XorEngine::with_shared_seed(counting(ch0, send_limit), 0, 1, seed),
        XorEngine::with_shared_seed(counting(ch1, usize::MAX), 1, 0, seed),
    )
}

/// Secret shares values known to party 0.
pub async fn share<T: Plaintext>(
    e0: &Engine,
    e1: &Engine,
    values: &[T],
) -> Result<(SecretBatch<T>, SecretBatch<T>), engine::Error> {
    let placeholder = vec![T::default(); values.len()];
    tokio::try_join!(e0.input(values, 0), e1.input(&placeholder, 0))
}

pub async fn reveal<T: Plaintext>(
    e0: &Engine,
    e1: &Engine,
    s0: &SecretBatch<T>,
    s1: &SecretBatch<T>,
) -> Result<Vec<T>, engine::Error> {
    let (r0, r1) = tokio::try_join!(e0.reveal(s0), e1.reveal(s1))?;
    assert_eq!(r0, r1);
    Ok(r0)
}

/// Splits bit rows into two random XOR shares.
pub fn split_rows(rows: &[Vec<bool>]) -> (Vec<Vec<bool>>, Vec<Vec<bool>>) {
    let mut rng = rand::rng();
    let mask: Vec<Vec<bool>> = rows
        .iter()
        .map(|row| row.iter().map(|_| rng.random()).collect())
        .collect();
    let masked = rows
        .iter()
        .zip(&mask)
        .map(|(row, mask)| row.iter().zip(mask).map(|(a, b)| a ^ b).collect())
        .collect();
    (masked, mask)
}

/// XOR shares of the bits (least significant first) of every index.
pub fn index_shares(indices: &[usize], width: usize) -> (Vec<Vec<bool>>, Vec<Vec<bool>>) {
    let rows: Vec<Vec<bool>> = (0..width)
        .map(|j| indices.iter().map(|i| (i >> j) & 1 == 1).collect())
        .collect();
    split_rows(&rows)
}

/// XOR shares of the bit rows of every value.
pub fn value_shares<T: Plaintext>(values: &[T]) -> (Vec<Vec<bool>>, Vec<Vec<bool>>) {
    let rows: Vec<Vec<bool>> = (0..T::WIDTH)
        .map(|i| values.iter().map(|v| v.bit(i)).collect())
        .collect();
    split_rows(&rows)
}
