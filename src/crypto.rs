//! AES based pseudorandomness: a counter-mode RNG and the GGM key expander.
mod aes_rng;
mod expander;

pub use aes_rng::{AES_PAR_BLOCKS, AesRng};
pub use expander::Expander;
