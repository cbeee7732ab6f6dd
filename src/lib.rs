//! Oblivious permutation, shuffling and write-only ORAM for two-party computation.
//!
//! The gadgets of this crate operate on batches of XOR-shared values held by
//! two parties. Neither party learns anything about the other party's secrets
//! beyond what a gadget explicitly reveals.
//!
//! ## Main Components
//!
//! * [`engine`]: The secret-sharing substrate ([`engine::SecretBatchOps`]) with oblivious
//!   swaps and subtraction, and [`engine::XorEngine`] which implements it with Beaver triples.
//! * [`permuter`]: The AS-Waksman network that permutes a batch to an order known to one party.
//! * [`shuffler`]: A shuffle composed of one private random permutation per party.
//! * [`oram`]: Single-point arrays, the oblivious delta and difference calculators and two
//!   write-only ORAMs.
//! * [`channel`]: Communication abstractions for exchanging data between parties.
//!
//! ## Basic Usage
//!
//! Both parties construct an engine over a channel to their peer and then call the same
//! gadgets in the same order:
//!
//! ```ignore
//! use oblivious_2pc::{
//!     channel::SimpleChannel,
//!     engine::{SecretBatchOps, XorEngine},
//!     shuffler::{PermuteBasedShuffler, Shuffler},
//!     permuter::AsWaksmanPermuter,
//! };
//!
//! # async fn example(channel: SimpleChannel, seed: [u8; 32]) -> Result<(), Box<dyn std::error::Error>> {
//! let engine = XorEngine::with_shared_seed(channel, 0, 1, seed);
//! let shuffler = PermuteBasedShuffler::new(0, 1, AsWaksmanPermuter::new(0, 1));
//! let secret = engine.input(&[1_u32, 2, 3, 4], 0).await?;
//! let shuffled = shuffler.shuffle(&engine, secret, 4).await?;
//! let values = engine.reveal(&shuffled).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Security Properties
//!
//! The protocols are secure against semi-honest adversaries. Preconditions are checked
//! before any message is sent; a failed protocol run cannot be resumed.
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod block;
pub mod channel;
pub mod crypto;
pub mod engine;
pub mod oram;
pub mod permuter;
pub mod shuffler;

mod utils;
