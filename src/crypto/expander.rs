//! GGM tree expansion of 128-bit keys.
//!
//! Each key `k` is expanded into the two children `π_0(k) ^ k` and `π_1(k) ^ k`,
//! where `π_b` is AES with a fixed, publicly derived key. This is the
//! correlation robust hash of <https://eprint.iacr.org/2019/074>, instantiated
//! once per child position.
//!
//! # Warning: only secure in semi-honest setting!
use std::sync::LazyLock;

use aes::{
    Aes128,
    cipher::{BlockEncrypt, KeyInit},
};

use crate::{block::Block, crypto::AES_PAR_BLOCKS};

const KEY_CONTEXT: &str = "oblivious-2pc 2024-06 GGM expander child key";

/// Doubles keys into their left and right GGM children.
#[derive(Clone)]
pub struct Expander {
    left: Aes128,
    right: Aes128,
}

static FIXED_KEY_EXPANDER: LazyLock<Expander> = LazyLock::new(|| Expander::with_index(0));

impl Expander {
    /// The expander shared by both parties of a protocol run.
    pub fn fixed() -> &'static Expander {
        &FIXED_KEY_EXPANDER
    }

    /// Creates an expander whose two AES keys are derived from a public `index`.
    pub fn with_index(index: u64) -> Self {
        let derive = |child: u8| {
            let mut material = index.to_le_bytes().to_vec();
            material.push(child);
            let key = blake3::derive_key(KEY_CONTEXT, &material);
            let mut bytes = [0; 16];
            bytes.copy_from_slice(&key[..16]);
            Aes128::new(&Block::new(bytes).into())
        };
        Self {
            left: derive(0),
            right: derive(1),
        }
    }

    /// Expands every key into two children, stored next to each other.
    ///
    /// The children of `keys[j]` are at positions `2j` and `2j + 1`.
    pub fn expand(&self, keys: &[Block]) -> Vec<Block> {
        let mut children = vec![Block::ZERO; keys.len() * 2];
        let mut left = [aes::Block::default(); AES_PAR_BLOCKS];
        let mut right = [aes::Block::default(); AES_PAR_BLOCKS];
        for (chunk, out) in keys
            .chunks(AES_PAR_BLOCKS)
            .zip(children.chunks_mut(AES_PAR_BLOCKS * 2))
        {
            let n = chunk.len();
            for ((l, r), key) in left.iter_mut().zip(right.iter_mut()).zip(chunk) {
                *l = (*key).into();
                *r = (*key).into();
            }
            self.left.encrypt_blocks(&mut left[..n]);
            self.right.encrypt_blocks(&mut right[..n]);
            for (j, key) in chunk.iter().enumerate() {
                out[2 * j] = Block::from(left[j]) ^ *key;
                out[2 * j + 1] = Block::from(right[j]) ^ *key;
            }
        }
        children
    }
}

#[cfg(test)]
mod tests {
    use rand::random;

    use super::*;

    #[test]
    fn expansion_is_deterministic() {
        let keys: Vec<Block> = (0..20).map(|_| random()).collect();
        let a = Expander::fixed().expand(&keys);
        let b = Expander::with_index(0).expand(&keys);
        assert_eq!(a, b);
        assert_eq!(a.len(), 40);
    }

    #[test]
    fn children_differ() {
        let key: Block = random();
        let children = Expander::fixed().expand(&[key]);
        assert_ne!(children[0], children[1]);
        assert_ne!(children[0], key);
    }

    #[test]
    fn chunked_matches_single() {
        let keys: Vec<Block> = (0..(3 * AES_PAR_BLOCKS + 1)).map(|_| random()).collect();
        let batched = Expander::fixed().expand(&keys);
        for (j, key) in keys.iter().enumerate() {
            assert_eq!(&batched[2 * j..2 * j + 2], Expander::fixed().expand(&[*key]));
        }
    }

    #[test]
    fn index_changes_children() {
        let key: Block = random();
        assert_ne!(
            Expander::with_index(0).expand(&[key]),
            Expander::with_index(1).expand(&[key])
        );
    }
}
