//! A 128-bit [`Block`] type, used for GGM keys and correction words.
//!
//! Operations on [`Block`]s will use SIMD instructions where possible.
use std::ops::{BitAnd, BitAndAssign, BitXor, BitXorAssign, Not};

use bytemuck::{Pod, Zeroable};
use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use wide::{u8x16, u64x2};

/// A 128-bit block. Uses SIMD operations where available.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, Pod, Zeroable)]
#[repr(transparent)]
pub struct Block(u8x16);

impl Block {
    /// All bits set to 0.
    pub const ZERO: Self = Self(u8x16::ZERO);
    /// All bits set to 1.
    pub const ONES: Self = Self(u8x16::MAX);
    /// Lsb set to 1, all others zero.
    pub const ONE: Self = Self::new(1_u128.to_ne_bytes());

    /// 16 bytes in a Block.
    pub const BYTES: usize = 16;
    /// 128 bits in a block.
    pub const BITS: usize = 128;

    /// Create a new block from bytes.
    #[inline]
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(u8x16::new(bytes))
    }

    /// Create a block with all bytes set to `byte`.
    #[inline]
    pub const fn splat(byte: u8) -> Self {
        Self::new([byte; 16])
    }

    /// Bytes of the block.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_array_ref()
    }

    /// Low 64 bits of the block.
    #[inline]
    pub fn low(&self) -> u64 {
        let inner: &u64x2 = bytemuck::must_cast_ref(&self.0);
        inner.as_array_ref()[0]
    }

    /// High 64 bits of the block.
    #[inline]
    pub fn high(&self) -> u64 {
        let inner: &u64x2 = bytemuck::must_cast_ref(&self.0);
        inner.as_array_ref()[1]
    }

    /// Least significant bit of the block
    #[inline]
    pub fn lsb(&self) -> bool {
        *self & Block::ONE == Block::ONE
    }

    /// The bit at position `i`, counted from the least significant bit.
    #[inline]
    pub fn bit(&self, i: usize) -> bool {
        (u128::from(self) >> i) & 1 == 1
    }

    /// Iterator over bits of the Block, least significant first.
    #[inline]
    pub fn bits(&self) -> impl Iterator<Item = bool> + use<> {
        let value = u128::from(self);
        (0..Self::BITS).map(move |i| (value >> i) & 1 == 1)
    }

    /// Packs up to 128 bits (least significant first) into a block.
    pub fn from_bits(bits: impl IntoIterator<Item = bool>) -> Self {
        let value = bits
            .into_iter()
            .take(Self::BITS)
            .enumerate()
            .fold(0_u128, |acc, (i, bit)| acc | (u128::from(bit) << i));
        Self::from(value)
    }
}

impl BitAnd for Block {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for Block {
    #[inline]
    fn bitand_assign(&mut self, rhs: Self) {
        *self = *self & rhs;
    }
}

impl BitXor for Block {
    type Output = Self;

    #[inline]
    fn bitxor(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }
}

impl BitXorAssign for Block {
    #[inline]
    fn bitxor_assign(&mut self, rhs: Self) {
        *self = *self ^ rhs;
    }
}

impl Not for Block {
    type Output = Self;

    #[inline]
    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        let a: u128 = (*self).into();
        let b: u128 = (*other).into();
        a.ct_eq(&b).into()
    }
}

impl Eq for Block {}

impl Distribution<Block> for StandardUniform {
    #[inline]
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Block {
        let mut bytes = [0; 16];
        rng.fill_bytes(&mut bytes);
        Block::new(bytes)
    }
}

impl AsRef<[u8]> for Block {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl AsMut<[u8]> for Block {
    fn as_mut(&mut self) -> &mut [u8] {
        self.0.as_array_mut()
    }
}

impl From<Block> for aes::Block {
    #[inline]
    fn from(value: Block) -> Self {
        aes::Block::from(*value.as_bytes())
    }
}

impl From<aes::Block> for Block {
    #[inline]
    fn from(value: aes::Block) -> Self {
        let mut bytes = [0; 16];
        bytes.copy_from_slice(value.as_slice());
        Self::new(bytes)
    }
}

impl From<[u8; 16]> for Block {
    #[inline]
    fn from(value: [u8; 16]) -> Self {
        Self::new(value)
    }
}

impl From<Block> for [u8; 16] {
    fn from(value: Block) -> Self {
        *value.as_bytes()
    }
}

impl From<[u64; 2]> for Block {
    #[inline]
    fn from(value: [u64; 2]) -> Self {
        bytemuck::must_cast(value)
    }
}

impl From<Block> for [u64; 2] {
    #[inline]
    fn from(value: Block) -> Self {
        bytemuck::must_cast(value)
    }
}

impl From<Block> for u128 {
    #[inline]
    fn from(value: Block) -> Self {
        u128::from_ne_bytes(*value.as_bytes())
    }
}

impl From<&Block> for u128 {
    #[inline]
    fn from(value: &Block) -> Self {
        u128::from_ne_bytes(*value.as_bytes())
    }
}

impl From<u128> for Block {
    #[inline]
    fn from(value: u128) -> Self {
        Self::new(value.to_ne_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::Block;

    #[test]
    fn test_from_into_u64_arr() {
        let b = Block::from([42_u64, 65]);
        assert_eq!(42, b.low());
        assert_eq!(65, b.high());
        assert_eq!([42, 65], <[u64; 2]>::from(b));
    }

    #[test]
    fn test_bits() {
        let b: Block = 0b101_u128.into();
        let mut iter = b.bits();
        assert_eq!(Some(true), iter.next());
        assert_eq!(Some(false), iter.next());
        assert_eq!(Some(true), iter.next());
        for rest in iter {
            assert!(!rest);
        }
        assert!(b.bit(2));
        assert!(!b.bit(127));
    }

    #[test]
    fn test_from_bits() {
        let value = (1_u128 << 127) | (1 << 64) | 0b1101;
        let blk = Block::from(value);
        assert_eq!(blk, Block::from_bits(blk.bits()));
        assert_eq!(Block::ONE, Block::from_bits([true]));
    }

    #[test]
    fn test_lsb() {
        assert!(Block::ONES.lsb());
        assert!(!Block::from(u128::MAX - 1).lsb());
    }

    #[test]
    fn test_aes_block_conversion() {
        let blk = Block::from(0x0102_0304_u128);
        let aes_blk: aes::Block = blk.into();
        assert_eq!(blk, Block::from(aes_blk));
    }
}
