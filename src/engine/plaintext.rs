//! Plaintext types that can be secret shared bit by bit.
use std::fmt;

use serde::{Serialize, de::DeserializeOwned};

use crate::block::Block;

/// A fixed-width plaintext type, shared as `WIDTH` XOR-shared bits.
pub trait Plaintext:
    Copy + Default + fmt::Debug + PartialEq + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Number of bits of the type.
    const WIDTH: usize;

    /// The bit at position `i < WIDTH`, least significant first.
    fn bit(&self, i: usize) -> bool;

    /// Reassembles a value from exactly `WIDTH` bits, least significant first.
    fn from_bits(bits: &[bool]) -> Self;
}

/// A plaintext type forming an additive group with wrapping arithmetic.
pub trait AdditiveGroup: Plaintext {
    /// `self + rhs`, wrapping.
    fn group_add(self, rhs: Self) -> Self;

    /// `self - rhs`, wrapping.
    fn group_sub(self, rhs: Self) -> Self;

    /// `-self`, wrapping.
    fn group_neg(self) -> Self;

    /// Derives a pseudorandom element from a 128-bit key.
    fn from_key(key: Block) -> Self;

    /// Widths of the independent integer lanes of the type, summing up to `WIDTH`.
    ///
    /// Carries never cross from one lane into the next.
    fn lane_widths() -> Vec<usize>;
}

impl Plaintext for bool {
    const WIDTH: usize = 1;

    fn bit(&self, _i: usize) -> bool {
        *self
    }

    fn from_bits(bits: &[bool]) -> Self {
        bits.first().copied().unwrap_or_default()
    }
}

impl Plaintext for Block {
    const WIDTH: usize = Block::BITS;

    fn bit(&self, i: usize) -> bool {
        Block::bit(self, i)
    }

    fn from_bits(bits: &[bool]) -> Self {
        Block::from_bits(bits.iter().copied())
    }
}

macro_rules! impl_uint {
    ($($t:ty),*) => {
        $(
            impl Plaintext for $t {
                const WIDTH: usize = <$t>::BITS as usize;

                fn bit(&self, i: usize) -> bool {
                    (self >> i) & 1 == 1
                }

                fn from_bits(bits: &[bool]) -> Self {
                    bits.iter()
                        .take(Self::WIDTH)
                        .rev()
                        .fold(0, |acc: $t, &bit| (acc << 1) | <$t>::from(bit))
                }
            }

            impl AdditiveGroup for $t {
                fn group_add(self, rhs: Self) -> Self {
                    self.wrapping_add(rhs)
                }

                fn group_sub(self, rhs: Self) -> Self {
                    self.wrapping_sub(rhs)
                }

                fn group_neg(self) -> Self {
                    self.wrapping_neg()
                }

                fn from_key(key: Block) -> Self {
                    key.low() as $t
                }

                fn lane_widths() -> Vec<usize> {
                    vec![Self::WIDTH]
                }
            }
        )*
    };
}

impl_uint!(u8, u16, u32, u64);

impl<A: Plaintext, B: Plaintext> Plaintext for (A, B) {
    const WIDTH: usize = A::WIDTH + B::WIDTH;

    fn bit(&self, i: usize) -> bool {
        if i < A::WIDTH {
            self.0.bit(i)
        } else {
            self.1.bit(i - A::WIDTH)
        }
    }

    fn from_bits(bits: &[bool]) -> Self {
        let (a, b) = bits.split_at(A::WIDTH.min(bits.len()));
        (A::from_bits(a), B::from_bits(b))
    }
}

impl<A: AdditiveGroup, B: AdditiveGroup> AdditiveGroup for (A, B) {
    fn group_add(self, rhs: Self) -> Self {
        (self.0.group_add(rhs.0), self.1.group_add(rhs.1))
    }

    fn group_sub(self, rhs: Self) -> Self {
        (self.0.group_sub(rhs.0), self.1.group_sub(rhs.1))
    }

    fn group_neg(self) -> Self {
        (self.0.group_neg(), self.1.group_neg())
    }

    fn from_key(key: Block) -> Self {
        (
            A::from_key(key),
            B::from_key(Block::from([key.high(), key.low()])),
        )
    }

    fn lane_widths() -> Vec<usize> {
        let mut widths = A::lane_widths();
        widths.extend(B::lane_widths());
        widths
    }
}
