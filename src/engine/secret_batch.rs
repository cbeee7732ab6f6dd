//! Bit-sliced batches of XOR-shared values.
use std::marker::PhantomData;

use crate::{
    engine::{Error, Plaintext},
    utils::xor_inplace,
};

/// This party's XOR shares of `len` secret values of type `T`.
///
/// The shares are stored bit-sliced: row `i` holds bit `i` (least significant
/// first) of every value in the batch. Reconstructing a value requires the
/// corresponding row entries of both parties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretBatch<T> {
    rows: Vec<Vec<bool>>,
    len: usize,
    plaintext: PhantomData<fn() -> T>,
}

impl<T: Plaintext> SecretBatch<T> {
    /// Interprets bit rows as this party's shares, checking their shape.
    pub fn from_rows(rows: Vec<Vec<bool>>) -> Result<Self, Error> {
        if rows.len() != T::WIDTH {
            return Err(Error::WidthMismatch {
                expected: T::WIDTH,
                actual: rows.len(),
            });
        }
        let len = rows.first().map_or(0, Vec::len);
        if let Some(row) = rows.iter().find(|row| row.len() != len) {
            return Err(Error::SizeMismatch {
                expected: len,
                actual: row.len(),
            });
        }
        Ok(Self {
            rows,
            len,
            plaintext: PhantomData,
        })
    }

    /// Interprets plaintext values as this party's shares.
    pub fn from_values(values: &[T]) -> Self {
        let rows = (0..T::WIDTH)
            .map(|i| values.iter().map(|v| v.bit(i)).collect())
            .collect();
        Self {
            rows,
            len: values.len(),
            plaintext: PhantomData,
        }
    }

    pub(crate) fn zeros(len: usize) -> Self {
        Self {
            rows: vec![vec![false; len]; T::WIDTH],
            len,
            plaintext: PhantomData,
        }
    }

    /// Splits `WIDTH * len` bits (row after row) into a batch.
    pub(crate) fn from_flat(bits: Vec<bool>, len: usize) -> Result<Self, Error> {
        if bits.len() != T::WIDTH * len {
            return Err(Error::SizeMismatch {
                expected: T::WIDTH * len,
                actual: bits.len(),
            });
        }
        let rows = if len == 0 {
            vec![vec![]; T::WIDTH]
        } else {
            bits.chunks(len).map(<[bool]>::to_vec).collect()
        };
        Self::from_rows(rows)
    }

    /// All rows, concatenated.
    pub(crate) fn flatten(&self) -> Vec<bool> {
        self.rows.concat()
    }

    /// Number of values in the batch.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the batch holds no values.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The bit rows of this party's shares.
    pub fn rows(&self) -> &[Vec<bool>] {
        &self.rows
    }

    /// Consumes the batch, returning the bit rows of this party's shares.
    pub fn into_rows(self) -> Vec<Vec<bool>> {
        self.rows
    }

    /// Reads the shares as plaintext values.
    ///
    /// Only meaningful once the rows hold the XOR of both parties' shares.
    pub fn values(&self) -> Vec<T> {
        (0..self.len)
            .map(|j| {
                let bits: Vec<bool> = self.rows.iter().map(|row| row[j]).collect();
                T::from_bits(&bits)
            })
            .collect()
    }

    /// Local XOR of two batches of the same length.
    pub(crate) fn xor(&self, other: &Self) -> Self {
        let mut rows = self.rows.clone();
        for (row, other) in rows.iter_mut().zip(&other.rows) {
            xor_inplace(row, other);
        }
        Self {
            rows,
            len: self.len,
            plaintext: PhantomData,
        }
    }

    /// Complements every bit share.
    pub(crate) fn flip(mut self) -> Self {
        for row in self.rows.iter_mut() {
            for bit in row.iter_mut() {
                *bit = !*bit;
            }
        }
        self
    }

    /// Splits the batch into consecutive batches of the given sizes.
    pub fn unbatching(self, sizes: &[usize]) -> Result<Vec<Self>, Error> {
        let total: usize = sizes.iter().sum();
        if total != self.len {
            return Err(Error::SizeMismatch {
                expected: self.len,
                actual: total,
            });
        }
        let mut parts: Vec<Self> = sizes
            .iter()
            .map(|&len| Self {
                rows: Vec::with_capacity(T::WIDTH),
                len,
                plaintext: PhantomData,
            })
            .collect();
        for row in self.rows {
            let mut rest = row.as_slice();
            for (part, &len) in parts.iter_mut().zip(sizes) {
                let (head, tail) = rest.split_at(len);
                part.rows.push(head.to_vec());
                rest = tail;
            }
        }
        Ok(parts)
    }

    /// Splits the batch into the values before `mid` and the values from `mid` on.
    pub fn split_at(self, mid: usize) -> Result<(Self, Self), Error> {
        if mid > self.len {
            return Err(Error::SizeMismatch {
                expected: self.len,
                actual: mid,
            });
        }
        let len = self.len;
        let mut head = Vec::with_capacity(T::WIDTH);
        let mut tail = Vec::with_capacity(T::WIDTH);
        for mut row in self.rows {
            tail.push(row.split_off(mid));
            head.push(row);
        }
        Ok((
            Self {
                rows: head,
                len: mid,
                plaintext: PhantomData,
            },
            Self {
                rows: tail,
                len: len - mid,
                plaintext: PhantomData,
            },
        ))
    }

    /// Appends other batches after this one.
    pub fn batching_with(mut self, others: impl IntoIterator<Item = Self>) -> Self {
        for other in others {
            for (row, other) in self.rows.iter_mut().zip(other.rows) {
                row.extend(other);
            }
            self.len += other.len;
        }
        self
    }

    /// This batch, concatenated `times` times with itself.
    pub(crate) fn repeat(&self, times: usize) -> Self {
        Self {
            rows: self.rows.iter().map(|row| row.repeat(times)).collect(),
            len: self.len * times,
            plaintext: PhantomData,
        }
    }

    /// The values at `positions`, in that order. Positions must be in range.
    pub(crate) fn gather(&self, positions: &[usize]) -> Self {
        Self {
            rows: self
                .rows
                .iter()
                .map(|row| positions.iter().map(|&p| row[p]).collect())
                .collect(),
            len: positions.len(),
            plaintext: PhantomData,
        }
    }

    /// Overwrites the values at `positions` with the values of `other`.
    pub(crate) fn scatter(&mut self, positions: &[usize], other: &Self) {
        for (row, other) in self.rows.iter_mut().zip(&other.rows) {
            for (&p, &bit) in positions.iter().zip(other) {
                row[p] = bit;
            }
        }
    }

    /// The shares of bit `i` of every value.
    pub fn bit(&self, i: usize) -> Result<SecretBatch<bool>, Error> {
        let row = self.rows.get(i).ok_or(Error::WidthMismatch {
            expected: T::WIDTH,
            actual: i,
        })?;
        SecretBatch::from_rows(vec![row.clone()])
    }

    /// Stacks two batches of the same length into a batch of pairs.
    pub fn pair<U: Plaintext>(self, other: SecretBatch<U>) -> Result<SecretBatch<(T, U)>, Error> {
        if self.len != other.len {
            return Err(Error::SizeMismatch {
                expected: self.len,
                actual: other.len,
            });
        }
        let mut rows = self.rows;
        rows.extend(other.rows);
        SecretBatch::from_rows(rows)
    }
}

impl<A: Plaintext, B: Plaintext> SecretBatch<(A, B)> {
    /// Inverse of [`SecretBatch::pair`].
    pub fn unpair(self) -> (SecretBatch<A>, SecretBatch<B>) {
        let len = self.len;
        let mut first = self.rows;
        let second = first.split_off(A::WIDTH);
        (
            SecretBatch {
                rows: first,
                len,
                plaintext: PhantomData,
            },
            SecretBatch {
                rows: second,
                len,
                plaintext: PhantomData,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_survive_slicing() {
        let batch = SecretBatch::from_values(&[1_u8, 2, 3, 4, 5]);
        let parts = batch.clone().unbatching(&[2, 0, 3]).unwrap();
        assert_eq!(parts[0].values(), vec![1, 2]);
        assert!(parts[1].is_empty());
        assert_eq!(parts[2].values(), vec![3, 4, 5]);
        let joined = parts[0].clone().batching_with(parts[1..].iter().cloned());
        assert_eq!(joined, batch);
        let (head, tail) = batch.clone().split_at(2).unwrap();
        assert_eq!(head.values(), vec![1, 2]);
        assert_eq!(tail.values(), vec![3, 4, 5]);
        assert!(batch.split_at(6).is_err());
    }

    #[test]
    fn unbatching_checks_sizes() {
        let batch = SecretBatch::from_values(&[true, false]);
        assert!(batch.unbatching(&[1, 2]).is_err());
    }

    #[test]
    fn rows_must_match_width() {
        assert!(SecretBatch::<u8>::from_rows(vec![vec![true]; 7]).is_err());
        assert!(SecretBatch::<bool>::from_rows(vec![vec![true, false]]).is_ok());
        let ragged = vec![vec![true], vec![]];
        assert!(SecretBatch::<(bool, bool)>::from_rows(ragged).is_err());
    }

    #[test]
    fn pair_and_unpair() {
        let a = SecretBatch::from_values(&[7_u8, 9]);
        let b = SecretBatch::from_values(&[true, false]);
        let paired = a.clone().pair(b.clone()).unwrap();
        assert_eq!(paired.values(), vec![(7, true), (9, false)]);
        assert_eq!(paired.unpair(), (a, b));
    }

    #[test]
    fn flat_round_trip_and_bits() {
        let batch = SecretBatch::from_values(&[0b01_u32, 0b10]);
        let flat = batch.flatten();
        assert_eq!(SecretBatch::<u32>::from_flat(flat, 2).unwrap(), batch);
        assert_eq!(batch.bit(1).unwrap().values(), vec![false, true]);
        assert_eq!(batch.repeat(2).values(), vec![1, 2, 1, 2]);
        assert_eq!(batch.clone().flip().values(), vec![!1, !2]);
    }

    #[test]
    fn gather_and_scatter() {
        let mut batch = SecretBatch::from_values(&[10_u16, 11, 12, 13]);
        let picked = batch.gather(&[3, 0]);
        assert_eq!(picked.values(), vec![13, 10]);
        batch.scatter(&[1, 2], &picked);
        assert_eq!(batch.values(), vec![10, 13, 10, 13]);
    }
}
