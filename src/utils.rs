use std::ops::BitXorAssign;

pub(crate) fn xor_inplace<T: Copy + BitXorAssign>(a: &mut [T], b: &[T]) {
    a.iter_mut().zip(b).for_each(|(a, b)| {
        *a ^= *b;
    });
}

/// Packs bits into 64-bit words (least significant bit first) for the wire.
pub(crate) fn pack_bits(bits: &[bool]) -> Vec<u64> {
    bits.chunks(64)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0, |word, (i, &bit)| word | (u64::from(bit) << i))
        })
        .collect()
}

/// Inverse of [`pack_bits`], returning exactly `len` bits.
pub(crate) fn unpack_bits(words: &[u64], len: usize) -> Vec<bool> {
    (0..len)
        .map(|i| words.get(i / 64).is_some_and(|w| (w >> (i % 64)) & 1 == 1))
        .collect()
}

/// Number of 64-bit words needed to carry `bits` bits.
pub(crate) fn packed_len(bits: usize) -> usize {
    bits.div_ceil(64)
}

/// Length of a level of a binary expansion that still covers `length` leaves
/// when `remaining_levels` levels are left to expand.
///
/// Requires `remaining_levels < 64`.
pub(crate) fn covering_len(length: usize, remaining_levels: usize) -> usize {
    (length as u64).div_ceil(1_u64 << remaining_levels) as usize
}
