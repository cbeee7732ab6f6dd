//! Routing of an AS-Waksman network for a known permutation.
use crate::permuter::{Error, check_order};

/// The routing of the outermost layers of an AS-Waksman network of size `n`.
///
/// The network first swaps the pairs `(i, i + n/2)` for `i < n/2` (a set
/// condition moves `src[i + n/2]` into the first half), permutes the first
/// `n/2` and the last `n - n/2` elements recursively and finally swaps the
/// pairs `(i, i)` of the two sub-outputs for `i < (n-1)/2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsWaksmanParameters {
    /// Conditions of the `n/2` input swaps.
    pub first_swap_conditions: Vec<bool>,
    /// Conditions of the `(n-1)/2` output swaps.
    pub second_swap_conditions: Vec<bool>,
    /// Order for the sub-network of the first half.
    pub first_sub_order: Vec<u32>,
    /// Order for the sub-network of the second half.
    pub second_sub_order: Vec<u32>,
}

/// Derives [`AsWaksmanParameters`] locally from an order.
///
/// The routing satisfies `out[j] = src[order[j]]`.
pub struct AsWaksmanParameterCalculator<'a> {
    order: &'a [u32],
    inverse: Vec<usize>,
    half: usize,
    rest: usize,
    first_swaps: Vec<bool>,
    second_swaps: Vec<bool>,
    first_sub: Vec<Option<u32>>,
    second_sub: Vec<Option<u32>>,
}

impl<'a> AsWaksmanParameterCalculator<'a> {
    /// Prepares the routing of `order`, which must be a bijection of `0..n`.
    pub fn new(order: &'a [u32]) -> Result<Self, Error> {
        let n = order.len();
        check_order(order, n)?;
        let half = n / 2;
        let rest = n - half;
        let mut inverse = vec![0; n];
        for (i, &target) in order.iter().enumerate() {
            inverse[target as usize] = i;
        }
        Ok(Self {
            order,
            inverse,
            half,
            rest,
            first_swaps: vec![false; half],
            second_swaps: vec![false; rest.saturating_sub(1)],
            first_sub: vec![None; half],
            second_sub: vec![None; rest],
        })
    }

    /// Walks the cycles of the order and returns the routing.
    pub fn calculate(mut self) -> AsWaksmanParameters {
        let n = self.order.len();
        if n >= 2 {
            let mut next = Some(n - 1);
            while let Some(after) = next {
                next = self.route(after);
                let closed = match next {
                    None => true,
                    Some(i) => self.second_sub[self.position(i)].is_some(),
                };
                if closed {
                    next = self.free_output();
                    if let Some(i) = next {
                        let position = self.position(i);
                        if let Some(swap) = self.second_swaps.get_mut(position) {
                            *swap = false;
                        }
                    }
                }
            }
        }
        AsWaksmanParameters {
            first_swap_conditions: self.first_swaps,
            second_swap_conditions: self.second_swaps,
            first_sub_order: self.first_sub.into_iter().map(Option::unwrap_or_default).collect(),
            second_sub_order: self.second_sub.into_iter().map(Option::unwrap_or_default).collect(),
        }
    }

    /// Position of `i` within its half.
    fn position(&self, i: usize) -> usize {
        if i >= self.half { i - self.half } else { i }
    }

    /// The element paired with `i` by the swaps, if any.
    fn dual(&self, i: usize) -> Option<usize> {
        let n = self.order.len();
        if n % 2 == 1 && i == n - 1 {
            None
        } else if i >= self.half {
            Some(i - self.half)
        } else {
            Some(i + self.half)
        }
    }

    /// The highest output of the second sub-network that is not routed yet.
    fn free_output(&self) -> Option<usize> {
        (0..self.rest)
            .rev()
            .find(|&i| self.second_sub[i].is_none())
            .map(|i| i + self.half)
    }

    /// Routes output `after` through the second sub-network and its dual through
    /// the first one, returning the next output on the cycle.
    fn route(&mut self, after: usize) -> Option<usize> {
        let before = self.order[after] as usize;
        let before_position = self.position(before);
        let after_position = self.position(after);
        self.second_sub[after_position] = Some(before_position as u32);

        let dual_before = self.dual(before)?;
        self.first_swaps[before_position] = before < self.half;
        let dual_after = self.inverse[dual_before];
        let dual_after_position = self.position(dual_after);
        self.first_sub[dual_after_position] = Some(before_position as u32);
        if let Some(swap) = self.second_swaps.get_mut(dual_after_position) {
            *swap = dual_after >= self.half;
        }
        self.dual(dual_after)
    }
}
