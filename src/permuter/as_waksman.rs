//! The AS-Waksman permutation network over oblivious swaps.
use tracing::{Level, instrument, trace};

use crate::{
    engine::{Plaintext, SecretBatch, SecretBatchOps},
    permuter::{AsWaksmanParameterCalculator, Error, Permuter, check_size},
};

/// Permutes with an arbitrary-size AS-Waksman network.
///
/// A network of size `n` uses `O(n log n)` oblivious swaps arranged in
/// `2 * ceil(log2 n) - 1` layers. All swap conditions are input in a single
/// round by the party that knows the order, after which every layer costs one
/// AND round. The peer only contributes placeholder inputs.
#[derive(Debug, Clone)]
pub struct AsWaksmanPermuter {
    my_id: usize,
    peer_id: usize,
}

/// A swap of the wires `left` and `right`, taking place when `condition` is set.
#[derive(Debug, Clone, Copy)]
struct Swap {
    left: usize,
    right: usize,
    condition: bool,
}

/// Number of swap layers of a network of size `n`.
fn depth(n: usize) -> usize {
    match n {
        0 | 1 => 0,
        2 => 1,
        _ => 2 + depth(n - n / 2),
    }
}

fn push(layers: &mut Vec<Vec<Swap>>, layer: usize, swap: Swap) {
    if layers.len() <= layer {
        layers.resize_with(layer + 1, Vec::new);
    }
    layers[layer].push(swap);
}

/// Places the swaps of the network on `wires` into `layers`, starting at `layer`.
///
/// Every sub-network leaves its outputs on its own input wires, in order, so
/// the output of the whole network is read off the wires directly. Without an
/// order all conditions are unset; the layout only depends on the size.
fn schedule(
    wires: &[usize],
    order: Option<&[u32]>,
    layer: usize,
    layers: &mut Vec<Vec<Swap>>,
) -> Result<(), Error> {
    let n = wires.len();
    match n {
        0 | 1 => {}
        2 => push(
            layers,
            layer,
            Swap {
                left: wires[0],
                right: wires[1],
                condition: order.is_some_and(|order| order[0] == 1),
            },
        ),
        _ => {
            let half = n / 2;
            let params = order
                .map(|order| AsWaksmanParameterCalculator::new(order).map(|c| c.calculate()))
                .transpose()?;
            let first_swaps = params.as_ref().map(|p| p.first_swap_conditions.as_slice());
            let second_swaps = params.as_ref().map(|p| p.second_swap_conditions.as_slice());
            for i in 0..half {
                let swap = Swap {
                    left: wires[i],
                    right: wires[i + half],
                    condition: first_swaps.is_some_and(|c| c[i]),
                };
                push(layers, layer, swap);
            }
            let first_order = params.as_ref().map(|p| p.first_sub_order.as_slice());
            let second_order = params.as_ref().map(|p| p.second_sub_order.as_slice());
            schedule(&wires[..half], first_order, layer + 1, layers)?;
            schedule(&wires[half..], second_order, layer + 1, layers)?;
            let last = layer + 1 + depth(n - half);
            for i in 0..(n - 1) / 2 {
                let swap = Swap {
                    left: wires[i],
                    right: wires[half + i],
                    condition: second_swaps.is_some_and(|c| c[i]),
                };
                push(layers, last, swap);
            }
        }
    }
    Ok(())
}

impl AsWaksmanPermuter {
    /// Creates a permuter for the party `my_id` and its peer.
    pub fn new(my_id: usize, peer_id: usize) -> Self {
        Self { my_id, peer_id }
    }

    /// Secret shares `count` swap conditions: this party's own conditions if it
    /// knows them, the peer's otherwise.
    async fn conditions(
        &self,
        engine: &impl SecretBatchOps,
        known: Option<Vec<bool>>,
        count: usize,
    ) -> Result<SecretBatch<bool>, Error> {
        let conditions = match known {
            Some(conditions) => engine.input(&conditions, self.my_id).await?,
            None => engine.input(&vec![false; count], self.peer_id).await?,
        };
        Ok(conditions)
    }

    async fn network<T: Plaintext, E: SecretBatchOps>(
        &self,
        engine: &E,
        src: SecretBatch<T>,
        order: Option<&[u32]>,
    ) -> Result<SecretBatch<T>, Error> {
        if let Some(order) = order.filter(|order| order.len() != src.len()) {
            return Err(Error::InvalidOrder(format!(
                "order has {} targets for {} elements",
                order.len(),
                src.len()
            )));
        }
        let wires: Vec<usize> = (0..src.len()).collect();
        let mut layers = Vec::new();
        schedule(&wires, order, 0, &mut layers)?;
        let sizes: Vec<usize> = layers.iter().map(Vec::len).collect();
        let count: usize = sizes.iter().sum();
        if count == 0 {
            return Ok(src);
        }

        let known = order.map(|_| layers.iter().flatten().map(|s| s.condition).collect());
        let conditions = self.conditions(engine, known, count).await?;
        let conditions = conditions.unbatching(&sizes)?;

        let mut wires = src;
        for (i, (layer, conditions)) in layers.iter().zip(conditions).enumerate() {
            trace!(layer = i, swaps = layer.len(), "AS-Waksman layer");
            let lefts: Vec<usize> = layer.iter().map(|s| s.left).collect();
            let rights: Vec<usize> = layer.iter().map(|s| s.right).collect();
            let (left, right) = engine
                .oblivious_swap(wires.gather(&lefts), wires.gather(&rights), &conditions)
                .await?;
            wires.scatter(&lefts, &left);
            wires.scatter(&rights, &right);
        }
        Ok(wires)
    }
}

impl Permuter for AsWaksmanPermuter {
    #[instrument(level = Level::DEBUG, skip_all, fields(size = size), err)]
    async fn permute<T: Plaintext>(
        &self,
        engine: &impl SecretBatchOps,
        src: SecretBatch<T>,
        size: usize,
    ) -> Result<SecretBatch<T>, Error> {
        check_size(&src, size)?;
        self.network(engine, src, None).await
    }

    #[instrument(level = Level::DEBUG, skip_all, fields(size = size), err)]
    async fn permute_to_order_unchecked<T: Plaintext>(
        &self,
        engine: &impl SecretBatchOps,
        src: SecretBatch<T>,
        size: usize,
        order: &[u32],
    ) -> Result<SecretBatch<T>, Error> {
        check_size(&src, size)?;
        self.network(engine, src, Some(order)).await
    }
}
