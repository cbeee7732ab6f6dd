use std::time::Instant;

use criterion::{BenchmarkGroup, BenchmarkId, Criterion, measurement::WallTime};
use oblivious_2pc::{
    channel::SimpleChannel,
    engine::XorEngine,
    oram::{LinearOram, PointFunctionOram, Role, WriteOnlyOram},
};
use tokio::runtime::Runtime;

pub fn oram_benchmarks(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let batch_size = 16;
    let mut g = c.benchmark_group("write-only ORAM");
    g.throughput(criterion::Throughput::Elements(batch_size as u64));
    for width in [4, 6, 8] {
        let size = 1 << width;
        bench_writes(
            &mut g,
            &rt,
            BenchmarkId::new("linear", size),
            || {
                (
                    LinearOram::<u32>::new(size, Role::Alice, 0, 1),
                    LinearOram::<u32>::new(size, Role::Bob, 0, 1),
                )
            },
            width,
            batch_size,
        );
        bench_writes(
            &mut g,
            &rt,
            BenchmarkId::new("point function", size),
            || {
                (
                    PointFunctionOram::<u32>::new(size, Role::Alice, 0, 1),
                    PointFunctionOram::<u32>::new(size, Role::Bob, 0, 1),
                )
            },
            width,
            batch_size,
        );
    }
}

fn bench_writes<O: WriteOnlyOram<u32> + 'static>(
    g: &mut BenchmarkGroup<'_, WallTime>,
    rt: &Runtime,
    bench_id: BenchmarkId,
    orams: impl Fn() -> (O, O),
    width: usize,
    batch_size: usize,
) {
    g.bench_function(bench_id, |b| {
        b.to_async(rt).iter_custom(|iters| {
            let [ch0, ch1] = SimpleChannel::channels(2)
                .try_into()
                .expect("parties is 2");
            let seed = rand::random();
            let e0 = XorEngine::with_shared_seed(ch0, 0, 1, seed);
            let e1 = XorEngine::with_shared_seed(ch1, 1, 0, seed);
            let (mut alice, mut bob) = orams();
            // index i and value i, shared as (plaintext, zeros)
            let index: Vec<Vec<bool>> = (0..width)
                .map(|j| (0..batch_size).map(|i| (i >> j) & 1 == 1).collect())
                .collect();
            let values: Vec<Vec<bool>> = (0..32)
                .map(|j| (0..batch_size).map(|i| (i >> j) & 1 == 1).collect())
                .collect();
            let zero_index = vec![vec![false; batch_size]; width];
            let zero_values = vec![vec![false; batch_size]; 32];

            async move {
                let now = Instant::now();
                for _ in 0..iters {
                    tokio::try_join!(
                        alice.oblivious_add_batch(&e0, &index, &values),
                        bob.oblivious_add_batch(&e1, &zero_index, &zero_values)
                    )
                    .expect("ORAM write failed");
                }
                now.elapsed()
            }
        })
    });
}
