use std::time::Instant;

use criterion::{BenchmarkGroup, BenchmarkId, Criterion, measurement::WallTime};
use oblivious_2pc::{
    channel::SimpleChannel,
    engine::{SecretBatchOps, XorEngine},
    permuter::{AsWaksmanPermuter, Permuter},
    shuffler::{PermuteBasedShuffler, Shuffler},
};
use rand::seq::SliceRandom;
use tokio::runtime::Runtime;

pub fn permutation_benchmarks(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let size_exponents = [6, 8, 10];
    let mut g = c.benchmark_group("permutation");
    for exp in size_exponents {
        let size = 2_usize.pow(exp);
        g.throughput(criterion::Throughput::Elements(size as u64));
        bench_permute(&mut g, &rt, BenchmarkId::new("AS-Waksman u32", size), size);
        bench_shuffle(&mut g, &rt, BenchmarkId::new("shuffle u32", size), size);
    }
}

fn engines() -> (XorEngine<SimpleChannel>, XorEngine<SimpleChannel>) {
    let [ch0, ch1] = SimpleChannel::channels(2)
        .try_into()
        .expect("parties is 2");
    let seed = rand::random();
    (
        XorEngine::with_shared_seed(ch0, 0, 1, seed),
        XorEngine::with_shared_seed(ch1, 1, 0, seed),
    )
}

fn bench_permute(
    g: &mut BenchmarkGroup<'_, WallTime>,
    rt: &Runtime,
    bench_id: BenchmarkId,
    size: usize,
) {
    g.bench_function(bench_id, |b| {
        b.to_async(rt).iter_custom(|iters| {
            let (e0, e1) = engines();
            let p0 = AsWaksmanPermuter::new(0, 1);
            let p1 = AsWaksmanPermuter::new(1, 0);
            let values: Vec<u32> = (0..size as u32).collect();
            let mut order: Vec<u32> = (0..size as u32).collect();
            order.shuffle(&mut rand::rng());

            async move {
                let now = Instant::now();
                for _ in 0..iters {
                    let s0 = e0.recover_shared(&values);
                    let s1 = e1.recover_shared(&values);
                    tokio::try_join!(
                        p0.permute_to_order(&e0, s0, size, &order),
                        p1.permute(&e1, s1, size)
                    )
                    .expect("permutation failed");
                }
                now.elapsed()
            }
        })
    });
}

fn bench_shuffle(
    g: &mut BenchmarkGroup<'_, WallTime>,
    rt: &Runtime,
    bench_id: BenchmarkId,
    size: usize,
) {
    g.bench_function(bench_id, |b| {
        b.to_async(rt).iter_custom(|iters| {
            let (e0, e1) = engines();
            let s0 = PermuteBasedShuffler::new(0, 1, AsWaksmanPermuter::new(0, 1));
            let s1 = PermuteBasedShuffler::new(1, 0, AsWaksmanPermuter::new(1, 0));
            let values: Vec<u32> = (0..size as u32).collect();

            async move {
                let now = Instant::now();
                for _ in 0..iters {
                    let x0 = e0.recover_shared(&values);
                    let x1 = e1.recover_shared(&values);
                    tokio::try_join!(s0.shuffle(&e0, x0, size), s1.shuffle(&e1, x1, size))
                        .expect("shuffle failed");
                }
                now.elapsed()
            }
        })
    });
}
