use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use ordered_chain_map::{OrderedMap, OrderedMapBuilder};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn bench_insert(c: &mut Criterion) {
    c.bench_function("ordered::insert_fresh_100k", |b| {
        b.iter_batched(
            OrderedMap::<u64>::new,
            |mut m| {
                for (i, x) in lcg(1).take(100_000).enumerate() {
                    m.set(key(x), i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("ordered::build_from_presized_100k", |b| {
        let pairs: Vec<(String, u64)> = lcg(1)
            .take(100_000)
            .enumerate()
            .map(|(i, x)| (key(x), i as u64))
            .collect();
        b.iter_batched(
            || pairs.clone(),
            |pairs| black_box(OrderedMapBuilder::new().build_from(pairs).unwrap()),
            BatchSize::SmallInput,
        )
    });
}

fn bench_touch(c: &mut Criterion) {
    c.bench_function("ordered::touch_10k_on_100k", |b| {
        let keys: Vec<_> = lcg(3).take(100_000).map(key).collect();
        let mut m = OrderedMap::new();
        for (i, k) in keys.iter().enumerate() {
            m.set(k.as_str(), i as u64);
        }
        let n = keys.len();
        let mut s = 0x9e3779b97f4a7c15u64;
        let targets: Vec<String> = (0..10_000)
            .map(|_| {
                s = s.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
                keys[(s as usize) % n].clone()
            })
            .collect();
        b.iter(|| {
            for k in &targets {
                m.set(k.as_str(), 0);
            }
        })
    });
}

fn bench_get(c: &mut Criterion) {
    let keys: Vec<_> = lcg(7).take(100_000).map(key).collect();
    let m: OrderedMap<u64> = keys
        .iter()
        .enumerate()
        .map(|(i, k)| (k.as_str(), i as u64))
        .collect();

    c.bench_function("ordered::get_hit_10k_on_100k", |b| {
        let n = keys.len();
        let mut s = 0x9e3779b97f4a7c15u64;
        let queries: Vec<&str> = (0..10_000)
            .map(|_| {
                s = s.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
                keys[(s as usize) % n].as_str()
            })
            .collect();
        b.iter(|| {
            for k in &queries {
                black_box(m.get(k));
            }
        })
    });

    c.bench_function("ordered::get_miss_10k_on_100k", |b| {
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            for _ in 0..10_000 {
                let k = key(miss.next().unwrap());
                black_box(m.get(&k));
            }
        })
    });
}

fn bench_delete(c: &mut Criterion) {
    c.bench_function("ordered::delete_10k_of_110k", |b| {
        b.iter_batched(
            || {
                let keys: Vec<_> = lcg(5).take(110_000).map(key).collect();
                let m: OrderedMap<u64> = keys
                    .iter()
                    .enumerate()
                    .map(|(i, k)| (k.as_str(), i as u64))
                    .collect();
                let victims: Vec<String> = keys.into_iter().step_by(11).collect();
                (m, victims)
            },
            |(mut m, victims)| {
                for k in &victims {
                    black_box(m.delete(k));
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_iter(c: &mut Criterion) {
    let m: OrderedMap<u64> = lcg(999)
        .take(100_000)
        .enumerate()
        .map(|(i, x)| (key(x), i as u64))
        .collect();
    c.bench_function("ordered::iter_all_100k", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for v in m.values() {
                sum = sum.wrapping_add(*v);
            }
            black_box(sum)
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches_insert;
    config = bench_config();
    targets = bench_insert, bench_touch
}
criterion_group! {
    name = benches_ops;
    config = bench_config();
    targets = bench_get, bench_delete, bench_iter
}
criterion_main!(benches_insert, benches_ops);
