use chaintree_map::ChainTreeMap;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::hash::{BuildHasherDefault, Hasher};
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

// Every key hashes to a multiple of 4096, so one bucket takes all of them
// and lookups go through the tree.
#[derive(Default)]
struct Clustered(u64);
impl Hasher for Clustered {
    fn write(&mut self, _bytes: &[u8]) {}
    fn write_u64(&mut self, n: u64) {
        self.0 = n;
    }
    fn finish(&self) -> u64 {
        (self.0 % 16) << 12
    }
}

fn bench_insert(c: &mut Criterion) {
    c.bench_function("chaintree_map_insert_10k", |b| {
        b.iter_batched(
            ChainTreeMap::<String, u64>::new,
            |mut m| {
                for (i, x) in lcg(1).take(10_000).enumerate() {
                    m.put(key(x), i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit(c: &mut Criterion) {
    c.bench_function("chaintree_map_get_hit", |b| {
        let mut m = ChainTreeMap::new();
        let keys: Vec<_> = lcg(7).take(20_000).map(key).collect();
        for (i, k) in keys.iter().cloned().enumerate() {
            m.put(k, i as u64);
        }
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(m.get(k.as_str()).unwrap());
        })
    });
}

fn bench_get_miss(c: &mut Criterion) {
    c.bench_function("chaintree_map_get_miss", |b| {
        let mut m = ChainTreeMap::new();
        for (i, x) in lcg(11).take(10_000).enumerate() {
            m.put(key(x), i as u64);
        }
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            let k = key(miss.next().unwrap());
            black_box(m.get(k.as_str()));
        })
    });
}

fn bench_remove(c: &mut Criterion) {
    c.bench_function("chaintree_map_remove_10k", |b| {
        let keys: Vec<_> = lcg(3).take(10_000).map(key).collect();
        b.iter_batched(
            || {
                let mut m = ChainTreeMap::new();
                for (i, k) in keys.iter().cloned().enumerate() {
                    m.put(k, i as u64);
                }
                m
            },
            |mut m| {
                for k in &keys {
                    black_box(m.remove(k.as_str()));
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_tree_bucket(c: &mut Criterion) {
    c.bench_function("chaintree_map_tree_bucket_get", |b| {
        let mut m: ChainTreeMap<u64, u64, BuildHasherDefault<Clustered>> =
            ChainTreeMap::with_hasher(BuildHasherDefault::default());
        let keys: Vec<u64> = lcg(5).take(1_000).collect();
        for &k in &keys {
            m.put(k, k);
        }
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(m.get(k));
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_insert, bench_get_hit, bench_get_miss, bench_remove, bench_tree_bucket
}
criterion_main!(benches);
