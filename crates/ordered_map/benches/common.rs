use std::collections::BTreeMap;
use std::hint::black_box;
use std::time::{Duration, Instant};

use bench::{apply_medium_runtime_config, apply_small_runtime_config, iter_rng, mix_seed, seed_base};
use criterion::measurement::Measurement;
use criterion::{BenchmarkGroup, BenchmarkId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use ordered_map::OrderedMap;

const SIZES: [usize; 4] = [1_000, 16_000, 64_000, 256_000];
const OPS_PER_ITER: usize = 200;
const GET_HIT_RATE_PERCENT: u64 = 80;
const MIXED_UPDATES_PER_ITER: usize = OPS_PER_ITER / 10; // 10% inserts, 10% erases, 80% reads.
const SCAN_STEPS: usize = 16;

/// The operations the workloads need, so `OrderedMap` and `BTreeMap` run
/// identical op streams.
pub trait BenchMap {
    fn empty() -> Self;
    fn len(&self) -> usize;
    fn get(&self, key: u64) -> Option<u64>;
    /// Sum of up to `steps` values starting at `key`, walking in order.
    fn scan_from(&self, key: u64, steps: usize) -> u64;
    fn insert(&mut self, key: u64, value: u64) -> bool;
    fn erase(&mut self, key: u64) -> Option<u64>;
}

impl BenchMap for OrderedMap<u64, u64> {
    fn empty() -> Self {
        OrderedMap::new()
    }

    fn len(&self) -> usize {
        OrderedMap::len(self)
    }

    fn get(&self, key: u64) -> Option<u64> {
        OrderedMap::get(self, &key).copied()
    }

    fn scan_from(&self, key: u64, steps: usize) -> u64 {
        let mut cur = self.find(&key);
        let mut sum = 0u64;
        for _ in 0..steps {
            let Ok((_, v)) = self.entry(cur) else { break };
            sum = sum.wrapping_add(*v);
            let Ok(next) = self.next(cur) else { break };
            cur = next;
        }
        sum
    }

    fn insert(&mut self, key: u64, value: u64) -> bool {
        OrderedMap::insert(self, key, value).1
    }

    fn erase(&mut self, key: u64) -> Option<u64> {
        let cur = self.find(&key);
        OrderedMap::erase(self, cur).ok().map(|(_, v)| v)
    }
}

impl BenchMap for BTreeMap<u64, u64> {
    fn empty() -> Self {
        BTreeMap::new()
    }

    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn get(&self, key: u64) -> Option<u64> {
        BTreeMap::get(self, &key).copied()
    }

    fn scan_from(&self, key: u64, steps: usize) -> u64 {
        if !self.contains_key(&key) {
            return 0;
        }
        self.range(key..)
            .take(steps)
            .fold(0u64, |acc, (_, v)| acc.wrapping_add(*v))
    }

    fn insert(&mut self, key: u64, value: u64) -> bool {
        match self.entry(key) {
            std::collections::btree_map::Entry::Vacant(e) => {
                e.insert(value);
                true
            }
            std::collections::btree_map::Entry::Occupied(_) => false,
        }
    }

    fn erase(&mut self, key: u64) -> Option<u64> {
        self.remove(&key)
    }
}

#[derive(Clone)]
enum Op {
    Get { key: u64 },
    Scan { key: u64 },
    Insert { key: u64, value: u64 },
    Erase { key: u64 },
}

fn build<M: BenchMap>(keys: &[u64], seed: u64) -> M {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut map = M::empty();
    for &k in keys {
        let v: u64 = rng.random();
        black_box(map.insert(k, v));
    }
    map
}

fn run_workload<M, T, G>(group: &mut BenchmarkGroup<'_, T>, label: &str, workload_id: u64, generate: G)
where
    T: Measurement<Value = Duration>,
    M: BenchMap,
    G: Fn(&[u64], usize, u64, u64, &mut StdRng) -> Vec<Op>,
{
    for &size in &SIZES {
        apply_small_runtime_config(group);
        let base_seed = seed_base(workload_id, size as u64);
        let keys = generate_initial_keys(size, base_seed);
        let mut map: M = build(&keys, base_seed ^ 0x11_22_33_44);

        group.bench_function(BenchmarkId::new(label, size), |bencher| {
            bencher.iter_custom(|iters| {
                let mut total = Duration::ZERO;
                for iter in 0..iters {
                    let mut rng = iter_rng(base_seed, iter);
                    let ops = generate(&keys, size, base_seed, iter, &mut rng);
                    let start = Instant::now();
                    run_ops(&mut map, &ops);
                    black_box(map.len());
                    total += start.elapsed();
                }
                total
            })
        });
    }
}

pub fn bench_read<M, T>(group: &mut BenchmarkGroup<'_, T>, label: &str)
where
    T: Measurement<Value = Duration>,
    M: BenchMap,
{
    run_workload::<M, T, _>(group, label, 1, |keys, _, _, _, rng| {
        (0..OPS_PER_ITER).map(|_| read_op(keys, rng)).collect()
    });
}

pub fn bench_update<M, T>(group: &mut BenchmarkGroup<'_, T>, label: &str)
where
    T: Measurement<Value = Duration>,
    M: BenchMap,
{
    run_workload::<M, T, _>(group, label, 2, generate_update_ops);
}

pub fn bench_mixed<M, T>(group: &mut BenchmarkGroup<'_, T>, label: &str)
where
    T: Measurement<Value = Duration>,
    M: BenchMap,
{
    run_workload::<M, T, _>(group, label, 3, generate_mixed_ops);
}

/// Full ascending traversal plus a deep copy.
pub fn bench_traverse<T>(group: &mut BenchmarkGroup<'_, T>)
where
    T: Measurement<Value = Duration>,
{
    for &size in &SIZES {
        apply_medium_runtime_config(group);
        let base_seed = seed_base(4, size as u64);
        let keys = generate_initial_keys(size, base_seed);
        let ours: OrderedMap<u64, u64> = build(&keys, base_seed);
        let baseline: BTreeMap<u64, u64> = build(&keys, base_seed);

        group.bench_function(BenchmarkId::new("ordered_map/iter", size), |b| {
            b.iter(|| ours.values().fold(0u64, |acc, v| acc.wrapping_add(*v)))
        });
        group.bench_function(BenchmarkId::new("std_btree/iter", size), |b| {
            b.iter(|| baseline.values().fold(0u64, |acc, v| acc.wrapping_add(*v)))
        });
        group.bench_function(BenchmarkId::new("ordered_map/clone", size), |b| {
            b.iter(|| black_box(ours.clone()).len())
        });
        group.bench_function(BenchmarkId::new("std_btree/clone", size), |b| {
            b.iter(|| black_box(baseline.clone()).len())
        });
    }
}

fn generate_initial_keys(size: usize, base_seed: u64) -> Vec<u64> {
    (0..size)
        .map(|i| mix_seed(base_seed ^ (i as u64)))
        .collect()
}

fn read_op(keys: &[u64], rng: &mut StdRng) -> Op {
    let hit = rng.random_range(0..100) < GET_HIT_RATE_PERCENT;
    let key = if hit {
        keys[rng.random_range(0..keys.len())]
    } else {
        rng.random()
    };
    if rng.random::<u64>() & 1 == 0 {
        Op::Get { key }
    } else {
        Op::Scan { key }
    }
}

fn fresh_key(size: usize, base_seed: u64, iter: u64, per_iter: usize, index: usize) -> u64 {
    let id = (size as u64)
        .wrapping_add(iter.wrapping_mul(per_iter as u64))
        .wrapping_add(index as u64);
    mix_seed(base_seed ^ id)
}

fn generate_update_ops(
    _keys: &[u64],
    size: usize,
    base_seed: u64,
    iter: u64,
    rng: &mut StdRng,
) -> Vec<Op> {
    let inserts = OPS_PER_ITER / 2;
    let mut inserted = Vec::with_capacity(inserts);
    let mut ops = Vec::with_capacity(OPS_PER_ITER);
    for i in 0..OPS_PER_ITER {
        if i % 2 == 0 {
            let key = fresh_key(size, base_seed, iter, inserts, i / 2);
            inserted.push(key);
            ops.push(Op::Insert {
                key,
                value: rng.random(),
            });
        } else {
            let idx = rng.random_range(0..inserted.len());
            ops.push(Op::Erase {
                key: inserted.swap_remove(idx),
            });
        }
    }
    debug_assert!(inserted.is_empty());
    ops
}

fn generate_mixed_ops(
    keys: &[u64],
    size: usize,
    base_seed: u64,
    iter: u64,
    rng: &mut StdRng,
) -> Vec<Op> {
    let mut remaining_inserts = MIXED_UPDATES_PER_ITER;
    let mut remaining_erases = MIXED_UPDATES_PER_ITER;
    let mut remaining_reads = OPS_PER_ITER - 2 * MIXED_UPDATES_PER_ITER;
    let mut live: Vec<u64> = Vec::with_capacity(MIXED_UPDATES_PER_ITER);
    let mut ops = Vec::with_capacity(OPS_PER_ITER);

    while ops.len() < OPS_PER_ITER {
        let remaining_slots = OPS_PER_ITER - ops.len();
        let do_read = remaining_reads > 0
            && (remaining_inserts + remaining_erases == 0
                || rng.random_range(0..remaining_slots) < remaining_reads);
        if do_read {
            ops.push(read_op(keys, rng));
            remaining_reads -= 1;
            continue;
        }

        let can_erase = remaining_erases > 0 && !live.is_empty();
        let do_erase = can_erase
            && (remaining_inserts == 0
                || rng.random_range(0..(remaining_inserts + remaining_erases)) < remaining_erases);
        if do_erase {
            let idx = rng.random_range(0..live.len());
            ops.push(Op::Erase {
                key: live.swap_remove(idx),
            });
            remaining_erases -= 1;
        } else {
            let index = MIXED_UPDATES_PER_ITER - remaining_inserts;
            let key = fresh_key(size, base_seed, iter, MIXED_UPDATES_PER_ITER, index);
            live.push(key);
            ops.push(Op::Insert {
                key,
                value: rng.random(),
            });
            remaining_inserts -= 1;
        }
    }

    debug_assert!(live.is_empty());
    ops
}

fn run_ops<M: BenchMap>(map: &mut M, ops: &[Op]) {
    for op in ops {
        match *op {
            Op::Get { key } => {
                black_box(map.get(key));
            }
            Op::Scan { key } => {
                black_box(map.scan_from(key, SCAN_STEPS));
            }
            Op::Insert { key, value } => {
                black_box(map.insert(key, value));
            }
            Op::Erase { key } => {
                black_box(map.erase(key));
            }
        }
    }
}
