use std::collections::BTreeMap;

use criterion::{Criterion, criterion_group, criterion_main};

use ordered_map::OrderedMap;

mod common;

fn bench(c: &mut Criterion) {
    let mut read = c.benchmark_group("ordered_map/read");
    common::bench_read::<OrderedMap<u64, u64>, _>(&mut read, "ordered_map");
    common::bench_read::<BTreeMap<u64, u64>, _>(&mut read, "std_btree");
    read.finish();

    let mut mixed = c.benchmark_group("ordered_map/mixed");
    common::bench_mixed::<OrderedMap<u64, u64>, _>(&mut mixed, "ordered_map");
    common::bench_mixed::<BTreeMap<u64, u64>, _>(&mut mixed, "std_btree");
    mixed.finish();

    let mut update = c.benchmark_group("ordered_map/update");
    common::bench_update::<OrderedMap<u64, u64>, _>(&mut update, "ordered_map");
    common::bench_update::<BTreeMap<u64, u64>, _>(&mut update, "std_btree");
    update.finish();

    let mut traverse = c.benchmark_group("ordered_map/traverse");
    common::bench_traverse(&mut traverse);
    traverse.finish();
}

criterion_group!(benches, bench);
criterion_main!(benches);
