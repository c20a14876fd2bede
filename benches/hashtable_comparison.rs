use alloc::format;
use alloc::vec::Vec;
use core::hash::Hash;
use core::hash::Hasher;
use core::hint::black_box;

use criterion::AxisScale;
use criterion::BatchSize;
use criterion::Criterion;
use criterion::PlotConfiguration;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use hashbrown::hash_table::Entry as HashbrownEntry;
use hashbrown::hash_table::HashTable as HashbrownHashTable;
use rand::Rng;
use rand::SeedableRng;
use rand::TryRngCore;
use rand::rngs::OsRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand_distr::Zipf;
use robin_hash::HashTable as RobinHashTable;
use robin_hash::hash_table::Entry as RobinEntry;
use siphasher::sip::SipHasher;

extern crate alloc;

trait KeyValuePair: Clone {
    fn new(key: u64) -> Self;

    fn hash_key(&self) -> u64;
    fn eq_key(&self, other: &Self) -> bool;
}

fn sip_hash(key: impl Hash) -> u64 {
    let mut hasher = SipHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}

#[derive(Clone)]
struct SmallTestItem {
    key: u64,
}

impl KeyValuePair for SmallTestItem {
    fn new(key: u64) -> Self {
        black_box(Self { key })
    }

    fn hash_key(&self) -> u64 {
        sip_hash(self.key)
    }

    fn eq_key(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

#[derive(Clone)]
struct StringTestItem {
    key: String,
    _value: u64,
}

impl KeyValuePair for StringTestItem {
    fn new(key: u64) -> Self {
        black_box(Self {
            key: format!("key_{key:016X}"),
            _value: key,
        })
    }

    fn hash_key(&self) -> u64 {
        sip_hash(&self.key)
    }

    fn eq_key(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

#[derive(Clone)]
struct LargeTestItem {
    key: u64,
    _payload: [u64; 32],
}

impl KeyValuePair for LargeTestItem {
    fn new(key: u64) -> Self {
        let mut payload = [0u64; 32];
        for (i, word) in payload.iter_mut().enumerate() {
            *word = key.rotate_left(i as u32);
        }
        black_box(Self {
            key,
            _payload: payload,
        })
    }

    fn hash_key(&self) -> u64 {
        sip_hash(self.key)
    }

    fn eq_key(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

/// The operations every benchmark needs, implemented once per table so the
/// benchmark bodies stay identical between the two contenders.
trait BenchTable<T: KeyValuePair>: Sized {
    const NAME: &'static str;

    fn with_capacity(capacity: usize) -> Self;
    fn capacity(&self) -> usize;
    fn insert_unique(&mut self, hash: u64, item: T);
    fn upsert(&mut self, hash: u64, item: T);
    /// Inserts when absent, removes when present.
    fn toggle(&mut self, hash: u64, item: T);
    fn find(&self, hash: u64, item: &T) -> Option<&T>;
    fn remove(&mut self, hash: u64, item: &T) -> Option<T>;
    fn visit_all(&self) -> usize;
    fn drain_all(&mut self) -> usize;
}

impl<T: KeyValuePair> BenchTable<T> for RobinHashTable<T> {
    const NAME: &'static str = "robin_hash";

    fn with_capacity(capacity: usize) -> Self {
        RobinHashTable::with_capacity(capacity)
    }

    fn capacity(&self) -> usize {
        RobinHashTable::capacity(self)
    }

    fn insert_unique(&mut self, hash: u64, item: T) {
        match self.entry(hash, |v| v.eq_key(&item), |v| v.hash_key()) {
            RobinEntry::Vacant(entry) => {
                black_box(entry.insert(item));
            }
            RobinEntry::Occupied(_) => unreachable!(),
        }
    }

    fn upsert(&mut self, hash: u64, item: T) {
        match self.entry(hash, |v| v.eq_key(&item), |v| v.hash_key()) {
            RobinEntry::Vacant(entry) => {
                black_box(entry.insert(item));
            }
            RobinEntry::Occupied(mut entry) => {
                *entry.get_mut() = item;
            }
        }
    }

    fn toggle(&mut self, hash: u64, item: T) {
        match self.entry(hash, |v| v.eq_key(&item), |v| v.hash_key()) {
            RobinEntry::Vacant(entry) => {
                entry.insert(item);
            }
            RobinEntry::Occupied(entry) => {
                black_box(entry.remove());
            }
        }
    }

    fn find(&self, hash: u64, item: &T) -> Option<&T> {
        RobinHashTable::find(self, hash, |v| v.eq_key(item))
    }

    fn remove(&mut self, hash: u64, item: &T) -> Option<T> {
        RobinHashTable::remove(self, hash, |v| v.eq_key(item))
    }

    fn visit_all(&self) -> usize {
        self.iter().map(|v| black_box(v)).count()
    }

    fn drain_all(&mut self) -> usize {
        self.drain().map(|v| black_box(v)).count()
    }
}

impl<T: KeyValuePair> BenchTable<T> for HashbrownHashTable<T> {
    const NAME: &'static str = "hashbrown";

    fn with_capacity(capacity: usize) -> Self {
        HashbrownHashTable::with_capacity(capacity)
    }

    fn capacity(&self) -> usize {
        HashbrownHashTable::capacity(self)
    }

    fn insert_unique(&mut self, hash: u64, item: T) {
        match self.entry(hash, |v| v.eq_key(&item), |v| v.hash_key()) {
            HashbrownEntry::Vacant(entry) => {
                black_box(entry.insert(item));
            }
            HashbrownEntry::Occupied(_) => unreachable!(),
        }
    }

    fn upsert(&mut self, hash: u64, item: T) {
        match self.entry(hash, |v| v.eq_key(&item), |v| v.hash_key()) {
            HashbrownEntry::Vacant(entry) => {
                black_box(entry.insert(item));
            }
            HashbrownEntry::Occupied(mut entry) => {
                *entry.get_mut() = item;
            }
        }
    }

    fn toggle(&mut self, hash: u64, item: T) {
        match self.entry(hash, |v| v.eq_key(&item), |v| v.hash_key()) {
            HashbrownEntry::Vacant(entry) => {
                entry.insert(item);
            }
            HashbrownEntry::Occupied(entry) => {
                black_box(entry.remove().0);
            }
        }
    }

    fn find(&self, hash: u64, item: &T) -> Option<&T> {
        HashbrownHashTable::find(self, hash, |v| v.eq_key(item))
    }

    fn remove(&mut self, hash: u64, item: &T) -> Option<T> {
        match self.find_entry(hash, |v| v.eq_key(item)) {
            Ok(entry) => Some(entry.remove().0),
            Err(_) => None,
        }
    }

    fn visit_all(&self) -> usize {
        self.iter().map(|v| black_box(v)).count()
    }

    fn drain_all(&mut self) -> usize {
        self.drain().map(|v| black_box(v)).count()
    }
}

const SIZES: &[usize] = &[
    (1 << 10),
    (1 << 11),
    (1 << 12),
    (1 << 13),
    (1 << 14),
    (1 << 15),
    (1 << 16),
    (1 << 17),
    (1 << 18),
];

fn random_items<TestItem: KeyValuePair>(count: usize) -> Vec<(u64, TestItem)> {
    let mut rng = OsRng;
    (0..count)
        .map(|_| {
            let item = TestItem::new(rng.try_next_u64().unwrap());
            (item.hash_key(), item)
        })
        .collect()
}

fn sequential_items<TestItem: KeyValuePair>(keys: impl Iterator<Item = u64>) -> Vec<(u64, TestItem)> {
    keys.map(|key| {
        let item = TestItem::new(key);
        (item.hash_key(), item)
    })
    .collect()
}

fn shuffled<T: Clone>(items: &[T]) -> Vec<T> {
    let mut items = items.to_vec();
    items.shuffle(&mut SmallRng::from_os_rng());
    items
}

fn filled<TestItem: KeyValuePair, Table: BenchTable<TestItem>>(
    size: usize,
    items: &[(u64, TestItem)],
) -> Table {
    let mut table = Table::with_capacity(size);
    let capacity = table.capacity();
    for (hash, item) in items.iter().take(capacity).cloned() {
        table.insert_unique(hash, item);
    }
    table
}

fn group_name<TestItem>(name: &str) -> String {
    format!("{name}_{}", core::any::type_name::<TestItem>())
}

fn insert_random_case<TestItem: KeyValuePair, Table: BenchTable<TestItem>>(
    c: &mut criterion::BenchmarkGroup<'_, criterion::measurement::WallTime>,
    size: usize,
    items: &[(u64, TestItem)],
    preallocate: bool,
) {
    let capacity = Table::with_capacity(size).capacity();
    c.throughput(Throughput::Elements(capacity as u64));
    c.bench_function(Table::NAME, |b| {
        b.iter_batched(
            || shuffled(items),
            |items| {
                let mut table = Table::with_capacity(if preallocate { size } else { 0 });
                for (hash, item) in items.into_iter().take(capacity) {
                    table.insert_unique(hash, item);
                }
                black_box(table)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_insert_random<TestItem: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    for preallocate in [false, true] {
        let name = if preallocate {
            "insert_random_preallocated"
        } else {
            "insert_random"
        };
        let mut group = c.benchmark_group(group_name::<TestItem>(name));
        group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

        for &size in SIZES[..=MAX_SIZE].iter() {
            let robin_capacity = RobinHashTable::<TestItem>::with_capacity(size).capacity();
            let hashbrown_capacity = HashbrownHashTable::<TestItem>::with_capacity(size).capacity();
            let items = random_items::<TestItem>(robin_capacity.max(hashbrown_capacity));

            insert_random_case::<TestItem, RobinHashTable<TestItem>>(
                &mut group,
                size,
                &items,
                preallocate,
            );
            insert_random_case::<TestItem, HashbrownHashTable<TestItem>>(
                &mut group,
                size,
                &items,
                preallocate,
            );
        }

        group.finish();
    }
}

fn collect_find_case<TestItem: KeyValuePair, Table: BenchTable<TestItem>>(
    c: &mut criterion::BenchmarkGroup<'_, criterion::measurement::WallTime>,
    size: usize,
    items: &[(u64, TestItem)],
) {
    let capacity = Table::with_capacity(size).capacity();
    c.throughput(Throughput::Elements(capacity as u64 * 2));
    c.bench_function(Table::NAME, |b| {
        b.iter_batched(
            || (shuffled(items), shuffled(items)),
            |(inserts, lookups)| {
                let mut table = Table::with_capacity(0);
                for (hash, item) in inserts.into_iter().take(capacity) {
                    table.insert_unique(hash, item);
                }
                for (hash, item) in lookups.iter().take(capacity) {
                    black_box(table.find(*hash, item));
                }
                black_box(table)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_collect_find<TestItem: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(group_name::<TestItem>("collect_find"));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let robin_capacity = RobinHashTable::<TestItem>::with_capacity(size).capacity();
        let hashbrown_capacity = HashbrownHashTable::<TestItem>::with_capacity(size).capacity();
        let items = random_items::<TestItem>(robin_capacity.max(hashbrown_capacity));

        collect_find_case::<TestItem, RobinHashTable<TestItem>>(&mut group, size, &items);
        collect_find_case::<TestItem, HashbrownHashTable<TestItem>>(&mut group, size, &items);
    }

    group.finish();
}

fn find_case<TestItem: KeyValuePair, Table: BenchTable<TestItem>>(
    c: &mut criterion::BenchmarkGroup<'_, criterion::measurement::WallTime>,
    size: usize,
    stored: &[(u64, TestItem)],
    probes: &[(u64, TestItem)],
) {
    let table: Table = filled(size, stored);
    let capacity = table.capacity();
    c.throughput(Throughput::Elements(capacity as u64));
    c.bench_function(Table::NAME, |b| {
        b.iter_batched(
            || shuffled(probes),
            |probes| {
                for (hash, item) in probes.iter().take(capacity) {
                    black_box(table.find(*hash, item));
                }
            },
            BatchSize::SmallInput,
        )
    });
}

/// Lookups against a full table: all hits, alternating hits and misses, or all misses.
fn bench_find<TestItem: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    for (name, hit_every) in [("find_hit", 1), ("find_hit_miss", 2), ("find_miss", 0)] {
        let mut group = c.benchmark_group(group_name::<TestItem>(name));
        group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

        for &size in SIZES[..=MAX_SIZE].iter() {
            let robin_capacity = RobinHashTable::<TestItem>::with_capacity(size).capacity();
            let hashbrown_capacity = HashbrownHashTable::<TestItem>::with_capacity(size).capacity();
            let count = robin_capacity.max(hashbrown_capacity) as u64;

            // Even keys are stored, odd keys never are.
            let stored = sequential_items::<TestItem>((0..count).map(|k| k * 2));
            let probes = sequential_items::<TestItem>((0..count).map(|k| match hit_every {
                0 => k * 2 + 1,
                1 => k * 2,
                _ => k,
            }));

            find_case::<TestItem, RobinHashTable<TestItem>>(&mut group, size, &stored, &probes);
            find_case::<TestItem, HashbrownHashTable<TestItem>>(&mut group, size, &stored, &probes);
        }

        group.finish();
    }
}

fn remove_case<TestItem: KeyValuePair, Table: BenchTable<TestItem>>(
    c: &mut criterion::BenchmarkGroup<'_, criterion::measurement::WallTime>,
    size: usize,
    items: &[(u64, TestItem)],
) {
    let capacity = Table::with_capacity(size).capacity();
    c.throughput(Throughput::Elements(capacity as u64));
    c.bench_function(Table::NAME, |b| {
        b.iter_batched(
            || (filled::<TestItem, Table>(size, items), shuffled(items)),
            |(mut table, order)| {
                for (hash, item) in order.iter().take(capacity) {
                    black_box(table.remove(*hash, item));
                }
                black_box(table)
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_remove<TestItem: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(group_name::<TestItem>("remove"));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let robin_capacity = RobinHashTable::<TestItem>::with_capacity(size).capacity();
        let hashbrown_capacity = HashbrownHashTable::<TestItem>::with_capacity(size).capacity();
        let items = random_items::<TestItem>(robin_capacity.max(hashbrown_capacity));

        remove_case::<TestItem, RobinHashTable<TestItem>>(&mut group, size, &items);
        remove_case::<TestItem, HashbrownHashTable<TestItem>>(&mut group, size, &items);
    }

    group.finish();
}

fn iteration_case<TestItem: KeyValuePair, Table: BenchTable<TestItem>>(
    c: &mut criterion::BenchmarkGroup<'_, criterion::measurement::WallTime>,
    size: usize,
    items: &[(u64, TestItem)],
    drain: bool,
) {
    let capacity = Table::with_capacity(size).capacity();
    c.throughput(Throughput::Elements(capacity as u64));
    if drain {
        c.bench_function(Table::NAME, |b| {
            b.iter_batched(
                || filled::<TestItem, Table>(size, items),
                |mut table| {
                    black_box(table.drain_all());
                    black_box(table)
                },
                BatchSize::LargeInput,
            )
        });
    } else {
        let table: Table = filled(size, items);
        c.bench_function(Table::NAME, |b| b.iter(|| black_box(table.visit_all())));
    }
}

fn bench_iteration<TestItem: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    for (name, drain) in [("iteration", false), ("drain", true)] {
        let mut group = c.benchmark_group(group_name::<TestItem>(name));
        group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

        for &size in SIZES[..=MAX_SIZE].iter() {
            let robin_capacity = RobinHashTable::<TestItem>::with_capacity(size).capacity();
            let hashbrown_capacity = HashbrownHashTable::<TestItem>::with_capacity(size).capacity();
            let items = random_items::<TestItem>(robin_capacity.max(hashbrown_capacity));

            iteration_case::<TestItem, RobinHashTable<TestItem>>(&mut group, size, &items, drain);
            iteration_case::<TestItem, HashbrownHashTable<TestItem>>(
                &mut group, size, &items, drain,
            );
        }

        group.finish();
    }
}

#[derive(Clone, Copy)]
enum Operation {
    Find,
    Insert,
    Remove,
}

fn mixed_zipf_case<TestItem: KeyValuePair, Table: BenchTable<TestItem>>(
    c: &mut criterion::BenchmarkGroup<'_, criterion::measurement::WallTime>,
    size: usize,
    operations: &[Operation],
) {
    const KEY_SPACE_MULTIPLIER: f32 = 2.0;

    let capacity = Table::with_capacity(size).capacity();
    let insert_distr = Zipf::new(capacity as f32 - 1.0, 1.0).unwrap();
    let lookup_distr = Zipf::new(capacity as f32 * KEY_SPACE_MULTIPLIER - 1.0, 1.0).unwrap();
    let mut rng = SmallRng::from_os_rng();

    c.throughput(Throughput::Elements(capacity as u64 * 3));
    c.bench_function(Table::NAME, |b| {
        b.iter_batched(
            || shuffled(operations),
            |operations| {
                let mut table = Table::with_capacity(0);
                for operation in operations.into_iter().take(capacity * 3) {
                    match operation {
                        Operation::Insert => {
                            let item = TestItem::new(rng.sample(insert_distr) as u64);
                            table.upsert(item.hash_key(), item);
                        }
                        Operation::Remove => {
                            let item = TestItem::new(rng.sample(lookup_distr) as u64);
                            black_box(table.remove(item.hash_key(), &item));
                        }
                        Operation::Find => {
                            let item = TestItem::new(rng.sample(lookup_distr) as u64);
                            black_box(table.find(item.hash_key(), &item));
                        }
                    }
                }
                black_box(table)
            },
            BatchSize::SmallInput,
        )
    });
}

/// Skewed mix of finds, inserts and removes where a few hot keys dominate.
fn bench_mixed_probabilistic_zipf<TestItem: KeyValuePair, const MAX_SIZE: usize>(
    c: &mut Criterion,
) {
    for exponent in [1.0, 1.3] {
        let mut group = c.benchmark_group(group_name::<TestItem>(&format!(
            "mixed_probabilistic_zipf_{exponent:.01}"
        )));
        group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

        for &size in SIZES[..=MAX_SIZE].iter() {
            let robin_capacity = RobinHashTable::<TestItem>::with_capacity(size).capacity();
            let hashbrown_capacity = HashbrownHashTable::<TestItem>::with_capacity(size).capacity();

            let mut rng = SmallRng::from_os_rng();
            let op_distr = Zipf::new(3.0, exponent).unwrap();
            let operations = (0..robin_capacity.max(hashbrown_capacity) * 3)
                .map(|_| {
                    let op_choice: f64 = rng.sample(op_distr);
                    if op_choice <= 1.0 {
                        Operation::Find
                    } else if op_choice <= 2.0 {
                        Operation::Insert
                    } else {
                        Operation::Remove
                    }
                })
                .collect::<Vec<Operation>>();

            mixed_zipf_case::<TestItem, RobinHashTable<TestItem>>(&mut group, size, &operations);
            mixed_zipf_case::<TestItem, HashbrownHashTable<TestItem>>(
                &mut group,
                size,
                &operations,
            );
        }

        group.finish();
    }
}

fn churn_case<TestItem: KeyValuePair, Table: BenchTable<TestItem>>(
    c: &mut criterion::BenchmarkGroup<'_, criterion::measurement::WallTime>,
    size: usize,
    toggles: &[(u64, TestItem)],
) {
    let capacity = Table::with_capacity(size).capacity();
    c.throughput(Throughput::Elements(capacity as u64 * 2));
    c.bench_function(Table::NAME, |b| {
        b.iter_batched(
            || shuffled(toggles),
            |toggles| {
                let mut table = Table::with_capacity(0);
                for (hash, item) in toggles.into_iter().take(capacity * 2) {
                    table.toggle(hash, item);
                }
                black_box(table)
            },
            BatchSize::SmallInput,
        )
    });
}

/// Every key shows up twice, so each one is inserted and later removed.
/// Removal-heavy loads stress backward shifting.
fn bench_churn<TestItem: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(group_name::<TestItem>("churn"));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let robin_capacity = RobinHashTable::<TestItem>::with_capacity(size).capacity();
        let hashbrown_capacity = HashbrownHashTable::<TestItem>::with_capacity(size).capacity();

        let toggles = sequential_items::<TestItem>(0..robin_capacity.max(hashbrown_capacity) as u64)
            .into_iter()
            .flat_map(|(hash, item)| [(hash, item.clone()), (hash, item)])
            .collect::<Vec<(u64, TestItem)>>();

        churn_case::<TestItem, RobinHashTable<TestItem>>(&mut group, size, &toggles);
        churn_case::<TestItem, HashbrownHashTable<TestItem>>(&mut group, size, &toggles);
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_insert_random::<SmallTestItem, 8>,
    bench_insert_random::<StringTestItem, 8>,
    bench_insert_random::<LargeTestItem, 5>,
    bench_collect_find::<SmallTestItem, 8>,
    bench_collect_find::<StringTestItem, 8>,
    bench_collect_find::<LargeTestItem, 5>,
    bench_find::<SmallTestItem, 8>,
    bench_find::<StringTestItem, 8>,
    bench_find::<LargeTestItem, 5>,
    bench_remove::<SmallTestItem, 8>,
    bench_remove::<StringTestItem, 8>,
    bench_remove::<LargeTestItem, 5>,
    bench_iteration::<SmallTestItem, 8>,
    bench_iteration::<StringTestItem, 8>,
    bench_iteration::<LargeTestItem, 5>,
    bench_mixed_probabilistic_zipf::<SmallTestItem, 8>,
    bench_mixed_probabilistic_zipf::<StringTestItem, 8>,
    bench_mixed_probabilistic_zipf::<LargeTestItem, 5>,
    bench_churn::<SmallTestItem, 8>,
    bench_churn::<StringTestItem, 8>,
    bench_churn::<LargeTestItem, 5>,
);

criterion_main!(benches);
