use std::hash::BuildHasher;
use std::hash::Hash;
use std::hash::RandomState;

use clap::Parser;
use clap::ValueEnum;
use robin_hash::HashMap;
use robin_hash::HashTable;
use robin_hash::hash_table::Entry;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Keys {
    /// Sequential integers.
    Sequential,
    /// Short formatted strings.
    Strings,
    /// Integers hashed into a handful of distinct values.
    Colliding,
}

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    #[arg(short = 'k', long = "keys", value_enum, default_value_t = Keys::Sequential)]
    keys: Keys,

    /// Remove every n-th key after filling, to show how removal shortens probes.
    #[arg(short = 'r', long = "remove_every")]
    remove_every: Option<u64>,
}

fn fill_table(args: &Args) {
    let state = RandomState::new();
    let hash = |value: &u64| match args.keys {
        Keys::Colliding => state.hash_one(value % 16),
        _ => state.hash_one(value),
    };

    let mut table: HashTable<u64> = HashTable::with_capacity(args.target_capacity);
    println!("Actual capacity: {}", table.capacity());
    println!("Bucket count: {}", table.bucket_count());

    let num_values = table.capacity() as u64;
    // Colliding keys share one run per distinct hash, which gets long quickly.
    let num_values = match args.keys {
        Keys::Colliding => num_values.min(512),
        _ => num_values,
    };

    for value in 0..num_values {
        match table.entry(hash(&value), |&v| v == value, hash) {
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
            Entry::Occupied(_) => {
                panic!("Value already exists in table: {value}");
            }
        }
    }
    report(table.len(), table.capacity());
    table.probe_histogram().print();
    table.debug_stats().print();

    if let Some(every) = args.remove_every.filter(|&n| n > 0) {
        table.retain(|v| *v % every != 0);
        println!("After removing every {every}th key:");
        report(table.len(), table.capacity());
        table.probe_histogram().print();
        table.debug_stats().print();
    }
}

fn fill_map<K: Hash + Eq>(args: &Args, key: impl Fn(u64) -> K) {
    let mut map: HashMap<K, u64> = HashMap::with_capacity(args.target_capacity);
    println!("Actual capacity: {}", map.capacity());

    let num_values = map.capacity() as u64;
    for value in 0..num_values {
        map.insert(key(value), value);
    }
    report(map.len(), map.capacity());
    map.probe_histogram().print();
    map.debug_stats().print();

    if let Some(every) = args.remove_every.filter(|&n| n > 0) {
        map.retain(|_, v| *v % every != 0);
        println!("After removing every {every}th key:");
        report(map.len(), map.capacity());
        map.probe_histogram().print();
        map.debug_stats().print();
    }
}

fn report(len: usize, capacity: usize) {
    println!("Inserted {len} values");
    println!(
        "Fill relative to capacity: {:.2}%",
        (len as f64 / capacity as f64) * 100.0
    );
}

fn main() {
    let args = Args::parse();

    println!(
        "Creating table with target capacity {} ({:?} keys)",
        args.target_capacity, args.keys
    );

    match args.keys {
        Keys::Sequential | Keys::Colliding => fill_table(&args),
        Keys::Strings => fill_map(&args, |value| format!("key_{value:08}")),
    }
}
