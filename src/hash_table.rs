//! The raw Robin Hood hash table underlying [`HashMap`](crate::HashMap) and
//! [`HashSet`](crate::HashSet).
//!
//! The table keeps two parallel arrays: one 16-bit [`Slot`] of metadata per
//! bucket and one payload per bucket. Metadata packs a 6-bit fragment of the
//! hash with a 10-bit probe distance, where a distance of zero marks an empty
//! bucket and `d > 0` means the entry sits `d - 1` buckets past its ideal
//! bucket. The metadata array carries one extra sentinel slot that is never
//! empty, so forward scans terminate without a separate bounds check.
//!
//! Insertion uses Robin Hood displacement: an entry that has travelled further
//! from its ideal bucket steals the bucket of an entry that has travelled less.
//! Every run of occupied buckets therefore stays ordered by displacement and a
//! lookup can stop as soon as it meets an entry closer to home than itself.
//! Removal closes the gap by shifting the rest of the run back one bucket, so
//! there are no tombstones.

use alloc::alloc::handle_alloc_error;
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::alloc::Layout;
use core::fmt::Debug;
use core::iter::FusedIterator;
use core::mem::MaybeUninit;

use crate::TryReserveError;

cfg_if::cfg_if! {
    if #[cfg(feature = "load-factor-ninety")] {
        const LOAD_FACTOR_NUMERATOR: u128 = 9;
        const LOAD_FACTOR_DENOMINATOR: u128 = 10;
    } else if #[cfg(feature = "load-factor-seventy-five")] {
        const LOAD_FACTOR_NUMERATOR: u128 = 3;
        const LOAD_FACTOR_DENOMINATOR: u128 = 4;
    } else {
        const LOAD_FACTOR_NUMERATOR: u128 = 4;
        const LOAD_FACTOR_DENOMINATOR: u128 = 5;
    }
}

/// The fraction of buckets that may be occupied before the table grows.
///
/// Selected at compile time by the `load-factor-*` features. The default is
/// `0.80`. `load-factor-ninety` takes precedence over
/// `load-factor-seventy-five` when both are enabled.
pub const MAX_LOAD_FACTOR: f32 = LOAD_FACTOR_NUMERATOR as f32 / LOAD_FACTOR_DENOMINATOR as f32;

#[inline(always)]
fn target_load_factor(bucket_count: usize) -> usize {
    ((bucket_count as u128 * LOAD_FACTOR_NUMERATOR) / LOAD_FACTOR_DENOMINATOR) as usize
}

#[inline(always)]
fn target_load_factor_inverse(capacity: usize) -> u128 {
    (capacity as u128 * LOAD_FACTOR_DENOMINATOR) / LOAD_FACTOR_NUMERATOR
}

/// Number of buckets needed to hold `capacity` elements, or `None` if that
/// does not fit in `usize`.
#[inline]
fn buckets_for(capacity: usize) -> Option<usize> {
    let minimum = usize::try_from(target_load_factor_inverse(capacity) + 4).ok()?;
    minimum.checked_next_power_of_two()
}

const HASHX_BITS: u32 = 6;
const HASHX_MASK: u16 = (1 << HASHX_BITS) - 1;
const MAX_DIST: u16 = u16::MAX >> HASHX_BITS;

/// Per-bucket metadata: `dist` in the high 10 bits, `hashx` in the low 6.
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
struct Slot(u16);

impl Slot {
    const EMPTY: Slot = Slot(0);
    const SENTINEL: Slot = Slot(1 << HASHX_BITS);

    #[inline(always)]
    fn occupied(hashx: u16, dist: u16) -> Self {
        debug_assert!(hashx <= HASHX_MASK);
        assert!(
            dist != 0 && dist <= MAX_DIST,
            "probe distance {dist} exceeds the slot encoding; the hash function is degenerate"
        );
        Slot((dist << HASHX_BITS) | hashx)
    }

    #[inline(always)]
    fn hashx(self) -> u16 {
        self.0 & HASHX_MASK
    }

    #[inline(always)]
    fn dist(self) -> u16 {
        self.0 >> HASHX_BITS
    }

    #[inline(always)]
    fn is_empty(self) -> bool {
        self.dist() == 0
    }

    /// The same entry one bucket further from home.
    #[inline(always)]
    fn pushed(self) -> Self {
        Slot::occupied(self.hashx(), self.dist() + 1)
    }

    /// The same entry one bucket closer to home.
    #[inline(always)]
    fn pulled(self) -> Self {
        debug_assert!(self.dist() >= 2);
        Slot(self.0 - (1 << HASHX_BITS))
    }
}

impl Debug for Slot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_empty() {
            f.write_str("..")
        } else {
            write!(f, "{:02x}:{}", self.hashx(), self.dist())
        }
    }
}

#[inline(always)]
fn hashx(hash: u64) -> u16 {
    (hash & HASHX_MASK as u64) as u16
}

/// Result of walking a probe sequence.
///
/// When `found` is set, `index` holds the matching entry. Otherwise `index` is
/// the bucket a new entry with this hash must claim, and `dist` is the
/// distance it would be stored with.
#[derive(Clone, Copy, Debug)]
struct Probe {
    index: usize,
    hashx: u16,
    dist: u16,
    found: bool,
}

/// Skips forward from `index` to the next occupied bucket.
///
/// The sentinel after the last bucket is never empty, so the scan stops at
/// `bucket_count` at the latest.
#[inline]
fn skip_empty(slots: &[Slot], mut index: usize) -> usize {
    if slots.is_empty() {
        return 0;
    }
    while slots[index].is_empty() {
        index += 1;
    }
    index
}

fn try_alloc_slice<T>(len: usize, fill: impl FnMut() -> T) -> Result<Box<[T]>, TryReserveError> {
    let layout = Layout::array::<T>(len).map_err(|_| TryReserveError::CapacityOverflow)?;
    let mut storage = Vec::new();
    storage
        .try_reserve_exact(len)
        .map_err(|_| TryReserveError::AllocError { layout })?;
    storage.resize_with(len, fill);
    Ok(storage.into_boxed_slice())
}

/// Debug statistics for hash table analysis.
///
/// Only available with the `stats` feature (and always under `cfg(test)`).
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of elements currently in the table
    pub populated: usize,
    /// Maximum load capacity before resize
    pub capacity: usize,
    /// Number of buckets allocated
    pub bucket_count: usize,
    /// Longest probe sequence of any stored entry
    pub max_probe_length: usize,
    /// Mean probe sequence length over stored entries
    pub mean_probe_length: f64,
    /// Load factor (populated / bucket_count)
    pub load_factor: f64,
    /// Total memory in bytes used by both arrays
    pub total_bytes: usize,
    /// Bytes held by empty buckets
    pub wasted_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} buckets ({:.2}% load factor, capacity {})",
            self.populated,
            self.bucket_count,
            self.load_factor * 100.0,
            self.capacity
        );
        println!(
            "Probe length: max {}, mean {:.3}",
            self.max_probe_length, self.mean_probe_length
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
        println!(
            "Memory: {} bytes wasted ({:.02}%)",
            self.wasted_bytes,
            if self.total_bytes == 0 {
                0.0
            } else {
                (self.wasted_bytes as f64 / self.total_bytes as f64) * 100.0
            }
        );
    }
}

/// Counts of stored entries per probe sequence length.
///
/// Only available with the `stats` feature (and always under `cfg(test)`).
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHistogram {
    counts: Vec<usize>,
}

#[cfg(any(test, feature = "stats"))]
impl ProbeHistogram {
    /// `counts()[n]` is the number of entries stored `n` buckets past their
    /// ideal bucket.
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// The longest probe sequence length, or `None` for an empty table.
    pub fn max_probe_length(&self) -> Option<usize> {
        self.counts.iter().rposition(|&count| count != 0)
    }

    /// Pretty-prints the histogram horizontally using stdout.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let total: usize = self.counts.iter().sum();
        let max = self.counts.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        let total_units = max_bar * 8;
        println!("probe histogram ({} entries):", total);

        let make_bar = |count: usize| -> alloc::string::String {
            if count == 0 {
                return alloc::string::String::new();
            }
            let units = ((count as u128 * total_units as u128).div_ceil(max as u128)) as usize;
            let mut bar = "█".repeat(units / 8);
            let ch = match units % 8 {
                1 => Some('▏'),
                2 => Some('▎'),
                3 => Some('▍'),
                4 => Some('▌'),
                5 => Some('▋'),
                6 => Some('▊'),
                7 => Some('▉'),
                _ => None,
            };
            bar.extend(ch);
            bar
        };

        for (psl, &count) in self.counts.iter().enumerate() {
            println!("{:>3} | {} ({})", psl, make_bar(count), count);
        }
    }
}

/// An opaque position in a [`HashTable`].
///
/// Cursors are produced by [`HashTable::begin`], [`HashTable::find_cursor`]
/// and friends, and consumed by [`HashTable::get_at`] and
/// [`HashTable::erase_at`]. A cursor is only meaningful for the table that
/// produced it and only until that table is structurally modified by anything
/// other than [`HashTable::erase_at`] with that same cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor {
    index: usize,
    end: usize,
}

impl Cursor {
    /// The bucket index this cursor points at.
    pub fn bucket(&self) -> usize {
        self.index
    }
}

/// A hash table using Robin Hood linear probing with backward-shift deletion.
///
/// `HashTable<V>` stores values of type `V` and provides insertion, lookup
/// and removal. Like `hashbrown::HashTable`, it does not hash values itself:
/// each operation takes the hash of the value being looked up and an equality
/// predicate, and operations that may grow the table also take a `hasher`
/// used to rehash the stored values.
///
/// ## Performance Characteristics
///
/// - **Memory**: 2 bytes of metadata per bucket plus the size of `V`. Hashes
///   are not stored; growing the table recomputes them with `hasher`.
/// - **Load factor**: [`MAX_LOAD_FACTOR`] of the buckets, 80% by default.
///
/// ## Example
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use robin_hash::hash_table::Entry;
/// # use robin_hash::hash_table::HashTable;
/// # use siphasher::sip::SipHasher;
/// #
/// # #[derive(Debug, PartialEq)]
/// # struct Person {
/// #     id: u64,
/// #     name: String,
/// # }
/// #
/// # fn hash_id(id: u64) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     id.hash(&mut hasher);
/// #     hasher.finish()
/// # }
///
/// let mut table = HashTable::new();
///
/// match table.entry(hash_id(123), |p: &Person| p.id == 123, |p| hash_id(p.id)) {
///     Entry::Vacant(entry) => {
///         entry.insert(Person {
///             id: 123,
///             name: "Alice".to_string(),
///         });
///     }
///     Entry::Occupied(_) => {
///         println!("Person already exists");
///     }
/// }
///
/// assert_eq!(
///     table.find(hash_id(123), |p| p.id == 123).map(|p| p.name.as_str()),
///     Some("Alice")
/// );
/// ```
pub struct HashTable<V> {
    /// `bucket_count + 1` entries, the last being the sentinel; empty when
    /// nothing is allocated.
    slots: Box<[Slot]>,
    buckets: Box<[MaybeUninit<V>]>,

    populated: usize,
    max_pop: usize,
}

impl<V> Debug for HashTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HashTable")
            .field("slots", &&self.slots[..self.buckets.len()])
            .field("populated", &self.populated)
            .field("capacity", &self.max_pop)
            .finish()
    }
}

impl<V> Clone for HashTable<V>
where
    V: Clone,
{
    /// Clones the table.
    ///
    /// If the copy cannot be allocated the result is an empty table; use
    /// [`HashTable::try_clone`] to observe the failure.
    fn clone(&self) -> Self {
        self.try_clone().unwrap_or_else(|_| Self::new())
    }
}

impl<V> Default for HashTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Drop for HashTable<V> {
    fn drop(&mut self) {
        self.drop_values();
    }
}

impl<V> HashTable<V> {
    /// Creates an empty table without allocating.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let table: HashTable<u64> = HashTable::new();
    /// assert_eq!(table.bucket_count(), 0);
    /// assert_eq!(table.capacity(), 0);
    /// ```
    pub fn new() -> Self {
        Self {
            slots: Box::new([]),
            buckets: Box::new([]),
            populated: 0,
            max_pop: 0,
        }
    }

    /// Creates a new hash table able to hold at least `capacity` elements
    /// without growing.
    ///
    /// # Panics
    ///
    /// Panics if the required bucket count overflows `usize`, and aborts via
    /// [`handle_alloc_error`] if the allocator fails.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// // Create a table that can hold at least 100 items without resizing
    /// let table: HashTable<String> = HashTable::with_capacity(100);
    /// assert!(table.capacity() >= 100);
    /// assert!(table.bucket_count().is_power_of_two());
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        match Self::try_with_capacity(capacity) {
            Ok(table) => table,
            Err(err) => infallible(err),
        }
    }

    /// Fallible version of [`HashTable::with_capacity`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::TryReserveError;
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let table = HashTable::<u64>::try_with_capacity(10).unwrap();
    /// assert!(table.capacity() >= 10);
    ///
    /// let err = HashTable::<u64>::try_with_capacity(usize::MAX).unwrap_err();
    /// assert_eq!(err, TryReserveError::CapacityOverflow);
    /// ```
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        if capacity == 0 {
            return Ok(Self::new());
        }
        let bucket_count = buckets_for(capacity).ok_or(TryReserveError::CapacityOverflow)?;
        Self::try_allocate(bucket_count)
    }

    /// Allocates both arrays for `bucket_count` buckets with every bucket
    /// empty and the sentinel in place.
    fn try_allocate(bucket_count: usize) -> Result<Self, TryReserveError> {
        debug_assert!(bucket_count.is_power_of_two());
        let slot_count = bucket_count
            .checked_add(1)
            .ok_or(TryReserveError::CapacityOverflow)?;

        let mut slots = try_alloc_slice(slot_count, || Slot::EMPTY)?;
        slots[bucket_count] = Slot::SENTINEL;
        let buckets = try_alloc_slice(bucket_count, MaybeUninit::uninit)?;

        Ok(Self {
            slots,
            buckets,
            populated: 0,
            max_pop: target_load_factor(bucket_count),
        })
    }

    #[inline(always)]
    fn bucket_mask(&self) -> usize {
        self.buckets.len().wrapping_sub(1)
    }

    /// Returns the number of elements in the table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// assert_eq!(table.len(), 0);
    ///
    /// table.entry(1, |&n: &u64| n == 1, |&n| n).or_insert(1);
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table contains no elements.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of elements the table can hold before it grows.
    ///
    /// This is `bucket_count() * MAX_LOAD_FACTOR`, rounded down.
    pub fn capacity(&self) -> usize {
        self.max_pop
    }

    /// Returns the number of buckets, which is zero or a power of two.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Walks the probe sequence for `hash`.
    ///
    /// The table must have at least one bucket.
    #[inline]
    fn lookup(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Probe {
        debug_assert!(!self.buckets.is_empty());
        let mask = self.bucket_mask();
        let hashx = hashx(hash);
        let mut index = hash as usize & mask;
        let mut dist = 1u16;

        // Stored distances never exceed MAX_DIST, so `dist` stops growing at
        // MAX_DIST + 1 at the latest.
        loop {
            let slot = self.slots[index];
            if slot.dist() < dist {
                return Probe {
                    index,
                    hashx,
                    dist,
                    found: false,
                };
            }
            // SAFETY: A non-zero distance marks an initialized bucket.
            if slot.hashx() == hashx && eq(unsafe { self.buckets[index].assume_init_ref() }) {
                return Probe {
                    index,
                    hashx,
                    dist,
                    found: true,
                };
            }
            index = (index + 1) & mask;
            dist += 1;
        }
    }

    /// Places `value` at the insertion point described by `probe` and returns
    /// the bucket it landed in.
    ///
    /// Whatever occupied that bucket is carried forward, trading places with
    /// every entry closer to its home bucket than the carried one, until an
    /// empty bucket absorbs it.
    ///
    /// # Safety
    ///
    /// `probe` must come from [`HashTable::lookup`] on this table with
    /// `found == false`, with no mutation in between, and the table must have
    /// room for one more element.
    unsafe fn insert_at(&mut self, probe: Probe, value: V) -> usize {
        debug_assert!(!probe.found);
        debug_assert!(self.populated < self.buckets.len());
        let mask = self.bucket_mask();
        let target = probe.index;
        let new_slot = Slot::occupied(probe.hashx, probe.dist);

        let mut carried_slot = core::mem::replace(&mut self.slots[target], new_slot);
        let mut carried = core::mem::replace(&mut self.buckets[target], MaybeUninit::new(value));
        let mut index = target;
        while !carried_slot.is_empty() {
            index = (index + 1) & mask;
            carried_slot = carried_slot.pushed();
            if self.slots[index].dist() < carried_slot.dist() {
                core::mem::swap(&mut carried_slot, &mut self.slots[index]);
                core::mem::swap(&mut carried, &mut self.buckets[index]);
            }
        }

        self.populated += 1;
        target
    }

    /// Inserts a value known to be absent from the table.
    ///
    /// # Safety
    ///
    /// The table must have room for one more element.
    unsafe fn insert_unique(&mut self, hash: u64, value: V) -> usize {
        let probe = self.lookup(hash, |_| false);
        // SAFETY: The probe is fresh and the caller guarantees room.
        unsafe { self.insert_at(probe, value) }
    }

    /// Closes the gap at `index` by shifting the rest of its run back one
    /// bucket. Returns how many entries moved.
    ///
    /// The bucket at `index` must already have had its value moved out.
    fn backward_shift(&mut self, mut index: usize) -> usize {
        let mask = self.bucket_mask();
        let mut shifted = 0;
        loop {
            let next = (index + 1) & mask;
            let slot = self.slots[next];
            // 0 is empty, 1 is already home.
            if slot.dist() < 2 {
                break;
            }
            self.slots[index] = slot.pulled();
            // The vacated bucket holds no value, so swapping just moves the
            // hole forward.
            self.buckets.swap(index, next);
            index = next;
            shifted += 1;
        }
        self.slots[index] = Slot::EMPTY;
        self.populated -= 1;
        shifted
    }

    /// Moves the value at `index` out of the table.
    ///
    /// # Safety
    ///
    /// `index` must be an occupied bucket.
    unsafe fn take(&mut self, index: usize) -> (V, usize) {
        debug_assert!(!self.slots[index].is_empty());
        // SAFETY: Caller guarantees the bucket is occupied, and the shift below
        // overwrites or clears its metadata before anything can observe it.
        let value = unsafe { self.buckets[index].assume_init_read() };
        let shifted = self.backward_shift(index);
        (value, shifted)
    }

    fn find_index(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<usize> {
        if self.populated == 0 {
            return None;
        }
        let probe = self.lookup(hash, eq);
        probe.found.then_some(probe.index)
    }

    /// Returns a reference to the value matching `hash` and `eq`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use robin_hash::hash_table::HashTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_u64(n: u64) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     n.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = HashTable::new();
    /// table
    ///     .entry(hash_u64(42), |&n: &u64| n == 42, |&n| hash_u64(n))
    ///     .or_insert(42);
    ///
    /// assert_eq!(table.find(hash_u64(42), |&n| n == 42), Some(&42));
    /// assert_eq!(table.find(hash_u64(7), |&n| n == 7), None);
    /// ```
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        let index = self.find_index(hash, eq)?;
        // SAFETY: `find_index` only returns occupied buckets.
        Some(unsafe { self.buckets[index].assume_init_ref() })
    }

    /// Returns a mutable reference to the value matching `hash` and `eq`.
    ///
    /// The value must not be mutated in a way that changes its hash or its
    /// equality with other values.
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        let index = self.find_index(hash, eq)?;
        // SAFETY: `find_index` only returns occupied buckets.
        Some(unsafe { self.buckets[index].assume_init_mut() })
    }

    /// Returns a cursor to the value matching `hash` and `eq`.
    pub fn find_cursor(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<Cursor> {
        let index = self.find_index(hash, eq)?;
        Some(Cursor {
            index,
            end: self.buckets.len(),
        })
    }

    /// Gets an entry for the given hash and equality predicate.
    ///
    /// The table grows first if it is at capacity, using `hasher` to rehash
    /// the stored values, so inserting through a [`VacantEntry`] never
    /// reallocates.
    ///
    /// # Panics
    ///
    /// Panics if growing the table overflows `usize`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use robin_hash::hash_table::Entry;
    /// # use robin_hash::hash_table::HashTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_str(s: &str) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     s.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = HashTable::new();
    /// let hash = hash_str("hello");
    ///
    /// match table.entry(hash, |s: &String| s == "hello", |s| hash_str(s)) {
    ///     Entry::Vacant(entry) => {
    ///         entry.insert("hello".to_string());
    ///     }
    ///     Entry::Occupied(_) => unreachable!(),
    /// }
    ///
    /// assert!(matches!(
    ///     table.entry(hash, |s: &String| s == "hello", |s| hash_str(s)),
    ///     Entry::Occupied(_)
    /// ));
    /// ```
    #[inline]
    pub fn entry(
        &mut self,
        hash: u64,
        eq: impl Fn(&V) -> bool,
        hasher: impl Fn(&V) -> u64,
    ) -> Entry<'_, V> {
        self.maybe_grow(&hasher);

        let probe = self.lookup(hash, eq);
        if probe.found {
            Entry::Occupied(OccupiedEntry {
                index: probe.index,
                table: self,
            })
        } else {
            Entry::Vacant(VacantEntry { probe, table: self })
        }
    }

    /// Removes and returns the value matching `hash` and `eq`.
    ///
    /// The rest of the value's probe run is shifted back one bucket, so no
    /// tombstone is left behind.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(42, |&n: &u64| n == 42, |&n| n).or_insert(42);
    ///
    /// assert_eq!(table.remove(42, |&n| n == 42), Some(42));
    /// assert!(table.is_empty());
    /// assert_eq!(table.remove(42, |&n| n == 42), None);
    /// ```
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        let index = self.find_index(hash, eq)?;
        // SAFETY: `find_index` only returns occupied buckets.
        let (value, _) = unsafe { self.take(index) };
        Some(value)
    }

    /// Returns a cursor to the first occupied bucket, or `None` if the table
    /// is empty.
    pub fn begin(&self) -> Option<Cursor> {
        let end = self.buckets.len();
        let index = skip_empty(&self.slots, 0);
        (index < end).then_some(Cursor { index, end })
    }

    /// Returns a cursor to the next occupied bucket after `cursor`.
    ///
    /// Returns `None` if the cursor lies outside the current bucket array,
    /// for example after the table was resized.
    pub fn advance(&self, cursor: Cursor) -> Option<Cursor> {
        if cursor.index >= self.buckets.len() {
            return None;
        }
        let end = cursor.end.min(self.buckets.len());
        let index = skip_empty(&self.slots, cursor.index + 1);
        (index < end).then_some(Cursor { index, end })
    }

    /// Returns the value under `cursor`, or `None` if the cursor no longer
    /// points at an occupied bucket.
    pub fn get_at(&self, cursor: Cursor) -> Option<&V> {
        if cursor.index >= self.buckets.len() || self.slots[cursor.index].is_empty() {
            return None;
        }
        // SAFETY: Bounds and occupancy checked above.
        Some(unsafe { self.buckets[cursor.index].assume_init_ref() })
    }

    /// Mutable version of [`HashTable::get_at`].
    pub fn get_at_mut(&mut self, cursor: Cursor) -> Option<&mut V> {
        if cursor.index >= self.buckets.len() || self.slots[cursor.index].is_empty() {
            return None;
        }
        // SAFETY: Bounds and occupancy checked above.
        Some(unsafe { self.buckets[cursor.index].assume_init_mut() })
    }

    /// Removes the value under `cursor` and returns it together with a cursor
    /// to the next value in bucket order.
    ///
    /// Walking a table with [`HashTable::begin`] and repeatedly calling
    /// `erase_at` (or [`HashTable::advance`] for values to keep) visits every
    /// value exactly once, even when backward shifting pulls values from the
    /// start of the table around to its end.
    ///
    /// # Panics
    ///
    /// Panics if `cursor` does not point at an occupied bucket.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// for n in 0..10u64 {
    ///     table.entry(n, |&v: &u64| v == n, |&v| v).or_insert(n);
    /// }
    ///
    /// let mut cursor = table.begin();
    /// while let Some(at) = cursor {
    ///     if table.get_at(at).is_some_and(|&v| v % 2 == 0) {
    ///         let (_, next) = table.erase_at(at);
    ///         cursor = next;
    ///     } else {
    ///         cursor = table.advance(at);
    ///     }
    /// }
    /// assert_eq!(table.len(), 5);
    /// ```
    pub fn erase_at(&mut self, cursor: Cursor) -> (V, Option<Cursor>) {
        assert!(
            cursor.index < self.buckets.len() && !self.slots[cursor.index].is_empty(),
            "cursor does not point at an occupied bucket"
        );
        // SAFETY: Occupancy asserted above.
        let (value, shifted) = unsafe { self.take(cursor.index) };

        // Buckets at or past `end` (including those wrapped around to the
        // front) have already been visited. If the shift pulled one of them
        // back across `end`, the visited region grows by one bucket.
        let mut end = cursor.end;
        if cursor.index + shifted >= end {
            end -= 1;
        }

        let index = skip_empty(&self.slots, cursor.index);
        (value, (index < end).then_some(Cursor { index, end }))
    }

    /// Removes all elements from the table.
    ///
    /// This operation preserves the table's allocated capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(1, |&n: &u64| n == 1, |&n| n).or_insert(1);
    /// table.entry(2, |&n: &u64| n == 2, |&n| n).or_insert(2);
    /// let buckets = table.bucket_count();
    ///
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.bucket_count(), buckets);
    /// ```
    pub fn clear(&mut self) {
        self.drop_values();
        let bucket_count = self.buckets.len();
        if bucket_count != 0 {
            self.slots[..bucket_count].fill(Slot::EMPTY);
        }
        self.populated = 0;
    }

    /// Drops every stored value and marks its bucket empty.
    fn drop_values(&mut self) {
        if self.populated == 0 {
            return;
        }
        let bucket_count = self.buckets.len();
        for index in 0..bucket_count {
            if self.slots[index].is_empty() {
                continue;
            }
            // Mark first so a panicking destructor cannot lead to a double drop.
            self.slots[index] = Slot::EMPTY;
            self.populated -= 1;
            // SAFETY: The bucket was occupied until the line above.
            unsafe { self.buckets[index].assume_init_drop() };
        }
    }

    /// Retains only the values for which `f` returns `true`.
    ///
    /// Each value is visited exactly once.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// for n in 0..100u64 {
    ///     table.entry(n, |&v: &u64| v == n, |&v| v).or_insert(n);
    /// }
    /// table.retain(|v| *v % 3 == 0);
    /// assert_eq!(table.len(), 34);
    /// ```
    pub fn retain(&mut self, mut f: impl FnMut(&mut V) -> bool) {
        if self.populated == 0 {
            return;
        }
        let bucket_count = self.buckets.len();
        let mask = self.bucket_mask();

        // Start at the head of a run so that no shift can carry a value from
        // the unvisited part of the table back over the starting point.
        let start = (0..bucket_count)
            .find(|&index| self.slots[index].dist() <= 1)
            .unwrap_or(0);

        let mut offset = 0;
        while offset < bucket_count {
            let index = (start + offset) & mask;
            if !self.slots[index].is_empty() {
                // SAFETY: The bucket is occupied.
                let keep = f(unsafe { self.buckets[index].assume_init_mut() });
                if !keep {
                    // SAFETY: Still occupied; `f` cannot touch the table.
                    drop(unsafe { self.take(index) });
                    // Re-examine the value shifted into this bucket.
                    continue;
                }
            }
            offset += 1;
        }
    }

    /// Reserves capacity for at least `additional` more elements.
    ///
    /// `hasher` must return the same hash the values were inserted with.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity overflows `usize`, and aborts via
    /// [`handle_alloc_error`] if the allocator fails.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<u64> = HashTable::new();
    /// table.reserve(50, |&v| v);
    /// assert!(table.capacity() >= 50);
    /// ```
    pub fn reserve(&mut self, additional: usize, hasher: impl Fn(&V) -> u64) {
        if let Err(err) = self.try_reserve(additional, hasher) {
            infallible(err);
        }
    }

    /// Tries to reserve capacity for at least `additional` more elements.
    ///
    /// Reservation is all-or-nothing: on error the table is left exactly as
    /// it was, with the same buckets, elements and layout.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<u64> = HashTable::new();
    /// table.entry(1, |&v| v == 1, |&v| v).or_insert(1);
    ///
    /// assert!(table.try_reserve(usize::MAX, |&v| v).is_err());
    /// assert_eq!(table.find(1, |&v| v == 1), Some(&1));
    ///
    /// assert!(table.try_reserve(100, |&v| v).is_ok());
    /// assert!(table.capacity() >= 101);
    /// ```
    pub fn try_reserve(
        &mut self,
        additional: usize,
        hasher: impl Fn(&V) -> u64,
    ) -> Result<(), TryReserveError> {
        let required = self
            .populated
            .checked_add(additional)
            .ok_or(TryReserveError::CapacityOverflow)?;
        if required <= self.max_pop {
            return Ok(());
        }
        let bucket_count = buckets_for(required).ok_or(TryReserveError::CapacityOverflow)?;
        self.try_rehash(bucket_count, &hasher)
    }

    /// Shrinks the table to the smallest bucket count that holds its
    /// elements. An empty table releases its storage entirely.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<u64> = HashTable::with_capacity(1000);
    /// table.entry(5, |&v| v == 5, |&v| v).or_insert(5);
    ///
    /// table.shrink_to_fit(|&v| v);
    /// assert!(table.capacity() < 1000);
    /// assert_eq!(table.find(5, |&v| v == 5), Some(&5));
    /// ```
    pub fn shrink_to_fit(&mut self, hasher: impl Fn(&V) -> u64) {
        if self.populated == 0 {
            *self = Self::new();
            return;
        }
        let Some(bucket_count) = buckets_for(self.populated) else {
            return;
        };
        if bucket_count < self.buckets.len()
            && let Err(err) = self.try_rehash(bucket_count, &hasher)
        {
            infallible(err);
        }
    }

    #[inline]
    fn maybe_grow(&mut self, hasher: &impl Fn(&V) -> u64) {
        if self.populated >= self.max_pop {
            self.grow(hasher);
        }
    }

    #[cold]
    #[inline(never)]
    fn grow(&mut self, hasher: &impl Fn(&V) -> u64) {
        let required = self.populated.saturating_mul(3) / 2 + 2;
        let result = buckets_for(required)
            .ok_or(TryReserveError::CapacityOverflow)
            .and_then(|bucket_count| self.try_rehash(bucket_count, hasher));
        if let Err(err) = result {
            infallible(err);
        }
    }

    /// Rebuilds the table with `bucket_count` buckets, replaying every value
    /// in old bucket order.
    ///
    /// Nothing is touched until the new arrays are allocated. If `hasher`
    /// panics midway the values moved so far are dropped with the new arrays.
    fn try_rehash(
        &mut self,
        bucket_count: usize,
        hasher: &impl Fn(&V) -> u64,
    ) -> Result<(), TryReserveError> {
        debug_assert!(target_load_factor(bucket_count) >= self.populated);
        let mut rebuilt = Self::try_allocate(bucket_count)?;

        for index in 0..self.buckets.len() {
            if self.slots[index].is_empty() {
                continue;
            }
            // SAFETY: The bucket is occupied.
            let hash = hasher(unsafe { self.buckets[index].assume_init_ref() });
            self.slots[index] = Slot::EMPTY;
            self.populated -= 1;
            // SAFETY: The bucket was occupied until the line above, and is now
            // marked empty so the old table will not drop it again.
            let value = unsafe { self.buckets[index].assume_init_read() };
            // SAFETY: `rebuilt` was sized for every element of `self`.
            unsafe { rebuilt.insert_unique(hash, value) };
        }

        *self = rebuilt;
        Ok(())
    }

    /// Clones the table, reporting allocation failure instead of hiding it.
    ///
    /// The copy has the same bucket count and the same layout as `self`. If
    /// cloning a value panics, the values cloned so far are dropped and
    /// `self` is unaffected.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(1, |v: &String| v == "one", |_| 1).or_insert("one".to_string());
    ///
    /// let mut copy = table.try_clone().unwrap();
    /// copy.find_mut(1, |v| v == "one").unwrap().push('!');
    ///
    /// assert_eq!(table.find(1, |v| v == "one").unwrap(), "one");
    /// assert_eq!(copy.find(1, |v| v == "one!").unwrap(), "one!");
    /// ```
    pub fn try_clone(&self) -> Result<Self, TryReserveError>
    where
        V: Clone,
    {
        if self.buckets.is_empty() {
            return Ok(Self::new());
        }
        let mut copy = Self::try_allocate(self.buckets.len())?;
        for (index, &slot) in self.slots[..self.buckets.len()].iter().enumerate() {
            if slot.is_empty() {
                continue;
            }
            // SAFETY: The source bucket is occupied.
            let value = unsafe { self.buckets[index].assume_init_ref() }.clone();
            copy.buckets[index] = MaybeUninit::new(value);
            copy.slots[index] = slot;
            copy.populated += 1;
        }
        debug_assert_eq!(copy.populated, self.populated);
        Ok(copy)
    }

    /// Returns an iterator over all values in the table, in bucket order.
    ///
    /// The order is unspecified and changes whenever the table is rehashed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// for n in 0..4u64 {
    ///     table.entry(n, |&v: &u64| v == n, |&v| v).or_insert(n);
    /// }
    /// let mut values: Vec<u64> = table.iter().copied().collect();
    /// values.sort();
    /// assert_eq!(values, [0, 1, 2, 3]);
    /// ```
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            slots: &self.slots,
            buckets: &self.buckets,
            index: skip_empty(&self.slots, 0),
            end: self.buckets.len(),
            remaining: self.populated,
        }
    }

    /// Returns an iterator yielding mutable references to all values.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        let bucket_count = self.buckets.len();
        IterMut {
            inner: self.slots[..bucket_count]
                .iter()
                .zip(self.buckets.iter_mut()),
            remaining: self.populated,
        }
    }

    /// Returns an iterator that removes and yields all values from the table.
    ///
    /// The table keeps its capacity. Dropping the iterator early drops the
    /// remaining values.
    ///
    /// The table is empty for as long as the iterator lives. If the iterator
    /// is leaked, the table stays empty, and so do the capacity and any values
    /// not yet yielded.
    pub fn drain(&mut self) -> Drain<'_, V> {
        let inner = core::mem::take(self);
        Drain {
            table: self,
            inner,
            index: 0,
        }
    }

    /// Takes the next value at or after `*index` out of the table, leaving an
    /// empty bucket without shifting its neighbours.
    ///
    /// Used by the draining iterators, which empty the whole table.
    fn take_next(&mut self, index: &mut usize) -> Option<V> {
        while *index < self.buckets.len() {
            let current = *index;
            *index += 1;
            if self.slots[current].is_empty() {
                continue;
            }
            self.slots[current] = Slot::EMPTY;
            self.populated -= 1;
            // SAFETY: The bucket was occupied until it was marked empty above.
            return Some(unsafe { self.buckets[current].assume_init_read() });
        }
        None
    }

    /// Computes a histogram of probe sequence lengths for the current table
    /// state.
    ///
    /// Only available with the `stats` feature (and always under
    /// `cfg(test)`).
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> ProbeHistogram {
        let mut counts = Vec::new();
        for slot in &self.slots[..self.buckets.len()] {
            if slot.is_empty() {
                continue;
            }
            let psl = usize::from(slot.dist() - 1);
            if counts.len() <= psl {
                counts.resize(psl + 1, 0);
            }
            counts[psl] += 1;
        }
        ProbeHistogram { counts }
    }

    /// Returns detailed utilization statistics for debugging.
    ///
    /// Only available with the `stats` feature (and always under
    /// `cfg(test)`).
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let histogram = self.probe_histogram();
        let total_psl: usize = histogram
            .counts()
            .iter()
            .enumerate()
            .map(|(psl, &count)| psl * count)
            .sum();
        let bucket_count = self.buckets.len();
        let bucket_bytes = core::mem::size_of::<V>() + core::mem::size_of::<Slot>();

        DebugStats {
            populated: self.populated,
            capacity: self.max_pop,
            bucket_count,
            max_probe_length: histogram.max_probe_length().unwrap_or(0),
            mean_probe_length: if self.populated == 0 {
                0.0
            } else {
                total_psl as f64 / self.populated as f64
            },
            load_factor: if bucket_count == 0 {
                0.0
            } else {
                self.populated as f64 / bucket_count as f64
            },
            total_bytes: bucket_count * core::mem::size_of::<V>()
                + self.slots.len() * core::mem::size_of::<Slot>(),
            wasted_bytes: (bucket_count - self.populated) * bucket_bytes,
        }
    }

    /// Asserts every structural invariant of the table.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self, hasher: impl Fn(&V) -> u64) {
        let bucket_count = self.buckets.len();
        if bucket_count == 0 {
            assert!(self.slots.is_empty());
            assert_eq!(self.populated, 0);
            return;
        }
        assert!(bucket_count.is_power_of_two());
        assert_eq!(self.slots.len(), bucket_count + 1);
        assert_eq!(self.slots[bucket_count], Slot::SENTINEL);
        assert!(self.populated <= self.max_pop);

        let mask = self.bucket_mask();
        let mut occupied = 0;
        for index in 0..bucket_count {
            let slot = self.slots[index];
            if slot.is_empty() {
                continue;
            }
            occupied += 1;
            // SAFETY: The bucket is occupied.
            let hash = hasher(unsafe { self.buckets[index].assume_init_ref() });
            assert_eq!(slot.hashx(), hashx(hash), "fragment mismatch at {index}");
            let home = hash as usize & mask;
            assert_eq!(
                (home + usize::from(slot.dist()) - 1) & mask,
                index,
                "displacement mismatch at {index}: {self:?}"
            );
            let next = self.slots[(index + 1) & mask];
            assert!(
                next.dist() <= slot.dist() + 1,
                "run not ordered by displacement at {index}: {self:?}"
            );
            for step in 1..slot.dist() {
                let between = (home + usize::from(step) - 1) & mask;
                assert!(
                    self.slots[between].dist() >= step,
                    "bucket {index} unreachable from {home}, gap at {between}: {self:?}"
                );
            }
            // SAFETY: The bucket is occupied.
            let stored = unsafe { self.buckets[index].assume_init_ref() };
            let probe = self.lookup(hash, |v| core::ptr::eq(v, stored));
            assert!(
                probe.found && probe.index == index,
                "lookup misses bucket {index}: {self:?}"
            );
        }
        assert_eq!(occupied, self.populated);
    }
}

/// Reports a reservation failure on a path that cannot return it.
#[cold]
#[inline(never)]
fn infallible(err: TryReserveError) -> ! {
    match err {
        TryReserveError::CapacityOverflow => panic!("hash table capacity overflow"),
        TryReserveError::AllocError { layout } => handle_alloc_error(layout),
    }
}

/// A view into a single entry in the hash table, which may be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashTable`].
///
/// [`entry`]: HashTable::entry
pub enum Entry<'a, V> {
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, V>),
    /// A vacant entry.
    Vacant(VacantEntry<'a, V>),
}

impl<'a, V> Entry<'a, V> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the value in the entry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// *table.entry(3, |&(k, _): &(u64, u32)| k == 3, |&(k, _)| k).or_insert((3, 1)) = (3, 7);
    /// assert_eq!(table.find(3, |&(k, _)| k == 3), Some(&(3, 7)));
    /// ```
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the result of `default` if the entry is vacant and returns a
    /// mutable reference to the value in the entry.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Calls `f` on the value if the entry is occupied.
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Self {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }
}

/// A view into a vacant entry in the hash table.
///
/// Holds the insertion point found by the probe, so inserting does not probe
/// again.
pub struct VacantEntry<'a, V> {
    table: &'a mut HashTable<V>,
    probe: Probe,
}

impl<'a, V> VacantEntry<'a, V> {
    /// Inserts `value` and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        let VacantEntry { table, probe } = self;
        // SAFETY: The probe came from `HashTable::entry`, which grew the table
        // beforehand, and the table has been exclusively borrowed since.
        let index = unsafe { table.insert_at(probe, value) };
        // SAFETY: `insert_at` returns the bucket the value was written to.
        unsafe { table.buckets[index].assume_init_mut() }
    }
}

/// A view into an occupied entry in the hash table.
pub struct OccupiedEntry<'a, V> {
    table: &'a mut HashTable<V>,
    index: usize,
}

impl<'a, V> OccupiedEntry<'a, V> {
    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        // SAFETY: An occupied entry always refers to an initialized bucket.
        unsafe { self.table.buckets[self.index].assume_init_ref() }
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        // SAFETY: An occupied entry always refers to an initialized bucket.
        unsafe { self.table.buckets[self.index].assume_init_mut() }
    }

    /// Converts the entry into a mutable reference to its value.
    pub fn into_mut(self) -> &'a mut V {
        let OccupiedEntry { table, index } = self;
        // SAFETY: An occupied entry always refers to an initialized bucket.
        unsafe { table.buckets[index].assume_init_mut() }
    }

    /// Returns a cursor to this entry.
    pub fn cursor(&self) -> Cursor {
        Cursor {
            index: self.index,
            end: self.table.buckets.len(),
        }
    }

    /// Removes the value from the table and returns it.
    pub fn remove(self) -> V {
        // SAFETY: An occupied entry always refers to an initialized bucket.
        unsafe { self.table.take(self.index) }.0
    }
}

/// An iterator over the values of a [`HashTable`], in bucket order.
///
/// This struct is created by the [`iter`] method on [`HashTable`].
///
/// [`iter`]: HashTable::iter
pub struct Iter<'a, V> {
    slots: &'a [Slot],
    buckets: &'a [MaybeUninit<V>],
    index: usize,
    end: usize,
    remaining: usize,
}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots,
            buckets: self.buckets,
            index: self.index,
            end: self.end,
            remaining: self.remaining,
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.end {
            return None;
        }
        let index = self.index;
        self.index = skip_empty(self.slots, index + 1);
        self.remaining -= 1;
        // SAFETY: `index` was reached by skipping empty buckets and lies before
        // the sentinel, so it is occupied.
        Some(unsafe { self.buckets[index].assume_init_ref() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}

/// A mutable iterator over the values of a [`HashTable`].
pub struct IterMut<'a, V> {
    inner: core::iter::Zip<core::slice::Iter<'a, Slot>, core::slice::IterMut<'a, MaybeUninit<V>>>,
    remaining: usize,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        let (_, bucket) = self.inner.by_ref().find(|(slot, _)| !slot.is_empty())?;
        self.remaining -= 1;
        // SAFETY: The bucket's slot is occupied.
        Some(unsafe { bucket.assume_init_mut() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}

impl<V> FusedIterator for IterMut<'_, V> {}

/// A draining iterator over the values in a [`HashTable`].
///
/// This struct is created by the [`drain`] method on [`HashTable`].
/// It yields owned `V` values and empties the table as it iterates.
///
/// [`drain`]: HashTable::drain
pub struct Drain<'a, V> {
    table: &'a mut HashTable<V>,
    inner: HashTable<V>,
    index: usize,
}

impl<V> Drop for Drain<'_, V> {
    fn drop(&mut self) {
        for _ in &mut *self {}
        // Every bucket is empty now; hand the allocation back.
        core::mem::swap(self.table, &mut self.inner);
    }
}

impl<V> Iterator for Drain<'_, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.take_next(&mut self.index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.inner.populated, Some(self.inner.populated))
    }
}

impl<V> ExactSizeIterator for Drain<'_, V> {}

/// An owning iterator over the values of a [`HashTable`].
pub struct IntoIter<V> {
    table: HashTable<V>,
    index: usize,
}

impl<V> Iterator for IntoIter<V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.table.take_next(&mut self.index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.populated, Some(self.table.populated))
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}

impl<V> IntoIterator for HashTable<V> {
    type IntoIter = IntoIter<V>;
    type Item = V;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            table: self,
            index: 0,
        }
    }
}

impl<'a, V> IntoIterator for &'a HashTable<V> {
    type IntoIter = Iter<'a, V>;
    type Item = &'a V;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, V> IntoIterator for &'a mut HashTable<V> {
    type IntoIter = IterMut<'a, V>;
    type Item = &'a mut V;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
