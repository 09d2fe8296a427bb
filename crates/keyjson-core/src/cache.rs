//! Bounded key-interning cache.
//!
//! Arrays of records repeat the same handful of object keys thousands of
//! times. The cache maps the raw bytes of a short key to a [`Text`] built the
//! first time the key was seen, so later occurrences are a hash, a compare and
//! a reference-count bump.
//!
//! Layout is a fixed, power-of-two array of slots addressed by
//! `hash(bytes) & (slots - 1)`. Each slot holds at most one entry; a miss
//! overwrites whatever the slot held. Memory is therefore bounded by
//! `slots * MAX_CACHED_KEY_LEN` no matter how many distinct keys pass through,
//! and evicting an entry never affects a `Text` already handed out.
//!
//! Every slot has its own lock, taken with `try_lock`. A lookup that finds its
//! slot busy skips the cache and builds the key itself, so parsers on different
//! threads never wait on one another.

use crate::text::Text;
use ahash::RandomState;
use std::hash::BuildHasher;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{LazyLock, Mutex, PoisonError, TryLockError};

/// Slot count of the process-wide cache.
pub const KEY_CACHE_SLOTS: usize = 2048;

/// Keys longer than this many bytes are never cached.
pub const MAX_CACHED_KEY_LEN: usize = 64;

static GLOBAL: LazyLock<KeyCache> = LazyLock::new(|| {
    tracing::debug!(
        slots = KEY_CACHE_SLOTS,
        max_key_len = MAX_CACHED_KEY_LEN,
        "initializing global key cache"
    );
    KeyCache::new(KEY_CACHE_SLOTS)
});

struct Entry {
    hash: u64,
    text: Text,
}

#[derive(Default)]
struct Slot {
    entry: Option<Entry>,
    hits: u64,
    misses: u64,
}

/// Point-in-time counters for a [`KeyCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub slots: usize,
    /// Slots currently holding a key.
    pub occupied: usize,
    pub hits: u64,
    pub misses: u64,
    /// Lookups that skipped the cache because their slot was locked.
    pub bypassed: u64,
}

pub struct KeyCache {
    slots: Box<[Mutex<Slot>]>,
    mask: usize,
    hasher: RandomState,
    bypassed: AtomicU64,
}

impl KeyCache {
    /// Create a cache with `slots` rounded up to a power of two.
    pub fn new(slots: usize) -> Self {
        let count = slots.max(1).next_power_of_two();
        KeyCache {
            slots: (0..count).map(|_| Mutex::new(Slot::default())).collect(),
            mask: count - 1,
            // Fixed seeds: slot addressing only needs to be stable and well mixed.
            hasher: RandomState::with_seeds(
                0x243f_6a88_85a3_08d3,
                0x1319_8a2e_0370_7344,
                0xa409_3822_299f_31d0,
                0x082e_fa98_ec4e_6c89,
            ),
            bypassed: AtomicU64::new(0),
        }
    }

    /// The process-wide cache used by [`crate::parse`].
    pub fn global() -> &'static KeyCache {
        &GLOBAL
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Whether a key of this byte length is ever stored.
    pub fn is_eligible(key: &str) -> bool {
        key.len() <= MAX_CACHED_KEY_LEN
    }

    /// Return a `Text` equal to `key`, shared with earlier lookups of the same
    /// bytes when the slot still holds them.
    pub fn intern(&self, key: &str) -> Text {
        if !Self::is_eligible(key) {
            return Text::from(key);
        }

        let hash = BuildHasher::hash_one(&self.hasher, key.as_bytes());
        let slot = &self.slots[(hash as usize) & self.mask];
        let mut slot = match slot.try_lock() {
            Ok(guard) => guard,
            // A slot only ever holds a complete entry or none, so a panic in
            // another holder cannot have left it half-written.
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                self.bypassed.fetch_add(1, Ordering::Relaxed);
                return Text::from(key);
            }
        };

        if let Some(entry) = &slot.entry {
            if entry.hash == hash && entry.text.as_bytes() == key.as_bytes() {
                let text = entry.text.clone();
                slot.hits += 1;
                return text;
            }
        }

        let text = Text::from(key);
        slot.entry = Some(Entry {
            hash,
            text: text.clone(),
        });
        slot.misses += 1;
        text
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats {
            slots: self.slots.len(),
            bypassed: self.bypassed.load(Ordering::Relaxed),
            ..CacheStats::default()
        };
        for slot in self.slots.iter() {
            let slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
            stats.occupied += usize::from(slot.entry.is_some());
            stats.hits += slot.hits;
            stats.misses += slot.misses;
        }
        stats
    }

    /// Drop every entry and reset the counters.
    pub fn clear(&self) {
        for slot in self.slots.iter() {
            *slot.lock().unwrap_or_else(PoisonError::into_inner) = Slot::default();
        }
        self.bypassed.store(0, Ordering::Relaxed);
    }
}

impl Default for KeyCache {
    fn default() -> Self {
        KeyCache::new(KEY_CACHE_SLOTS)
    }
}
