// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Disk-backed glyph coverage cache.

use core::fmt::{Debug, Formatter};
use std::io::{self, Read};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::bitmap::{CoverageMask, GlyphImage, coverage_to_rgba, rgba_to_coverage};
use crate::error::{Error, ErrorKind};
use crate::key::{CacheKey, EntryName};
use crate::storage::Storage;

/// Options for a [`GlyphDiskCache`].
#[derive(Copy, Clone, Debug)]
pub struct GlyphStoreOptions {
    /// If true, storing a glyph removes entries for the same glyph that were
    /// written with different dimensions.
    ///
    /// Entry names carry the bitmap dimensions, so without this a glyph
    /// rasterized at a new size leaves its old entry behind.
    ///
    /// The default value is true.
    pub replace_stale: bool,
}

impl Default for GlyphStoreOptions {
    fn default() -> Self {
        Self {
            replace_stale: true,
        }
    }
}

/// Persistent cache of rasterized glyph coverage.
///
/// Entries are keyed by a hash of the font identity and the glyph code, and
/// hold the raw coverage bytes of the glyph. Lookups return white RGBA images
/// with coverage in alpha; stores take RGBA images and keep only alpha.
///
/// A malformed or truncated entry is a cache miss, never an error. Failures of
/// the storage backend itself are returned as [`ErrorKind::Io`].
///
/// All operations take `&self`; the cache does no locking of its own and
/// relies on the storage backend for atomic writes.
///
/// ```
/// use glyph_store::{GlyphDiskCache, GlyphImage, MemoryStorage, Rgba8};
///
/// let cache = GlyphDiskCache::with_storage(MemoryStorage::new());
/// assert!(cache.lookup("Arial Regular", 0x41)?.is_none());
///
/// let pixels = vec![Rgba8::from_coverage(10), Rgba8::from_coverage(20)];
/// let image = GlyphImage::from_pixels(2, 1, pixels).unwrap();
/// cache.store("Arial Regular", 0x41, &image)?;
/// assert_eq!(cache.lookup("Arial Regular", 0x41)?, Some(image));
/// # Ok::<(), glyph_store::Error>(())
/// ```
pub struct GlyphDiskCache {
    storage: Option<Box<dyn Storage>>,
    options: GlyphStoreOptions,
    counters: Counters,
}

impl GlyphDiskCache {
    /// Creates a cache without a storage backend.
    ///
    /// Every operation fails with [`ErrorKind::StorageNotSet`] until
    /// [`set_storage`](Self::set_storage) is called.
    pub fn new(options: GlyphStoreOptions) -> Self {
        Self {
            storage: None,
            options,
            counters: Counters::default(),
        }
    }

    /// Creates a cache over `storage` with default options.
    pub fn with_storage(storage: impl Storage + 'static) -> Self {
        let mut cache = Self::new(GlyphStoreOptions::default());
        cache.set_storage(storage);
        cache
    }

    /// Sets or replaces the storage backend.
    pub fn set_storage(&mut self, storage: impl Storage + 'static) {
        self.storage = Some(Box::new(storage));
    }

    /// Whether a storage backend has been set.
    pub fn has_storage(&self) -> bool {
        self.storage.is_some()
    }

    /// The options this cache was created with.
    pub fn options(&self) -> GlyphStoreOptions {
        self.options
    }

    /// Looks up a glyph.
    ///
    /// Returns `Ok(None)` on a miss, including when the matching entry is
    /// malformed or has the wrong length.
    pub fn lookup(&self, font_identity: &str, glyph: u32) -> Result<Option<GlyphImage>, Error> {
        self.lookup_key(&CacheKey::new(font_identity, glyph))
    }

    /// Looks up a glyph by a precomputed key.
    pub fn lookup_key(&self, key: &CacheKey) -> Result<Option<GlyphImage>, Error> {
        let storage = self.storage()?;
        let Some(name) = storage.list(&key.prefix())?.into_iter().next() else {
            log::debug!("glyph cache miss for {:08x}", key.glyph);
            self.counters.record_miss();
            return Ok(None);
        };
        let Some(entry) = EntryName::decode(&name).filter(|entry| entry.key == *key) else {
            log::warn!("ignoring malformed glyph cache entry {name}");
            self.counters.record_rejected();
            return Ok(None);
        };
        let mut reader = match storage.open(&name) {
            Ok(reader) => reader,
            // Removed since it was listed.
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                self.counters.record_miss();
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        let expected = entry.payload_len();
        let len = match usize::try_from(expected) {
            Ok(len) if reader.len() == expected => len,
            _ => {
                log::warn!(
                    "ignoring glyph cache entry {name}: {} bytes, expected {expected}",
                    reader.len()
                );
                self.counters.record_rejected();
                return Ok(None);
            }
        };
        let mut data = vec![0_u8; len];
        reader.read_exact(&mut data)?;
        let Some(mask) = CoverageMask::from_vec(entry.width, entry.height, data) else {
            self.counters.record_rejected();
            return Ok(None);
        };
        self.counters.hits.fetch_add(1, Ordering::Relaxed);
        Ok(Some(coverage_to_rgba(&mask)))
    }

    /// Stores a rasterized glyph.
    ///
    /// Only the alpha channel of `image` is persisted. Images with no pixels
    /// are not stored.
    pub fn store(&self, font_identity: &str, glyph: u32, image: &GlyphImage) -> Result<(), Error> {
        self.store_key(&CacheKey::new(font_identity, glyph), image)
    }

    /// Stores a rasterized glyph under a precomputed key.
    pub fn store_key(&self, key: &CacheKey, image: &GlyphImage) -> Result<(), Error> {
        let storage = self.storage()?;
        if image.is_empty() {
            log::debug!("not caching empty glyph {:08x}", key.glyph);
            return Ok(());
        }
        let mask = rgba_to_coverage(image);
        let name = EntryName::new(*key, image.width(), image.height()).to_string();
        if let Err(err) = storage.write_atomic(&name, mask.data()) {
            self.counters.store_failures.fetch_add(1, Ordering::Relaxed);
            return Err(err.into());
        }
        self.counters.stores.fetch_add(1, Ordering::Relaxed);
        log::debug!("cached glyph entry {name}");
        if self.options.replace_stale {
            remove_stale(storage, key, &name);
        }
        Ok(())
    }

    /// Looks up a glyph, rasterizing and storing it on a miss.
    ///
    /// Storage failures do not fail this call: a failed read is treated as a
    /// miss and a failed write is logged, so the caller always gets the glyph
    /// if `rasterize` can produce it. Returns `Ok(None)` only when `rasterize`
    /// returns `None`.
    pub fn get_or_insert_with(
        &self,
        font_identity: &str,
        glyph: u32,
        rasterize: impl FnOnce() -> Option<GlyphImage>,
    ) -> Result<Option<GlyphImage>, Error> {
        let key = CacheKey::new(font_identity, glyph);
        match self.lookup_key(&key) {
            Ok(Some(image)) => return Ok(Some(image)),
            Ok(None) => {}
            Err(err) if err.kind() == ErrorKind::Io => {
                log::warn!("glyph cache read failed for {glyph:08x}: {err}");
            }
            Err(err) => return Err(err),
        }
        let Some(image) = rasterize() else {
            return Ok(None);
        };
        match self.store_key(&key, &image) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::Io => {
                log::warn!("glyph cache write failed for {glyph:08x}: {err}");
            }
            Err(err) => return Err(err),
        }
        Ok(Some(image))
    }

    /// Returns a snapshot of the hit/miss statistics.
    pub fn stats(&self) -> GlyphStoreStats {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        GlyphStoreStats {
            hits: load(&self.counters.hits),
            misses: load(&self.counters.misses),
            rejected: load(&self.counters.rejected),
            stores: load(&self.counters.stores),
            store_failures: load(&self.counters.store_failures),
        }
    }

    /// Clear statistics without touching stored entries.
    pub fn clear_stats(&self) {
        for counter in [
            &self.counters.hits,
            &self.counters.misses,
            &self.counters.rejected,
            &self.counters.stores,
            &self.counters.store_failures,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    fn storage(&self) -> Result<&dyn Storage, Error> {
        self.storage.as_deref().ok_or_else(Error::storage_not_set)
    }
}

impl Default for GlyphDiskCache {
    fn default() -> Self {
        Self::new(GlyphStoreOptions::default())
    }
}

impl Debug for GlyphDiskCache {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GlyphDiskCache")
            .field("has_storage", &self.has_storage())
            .field("options", &self.options)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

/// Removes every entry for `key` other than `keep`.
fn remove_stale(storage: &dyn Storage, key: &CacheKey, keep: &str) {
    let names = match storage.list(&key.prefix()) {
        Ok(names) => names,
        Err(err) => {
            log::warn!("could not list stale glyph cache entries: {err}");
            return;
        }
    };
    for name in names.iter().filter(|name| *name != keep) {
        match storage.remove(name) {
            Ok(()) => log::debug!("removed stale glyph cache entry {name}"),
            Err(err) => log::warn!("could not remove stale glyph cache entry {name}: {err}"),
        }
    }
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    rejected: AtomicU64,
    stores: AtomicU64,
    store_failures: AtomicU64,
}

impl Counters {
    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// A rejected entry is also a miss.
    fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
        self.record_miss();
    }
}

/// Statistics about cache usage.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphStoreStats {
    /// Lookups that returned a glyph.
    pub hits: u64,
    /// Lookups that returned nothing, including rejected entries.
    pub misses: u64,
    /// Entries ignored because their name or length was invalid.
    pub rejected: u64,
    /// Glyphs written to storage.
    pub stores: u64,
    /// Writes that failed.
    pub store_failures: u64,
}

impl GlyphStoreStats {
    /// Total number of lookups that completed without a storage error.
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    /// Fraction of lookups that were hits, or 0 if there were none.
    pub fn hit_rate(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            total => self.hits as f64 / total as f64,
        }
    }
}
