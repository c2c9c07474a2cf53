// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph Store is a persistent cache of rasterized glyph coverage bitmaps.
//!
//! A [`GlyphDiskCache`] sits between a glyph rasterizer and a [`Storage`]
//! backend. On a miss the caller rasterizes the glyph and hands the result to
//! [`GlyphDiskCache::store`]; later lookups, including ones from later runs
//! of the program, read it back from storage instead.
//!
//! Each entry is a single file named
//! `<sha256(font identity)>#<glyph code as 8 hex digits>#<width>#<height>`
//! holding `width * height` raw coverage bytes. Entries that do not match
//! their name are treated as misses, so a damaged cache directory can only
//! cost rasterization time.
//!
//! Two backends are provided: [`FsStorage`] for a directory on disk and
//! [`MemoryStorage`] for ephemeral caches and tests.
//!
//! ## Example
//!
//! ```
//! use glyph_store::{FontIdentity, GlyphDiskCache, GlyphImage, MemoryStorage, Rgba8};
//!
//! let cache = GlyphDiskCache::with_storage(MemoryStorage::new());
//! let font = FontIdentity::new("Roboto Flex").with_variation(*b"wght", 600.0).to_string();
//!
//! let glyph = cache.get_or_insert_with(&font, u32::from('g'), || {
//!     // Stand-in for a real rasterizer.
//!     GlyphImage::from_pixels(1, 2, vec![Rgba8::from_coverage(255); 2])
//! })?;
//! assert_eq!(glyph.map(|g| (g.width(), g.height())), Some((1, 2)));
//! assert_eq!(cache.stats().stores, 1);
//! # Ok::<(), glyph_store::Error>(())
//! ```
// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

mod bitmap;
mod cache;
mod error;
mod impl_bytemuck;
mod key;
mod storage;

pub use bitmap::{CoverageMask, GlyphImage, Rgba8, coverage_to_rgba, rgba_to_coverage};
pub use cache::{GlyphDiskCache, GlyphStoreOptions, GlyphStoreStats};
pub use error::{Error, ErrorKind};
pub use key::{CacheKey, ENTRY_FIELD_SEPARATOR, EntryName, FONT_HASH_LEN, FontHash, FontIdentity};
pub use storage::{EntryReader, FsStorage, FsStorageOptions, MemoryStorage, Storage};
