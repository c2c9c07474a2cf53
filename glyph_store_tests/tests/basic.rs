// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::util::samples::{ARIAL, ROBOTO_BOLD, alphas, glyph, patterned_glyph};
use glyph_store::{
    CacheKey, ErrorKind, FontHash, FontIdentity, GlyphDiskCache, GlyphImage, GlyphStoreOptions,
    MemoryStorage, Rgba8,
};
use std::sync::Arc;

#[test]
fn basic_arial_scenario_on_disk() {
    let env = testenv!();
    let cache = env.cache();
    cache
        .store(ARIAL, 0x41, &glyph(3, 2, &[10, 20, 30, 40, 50, 60]))
        .unwrap();

    let name = format!("{}#00000041#3#2", FontHash::of(ARIAL));
    assert_eq!(env.file_names(), [name.clone()]);
    assert_eq!(env.read_file(&name), [10, 20, 30, 40, 50, 60]);

    let found = cache.lookup(ARIAL, 0x41).unwrap().unwrap();
    assert_eq!((found.width(), found.height()), (3, 2));
    let expected: Vec<Rgba8> = [10, 20, 30, 40, 50, 60]
        .into_iter()
        .map(|a| Rgba8::new(255, 255, 255, a))
        .collect();
    assert_eq!(found.pixels(), expected.as_slice());
}

#[test]
fn basic_miss_on_empty_cache() {
    let env = testenv!();
    let cache = env.cache();
    assert_eq!(cache.lookup(ARIAL, 0x41).unwrap(), None);
    assert!(env.file_names().is_empty());
    assert_eq!(cache.stats().misses, 1);
}

#[test]
fn basic_round_trip_persists_across_instances() {
    let env = testenv!();
    let image = patterned_glyph(17, 23, 5);
    let found = env.round_trip(ROBOTO_BOLD, 0x1F600, &image);
    assert_eq!(found, image);
    assert_eq!(alphas(&found), alphas(&image));
}

#[test]
fn basic_round_trip_keeps_only_coverage() {
    let env = testenv!();
    let tinted = GlyphImage::from_pixels(
        2,
        2,
        vec![
            Rgba8::new(255, 0, 0, 0),
            Rgba8::new(0, 255, 0, 64),
            Rgba8::new(0, 0, 255, 128),
            Rgba8::new(9, 9, 9, 255),
        ],
    )
    .unwrap();
    let found = env.round_trip(ARIAL, 0x42, &tinted);
    assert_eq!(found, glyph(2, 2, &[0, 64, 128, 255]));
}

#[test]
fn basic_key_isolation() {
    let env = testenv!();
    let cache = env.cache();
    let arial = patterned_glyph(4, 4, 1);
    let roboto = patterned_glyph(4, 4, 2);
    cache.store(ARIAL, 0x61, &arial).unwrap();
    cache.store(ROBOTO_BOLD, 0x61, &roboto).unwrap();

    assert_eq!(cache.lookup(ARIAL, 0x61).unwrap(), Some(arial));
    assert_eq!(cache.lookup(ROBOTO_BOLD, 0x61).unwrap(), Some(roboto));
    assert_eq!(cache.lookup(ARIAL, 0x62).unwrap(), None);
    assert_eq!(env.file_names().len(), 2);
}

#[test]
fn basic_store_is_idempotent() {
    let env = testenv!();
    let cache = env.cache();
    let image = patterned_glyph(5, 3, 7);
    for _ in 0..3 {
        cache.store(ARIAL, 0x2a, &image).unwrap();
        assert_eq!(cache.lookup(ARIAL, 0x2a).unwrap(), Some(image.clone()));
    }
    assert_eq!(env.file_names().len(), 1);
    assert_eq!(cache.stats().stores, 3);
}

#[test]
fn basic_resized_glyph_replaces_entry() {
    let env = testenv!();
    let cache = env.cache();
    cache.store(ARIAL, 0x2a, &patterned_glyph(4, 4, 0)).unwrap();
    let bigger = patterned_glyph(8, 8, 0);
    cache.store(ARIAL, 0x2a, &bigger).unwrap();
    assert_eq!(
        env.file_names(),
        [format!("{}#0000002a#8#8", FontHash::of(ARIAL))]
    );
    assert_eq!(cache.lookup(ARIAL, 0x2a).unwrap(), Some(bigger));
}

#[test]
fn basic_resized_glyph_kept_without_replacement() {
    let env = testenv!();
    let mut cache = GlyphDiskCache::new(GlyphStoreOptions {
        replace_stale: false,
    });
    cache.set_storage(env.storage());
    cache.store(ARIAL, 0x2a, &patterned_glyph(4, 4, 0)).unwrap();
    cache.store(ARIAL, 0x2a, &patterned_glyph(8, 8, 0)).unwrap();
    assert_eq!(env.file_names().len(), 2);
    // The first listed entry wins; names sort by width.
    let found = cache.lookup(ARIAL, 0x2a).unwrap().unwrap();
    assert_eq!((found.width(), found.height()), (4, 4));
}

#[test]
fn basic_precomputed_keys_match_strings() {
    let env = testenv!();
    let cache = env.cache();
    let identity = FontIdentity::new("Roboto").with_variation(*b"wght", 700.0);
    assert_eq!(identity.to_string(), ROBOTO_BOLD);

    let key = CacheKey::from_hash(identity.font_hash(), 0x67);
    let image = patterned_glyph(3, 9, 3);
    cache.store_key(&key, &image).unwrap();
    assert_eq!(cache.lookup(ROBOTO_BOLD, 0x67).unwrap(), Some(image.clone()));
    assert_eq!(cache.lookup_key(&key).unwrap(), Some(image));
}

#[test]
fn basic_storage_must_be_set() {
    let mut cache = GlyphDiskCache::default();
    let err = cache.lookup(ARIAL, 0x41).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StorageNotSet);
    assert_eq!(err.to_string(), "cache storage not set");

    cache.set_storage(MemoryStorage::new());
    assert_eq!(cache.lookup(ARIAL, 0x41).unwrap(), None);
}

#[test]
fn basic_caches_share_one_directory() {
    let env = testenv!();
    let storage = Arc::new(env.storage());
    let arial = GlyphDiskCache::with_storage(Arc::clone(&storage));
    let roboto = GlyphDiskCache::with_storage(Arc::clone(&storage));

    arial.store(ARIAL, 0x41, &patterned_glyph(2, 2, 1)).unwrap();
    roboto.store(ROBOTO_BOLD, 0x41, &patterned_glyph(3, 3, 2)).unwrap();

    assert_eq!(
        roboto.lookup(ARIAL, 0x41).unwrap(),
        Some(patterned_glyph(2, 2, 1))
    );
    assert_eq!(
        arial.lookup(ROBOTO_BOLD, 0x41).unwrap(),
        Some(patterned_glyph(3, 3, 2))
    );
    assert_eq!(storage.dir(), env.dir());
}

#[test]
fn basic_get_or_insert_with_uses_disk() {
    let env = testenv!();
    let mut rasterized = 0;
    let mut rasterize = || {
        rasterized += 1;
        Some(patterned_glyph(6, 6, 4))
    };
    let first = env
        .cache()
        .get_or_insert_with(ARIAL, 0x51, &mut rasterize)
        .unwrap();
    // A new cache over the same directory must not rasterize again.
    let second = env
        .cache()
        .get_or_insert_with(ARIAL, 0x51, &mut rasterize)
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(rasterized, 1);
}

#[test]
fn basic_empty_glyph_is_not_cached() {
    let env = testenv!();
    let cache = env.cache();
    cache.store(ARIAL, 0x20, &GlyphImage::new(0, 0)).unwrap();
    assert!(env.file_names().is_empty());
    assert_eq!(cache.lookup(ARIAL, 0x20).unwrap(), None);
}

#[test]
fn basic_leftovers_from_an_earlier_run_are_cleared() {
    let env = testenv!();
    env.write_file("leftover", &[1]);
    // A panicking test keeps its directory.
    core::mem::forget(env);

    let env = testenv!();
    assert!(!env.dir().exists());
    assert!(env.cache().lookup(ARIAL, 0x41).unwrap().is_none());
    assert!(env.file_names().is_empty());
}
