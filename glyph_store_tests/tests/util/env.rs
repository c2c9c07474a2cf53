// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use glyph_store::{FsStorage, GlyphDiskCache, GlyphImage};
use std::path::{Path, PathBuf};

fn scratch_root() -> PathBuf {
    std::env::temp_dir().join("glyph_store_tests")
}

/// A per-test scratch directory.
///
/// Any leftovers from an earlier run with the same name are removed on
/// creation. The directory is removed on drop unless the test is panicking.
pub(crate) struct TestEnv {
    dir: PathBuf,
}

impl TestEnv {
    pub(crate) fn new(test_name: &str) -> Self {
        let dir = scratch_root().join(test_name);
        if dir.exists() {
            std::fs::remove_dir_all(&dir).unwrap();
        }
        Self { dir }
    }

    pub(crate) fn dir(&self) -> &Path {
        &self.dir
    }

    pub(crate) fn storage(&self) -> FsStorage {
        FsStorage::new(&self.dir).unwrap()
    }

    pub(crate) fn cache(&self) -> GlyphDiskCache {
        GlyphDiskCache::with_storage(self.storage())
    }

    /// Names of the files in the scratch directory, sorted.
    pub(crate) fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        names
    }

    pub(crate) fn write_file(&self, name: &str, data: &[u8]) {
        std::fs::create_dir_all(&self.dir).unwrap();
        std::fs::write(self.dir.join(name), data).unwrap();
    }

    pub(crate) fn read_file(&self, name: &str) -> Vec<u8> {
        std::fs::read(self.dir.join(name)).unwrap()
    }

    /// Stores `image` through a fresh cache and reads it back through another.
    pub(crate) fn round_trip(&self, font: &str, glyph: u32, image: &GlyphImage) -> GlyphImage {
        self.cache().store(font, glyph, image).unwrap();
        self.cache()
            .lookup(font, glyph)
            .unwrap()
            .unwrap_or_else(|| panic!("{font} {glyph:08x} missing after store"))
    }
}

impl Drop for TestEnv {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            let _ = std::fs::remove_dir_all(&self.dir);
        }
    }
}
