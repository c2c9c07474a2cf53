// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Storage backends for cache entries.

use hashbrown::HashMap;
use std::fs::{self, File};
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A flat namespace of immutable, named byte blobs.
///
/// Implementations must make [`write_atomic`](Self::write_atomic)
/// all-or-nothing: a concurrent [`open`](Self::open) sees either the previous
/// contents (or no entry) or the complete new contents, never a prefix.
pub trait Storage: Send + Sync {
    /// Returns the names of all entries starting with `prefix`.
    fn list(&self, prefix: &str) -> io::Result<Vec<String>>;

    /// Opens an entry for reading.
    fn open(&self, name: &str) -> io::Result<EntryReader<'_>>;

    /// Creates or replaces an entry with `data`.
    fn write_atomic(&self, name: &str, data: &[u8]) -> io::Result<()>;

    /// Removes an entry. Removing a missing entry is not an error.
    fn remove(&self, name: &str) -> io::Result<()>;
}

impl<T: Storage + ?Sized> Storage for Arc<T> {
    fn list(&self, prefix: &str) -> io::Result<Vec<String>> {
        (**self).list(prefix)
    }

    fn open(&self, name: &str) -> io::Result<EntryReader<'_>> {
        (**self).open(name)
    }

    fn write_atomic(&self, name: &str, data: &[u8]) -> io::Result<()> {
        (**self).write_atomic(name, data)
    }

    fn remove(&self, name: &str) -> io::Result<()> {
        (**self).remove(name)
    }
}

impl<T: Storage + ?Sized> Storage for Box<T> {
    fn list(&self, prefix: &str) -> io::Result<Vec<String>> {
        (**self).list(prefix)
    }

    fn open(&self, name: &str) -> io::Result<EntryReader<'_>> {
        (**self).open(name)
    }

    fn write_atomic(&self, name: &str, data: &[u8]) -> io::Result<()> {
        (**self).write_atomic(name, data)
    }

    fn remove(&self, name: &str) -> io::Result<()> {
        (**self).remove(name)
    }
}

/// An open entry whose length is known before reading.
pub struct EntryReader<'a> {
    len: u64,
    inner: Box<dyn Read + 'a>,
}

impl<'a> EntryReader<'a> {
    /// Wraps a reader over an entry of `len` bytes.
    pub fn new(len: u64, reader: impl Read + 'a) -> Self {
        Self {
            len,
            inner: Box::new(reader),
        }
    }

    /// Length of the entry in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the entry is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Read for EntryReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl core::fmt::Debug for EntryReader<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EntryReader")
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

/// Options for a [`FsStorage`].
#[derive(Copy, Clone, Default, Debug)]
pub struct FsStorageOptions {
    /// If true, each written entry is flushed to disk before it becomes
    /// visible under its final name.
    ///
    /// This trades write latency for durability across power loss.
    ///
    /// The default value is false.
    pub sync_on_write: bool,
}

/// Distinguishes temporary files written concurrently by one process.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Storage backed by the files of a single directory.
///
/// Entries are written to a dot-prefixed temporary file and renamed into
/// place. Dot-prefixed files are never listed.
///
/// [`list`](Storage::list) scans and sorts the whole directory, so every
/// cache lookup costs time linear in the number of stored entries. Very large
/// caches are better split across several directories, one per font.
#[derive(Clone, Debug)]
pub struct FsStorage {
    dir: PathBuf,
    options: FsStorageOptions,
}

impl FsStorage {
    /// Opens `dir` as a storage backend, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        Self::with_options(dir, FsStorageOptions::default())
    }

    /// Opens `dir` as a storage backend with the given options, creating it
    /// if needed.
    pub fn with_options(dir: impl Into<PathBuf>, options: FsStorageOptions) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, options })
    }

    /// The backing directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, name: &str) -> io::Result<PathBuf> {
        if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid entry name {name:?}"),
            ));
        }
        Ok(self.dir.join(name))
    }

    fn temp_path(&self, name: &str) -> PathBuf {
        let serial = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.dir
            .join(format!(".{name}.{}.{serial}.tmp", std::process::id()))
    }
}

impl Storage for FsStorage {
    fn list(&self, prefix: &str) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !name.starts_with('.') && name.starts_with(prefix) {
                names.push(name);
            }
        }
        names.sort_unstable();
        Ok(names)
    }

    fn open(&self, name: &str) -> io::Result<EntryReader<'_>> {
        let file = File::open(self.entry_path(name)?)?;
        let len = file.metadata()?.len();
        Ok(EntryReader::new(len, file))
    }

    fn write_atomic(&self, name: &str, data: &[u8]) -> io::Result<()> {
        let path = self.entry_path(name)?;
        let temp = self.temp_path(name);
        let result = write_file(&temp, data, self.options.sync_on_write)
            .and_then(|()| fs::rename(&temp, &path));
        if result.is_err() {
            // Best effort; the temp file is never listed either way.
            let _ = fs::remove_file(&temp);
        }
        result
    }

    fn remove(&self, name: &str) -> io::Result<()> {
        match fs::remove_file(self.entry_path(name)?) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            result => result,
        }
    }
}

fn write_file(path: &Path, data: &[u8], sync: bool) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    if sync {
        file.sync_all()?;
    }
    Ok(())
}

/// Storage held in process memory.
///
/// Entries are replaced as a whole under a lock, which gives the same
/// all-or-nothing visibility as [`FsStorage`]. Clones share their entries.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, Arc<[u8]>>>>,
}

impl MemoryStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry without any validation of its name or contents.
    pub fn insert_raw(&self, name: impl Into<String>, data: impl Into<Arc<[u8]>>) {
        self.lock().insert(name.into(), data.into());
    }

    /// Returns the contents of an entry.
    pub fn get(&self, name: &str) -> Option<Arc<[u8]>> {
        self.lock().get(name).cloned()
    }

    /// Returns the names of all entries, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.lock().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<[u8]>>> {
        // Values are only ever replaced whole, so a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Storage for MemoryStorage {
    fn list(&self, prefix: &str) -> io::Result<Vec<String>> {
        let mut names: Vec<_> = self
            .lock()
            .keys()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect();
        names.sort_unstable();
        Ok(names)
    }

    fn open(&self, name: &str) -> io::Result<EntryReader<'_>> {
        let data = self.get(name).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no entry {name:?}"))
        })?;
        Ok(EntryReader::new(data.len() as u64, Cursor::new(data)))
    }

    fn write_atomic(&self, name: &str, data: &[u8]) -> io::Result<()> {
        self.insert_raw(name, data);
        Ok(())
    }

    fn remove(&self, name: &str) -> io::Result<()> {
        self.lock().remove(name);
        Ok(())
    }
}

impl core::fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MemoryStorage")
            .field("entries", &self.len())
            .finish()
    }
}
