// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::io;

/// Error type for glyph store operations.
///
/// Carries a non-exhaustive [`ErrorKind`] plus, for storage failures, the
/// underlying [`io::Error`].
///
/// Malformed or truncated cache entries are never reported through this type;
/// they are treated as cache misses.
#[derive(Debug)]
pub struct Error {
    /// The non-exhaustive category describing this error.
    kind: ErrorKind,

    /// The storage failure, for [`ErrorKind::Io`].
    io: Option<io::Error>,
}

impl Error {
    /// The machine-readable category for this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The underlying storage failure, if this is an [`ErrorKind::Io`] error.
    pub fn io_error(&self) -> Option<&io::Error> {
        self.io.as_ref()
    }

    /// Consumes the error, returning the underlying storage failure if any.
    pub fn into_io_error(self) -> Option<io::Error> {
        self.io
    }

    pub(crate) fn storage_not_set() -> Self {
        Self {
            kind: ErrorKind::StorageNotSet,
            io: None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self {
            kind: ErrorKind::Io,
            io: Some(err),
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.kind {
            ErrorKind::StorageNotSet => f.write_str("cache storage not set"),
            ErrorKind::Io => match &self.io {
                Some(err) => write!(f, "cache storage failure: {err}"),
                None => f.write_str("cache storage failure"),
            },
        }
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        self.io
            .as_ref()
            .map(|err| err as &(dyn core::error::Error + 'static))
    }
}

/// The non-exhaustive category of an error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The cache was used before a storage backend was configured.
    StorageNotSet,

    /// The storage backend failed to list, read, write or remove an entry.
    Io,
}
