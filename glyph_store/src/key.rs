// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph cache keys and the on-disk entry name format.
//!
//! Entries are named `<font hash>#<glyph code>#<width>#<height>`, where the
//! font hash is the lowercase hex SHA-256 of the font identity string and the
//! glyph code is exactly 8 lowercase, zero-padded hex digits. The payload
//! dimensions live in the name so an entry can be validated without a header.

use core::fmt::{self, Display, Formatter, Write as _};
use sha2::{Digest, Sha256};
use smallvec::SmallVec;

/// Separator between the fields of an entry name.
pub const ENTRY_FIELD_SEPARATOR: char = '#';

/// Length in bytes of a [`FontHash`].
pub const FONT_HASH_LEN: usize = 32;

/// SHA-256 digest of a font identity string.
///
/// Renders as 64 lowercase hex characters, which makes it safe to use as a
/// file name component.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct FontHash([u8; FONT_HASH_LEN]);

impl FontHash {
    /// Hashes the UTF-8 bytes of a font identity.
    pub fn of(font_identity: &str) -> Self {
        let digest = Sha256::digest(font_identity.as_bytes());
        let mut bytes = [0_u8; FONT_HASH_LEN];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    /// Creates a hash from raw digest bytes.
    pub const fn from_bytes(bytes: [u8; FONT_HASH_LEN]) -> Self {
        Self(bytes)
    }

    /// Parses the 64 character lowercase hex form produced by [`Display`].
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.as_bytes();
        if hex.len() != FONT_HASH_LEN * 2 {
            return None;
        }
        let mut bytes = [0_u8; FONT_HASH_LEN];
        for (byte, pair) in bytes.iter_mut().zip(hex.chunks_exact(2)) {
            *byte = (hex_digit(pair[0])? << 4) | hex_digit(pair[1])?;
        }
        Some(Self(bytes))
    }

    /// Returns the raw digest bytes.
    pub const fn as_bytes(&self) -> &[u8; FONT_HASH_LEN] {
        &self.0
    }
}

impl Display for FontHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for FontHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "FontHash({self})")
    }
}

/// A font name together with the variation settings it was rasterized with.
///
/// Renders as `name` or `name;tag=value;tag=value`, in insertion order. Two
/// identities that render to the same string share cache entries.
///
/// ```
/// use glyph_store::FontIdentity;
///
/// let identity = FontIdentity::new("Inter").with_variation(*b"wght", 700.0);
/// assert_eq!(identity.to_string(), "Inter;wght=700");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FontIdentity {
    name: String,
    variations: SmallVec<[([u8; 4], f32); 4]>,
}

impl FontIdentity {
    /// Creates an identity for a font without variation settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variations: SmallVec::new(),
        }
    }

    /// Appends a variation axis setting.
    #[must_use]
    pub fn with_variation(mut self, tag: [u8; 4], value: f32) -> Self {
        self.variations.push((tag, value));
        self
    }

    /// The font name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The variation settings, in insertion order.
    pub fn variations(&self) -> &[([u8; 4], f32)] {
        &self.variations
    }

    /// Hashes the rendered identity.
    pub fn font_hash(&self) -> FontHash {
        FontHash::of(&self.to_string())
    }
}

impl Display for FontIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for (tag, value) in &self.variations {
            f.write_char(';')?;
            for &b in tag {
                f.write_char(char::from(b))?;
            }
            write!(f, "={value}")?;
        }
        Ok(())
    }
}

/// Identifies one glyph of one font in the cache.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Hash of the font identity.
    pub font: FontHash,
    /// The glyph code point.
    pub glyph: u32,
}

impl CacheKey {
    /// Creates a key, hashing the font identity.
    pub fn new(font_identity: &str, glyph: u32) -> Self {
        Self {
            font: FontHash::of(font_identity),
            glyph,
        }
    }

    /// Creates a key from an already computed font hash.
    pub const fn from_hash(font: FontHash, glyph: u32) -> Self {
        Self { font, glyph }
    }

    /// The name prefix shared by every entry for this key.
    ///
    /// Includes the trailing separator so that a prefix match can only hit
    /// entries for exactly this glyph.
    pub fn prefix(&self) -> String {
        format!(
            "{}{sep}{:08x}{sep}",
            self.font,
            self.glyph,
            sep = ENTRY_FIELD_SEPARATOR
        )
    }
}

/// The decoded name of a cache entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EntryName {
    /// The glyph this entry belongs to.
    pub key: CacheKey,
    /// Bitmap width in pixels.
    pub width: u32,
    /// Bitmap height in pixels.
    pub height: u32,
}

impl EntryName {
    /// Creates an entry name.
    pub const fn new(key: CacheKey, width: u32, height: u32) -> Self {
        Self { key, width, height }
    }

    /// Decodes an entry name.
    ///
    /// Returns `None` for anything that is not exactly four well-formed
    /// fields with positive dimensions.
    pub fn decode(name: &str) -> Option<Self> {
        let fields: SmallVec<[&str; 4]> = name.split(ENTRY_FIELD_SEPARATOR).collect();
        let [font, glyph, width, height] = fields.as_slice() else {
            return None;
        };
        let key = CacheKey {
            font: FontHash::from_hex(font)?,
            glyph: parse_glyph_code(glyph)?,
        };
        Some(Self {
            key,
            width: parse_dimension(width)?,
            height: parse_dimension(height)?,
        })
    }

    /// Number of payload bytes an entry with this name must hold.
    pub fn payload_len(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

impl Display for EntryName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{sep}{}",
            self.key.prefix(),
            self.width,
            self.height,
            sep = ENTRY_FIELD_SEPARATOR
        )
    }
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        _ => None,
    }
}

fn parse_glyph_code(field: &str) -> Option<u32> {
    if field.len() != 8 {
        return None;
    }
    field
        .bytes()
        .try_fold(0_u32, |acc, b| Some((acc << 4) | u32::from(hex_digit(b)?)))
}

/// Base-10, no sign, no leading zero, strictly positive.
fn parse_dimension(field: &str) -> Option<u32> {
    let bytes = field.as_bytes();
    if bytes.is_empty() || bytes[0] == b'0' || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    field.parse().ok()
}
