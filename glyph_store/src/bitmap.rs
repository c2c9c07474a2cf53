// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph bitmaps and the coverage/RGBA channel convention.
//!
//! The cache persists single-channel coverage masks. Callers deal in RGBA
//! images where every pixel is opaque white in its color channels and the
//! coverage lives in alpha, ready to be tinted by the consumer.

use alloc::vec::Vec;

/// An 8-bit per channel, non-premultiplied RGBA pixel.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Creates a pixel from its channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// White pixel carrying `coverage` in its alpha channel.
    pub const fn from_coverage(coverage: u8) -> Self {
        Self::new(u8::MAX, u8::MAX, u8::MAX, coverage)
    }
}

/// Returns `width * height` if it fits in `usize`.
fn area(width: u32, height: u32) -> Option<usize> {
    usize::try_from(width)
        .ok()?
        .checked_mul(usize::try_from(height).ok()?)
}

/// A rasterized glyph as RGBA pixels, row-major without padding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphImage {
    width: u32,
    height: u32,
    pixels: Vec<Rgba8>,
}

impl GlyphImage {
    /// Creates a fully transparent black image.
    ///
    /// # Panics
    ///
    /// If `width * height` overflows `usize`.
    pub fn new(width: u32, height: u32) -> Self {
        let len = area(width, height).expect("glyph image dimensions overflow");
        Self {
            width,
            height,
            pixels: alloc::vec![Rgba8::default(); len],
        }
    }

    /// Creates an image from existing pixels.
    ///
    /// Returns `None` if `pixels.len() != width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgba8>) -> Option<Self> {
        (area(width, height)? == pixels.len()).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Creates an image from tightly packed RGBA bytes.
    ///
    /// Returns `None` if `bytes.len() != width * height * 4`.
    pub fn from_rgba_bytes(width: u32, height: u32, bytes: &[u8]) -> Option<Self> {
        let pixels: &[Rgba8] = bytemuck::try_cast_slice(bytes).ok()?;
        Self::from_pixels(width, height, pixels.to_vec())
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the image has no pixels.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// The pixels, row-major.
    pub fn pixels(&self) -> &[Rgba8] {
        &self.pixels
    }

    /// Mutable access to the pixels, row-major.
    pub fn pixels_mut(&mut self) -> &mut [Rgba8] {
        &mut self.pixels
    }

    /// The pixel at `(x, y)`, if in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = usize::try_from(y).ok()? * usize::try_from(self.width).ok()?
            + usize::try_from(x).ok()?;
        self.pixels.get(idx).copied()
    }

    /// The pixels as tightly packed RGBA bytes.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

/// A single-channel coverage bitmap, row-major without padding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoverageMask {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl CoverageMask {
    /// Creates a mask from coverage bytes.
    ///
    /// Returns `None` if `data.len() != width * height`.
    pub fn from_vec(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        (area(width, height)? == data.len()).then_some(Self {
            width,
            height,
            data,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The coverage bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the mask, returning its coverage bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

/// Expands a coverage mask to white RGBA with coverage in alpha.
pub fn coverage_to_rgba(mask: &CoverageMask) -> GlyphImage {
    GlyphImage {
        width: mask.width,
        height: mask.height,
        pixels: mask.data.iter().copied().map(Rgba8::from_coverage).collect(),
    }
}

/// Projects an RGBA image down to its alpha channel.
///
/// Inverse of [`coverage_to_rgba`].
pub fn rgba_to_coverage(image: &GlyphImage) -> CoverageMask {
    CoverageMask {
        width: image.width,
        height: image.height,
        data: image.pixels.iter().map(|px| px.a).collect(),
    }
}
