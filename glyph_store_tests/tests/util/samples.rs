// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use glyph_store::{GlyphImage, Rgba8};

pub(crate) const ARIAL: &str = "Arial Regular";

pub(crate) const ROBOTO_BOLD: &str = "Roboto;wght=700";

/// A white glyph with the given coverage.
pub(crate) fn glyph(width: u32, height: u32, coverage: &[u8]) -> GlyphImage {
    let pixels = coverage.iter().copied().map(Rgba8::from_coverage).collect();
    GlyphImage::from_pixels(width, height, pixels).unwrap()
}

/// A glyph with a deterministic coverage pattern derived from `seed`.
pub(crate) fn patterned_glyph(width: u32, height: u32, seed: u8) -> GlyphImage {
    let coverage: Vec<u8> = (0..width * height)
        .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
        .collect();
    glyph(width, height, &coverage)
}

/// The coverage channel of `image`.
pub(crate) fn alphas(image: &GlyphImage) -> Vec<u8> {
    image.pixels().iter().map(|px| px.a).collect()
}
