// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `bytemuck` trait impls for pixel types.

#![allow(
    unsafe_code,
    reason = "The `bytemuck` marker traits are `unsafe` and require `unsafe impl`."
)]

use crate::Rgba8;
use bytemuck::{Pod, Zeroable};

// Safety: The struct is `repr(C)` with four `u8` fields and no padding.
// All-zero bytes are a valid (transparent black) pixel.
unsafe impl Zeroable for Rgba8 {}

// Safety: The struct is `repr(C)`, `Copy`, has no padding, and every bit
// pattern of its `u8` fields is valid.
unsafe impl Pod for Rgba8 {}
