// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! This crate contains the integration test suite for `glyph_store`.
//!
//! - The `util` module contains shared utility functions that are needed by different
//!   test methods.
//! - We do not use the default Rust test harness, but instead use this `mod.rs` file as the
//!   entry point to run all other tests, so shared utilities only need to be defined once.
//! - Every test that touches the file system gets its own scratch directory through
//!   [`util::TestEnv`], named after the test function. The directory is kept when a test
//!   fails so the entries can be inspected.
//! - For test naming, put the "topic" of the test at the start of the name, e.g.
//!   `corrupt_truncated_entry` rather than `truncated_entry_is_corrupt`.

#![allow(missing_docs, reason = "we don't need docs for testing")]
#![allow(clippy::cast_possible_truncation, reason = "not critical for testing")]

#[macro_use]
mod util;

mod basic;
