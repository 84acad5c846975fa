// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query classification for the Uma assistant.
//!
//! This crate provides:
//! - [`QueryClassifier`]: heuristic time-scoped / profile-only / general classification
//! - [`TimeWindow`]: UTC windows inferred from relative expressions and explicit dates

pub mod classifier;
pub mod time_window;

pub use classifier::{ClassificationResult, QueryClassifier, QueryKind};
pub use time_window::{TimeWindow, WindowKind, infer_window, parse_timestamp, relative_window};
