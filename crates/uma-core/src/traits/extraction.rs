// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pluggable interest extraction used for profile learning.

/// Extracts interest keywords from free text.
///
/// Implementations are heuristic and synchronous. The returned list has no
/// duplicates and keeps first-mention order.
pub trait InterestExtractor: Send + Sync {
    fn extract_interests(&self, text: &str) -> Vec<String>;
}
