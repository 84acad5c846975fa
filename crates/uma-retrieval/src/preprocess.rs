// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query normalization applied before dispatching to backends.

use std::sync::LazyLock;

use regex::Regex;

static EMOJI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{Extended_Pictographic}\p{Regional_Indicator}\x{FE0F}\x{200D}\x{20E3}]")
        .expect("emoji pattern is valid")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Strips emoji, maps the ideographic space to ASCII and collapses runs of whitespace.
pub fn preprocess_query(query: &str) -> String {
    let without_emoji = EMOJI.replace_all(query, "");
    let spaced = without_emoji.replace('\u{3000}', " ");
    WHITESPACE.replace_all(spaced.trim(), " ").into_owned()
}
