// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Near-duplicate detection by token Jaccard similarity.
//!
//! Tokens are lowercased alphanumeric runs. Kana and CJK ideographs carry no
//! word separators, so each of those characters is its own token.

use std::collections::HashSet;

use uma_core::DocumentMatch;

fn is_cjk(c: char) -> bool {
    matches!(c as u32,
        0x3040..=0x30FF      // hiragana, katakana
        | 0x3400..=0x4DBF    // CJK extension A
        | 0x4E00..=0x9FFF    // CJK unified ideographs
        | 0xF900..=0xFAFF    // compatibility ideographs
        | 0xFF66..=0xFF9F)   // half-width katakana
}

/// Split text into the token set used for similarity.
pub fn tokenize(text: &str) -> HashSet<String> {
    let mut tokens = HashSet::new();
    let mut word = String::new();
    for c in text.chars() {
        if is_cjk(c) {
            if !word.is_empty() {
                tokens.insert(std::mem::take(&mut word));
            }
            tokens.insert(c.to_string());
        } else if c.is_alphanumeric() {
            word.extend(c.to_lowercase());
        } else if !word.is_empty() {
            tokens.insert(std::mem::take(&mut word));
        }
    }
    if !word.is_empty() {
        tokens.insert(word);
    }
    tokens
}

/// |A ∩ B| / |A ∪ B|; two empty sets have similarity 0.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

struct Seen<'a> {
    tokens: HashSet<String>,
    content: &'a str,
}

impl Seen<'_> {
    fn duplicates(&self, tokens: &HashSet<String>, content: &str, threshold: f64) -> bool {
        if self.tokens.is_empty() && tokens.is_empty() {
            return self.content.trim() == content.trim();
        }
        jaccard(&self.tokens, tokens) >= threshold
    }
}

/// Drop near-duplicates from a list already sorted best-first.
///
/// A match is kept only if it is not a duplicate of any match kept before it,
/// so of each duplicate group the highest ranked survives.
pub fn dedup_sorted(matches: Vec<DocumentMatch>, threshold: f64) -> Vec<DocumentMatch> {
    let keep: Vec<bool> = {
        let mut kept: Vec<Seen<'_>> = Vec::with_capacity(matches.len());
        matches
            .iter()
            .map(|m| {
                let tokens = tokenize(&m.content);
                let duplicate = kept
                    .iter()
                    .any(|seen| seen.duplicates(&tokens, &m.content, threshold));
                if !duplicate {
                    kept.push(Seen {
                        tokens,
                        content: &m.content,
                    });
                }
                !duplicate
            })
            .collect()
    };

    matches
        .into_iter()
        .zip(keep)
        .filter_map(|(m, keep)| keep.then_some(m))
        .collect()
}
