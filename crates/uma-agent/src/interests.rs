// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword-based interest extraction from user messages.

use std::sync::LazyLock;

use regex::Regex;
use uma_core::InterestExtractor;

/// Japanese noun phrases followed by an interest marker ("マラソンが好き").
static MARKED_JA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([\p{Han}\p{Katakana}ー]{2,})(?:が好き|が大好き|が趣味|に興味|のファン|を応援|にハマ)")
        .expect("marker pattern is valid")
});

/// Standalone katakana words, usually loanwords naming a topic.
static KATAKANA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{Katakana}ー]{3,}").expect("katakana pattern is valid"));

static LATIN_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{Latin}][\p{Latin}'-]*").expect("word pattern is valid"));

/// Words that carry no topic: function words, question words, time words.
const STOPWORDS: &[&str] = &[
    "about", "after", "again", "also", "anything", "been", "before", "being", "could", "does",
    "doing", "done", "each", "event", "events", "every", "first", "from", "give", "going", "good", "have",
    "having", "hello", "help", "here", "into", "just", "know", "last", "like", "love", "make", "many",
    "month", "more", "most", "much", "need", "next", "only", "other", "over", "please", "really",
    "remember", "should", "some", "something", "such", "tell", "than", "thank", "thanks", "that",
    "their", "them", "then", "there", "these", "they", "thing", "things", "this", "those", "time",
    "tips", "today", "tomorrow", "tonight", "very", "want", "week", "weekend", "what", "when",
    "where", "which", "while", "will", "with", "would", "year", "your", "yours",
];

/// Extracts topic keywords: marked Japanese phrases, katakana words and
/// latin words of at least `min_len` letters that are not stopwords.
#[derive(Debug, Clone)]
pub struct KeywordInterestExtractor {
    min_len: usize,
    max_per_message: usize,
}

impl KeywordInterestExtractor {
    pub fn new() -> Self {
        Self {
            min_len: 4,
            max_per_message: 3,
        }
    }

    pub fn with_limits(min_len: usize, max_per_message: usize) -> Self {
        Self {
            min_len,
            max_per_message,
        }
    }
}

impl Default for KeywordInterestExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl InterestExtractor for KeywordInterestExtractor {
    fn extract_interests(&self, text: &str) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        let mut push = |candidate: String| {
            if !found.contains(&candidate) {
                found.push(candidate);
            }
        };

        for caps in MARKED_JA.captures_iter(text) {
            push(caps[1].to_string());
        }
        for m in KATAKANA.find_iter(text) {
            push(m.as_str().to_string());
        }

        let lower = text.to_lowercase();
        for m in LATIN_WORD.find_iter(&lower) {
            let word = m.as_str().trim_matches(|c| c == '\'' || c == '-');
            let word = word.strip_suffix("'s").unwrap_or(word);
            if word.chars().count() >= self.min_len && !STOPWORDS.contains(&word) {
                push(word.to_string());
            }
        }

        found.truncate(self.max_per_message);
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> Vec<String> {
        KeywordInterestExtractor::new().extract_interests(text)
    }

    #[test]
    fn picks_topic_words() {
        assert_eq!(extract("Any tips for my first marathon?"), vec!["marathon"]);
    }

    #[test]
    fn skips_stopwords_and_short_words() {
        assert!(extract("What should I do this week?").is_empty());
    }

    #[test]
    fn deduplicates_case_insensitively() {
        assert_eq!(extract("Jazz, JAZZ and jazz"), vec!["jazz"]);
    }

    #[test]
    fn japanese_marked_phrases_and_katakana() {
        let found = extract("野球観戦が好きです。ソフトボールも");
        assert_eq!(found, vec!["野球観戦", "ソフトボール"]);
    }

    #[test]
    fn caps_per_message() {
        let found = KeywordInterestExtractor::with_limits(4, 2)
            .extract_interests("guitar piano violin cello");
        assert_eq!(found, vec!["guitar", "piano"]);
    }
}
