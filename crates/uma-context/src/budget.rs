// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fitting the assembled sections into a character budget.
//!
//! Sections are concatenated in a fixed order: profile, history, evidence,
//! query. When the text is too long, whole entries are removed: oldest
//! history turn first, then lowest-ranked evidence, then the profile. The
//! query is never cut.

pub const PROFILE_HEADER: &str = "[User profile]";
pub const HISTORY_HEADER: &str = "[Recent conversation]";
pub const EVIDENCE_HEADER: &str = "[Retrieved evidence]";
pub const QUERY_HEADER: &str = "[Question]";

const SECTION_SEPARATOR: &str = "\n\n";

/// Sections before budgeting. History is chronological, evidence best first.
#[derive(Debug, Clone, Default)]
pub struct Sections {
    pub profile: Option<String>,
    pub history: Vec<String>,
    pub evidence: Vec<String>,
}

/// Result of [`fit_to_budget`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fitted {
    pub text: String,
    pub profile_included: bool,
    pub history_kept: usize,
    pub evidence_kept: usize,
    /// Entries removed to meet the budget.
    pub removed: usize,
    /// The query alone does not fit.
    pub over_budget: bool,
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn block_len<'a>(header: &str, lines: impl IntoIterator<Item = &'a str>) -> usize {
    // header, then "\n" before every line
    char_len(header) + lines.into_iter().map(|l| 1 + char_len(l)).sum::<usize>()
}

struct Layout<'a> {
    profile: Option<&'a str>,
    history: &'a [String],
    evidence: &'a [String],
    query: &'a str,
}

impl Layout<'_> {
    fn blocks(&self) -> Vec<(&'static str, Vec<&str>)> {
        let mut blocks = Vec::with_capacity(4);
        if let Some(profile) = self.profile {
            blocks.push((PROFILE_HEADER, vec![profile]));
        }
        if !self.history.is_empty() {
            blocks.push((HISTORY_HEADER, self.history.iter().map(String::as_str).collect()));
        }
        if !self.evidence.is_empty() {
            blocks.push((EVIDENCE_HEADER, self.evidence.iter().map(String::as_str).collect()));
        }
        blocks.push((QUERY_HEADER, vec![self.query]));
        blocks
    }

    fn len(&self) -> usize {
        let blocks = self.blocks();
        let body: usize = blocks
            .iter()
            .map(|(header, lines)| block_len(header, lines.iter().copied()))
            .sum();
        body + (blocks.len() - 1) * char_len(SECTION_SEPARATOR)
    }

    fn render(&self) -> String {
        self.blocks()
            .into_iter()
            .map(|(header, lines)| {
                let mut block = String::from(header);
                for line in lines {
                    block.push('\n');
                    block.push_str(line);
                }
                block
            })
            .collect::<Vec<_>>()
            .join(SECTION_SEPARATOR)
    }
}

/// Concatenates the sections and trims them until the text fits `budget_chars`.
///
/// If even the bare query is longer than the budget, the text is the bare
/// query and `over_budget` is set.
pub fn fit_to_budget(sections: &Sections, query: &str, budget_chars: usize) -> Fitted {
    let mut history_start = 0;
    let mut evidence_end = sections.evidence.len();
    let mut profile = sections.profile.as_deref();
    let mut removed = 0;

    loop {
        let layout = Layout {
            profile,
            history: &sections.history[history_start..],
            evidence: &sections.evidence[..evidence_end],
            query,
        };
        if layout.len() <= budget_chars {
            return Fitted {
                text: layout.render(),
                profile_included: profile.is_some(),
                history_kept: sections.history.len() - history_start,
                evidence_kept: evidence_end,
                removed,
                over_budget: false,
            };
        }

        if history_start < sections.history.len() {
            history_start += 1;
        } else if evidence_end > 0 {
            evidence_end -= 1;
        } else if profile.is_some() {
            profile = None;
        } else {
            break;
        }
        removed += 1;
    }

    // Only the query section is left and its header does not fit.
    Fitted {
        text: query.to_string(),
        profile_included: false,
        history_kept: 0,
        evidence_kept: 0,
        removed,
        over_budget: char_len(query) > budget_chars,
    }
}
