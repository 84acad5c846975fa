// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Profile zone: a short summary of what is known about the user.

use uma_core::{ConversationTurn, UserProfile};

/// Renders the profile summary, or `None` when nothing is known yet.
pub fn summarize_profile(profile: &UserProfile, max_interests: usize) -> Option<String> {
    if profile.interests.is_empty() && profile.turn_count == 0 {
        return None;
    }

    let mut lines = Vec::with_capacity(3);
    let interests = profile.top_interests(max_interests);
    if !interests.is_empty() {
        lines.push(format!("Interests: {}", interests.join(", ")));
    }
    lines.push(format!("Conversations so far: {}", profile.turn_count));
    if let Some(last) = profile.last_interaction {
        lines.push(format!("Last interaction: {}", last.format("%Y-%m-%d %H:%M UTC")));
    }
    Some(lines.join("\n"))
}

/// Renders one history turn as `role: content`.
pub fn render_turn(turn: &ConversationTurn) -> String {
    format!("{}: {}", turn.role, turn.content.trim())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use uma_core::Role;

    use super::*;

    #[test]
    fn empty_profile_has_no_summary() {
        assert!(summarize_profile(&UserProfile::empty("u1"), 5).is_none());
    }

    #[test]
    fn summary_lists_recent_interests_first() {
        let profile = UserProfile {
            user_id: "u1".into(),
            interests: vec!["running".into(), "cycling".into(), "marathon".into()],
            turn_count: 4,
            last_interaction: Some(Utc.with_ymd_and_hms(2026, 5, 1, 9, 30, 0).unwrap()),
        };
        let summary = summarize_profile(&profile, 2).unwrap();
        assert_eq!(
            summary,
            "Interests: marathon, cycling\nConversations so far: 4\nLast interaction: 2026-05-01 09:30 UTC"
        );
    }

    #[test]
    fn turn_rendering() {
        let turn = ConversationTurn::new("u1", "s1", Role::Assistant, " See you at 9. ");
        assert_eq!(render_turn(&turn), "assistant: See you at 9.");
    }
}
