// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Time windows referenced by a query ("this week", "明日", explicit ranges).
//!
//! All windows are half-open `[start, end)` in UTC and computed against a
//! caller-supplied `now`, so inference is deterministic under test.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use regex::Regex;
use serde::Serialize;

/// Which relative expression produced a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    Today,
    Tomorrow,
    ThisWeek,
    NextWeek,
    Weekend,
    ThisMonth,
    NextMonth,
    Explicit,
}

/// A half-open UTC interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub kind: WindowKind,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

static DATE_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4}-\d{2}-\d{2})\s*(?:to|until|through|~|〜|から|–|—)\s*(\d{4}-\d{2}-\d{2})")
        .expect("date range pattern is valid")
});

static SINGLE_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4}-\d{2}-\d{2})\b").expect("date pattern is valid"));

/// Keyword table, checked in order. Longer phrases that contain shorter
/// ones ("今週末" contains "今週") come first.
const KEYWORDS: &[(WindowKind, &[&str])] = &[
    (WindowKind::Tomorrow, &["tomorrow", "明日", "あした"]),
    (WindowKind::Today, &["today", "tonight", "今日", "本日"]),
    (WindowKind::Weekend, &["this weekend", "weekend", "今週末", "週末"]),
    (
        WindowKind::NextWeek,
        &["next week", "coming week", "upcoming week", "next 7 days", "来週"],
    ),
    (WindowKind::ThisWeek, &["this week", "今週", "週の予定"]),
    (WindowKind::NextMonth, &["next month", "来月"]),
    (WindowKind::ThisMonth, &["this month", "今月"]),
];

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Find the window a query refers to, if any.
pub fn infer_window(query: &str, now: DateTime<Utc>) -> Option<TimeWindow> {
    if let Some(window) = explicit_window(query) {
        return Some(window);
    }

    let lower = query.to_lowercase();
    let kind = KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .map(|(kind, _)| *kind)?;
    Some(relative_window(kind, now))
}

/// The window a relative expression denotes at `now`.
pub fn relative_window(kind: WindowKind, now: DateTime<Utc>) -> TimeWindow {
    let today = now.date_naive();
    let week_start = today - Days::new(u64::from(today.weekday().num_days_from_monday()));
    let (start, end) = match kind {
        WindowKind::Today => (midnight(today), midnight(today + Days::new(1))),
        WindowKind::Tomorrow => (
            midnight(today + Days::new(1)),
            midnight(today + Days::new(2)),
        ),
        WindowKind::ThisWeek => (midnight(week_start), midnight(week_start + Days::new(7))),
        WindowKind::NextWeek => (now, now + chrono::Duration::days(7)),
        WindowKind::Weekend => (
            midnight(week_start + Days::new(5)),
            midnight(week_start + Days::new(7)),
        ),
        WindowKind::ThisMonth => {
            let first = first_of_month(today);
            (midnight(first), midnight(first + Months::new(1)))
        }
        WindowKind::NextMonth => {
            let first = first_of_month(today) + Months::new(1);
            (midnight(first), midnight(first + Months::new(1)))
        }
        // Explicit windows carry their own bounds; fall back to today.
        WindowKind::Explicit => (midnight(today), midnight(today + Days::new(1))),
    };
    TimeWindow { kind, start, end }
}

fn explicit_window(query: &str) -> Option<TimeWindow> {
    let parse = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok();

    let (first, last) = if let Some(caps) = DATE_RANGE.captures(query) {
        (parse(&caps[1])?, parse(&caps[2])?)
    } else {
        let caps = SINGLE_DATE.captures(query)?;
        let day = parse(&caps[1])?;
        (day, day)
    };
    let (first, last) = if last < first { (last, first) } else { (first, last) };

    Some(TimeWindow {
        kind: WindowKind::Explicit,
        start: midnight(first),
        end: midnight(last + Days::new(1)),
    })
}

/// Parse a document timestamp: RFC 3339, or a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(midnight)
}
