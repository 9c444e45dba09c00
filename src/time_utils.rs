// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, Datelike, NaiveDate, SecondsFormat, Utc};

/// Korean short weekday names, Sunday first.
pub const KOREAN_WEEKDAYS: [&str; 7] = ["일", "월", "화", "수", "목", "금", "토"];

/// Format a UTC timestamp as RFC3339 with millisecond precision and a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current time as Unix epoch milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Long Korean date with short weekday, e.g. `2024년 8월 15일 (목)`.
pub fn format_korean_date(date: NaiveDate) -> String {
    let weekday = KOREAN_WEEKDAYS[date.weekday().num_days_from_sunday() as usize];
    format!(
        "{}년 {}월 {}일 ({})",
        date.year(),
        date.month(),
        date.day(),
        weekday
    )
}

/// Zero-padded hour slot, e.g. `09:00`.
pub fn format_hour_slot(hour: u32) -> String {
    format!("{:02}:00", hour)
}
