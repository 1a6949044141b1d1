//! Timestamp formatting for display consumers
//!
//! All functions are total: any timestamp that fails to parse renders as
//! `"Unknown"` instead of failing the caller.

use chrono::{DateTime, Utc};

const UNKNOWN: &str = "Unknown";

/// Format a timestamp as relative time, e.g. `"2 hours ago"`.
pub fn format_relative_time(timestamp: &str) -> String {
    match parse(timestamp) {
        Some(date) => relative_from(date, Utc::now()),
        None => UNKNOWN.to_string(),
    }
}

/// Format a timestamp as `"Jan 15, 2024 14:30"`.
pub fn format_date_time(timestamp: &str) -> String {
    parse(timestamp)
        .map(|date| date.format("%b %-d, %Y %H:%M").to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Format a timestamp as `"Jan 15, 2024"`.
pub fn format_date(timestamp: &str) -> String {
    parse(timestamp)
        .map(|date| date.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Format a timestamp as `"14:30"`.
pub fn format_time(timestamp: &str) -> String {
    parse(timestamp)
        .map(|date| date.format("%H:%M").to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn parse(timestamp: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(timestamp).ok().map(|date| date.with_timezone(&Utc))
}

fn relative_from(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(date);
    let seconds = elapsed.num_seconds();

    if seconds < 60 {
        return "just now".to_string();
    }

    let minutes = elapsed.num_minutes();
    if minutes < 60 {
        return plural(minutes, "minute");
    }

    let hours = elapsed.num_hours();
    if hours < 24 {
        return plural(hours, "hour");
    }

    let days = elapsed.num_days();
    if days < 30 {
        return plural(days, "day");
    }

    // Beyond a month, an absolute date reads better than "47 days ago".
    date.format("%b %-d, %Y").to_string()
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}
