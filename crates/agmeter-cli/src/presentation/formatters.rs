use chrono::{Local, TimeZone};

/// Seconds as a compact duration: "45s", "12.5m", "1.5h".
pub fn format_duration(seconds: i64) -> String {
    if seconds < 60 {
        return format!("{}s", seconds);
    }
    let hours = seconds as f64 / 3600.0;
    if hours >= 1.0 {
        return format!("{:.1}h", hours);
    }
    format!("{:.1}m", seconds as f64 / 60.0)
}

/// Token count with K/M suffix.
pub fn format_tokens(tokens: i64) -> String {
    if tokens >= 1_000_000 {
        format!("{:.1}M", tokens as f64 / 1_000_000.0)
    } else if tokens >= 1_000 {
        format!("{:.1}K", tokens as f64 / 1_000.0)
    } else {
        tokens.to_string()
    }
}

pub fn format_cost(cost: f64) -> String {
    format!("${:.2}", cost)
}

/// Unix timestamp as local datetime; 0 renders as "-".
pub fn format_datetime(timestamp: i64) -> String {
    if timestamp == 0 {
        return "-".to_string();
    }
    match Local.timestamp_opt(timestamp, 0) {
        chrono::LocalResult::Single(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        _ => "-".to_string(),
    }
}

/// Unix timestamp as a short "Mar 01 10:00" label for session lists.
pub fn format_datetime_short(timestamp: i64) -> String {
    match Local.timestamp_opt(timestamp, 0) {
        chrono::LocalResult::Single(dt) => dt.format("%b %d %H:%M").to_string(),
        _ => "-".to_string(),
    }
}
