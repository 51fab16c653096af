use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_flag(value: Option<&str>) -> bool {
    matches!(value, Some("true"))
}

pub fn flag_to_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
