//! Date helpers for page bindings.

use chrono::{DateTime, FixedOffset, TimeDelta};

/// Format a timestamp as `YYYY-MM-DD`.
pub fn format_date(ts: &DateTime<FixedOffset>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

/// Describe how long ago `ts` was, relative to `now` ("3 days ago").
///
/// Future timestamps read "in 3 days".
pub fn humanize(ts: &DateTime<FixedOffset>, now: &DateTime<FixedOffset>) -> String {
    let delta = now.signed_duration_since(ts);
    if delta.abs() < TimeDelta::seconds(45) {
        return "just now".into();
    }

    let phrase = describe(delta.abs());
    if delta < TimeDelta::zero() {
        format!("in {phrase}")
    } else {
        format!("{phrase} ago")
    }
}

fn describe(delta: TimeDelta) -> String {
    let (count, unit) = match delta {
        d if d < TimeDelta::minutes(45) => (d.num_minutes().max(1), "minute"),
        d if d < TimeDelta::hours(22) => (d.num_hours().max(1), "hour"),
        d if d < TimeDelta::days(26) => (d.num_days().max(1), "day"),
        d if d < TimeDelta::days(320) => ((d.num_days() / 30).max(1), "month"),
        d => ((d.num_days() / 365).max(1), "year"),
    };
    match count {
        1 if unit == "hour" => "an hour".into(),
        1 => format!("a {unit}"),
        n => format!("{n} {unit}s"),
    }
}
