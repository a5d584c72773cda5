use chrono::{DateTime, Utc};

/// Coarse relative time, e.g. `"5 min ago"`. Future timestamps read as
/// `"0 sec ago"`.
#[must_use]
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0);
    if secs < 60 {
        return format!("{secs} sec ago");
    }
    let mins = secs / 60;
    if mins < 60 {
        return format!("{mins} min ago");
    }
    let hours = mins / 60;
    if hours < 24 {
        return format!("{hours} hr ago");
    }
    format!("{} day(s) ago", hours / 24)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use classroom_core::time::fixed_now;

    #[test]
    fn picks_the_largest_whole_unit() {
        let now = fixed_now();
        let ago = |d: Duration| time_ago(now - d, now);
        assert_eq!(ago(Duration::seconds(0)), "0 sec ago");
        assert_eq!(ago(Duration::seconds(59)), "59 sec ago");
        assert_eq!(ago(Duration::seconds(60)), "1 min ago");
        assert_eq!(ago(Duration::minutes(59) + Duration::seconds(59)), "59 min ago");
        assert_eq!(ago(Duration::hours(23)), "23 hr ago");
        assert_eq!(ago(Duration::hours(24)), "1 day(s) ago");
        assert_eq!(ago(Duration::days(10)), "10 day(s) ago");
    }

    #[test]
    fn future_is_clamped() {
        let now = fixed_now();
        assert_eq!(time_ago(now + Duration::minutes(5), now), "0 sec ago");
    }
}
