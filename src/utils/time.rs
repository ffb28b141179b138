use chrono::{DateTime, Utc};

pub const MILLIS_PER_SECOND: i64 = 1000;
pub const SECONDS_PER_DAY: i64 = 86_400;

pub fn time_millis() -> i64 {
    let time: DateTime<chrono::Utc> = Utc::now();
    time.timestamp_millis()
}

/// Whole seconds from `now` until `deadline`, never negative.
pub fn seconds_until(
    deadline: i64,
    now: i64,
) -> i64 {
    (deadline - now).max(0) / MILLIS_PER_SECOND
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_until_floors_at_zero() {
        assert_eq!(seconds_until(10_500, 500), 10);
        assert_eq!(seconds_until(500, 10_500), 0);
        assert_eq!(seconds_until(1_999, 1_000), 0);
    }
}
