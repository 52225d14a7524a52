use chrono::SubsecRound;

/// Entity identifiers are opaque strings (UUIDs in practice, but never parsed).
pub type EntityId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Current time at millisecond precision.
///
/// Snapshots store timestamps as epoch milliseconds, so anything finer would
/// not survive a save/load cycle.
pub fn now() -> Timestamp {
    chrono::Utc::now().trunc_subsecs(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_has_millisecond_precision() {
        let ts = now();
        assert_eq!(ts.timestamp_subsec_nanos() % 1_000_000, 0);
    }
}
