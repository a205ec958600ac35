//! Shared utilities for CLI commands.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;

/// Resolves midnight on `date` in `tz`.
/// Handles DST ambiguity by picking the earlier time.
pub fn local_midnight(date: NaiveDate, tz: Tz) -> DateTime<Tz> {
    let midnight = date.and_time(NaiveTime::from_hms_opt(0, 0, 0).unwrap());
    match tz.from_local_datetime(&midnight) {
        // Single or ambiguous (DST fall-back): use the earlier time
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
        LocalResult::None => {
            // DST spring-forward gap at midnight is rare but possible
            // Use 1am local which is guaranteed to exist
            let one_am = date.and_time(NaiveTime::from_hms_opt(1, 0, 0).unwrap());
            tz.from_local_datetime(&one_am).unwrap()
        }
    }
}
