//! Work-duration aggregation and report rendering.
//!
//! Calendar events mark only the boundaries of a work session ("entered" /
//! "exited" timestamps), so the aggregator folds the day's timed events into
//! a single line whose end is pushed forward to the latest start time seen.
//! Callers rely on the upstream guarantee that events arrive ascending by
//! start time and that "exited work" is the last event of the day.

use std::io::{self, Write};
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, LocalResult, NaiveDate, NaiveTime, TimeDelta, TimeZone};
use chrono_tz::Tz;
use thiserror::Error;

use crate::event::CalendarEvent;
use crate::marker::WorkMarker;

/// Synthetic working hours credited for a WFH day.
const WFH_START_HOUR: u32 = 9;
const WFH_END_HOUR: u32 = 17;

/// One work day in the report.
///
/// Created on the first event of a new date and mutated in place while more
/// events for the same date arrive. Lines that never receive a duration are
/// dropped at render time, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub date: NaiveDate,
    pub start: DateTime<FixedOffset>,
    pub end: Option<DateTime<FixedOffset>>,
    pub duration: Option<TimeDelta>,
}

/// Reduces an ordered event sequence to one line per work day.
///
/// - `OOO` events contribute nothing.
/// - `WFH` events append a synthetic 09:00-17:00 line for the event's date,
///   even when a line for that date already exists (last-wins at render).
/// - Date-only events other than WFH are ignored for duration purposes.
/// - Each further timed event on the open line's date moves that line's end
///   to the event's start time.
///
/// `tz` is the work calendar's timezone, used to place the synthetic WFH
/// hours; timed events keep the offset they arrived with.
#[must_use]
pub fn aggregate(events: &[CalendarEvent], tz: Tz) -> Vec<ReportLine> {
    let mut report: Vec<ReportLine> = Vec::new();

    for event in events {
        let marker = WorkMarker::classify(event.summary.as_deref());

        if marker == WorkMarker::OutOfOffice {
            continue;
        }

        if marker == WorkMarker::WorkFromHome {
            let Some(date) = event.start.day() else {
                continue;
            };
            report.push(ReportLine {
                date,
                start: local_at_hour(date, WFH_START_HOUR, tz),
                end: Some(local_at_hour(date, WFH_END_HOUR, tz)),
                duration: Some(TimeDelta::hours(8)),
            });
            continue;
        }

        let Some(start) = event.start.timed() else {
            continue;
        };
        let date = start.date_naive();

        match report.last_mut() {
            Some(line) if line.date == date => {
                line.end = Some(start);
                line.duration = Some(start - line.start);
            }
            _ => report.push(ReportLine {
                date,
                start,
                end: None,
                duration: None,
            }),
        }
    }

    report
}

/// Resolves a wall-clock hour on `date` in `tz`.
/// Handles DST ambiguity by picking the earlier time.
fn local_at_hour(date: NaiveDate, hour: u32, tz: Tz) -> DateTime<FixedOffset> {
    let naive = date.and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap());
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.fixed_offset(),
        LocalResult::None => {
            // DST spring-forward gap; the following hour always exists
            let next = date.and_time(NaiveTime::from_hms_opt(hour + 1, 0, 0).unwrap());
            tz.from_local_datetime(&next).unwrap().fixed_offset()
        }
    }
}

/// Report presentation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportMode {
    /// `YYYY-MM-DD H:MM:SS` per day.
    #[default]
    Human,
    /// `<index> <hours>` pairs suitable for plotting.
    Plot,
    /// Comma-separated `date, hours`.
    Csv,
    /// Tab-separated `date\thours`, pasteable into a spreadsheet.
    Sheets,
}

impl ReportMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Plot => "plot",
            Self::Csv => "csv",
            Self::Sheets => "sheets",
        }
    }
}

/// Error type for unknown report mode strings.
#[derive(Debug, Clone, Error)]
#[error("unknown report mode: {0} (expected human, plot, csv, or sheets)")]
pub struct UnknownReportMode(String);

impl FromStr for ReportMode {
    type Err = UnknownReportMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "human" => Ok(Self::Human),
            "plot" => Ok(Self::Plot),
            "csv" => Ok(Self::Csv),
            "sheets" => Ok(Self::Sheets),
            _ => Err(UnknownReportMode(s.to_string())),
        }
    }
}

impl std::fmt::Display for ReportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Writes the report in the requested mode.
///
/// Lines that never got a duration are skipped in every mode, but they keep
/// their position in the sequence: `plot` indices are not renumbered around
/// them.
pub fn render<W: Write>(writer: &mut W, report: &[ReportLine], mode: ReportMode) -> io::Result<()> {
    for (index, line) in report.iter().enumerate() {
        let Some(duration) = line.duration else {
            continue;
        };
        #[allow(clippy::cast_precision_loss)]
        let hours = duration.num_seconds() as f64 / 3600.0;
        match mode {
            ReportMode::Human => {
                writeln!(writer, "{} {}", line.date, format_clock(duration))?;
            }
            ReportMode::Plot => writeln!(writer, "{index} {hours:.6}")?,
            ReportMode::Csv => writeln!(writer, "{}, {hours}", line.date)?,
            ReportMode::Sheets => writeln!(writer, "{}\t{hours}", line.date)?,
        }
    }
    Ok(())
}

/// Formats a duration as `H:MM:SS`, hours unpadded.
fn format_clock(duration: TimeDelta) -> String {
    let total = duration.num_seconds();
    format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};
    use chrono_tz::America::New_York;
    use insta::assert_snapshot;

    use super::*;
    use crate::event::CalendarEvent;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn timed(summary: &str, rfc3339: &str) -> CalendarEvent {
        CalendarEvent::timed(summary, DateTime::parse_from_rfc3339(rfc3339).unwrap())
    }

    #[test]
    fn aggregate_of_no_events_is_empty() {
        assert!(aggregate(&[], New_York).is_empty());
    }

    #[test]
    fn wfh_all_day_event_yields_synthetic_full_day() {
        let events = [CalendarEvent::all_day("WFH", date(2025, 3, 12))];
        let report = aggregate(&events, New_York);

        assert_eq!(report.len(), 1);
        let line = &report[0];
        assert_eq!(line.date, date(2025, 3, 12));
        assert_eq!(
            line.start,
            New_York
                .with_ymd_and_hms(2025, 3, 12, 9, 0, 0)
                .unwrap()
                .fixed_offset()
        );
        assert_eq!(
            line.end,
            Some(
                New_York
                    .with_ymd_and_hms(2025, 3, 12, 17, 0, 0)
                    .unwrap()
                    .fixed_offset()
            )
        );
        assert_eq!(line.duration, Some(TimeDelta::hours(8)));
    }

    #[test]
    fn same_day_events_extend_the_open_line() {
        let events = [
            timed("I entered work", "2025-03-12T09:00:00-04:00"),
            timed("I exited work", "2025-03-12T17:30:00-04:00"),
        ];
        let report = aggregate(&events, New_York);

        assert_eq!(report.len(), 1);
        assert_eq!(
            report[0].duration,
            Some(TimeDelta::hours(8) + TimeDelta::minutes(30))
        );
    }

    #[test]
    fn events_on_different_dates_open_separate_lines() {
        let events = [
            timed("I entered work", "2025-03-12T09:00:00-04:00"),
            timed("I exited work", "2025-03-12T17:00:00-04:00"),
            timed("I entered work", "2025-03-13T08:30:00-04:00"),
            timed("I exited work", "2025-03-13T16:30:00-04:00"),
        ];
        let report = aggregate(&events, New_York);

        assert_eq!(report.len(), 2);
        assert_eq!(report[0].date, date(2025, 3, 12));
        assert_eq!(report[0].duration, Some(TimeDelta::hours(8)));
        assert_eq!(report[1].date, date(2025, 3, 13));
        assert_eq!(report[1].duration, Some(TimeDelta::hours(8)));
    }

    #[test]
    fn ooo_events_contribute_nothing() {
        let events = [CalendarEvent::all_day("OOO", date(2025, 3, 12))];
        assert!(aggregate(&events, New_York).is_empty());

        let events = [timed("OOO but reachable", "2025-03-12T09:00:00-04:00")];
        assert!(aggregate(&events, New_York).is_empty());
    }

    #[test]
    fn date_only_events_are_ignored_for_duration() {
        let events = [CalendarEvent::all_day("Company holiday", date(2025, 3, 12))];
        assert!(aggregate(&events, New_York).is_empty());
    }

    #[test]
    fn repeated_wfh_events_append_duplicate_lines() {
        // Duplicate-day policy is last-wins for WFH; both rows survive.
        let events = [
            CalendarEvent::all_day("WFH", date(2025, 3, 12)),
            CalendarEvent::all_day("WFH again", date(2025, 3, 12)),
        ];
        let report = aggregate(&events, New_York);

        assert_eq!(report.len(), 2);
        assert_eq!(report[0].date, report[1].date);
    }

    #[test]
    fn timed_event_after_wfh_extends_the_synthetic_line() {
        let events = [
            CalendarEvent::all_day("WFH", date(2025, 3, 12)),
            timed("I exited work", "2025-03-12T18:00:00-04:00"),
        ];
        let report = aggregate(&events, New_York);

        assert_eq!(report.len(), 1);
        // End moves to the event's start; duration recomputed from 09:00.
        assert_eq!(report[0].duration, Some(TimeDelta::hours(9)));
    }

    #[test]
    fn single_timed_event_leaves_line_open() {
        let events = [timed("I entered work", "2025-03-12T09:00:00-04:00")];
        let report = aggregate(&events, New_York);

        assert_eq!(report.len(), 1);
        assert!(report[0].end.is_none());
        assert!(report[0].duration.is_none());
    }

    #[test]
    fn report_mode_parses_known_names() {
        assert_eq!("human".parse::<ReportMode>().unwrap(), ReportMode::Human);
        assert_eq!("plot".parse::<ReportMode>().unwrap(), ReportMode::Plot);
        assert_eq!("csv".parse::<ReportMode>().unwrap(), ReportMode::Csv);
        assert_eq!("sheets".parse::<ReportMode>().unwrap(), ReportMode::Sheets);
        assert!("gnuplot".parse::<ReportMode>().is_err());
    }

    fn sample_report() -> Vec<ReportLine> {
        let events = [
            timed("I entered work", "2025-03-10T09:00:00-04:00"),
            timed("I exited work", "2025-03-10T17:30:00-04:00"),
            // Open line: consumes an index but renders nowhere.
            timed("I entered work", "2025-03-11T09:15:00-04:00"),
            CalendarEvent::all_day("WFH", date(2025, 3, 12)),
        ];
        aggregate(&events, New_York)
    }

    fn rendered(mode: ReportMode) -> String {
        let mut out = Vec::new();
        render(&mut out, &sample_report(), mode).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn renders_human_mode() {
        assert_snapshot!(rendered(ReportMode::Human), @r"
        2025-03-10 8:30:00
        2025-03-12 8:00:00
        ");
    }

    #[test]
    fn renders_plot_mode_preserving_indices() {
        assert_snapshot!(rendered(ReportMode::Plot), @r"
        0 8.500000
        2 8.000000
        ");
    }

    #[test]
    fn renders_csv_mode() {
        assert_snapshot!(rendered(ReportMode::Csv), @r"
        2025-03-10, 8.5
        2025-03-12, 8
        ");
    }

    #[test]
    fn renders_sheets_mode() {
        assert_snapshot!(rendered(ReportMode::Sheets), @"2025-03-10	8.5
2025-03-12	8
");
    }
}
