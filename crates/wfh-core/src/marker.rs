//! Work-presence markers parsed from calendar event summaries.

use std::fmt;

/// Work-presence intent signalled by a calendar event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkMarker {
    /// The user arrived at the office ("I entered work").
    EnteredWork,
    /// The user left the office ("I exited work").
    ExitedWork,
    /// Full remote workday ("WFH").
    WorkFromHome,
    /// Out of office; the day is excluded from duration accounting ("OOO").
    OutOfOffice,
    /// Any other event.
    Unclassified,
}

impl WorkMarker {
    /// Classifies an event summary against the fixed marker phrases.
    ///
    /// Only the start of the summary is tested: "I entered work late" is
    /// [`Self::EnteredWork`], while "Please note WFH" is
    /// [`Self::Unclassified`]. A missing or empty summary is
    /// [`Self::Unclassified`].
    #[must_use]
    pub fn classify(summary: Option<&str>) -> Self {
        let Some(summary) = summary else {
            return Self::Unclassified;
        };
        if summary.starts_with("I entered work") {
            Self::EnteredWork
        } else if summary.starts_with("I exited work") {
            Self::ExitedWork
        } else if summary.starts_with("WFH") {
            Self::WorkFromHome
        } else if summary.starts_with("OOO") {
            Self::OutOfOffice
        } else {
            Self::Unclassified
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::EnteredWork => "entered_work",
            Self::ExitedWork => "exited_work",
            Self::WorkFromHome => "wfh",
            Self::OutOfOffice => "ooo",
            Self::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for WorkMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
