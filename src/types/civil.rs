//! Timezone-labeled wall-clock datetimes.
//!
//! The spreadsheet never stores UTC instants, only local wall-clock values.
//! A [`CivilDateTime`] therefore keeps the wall-clock digits untouched and
//! carries the timezone as a label: attaching or changing the label never
//! shifts the digits, and no DST or UTC offset is ever applied.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use chrono_tz::Tz;
use std::cmp::Ordering;
use std::fmt;
use std::fmt::{Display, Formatter};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CivilDateTime {
    naive: NaiveDateTime,
    timezone: Tz,
}

impl CivilDateTime {
    /// Labels `naive` with `timezone` without recomputing any offset.
    pub fn new(naive: NaiveDateTime, timezone: Tz) -> Self {
        Self { naive, timezone }
    }

    pub fn naive(&self) -> NaiveDateTime {
        self.naive
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn date(&self) -> NaiveDate {
        self.naive.date()
    }

    pub fn time(&self) -> NaiveTime {
        self.naive.time()
    }

    pub fn year(&self) -> i32 {
        self.naive.year()
    }

    pub fn month(&self) -> u32 {
        self.naive.month()
    }

    pub fn day(&self) -> u32 {
        self.naive.day()
    }

    /// Moves the wall clock by whole calendar days, keeping the time of day.
    pub fn add_days(&self, days: i64) -> Option<Self> {
        let delta = TimeDelta::try_days(days)?;
        let naive = self.naive.checked_add_signed(delta)?;
        Some(Self::new(naive, self.timezone))
    }

    pub fn is_same_day(&self, other: &CivilDateTime) -> bool {
        self.date() == other.date()
    }

    /// Renders the wall-clock digits with a strftime pattern.
    pub fn format(&self, pattern: &str) -> String {
        self.naive.format(pattern).to_string()
    }
}

// Values labeled with different zones are not comparable.
impl PartialOrd for CivilDateTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.timezone != other.timezone {
            return None;
        }
        Some(self.naive.cmp(&other.naive))
    }
}

impl Display for CivilDateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.naive, self.timezone.name())
    }
}
