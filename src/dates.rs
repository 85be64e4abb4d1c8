use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Local, NaiveDate};

use crate::error::{Error, Result};

/// Canonical day format. Zero padding keeps lexicographic and chronological
/// order identical.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Weekday labels, Monday first.
pub const WEEK_DAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Today in local time.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Current local time as `HH:MM`.
pub fn current_time() -> String {
    Local::now().format("%H:%M").to_string()
}

/// Formats a day as `YYYY-MM-DD`.
pub fn day_key(date: NaiveDate) -> String {
    date.format(DAY_FORMAT).to_string()
}

/// Parses a strict `YYYY-MM-DD` string.
pub fn parse_day(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    if s.len() != 10 {
        return Err(Error::InvalidArgument(format!("invalid date '{}', use YYYY-MM-DD", s)));
    }
    NaiveDate::parse_from_str(s, DAY_FORMAT)
        .map_err(|e| Error::InvalidArgument(format!("invalid date '{}': {}. Use YYYY-MM-DD.", s, e)))
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Short weekday label for a day.
pub fn weekday_label(date: NaiveDate) -> &'static str {
    WEEK_DAYS[date.weekday().num_days_from_monday() as usize]
}

/// A calendar month, displayed as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// `month` is 1-based.
    pub fn new(year: i32, month: u32) -> Option<Month> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Month { year, month })
    }

    pub fn of(date: NaiveDate) -> Month {
        Month { year: date.year(), month: date.month() }
    }

    pub fn current() -> Month {
        Month::of(today())
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    pub fn days_in_month(self) -> u32 {
        let next = self.next().first_day();
        (next - self.first_day()).num_days() as u32
    }

    /// The date for day-of-month `day`, if it exists.
    pub fn day(self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        Month::of(date) == self
    }

    pub fn next(self) -> Month {
        if self.month == 12 {
            Month { year: self.year + 1, month: 1 }
        } else {
            Month { year: self.year, month: self.month + 1 }
        }
    }

    pub fn previous(self) -> Month {
        if self.month == 1 {
            Month { year: self.year - 1, month: 12 }
        } else {
            Month { year: self.year, month: self.month - 1 }
        }
    }

    /// Long label such as "October 2026".
    pub fn label(self) -> String {
        self.first_day().format("%B %Y").to_string()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = Error;

    fn from_str(s: &str) -> Result<Month> {
        let invalid = || Error::InvalidArgument(format!("invalid month '{}', use YYYY-MM", s));
        let (y, m) = s.trim().split_once('-').ok_or_else(invalid)?;
        if y.len() != 4 || m.len() != 2 {
            return Err(invalid());
        }
        let year = y.parse::<i32>().map_err(|_| invalid())?;
        let month = m.parse::<u32>().map_err(|_| invalid())?;
        Month::new(year, month).ok_or_else(invalid)
    }
}

/// Weekday of the first day of a month, counted from Monday.
pub fn leading_blanks(month: Month) -> usize {
    let first = month.first_day().weekday();
    // (weekday + 6) % 7 with Sunday = 0, i.e. days since Monday
    first.num_days_from_monday() as usize
}
