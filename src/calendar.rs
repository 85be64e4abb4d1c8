//! Month grids and per-day check-in status.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};

use crate::dates::{leading_blanks, Month};
use crate::models::Checkin;

/// One slot of a Monday-first month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarCell {
    /// Placeholder before the first day of the month.
    Empty,
    Day { day: u32, date: NaiveDate },
}

/// Status of a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayStatus {
    Future,
    /// Number of check-ins recorded that day.
    Done(usize),
    /// Today, nothing recorded yet.
    Pending,
    Missed,
}

impl DayStatus {
    pub fn label(self) -> String {
        match self {
            DayStatus::Future => "Not started".to_string(),
            DayStatus::Done(n) => format!("Done ({})", n),
            DayStatus::Pending => "Pending".to_string(),
            DayStatus::Missed => "Missed".to_string(),
        }
    }
}

impl fmt::Display for DayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

pub type CheckinsByDate<'a> = BTreeMap<NaiveDate, Vec<&'a Checkin>>;

/// Leading blanks followed by one cell per day.
pub fn build_month_grid(month: Month) -> Vec<CalendarCell> {
    let blanks = leading_blanks(month);
    let mut cells = vec![CalendarCell::Empty; blanks];
    cells.extend(
        (1..=month.days_in_month())
            .filter_map(|day| month.day(day).map(|date| CalendarCell::Day { day, date })),
    );
    cells
}

/// Status of day-of-month `day` when today is day-of-month `today_day`.
///
/// Only compares days of month, so `today_day` must come from the same month
/// as `day`. [`month_with_status`] adapts it for other months.
pub fn day_status(day: u32, today_day: u32, by_date: &CheckinsByDate<'_>, date: NaiveDate) -> DayStatus {
    if day > today_day {
        return DayStatus::Future;
    }
    match by_date.get(&date) {
        Some(checkins) if !checkins.is_empty() => DayStatus::Done(checkins.len()),
        _ if day == today_day => DayStatus::Pending,
        _ => DayStatus::Missed,
    }
}

/// Buckets check-ins by date, keeping their relative order.
pub fn group_checkins_by_date(checkins: &[Checkin]) -> CheckinsByDate<'_> {
    let mut map: CheckinsByDate<'_> = BTreeMap::new();
    for c in checkins {
        map.entry(c.date).or_default().push(c);
    }
    map
}

/// A grid cell decorated with its status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCell {
    pub cell: CalendarCell,
    pub status: Option<DayStatus>,
}

/// Month grid with a status for every day.
///
/// For months other than the current one the "today" reference is moved
/// past the end (earlier months) or before the start (later months), so
/// past months show done/missed days and future months show only future
/// days.
pub fn month_with_status(month: Month, today: NaiveDate, checkins: &[Checkin]) -> Vec<StatusCell> {
    let by_date = group_checkins_by_date(checkins);
    let today_day = reference_day(month, today);
    build_month_grid(month)
        .into_iter()
        .map(|cell| match cell {
            CalendarCell::Empty => StatusCell { cell, status: None },
            CalendarCell::Day { day, date } => StatusCell {
                cell,
                status: Some(day_status(day, today_day, &by_date, date)),
            },
        })
        .collect()
}

fn reference_day(month: Month, today: NaiveDate) -> u32 {
    let current = Month::of(today);
    if month == current {
        today.day()
    } else if month < current {
        month.days_in_month() + 1
    } else {
        0
    }
}

/// Counts per status for a decorated month, as `(done, missed, pending)` days.
pub fn month_summary(cells: &[StatusCell]) -> (usize, usize, usize) {
    cells.iter().filter_map(|c| c.status).fold((0, 0, 0), |(d, m, p), s| match s {
        DayStatus::Done(_) => (d + 1, m, p),
        DayStatus::Missed => (d, m + 1, p),
        DayStatus::Pending => (d, m, p + 1),
        DayStatus::Future => (d, m, p),
    })
}
