//! Which days may still receive a check-in.

use std::fmt;

use chrono::NaiveDate;

use crate::error::{Error, Result};

/// How many days back a missed check-in can be made up.
pub const MAKEUP_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Today,
    Future,
    /// Within the backfill window.
    CanMakeUp,
    Expired,
}

impl Eligibility {
    pub fn is_writable(self) -> bool {
        matches!(self, Eligibility::Today | Eligibility::CanMakeUp)
    }
}

impl fmt::Display for Eligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eligibility::Today => f.write_str("today"),
            Eligibility::Future => f.write_str("date is in the future"),
            Eligibility::CanMakeUp => f.write_str("can be made up"),
            Eligibility::Expired => write!(f, "more than {} days ago", MAKEUP_WINDOW_DAYS),
        }
    }
}

pub fn classify(date: NaiveDate, today: NaiveDate) -> Eligibility {
    if date == today {
        return Eligibility::Today;
    }
    if date > today {
        return Eligibility::Future;
    }
    let days_back = (today - date).num_days();
    if days_back > 0 && days_back <= MAKEUP_WINDOW_DAYS {
        Eligibility::CanMakeUp
    } else {
        Eligibility::Expired
    }
}

/// Rejects writes for dates outside today and the backfill window.
pub fn ensure_writable(date: NaiveDate, today: NaiveDate) -> Result<Eligibility> {
    let eligibility = classify(date, today);
    if eligibility.is_writable() {
        Ok(eligibility)
    } else {
        Err(Error::EligibilityViolation { date, eligibility })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn classification() {
        let t = today();
        assert_eq!(classify(t, t), Eligibility::Today);
        assert_eq!(classify(t - Duration::days(3), t), Eligibility::CanMakeUp);
        assert_eq!(classify(t - Duration::days(10), t), Eligibility::Expired);
        assert_eq!(classify(t + Duration::days(1), t), Eligibility::Future);
    }

    #[test]
    fn window_edges() {
        let t = today();
        assert_eq!(classify(t - Duration::days(1), t), Eligibility::CanMakeUp);
        assert_eq!(classify(t - Duration::days(7), t), Eligibility::CanMakeUp);
        assert_eq!(classify(t - Duration::days(8), t), Eligibility::Expired);
    }

    #[test]
    fn window_crosses_month_boundary() {
        let t = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let feb = NaiveDate::from_ymd_opt(2026, 2, 24).unwrap();
        assert_eq!(classify(feb, t), Eligibility::CanMakeUp);
    }

    #[test]
    fn only_today_and_makeup_are_writable() {
        let t = today();
        assert!(ensure_writable(t, t).is_ok());
        assert!(ensure_writable(t - Duration::days(2), t).is_ok());
        assert!(matches!(
            ensure_writable(t + Duration::days(1), t),
            Err(Error::EligibilityViolation { eligibility: Eligibility::Future, .. })
        ));
        assert!(matches!(
            ensure_writable(t - Duration::days(30), t),
            Err(Error::EligibilityViolation { eligibility: Eligibility::Expired, .. })
        ));
    }
}
