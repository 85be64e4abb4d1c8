use std::collections::HashSet;

use chrono::{Duration, NaiveDate};

use crate::dates::week_start;
use crate::models::{Checkin, Task};

/// Summary counters shown on the home screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub total_checkins: usize,
    pub total_tasks: usize,
    pub streak_days: u32,
    pub today_checkins: usize,
    pub week_checkins: usize,
    pub recent_checkins: Vec<Checkin>,
}

/// Default number of entries in [`Stats::recent_checkins`].
pub const RECENT_LIMIT: usize = 5;

pub fn compute_stats(tasks: &[Task], checkins: &[Checkin], today: NaiveDate, recent: usize) -> Stats {
    Stats {
        total_checkins: checkins.len(),
        total_tasks: tasks.len(),
        streak_days: streak_days(checkins, today),
        today_checkins: today_checkins(checkins, today),
        week_checkins: week_checkins(checkins, today),
        recent_checkins: recent_checkins(checkins, recent),
    }
}

/// Consecutive days with at least one check-in, counted back from today,
/// or from yesterday when today has nothing yet.
pub fn streak_days(checkins: &[Checkin], today: NaiveDate) -> u32 {
    let days: HashSet<NaiveDate> = checkins.iter().map(|c| c.date).collect();
    let yesterday = today - Duration::days(1);
    let anchor = if days.contains(&today) {
        today
    } else if days.contains(&yesterday) {
        yesterday
    } else {
        return 0;
    };

    let mut streak = 1;
    let mut cursor = anchor - Duration::days(1);
    while days.contains(&cursor) {
        streak += 1;
        cursor = cursor - Duration::days(1);
    }
    streak
}

pub fn today_checkins(checkins: &[Checkin], today: NaiveDate) -> usize {
    checkins.iter().filter(|c| c.date == today).count()
}

/// Check-ins since the most recent Monday (inclusive).
pub fn week_checkins(checkins: &[Checkin], today: NaiveDate) -> usize {
    let monday = week_start(today);
    checkins.iter().filter(|c| c.date >= monday).count()
}

/// The `n` newest check-ins by (date desc, created_at desc).
pub fn recent_checkins(checkins: &[Checkin], n: usize) -> Vec<Checkin> {
    let mut sorted = checkins.to_vec();
    sort_newest_first(&mut sorted);
    sorted.truncate(n);
    sorted
}

pub fn sort_newest_first(checkins: &mut [Checkin]) {
    checkins.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
}

/// Ids of the tasks checked in among `checkins`.
pub fn checked_task_ids(checkins: &[Checkin]) -> HashSet<u64> {
    checkins.iter().map(|c| c.task_id).collect()
}

/// Tasks without a check-in among `checkins`.
pub fn unchecked_tasks<'a>(tasks: &'a [Task], checkins: &[Checkin]) -> Vec<&'a Task> {
    let checked = checked_task_ids(checkins);
    tasks.iter().filter(|t| !checked.contains(&t.id)).collect()
}
