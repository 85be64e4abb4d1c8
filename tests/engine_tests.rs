use checkin::calendar::{month_with_status, DayStatus};
use checkin::dates::Month;
use checkin::error::Error;
use checkin::makeup::{classify, Eligibility};
use checkin::models::{CheckinItem, Measure};
use checkin::note::decode;
use checkin::snapshot::Snapshot;
use checkin::stats::{compute_stats, RECENT_LIMIT};
use checkin::storage::{CheckinFilter, Store};
use checkin::tags::{add_custom_tag, remove_tag};
use chrono::{Duration, NaiveDate};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Validates against a fresh snapshot, then writes, as the commands do.
fn check_in(store: &Store, task_id: u64, date: NaiveDate, today: NaiveDate, items: &[CheckinItem]) -> Result<(), Error> {
    let note = Snapshot::load(store)?.prepare_checkin(task_id, date, today, items)?;
    store.create_checkin(task_id, date, None, note)?;
    Ok(())
}

#[test]
fn week_of_check_ins_drives_calendar_and_stats() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path());
    store.seed_default_tasks().unwrap();
    let today = d(2026, 10, 15);
    let exercise = 1;
    let reading = 2;

    let items = [CheckinItem::new("Core", 20), CheckinItem::new("Shoulders & Back", 10)];
    check_in(&store, exercise, today, today, &items).unwrap();
    check_in(&store, reading, today, today, &[]).unwrap();
    check_in(&store, reading, today - Duration::days(1), today, &[]).unwrap();
    check_in(&store, reading, today - Duration::days(2), today, &[]).unwrap();
    // outside the makeup window
    assert!(matches!(
        check_in(&store, reading, today - Duration::days(10), today, &[]),
        Err(Error::EligibilityViolation { eligibility: Eligibility::Expired, .. })
    ));
    assert!(matches!(check_in(&store, exercise, today, today, &[]), Err(Error::DuplicateCheckin { .. })));

    let snapshot = Snapshot::load(&store).unwrap();
    let stats = compute_stats(&snapshot.tasks, &snapshot.checkins, today, RECENT_LIMIT);
    assert_eq!(stats.streak_days, 3);
    assert_eq!(stats.today_checkins, 2);
    // 2026-10-15 is a Thursday, the week started on the 12th
    assert_eq!(stats.week_checkins, 4);
    assert_eq!(stats.total_tasks, 3);

    let payload = decode(snapshot.checkins_on(today).iter().find(|c| c.task_id == exercise).and_then(|c| c.note.as_deref())).unwrap();
    assert_eq!(payload.total_measure(), Some(Measure(30.0)));
    assert_eq!(payload.items().len(), 2);

    let cells = month_with_status(Month::of(today), today, &snapshot.checkins);
    let status = |day: u32| cells.iter().find_map(|c| match c.cell {
        checkin::calendar::CalendarCell::Day { day: n, .. } if n == day => c.status,
        _ => None,
    });
    assert_eq!(status(15), Some(DayStatus::Done(2)));
    assert_eq!(status(14), Some(DayStatus::Done(1)));
    assert_eq!(status(12), Some(DayStatus::Missed));
    assert_eq!(status(16), Some(DayStatus::Future));

    // a past month has no future days
    let september = month_with_status(Month::new(2026, 9).unwrap(), today, &snapshot.checkins);
    assert!(september.iter().filter_map(|c| c.status).all(|s| s == DayStatus::Missed));
}

#[test]
fn streak_survives_an_empty_today() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path());
    let task = store.create_task("Journal", "").unwrap();
    let today = d(2026, 10, 15);
    for n in [1, 2, 4] {
        store.create_checkin(task.id, today - Duration::days(n), None, None).unwrap();
    }
    let checkins = store.list_checkins(CheckinFilter::All).unwrap();
    assert_eq!(compute_stats(&[task], &checkins, today, 2).streak_days, 2);
    assert_eq!(compute_stats(&[], &checkins, today + Duration::days(2), 2).streak_days, 0);
}

#[test]
fn exactly_one_eligibility_per_day() {
    let today = d(2026, 10, 15);
    let cases = [
        (0, Eligibility::Today),
        (3, Eligibility::CanMakeUp),
        (7, Eligibility::CanMakeUp),
        (8, Eligibility::Expired),
        (10, Eligibility::Expired),
        (-1, Eligibility::Future),
    ];
    for (back, expected) in cases {
        assert_eq!(classify(today - Duration::days(back), today), expected, "{} days back", back);
    }
}

#[test]
fn tag_edits_persist_through_settings() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path());
    store.seed_default_tasks().unwrap();
    let today = d(2026, 10, 15);

    let snapshot = Snapshot::load(&store).unwrap();
    let (_, _, settings) = snapshot
        .with_category(1, |c| {
            add_custom_tag(c, "  Yoga ")?;
            remove_tag(c, "Other");
            Ok(())
        })
        .unwrap();
    store.save_settings(&settings).unwrap();

    let snapshot = Snapshot::load(&store).unwrap();
    let exercise = snapshot.registry().category_for(1).unwrap();
    assert_eq!(exercise.custom_tags, vec!["Yoga".to_string()]);
    assert!(!exercise.available_tags().contains(&"Other".to_string()));
    for tag in exercise.visible_preset_tags() {
        assert!(!exercise.hidden_tags.contains(&tag));
    }

    assert!(snapshot.prepare_checkin(1, today, today, &[CheckinItem::new("Yoga", 15)]).is_ok());
    assert!(snapshot.prepare_checkin(1, today, today, &[CheckinItem::new("Other", 15)]).is_err());
}
