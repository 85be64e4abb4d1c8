//! Everything a command needs, loaded once and passed around explicitly.

use chrono::NaiveDate;
use tracing::debug;

use crate::categories::{validate_category_name, BoundCategory, CategoryRegistry, CategorySettings};
use crate::error::{Error, Result};
use crate::makeup::ensure_writable;
use crate::models::{Category, Checkin, CheckinItem, Task};
use crate::note;
use crate::storage::{CheckinFilter, Store};

#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub tasks: Vec<Task>,
    /// Newest first.
    pub checkins: Vec<Checkin>,
    pub settings: CategorySettings,
}

impl Snapshot {
    pub fn load(store: &Store) -> Result<Snapshot> {
        let snapshot = Snapshot {
            tasks: store.list_tasks()?,
            checkins: store.list_checkins(CheckinFilter::All)?,
            settings: store.load_settings()?,
        };
        debug!(
            tasks = snapshot.tasks.len(),
            checkins = snapshot.checkins.len(),
            categories = snapshot.settings.custom_categories.len(),
            "loaded snapshot"
        );
        Ok(snapshot)
    }

    pub fn registry(&self) -> CategoryRegistry<'_> {
        CategoryRegistry::new(&self.tasks, &self.settings)
    }

    pub fn task(&self, id: u64) -> Result<&Task> {
        self.tasks.iter().find(|t| t.id == id).ok_or(Error::UnknownTask(id))
    }

    pub fn checkins_on(&self, date: NaiveDate) -> Vec<Checkin> {
        self.checkins.iter().filter(|c| c.date == date).cloned().collect()
    }

    pub fn has_checkin(&self, task_id: u64, date: NaiveDate) -> bool {
        self.checkins.iter().any(|c| c.task_id == task_id && c.date == date)
    }

    /// Validates a check-in and builds its note.
    ///
    /// Checks the task, the backfill window and (optimistically) the
    /// one-per-day rule; the store re-checks the latter when writing.
    /// Returns `None` for tasks without a category and for measured
    /// categories checked in without items, which record a plain completion.
    pub fn prepare_checkin(&self, task_id: u64, date: NaiveDate, today: NaiveDate, items: &[CheckinItem]) -> Result<Option<String>> {
        self.task(task_id)?;
        ensure_writable(date, today)?;
        if self.has_checkin(task_id, date) {
            return Err(Error::DuplicateCheckin { task_id, date });
        }

        let Some(category) = self.registry().category_for(task_id) else {
            if !items.is_empty() {
                return Err(Error::InvalidArgument(format!("task {} has no category, items are not allowed", task_id)));
            }
            return Ok(None);
        };
        if category.measure_type.is_measured() && items.is_empty() {
            return Ok(None);
        }
        validate_items(&category, items)?;
        note::encode(&category, items).map(Some)
    }

    /// Checks a new name for task `task_id` and returns it trimmed.
    ///
    /// Task names drive category binding, so a rename may not take the
    /// builtin name or any other task or category name, and the builtin
    /// task keeps its name.
    pub fn check_rename(&self, task_id: u64, name: &str) -> Result<String> {
        let task = self.task(task_id)?;
        let name = name.trim();
        if name == task.name {
            return Ok(name.to_string());
        }
        let registry = self.registry();
        let mut names = registry.existing_names();
        match registry.binding(task_id) {
            BoundCategory::Builtin => {
                return Err(Error::InvalidArgument(format!("task \"{}\" cannot be renamed", task.name)));
            }
            BoundCategory::Custom(_) => {
                if let Some(own) = registry.category_for(task_id) {
                    names.remove(&own.name);
                }
            }
            BoundCategory::None => {}
        }
        names.remove(&task.name);
        validate_category_name(name, &names)
    }

    /// Applies `f` to a copy of the category bound to `task_id`.
    ///
    /// On success returns `f`'s result and the updated settings; on failure
    /// nothing is changed.
    pub fn with_category<T, F>(&self, task_id: u64, f: F) -> Result<(T, Category, CategorySettings)>
    where
        F: FnOnce(&mut Category) -> Result<T>,
    {
        self.task(task_id)?;
        let mut category = self
            .registry()
            .category_for(task_id)
            .ok_or(Error::UnknownCategory(task_id))?;
        let out = f(&mut category)?;
        let mut settings = self.settings.clone();
        settings.store(&category);
        Ok((out, category, settings))
    }
}

fn validate_items(category: &Category, items: &[CheckinItem]) -> Result<()> {
    if !category.measure_type.is_measured() {
        if items.is_empty() {
            return Ok(());
        }
        return Err(Error::InvalidArgument(format!("category \"{}\" does not record items", category.name)));
    }
    let available = category.available_tags();
    for item in items {
        if !available.contains(&item.tag) {
            return Err(Error::InvalidArgument(format!(
                "unknown tag \"{}\" for \"{}\" (available: {})",
                item.tag,
                category.name,
                available.join(", ")
            )));
        }
        let m = item.measure.value();
        if !m.is_finite() || m <= 0.0 {
            return Err(Error::InvalidArgument(format!("measure for \"{}\" must be positive", item.tag)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::custom_category_id;
    use crate::makeup::Eligibility;
    use crate::models::{Measure, MeasureType};
    use crate::tags::add_custom_tag;
    use chrono::{Duration, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn snapshot() -> Snapshot {
        let task = |id, name: &str| Task { id, name: name.into(), description: String::new(), created_at: Utc::now() };
        let mut settings = CategorySettings::default();
        settings.store(&Category {
            id: custom_category_id(2),
            task_id: Some(2),
            name: "Gym".into(),
            icon: "💪".into(),
            preset_tags: vec!["Legs".into(), "Shoulders".into()],
            custom_tags: vec![],
            hidden_tags: vec![],
            measure_type: MeasureType::Duration,
            measure_options: Measure::list(&[10, 20]),
            measure_unit: "min".into(),
            is_custom: true,
            is_hidden: false,
        });
        Snapshot {
            tasks: vec![task(1, "Exercise"), task(2, "Gym"), task(3, "Journal")],
            checkins: vec![Checkin {
                id: 1,
                task_id: 3,
                date: today(),
                time: "08:00".into(),
                note: None,
                created_at: Utc::now(),
            }],
            settings,
        }
    }

    #[test]
    fn prepares_measured_note() {
        let s = snapshot();
        let items = vec![CheckinItem::new("Legs", 20), CheckinItem::new("Shoulders", 10)];
        let text = s.prepare_checkin(2, today(), today(), &items).unwrap().unwrap();
        let payload = note::decode(Some(&text)).unwrap();
        assert_eq!(payload.total_measure(), Some(Measure(30.0)));
        assert_eq!(payload.category_id, "category_2");
    }

    #[test]
    fn measured_category_without_items_is_a_plain_completion() {
        let s = snapshot();
        assert_eq!(s.prepare_checkin(2, today(), today(), &[]).unwrap(), None);
        assert_eq!(s.prepare_checkin(1, today(), today(), &[]).unwrap(), None);
    }

    #[test]
    fn plain_task_has_no_note() {
        let s = snapshot();
        let yesterday = today() - Duration::days(1);
        assert_eq!(s.prepare_checkin(3, yesterday, today(), &[]).unwrap(), None);
        assert!(s.prepare_checkin(3, yesterday, today(), &[CheckinItem::new("x", 1)]).is_err());
    }

    #[test]
    fn rejections() {
        let s = snapshot();
        assert!(matches!(s.prepare_checkin(9, today(), today(), &[]), Err(Error::UnknownTask(9))));
        assert!(matches!(s.prepare_checkin(3, today(), today(), &[]), Err(Error::DuplicateCheckin { .. })));
        assert!(matches!(
            s.prepare_checkin(2, today() - Duration::days(8), today(), &[]),
            Err(Error::EligibilityViolation { eligibility: Eligibility::Expired, .. })
        ));
        assert!(matches!(
            s.prepare_checkin(2, today(), today(), &[CheckinItem::new("Arms", 5)]),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            s.prepare_checkin(2, today(), today(), &[CheckinItem::new("Legs", 0)]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn renames_keep_bindings_stable() {
        let s = snapshot();
        assert_eq!(s.check_rename(3, "  Diary ").unwrap(), "Diary");
        assert_eq!(s.check_rename(3, "Journal").unwrap(), "Journal");
        assert!(matches!(s.check_rename(3, "Exercise"), Err(Error::DuplicateCategoryName(_))));
        assert!(matches!(s.check_rename(3, "Gym"), Err(Error::DuplicateCategoryName(_))));
        assert!(matches!(s.check_rename(3, ""), Err(Error::InvalidCategoryName)));
        assert!(matches!(s.check_rename(1, "Workout"), Err(Error::InvalidArgument(_))));
        assert!(matches!(s.check_rename(9, "x"), Err(Error::UnknownTask(9))));
        // a task may share its own category's name
        let mut renamed = s.clone();
        renamed.tasks[1].name = "Fitness".into();
        assert_eq!(renamed.check_rename(2, "Gym").unwrap(), "Gym");
        assert!(matches!(renamed.check_rename(3, "Gym"), Err(Error::DuplicateCategoryName(_))));
    }

    #[test]
    fn with_category_leaves_snapshot_untouched_on_error() {
        let s = snapshot();
        let err = s.with_category(2, |c| add_custom_tag(c, "Legs")).unwrap_err();
        assert!(matches!(err, Error::DuplicateTag(_)));
        assert!(s.settings.custom_categories[0].custom_tags.is_empty());

        let (tag, category, settings) = s.with_category(2, |c| add_custom_tag(c, "Arms")).unwrap();
        assert_eq!(tag, "Arms");
        assert_eq!(category.custom_tags, vec!["Arms".to_string()]);
        assert_eq!(settings.custom_categories[0].custom_tags, vec!["Arms".to_string()]);

        let (_, _, settings) = s.with_category(1, |c| add_custom_tag(c, "Yoga")).unwrap();
        assert_eq!(settings.exercise_custom_tags, vec!["Yoga".to_string()]);

        assert!(matches!(s.with_category(3, |_| Ok(())), Err(Error::UnknownCategory(3))));
    }
}
