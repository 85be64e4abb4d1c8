//! Binding of tasks to category schemas.
//!
//! One builtin category ("Exercise") is matched to a task by name; every
//! other category is custom and bound to the task it was created with. The
//! binding is resolved once when a [`CategoryRegistry`] is built.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Category, CategoryDefinition, Measure, MeasureType, Task};

pub const BUILTIN_CATEGORY_ID: &str = "exercise_default";
pub const BUILTIN_TASK_NAME: &str = "Exercise";

pub const DEFAULT_EXERCISE_TAGS: [&str; 5] = ["Glutes & Legs", "Shoulders & Back", "Core", "Neck & Shoulders", "Other"];
pub const EXERCISE_DURATIONS: [u32; 6] = [5, 10, 15, 20, 30, 40];

pub const ICON_OPTIONS: [&str; 20] = [
    "📚", "🎵", "✍️", "🎮", "💪", "🧘", "🎯", "💡", "🎨", "🏃",
    "🚴", "🏊", "⚽", "🎸", "📷", "🍎", "💊", "🛏️", "☕", "🧹",
];

/// Persisted category configuration.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CategorySettings {
    /// Custom categories in creation order.
    pub custom_categories: Vec<Category>,
    /// Custom tags of the builtin category.
    pub exercise_custom_tags: Vec<String>,
    /// Hidden preset tags of the builtin category.
    pub exercise_hidden_tags: Vec<String>,
    /// Whether the builtin category is soft-disabled.
    pub exercise_hidden: bool,
}

impl CategorySettings {
    /// Writes a mutated category back into the settings.
    pub fn store(&mut self, category: &Category) {
        if category.is_custom {
            match self.custom_categories.iter_mut().find(|c| c.id == category.id) {
                Some(existing) => *existing = category.clone(),
                None => self.custom_categories.push(category.clone()),
            }
        } else {
            self.exercise_custom_tags = category.custom_tags.clone();
            self.exercise_hidden_tags = category.hidden_tags.clone();
            self.exercise_hidden = category.is_hidden;
        }
    }

    /// Drops the custom category bound to `task_id`, if any.
    pub fn remove_for_task(&mut self, task_id: u64) -> Option<Category> {
        let pos = self.custom_categories.iter().position(|c| c.task_id == Some(task_id))?;
        Some(self.custom_categories.remove(pos))
    }
}

/// The builtin category, optionally bound to a task.
pub fn builtin_category(settings: &CategorySettings, task_id: Option<u64>) -> Category {
    Category {
        id: BUILTIN_CATEGORY_ID.to_string(),
        task_id,
        name: BUILTIN_TASK_NAME.to_string(),
        icon: "🏃".to_string(),
        preset_tags: DEFAULT_EXERCISE_TAGS.iter().map(|s| s.to_string()).collect(),
        custom_tags: settings.exercise_custom_tags.clone(),
        hidden_tags: settings.exercise_hidden_tags.clone(),
        measure_type: MeasureType::Duration,
        measure_options: Measure::list(&EXERCISE_DURATIONS),
        measure_unit: "min".to_string(),
        is_custom: false,
        is_hidden: settings.exercise_hidden,
    }
}

/// Deterministic id of the custom category bound to `task_id`.
pub fn custom_category_id(task_id: u64) -> String {
    format!("category_{}", task_id)
}

/// Ready-made definitions offered when creating a category.
pub fn category_templates() -> Vec<CategoryDefinition> {
    fn template(name: &str, icon: &str, tags: &[&str], measure_type: MeasureType, options: &[u32], unit: &str) -> CategoryDefinition {
        CategoryDefinition {
            name: name.to_string(),
            icon: icon.to_string(),
            preset_tags: tags.iter().map(|s| s.to_string()).collect(),
            measure_type,
            measure_options: Measure::list(options),
            measure_unit: unit.to_string(),
        }
    }

    vec![
        template("Reading", "📚", &["Novel", "Tech book", "Magazine", "News"], MeasureType::Count, &[10, 20, 30, 50, 100], "pages"),
        template("Meditation", "🧘", &["Mindfulness", "Breathing", "Relaxation", "Bedtime"], MeasureType::Duration, &[5, 10, 15, 20, 30], "min"),
        template("Study", "📝", &["Programming", "Language", "Design", "Other"], MeasureType::Duration, &[15, 30, 45, 60, 90], "min"),
        template("Water", "💧", &["Morning", "Forenoon", "Afternoon", "Evening"], MeasureType::Count, &[1, 2, 3, 4, 5], "cups"),
        template("Early rise", "🌅", &[], MeasureType::None, &[], ""),
    ]
}

/// Looks up a template by case-insensitive name.
pub fn find_template(name: &str) -> Option<CategoryDefinition> {
    let name = name.trim().to_lowercase();
    category_templates().into_iter().find(|t| t.name.to_lowercase() == name)
}

/// Builds a custom category for `task_id`.
///
/// The name is trimmed; it must be non-empty and unused by the builtin
/// category, any custom category and any task.
pub fn create_category(task_id: u64, definition: &CategoryDefinition, existing_names: &BTreeSet<String>) -> Result<Category> {
    let name = validate_category_name(&definition.name, existing_names)?;
    let measured = definition.measure_type.is_measured();
    Ok(Category {
        id: custom_category_id(task_id),
        task_id: Some(task_id),
        name,
        icon: definition.icon.clone(),
        preset_tags: definition.preset_tags.clone(),
        custom_tags: Vec::new(),
        hidden_tags: Vec::new(),
        measure_type: definition.measure_type,
        measure_options: if measured { definition.measure_options.clone() } else { Vec::new() },
        measure_unit: if measured { definition.measure_unit.clone() } else { String::new() },
        is_custom: true,
        is_hidden: false,
    })
}

/// Trims `name` and checks it against the names already in use.
pub fn validate_category_name(name: &str, existing_names: &BTreeSet<String>) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidCategoryName);
    }
    if existing_names.contains(name) {
        return Err(Error::DuplicateCategoryName(name.to_string()));
    }
    Ok(name.to_string())
}

/// Names a new category may not take.
pub fn existing_category_names(tasks: &[Task], custom_categories: &[Category]) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    names.insert(BUILTIN_TASK_NAME.to_string());
    names.extend(custom_categories.iter().map(|c| c.name.clone()));
    names.extend(tasks.iter().map(|t| t.name.clone()));
    names
}

/// Category for a single task, without building a registry.
pub fn resolve_category_for_task(task: &Task, settings: &CategorySettings) -> Option<Category> {
    match bind(task, &settings.custom_categories) {
        BoundCategory::Builtin => Some(builtin_category(settings, Some(task.id))),
        BoundCategory::Custom(id) => settings.custom_categories.iter().find(|c| c.id == id).cloned(),
        BoundCategory::None => None,
    }
}

/// How a task is bound to a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundCategory {
    Builtin,
    Custom(String),
    /// Plain completion only.
    None,
}

static UNBOUND: BoundCategory = BoundCategory::None;

fn bind(task: &Task, custom_categories: &[Category]) -> BoundCategory {
    if task.name == BUILTIN_TASK_NAME {
        return BoundCategory::Builtin;
    }
    custom_categories
        .iter()
        .find(|c| c.task_id == Some(task.id))
        .map(|c| BoundCategory::Custom(c.id.clone()))
        .unwrap_or(BoundCategory::None)
}

/// Task-to-category bindings for one snapshot.
#[derive(Debug, Clone)]
pub struct CategoryRegistry<'a> {
    tasks: &'a [Task],
    settings: &'a CategorySettings,
    bindings: BTreeMap<u64, BoundCategory>,
}

impl<'a> CategoryRegistry<'a> {
    pub fn new(tasks: &'a [Task], settings: &'a CategorySettings) -> Self {
        let bindings = tasks
            .iter()
            .map(|t| (t.id, bind(t, &settings.custom_categories)))
            .collect();
        CategoryRegistry { tasks, settings, bindings }
    }

    pub fn binding(&self, task_id: u64) -> &BoundCategory {
        self.bindings.get(&task_id).unwrap_or(&UNBOUND)
    }

    /// The category bound to a task, if any.
    pub fn category_for(&self, task_id: u64) -> Option<Category> {
        match self.binding(task_id) {
            BoundCategory::Builtin => Some(builtin_category(self.settings, Some(task_id))),
            BoundCategory::Custom(id) => self.settings.custom_categories.iter().find(|c| &c.id == id).cloned(),
            BoundCategory::None => None,
        }
    }

    /// Builtin category (when a task matches and it is not hidden)
    /// followed by every custom category.
    pub fn all_categories(&self) -> Vec<Category> {
        let mut categories = Vec::new();
        let builtin_task = self
            .tasks
            .iter()
            .find(|t| self.binding(t.id) == &BoundCategory::Builtin);
        if let Some(task) = builtin_task {
            if !self.settings.exercise_hidden {
                categories.push(builtin_category(self.settings, Some(task.id)));
            }
        }
        categories.extend(self.settings.custom_categories.iter().cloned());
        categories
    }

    pub fn existing_names(&self) -> BTreeSet<String> {
        existing_category_names(self.tasks, &self.settings.custom_categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn task(id: u64, name: &str) -> Task {
        Task { id, name: name.into(), description: String::new(), created_at: Utc::now() }
    }

    fn reading(existing: &BTreeSet<String>, task_id: u64) -> Category {
        create_category(task_id, &find_template("reading").unwrap(), existing).unwrap()
    }

    #[test]
    fn builtin_is_matched_by_task_name() {
        let tasks = vec![task(1, "Exercise"), task(2, "Journal")];
        let settings = CategorySettings::default();
        let registry = CategoryRegistry::new(&tasks, &settings);
        assert_eq!(registry.binding(1), &BoundCategory::Builtin);
        assert_eq!(registry.binding(2), &BoundCategory::None);
        assert_eq!(registry.binding(99), &BoundCategory::None);

        let c = registry.category_for(1).unwrap();
        assert_eq!(c.id, BUILTIN_CATEGORY_ID);
        assert_eq!(c.task_id, Some(1));
        assert!(!c.is_custom);
        assert_eq!(c.preset_tags[1], "Shoulders & Back");
        assert!(registry.category_for(2).is_none());
    }

    #[test]
    fn custom_category_is_bound_by_task_id() {
        let tasks = vec![task(3, "Reading")];
        let mut settings = CategorySettings::default();
        let c = reading(&BTreeSet::new(), 3);
        assert_eq!(c.id, "category_3");
        settings.store(&c);

        let registry = CategoryRegistry::new(&tasks, &settings);
        assert_eq!(registry.binding(3), &BoundCategory::Custom("category_3".into()));
        assert_eq!(registry.category_for(3).unwrap(), c);
        assert_eq!(resolve_category_for_task(&tasks[0], &settings), Some(c));
    }

    #[test]
    fn all_categories_skips_hidden_builtin() {
        let tasks = vec![task(1, "Exercise"), task(3, "Reading")];
        let mut settings = CategorySettings::default();
        settings.store(&reading(&BTreeSet::new(), 3));

        let ids: Vec<String> = CategoryRegistry::new(&tasks, &settings).all_categories().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["exercise_default", "category_3"]);

        settings.exercise_hidden = true;
        let ids: Vec<String> = CategoryRegistry::new(&tasks, &settings).all_categories().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["category_3"]);
    }

    #[test]
    fn no_builtin_without_matching_task() {
        let tasks = vec![task(2, "Journal")];
        let settings = CategorySettings::default();
        assert!(CategoryRegistry::new(&tasks, &settings).all_categories().is_empty());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let tasks = vec![task(2, "Journal")];
        let mut settings = CategorySettings::default();
        settings.store(&reading(&BTreeSet::new(), 3));
        let names = existing_category_names(&tasks, &settings.custom_categories);

        let mut def = find_template("meditation").unwrap();
        for taken in ["Exercise", "Reading", "Journal", "  Journal "] {
            def.name = taken.to_string();
            assert!(matches!(create_category(5, &def, &names), Err(Error::DuplicateCategoryName(_))));
        }
        def.name = "  ".into();
        assert!(matches!(create_category(5, &def, &names), Err(Error::InvalidCategoryName)));
        def.name = "reading".into();
        assert!(create_category(5, &def, &names).is_ok());
    }

    #[test]
    fn unmeasured_category_has_no_options() {
        let mut def = find_template("early rise").unwrap();
        def.measure_options = Measure::list(&[1]);
        def.measure_unit = "x".into();
        let c = create_category(8, &def, &BTreeSet::new()).unwrap();
        assert!(c.measure_options.is_empty());
        assert!(c.measure_unit.is_empty());
        assert!(c.custom_tags.is_empty() && c.hidden_tags.is_empty());
        assert!(c.is_custom);
    }

    #[test]
    fn builtin_tags_round_trip_through_settings() {
        let mut settings = CategorySettings::default();
        let mut c = builtin_category(&settings, Some(1));
        c.custom_tags.push("Yoga".into());
        c.hidden_tags.push("Core".into());
        settings.store(&c);
        assert_eq!(settings.exercise_custom_tags, vec!["Yoga".to_string()]);
        assert_eq!(builtin_category(&settings, Some(1)).hidden_tags, vec!["Core".to_string()]);
        assert!(settings.custom_categories.is_empty());
    }

    #[test]
    fn remove_for_task_drops_binding() {
        let mut settings = CategorySettings::default();
        settings.store(&reading(&BTreeSet::new(), 3));
        assert!(settings.remove_for_task(4).is_none());
        assert_eq!(settings.remove_for_task(3).unwrap().id, "category_3");
        assert!(settings.custom_categories.is_empty());
    }
}
