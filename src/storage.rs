use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::categories::CategorySettings;
use crate::dates::{current_time, Month};
use crate::error::{Error, Result};
use crate::models::{Checkin, Task};
use crate::stats::sort_newest_first;

/// Keys of the settings file.
pub mod keys {
    pub const CUSTOM_CATEGORIES: &str = "checkin_custom_categories";
    pub const CUSTOM_EXERCISE_TYPES: &str = "checkin_custom_exercise_types";
    pub const HIDDEN_PRESET_TYPES: &str = "checkin_hidden_preset_types";
    pub const EXERCISE_CATEGORY_HIDDEN: &str = "checkin_exercise_category_hidden";
}

/// Starter tasks written by `init`.
pub const DEFAULT_TASKS: [(&str, &str); 3] = [
    ("Exercise", "Pick an exercise type and log the duration"),
    ("Read 30 minutes", "Read a book for thirty minutes every day"),
    ("Morning meditation", "Meditate for ten minutes every morning"),
];

/// Returns the data directory.
///
/// The directory is determined in the following order:
/// 1. `CHECKIN_DATA_DIR` environment variable.
/// 2. `~/.local/share/checkin` (on Linux).
/// 3. `.` (fallback).
pub fn data_dir() -> PathBuf {
    std::env::var("CHECKIN_DATA_DIR").map(PathBuf::from).unwrap_or_else(|_| {
        let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("checkin");
        p
    })
}

/// Which check-ins [`Store::list_checkins`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckinFilter {
    All,
    Date(NaiveDate),
    Month(Month),
}

impl CheckinFilter {
    fn matches(self, checkin: &Checkin) -> bool {
        match self {
            CheckinFilter::All => true,
            CheckinFilter::Date(d) => checkin.date == d,
            CheckinFilter::Month(m) => m.contains(checkin.date),
        }
    }
}

/// JSON-file store for tasks, check-ins and settings.
///
/// Files in the data directory:
/// - `tasks.json`
/// - `checkins.json`
/// - `settings.json` (object of fixed keys to JSON values)
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn open(dir: impl Into<PathBuf>) -> Store {
        Store { dir: dir.into() }
    }

    pub fn open_default() -> Store {
        Store::open(data_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn tasks_path(&self) -> PathBuf {
        self.dir.join("tasks.json")
    }

    fn checkins_path(&self) -> PathBuf {
        self.dir.join("checkins.json")
    }

    fn settings_path(&self) -> PathBuf {
        self.dir.join("settings.json")
    }

    /// Loads all tasks, oldest first.
    pub fn list_tasks(&self) -> Result<Vec<Task>> {
        load_json(&self.tasks_path())
    }

    pub fn find_task(&self, id: u64) -> Result<Task> {
        self.list_tasks()?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or(Error::UnknownTask(id))
    }

    /// Creates a task. The name is trimmed and must not be empty.
    pub fn create_task(&self, name: &str, description: &str) -> Result<Task> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidArgument("task name must not be empty".into()));
        }
        let mut tasks = self.list_tasks()?;
        let next_id = tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        let task = Task {
            id: next_id,
            name: name.to_string(),
            description: description.to_string(),
            created_at: Utc::now(),
        };
        tasks.push(task.clone());
        save_json(&self.tasks_path(), &tasks)?;
        info!(task_id = task.id, name = %task.name, "created task");
        Ok(task)
    }

    /// Changes a task's name and/or description. The name is trimmed and
    /// must not be empty.
    pub fn update_task(&self, id: u64, name: Option<&str>, description: Option<&str>) -> Result<Task> {
        let mut tasks = self.list_tasks()?;
        let task = tasks.iter_mut().find(|t| t.id == id).ok_or(Error::UnknownTask(id))?;
        if let Some(name) = name {
            let name = name.trim();
            if name.is_empty() {
                return Err(Error::InvalidArgument("task name must not be empty".into()));
            }
            task.name = name.to_string();
        }
        if let Some(description) = description {
            task.description = description.to_string();
        }
        let task = task.clone();
        save_json(&self.tasks_path(), &tasks)?;
        info!(task_id = id, name = %task.name, "updated task");
        Ok(task)
    }

    /// Deletes a task together with its check-ins.
    pub fn delete_task(&self, id: u64) -> Result<Task> {
        let mut tasks = self.list_tasks()?;
        let pos = tasks.iter().position(|t| t.id == id).ok_or(Error::UnknownTask(id))?;
        let task = tasks.remove(pos);

        let mut checkins = self.list_checkins(CheckinFilter::All)?;
        let before = checkins.len();
        checkins.retain(|c| c.task_id != id);
        if checkins.len() != before {
            save_json(&self.checkins_path(), &checkins)?;
        }
        save_json(&self.tasks_path(), &tasks)?;
        info!(task_id = id, removed_checkins = before - checkins.len(), "deleted task");
        Ok(task)
    }

    /// Inserts the starter tasks when there are none. Returns how many were added.
    pub fn seed_default_tasks(&self) -> Result<usize> {
        if !self.list_tasks()?.is_empty() {
            return Ok(0);
        }
        for (name, description) in DEFAULT_TASKS {
            self.create_task(name, description)?;
        }
        Ok(DEFAULT_TASKS.len())
    }

    /// Check-ins matching `filter`, newest first.
    pub fn list_checkins(&self, filter: CheckinFilter) -> Result<Vec<Checkin>> {
        let mut checkins: Vec<Checkin> = load_json(&self.checkins_path())?;
        checkins.retain(|c| filter.matches(c));
        sort_newest_first(&mut checkins);
        Ok(checkins)
    }

    /// Records a check-in. At most one check-in exists per task and day.
    pub fn create_checkin(&self, task_id: u64, date: NaiveDate, time: Option<String>, note: Option<String>) -> Result<Checkin> {
        if !self.list_tasks()?.iter().any(|t| t.id == task_id) {
            return Err(Error::UnknownTask(task_id));
        }
        let mut checkins: Vec<Checkin> = load_json(&self.checkins_path())?;
        if checkins.iter().any(|c| c.task_id == task_id && c.date == date) {
            warn!(task_id, %date, "rejected duplicate check-in");
            return Err(Error::DuplicateCheckin { task_id, date });
        }
        let next_id = checkins.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        let checkin = Checkin {
            id: next_id,
            task_id,
            date,
            time: time.unwrap_or_else(current_time),
            note: note.filter(|n| !n.is_empty()),
            created_at: Utc::now(),
        };
        checkins.push(checkin.clone());
        save_json(&self.checkins_path(), &checkins)?;
        info!(checkin_id = checkin.id, task_id, %date, "recorded check-in");
        Ok(checkin)
    }

    pub fn delete_checkin(&self, id: u64) -> Result<Checkin> {
        let mut checkins: Vec<Checkin> = load_json(&self.checkins_path())?;
        let pos = checkins.iter().position(|c| c.id == id).ok_or(Error::CheckinNotFound(id))?;
        let removed = checkins.remove(pos);
        save_json(&self.checkins_path(), &checkins)?;
        info!(checkin_id = id, "deleted check-in");
        Ok(removed)
    }

    /// Reads the category configuration. Missing keys take their defaults;
    /// a key holding a malformed value is ignored with a warning.
    pub fn load_settings(&self) -> Result<CategorySettings> {
        let map: Map<String, Value> = load_json_or_default(&self.settings_path())?;
        Ok(CategorySettings {
            custom_categories: setting(&map, keys::CUSTOM_CATEGORIES),
            exercise_custom_tags: setting(&map, keys::CUSTOM_EXERCISE_TYPES),
            exercise_hidden_tags: setting(&map, keys::HIDDEN_PRESET_TYPES),
            exercise_hidden: setting(&map, keys::EXERCISE_CATEGORY_HIDDEN),
        })
    }

    /// Writes the category configuration, keeping unrelated keys.
    pub fn save_settings(&self, settings: &CategorySettings) -> Result<()> {
        let mut map: Map<String, Value> = load_json_or_default(&self.settings_path())?;
        map.insert(keys::CUSTOM_CATEGORIES.into(), serde_json::to_value(&settings.custom_categories)?);
        map.insert(keys::CUSTOM_EXERCISE_TYPES.into(), serde_json::to_value(&settings.exercise_custom_tags)?);
        map.insert(keys::HIDDEN_PRESET_TYPES.into(), serde_json::to_value(&settings.exercise_hidden_tags)?);
        map.insert(keys::EXERCISE_CATEGORY_HIDDEN.into(), Value::Bool(settings.exercise_hidden));
        save_json(&self.settings_path(), &map)
    }

    /// Deletes every data file.
    pub fn reset(&self) -> Result<()> {
        for path in [self.tasks_path(), self.checkins_path(), self.settings_path()] {
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }
        info!(dir = %self.dir.display(), "reset data directory");
        Ok(())
    }
}

fn setting<T: DeserializeOwned + Default>(map: &Map<String, Value>, key: &str) -> T {
    match map.get(key) {
        None | Some(Value::Null) => T::default(),
        Some(v) => serde_json::from_value(v.clone()).unwrap_or_else(|e| {
            warn!(key, error = %e, "ignoring malformed setting");
            T::default()
        }),
    }
}

/// Loads a JSON array file. A missing or empty file is an empty list.
fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    load_json_or_default(path)
}

fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    let mut f = OpenOptions::new().read(true).open(path)?;
    let mut s = String::new();
    f.read_to_string(&mut s)?;
    if s.trim().is_empty() {
        return Ok(T::default());
    }
    debug!(path = %path.display(), bytes = s.len(), "loaded");
    Ok(serde_json::from_str(&s)?)
}

/// Overwrites `path` with pretty-printed JSON, creating the directory first.
fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    let s = serde_json::to_string_pretty(value)?;
    let mut f = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    f.write_all(s.as_bytes())?;
    debug!(path = %path.display(), bytes = s.len(), "saved");
    Ok(())
}
