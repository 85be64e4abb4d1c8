use std::fmt;
use std::ops::Add;
use std::iter::Sum;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A habit that can be checked in once per day.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    /// Unique identifier for the task.
    pub id: u64,
    /// Display name. Also used to detect the builtin "Exercise" category.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Timestamp when the task was created.
    pub created_at: DateTime<Utc>,
}

/// One recorded completion of a task on a calendar day.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Checkin {
    /// Unique identifier for the check-in.
    pub id: u64,
    /// Task this check-in belongs to.
    pub task_id: u64,
    /// Calendar day, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    /// Wall-clock time of the check-in (`HH:MM`).
    pub time: String,
    /// Encoded payload, see [`crate::note`]. Empty for plain completions.
    #[serde(default)]
    pub note: Option<String>,
    /// Timestamp when the record was written.
    pub created_at: DateTime<Utc>,
}

/// How the quantity attached to a tagged item is measured.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MeasureType {
    #[default]
    Duration,
    Count,
    None,
}

impl MeasureType {
    /// Whether check-ins for this type carry items.
    pub fn is_measured(self) -> bool {
        self != MeasureType::None
    }

    /// Default option list and unit offered when creating a category.
    pub fn default_options(self) -> (Vec<Measure>, &'static str) {
        match self {
            MeasureType::Duration => (Measure::list(&[5, 10, 15, 20, 30]), "min"),
            MeasureType::Count => (Measure::list(&[1, 2, 3, 5, 10]), "times"),
            MeasureType::None => (Vec::new(), ""),
        }
    }
}

impl std::str::FromStr for MeasureType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "duration" => Ok(MeasureType::Duration),
            "count" => Ok(MeasureType::Count),
            "none" => Ok(MeasureType::None),
            other => Err(format!("unknown measure type '{}' (duration, count, none)", other)),
        }
    }
}

impl fmt::Display for MeasureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MeasureType::Duration => "duration",
            MeasureType::Count => "count",
            MeasureType::None => "none",
        };
        f.write_str(s)
    }
}

/// A numeric quantity (minutes, pages, cups...).
///
/// Whole values serialize as JSON integers (`20`, not `20.0`) so notes stay
/// byte-compatible with the other clients writing the same store.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Measure(pub f64);

impl Measure {
    pub fn value(self) -> f64 {
        self.0
    }

    pub fn list(values: &[u32]) -> Vec<Measure> {
        values.iter().map(|v| Measure(f64::from(*v))).collect()
    }

    fn is_whole(self) -> bool {
        self.0.is_finite() && self.0.fract() == 0.0 && self.0.abs() < 9_007_199_254_740_992.0
    }
}

impl From<u32> for Measure {
    fn from(v: u32) -> Self {
        Measure(f64::from(v))
    }
}

impl Add for Measure {
    type Output = Measure;

    fn add(self, rhs: Measure) -> Measure {
        Measure(self.0 + rhs.0)
    }
}

impl Sum for Measure {
    fn sum<I: Iterator<Item = Measure>>(iter: I) -> Measure {
        iter.fold(Measure::default(), |acc, m| acc + m)
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_whole() {
            write!(f, "{}", self.0 as i64)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl Serialize for Measure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_whole() {
            serializer.serialize_i64(self.0 as i64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Measure {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Measure)
    }
}

/// One tagged entry of a structured check-in.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CheckinItem {
    pub tag: String,
    pub measure: Measure,
}

impl CheckinItem {
    pub fn new(tag: impl Into<String>, measure: impl Into<Measure>) -> Self {
        CheckinItem { tag: tag.into(), measure: measure.into() }
    }
}

/// The structured completion schema bound to a task.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    /// Bound task. `None` until the builtin category is matched to a task.
    pub task_id: Option<u64>,
    pub name: String,
    pub icon: String,
    #[serde(default)]
    pub preset_tags: Vec<String>,
    #[serde(default)]
    pub custom_tags: Vec<String>,
    /// Always a subset of `preset_tags`.
    #[serde(default)]
    pub hidden_tags: Vec<String>,
    pub measure_type: MeasureType,
    #[serde(default)]
    pub measure_options: Vec<Measure>,
    #[serde(default)]
    pub measure_unit: String,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default)]
    pub is_hidden: bool,
}

/// What a user supplies when creating a custom category.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDefinition {
    pub name: String,
    pub icon: String,
    #[serde(default)]
    pub preset_tags: Vec<String>,
    pub measure_type: MeasureType,
    #[serde(default)]
    pub measure_options: Vec<Measure>,
    #[serde(default)]
    pub measure_unit: String,
}

/// Decoded form of a check-in note. The wire shape lives in [`crate::note`].
#[derive(Debug, Clone, PartialEq)]
pub struct CheckinPayload {
    pub category_id: String,
    pub category_name: String,
    pub category_icon: String,
    /// Present together with `total_measure` and `measure_unit` when the
    /// category is measured.
    pub detail: Option<MeasuredDetail>,
}

/// The measured part of a [`CheckinPayload`].
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredDetail {
    pub items: Vec<CheckinItem>,
    pub total_measure: Measure,
    pub measure_unit: String,
}
