//! Encoding of the structured detail carried in a check-in note.
//!
//! Wire format (JSON object, field order as written):
//!
//! ```text
//! {categoryId, categoryName, categoryIcon, items?: [{tag, measure}], totalMeasure?, measureUnit?}
//! ```
//!
//! The three optional fields appear together or not at all. There is no
//! version field, so any future change to this shape must stay compatible
//! with notes already on disk.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Category, CheckinItem, CheckinPayload, Measure, MeasuredDetail};

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireNote {
    category_id: String,
    category_name: String,
    category_icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    items: Option<Vec<CheckinItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    total_measure: Option<Measure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    measure_unit: Option<String>,
}

/// Sum of the item measures.
pub fn calculate_total_measure(items: &[CheckinItem]) -> Measure {
    items.iter().map(|i| i.measure).sum()
}

/// Encodes `items` for `category` into a note string.
///
/// Categories without a measure ignore `items` and record only the
/// category identity.
pub fn encode(category: &Category, items: &[CheckinItem]) -> Result<String> {
    let mut wire = WireNote {
        category_id: category.id.clone(),
        category_name: category.name.clone(),
        category_icon: category.icon.clone(),
        items: None,
        total_measure: None,
        measure_unit: None,
    };
    if category.measure_type.is_measured() {
        wire.items = Some(items.to_vec());
        wire.total_measure = Some(calculate_total_measure(items));
        wire.measure_unit = Some(category.measure_unit.clone());
    }
    Ok(serde_json::to_string(&wire)?)
}

/// Decodes a note. Anything that is not a well-formed payload yields `None`
/// and is treated as a plain completion.
pub fn decode(text: Option<&str>) -> Option<CheckinPayload> {
    let text = text?;
    if text.trim().is_empty() {
        return None;
    }
    let wire: WireNote = serde_json::from_str(text).ok()?;
    let detail = match (wire.items, wire.total_measure, wire.measure_unit) {
        (Some(items), Some(total_measure), Some(measure_unit)) => Some(MeasuredDetail {
            items,
            total_measure,
            measure_unit,
        }),
        (None, None, None) => None,
        _ => return None,
    };
    Some(CheckinPayload {
        category_id: wire.category_id,
        category_name: wire.category_name,
        category_icon: wire.category_icon,
        detail,
    })
}

impl CheckinPayload {
    pub fn items(&self) -> &[CheckinItem] {
        self.detail.as_ref().map(|d| d.items.as_slice()).unwrap_or(&[])
    }

    pub fn total_measure(&self) -> Option<Measure> {
        self.detail.as_ref().map(|d| d.total_measure)
    }

    pub fn measure_unit(&self) -> Option<&str> {
        self.detail.as_ref().map(|d| d.measure_unit.as_str())
    }

    /// One-line human summary, e.g. `🏃 Exercise: Legs 20, Core 10 (30 min)`.
    pub fn summary(&self) -> String {
        let mut s = format!("{} {}", self.category_icon, self.category_name);
        if let Some(detail) = &self.detail {
            let parts: Vec<String> = detail
                .items
                .iter()
                .map(|i| format!("{} {}", i.tag, i.measure))
                .collect();
            if !parts.is_empty() {
                s.push_str(": ");
                s.push_str(&parts.join(", "));
            }
            s.push_str(&format!(" ({} {})", detail.total_measure, detail.measure_unit));
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MeasureType;

    fn category(measure_type: MeasureType) -> Category {
        Category {
            id: "category_7".into(),
            task_id: Some(7),
            name: "Exercise".into(),
            icon: "🏃".into(),
            preset_tags: vec!["Legs".into(), "Shoulders".into()],
            custom_tags: vec![],
            hidden_tags: vec![],
            measure_type,
            measure_options: Measure::list(&[10, 20]),
            measure_unit: if measure_type.is_measured() { "min".into() } else { String::new() },
            is_custom: true,
            is_hidden: false,
        }
    }

    #[test]
    fn measured_note_totals_items() {
        let c = category(MeasureType::Duration);
        let items = vec![CheckinItem::new("Legs", 20), CheckinItem::new("Shoulders", 10)];
        let note = encode(&c, &items).unwrap();
        let payload = decode(Some(&note)).unwrap();
        assert_eq!(payload.total_measure(), Some(Measure(30.0)));
        assert_eq!(payload.measure_unit(), Some("min"));
        assert_eq!(payload.items().len(), 2);
        assert_eq!(payload.category_id, "category_7");
        assert_eq!(payload.category_name, "Exercise");
        assert_eq!(payload.category_icon, "🏃");
    }

    #[test]
    fn wire_format_is_exact() {
        let c = category(MeasureType::Duration);
        let note = encode(&c, &[CheckinItem::new("Legs", 20)]).unwrap();
        assert_eq!(
            note,
            r#"{"categoryId":"category_7","categoryName":"Exercise","categoryIcon":"🏃","items":[{"tag":"Legs","measure":20}],"totalMeasure":20,"measureUnit":"min"}"#
        );
    }

    #[test]
    fn unmeasured_note_drops_items() {
        let c = category(MeasureType::None);
        let note = encode(&c, &[CheckinItem::new("Legs", 20)]).unwrap();
        assert_eq!(
            note,
            r#"{"categoryId":"category_7","categoryName":"Exercise","categoryIcon":"🏃"}"#
        );
        let payload = decode(Some(&note)).unwrap();
        assert!(payload.detail.is_none());
        assert!(payload.items().is_empty());
    }

    #[test]
    fn fractional_measures_survive() {
        let c = category(MeasureType::Count);
        let items = vec![CheckinItem::new("Legs", Measure(1.5)), CheckinItem::new("Legs", 2)];
        let payload = decode(Some(&encode(&c, &items).unwrap())).unwrap();
        assert_eq!(payload.total_measure(), Some(Measure(3.5)));
    }

    #[test]
    fn garbage_decodes_to_none() {
        assert!(decode(None).is_none());
        assert!(decode(Some("")).is_none());
        assert!(decode(Some("   ")).is_none());
        assert!(decode(Some("{not json")).is_none());
        assert!(decode(Some("42")).is_none());
        assert!(decode(Some(r#"{"categoryId":"x"}"#)).is_none());
    }

    #[test]
    fn partial_measured_fields_are_rejected() {
        let partial = r#"{"categoryId":"a","categoryName":"b","categoryIcon":"c","totalMeasure":3}"#;
        assert!(decode(Some(partial)).is_none());
    }

    #[test]
    fn summary_lists_items() {
        let c = category(MeasureType::Duration);
        let items = vec![CheckinItem::new("Legs", 20), CheckinItem::new("Shoulders", 10)];
        let payload = decode(Some(&encode(&c, &items).unwrap())).unwrap();
        assert_eq!(payload.summary(), "🏃 Exercise: Legs 20, Shoulders 10 (30 min)");
    }
}
