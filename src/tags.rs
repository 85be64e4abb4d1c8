//! Tag vocabulary of a category: preset tags (hideable), custom tags
//! (deletable) and the hidden subset of presets.

use crate::error::{Error, Result};
use crate::models::Category;

/// Preset tags minus hidden ones, in preset order.
pub fn visible_preset_tags(preset: &[String], hidden: &[String]) -> Vec<String> {
    preset.iter().filter(|t| !hidden.contains(t)).cloned().collect()
}

/// Visible presets followed by custom tags.
pub fn all_available_tags(preset: &[String], custom: &[String], hidden: &[String]) -> Vec<String> {
    let mut tags = visible_preset_tags(preset, hidden);
    tags.extend(custom.iter().cloned());
    tags
}

/// What [`remove_tag`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// Preset tag moved into the hidden set; restorable.
    Hidden,
    /// Custom tag deleted for good.
    Deleted,
    NotFound,
}

impl Category {
    pub fn visible_preset_tags(&self) -> Vec<String> {
        visible_preset_tags(&self.preset_tags, &self.hidden_tags)
    }

    pub fn available_tags(&self) -> Vec<String> {
        all_available_tags(&self.preset_tags, &self.custom_tags, &self.hidden_tags)
    }
}

/// Appends a custom tag. The candidate is trimmed first and compared
/// case-sensitively against every available tag. Returns the stored tag.
pub fn add_custom_tag(category: &mut Category, candidate: &str) -> Result<String> {
    let tag = candidate.trim();
    if tag.is_empty() {
        return Err(Error::InvalidTagName);
    }
    if category.available_tags().iter().any(|t| t == tag) {
        return Err(Error::DuplicateTag(tag.to_string()));
    }
    category.custom_tags.push(tag.to_string());
    Ok(tag.to_string())
}

/// Hides a preset tag or deletes a custom one.
pub fn remove_tag(category: &mut Category, tag: &str) -> Removal {
    if category.preset_tags.iter().any(|t| t == tag) {
        if !category.hidden_tags.iter().any(|t| t == tag) {
            category.hidden_tags.push(tag.to_string());
        }
        Removal::Hidden
    } else if let Some(pos) = category.custom_tags.iter().position(|t| t == tag) {
        category.custom_tags.remove(pos);
        Removal::Deleted
    } else {
        Removal::NotFound
    }
}

/// Un-hides every preset tag.
pub fn restore_preset_tags(category: &mut Category) {
    category.hidden_tags.clear();
}

/// Hides all presets and drops all custom tags.
pub fn clear_all_tags(category: &mut Category) {
    category.hidden_tags = category.preset_tags.clone();
    category.custom_tags.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Measure, MeasureType};

    fn tags(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn category() -> Category {
        Category {
            id: "category_1".into(),
            task_id: Some(1),
            name: "Reading".into(),
            icon: "📚".into(),
            preset_tags: tags(&["Novel", "Tech", "Magazine"]),
            custom_tags: tags(&["Poetry"]),
            hidden_tags: vec![],
            measure_type: MeasureType::Count,
            measure_options: Measure::list(&[10, 20]),
            measure_unit: "pages".into(),
            is_custom: true,
            is_hidden: false,
        }
    }

    fn assert_partition(c: &Category) {
        let visible = c.visible_preset_tags();
        assert!(visible.iter().all(|t| !c.hidden_tags.contains(t)));
        let mut union: Vec<String> = visible.iter().chain(c.hidden_tags.iter()).cloned().collect();
        union.sort();
        let mut preset = c.preset_tags.clone();
        preset.sort();
        assert_eq!(union, preset);
    }

    #[test]
    fn visible_presets_keep_order() {
        let v = visible_preset_tags(&tags(&["a", "b", "c"]), &tags(&["b"]));
        assert_eq!(v, tags(&["a", "c"]));
    }

    #[test]
    fn available_tags_put_custom_last() {
        let v = all_available_tags(&tags(&["a", "b"]), &tags(&["z"]), &tags(&["a"]));
        assert_eq!(v, tags(&["b", "z"]));
    }

    #[test]
    fn add_custom_tag_validates() {
        let mut c = category();
        assert!(matches!(add_custom_tag(&mut c, "   "), Err(Error::InvalidTagName)));
        assert!(matches!(add_custom_tag(&mut c, "Novel"), Err(Error::DuplicateTag(_))));
        assert!(matches!(add_custom_tag(&mut c, " Poetry "), Err(Error::DuplicateTag(_))));
        assert_eq!(c.custom_tags, tags(&["Poetry"]));

        assert_eq!(add_custom_tag(&mut c, " Comics ").unwrap(), "Comics");
        assert_eq!(add_custom_tag(&mut c, "novel").unwrap(), "novel");
        assert_eq!(c.custom_tags, tags(&["Poetry", "Comics", "novel"]));
    }

    #[test]
    fn hidden_preset_can_be_re_added_as_custom() {
        let mut c = category();
        assert_eq!(remove_tag(&mut c, "Tech"), Removal::Hidden);
        assert_eq!(add_custom_tag(&mut c, "Tech").unwrap(), "Tech");
    }

    #[test]
    fn remove_tag_hides_presets_and_deletes_custom() {
        let mut c = category();
        assert_eq!(remove_tag(&mut c, "Tech"), Removal::Hidden);
        assert_eq!(remove_tag(&mut c, "Tech"), Removal::Hidden);
        assert_eq!(c.hidden_tags, tags(&["Tech"]));
        assert_partition(&c);

        assert_eq!(remove_tag(&mut c, "Poetry"), Removal::Deleted);
        assert!(c.custom_tags.is_empty());

        assert_eq!(remove_tag(&mut c, "Missing"), Removal::NotFound);
        assert_eq!(c.available_tags(), tags(&["Novel", "Magazine"]));
    }

    #[test]
    fn restore_and_clear() {
        let mut c = category();
        clear_all_tags(&mut c);
        assert!(c.available_tags().is_empty());
        assert_partition(&c);

        restore_preset_tags(&mut c);
        assert_eq!(c.available_tags(), tags(&["Novel", "Tech", "Magazine"]));
        assert_partition(&c);
    }
}
