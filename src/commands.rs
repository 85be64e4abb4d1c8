use std::io::{self, Write};

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use tracing::info;

use crate::calendar::{month_summary, month_with_status, CalendarCell, DayStatus};
use crate::categories::{
    category_templates, create_category, find_template, validate_category_name, BoundCategory, ICON_OPTIONS,
};
use crate::dates::{day_key, parse_day, today, weekday_label, Month, WEEK_DAYS};
use crate::error::{Error, Result};
use crate::makeup::classify;
use crate::models::{Category, CategoryDefinition, Checkin, CheckinItem, Measure, MeasureType};
use crate::note::decode;
use crate::snapshot::Snapshot;
use crate::stats::{compute_stats, unchecked_tasks};
use crate::storage::{CheckinFilter, Store};
use crate::tags::{add_custom_tag, clear_all_tags, remove_tag, restore_preset_tags, Removal};

fn bold(s: &str) -> Cell {
    Cell::new(s).add_attribute(Attribute::Bold)
}

/// Parses `TAG=MEASURE`, e.g. `Legs=20`.
pub fn parse_item(s: &str) -> Result<CheckinItem> {
    let (tag, measure) = s
        .rsplit_once('=')
        .ok_or_else(|| Error::InvalidArgument(format!("invalid item '{}', use TAG=MEASURE", s)))?;
    let measure: f64 = measure
        .trim()
        .parse()
        .map_err(|_| Error::InvalidArgument(format!("invalid measure in '{}'", s)))?;
    Ok(CheckinItem::new(tag.trim(), Measure(measure)))
}

/// Parses a comma separated list of measures, e.g. `5,10,15`.
pub fn parse_measures(s: &str) -> Result<Vec<Measure>> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| match p.parse::<f64>() {
            Ok(v) if v.is_finite() && v > 0.0 => Ok(Measure(v)),
            _ => Err(Error::InvalidArgument(format!("invalid measure option '{}'", p))),
        })
        .collect()
}

fn split_tags(s: &str) -> Vec<String> {
    s.split(',').map(str::trim).filter(|t| !t.is_empty()).map(String::from).collect()
}

/// Writes the starter tasks into an empty store.
pub fn cmd_init(silent: bool) -> Result<()> {
    let store = Store::open_default();
    let added = store.seed_default_tasks()?;
    if !silent {
        if added == 0 {
            println!("Tasks already exist, nothing to do.");
        } else {
            println!("Added {} starter tasks in {}", added, store.dir().display());
        }
    }
    Ok(())
}

/// Adds a plain task without a category.
pub fn cmd_task_add(name: String, description: Option<String>, silent: bool) -> Result<()> {
    let store = Store::open_default();
    let task = store.create_task(&name, description.as_deref().unwrap_or_default())?;
    if !silent {
        println!("Task added (id = {})", task.id);
    }
    Ok(())
}

/// Lists tasks with today's status.
pub fn cmd_task_list() -> Result<()> {
    let snapshot = Snapshot::load(&Store::open_default())?;
    if snapshot.tasks.is_empty() {
        println!("No tasks found. Run `checkin init` to add starter tasks.");
        return Ok(());
    }
    let today = today();
    let registry = snapshot.registry();
    let todays = snapshot.checkins_on(today);
    let pending: Vec<u64> = unchecked_tasks(&snapshot.tasks, &todays).iter().map(|t| t.id).collect();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![bold("ID"), bold("Name"), bold("Category"), bold("Description"), bold("Today")]);

    for t in &snapshot.tasks {
        let category = match registry.binding(t.id) {
            BoundCategory::None => "-".to_string(),
            _ => registry
                .category_for(t.id)
                .map(|c| format!("{} {}{}", c.icon, c.name, if c.is_hidden { " (hidden)" } else { "" }))
                .unwrap_or_default(),
        };
        let done = !pending.contains(&t.id);
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(&t.name),
            Cell::new(category),
            Cell::new(&t.description),
            Cell::new(if done { "Done" } else { "Pending" }).fg(if done { Color::Green } else { Color::Yellow }),
        ]);
    }
    println!("{table}");
    Ok(())
}

/// Renames a task and/or changes its description.
pub fn cmd_task_edit(id: u64, name: Option<String>, description: Option<String>, silent: bool) -> Result<()> {
    if name.is_none() && description.is_none() {
        return Err(Error::InvalidArgument("nothing to change, pass --name or --description".into()));
    }
    let store = Store::open_default();
    let snapshot = Snapshot::load(&store)?;
    let name = name.map(|n| snapshot.check_rename(id, &n)).transpose()?;
    let task = store.update_task(id, name.as_deref(), description.as_deref())?;
    if !silent {
        println!("Task {} updated: {}", task.id, task.name);
    }
    Ok(())
}

/// Removes a task, its check-ins and its custom category.
pub fn cmd_task_remove(id: u64, silent: bool) -> Result<()> {
    let store = Store::open_default();
    let mut settings = store.load_settings()?;
    store.delete_task(id)?;
    if let Some(category) = settings.remove_for_task(id) {
        store.save_settings(&settings)?;
        info!(category_id = %category.id, "removed category with its task");
    }
    if !silent {
        println!("Task {} removed.", id);
    }
    Ok(())
}

/// Checks a task in for today or a day within the backfill window.
pub fn cmd_checkin(task_id: u64, date: Option<String>, items: Vec<String>, time: Option<String>, silent: bool) -> Result<()> {
    let store = Store::open_default();
    let snapshot = Snapshot::load(&store)?;
    let today = today();
    let date = match date {
        Some(d) => parse_day(&d)?,
        None => today,
    };
    let items = items.iter().map(|s| parse_item(s)).collect::<Result<Vec<_>>>()?;

    let note = snapshot.prepare_checkin(task_id, date, today, &items)?;
    let checkin = store.create_checkin(task_id, date, time, note)?;
    if !silent {
        let task = snapshot.task(task_id)?;
        let makeup = if date == today { "" } else { " (made up)" };
        println!("Checked in '{}' on {}{} (id = {})", task.name, day_key(date), makeup, checkin.id);
        if let Some(payload) = decode(checkin.note.as_deref()) {
            println!("  {}", payload.summary());
        }
    }
    Ok(())
}

/// Deletes a check-in.
pub fn cmd_undo(id: u64, silent: bool) -> Result<()> {
    let removed = Store::open_default().delete_checkin(id)?;
    if !silent {
        println!("Check-in {} on {} removed.", id, day_key(removed.date));
    }
    Ok(())
}

fn checkin_table(snapshot: &Snapshot, checkins: &[Checkin]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![bold("ID"), bold("Date"), bold("Time"), bold("Task"), bold("Detail")]);
    for c in checkins {
        let task_name = snapshot.task(c.task_id).map(|t| t.name.clone()).unwrap_or_else(|_| "?".into());
        let detail = decode(c.note.as_deref()).map(|p| p.summary()).unwrap_or_default();
        table.add_row(vec![
            Cell::new(c.id),
            Cell::new(format!("{} {}", day_key(c.date), weekday_label(c.date))),
            Cell::new(&c.time),
            Cell::new(task_name),
            Cell::new(detail),
        ]);
    }
    table
}

/// Lists check-ins, optionally for one month or one day.
pub fn cmd_records(month: Option<String>, date: Option<String>) -> Result<()> {
    let store = Store::open_default();
    let filter = match (date, month) {
        (Some(d), _) => CheckinFilter::Date(parse_day(&d)?),
        (None, Some(m)) => CheckinFilter::Month(m.parse()?),
        (None, None) => CheckinFilter::All,
    };
    let snapshot = Snapshot::load(&store)?;
    let checkins = store.list_checkins(filter)?;
    if checkins.is_empty() {
        println!("No check-ins found.");
        return Ok(());
    }
    println!("{}", checkin_table(&snapshot, &checkins));
    Ok(())
}

/// Shows one day: its check-ins, pending tasks and whether it can be made up.
pub fn cmd_day(date: String) -> Result<()> {
    let date = parse_day(&date)?;
    let snapshot = Snapshot::load(&Store::open_default())?;
    let eligibility = classify(date, today());
    let checkins = snapshot.checkins_on(date);

    println!("{} ({}): {}", day_key(date), weekday_label(date), eligibility);
    if checkins.is_empty() {
        println!("No check-ins.");
    } else {
        println!("{}", checkin_table(&snapshot, &checkins));
    }
    if eligibility.is_writable() {
        let pending = unchecked_tasks(&snapshot.tasks, &checkins);
        if !pending.is_empty() {
            println!("Still open:");
            for t in pending {
                println!("  [{}] {}", t.id, t.name);
            }
        }
    }
    Ok(())
}

fn status_cell(day: u32, status: DayStatus) -> Cell {
    let (mark, color) = match status {
        DayStatus::Done(n) => (format!("✓{}", n), Color::Green),
        DayStatus::Pending => ("•".to_string(), Color::Yellow),
        DayStatus::Missed => ("✗".to_string(), Color::Red),
        DayStatus::Future => (String::new(), Color::DarkGrey),
    };
    Cell::new(format!("{:>2} {}", day, mark)).fg(color)
}

/// Prints a month calendar with per-day status.
pub fn cmd_calendar(month: Option<String>) -> Result<()> {
    let month: Month = match month {
        Some(m) => m.parse()?,
        None => Month::current(),
    };
    let store = Store::open_default();
    let checkins = store.list_checkins(CheckinFilter::Month(month))?;
    let cells = month_with_status(month, today(), &checkins);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(WEEK_DAYS.iter().map(|d| bold(d)).collect::<Vec<_>>());
    for week in cells.chunks(7) {
        let row: Vec<Cell> = week
            .iter()
            .map(|c| match (c.cell, c.status) {
                (CalendarCell::Day { day, .. }, Some(status)) => status_cell(day, status),
                _ => Cell::new(""),
            })
            .collect();
        table.add_row(row);
    }

    let (done, missed, pending) = month_summary(&cells);
    println!("{}", month.label());
    println!("{table}");
    println!("Done: {}  Missed: {}  Pending: {}", done, missed, pending);
    Ok(())
}

/// Prints streak and counters.
pub fn cmd_stats(recent: usize) -> Result<()> {
    let snapshot = Snapshot::load(&Store::open_default())?;
    let stats = compute_stats(&snapshot.tasks, &snapshot.checkins, today(), recent);

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![bold("Stat"), bold("Value")]);
    table.add_row(vec![Cell::new("Streak (days)"), Cell::new(stats.streak_days).fg(Color::Green)]);
    table.add_row(vec![Cell::new("Today"), Cell::new(stats.today_checkins)]);
    table.add_row(vec![Cell::new("This week"), Cell::new(stats.week_checkins)]);
    table.add_row(vec![Cell::new("Total check-ins"), Cell::new(stats.total_checkins)]);
    table.add_row(vec![Cell::new("Tasks"), Cell::new(stats.total_tasks)]);
    println!("{table}");

    if !stats.recent_checkins.is_empty() {
        println!("Recent:");
        println!("{}", checkin_table(&snapshot, &stats.recent_checkins));
    }
    Ok(())
}

fn category_row(c: &Category) -> Vec<Cell> {
    let options: Vec<String> = c.measure_options.iter().map(|m| m.to_string()).collect();
    vec![
        Cell::new(c.task_id.map(|id| id.to_string()).unwrap_or_else(|| "-".into())),
        Cell::new(format!("{} {}", c.icon, c.name)),
        Cell::new(c.measure_type),
        Cell::new(if c.measure_type.is_measured() { format!("{} ({})", options.join("/"), c.measure_unit) } else { "-".into() }),
        Cell::new(c.available_tags().join(", ")),
        Cell::new(if c.is_hidden { "hidden" } else { "" }),
    ]
}

/// Lists the builtin and custom categories.
pub fn cmd_category_list() -> Result<()> {
    let snapshot = Snapshot::load(&Store::open_default())?;
    let mut categories = snapshot.registry().all_categories();
    if snapshot.settings.exercise_hidden {
        if let Some(task) = snapshot.tasks.iter().find(|t| snapshot.registry().binding(t.id) == &BoundCategory::Builtin) {
            categories.extend(snapshot.registry().category_for(task.id));
        }
    }
    if categories.is_empty() {
        println!("No categories found.");
        return Ok(());
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![bold("Task"), bold("Category"), bold("Measure"), bold("Options"), bold("Tags"), bold("")]);
    for c in &categories {
        table.add_row(category_row(c));
    }
    println!("{table}");
    Ok(())
}

/// Lists the category templates and icon choices.
pub fn cmd_category_templates() -> Result<()> {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec![bold("Template"), bold("Measure"), bold("Options"), bold("Tags")]);
    for t in category_templates() {
        let options: Vec<String> = t.measure_options.iter().map(|m| m.to_string()).collect();
        table.add_row(vec![
            Cell::new(format!("{} {}", t.icon, t.name)),
            Cell::new(t.measure_type),
            Cell::new(if options.is_empty() { "-".to_string() } else { format!("{} ({})", options.join("/"), t.measure_unit) }),
            Cell::new(t.preset_tags.join(", ")),
        ]);
    }
    println!("{table}");
    println!("Icons: {}", ICON_OPTIONS.join(" "));
    Ok(())
}

/// Options for a new custom category. Anything unset falls back to the
/// template (when given) or to the measure type defaults.
#[derive(Debug, Default, Clone)]
pub struct NewCategory {
    pub name: Option<String>,
    pub template: Option<String>,
    pub icon: Option<String>,
    pub measure: Option<MeasureType>,
    pub options: Option<String>,
    pub unit: Option<String>,
    pub tags: Option<String>,
}

impl NewCategory {
    fn into_definition(self) -> Result<CategoryDefinition> {
        let mut def = match &self.template {
            Some(t) => find_template(t).ok_or_else(|| Error::InvalidArgument(format!("unknown template '{}'", t)))?,
            None => CategoryDefinition {
                name: String::new(),
                icon: ICON_OPTIONS[0].to_string(),
                preset_tags: Vec::new(),
                measure_type: MeasureType::Duration,
                measure_options: Vec::new(),
                measure_unit: String::new(),
            },
        };
        if let Some(name) = self.name {
            def.name = name;
        }
        if let Some(icon) = self.icon {
            def.icon = icon;
        }
        if let Some(measure) = self.measure {
            if measure != def.measure_type || self.template.is_none() {
                let (options, unit) = measure.default_options();
                def.measure_type = measure;
                def.measure_options = options;
                def.measure_unit = unit.to_string();
            }
        } else if self.template.is_none() {
            let (options, unit) = def.measure_type.default_options();
            def.measure_options = options;
            def.measure_unit = unit.to_string();
        }
        if let Some(options) = self.options {
            def.measure_options = parse_measures(&options)?;
        }
        if let Some(unit) = self.unit {
            def.measure_unit = unit;
        }
        if let Some(tags) = self.tags {
            def.preset_tags = split_tags(&tags);
        }
        Ok(def)
    }
}

/// Creates a custom category together with the task it is bound to.
pub fn cmd_category_add(new: NewCategory, silent: bool) -> Result<()> {
    let store = Store::open_default();
    let snapshot = Snapshot::load(&store)?;
    let def = new.into_definition()?;
    let names = snapshot.registry().existing_names();
    // validate before the task exists, its name would collide with itself
    let name = validate_category_name(&def.name, &names)?;

    let task = store.create_task(&name, &format!("{} {} check-in", def.icon, name))?;
    let category = create_category(task.id, &def, &names)?;
    let mut settings = snapshot.settings.clone();
    settings.store(&category);
    store.save_settings(&settings)?;
    info!(category_id = %category.id, task_id = task.id, "created category");
    if !silent {
        println!("Category '{} {}' added (task id = {})", category.icon, category.name, task.id);
    }
    Ok(())
}

/// Hides or shows the category bound to a task.
pub fn cmd_category_set_hidden(task_id: u64, hidden: bool, silent: bool) -> Result<()> {
    let store = Store::open_default();
    let snapshot = Snapshot::load(&store)?;
    let (_, category, settings) = snapshot.with_category(task_id, |c| {
        c.is_hidden = hidden;
        Ok(())
    })?;
    store.save_settings(&settings)?;
    if !silent {
        println!("Category '{}' {}.", category.name, if hidden { "hidden" } else { "restored" });
    }
    Ok(())
}

/// Lists the tags of a task's category.
pub fn cmd_tag_list(task_id: u64) -> Result<()> {
    let snapshot = Snapshot::load(&Store::open_default())?;
    snapshot.task(task_id)?;
    let category = snapshot.registry().category_for(task_id).ok_or(Error::UnknownCategory(task_id))?;
    println!("{} {}", category.icon, category.name);
    println!("  Preset: {}", category.visible_preset_tags().join(", "));
    println!("  Custom: {}", category.custom_tags.join(", "));
    if !category.hidden_tags.is_empty() {
        println!("  Hidden: {}", category.hidden_tags.join(", "));
    }
    Ok(())
}

/// Tag mutations available from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagAction {
    Add(String),
    Remove(String),
    Restore,
    Clear,
}

/// Applies a tag mutation to a task's category and saves it.
pub fn cmd_tag(task_id: u64, action: TagAction, silent: bool) -> Result<()> {
    let store = Store::open_default();
    let snapshot = Snapshot::load(&store)?;
    let (message, category, settings) = snapshot.with_category(task_id, |c| {
        Ok(match &action {
            TagAction::Add(tag) => format!("Tag '{}' added.", add_custom_tag(c, tag)?),
            TagAction::Remove(tag) => match remove_tag(c, tag) {
                Removal::Hidden => format!("Preset tag '{}' hidden (restore with `tag restore`).", tag),
                Removal::Deleted => format!("Tag '{}' deleted.", tag),
                Removal::NotFound => format!("Tag '{}' not found.", tag),
            },
            TagAction::Restore => {
                restore_preset_tags(c);
                "Preset tags restored.".to_string()
            }
            TagAction::Clear => {
                clear_all_tags(c);
                "All tags cleared.".to_string()
            }
        })
    })?;
    if settings != snapshot.settings {
        store.save_settings(&settings)?;
        info!(category_id = %category.id, ?action, "updated tags");
    }
    if !silent {
        println!("{}", message);
    }
    Ok(())
}

/// Deletes all data after confirmation.
pub fn cmd_reset(force: bool) -> Result<()> {
    if !force {
        print!("Are you sure you want to delete all tasks, check-ins and categories? This cannot be undone. [y/N] ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if input.trim().to_lowercase() != "y" {
            println!("Aborted.");
            return Ok(());
        }
    }
    Store::open_default().reset()?;
    println!("Data reset successfully.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_items() {
        assert_eq!(parse_item("Legs=20").unwrap(), CheckinItem::new("Legs", 20));
        assert_eq!(parse_item(" Neck & Shoulders = 7.5").unwrap(), CheckinItem::new("Neck & Shoulders", Measure(7.5)));
        assert_eq!(parse_item("a=b=3").unwrap().tag, "a=b");
        assert!(parse_item("Legs").is_err());
        assert!(parse_item("Legs=lots").is_err());
    }

    #[test]
    fn parses_measure_lists() {
        assert_eq!(parse_measures("5, 10,15").unwrap(), Measure::list(&[5, 10, 15]));
        assert!(parse_measures("5,-1").is_err());
        assert!(parse_measures("").unwrap().is_empty());
    }

    #[test]
    fn new_category_defaults() {
        let def = NewCategory { name: Some("Walk".into()), ..Default::default() }.into_definition().unwrap();
        assert_eq!(def.measure_type, MeasureType::Duration);
        assert_eq!(def.measure_unit, "min");
        assert_eq!(def.measure_options, Measure::list(&[5, 10, 15, 20, 30]));

        let def = NewCategory { name: Some("Push-ups".into()), measure: Some(MeasureType::Count), ..Default::default() }
            .into_definition()
            .unwrap();
        assert_eq!(def.measure_unit, "times");

        let def = NewCategory { template: Some("Water".into()), ..Default::default() }.into_definition().unwrap();
        assert_eq!(def.name, "Water");
        assert_eq!(def.measure_unit, "cups");

        let def = NewCategory { template: Some("reading".into()), tags: Some("Poems, ,Essays".into()), ..Default::default() }
            .into_definition()
            .unwrap();
        assert_eq!(def.preset_tags, vec!["Poems".to_string(), "Essays".to_string()]);

        assert!(NewCategory { template: Some("nope".into()), ..Default::default() }.into_definition().is_err());
    }
}
