use chrono::{Duration, NaiveDate};
use ratatui::widgets::TableState;

use crate::calendar::{month_with_status, StatusCell};
use crate::commands::parse_item;
use crate::dates::{day_key, today, Month};
use crate::error::Result;
use crate::makeup::{classify, Eligibility};
use crate::models::{Checkin, CheckinItem, Task};
use crate::snapshot::Snapshot;
use crate::stats::{compute_stats, Stats, RECENT_LIMIT};
use crate::storage::Store;

#[derive(PartialEq)]
pub enum InputMode {
    Normal,
    /// Typing `TAG=N` items for a check-in.
    Items,
}

/// One row of the task list for the selected day.
pub struct TaskRow {
    pub task: Task,
    pub checkin: Option<Checkin>,
    /// Tags offered by the task's category, empty for plain tasks.
    pub tags: Vec<String>,
    pub unit: Option<String>,
}

pub struct App {
    pub store: Store,
    pub snapshot: Snapshot,
    pub today: NaiveDate,
    pub selected_date: NaiveDate,
    pub month_cells: Vec<StatusCell>,
    pub rows: Vec<TaskRow>,
    pub stats: Stats,
    pub state: TableState,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub message: Option<String>,
}

impl App {
    /// Creates a new App instance and loads initial data.
    pub fn new(store: Store) -> Result<App> {
        let today = today();
        let mut app = App {
            store,
            snapshot: Snapshot::default(),
            today,
            selected_date: today,
            month_cells: Vec::new(),
            rows: Vec::new(),
            stats: compute_stats(&[], &[], today, RECENT_LIMIT),
            state: TableState::default(),
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            message: None,
        };
        app.reload()?;
        Ok(app)
    }

    pub fn month(&self) -> Month {
        Month::of(self.selected_date)
    }

    pub fn eligibility(&self) -> Eligibility {
        classify(self.selected_date, self.today)
    }

    /// Re-reads the store and rebuilds every derived view.
    pub fn reload(&mut self) -> Result<()> {
        self.snapshot = Snapshot::load(&self.store)?;
        self.month_cells = month_with_status(self.month(), self.today, &self.snapshot.checkins);
        self.stats = compute_stats(&self.snapshot.tasks, &self.snapshot.checkins, self.today, RECENT_LIMIT);
        self.rebuild_rows();
        Ok(())
    }

    fn rebuild_rows(&mut self) {
        let registry = self.snapshot.registry();
        let day = self.snapshot.checkins_on(self.selected_date);
        self.rows = self
            .snapshot
            .tasks
            .iter()
            .map(|t| {
                let category = registry.category_for(t.id);
                TaskRow {
                    task: t.clone(),
                    checkin: day.iter().find(|c| c.task_id == t.id).cloned(),
                    tags: category.as_ref().map(|c| c.available_tags()).unwrap_or_default(),
                    unit: category
                        .filter(|c| c.measure_type.is_measured())
                        .map(|c| c.measure_unit),
                }
            })
            .collect();

        let selected = match self.state.selected() {
            _ if self.rows.is_empty() => None,
            Some(i) => Some(i.min(self.rows.len() - 1)),
            None => Some(0),
        };
        self.state.select(selected);
    }

    fn select_date(&mut self, date: NaiveDate) {
        let month_changed = Month::of(date) != self.month();
        self.selected_date = date;
        if month_changed {
            self.month_cells = month_with_status(self.month(), self.today, &self.snapshot.checkins);
        }
        self.rebuild_rows();
    }

    pub fn next_day(&mut self) {
        self.select_date(self.selected_date + Duration::days(1));
    }

    pub fn previous_day(&mut self) {
        self.select_date(self.selected_date - Duration::days(1));
    }

    pub fn next_month(&mut self) {
        self.select_date(self.month().next().first_day());
    }

    pub fn previous_month(&mut self) {
        self.select_date(self.month().previous().first_day());
    }

    pub fn jump_to_today(&mut self) {
        self.select_date(self.today);
    }

    /// Selects the next task.
    pub fn next(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.rows.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    /// Selects the previous task.
    pub fn previous(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => self.rows.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn selected_row(&self) -> Option<&TaskRow> {
        self.state.selected().and_then(|i| self.rows.get(i))
    }

    /// Checks the selected task in on the selected day.
    pub fn check_in_selected(&mut self, items: &[CheckinItem]) {
        let Some(task_id) = self.selected_row().map(|r| r.task.id) else {
            return;
        };
        let result = self
            .snapshot
            .prepare_checkin(task_id, self.selected_date, self.today, items)
            .and_then(|note| self.store.create_checkin(task_id, self.selected_date, None, note));
        self.message = Some(match result {
            Ok(_) => format!("Checked in on {}", day_key(self.selected_date)),
            Err(e) => e.to_string(),
        });
        self.refresh();
    }

    /// Deletes the selected task's check-in on the selected day.
    pub fn undo_selected(&mut self) {
        let Some(id) = self.selected_row().and_then(|r| r.checkin.as_ref()).map(|c| c.id) else {
            return;
        };
        self.message = Some(match self.store.delete_checkin(id) {
            Ok(_) => "Check-in removed".to_string(),
            Err(e) => e.to_string(),
        });
        self.refresh();
    }

    /// Opens the items prompt for measured categories, otherwise checks in directly.
    pub fn start_check_in(&mut self) {
        match self.selected_row().map(|r| r.unit.is_some()) {
            Some(true) => {
                self.input_mode = InputMode::Items;
                self.input_buffer.clear();
            }
            Some(false) => self.check_in_selected(&[]),
            None => {}
        }
    }

    /// Submits the items prompt (`Core=20, Back=10`).
    pub fn handle_input(&mut self) {
        let items: Result<Vec<CheckinItem>> = self
            .input_buffer
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(parse_item)
            .collect();
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
        match items {
            Ok(items) => self.check_in_selected(&items),
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    fn refresh(&mut self) {
        if let Err(e) = self.reload() {
            self.message = Some(e.to_string());
        }
    }
}
