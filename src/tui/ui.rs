use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

use super::app::{App, InputMode};
use crate::calendar::{CalendarCell, DayStatus};
use crate::dates::{day_key, weekday_label, WEEK_DAYS};
use crate::note::decode;

fn status_style(status: DayStatus) -> Style {
    match status {
        DayStatus::Done(_) => Style::default().fg(Color::Green),
        DayStatus::Pending => Style::default().fg(Color::Yellow),
        DayStatus::Missed => Style::default().fg(Color::Red),
        DayStatus::Future => Style::default().fg(Color::DarkGray),
    }
}

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Body
            Constraint::Length(3)  // Help
        ].as_ref())
        .split(f.area());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(44), Constraint::Min(30)].as_ref())
        .split(chunks[0]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(11), Constraint::Min(0)].as_ref())
        .split(body[0]);

    render_calendar(f, app, left[0]);
    render_stats(f, app, left[1]);
    render_tasks(f, app, body[1]);

    let help_text = match app.input_mode {
        InputMode::Normal => "q: Quit | ←/→: Day | [/]: Month | t: Today | j/k: Task | Space: Check in | Enter: Check in with items | u: Undo",
        InputMode::Items => "Enter: Save | Esc: Cancel",
    };
    let help_line = match &app.message {
        Some(msg) => format!("{}  |  {}", msg, help_text),
        None => help_text.to_string(),
    };
    let help = Paragraph::new(help_line)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[1]);

    if app.input_mode == InputMode::Items {
        let area = centered_rect(60, 3, f.area());
        f.render_widget(Clear, area);
        let tags = app.selected_row().map(|r| r.tags.join(", ")).unwrap_or_default();
        let title = format!("Items as TAG=N, comma separated ({})", tags);
        let input = Paragraph::new(app.input_buffer.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(input, area);
    }
}

fn render_calendar(f: &mut Frame, app: &App, area: Rect) {
    let rows: Vec<Row> = app
        .month_cells
        .chunks(7)
        .map(|week| {
            Row::new(week.iter().map(|c| match (c.cell, c.status) {
                (CalendarCell::Day { day, date }, Some(status)) => {
                    let mut style = status_style(status);
                    if date == app.selected_date {
                        style = style.add_modifier(Modifier::REVERSED);
                    }
                    if date == app.today {
                        style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
                    }
                    Cell::from(format!("{:>3}", day)).style(style)
                }
                _ => Cell::from(""),
            }))
        })
        .collect();

    let widths = [Constraint::Length(5); 7];
    let table = Table::new(rows, widths)
        .header(Row::new(WEEK_DAYS.iter().map(|d| Cell::from(*d)))
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)))
        .block(Block::default().borders(Borders::ALL).title(app.month().label()));
    f.render_widget(table, area);
}

fn render_stats(f: &mut Frame, app: &App, area: Rect) {
    let s = &app.stats;
    let lines = vec![
        Line::from(vec![
            Span::raw("Streak: "),
            Span::styled(format!("{} days", s.streak_days), Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        ]),
        Line::from(format!("Today: {}   This week: {}", s.today_checkins, s.week_checkins)),
        Line::from(format!("Total: {} check-ins, {} tasks", s.total_checkins, s.total_tasks)),
    ];
    let stats = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Stats"));
    f.render_widget(stats, area);
}

fn render_tasks(f: &mut Frame, app: &mut App, area: Rect) {
    let rows: Vec<Row> = app
        .rows
        .iter()
        .map(|r| {
            let (status, style) = match &r.checkin {
                Some(c) => (format!("Done {}", c.time), Style::default().fg(Color::Green)),
                None => ("Open".to_string(), Style::default().fg(Color::Yellow)),
            };
            let detail = r
                .checkin
                .as_ref()
                .and_then(|c| decode(c.note.as_deref()))
                .map(|p| p.summary())
                .unwrap_or_default();
            Row::new(vec![
                Cell::from(r.task.id.to_string()),
                Cell::from(r.task.name.clone()),
                Cell::from(status),
                Cell::from(detail),
            ]).style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Min(16),
        Constraint::Length(11),
        Constraint::Min(20),
    ];

    let title = format!(
        "{} {} - {}",
        day_key(app.selected_date),
        weekday_label(app.selected_date),
        app.eligibility()
    );
    let table = Table::new(rows, widths)
        .header(Row::new(vec!["ID", "Task", "Status", "Detail"])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .bottom_margin(1))
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(r.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Length(r.height.saturating_sub(height) / 2),
        ].as_ref())
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ].as_ref())
        .split(popup_layout[1])[1]
}
