pub mod app;
pub mod ui;

use std::io;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::error;

use crate::error::Result;
use crate::storage::Store;
use app::{App, InputMode};
use ui::ui;

pub fn run_tui() -> Result<()> {
    // Load before touching the terminal so data errors print normally
    let mut app = App::new(Store::open_default())?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = %err, "tui loop failed");
    }
    Ok(res?)
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match app.input_mode {
                InputMode::Normal => match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Down | KeyCode::Char('j') => app.next(),
                    KeyCode::Up | KeyCode::Char('k') => app.previous(),
                    KeyCode::Left | KeyCode::Char('h') => app.previous_day(),
                    KeyCode::Right | KeyCode::Char('l') => app.next_day(),
                    KeyCode::Char('[') => app.previous_month(),
                    KeyCode::Char(']') => app.next_month(),
                    KeyCode::Char('t') => app.jump_to_today(),
                    KeyCode::Char(' ') => app.check_in_selected(&[]),
                    KeyCode::Enter => app.start_check_in(),
                    KeyCode::Char('u') | KeyCode::Delete => app.undo_selected(),
                    _ => {}
                },
                InputMode::Items => match key.code {
                    KeyCode::Enter => app.handle_input(),
                    KeyCode::Esc => {
                        app.input_mode = InputMode::Normal;
                        app.input_buffer.clear();
                    }
                    KeyCode::Char(c) => {
                        app.input_buffer.push(c);
                    }
                    KeyCode::Backspace => {
                        app.input_buffer.pop();
                    }
                    _ => {}
                },
            }
        }
    }
}
