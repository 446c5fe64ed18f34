use std::io::{self, Stdout};
use std::sync::mpsc;
use std::time::Duration;

use anyhow::Result;
use catalog_client::HttpCatalog;
use catalog_core::{CategoryId, Field, FieldEdit, FormMode, Phase, Route};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};

use crate::config::Config;
use crate::product_cmd::{build_form, CatalogForm};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Name,
    Description,
    Amount,
    Category,
    Stores,
    Save,
}

impl Focus {
    const ORDER: [Focus; 6] = [
        Focus::Name,
        Focus::Description,
        Focus::Amount,
        Focus::Category,
        Focus::Stores,
        Focus::Save,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    /// Edit sent when focus leaves this row.
    fn blur(self) -> Option<FieldEdit> {
        match self {
            Focus::Name => Some(FieldEdit::NameBlur),
            Focus::Description => Some(FieldEdit::DescriptionBlur),
            Focus::Amount => Some(FieldEdit::AmountBlur),
            _ => None,
        }
    }
}

enum Action {
    None,
    Submit,
    Cancel,
}

struct FormScreen {
    focus: Focus,
    store_cursor: usize,
}

/// Steps through `ids` from `current`; an unset selection starts at either end.
fn cycle(ids: &[CategoryId], current: Option<CategoryId>, forward: bool) -> Option<CategoryId> {
    if ids.is_empty() {
        return None;
    }
    let len = ids.len();
    let pos = current.and_then(|id| ids.iter().position(|c| *c == id));
    let idx = match (pos, forward) {
        (Some(i), true) => (i + 1) % len,
        (Some(i), false) => (i + len - 1) % len,
        (None, true) => 0,
        (None, false) => len - 1,
    };
    Some(ids[idx])
}

fn without_last_char(s: &str) -> String {
    let mut out = s.to_string();
    out.pop();
    out
}

/// Interactive product form. Returns the route the form navigated to, or
/// `None` if the user quit before any navigation.
pub async fn run_form(cfg: &Config, api: HttpCatalog, mode: FormMode) -> Result<Option<Route>> {
    let (mut form, rx) = build_form(cfg, api, mode);

    enable_raw_mode()?;
    let mut terminal = enter_or_restore(
        || {
            let mut stdout = io::stdout();
            execute!(stdout, EnterAlternateScreen)?;
            Terminal::new(CrosstermBackend::new(stdout))
        },
        leave_screen,
    )?;

    let res = form_loop(&mut terminal, &mut form, &rx).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

/// Runs `enter`; on failure runs `restore` before handing the error back.
fn enter_or_restore<T>(enter: impl FnOnce() -> io::Result<T>, restore: impl FnOnce()) -> io::Result<T> {
    enter().inspect_err(|_| restore())
}

/// Best effort; used when setup fails halfway.
fn leave_screen() {
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
    let _ = disable_raw_mode();
}

async fn form_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    form: &mut CatalogForm,
    rx: &mpsc::Receiver<Route>,
) -> Result<Option<Route>> {
    let mut screen = FormScreen {
        focus: Focus::Name,
        store_cursor: 0,
    };

    terminal.draw(|f| draw(f, form, &screen))?;
    form.mount().await;

    loop {
        match rx.try_recv() {
            Ok(route) => return Ok(Some(route)),
            Err(mpsc::TryRecvError::Disconnected) => return Ok(None),
            Err(mpsc::TryRecvError::Empty) => {}
        }

        terminal.draw(|f| draw(f, form, &screen))?;

        if !event::poll(Duration::from_millis(50))? {
            // let timer tasks run between frames
            tokio::task::yield_now().await;
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match handle_key(key, form, &mut screen) {
            Action::None => {}
            Action::Cancel => {
                form.cancel();
            }
            Action::Submit => {
                if let Some(edit) = screen.focus.blur() {
                    form.edit(edit);
                }
                if form.phase().can_submit() {
                    // draw the saving state before the request goes out
                    terminal.draw(draw_saving)?;
                }
                form.submit().await;
            }
        }
    }
}

fn handle_key(key: KeyEvent, form: &mut CatalogForm, screen: &mut FormScreen) -> Action {
    if key.code == KeyCode::Esc {
        return Action::Cancel;
    }
    if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Submit;
    }
    if !form.phase().shows_form() {
        return Action::None;
    }

    match key.code {
        KeyCode::Tab | KeyCode::BackTab => {
            if let Some(edit) = screen.focus.blur() {
                form.edit(edit);
            }
            screen.focus = if key.code == KeyCode::Tab {
                screen.focus.next()
            } else {
                screen.focus.prev()
            };
        }
        KeyCode::Enter if screen.focus == Focus::Save => return Action::Submit,
        KeyCode::Enter => {
            if let Some(edit) = screen.focus.blur() {
                form.edit(edit);
            }
            screen.focus = screen.focus.next();
        }
        KeyCode::Left | KeyCode::Right if screen.focus == Focus::Category => {
            let ids: Vec<CategoryId> = form.categories().iter().map(|c| c.id).collect();
            let next = cycle(&ids, form.form().category_id, key.code == KeyCode::Right);
            form.edit(FieldEdit::Category(next));
        }
        KeyCode::Up if screen.focus == Focus::Stores => {
            screen.store_cursor = screen.store_cursor.saturating_sub(1);
        }
        KeyCode::Down if screen.focus == Focus::Stores => {
            let last = form.stores().len().saturating_sub(1);
            screen.store_cursor = (screen.store_cursor + 1).min(last);
        }
        KeyCode::Char(' ') if screen.focus == Focus::Stores => {
            if let Some(store) = form.stores().get(screen.store_cursor) {
                form.edit(FieldEdit::ToggleStore(store.id));
            }
        }
        KeyCode::Backspace => {
            if let Some(edit) = backspace_edit(form, screen.focus) {
                form.edit(edit);
            }
        }
        KeyCode::Char(c) => {
            if let Some(edit) = typed_edit(form, screen.focus, c) {
                form.edit(edit);
            }
        }
        _ => {}
    }
    Action::None
}

fn typed_edit(form: &CatalogForm, focus: Focus, c: char) -> Option<FieldEdit> {
    let state = form.form();
    match focus {
        Focus::Name => Some(FieldEdit::Name(format!("{}{c}", state.name))),
        Focus::Description => Some(FieldEdit::Description(format!("{}{c}", state.description))),
        Focus::Amount => Some(FieldEdit::AmountInput(format!("{}{c}", state.amount.display()))),
        _ => None,
    }
}

fn backspace_edit(form: &CatalogForm, focus: Focus) -> Option<FieldEdit> {
    let state = form.form();
    match focus {
        Focus::Name => Some(FieldEdit::Name(without_last_char(&state.name))),
        Focus::Description => Some(FieldEdit::Description(without_last_char(&state.description))),
        Focus::Amount => Some(FieldEdit::AmountInput(without_last_char(state.amount.display()))),
        _ => None,
    }
}

fn draw(f: &mut Frame, form: &CatalogForm, screen: &FormScreen) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    let title = match form.mode() {
        FormMode::Create => "New product".to_string(),
        FormMode::Edit(Some(id)) => format!("Edit product #{id}"),
        FormMode::Edit(None) => "Edit product".to_string(),
    };
    let header = Paragraph::new(Line::from(Span::styled(
        title,
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    let body = match form.phase() {
        Phase::Loading => Text::from(Line::styled("Loading…", Style::default().fg(Color::Gray))),
        Phase::LoadFailed => Text::from(Line::styled(
            "Could not open the form. Returning to the product list…",
            Style::default().fg(Color::Gray),
        )),
        _ => Text::from(form_lines(form, screen)),
    };
    let body = Paragraph::new(body)
        .block(Block::default().borders(Borders::ALL).title("product"))
        .wrap(Wrap { trim: false });
    f.render_widget(body, chunks[1]);

    let status = form.status();
    let banner = match (&status.success, &status.error, status.phase) {
        (Some(msg), _, _) => Line::styled(msg.clone(), Style::default().fg(Color::Green)),
        (None, Some(msg), _) => Line::styled(msg.clone(), Style::default().fg(Color::Red)),
        (None, None, Phase::Submitting) => Line::styled("Saving…", Style::default().fg(Color::Gray)),
        _ => Line::raw(""),
    };
    f.render_widget(
        Paragraph::new(banner).block(Block::default().borders(Borders::ALL)),
        chunks[2],
    );

    let help = Paragraph::new(Line::styled(
        "Tab/Shift-Tab move · ←/→ category · ↑/↓ + Space stores · Ctrl-S save · Esc cancel",
        Style::default().fg(Color::Gray),
    ));
    f.render_widget(help, chunks[3]);
}

fn draw_saving(f: &mut Frame) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3), Constraint::Length(1)])
        .split(area);
    f.render_widget(
        Paragraph::new(Line::styled("Saving…", Style::default().fg(Color::Gray)))
            .block(Block::default().borders(Borders::ALL)),
        chunks[1],
    );
}

fn label(focus: Focus, current: Focus, text: &str) -> Span<'static> {
    let marker = if focus == current { "> " } else { "  " };
    let style = if focus == current {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Span::styled(format!("{marker}{text:<12}"), style)
}

fn error_line(form: &CatalogForm, field: Field) -> Option<Line<'static>> {
    form.field_error(field).map(|msg| {
        Line::styled(format!("                {msg}"), Style::default().fg(Color::Red))
    })
}

fn form_lines(form: &CatalogForm, screen: &FormScreen) -> Vec<Line<'static>> {
    let state = form.form();
    let focus = screen.focus;
    let mut lines = Vec::new();

    lines.push(Line::from(vec![
        label(Focus::Name, focus, "Name"),
        Span::raw(state.name.clone()),
    ]));
    lines.extend(error_line(form, Field::Name));

    lines.push(Line::from(vec![
        label(Focus::Description, focus, "Description"),
        Span::raw(state.description.clone()),
    ]));
    lines.extend(error_line(form, Field::Description));

    lines.push(Line::from(vec![
        label(Focus::Amount, focus, "Amount (R$)"),
        Span::raw(state.amount.display().to_string()),
    ]));
    lines.extend(error_line(form, Field::Amount));

    let category = state
        .category_id
        .and_then(|id| form.category_name(id))
        .unwrap_or("(choose)")
        .to_string();
    lines.push(Line::from(vec![
        label(Focus::Category, focus, "Category"),
        Span::raw(format!("‹ {category} ›")),
    ]));
    lines.extend(error_line(form, Field::CategoryId));

    lines.push(Line::from(label(Focus::Stores, focus, "Stores")));
    for (i, store) in form.stores().iter().enumerate() {
        let checked = if state.store_ids.contains(&store.id) { "[x]" } else { "[ ]" };
        let cursor = focus == Focus::Stores && i == screen.store_cursor;
        let style = if cursor {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        lines.push(Line::styled(format!("      {checked} {}", store.name), style));
    }
    lines.extend(error_line(form, Field::StoreIds));

    lines.push(Line::raw(""));
    lines.push(Line::from(label(Focus::Save, focus, "[ Save ]")));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_focus_wraps() {
        assert_eq!(Focus::Save.next(), Focus::Name);
        assert_eq!(Focus::Name.prev(), Focus::Save);
        assert_eq!(Focus::Amount.next(), Focus::Category);
        assert_eq!(Focus::Amount.blur(), Some(FieldEdit::AmountBlur));
        assert_eq!(Focus::Stores.blur(), None);
    }

    #[test]
    fn test_category_cycle() {
        let ids = [3, 5, 9];
        assert_eq!(cycle(&ids, None, true), Some(3));
        assert_eq!(cycle(&ids, None, false), Some(9));
        assert_eq!(cycle(&ids, Some(9), true), Some(3));
        assert_eq!(cycle(&ids, Some(3), false), Some(9));
        assert_eq!(cycle(&ids, Some(42), true), Some(3));
        assert_eq!(cycle(&[], Some(3), true), None);
    }

    #[test]
    fn test_failed_setup_restores_terminal() {
        let restored = Cell::new(false);
        let res: io::Result<()> =
            enter_or_restore(|| Err(io::Error::other("no tty")), || restored.set(true));
        assert!(res.is_err());
        assert!(restored.get());

        let restored = Cell::new(false);
        let value = enter_or_restore(|| Ok(5), || restored.set(true)).unwrap();
        assert_eq!(value, 5);
        assert!(!restored.get());
    }

    #[test]
    fn test_backspace_helper() {
        assert_eq!(without_last_char("10,5"), "10,");
        assert_eq!(without_last_char(""), "");
    }
}
