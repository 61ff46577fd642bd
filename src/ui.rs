use crate::calendar::{month_cells, todos_due_on, CalendarMonth};
use crate::model::{TodoId, TodoItem, TodoList};
use crate::storage::{save_todos, FileStore};
use anyhow::Result;
use chrono::{Datelike, Duration as ChronoDuration, Local, NaiveDate};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{stdout, Stdout};
use std::time::{Duration, Instant};

pub fn run(todos: TodoList, store: FileStore) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let mut app = App::new(todos, store);
    let result = app.event_loop(&mut terminal);
    teardown_terminal(&mut terminal)?;
    result
}

struct App {
    todos: TodoList,
    store: FileStore,
    month: CalendarMonth,
    selected_date: NaiveDate,
    focus: Focus,
    selected_todo: usize,
    todo_offset: usize,
    last_save: Option<Instant>,
    status: String,
    mode: Mode,
}

enum Mode {
    Normal,
    Adding(TodoForm),
    ConfirmDelete { id: TodoId },
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Focus {
    Todos,
    Calendar,
}

impl Focus {
    fn label(&self) -> &'static str {
        match self {
            Focus::Todos => "todos",
            Focus::Calendar => "calendar",
        }
    }

    fn other(&self) -> Focus {
        match self {
            Focus::Todos => Focus::Calendar,
            Focus::Calendar => Focus::Todos,
        }
    }
}

struct TodoForm {
    text: FieldValue,
    due: FieldValue,
    field: FormField,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum FormField {
    Text,
    Due,
}

#[derive(Clone)]
struct FieldValue {
    value: String,
    cursor: usize,
}

impl FieldValue {
    fn new(value: &str) -> Self {
        FieldValue {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    fn move_left(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor = prev_char(self.cursor, &self.value);
    }

    fn move_right(&mut self) {
        if self.cursor >= self.value.len() {
            return;
        }
        self.cursor = next_char(self.cursor, &self.value);
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = prev_char(self.cursor, &self.value);
        self.value.drain(prev..self.cursor);
        self.cursor = prev;
    }

    fn insert_char(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn with_caret(&self) -> String {
        let mut text = self.value.clone();
        text.insert_str(self.cursor, "▌");
        text
    }
}

impl App {
    fn new(todos: TodoList, store: FileStore) -> Self {
        let today = Local::now().date_naive();
        let status = format!("Loaded {} todo(s) from {}", todos.len(), store.dir().display());
        App {
            todos,
            store,
            month: CalendarMonth::containing(today),
            selected_date: today,
            focus: Focus::Todos,
            selected_todo: 0,
            todo_offset: 0,
            last_save: None,
            status,
            mode: Mode::Normal,
        }
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;
            if event::poll(Duration::from_millis(200))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key)? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Adding(_) => self.handle_form_key(key),
            Mode::ConfirmDelete { .. } => self.handle_confirm_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = self.focus.other();
                self.status = format!("Focus on {}", self.focus.label());
                return Ok(false);
            }
            KeyCode::Char('n') => {
                self.mode = Mode::Adding(TodoForm::new());
                self.status = "Adding todo (Tab moves, Enter saves, Esc cancels)".into();
                return Ok(false);
            }
            _ => {}
        }

        match self.focus {
            Focus::Todos => self.handle_todos_key(key),
            Focus::Calendar => self.handle_calendar_key(key),
        }
        Ok(false)
    }

    fn handle_todos_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                if self.selected_todo > 0 {
                    self.selected_todo -= 1;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected_todo + 1 < self.todos.len() {
                    self.selected_todo += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(id) = self.current_todo_id() {
                    self.todos.toggle(id);
                    let state = if self.todos.get(id).map(|t| t.completed).unwrap_or(false) {
                        "done"
                    } else {
                        "pending"
                    };
                    self.persist(format!("Todo {} is now {}", id, state));
                } else {
                    self.status = "No todo selected".into();
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.current_todo_id() {
                    self.mode = Mode::ConfirmDelete { id };
                    self.status = "Delete? (y to confirm, n/Esc to cancel)".into();
                } else {
                    self.status = "No todo selected to delete".into();
                }
            }
            _ => {}
        }
    }

    fn handle_calendar_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.shift_selected_date(-1),
            KeyCode::Right | KeyCode::Char('l') => self.shift_selected_date(1),
            KeyCode::Up | KeyCode::Char('k') => self.shift_selected_date(-7),
            KeyCode::Down | KeyCode::Char('j') => self.shift_selected_date(7),
            KeyCode::Char('[') => {
                self.month = self.month.previous();
                self.status = format!("Showing {}", self.month.title());
            }
            KeyCode::Char(']') => {
                self.month = self.month.next();
                self.status = format!("Showing {}", self.month.title());
            }
            KeyCode::Char('t') => {
                let today = Local::now().date_naive();
                self.selected_date = today;
                self.month = CalendarMonth::containing(today);
                self.status = format!("Jumped to today, {}", format_due(today));
            }
            KeyCode::Enter => {
                let due = todos_due_on(self.todos.items(), self.selected_date);
                if due.is_empty() {
                    self.status = format!("No todos due {}", format_due(self.selected_date));
                } else {
                    let first = due[0].id;
                    self.status =
                        format!("{} todo(s) due {}", due.len(), format_due(self.selected_date));
                    if let Some(idx) = self.todos.items().iter().position(|t| t.id == first) {
                        self.selected_todo = idx;
                        self.focus = Focus::Todos;
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Result<bool> {
        let mut close_form = false;
        let mut mode = std::mem::replace(&mut self.mode, Mode::Normal);
        if let Mode::Adding(form) = &mut mode {
            close_form = self.process_form_key(form, key);
        }
        self.mode = if close_form { Mode::Normal } else { mode };
        Ok(false)
    }

    fn process_form_key(&mut self, form: &mut TodoForm, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc => {
                self.status = "Canceled".into();
                return true;
            }
            KeyCode::Tab | KeyCode::BackTab => form.switch_field(),
            KeyCode::Left => form.active_field_mut().move_left(),
            KeyCode::Right => form.active_field_mut().move_right(),
            KeyCode::Enter => return self.try_submit(form),
            KeyCode::Backspace => form.active_field_mut().backspace(),
            KeyCode::Char(c) => {
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                {
                    form.active_field_mut().insert_char(c);
                }
            }
            _ => {}
        }
        false
    }

    fn try_submit(&mut self, form: &TodoForm) -> bool {
        let due = match parse_due_string(&form.due.value) {
            Ok(due) => due,
            Err(err) => {
                self.status = format!("Could not add: {}", err);
                return false;
            }
        };
        match self.todos.add(&form.text.value, due) {
            Some(id) => {
                self.selected_todo = self.todos.len().saturating_sub(1);
                self.persist(format!("Added todo {}", id));
            }
            None => self.status = "Nothing added".into(),
        }
        true
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Result<bool> {
        let id = match &self.mode {
            Mode::ConfirmDelete { id } => *id,
            _ => return Ok(false),
        };
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                if self.todos.delete(id) {
                    self.persist(format!("Deleted todo {}", id));
                } else {
                    self.status = format!("No todo with id {}", id);
                }
                self.ensure_todo_bounds();
                self.mode = Mode::Normal;
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.status = "Delete canceled".into();
                self.mode = Mode::Normal;
            }
            _ => {}
        }
        Ok(false)
    }

    fn shift_selected_date(&mut self, days: i64) {
        if let Some(new_date) = self
            .selected_date
            .checked_add_signed(ChronoDuration::days(days))
        {
            self.selected_date = new_date;
            self.status = format!("Selected {}", format_due(new_date));
        }
    }

    fn current_todo_id(&self) -> Option<TodoId> {
        self.todos.items().get(self.selected_todo).map(|t| t.id)
    }

    fn ensure_todo_bounds(&mut self) {
        self.selected_todo = self
            .selected_todo
            .min(self.todos.len().saturating_sub(1));
        self.todo_offset = self.todo_offset.min(self.todos.len().saturating_sub(1));
    }

    fn persist(&mut self, message: impl Into<String>) {
        match save_todos(&mut self.store, &self.todos) {
            Ok(()) => {
                self.last_save = Some(Instant::now());
                self.status = message.into();
            }
            Err(err) => {
                log::warn!("unable to save todos: {:#}", err);
                self.status = format!("Save failed: {}", err);
            }
        }
        self.ensure_todo_bounds();
    }

    fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(4),
            ])
            .split(f.size());

        self.draw_header(f, layout[0]);

        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(layout[1]);
        self.draw_todos(f, panes[0]);
        self.draw_calendar(f, panes[1]);

        self.draw_footer(f, layout[2]);

        match &self.mode {
            Mode::Adding(form) => self.draw_form(f, form),
            Mode::ConfirmDelete { id } => self.draw_confirm(f, *id),
            Mode::Normal => {}
        }
    }

    fn draw_header(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let saved = match self.last_save {
            Some(at) => format!("saved {}", format_elapsed(at)),
            None => "not saved yet".to_string(),
        };
        let title = Line::from(vec![
            Span::styled(
                "dayplan",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  •  "),
            Span::styled(
                format!("{}", self.store.dir().display()),
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw("  •  "),
            Span::styled(saved, Style::default().fg(Color::Gray)),
            Span::raw("  •  "),
            Span::styled(
                format!("focus {}", self.focus.label()),
                Style::default().fg(Color::Magenta),
            ),
        ]);

        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));
        let paragraph = Paragraph::new(title)
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
    }

    fn draw_todos(&mut self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let focused = self.focus == Focus::Todos;
        let mut state = ListState::default();
        let viewport = area.height.saturating_sub(2) as usize;
        let selected = self.selected_todo.min(self.todos.len().saturating_sub(1));
        let offset = adjust_offset(selected, self.todo_offset, viewport, 1, self.todos.len());
        self.todo_offset = offset;
        *state.offset_mut() = offset;
        if focused && !self.todos.is_empty() {
            state.select(Some(selected));
        }

        let items = if self.todos.is_empty() {
            vec![ListItem::new("No todos yet. Press n to add one.")]
        } else {
            self.todos.items().iter().map(todo_list_item).collect()
        };

        let block = Block::default()
            .title(Span::styled(
                format!("Todos ({})", self.todos.len()),
                Style::default()
                    .fg(if focused { Color::Cyan } else { Color::Gray })
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if focused {
                Color::Cyan
            } else {
                Color::DarkGray
            }));
        let list = List::new(items).block(block).highlight_style(
            Style::default()
                .bg(Color::LightCyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        );
        f.render_stateful_widget(list, area, &mut state);
    }

    fn draw_calendar(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let focused = self.focus == Focus::Calendar;
        let today = Local::now().date_naive();
        let cells = month_cells(self.month, self.selected_date, today, self.todos.items());

        let mut lines = Vec::new();
        lines.push(Line::from(Span::styled(
            self.month.title(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
        let headings = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];
        let header_spans: Vec<Span<'static>> = headings
            .iter()
            .map(|h| Span::styled(format!("{:^6}", h), Style::default().fg(Color::Gray)))
            .collect();
        lines.push(Line::from(header_spans));

        for week in cells.chunks(7) {
            let mut spans = Vec::new();
            for slot in week {
                match slot {
                    None => spans.push(Span::raw("      ")),
                    Some(cell) => {
                        let day = cell.date.day();
                        let text = if cell.has_todos() {
                            format!("{:>2}({:>2})", day, cell.todo_count.min(99))
                        } else {
                            format!("{:>2}    ", day)
                        };
                        let mut style = Style::default().fg(if cell.has_todos() {
                            Color::LightYellow
                        } else {
                            Color::Gray
                        });
                        if cell.is_today {
                            style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
                        }
                        if cell.is_selected {
                            style = style
                                .bg(if focused { Color::Cyan } else { Color::Blue })
                                .fg(Color::Black)
                                .add_modifier(Modifier::BOLD);
                        }
                        spans.push(Span::styled(text, style));
                    }
                }
                spans.push(Span::raw(" "));
            }
            lines.push(Line::from(spans));
        }

        let block = Block::default()
            .title(Span::styled(
                "Calendar",
                Style::default()
                    .fg(if focused { Color::Cyan } else { Color::Gray })
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if focused {
                Color::Cyan
            } else {
                Color::DarkGray
            }));
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
    }

    fn draw_footer(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Length(2)])
            .split(area);

        let help_bar = Paragraph::new(self.footer_help_line())
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(help_bar, rows[0]);

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[1]);

        let status = Paragraph::new(self.status.clone())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(status, bottom[0]);

        let detail = Paragraph::new(self.selected_day_lines())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray))
                    .title(format!("Due {}", format_due(self.selected_date))),
            );
        f.render_widget(detail, bottom[1]);
    }

    fn footer_help_line(&self) -> Line<'static> {
        let mut spans = vec![
            Span::styled("Tab", Style::default().fg(Color::LightCyan)),
            Span::raw(" focus  "),
        ];
        match self.focus {
            Focus::Todos => spans.extend([
                Span::styled("↑↓ / j k", Style::default().fg(Color::LightCyan)),
                Span::raw(" move  "),
                Span::styled("Enter/Space", Style::default().fg(Color::LightGreen)),
                Span::raw(" toggle  "),
                Span::styled("n", Style::default().fg(Color::LightMagenta)),
                Span::raw(" new  "),
                Span::styled("d", Style::default().fg(Color::LightRed)),
                Span::raw(" delete  "),
                Span::styled("q", Style::default().fg(Color::LightRed)),
                Span::raw(" quit"),
            ]),
            Focus::Calendar => spans.extend([
                Span::styled("←→↑↓ / h j k l", Style::default().fg(Color::LightCyan)),
                Span::raw(" select day  "),
                Span::styled("[ ]", Style::default().fg(Color::LightGreen)),
                Span::raw(" month  "),
                Span::styled("t", Style::default().fg(Color::LightYellow)),
                Span::raw(" today  "),
                Span::styled("Enter", Style::default().fg(Color::LightYellow)),
                Span::raw(" view day  "),
                Span::styled("n", Style::default().fg(Color::LightMagenta)),
                Span::raw(" new  "),
                Span::styled("q", Style::default().fg(Color::LightRed)),
                Span::raw(" quit"),
            ]),
        }
        Line::from(spans)
    }

    fn selected_day_lines(&self) -> Vec<Line<'static>> {
        let due = todos_due_on(self.todos.items(), self.selected_date);
        if due.is_empty() {
            return vec![Line::from("No todos due on this date")];
        }
        due.iter()
            .map(|todo| {
                let mark = if todo.completed { "[x]" } else { "[ ]" };
                Line::from(format!("{} {}", mark, todo.text))
            })
            .collect()
    }

    fn draw_form(&self, f: &mut ratatui::Frame<'_>, form: &TodoForm) {
        let area = centered_rect(60, 40, f.size());
        let mut fields = Vec::new();
        fields.extend(field_lines(
            "Text",
            &form.text,
            form.field == FormField::Text,
        ));
        fields.extend(field_lines(
            "Due (YYYY-MM-DD)",
            &form.due,
            form.field == FormField::Due,
        ));
        fields.push(Line::from(Span::styled(
            "Enter to save • Esc to cancel • Tab to switch fields",
            Style::default().fg(Color::Gray),
        )));
        let dialog = Paragraph::new(fields)
            .block(
                Block::default()
                    .title(Span::styled(
                        "New Todo",
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .wrap(Wrap { trim: true });

        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }

    fn draw_confirm(&self, f: &mut ratatui::Frame<'_>, id: TodoId) {
        let area = centered_rect(50, 30, f.size());
        let text = self
            .todos
            .get(id)
            .map(|t| t.text.clone())
            .unwrap_or_else(|| id.to_string());
        let body = vec![
            Line::from(Span::styled(
                format!("Delete \"{}\"?", truncate_text(&text, 40)),
                Style::default()
                    .fg(Color::LightRed)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Press y to confirm, n or Esc to cancel"),
        ];
        let dialog = Paragraph::new(body).alignment(Alignment::Center).block(
            Block::default()
                .title(Span::styled(
                    "Confirm Delete",
                    Style::default()
                        .fg(Color::LightRed)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::LightRed)),
        );
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }
}

impl TodoForm {
    fn new() -> Self {
        TodoForm {
            text: FieldValue::new(""),
            due: FieldValue::new(""),
            field: FormField::Text,
        }
    }

    fn switch_field(&mut self) {
        self.field = match self.field {
            FormField::Text => FormField::Due,
            FormField::Due => FormField::Text,
        };
    }

    fn active_field_mut(&mut self) -> &mut FieldValue {
        match self.field {
            FormField::Text => &mut self.text,
            FormField::Due => &mut self.due,
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}

fn parse_due_string(input: &str) -> Result<Option<NaiveDate>, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| format!("invalid date format (use YYYY-MM-DD): {}", trimmed))
}

fn format_due(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn adjust_offset(
    selected: usize,
    current_offset: usize,
    viewport: usize,
    scrolloff: usize,
    len: usize,
) -> usize {
    if viewport == 0 || len == 0 {
        return 0;
    }
    let max_offset = len.saturating_sub(viewport);
    let margin = scrolloff.min(viewport.saturating_sub(1));
    let mut offset = current_offset.min(max_offset);
    if selected < offset.saturating_add(margin) {
        offset = selected.saturating_sub(margin);
    } else {
        let upper = offset
            .saturating_add(viewport.saturating_sub(1))
            .saturating_sub(margin);
        if selected > upper {
            offset = selected.saturating_add(margin + 1).saturating_sub(viewport);
        }
    }
    offset.min(max_offset)
}

fn prev_char(cursor: usize, text: &str) -> usize {
    if cursor == 0 {
        return 0;
    }
    let mut prev = 0;
    for (idx, _) in text.char_indices() {
        if idx >= cursor {
            break;
        }
        prev = idx;
    }
    prev
}

fn next_char(cursor: usize, text: &str) -> usize {
    for (idx, ch) in text.char_indices() {
        if idx > cursor {
            return idx;
        }
        if idx == cursor {
            return cursor + ch.len_utf8();
        }
    }
    text.len()
}

fn truncate_text(text: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    for ch in text.chars() {
        if out.chars().count() >= max.saturating_sub(3) {
            out.push_str("...");
            break;
        }
        out.push(ch);
    }
    if out.chars().count() > max {
        out.truncate(max);
    }
    out
}

fn todo_list_item(todo: &TodoItem) -> ListItem<'static> {
    let mut spans = Vec::new();
    spans.push(Span::styled(
        if todo.completed { "[x] " } else { "[ ] " },
        Style::default().fg(if todo.completed {
            Color::LightGreen
        } else {
            Color::DarkGray
        }),
    ));
    let text_style = if todo.completed {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    };
    spans.push(Span::styled(truncate_text(&todo.text, 48), text_style));
    if let Some(due) = todo.due_date {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format_due(due),
            Style::default().fg(Color::LightYellow),
        ));
    }
    ListItem::new(Line::from(spans)).style(Style::default().fg(Color::Gray))
}

fn field_lines(label: &str, field: &FieldValue, active: bool) -> Vec<Line<'static>> {
    let label_style = Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::BOLD | Modifier::DIM);
    let value_style = Style::default().fg(if active { Color::Cyan } else { Color::White });
    let text = if active {
        field.with_caret()
    } else {
        field.value.clone()
    };
    vec![Line::from(vec![
        Span::styled(format!("{}: ", label), label_style),
        Span::styled(text, value_style),
    ])]
}

fn format_elapsed(last: Instant) -> String {
    let secs = last.elapsed().as_secs();
    if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_value_edits_around_the_cursor() {
        let mut field = FieldValue::new("milk");
        field.move_left();
        field.move_left();
        field.insert_char('!');
        assert_eq!(field.value, "mi!lk");
        field.backspace();
        assert_eq!(field.value, "milk");
        assert_eq!(field.cursor, 2);
    }

    #[test]
    fn field_value_cursor_stays_in_bounds() {
        let mut field = FieldValue::new("ab");
        field.move_right();
        assert_eq!(field.cursor, 2);
        field.move_left();
        field.move_left();
        field.move_left();
        assert_eq!(field.cursor, 0);
        field.backspace();
        assert_eq!(field.value, "ab");
    }

    #[test]
    fn parse_due_string_handles_blank_and_invalid_input() {
        assert_eq!(parse_due_string("  "), Ok(None));
        assert_eq!(
            parse_due_string("2024-03-15"),
            Ok(NaiveDate::from_ymd_opt(2024, 3, 15))
        );
        assert!(parse_due_string("03/15/2024").is_err());
    }

    #[test]
    fn truncate_text_keeps_short_strings_intact() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("a longer piece of text", 10), "a longe...");
    }

    #[test]
    fn adjust_offset_stays_within_list_bounds() {
        assert_eq!(adjust_offset(0, 0, 5, 1, 0), 0);
        assert_eq!(adjust_offset(9, 0, 5, 1, 10), 5);
        assert_eq!(adjust_offset(0, 5, 5, 1, 10), 0);
    }
}
