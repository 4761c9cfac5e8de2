//! Page rendering.
//!
//! Pure view code: every function takes the frame and a read-only borrow of
//! [`App`] and draws one page. No state changes happen here.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Wrap};
use ratatui::Frame;

use taskpad_core::task::{Difficulty, Task, TaskStatus};

use crate::app::{App, AuthField, AuthMode, DraftField, Page};

/// Capitalized difficulty label, as shown on every page.
#[must_use]
pub fn difficulty_label(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Low => "Low",
        Difficulty::Medium => "Medium",
        Difficulty::High => "High",
    }
}

/// Terminal color matching the bucket's display color.
#[must_use]
pub fn difficulty_color(difficulty: Difficulty) -> Color {
    match difficulty {
        Difficulty::High => Color::Rgb(0xef, 0x44, 0x44),
        Difficulty::Medium => Color::Rgb(0xf5, 0x9e, 0x0b),
        Difficulty::Low => Color::Rgb(0x3b, 0x82, 0xf6),
    }
}

/// Draw the current page.
pub fn render(f: &mut Frame, app: &App) {
    let [header_area, content_area, footer_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(2),
    ])
    .areas(f.area());

    render_header(f, app, header_area);

    match app.page {
        Page::Auth => render_auth(f, app, content_area),
        Page::Home => render_home(f, app, content_area),
        Page::AddTask => render_add_task(f, app, content_area),
        Page::TaskDetail => render_task_detail(f, app, content_area),
        Page::Categories => render_categories(f, app, content_area),
        Page::CategoryDetail => render_category_detail(f, app, content_area),
        Page::Statistics => render_statistics(f, app, content_area),
        Page::Profile => render_profile(f, app, content_area),
    }

    render_footer(f, app, footer_area);
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let title = match app.page {
        Page::Auth => "taskpad — sign in",
        Page::Home => "taskpad",
        Page::AddTask => "taskpad — add task",
        Page::TaskDetail => "taskpad — task",
        Page::Categories => "taskpad — difficulty",
        Page::CategoryDetail => "taskpad — difficulty",
        Page::Statistics => "taskpad — statistics",
        Page::Profile => "taskpad — profile",
    };
    let suffix = if app.loading { "  (loading…)" } else { "" };
    let header = Paragraph::new(format!("{title}{suffix}"))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(header, area);
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let hints = match app.page {
        Page::Auth => "Tab switch field · Ctrl-R sign-in/sign-up · Enter submit · Esc quit",
        Page::Home => "↑↓ select · Enter open · Space toggle · a add · c difficulty · s stats · p profile · r refresh · q quit",
        Page::AddTask => "Tab next field · ←→ difficulty · Enter save · Esc cancel",
        Page::TaskDetail => "Space toggle · d delete · Esc back",
        Page::Categories => "↑↓ select · Enter open · Esc back · q quit",
        Page::CategoryDetail => "↑↓ select · Enter open · Esc back",
        Page::Statistics | Page::Profile => "h home · c difficulty · s stats · p profile · l logout (profile) · q quit",
    };

    let mut lines = vec![Line::from(Span::styled(
        hints,
        Style::default().fg(Color::DarkGray),
    ))];
    if let Some(ref message) = app.status_line {
        lines.insert(
            0,
            Line::from(Span::styled(
                message.clone(),
                Style::default().fg(Color::Yellow),
            )),
        );
    }
    f.render_widget(Paragraph::new(lines), area);
}

// ─────────────────────────────────────────────────────────────────────────────
// Pages
// ─────────────────────────────────────────────────────────────────────────────

fn render_auth(f: &mut Frame, app: &App, area: Rect) {
    let form = &app.auth_form;
    let mode = match form.mode {
        AuthMode::SignIn => "Sign in",
        AuthMode::SignUp => "Create an account",
    };
    let masked: String = "•".repeat(form.password.chars().count());

    let mut lines = vec![
        Line::from(Span::styled(mode, Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        field_line("Email", &form.email, form.field == AuthField::Email),
        field_line("Password", &masked, form.field == AuthField::Password),
    ];
    if let Some(ref error) = form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    let block = Block::default().borders(Borders::ALL).title("Welcome");
    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

fn render_home(f: &mut Frame, app: &App, area: Rect) {
    let [counters_area, list_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);

    let counters = Line::from(vec![
        Span::styled(
            format!(" Pending: {} ", app.stats.pending),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw("  "),
        Span::styled(
            format!(" Completed: {} ", app.stats.completed),
            Style::default().fg(Color::Green),
        ),
    ]);
    f.render_widget(
        Paragraph::new(counters).block(Block::default().borders(Borders::ALL)),
        counters_area,
    );

    if app.tasks.is_empty() {
        let empty = Paragraph::new("No tasks yet. Press 'a' to add one.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title("Today"));
        f.render_widget(empty, list_area);
        return;
    }

    let items: Vec<ListItem> = app
        .tasks
        .iter()
        .enumerate()
        .map(|(i, task)| task_list_item(task, i == app.selected))
        .collect();
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Today"));
    f.render_widget(list, list_area);
}

fn render_add_task(f: &mut Frame, app: &App, area: Rect) {
    let form = &app.draft_form;
    let mut lines = vec![
        field_line("Title", &form.title, form.field == DraftField::Title),
        field_line(
            "Description",
            &form.description,
            form.field == DraftField::Description,
        ),
        field_line(
            "Deadline (YYYY-MM-DD)",
            &form.deadline,
            form.field == DraftField::Deadline,
        ),
        Line::from(vec![
            Span::styled(
                if form.field == DraftField::Difficulty { "› " } else { "  " },
                Style::default().fg(Color::Cyan),
            ),
            Span::raw("Difficulty: "),
            Span::styled(
                difficulty_label(form.difficulty),
                Style::default().fg(difficulty_color(form.difficulty)),
            ),
        ]),
    ];
    if let Some(ref error) = form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    let block = Block::default().borders(Borders::ALL).title("New task");
    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

fn render_task_detail(f: &mut Frame, app: &App, area: Rect) {
    let Some(ref task) = app.selected_task else {
        f.render_widget(Paragraph::new("No task selected."), area);
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            task.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("Description: {}", task.description)),
        Line::from(vec![
            Span::raw("Difficulty:  "),
            Span::styled(
                difficulty_label(task.difficulty),
                Style::default().fg(difficulty_color(task.difficulty)),
            ),
        ]),
        Line::from(format!("Deadline:    {}", task.deadline)),
        Line::from(format!("Status:      {}", task.status)),
    ];
    if app.confirm_delete {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Delete this task? y / n",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    }

    let block = Block::default().borders(Borders::ALL).title("Task");
    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

fn render_categories(f: &mut Frame, app: &App, area: Rect) {
    if app.stats.buckets.is_empty() {
        let empty = Paragraph::new("No tasks, so no difficulty groups yet.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title("Difficulty"));
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .stats
        .buckets
        .iter()
        .enumerate()
        .map(|(i, bucket)| {
            let marker = if i == app.selected { "› " } else { "  " };
            let noun = if bucket.count == 1 { "task" } else { "tasks" };
            ListItem::new(Line::from(vec![
                Span::styled(marker.to_string(), Style::default().fg(Color::Cyan)),
                Span::styled(
                    format!("{:<7}", difficulty_label(bucket.difficulty)),
                    Style::default().fg(difficulty_color(bucket.difficulty)),
                ),
                Span::raw(format!(" {} {noun}", bucket.count)),
            ]))
        })
        .collect();
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Difficulty"));
    f.render_widget(list, area);
}

fn render_category_detail(f: &mut Frame, app: &App, area: Rect) {
    let Some(difficulty) = app.selected_category else {
        f.render_widget(Paragraph::new("No group selected."), area);
        return;
    };

    let tasks = app.category_tasks();
    let title = format!(
        "{} — {} {}",
        difficulty_label(difficulty),
        tasks.len(),
        if tasks.len() == 1 { "task" } else { "tasks" }
    );

    let items: Vec<ListItem> = tasks
        .iter()
        .enumerate()
        .map(|(i, task)| task_list_item(task, i == app.selected))
        .collect();
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(list, area);
}

fn render_statistics(f: &mut Frame, app: &App, area: Rect) {
    let [gauge_area, status_area, buckets_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(4),
        Constraint::Min(0),
    ])
    .areas(area);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Completion"))
        .gauge_style(Style::default().fg(Color::Green))
        .percent(u16::from(app.stats.percent))
        .label(format!(
            "{}% — {} of {} done",
            app.stats.percent, app.stats.completed, app.stats.total
        ));
    f.render_widget(gauge, gauge_area);

    let status_lines = vec![
        Line::from(vec![
            Span::styled("■ ", Style::default().fg(Color::Green)),
            Span::raw(format!("Completed  {}", app.stats.completed)),
        ]),
        Line::from(vec![
            Span::styled("■ ", Style::default().fg(Color::Yellow)),
            Span::raw(format!("Pending    {}", app.stats.pending)),
        ]),
    ];
    f.render_widget(
        Paragraph::new(status_lines).block(Block::default().borders(Borders::ALL).title("Status")),
        status_area,
    );

    let bucket_lines: Vec<Line> = app
        .stats
        .buckets
        .iter()
        .map(|bucket| {
            Line::from(vec![
                Span::styled("■ ", Style::default().fg(difficulty_color(bucket.difficulty))),
                Span::raw(format!(
                    "{:<7} {}",
                    difficulty_label(bucket.difficulty),
                    bucket.count
                )),
            ])
        })
        .collect();
    f.render_widget(
        Paragraph::new(bucket_lines)
            .block(Block::default().borders(Borders::ALL).title("Difficulty")),
        buckets_area,
    );
}

fn render_profile(f: &mut Frame, app: &App, area: Rect) {
    let email = app
        .session
        .as_ref()
        .and_then(|s| s.user.email.clone())
        .unwrap_or_else(|| "—".to_string());

    let lines = vec![
        Line::from(Span::styled(
            "Signed in",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("Email:       {email}")),
        Line::from(format!("Total tasks: {}", app.stats.total)),
        Line::from(format!("Completed:   {}", app.stats.completed)),
        Line::from(""),
        Line::from(Span::styled(
            "Press 'l' to log out.",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let block = Block::default().borders(Borders::ALL).title("Profile");
    f.render_widget(Paragraph::new(lines).block(block), area);
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared pieces
// ─────────────────────────────────────────────────────────────────────────────

fn task_list_item(task: &Task, selected: bool) -> ListItem<'static> {
    let checkbox = if task.status == TaskStatus::Completed {
        "[x]"
    } else {
        "[ ]"
    };
    let marker = if selected { "› " } else { "  " };

    let title_style = if task.status == TaskStatus::Completed {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default()
    };

    ListItem::new(Line::from(vec![
        Span::styled(marker.to_string(), Style::default().fg(Color::Cyan)),
        Span::raw(format!("{checkbox} ")),
        Span::styled(task.title.clone(), title_style),
        Span::styled(
            format!("  due {}", task.deadline),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("  {}", difficulty_label(task.difficulty)),
            Style::default().fg(difficulty_color(task.difficulty)),
        ),
    ]))
}

fn field_line(label: &str, value: &str, active: bool) -> Line<'static> {
    let marker = if active { "› " } else { "  " };
    let cursor = if active { "▏" } else { "" };
    Line::from(vec![
        Span::styled(marker.to_string(), Style::default().fg(Color::Cyan)),
        Span::raw(format!("{label}: ")),
        Span::raw(format!("{value}{cursor}")),
    ])
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
