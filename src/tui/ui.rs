use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, Tabs},
    Frame,
};

use super::app::{App, CategoryStep, TaskStep};
use crate::board::Dialog;
use crate::models::{Category, ColorToken, IconToken, Priority, Task, ViewType};

/// Terminal colour for a gradient token (its start stop).
pub fn tile_color(token: ColorToken) -> Color {
    match token {
        ColorToken::Blue => Color::Rgb(59, 130, 246),
        ColorToken::Green => Color::Rgb(34, 197, 94),
        ColorToken::Purple => Color::Rgb(168, 85, 247),
        ColorToken::Orange => Color::Rgb(249, 115, 22),
        ColorToken::Pink => Color::Rgb(236, 72, 153),
        ColorToken::Cyan => Color::Rgb(6, 182, 212),
        ColorToken::Teal => Color::Rgb(20, 184, 166),
        ColorToken::Indigo => Color::Rgb(99, 102, 241),
    }
}

pub fn icon_glyph(token: IconToken) -> &'static str {
    match token {
        IconToken::Briefcase => "💼",
        IconToken::Code => "</>",
        IconToken::Calendar => "📅",
        IconToken::Clock => "⏰",
        IconToken::Palette => "🎨",
    }
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

pub fn ui(f: &mut Frame, app: &mut App) {
    if app.board.user().is_none() {
        render_sign_in(f, app);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header + view switcher
            Constraint::Min(0),    // Tiles
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);

    match app.board.expanded().and_then(|id| app.board.category(id)).cloned() {
        Some(category) => {
            let body = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(5), Constraint::Min(0)])
                .split(chunks[1]);
            render_tiles(f, app, body[0]);
            render_expanded(f, &category, body[1]);
        }
        None => render_tiles(f, app, chunks[1]),
    }

    let help_text = match app.board.dialog() {
        Dialog::None => "q: Quit | ←/→: Move | Enter: Open/Close | Tab/1-4: Grouping | a: Add Task | c: New Category | o: Sign out",
        _ if app.is_text_step() => "Enter: Next | Esc: Cancel",
        _ => "←/→: Choose | Enter: Next | Esc: Cancel",
    };
    let status = app.status.as_deref().map(|s| format!("{}  ·  ", s)).unwrap_or_default();
    let help = Paragraph::new(format!("{}{}", status, help_text))
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);

    match app.board.dialog().clone() {
        Dialog::None => {}
        Dialog::CreatingCategory => render_category_dialog(f, app),
        Dialog::AddingTask(id) => render_task_dialog(f, app, &id),
    }
}

fn render_sign_in(f: &mut Frame, app: &App) {
    let area = centered_rect(50, 9, f.area());
    let mut lines = vec![
        Line::from(Span::styled("💼  Task Manager", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("Organize your work with focus and clarity"),
        Line::from(""),
        Line::from(Span::styled(
            "[Enter] Continue with Google",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
    ];
    if let Some(status) = &app.status {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(status.clone(), Style::default().fg(Color::Yellow))));
    }
    let card = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded));
    f.render_widget(card, area);
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = ViewType::ALL
        .iter()
        .enumerate()
        .map(|(i, v)| Line::from(format!("{} {} {}", i + 1, icon_glyph(v.icon()), v.label())))
        .collect();
    let email = app.board.user().map(|u| u.display_name().to_string()).unwrap_or_default();
    let tabs = Tabs::new(titles)
        .select(app.board.view().index())
        .highlight_style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD | Modifier::REVERSED))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Tasks")
                .title(Line::from(email).alignment(Alignment::Right)),
        );
    f.render_widget(tabs, area);
}

fn render_tiles(f: &mut Frame, app: &App, area: Rect) {
    let categories = app.board.categories();
    let tile_count = categories.len() as u32 + 1;
    let constraints: Vec<Constraint> = (0..tile_count).map(|_| Constraint::Ratio(1, tile_count)).collect();
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    let expanded = app.board.expanded();
    for (i, category) in categories.iter().enumerate() {
        let is_hovered = app.board.hovered() == Some(category.id.as_str());
        let is_expanded = expanded == Some(category.id.as_str());
        let is_other_expanded = expanded.is_some() && !is_expanded;

        let color = if is_other_expanded { Color::DarkGray } else { tile_color(category.color) };
        let mut border = Style::default().fg(color);
        if is_hovered || is_expanded {
            border = border.add_modifier(Modifier::BOLD);
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(if is_hovered { BorderType::Thick } else { BorderType::Rounded })
            .border_style(border)
            .title(format!(" {} {} ", icon_glyph(category.icon), category.title));
        let body = Paragraph::new(vec![
            Line::from(Span::styled(
                category.count().to_string(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
            Line::from(format!("{} tasks", category.count())),
        ])
        .alignment(Alignment::Center)
        .block(block);
        f.render_widget(body, cells[i]);
    }

    let add_hovered = app.on_add_tile();
    let add = Paragraph::new(vec![Line::from("+"), Line::from("Add Category")])
        .alignment(Alignment::Center)
        .style(Style::default().fg(if add_hovered { Color::White } else { Color::DarkGray }))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(if add_hovered { BorderType::Thick } else { BorderType::Plain }),
        );
    f.render_widget(add, cells[categories.len()]);
}

fn tag_summary(task: &Task) -> String {
    let mut shown: Vec<String> = task.tags.iter().take(2).cloned().collect();
    if task.tags.len() > 2 {
        shown.push(format!("+{}", task.tags.len() - 2));
    }
    shown.join(" ")
}

fn render_expanded(f: &mut Frame, category: &Category, area: Rect) {
    let mut rows: Vec<Row> = category
        .tasks
        .iter()
        .map(|t| {
            Row::new(vec![
                Cell::from(t.title.clone()),
                Cell::from(t.priority.to_string()).style(Style::default().fg(priority_color(t.priority))),
                Cell::from(t.due_date.map(|d| format!("Due {}", d)).unwrap_or_default()),
                Cell::from(tag_summary(t)).style(Style::default().fg(Color::Blue)),
            ])
        })
        .collect();
    rows.push(Row::new(vec![Cell::from("+ Add Task (a)").style(Style::default().fg(Color::DarkGray))]));

    let widths = [
        Constraint::Min(20),
        Constraint::Length(8),
        Constraint::Length(16),
        Constraint::Length(28),
    ];
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["Task", "Priority", "Due", "Tags"])
                .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .bottom_margin(1),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(tile_color(category.color)))
                .title(format!(" {} {} · {} tasks ", icon_glyph(category.icon), category.title, category.count())),
        );
    f.render_widget(table, area);
}

/// One line listing every option, the chosen one highlighted.
fn choice_line<'a, T: Copy + PartialEq>(
    label: &'a str,
    options: &[T],
    current: T,
    focused: bool,
    name: impl Fn(T) -> String,
    color: impl Fn(T) -> Color,
) -> Line<'a> {
    let mut spans = vec![Span::styled(
        format!("{:<10}", label),
        if focused { Style::default().fg(Color::Yellow) } else { Style::default() },
    )];
    for option in options {
        let mut style = Style::default().fg(color(*option));
        if *option == current {
            style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
        }
        spans.push(Span::styled(format!(" {} ", name(*option)), style));
    }
    Line::from(spans)
}

fn input_line<'a>(label: &'a str, value: String, focused: bool) -> Line<'a> {
    let style = if focused { Style::default().fg(Color::Yellow) } else { Style::default() };
    let cursor = if focused { "_" } else { "" };
    Line::from(vec![
        Span::styled(format!("{:<10}", label), style),
        Span::raw(format!("{}{}", value, cursor)),
    ])
}

fn render_category_dialog(f: &mut Frame, app: &App) {
    let area = centered_rect(70, 7, f.area());
    f.render_widget(Clear, area);

    let step = app.category_step;
    let draft = &app.board.draft;
    let title = if step == CategoryStep::Title { app.input_buffer.clone() } else { draft.title.clone() };
    let lines = vec![
        input_line("Name", title, step == CategoryStep::Title),
        choice_line(
            "Color",
            &ColorToken::ALL,
            draft.color,
            step == CategoryStep::Color,
            |c| c.name().to_string(),
            tile_color,
        ),
        choice_line(
            "Icon",
            &IconToken::ALL,
            draft.icon,
            step == CategoryStep::Icon,
            |i| icon_glyph(i).to_string(),
            |_| Color::White,
        ),
    ];
    let dialog = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Create New Category"),
    );
    f.render_widget(dialog, area);
}

fn render_task_dialog(f: &mut Frame, app: &App, category_id: &str) {
    let area = centered_rect(70, 7, f.area());
    f.render_widget(Clear, area);

    let form = &app.task_form;
    let title = if form.step == TaskStep::Title { app.input_buffer.clone() } else { form.title.clone() };
    let tags = if form.step == TaskStep::Tags { app.input_buffer.clone() } else { String::new() };
    let lines = vec![
        input_line("Title", title, form.step == TaskStep::Title),
        choice_line(
            "Priority",
            &Priority::ALL,
            form.priority(),
            form.step == TaskStep::Priority,
            |p| p.to_string(),
            priority_color,
        ),
        input_line("Tags", tags, form.step == TaskStep::Tags),
    ];
    let heading = app
        .board
        .category(category_id)
        .map(|c| format!("Add a New Task · {}", c.title))
        .unwrap_or_else(|| "Add a New Task".to_string());
    let dialog = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(heading));
    f.render_widget(dialog, area);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let height = height.min(r.height);
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((r.height - height) / 2),
            Constraint::Length(height),
            Constraint::Length((r.height - height) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::models::User;
    use ratatui::{backend::TestBackend, Terminal};

    fn rendered(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| ui(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn signed_out_shows_only_sign_in() {
        let mut app = App::new(Board::new());
        let screen = rendered(&mut app);
        assert!(screen.contains("Continue with Google"));
        assert!(!screen.contains("Work Projects"));
    }

    #[test]
    fn signed_in_shows_tiles_and_email() {
        let mut app = App::new(Board::new());
        app.board.set_user(Some(User { id: "u1".into(), email: Some("dev@example.com".into()) }));
        let screen = rendered(&mut app);
        assert!(screen.contains("Work Projects"));
        assert!(screen.contains("dev@example.com"));
        assert!(screen.contains("Add Category"));
    }
}
