//! Terminal UI rendering for the datapipe dashboard.
//!
//! Minimal chrome: whitespace and position carry the structure, colour is
//! reserved for task and log status. A sidebar lists the views and hosts the
//! insights panel; the main area shows the active view.
//!
//! This module renders from RenderState (immutable snapshot) - it never
//! mutates application state.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph, Sparkline, Wrap},
    Frame,
};

use crate::core::schema::SchemaTable;
use crate::core::task::{TaskCategory, TaskStatus};
use crate::pipeline::{RunOutcome, Severity};
use crate::render::{LogLineView, RenderState, TaskView};
use crate::tea::{Notification, NotificationLevel, View};

const COLOR_TEXT_DIMMED: Color = Color::Gray;
const COLOR_TEXT_MUTED: Color = Color::DarkGray;
const COLOR_SEPARATOR: Color = Color::White;
const COLOR_ACCENT: Color = Color::Cyan;

const COLOR_STATUS_IDLE: Color = Color::DarkGray;
const COLOR_STATUS_RUNNING: Color = Color::Yellow;
const COLOR_STATUS_SUCCESS: Color = Color::Green;
const COLOR_STATUS_FAILED: Color = Color::Red;
const COLOR_STATUS_SKIPPED: Color = Color::Gray;

const SIDEBAR_WIDTH: u16 = 32;
const LOG_INDEX_WIDTH: usize = 3;

// -----------------------------------------------------------------------------
// Context-sensitive keymap
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeymapContext {
    pub view: View,
    pub is_running: bool,
    pub insights_loading: bool,
}

impl KeymapContext {
    pub fn from_render_state(state: &RenderState) -> Self {
        Self {
            view: state.view,
            is_running: state.is_running,
            insights_loading: state.insights_loading,
        }
    }
}

struct Keybinding(&'static str, &'static str);

/// Related keybindings, separated by │ when drawn.
struct KeybindingGroup(Vec<Keybinding>);

fn keybindings_for_context(ctx: KeymapContext) -> Vec<KeybindingGroup> {
    let mut actions = Vec::new();
    if !ctx.is_running {
        actions.push(Keybinding("r", "run"));
    }
    if !ctx.insights_loading {
        actions.push(Keybinding("i", "insights"));
    }
    actions.push(Keybinding("c", "clear logs"));

    let mut groups = vec![
        KeybindingGroup(vec![Keybinding("1-3", "view"), Keybinding("Tab", "next")]),
        KeybindingGroup(actions),
    ];
    if ctx.view == View::Orchestration {
        groups.push(KeybindingGroup(vec![Keybinding("j/k", "select")]));
    }
    groups.push(KeybindingGroup(vec![Keybinding("q", "quit")]));
    groups
}

/// Main render function - entry point for all UI drawing.
pub fn draw(frame: &mut Frame, state: &RenderState) {
    let area = frame.area();
    let [sidebar, main] =
        Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Fill(1)]).areas(area);

    render_sidebar(frame, state, sidebar);
    render_main(frame, state, main);

    if let Some(ref notification) = state.notification {
        render_notification(frame, notification, area);
    }
}

// -----------------------------------------------------------------------------
// Sidebar
// -----------------------------------------------------------------------------

fn render_sidebar(frame: &mut Frame, state: &RenderState, area: Rect) {
    let inner = Rect {
        width: area.width.saturating_sub(2),
        ..area
    };
    let nav_height = View::ALL.len() as u16 + 2;
    let [nav, insights] =
        Layout::vertical([Constraint::Length(nav_height), Constraint::Fill(1)]).areas(inner);

    let mut lines = vec![
        Line::from(Span::styled(
            "DATAPIPE",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::default(),
    ];
    for view in View::ALL {
        let label = format!("{} {}", view.index() + 1, view.label());
        let style = if view == state.view {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default().fg(COLOR_TEXT_DIMMED)
        };
        lines.push(Line::from(Span::styled(label, style)));
    }
    frame.render_widget(Paragraph::new(lines), nav);

    render_insights(frame, state, insights);
}

fn render_insights(frame: &mut Frame, state: &RenderState, area: Rect) {
    let mut lines = vec![
        Line::default(),
        Line::from(Span::styled(
            "AI INSIGHTS",
            Style::default()
                .fg(COLOR_TEXT_DIMMED)
                .add_modifier(Modifier::BOLD),
        )),
        Line::default(),
    ];
    if state.insights_loading {
        lines.push(Line::from(Span::styled(
            "Thinking...",
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::ITALIC),
        )));
    } else {
        lines.extend(state.insight.lines().map(|l| Line::from(l.to_string())));
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}

// -----------------------------------------------------------------------------
// Main area
// -----------------------------------------------------------------------------

fn render_main(frame: &mut Frame, state: &RenderState, area: Rect) {
    if area.height < 4 {
        render_header(frame, state, area);
        return;
    }

    let [header, separator, body, statusbar] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, state, header);
    render_separator(frame, separator);
    match state.view {
        View::Orchestration => render_orchestration(frame, state, body),
        View::Analytics => render_analytics(frame, state, body),
        View::Schema => render_schema(frame, state, body),
    }
    render_statusbar(frame, state, statusbar);
}

/// View title on the left, run badge on the right.
fn render_header(frame: &mut Frame, state: &RenderState, area: Rect) {
    let title = Span::styled(
        state.view.label().to_uppercase(),
        Style::default().add_modifier(Modifier::BOLD),
    );
    let (badge, badge_style) = run_badge(state.is_running, state.last_outcome);

    let used = title.content.chars().count() + badge.chars().count();
    let spacer = (area.width as usize).saturating_sub(used);
    let line = Line::from(vec![
        title,
        Span::raw(" ".repeat(spacer)),
        Span::styled(badge, badge_style),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn run_badge(is_running: bool, last_outcome: Option<RunOutcome>) -> (String, Style) {
    if is_running {
        return (
            " RUNNING... ".to_string(),
            Style::default().fg(Color::Black).bg(COLOR_STATUS_RUNNING),
        );
    }
    let label = match last_outcome {
        Some(outcome) => format!(" {} │ EXECUTE PIPELINE [r] ", outcome),
        None => " EXECUTE PIPELINE [r] ".to_string(),
    };
    (label, Style::default().add_modifier(Modifier::REVERSED))
}

fn render_separator(frame: &mut Frame, area: Rect) {
    let solid = "─".repeat(area.width as usize);
    let line = Line::from(Span::styled(solid, Style::default().fg(COLOR_SEPARATOR)));
    frame.render_widget(Paragraph::new(line), area);
}

/// Bottom line: "?" alone, or "? │ <keymap>" when expanded.
fn render_statusbar(frame: &mut Frame, state: &RenderState, area: Rect) {
    frame.render_widget(Paragraph::new(render_keymap_line(state)), area);
}

fn render_keymap_line(state: &RenderState) -> Line<'static> {
    let groups = keybindings_for_context(KeymapContext::from_render_state(state));

    let key_style = Style::default().fg(COLOR_TEXT_DIMMED);
    let desc_style = Style::default().fg(COLOR_TEXT_MUTED);
    let sep_style = Style::default().fg(COLOR_TEXT_MUTED);
    let help_style = if state.show_keymap {
        Style::default()
    } else {
        Style::default().fg(COLOR_TEXT_MUTED)
    };

    let mut spans: Vec<Span> = vec![Span::styled("?", help_style)];
    if state.show_keymap {
        for group in groups.iter().filter(|g| !g.0.is_empty()) {
            spans.push(Span::styled(" │ ", sep_style));
            for (idx, keybinding) in group.0.iter().enumerate() {
                if idx > 0 {
                    spans.push(Span::styled(" • ", sep_style));
                }
                spans.push(Span::styled(keybinding.0, key_style));
                spans.push(Span::styled(format!(" {}", keybinding.1), desc_style));
            }
        }
    }
    Line::from(spans)
}

// -----------------------------------------------------------------------------
// Orchestration view
// -----------------------------------------------------------------------------

fn render_orchestration(frame: &mut Frame, state: &RenderState, area: Rect) {
    let rows = TaskCategory::ALL
        .iter()
        .map(|c| state.tasks_in(*c).count())
        .max()
        .unwrap_or(0) as u16;
    let graph_height = (rows * 2 + 1).min(area.height / 2);

    let [graph, detail, _, logs] = Layout::vertical([
        Constraint::Length(graph_height),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(area);

    let columns = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(graph);
    for (category, column) in TaskCategory::ALL.iter().zip(columns.iter()) {
        render_category_column(frame, state, *category, *column);
    }

    frame.render_widget(Paragraph::new(detail_line(state.selected_task())), detail);
    render_logs(frame, &state.logs, logs);
}

fn render_category_column(frame: &mut Frame, state: &RenderState, category: TaskCategory, area: Rect) {
    let width = area.width.saturating_sub(2) as usize;
    let mut lines = vec![Line::from(Span::styled(
        category.label().to_uppercase(),
        Style::default()
            .fg(COLOR_TEXT_DIMMED)
            .add_modifier(Modifier::BOLD),
    ))];

    for (idx, task) in state.tasks_in(category) {
        let selected = idx == state.selected;
        let name_style = if selected {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        let color = status_color(task.status);
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", status_icon(task.status)), Style::default().fg(color)),
            Span::styled(truncate(&task.name, width.saturating_sub(2)), name_style),
        ]));

        let mut meta = format!("  {}", task.status);
        if let Some(elapsed) = task.elapsed {
            meta.push_str(&format!(" {}", format_elapsed(elapsed)));
        }
        lines.push(Line::from(Span::styled(
            truncate(&meta, width),
            Style::default().fg(COLOR_TEXT_MUTED),
        )));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn detail_line(task: Option<&TaskView>) -> Line<'static> {
    let Some(task) = task else {
        return Line::default();
    };
    let deps = if task.dependencies.is_empty() {
        "none".to_string()
    } else {
        task.dependencies.join(", ")
    };
    Line::from(vec![
        Span::styled(task.id.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("  {}  ", task.category.label()),
            Style::default().fg(COLOR_TEXT_DIMMED),
        ),
        Span::styled("depends on: ", Style::default().fg(COLOR_TEXT_MUTED)),
        Span::styled(deps, Style::default().fg(COLOR_TEXT_DIMMED)),
    ])
}

/// Log panel, pinned to the tail.
fn render_logs(frame: &mut Frame, logs: &[LogLineView], area: Rect) {
    let header = Line::from(Span::styled(
        "EXECUTION LOGS",
        Style::default()
            .fg(COLOR_TEXT_DIMMED)
            .add_modifier(Modifier::BOLD),
    ));
    let visible = (area.height as usize).saturating_sub(1);
    let start = logs.len().saturating_sub(visible);

    let mut lines = Vec::with_capacity(visible + 1);
    lines.push(header);
    lines.extend(logs[start..].iter().map(log_line));
    frame.render_widget(Paragraph::new(lines), area);
}

fn log_line(log: &LogLineView) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("[{:0width$}] ", log.index, width = LOG_INDEX_WIDTH),
            Style::default().fg(COLOR_TEXT_MUTED),
        ),
        Span::styled(log.text.clone(), severity_style(log.severity)),
    ])
}

fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::Error => Style::default().fg(COLOR_STATUS_FAILED),
        Severity::Highlight => Style::default().fg(COLOR_STATUS_SUCCESS),
        Severity::Plain => Style::default().fg(COLOR_TEXT_DIMMED),
    }
}

fn status_icon(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Idle => "○",
        TaskStatus::Running => "◐",
        TaskStatus::Success => "●",
        TaskStatus::Failed => "✕",
        TaskStatus::Skipped => "–",
    }
}

fn status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Idle => COLOR_STATUS_IDLE,
        TaskStatus::Running => COLOR_STATUS_RUNNING,
        TaskStatus::Success => COLOR_STATUS_SUCCESS,
        TaskStatus::Failed => COLOR_STATUS_FAILED,
        TaskStatus::Skipped => COLOR_STATUS_SKIPPED,
    }
}

// -----------------------------------------------------------------------------
// Analytics view
// -----------------------------------------------------------------------------

fn render_analytics(frame: &mut Frame, state: &RenderState, area: Rect) {
    let [cards, throughput, latency] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Fill(1),
    ])
    .areas(area);

    let summary = &state.summary;
    let stat_cards = [
        ("AVG THROUGHPUT", format!("{:.0} rec/s", summary.mean_throughput)),
        ("PEAK THROUGHPUT", format!("{:.0} rec/s", summary.peak_throughput)),
        ("AVG LATENCY", format!("{:.1} ms", summary.mean_latency)),
        ("ERRORS", summary.total_errors.to_string()),
    ];
    let columns = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(cards);
    for ((label, value), column) in stat_cards.into_iter().zip(columns.iter()) {
        let lines = vec![
            Line::from(Span::styled(label, Style::default().fg(COLOR_TEXT_MUTED))),
            Line::from(Span::styled(
                value,
                Style::default().add_modifier(Modifier::BOLD),
            )),
        ];
        frame.render_widget(Paragraph::new(lines), *column);
    }

    render_series(frame, "THROUGHPUT (records/s)", &state.throughput, COLOR_ACCENT, throughput);
    render_series(frame, "LATENCY (ms)", &state.latency, COLOR_STATUS_RUNNING, latency);
}

fn render_series(frame: &mut Frame, title: &str, data: &[u64], color: Color, area: Rect) {
    let [label, chart] =
        Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(area);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            title.to_string(),
            Style::default().fg(COLOR_TEXT_DIMMED),
        ))),
        label,
    );
    frame.render_widget(Sparkline::default().data(data).style(Style::default().fg(color)), chart);
}

// -----------------------------------------------------------------------------
// Schema view
// -----------------------------------------------------------------------------

fn render_schema(frame: &mut Frame, state: &RenderState, area: Rect) {
    if state.schema.is_empty() {
        return;
    }
    let n = state.schema.len() as u32;
    let constraints = vec![Constraint::Ratio(1, n); state.schema.len()];
    let columns = Layout::horizontal(constraints).split(area);
    for (table, column) in state.schema.iter().zip(columns.iter()) {
        frame.render_widget(Paragraph::new(schema_lines(table)), *column);
    }
}

fn schema_lines(table: &SchemaTable) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            table.name,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            table.kind.label().to_string(),
            Style::default().fg(COLOR_ACCENT),
        )),
        Line::default(),
    ];
    for column in &table.columns {
        let key = column.key.map(|k| k.label()).unwrap_or("");
        lines.push(Line::from(vec![
            Span::styled(format!("{:<3}", key), Style::default().fg(COLOR_STATUS_RUNNING)),
            Span::raw(format!("{:<14}", column.name)),
            Span::styled(column.ty, Style::default().fg(COLOR_TEXT_MUTED)),
        ]));
    }
    lines
}

// -----------------------------------------------------------------------------
// Notification
// -----------------------------------------------------------------------------

/// Single-line notification on the bottom row of the screen.
fn render_notification(frame: &mut Frame, notification: &Notification, area: Rect) {
    let notification_area = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };

    frame.render_widget(Clear, notification_area);

    let line = match notification.level {
        NotificationLevel::Error => Line::from(vec![
            Span::styled(
                "Error: ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                notification.message.clone(),
                Style::default().fg(Color::Red),
            ),
        ]),
        NotificationLevel::Info => Line::from(Span::styled(
            notification.message.clone(),
            Style::default().fg(Color::Green),
        )),
    };

    frame.render_widget(Paragraph::new(line), notification_area);
}

// Helper functions

/// `1.5s` under a minute, `2m05s` above.
fn format_elapsed(elapsed: chrono::Duration) -> String {
    let millis = elapsed.num_milliseconds().max(0);
    if millis < 60_000 {
        format!("{:.1}s", millis as f64 / 1000.0)
    } else {
        let secs = millis / 1000;
        format!("{}m{:02}s", secs / 60, secs % 60)
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 1).collect();
        format!("{}~", truncated)
    }
}
