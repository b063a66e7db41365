use std::sync::OnceLock;
use std::time::Instant;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell as TableCell, Paragraph, Row, Table, Wrap};
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;

use crate::messages::EntryKind;
use crate::model::SnapshotOrigin;
use crate::session::LifecycleState;

use super::App;

const PROMPT: &str = ">";

pub(super) fn draw(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Percentage(50),
            Constraint::Min(4),
            Constraint::Length(2),
        ])
        .split(area);

    draw_header(frame, app, chunks[0]);
    draw_table(frame, app, chunks[1]);
    draw_log(frame, app, chunks[2]);
    draw_input(frame, app, chunks[3]);
}

fn lifecycle_color(state: LifecycleState) -> Color {
    match state {
        LifecycleState::Idle => Color::Gray,
        LifecycleState::Starting | LifecycleState::Uploading => Color::Yellow,
        LifecycleState::Active | LifecycleState::Ready => Color::Green,
        LifecycleState::Error => Color::Red,
    }
}

fn draw_header(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let engine = &app.engine;
    let state = engine.lifecycle();
    let mut spans = vec![
        Span::styled(
            "voicesheet",
            Style::default().fg(Color::Black).bg(Color::White),
        ),
        Span::raw("  "),
        Span::styled(state.as_str(), Style::default().fg(lifecycle_color(state))),
        Span::raw("  "),
        Span::raw(
            engine
                .session_id()
                .map(|id| format!("session={}", id))
                .unwrap_or_else(|| "(no session)".to_string()),
        ),
        Span::raw("  "),
        Span::styled(
            engine.config().session_url().to_string(),
            Style::default().fg(Color::Gray),
        ),
    ];
    let busy = app.busy();
    if busy > 0 {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("working ({})", busy),
            Style::default().fg(Color::Yellow),
        ));
    }
    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, area);
}

fn draw_table(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let Some(snapshot) = app.engine.snapshot() else {
        frame.render_widget(
            Paragraph::new("(no table)").block(Block::default().borders(Borders::ALL)),
            area,
        );
        return;
    };

    let title = match snapshot.origin {
        SnapshotOrigin::LocalPreview => "Table (preview)",
        SnapshotOrigin::ServerConfirmed => "Table",
    };
    let labels = snapshot.header_labels();
    let keys = labels
        .iter()
        .map(|l| l.trim().to_lowercase())
        .collect::<Vec<_>>();
    let now = Instant::now();

    let header = Row::new(labels.iter().map(|l| TableCell::from(l.as_str())))
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows = (0..snapshot.rows.len()).map(|r| {
        let cells = snapshot
            .render_row(r)
            .into_iter()
            .enumerate()
            .map(|(c, text)| {
                let mut cell = TableCell::from(text);
                if app.engine.is_highlighted(r, &keys[c], now) {
                    cell = cell.style(Style::default().fg(Color::Black).bg(Color::Yellow));
                }
                cell
            })
            .collect::<Vec<_>>();
        Row::new(cells)
    });

    let width = snapshot.width().max(1);
    let widths = (0..width).map(|_| Constraint::Ratio(1, width as u32));
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(table, area);
}

fn ts_ui_format() -> &'static [BorrowedFormatItem<'static>] {
    static FMT: OnceLock<Vec<BorrowedFormatItem<'static>>> = OnceLock::new();
    FMT.get_or_init(|| {
        time::format_description::parse("[hour padding:zero]:[minute padding:zero]:[second padding:zero]")
            .expect("valid time format")
    })
}

fn fmt_ts_ui(ts: &str) -> String {
    OffsetDateTime::parse(ts, &Rfc3339)
        .ok()
        .and_then(|dt| dt.format(ts_ui_format()).ok())
        .unwrap_or_else(|| ts.to_string())
}

fn draw_log(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let entries = app.engine.log_entries();
    let visible = area.height.saturating_sub(1) as usize;
    let end = entries.len().saturating_sub(app.log_scroll);
    let start = end.saturating_sub(visible);

    let lines = entries[start..end]
        .iter()
        .map(|e| {
            let (marker, style) = match e.kind {
                EntryKind::User => ("> ", Style::default().fg(Color::Cyan)),
                EntryKind::Info => ("  ", Style::default().fg(Color::White)),
                EntryKind::Success => ("✓ ", Style::default().fg(Color::Green)),
                EntryKind::Error => ("✗ ", Style::default().fg(Color::Red)),
            };
            Line::from(vec![
                Span::styled(
                    format!("{} ", fmt_ts_ui(&e.ts)),
                    Style::default().fg(Color::Gray),
                ),
                Span::styled(marker, style),
                Span::styled(e.text.as_str(), style),
            ])
        })
        .collect::<Vec<_>>();

    let title = if app.log_scroll > 0 {
        format!("Messages (-{})", app.log_scroll)
    } else {
        "Messages".to_string()
    };
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::TOP).title(title)),
        area,
    );
}

fn draw_input(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let buf = &app.input.buf;
    let mut spans = vec![
        Span::styled(PROMPT, Style::default().fg(Color::Cyan)),
        Span::raw(" "),
        Span::raw(buf.as_str()),
    ];
    if buf.is_empty() {
        spans.push(Span::styled(
            "type a command, or /help",
            Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
        ));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::TOP)),
        area,
    );

    let x = PROMPT.len() as u16 + 1 + app.input.cursor as u16;
    frame.set_cursor_position((area.x + x, area.y + 1));
}
