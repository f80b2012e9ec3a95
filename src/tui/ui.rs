use ratatui::prelude::*;
use ratatui::widgets::{Block, Cell, Clear, List, ListItem, Paragraph, Row, Table, Tabs, Wrap};

use crate::output::{
    delta_bar_cells, format_delta, format_points, format_score, max_abs_delta, MAX_CHART_HALF,
};
use crate::tui::app::{App, InputMode, Pane};
use crate::tui::theme::ThemeColors;

const CALENDAR_WIDTH: u16 = 36;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Handle very small terminal sizes gracefully
    if area.height < 10 || area.width < 60 {
        let msg = Paragraph::new("Terminal too small")
            .alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    // Layout: Title(1) + Body(fill) + Status(1)
    let chunks = Layout::vertical([
        Constraint::Length(1),  // Title bar
        Constraint::Fill(1),    // Calendar | Results
        Constraint::Length(1),  // Status bar
    ])
    .split(area);

    let body = Layout::horizontal([
        Constraint::Length(CALENDAR_WIDTH),
        Constraint::Fill(1),
    ])
    .split(chunks[1]);

    render_title(frame, chunks[0], app);
    render_calendar_pane(frame, body[0], app);
    render_results_pane(frame, body[1], app);
    render_status_bar(frame, chunks[2], app);

    // Render overlays based on input mode
    match app.input_mode {
        InputMode::Help => render_help_popup(frame, &app.colors),
        InputMode::ScoreBreakdown => render_score_breakdown(frame, app),
        InputMode::Comparison => render_comparison_popup(frame, app),
        InputMode::Normal => {}
    }

    // Loading overlay goes on top of everything
    if let Some(request) = &app.pending {
        render_loading_overlay(frame, &request.label(), &app.colors);
    }
}

fn pane_block<'a>(title: String, focused: bool, colors: &ThemeColors) -> Block<'a> {
    let border = if focused { colors.focus_border } else { colors.divider_color };
    Block::bordered()
        .title(title)
        .border_style(Style::default().fg(border))
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let colors = &app.colors;
    let mut spans = vec![Span::styled("Paddock", Style::default().fg(colors.title_color).bold())];

    let right = format!("{} | {}", app.strategy.display_name(), app.session);
    let padding_len = (area.width as usize).saturating_sub("Paddock".len() + right.len());
    spans.push(Span::raw(" ".repeat(padding_len)));
    spans.push(Span::styled(right, Style::default().fg(colors.muted)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_calendar_pane(frame: &mut Frame, area: Rect, app: &mut App) {
    let block = pane_block(" Calendar ".to_string(), app.focus == Pane::Calendar, &app.colors);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::vertical([
        Constraint::Length(1),  // Season tabs
        Constraint::Length(1),  // Spacer
        Constraint::Fill(1),    // Round list
    ])
    .split(inner);

    let titles: Vec<String> = app.seasons.iter().map(|s| s.to_string()).collect();
    let tabs = Tabs::new(titles)
        .select(app.season_index)
        .style(app.colors.tab_inactive_style)
        .highlight_style(app.colors.tab_active_style.reversed())
        .divider(" | ");
    frame.render_widget(tabs, chunks[0]);

    if let Some(err) = &app.calendar_error {
        let lines = vec![
            Line::from(Span::styled(
                "Calendar unavailable",
                Style::default().fg(app.colors.warning).bold(),
            )),
            Line::from(""),
            Line::from(err.clone()),
            Line::from(""),
            Line::from(Span::styled(
                "Event selection is disabled. Pick another season with h/l.",
                Style::default().fg(app.colors.muted),
            )),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), chunks[2]);
        return;
    }

    if app.calendar.is_empty() {
        let msg = if app.pending.is_some() { "" } else { "No rounds found" };
        frame.render_widget(
            Paragraph::new(msg).style(Style::default().fg(app.colors.muted)),
            chunks[2],
        );
        return;
    }

    let items: Vec<ListItem> = app
        .calendar
        .iter()
        .map(|event| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("R{:02} ", event.round),
                    Style::default().fg(app.colors.index_color),
                ),
                Span::raw(event.event_name.clone()),
            ]))
        })
        .collect();

    let list = List::new(items).highlight_style(app.colors.row_selected);
    frame.render_stateful_widget(list, chunks[2], &mut app.calendar_state);
}

fn render_results_pane(frame: &mut Frame, area: Rect, app: &mut App) {
    let focused = app.focus == Pane::Results;
    let title = match &app.analysis {
        Some(a) => format!(" {} {} ({}) ", a.event.event_name, a.event.season, a.session),
        None => " Results ".to_string(),
    };
    let block = pane_block(title, focused, &app.colors);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(err) = &app.analysis_error {
        let lines = vec![
            Line::from(Span::styled(
                "Analysis failed",
                Style::default().fg(app.colors.flash_error).bold(),
            )),
            Line::from(""),
            Line::from(err.clone()),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
        return;
    }

    let Some(analysis) = &app.analysis else {
        let msg = Paragraph::new("Select an event and press Enter")
            .alignment(Alignment::Center)
            .style(Style::default().fg(app.colors.muted));
        frame.render_widget(msg, inner);
        return;
    };

    let chart_height = (analysis.rows.len() as u16 + 1).min(inner.height / 2);
    let chunks = Layout::vertical([
        Constraint::Fill(1),                // Results table
        Constraint::Length(chart_height),   // Delta chart
        Constraint::Length(1),              // Best performer
    ])
    .split(inner);

    let chart = delta_chart_lines(app, chunks[1].width as usize);
    let best = best_line(app);

    let table = results_table(app);
    frame.render_stateful_widget(table, chunks[0], &mut app.results_state);
    frame.render_widget(Paragraph::new(chart), chunks[1]);
    frame.render_widget(Paragraph::new(best), chunks[2]);
}

fn results_table(app: &App) -> Table<'static> {
    let colors = &app.colors;
    let best_name = app.analysis.as_ref().map(|a| a.best.row.full_name.clone());

    let rows: Vec<Row> = app
        .result_rows()
        .iter()
        .enumerate()
        .map(|(idx, scored)| {
            let row = &scored.row;
            let is_best = best_name.as_deref() == Some(row.full_name.as_str());
            let code_style = if is_best {
                Style::default().fg(colors.best_color).bold()
            } else {
                Style::default()
            };

            // Alternating row background (odd rows get subtle background)
            let row_style = if idx % 2 == 1 {
                Style::default().bg(colors.row_alt_bg)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(app.pick_marker(&row.full_name))
                    .style(Style::default().fg(colors.pick_color).bold()),
                Cell::from(format!("{}.", row.finish_position))
                    .style(Style::default().fg(colors.index_color)),
                Cell::from(row.abbreviation.clone()).style(code_style),
                Cell::from(row.full_name.clone()),
                Cell::from(row.team_name.clone()).style(Style::default().fg(colors.muted)),
                Cell::from(format!("{:>4}", row.grid_position)),
                Cell::from(format!("{:>4}", format_points(row.points))),
                Cell::from(format!("{:>4}", format_delta(row.position_delta)))
                    .style(Style::default().fg(colors.delta_color(row.position_delta))),
                Cell::from(format!("{:>6}", format_score(scored.score.score))),
            ])
            .style(row_style)
        })
        .collect();

    let widths = [
        Constraint::Length(2),   // Pick marker
        Constraint::Length(4),   // Finish: "20."
        Constraint::Length(4),   // Code
        Constraint::Fill(2),     // Driver
        Constraint::Fill(1),     // Team
        Constraint::Length(4),   // Grid
        Constraint::Length(4),   // Points
        Constraint::Length(4),   // Delta
        Constraint::Length(6),   // Score
    ];

    Table::new(rows, widths)
        .header(
            Row::new(vec!["", "Pos", "Code", "Driver", "Team", "Grid", " Pts", " +/-", " Score"])
                .style(colors.header_style)
                .bottom_margin(1),
        )
        .row_highlight_style(colors.row_selected)
}

fn delta_chart_lines(app: &App, width: usize) -> Vec<Line<'static>> {
    let colors = &app.colors;
    let rows = app.result_rows();
    let max_abs = max_abs_delta(rows);
    // Code column 5 + axis 1 + value column 4
    let half = (width.saturating_sub(10) / 2).clamp(1, MAX_CHART_HALF);

    let mut lines = vec![Line::from(Span::styled(
        "Positions gained / lost",
        Style::default().fg(colors.muted),
    ))];

    for scored in rows {
        let delta = scored.row.position_delta;
        let (loss, gain) = delta_bar_cells(delta, max_abs, half);
        lines.push(Line::from(vec![
            Span::raw(format!("{:<5}", scored.row.abbreviation)),
            Span::raw(" ".repeat(half - loss)),
            Span::styled("█".repeat(loss), Style::default().fg(colors.loss)),
            Span::styled("│", Style::default().fg(colors.divider_color)),
            Span::styled("█".repeat(gain), Style::default().fg(colors.gain)),
            Span::raw(" ".repeat(half - gain)),
            Span::styled(
                format!("{:>4}", format_delta(delta)),
                Style::default().fg(colors.delta_color(delta)),
            ),
        ]));
    }

    lines
}

fn best_line(app: &App) -> Line<'static> {
    let colors = &app.colors;
    let Some(analysis) = &app.analysis else {
        return Line::from("");
    };

    let mut spans = vec![
        Span::styled("Best performer: ", Style::default().fg(colors.muted)),
        Span::styled(
            analysis.best.row.full_name.clone(),
            Style::default().fg(colors.best_color).bold(),
        ),
        Span::raw(format!(
            "  {} {}",
            analysis.strategy.display_name(),
            format_score(analysis.best.score.score)
        )),
    ];
    if analysis.dropped > 0 {
        spans.push(Span::styled(
            format!("  ({} unclassified left out)", analysis.dropped),
            Style::default().fg(colors.muted),
        ));
    }
    Line::from(spans)
}

fn flash_is_error(msg: &str) -> bool {
    msg.starts_with("Failed")
        || msg.starts_with("Error")
        || msg.starts_with("Event selection disabled")
        || msg.starts_with("Mark two")
        || msg.starts_with("Run an analysis")
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let colors = &app.colors;
    let text = if let Some((ref msg, _)) = app.flash_message {
        let msg_color = if flash_is_error(msg) {
            colors.flash_error
        } else {
            colors.flash_success
        };
        Line::from(Span::styled(msg.clone(), Style::default().fg(msg_color)))
    } else {
        let hints = match app.focus {
            Pane::Calendar => vec![
                ("h", "/", "l", ":season "),
                ("j", "/", "k", ":nav "),
                ("Enter", "", "", ":analyze "),
                ("t", "", "", ":race/sprint "),
                ("Tab", "", "", ":results "),
                ("?", "", "", ":help "),
                ("q", "", "", ":quit"),
            ],
            Pane::Results => vec![
                ("j", "/", "k", ":nav "),
                ("1", "/", "2", ":pick "),
                ("c", "", "", ":compare "),
                ("s", "", "", ":strategy "),
                ("b", "", "", ":breakdown "),
                ("o", "", "", ":report "),
                ("Tab", "", "", ":calendar "),
                ("q", "", "", ":quit"),
            ],
        };

        let mut spans = Vec::new();
        for (i, (key1, sep, key2, label)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(*key1, Style::default().fg(colors.status_key_color)));
            if !sep.is_empty() {
                spans.push(Span::raw(*sep));
                spans.push(Span::styled(*key2, Style::default().fg(colors.status_key_color)));
            }
            spans.push(Span::raw(*label));
        }
        Line::from(spans)
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().bg(colors.status_bar_bg)),
        area
    );
}

/// Create a centered rectangle with fixed width and height
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    // Clamp dimensions to area bounds
    let width = width.min(area.width);
    let height = height.min(area.height);

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect {
        x,
        y,
        width,
        height,
    }
}

fn popup_block<'a>(title: &'a str, colors: &ThemeColors) -> Block<'a> {
    Block::bordered()
        .title(Span::styled(title, colors.popup_title))
        .border_style(Style::default().fg(colors.popup_border))
        .style(Style::default().bg(colors.popup_bg))
}

fn render_help_popup(frame: &mut Frame, colors: &ThemeColors) {
    let popup_area = centered_rect_fixed(52, 19, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = popup_block(" Keyboard Shortcuts ", colors);
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let keys = [
        ("h / l, ← / →  ", "Previous / next season"),
        ("j / k         ", "Move down / up"),
        ("Tab           ", "Switch calendar / results"),
        ("Enter         ", "Analyze selected event"),
        ("t             ", "Toggle race / sprint"),
        ("s             ", "Toggle scoring strategy"),
        ("1 / 2         ", "Mark driver A / B"),
        ("c             ", "Head-to-head of A and B"),
        ("b             ", "Score breakdown"),
        ("o             ", "Open race report"),
        ("?             ", "Show/hide this help"),
        ("q / Ctrl-c    ", "Quit"),
    ];

    let mut help_lines: Vec<Line> = keys
        .iter()
        .map(|(key, action)| {
            Line::from(vec![
                Span::styled(*key, Style::default().fg(colors.status_key_color).bold()),
                Span::raw(*action),
            ])
        })
        .collect();
    help_lines.push(Line::from(""));
    help_lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().fg(colors.muted),
    )));

    frame.render_widget(Paragraph::new(help_lines), inner);
}

fn render_score_breakdown(frame: &mut Frame, app: &App) {
    let Some(scored) = app.selected_result() else {
        return;
    };
    let colors = &app.colors;

    let popup_area = centered_rect_fixed(56, 10, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = popup_block(" Score Breakdown ", colors);
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let mut lines = vec![
        Line::from(vec![
            Span::styled(scored.row.full_name.clone(), Style::default().bold()),
            Span::styled(
                format!("  {}", scored.score.breakdown.strategy.display_name()),
                Style::default().fg(colors.muted),
            ),
        ]),
        Line::from(""),
    ];
    for factor in &scored.score.breakdown.factors {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<16}", factor.label), Style::default().fg(colors.status_key_color)),
            Span::raw(factor.description.clone()),
        ]));
        lines.push(Line::from(Span::styled(
            format!(
                "{:16}{} -> {}",
                "",
                format_score(factor.before),
                format_score(factor.after)
            ),
            Style::default().fg(colors.muted),
        )));
    }
    lines.push(Line::from(vec![
        Span::styled(format!("{:<16}", "Total"), Style::default().bold()),
        Span::styled(format_score(scored.score.score), Style::default().fg(colors.best_color).bold()),
    ]));

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_comparison_popup(frame: &mut Frame, app: &App) {
    let Some(h2h) = &app.comparison else {
        return;
    };
    let colors = &app.colors;

    let popup_area = centered_rect_fixed(64, 9, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = popup_block(" Head to Head ", colors);
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let chunks = Layout::vertical([
        Constraint::Length(4),  // Table with header
        Constraint::Length(1),  // Verdict
        Constraint::Length(1),  // Dismiss hint
    ])
    .split(inner);

    let winner = h2h.winner().map(|w| w.row.full_name.clone());
    let rows: Vec<Row> = [&h2h.a, &h2h.b]
        .iter()
        .map(|scored| {
            let row = &scored.row;
            let style = if winner.as_deref() == Some(row.full_name.as_str()) {
                Style::default().fg(colors.best_color).bold()
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(row.full_name.clone()).style(style),
                Cell::from(row.team_name.clone()).style(Style::default().fg(colors.muted)),
                Cell::from(format!("{:>4}", row.grid_position)),
                Cell::from(format!("{:>6}", row.finish_position)),
                Cell::from(format!("{:>4}", format_points(row.points))),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(2),
        Constraint::Fill(1),
        Constraint::Length(4),
        Constraint::Length(6),
        Constraint::Length(4),
    ];
    let table = Table::new(rows, widths).header(
        Row::new(vec!["Driver", "Team", "Grid", "Finish", " Pts"])
            .style(colors.header_style)
            .bottom_margin(1),
    );
    frame.render_widget(table, chunks[0]);

    let verdict = crate::output::winner_statement(h2h, false);
    frame.render_widget(Paragraph::new(verdict).style(Style::default().bold()), chunks[1]);
    frame.render_widget(
        Paragraph::new("Esc: close").style(Style::default().fg(colors.muted)),
        chunks[2],
    );
}

/// Drawn just before a request runs; stays up until it completes
fn render_loading_overlay(frame: &mut Frame, label: &str, colors: &ThemeColors) {
    let width = (label.chars().count() as u16 + 6).max(30);
    let popup_area = centered_rect_fixed(width, 3, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered().border_style(Style::default().fg(colors.popup_border));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let loading_text = Paragraph::new(format!("⠿ {}", label))
        .alignment(Alignment::Center)
        .style(Style::default().fg(colors.title_color));
    frame.render_widget(loading_text, inner);
}
