pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::App;
pub use theme::{resolve_theme, Theme, ThemeColors};

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use event::{Event, EventHandler};

use crate::provider::SessionProvider;
use app::Request;

/// Overall deadline for one request (calendar load or analysis run)
const REQUEST_DEADLINE: Duration = Duration::from_secs(30);

pub async fn run_tui<P: SessionProvider>(mut app: App, provider: &P) -> anyhow::Result<()> {
    // Buffer stderr while TUI is active to prevent output corrupting the display
    crate::stderr_buffer::activate();

    // Init terminal (sets up panic hooks automatically)
    let mut terminal = ratatui::init();
    let mut events = EventHandler::new(250);

    app.request_calendar();
    let result = event_loop(&mut terminal, &mut events, &mut app, provider).await;

    // Restore terminal
    ratatui::restore();

    // Flush buffered stderr messages now that the terminal is restored
    for msg in crate::stderr_buffer::drain() {
        eprintln!("{}", msg);
    }

    result
}

async fn event_loop<P: SessionProvider>(
    terminal: &mut ratatui::DefaultTerminal,
    events: &mut EventHandler,
    app: &mut App,
    provider: &P,
) -> anyhow::Result<()> {
    loop {
        // Draw UI (with the loading overlay when a request is queued)
        terminal.draw(|frame| ui::draw(frame, app))?;

        // Run the queued request to completion, then redraw before any key
        if let Some(request) = app.pending.take() {
            run_request(app, provider, request).await;
            continue;
        }

        match events.next().await {
            Some(Event::Key(key)) => handle_key_event(app, key),
            Some(Event::Tick) => app.update_flash(),
            // Input reader has stopped
            None => {
                tracing::debug!("terminal event stream closed");
                break;
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

async fn run_request<P: SessionProvider>(app: &mut App, provider: &P, request: Request) {
    let timed_out = || format!("Request timed out ({}s)", REQUEST_DEADLINE.as_secs());

    match request {
        Request::Calendar(season) => {
            let result = tokio::time::timeout(
                REQUEST_DEADLINE,
                crate::fetch::load_calendar(provider, season),
            )
            .await;
            let result = match result {
                Ok(Ok(events)) => Ok(events),
                Ok(Err(e)) => {
                    tracing::warn!("{}", e);
                    Err(e.to_string())
                }
                Err(_elapsed) => Err(timed_out()),
            };
            app.apply_calendar(season, result);
        }
        Request::Analysis(req) => {
            let result = tokio::time::timeout(
                REQUEST_DEADLINE,
                crate::fetch::analyze_race(provider, &req),
            )
            .await;
            let result = match result {
                Ok(Ok(analysis)) => Ok(analysis),
                Ok(Err(e)) => Err(e.to_string()),
                Err(_elapsed) => Err(timed_out()),
            };
            app.apply_analysis(result);
        }
    }
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    match app.input_mode {
        app::InputMode::Normal => {
            match key.code {
                // Quit
                KeyCode::Char('q') => app.should_quit = true,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    app.should_quit = true
                }

                // Seasons
                KeyCode::Char('h') | KeyCode::Left => app.previous_season(),
                KeyCode::Char('l') | KeyCode::Right => app.next_season(),

                // Navigation
                KeyCode::Char('j') | KeyCode::Down => app.next_row(),
                KeyCode::Char('k') | KeyCode::Up => app.previous_row(),
                KeyCode::Tab => app.toggle_focus(),

                // Analyze the selected event
                KeyCode::Enter => {
                    if app.focus == app::Pane::Calendar {
                        app.start_analysis();
                    }
                }

                // Driver picks and head-to-head
                KeyCode::Char('1') => app.pick_selected(true),
                KeyCode::Char('2') => app.pick_selected(false),
                KeyCode::Char('c') => app.open_comparison(),

                // Strategy (re-score) and session (re-fetch)
                KeyCode::Char('s') => app.toggle_strategy(),
                KeyCode::Char('t') => app.toggle_session(),

                // Score breakdown
                KeyCode::Char('b') => app.show_score_breakdown(),

                // Race report in browser
                KeyCode::Char('o') => app.open_report(),

                // Help
                KeyCode::Char('?') => app.show_help(),

                _ => {}
            }
        }
        app::InputMode::ScoreBreakdown => match key.code {
            KeyCode::Esc | KeyCode::Char('b') => app.dismiss_score_breakdown(),
            KeyCode::Char('j') | KeyCode::Down => app.next_row(),
            KeyCode::Char('k') | KeyCode::Up => app.previous_row(),
            _ => {}
        },
        app::InputMode::Comparison => match key.code {
            KeyCode::Esc | KeyCode::Char('c') | KeyCode::Char('q') => app.dismiss_comparison(),
            _ => {}
        },
        app::InputMode::Help => {
            // Any key exits help
            app.dismiss_help();
        }
    }
}
