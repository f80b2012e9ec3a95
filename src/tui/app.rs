use std::time::Instant;

use ratatui::widgets::{ListState, TableState};

use crate::analysis::HeadToHead;
use crate::config::Config;
use crate::fetch::{AnalysisRequest, RaceAnalysis};
use crate::provider::{RaceEvent, SessionKind};
use crate::scoring::{ScoredResult, ScoringStrategy};
use crate::tui::theme::ThemeColors;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pane {
    Calendar,
    Results,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    Help,
    ScoreBreakdown,
    Comparison,
}

/// Work queued by a key press. The main loop draws the loading overlay,
/// then runs it to completion before reading the next key.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Calendar(u16),
    Analysis(AnalysisRequest),
}

impl Request {
    pub fn label(&self) -> String {
        match self {
            Request::Calendar(season) => format!("Loading {} calendar...", season),
            Request::Analysis(req) => format!("Analyzing {} ({})...", req.event, req.session),
        }
    }
}

pub struct App {
    pub seasons: Vec<u16>,
    pub season_index: usize,
    pub calendar: Vec<RaceEvent>,
    pub calendar_error: Option<String>,
    pub calendar_state: ListState,
    pub analysis: Option<RaceAnalysis>,
    pub analysis_error: Option<String>,
    pub results_state: TableState,
    pub last_request: Option<AnalysisRequest>,
    pub strategy: ScoringStrategy,
    pub session: SessionKind,
    pub focus: Pane,
    pub pick_a: Option<String>,
    pub pick_b: Option<String>,
    pub comparison: Option<HeadToHead>,
    pub input_mode: InputMode,
    pub flash_message: Option<(String, Instant)>,
    pub pending: Option<Request>,
    pub should_quit: bool,
    pub colors: ThemeColors,
}

impl App {
    pub fn new(config: &Config, colors: ThemeColors) -> Self {
        let mut seasons = config.seasons.clone();
        if seasons.is_empty() {
            seasons.push(config.default_season);
        }
        let season_index = seasons
            .iter()
            .position(|&s| s == config.default_season)
            .unwrap_or(0);

        Self {
            seasons,
            season_index,
            calendar: Vec::new(),
            calendar_error: None,
            calendar_state: ListState::default(),
            analysis: None,
            analysis_error: None,
            results_state: TableState::default(),
            last_request: None,
            strategy: config.strategy,
            session: config.session,
            focus: Pane::Calendar,
            pick_a: None,
            pick_b: None,
            comparison: None,
            input_mode: InputMode::Normal,
            flash_message: None,
            pending: None,
            should_quit: false,
            colors,
        }
    }

    pub fn current_season(&self) -> u16 {
        self.seasons[self.season_index]
    }

    pub fn update_flash(&mut self) {
        if let Some((_, timestamp)) = self.flash_message {
            if timestamp.elapsed().as_secs() >= 3 {
                self.flash_message = None;
            }
        }
    }

    pub fn show_flash(&mut self, msg: String) {
        self.flash_message = Some((msg, Instant::now()));
    }

    /// Queue a calendar load for the current season
    pub fn request_calendar(&mut self) {
        self.pending = Some(Request::Calendar(self.current_season()));
    }

    pub fn next_season(&mut self) {
        self.change_season((self.season_index + 1) % self.seasons.len());
    }

    pub fn previous_season(&mut self) {
        let len = self.seasons.len();
        self.change_season((self.season_index + len - 1) % len);
    }

    fn change_season(&mut self, index: usize) {
        if index == self.season_index {
            return;
        }
        self.season_index = index;
        self.analysis = None;
        self.analysis_error = None;
        self.last_request = None;
        self.clear_picks();
        self.request_calendar();
    }

    /// Apply a finished calendar load. Stale results (season changed
    /// in the meantime) are ignored.
    pub fn apply_calendar(&mut self, season: u16, result: Result<Vec<RaceEvent>, String>) {
        if season != self.current_season() {
            return;
        }
        match result {
            Ok(events) => {
                self.calendar_state
                    .select(if events.is_empty() { None } else { Some(0) });
                self.calendar = events;
                self.calendar_error = None;
            }
            Err(msg) => {
                self.calendar.clear();
                self.calendar_state.select(None);
                self.calendar_error = Some(msg);
            }
        }
    }

    pub fn selected_event(&self) -> Option<&RaceEvent> {
        self.calendar_state
            .selected()
            .and_then(|i| self.calendar.get(i))
    }

    pub fn result_rows(&self) -> &[ScoredResult] {
        self.analysis.as_ref().map(|a| a.rows.as_slice()).unwrap_or(&[])
    }

    pub fn selected_result(&self) -> Option<&ScoredResult> {
        self.results_state
            .selected()
            .and_then(|i| self.result_rows().get(i))
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Pane::Calendar => Pane::Results,
            Pane::Results => Pane::Calendar,
        };
    }

    pub fn next_row(&mut self) {
        self.move_selection(true);
    }

    pub fn previous_row(&mut self) {
        self.move_selection(false);
    }

    fn move_selection(&mut self, forward: bool) {
        match self.focus {
            Pane::Calendar => {
                let len = self.calendar.len();
                if let Some(i) = step(len, self.calendar_state.selected(), forward) {
                    self.calendar_state.select(Some(i));
                }
            }
            Pane::Results => {
                let len = self.result_rows().len();
                if let Some(i) = step(len, self.results_state.selected(), forward) {
                    self.results_state.select(Some(i));
                }
            }
        }
    }

    /// Queue an analysis of the selected calendar event
    pub fn start_analysis(&mut self) {
        if let Some(msg) = self.calendar_error.clone() {
            self.show_flash(format!("Event selection disabled: {}", msg));
            return;
        }
        let Some(event) = self.selected_event() else {
            return;
        };
        let event_name = event.event_name.clone();

        let same_event = self
            .last_request
            .as_ref()
            .is_some_and(|req| req.event == event_name);
        if !same_event {
            self.clear_picks();
        }

        let request = AnalysisRequest {
            season: self.current_season(),
            event: event_name,
            session: self.session,
            strategy: self.strategy,
        };
        self.last_request = Some(request.clone());
        self.pending = Some(Request::Analysis(request));
    }

    /// Apply a finished analysis run. Failures replace any previous result.
    pub fn apply_analysis(&mut self, result: Result<RaceAnalysis, String>) {
        match result {
            Ok(analysis) => {
                let msg = format!(
                    "Best performer: {} ({})",
                    analysis.best.row.full_name,
                    crate::output::format_score(analysis.best.score.score)
                );
                self.results_state.select(Some(0));
                self.analysis = Some(analysis);
                self.analysis_error = None;
                self.focus = Pane::Results;
                self.show_flash(msg);
            }
            Err(msg) => {
                self.analysis = None;
                self.results_state.select(None);
                self.analysis_error = Some(msg);
            }
        }
    }

    /// Switch scoring strategy and re-score the current rows without a fetch
    pub fn toggle_strategy(&mut self) {
        self.strategy = self.strategy.toggled();
        if let Some(req) = self.last_request.as_mut() {
            req.strategy = self.strategy;
        }
        let rescored = self
            .analysis
            .as_ref()
            .map(|analysis| analysis.with_strategy(self.strategy));
        match rescored {
            Some(Ok(analysis)) => self.analysis = Some(analysis),
            Some(Err(e)) => self.apply_analysis(Err(e.to_string())),
            None => {}
        }
        let msg = format!("Strategy: {}", self.strategy.display_name());
        self.show_flash(msg);
    }

    /// Switch race/sprint and re-run the last analysis for that session
    pub fn toggle_session(&mut self) {
        self.session = self.session.toggled();
        if let Some(req) = self.last_request.as_mut() {
            req.session = self.session;
            self.pending = Some(Request::Analysis(req.clone()));
        } else {
            let msg = format!("Session: {}", self.session);
            self.show_flash(msg);
        }
    }

    /// Mark the selected result row as driver A (`first`) or B
    pub fn pick_selected(&mut self, first: bool) {
        let Some(name) = self.selected_result().map(|s| s.row.full_name.clone()) else {
            return;
        };
        let label = if first { 'A' } else { 'B' };
        self.show_flash(format!("Driver {}: {}", label, name));
        if first {
            self.pick_a = Some(name);
        } else {
            self.pick_b = Some(name);
        }
    }

    pub fn clear_picks(&mut self) {
        self.pick_a = None;
        self.pick_b = None;
        self.comparison = None;
    }

    /// Run the head-to-head for the two picks and open the popup
    pub fn open_comparison(&mut self) {
        let (Some(a), Some(b)) = (self.pick_a.clone(), self.pick_b.clone()) else {
            self.show_flash("Mark two drivers first (1 = A, 2 = B)".to_string());
            return;
        };
        let Some(result) = self.analysis.as_ref().map(|analysis| analysis.compare(&a, &b)) else {
            self.show_flash("Run an analysis before comparing".to_string());
            return;
        };
        match result {
            Ok(h2h) => {
                self.comparison = Some(h2h);
                self.input_mode = InputMode::Comparison;
            }
            Err(e) => self.show_flash(format!("Error: {}", e)),
        }
    }

    pub fn dismiss_comparison(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Report URL for the analyzed event, else the selected calendar event
    pub fn report_event(&self) -> Option<&RaceEvent> {
        self.analysis
            .as_ref()
            .map(|a| &a.event)
            .or_else(|| self.selected_event())
    }

    pub fn open_report(&mut self) {
        let Some(event) = self.report_event() else {
            return;
        };
        let name = event.event_name.clone();
        let opened = crate::browser::report_url(event).and_then(|url| crate::browser::open_url(url));
        match opened {
            Ok(()) => self.show_flash(format!("Opened: {}", name)),
            Err(e) => self.show_flash(format!("Failed to open report: {}", e)),
        }
    }

    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    pub fn dismiss_help(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn show_score_breakdown(&mut self) {
        if self.selected_result().is_some() {
            self.input_mode = InputMode::ScoreBreakdown;
        }
    }

    pub fn dismiss_score_breakdown(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Where a pick marker belongs for a result row ("A", "B", "AB" or "")
    pub fn pick_marker(&self, full_name: &str) -> &'static str {
        let a = self.pick_a.as_deref() == Some(full_name);
        let b = self.pick_b.as_deref() == Some(full_name);
        match (a, b) {
            (true, true) => "AB",
            (true, false) => "A",
            (false, true) => "B",
            (false, false) => "",
        }
    }
}

/// Wrapping list navigation; `None` for an empty list
fn step(len: usize, selected: Option<usize>, forward: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match (selected, forward) {
        (None, _) => 0,
        (Some(i), true) if i >= len - 1 => 0,
        (Some(i), true) => i + 1,
        (Some(0), false) => len - 1,
        (Some(i), false) => i - 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::{bahrain, FakeProvider};

    fn sample_app() -> App {
        let config = Config {
            seasons: vec![2025, 2024],
            default_season: 2024,
            ..Config::default()
        };
        App::new(&config, ThemeColors::dark())
    }

    fn loaded_app() -> App {
        let mut app = sample_app();
        app.apply_calendar(2024, Ok(vec![bahrain()]));
        app
    }

    async fn analyzed_app() -> App {
        let mut app = loaded_app();
        app.start_analysis();
        let Some(Request::Analysis(req)) = app.pending.take() else {
            panic!("expected an analysis request");
        };
        let result = crate::fetch::analyze_race(&FakeProvider::standard(), &req)
            .await
            .map_err(|e| e.to_string());
        app.apply_analysis(result);
        app
    }

    #[test]
    fn test_new_selects_default_season() {
        let app = sample_app();
        assert_eq!(app.current_season(), 2024);
        assert_eq!(app.strategy, ScoringStrategy::Performance);
    }

    #[test]
    fn test_season_change_queues_calendar() {
        let mut app = sample_app();
        app.next_season();
        assert_eq!(app.current_season(), 2025);
        assert_eq!(app.pending, Some(Request::Calendar(2025)));

        app.previous_season();
        assert_eq!(app.current_season(), 2024);
    }

    #[test]
    fn test_stale_calendar_ignored() {
        let mut app = sample_app();
        app.apply_calendar(2025, Ok(vec![bahrain()]));
        assert!(app.calendar.is_empty());
    }

    #[test]
    fn test_calendar_failure_disables_selection() {
        let mut app = sample_app();
        app.apply_calendar(2024, Err("provider returned HTTP 502".to_string()));
        assert!(app.calendar_error.is_some());
        assert!(app.selected_event().is_none());

        app.start_analysis();
        assert!(app.pending.is_none());
        let (msg, _) = app.flash_message.as_ref().unwrap();
        assert!(msg.starts_with("Event selection disabled"));
    }

    #[test]
    fn test_navigation_wraps() {
        assert_eq!(step(3, Some(2), true), Some(0));
        assert_eq!(step(3, Some(0), false), Some(2));
        assert_eq!(step(3, None, true), Some(0));
        assert_eq!(step(0, None, true), None);
    }

    #[tokio::test]
    async fn test_analysis_applied() {
        let app = analyzed_app().await;
        assert_eq!(app.focus, Pane::Results);
        assert_eq!(app.result_rows().len(), 3);
        assert_eq!(app.selected_result().unwrap().row.abbreviation, "VER");
        assert!(app.analysis_error.is_none());
    }

    #[tokio::test]
    async fn test_failed_run_clears_previous_result() {
        let mut app = analyzed_app().await;
        app.toggle_session();
        let Some(Request::Analysis(req)) = app.pending.take() else {
            panic!("expected a re-fetch");
        };
        assert_eq!(req.session, SessionKind::Sprint);

        let result = crate::fetch::analyze_race(&FakeProvider::standard(), &req)
            .await
            .map_err(|e| e.to_string());
        app.apply_analysis(result);
        assert!(app.analysis.is_none());
        assert!(app.result_rows().is_empty());
        assert!(app.analysis_error.is_some());
    }

    #[tokio::test]
    async fn test_toggle_strategy_rescores_without_fetch() {
        let mut app = analyzed_app().await;
        app.toggle_strategy();
        assert!(app.pending.is_none());
        let analysis = app.analysis.as_ref().unwrap();
        assert_eq!(analysis.strategy, ScoringStrategy::Form);
        assert_eq!(analysis.best.score.score, 27.0);
        assert_eq!(app.last_request.as_ref().unwrap().strategy, ScoringStrategy::Form);
    }

    #[tokio::test]
    async fn test_comparison_requires_both_picks() {
        let mut app = analyzed_app().await;
        app.pick_selected(true);
        app.open_comparison();
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.comparison.is_none());

        app.next_row();
        app.pick_selected(false);
        assert_eq!(app.pick_marker("Max Verstappen"), "A");
        assert_eq!(app.pick_marker("Sergio Perez"), "B");

        app.open_comparison();
        assert_eq!(app.input_mode, InputMode::Comparison);
        let h2h = app.comparison.as_ref().unwrap();
        assert_eq!(h2h.winner().unwrap().row.full_name, "Max Verstappen");
    }

    #[tokio::test]
    async fn test_comparison_pick_missing_from_results() {
        let mut app = analyzed_app().await;
        app.pick_a = Some("Lewis Hamilton".to_string());
        app.pick_b = Some("Max Verstappen".to_string());
        app.open_comparison();
        assert_eq!(app.input_mode, InputMode::Normal);
        let (msg, _) = app.flash_message.as_ref().unwrap();
        assert!(msg.contains("Lewis Hamilton"));
    }

    #[tokio::test]
    async fn test_new_event_clears_picks() {
        let mut app = analyzed_app().await;
        app.pick_selected(true);
        assert!(app.pick_a.is_some());

        // Same event again keeps them
        app.start_analysis();
        assert!(app.pick_a.is_some());

        app.last_request.as_mut().unwrap().event = "Saudi Arabian Grand Prix".to_string();
        app.start_analysis();
        assert!(app.pick_a.is_none());
    }
}
