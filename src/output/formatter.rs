use std::io::IsTerminal;
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::analysis::{HeadToHead, Outcome};
use crate::fetch::RaceAnalysis;
use crate::provider::RaceEvent;
use crate::scoring::{ScoreResult, ScoredResult, ScoringStrategy};

/// Widest half of the delta chart (one side of the zero axis), shared by
/// the CLI chart and the TUI chart pane
pub const MAX_CHART_HALF: usize = 20;

const NAME_WIDTH: usize = 20;
const TEAM_WIDTH: usize = 16;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
pub fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Scores are shown with one decimal ("52.0", "5.5")
pub fn format_score(score: f64) -> String {
    format!("{:.1}", score)
}

/// Signed position delta ("+3", "-2", "0")
pub fn format_delta(delta: i32) -> String {
    if delta > 0 {
        format!("+{}", delta)
    } else {
        delta.to_string()
    }
}

/// Points without a trailing ".0" for whole numbers ("26", "0.5")
pub fn format_points(points: f64) -> String {
    if points.fract() == 0.0 {
        format!("{:.0}", points)
    } else {
        format!("{}", points)
    }
}

/// Truncate a name to fit available width, accounting for Unicode
pub fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format a season calendar, one round per line
/// Format: "R01  2024-03-02  Bahrain Grand Prix"
pub fn format_calendar(events: &[RaceEvent], use_colors: bool) -> String {
    if events.is_empty() {
        return "No rounds found for this season.".to_string();
    }

    events
        .iter()
        .map(|event| {
            let round = format!("R{:02}", event.round);
            let date = event
                .date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "----------".to_string());
            if use_colors {
                format!("{}  {}  {}", round.dimmed(), date, event.event_name.bold())
            } else {
                format!("{}  {}  {}", round, date, event.event_name)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Results table: the first `top_n` classified rows in provider order.
/// Columns: Pos, Code, Driver, Team, Grid, Pts, +/-, Score
pub fn format_results_table(rows: &[ScoredResult], top_n: usize, use_colors: bool) -> String {
    if rows.is_empty() {
        return "No classified results.".to_string();
    }

    let header = format!(
        "{:>4}  {:<4}  {:<name$}  {:<team$}  {:>4}  {:>4}  {:>4}  {:>6}",
        "Pos",
        "Code",
        "Driver",
        "Team",
        "Grid",
        "Pts",
        "+/-",
        "Score",
        name = NAME_WIDTH,
        team = TEAM_WIDTH,
    );

    let mut lines = vec![if use_colors {
        header.bold().to_string()
    } else {
        header
    }];

    for scored in rows.iter().take(top_n) {
        let row = &scored.row;
        let pos = format!("{:>3}.", row.finish_position);
        let delta = format!("{:>4}", format_delta(row.position_delta));
        let delta = if !use_colors {
            delta
        } else if row.position_delta > 0 {
            delta.green().to_string()
        } else if row.position_delta < 0 {
            delta.red().to_string()
        } else {
            delta.dimmed().to_string()
        };

        lines.push(format!(
            "{}  {:<4}  {:<name$}  {:<team$}  {:>4}  {:>4}  {}  {:>6}",
            pos,
            row.abbreviation,
            truncate_name(&row.full_name, NAME_WIDTH),
            truncate_name(&row.team_name, TEAM_WIDTH),
            row.grid_position,
            format_points(row.points),
            delta,
            format_score(scored.score.score),
            name = NAME_WIDTH,
            team = TEAM_WIDTH,
        ));
    }

    lines.join("\n")
}

/// Bar length for `value` out of `max`, at least one cell for non-zero values
fn scaled_len(value: usize, max: usize, cells: usize) -> usize {
    if value == 0 || max == 0 {
        0
    } else {
        ((value * cells).div_ceil(max)).min(cells)
    }
}

/// Cells left (loss) and right (gain) of the zero axis for one delta,
/// scaled so that `max_abs` fills `half` cells
pub fn delta_bar_cells(delta: i32, max_abs: usize, half: usize) -> (usize, usize) {
    let len = scaled_len(delta.unsigned_abs() as usize, max_abs, half);
    if delta < 0 {
        (len, 0)
    } else {
        (0, len)
    }
}

/// Largest absolute delta in a result set
pub fn max_abs_delta(rows: &[ScoredResult]) -> usize {
    rows.iter()
        .map(|s| s.row.position_delta.unsigned_abs() as usize)
        .max()
        .unwrap_or(0)
}

/// Horizontal bar chart of position delta keyed by abbreviation.
/// Losses extend left of the axis, gains to the right.
pub fn format_delta_chart(rows: &[ScoredResult], use_colors: bool, width: Option<usize>) -> String {
    if rows.is_empty() {
        return "No classified results.".to_string();
    }

    let max_abs = max_abs_delta(rows);

    // Code column 5 + axis 1 + value column 4
    let half = width
        .map(|w| w.saturating_sub(10) / 2)
        .unwrap_or(MAX_CHART_HALF)
        .clamp(1, MAX_CHART_HALF);

    rows.iter()
        .map(|scored| {
            let delta = scored.row.position_delta;
            let (loss, gain) = delta_bar_cells(delta, max_abs, half);

            let left_pad = " ".repeat(half - loss);
            let loss_bar = "█".repeat(loss);
            let gain_bar = "█".repeat(gain);
            let right_pad = " ".repeat(half - gain);
            let value = format!("{:>4}", format_delta(delta));

            if use_colors {
                format!(
                    "{:<5}{}{}│{}{}{}",
                    scored.row.abbreviation,
                    left_pad,
                    loss_bar.red(),
                    gain_bar.green(),
                    right_pad,
                    value
                )
            } else {
                format!(
                    "{:<5}{}{}│{}{}{}",
                    scored.row.abbreviation, left_pad, loss_bar, gain_bar, right_pad, value
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-line best performer summary
pub fn format_best(best: &ScoredResult, strategy: ScoringStrategy, use_colors: bool) -> String {
    let score = format_score(best.score.score);
    if use_colors {
        format!(
            "Best performer: {} ({}), {} {}",
            best.row.full_name.bold(),
            best.row.abbreviation,
            strategy.display_name(),
            score.cyan()
        )
    } else {
        format!(
            "Best performer: {} ({}), {} {}",
            best.row.full_name,
            best.row.abbreviation,
            strategy.display_name(),
            score
        )
    }
}

/// Multi-line score breakdown (for verbose mode)
pub fn format_breakdown(result: &ScoreResult) -> String {
    let mut lines = vec![format!("  {}", result.breakdown.strategy.display_name())];
    for factor in &result.breakdown.factors {
        lines.push(format!(
            "    {}: {} ({} -> {})",
            factor.label,
            factor.description,
            format_score(factor.before),
            format_score(factor.after)
        ));
    }
    lines.join("\n")
}

/// Full analysis report: heading, table, chart, best performer
pub fn format_analysis(analysis: &RaceAnalysis, top_n: usize, use_colors: bool) -> String {
    let heading = format!(
        "{} {} ({})",
        analysis.event.event_name, analysis.event.season, analysis.session
    );
    let heading = if use_colors {
        heading.bold().to_string()
    } else {
        heading
    };

    let mut sections = vec![
        heading,
        format_results_table(&analysis.rows, top_n, use_colors),
        String::new(),
        "Positions gained / lost".to_string(),
        format_delta_chart(&analysis.rows, use_colors, get_terminal_width()),
        String::new(),
        format_best(&analysis.best, analysis.strategy, use_colors),
    ];

    if analysis.dropped > 0 {
        let noun = if analysis.dropped == 1 { "entry" } else { "entries" };
        sections.push(format!(
            "{} unclassified {} left out of the analysis.",
            analysis.dropped, noun
        ));
    }

    sections.join("\n")
}

/// Two-row comparison table plus the winner statement
pub fn format_comparison(h2h: &HeadToHead, use_colors: bool) -> String {
    let header = format!(
        "{:<name$}  {:<team$}  {:>5}  {:>6}  {:>4}",
        "Driver",
        "Team",
        "Grid",
        "Finish",
        "Pts",
        name = NAME_WIDTH,
        team = TEAM_WIDTH,
    );

    let mut lines = vec![if use_colors {
        header.bold().to_string()
    } else {
        header
    }];

    for scored in [&h2h.a, &h2h.b] {
        let row = &scored.row;
        lines.push(format!(
            "{:<name$}  {:<team$}  {:>5}  {:>6}  {:>4}",
            truncate_name(&row.full_name, NAME_WIDTH),
            truncate_name(&row.team_name, TEAM_WIDTH),
            row.grid_position,
            row.finish_position,
            format_points(row.points),
            name = NAME_WIDTH,
            team = TEAM_WIDTH,
        ));
    }

    lines.push(String::new());
    lines.push(winner_statement(h2h, use_colors));
    lines.join("\n")
}

pub fn winner_statement(h2h: &HeadToHead, use_colors: bool) -> String {
    match (h2h.outcome, h2h.winner()) {
        (Outcome::Level, _) | (_, None) => format!(
            "Level: both finished P{}, no winner in this race.",
            h2h.a.row.finish_position
        ),
        (_, Some(winner)) => {
            if use_colors {
                format!("Better result in this race: {}", winner.row.full_name.bold())
            } else {
                format!("Better result in this race: {}", winner.row.full_name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{compare, DerivedResultRow};
    use crate::scoring::score;

    fn sample_row(code: &str, name: &str, grid: u32, finish: u32, points: f64) -> DerivedResultRow {
        DerivedResultRow {
            abbreviation: code.to_string(),
            full_name: name.to_string(),
            team_name: "Scuderia Ferrari HP".to_string(),
            grid_position: grid,
            finish_position: finish,
            points,
            position_delta: grid as i32 - finish as i32,
        }
    }

    fn sample_scored() -> Vec<ScoredResult> {
        score(
            &[
                sample_row("AAA", "Driver A", 1, 1, 25.0),
                sample_row("BBB", "Driver B", 6, 2, 18.0),
                sample_row("CCC", "Driver C", 2, 3, 15.0),
            ],
            ScoringStrategy::Performance,
        )
    }

    #[test]
    fn test_format_score_one_decimal() {
        assert_eq!(format_score(52.0), "52.0");
        assert_eq!(format_score(5.5), "5.5");
        assert_eq!(format_score(16.0 / 3.0), "5.3");
    }

    #[test]
    fn test_format_delta_sign() {
        assert_eq!(format_delta(3), "+3");
        assert_eq!(format_delta(-2), "-2");
        assert_eq!(format_delta(0), "0");
    }

    #[test]
    fn test_format_points() {
        assert_eq!(format_points(26.0), "26");
        assert_eq!(format_points(0.5), "0.5");
    }

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("Max Verstappen", 20), "Max Verstappen");
        assert_eq!(truncate_name("Scuderia Ferrari HP", 10), "Scuderi...");
        assert_eq!(truncate_name("Sergio Pérez", 9), "Sergio...");
        assert_eq!(truncate_name("Hamilton", 3), "Ham");
    }

    #[test]
    fn test_format_calendar() {
        let events = vec![RaceEvent {
            season: 2024,
            round: 1,
            event_name: "Bahrain Grand Prix".to_string(),
            date: chrono::NaiveDate::from_ymd_opt(2024, 3, 2),
            url: None,
        }];
        assert_eq!(format_calendar(&events, false), "R01  2024-03-02  Bahrain Grand Prix");
        assert_eq!(format_calendar(&[], false), "No rounds found for this season.");
    }

    #[test]
    fn test_results_table_top_n() {
        let scored = sample_scored();
        let table = format_results_table(&scored, 2, false);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3); // header + 2 rows
        assert!(lines[0].contains("Driver"));
        assert!(lines[1].contains("AAA"));
        assert!(lines[1].contains("50.0"));
        assert!(lines[2].contains("+4"));
        assert!(!table.contains("CCC"));
    }

    #[test]
    fn test_results_table_empty() {
        assert_eq!(format_results_table(&[], 10, false), "No classified results.");
    }

    #[test]
    fn test_delta_chart_axis_alignment() {
        let scored = sample_scored();
        let chart = format_delta_chart(&scored, false, Some(50));
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines.len(), 3);

        // Axis sits in the same column on every line
        let axis: Vec<usize> = lines
            .iter()
            .map(|l| l.chars().position(|c| c == '│').unwrap())
            .collect();
        assert!(axis.windows(2).all(|w| w[0] == w[1]));

        assert!(lines[0].starts_with("AAA"));
        assert!(lines[0].ends_with("   0"));
        assert!(lines[1].ends_with("  +4"));
        assert!(lines[2].ends_with("  -1"));

        // Gain bar right of the axis, loss bar left of it
        let (left, right) = lines[1].split_once('│').unwrap();
        assert!(right.contains('█') && !left.contains('█'));
        let (left, right) = lines[2].split_once('│').unwrap();
        assert!(left.contains('█') && !right.contains('█'));
    }

    #[test]
    fn test_delta_chart_largest_fills_half() {
        let scored = sample_scored();
        let chart = format_delta_chart(&scored, false, None);
        let gain = chart.lines().nth(1).unwrap().matches('█').count();
        assert_eq!(gain, MAX_CHART_HALF);
        let loss = chart.lines().nth(2).unwrap().matches('█').count();
        assert_eq!(loss, 5); // ceil(1 * 20 / 4)
    }

    #[test]
    fn test_format_best() {
        let scored = sample_scored();
        let line = format_best(&scored[0], ScoringStrategy::Performance, false);
        assert_eq!(line, "Best performer: Driver A (AAA), Performance Score 50.0");
    }

    #[test]
    fn test_format_breakdown() {
        let scored = sample_scored();
        let text = format_breakdown(&scored[1].score);
        assert!(text.contains("Performance Score"));
        assert!(text.contains("Points: 18 pts x2 (0.0 -> 36.0)"));
        assert!(text.contains("(36.0 -> 40.0)"));
    }

    #[test]
    fn test_format_comparison_winner() {
        let scored = sample_scored();
        let h2h = compare(&scored, "Driver C", "Driver B").unwrap();
        let text = format_comparison(&h2h, false);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("Driver C"));
        assert!(lines[2].starts_with("Driver B"));
        assert_eq!(lines[4], "Better result in this race: Driver B");
    }

    #[test]
    fn test_format_comparison_level() {
        let scored = sample_scored();
        let h2h = compare(&scored, "Driver A", "Driver A").unwrap();
        assert_eq!(
            winner_statement(&h2h, false),
            "Level: both finished P1, no winner in this race."
        );
    }
}
