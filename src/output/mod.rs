pub mod formatter;

pub use formatter::{
    delta_bar_cells, format_analysis, format_best, format_breakdown, format_calendar,
    format_comparison, format_delta, format_delta_chart, format_points, format_results_table,
    format_score, get_terminal_width, max_abs_delta, should_use_colors, truncate_name,
    winner_statement, MAX_CHART_HALF,
};
