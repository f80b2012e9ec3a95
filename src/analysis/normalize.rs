use crate::provider::ResultRow;

/// A classified result with integer positions and the position delta.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedResultRow {
    pub abbreviation: String,
    pub full_name: String,
    pub team_name: String,
    pub grid_position: u32,   // >= 1
    pub finish_position: u32, // >= 1
    pub points: f64,
    pub position_delta: i32, // grid - finish, positive = places gained
}

/// Output of [`normalize`]: retained rows plus how many were dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub rows: Vec<DerivedResultRow>,
    pub dropped: usize,
}

/// Coerce a provider position token to a position number.
///
/// Anything that is not a whole number >= 1 becomes `None`: retirement and
/// disqualification markers, blanks, grid "0" (pit-lane start), and values
/// too large for the signed position delta.
pub fn coerce_position(token: Option<&str>) -> Option<u32> {
    let value: u32 = token?.trim().parse().ok()?;
    (1..=MAX_POSITION).contains(&value).then_some(value)
}

/// Largest position accepted; keeps `grid - finish` within `i32`
const MAX_POSITION: u32 = i32::MAX as u32;

/// Clean raw results.
///
/// Rows whose grid or finish position fails coercion are removed, not
/// repaired: DNF/DSQ entries do not take part in any derived statistic.
/// Input order is preserved and an empty result is not an error.
pub fn normalize(raw: &[ResultRow]) -> Normalized {
    let rows: Vec<DerivedResultRow> = raw
        .iter()
        .filter_map(|row| {
            let grid = coerce_position(row.grid_position.as_deref())?;
            let finish = coerce_position(row.finish_position.as_deref())?;
            Some(DerivedResultRow {
                abbreviation: row.abbreviation.clone(),
                full_name: row.full_name.clone(),
                team_name: row.team_name.clone(),
                grid_position: grid,
                finish_position: finish,
                points: row.points,
                // Both are in 1..=i32::MAX, so neither the casts nor the subtraction overflow
                position_delta: grid as i32 - finish as i32,
            })
        })
        .collect();

    let dropped = raw.len() - rows.len();
    if dropped > 0 {
        tracing::debug!("dropped {} unclassified rows of {}", dropped, raw.len());
    }

    Normalized { rows, dropped }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_row(code: &str, grid: Option<&str>, finish: Option<&str>, points: f64) -> ResultRow {
        ResultRow {
            abbreviation: code.to_string(),
            full_name: format!("Driver {}", code),
            team_name: "Team".to_string(),
            grid_position: grid.map(str::to_string),
            finish_position: finish.map(str::to_string),
            points,
        }
    }

    #[test]
    fn test_coerce_numeric() {
        assert_eq!(coerce_position(Some("7")), Some(7));
        assert_eq!(coerce_position(Some(" 12 ")), Some(12));
    }

    #[test]
    fn test_coerce_markers_and_blanks() {
        assert_eq!(coerce_position(Some("R")), None);
        assert_eq!(coerce_position(Some("D")), None);
        assert_eq!(coerce_position(Some("")), None);
        assert_eq!(coerce_position(Some("3.5")), None);
        assert_eq!(coerce_position(Some("-2")), None);
        assert_eq!(coerce_position(None), None);
    }

    #[test]
    fn test_coerce_rejects_out_of_range() {
        assert_eq!(coerce_position(Some("2147483647")), Some(2147483647));
        assert_eq!(coerce_position(Some("2147483648")), None);
        assert_eq!(coerce_position(Some("4294967295")), None);
        assert_eq!(coerce_position(Some("99999999999")), None);
    }

    #[test]
    fn test_oversized_grid_row_dropped() {
        let raw = vec![
            raw_row("AAA", Some("2147483648"), Some("1"), 25.0),
            raw_row("BBB", Some("2147483647"), Some("1"), 25.0),
            raw_row("CCC", Some("1"), Some("2147483647"), 0.0),
        ];
        let out = normalize(&raw);
        assert_eq!(out.dropped, 1);
        assert_eq!(out.rows[0].abbreviation, "BBB");
        assert_eq!(out.rows[0].position_delta, i32::MAX - 1);
        assert_eq!(out.rows[1].position_delta, 1 - i32::MAX);
    }

    #[test]
    fn test_coerce_zero_is_unclassified() {
        assert_eq!(coerce_position(Some("0")), None);
    }

    #[test]
    fn test_delta_is_grid_minus_finish() {
        let out = normalize(&[raw_row("AAA", Some("5"), Some("2"), 18.0)]);
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].position_delta, 3);

        let out = normalize(&[raw_row("BBB", Some("1"), Some("4"), 12.0)]);
        assert_eq!(out.rows[0].position_delta, -3);
    }

    #[test]
    fn test_retired_row_dropped_entirely() {
        let raw = vec![
            raw_row("AAA", Some("2"), Some("1"), 25.0),
            raw_row("RET", Some("1"), Some("RET"), 0.0),
            raw_row("BBB", None, Some("2"), 18.0),
        ];
        let out = normalize(&raw);
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.dropped, 2);
        assert!(out.rows.iter().all(|r| r.abbreviation != "RET"));
    }

    #[test]
    fn test_retained_rows_have_positions_from_one() {
        let raw = vec![
            raw_row("AAA", Some("3"), Some("1"), 25.0),
            raw_row("BBB", Some("0"), Some("2"), 18.0),
            raw_row("CCC", Some("x"), Some("3"), 15.0),
            raw_row("DDD", Some("4"), Some("4"), 12.0),
        ];
        let out = normalize(&raw);
        assert!(out
            .rows
            .iter()
            .all(|r| r.grid_position >= 1 && r.finish_position >= 1));
        assert_eq!(out.rows.len(), 2);
    }

    #[test]
    fn test_preserves_input_order() {
        let raw = vec![
            raw_row("CCC", Some("1"), Some("3"), 15.0),
            raw_row("AAA", Some("2"), Some("1"), 25.0),
            raw_row("BBB", Some("3"), Some("2"), 18.0),
        ];
        let codes: Vec<_> = normalize(&raw)
            .rows
            .into_iter()
            .map(|r| r.abbreviation)
            .collect();
        assert_eq!(codes, vec!["CCC", "AAA", "BBB"]);
    }

    #[test]
    fn test_all_filtered_is_empty_not_error() {
        let raw = vec![raw_row("AAA", Some("1"), Some("R"), 0.0)];
        let out = normalize(&raw);
        assert!(out.rows.is_empty());
        assert_eq!(out.dropped, 1);
        assert!(normalize(&[]).rows.is_empty());
    }

    #[test]
    fn test_normalize_is_pure() {
        let raw = vec![
            raw_row("AAA", Some("5"), Some("1"), 25.0),
            raw_row("BBB", Some("1"), Some("R"), 0.0),
        ];
        assert_eq!(normalize(&raw), normalize(&raw));
    }
}
