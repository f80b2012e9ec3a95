use crate::error::AnalysisError;
use crate::scoring::ScoredResult;

/// Which side of a head-to-head had the better finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    First,
    Second,
    /// Equal finish positions, including a driver compared with themself
    Level,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeadToHead {
    pub a: ScoredResult,
    pub b: ScoredResult,
    pub outcome: Outcome,
}

impl HeadToHead {
    /// The row with the better (numerically lower) finish, `None` when level
    pub fn winner(&self) -> Option<&ScoredResult> {
        match self.outcome {
            Outcome::First => Some(&self.a),
            Outcome::Second => Some(&self.b),
            Outcome::Level => None,
        }
    }
}

/// Compare two drivers by finish position.
///
/// Names must match `full_name` exactly (case-sensitive). The first name that
/// matches no row is reported as `ComparisonNotFound`.
pub fn compare(rows: &[ScoredResult], name_a: &str, name_b: &str) -> Result<HeadToHead, AnalysisError> {
    let find = |name: &str| {
        rows.iter()
            .find(|r| r.row.full_name == name)
            .cloned()
            .ok_or_else(|| AnalysisError::ComparisonNotFound {
                name: name.to_string(),
            })
    };

    let a = find(name_a)?;
    let b = find(name_b)?;

    let outcome = match a.row.finish_position.cmp(&b.row.finish_position) {
        std::cmp::Ordering::Less => Outcome::First,
        std::cmp::Ordering::Greater => Outcome::Second,
        std::cmp::Ordering::Equal => Outcome::Level,
    };

    Ok(HeadToHead { a, b, outcome })
}
