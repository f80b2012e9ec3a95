use std::cmp::Ordering;

use super::config::ScoringStrategy;
use crate::analysis::DerivedResultRow;

#[derive(Debug, Clone, PartialEq)]
pub struct FactorContribution {
    pub label: String,       // e.g. "Points", "Position delta"
    pub description: String, // e.g. "26 pts x2", "grid 5 -> finish 2 (+3)"
    pub before: f64,         // Score before this step
    pub after: f64,          // Score after this step
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub strategy: ScoringStrategy,
    pub factors: Vec<FactorContribution>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

/// A normalized row with its score under one strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredResult {
    pub row: DerivedResultRow,
    pub score: ScoreResult,
}

pub fn calculate_score(row: &DerivedResultRow, strategy: ScoringStrategy) -> ScoreResult {
    let mut factors = Vec::new();

    let score = match strategy {
        ScoringStrategy::Performance => {
            let doubled = row.points * 2.0;
            factors.push(FactorContribution {
                label: "Points".to_string(),
                description: format!("{} pts x2", row.points),
                before: 0.0,
                after: doubled,
            });

            let total = doubled + row.position_delta as f64;
            factors.push(FactorContribution {
                label: "Position delta".to_string(),
                description: format!(
                    "grid {} -> finish {} ({:+})",
                    row.grid_position, row.finish_position, row.position_delta
                ),
                before: doubled,
                after: total,
            });
            total
        }
        ScoringStrategy::Form => {
            let numerator = row.points + 1.0;
            factors.push(FactorContribution {
                label: "Points".to_string(),
                description: format!("{} pts +1", row.points),
                before: 0.0,
                after: numerator,
            });

            // finish_position >= 1 after normalization
            let total = numerator / row.finish_position as f64;
            factors.push(FactorContribution {
                label: "Finish position".to_string(),
                description: format!("divided by P{}", row.finish_position),
                before: numerator,
                after: total,
            });
            total
        }
    };

    ScoreResult {
        score,
        breakdown: ScoreBreakdown { strategy, factors },
    }
}

/// Attach a score to every row, keeping input order.
pub fn score(rows: &[DerivedResultRow], strategy: ScoringStrategy) -> Vec<ScoredResult> {
    rows.iter()
        .map(|row| ScoredResult {
            row: row.clone(),
            score: calculate_score(row, strategy),
        })
        .collect()
}

/// Ranking order: score descending, then lower finish position.
/// Rows equal on both keep their input order when sorted stably.
pub fn ranking_order(a: &ScoredResult, b: &ScoredResult) -> Ordering {
    b.score
        .score
        .total_cmp(&a.score.score)
        .then_with(|| a.row.finish_position.cmp(&b.row.finish_position))
}

/// Rows in ranking order (stable sort, so input order breaks remaining ties).
pub fn rank(scored: &[ScoredResult]) -> Vec<&ScoredResult> {
    let mut ranked: Vec<&ScoredResult> = scored.iter().collect();
    ranked.sort_by(|a, b| ranking_order(a, b));
    ranked
}

/// The best row under [`ranking_order`], or `None` for empty input.
pub fn pick_best(scored: &[ScoredResult]) -> Option<&ScoredResult> {
    // min_by keeps the first of several equal elements
    scored.iter().min_by(|a, b| ranking_order(a, b))
}
