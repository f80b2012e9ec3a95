pub mod config;
pub mod engine;

pub use config::ScoringStrategy;
pub use engine::{
    calculate_score, pick_best, rank, ranking_order, score, FactorContribution, ScoreBreakdown,
    ScoreResult, ScoredResult,
};
