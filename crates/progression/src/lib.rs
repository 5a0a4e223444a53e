//! Progression engine.
//!
//! Converts raw activity (trade outcomes, mined value, correct answers) into
//! experience via closed-form formulas, derives level and league from
//! cumulative XP, and grants/spends skill points.

mod curve;
mod engine;

pub use curve::{
    league_for_level, level_for_xp, skill_points_for_level, total_xp_for_level, xp_for_level,
};
pub use engine::{aggregate_bonuses, Bonuses, ProgressionEngine, XpOutcome};

/// Upper bound on a single XP gain; anything above is a caller bug and is
/// clamped with a warning.
pub const MAX_SINGLE_GAIN: u64 = 1000;

/// Base XP for a settled trade.
pub const BASE_TRADE_XP: f64 = 10.0;

/// Base XP for a correct quiz answer.
pub const BASE_QUIZ_XP: f64 = 20.0;

/// Streak bonus per consecutive non-losing action (+10% each).
pub const STREAK_BONUS_PER_STEP: f64 = 0.1;

/// Risk fraction above which trade XP scales up.
pub const RISK_THRESHOLD: f64 = 0.02;
