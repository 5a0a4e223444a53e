//! XP application, streaks, and skill purchases.

use crate::curve::{league_for_level, level_for_xp, skill_points_for_level};
use crate::{BASE_QUIZ_XP, BASE_TRADE_XP, MAX_SINGLE_GAIN, RISK_THRESHOLD, STREAK_BONUS_PER_STEP};
use tracing::warn;
use types::{Catalog, CoreError, ProgressionState, Result, SkillBonuses, SkillEffect, XpBreakdown};

/// Result of applying an XP gain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct XpOutcome {
    /// XP actually added after clamping and flooring.
    pub applied: u64,
    /// New level, when the gain crossed at least one threshold.
    pub new_level: Option<u32>,
    pub skill_points_gained: u32,
}

/// Combined numeric effects of every unlocked skill.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bonuses {
    pub trade: SkillBonuses,
    /// Fractional hashrate boost for the mining engine.
    pub mining_efficiency: f64,
}

/// Sum the effects of all unlocked skills against the catalog. Effects of
/// the same type stack additively.
pub fn aggregate_bonuses(state: &ProgressionState, catalog: &Catalog) -> Bonuses {
    let mut bonuses = Bonuses::default();
    for id in &state.unlocked_skills {
        let Some(skill) = catalog.skill(id) else {
            continue;
        };
        for effect in &skill.effects {
            match *effect {
                SkillEffect::CommissionReduction(v) => bonuses.trade.commission_reduction += v,
                SkillEffect::SlippageReduction(v) => bonuses.trade.slippage_reduction += v,
                SkillEffect::XpBoost(v) => bonuses.trade.xp_bonus += v,
                SkillEffect::MiningEfficiency(v) => bonuses.mining_efficiency += v,
            }
        }
    }
    bonuses
}

/// Applies XP and manages streaks and skills against a [`ProgressionState`].
#[derive(Debug, Clone, Default)]
pub struct ProgressionEngine;

impl ProgressionEngine {
    /// Add XP and re-derive everything downstream of it.
    ///
    /// The gain is `floor(raw * multiplier)`, clamped into
    /// `[0, MAX_SINGLE_GAIN]` — an out-of-range value is a caller bug, so it
    /// is logged and clamped rather than surfaced to the player. Level and
    /// league are recomputed from cumulative XP; crossing level thresholds
    /// grants the skill-point delta of the curve.
    pub fn add_xp(&self, state: &mut ProgressionState, raw: f64, multiplier: f64) -> XpOutcome {
        let scaled = (raw * multiplier).floor();
        let applied = if !(0.0..=MAX_SINGLE_GAIN as f64).contains(&scaled) {
            warn!(raw, multiplier, scaled, "xp gain out of bounds, clamping");
            scaled.clamp(0.0, MAX_SINGLE_GAIN as f64) as u64
        } else {
            scaled as u64
        };
        if applied == 0 {
            return XpOutcome::default();
        }

        let old_level = state.level;
        state.xp += applied;
        let data = level_for_xp(state.xp);
        state.level = data.level;
        state.league = league_for_level(state.level);

        let mut outcome = XpOutcome {
            applied,
            new_level: None,
            skill_points_gained: 0,
        };
        if state.level > old_level {
            let gained = skill_points_for_level(state.level) - skill_points_for_level(old_level);
            state.skill_points += gained;
            outcome.new_level = Some(state.level);
            outcome.skill_points_gained = gained;
        }
        outcome
    }

    /// XP breakdown for a settled trade.
    ///
    /// Base XP scales up when more than [`RISK_THRESHOLD`] of total capital
    /// was committed; the streak bonus grows linearly with consecutive
    /// non-losing trades; a commission-skill kicker rewards invested skill
    /// points.
    pub fn trade_xp(
        &self,
        risk_score: f64,
        streak: u32,
        multiplier: f64,
        commission_skill: f64,
    ) -> XpBreakdown {
        let mut base = BASE_TRADE_XP;
        if risk_score > RISK_THRESHOLD {
            base *= 1.0 + risk_score * 20.0;
        }
        let streak_bonus = if streak > 1 {
            base * STREAK_BONUS_PER_STEP * (streak - 1) as f64
        } else {
            0.0
        };
        let skill_bonus = base * commission_skill * 0.5;
        XpBreakdown {
            base,
            streak_bonus,
            skill_bonus,
            total: ((base + streak_bonus + skill_bonus) * multiplier).floor() as u64,
        }
    }

    /// XP breakdown for a correct quiz answer, scaled by difficulty (1-3).
    pub fn quiz_xp(&self, streak: u32, difficulty: f64, multiplier: f64) -> XpBreakdown {
        let base = BASE_QUIZ_XP * difficulty / 3.0;
        let streak_bonus = if streak > 1 {
            base * STREAK_BONUS_PER_STEP * (streak - 1) as f64
        } else {
            0.0
        };
        XpBreakdown {
            base,
            streak_bonus,
            skill_bonus: 0.0,
            total: ((base + streak_bonus) * multiplier).floor() as u64,
        }
    }

    /// Register a non-losing outcome: the streak grows.
    pub fn record_win(&self, state: &mut ProgressionState) {
        state.streak += 1;
    }

    /// Register a losing outcome: the streak resets to its floor of 1.
    pub fn record_loss(&self, state: &mut ProgressionState) {
        state.streak = 1;
    }

    /// Spend skill points to unlock a skill.
    pub fn unlock_skill(&self, state: &mut ProgressionState, id: &str, cost: u32) -> Result<()> {
        if state.has_skill(id) {
            return Err(CoreError::AlreadyUnlocked(id.to_string()));
        }
        if state.skill_points < cost {
            return Err(CoreError::InsufficientFunds {
                needed: cost as f64,
                available: state.skill_points as f64,
            });
        }
        state.skill_points -= cost;
        state.unlocked_skills.push(id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::total_xp_for_level;

    fn engine() -> ProgressionEngine {
        ProgressionEngine
    }

    #[test]
    fn add_xp_accumulates_and_floors() {
        let mut state = ProgressionState::default();
        let outcome = engine().add_xp(&mut state, 10.7, 1.0);
        assert_eq!(outcome.applied, 10);
        assert_eq!(state.xp, 10);
        let outcome = engine().add_xp(&mut state, 10.0, 1.5);
        assert_eq!(outcome.applied, 15);
        assert_eq!(state.xp, 25);
    }

    #[test]
    fn out_of_bounds_gains_are_clamped() {
        let mut state = ProgressionState::default();
        // Negative: no-op.
        assert_eq!(engine().add_xp(&mut state, -50.0, 1.0).applied, 0);
        assert_eq!(state.xp, 0);
        // Oversized: clamped to the cap, not rejected.
        assert_eq!(
            engine().add_xp(&mut state, 1e9, 1.0).applied,
            MAX_SINGLE_GAIN
        );
        assert_eq!(state.xp, MAX_SINGLE_GAIN);
    }

    #[test]
    fn xp_never_decreases() {
        let mut state = ProgressionState::default();
        let mut last = 0;
        for raw in [-5.0, 10.0, 0.0, 500.0, 2_000.0, 3.3] {
            engine().add_xp(&mut state, raw, 1.0);
            assert!(state.xp >= last);
            last = state.xp;
        }
    }

    #[test]
    fn level_up_grants_skill_point_delta() {
        let mut state = ProgressionState {
            xp: total_xp_for_level(4),
            level: 4,
            skill_points: 0,
            ..Default::default()
        };
        // Climb from level 4 to level 6.
        let needed = total_xp_for_level(6) - total_xp_for_level(4);
        let mut remaining = needed;
        while remaining > 0 {
            let chunk = remaining.min(MAX_SINGLE_GAIN);
            engine().add_xp(&mut state, chunk as f64, 1.0);
            remaining -= chunk;
        }
        assert_eq!(state.level, 6);
        assert_eq!(
            state.skill_points,
            skill_points_for_level(6) - skill_points_for_level(4)
        );
    }

    #[test]
    fn league_follows_level() {
        let mut state = ProgressionState::default();
        let mut remaining = total_xp_for_level(10);
        while remaining > 0 {
            let chunk = remaining.min(MAX_SINGLE_GAIN);
            engine().add_xp(&mut state, chunk as f64, 1.0);
            remaining -= chunk;
        }
        assert_eq!(state.level, 10);
        assert_eq!(state.league, types::League::Gold);
    }

    #[test]
    fn trade_xp_scales_with_risk_and_streak() {
        let e = engine();
        let calm = e.trade_xp(0.01, 1, 1.0, 0.0);
        assert_eq!(calm.total, BASE_TRADE_XP as u64);

        let risky = e.trade_xp(0.10, 1, 1.0, 0.0);
        // 10 * (1 + 0.1 * 20) = 30
        assert_eq!(risky.total, 30);

        let streaky = e.trade_xp(0.01, 4, 1.0, 0.0);
        // 10 + 10 * 0.1 * 3 = 13
        assert_eq!(streaky.total, 13);
    }

    #[test]
    fn quiz_xp_scales_with_difficulty() {
        let e = engine();
        assert_eq!(e.quiz_xp(1, 3.0, 1.0).total, 20);
        assert_eq!(e.quiz_xp(1, 1.5, 1.0).total, 10);
    }

    #[test]
    fn streak_grows_and_resets() {
        let e = engine();
        let mut state = ProgressionState::default();
        e.record_win(&mut state);
        e.record_win(&mut state);
        assert_eq!(state.streak, 3);
        e.record_loss(&mut state);
        assert_eq!(state.streak, 1);
    }

    #[test]
    fn unlock_skill_spends_points_once() {
        let e = engine();
        let mut state = ProgressionState {
            skill_points: 3,
            ..Default::default()
        };
        e.unlock_skill(&mut state, "low_fees", 1).unwrap();
        assert_eq!(state.skill_points, 2);
        assert!(state.has_skill("low_fees"));
        assert!(matches!(
            e.unlock_skill(&mut state, "low_fees", 1),
            Err(CoreError::AlreadyUnlocked(_))
        ));
        // Failed re-unlock spends nothing.
        assert_eq!(state.skill_points, 2);
        assert!(matches!(
            e.unlock_skill(&mut state, "overclocking", 3),
            Err(CoreError::InsufficientFunds { .. })
        ));
    }

    #[test]
    fn bonuses_stack_additively() {
        let catalog = Catalog::standard();
        let state = ProgressionState {
            unlocked_skills: vec!["low_fees".into(), "quick_study".into(), "overclocking".into()],
            ..Default::default()
        };
        let bonuses = aggregate_bonuses(&state, &catalog);
        assert!((bonuses.trade.commission_reduction - 0.20).abs() < 1e-12);
        assert!((bonuses.trade.xp_bonus - 0.10).abs() < 1e-12);
        assert!((bonuses.mining_efficiency - 0.15).abs() < 1e-12);
    }
}
