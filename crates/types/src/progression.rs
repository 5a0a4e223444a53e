//! Progression types: XP, levels, leagues, and skill points.

use crate::ModelId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// League tier, a pure step function of level. Never stored independently of
/// level; re-derived whenever level changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum League {
    #[default]
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            League::Bronze => "Bronze",
            League::Silver => "Silver",
            League::Gold => "Gold",
            League::Platinum => "Platinum",
            League::Diamond => "Diamond",
        };
        write!(f, "{}", name)
    }
}

/// The player's progression: cumulative XP and everything derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionState {
    /// Cumulative XP, monotone outside explicit resets.
    pub xp: u64,
    pub level: u32,
    pub league: League,
    /// Consecutive non-losing actions, floor 1.
    pub streak: u32,
    pub skill_points: u32,
    pub unlocked_skills: Vec<ModelId>,
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self {
            xp: 0,
            level: 1,
            league: League::Bronze,
            streak: 1,
            skill_points: 0,
            unlocked_skills: Vec::new(),
        }
    }
}

impl ProgressionState {
    /// Whether a skill has been purchased.
    pub fn has_skill(&self, id: &str) -> bool {
        self.unlocked_skills.iter().any(|s| s == id)
    }
}

/// Breakdown of a single XP gain, for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct XpBreakdown {
    pub base: f64,
    pub streak_bonus: f64,
    pub skill_bonus: f64,
    /// Floor of the scaled sum; the amount actually applied.
    pub total: u64,
}

/// Level position derived from cumulative XP.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub level: u32,
    /// Progress through the current level, in [0, 1].
    pub progress: f64,
    pub xp_in_level: u64,
    pub xp_for_level: u64,
    pub total_xp: u64,
}
