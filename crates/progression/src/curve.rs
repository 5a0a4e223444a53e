//! The level curve and its derived step functions. All pure and total.

use types::{League, LevelData};

/// XP required to advance *from* `level` to the next one. Grows linearly.
pub fn xp_for_level(level: u32) -> u64 {
    100 + 50 * level as u64
}

/// Total cumulative XP required to *reach* `target` level from level 1.
pub fn total_xp_for_level(target: u32) -> u64 {
    (1..target).map(xp_for_level).sum()
}

/// Derive the level position from cumulative XP.
///
/// Monotone: more XP never yields a lower level.
pub fn level_for_xp(total_xp: u64) -> LevelData {
    let mut level = 1;
    let mut consumed = 0;
    while consumed + xp_for_level(level) <= total_xp {
        consumed += xp_for_level(level);
        level += 1;
    }
    let xp_for_current = xp_for_level(level);
    let xp_in_level = total_xp - consumed;
    LevelData {
        level,
        progress: (xp_in_level as f64 / xp_for_current as f64).min(1.0),
        xp_in_level,
        xp_for_level: xp_for_current,
        total_xp,
    }
}

/// League tier for a level. A step function, re-derived on every level
/// change rather than stored.
pub fn league_for_level(level: u32) -> League {
    match level {
        0..=4 => League::Bronze,
        5..=9 => League::Silver,
        10..=19 => League::Gold,
        20..=49 => League::Platinum,
        _ => League::Diamond,
    }
}

/// Cumulative skill points granted by the time `level` is reached.
pub fn skill_points_for_level(level: u32) -> u32 {
    1 + level / 5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_curve_grows_linearly() {
        assert_eq!(xp_for_level(1), 150);
        assert_eq!(xp_for_level(2), 200);
        assert_eq!(xp_for_level(10), 600);
    }

    #[test]
    fn total_xp_accumulates_the_per_level_costs() {
        assert_eq!(total_xp_for_level(1), 0);
        assert_eq!(total_xp_for_level(2), 150);
        assert_eq!(total_xp_for_level(3), 350);
        assert_eq!(total_xp_for_level(4), 600);
    }

    #[test]
    fn level_for_xp_inverts_the_curve() {
        for target in 1..30 {
            let at_boundary = level_for_xp(total_xp_for_level(target));
            assert_eq!(at_boundary.level, target);
            assert_eq!(at_boundary.xp_in_level, 0);
            if target > 1 {
                let just_below = level_for_xp(total_xp_for_level(target) - 1);
                assert_eq!(just_below.level, target - 1);
            }
        }
    }

    #[test]
    fn level_is_monotone_in_xp() {
        let mut last = 0;
        for xp in (0..20_000).step_by(37) {
            let level = level_for_xp(xp).level;
            assert!(level >= last);
            last = level;
        }
    }

    #[test]
    fn league_steps() {
        assert_eq!(league_for_level(1), League::Bronze);
        assert_eq!(league_for_level(4), League::Bronze);
        assert_eq!(league_for_level(5), League::Silver);
        assert_eq!(league_for_level(9), League::Silver);
        assert_eq!(league_for_level(10), League::Gold);
        assert_eq!(league_for_level(19), League::Gold);
        assert_eq!(league_for_level(20), League::Platinum);
        assert_eq!(league_for_level(49), League::Platinum);
        assert_eq!(league_for_level(50), League::Diamond);
        assert_eq!(league_for_level(120), League::Diamond);
    }

    #[test]
    fn skill_points_step_every_five_levels() {
        assert_eq!(skill_points_for_level(1), 1);
        assert_eq!(skill_points_for_level(4), 1);
        assert_eq!(skill_points_for_level(5), 2);
        assert_eq!(skill_points_for_level(6), 2);
        assert_eq!(skill_points_for_level(10), 3);
    }
}
