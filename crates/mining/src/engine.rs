//! Farm mutation: purchases, repair, per-tick settlement.

use crate::production::repair_cost;
use crate::{active_decay_rate, DIFFICULTY_DIVISOR, IDLE_DECAY_FACTOR, MIN_OPERATING_CONDITION};
use tracing::debug;
use types::{
    Catalog, CoreError, InstalledMiner, MinerId, MiningFarmState, Rack, RackId, Result,
};

/// Outcome of one mining settlement pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MiningTick {
    /// Coin accrued this tick.
    pub mined_delta: f64,
    /// Electricity actually debited (clamped to the available balance).
    pub electricity_cost: f64,
    /// Miners that crossed the operating threshold this tick.
    pub failed: Vec<MinerId>,
}

/// Executes mining actions against a [`MiningFarmState`].
///
/// The player's balance is shared with the trading engine, so every
/// balance-touching operation takes it as an explicit `&mut f64` — the
/// orchestrator decides the order in which engines see it within a tick.
#[derive(Debug, Clone, Default)]
pub struct MiningEngine;

impl MiningEngine {
    fn next_rack_id(state: &MiningFarmState) -> RackId {
        RackId(state.racks.iter().map(|r| r.id.0).max().unwrap_or(0) + 1)
    }

    fn next_miner_id(state: &MiningFarmState) -> MinerId {
        MinerId(
            state
                .racks
                .iter()
                .flat_map(|r| r.slots.iter().flatten())
                .map(|m| m.id.0)
                .max()
                .unwrap_or(0)
                + 1,
        )
    }

    // =========================================================================
    // Purchases
    // =========================================================================

    /// Buy a rack of the given model and append it, empty, to the farm.
    pub fn buy_rack(
        &self,
        state: &mut MiningFarmState,
        balance: &mut f64,
        catalog: &Catalog,
        model_id: &str,
    ) -> Result<RackId> {
        let model = catalog
            .rack_model(model_id)
            .ok_or_else(|| CoreError::NotFound(model_id.to_string()))?;
        if *balance < model.cost {
            return Err(CoreError::InsufficientFunds {
                needed: model.cost,
                available: *balance,
            });
        }
        let id = Self::next_rack_id(state);
        *balance -= model.cost;
        state.racks.push(Rack::new(id, model.id.clone(), model.slots));
        Ok(id)
    }

    /// Buy a miner and install it in the first empty slot of the target rack.
    /// The new miner starts at condition 100, active. `hashrate_bonus` is the
    /// skill-derived boost, applied so the aggregates are current immediately
    /// rather than one tick later.
    pub fn buy_miner(
        &self,
        state: &mut MiningFarmState,
        balance: &mut f64,
        catalog: &Catalog,
        model_id: &str,
        rack_id: RackId,
        hashrate_bonus: f64,
    ) -> Result<MinerId> {
        let model = catalog
            .miner_model(model_id)
            .ok_or_else(|| CoreError::NotFound(model_id.to_string()))?;
        let cost = model.cost;
        let id = Self::next_miner_id(state);

        let rack = state
            .rack_mut(rack_id)
            .ok_or_else(|| CoreError::NotFound(rack_id.to_string()))?;
        let slot = rack.first_empty_slot().ok_or(CoreError::NoCapacity)?;
        if *balance < cost {
            return Err(CoreError::InsufficientFunds {
                needed: cost,
                available: *balance,
            });
        }

        *balance -= cost;
        rack.slots[slot] = Some(InstalledMiner::new(id, model_id));
        self.recompute_aggregates(state, catalog, hashrate_bonus);
        Ok(id)
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Flip a miner's active flag. Returns the new state.
    pub fn toggle_miner(
        &self,
        state: &mut MiningFarmState,
        rack_id: RackId,
        slot: usize,
    ) -> Result<bool> {
        let miner = Self::slot_mut(state, rack_id, slot)?;
        miner.active = !miner.active;
        Ok(miner.active)
    }

    /// Repair a miner back to condition 100, charging per restored point.
    /// Returns the charged cost. No state changes on failure.
    pub fn repair_miner(
        &self,
        state: &mut MiningFarmState,
        balance: &mut f64,
        rack_id: RackId,
        slot: usize,
    ) -> Result<f64> {
        let miner = Self::slot_mut(state, rack_id, slot)?;
        let cost = repair_cost(miner.condition);
        if *balance < cost {
            return Err(CoreError::InsufficientFunds {
                needed: cost,
                available: *balance,
            });
        }
        miner.condition = 100.0;
        *balance -= cost;
        Ok(cost)
    }

    /// Convert the whole mined accumulator to currency at the given coin
    /// price. The only path by which mined value becomes spendable balance.
    pub fn sell_mined(
        &self,
        state: &mut MiningFarmState,
        balance: &mut f64,
        coin_price: f64,
    ) -> f64 {
        let proceeds = state.mined * coin_price;
        state.mined = 0.0;
        *balance += proceeds;
        proceeds
    }

    // =========================================================================
    // Settlement
    // =========================================================================

    /// One settlement pass over `dt` seconds.
    ///
    /// Degrades every installed miner (active miners wear from use, idle ones
    /// age at 1/100th the rate), recomputes the derived aggregates from
    /// miners still above the operating threshold, accrues mined coin, and
    /// debits electricity — clamped so the balance never goes negative.
    ///
    /// `hashrate_bonus` is the skill-derived fractional boost (0.15 = +15%).
    pub fn tick(
        &self,
        state: &mut MiningFarmState,
        balance: &mut f64,
        catalog: &Catalog,
        hashrate_bonus: f64,
        dt: f64,
    ) -> MiningTick {
        let mut report = MiningTick::default();

        for rack in &mut state.racks {
            for miner in rack.slots.iter_mut().flatten() {
                let Some(model) = catalog.miner_model(&miner.model_id) else {
                    continue;
                };
                let rate = active_decay_rate(model.degradation_rate, model.power);
                let loss = if miner.active {
                    rate * dt
                } else {
                    rate * IDLE_DECAY_FACTOR * dt
                };
                let before = miner.condition;
                miner.condition = (miner.condition - loss).max(0.0);
                if before > MIN_OPERATING_CONDITION && miner.condition <= MIN_OPERATING_CONDITION {
                    report.failed.push(miner.id);
                }
            }
        }

        self.recompute_aggregates(state, catalog, hashrate_bonus);

        report.mined_delta = state.total_hashrate / DIFFICULTY_DIVISOR * dt;
        state.mined += report.mined_delta;

        let electricity = state.total_power * state.cost_per_watt * dt;
        report.electricity_cost = electricity.min(*balance);
        *balance -= report.electricity_cost;

        debug!(
            hashrate = state.total_hashrate,
            power = state.total_power,
            mined = state.mined,
            electricity = report.electricity_cost,
            "mining tick"
        );
        report
    }

    /// Recompute `total_hashrate`/`total_power` from scratch. Only miners
    /// that are active and strictly above the operating threshold count.
    pub fn recompute_aggregates(
        &self,
        state: &mut MiningFarmState,
        catalog: &Catalog,
        hashrate_bonus: f64,
    ) {
        let mut hashrate = 0.0;
        let mut power = 0.0;
        for rack in &state.racks {
            for miner in rack.slots.iter().flatten() {
                if !miner.active || miner.condition <= MIN_OPERATING_CONDITION {
                    continue;
                }
                if let Some(model) = catalog.miner_model(&miner.model_id) {
                    hashrate += model.hashrate;
                    power += model.power;
                }
            }
        }
        state.total_hashrate = hashrate * (1.0 + hashrate_bonus);
        state.total_power = power;
    }

    fn slot_mut(
        state: &mut MiningFarmState,
        rack_id: RackId,
        slot: usize,
    ) -> Result<&mut InstalledMiner> {
        let rack = state
            .rack_mut(rack_id)
            .ok_or_else(|| CoreError::NotFound(rack_id.to_string()))?;
        rack.slots
            .get_mut(slot)
            .and_then(|s| s.as_mut())
            .ok_or_else(|| CoreError::NotFound(format!("{} slot {}", rack_id, slot)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (MiningEngine, MiningFarmState, Catalog, f64) {
        (
            MiningEngine,
            MiningFarmState::new(0.0001),
            Catalog::standard(),
            10_000.0,
        )
    }

    /// Farm with one Antminer S9 installed in a basic rack.
    fn farm_with_one_miner() -> (MiningEngine, MiningFarmState, Catalog, f64, RackId) {
        let (engine, mut state, catalog, mut balance) = setup();
        let rack = engine
            .buy_rack(&mut state, &mut balance, &catalog, "rack_basic")
            .unwrap();
        engine
            .buy_miner(&mut state, &mut balance, &catalog, "asic_s9", rack, 0.0)
            .unwrap();
        (engine, state, catalog, balance, rack)
    }

    #[test]
    fn rack_purchase_debits_and_appends() {
        let (engine, mut state, catalog, mut balance) = setup();
        let id = engine
            .buy_rack(&mut state, &mut balance, &catalog, "rack_basic")
            .unwrap();
        assert_eq!(balance, 10_000.0 - 600.0);
        assert_eq!(state.rack(id).unwrap().slots.len(), 4);
        assert!(state.rack(id).unwrap().slots.iter().all(|s| s.is_none()));
    }

    #[test]
    fn rack_purchase_requires_funds() {
        let (engine, mut state, catalog, _) = setup();
        let mut balance = 100.0;
        assert!(matches!(
            engine.buy_rack(&mut state, &mut balance, &catalog, "rack_basic"),
            Err(CoreError::InsufficientFunds { .. })
        ));
        assert_eq!(balance, 100.0);
        assert!(state.racks.is_empty());
    }

    #[test]
    fn miner_install_updates_aggregates() {
        let (_, state, _, balance, _) = farm_with_one_miner();
        assert_eq!(balance, 10_000.0 - 600.0 - 800.0);
        assert_eq!(state.total_hashrate, 14.0);
        assert_eq!(state.total_power, 1300.0);
    }

    #[test]
    fn full_rack_rejects_installs() {
        let (engine, mut state, catalog, mut balance) = setup();
        balance = 100_000.0;
        let rack = engine
            .buy_rack(&mut state, &mut balance, &catalog, "rack_shelf")
            .unwrap();
        for _ in 0..2 {
            engine
                .buy_miner(&mut state, &mut balance, &catalog, "gpu_old", rack, 0.0)
                .unwrap();
        }
        assert!(matches!(
            engine.buy_miner(&mut state, &mut balance, &catalog, "gpu_old", rack, 0.0),
            Err(CoreError::NoCapacity)
        ));
    }

    #[test]
    fn install_applies_hashrate_bonus_immediately() {
        let (engine, mut state, catalog, mut balance) = setup();
        let rack = engine
            .buy_rack(&mut state, &mut balance, &catalog, "rack_basic")
            .unwrap();
        engine
            .buy_miner(&mut state, &mut balance, &catalog, "asic_s9", rack, 0.15)
            .unwrap();
        // Aggregates reflect the skill boost at purchase time, not one tick
        // later.
        assert!((state.total_hashrate - 14.0 * 1.15).abs() < 1e-9);
    }

    #[test]
    fn degradation_is_linear_in_ticks() {
        let (engine, mut state, catalog, mut balance, rack) = farm_with_one_miner();
        let model = catalog.miner_model("asic_s9").unwrap();
        let rate = active_decay_rate(model.degradation_rate, model.power);

        let ticks = 10;
        for _ in 0..ticks {
            engine.tick(&mut state, &mut balance, &catalog, 0.0, 1.0);
        }
        let miner = state.rack(rack).unwrap().slots[0].as_ref().unwrap();
        assert!((miner.condition - (100.0 - ticks as f64 * rate)).abs() < 1e-9);
    }

    #[test]
    fn idle_miners_decay_a_hundred_times_slower() {
        let (engine, mut state, catalog, mut balance, rack) = farm_with_one_miner();
        engine.toggle_miner(&mut state, rack, 0).unwrap();
        engine.tick(&mut state, &mut balance, &catalog, 0.0, 1.0);

        let model = catalog.miner_model("asic_s9").unwrap();
        let rate = active_decay_rate(model.degradation_rate, model.power);
        let miner = state.rack(rack).unwrap().slots[0].as_ref().unwrap();
        assert!((miner.condition - (100.0 - rate * IDLE_DECAY_FACTOR)).abs() < 1e-9);
        // Idle miners contribute nothing.
        assert_eq!(state.total_hashrate, 0.0);
    }

    #[test]
    fn crossing_threshold_drops_contribution_and_reports_failure() {
        let (engine, mut state, catalog, mut balance, rack) = farm_with_one_miner();
        // Force the miner just above the threshold, then tick it across.
        state.rack_mut(rack).unwrap().slots[0]
            .as_mut()
            .unwrap()
            .condition = MIN_OPERATING_CONDITION + 1e-6;
        let report = engine.tick(&mut state, &mut balance, &catalog, 0.0, 1.0);

        assert_eq!(report.failed.len(), 1);
        assert_eq!(state.total_hashrate, 0.0);
        assert_eq!(state.total_power, 0.0);
        // Failed hardware is not deleted.
        assert!(state.rack(rack).unwrap().slots[0].is_some());
    }

    #[test]
    fn electricity_clamps_balance_at_zero() {
        let (engine, mut state, catalog, _, _) = farm_with_one_miner();
        state.cost_per_watt = 1.0; // absurd tariff
        let mut balance = 500.0;
        let report = engine.tick(&mut state, &mut balance, &catalog, 0.0, 1.0);
        assert_eq!(report.electricity_cost, 500.0);
        assert_eq!(balance, 0.0);

        // Further ticks stay at zero.
        engine.tick(&mut state, &mut balance, &catalog, 0.0, 1.0);
        assert_eq!(balance, 0.0);
    }

    #[test]
    fn mined_accrual_matches_hashrate() {
        let (engine, mut state, catalog, mut balance, _) = farm_with_one_miner();
        let report = engine.tick(&mut state, &mut balance, &catalog, 0.0, 2.0);
        let expected = 14.0 / DIFFICULTY_DIVISOR * 2.0;
        assert!((report.mined_delta - expected).abs() < 1e-12);
        assert!((state.mined - expected).abs() < 1e-12);
    }

    #[test]
    fn hashrate_bonus_scales_output() {
        let (engine, mut state, catalog, mut balance, _) = farm_with_one_miner();
        engine.tick(&mut state, &mut balance, &catalog, 0.15, 1.0);
        assert!((state.total_hashrate - 14.0 * 1.15).abs() < 1e-9);
    }

    #[test]
    fn repair_restores_condition_and_charges_per_point() {
        let (engine, mut state, catalog, _, rack) = farm_with_one_miner();
        state.rack_mut(rack).unwrap().slots[0]
            .as_mut()
            .unwrap()
            .condition = 40.0;
        let mut balance = 10_000.0;
        let cost = engine.repair_miner(&mut state, &mut balance, rack, 0).unwrap();
        assert!((cost - 600.0).abs() < 1e-9); // 60 points * 10
        assert_eq!(balance, 9_400.0);
        assert_eq!(
            state.rack(rack).unwrap().slots[0].as_ref().unwrap().condition,
            100.0
        );
    }

    #[test]
    fn repair_fails_without_funds_or_miner() {
        let (engine, mut state, catalog, _, rack) = farm_with_one_miner();
        let _ = catalog;
        state.rack_mut(rack).unwrap().slots[0]
            .as_mut()
            .unwrap()
            .condition = 0.0;
        let mut balance = 10.0;
        assert!(matches!(
            engine.repair_miner(&mut state, &mut balance, rack, 0),
            Err(CoreError::InsufficientFunds { .. })
        ));
        assert_eq!(balance, 10.0);
        // Empty slot.
        assert!(matches!(
            engine.repair_miner(&mut state, &mut balance, rack, 1),
            Err(CoreError::NotFound(_))
        ));
    }

    #[test]
    fn selling_mined_resets_accumulator() {
        let (engine, mut state, _, _, _) = farm_with_one_miner();
        state.mined = 0.5;
        let mut balance = 100.0;
        let proceeds = engine.sell_mined(&mut state, &mut balance, 45_000.0);
        assert_eq!(proceeds, 22_500.0);
        assert_eq!(balance, 22_600.0);
        assert_eq!(state.mined, 0.0);
    }
}
