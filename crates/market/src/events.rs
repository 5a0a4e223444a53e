//! Macro market events.
//!
//! A small weighted draw per tick can spawn one event when none is active.
//! Each event carries a per-symbol impact factor and a tick lifetime; active
//! events are decremented and pruned by the market engine, and their combined
//! impact feeds candle generation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use types::{EventId, MarketEvent, Symbol};

/// Per-tick chance of spawning an event while none is active.
const SPAWN_CHANCE: f64 = 0.05;

/// A declarative event blueprint. Impact > 1 pushes a symbol up and amplifies
/// its volatility; < 1 pushes it down.
#[derive(Debug, Clone)]
pub struct EventTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub impact: &'static [(&'static str, f64)],
    pub duration: u32,
}

/// The stock event pool.
const TEMPLATES: &[EventTemplate] = &[
    EventTemplate {
        name: "ETF approval",
        description: "A spot ETF clears regulatory review; institutions pile in.",
        impact: &[("BTC", 1.30), ("ETH", 1.15)],
        duration: 20,
    },
    EventTemplate {
        name: "Exchange hack",
        description: "A major exchange reports a cold-wallet breach.",
        impact: &[("BTC", 0.80), ("ETH", 0.85), ("ADA", 0.85)],
        duration: 15,
    },
    EventTemplate {
        name: "Halving hype",
        description: "Supply-cut narratives dominate the news cycle.",
        impact: &[("BTC", 1.25)],
        duration: 25,
    },
    EventTemplate {
        name: "Network congestion",
        description: "Fees spike and settlement slows on the smart-contract chain.",
        impact: &[("ETH", 0.85)],
        duration: 12,
    },
    EventTemplate {
        name: "Stablecoin depeg",
        description: "A large stablecoin wobbles off its peg; risk-off everywhere.",
        impact: &[("BTC", 0.90), ("ETH", 0.88), ("ADA", 0.75)],
        duration: 18,
    },
    EventTemplate {
        name: "Institutional buying",
        description: "A treasury allocation announcement lifts the whole market.",
        impact: &[("BTC", 1.15), ("ETH", 1.15), ("ADA", 1.20)],
        duration: 20,
    },
];

/// Spawns market events from a template pool, deterministically per seed.
pub struct EventGenerator {
    rng: StdRng,
    next_id: u64,
}

impl EventGenerator {
    /// Create a generator with its own RNG stream.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Roll for a new event. Only spawns while no event is active, keeping
    /// at most one macro narrative in play at a time.
    pub fn try_spawn(&mut self, active_count: usize) -> Option<MarketEvent> {
        if active_count > 0 || self.rng.gen::<f64>() >= SPAWN_CHANCE {
            return None;
        }
        let template = &TEMPLATES[self.rng.gen_range(0..TEMPLATES.len())];
        let id = EventId(self.next_id);
        self.next_id += 1;
        Some(MarketEvent {
            id,
            name: template.name.to_string(),
            description: template.description.to_string(),
            impact: template
                .impact
                .iter()
                .map(|(s, v)| (s.to_string(), *v))
                .collect(),
            duration: template.duration,
        })
    }

    /// Combined impact of the given events on one symbol: the volatility
    /// multiplier is the product of impact factors, the trend bias leans
    /// +0.05 per bullish event and -0.05 per bearish one.
    pub fn combined_impact(
        events: &[types::ActiveEvent],
        symbol: &Symbol,
    ) -> (f64, f64) {
        let mut multiplier = 1.0;
        let mut bias = 0.0;
        for active in events {
            if let Some(&impact) = active.event.impact.get(symbol) {
                multiplier *= impact;
                bias += if impact > 1.0 { 0.05 } else { -0.05 };
            }
        }
        (multiplier, bias)
    }

    /// Restore the id counter after loading a snapshot so new events never
    /// collide with persisted ones.
    pub fn resume_ids_after(&mut self, max_seen: u64) {
        self.next_id = self.next_id.max(max_seen + 1);
    }
}

/// Spawn chance exposed for tests.
#[cfg(test)]
pub(crate) const TEST_SPAWN_CHANCE: f64 = SPAWN_CHANCE;

#[cfg(test)]
mod tests {
    use super::*;
    use types::ActiveEvent;

    #[test]
    fn never_spawns_while_one_is_active() {
        let mut gen = EventGenerator::new(1);
        for _ in 0..1_000 {
            assert!(gen.try_spawn(1).is_none());
        }
    }

    #[test]
    fn spawn_rate_is_roughly_five_percent() {
        let mut gen = EventGenerator::new(2);
        let spawned = (0..10_000).filter(|_| gen.try_spawn(0).is_some()).count();
        let rate = spawned as f64 / 10_000.0;
        assert!((rate - TEST_SPAWN_CHANCE).abs() < 0.01, "rate {}", rate);
    }

    #[test]
    fn event_ids_are_unique_and_increasing() {
        let mut gen = EventGenerator::new(3);
        let mut last = 0;
        for _ in 0..5_000 {
            if let Some(event) = gen.try_spawn(0) {
                assert!(event.id.0 > last);
                last = event.id.0;
            }
        }
        assert!(last > 0);
    }

    #[test]
    fn combined_impact_multiplies_and_biases() {
        let mut gen = EventGenerator::new(4);
        let mut bull = None;
        while bull.is_none() {
            bull = gen.try_spawn(0).filter(|e| e.name == "Halving hype");
        }
        let events = vec![ActiveEvent {
            event: bull.unwrap(),
            ticks_left: 5,
        }];
        let (mult, bias) = EventGenerator::combined_impact(&events, &"BTC".to_string());
        assert!((mult - 1.25).abs() < 1e-9);
        assert!((bias - 0.05).abs() < 1e-9);

        let (mult, bias) = EventGenerator::combined_impact(&events, &"ADA".to_string());
        assert_eq!(mult, 1.0);
        assert_eq!(bias, 0.0);
    }
}
