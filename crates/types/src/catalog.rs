//! Static hardware and skill catalogs.
//!
//! Catalogs are read-only configuration loaded once at startup and validated
//! there; lookups afterwards assume a valid catalog and never re-validate.

use crate::ModelId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

// =============================================================================
// Models
// =============================================================================

/// A purchasable miner model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinerModel {
    pub id: ModelId,
    pub name: String,
    /// Mining throughput in TH/s.
    pub hashrate: f64,
    /// Power draw in watts.
    pub power: f64,
    pub cost: f64,
    /// Relative wear factor; higher models burn out faster under load.
    pub degradation_rate: f64,
}

/// A purchasable rack model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RackModel {
    pub id: ModelId,
    pub name: String,
    pub slots: usize,
    pub cost: f64,
}

/// A numeric effect granted by an unlocked skill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum SkillEffect {
    /// Fractional reduction of trade commission.
    CommissionReduction(f64),
    /// Fractional reduction of trade slippage.
    SlippageReduction(f64),
    /// Fractional bonus on all XP gains.
    XpBoost(f64),
    /// Fractional bonus on mining hashrate.
    MiningEfficiency(f64),
}

/// A purchasable skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDef {
    pub id: ModelId,
    pub name: String,
    pub description: String,
    /// Cost in skill points.
    pub cost: u32,
    pub effects: Vec<SkillEffect>,
}

// =============================================================================
// Catalog
// =============================================================================

/// All static model definitions, validated once at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Catalog {
    pub miners: Vec<MinerModel>,
    pub racks: Vec<RackModel>,
    pub skills: Vec<SkillDef>,
}

/// Catalog validation failure. Fatal at startup, by construction unreachable
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    DuplicateId(String),
    /// Non-positive cost, hashrate, power, or slot count.
    InvalidEntry(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::DuplicateId(id) => write!(f, "duplicate catalog id: {}", id),
            CatalogError::InvalidEntry(id) => write!(f, "invalid catalog entry: {}", id),
        }
    }
}

impl std::error::Error for CatalogError {}

impl Catalog {
    /// Check id uniqueness and numeric sanity of every entry.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for m in &self.miners {
            if !seen.insert(m.id.clone()) {
                return Err(CatalogError::DuplicateId(m.id.clone()));
            }
            if m.cost <= 0.0 || m.hashrate <= 0.0 || m.power <= 0.0 || m.degradation_rate <= 0.0 {
                return Err(CatalogError::InvalidEntry(m.id.clone()));
            }
        }
        for r in &self.racks {
            if !seen.insert(r.id.clone()) {
                return Err(CatalogError::DuplicateId(r.id.clone()));
            }
            if r.cost <= 0.0 || r.slots == 0 {
                return Err(CatalogError::InvalidEntry(r.id.clone()));
            }
        }
        for s in &self.skills {
            if !seen.insert(s.id.clone()) {
                return Err(CatalogError::DuplicateId(s.id.clone()));
            }
            if s.cost == 0 || s.effects.is_empty() {
                return Err(CatalogError::InvalidEntry(s.id.clone()));
            }
        }
        Ok(())
    }

    /// Look up a miner model by id.
    pub fn miner_model(&self, id: &str) -> Option<&MinerModel> {
        self.miners.iter().find(|m| m.id == id)
    }

    /// Look up a rack model by id.
    pub fn rack_model(&self, id: &str) -> Option<&RackModel> {
        self.racks.iter().find(|r| r.id == id)
    }

    /// Look up a skill by id.
    pub fn skill(&self, id: &str) -> Option<&SkillDef> {
        self.skills.iter().find(|s| s.id == id)
    }

    /// The stock catalog shipped with the game.
    pub fn standard() -> Self {
        Self {
            miners: vec![
                MinerModel {
                    id: "gpu_old".into(),
                    name: "GTX 1060 (used)".into(),
                    hashrate: 0.5,
                    power: 120.0,
                    cost: 200.0,
                    degradation_rate: 1.2,
                },
                MinerModel {
                    id: "gpu_rtx".into(),
                    name: "RTX 4090".into(),
                    hashrate: 4.0,
                    power: 450.0,
                    cost: 1800.0,
                    degradation_rate: 1.0,
                },
                MinerModel {
                    id: "asic_s9".into(),
                    name: "Antminer S9".into(),
                    hashrate: 14.0,
                    power: 1300.0,
                    cost: 800.0,
                    degradation_rate: 1.5,
                },
                MinerModel {
                    id: "asic_pro".into(),
                    name: "Whatsminer M50".into(),
                    hashrate: 110.0,
                    power: 3200.0,
                    cost: 4500.0,
                    degradation_rate: 1.1,
                },
                MinerModel {
                    id: "quantum_chip".into(),
                    name: "Q-Bit Prototype".into(),
                    hashrate: 500.0,
                    power: 1500.0,
                    cost: 15000.0,
                    degradation_rate: 2.0,
                },
            ],
            racks: vec![
                RackModel {
                    id: "rack_shelf".into(),
                    name: "Metal shelf".into(),
                    slots: 2,
                    cost: 150.0,
                },
                RackModel {
                    id: "rack_basic".into(),
                    name: "Open rack".into(),
                    slots: 4,
                    cost: 600.0,
                },
                RackModel {
                    id: "rack_server".into(),
                    name: "Server cabinet".into(),
                    slots: 8,
                    cost: 2000.0,
                },
                RackModel {
                    id: "rack_cryo".into(),
                    name: "Cryo capsule".into(),
                    slots: 12,
                    cost: 8000.0,
                },
            ],
            skills: vec![
                SkillDef {
                    id: "low_fees".into(),
                    name: "Low fees".into(),
                    description: "Reduces trade commissions by 20%.".into(),
                    cost: 1,
                    effects: vec![SkillEffect::CommissionReduction(0.20)],
                },
                SkillDef {
                    id: "tight_spreads".into(),
                    name: "Tight spreads".into(),
                    description: "Reduces slippage by 25%.".into(),
                    cost: 2,
                    effects: vec![SkillEffect::SlippageReduction(0.25)],
                },
                SkillDef {
                    id: "quick_study".into(),
                    name: "Quick study".into(),
                    description: "+10% XP from every source.".into(),
                    cost: 1,
                    effects: vec![SkillEffect::XpBoost(0.10)],
                },
                SkillDef {
                    id: "overclocking".into(),
                    name: "Overclocking".into(),
                    description: "+15% hashrate at the cost of extra wear.".into(),
                    cost: 3,
                    effects: vec![SkillEffect::MiningEfficiency(0.15)],
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_is_valid() {
        assert!(Catalog::standard().validate().is_ok());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut catalog = Catalog::standard();
        let dup = catalog.miners[0].clone();
        catalog.miners.push(dup);
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::DuplicateId(_))
        ));
    }

    #[test]
    fn zero_slot_rack_is_rejected() {
        let mut catalog = Catalog::standard();
        catalog.racks[0].slots = 0;
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::InvalidEntry(_))
        ));
    }

    #[test]
    fn skill_effects_keep_their_wire_shape() {
        // Persisted saves depend on the adjacently-tagged representation.
        let effect = SkillEffect::CommissionReduction(0.20);
        let json = serde_json::to_value(effect).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "commission_reduction", "value": 0.2 })
        );
        let back: SkillEffect = serde_json::from_value(json).unwrap();
        assert_eq!(back, effect);
    }

    #[test]
    fn catalog_round_trips_through_json() {
        let catalog = Catalog::standard();
        let json = serde_json::to_string(&catalog).unwrap();
        let back: Catalog = serde_json::from_str(&json).unwrap();
        assert_eq!(back, catalog);
        assert!(back.validate().is_ok());
    }
}
