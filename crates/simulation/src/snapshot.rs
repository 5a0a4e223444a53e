//! Full-state capture and the persistence seam.
//!
//! A snapshot is plain data; equality on it is equality of the whole world
//! (minus the market's random streams, which are re-seeded on restore).

use serde::{Deserialize, Serialize};
use std::fmt;
use types::{MarketState, MiningFarmState, ProgressionState, Tick, TradingState};

/// Everything needed to resume a world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: Tick,
    pub market: MarketState,
    pub trading: TradingState,
    pub mining: MiningFarmState,
    pub progression: ProgressionState,
}

#[derive(Debug)]
pub enum SnapshotError {
    /// The store holds no snapshot yet.
    Empty,
    Codec(serde_json::Error),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Empty => write!(f, "no snapshot stored"),
            SnapshotError::Codec(e) => write!(f, "snapshot codec error: {}", e),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Codec(e) => Some(e),
            SnapshotError::Empty => None,
        }
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(e: serde_json::Error) -> Self {
        SnapshotError::Codec(e)
    }
}

/// Persistence seam: anything that can hold the latest snapshot.
pub trait SnapshotStore {
    fn save(&mut self, snapshot: &WorldSnapshot) -> Result<(), SnapshotError>;
    fn load(&self) -> Result<WorldSnapshot, SnapshotError>;
}

/// Keeps the latest snapshot as a JSON string in memory. The reference
/// backend; real frontends swap in their own store behind the same trait.
#[derive(Debug, Default)]
pub struct JsonSnapshotStore {
    latest: Option<String>,
}

impl JsonSnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored JSON document, if any.
    pub fn raw(&self) -> Option<&str> {
        self.latest.as_deref()
    }
}

impl SnapshotStore for JsonSnapshotStore {
    fn save(&mut self, snapshot: &WorldSnapshot) -> Result<(), SnapshotError> {
        self.latest = Some(serde_json::to_string(snapshot)?);
        Ok(())
    }

    fn load(&self) -> Result<WorldSnapshot, SnapshotError> {
        let raw = self.latest.as_deref().ok_or(SnapshotError::Empty)?;
        Ok(serde_json::from_str(raw)?)
    }
}
