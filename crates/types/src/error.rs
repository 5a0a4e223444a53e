//! Error taxonomy for engine actions.
//!
//! Errors are values, never panics: every action is invoked from a UI event
//! handler that renders feedback rather than unwinding. State mutates only on
//! the success path, so a failed action is always safe to retry.

use crate::Symbol;
use std::fmt;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur during engine actions.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Zero or negative quantity/price.
    InvalidAmount,
    /// Balance too low for the requested action.
    InsufficientFunds { needed: f64, available: f64 },
    /// Holdings too low for the requested sale.
    InsufficientHoldings {
        symbol: Symbol,
        held: f64,
        requested: f64,
    },
    /// Target rack has no empty slot.
    NoCapacity,
    /// Unknown rack, miner, order, skill, or catalog id.
    NotFound(String),
    /// Skill has already been purchased.
    AlreadyUnlocked(String),
    /// XP gain outside the sane range. Logged and clamped, not player-facing.
    OutOfBounds,
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::InvalidAmount => write!(f, "quantity and price must be positive"),
            CoreError::InsufficientFunds { needed, available } => {
                write!(f, "insufficient funds: need {:.2}, have {:.2}", needed, available)
            }
            CoreError::InsufficientHoldings {
                symbol,
                held,
                requested,
            } => write!(
                f,
                "insufficient {}: hold {}, tried to sell {}",
                symbol, held, requested
            ),
            CoreError::NoCapacity => write!(f, "rack has no empty slot"),
            CoreError::NotFound(id) => write!(f, "not found: {}", id),
            CoreError::AlreadyUnlocked(id) => write!(f, "skill already unlocked: {}", id),
            CoreError::OutOfBounds => write!(f, "value outside the allowed range"),
        }
    }
}

impl std::error::Error for CoreError {}
