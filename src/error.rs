//! Error types for the boundary of the simulation.
//!
//! Gameplay itself never fails; these cover configuration, player ids
//! coming from outside, and JSON encoding of snapshots and stage state.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DuelError {
    #[error("invalid config `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("unknown player id {0} (expected 1 or 2)")]
    UnknownPlayer(u8),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type DuelResult<T> = Result<T, DuelError>;
