//! Error types shared across the crate.
//!
//! Two severities exist: structural errors (below) abort generation and
//! carry no partial output, while warnings are collected as plain
//! strings on the generator/map and never abort anything. Navigation
//! outcomes (blocked move, out-of-bounds query) are booleans and
//! sentinel tiles, not errors.

use thiserror::Error;

/// Failures of the random draw primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DrawError {
    #[error("cannot draw from an empty pool")]
    EmptyPool,

    #[error("pool holds {available} elements but {requested} unique draws were requested")]
    InsufficientPool { requested: usize, available: usize },
}

/// Structural failures during level generation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    /// The external grammar front end rejected the source text.
    #[error("syntax error in level source: {0}")]
    Syntax(String),

    /// A hallway was placed but never ended up between two rooms.
    #[error("hallway {0} is not connected to two rooms")]
    UnresolvedHallway(String),

    /// A room reference could not be resolved by the time the layout
    /// was finalized.
    #[error("room '{0}' was referenced but never resolved")]
    UnresolvedRoom(String),

    #[error("malformed layout: {0}")]
    MalformedLayout(String),

    #[error("level source is missing its {0} section")]
    MissingSection(&'static str),

    #[error(transparent)]
    Draw(#[from] DrawError),
}
