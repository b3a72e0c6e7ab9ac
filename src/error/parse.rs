use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    // No fallback exists here: without a start time the battle cannot be
    // placed on the timeline at all, so the whole battle parse is aborted.
    // The batch driver isolates the failure to this one battle.
    #[error("Battle timing text {0:?} matches neither known duration grammar")]
    UnparseableTiming(String),
    #[error("Battle {0:?} has no sides")]
    NoSides(String),
}
