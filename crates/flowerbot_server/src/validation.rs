//! Syntactic input checks, run before any state is touched.
//!
//! The service and the REST client apply the same rules, so a client can
//! reject bad input without a round trip.

use crate::error::GameError;
use flowerbot_core::{MAX_BOARD_SIZE, MIN_BOARD_SIZE};

/// Rejects blank game names.
///
/// # Errors
///
/// Returns a validation error if `name` is empty or whitespace only.
#[track_caller]
pub fn validate_name(name: &str) -> Result<(), GameError> {
    if name.trim().is_empty() {
        return Err(GameError::validation("Game name cannot be empty"));
    }
    Ok(())
}

/// Rejects board sizes outside `3..=50`.
///
/// # Errors
///
/// Returns a validation error for out-of-range sizes.
#[track_caller]
pub fn validate_board_size(size: u32) -> Result<(), GameError> {
    if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
        return Err(GameError::validation(format!(
            "Board size must be between {MIN_BOARD_SIZE} and {MAX_BOARD_SIZE}"
        )));
    }
    Ok(())
}

/// Rejects blank game ids.
///
/// # Errors
///
/// Returns a validation error if `id` is empty or whitespace only.
#[track_caller]
pub fn validate_game_id(id: &str) -> Result<(), GameError> {
    if id.trim().is_empty() {
        return Err(GameError::validation("Game ID cannot be empty"));
    }
    Ok(())
}
