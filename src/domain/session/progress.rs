//! Progress math
//!
//! Progress is derived, never stored: the service's figure wins when it
//! sends one, and these functions recompute the rest from slot or round
//! data after every update.

use super::slots::{SlotFill, SlotStatus};

/// Questions per round when the service does not say otherwise
pub const DEFAULT_QUESTIONS_PER_ROUND: u32 = 3;

/// Rounds in a quick-mode interview
pub const DEFAULT_TOTAL_ROUNDS: u32 = 3;

/// Slot-weighted completion percent.
///
/// Filled slots count fully, partial slots half. An empty slot set is
/// 0, not a division error.
pub fn slot_progress(slots: &[SlotStatus]) -> u8 {
    if slots.is_empty() {
        return 0;
    }
    let filled = slots.iter().filter(|s| s.status == SlotFill::Filled).count() as f64;
    let partial = slots.iter().filter(|s| s.status == SlotFill::Partial).count() as f64;
    let pct = (filled + 0.5 * partial) / slots.len() as f64 * 100.0;
    pct.round().clamp(0.0, 100.0) as u8
}

/// Round-based completion percent for quick mode.
///
/// `current_round` is 1-based; rounds before it count as fully
/// answered.
pub fn round_progress(
    current_round: u32,
    answered_in_round: u32,
    per_round: u32,
    total_rounds: u32,
) -> u8 {
    let denominator = (total_rounds * per_round) as f64;
    if denominator == 0.0 {
        return 0;
    }
    let completed = current_round.saturating_sub(1) * per_round + answered_in_round;
    let pct = completed as f64 / denominator * 100.0;
    pct.round().clamp(0.0, 100.0) as u8
}
