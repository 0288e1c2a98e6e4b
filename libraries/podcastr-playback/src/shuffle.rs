//! Shuffle selection
//!
//! Shuffle mode never reorders the queue. Each "next" draws a fresh index,
//! so the only state it needs is the queue length and the current position.

use rand::Rng;

/// Pick the next index in shuffle mode
///
/// Uniform over `[0, queue_len)`, excluding `current_index` whenever there is
/// any other episode to go to. A single-episode queue always yields 0.
///
/// `queue_len` must be non-zero.
pub fn next_shuffle_index<R: Rng>(
    rng: &mut R,
    queue_len: usize,
    current_index: Option<usize>,
) -> usize {
    debug_assert!(queue_len > 0, "shuffle over an empty queue");

    match current_index {
        Some(current) if queue_len > 1 && current < queue_len => {
            // Draw from the len-1 other slots and step over the current one
            let pick = rng.gen_range(0..queue_len - 1);
            if pick >= current {
                pick + 1
            } else {
                pick
            }
        }
        _ => rng.gen_range(0..queue_len.max(1)),
    }
}
