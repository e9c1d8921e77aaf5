use crate::api::types::WriteAction;

use super::cursor;
use super::state::AppState;

/// Runs after every key: keeps blocks in start-time order unless a grab or move
/// confirmation owns the order, then repairs the cursor.
pub(super) fn apply(state: &mut AppState) {
    if !state.mode.suspends_auto_sort() {
        if let Some(from_index) = state.schedule.sort_by_time() {
            tracing::debug!(target: "planner.order", from_index, "blocks re-sorted");
            state.outbox.push(WriteAction::ReorderBlockIndices {
                day_id: state.schedule.day_id.clone(),
                from_index,
            });
        }
    }
    cursor::reconcile(state);
}
