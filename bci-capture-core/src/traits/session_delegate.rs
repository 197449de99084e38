use std::time::Duration;

use crate::models::cycle_result::AcquisitionResult;
use crate::models::error::AcquisitionError;
use crate::models::state::CycleState;

/// Event delegate for acquisition cycle notifications.
///
/// All methods are called from the cycle worker thread, not the thread
/// that triggered the cycle. Implementations should marshal to their own
/// context if needed.
pub trait SessionDelegate: Send + Sync {
    /// Called when the cycle state changes.
    fn on_state_changed(&self, state: &CycleState);

    /// Called at a coarse tick while streaming, with the elapsed time.
    fn on_progress(&self, elapsed: Duration);

    /// Called when any step of the cycle fails. Fires at most once per
    /// cycle.
    fn on_error(&self, error: &AcquisitionError);

    /// Called when the cycle completes and the buffer has been retrieved.
    fn on_cycle_finished(&self, result: &AcquisitionResult);
}
