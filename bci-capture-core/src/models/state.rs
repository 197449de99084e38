use super::cycle_result::AcquisitionResult;
use super::error::AcquisitionError;

/// Acquisition cycle state machine.
///
/// State transitions:
/// ```text
/// idle → acquiring → streaming → stopping → releasing → completed → idle
///             ↓           ↓          ↓           ↓
///                       failed  →  idle
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum CycleState {
    Idle,
    Acquiring,
    Streaming { elapsed_secs: f64 },
    Stopping,
    Releasing,
    Completed(Box<AcquisitionResult>),
    Failed(AcquisitionError),
}

impl CycleState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self, Self::Streaming { .. })
    }

    /// Whether a cycle is somewhere between acquiring and releasing.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::Acquiring | Self::Streaming { .. } | Self::Stopping | Self::Releasing
        )
    }

    /// Returns the elapsed streaming time if in a state that tracks it.
    pub fn elapsed(&self) -> Option<f64> {
        match self {
            Self::Streaming { elapsed_secs } => Some(*elapsed_secs),
            Self::Completed(result) => Some(result.streamed_secs),
            _ => None,
        }
    }
}
