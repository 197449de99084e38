use serde::{Deserialize, Serialize};

use super::board_models::BoardId;
use crate::processing::sample_buffer::SampleBuffer;

/// Result of one completed acquisition cycle.
///
/// Serializable for structured export to whatever sink consumes the dump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionResult {
    /// Unique id of this cycle.
    pub cycle_id: String,
    pub board: BoardId,
    /// When streaming began, RFC 3339.
    pub started_at: String,
    /// How long the stream actually ran, in seconds.
    pub streamed_secs: f64,
    /// Everything the board buffered during the stream.
    pub buffer: SampleBuffer,
}

impl AcquisitionResult {
    pub fn new(
        board: BoardId,
        started_at: chrono::DateTime<chrono::Utc>,
        streamed_secs: f64,
        buffer: SampleBuffer,
    ) -> Self {
        Self {
            cycle_id: uuid::Uuid::new_v4().to_string(),
            board,
            started_at: started_at.to_rfc3339(),
            streamed_secs,
            buffer,
        }
    }

    /// Number of samples retrieved from the board.
    pub fn num_samples(&self) -> usize {
        self.buffer.len()
    }
}
