use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::board_models::BoardId;

/// Default streaming window.
pub const DEFAULT_STREAM_DURATION: Duration = Duration::from_millis(3000);

/// Longest streaming window a single cycle may request.
const MAX_STREAM_DURATION: Duration = Duration::from_secs(3600);

/// Connection parameters handed to the board backend.
///
/// Which fields matter depends on the transport: serial boards read
/// `serial_port`, BLE headbands read `mac_address`, networked boards read
/// `ip_address`/`ip_port`. The synthetic board ignores all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionParams {
    pub serial_port: Option<String>,
    pub mac_address: Option<String>,
    pub ip_address: Option<String>,
    pub ip_port: Option<u16>,
    /// Device discovery timeout in seconds, if the transport supports one.
    pub timeout_secs: Option<u32>,
}

/// Configuration for one acquisition cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionConfiguration {
    /// Which board to open a session against.
    pub board: BoardId,

    /// Transport parameters for the board backend.
    pub params: SessionParams,

    /// How long to stream before stopping and retrieving the buffer.
    pub duration: Duration,
}

impl AcquisitionConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.duration.is_zero() {
            return Err("stream duration must be non-zero".into());
        }
        if self.duration > MAX_STREAM_DURATION {
            return Err(format!(
                "stream duration exceeds {} seconds",
                MAX_STREAM_DURATION.as_secs()
            ));
        }
        Ok(())
    }
}

impl Default for AcquisitionConfiguration {
    fn default() -> Self {
        Self {
            board: BoardId::Synthetic,
            params: SessionParams::default(),
            duration: DEFAULT_STREAM_DURATION,
        }
    }
}
