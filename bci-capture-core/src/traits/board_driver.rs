use crate::models::board_models::BoardId;
use crate::models::config::SessionParams;
use crate::models::error::AcquisitionError;
use crate::processing::sample_buffer::SampleBuffer;

/// Interface to a board backend owning the actual device session.
///
/// Implemented by:
/// - `SyntheticBoard` (bci-capture-synthetic)
/// - Future: serial OpenBCI and BLE Muse backends
///
/// Session lifecycle: `prepare_session` opens the device session,
/// `start_stream`/`stop_stream` bracket acquisition, `board_data` hands
/// over whatever was buffered, `release_session` closes the session.
/// After release the driver may be prepared again for a fresh session;
/// any other call against a released session must fail rather than touch
/// the device.
pub trait BoardDriver: Send {
    /// Which board this driver talks to.
    fn board_id(&self) -> BoardId;

    /// Whether the device can currently be reached.
    fn is_available(&self) -> bool;

    /// Open a device session.
    fn prepare_session(&mut self, params: &SessionParams) -> Result<(), AcquisitionError>;

    /// Begin streaming into the board's internal buffer.
    fn start_stream(&mut self) -> Result<(), AcquisitionError>;

    /// Stop streaming. Buffered samples remain retrievable.
    fn stop_stream(&mut self) -> Result<(), AcquisitionError>;

    /// Hand over everything buffered since the last retrieval, leaving the
    /// internal buffer empty.
    fn board_data(&mut self) -> Result<SampleBuffer, AcquisitionError>;

    /// Close the device session.
    fn release_session(&mut self) -> Result<(), AcquisitionError>;
}
