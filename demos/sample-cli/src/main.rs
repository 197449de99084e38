//! One-shot acquisition demo.
//!
//! Plays the role of the "start" button in a hosted UI: a single trigger
//! runs one acquisition cycle against the synthetic board and dumps the
//! retrieved buffer to the log sink.

use std::sync::Arc;
use std::time::Duration;

use bci_capture_core::{
    AcquisitionConfiguration, AcquisitionError, AcquisitionResult, AcquisitionSession, CycleState,
    SessionDelegate,
};
use bci_capture_synthetic::SyntheticBoard;

/// Forwards session events to the log.
struct LogDelegate;

impl SessionDelegate for LogDelegate {
    fn on_state_changed(&self, state: &CycleState) {
        log::debug!("cycle state: {:?}", state);
    }

    fn on_progress(&self, elapsed: Duration) {
        log::debug!("streaming, {:.2}s elapsed", elapsed.as_secs_f64());
    }

    fn on_error(&self, error: &AcquisitionError) {
        log::error!("error during streaming: {}", error);
    }

    fn on_cycle_finished(&self, result: &AcquisitionResult) {
        log::info!(
            "retrieved {} samples across {} rows",
            result.num_samples(),
            result.buffer.num_rows()
        );
        match serde_json::to_string(result) {
            Ok(json) => log::info!("{}", json),
            Err(e) => log::error!("failed to serialize result: {}", e),
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let board = SyntheticBoard::new();
    let mut session = AcquisitionSession::new(board, AcquisitionConfiguration::default());
    session.set_delegate(Arc::new(LogDelegate));

    if let Err(e) = session.start_cycle() {
        log::error!("could not start acquisition cycle: {}", e);
        std::process::exit(1);
    }
    session.join();
}
