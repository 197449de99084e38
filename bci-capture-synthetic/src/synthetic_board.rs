//! Synthetic board driver.
//!
//! Generates plausible EEG frames at the synthetic board's sampling rate
//! on a dedicated thread, accumulating them into a bounded sample buffer
//! the way a real acquisition backend buffers between retrievals.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use rand::Rng;

use bci_capture_core::models::board_models::{BoardDescriptor, BoardId};
use bci_capture_core::models::config::SessionParams;
use bci_capture_core::models::error::AcquisitionError;
use bci_capture_core::processing::sample_buffer::SampleBuffer;
use bci_capture_core::traits::board_driver::BoardDriver;

use crate::signal_model::SignalModel;

/// How much history the internal buffer retains, in seconds.
const BUFFER_HISTORY_SECS: f64 = 30.0;

/// How often the generator thread wakes to top up the buffer.
const CHUNK_INTERVAL: Duration = Duration::from_millis(10);

/// Peak uniform noise added per EEG sample, in microvolts.
const NOISE_UV: f64 = 5.0;

/// Accelerometer jitter around rest, in g.
const ACCEL_JITTER_G: f64 = 0.02;

/// Hardware-free `BoardDriver` backed by a signal generator.
///
/// Honors the full session lifecycle: streaming requires a prepared
/// session, released sessions reject further calls, and a released driver
/// can be prepared again for a fresh session.
pub struct SyntheticBoard {
    descriptor: BoardDescriptor,
    buffer_capacity: usize,
    buffer: Arc<Mutex<SampleBuffer>>,
    running: Arc<AtomicBool>,
    stream_handle: Option<thread::JoinHandle<()>>,
    prepared: bool,
}

impl SyntheticBoard {
    pub fn new() -> Self {
        let descriptor = BoardId::Synthetic.descriptor();
        let buffer_capacity = (descriptor.sampling_rate_hz * BUFFER_HISTORY_SECS) as usize;
        Self {
            buffer: Arc::new(Mutex::new(SampleBuffer::new(
                descriptor.num_rows(),
                buffer_capacity,
            ))),
            buffer_capacity,
            descriptor,
            running: Arc::new(AtomicBool::new(false)),
            stream_handle: None,
            prepared: false,
        }
    }

    pub fn descriptor(&self) -> &BoardDescriptor {
        &self.descriptor
    }

    fn stop_generator(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.stream_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Default for SyntheticBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardDriver for SyntheticBoard {
    fn board_id(&self) -> BoardId {
        self.descriptor.board
    }

    fn is_available(&self) -> bool {
        // No hardware to probe.
        true
    }

    fn prepare_session(&mut self, _params: &SessionParams) -> Result<(), AcquisitionError> {
        if self.prepared {
            return Err(AcquisitionError::ConnectionFailure(
                "session already prepared".into(),
            ));
        }
        self.buffer.lock().clear();
        self.prepared = true;
        log::debug!("synthetic session prepared");
        Ok(())
    }

    fn start_stream(&mut self) -> Result<(), AcquisitionError> {
        if !self.prepared {
            return Err(AcquisitionError::StreamFailure("no prepared session".into()));
        }
        if self.stream_handle.is_some() {
            return Err(AcquisitionError::StreamFailure(
                "stream already running".into(),
            ));
        }

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let buffer = Arc::clone(&self.buffer);
        let descriptor = self.descriptor.clone();

        let handle = thread::Builder::new()
            .name("synthetic-stream".into())
            .spawn(move || generator_loop(&descriptor, &buffer, &running))
            .map_err(|e| {
                self.running.store(false, Ordering::SeqCst);
                AcquisitionError::StreamFailure(format!("failed to spawn stream thread: {}", e))
            })?;

        self.stream_handle = Some(handle);
        Ok(())
    }

    fn stop_stream(&mut self) -> Result<(), AcquisitionError> {
        if self.stream_handle.is_none() {
            return Err(AcquisitionError::StreamFailure("stream not running".into()));
        }
        self.stop_generator();
        Ok(())
    }

    fn board_data(&mut self) -> Result<SampleBuffer, AcquisitionError> {
        if !self.prepared {
            return Err(AcquisitionError::RetrievalFailure(
                "no prepared session".into(),
            ));
        }
        let fresh = SampleBuffer::new(self.descriptor.num_rows(), self.buffer_capacity);
        Ok(std::mem::replace(&mut *self.buffer.lock(), fresh))
    }

    fn release_session(&mut self) -> Result<(), AcquisitionError> {
        if !self.prepared {
            return Err(AcquisitionError::ReleaseFailure(
                "no session to release".into(),
            ));
        }
        // A stream left running (release on a failure path) is stopped here.
        if self.stream_handle.is_some() {
            self.stop_generator();
        }
        self.prepared = false;
        log::debug!("synthetic session released");
        Ok(())
    }
}

impl Drop for SyntheticBoard {
    fn drop(&mut self) {
        self.stop_generator();
    }
}

/// Generator loop on the `synthetic-stream` thread.
///
/// Produces frames against wall-clock time rather than a fixed count per
/// wakeup, so the sample rate holds even when the thread wakes late.
fn generator_loop(descriptor: &BoardDescriptor, buffer: &Mutex<SampleBuffer>, running: &AtomicBool) {
    let signal = SignalModel::new(descriptor.eeg_rows.len());
    let mut rng = rand::thread_rng();
    let rate = descriptor.sampling_rate_hz;
    let started = Instant::now();
    let mut produced: u64 = 0;
    let mut sequence: u32 = 0;

    while running.load(Ordering::SeqCst) {
        thread::sleep(CHUNK_INTERVAL);

        let target = (started.elapsed().as_secs_f64() * rate) as u64;
        while produced < target {
            let t = produced as f64 / rate;
            let frame = build_frame(descriptor, &signal, &mut rng, sequence, t);
            buffer.lock().push(frame);
            produced += 1;
            sequence = sequence.wrapping_add(1);
        }
    }
}

fn build_frame(
    descriptor: &BoardDescriptor,
    signal: &SignalModel,
    rng: &mut impl Rng,
    sequence: u32,
    t: f64,
) -> Vec<f64> {
    let mut frame = vec![0.0; descriptor.num_rows()];
    frame[descriptor.package_row] = sequence as f64;

    for (channel, &row) in descriptor.eeg_rows.iter().enumerate() {
        frame[row] = signal.sample(channel, t) + rng.gen_range(-NOISE_UV..NOISE_UV);
    }

    // Device at rest: gravity on Z, jitter on all axes.
    frame[descriptor.accel_rows[0]] = rng.gen_range(-ACCEL_JITTER_G..ACCEL_JITTER_G);
    frame[descriptor.accel_rows[1]] = rng.gen_range(-ACCEL_JITTER_G..ACCEL_JITTER_G);
    frame[descriptor.accel_rows[2]] = 1.0 + rng.gen_range(-ACCEL_JITTER_G..ACCEL_JITTER_G);

    frame[descriptor.timestamp_row] = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);
    frame[descriptor.marker_row] = 0.0;

    frame
}
