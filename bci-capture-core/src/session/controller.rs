use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::models::config::AcquisitionConfiguration;
use crate::models::cycle_result::AcquisitionResult;
use crate::models::error::AcquisitionError;
use crate::models::state::CycleState;
use crate::traits::board_driver::BoardDriver;
use crate::traits::session_delegate::SessionDelegate;

/// How often the streaming wait reports progress.
const PROGRESS_TICK: Duration = Duration::from_millis(250);

/// Cancellable deadline timer for the streaming wait.
///
/// The cycle worker parks on the condvar in `PROGRESS_TICK` slices so the
/// wait can be ended early from another thread without busy-waiting and
/// without a blocking sleep pinning the full duration.
struct CycleTimer {
    cancelled: Mutex<bool>,
    condvar: Condvar,
}

impl CycleTimer {
    fn new() -> Self {
        Self {
            cancelled: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    fn reset(&self) {
        *self.cancelled.lock() = false;
    }

    fn cancel(&self) {
        *self.cancelled.lock() = true;
        self.condvar.notify_all();
    }

    /// Wait out `total`, invoking `tick` with the capped elapsed time at
    /// each wakeup. Returns false if the wait was cancelled early.
    fn wait(&self, total: Duration, mut tick: impl FnMut(Duration)) -> bool {
        let started = Instant::now();
        let deadline = started + total;
        let mut cancelled = self.cancelled.lock();
        loop {
            if *cancelled {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            let slice = PROGRESS_TICK.min(deadline - now);
            let _ = self.condvar.wait_for(&mut cancelled, slice);
            if !*cancelled {
                let elapsed = started.elapsed().min(total);
                MutexGuard::unlocked(&mut cancelled, || tick(elapsed));
            }
        }
    }
}

/// A prepared device session that releases itself on every exit path.
///
/// The happy path consumes the guard via `release()` so a release failure
/// surfaces as the cycle's error; if the cycle bails out earlier the drop
/// handler still closes the session, logging (not masking) any failure.
struct PreparedSession<'a, D: BoardDriver> {
    driver: &'a mut D,
    released: bool,
}

impl<'a, D: BoardDriver> PreparedSession<'a, D> {
    fn new(driver: &'a mut D) -> Self {
        Self {
            driver,
            released: false,
        }
    }

    fn release(mut self) -> Result<(), AcquisitionError> {
        self.released = true;
        self.driver.release_session()
    }
}

impl<D: BoardDriver> Deref for PreparedSession<'_, D> {
    type Target = D;

    fn deref(&self) -> &D {
        self.driver
    }
}

impl<D: BoardDriver> DerefMut for PreparedSession<'_, D> {
    fn deref_mut(&mut self) -> &mut D {
        self.driver
    }
}

impl<D: BoardDriver> Drop for PreparedSession<'_, D> {
    fn drop(&mut self) {
        if !self.released {
            if let Err(e) = self.driver.release_session() {
                log::warn!("failed to release session during cleanup: {}", e);
            }
        }
    }
}

/// Drives one acquisition cycle per trigger against a board backend.
///
/// Generic over the board via the `BoardDriver` trait. One cycle is:
/// prepare session → start stream → wait the configured window → stop
/// stream → retrieve the buffer → release session → report.
///
/// The cycle runs on a named worker thread, so triggering never blocks the
/// caller for the streaming window. Triggering while a cycle is in flight
/// is rejected with `CycleInProgress`; `cancel()` ends the streaming wait
/// early and the cycle finishes through the normal stop/retrieve/release
/// path.
pub struct AcquisitionSession<D: BoardDriver> {
    driver: Arc<Mutex<D>>,
    config: AcquisitionConfiguration,
    session_state: Arc<Mutex<CycleState>>,
    delegate: Option<Arc<dyn SessionDelegate>>,
    in_flight: Arc<AtomicBool>,
    timer: Arc<CycleTimer>,
    worker_handle: Option<thread::JoinHandle<()>>,
}

impl<D: BoardDriver + 'static> AcquisitionSession<D> {
    pub fn new(driver: D, config: AcquisitionConfiguration) -> Self {
        Self {
            driver: Arc::new(Mutex::new(driver)),
            config,
            session_state: Arc::new(Mutex::new(CycleState::Idle)),
            delegate: None,
            in_flight: Arc::new(AtomicBool::new(false)),
            timer: Arc::new(CycleTimer::new()),
            worker_handle: None,
        }
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn SessionDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn state(&self) -> CycleState {
        self.session_state.lock().clone()
    }

    pub fn config(&self) -> &AcquisitionConfiguration {
        &self.config
    }

    /// Trigger one acquisition cycle.
    ///
    /// Returns as soon as the cycle worker is running; results and errors
    /// are reported through the delegate and the log. A second trigger
    /// while a cycle is in flight fails with `CycleInProgress` and leaves
    /// the running cycle untouched.
    pub fn start_cycle(&mut self) -> Result<(), AcquisitionError> {
        self.config
            .validate()
            .map_err(AcquisitionError::InvalidConfiguration)?;

        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(AcquisitionError::CycleInProgress);
        }

        // The previous worker (if any) has finished; reap it.
        if let Some(handle) = self.worker_handle.take() {
            let _ = handle.join();
        }
        self.timer.reset();

        let driver = Arc::clone(&self.driver);
        let session_state = Arc::clone(&self.session_state);
        let delegate = self.delegate.clone();
        let timer = Arc::clone(&self.timer);
        let in_flight = Arc::clone(&self.in_flight);
        let config = self.config.clone();

        let spawned = thread::Builder::new()
            .name("acquisition-cycle".into())
            .spawn(move || {
                let outcome = {
                    let mut driver = driver.lock();
                    Self::drive_cycle(
                        &mut *driver,
                        &config,
                        &session_state,
                        delegate.as_ref(),
                        &timer,
                    )
                };

                match outcome {
                    Ok(result) => {
                        log::info!(
                            "acquisition cycle {} finished: {} samples in {:.2}s",
                            result.cycle_id,
                            result.num_samples(),
                            result.streamed_secs
                        );
                        Self::transition(
                            &session_state,
                            delegate.as_ref(),
                            CycleState::Completed(Box::new(result.clone())),
                        );
                        if let Some(ref d) = delegate {
                            d.on_cycle_finished(&result);
                        }
                    }
                    Err(e) => {
                        log::error!("error during streaming: {}", e);
                        if let Some(ref d) = delegate {
                            d.on_error(&e);
                        }
                        Self::transition(&session_state, delegate.as_ref(), CycleState::Failed(e));
                    }
                }

                // Ready for the next trigger.
                *session_state.lock() = CycleState::Idle;
                in_flight.store(false, Ordering::SeqCst);
            });

        match spawned {
            Ok(handle) => {
                self.worker_handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.in_flight.store(false, Ordering::SeqCst);
                Err(AcquisitionError::StreamFailure(format!(
                    "failed to spawn cycle worker: {}",
                    e
                )))
            }
        }
    }

    /// End the streaming wait of the in-flight cycle early.
    ///
    /// The cycle still stops the stream, retrieves the buffer, and
    /// releases the session. No-op when idle.
    pub fn cancel(&self) {
        self.timer.cancel();
    }

    /// Block until the in-flight cycle (if any) has finished.
    pub fn join(&mut self) {
        if let Some(handle) = self.worker_handle.take() {
            let _ = handle.join();
        }
    }

    // --- Internal helpers ---

    fn transition(
        session_state: &Mutex<CycleState>,
        delegate: Option<&Arc<dyn SessionDelegate>>,
        next: CycleState,
    ) {
        *session_state.lock() = next.clone();
        if let Some(d) = delegate {
            d.on_state_changed(&next);
        }
    }

    /// One full cycle against the board. Every exit path after
    /// `prepare_session` releases the session via `PreparedSession`.
    fn drive_cycle(
        driver: &mut D,
        config: &AcquisitionConfiguration,
        session_state: &Mutex<CycleState>,
        delegate: Option<&Arc<dyn SessionDelegate>>,
        timer: &CycleTimer,
    ) -> Result<AcquisitionResult, AcquisitionError> {
        Self::transition(session_state, delegate, CycleState::Acquiring);

        if !driver.is_available() {
            return Err(AcquisitionError::ConnectionFailure(format!(
                "{} is not available",
                config.board.name()
            )));
        }
        driver.prepare_session(&config.params)?;
        let mut session = PreparedSession::new(driver);

        let started_at = chrono::Utc::now();
        session.start_stream()?;
        log::info!("streaming started on {}", config.board.name());
        Self::transition(
            session_state,
            delegate,
            CycleState::Streaming { elapsed_secs: 0.0 },
        );

        let stream_clock = Instant::now();
        let ran_full = timer.wait(config.duration, |elapsed| {
            {
                let mut state = session_state.lock();
                if state.is_streaming() {
                    *state = CycleState::Streaming {
                        elapsed_secs: elapsed.as_secs_f64(),
                    };
                }
            }
            if let Some(d) = delegate {
                d.on_progress(elapsed);
            }
        });
        if !ran_full {
            log::debug!("streaming wait cancelled early");
        }

        Self::transition(session_state, delegate, CycleState::Stopping);
        session.stop_stream()?;
        let streamed_secs = stream_clock.elapsed().as_secs_f64();

        let buffer = session.board_data()?;

        Self::transition(session_state, delegate, CycleState::Releasing);
        session.release()?;

        Ok(AcquisitionResult::new(
            config.board,
            started_at,
            streamed_secs,
            buffer,
        ))
    }
}

impl<D: BoardDriver> Drop for AcquisitionSession<D> {
    fn drop(&mut self) {
        self.timer.cancel();
        if let Some(handle) = self.worker_handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::board_models::BoardId;
    use crate::models::config::SessionParams;
    use crate::processing::sample_buffer::SampleBuffer;

    /// Failure script for the driver: any step can be told to fail.
    #[derive(Default)]
    struct Script {
        fail_prepare: Option<AcquisitionError>,
        fail_start: Option<AcquisitionError>,
        fail_stop: Option<AcquisitionError>,
        fail_data: Option<AcquisitionError>,
        fail_release: Option<AcquisitionError>,
        frames: usize,
    }

    /// Driver that records the call sequence and fails on cue.
    struct ScriptedDriver {
        script: Script,
        calls: Arc<Mutex<Vec<&'static str>>>,
    }

    impl ScriptedDriver {
        fn new(script: Script) -> (Self, Arc<Mutex<Vec<&'static str>>>) {
            let calls = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    script,
                    calls: Arc::clone(&calls),
                },
                calls,
            )
        }

        fn step(
            &self,
            name: &'static str,
            fail: &Option<AcquisitionError>,
        ) -> Result<(), AcquisitionError> {
            self.calls.lock().push(name);
            match fail {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            }
        }
    }

    impl BoardDriver for ScriptedDriver {
        fn board_id(&self) -> BoardId {
            BoardId::Synthetic
        }

        fn is_available(&self) -> bool {
            true
        }

        fn prepare_session(&mut self, _params: &SessionParams) -> Result<(), AcquisitionError> {
            let fail = self.script.fail_prepare.clone();
            self.step("prepare", &fail)
        }

        fn start_stream(&mut self) -> Result<(), AcquisitionError> {
            let fail = self.script.fail_start.clone();
            self.step("start", &fail)
        }

        fn stop_stream(&mut self) -> Result<(), AcquisitionError> {
            let fail = self.script.fail_stop.clone();
            self.step("stop", &fail)
        }

        fn board_data(&mut self) -> Result<SampleBuffer, AcquisitionError> {
            self.calls.lock().push("data");
            if let Some(e) = &self.script.fail_data {
                return Err(e.clone());
            }
            let mut buffer = SampleBuffer::new(14, 1024);
            for i in 0..self.script.frames {
                buffer.push(vec![i as f64; 14]);
            }
            Ok(buffer)
        }

        fn release_session(&mut self) -> Result<(), AcquisitionError> {
            let fail = self.script.fail_release.clone();
            self.step("release", &fail)
        }
    }

    #[derive(Default)]
    struct Events {
        states: Vec<CycleState>,
        errors: Vec<AcquisitionError>,
        finished: Vec<AcquisitionResult>,
        progress_ticks: usize,
    }

    struct CollectingDelegate {
        events: Arc<Mutex<Events>>,
    }

    impl CollectingDelegate {
        fn new() -> (Arc<Self>, Arc<Mutex<Events>>) {
            let events = Arc::new(Mutex::new(Events::default()));
            (
                Arc::new(Self {
                    events: Arc::clone(&events),
                }),
                events,
            )
        }
    }

    impl SessionDelegate for CollectingDelegate {
        fn on_state_changed(&self, state: &CycleState) {
            self.events.lock().states.push(state.clone());
        }

        fn on_progress(&self, _elapsed: Duration) {
            self.events.lock().progress_ticks += 1;
        }

        fn on_error(&self, error: &AcquisitionError) {
            self.events.lock().errors.push(error.clone());
        }

        fn on_cycle_finished(&self, result: &AcquisitionResult) {
            self.events.lock().finished.push(result.clone());
        }
    }

    fn session_with(
        script: Script,
        duration: Duration,
    ) -> (
        AcquisitionSession<ScriptedDriver>,
        Arc<Mutex<Vec<&'static str>>>,
        Arc<Mutex<Events>>,
    ) {
        let (driver, calls) = ScriptedDriver::new(script);
        let config = AcquisitionConfiguration {
            duration,
            ..Default::default()
        };
        let mut session = AcquisitionSession::new(driver, config);
        let (delegate, events) = CollectingDelegate::new();
        session.set_delegate(delegate);
        (session, calls, events)
    }

    #[test]
    fn success_cycle_drives_board_in_order() {
        let script = Script {
            frames: 5,
            ..Default::default()
        };
        let (mut session, calls, events) = session_with(script, Duration::from_millis(30));

        session.start_cycle().unwrap();
        session.join();

        assert_eq!(
            *calls.lock(),
            vec!["prepare", "start", "stop", "data", "release"]
        );

        let events = events.lock();
        assert!(events.errors.is_empty());
        assert_eq!(events.finished.len(), 1);
        assert_eq!(events.finished[0].num_samples(), 5);
        assert!(session.state().is_idle());
    }

    #[test]
    fn state_machine_walks_the_full_sequence() {
        let (mut session, _calls, events) =
            session_with(Script::default(), Duration::from_millis(30));

        session.start_cycle().unwrap();
        session.join();

        let events = events.lock();
        assert_eq!(events.states.len(), 5);
        assert_eq!(events.states[0], CycleState::Acquiring);
        assert!(events.states[1].is_streaming());
        assert_eq!(events.states[2], CycleState::Stopping);
        assert_eq!(events.states[3], CycleState::Releasing);
        assert!(matches!(events.states[4], CycleState::Completed(_)));
        assert!(events.progress_ticks >= 1);
    }

    #[test]
    fn empty_buffer_completes_without_error() {
        let script = Script {
            frames: 0,
            ..Default::default()
        };
        let (mut session, _calls, events) = session_with(script, Duration::from_millis(30));

        session.start_cycle().unwrap();
        session.join();

        let events = events.lock();
        assert!(events.errors.is_empty());
        assert_eq!(events.finished.len(), 1);
        assert!(events.finished[0].buffer.is_empty());
    }

    #[test]
    fn trigger_does_not_block_for_the_streaming_window() {
        let (mut session, _calls, _events) =
            session_with(Script::default(), Duration::from_millis(300));

        let t0 = Instant::now();
        session.start_cycle().unwrap();
        assert!(t0.elapsed() < Duration::from_millis(200));

        let t1 = Instant::now();
        session.join();
        assert!(t1.elapsed() >= Duration::from_millis(250));
    }

    #[test]
    fn wait_runs_at_least_the_configured_duration() {
        let (mut session, _calls, _events) =
            session_with(Script::default(), Duration::from_millis(80));

        let t0 = Instant::now();
        session.start_cycle().unwrap();
        session.join();

        assert!(t0.elapsed() >= Duration::from_millis(80));
    }

    #[test]
    fn second_trigger_while_in_flight_is_rejected() {
        let (mut session, calls, events) =
            session_with(Script::default(), Duration::from_millis(400));

        session.start_cycle().unwrap();
        assert_eq!(
            session.start_cycle(),
            Err(AcquisitionError::CycleInProgress)
        );
        session.join();

        // The first cycle ran exactly once, unaffected.
        let calls = calls.lock();
        assert_eq!(calls.iter().filter(|c| **c == "prepare").count(), 1);
        assert_eq!(events.lock().finished.len(), 1);
    }

    #[test]
    fn start_failure_is_reported_once_and_still_releases() {
        let script = Script {
            fail_start: Some(AcquisitionError::ConnectionFailure(
                "connection refused".into(),
            )),
            ..Default::default()
        };
        let (mut session, calls, events) = session_with(script, Duration::from_millis(30));

        session.start_cycle().unwrap();
        session.join();

        assert_eq!(*calls.lock(), vec!["prepare", "start", "release"]);

        let events = events.lock();
        assert_eq!(
            events.errors,
            vec![AcquisitionError::ConnectionFailure("connection refused".into())]
        );
        assert!(events.finished.is_empty());
        // Streaming never began.
        assert!(!events.states.iter().any(|s| s.is_streaming()));
        assert!(session.state().is_idle());
    }

    #[test]
    fn retrieval_failure_still_releases() {
        let script = Script {
            fail_data: Some(AcquisitionError::RetrievalFailure("ringbuffer gone".into())),
            ..Default::default()
        };
        let (mut session, calls, events) = session_with(script, Duration::from_millis(30));

        session.start_cycle().unwrap();
        session.join();

        assert_eq!(
            *calls.lock(),
            vec!["prepare", "start", "stop", "data", "release"]
        );
        assert_eq!(events.lock().errors.len(), 1);
    }

    #[test]
    fn release_failure_on_success_path_is_the_cycle_error() {
        let script = Script {
            fail_release: Some(AcquisitionError::ReleaseFailure("device hung".into())),
            ..Default::default()
        };
        let (mut session, _calls, events) = session_with(script, Duration::from_millis(30));

        session.start_cycle().unwrap();
        session.join();

        let events = events.lock();
        assert_eq!(
            events.errors,
            vec![AcquisitionError::ReleaseFailure("device hung".into())]
        );
        assert!(events.finished.is_empty());
    }

    #[test]
    fn cancel_ends_the_wait_early_but_completes_the_cycle() {
        let (mut session, calls, events) = session_with(Script::default(), Duration::from_secs(5));

        let t0 = Instant::now();
        session.start_cycle().unwrap();
        thread::sleep(Duration::from_millis(100));
        session.cancel();
        session.join();

        assert!(t0.elapsed() < Duration::from_secs(3));
        assert_eq!(
            *calls.lock(),
            vec!["prepare", "start", "stop", "data", "release"]
        );
        let events = events.lock();
        assert!(events.errors.is_empty());
        assert_eq!(events.finished.len(), 1);
    }

    #[test]
    fn zero_duration_config_is_rejected_up_front() {
        let (mut session, calls, _events) = session_with(Script::default(), Duration::ZERO);

        let result = session.start_cycle();
        assert!(matches!(
            result,
            Err(AcquisitionError::InvalidConfiguration(_))
        ));
        assert!(calls.lock().is_empty());
    }

    #[test]
    fn session_can_run_consecutive_cycles() {
        let (mut session, calls, events) = session_with(Script::default(), Duration::from_millis(30));

        session.start_cycle().unwrap();
        session.join();
        session.start_cycle().unwrap();
        session.join();

        let calls = calls.lock();
        assert_eq!(calls.iter().filter(|c| **c == "prepare").count(), 2);
        assert_eq!(calls.iter().filter(|c| **c == "release").count(), 2);
        assert_eq!(events.lock().finished.len(), 2);
    }
}
