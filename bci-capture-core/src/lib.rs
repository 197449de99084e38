//! # bci-capture-core
//!
//! Platform-agnostic BCI acquisition core library.
//!
//! Provides board contracts, sample buffering, and acquisition-cycle
//! orchestration. Board backends (synthetic signal generator, serial/BLE
//! headsets) implement the `BoardDriver` trait and plug into the generic
//! `AcquisitionSession`.
//!
//! ## Architecture
//!
//! ```text
//! bci-capture-core (this crate)
//! ├── traits/       ← BoardDriver, SessionDelegate
//! ├── models/       ← AcquisitionError, CycleState, AcquisitionConfiguration, BoardId, etc.
//! ├── processing/   ← SampleBuffer (bounded channel-major sample store)
//! └── session/      ← AcquisitionSession (generic cycle orchestrator)
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::board_models::{BoardDescriptor, BoardId, RowDesc, RowKind};
pub use models::config::{AcquisitionConfiguration, SessionParams};
pub use models::cycle_result::AcquisitionResult;
pub use models::error::AcquisitionError;
pub use models::state::CycleState;
pub use processing::sample_buffer::SampleBuffer;
pub use session::controller::AcquisitionSession;
pub use traits::board_driver::BoardDriver;
pub use traits::session_delegate::SessionDelegate;
