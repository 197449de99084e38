//! # bci-capture-synthetic
//!
//! Hardware-free board backend for bci-capture-kit.
//!
//! Provides:
//! - `SyntheticBoard` — a `BoardDriver` producing plausible EEG at the
//!   synthetic board's sampling rate, no device required
//! - `SignalModel` — the deterministic part of the generated signal
//!
//! ## Usage
//! ```ignore
//! use bci_capture_core::{AcquisitionConfiguration, AcquisitionSession};
//! use bci_capture_synthetic::SyntheticBoard;
//!
//! let board = SyntheticBoard::new();
//! let mut session = AcquisitionSession::new(board, AcquisitionConfiguration::default());
//! session.start_cycle().unwrap();
//! ```

pub mod signal_model;
pub mod synthetic_board;

pub use signal_model::SignalModel;
pub use synthetic_board::SyntheticBoard;
