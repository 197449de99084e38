use serde::{Deserialize, Serialize};

/// Identifier of a supported acquisition board.
///
/// Integer codes follow the convention used by the wider BCI tooling
/// ecosystem: negative ids are virtual boards, non-negative ids are
/// physical hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardId {
    /// Hardware-free signal generator.
    Synthetic,
    /// OpenBCI Cyton (8 channels).
    Cyton,
    /// OpenBCI Ganglion (4 channels).
    Ganglion,
    /// OpenBCI Cyton + Daisy (16 channels).
    CytonDaisy,
    /// Muse S headband.
    MuseS,
    /// Muse 2 headband.
    Muse2,
}

impl BoardId {
    /// All boards this kit knows how to describe.
    pub fn all() -> &'static [BoardId] {
        &[
            Self::Synthetic,
            Self::Cyton,
            Self::Ganglion,
            Self::CytonDaisy,
            Self::MuseS,
            Self::Muse2,
        ]
    }

    /// Ecosystem integer code for this board.
    pub fn code(&self) -> i32 {
        match self {
            Self::Synthetic => -1,
            Self::Cyton => 0,
            Self::Ganglion => 1,
            Self::CytonDaisy => 2,
            Self::MuseS => 21,
            Self::Muse2 => 22,
        }
    }

    /// Human-readable board name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Synthetic => "Synthetic Board",
            Self::Cyton => "OpenBCI Cyton",
            Self::Ganglion => "OpenBCI Ganglion",
            Self::CytonDaisy => "OpenBCI Cyton+Daisy",
            Self::MuseS => "Muse S",
            Self::Muse2 => "Muse 2",
        }
    }

    /// Sampling rate in Hz.
    pub fn sampling_rate_hz(&self) -> f64 {
        match self {
            Self::Synthetic | Self::Cyton | Self::CytonDaisy => 250.0,
            Self::Ganglion => 200.0,
            Self::MuseS | Self::Muse2 => 256.0,
        }
    }

    /// Number of EEG channels.
    pub fn eeg_channel_count(&self) -> usize {
        match self {
            Self::Synthetic | Self::Cyton => 8,
            Self::Ganglion => 4,
            Self::CytonDaisy => 16,
            Self::MuseS | Self::Muse2 => 4,
        }
    }

    /// Full row-layout descriptor for this board.
    pub fn descriptor(&self) -> BoardDescriptor {
        BoardDescriptor::for_board(*self)
    }

    fn electrode_labels(&self) -> Vec<String> {
        // 10-20 positions where the hardware pins them down, generic
        // labels otherwise.
        match self {
            Self::Synthetic | Self::Cyton => ["Fp1", "Fp2", "F3", "F4", "C3", "C4", "O1", "O2"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            Self::MuseS | Self::Muse2 => ["TP9", "AF7", "AF8", "TP10"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            _ => (1..=self.eeg_channel_count())
                .map(|i| format!("EEG_{}", i))
                .collect(),
        }
    }
}

/// What a single row of the sample matrix carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    /// Monotonically increasing packet counter.
    PackageNum,
    /// EEG electrode.
    Eeg,
    /// Accelerometer axis.
    Accel,
    /// Acquisition timestamp (seconds since the Unix epoch).
    Timestamp,
    /// Event marker channel.
    Marker,
}

/// Description of one row in a board's sample matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowDesc {
    pub kind: RowKind,
    pub index: usize,
    pub label: String,
    pub unit: String,
}

/// Row layout of the sample matrix a board produces.
///
/// Samples are channel-major: each row is one channel, each column one
/// sample. Layout is always:
///
/// ```text
/// 0:            package number
/// 1..=N:        EEG channels
/// N+1..=N+3:    accelerometer X, Y, Z
/// N+4:          timestamp
/// N+5:          marker
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardDescriptor {
    pub board: BoardId,
    pub name: String,
    pub sampling_rate_hz: f64,
    pub rows: Vec<RowDesc>,
    pub eeg_rows: Vec<usize>,
    pub accel_rows: Vec<usize>,
    pub package_row: usize,
    pub timestamp_row: usize,
    pub marker_row: usize,
}

impl BoardDescriptor {
    pub fn for_board(board: BoardId) -> Self {
        let mut rows = Vec::new();

        rows.push(RowDesc {
            kind: RowKind::PackageNum,
            index: 0,
            label: "Package".to_string(),
            unit: String::new(),
        });

        let labels = board.electrode_labels();
        for (i, label) in labels.iter().enumerate() {
            rows.push(RowDesc {
                kind: RowKind::Eeg,
                index: 1 + i,
                label: label.clone(),
                unit: "uV".to_string(),
            });
        }

        let accel_base = 1 + labels.len();
        for (i, axis) in ["X", "Y", "Z"].iter().enumerate() {
            rows.push(RowDesc {
                kind: RowKind::Accel,
                index: accel_base + i,
                label: format!("Accel_{}", axis),
                unit: "g".to_string(),
            });
        }

        let timestamp_row = accel_base + 3;
        rows.push(RowDesc {
            kind: RowKind::Timestamp,
            index: timestamp_row,
            label: "Timestamp".to_string(),
            unit: "s".to_string(),
        });

        let marker_row = timestamp_row + 1;
        rows.push(RowDesc {
            kind: RowKind::Marker,
            index: marker_row,
            label: "Marker".to_string(),
            unit: String::new(),
        });

        Self {
            board,
            name: board.name().to_string(),
            sampling_rate_hz: board.sampling_rate_hz(),
            eeg_rows: (1..=labels.len()).collect(),
            accel_rows: (accel_base..accel_base + 3).collect(),
            package_row: 0,
            timestamp_row,
            marker_row,
            rows,
        }
    }

    /// Total number of rows in the sample matrix.
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }
}
