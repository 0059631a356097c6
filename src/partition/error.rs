use thiserror::Error;

/// Invalid partitioner parameters. Raised at construction, never deferred.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Window size must be positive.
    #[error("window size must be greater than zero")]
    ZeroWindowSize,

    /// Overlap must be strictly smaller than the window size.
    #[error("overlap {overlap} must be less than window size {window_size}")]
    OverlapTooLarge {
        /// Requested overlap.
        overlap: u64,
        /// Requested window size.
        window_size: u64,
    },

    /// An unplaced-sequence pattern could not be compiled.
    #[error("invalid unplaced pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// Pattern as supplied.
        pattern: String,
        /// Compiler message.
        reason: String,
    },
}

/// Malformed or missing size/lift input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    /// The size source produced no sequences.
    #[error("sequence size source is empty")]
    EmptySizeSource,

    /// A sequence id appeared twice in the size source.
    #[error("duplicate sequence in size source: {0}")]
    DuplicateSequence(String),

    /// Input referenced a sequence that is not in the catalog.
    #[error("sequence not found in catalog: {0}")]
    UnknownSequence(String),

    /// Lift entries for a sequence were not in ascending order.
    #[error("lift regions for {seq} are not ascending: {start} follows region ending at {previous_end}")]
    UnsortedRegions {
        /// Sequence id.
        seq: String,
        /// Start of the offending region.
        start: u64,
        /// End of the region preceding it.
        previous_end: u64,
    },

    /// A region was empty or extended past the sequence.
    #[error("region {start}-{end} is invalid for {seq} of length {length}")]
    RegionOutOfBounds {
        /// Sequence id.
        seq: String,
        /// Region start.
        start: u64,
        /// Region end.
        end: u64,
        /// Sequence length from the size source.
        length: u64,
    },

    /// Lift description disagrees with the size source about a length.
    #[error("lift gives size {lift_size} for {seq}, size source gives {catalog_size}")]
    SizeMismatch {
        /// Sequence id.
        seq: String,
        /// Size declared by the lift row.
        lift_size: u64,
        /// Size recorded in the catalog.
        catalog_size: u64,
    },

    /// An input line could not be parsed.
    #[error("line {line}: {reason}")]
    Malformed {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// Reading the input failed.
    #[error("read failed: {0}")]
    Io(String),
}

impl DataError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        DataError::Malformed {
            line,
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for DataError {
    fn from(err: std::io::Error) -> Self {
        DataError::Io(err.to_string())
    }
}

/// Any failure that aborts partitioning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartitionError {
    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid input data.
    #[error("data error: {0}")]
    Data(#[from] DataError),
}
