//! # Genome alignment windows and process pipelines
//!
//! This library cuts a genome's sequences into overlapping windows sized for
//! large alignment jobs, and chains external tools into pipelines with
//! aggregated failure reporting.
//!
//! ## Partitioning
//!
//! 1. **Catalog**: one record per sequence, from a size source (`id -> length`)
//! 2. **Unplaced flagging**: names or globs select scaffold-like sequences
//! 3. **Lift regions**: ungapped regions replace the default full-length one
//! 4. **Windows**: placed sequences are bridged across short gaps and cut with
//!    a sliding frame; unplaced sequences get one window per region
//!
//! ## Usage Example
//!
//! ```
//! use genome_windows::GenomePartition;
//!
//! let partition = GenomePartition::builder()
//!     .window_size(400)
//!     .overlap(50)
//!     .max_gap(10)
//!     .build([("chr1", 1000)])?;
//! assert_eq!(
//!     partition.specs(),
//!     ["chr1:1000:0-400", "chr1:1000:350-750", "chr1:1000:700-1000"]
//! );
//! # Ok::<(), genome_windows::PartitionError>(())
//! ```
//!
//! Window specs are usually handed to an aligner run through a
//! [`Pipeline`], which wires stage stdout to stdin and reports the first
//! stage to exit non-zero.

#![warn(missing_docs, missing_debug_implementations)]

pub mod partition; // Catalog, unplaced matching and window layout
pub mod pipeline; // External process chaining

// Re-exports for convenience
pub use partition::{
    ConfigError, DataError, GenomePartition, GenomePartitionBuilder, LiftEntry, PartitionError,
    Region, SeqId, Sequence, SequenceCatalog, UnplacedMatcher, Window, WindowConfig,
    WindowPartitioner, WindowSet, WindowSpec,
};
pub use pipeline::{PipeEnd, PipeMode, Pipeline, PipelineError, StageExit, StageFailure};
