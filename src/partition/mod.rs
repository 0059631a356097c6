//! Partitioning of genome sequences into overlapping alignment windows.
//!
//! A [`SequenceCatalog`] holds each sequence's length and ungapped regions,
//! an [`UnplacedMatcher`] picks out scaffold-like sequences, and a
//! [`WindowPartitioner`] cuts the regions into [`Window`]s. The
//! [`GenomePartition`] orchestrator runs the steps in order.

mod catalog;
mod error;
mod genome;
pub mod io;
mod unplaced;
mod windows;

pub use catalog::{Region, SeqId, Sequence, SequenceCatalog};
pub use error::{ConfigError, DataError, PartitionError};
pub use genome::{GenomePartition, GenomePartitionBuilder};
pub use io::{read_lift, read_sizes, read_unplaced_specs, LiftEntry};
pub use unplaced::UnplacedMatcher;
pub use windows::{Window, WindowConfig, WindowPartitioner, WindowSet, WindowSpec, WindowView};
