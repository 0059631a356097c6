//! Orchestration of catalog loading, unplaced flagging and partitioning.

use std::collections::HashSet;
use std::fmt;

use tracing::info;

use super::catalog::SequenceCatalog;
use super::error::PartitionError;
use super::io::LiftEntry;
use super::unplaced::UnplacedMatcher;
use super::windows::{WindowConfig, WindowPartitioner, WindowSet, WindowView};

/// A genome's catalog together with the windows cut from it.
#[derive(Debug, Clone)]
pub struct GenomePartition {
    catalog: SequenceCatalog,
    windows: WindowSet,
    config: WindowConfig,
}

impl GenomePartition {
    /// Start configuring a partition.
    pub fn builder() -> GenomePartitionBuilder {
        GenomePartitionBuilder::default()
    }

    /// Load sizes, flag unplaced sequences, apply lift regions and partition.
    ///
    /// Unplaced flagging happens before lift loading so every sequence has
    /// its policy settled before its regions change. Any error aborts the
    /// whole build.
    pub fn build<I, S>(
        sizes: I,
        config: WindowConfig,
        lift: Option<&[LiftEntry]>,
        unplaced: Option<&UnplacedMatcher>,
        skip: &HashSet<String>,
    ) -> Result<Self, PartitionError>
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let partitioner = WindowPartitioner::new(config)?;
        let mut catalog = SequenceCatalog::load(sizes, skip)?;

        if let Some(matcher) = unplaced {
            catalog.flag_unplaced(matcher);
        }
        if let Some(entries) = lift {
            catalog.load_regions(entries)?;
        }

        let windows = partitioner.partition(&catalog);
        info!(
            sequences = catalog.len(),
            windows = windows.len(),
            window_size = config.window_size,
            overlap = config.overlap,
            "genome partitioned"
        );

        Ok(Self {
            catalog,
            windows,
            config,
        })
    }

    /// The loaded catalog.
    pub fn catalog(&self) -> &SequenceCatalog {
        &self.catalog
    }

    /// The windows, in catalog then start order.
    pub fn windows(&self) -> &WindowSet {
        &self.windows
    }

    /// Configuration used to cut the windows.
    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Windows paired with their sequences.
    pub fn views(&self) -> impl Iterator<Item = WindowView<'_>> {
        self.windows.views(&self.catalog)
    }

    /// Specification strings for every window.
    pub fn specs(&self) -> Vec<String> {
        self.views().map(|view| view.spec()).collect()
    }

    /// Deterministic listing of every sequence's regions, then every window.
    ///
    /// Same text as the [`Display`](fmt::Display) rendering.
    pub fn dump(&self) -> String {
        self.to_string()
    }

    /// BLAKE3 digest of [`dump`](Self::dump), for cheap reproducibility checks.
    pub fn fingerprint(&self) -> blake3::Hash {
        blake3::hash(self.dump().as_bytes())
    }
}

impl fmt::Display for GenomePartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "#sequences")?;
        for (_, seq) in self.catalog.iter() {
            let policy = if seq.is_unplaced() { "unplaced" } else { "placed" };
            write!(f, "{}\t{}\t{}\t", seq.name(), seq.length(), policy)?;
            if seq.regions().is_empty() {
                f.write_str("-")?;
            }
            for (idx, region) in seq.regions().iter().enumerate() {
                if idx > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{}-{}", region.start, region.end)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "#windows")?;
        for view in self.views() {
            writeln!(
                f,
                "{}\t{}\t{}\t{}",
                view,
                view.window.start,
                view.window.end,
                view.size()
            )?;
        }
        Ok(())
    }
}

/// Collects [`GenomePartition::build`] arguments.
#[derive(Debug, Clone, Default)]
pub struct GenomePartitionBuilder {
    window_size: u64,
    overlap: u64,
    max_gap: u64,
    min_unplaced_size: u64,
    lift: Option<Vec<LiftEntry>>,
    unplaced: Vec<String>,
    skip: HashSet<String>,
}

impl GenomePartitionBuilder {
    /// Window width in bases.
    pub fn window_size(mut self, window_size: u64) -> Self {
        self.window_size = window_size;
        self
    }

    /// Bases shared between consecutive windows.
    pub fn overlap(mut self, overlap: u64) -> Self {
        self.overlap = overlap;
        self
    }

    /// Gaps shorter than this are bridged.
    pub fn max_gap(mut self, max_gap: u64) -> Self {
        self.max_gap = max_gap;
        self
    }

    /// Drop unplaced regions shorter than this.
    pub fn min_unplaced_size(mut self, min_unplaced_size: u64) -> Self {
        self.min_unplaced_size = min_unplaced_size;
        self
    }

    /// Ungapped regions replacing the default full-length ones.
    pub fn lift(mut self, entries: Vec<LiftEntry>) -> Self {
        self.lift = Some(entries);
        self
    }

    /// Names or globs of unplaced sequences.
    pub fn unplaced<I, S>(mut self, specs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unplaced.extend(specs.into_iter().map(Into::into));
        self
    }

    /// Sequence ids left out of the catalog.
    pub fn skip<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip.extend(ids.into_iter().map(Into::into));
        self
    }

    /// The window configuration assembled so far.
    pub fn config(&self) -> WindowConfig {
        WindowConfig::new(self.window_size, self.overlap)
            .with_max_gap(self.max_gap)
            .with_min_unplaced_size(self.min_unplaced_size)
    }

    /// Build the partition from `(id, length)` pairs.
    pub fn build<I, S>(self, sizes: I) -> Result<GenomePartition, PartitionError>
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let config = self.config();
        config.validate()?;
        let matcher = UnplacedMatcher::new(&self.unplaced)?;
        GenomePartition::build(
            sizes,
            config,
            self.lift.as_deref(),
            Some(&matcher),
            &self.skip,
        )
    }
}
