//! Sliding-window partitioning of catalog regions.
//!
//! Placed sequences have their regions bridged across short gaps and are then
//! cut into windows of `window_size` bases that overlap by `overlap`. Unplaced
//! sequences get exactly one window per region, dropping regions shorter than
//! `min_unplaced_size`.

use std::fmt;

use tracing::debug;

use super::catalog::{Region, SeqId, Sequence, SequenceCatalog};
use super::error::{ConfigError, DataError};

/// Parameters controlling window layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WindowConfig {
    /// Nominal window width in bases.
    pub window_size: u64,
    /// Bases shared by consecutive windows of a range.
    pub overlap: u64,
    /// Gaps strictly shorter than this are bridged.
    pub max_gap: u64,
    /// Unplaced regions shorter than this are dropped.
    pub min_unplaced_size: u64,
}

impl WindowConfig {
    /// Configuration with no gap bridging and no unplaced size floor.
    pub fn new(window_size: u64, overlap: u64) -> Self {
        Self {
            window_size,
            overlap,
            max_gap: 0,
            min_unplaced_size: 0,
        }
    }

    /// Set the gap-bridging threshold.
    pub fn with_max_gap(mut self, max_gap: u64) -> Self {
        self.max_gap = max_gap;
        self
    }

    /// Set the minimum size of an emitted unplaced region.
    pub fn with_min_unplaced_size(mut self, min_unplaced_size: u64) -> Self {
        self.min_unplaced_size = min_unplaced_size;
        self
    }

    /// Check `window_size > 0` and `overlap < window_size`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size == 0 {
            return Err(ConfigError::ZeroWindowSize);
        }
        if self.overlap >= self.window_size {
            return Err(ConfigError::OverlapTooLarge {
                overlap: self.overlap,
                window_size: self.window_size,
            });
        }
        Ok(())
    }

    /// Distance between the starts of consecutive windows.
    pub fn stride(&self) -> u64 {
        self.window_size - self.overlap
    }
}

/// A sub-interval of a sequence assigned to one alignment job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Window {
    /// Owning sequence.
    pub seq: SeqId,
    /// Inclusive start.
    pub start: u64,
    /// Exclusive end.
    pub end: u64,
}

impl Window {
    /// Width of the window.
    pub fn size(&self) -> u64 {
        self.end - self.start
    }
}

/// A window paired with the sequence it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct WindowView<'a> {
    /// The window itself.
    pub window: Window,
    /// Its sequence.
    pub sequence: &'a Sequence,
}

impl WindowView<'_> {
    /// Width of the window.
    pub fn size(&self) -> u64 {
        self.window.size()
    }

    /// True when the window spans the whole sequence.
    pub fn is_full_seq(&self) -> bool {
        self.size() == self.sequence.length()
    }

    /// Specification string handed to downstream aligners.
    pub fn spec(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for WindowView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_full_seq() {
            write!(f, "{}", self.sequence.name())
        } else {
            write!(
                f,
                "{}:{}:{}-{}",
                self.sequence.name(),
                self.sequence.length(),
                self.window.start,
                self.window.end
            )
        }
    }
}

/// Parsed window specification string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowSpec {
    /// Bare sequence id covering the whole sequence.
    Full {
        /// Sequence id.
        seq: String,
    },
    /// `id:length:start-end`.
    Sub {
        /// Sequence id.
        seq: String,
        /// Declared sequence length.
        length: u64,
        /// Window start.
        start: u64,
        /// Window end.
        end: u64,
    },
}

impl WindowSpec {
    /// Parse a specification string.
    ///
    /// Anything that is not a well-formed `id:length:start-end` is read as a
    /// bare id. Splitting is from the right, so ids may contain `:`.
    pub fn parse(spec: &str) -> Self {
        Self::parse_sub(spec).unwrap_or_else(|| WindowSpec::Full {
            seq: spec.to_string(),
        })
    }

    fn parse_sub(spec: &str) -> Option<Self> {
        let mut parts = spec.rsplitn(3, ':');
        let range = parts.next()?;
        let length: u64 = parts.next()?.parse().ok()?;
        let seq = parts.next()?;
        let (start, end) = range.split_once('-')?;
        let (start, end): (u64, u64) = (start.parse().ok()?, end.parse().ok()?);
        if seq.is_empty() || start >= end {
            return None;
        }
        Some(WindowSpec::Sub {
            seq: seq.to_string(),
            length,
            start,
            end,
        })
    }

    /// Sequence id named by the spec.
    pub fn seq(&self) -> &str {
        match self {
            WindowSpec::Full { seq } | WindowSpec::Sub { seq, .. } => seq,
        }
    }

    /// Resolve to `(id, start, end)` against a catalog.
    pub fn resolve(&self, catalog: &SequenceCatalog) -> Result<(String, u64, u64), DataError> {
        match self {
            WindowSpec::Full { seq } => {
                let sequence = catalog
                    .get(seq)
                    .ok_or_else(|| DataError::UnknownSequence(seq.clone()))?;
                Ok((seq.clone(), 0, sequence.length()))
            }
            WindowSpec::Sub {
                seq, start, end, ..
            } => Ok((seq.clone(), *start, *end)),
        }
    }
}

/// Ordered, immutable list of windows for a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowSet {
    windows: Vec<Window>,
}

impl WindowSet {
    /// Number of windows.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// True when no windows were produced.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Windows in production order.
    pub fn as_slice(&self) -> &[Window] {
        &self.windows
    }

    /// Windows paired with their sequences.
    ///
    /// # Panics
    ///
    /// Panics if `catalog` is not the one the set was partitioned from and
    /// holds fewer sequences.
    pub fn views<'a>(
        &'a self,
        catalog: &'a SequenceCatalog,
    ) -> impl Iterator<Item = WindowView<'a>> + 'a {
        self.windows.iter().map(move |&window| WindowView {
            window,
            sequence: catalog.sequence(window.seq),
        })
    }
}

/// Turns catalog regions into windows.
#[derive(Debug, Clone)]
pub struct WindowPartitioner {
    config: WindowConfig,
}

impl WindowPartitioner {
    /// Validate the configuration and build a partitioner.
    pub fn new(config: WindowConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration.
    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Partition every sequence of the catalog, in catalog order.
    pub fn partition(&self, catalog: &SequenceCatalog) -> WindowSet {
        let mut windows = Vec::new();
        for (id, seq) in catalog.iter() {
            let before = windows.len();
            if seq.is_unplaced() {
                self.partition_unplaced(id, seq, &mut windows);
            } else {
                for range in self.merge_regions(seq.regions()) {
                    self.slide(id, range, &mut windows);
                }
            }
            debug!(
                seq = seq.name(),
                unplaced = seq.is_unplaced(),
                windows = windows.len() - before,
                "partitioned sequence"
            );
        }
        WindowSet { windows }
    }

    /// Bridge consecutive regions separated by less than `max_gap` bases.
    pub fn merge_regions(&self, regions: &[Region]) -> Vec<Region> {
        let mut merged: Vec<Region> = Vec::with_capacity(regions.len());
        for region in regions {
            match merged.last_mut() {
                Some(last) if region.start.saturating_sub(last.end) < self.config.max_gap => {
                    last.end = region.end;
                }
                _ => merged.push(*region),
            }
        }
        merged
    }

    /// Slide a frame across one merged range.
    ///
    /// A frame whose end plus `overlap` reaches the range end is stretched or
    /// cut to the range end and is the last one emitted.
    fn slide(&self, seq: SeqId, range: Region, out: &mut Vec<Window>) {
        let WindowConfig {
            window_size,
            overlap,
            ..
        } = self.config;
        let mut start = range.start;
        loop {
            let mut end = start.saturating_add(window_size);
            if end.saturating_add(overlap) >= range.end {
                end = range.end;
            }
            out.push(Window { seq, start, end });
            if end >= range.end {
                break;
            }
            start = end - overlap;
        }
    }

    fn partition_unplaced(&self, seq: SeqId, sequence: &Sequence, out: &mut Vec<Window>) {
        out.extend(
            sequence
                .regions()
                .iter()
                .filter(|region| !region.is_empty())
                .filter(|region| region.len() >= self.config.min_unplaced_size)
                .map(|region| Window {
                    seq,
                    start: region.start,
                    end: region.end,
                }),
        );
    }
}
