//! Per-sequence lengths and ungapped regions.
//!
//! Sequences live in an arena indexed by [`SeqId`], with a name index on the
//! side. Windows refer back to their sequence by id rather than by reference.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::error::DataError;
use super::io::LiftEntry;
use super::unplaced::UnplacedMatcher;

/// Half-open interval `[start, end)` on a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Region {
    /// Inclusive start.
    pub start: u64,
    /// Exclusive end.
    pub end: u64,
}

impl Region {
    /// Construct a region.
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Number of bases covered.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// True for a zero-width region.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Index of a sequence within its catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SeqId(pub usize);

/// One named sequence of the genome.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Sequence {
    name: String,
    length: u64,
    regions: Vec<Region>,
    unplaced: bool,
}

impl Sequence {
    fn new(name: String, length: u64) -> Self {
        let regions = if length > 0 {
            vec![Region::new(0, length)]
        } else {
            Vec::new()
        };
        Self {
            name,
            length,
            regions,
            unplaced: false,
        }
    }

    /// Sequence id.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total length in bases.
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Ungapped regions, ascending and non-overlapping.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Whether the one-window-per-region policy applies.
    pub fn is_unplaced(&self) -> bool {
        self.unplaced
    }
}

/// Ordered, named collection of sequences.
#[derive(Debug, Clone, Default)]
pub struct SequenceCatalog {
    sequences: Vec<Sequence>,
    index: HashMap<String, SeqId>,
    skipped: HashSet<String>,
}

impl SequenceCatalog {
    /// Populate a catalog from `(id, length)` pairs, leaving out ids in `skip`.
    ///
    /// Each sequence starts with a single region spanning its full length.
    pub fn load<I, S>(sizes: I, skip: &HashSet<String>) -> Result<Self, DataError>
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let mut catalog = Self {
            skipped: skip.clone(),
            ..Self::default()
        };
        let mut seen_any = false;

        for (name, length) in sizes {
            seen_any = true;
            let name = name.into();
            if skip.contains(&name) {
                debug!(seq = %name, "skipping sequence");
                continue;
            }
            if catalog.index.contains_key(&name) {
                return Err(DataError::DuplicateSequence(name));
            }
            let id = SeqId(catalog.sequences.len());
            catalog.index.insert(name.clone(), id);
            catalog.sequences.push(Sequence::new(name, length));
        }

        if !seen_any || catalog.sequences.is_empty() {
            return Err(DataError::EmptySizeSource);
        }
        Ok(catalog)
    }

    /// Number of sequences.
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    /// True when the catalog holds no sequences.
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Look up a sequence id by name.
    pub fn id_of(&self, name: &str) -> Option<SeqId> {
        self.index.get(name).copied()
    }

    /// Look up a sequence by name.
    pub fn get(&self, name: &str) -> Option<&Sequence> {
        self.id_of(name).map(|id| &self.sequences[id.0])
    }

    /// Sequence for an id handed out by this catalog.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this catalog and is out of range.
    /// Use [`get`](Self::get) for lookups by untrusted name.
    pub fn sequence(&self, id: SeqId) -> &Sequence {
        &self.sequences[id.0]
    }

    /// Sequences in load order, with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (SeqId, &Sequence)> {
        self.sequences
            .iter()
            .enumerate()
            .map(|(idx, seq)| (SeqId(idx), seq))
    }

    /// Mark every sequence the matcher accepts as unplaced. Returns the count.
    pub fn flag_unplaced(&mut self, matcher: &UnplacedMatcher) -> usize {
        let mut flagged = 0;
        for seq in &mut self.sequences {
            if matcher.matches(&seq.name) {
                seq.unplaced = true;
                flagged += 1;
            }
        }
        debug!(flagged, "flagged unplaced sequences");
        flagged
    }

    /// Replace the region lists of every sequence named in `entries`.
    ///
    /// Entries must be grouped per sequence and ascending by start; touching
    /// regions are coalesced. Validation covers all entries before any
    /// sequence is modified.
    pub fn load_regions(&mut self, entries: &[LiftEntry]) -> Result<(), DataError> {
        let mut replacements: Vec<(SeqId, Vec<Region>)> = Vec::new();
        let mut slots: HashMap<SeqId, usize> = HashMap::new();

        for entry in entries {
            if self.skipped.contains(&entry.seq) {
                continue;
            }
            let id = self
                .id_of(&entry.seq)
                .ok_or_else(|| DataError::UnknownSequence(entry.seq.clone()))?;
            let length = self.sequences[id.0].length;

            if let Some(size) = entry.seq_size {
                if size != length {
                    return Err(DataError::SizeMismatch {
                        seq: entry.seq.clone(),
                        lift_size: size,
                        catalog_size: length,
                    });
                }
            }
            if entry.start >= entry.end || entry.end > length {
                return Err(DataError::RegionOutOfBounds {
                    seq: entry.seq.clone(),
                    start: entry.start,
                    end: entry.end,
                    length,
                });
            }

            let slot = *slots.entry(id).or_insert_with(|| {
                replacements.push((id, Vec::new()));
                replacements.len() - 1
            });
            let regions = &mut replacements[slot].1;
            match regions.last_mut() {
                Some(last) if entry.start < last.end => {
                    return Err(DataError::UnsortedRegions {
                        seq: entry.seq.clone(),
                        start: entry.start,
                        previous_end: last.end,
                    });
                }
                Some(last) if entry.start == last.end => last.end = entry.end,
                _ => regions.push(Region::new(entry.start, entry.end)),
            }
        }

        for (id, regions) in replacements {
            debug!(seq = %self.sequences[id.0].name, regions = regions.len(), "loaded lift regions");
            self.sequences[id.0].regions = regions;
        }
        Ok(())
    }
}
