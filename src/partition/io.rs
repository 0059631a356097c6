//! Readers for the tab-separated inputs consumed by partitioning.

use std::io::BufRead;

use super::error::DataError;

/// One ungapped region taken from a lift description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiftEntry {
    /// Sequence the region belongs to (the lift's `newName`).
    pub seq: String,
    /// Region start on `seq`.
    pub start: u64,
    /// Region end on `seq`.
    pub end: u64,
    /// Total length of `seq` as declared by the lift, if known.
    pub seq_size: Option<u64>,
}

impl LiftEntry {
    /// Region entry without a declared sequence size.
    pub fn new(seq: impl Into<String>, start: u64, end: u64) -> Self {
        Self {
            seq: seq.into(),
            start,
            end,
            seq_size: None,
        }
    }
}

/// Read `id\tsize` or `path\tid\tsize` rows.
pub fn read_sizes<R: BufRead>(reader: R) -> Result<Vec<(String, u64)>, DataError> {
    let mut sizes = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        if skip_line(&line) {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        let (id, size) = match fields.as_slice() {
            [id, size] | [_, id, size] => (*id, *size),
            _ => {
                return Err(DataError::malformed(
                    line_no,
                    format!("expected 2 or 3 columns, found {}", fields.len()),
                ))
            }
        };
        sizes.push((id.to_string(), parse_u64(size, line_no, "size")?));
    }
    Ok(sizes)
}

/// Read lift rows `offset oldName oldSize newName newSize strand`.
///
/// Rows whose `oldName` is `gap` describe gaps and are dropped.
pub fn read_lift<R: BufRead>(reader: R) -> Result<Vec<LiftEntry>, DataError> {
    let mut entries = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        if skip_line(&line) {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(DataError::malformed(
                line_no,
                format!("expected 6 lift columns, found {}", fields.len()),
            ));
        }
        if fields[1] == "gap" {
            continue;
        }
        let offset = parse_u64(fields[0], line_no, "offset")?;
        let old_size = parse_u64(fields[2], line_no, "oldSize")?;
        let new_size = parse_u64(fields[4], line_no, "newSize")?;
        let end = offset
            .checked_add(old_size)
            .ok_or_else(|| DataError::malformed(line_no, "region end overflows"))?;
        entries.push(LiftEntry {
            seq: fields[3].to_string(),
            start: offset,
            end,
            seq_size: Some(new_size),
        });
    }
    Ok(entries)
}

/// Read one unplaced-sequence name or glob per line.
pub fn read_unplaced_specs<R: BufRead>(reader: R) -> Result<Vec<String>, DataError> {
    let mut specs = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let spec = line.trim();
        if !spec.is_empty() && !spec.starts_with('#') {
            specs.push(spec.to_string());
        }
    }
    Ok(specs)
}

fn skip_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

fn parse_u64(field: &str, line: usize, what: &str) -> Result<u64, DataError> {
    field
        .trim()
        .parse()
        .map_err(|_| DataError::malformed(line, format!("invalid {what} '{field}'")))
}
