//! Labeled corpus on disk
//!
//! Reads TREC-style index files (`<ham|spam> <relative path>` per line),
//! splits them into train/dev sets, and loads the referenced messages as
//! labeled feature records.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Result, SpamError};
use crate::label::Label;
use crate::message::{EmailParser, FeatureRecord};

/// One line of an index file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub label: Label,
    /// Message path, resolved against the index file's directory
    pub path: PathBuf,
}

/// Load an index file
///
/// Lines with fewer than two fields are skipped. An unknown label aborts the
/// load.
pub fn load_index(path: &Path) -> Result<Vec<IndexEntry>> {
    info!("Loading labels from {}", path.display());
    let content = fs::read_to_string(path).map_err(|e| SpamError::io(path, e))?;

    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let base = fs::canonicalize(parent).map_err(|e| SpamError::io(parent, e))?;

    let mut entries = Vec::new();
    for line in content.lines() {
        let mut fields = line.split_whitespace();
        let (Some(label), Some(relative)) = (fields.next(), fields.next()) else {
            continue;
        };

        entries.push(IndexEntry {
            label: label.parse()?,
            path: base.join(relative),
        });
    }

    debug!("Loaded {} index entries", entries.len());
    Ok(entries)
}

/// Write entries back as `<label> <path>` lines
pub fn write_index(path: &Path, entries: &[IndexEntry]) -> Result<()> {
    let content: String = entries
        .iter()
        .map(|entry| format!("{} {}\n", entry.label, entry.path.display()))
        .collect();
    fs::write(path, content).map_err(|e| SpamError::io(path, e))
}

/// Shuffle with `seed` and hold out `len / k_fold` entries as the dev set
///
/// Returns `(train, dev)`.
pub fn split(
    mut entries: Vec<IndexEntry>,
    k_fold: usize,
    seed: u64,
) -> Result<(Vec<IndexEntry>, Vec<IndexEntry>)> {
    if k_fold < 2 {
        return Err(SpamError::Config(format!(
            "k_fold must be at least 2, got {}",
            k_fold
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    entries.shuffle(&mut rng);

    let train = entries.split_off(entries.len() / k_fold);
    Ok((train, entries))
}

/// Shuffle with `seed` and keep `floor(len * fraction)` entries
pub fn sample(mut entries: Vec<IndexEntry>, fraction: f64, seed: u64) -> Vec<IndexEntry> {
    let mut rng = StdRng::seed_from_u64(seed);
    entries.shuffle(&mut rng);

    let keep = (entries.len() as f64 * fraction.clamp(0.0, 1.0)) as usize;
    entries.truncate(keep);
    entries
}

/// Read and parse every message in `entries`, attaching its label
pub fn load_records(entries: &[IndexEntry], parser: &EmailParser) -> Result<Vec<FeatureRecord>> {
    info!("Loading {} examples...", entries.len());

    let records = entries
        .par_iter()
        .map(|entry| {
            let raw = fs::read(&entry.path).map_err(|e| SpamError::io(&entry.path, e))?;
            Ok::<_, SpamError>(parser.parse(&raw).with_label(entry.label))
        })
        .collect::<Result<Vec<_>>>()?;

    info!("Loaded {} examples", records.len());
    Ok(records)
}
