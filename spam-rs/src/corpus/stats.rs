use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::counts::CountTable;
use crate::error::{Result, SpamError};
use crate::label::Label;

/// Frozen snapshot of a training corpus
///
/// Built once by [`CorpusAggregator`](super::CorpusAggregator) and read-only
/// afterwards. Per-label maps are ordered by [`Label`], so iteration follows
/// the tie-break order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusStatistics {
    /// Number of training documents
    pub total_documents: u64,
    /// Documents per label
    pub label_counts: BTreeMap<Label, u64>,
    /// Token occurrences over the whole corpus
    pub global_token_counts: CountTable,
    /// Token occurrences per label
    pub label_token_counts: BTreeMap<Label, CountTable>,
    /// Relay IP occurrences per label
    pub label_ip_counts: BTreeMap<Label, CountTable>,
    /// Send hour occurrences per label
    pub label_hour_counts: BTreeMap<Label, CountTable>,
    /// `ln(total_documents / document_frequency)` per observed token
    pub idf: HashMap<String, f64>,
}

impl CorpusStatistics {
    /// Labels with at least one training example, in tie-break order
    pub fn labels(&self) -> impl Iterator<Item = Label> + '_ {
        self.label_counts
            .iter()
            .filter(|(_, &count)| count > 0)
            .map(|(&label, _)| label)
    }

    pub fn label_count(&self, label: Label) -> u64 {
        self.label_counts.get(&label).copied().unwrap_or(0)
    }

    pub fn token_count(&self, token: &str, label: Label) -> u64 {
        Self::lookup(&self.label_token_counts, label, token)
    }

    pub fn ip_count(&self, ip: &str, label: Label) -> u64 {
        Self::lookup(&self.label_ip_counts, label, ip)
    }

    pub fn hour_count(&self, hour: &str, label: Label) -> u64 {
        Self::lookup(&self.label_hour_counts, label, hour)
    }

    /// IDF of `token`, zero for tokens never seen in training
    pub fn idf(&self, token: &str) -> f64 {
        self.idf.get(token).copied().unwrap_or(0.0)
    }

    /// Number of distinct tokens in the corpus
    pub fn vocab_size(&self) -> usize {
        self.global_token_counts.len()
    }

    /// Dump the statistics as JSON
    ///
    /// The buffer is flushed explicitly so a failed final write is reported.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| SpamError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush().map_err(|e| SpamError::io(path, e))?;

        info!(
            "Saved statistics for {} documents to {}",
            self.total_documents,
            path.display()
        );
        Ok(())
    }

    /// Read statistics written by [`save`](Self::save)
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| SpamError::io(path, e))?;
        let stats: CorpusStatistics = serde_json::from_reader(BufReader::new(file))?;

        info!(
            "Loaded statistics for {} documents from {}",
            stats.total_documents,
            path.display()
        );
        Ok(stats)
    }

    fn lookup(tables: &BTreeMap<Label, CountTable>, label: Label, key: &str) -> u64 {
        tables.get(&label).map(|t| t.get(key)).unwrap_or(0)
    }

    /// Check the corpus invariants
    ///
    /// The label set must be non-empty with at least one example, label
    /// counts must add up to the document total, and no per-label token
    /// count may exceed its global count.
    pub fn validate(&self) -> Result<()> {
        if self.label_counts.is_empty() {
            return Err(SpamError::EmptyLabelSet);
        }

        let examples: u64 = self.label_counts.values().sum();
        if examples == 0 {
            return Err(SpamError::NoTrainingExamples);
        }
        if examples != self.total_documents {
            return Err(SpamError::InconsistentStatistics(format!(
                "label counts sum to {} but corpus has {} documents",
                examples, self.total_documents
            )));
        }

        for (label, table) in &self.label_token_counts {
            for (token, count) in table.iter() {
                let global = self.global_token_counts.get(token);
                if count > global {
                    return Err(SpamError::InconsistentStatistics(format!(
                        "token '{}' occurs {} times under {} but {} times globally",
                        token, count, label, global
                    )));
                }
            }
        }

        Ok(())
    }
}
