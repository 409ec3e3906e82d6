use rayon::prelude::*;
use tracing::{info, warn};

use super::stats::CorpusStatistics;
use crate::counts::CountTable;
use crate::error::{Result, SpamError};
use crate::message::FeatureRecord;

/// Accumulates labeled feature records into corpus statistics
///
/// Counts are plain sums, so aggregators built over disjoint shards can be
/// merged in any order before [`finish`](Self::finish) computes IDF.
#[derive(Debug, Clone, Default)]
pub struct CorpusAggregator {
    stats: CorpusStatistics,
    document_frequency: CountTable,
    next_index: usize,
}

impl CorpusAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregator whose first record is reported as `offset` in errors
    fn starting_at(offset: usize) -> Self {
        Self {
            next_index: offset,
            ..Default::default()
        }
    }

    /// Count one labeled record
    ///
    /// Fails without touching any table if the record has no label.
    pub fn add(&mut self, record: &FeatureRecord) -> Result<()> {
        let index = self.next_index;
        let label = record
            .label
            .ok_or(SpamError::UnlabeledRecord { index })?;
        self.next_index += 1;

        let stats = &mut self.stats;
        stats.total_documents += 1;
        *stats.label_counts.entry(label).or_insert(0) += 1;

        let label_tokens = stats.label_token_counts.entry(label).or_default();
        for (token, count) in record.tokens.iter() {
            stats.global_token_counts.add(token, count);
            label_tokens.add(token, count);
            self.document_frequency.increment(token);
        }

        let label_ips = stats.label_ip_counts.entry(label).or_default();
        if let Some(ip) = &record.ip {
            label_ips.increment(ip);
        }

        let label_hours = stats.label_hour_counts.entry(label).or_default();
        if let Some(hour) = &record.hour {
            label_hours.increment(hour);
        }

        Ok(())
    }

    /// Fold another shard's counts into this one
    pub fn merge(&mut self, other: CorpusAggregator) {
        let stats = &mut self.stats;
        let theirs = other.stats;

        stats.total_documents += theirs.total_documents;
        for (label, count) in theirs.label_counts {
            *stats.label_counts.entry(label).or_insert(0) += count;
        }
        stats.global_token_counts.merge(&theirs.global_token_counts);
        for (label, table) in theirs.label_token_counts {
            stats.label_token_counts.entry(label).or_default().merge(&table);
        }
        for (label, table) in theirs.label_ip_counts {
            stats.label_ip_counts.entry(label).or_default().merge(&table);
        }
        for (label, table) in theirs.label_hour_counts {
            stats.label_hour_counts.entry(label).or_default().merge(&table);
        }
        self.document_frequency.merge(&other.document_frequency);
        self.next_index = self.next_index.max(other.next_index);
    }

    /// Compute IDF and freeze the statistics
    pub fn finish(self) -> CorpusStatistics {
        let mut stats = self.stats;
        let documents = stats.total_documents as f64;

        stats.idf = self
            .document_frequency
            .iter()
            .map(|(token, df)| (token.to_string(), (documents / df as f64).ln()))
            .collect();

        if stats.total_documents == 0 {
            warn!("Aggregated an empty corpus");
        }
        info!(
            "Corpus aggregated: {} documents, vocab size = {}, label counts = {:?}",
            stats.total_documents,
            stats.vocab_size(),
            stats.label_counts
        );

        stats
    }

    /// Sequential single pass over `records`
    pub fn aggregate<'a, I>(records: I) -> Result<CorpusStatistics>
    where
        I: IntoIterator<Item = &'a FeatureRecord>,
    {
        let mut aggregator = Self::new();
        for record in records {
            aggregator.add(record)?;
        }
        Ok(aggregator.finish())
    }

    /// Shard `records` across the rayon pool and merge the partial counts
    ///
    /// Produces the same statistics as [`aggregate`](Self::aggregate).
    pub fn aggregate_parallel(records: &[FeatureRecord]) -> Result<CorpusStatistics> {
        let shard_size = (records.len() / rayon::current_num_threads()).max(1);

        let aggregator = records
            .par_chunks(shard_size)
            .enumerate()
            .map(|(shard, chunk)| {
                let mut aggregator = Self::starting_at(shard * shard_size);
                for record in chunk {
                    aggregator.add(record)?;
                }
                Ok::<_, SpamError>(aggregator)
            })
            .try_reduce(Self::new, |mut left, right| {
                left.merge(right);
                Ok(left)
            })?;

        Ok(aggregator.finish())
    }
}
