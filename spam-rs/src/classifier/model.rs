//! Multinomial Naive Bayes model
//!
//! Each label starts at its log prior and accumulates smoothed
//! log-likelihoods from up to three channels:
//!
//! - tokens: `ln((count(t, l) + a) / (tokens_in_label(l) + vocab_size * a))`
//! - relay IP: `ip_weight * ln((count(ip, l) + a) / (examples(l) + total_ips * a))`
//! - send hour: same shape as the IP channel, weighted by `time_weight`
//!
//! The IP and hour denominators use the per-label example count and the
//! corpus-wide occurrence total, unlike the token channel. Scores depend on
//! this exact form.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

use super::selector::FeatureSelector;
use crate::config::ClassifierConfig;
use crate::corpus::CorpusStatistics;
use crate::counts::CountTable;
use crate::error::{Result, SpamError};
use crate::label::Label;
use crate::message::FeatureRecord;

/// Values derived from the corpus on first use
#[derive(Debug, Clone)]
pub struct Precomputed {
    log_prior: BTreeMap<Label, f64>,
    vocab_size: usize,
    tokens_in_label: BTreeMap<Label, u64>,
    ips_in_label: BTreeMap<Label, u64>,
    hours_in_label: BTreeMap<Label, u64>,
    total_ips: u64,
    total_hours: u64,
}

impl Precomputed {
    fn new(stats: &CorpusStatistics, labels: &[Label]) -> Self {
        let examples = stats.total_documents as f64;
        let mut pre = Precomputed {
            log_prior: BTreeMap::new(),
            vocab_size: stats.vocab_size(),
            tokens_in_label: BTreeMap::new(),
            ips_in_label: BTreeMap::new(),
            hours_in_label: BTreeMap::new(),
            total_ips: 0,
            total_hours: 0,
        };

        for &label in labels {
            let prior = (stats.label_count(label) as f64 / examples).ln();
            pre.log_prior.insert(label, prior);

            let tokens = total(&stats.label_token_counts, label);
            let ips = total(&stats.label_ip_counts, label);
            let hours = total(&stats.label_hour_counts, label);
            pre.tokens_in_label.insert(label, tokens);
            pre.ips_in_label.insert(label, ips);
            pre.hours_in_label.insert(label, hours);
            pre.total_ips += ips;
            pre.total_hours += hours;
        }

        pre
    }

    pub fn log_prior(&self, label: Label) -> f64 {
        self.log_prior.get(&label).copied().unwrap_or(f64::NEG_INFINITY)
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    pub fn tokens_in_label(&self, label: Label) -> u64 {
        self.tokens_in_label.get(&label).copied().unwrap_or(0)
    }

    pub fn ips_in_label(&self, label: Label) -> u64 {
        self.ips_in_label.get(&label).copied().unwrap_or(0)
    }

    pub fn hours_in_label(&self, label: Label) -> u64 {
        self.hours_in_label.get(&label).copied().unwrap_or(0)
    }

    pub fn total_ips(&self) -> u64 {
        self.total_ips
    }

    pub fn total_hours(&self) -> u64 {
        self.total_hours
    }
}

fn total(tables: &BTreeMap<Label, CountTable>, label: Label) -> u64 {
    tables.get(&label).map(|t| t.total()).unwrap_or(0)
}

/// Outcome of scoring one email
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Posterior {
    /// Winning label
    pub label: Label,
    /// Unnormalized log-posterior per label
    pub log_scores: BTreeMap<Label, f64>,
    /// Tokens kept by feature selection, best first
    pub features: Vec<String>,
}

/// Naive Bayes spam classifier over frozen corpus statistics
///
/// Safe to share across threads; the derived values are computed at most
/// once, behind a [`OnceLock`].
pub struct NaiveBayesModel {
    stats: Arc<CorpusStatistics>,
    config: ClassifierConfig,
    labels: Vec<Label>,
    precomputed: OnceLock<Precomputed>,
}

impl NaiveBayesModel {
    /// Wrap corpus statistics in a model
    ///
    /// Fails when the statistics have no labels, no examples or no tokens, or
    /// break the corpus invariants, and when the configuration is invalid.
    pub fn new(stats: impl Into<Arc<CorpusStatistics>>, config: ClassifierConfig) -> Result<Self> {
        let stats = stats.into();
        stats.validate()?;
        config.validate()?;

        let labels: Vec<Label> = stats.labels().collect();
        if labels.is_empty() {
            return Err(SpamError::EmptyLabelSet);
        }

        // The token denominator is zero without a vocabulary
        if stats.vocab_size() == 0 {
            return Err(SpamError::EmptyVocabulary);
        }

        if config.smooth_factor == 0.0 {
            warn!("Smoothing factor is zero; unseen features will score -inf");
        }

        Ok(Self {
            stats,
            config,
            labels,
            precomputed: OnceLock::new(),
        })
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn statistics(&self) -> &CorpusStatistics {
        &self.stats
    }

    /// Labels this model can predict, in tie-break order
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn is_precomputed(&self) -> bool {
        self.precomputed.get().is_some()
    }

    /// Compute priors and denominators, once
    pub fn precompute(&self) -> &Precomputed {
        self.precomputed.get_or_init(|| {
            info!("Pre-computing... vocab size = {}", self.stats.vocab_size());
            let pre = Precomputed::new(&self.stats, &self.labels);
            info!("Total number of ip: {}", pre.total_ips);
            info!("Total number of time: {}", pre.total_hours);
            info!("Tokens in each label: {:?}", pre.tokens_in_label);
            info!("Log priors: {:?}", pre.log_prior);
            pre
        })
    }

    /// `ln P(token | label)`
    pub fn log_p_token_label(&self, token: &str, label: Label) -> f64 {
        let pre = self.precompute();
        let alpha = self.config.smooth_factor;

        let numerator = self.stats.token_count(token, label) as f64 + alpha;
        let denominator = pre.tokens_in_label(label) as f64 + pre.vocab_size as f64 * alpha;
        (numerator / denominator).ln()
    }

    /// `ln P(ip | label)`, unweighted
    pub fn log_p_ip_label(&self, ip: &str, label: Label) -> f64 {
        let pre = self.precompute();
        let alpha = self.config.smooth_factor;

        let numerator = self.stats.ip_count(ip, label) as f64 + alpha;
        let denominator = self.stats.label_count(label) as f64 + pre.total_ips as f64 * alpha;
        (numerator / denominator).ln()
    }

    /// `ln P(hour | label)`, unweighted
    pub fn log_p_hour_label(&self, hour: &str, label: Label) -> f64 {
        let pre = self.precompute();
        let alpha = self.config.smooth_factor;

        let numerator = self.stats.hour_count(hour, label) as f64 + alpha;
        let denominator = self.stats.label_count(label) as f64 + pre.total_hours as f64 * alpha;
        (numerator / denominator).ln()
    }

    /// Score every label and pick the best one
    pub fn score(&self, record: &FeatureRecord) -> Posterior {
        let pre = self.precompute();

        let features =
            FeatureSelector::select(&record.tokens, &self.stats.idf, self.config.num_features);

        let mut log_scores: BTreeMap<Label, f64> = self
            .labels
            .iter()
            .map(|&label| (label, pre.log_prior(label)))
            .collect();

        for token in &features {
            for (&label, score) in log_scores.iter_mut() {
                *score += self.log_p_token_label(token, label);
            }
        }

        if self.config.use_ip {
            if let Some(ip) = &record.ip {
                for (&label, score) in log_scores.iter_mut() {
                    *score += self.config.ip_weight * self.log_p_ip_label(ip, label);
                }
            }
        }

        if self.config.use_time {
            if let Some(hour) = &record.hour {
                for (&label, score) in log_scores.iter_mut() {
                    *score += self.config.time_weight * self.log_p_hour_label(hour, label);
                }
            }
        }

        let label = self.arg_max(&log_scores);

        Posterior {
            label,
            log_scores,
            features: features.into_iter().map(str::to_string).collect(),
        }
    }

    /// Predict the label of one email
    pub fn classify(&self, record: &FeatureRecord) -> Label {
        let posterior = self.score(record);
        debug!(
            label = %posterior.label,
            features = posterior.features.len(),
            "Classified email"
        );
        posterior.label
    }

    /// First label (in tie-break order) holding the maximum score
    fn arg_max(&self, log_scores: &BTreeMap<Label, f64>) -> Label {
        let mut best = self.labels[0];
        let mut best_score = log_scores[&best];

        for &label in &self.labels[1..] {
            let score = log_scores[&label];
            if score > best_score {
                best = label;
                best_score = score;
            }
        }

        best
    }
}
