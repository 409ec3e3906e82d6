use std::collections::HashMap;

use crate::counts::TokenCounts;

/// TF-IDF feature selection
pub struct FeatureSelector;

impl FeatureSelector {
    /// Score every distinct token of an email by TF-IDF, highest first
    ///
    /// Tokens missing from `idf` score zero. The sort is stable, so equal
    /// scores keep first-occurrence order.
    pub fn rank<'a>(tokens: &'a TokenCounts, idf: &HashMap<String, f64>) -> Vec<(&'a str, f64)> {
        let total = tokens.total() as f64;

        let mut scored: Vec<(&str, f64)> = tokens
            .iter()
            .map(|(token, count)| {
                let tf = count as f64 / total;
                let idf = idf.get(token).copied().unwrap_or(0.0);
                (token, tf * idf)
            })
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored
    }

    /// Keep at most `limit` distinct tokens with the highest TF-IDF
    pub fn select<'a>(
        tokens: &'a TokenCounts,
        idf: &HashMap<String, f64>,
        limit: usize,
    ) -> Vec<&'a str> {
        Self::rank(tokens, idf)
            .into_iter()
            .take(limit)
            .map(|(token, _)| token)
            .collect()
    }
}
