//! Evaluation over a labeled dev set
//!
//! Spam is the positive class. Undefined ratios (empty denominators) count
//! as zero.

use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use tracing::info;

use crate::classifier::NaiveBayesModel;
use crate::error::{Result, SpamError};
use crate::label::Label;
use crate::message::FeatureRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub true_positive: u64,
    pub false_positive: u64,
    pub true_negative: u64,
    pub false_negative: u64,
}

impl ConfusionMatrix {
    pub fn record(&mut self, gold: Label, predicted: Label) {
        match (gold, predicted) {
            (Label::Spam, Label::Spam) => self.true_positive += 1,
            (Label::Ham, Label::Spam) => self.false_positive += 1,
            (Label::Ham, Label::Ham) => self.true_negative += 1,
            (Label::Spam, Label::Ham) => self.false_negative += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positive + self.true_negative, self.total())
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_positive)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_negative)
    }

    /// F1 with spam as the positive class
    pub fn spam_f1(&self) -> f64 {
        ratio(
            2 * self.true_positive,
            2 * self.true_positive + self.false_positive + self.false_negative,
        )
    }

    /// F1 with ham as the positive class
    pub fn ham_f1(&self) -> f64 {
        ratio(
            2 * self.true_negative,
            2 * self.true_negative + self.false_positive + self.false_negative,
        )
    }

    pub fn macro_f1(&self) -> f64 {
        (self.spam_f1() + self.ham_f1()) / 2.0
    }

    /// Equal to accuracy for single-label binary classification
    pub fn micro_f1(&self) -> f64 {
        self.accuracy()
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Scores of one evaluation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub confusion: ConfusionMatrix,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub micro_f1: f64,
    pub macro_f1: f64,
}

impl From<ConfusionMatrix> for Evaluation {
    fn from(confusion: ConfusionMatrix) -> Self {
        Evaluation {
            accuracy: confusion.accuracy(),
            precision: confusion.precision(),
            recall: confusion.recall(),
            micro_f1: confusion.micro_f1(),
            macro_f1: confusion.macro_f1(),
            confusion,
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Result ---")?;
        writeln!(f, "examples  = {}", self.confusion.total())?;
        writeln!(f, "accuracy  = {:.3}", self.accuracy * 100.0)?;
        writeln!(f, "precision = {:.3}", self.precision * 100.0)?;
        writeln!(f, "recall    = {:.3}", self.recall * 100.0)?;
        writeln!(f, "micro_f1  = {:.3}", self.micro_f1 * 100.0)?;
        writeln!(f, "macro_f1  = {:.3}", self.macro_f1 * 100.0)?;
        write!(f, "--------------")
    }
}

/// Classify every labeled record and score the predictions
pub fn evaluate(model: &NaiveBayesModel, records: &[FeatureRecord]) -> Result<Evaluation> {
    info!("Evaluating on {} examples", records.len());
    model.precompute();

    let outcomes = records
        .par_iter()
        .enumerate()
        .map(|(index, record)| {
            let gold = record.label.ok_or(SpamError::UnlabeledRecord { index })?;
            Ok::<_, SpamError>((gold, model.classify(record)))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut confusion = ConfusionMatrix::default();
    for (gold, predicted) in outcomes {
        confusion.record(gold, predicted);
    }

    let evaluation = Evaluation::from(confusion);
    info!(
        "Accuracy = {:.5}, macro F1 = {:.5}",
        evaluation.accuracy, evaluation.macro_f1
    );
    Ok(evaluation)
}
