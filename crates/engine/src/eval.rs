//! Evaluation: confusion counts, precision, recall and F1
//!
//! Undefined ratios are zero: precision when nothing was predicted
//! entailed, recall when nothing is entailed, F1 when both are zero.

use crate::decision::Model;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Confusion {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl Confusion {
    pub fn add(&mut self, predicted_yes: bool, gold_yes: bool) {
        match (predicted_yes, gold_yes) {
            (true, true) => self.true_positives += 1,
            (true, false) => self.false_positives += 1,
            (false, true) => self.false_negatives += 1,
            (false, false) => self.true_negatives += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }
}

impl fmt::Display for Confusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary")?;
        writeln!(f, "-------")?;
        writeln!(f, "True positives: {}", self.true_positives)?;
        writeln!(f, "False positives: {}", self.false_positives)?;
        writeln!(f, "True negatives: {}", self.true_negatives)?;
        writeln!(f, "False negatives: {}", self.false_negatives)?;
        writeln!(f)?;
        writeln!(f, "Precision: {:.2}", self.precision())?;
        writeln!(f, "Recall: {:.2}", self.recall())?;
        write!(f, "F-measure: {:.2}", self.f1())
    }
}

/// Results overall and per model
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    pub overall: Confusion,
    pub per_model: BTreeMap<Model, Confusion>,
}

impl Evaluation {
    pub fn record(&mut self, model: Model, predicted_yes: bool, gold_yes: bool) {
        self.overall.add(predicted_yes, gold_yes);
        self.per_model
            .entry(model)
            .or_default()
            .add(predicted_yes, gold_yes);
    }

    pub fn model(&self, model: Model) -> Confusion {
        self.per_model.get(&model).copied().unwrap_or_default()
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.overall)?;
        for model in [Model::StructuralSimilarity, Model::GraphNavigation] {
            writeln!(f)?;
            writeln!(f, "***** Model: {} *****", model.name())?;
            writeln!(f)?;
            writeln!(f, "{}", self.model(model))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_recall_f1() {
        let mut c = Confusion::default();
        c.add(true, true);
        c.add(true, true);
        c.add(true, false);
        c.add(false, true);
        c.add(false, false);

        assert_eq!(c.total(), 5);
        assert!((c.precision() - 2.0 / 3.0).abs() < 1e-9);
        assert!((c.recall() - 2.0 / 3.0).abs() < 1e-9);
        assert!((c.f1() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_division_is_zero() {
        let mut c = Confusion::default();
        assert_eq!((c.precision(), c.recall(), c.f1()), (0.0, 0.0, 0.0));

        c.add(false, true);
        assert_eq!(c.precision(), 0.0);
        assert_eq!(c.f1(), 0.0);
    }

    #[test]
    fn test_per_model_breakdown() {
        let mut eval = Evaluation::default();
        eval.record(Model::GraphNavigation, true, true);
        eval.record(Model::StructuralSimilarity, false, true);
        eval.record(Model::StructuralSimilarity, true, false);

        assert_eq!(eval.overall.total(), 3);
        assert_eq!(eval.model(Model::GraphNavigation).true_positives, 1);
        assert_eq!(eval.model(Model::StructuralSimilarity).false_negatives, 1);

        let report = eval.to_string();
        assert!(report.contains("***** Model: Tree Edit Distance *****"));
        assert!(report.contains("F-measure: 1.00"));
    }
}
