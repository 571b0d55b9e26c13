use std::collections::HashMap;
use std::fmt;
use std::io::BufRead;
use std::sync::Arc;

use ndarray::Array1;

use super::builder::{ClassifierBuilder, TrainingSummary};
use super::error::ClassifierError;
use super::evaluation::{evaluate, TestRun};
use super::probability::ProbabilityTable;
use super::schema::Schema;
use super::utils::split_record;
use super::ClassifierInfo;
use crate::{ClassifierConfig, TieBreak};

/// A trained categorical Naive Bayes classifier.
///
/// The schema and probability table are immutable once built and shared
/// through `Arc`, so the classifier can be cloned cheaply and used from
/// several threads at once.
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use catbayes::Classifier;
///
/// let classifier = Classifier::builder()
///     .with_metadata("doors:2,4\nclass:a,b")?
///     .add_records("2,a\n2,a\n4,b".as_bytes())?
///     .build()?;
///
/// let (label, scores) = classifier.predict(&["2"])?;
/// assert_eq!(label, "a");
/// assert!(scores["a"] > scores["b"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Classifier {
    pub(crate) schema: Arc<Schema>,
    pub(crate) table: Arc<ProbabilityTable>,
    pub(crate) config: ClassifierConfig,
    pub(crate) training: Arc<TrainingSummary>,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<Classifier>();
    }
};

/// Prediction for one data line, with the trailing label if the line had one.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordPrediction {
    pub predicted: String,
    pub actual: Option<String>,
}

impl RecordPrediction {
    /// `Some(true)` when the line was labeled and the prediction matches.
    pub fn is_correct(&self) -> Option<bool> {
        self.actual.as_ref().map(|actual| *actual == self.predicted)
    }
}

/// Display adapter returned by [`Classifier::describe`].
pub struct ModelDump<'a>(&'a Classifier);

impl fmt::Display for ModelDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let schema = &self.0.schema;
        let table = &self.0.table;
        let classes = schema.classes().values();

        writeln!(f, "priors:")?;
        for (label, prior) in classes.iter().zip(table.priors().iter()) {
            writeln!(f, "  {}: {:.6}", label, prior)?;
        }

        for (a, attribute) in schema.attributes().iter().enumerate() {
            writeln!(f, "{}:", attribute.name)?;
            let likelihoods = table.attribute_likelihoods(a);
            for (value, row) in attribute.domain.values().iter().zip(likelihoods.rows()) {
                write!(f, "  {}:", value)?;
                for (label, p) in classes.iter().zip(row.iter()) {
                    write!(f, " {}={:.6}", label, p)?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl Classifier {
    /// Creates a new ClassifierBuilder for fluent construction
    pub fn builder() -> ClassifierBuilder {
        ClassifierBuilder::new()
    }

    /// Returns information about the classifier's current state
    pub fn info(&self) -> ClassifierInfo {
        ClassifierInfo {
            num_attributes: self.schema.num_attributes(),
            attribute_names: self.schema.attributes().iter().map(|a| a.name.clone()).collect(),
            num_classes: self.schema.num_classes(),
            class_labels: self.schema.classes().values().to_vec(),
            training_instances: self.training.records_used,
            tie_break: self.config.tie_break,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn probability_table(&self) -> &ProbabilityTable {
        &self.table
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn training_summary(&self) -> &TrainingSummary {
        &self.training
    }

    /// Predicts the class of a record given one value per attribute.
    ///
    /// Returns the winning label and the unnormalized score of every class.
    pub fn predict(&self, values: &[&str]) -> Result<(String, HashMap<String, f64>), ClassifierError> {
        let scores = self.score(values)?;
        let best = self.select(&scores);

        let classes = self.schema.classes().values();
        let by_label = classes
            .iter()
            .cloned()
            .zip(scores.iter().copied())
            .collect();

        Ok((classes[best].clone(), by_label))
    }

    /// Classifies a raw data line.
    ///
    /// The line holds one value per attribute, optionally followed by the
    /// true class label.
    pub fn classify_line(&self, line: &str) -> Result<RecordPrediction, ClassifierError> {
        let fields = split_record(line);
        let num_attributes = self.schema.num_attributes();

        let (values, actual) = match fields.len() {
            n if n == num_attributes => (&fields[..], None),
            n if n == num_attributes + 1 => (&fields[..num_attributes], Some(fields[num_attributes])),
            n => {
                return Err(ClassifierError::MalformedRecordError(format!(
                    "expected {} or {} columns, found {}",
                    num_attributes,
                    num_attributes + 1,
                    n
                )))
            }
        };

        let scores = self.score(values)?;
        let best = self.select(&scores);

        Ok(RecordPrediction {
            predicted: self.schema.classes().values()[best].clone(),
            actual: actual.map(str::to_string),
        })
    }

    /// Classifies every line of `reader` and tallies the results.
    pub fn evaluate<R: BufRead>(&self, reader: R) -> Result<TestRun, ClassifierError> {
        evaluate(self, reader)
    }

    /// Human readable dump of the learned priors and likelihoods.
    pub fn describe(&self) -> ModelDump<'_> {
        ModelDump(self)
    }

    fn score(&self, values: &[&str]) -> Result<Array1<f64>, ClassifierError> {
        let encoded = self.schema.encode_values(values)?;
        Ok(self.table.scores(&encoded))
    }

    /// Index of the winning class.
    fn select(&self, scores: &Array1<f64>) -> usize {
        let mut best = 0;
        for (i, &score) in scores.iter().enumerate().skip(1) {
            let wins = match self.config.tie_break {
                TieBreak::Last => score >= scores[best],
                TieBreak::First => score > scores[best],
            };
            if wins {
                best = i;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn door_classifier() -> Classifier {
        Classifier::builder()
            .with_metadata("doors:2,4\nclass:a,b")
            .unwrap()
            .add_records("2,a\n2,a\n4,b".as_bytes())
            .unwrap()
            .build()
            .unwrap()
    }

    fn tied_classifier(tie_break: TieBreak) -> Classifier {
        Classifier::builder()
            .with_config(ClassifierConfig::default().with_tie_break(tie_break))
            .with_metadata("x:p\nclass:a,b,c")
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_predict_end_to_end() {
        let classifier = door_classifier();
        let (label, scores) = classifier.predict(&["2"]).unwrap();
        assert_eq!(label, "a");
        assert!((scores["a"] - 0.6).abs() < 1e-12);
        assert!((scores["b"] - 0.2).abs() < 1e-12);

        let (label, _) = classifier.predict(&["4"]).unwrap();
        assert_eq!(label, "b");
    }

    #[test]
    fn test_prediction_is_deterministic() {
        let classifier = door_classifier();
        let first = classifier.predict(&["4"]).unwrap();
        for _ in 0..10 {
            assert_eq!(classifier.predict(&["4"]).unwrap(), first);
        }
    }

    #[test]
    fn test_tie_break_last_wins_by_default() {
        let (label, scores) = tied_classifier(TieBreak::Last).predict(&["p"]).unwrap();
        assert_eq!(scores["a"], scores["c"]);
        assert_eq!(label, "c");
    }

    #[test]
    fn test_tie_break_first() {
        let (label, _) = tied_classifier(TieBreak::First).predict(&["p"]).unwrap();
        assert_eq!(label, "a");
    }

    #[test]
    fn test_unknown_value() {
        let classifier = door_classifier();
        let result = classifier.predict(&["3"]);
        assert!(matches!(
            result,
            Err(ClassifierError::UnknownAttributeValueError { ref attribute, ref value })
                if attribute == "doors" && value == "3"
        ));
    }

    #[test]
    fn test_classify_line_with_and_without_label() {
        let classifier = door_classifier();

        let labeled = classifier.classify_line("4,a").unwrap();
        assert_eq!(labeled.predicted, "b");
        assert_eq!(labeled.actual.as_deref(), Some("a"));
        assert_eq!(labeled.is_correct(), Some(false));

        let unlabeled = classifier.classify_line("2").unwrap();
        assert_eq!(unlabeled.predicted, "a");
        assert_eq!(unlabeled.is_correct(), None);

        assert!(matches!(
            classifier.classify_line("2,a,extra"),
            Err(ClassifierError::MalformedRecordError(_))
        ));
    }

    #[test]
    fn test_info() {
        let info = door_classifier().info();
        assert_eq!(info.num_attributes, 1);
        assert_eq!(info.attribute_names, vec!["doors"]);
        assert_eq!(info.class_labels, vec!["a", "b"]);
        assert_eq!(info.training_instances, 3);
        assert_eq!(info.tie_break, TieBreak::Last);
    }

    #[test]
    fn test_describe_lists_every_cell() {
        let dump = door_classifier().describe().to_string();
        assert!(dump.contains("priors:"));
        assert!(dump.contains("  a: 0.600000"));
        assert!(dump.contains("  2: a=1.000000 b=0.500000"));
        assert!(dump.contains("  4: a=0.333333 b=1.000000"));
    }
}
