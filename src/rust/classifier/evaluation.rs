use std::io::{self, BufRead, Write};

use log::{info, warn};
use serde::Serialize;

use super::error::{ClassifierError, RecordFailure};
use super::model::{Classifier, RecordPrediction};
use super::utils::{decode_line, is_blank, split_record};

/// What happened to one test line.
#[derive(Debug, Clone, PartialEq)]
pub enum OutcomeStatus {
    Predicted(RecordPrediction),
    /// Index of the error in [`EvaluationReport::failures`]
    Failed(usize),
}

/// Result of classifying one test line.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordOutcome {
    /// 1-based line number within the test input
    pub line_number: usize,
    pub line: String,
    pub status: OutcomeStatus,
}

impl RecordOutcome {
    pub fn prediction(&self) -> Option<&RecordPrediction> {
        match &self.status {
            OutcomeStatus::Predicted(prediction) => Some(prediction),
            OutcomeStatus::Failed(_) => None,
        }
    }
}

/// Accuracy of a test run, when the input carried labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Accuracy {
    Available { correct: usize, total: usize },
    Unavailable,
}

impl Accuracy {
    pub fn ratio(&self) -> Option<f64> {
        match *self {
            Self::Available { correct, total } if total > 0 => Some(correct as f64 / total as f64),
            _ => None,
        }
    }
}

/// Per-class tally over labeled records whose true label is in the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassTally {
    pub label: String,
    pub total: usize,
    pub correct: usize,
}

#[derive(Debug, Serialize)]
pub struct EvaluationReport {
    /// Non-blank records in the test input
    pub total_records: usize,
    /// Records that produced a prediction
    pub classified: usize,
    pub accuracy: Accuracy,
    pub per_class: Vec<ClassTally>,
    pub failures: Vec<RecordFailure>,
}

/// All outcomes of a test run plus the summary computed from them.
#[derive(Debug)]
pub struct TestRun {
    outcomes: Vec<RecordOutcome>,
    report: EvaluationReport,
}

impl TestRun {
    pub fn outcomes(&self) -> &[RecordOutcome] {
        &self.outcomes
    }

    pub fn report(&self) -> &EvaluationReport {
        &self.report
    }

    pub fn into_report(self) -> EvaluationReport {
        self.report
    }

    /// Writes one line per record: the original line, `separator`, then the
    /// predicted class or the error that prevented a prediction.
    pub fn write_predictions<W: Write>(&self, mut writer: W, separator: &str) -> io::Result<()> {
        for outcome in &self.outcomes {
            match &outcome.status {
                OutcomeStatus::Predicted(prediction) => {
                    writeln!(writer, "{}{}{}", outcome.line, separator, prediction.predicted)?
                }
                OutcomeStatus::Failed(index) => {
                    let error = &self.report.failures[*index].error;
                    writeln!(writer, "{}{}ERROR: {}", outcome.line, separator, error)?
                }
            }
        }
        writer.flush()
    }
}

/// Classifies every non-blank line of `reader`.
///
/// Records that cannot be classified are kept as failed outcomes and the run
/// continues. Only read errors abort the run.
///
/// Whether accuracy is reported depends on the last record: if it has a
/// trailing label column the run is treated as labeled, and records without
/// a label or without a prediction count as incorrect.
pub fn evaluate<R: BufRead>(classifier: &Classifier, reader: R) -> Result<TestRun, ClassifierError> {
    let mut outcomes = Vec::new();
    let mut failures = Vec::new();
    for (i, bytes) in reader.split(b'\n').enumerate() {
        let (line, decode_error) = decode_line(bytes?);
        if is_blank(&line) {
            continue;
        }
        let line = line.trim_end().to_string();
        let result = match decode_error {
            Some(error) => Err(error),
            None => classifier.classify_line(&line),
        };
        let status = match result {
            Ok(prediction) => OutcomeStatus::Predicted(prediction),
            Err(error) => {
                warn!("Could not classify test record {}: {}", i + 1, error);
                failures.push(RecordFailure {
                    line_number: i + 1,
                    line: line.clone(),
                    error,
                });
                OutcomeStatus::Failed(failures.len() - 1)
            }
        };
        outcomes.push(RecordOutcome {
            line_number: i + 1,
            line,
            status,
        });
    }

    let labeled = outcomes
        .last()
        .map(|last| split_record(&last.line).len() > classifier.schema().num_attributes())
        .unwrap_or(false);

    let classes = classifier.schema().classes();
    let mut per_class: Vec<ClassTally> = classes
        .values()
        .iter()
        .map(|label| ClassTally {
            label: label.clone(),
            total: 0,
            correct: 0,
        })
        .collect();

    let mut classified = 0;
    let mut correct = 0;
    for prediction in outcomes.iter().filter_map(RecordOutcome::prediction) {
        classified += 1;

        let Some(actual) = &prediction.actual else {
            continue;
        };
        let hit = *actual == prediction.predicted;
        if hit {
            correct += 1;
        }
        if let Some(c) = classes.index_of(actual) {
            per_class[c].total += 1;
            if hit {
                per_class[c].correct += 1;
            }
        }
    }

    let total_records = outcomes.len();
    let accuracy = if labeled {
        Accuracy::Available {
            correct,
            total: total_records,
        }
    } else {
        Accuracy::Unavailable
    };

    info!(
        "Test run complete: {} records, {} classified, {} failed",
        total_records,
        classified,
        failures.len()
    );

    Ok(TestRun {
        outcomes,
        report: EvaluationReport {
            total_records,
            classified,
            accuracy,
            per_class: if labeled { per_class } else { Vec::new() },
            failures,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> Classifier {
        Classifier::builder()
            .with_metadata("doors:2,4\nsafety:low,high\nclass:unacc,acc")
            .unwrap()
            .add_records("2,low,unacc\n2,low,unacc\n4,high,acc\n4,low,unacc\n".as_bytes())
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_labeled_run_reports_accuracy() {
        let run = classifier()
            .evaluate("2,low,unacc\n4,high,acc\n4,high,unacc\n".as_bytes())
            .unwrap();
        let report = run.report();

        assert_eq!(report.total_records, 3);
        assert_eq!(report.classified, 3);
        assert_eq!(report.accuracy, Accuracy::Available { correct: 2, total: 3 });
        assert!((report.accuracy.ratio().unwrap() - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(
            report.per_class,
            vec![
                ClassTally { label: "unacc".into(), total: 2, correct: 1 },
                ClassTally { label: "acc".into(), total: 1, correct: 1 },
            ]
        );
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_unlabeled_run_has_no_accuracy() {
        let run = classifier().evaluate("2,low\n4,high\n".as_bytes()).unwrap();
        let report = run.report();

        assert_eq!(report.total_records, 2);
        assert_eq!(report.accuracy, Accuracy::Unavailable);
        assert_eq!(report.accuracy.ratio(), None);
        assert!(report.per_class.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let run = classifier().evaluate("".as_bytes()).unwrap();
        assert_eq!(run.report().total_records, 0);
        assert_eq!(run.report().accuracy, Accuracy::Unavailable);
        assert!(run.outcomes().is_empty());
    }

    #[test]
    fn test_last_record_decides_labeling() {
        let run = classifier().evaluate("2,low\n2,low,unacc\n".as_bytes()).unwrap();
        assert_eq!(run.report().accuracy, Accuracy::Available { correct: 1, total: 2 });

        let run = classifier().evaluate("2,low,unacc\n2,low\n".as_bytes()).unwrap();
        assert_eq!(run.report().accuracy, Accuracy::Unavailable);
    }

    #[test]
    fn test_failed_records_do_not_stop_the_run() {
        let run = classifier()
            .evaluate("2,low,unacc\n3,low,unacc\n2\n4,high,acc\n".as_bytes())
            .unwrap();
        let report = run.report();

        assert_eq!(report.total_records, 4);
        assert_eq!(report.classified, 2);
        assert_eq!(report.accuracy, Accuracy::Available { correct: 2, total: 4 });
        assert_eq!(report.failures.len(), 2);
        assert!(matches!(
            report.failures[0].error,
            ClassifierError::UnknownAttributeValueError { .. }
        ));
        assert_eq!(report.failures[0].line_number, 2);
        assert!(matches!(report.failures[1].error, ClassifierError::MalformedRecordError(_)));
        assert!(run.outcomes()[1].prediction().is_none());
        assert_eq!(run.outcomes()[1].status, OutcomeStatus::Failed(0));
        assert_eq!(run.outcomes()[2].status, OutcomeStatus::Failed(1));
    }

    #[test]
    fn test_invalid_utf8_record_is_a_failure() {
        let run = classifier()
            .evaluate(&b"2,low,unacc\n\xff,low,unacc\n4,high,acc\n"[..])
            .unwrap();
        let report = run.report();

        assert_eq!(report.total_records, 3);
        assert_eq!(report.classified, 2);
        assert_eq!(report.accuracy, Accuracy::Available { correct: 2, total: 3 });
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].line_number, 2);
        assert!(matches!(report.failures[0].error, ClassifierError::MalformedRecordError(_)));
        assert!(run.outcomes()[1].prediction().is_none());
    }

    #[test]
    fn test_write_predictions_keeps_input_order() {
        let run = classifier()
            .evaluate("2,low,unacc\n\n3,low\n4,high\n".as_bytes())
            .unwrap();

        let mut out = Vec::new();
        run.write_predictions(&mut out, " / ").unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "2,low,unacc / unacc");
        assert_eq!(lines[1], "3,low / ERROR: Unknown value '3' for attribute 'doors'");
        assert_eq!(lines[2], "4,high / acc");
    }
}
