use serde::Serialize;

use crate::TieBreak;

mod error;
mod evaluation;
mod frequency;
mod model;
mod probability;
mod schema;
mod utils;
pub mod builder;

pub use builder::{ClassifierBuilder, TrainingSummary};
pub use error::{ClassifierError, RecordFailure};
pub use evaluation::{
    evaluate, Accuracy, ClassTally, EvaluationReport, OutcomeStatus, RecordOutcome, TestRun,
};
pub use frequency::FrequencyModel;
pub use model::{Classifier, ModelDump, RecordPrediction};
pub use probability::ProbabilityTable;
pub use schema::{Attribute, ClassDomain, Domain, Schema, CLASS_ENTRY};

/// Information about the current state and configuration of a classifier
#[derive(Debug, Clone, Serialize)]
pub struct ClassifierInfo {
    /// Number of attribute columns expected in each record
    pub num_attributes: usize,
    /// Attribute names in column order
    pub attribute_names: Vec<String>,
    /// Number of classes the classifier can predict
    pub num_classes: usize,
    /// Labels of the classes, in metadata order
    pub class_labels: Vec<String>,
    /// Training records that were counted
    pub training_instances: usize,
    pub tie_break: TieBreak,
}
