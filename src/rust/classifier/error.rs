use std::io;
use std::path::PathBuf;

use serde::{Serialize, Serializer};

/// Represents the different types of errors that can occur while loading,
/// training or querying the classifier.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// The requested input file does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFoundError(PathBuf),
    /// Reading or writing a file failed
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    /// The metadata is malformed or incomplete
    #[error("Schema error: {0}")]
    SchemaError(String),
    /// Training or testing was attempted before any metadata was loaded
    #[error("Metadata must be loaded before training or testing")]
    UntrainedSchemaError,
    /// Testing was attempted before a training pass completed
    #[error("The classifier must be trained before testing")]
    UntrainedModelError,
    /// A record has the wrong shape or references values outside the schema
    #[error("Malformed record: {0}")]
    MalformedRecordError(String),
    /// A record value was never declared for its attribute
    #[error("Unknown value '{value}' for attribute '{attribute}'")]
    UnknownAttributeValueError {
        attribute: String,
        value: String,
    },
}

/// A single data line that could not be used, with the reason.
#[derive(Debug, Serialize)]
pub struct RecordFailure {
    /// 1-based line number within its input
    pub line_number: usize,
    pub line: String,
    #[serde(serialize_with = "serialize_display")]
    pub error: ClassifierError,
}

fn serialize_display<S: Serializer>(error: &ClassifierError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}
