use std::io::BufRead;
use std::sync::Arc;

use log::{info, warn};
use serde::Serialize;

use super::error::{ClassifierError, RecordFailure};
use super::frequency::FrequencyModel;
use super::model::Classifier;
use super::probability::ProbabilityTable;
use super::schema::Schema;
use super::utils::{decode_line, is_blank, split_record};
use crate::ClassifierConfig;

/// Outcome of one training pass.
#[derive(Debug, Default, Serialize)]
pub struct TrainingSummary {
    /// Non-blank records read from the input
    pub records_read: usize,
    /// Records that were counted
    pub records_used: usize,
    /// Training instances per class label, in metadata order
    pub class_instances: Vec<(String, u64)>,
    /// Records that were skipped, with the reason
    pub rejected: Vec<RecordFailure>,
}

/// A builder for training a Classifier with a fluent interface.
///
/// Each builder owns exactly one training pass: setting a schema starts a
/// fresh, smoothed frequency table, records are counted as they are added,
/// and `build` normalizes the counts into the final probability table.
#[derive(Debug, Default)]
pub struct ClassifierBuilder {
    schema: Option<Arc<Schema>>,
    frequencies: Option<FrequencyModel>,
    config: ClassifierConfig,
    records_read: usize,
    rejected: Vec<RecordFailure>,
}

impl ClassifierBuilder {
    /// Creates a new empty ClassifierBuilder instance with default configuration
    ///
    /// # Example
    /// ```
    /// use catbayes::ClassifierBuilder;
    ///
    /// let builder = ClassifierBuilder::new();
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration carried by the built classifier
    ///
    /// # Example
    /// ```
    /// use catbayes::{ClassifierBuilder, ClassifierConfig, TieBreak};
    ///
    /// let builder = ClassifierBuilder::new()
    ///     .with_config(ClassifierConfig::default().with_tie_break(TieBreak::First));
    /// ```
    pub fn with_config(mut self, config: ClassifierConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the schema and starts a fresh training pass.
    ///
    /// Any records counted against a previous schema are discarded.
    pub fn with_schema(mut self, schema: impl Into<Arc<Schema>>) -> Self {
        let schema = schema.into();
        self.frequencies = Some(FrequencyModel::new(&schema));
        self.schema = Some(schema);
        self.records_read = 0;
        self.rejected.clear();
        self
    }

    /// Parses metadata text and uses it as the schema
    ///
    /// # Returns
    /// * `Result<Self, ClassifierError>` - The builder instance if successful, or a
    ///   `SchemaError` if the metadata is malformed
    pub fn with_metadata(self, metadata: &str) -> Result<Self, ClassifierError> {
        let schema: Schema = metadata.parse()?;
        Ok(self.with_schema(schema))
    }

    /// Counts a single training record.
    ///
    /// Unlike [`add_records`](Self::add_records), a malformed record is
    /// returned as an error instead of being skipped.
    ///
    /// # Returns
    /// * `Result<Self, ClassifierError>` - The builder instance if successful, or an error if:
    ///   - No schema has been set (`UntrainedSchemaError`)
    ///   - The record does not have one column per attribute plus a label
    ///   - A value or the label is outside its declared domain
    pub fn add_record(mut self, line: &str) -> Result<Self, ClassifierError> {
        self.records_read += 1;
        self.observe_line(line)?;
        Ok(self)
    }

    /// Counts every non-blank line of `reader` as a training record.
    ///
    /// Malformed records are logged, skipped and reported in the
    /// [`TrainingSummary`]; the pass continues. Read failures abort it.
    pub fn add_records<R: BufRead>(mut self, reader: R) -> Result<Self, ClassifierError> {
        if self.schema.is_none() {
            return Err(ClassifierError::UntrainedSchemaError);
        }

        for (i, bytes) in reader.split(b'\n').enumerate() {
            let (line, decode_error) = decode_line(bytes?);
            if is_blank(&line) {
                continue;
            }
            self.records_read += 1;

            let observed = match decode_error {
                Some(error) => Err(error),
                None => self.observe_line(&line),
            };
            if let Err(error) = observed {
                warn!("Skipping training record {}: {}", i + 1, error);
                self.rejected.push(RecordFailure {
                    line_number: i + 1,
                    line: line.trim_end().to_string(),
                    error,
                });
            }
        }

        Ok(self)
    }

    /// Normalizes the collected counts and returns the trained Classifier
    ///
    /// # Returns
    /// * `Result<Classifier, ClassifierError>` - The trained Classifier, or
    ///   `UntrainedSchemaError` if no schema has been set
    ///
    /// # Example
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use catbayes::ClassifierBuilder;
    ///
    /// let classifier = ClassifierBuilder::new()
    ///     .with_metadata("safety:low,high\nclass:unacc,acc")?
    ///     .add_record("low,unacc")?
    ///     .add_record("high,acc")?
    ///     .build()?;
    /// assert_eq!(classifier.training_summary().records_used, 2);
    /// # Ok(())
    /// # }
    /// ```
    pub fn build(self) -> Result<Classifier, ClassifierError> {
        let schema = self.schema.ok_or(ClassifierError::UntrainedSchemaError)?;
        let frequencies = self.frequencies.ok_or(ClassifierError::UntrainedSchemaError)?;

        let table = ProbabilityTable::from_frequencies(&frequencies);

        let class_instances = schema
            .classes()
            .values()
            .iter()
            .cloned()
            .zip(frequencies.class_counts().iter().map(|&count| count - 1))
            .collect();

        let summary = TrainingSummary {
            records_read: self.records_read,
            records_used: frequencies.observed() as usize,
            class_instances,
            rejected: self.rejected,
        };

        info!(
            "Model trained: {} records used, {} rejected",
            summary.records_used,
            summary.rejected.len()
        );

        Ok(Classifier {
            schema,
            table: Arc::new(table),
            config: self.config,
            training: Arc::new(summary),
        })
    }

    fn observe_line(&mut self, line: &str) -> Result<(), ClassifierError> {
        let (schema, frequencies) = match (&self.schema, &mut self.frequencies) {
            (Some(schema), Some(frequencies)) => (schema, frequencies),
            _ => return Err(ClassifierError::UntrainedSchemaError),
        };

        let fields = split_record(line);
        let num_attributes = schema.num_attributes();
        if fields.len() != num_attributes + 1 {
            return Err(ClassifierError::MalformedRecordError(format!(
                "expected {} columns, found {}",
                num_attributes + 1,
                fields.len()
            )));
        }

        let (values, label) = fields.split_at(num_attributes);
        let label = label[0];

        let encoded = schema.encode_values(values).map_err(|e| match e {
            ClassifierError::UnknownAttributeValueError { attribute, value } => {
                ClassifierError::MalformedRecordError(
                    format!("value '{}' is not declared for attribute '{}'", value, attribute)
                )
            }
            other => other,
        })?;
        let class = schema.classes().index_of(label).ok_or_else(|| {
            ClassifierError::MalformedRecordError(format!("unknown class label '{}'", label))
        })?;

        frequencies.observe(&encoded, class);
        Ok(())
    }
}
