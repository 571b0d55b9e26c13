use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};

use crate::classifier::{Classifier, ClassifierError, EvaluationReport, Schema, TrainingSummary};
use crate::ClassifierConfig;

/// An operation the front-end can request from a [`Session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    LoadMetadata(PathBuf),
    Train(PathBuf),
    Test { input: PathBuf, output: PathBuf },
    Reset,
}

/// What a dispatched command produced, for the front-end to render.
#[derive(Debug)]
pub enum CommandOutcome {
    MetadataLoaded(Arc<Schema>),
    Trained(Arc<TrainingSummary>),
    Tested(EvaluationReport),
    Reset,
}

/// Holds the loaded schema and the trained classifier between operations.
///
/// Loading metadata replaces the schema and discards any trained model;
/// training replaces the model; `reset` clears both.
#[derive(Debug, Default)]
pub struct Session {
    config: ClassifierConfig,
    schema: Option<Arc<Schema>>,
    classifier: Option<Classifier>,
}

impl Session {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            schema: None,
            classifier: None,
        }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_deref()
    }

    pub fn classifier(&self) -> Option<&Classifier> {
        self.classifier.as_ref()
    }

    pub fn has_schema(&self) -> bool {
        self.schema.is_some()
    }

    pub fn is_trained(&self) -> bool {
        self.classifier.is_some()
    }

    /// Runs one command against the session.
    pub fn dispatch(&mut self, command: Command) -> Result<CommandOutcome, ClassifierError> {
        match command {
            Command::LoadMetadata(path) => self.load_metadata(path).map(CommandOutcome::MetadataLoaded),
            Command::Train(path) => self.train(path).map(CommandOutcome::Trained),
            Command::Test { input, output } => self.test(input, output).map(CommandOutcome::Tested),
            Command::Reset => {
                self.reset();
                Ok(CommandOutcome::Reset)
            }
        }
    }

    /// Loads a metadata file, replacing the schema and discarding the model.
    ///
    /// On error the session is left unchanged.
    pub fn load_metadata<P: AsRef<Path>>(&mut self, path: P) -> Result<Arc<Schema>, ClassifierError> {
        let path = path.as_ref();
        let file = open_existing(path)?;
        let schema = Arc::new(Schema::from_reader(BufReader::new(file))?);

        info!("Metadata loaded from {:?}", path);
        self.schema = Some(Arc::clone(&schema));
        self.classifier = None;
        Ok(schema)
    }

    /// Trains a new classifier from a data file against the loaded schema.
    pub fn train<P: AsRef<Path>>(&mut self, path: P) -> Result<Arc<TrainingSummary>, ClassifierError> {
        let schema = self.schema.clone().ok_or(ClassifierError::UntrainedSchemaError)?;
        let path = path.as_ref();
        let file = open_existing(path)?;

        let classifier = Classifier::builder()
            .with_config(self.config.clone())
            .with_schema(schema)
            .add_records(BufReader::new(file))?
            .build()?;

        info!("Model trained from {:?}", path);
        debug!("Learned tables:\n{}", classifier.describe());

        let summary = Arc::clone(&classifier.training);
        self.classifier = Some(classifier);
        Ok(summary)
    }

    /// Classifies a data file and writes one result line per record to `output`.
    pub fn test<P, Q>(&self, input: P, output: Q) -> Result<EvaluationReport, ClassifierError>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        if self.schema.is_none() {
            return Err(ClassifierError::UntrainedSchemaError);
        }
        let classifier = self.classifier.as_ref().ok_or(ClassifierError::UntrainedModelError)?;

        let file = open_existing(input.as_ref())?;
        let run = classifier.evaluate(BufReader::new(file))?;

        let writer = BufWriter::new(File::create(output.as_ref())?);
        run.write_predictions(writer, &self.config.output_separator)?;
        info!("Predictions written to {:?}", output.as_ref());

        Ok(run.into_report())
    }

    /// Clears the schema and the trained model.
    pub fn reset(&mut self) {
        self.schema = None;
        self.classifier = None;
        info!("Classifier reset");
    }
}

fn open_existing(path: &Path) -> Result<File, ClassifierError> {
    if !path.exists() {
        return Err(ClassifierError::FileNotFoundError(path.to_path_buf()));
    }
    Ok(File::open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_train_requires_metadata() {
        let dir = TempDir::new().unwrap();
        let data = write(&dir, "train.txt", "2,a\n");

        let mut session = Session::default();
        assert!(matches!(session.train(&data), Err(ClassifierError::UntrainedSchemaError)));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let mut session = Session::default();

        let result = session.load_metadata(dir.path().join("nope.txt"));
        assert!(matches!(result, Err(ClassifierError::FileNotFoundError(_))));
        assert!(!session.has_schema());
    }

    #[test]
    fn test_reload_metadata_discards_model() {
        let dir = TempDir::new().unwrap();
        let metadata = write(&dir, "meta.txt", "doors:2,4\nclass:a,b\n");
        let data = write(&dir, "train.txt", "2,a\n4,b\n");

        let mut session = Session::default();
        session.load_metadata(&metadata).unwrap();
        session.train(&data).unwrap();
        assert!(session.is_trained());

        session.load_metadata(&metadata).unwrap();
        assert!(session.has_schema());
        assert!(!session.is_trained());
    }

    #[test]
    fn test_bad_metadata_keeps_previous_schema() {
        let dir = TempDir::new().unwrap();
        let good = write(&dir, "good.txt", "doors:2,4\nclass:a,b\n");
        let bad = write(&dir, "bad.txt", "doors:2,4\n");

        let mut session = Session::default();
        session.load_metadata(&good).unwrap();
        assert!(matches!(session.load_metadata(&bad), Err(ClassifierError::SchemaError(_))));
        assert_eq!(session.schema().map(Schema::num_attributes), Some(1));
    }

    #[test]
    fn test_test_before_training() {
        let dir = TempDir::new().unwrap();
        let metadata = write(&dir, "meta.txt", "doors:2,4\nclass:a,b\n");
        let input = write(&dir, "test.txt", "2\n");
        let output = dir.path().join("out.txt");

        let mut session = Session::default();
        assert!(matches!(
            session.test(&input, &output),
            Err(ClassifierError::UntrainedSchemaError)
        ));

        session.load_metadata(&metadata).unwrap();
        assert!(matches!(
            session.test(&input, &output),
            Err(ClassifierError::UntrainedModelError)
        ));
        assert!(!output.exists());
    }

    #[test]
    fn test_dispatch_reset() {
        let dir = TempDir::new().unwrap();
        let metadata = write(&dir, "meta.txt", "doors:2,4\nclass:a,b\n");

        let mut session = Session::default();
        session.dispatch(Command::LoadMetadata(metadata)).unwrap();
        assert!(matches!(session.dispatch(Command::Reset), Ok(CommandOutcome::Reset)));
        assert!(!session.has_schema());
        assert!(!session.is_trained());
    }
}
