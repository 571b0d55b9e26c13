//! A categorical Naive Bayes classifier for discrete-attribute records.
//!
//! A metadata file declares the attributes and their possible values, plus
//! the class labels on a line named `class`:
//!
//! ```text
//! buying:vhigh,high,med,low
//! doors:2,3,4,5more
//! class:unacc,acc,good,vgood
//! ```
//!
//! Training and test data hold one comma-separated record per line, the
//! attribute values in metadata order followed by the class label (optional
//! for test data).
//!
//! # Basic Usage
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use catbayes::Classifier;
//!
//! let classifier = Classifier::builder()
//!     .with_metadata("doors:2,4\nsafety:low,high\nclass:unacc,acc")?
//!     .add_records("2,low,unacc\n2,low,unacc\n4,high,acc".as_bytes())?
//!     .build()?;
//!
//! let (label, scores) = classifier.predict(&["4", "high"])?;
//! println!("Predicted class: {}", label);
//! # assert_eq!(label, "acc");
//! # assert!(scores["acc"] > scores["unacc"]);
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! A trained classifier is immutable and can be shared across threads using `Arc`:
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use catbayes::Classifier;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let classifier = Arc::new(Classifier::builder()
//!     .with_metadata("doors:2,4\nclass:a,b")?
//!     .add_records("2,a\n4,b".as_bytes())?
//!     .build()?);
//!
//! let mut handles = vec![];
//! for _ in 0..3 {
//!     let classifier = Arc::clone(&classifier);
//!     handles.push(thread::spawn(move || {
//!         classifier.predict(&["2"]).unwrap();
//!     }));
//! }
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! # Ok(())
//! # }
//! ```

pub mod classifier;
mod config;
pub mod session;

pub use classifier::{
    Accuracy, ClassTally, Classifier, ClassifierBuilder, ClassifierError, ClassifierInfo,
    EvaluationReport, FrequencyModel, ModelDump, OutcomeStatus, ProbabilityTable, RecordFailure,
    RecordOutcome, RecordPrediction, Schema, TestRun, TrainingSummary,
};
pub use config::{ClassifierConfig, TieBreak};
pub use session::{Command, CommandOutcome, Session};

pub fn init_logger() {
    env_logger::init();
}
