use ndarray::{Array1, Array2, Axis};

use super::schema::Schema;

/// Raw training counts.
///
/// Every cell starts at 1 so that combinations never seen in training keep a
/// non-zero likelihood. For each attribute the matrix is laid out as
/// `values × classes`; the class counter has one entry per class.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyModel {
    value_counts: Vec<Array2<u64>>,
    class_counts: Array1<u64>,
}

impl FrequencyModel {
    /// Creates a dense, smoothed count table sized by `schema`.
    pub fn new(schema: &Schema) -> Self {
        let num_classes = schema.num_classes();
        let value_counts = schema
            .attributes()
            .iter()
            .map(|attribute| Array2::ones((attribute.domain.len(), num_classes)))
            .collect();

        Self {
            value_counts,
            class_counts: Array1::ones(num_classes),
        }
    }

    /// Records one training instance given its encoded values and class.
    ///
    /// Indices must come from the schema this model was created with.
    pub(crate) fn observe(&mut self, values: &[usize], class: usize) {
        debug_assert_eq!(values.len(), self.value_counts.len());
        self.class_counts[class] += 1;
        for (counts, &value) in self.value_counts.iter_mut().zip(values) {
            counts[[value, class]] += 1;
        }
    }

    /// Count for `(attribute, value, class)`, all given as positions.
    pub fn count(&self, attribute: usize, value: usize, class: usize) -> u64 {
        self.value_counts[attribute][[value, class]]
    }

    /// The `values × classes` count matrix of one attribute.
    pub fn attribute_counts(&self, attribute: usize) -> &Array2<u64> {
        &self.value_counts[attribute]
    }

    /// Per-class instance counters, including the initial 1.
    pub fn class_counts(&self) -> &Array1<u64> {
        &self.class_counts
    }

    pub fn num_attributes(&self) -> usize {
        self.value_counts.len()
    }

    /// Number of instances observed since creation.
    pub fn observed(&self) -> u64 {
        self.class_counts.sum() - self.class_counts.len() as u64
    }

    /// Sum over the values of one attribute, per class.
    pub fn attribute_totals(&self, attribute: usize) -> Array1<u64> {
        self.value_counts[attribute].sum_axis(Axis(0))
    }
}
