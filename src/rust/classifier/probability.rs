use ndarray::{Array1, Array2, Axis};

use super::frequency::FrequencyModel;

/// Normalized likelihoods and class priors derived from a [`FrequencyModel`].
///
/// Likelihoods are `count(value, class) / total(class)`, where `total(class)`
/// is the smoothed class counter. The class total is shared across all
/// attributes, so the likelihoods of one attribute's values are not
/// renormalised and need not sum to 1 per class. Priors do sum to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityTable {
    likelihoods: Vec<Array2<f64>>,
    priors: Array1<f64>,
}

impl ProbabilityTable {
    /// Derives the table from raw counts.
    ///
    /// The counts are only borrowed, so the class totals used as denominators
    /// are the same for the likelihood and prior passes and repeated calls
    /// produce identical tables.
    pub fn from_frequencies(frequencies: &FrequencyModel) -> Self {
        let class_totals = frequencies.class_counts().mapv(|c| c as f64);

        let likelihoods = (0..frequencies.num_attributes())
            .map(|attribute| {
                let mut table = frequencies.attribute_counts(attribute).mapv(|c| c as f64);
                for (mut column, &total) in table.axis_iter_mut(Axis(1)).zip(class_totals.iter()) {
                    column /= total;
                }
                table
            })
            .collect();

        let grand_total = class_totals.sum();
        let priors = class_totals.mapv(|total| total / grand_total);

        Self { likelihoods, priors }
    }

    /// P(value | class) for positions in the schema.
    pub fn likelihood(&self, attribute: usize, value: usize, class: usize) -> f64 {
        self.likelihoods[attribute][[value, class]]
    }

    /// P(class).
    pub fn prior(&self, class: usize) -> f64 {
        self.priors[class]
    }

    pub fn priors(&self) -> &Array1<f64> {
        &self.priors
    }

    /// The `values × classes` likelihood matrix of one attribute.
    pub fn attribute_likelihoods(&self, attribute: usize) -> &Array2<f64> {
        &self.likelihoods[attribute]
    }

    pub fn num_attributes(&self) -> usize {
        self.likelihoods.len()
    }

    pub fn num_classes(&self) -> usize {
        self.priors.len()
    }

    /// Unnormalized posterior `prior × Π likelihood` for every class.
    pub(crate) fn scores(&self, values: &[usize]) -> Array1<f64> {
        let mut scores = self.priors.clone();
        for (table, &value) in self.likelihoods.iter().zip(values) {
            scores *= &table.row(value);
        }
        scores
    }
}
