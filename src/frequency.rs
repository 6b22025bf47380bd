use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Equal-width histogram over the observed range of the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Histogram {
    /// `bins + 1` ascending edges.
    pub edges: Vec<f64>,
    pub counts: Vec<u64>,
}

impl Histogram {
    /// Bin `values` into `bins` equal-width intervals spanning `[min, max]`.
    ///
    /// Every interval is half-open except the last, which also holds `max`.
    /// A zero-width range is widened to `[min - 0.5, max + 0.5]`.
    pub fn new(values: &[f64], bins: usize) -> Self {
        let bins = bins.max(1);
        let (mut first, mut last) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if values.is_empty() {
            (first, last) = (0.0, 1.0);
        } else if first == last {
            first -= 0.5;
            last += 0.5;
        }

        let span = last - first;
        let edges: Vec<f64> = (0..=bins)
            .map(|i| {
                if i == bins {
                    last
                } else {
                    first + span * i as f64 / bins as f64
                }
            })
            .collect();

        let norm = bins as f64 / span;
        let mut counts = vec![0u64; bins];
        for &value in values {
            let mut index = (((value - first) * norm) as usize).min(bins - 1);
            // Rounding in the scaled index can land one bin off the edges
            if index > 0 && value < edges[index] {
                index -= 1;
            } else if index + 1 < bins && value >= edges[index + 1] {
                index += 1;
            }
            counts[index] += 1;
        }

        Histogram { edges, counts }
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn bin_width(&self) -> f64 {
        self.edges[1] - self.edges[0]
    }

    /// Heights normalised so that the histogram integrates to 1.
    pub fn densities(&self) -> Vec<f64> {
        let total = self.total() as f64;
        self.counts
            .iter()
            .zip(self.edges.windows(2))
            .map(|(&count, edge)| count as f64 / (total * (edge[1] - edge[0])))
            .collect()
    }
}

/// Observed count per poker pattern key, ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FrequencyTable(pub BTreeMap<String, u64>);

impl FrequencyTable {
    /// Tally the poker pattern key of every value.
    pub fn from_patterns(values: &[f64]) -> Self {
        let mut table = BTreeMap::new();
        for &value in values {
            *table.entry(pattern_key(value)).or_insert(0) += 1;
        }
        FrequencyTable(table)
    }

    /// Number of distinct keys.
    pub fn distinct(&self) -> usize {
        self.0.len()
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn sum_of_squares(&self) -> f64 {
        self.0.values().map(|&f| (f as f64).powi(2)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &u64)> {
        self.0.iter()
    }
}

/// Canonical digit pattern of a number: the decimal digits of its shortest
/// round-trip rendering, sorted ascending. `0.21` becomes `"012"`.
pub fn pattern_key(value: f64) -> String {
    let mut digits: Vec<char> = value
        .to_string()
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    digits.sort_unstable();
    digits.into_iter().collect()
}
