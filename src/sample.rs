use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{Result, UniformityError};

/// Delimiter between numbers in a `.num` sample file.
pub const DELIMITER: char = '#';

/// An immutable, non-empty sequence of numbers to test for uniformity on [0,1].
///
/// Values are expected, but not required, to lie in [0,1].
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    values: Vec<f64>,
}

impl Sample {
    /// Parse `#`-delimited text into a sample.
    ///
    /// Empty fragments (leading, trailing or doubled delimiters) are skipped.
    /// Every other fragment must parse as a finite number once surrounding
    /// whitespace is trimmed.
    pub fn parse(input: &str) -> Result<Self> {
        let values = input
            .split(DELIMITER)
            .filter(|fragment| !fragment.is_empty())
            .enumerate()
            .map(|(position, fragment)| parse_fragment(fragment, position))
            .collect::<Result<Vec<f64>>>()
            .inspect_err(|e| warn!("Failed to parse sample: {}", e))?;

        debug!("Parsed {} numbers from {} bytes", values.len(), input.len());
        Self::from_parsed(values)
    }

    /// Read a sample file fully and parse it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| UniformityError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded sample file {}", path.display());
        Self::parse(&data)
    }

    /// Build a sample from numbers that are already in memory.
    pub fn from_values(values: Vec<f64>) -> Result<Self> {
        if let Some(position) = values.iter().position(|v| !v.is_finite()) {
            return Err(UniformityError::Format {
                fragment: values[position].to_string(),
                position,
            });
        }
        Self::from_parsed(values)
    }

    fn from_parsed(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(UniformityError::EmptySample);
        }
        Ok(Self { values })
    }

    /// Serialize back to the `#`-delimited text format.
    pub fn to_text(&self) -> String {
        self.values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(&DELIMITER.to_string())
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false: a `Sample` cannot be built empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn mean(&self) -> f64 {
        self.values.iter().sum::<f64>() / self.len() as f64
    }

    /// Population variance (divisor n).
    pub fn variance(&self) -> f64 {
        let mean = self.mean();
        self.values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / self.len() as f64
    }

    /// Values in ascending order.
    pub fn sorted(&self) -> Vec<f64> {
        let mut sorted = self.values.clone();
        sorted.sort_by(f64::total_cmp);
        sorted
    }
}

fn parse_fragment(fragment: &str, position: usize) -> Result<f64> {
    let format_error = || UniformityError::Format {
        fragment: fragment.to_string(),
        position,
    };
    let value = fragment.trim().parse::<f64>().map_err(|_| format_error())?;
    if !value.is_finite() {
        return Err(format_error());
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trailing_delimiter() {
        let sample = Sample::parse("0.1#0.2#0.3#").unwrap();
        assert_eq!(sample.values(), &[0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_parse_skips_empty_fragments() {
        let sample = Sample::parse("#0.5##0.25#").unwrap();
        assert_eq!(sample.values(), &[0.5, 0.25]);
    }

    #[test]
    fn test_parse_trailing_newline() {
        let sample = Sample::parse("0.1#0.9\n").unwrap();
        assert_eq!(sample.values(), &[0.1, 0.9]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = Sample::parse("0.1#abc#0.3").unwrap_err();
        match err {
            UniformityError::Format { fragment, position } => {
                assert_eq!(fragment, "abc");
                assert_eq!(position, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_whitespace_fragment() {
        assert!(matches!(
            Sample::parse("0.1#0.2#\n"),
            Err(UniformityError::Format { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_nan() {
        assert!(matches!(
            Sample::parse("0.1#NaN"),
            Err(UniformityError::Format { .. })
        ));
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(Sample::parse(""), Err(UniformityError::EmptySample)));
        assert!(matches!(Sample::parse("###"), Err(UniformityError::EmptySample)));
    }

    #[test]
    fn test_from_values_rejects_infinite() {
        assert!(Sample::from_values(vec![0.1, f64::INFINITY]).is_err());
        assert!(matches!(
            Sample::from_values(vec![]),
            Err(UniformityError::EmptySample)
        ));
    }

    #[test]
    fn test_moments() {
        let sample = Sample::from_values(vec![0.0, 0.5, 1.0]).unwrap();
        assert!((sample.mean() - 0.5).abs() < 1e-12);
        assert!((sample.variance() - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_sorted_does_not_mutate() {
        let sample = Sample::from_values(vec![0.9, 0.1, 0.5]).unwrap();
        assert_eq!(sample.sorted(), vec![0.1, 0.5, 0.9]);
        assert_eq!(sample.values(), &[0.9, 0.1, 0.5]);
    }

    #[test]
    fn test_to_text() {
        let sample = Sample::from_values(vec![0.1, 0.25]).unwrap();
        assert_eq!(sample.to_text(), "0.1#0.25");
    }
}
