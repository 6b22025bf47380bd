use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use tracing::{debug, info, warn};

pub mod api;
pub mod config;
pub mod distributions;
pub mod error;
pub mod frequency;
pub mod report;
pub mod sample;
pub mod test_definitions;

pub use error::{Result, UniformityError};
pub use report::{build_report, render_suite_summary, ChartData, TestReport};
pub use sample::Sample;
pub use stat_tests::{TestDetails, TestResult, UniformityTest};
pub use test_definitions::{run_suite, run_test, SkippedTest, SuiteResults};

/// Significance level used when the caller does not choose one.
pub const DEFAULT_SIGNIFICANCE_LEVEL: f64 = 0.05;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UniformityRequest {
    /// Numbers separated by `#`, as in a `.num` file
    pub numbers: String,
    /// Test to run (`means`, `variance`, `ks`, `chi2`, `poker`); every test when omitted
    #[serde(default)]
    pub test: Option<String>,
    /// Significance level; the server default when omitted
    #[serde(default)]
    pub alpha: Option<f64>,
}

impl UniformityRequest {
    /// The test named in the request, or `None` for the whole suite.
    pub fn selected_test(&self) -> Result<Option<UniformityTest>> {
        self.test.as_deref().map(str::parse).transpose()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UniformityResponse {
    /// True when every test that ran passed
    pub valid: bool,
    pub message: String,
    pub sample_size: usize,
    pub alpha: f64,
    pub reports: Vec<TestReport>,
    pub skipped: Vec<SkippedTest>,
    /// Suite summary text, present when the whole suite ran
    pub summary: Option<String>,
}

impl UniformityResponse {
    fn rejected(message: String, alpha: f64) -> Self {
        UniformityResponse {
            valid: false,
            message,
            sample_size: 0,
            alpha,
            reports: Vec::new(),
            skipped: Vec::new(),
            summary: None,
        }
    }
}

/// Outcome of evaluating a sample: one test, or the whole suite.
#[derive(Debug)]
pub enum Evaluation {
    Single(TestReport),
    Suite {
        results: SuiteResults,
        reports: Vec<TestReport>,
    },
}

impl Evaluation {
    pub fn reports(&self) -> &[TestReport] {
        match self {
            Evaluation::Single(report) => std::slice::from_ref(report),
            Evaluation::Suite { reports, .. } => reports,
        }
    }

    pub fn all_passed(&self) -> bool {
        !self.reports().is_empty() && self.reports().iter().all(|r| r.result.passed)
    }
}

/// Run one test, or every test when `test` is `None`, and build the reports.
pub fn evaluate(sample: &Sample, test: Option<UniformityTest>, alpha: f64) -> Result<Evaluation> {
    match test {
        Some(kind) => {
            let result = run_test(kind, sample, alpha)?;
            info!(
                "{} complete: passed={}, p_value={:.4}, n={}",
                kind,
                result.passed,
                result.p_value,
                sample.len()
            );
            Ok(Evaluation::Single(build_report(sample, &result)))
        }
        None => {
            let results = run_suite(sample, alpha)?;
            let reports = results
                .results
                .iter()
                .map(|result| build_report(sample, result))
                .collect();
            Ok(Evaluation::Suite { results, reports })
        }
    }
}

/// Evaluate a request, using `default_alpha` when it carries no significance level.
pub fn evaluate_request(request: &UniformityRequest, default_alpha: f64) -> UniformityResponse {
    let alpha = request.alpha.unwrap_or(default_alpha);
    match request.selected_test() {
        Ok(test) => evaluate_uniformity(&request.numbers, test, alpha),
        Err(e) => {
            warn!("Rejected test selection: {}", e);
            UniformityResponse::rejected(e.to_string(), alpha)
        }
    }
}

/// Parse `#`-delimited text and evaluate it, folding errors into the response.
pub fn evaluate_uniformity(
    input: &str,
    test: Option<UniformityTest>,
    alpha: f64,
) -> UniformityResponse {
    debug!(
        "Starting evaluation: input_length={}, test={:?}, alpha={}",
        input.len(),
        test,
        alpha
    );

    let sample = match Sample::parse(input) {
        Ok(sample) => sample,
        Err(e) => {
            warn!("Failed to parse input: {}", e);
            return UniformityResponse::rejected(e.to_string(), alpha);
        }
    };

    match evaluate(&sample, test, alpha) {
        Ok(evaluation) => {
            let valid = evaluation.all_passed();
            match evaluation {
                Evaluation::Single(report) => UniformityResponse {
                    valid,
                    message: format!("Analyzed {} numbers with the {}", sample.len(), report.name),
                    sample_size: sample.len(),
                    alpha,
                    reports: vec![report],
                    skipped: Vec::new(),
                    summary: None,
                },
                Evaluation::Suite { results, reports } => UniformityResponse {
                    valid,
                    message: format!(
                        "Analyzed {} numbers: {}/{} tests passed",
                        sample.len(),
                        results.tests_passed,
                        results.tests_run
                    ),
                    sample_size: sample.len(),
                    alpha,
                    summary: Some(render_suite_summary(&results)),
                    skipped: results.skipped,
                    reports,
                },
            }
        }
        Err(e) => {
            warn!("Evaluation failed: {}", e);
            UniformityResponse {
                sample_size: sample.len(),
                ..UniformityResponse::rejected(e.to_string(), alpha)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_single() {
        let sample = Sample::parse("0.1#0.4#0.6#0.9").unwrap();
        let evaluation = evaluate(&sample, Some(UniformityTest::Means), 0.05).unwrap();
        assert_eq!(evaluation.reports().len(), 1);
        assert!(evaluation.all_passed());
    }

    #[test]
    fn test_evaluate_suite_reports_every_run() {
        let sample = Sample::parse("0.13#0.42#0.67#0.91#0.05#0.38").unwrap();
        match evaluate(&sample, None, 0.05).unwrap() {
            Evaluation::Suite { results, reports } => {
                assert_eq!(results.tests_run, reports.len());
            }
            other => panic!("unexpected evaluation: {other:?}"),
        }
    }

    #[test]
    fn test_evaluate_uniformity_rejects_letters() {
        let response = evaluate_uniformity("0.1#abc", None, 0.05);
        assert!(!response.valid);
        assert!(response.message.contains("abc"));
        assert!(response.reports.is_empty());
    }

    #[test]
    fn test_evaluate_request_unknown_test() {
        let request = UniformityRequest {
            numbers: "0.1#0.9".to_string(),
            test: Some("runs".to_string()),
            alpha: None,
        };
        let response = evaluate_request(&request, 0.05);
        assert!(!response.valid);
        assert_eq!(response.alpha, 0.05);
        assert!(response.message.contains("unknown test \"runs\""));
    }

    #[test]
    fn test_evaluate_uniformity_insufficient_keeps_size() {
        let response = evaluate_uniformity("0.1#0.2", Some(UniformityTest::Poker), 0.05);
        assert!(!response.valid);
        assert_eq!(response.sample_size, 2);
        assert!(response.message.contains("Poker Test"));
    }
}
