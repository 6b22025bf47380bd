//! Human-readable summaries and chart data for test results.
//!
//! Nothing here draws anything: charts are handed to whatever front end
//! renders them as plain series.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::frequency::Histogram;
use crate::sample::Sample;
use crate::stat_tests::{TestDetails, TestResult, UniformityTest};
use crate::test_definitions::SuiteResults;

/// Bins used for the sample histograms shown with the moment and KS tests.
pub const HISTOGRAM_BINS: usize = 10;

/// Points sampled from the theoretical CDF drawn over the KS histogram.
pub const THEORETICAL_CURVE_POINTS: usize = 1000;

/// A labelled line drawn over a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Curve {
    pub label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartData {
    Histogram {
        title: String,
        edges: Vec<f64>,
        heights: Vec<f64>,
        /// Heights are densities rather than counts.
        density: bool,
        overlay: Option<Curve>,
    },
    Bars {
        title: String,
        categories: Vec<String>,
        heights: Vec<f64>,
        overlay: Option<Curve>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TestReport {
    pub test: UniformityTest,
    pub name: String,
    pub summary: String,
    pub chart: ChartData,
    pub result: TestResult,
}

/// Assemble the text summary and chart for one result.
pub fn build_report(sample: &Sample, result: &TestResult) -> TestReport {
    TestReport {
        test: result.test,
        name: result.test.display_name().to_string(),
        summary: render_summary(result),
        chart: chart_data(sample, result),
        result: result.clone(),
    }
}

fn verdict(passed: bool) -> &'static str {
    if passed {
        "PASS ✓"
    } else {
        "FAIL ✗"
    }
}

/// Fixed-order summary: verdict first, then the numbers, 4 decimals each.
pub fn render_summary(result: &TestResult) -> String {
    let mut text = format!(
        "Result of the {}: {}\n",
        result.test.display_name(),
        verdict(result.passed)
    );

    match &result.details {
        TestDetails::Means { observed_mean, z } => {
            text.push_str(&format!("Observed mean: {:.4}\n", observed_mean));
            text.push_str(&format!("Z value: {:.4}\n", z));
        }
        TestDetails::Variance {
            observed_variance,
            degrees_of_freedom,
        } => {
            text.push_str(&format!("Observed variance: {:.4}\n", observed_variance));
            text.push_str(&format!("Chi-squared value: {:.4}\n", result.statistic));
            text.push_str(&format!("Degrees of freedom: {}\n", degrees_of_freedom));
        }
        TestDetails::KolmogorovSmirnov {
            scaled_statistic, ..
        } => {
            text.push_str(&format!("KS statistic (D): {:.4}\n", result.statistic));
            text.push_str(&format!(
                "Scaled statistic (sqrt(n)*D): {:.4}\n",
                scaled_statistic
            ));
        }
        TestDetails::ChiSquared {
            expected_per_bin,
            degrees_of_freedom,
            ..
        } => {
            text.push_str(&format!("Chi-squared value: {:.4}\n", result.statistic));
            text.push_str(&format!("Expected per bin: {:.4}\n", expected_per_bin));
            text.push_str(&format!("Degrees of freedom: {}\n", degrees_of_freedom));
        }
        TestDetails::Poker {
            distinct_patterns, ..
        } => {
            text.push_str(&format!("Poker value: {:.4}\n", result.statistic));
            text.push_str(&format!("Distinct patterns: {}\n", distinct_patterns));
        }
    }

    text.push_str(&format!("Critical value: {:.4}\n", result.critical_value));
    text.push_str(&format!(
        "p-value: {:.4} (alpha = {:.4})",
        result.p_value, result.alpha
    ));
    text
}

/// Series a front end needs to draw the chart that goes with a result.
pub fn chart_data(sample: &Sample, result: &TestResult) -> ChartData {
    match &result.details {
        TestDetails::Means { .. } => {
            let histogram = Histogram::new(sample.values(), HISTOGRAM_BINS);
            ChartData::Histogram {
                title: "Histogram of the sample".to_string(),
                heights: counts_as_heights(&histogram),
                edges: histogram.edges,
                density: false,
                overlay: None,
            }
        }
        TestDetails::Variance {
            observed_variance, ..
        } => {
            let histogram = Histogram::new(sample.values(), HISTOGRAM_BINS);
            let span = vec![histogram.edges[0], histogram.edges[histogram.bins()]];
            ChartData::Histogram {
                title: "Histogram of the sample and observed variance".to_string(),
                heights: counts_as_heights(&histogram),
                edges: histogram.edges,
                density: false,
                overlay: Some(Curve {
                    label: "Observed variance".to_string(),
                    x: span,
                    y: vec![*observed_variance; 2],
                }),
            }
        }
        TestDetails::KolmogorovSmirnov { .. } => {
            let histogram = Histogram::new(sample.values(), HISTOGRAM_BINS);
            let x = linspace(0.0, 1.0, THEORETICAL_CURVE_POINTS);
            let y = x.clone();
            ChartData::Histogram {
                title: "Sample density against the uniform CDF".to_string(),
                heights: histogram.densities(),
                edges: histogram.edges,
                density: true,
                overlay: Some(Curve {
                    label: "Theoretical uniform CDF".to_string(),
                    x,
                    y,
                }),
            }
        }
        TestDetails::ChiSquared {
            histogram,
            expected_per_bin,
            ..
        } => {
            let bins = histogram.bins();
            ChartData::Bars {
                title: "Observed and expected frequencies".to_string(),
                categories: (0..bins).map(|i| i.to_string()).collect(),
                heights: counts_as_heights(histogram),
                overlay: Some(Curve {
                    label: "Expected frequency".to_string(),
                    x: (0..bins).map(|i| i as f64).collect(),
                    y: vec![*expected_per_bin; bins],
                }),
            }
        }
        TestDetails::Poker { frequencies, .. } => ChartData::Bars {
            title: "Poker pattern frequencies".to_string(),
            categories: frequencies.iter().map(|(key, _)| key.clone()).collect(),
            heights: frequencies.iter().map(|(_, &count)| count as f64).collect(),
            overlay: None,
        },
    }
}

fn counts_as_heights(histogram: &Histogram) -> Vec<f64> {
    histogram.counts.iter().map(|&c| c as f64).collect()
}

fn linspace(start: f64, end: f64, points: usize) -> Vec<f64> {
    match points {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (points - 1) as f64;
            (0..points)
                .map(|i| {
                    if i == points - 1 {
                        end
                    } else {
                        start + i as f64 * step
                    }
                })
                .collect()
        }
    }
}

/// Summary of a whole suite run.
pub fn render_suite_summary(suite: &SuiteResults) -> String {
    let mut summary = format!(
        "Uniformity Analysis\n\
         ===================\n\
         Sample Size: {} numbers\n\
         Significance Level: {:.4}\n\
         Tests Run: {}\n\
         Tests Passed: {}/{} ({:.1}%)\n\n\
         Individual Test Results:\n\
         -----------------------\n",
        suite.sample_size,
        suite.alpha,
        suite.tests_run,
        suite.tests_passed,
        suite.tests_run,
        suite.pass_rate
    );

    for result in &suite.results {
        summary.push_str(&format!(
            "{:25} {} (stat={:.4}, p={:.4})\n",
            result.test.display_name(),
            verdict(result.passed),
            result.statistic,
            result.p_value
        ));
    }

    if !suite.skipped.is_empty() {
        summary.push_str("\nSkipped:\n");
        for skipped in &suite.skipped {
            summary.push_str(&format!(
                "{:25} {}\n",
                skipped.test.display_name(),
                skipped.reason
            ));
        }
    }

    summary.push_str("\nInterpretation:\n");
    summary.push_str("---------------\n");
    if suite.tests_run == 0 {
        summary.push_str("No test could run on this sample.\n");
    } else if suite.tests_passed == suite.tests_run {
        summary.push_str("✓ The sample is consistent with uniform(0,1) in every test.\n");
    } else if suite.pass_rate >= 50.0 {
        summary.push_str("⚠ The sample departs from uniform(0,1) in some tests.\n");
    } else {
        summary.push_str("✗ The sample is not consistent with uniform(0,1).\n");
    }

    summary
}
