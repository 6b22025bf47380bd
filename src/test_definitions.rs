use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use crate::error::{check_significance, Result, UniformityError};
use crate::sample::Sample;
use crate::stat_tests::{
    chi_squared_test, ks_test, means_test, poker_test, variance_test, TestResult, UniformityTest,
    POKER_GROUP_OFFSET,
};

/// Definition of a uniformity test with its requirements and execution logic
pub struct UniformityTestDefinition {
    pub kind: UniformityTest,
    /// Human-readable name for the test
    pub name: &'static str,
    /// Smallest sample the test's formula is defined for
    pub min_samples: usize,
    pub execute: fn(&Sample, f64) -> Result<TestResult>,
}

impl UniformityTestDefinition {
    /// Check if this test can run on a sample of the given size
    pub fn should_run(&self, sample_size: usize) -> bool {
        sample_size >= self.min_samples
    }
}

/// Get all uniformity test definitions, in reporting order
pub fn get_all_tests() -> Vec<UniformityTestDefinition> {
    vec![
        UniformityTestDefinition {
            kind: UniformityTest::Means,
            name: UniformityTest::Means.display_name(),
            min_samples: 1,
            execute: means_test,
        },
        UniformityTestDefinition {
            kind: UniformityTest::Variance,
            name: UniformityTest::Variance.display_name(),
            min_samples: 2,
            execute: variance_test,
        },
        UniformityTestDefinition {
            kind: UniformityTest::KolmogorovSmirnov,
            name: UniformityTest::KolmogorovSmirnov.display_name(),
            min_samples: 1,
            execute: ks_test,
        },
        UniformityTestDefinition {
            kind: UniformityTest::ChiSquared,
            name: UniformityTest::ChiSquared.display_name(),
            min_samples: 1,
            execute: chi_squared_test,
        },
        UniformityTestDefinition {
            kind: UniformityTest::Poker,
            name: UniformityTest::Poker.display_name(),
            min_samples: POKER_GROUP_OFFSET + 1,
            execute: poker_test,
        },
    ]
}

/// Run a single test against the sample
pub fn run_test(kind: UniformityTest, sample: &Sample, alpha: f64) -> Result<TestResult> {
    let definition = get_all_tests()
        .into_iter()
        .find(|d| d.kind == kind)
        .ok_or_else(|| UniformityError::UnknownTest(kind.id().to_string()))?;
    debug!("Running {} on {} numbers", definition.name, sample.len());
    (definition.execute)(sample, alpha)
}

/// A test the sample could not support.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SkippedTest {
    pub test: UniformityTest,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SuiteResults {
    pub sample_size: usize,
    pub alpha: f64,
    pub tests_run: usize,
    pub tests_passed: usize,
    pub pass_rate: f64,
    pub results: Vec<TestResult>,
    pub skipped: Vec<SkippedTest>,
}

/// Run every test the sample is large enough for.
///
/// Tests whose preconditions the sample does not meet are listed in
/// `skipped`; any other failure aborts the whole run.
pub fn run_suite(sample: &Sample, alpha: f64) -> Result<SuiteResults> {
    check_significance(alpha)?;

    let mut results = Vec::new();
    let mut skipped = Vec::new();
    for definition in get_all_tests() {
        if !definition.should_run(sample.len()) {
            debug!(
                "Skipping {}: {} < {} numbers",
                definition.name,
                sample.len(),
                definition.min_samples
            );
            skipped.push(SkippedTest {
                test: definition.kind,
                reason: format!(
                    "needs at least {} numbers, got {}",
                    definition.min_samples,
                    sample.len()
                ),
            });
            continue;
        }

        match (definition.execute)(sample, alpha) {
            Ok(result) => results.push(result),
            Err(UniformityError::InsufficientSample { reason, .. }) => {
                warn!("Skipping {}: {}", definition.name, reason);
                skipped.push(SkippedTest {
                    test: definition.kind,
                    reason,
                });
            }
            Err(e) => return Err(e),
        }
    }

    let tests_run = results.len();
    let tests_passed = results.iter().filter(|r| r.passed).count();
    let pass_rate = if tests_run > 0 {
        (tests_passed as f64 / tests_run as f64) * 100.0
    } else {
        0.0
    };
    info!(
        "Suite complete: {}/{} passed, {} skipped, n={}",
        tests_passed,
        tests_run,
        skipped.len(),
        sample.len()
    );

    Ok(SuiteResults {
        sample_size: sample.len(),
        alpha,
        tests_run,
        tests_passed,
        pass_rate,
        results,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_every_test_once() {
        let kinds: Vec<UniformityTest> = get_all_tests().iter().map(|d| d.kind).collect();
        assert_eq!(kinds, UniformityTest::ALL.to_vec());
    }

    #[test]
    fn test_should_run() {
        let poker = get_all_tests()
            .into_iter()
            .find(|d| d.kind == UniformityTest::Poker)
            .unwrap();
        assert!(!poker.should_run(4));
        assert!(poker.should_run(5));
    }

    #[test]
    fn test_run_test_dispatches() {
        let sample = Sample::parse("0.1#0.5#0.9").unwrap();
        let result = run_test(UniformityTest::Means, &sample, 0.05).unwrap();
        assert_eq!(result.test, UniformityTest::Means);
    }

    #[test]
    fn test_suite_skips_small_sample_tests() {
        let sample = Sample::parse("0.5").unwrap();
        let suite = run_suite(&sample, 0.05).unwrap();
        assert_eq!(suite.tests_run, 3);
        let skipped: Vec<UniformityTest> = suite.skipped.iter().map(|s| s.test).collect();
        assert_eq!(skipped, vec![UniformityTest::Variance, UniformityTest::Poker]);
    }

    #[test]
    fn test_suite_invalid_alpha() {
        let sample = Sample::parse("0.5#0.25").unwrap();
        assert!(run_suite(&sample, -0.1).is_err());
    }
}
