//! Report enhancement: drop noise entries and attach file paths.

use crate::config::EnhanceConfig;
use crate::junit::{TestCase, TestSuite, TestSuites};
use crate::resolver::{MatchTier, Resolver};
use crate::source_index::SourceIndex;
use serde::Serialize;
use std::collections::BTreeMap;

/// Outcome for a single case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    /// `file` was already set and was left alone.
    AlreadySet,
    Resolved(MatchTier),
    Unresolved,
}

impl MatchResult {
    #[must_use]
    pub const fn is_matched(self) -> bool {
        !matches!(self, Self::Unresolved)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmatchedCase {
    pub suite: String,
    pub classname: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnhanceSummary {
    pub matched: usize,
    pub total: usize,
    pub already_set: usize,
    pub dropped_suites: usize,
    pub dropped_synthetic: usize,
    pub by_tier: BTreeMap<MatchTier, usize>,
    pub unmatched: Vec<UnmatchedCase>,
}

impl EnhanceSummary {
    #[must_use]
    pub fn unmatched_count(&self) -> usize {
        self.total - self.matched
    }

    #[must_use]
    pub fn all_matched(&self) -> bool {
        self.matched == self.total
    }

    fn record(&mut self, suite: &str, case: &TestCase, result: MatchResult) {
        self.total += 1;
        match result {
            MatchResult::AlreadySet => {
                self.matched += 1;
                self.already_set += 1;
            }
            MatchResult::Resolved(tier) => {
                self.matched += 1;
                *self.by_tier.entry(tier).or_default() += 1;
            }
            MatchResult::Unresolved => self.unmatched.push(UnmatchedCase {
                suite: suite.to_string(),
                classname: case.classname.clone(),
                name: case.name.clone(),
            }),
        }
    }
}

/// Enhance `report` in place.
///
/// Degenerate suites and the runner's synthetic entry-point case are removed
/// before counting. Every other case keeps its position; cases that already
/// carry a file are never rewritten.
pub fn enhance(
    report: &mut TestSuites,
    index: &SourceIndex,
    config: &EnhanceConfig,
) -> EnhanceSummary {
    let mut summary = EnhanceSummary::default();

    let before = report.suites.len();
    report.suites.retain(|suite| {
        if suite.is_degenerate() {
            tracing::debug!(
                event = "enhance.drop_suite",
                cases = suite.test_cases.len(),
                "Dropping empty unnamed test suite",
            );
            false
        } else {
            true
        }
    });
    summary.dropped_suites = before - report.suites.len();

    let resolver = Resolver::new(index, config.match_policy());
    for suite in &mut report.suites {
        summary.dropped_synthetic += drop_synthetic_cases(suite, &config.reserved_entry_point);

        for case in &mut suite.test_cases {
            let result = enhance_case(case, &resolver);
            summary.record(&suite.name, case, result);
        }
    }

    summary
}

/// Resolve one case, writing the path into it on success.
pub fn enhance_case(case: &mut TestCase, resolver: &Resolver<'_>) -> MatchResult {
    if let Some(existing) = case.file() {
        tracing::debug!(
            event = "enhance.file_already_set",
            test = %case.name,
            file = %existing,
            "File already set for test {}",
            case.name,
        );
        return MatchResult::AlreadySet;
    }

    match resolver.resolve(&case.classname, &case.name) {
        Some(resolution) => {
            tracing::debug!(
                event = "enhance.matched",
                test = %case.name,
                file = %resolution.path,
                tier = resolution.tier.as_str(),
                "Matched: {} -> {}",
                case.name,
                resolution.path,
            );
            case.set_file(resolution.path);
            MatchResult::Resolved(resolution.tier)
        }
        None => {
            tracing::warn!(
                event = "enhance.unmatched",
                test = %case.name,
                classname = %case.classname,
                "Could not find file for test {} in class {}",
                case.name,
                case.classname,
            );
            MatchResult::Unresolved
        }
    }
}

/// Remove cases with an empty classname named after the reserved entry point.
///
/// A failure on such a case usually means the package failed to build or its
/// setup hook exited early, so the message is surfaced at error level.
fn drop_synthetic_cases(suite: &mut TestSuite, reserved: &str) -> usize {
    let before = suite.test_cases.len();
    let suite_name = suite.name.clone();
    suite.test_cases.retain(|case| {
        if !is_synthetic(case, reserved) {
            return true;
        }
        if let Some(failure) = &case.failure {
            tracing::error!(
                event = "enhance.synthetic_failure",
                suite = %suite_name,
                test = %case.name,
                "{} failed in {suite_name}: {}",
                case.name,
                failure.message,
            );
        } else {
            tracing::debug!(
                event = "enhance.drop_synthetic",
                suite = %suite_name,
                "Dropping synthetic {} case",
                case.name,
            );
        }
        false
    });
    before - suite.test_cases.len()
}

fn is_synthetic(case: &TestCase, reserved: &str) -> bool {
    case.classname.is_empty() && case.name == reserved
}
