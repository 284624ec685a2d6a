//! Quarantine helper for known-flaky tests.
//!
//! ```ignore
//! #[test]
//! fn sometimes_times_out() {
//!     if !quarantine::flaky("sometimes_times_out", "TEST-123")?.should_run() {
//!         return;
//!     }
//!     // ...
//! }
//! ```
//!
//! Quarantined tests are skipped unless `RUN_QUARANTINED_TESTS=true`.

use crate::error::{Error, Result};

pub const RUN_QUARANTINED_TESTS_ENV_VAR: &str = "RUN_QUARANTINED_TESTS";
pub const FLAKY_TEST_ATTR: &str = "flaky_test";
const CLASSIFIED_BY: &str =
    "Classified by branch-out (https://github.com/smartcontractkit/branch-out)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Quarantine {
    Run,
    Skip { reason: String },
}

impl Quarantine {
    #[must_use]
    pub const fn should_run(&self) -> bool {
        matches!(self, Self::Run)
    }
}

/// Mark `test_name` as flaky under `ticket` and decide whether it runs.
pub fn flaky(test_name: &str, ticket: &str) -> Result<Quarantine> {
    flaky_with_env(test_name, ticket, |key| std::env::var(key).ok())
}

pub fn flaky_with_env(
    test_name: &str,
    ticket: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Quarantine> {
    attr(test_name, FLAKY_TEST_ATTR, ticket)?;

    let explanation = format!("known flaky test. Ticket {ticket}");
    let run = lookup(RUN_QUARANTINED_TESTS_ENV_VAR).is_some_and(|v| v == "true");
    if run {
        tracing::info!(
            event = "quarantine.run",
            test = test_name,
            ticket = ticket,
            "Running {explanation}. Test is marked as quarantined; set {RUN_QUARANTINED_TESTS_ENV_VAR}=false to skip it. {CLASSIFIED_BY}",
        );
        Ok(Quarantine::Run)
    } else {
        let reason = format!(
            "Skipping {explanation}. To run quarantined tests, set the {RUN_QUARANTINED_TESTS_ENV_VAR} environment variable to true.\n{CLASSIFIED_BY}"
        );
        tracing::info!(event = "quarantine.skip", test = test_name, ticket = ticket, "{reason}");
        Ok(Quarantine::Skip { reason })
    }
}

/// Emit a test attribute line in the `=== ATTR  <test> <key> <value>` form
/// that `go test -json` consumers already understand.
fn attr(test_name: &str, key: &str, value: &str) -> Result<()> {
    if key.chars().any(char::is_whitespace) {
        return Err(Error::validation(format!(
            "disallowed whitespace in attribute key {key:?}"
        )));
    }
    if value.contains(['\r', '\n']) {
        return Err(Error::validation(format!(
            "disallowed newline in attribute value {value:?}"
        )));
    }
    tracing::info!(
        event = "quarantine.attr",
        test = test_name,
        key = key,
        value = value,
        "=== ATTR  {test_name} {key} {value}",
    );
    Ok(())
}
