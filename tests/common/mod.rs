//! Shared fixtures for integration tests.
//!
//! [`FixtureRepo`] lays out a small Go repository in a temp dir: a root module
//! with a few packages plus a nested module, mirroring what `gotestsum`
//! reports would reference.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct FixtureRepo {
    dir: TempDir,
}

impl FixtureRepo {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create fixture tempdir"),
        }
    }

    /// Root module `example.com/fixture` with math, strings, a build failure,
    /// a `TestMain` package, a vendored copy, and a nested `service` module.
    pub fn go_repo() -> Self {
        let repo = Self::empty();
        repo.write("go.mod", "module example.com/fixture\n\ngo 1.22\n");
        repo.write(
            "math/math.go",
            "package math\n\nfunc Divide(a, b float64) (float64, error) { return a / b, nil }\n",
        );
        repo.write(
            "math/math_test.go",
            r#"package math

import "testing"

func TestDivide(t *testing.T) {}

func TestDivideByZero(t *testing.T) {}

func TestFactorial(t *testing.T) {
	t.Run("base_cases", func(t *testing.T) {})
	t.Run("positive_numbers", func(t *testing.T) {})
}

func FuzzDivide(f *testing.F) {
	f.Fuzz(func(t *testing.T, a, b float64) {})
}
"#,
        );
        repo.write(
            "utils/strings/strings_test.go",
            "package strings\n\nimport \"testing\"\n\nfunc TestReverse(t *testing.T) {}\n\nfunc BenchmarkReverse(b *testing.B) {}\n",
        );
        repo.write(
            "buildfailure/broken_test.go",
            "package broken\n\nimport \"testing\"\n\nfunc TestBuildFailure(t *testing.T) {\n\tresult, err := Break(1, 2, 3)\n\t_, _ = result, err\n}\n",
        );
        repo.write(
            "garbage/garbage_test.go",
            "package garbage\n\nfunc TestGarbage(t *testing.T) {\n\t)))\n",
        );
        repo.write(
            "testmainfailure/calc_test.go",
            "package testmainfailure\n\nimport (\n\t\"os\"\n\t\"testing\"\n)\n\nfunc TestMain(m *testing.M) {\n\tm.Run()\n\tos.Exit(1)\n}\n\nfunc TestAdd(t *testing.T) {}\n",
        );
        repo.write(
            "vendor/github.com/dep/dep_test.go",
            "package dep\n\nfunc TestVendored(t *testing.T) {}\n",
        );
        repo.write("service/go.mod", "module example.com/service\n\ngo 1.22\n");
        repo.write(
            "service/auth/token_test.go",
            "package auth_test\n\nimport \"testing\"\n\nfunc TestGenerateToken(t *testing.T) {}\n",
        );
        repo
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn write(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(&path, contents).expect("write fixture file");
        path
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path(rel)).expect("read fixture file")
    }
}

/// A single `<testcase>` line.
pub fn testcase(classname: &str, name: &str) -> String {
    format!(r#"    <testcase classname="{classname}" name="{name}" time="0.000000"></testcase>"#)
}

/// Wrap suites in a `<testsuites>` document.
pub fn report(suites: &[String]) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<testsuites tests=\"0\" failures=\"0\" errors=\"0\" time=\"0.100\">\n{}\n</testsuites>\n",
        suites.join("\n")
    )
}

pub fn suite(name: &str, tests: u32, cases: &[String]) -> String {
    format!(
        "  <testsuite tests=\"{tests}\" failures=\"0\" time=\"0.010\" name=\"{name}\" timestamp=\"2025-06-01T12:00:00Z\">\n{}\n  </testsuite>",
        cases.join("\n")
    )
}
