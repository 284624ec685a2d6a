//! JUnit XML report model and codec.
//!
//! The model follows the shape `gotestsum --junitfile` emits. Attributes the
//! enhancer never touches are still carried so a decode/encode pass keeps
//! them intact. Unknown elements are ignored on decode.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io::Write as _;
use std::path::Path;
use tempfile::NamedTempFile;

pub const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
const ROOT_ELEMENT: &str = "testsuites";
const INDENT_WIDTH: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "testsuites")]
pub struct TestSuites {
    #[serde(rename = "@name", default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "@tests", default)]
    pub tests: u32,
    #[serde(rename = "@failures", default)]
    pub failures: u32,
    #[serde(rename = "@errors", default)]
    pub errors: u32,
    #[serde(rename = "@time", default)]
    pub time: String,
    #[serde(rename = "testsuite", default)]
    pub suites: Vec<TestSuite>,
}

impl TestSuites {
    /// Total number of cases across all suites.
    #[must_use]
    pub fn case_count(&self) -> usize {
        self.suites.iter().map(|s| s.test_cases.len()).sum()
    }

    pub fn cases(&self) -> impl Iterator<Item = &TestCase> {
        self.suites.iter().flat_map(|s| s.test_cases.iter())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSuite {
    #[serde(rename = "@tests", default)]
    pub tests: u32,
    #[serde(rename = "@failures", default)]
    pub failures: u32,
    #[serde(rename = "@errors", default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<u32>,
    #[serde(rename = "@skipped", default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<u32>,
    #[serde(rename = "@time", default)]
    pub time: String,
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "@timestamp", default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
    #[serde(rename = "testcase", default)]
    pub test_cases: Vec<TestCase>,
    #[serde(rename = "system-out", default, skip_serializing_if = "Option::is_none")]
    pub system_out: Option<String>,
    #[serde(rename = "system-err", default, skip_serializing_if = "Option::is_none")]
    pub system_err: Option<String>,
}

impl TestSuite {
    /// Placeholder suite with no declared tests and no name.
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        self.tests == 0 && self.name.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Properties {
    #[serde(rename = "property", default)]
    pub items: Vec<Property>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@value", default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    #[serde(rename = "@classname", default)]
    pub classname: String,
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "@time", default)]
    pub time: String,
    #[serde(rename = "@file", default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(rename = "skipped", default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<Skipped>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<Failure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Failure>,
    #[serde(rename = "system-out", default, skip_serializing_if = "Option::is_none")]
    pub system_out: Option<String>,
    #[serde(rename = "system-err", default, skip_serializing_if = "Option::is_none")]
    pub system_err: Option<String>,
}

impl TestCase {
    /// The populated file path, treating `file=""` as absent.
    #[must_use]
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref().filter(|f| !f.is_empty())
    }

    pub fn set_file(&mut self, path: impl Into<String>) {
        self.file = Some(path.into());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skipped {
    #[serde(rename = "@message", default)]
    pub message: String,
}

/// Payload of a `<failure>` or `<error>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    #[serde(rename = "@message", default)]
    pub message: String,
    #[serde(rename = "@type", default)]
    pub kind: String,
    #[serde(rename = "$text", default)]
    pub contents: String,
}

pub fn decode(bytes: &[u8]) -> Result<TestSuites> {
    let text = std::str::from_utf8(bytes)
        .map_err(|err| Error::decode(format!("report is not valid UTF-8: {err}")))?;
    quick_xml::de::from_str(text).map_err(|err| Error::decode(err.to_string()))
}

/// Serialize with the XML declaration and two-space indentation.
pub fn encode(report: &TestSuites) -> Result<String> {
    let mut body = String::new();
    let mut serializer = quick_xml::se::Serializer::with_root(&mut body, Some(ROOT_ELEMENT))
        .map_err(|err| Error::encode(err.to_string()))?;
    serializer.indent(' ', INDENT_WIDTH);
    report
        .serialize(serializer)
        .map_err(|err| Error::encode(err.to_string()))?;

    let mut out = String::with_capacity(XML_HEADER.len() + body.len() + 1);
    out.push_str(XML_HEADER);
    out.push_str(&body);
    out.push('\n');
    Ok(out)
}

pub fn read_report(path: &Path) -> Result<TestSuites> {
    let bytes = std::fs::read(path).map_err(|err| Error::io(path, err))?;
    decode(&bytes)
}

/// Write `report` to `path` through a temp file in the same directory, so
/// overwriting the input never leaves a truncated report behind.
pub fn write_report(path: &Path, report: &TestSuites) -> Result<()> {
    let encoded = encode(report)?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir).map_err(|err| Error::io(dir, err))?;
    tmp.write_all(encoded.as_bytes())
        .map_err(|err| Error::io(tmp.path(), err))?;
    tmp.flush().map_err(|err| Error::io(tmp.path(), err))?;
    tmp.persist(path)
        .map(|_| ())
        .map_err(|err| Error::io(path, err.error))
}

#[cfg(test)]
mod tests {
    use super::{Failure, TestCase, TestSuite, TestSuites, decode, encode};
    use pretty_assertions::assert_eq;

    const GOTESTSUM_REPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuites tests="3" failures="1" errors="0" time="0.412">
  <testsuite tests="3" failures="1" time="0.210" name="example.com/repo/math" timestamp="2025-01-02T03:04:05Z">
    <properties>
      <property name="go.version" value="go1.22.4 linux/amd64"></property>
    </properties>
    <testcase classname="example.com/repo/math" name="TestDivide" time="0.000000"></testcase>
    <testcase classname="example.com/repo/math" name="TestPower/#00" time="0.010000">
      <skipped message="=== RUN   TestPower/#00"></skipped>
    </testcase>
    <testcase classname="example.com/repo/math" name="TestFactorial" time="0.200000" file="math/math_test.go">
      <failure message="Failed" type="">math_test.go:12: Factorial(3) = 5, expected 6</failure>
    </testcase>
  </testsuite>
</testsuites>"#;

    #[test]
    fn decode_reads_gotestsum_shape() {
        let report = decode(GOTESTSUM_REPORT.as_bytes()).expect("decode");
        assert_eq!(report.tests, 3);
        assert_eq!(report.time, "0.412");
        assert_eq!(report.suites.len(), 1);

        let suite = &report.suites[0];
        assert_eq!(suite.name, "example.com/repo/math");
        assert_eq!(suite.timestamp.as_deref(), Some("2025-01-02T03:04:05Z"));
        assert_eq!(suite.errors, None);
        let props = suite.properties.as_ref().expect("properties");
        assert_eq!(props.items[0].name, "go.version");
        assert_eq!(suite.test_cases.len(), 3);

        let divide = &suite.test_cases[0];
        assert_eq!(divide.classname, "example.com/repo/math");
        assert_eq!(divide.name, "TestDivide");
        assert_eq!(divide.time, "0.000000");
        assert_eq!(divide.file(), None);

        let power = &suite.test_cases[1];
        assert_eq!(
            power.skipped.as_ref().map(|s| s.message.as_str()),
            Some("=== RUN   TestPower/#00")
        );

        let factorial = &suite.test_cases[2];
        assert_eq!(factorial.file(), Some("math/math_test.go"));
        let failure = factorial.failure.as_ref().expect("failure");
        assert_eq!(failure.message, "Failed");
        assert!(failure.contents.contains("Factorial(3) = 5"));
    }

    #[test]
    fn empty_file_attribute_reads_as_absent() {
        let xml = r#"<testsuites><testsuite tests="1" failures="0" time="0" name="p">
            <testcase classname="p" name="TestX" time="0" file=""></testcase>
        </testsuite></testsuites>"#;
        let report = decode(xml.as_bytes()).expect("decode");
        let case = &report.suites[0].test_cases[0];
        assert_eq!(case.file.as_deref(), Some(""));
        assert_eq!(case.file(), None);
    }

    #[test]
    fn encode_then_decode_preserves_report() {
        let report = decode(GOTESTSUM_REPORT.as_bytes()).expect("decode");
        let encoded = encode(&report).expect("encode");
        assert!(encoded.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<testsuites"));

        let reparsed = decode(encoded.as_bytes()).expect("decode again");
        assert_eq!(reparsed.suites.len(), report.suites.len());
        for (before, after) in report.cases().zip(reparsed.cases()) {
            assert_eq!(before.classname, after.classname);
            assert_eq!(before.name, after.name);
            assert_eq!(before.time, after.time);
            assert_eq!(before.file, after.file);
            assert_eq!(
                before.failure.as_ref().map(|f| &f.message),
                after.failure.as_ref().map(|f| &f.message)
            );
            assert_eq!(
                before.skipped.as_ref().map(|s| &s.message),
                after.skipped.as_ref().map(|s| &s.message)
            );
        }
        assert_eq!(reparsed.suites[0].name, "example.com/repo/math");
        assert_eq!(reparsed.suites[0].timestamp, report.suites[0].timestamp);
    }

    #[test]
    fn encode_emits_file_attribute_when_set() {
        let mut case = TestCase {
            classname: "github.com/example/main".to_string(),
            name: "TestExample".to_string(),
            time: "0.000000".to_string(),
            ..TestCase::default()
        };
        case.set_file("main_test.go");
        let report = TestSuites {
            suites: vec![TestSuite {
                tests: 1,
                name: "main".to_string(),
                test_cases: vec![case],
                ..TestSuite::default()
            }],
            ..TestSuites::default()
        };

        let encoded = encode(&report).expect("encode");
        assert!(encoded.contains(r#"file="main_test.go""#), "{encoded}");
        assert!(encoded.contains("\n  <testsuite"), "{encoded}");
    }

    #[test]
    fn failure_text_is_escaped() {
        let report = TestSuites {
            suites: vec![TestSuite {
                tests: 1,
                name: "p".to_string(),
                test_cases: vec![TestCase {
                    classname: "p".to_string(),
                    name: "TestLess".to_string(),
                    failure: Some(Failure {
                        message: "a < b & c".to_string(),
                        kind: String::new(),
                        contents: "got <nil>".to_string(),
                    }),
                    ..TestCase::default()
                }],
                ..TestSuite::default()
            }],
            ..TestSuites::default()
        };

        let encoded = encode(&report).expect("encode");
        assert!(!encoded.contains("got <nil>"), "{encoded}");
        let reparsed = decode(encoded.as_bytes()).expect("decode");
        let failure = reparsed.suites[0].test_cases[0]
            .failure
            .as_ref()
            .expect("failure");
        assert_eq!(failure.message, "a < b & c");
        assert_eq!(failure.contents, "got <nil>");
    }

    #[test]
    fn decode_rejects_malformed_xml() {
        let err = decode(b"<testsuites><testsuite name=\"x\"").expect_err("malformed");
        assert!(err.to_string().contains("decode"), "{err}");
    }

    #[test]
    fn write_report_replaces_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("junit.xml");
        std::fs::write(&path, "stale").expect("seed file");

        let report = decode(GOTESTSUM_REPORT.as_bytes()).expect("decode");
        super::write_report(&path, &report).expect("write");

        let reread = super::read_report(&path).expect("read");
        assert_eq!(reread.case_count(), 3);
    }
}
