//! Fixed test suites and their per-case results.
//!
//! Candidate code is never evaluated by the client. Instead a suite turns the
//! candidate source into a harness program that the execution endpoint runs;
//! the harness prints one JSON array holding the output of every case, and
//! [`TestSuite::evaluate`] compares that array against the expectations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One input/expected-output pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub input: Value,
    pub expected_output: Value,
}

impl TestCase {
    pub fn new(input: Value, expected_output: Value) -> Self {
        Self {
            input,
            expected_output,
        }
    }
}

/// Result of one case, rendered as `{input, expectedOutput, output, passed}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRecord {
    pub input: Value,
    pub expected_output: Value,
    pub output: Value,
    pub passed: bool,
}

/// A named entry point plus the cases it is checked against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSuite {
    pub function_name: String,
    pub cases: Vec<TestCase>,
}

impl TestSuite {
    pub fn new(function_name: impl Into<String>, cases: Vec<TestCase>) -> Self {
        Self {
            function_name: function_name.into(),
            cases,
        }
    }

    /// Appends a statement to `code` that prints the outputs of every case as
    /// a single JSON array, in case order.
    pub fn harness_program(&self, code: &str) -> String {
        let calls = self
            .cases
            .iter()
            .map(|case| format!("{}({})", self.function_name, case.input))
            .collect::<Vec<String>>()
            .join(", ");

        format!("{code}\nconsole.log(JSON.stringify([{calls}]));\n")
    }

    /// Checks the harness output against the expected values.
    ///
    /// Returns `None` when `body` is not a JSON array with exactly one entry
    /// per case; callers fall back to showing the raw body.
    pub fn evaluate(&self, body: &str) -> Option<Vec<TestRecord>> {
        let outputs = match serde_json::from_str::<Value>(body) {
            Ok(Value::Array(outputs)) => outputs,
            _ => return None,
        };

        if outputs.len() != self.cases.len() {
            return None;
        }

        let records = self
            .cases
            .iter()
            .zip(outputs)
            .map(|(case, output)| TestRecord {
                input: case.input.clone(),
                expected_output: case.expected_output.clone(),
                passed: output == case.expected_output,
                output,
            })
            .collect();

        Some(records)
    }
}
