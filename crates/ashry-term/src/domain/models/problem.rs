use ashry_types::TestCase;
use ashry_types::TestSuite;
use serde_json::json;

const SUM_ARRAY_STATEMENT: &str = "Implement a function that takes an array of numbers and returns the sum.

function sumArray(arr) {
  // Your code here
}
";

/// The exercise shown next to the editor and the suite its tests run.
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    pub statement: String,
    pub suite: TestSuite,
}

impl Default for Problem {
    fn default() -> Problem {
        Problem {
            statement: SUM_ARRAY_STATEMENT.to_string(),
            suite: TestSuite::new(
                "sumArray",
                vec![
                    TestCase::new(json!([1, 2, 3]), json!(6)),
                    TestCase::new(json!([-1, -2, -3]), json!(-6)),
                    TestCase::new(json!([0, 0, 0]), json!(0)),
                ],
            ),
        }
    }
}
