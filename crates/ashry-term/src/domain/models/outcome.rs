use strum_macros::Display;

pub type RequestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RequestKind {
    #[strum(serialize = "run")]
    Run,
    #[strum(serialize = "test")]
    Test,
}

/// Rendered result of one run or test request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub id: RequestId,
    pub kind: RequestKind,
    pub output: String,
}
