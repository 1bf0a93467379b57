use ashry_types::RunRequest;
use ashry_types::TestSuite;

use super::RequestId;

/// A request handed to the actions worker, tagged with its issue order.
#[derive(Debug, Clone)]
pub struct ExecutionTicket {
    pub id: RequestId,
    pub request: RunRequest,
}

#[derive(Debug, Clone)]
pub enum Action {
    RunCode(ExecutionTicket),
    RunTests(ExecutionTicket, TestSuite),
}
