use ashry_client::SyncEvent;
use ashry_client::SyncTransportBox;
use ashry_types::CodeUpdate;
use ashry_types::Language;
use ashry_types::RunRequest;

use crate::domain::models::Action;
use crate::domain::models::ConnectionState;
use crate::domain::models::ExecutionOutcome;
use crate::domain::models::ExecutionTicket;
use crate::domain::models::Problem;
use crate::domain::models::RequestId;

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

pub struct SessionProps {
    pub problem: Problem,
    pub language: Language,
    pub connection: SyncTransportBox,
    pub notice: Option<String>,
}

/// State of one editing session.
///
/// The session owns the sync connection. It is closed exactly once, either by
/// [`Session::end`] or when the session is dropped.
pub struct Session {
    pub source_text: String,
    pub problem: Problem,
    pub language: Language,
    pub last_output: String,
    pub connection_state: ConnectionState,
    pub notice: Option<String>,
    pub waiting_for_backend: bool,
    connection: Option<SyncTransportBox>,
    latest_request: RequestId,
}

impl Session {
    pub fn start(props: SessionProps) -> Session {
        return Session {
            source_text: "".to_string(),
            problem: props.problem,
            language: props.language,
            last_output: "".to_string(),
            connection_state: ConnectionState::Connecting,
            notice: props.notice,
            waiting_for_backend: false,
            connection: Some(props.connection),
            latest_request: 0,
        };
    }

    /// Applies an edit made in the local editor and mirrors it outward when
    /// the connection is open. Edits made while not open are never replayed.
    pub fn handle_local_edit(&mut self, text: String) {
        self.source_text = text;

        if self.connection_state != ConnectionState::Open {
            return;
        }

        if let Some(connection) = &self.connection {
            if let Err(err) = connection.send(&CodeUpdate::new(self.source_text.as_str())) {
                tracing::warn!(error = ?err, "failed to forward edit");
            }
        }
    }

    /// Applies one event from the sync channel. Returns `true` when
    /// `source_text` was replaced by an inbound update.
    pub fn handle_sync_event(&mut self, event: SyncEvent) -> bool {
        match event {
            SyncEvent::Opened => {
                if self.connection_state != ConnectionState::Connecting {
                    return false;
                }
                tracing::info!("sync connection established");
                self.connection_state = ConnectionState::Open;
            }
            SyncEvent::Message(payload) => {
                if self.connection_state != ConnectionState::Open {
                    return false;
                }
                return self.apply_inbound_frame(&payload);
            }
            SyncEvent::Error(err) => {
                tracing::error!(error = %err, state = %self.connection_state, "sync connection error");
            }
            SyncEvent::Closed { reason } => {
                if self.connection_state != ConnectionState::Closed {
                    tracing::info!(reason = ?reason, "sync connection closed");
                }
                self.connection_state = ConnectionState::Closed;
            }
        }

        return false;
    }

    fn apply_inbound_frame(&mut self, payload: &str) -> bool {
        match CodeUpdate::parse_frame(payload) {
            Ok(Some(code)) => {
                self.source_text = code;
                return true;
            }
            Ok(None) => {
                tracing::debug!(payload = payload, "sync frame without code");
            }
            Err(err) => {
                tracing::warn!(error = %err, payload = payload, "received non-update sync frame");
            }
        }

        return false;
    }

    fn next_ticket(&mut self, code: String) -> ExecutionTicket {
        self.latest_request += 1;
        self.waiting_for_backend = true;

        return ExecutionTicket {
            id: self.latest_request,
            request: RunRequest::new(code, self.language),
        };
    }

    /// Issues a run request for the current source.
    pub fn run_code(&mut self) -> Action {
        let ticket = self.next_ticket(self.source_text.clone());
        return Action::RunCode(ticket);
    }

    /// Issues a test request for the current source against the problem's suite.
    pub fn run_tests(&mut self) -> Action {
        let ticket = self.next_ticket(self.source_text.clone());
        return Action::RunTests(ticket, self.problem.suite.clone());
    }

    /// Applies a rendered outcome if it belongs to the latest request.
    /// Returns `false` for outcomes of superseded requests.
    pub fn handle_outcome(&mut self, outcome: ExecutionOutcome) -> bool {
        if outcome.id != self.latest_request {
            tracing::debug!(
                id = outcome.id,
                latest = self.latest_request,
                kind = %outcome.kind,
                "discarding stale outcome"
            );
            return false;
        }

        self.last_output = outcome.output;
        self.waiting_for_backend = false;
        return true;
    }

    /// Closes the sync connection. Calling it again is a no-op.
    pub fn end(&mut self) {
        if let Some(connection) = self.connection.take() {
            tracing::info!(state = %self.connection_state, "ending session");
            connection.close();
            self.connection_state = ConnectionState::Closed;
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.end();
    }
}
