use std::sync::Arc;

use anyhow::Result;
use ashry_client::ExecutionClient;
use ashry_client::ExecutionClientBox;
use ashry_types::ExecutionError;
use ashry_types::RunRequest;
use ashry_types::TestSuite;
use tokio::sync::mpsc;

use crate::domain::models::Action;
use crate::domain::models::Event;
use crate::domain::models::ExecutionOutcome;
use crate::domain::models::ExecutionTicket;
use crate::domain::models::RequestKind;

fn render_error(err: &ExecutionError) -> String {
    return format!("Error: {err}");
}

/// Pretty-prints a JSON body in the server's key order, or returns it
/// untouched when it isn't JSON.
fn render_body(body: String) -> String {
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or(body),
        Err(_) => body,
    }
}

pub async fn run_code(client: &dyn ExecutionClient, request: &RunRequest) -> String {
    match client.execute(request).await {
        Ok(body) => render_body(body),
        Err(err) => render_error(&err),
    }
}

/// Runs the suite through the execution endpoint and renders one record per
/// case. The candidate code only ever runs server-side, inside the harness.
pub async fn run_tests(
    client: &dyn ExecutionClient,
    request: &RunRequest,
    suite: &TestSuite,
) -> String {
    let harness = RunRequest::new(suite.harness_program(&request.code), request.language);

    let body = match client.execute(&harness).await {
        Ok(body) => body,
        Err(err) => return render_error(&err),
    };

    let rendered = suite
        .evaluate(&body)
        .and_then(|records| serde_json::to_string_pretty(&records).ok());

    match rendered {
        Some(rendered) => rendered,
        None => {
            tracing::warn!("test harness output could not be evaluated");
            body
        }
    }
}

fn worker_outcome(
    ticket: &ExecutionTicket,
    kind: RequestKind,
    output: String,
    event_tx: &mpsc::UnboundedSender<Event>,
) -> Result<()> {
    event_tx.send(Event::ExecutionOutcome(ExecutionOutcome {
        id: ticket.id,
        kind,
        output,
    }))?;

    Ok(())
}

pub struct ActionsService {}

impl ActionsService {
    pub async fn start(
        execution_client: ExecutionClientBox,
        event_tx: mpsc::UnboundedSender<Event>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        let client_arc: Arc<dyn ExecutionClient> = Arc::from(execution_client);

        // Every request gets its own worker; overlapping requests are neither
        // cancelled nor serialized. The session drops stale outcomes.
        while let Some(action) = rx.recv().await {
            let client_worker = client_arc.clone();
            let worker_event_tx = event_tx.clone();

            match action {
                Action::RunCode(ticket) => {
                    tracing::info!(id = ticket.id, "run requested");
                    tokio::spawn(async move {
                        let output = run_code(&*client_worker, &ticket.request).await;
                        worker_outcome(&ticket, RequestKind::Run, output, &worker_event_tx)
                    });
                }
                Action::RunTests(ticket, suite) => {
                    tracing::info!(id = ticket.id, cases = suite.cases.len(), "tests requested");
                    tokio::spawn(async move {
                        let output =
                            run_tests(&*client_worker, &ticket.request, &suite).await;
                        worker_outcome(&ticket, RequestKind::Test, output, &worker_event_tx)
                    });
                }
            }
        }

        Ok(())
    }
}
