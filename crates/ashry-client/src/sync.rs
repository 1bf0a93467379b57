//! WebSocket connection to the sync endpoint.
//!
//! The socket is driven by one background task. The owner pushes outbound
//! frames through [`SyncTransport::send`] and receives lifecycle and inbound
//! frames as [`SyncEvent`]s on the channel given to [`SyncConnection::open`],
//! in the order the underlying socket produced them.

use std::time::Duration;

use anyhow::{anyhow, Result};
use ashry_types::CodeUpdate;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use crate::SyncTransport;

/// Lifecycle and traffic of a sync connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The handshake completed.
    Opened,
    /// A text frame arrived, unparsed.
    Message(String),
    /// The socket failed. Always followed by `Closed`.
    Error(String),
    /// The socket is gone for good.
    Closed { reason: Option<String> },
}

pub struct SyncConnection {
    outbound: mpsc::UnboundedSender<String>,
    cancel: CancellationToken,
    finished: CancellationToken,
    _handler: JoinHandle<()>,
}

impl SyncConnection {
    /// Starts connecting to `url` in the background. Must be called from
    /// within a tokio runtime.
    pub fn open(url: &str, events: mpsc::UnboundedSender<SyncEvent>) -> Self {
        let (outbound, outbound_rx) = mpsc::unbounded_channel::<String>();
        let cancel = CancellationToken::new();
        let finished = CancellationToken::new();

        tracing::info!(url = url, "opening sync connection");
        let handler = tokio::spawn(sync_handler_loop(
            url.to_string(),
            events,
            outbound_rx,
            cancel.clone(),
            finished.clone(),
        ));

        Self {
            outbound,
            cancel,
            finished,
            _handler: handler,
        }
    }

    /// Token cancelled once the handler task has exited, after the close
    /// frame (if any) went out. It outlives the connection, so the owner of
    /// the runtime can wait on it after the connection was handed away.
    pub fn finished(&self) -> CancellationToken {
        self.finished.clone()
    }

    /// Closes the connection and waits up to `grace` for the handler task to
    /// finish. Returns `false` when the wait timed out.
    pub async fn shutdown(self, grace: Duration) -> bool {
        let finished = self.finished();
        self.close();
        drop(self);

        wait_finished(&finished, grace).await
    }
}

/// Waits up to `grace` for a handler task to exit. Returns `false` when the
/// wait timed out.
pub async fn wait_finished(finished: &CancellationToken, grace: Duration) -> bool {
    tokio::time::timeout(grace, finished.cancelled()).await.is_ok()
}

impl SyncTransport for SyncConnection {
    fn send(&self, update: &CodeUpdate) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(anyhow!("Sync connection is closed"));
        }

        let frame = update.to_frame()?;
        self.outbound
            .send(frame)
            .map_err(|_| anyhow!("Sync connection handler has stopped"))?;

        Ok(())
    }

    fn close(&self) {
        self.cancel.cancel();
    }
}

impl Drop for SyncConnection {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn sync_handler_loop(
    url: String,
    events: mpsc::UnboundedSender<SyncEvent>,
    mut outbound_rx: mpsc::UnboundedReceiver<String>,
    cancel: CancellationToken,
    finished: CancellationToken,
) {
    let _finished = finished.drop_guard();

    let connected = tokio::select! {
        _ = cancel.cancelled() => {
            let _ = events.send(SyncEvent::Closed { reason: None });
            return;
        }
        res = connect_async(url.as_str()) => res,
    };

    let ws = match connected {
        Ok((ws, _)) => ws,
        Err(err) => {
            tracing::error!(error = ?err, url = %url, "sync connection failed");
            let _ = events.send(SyncEvent::Error(err.to_string()));
            let _ = events.send(SyncEvent::Closed { reason: None });
            return;
        }
    };

    let _ = events.send(SyncEvent::Opened);
    let (mut ws_tx, mut ws_rx) = ws.split();
    let mut reason = None;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                let _ = ws_tx.send(Message::Close(None)).await;
                break;
            }
            frame = outbound_rx.recv() => {
                let Some(frame) = frame else { break };
                if let Err(err) = ws_tx.send(Message::text(frame)).await {
                    let _ = events.send(SyncEvent::Error(err.to_string()));
                    break;
                }
            }
            msg = ws_rx.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    let _ = events.send(SyncEvent::Message(text.as_str().to_owned()));
                }
                Some(Ok(Message::Close(frame))) => {
                    reason = frame.map(|f| f.reason.as_str().to_owned());
                    break;
                }
                Some(Ok(Message::Binary(bytes))) => {
                    tracing::debug!(len = bytes.len(), "ignoring binary sync frame");
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    let _ = events.send(SyncEvent::Error(err.to_string()));
                    break;
                }
                None => break,
            }
        }
    }

    let _ = events.send(SyncEvent::Closed { reason });
}
