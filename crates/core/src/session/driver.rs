use std::fmt::{self, Debug};

use news_chat_model::{ClearResponse, SearchResponse};
use tokio::select;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::gateway_client::{GatewayClient, GatewayResult};
use crate::state::{ChatState, ClearError, ErrorReport, Snapshot, SubmitError};

/// A request from a session handle.
pub enum Command {
    Submit {
        text: String,
        reply: oneshot::Sender<Result<(), SubmitError>>,
    },
    Clear {
        reply: oneshot::Sender<Result<(), ClearError>>,
    },
}

impl Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Submit { text, .. } => {
                f.debug_struct("Submit").field("text", text).finish()
            }
            Command::Clear { .. } => f.write_str("Clear"),
        }
    }
}

/// The outcome of a gateway call.
enum Completion {
    Search(GatewayResult<SearchResponse>),
    Clear(GatewayResult<ClearResponse>),
}

/// Applies commands and completions to `state` one at a time until every
/// session handle is gone.
pub async fn run_session(
    mut state: ChatState,
    client: GatewayClient,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
    snapshot_tx: watch::Sender<Snapshot>,
) {
    debug!("started");
    let (done_tx, mut done_rx) = mpsc::unbounded_channel();
    let mut pending: Option<JoinHandle<()>> = None;

    loop {
        select! {
            biased;

            completion = done_rx.recv() => {
                // `done_tx` is alive for the whole loop.
                let Some(completion) = completion else {
                    break;
                };
                pending = None;
                apply_completion(&mut state, completion);
            }
            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else {
                    break;
                };
                trace!("received command: {cmd:?}");
                if let Some(fut) = apply_command(&mut state, &client, cmd, &snapshot_tx) {
                    let done_tx = done_tx.clone();
                    pending = Some(tokio::spawn(
                        async move {
                            // The receiver is gone only when the session is.
                            _ = done_tx.send(fut.await);
                        }
                        .in_current_span(),
                    ));
                }
                continue;
            }
        }
        snapshot_tx.send_replace(state.snapshot());
    }

    if let Some(pending) = pending {
        debug!("abandoning the outstanding request");
        pending.abort();
    }
    debug!("will terminate");
}

type CompletionFuture =
    std::pin::Pin<Box<dyn Future<Output = Completion> + Send>>;

/// Applies a command and publishes the resulting state before answering
/// the caller. Returns the gateway call to make, if any.
fn apply_command(
    state: &mut ChatState,
    client: &GatewayClient,
    cmd: Command,
    snapshot_tx: &watch::Sender<Snapshot>,
) -> Option<CompletionFuture> {
    match cmd {
        Command::Submit { text, reply } => {
            let (result, fut) = match state.on_submit(&text) {
                Ok(req) => {
                    let client = client.clone();
                    let fut: CompletionFuture = Box::pin(async move {
                        Completion::Search(client.search(req).await)
                    });
                    (Ok(()), Some(fut))
                }
                Err(err) => {
                    debug!("submission rejected: {err}");
                    (Err(err), None)
                }
            };
            if fut.is_some() {
                snapshot_tx.send_replace(state.snapshot());
            }
            _ = reply.send(result);
            fut
        }
        Command::Clear { reply } => {
            let (result, fut) = match state.on_clear_requested() {
                Ok(Some(session_id)) => {
                    let client = client.clone();
                    let fut: CompletionFuture = Box::pin(async move {
                        Completion::Clear(
                            client.clear_conversation(session_id).await,
                        )
                    });
                    (Ok(()), Some(fut))
                }
                Ok(None) => (Ok(()), None),
                Err(err) => {
                    debug!("clear rejected: {err}");
                    (Err(err), None)
                }
            };
            if result.is_ok() {
                snapshot_tx.send_replace(state.snapshot());
            }
            _ = reply.send(result);
            fut
        }
    }
}

fn apply_completion(state: &mut ChatState, completion: Completion) {
    match completion {
        Completion::Search(Ok(resp)) => {
            if let Some(answer) = state.on_search_succeeded(resp) {
                trace!("appended answer {}", answer.local_id());
            }
        }
        Completion::Search(Err(err)) => {
            state.on_search_failed(ErrorReport::from_error(err.as_ref()));
        }
        Completion::Clear(Ok(_)) => state.on_clear_succeeded(),
        Completion::Clear(Err(err)) => {
            state.on_clear_failed(ErrorReport::from_error(err.as_ref()));
        }
    }
}
