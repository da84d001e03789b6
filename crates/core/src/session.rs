mod builder;
mod driver;
#[cfg(test)]
mod tests;

use news_chat_model::{Conversation, GatewayError};
use tokio::sync::{mpsc, oneshot, watch};

use crate::gateway_client::GatewayClient;
use crate::state::{ClearError, Snapshot, SubmitError};
pub use builder::ChatSessionBuilder;
use driver::Command;

/// A chat session, like a window that displays a transcript and has an
/// input box.
///
/// The session owns a [`ChatState`](crate::ChatState) on a background
/// task, and every event (a submission, a clear, a response arriving) is
/// applied there one at a time. Observers read [`Snapshot`]s of the state,
/// either on demand or by subscribing to changes.
///
/// Cloned handles control the same session. The background task stops
/// once all handles are dropped, abandoning any outstanding request.
#[derive(Clone)]
pub struct ChatSession {
    cmd_tx: mpsc::UnboundedSender<Command>,
    snapshot_rx: watch::Receiver<Snapshot>,
    client: GatewayClient,
}

impl ChatSession {
    /// Submits a query.
    ///
    /// Returns as soon as the user entry is part of the transcript, which
    /// is before the backend has answered. Use [`ChatSession::wait_idle`]
    /// or a subscription to follow the answer.
    pub async fn submit_query<S: Into<String>>(
        &self,
        text: S,
    ) -> Result<(), SubmitError> {
        let (reply, reply_rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Submit {
                text: text.into(),
                reply,
            })
            .map_err(|_| SubmitError::SessionClosed)?;
        reply_rx.await.map_err(|_| SubmitError::SessionClosed)?
    }

    /// Clears the conversation, deleting it on the backend if there is
    /// one.
    ///
    /// Returns once the clear is under way. Without a session the view is
    /// reset by the time this returns.
    pub async fn clear_conversation(&self) -> Result<(), ClearError> {
        let (reply, reply_rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Clear { reply })
            .map_err(|_| ClearError::SessionClosed)?;
        reply_rx.await.map_err(|_| ClearError::SessionClosed)?
    }

    /// Fetches the backend's record of the current conversation.
    ///
    /// Returns `None` when no session has been established. This is a
    /// read-only call and does not count as a request in flight.
    pub async fn remote_conversation(
        &self,
    ) -> Result<Option<Conversation>, Box<dyn GatewayError>> {
        let session_id = self.snapshot_rx.borrow().session_id.clone();
        let Some(session_id) = session_id else {
            return Ok(None);
        };
        self.client.get_conversation(session_id).await.map(Some)
    }

    /// Returns the latest state.
    #[inline]
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Returns a receiver that is notified of every state change.
    #[inline]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_rx.clone()
    }

    /// Waits until no request is in flight and returns the state at that
    /// point.
    pub async fn wait_idle(&self) -> Snapshot {
        let mut snapshot_rx = self.subscribe();
        let idle = match snapshot_rx.wait_for(Snapshot::is_idle).await {
            Ok(snapshot) => Some(snapshot.clone()),
            Err(_) => None,
        };
        // The session is gone, its last state is all there is.
        idle.unwrap_or_else(|| snapshot_rx.borrow().clone())
    }
}
