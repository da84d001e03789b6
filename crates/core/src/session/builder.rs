use news_chat_model::SearchGateway;
use tokio::sync::{mpsc, watch};
use tracing::Instrument;

use super::ChatSession;
use super::driver::run_session;
use crate::gateway_client::GatewayClient;
use crate::state::ChatState;

/// [`ChatSession`] builder.
pub struct ChatSessionBuilder {
    client: GatewayClient,
    seed_welcome_message: bool,
}

impl ChatSessionBuilder {
    /// Creates a new builder with the specified search gateway.
    #[inline]
    pub fn with_gateway<G: SearchGateway + 'static>(gateway: G) -> Self {
        Self {
            client: GatewayClient::new(gateway),
            seed_welcome_message: false,
        }
    }

    /// Starts the transcript, and every reset of it, with a greeting.
    #[inline]
    pub fn seed_welcome_message(mut self, seed: bool) -> Self {
        self.seed_welcome_message = seed;
        self
    }

    /// Builds the session.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn build(self) -> ChatSession {
        let Self {
            client,
            seed_welcome_message,
        } = self;

        let state = ChatState::new(seed_welcome_message);
        let (snapshot_tx, snapshot_rx) = watch::channel(state.snapshot());
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        tokio::spawn(
            run_session(state, client.clone(), cmd_rx, snapshot_tx)
                .instrument(trace_span!("chat session")),
        );

        ChatSession {
            cmd_tx,
            snapshot_rx,
            client,
        }
    }
}
