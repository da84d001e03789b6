//! Core logic of a news chat: the conversation state machine, the
//! transcript, and the session that drives them against a gateway.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod gateway_client;
mod session;
pub mod state;
pub mod transcript;

pub use session::{ChatSession, ChatSessionBuilder};
pub use state::{
    ChatState, ClearError, ErrorReport, InFlight, Notice, Snapshot,
    SubmitError,
};
pub use transcript::{ChatMessage, LocalId, Transcript};
