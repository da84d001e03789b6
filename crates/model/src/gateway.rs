use std::error::Error;

use crate::error::ErrorKind;
use crate::message::{Conversation, SessionId};
use crate::request::SearchRequest;
use crate::response::{ClearResponse, SearchResponse};

/// The error type for a search gateway.
pub trait GatewayError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A type that represents the search backend, reached through whatever
/// transport the implementor chooses.
///
/// Once the gateway is created, it should behave like a stateless object.
/// It can still have internal state, but callers should not rely on it.
/// Each call is a single request: implementations must not retry, cache
/// or batch on their own.
pub trait SearchGateway: Send + Sync {
    /// The error type that may be returned by the gateway.
    type Error: GatewayError;

    /// Runs a search, optionally continuing an existing session.
    fn search(
        &self,
        req: &SearchRequest,
    ) -> impl Future<Output = Result<SearchResponse, Self::Error>> + Send + 'static;

    /// Fetches the backend's record of a conversation.
    fn get_conversation(
        &self,
        session_id: &SessionId,
    ) -> impl Future<Output = Result<Conversation, Self::Error>> + Send + 'static;

    /// Deletes a conversation on the backend.
    fn clear_conversation(
        &self,
        session_id: &SessionId,
    ) -> impl Future<Output = Result<ClearResponse, Self::Error>> + Send + 'static;
}
