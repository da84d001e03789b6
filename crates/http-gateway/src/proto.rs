use news_chat_model::{Conversation, ErrorKind, SearchRequest};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Error;

// ------------------------------
// Types received from the server
// ------------------------------

/// The uniform wrapper around every response body.
///
/// `data` is kept untyped until `success` has been checked, since failed
/// responses carry whatever the server put there (usually `null`).
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub data: Option<Value>,
    pub success: bool,
    #[serde(default)]
    pub error_code: i64,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ConversationData {
    pub conversation: Option<Conversation>,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct SearchBody<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<&'a str>,
}

#[inline]
pub fn create_search_body(req: &SearchRequest) -> SearchBody<'_> {
    SearchBody {
        query: &req.query,
        session_id: req.session_id.as_ref().map(|id| id.as_str()),
    }
}

// ----------
// Operations
// ----------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Search,
    GetConversation,
    ClearConversation,
}

impl Operation {
    /// Message used when the server reports a failure without saying why.
    #[inline]
    pub fn fallback_message(self) -> &'static str {
        match self {
            Operation::Search => "Search failed",
            Operation::GetConversation => "Failed to get conversation history",
            Operation::ClearConversation => {
                "Failed to clear conversation history"
            }
        }
    }
}

/// Decodes a response body and unwraps its envelope.
///
/// The HTTP status is deliberately not consulted: `success` is the only
/// failure signal the server gives.
pub fn unwrap_envelope<T: DeserializeOwned>(
    body: &[u8],
    op: Operation,
) -> Result<T, Error> {
    let envelope: Envelope = serde_json::from_slice(body).map_err(|err| {
        Error::new(
            format!("Malformed response body: {err}"),
            ErrorKind::UnknownClientError,
        )
    })?;

    if !envelope.success {
        let message = envelope
            .error_message
            .filter(|msg| !msg.trim().is_empty())
            .unwrap_or_else(|| op.fallback_message().to_owned());
        return Err(Error::new(message, ErrorKind::SearchFailed)
            .with_error_code(envelope.error_code));
    }

    let Some(data) = envelope.data.filter(|data| !data.is_null()) else {
        return Err(Error::new(
            "Response is missing its data",
            ErrorKind::UnknownClientError,
        ));
    };
    serde_json::from_value(data).map_err(|err| {
        Error::new(
            format!("Unexpected response data: {err}"),
            ErrorKind::UnknownClientError,
        )
    })
}
