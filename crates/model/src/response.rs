use serde::{Deserialize, Serialize};

use crate::message::Conversation;
use crate::result::SearchResult;

/// The outcome of one search call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// The question as it was submitted.
    pub original_query: String,
    /// The query the backend actually searched for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_query: Option<String>,
    /// Articles, in ranking order.
    #[serde(default)]
    pub results: Vec<SearchResult>,
    /// Whether any of the results answer the question.
    #[serde(default)]
    pub has_relevant_results: bool,
    /// Advice for rephrasing the question.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<String>,
    /// The conversation after this search, as recorded by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<Conversation>,
}

/// The outcome of deleting a conversation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClearResponse {
    /// A confirmation from the backend.
    pub message: String,
}
