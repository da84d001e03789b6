//! Transcript-related types.

use std::fmt::{self, Display};

use chrono::{DateTime, Utc};
use news_chat_model::{Message, Role, SearchResponse, SearchResult};
use uuid::Uuid;

/// The greeting seeded into a fresh transcript, when enabled.
pub const WELCOME_MESSAGE: &str = "Hello! I am your news assistant. Please \
    tell me what news you would like to know about?";

/// The assistant entry appended when a search fails.
pub const APOLOGY_MESSAGE: &str = "Sorry, I encountered some problems and \
    cannot process your request. Please try again later.";

/// A client-generated identifier of a transcript entry.
///
/// It has no meaning to the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LocalId(Uuid);

impl LocalId {
    #[inline]
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// An entry in the transcript.
///
/// Entries are never modified once they are part of a transcript.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatMessage {
    local_id: LocalId,
    role: Role,
    content: String,
    timestamp: DateTime<Utc>,
    results: Option<Vec<SearchResult>>,
    has_relevant_results: Option<bool>,
    generated_query: Option<String>,
    suggestions: Option<String>,
}

impl ChatMessage {
    fn new(role: Role, content: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            local_id: LocalId::generate(),
            role,
            content,
            timestamp,
            results: None,
            has_relevant_results: None,
            generated_query: None,
            suggestions: None,
        }
    }

    pub(crate) fn user(content: &str) -> Self {
        Self::new(Role::User, content.to_owned(), Utc::now())
    }

    pub(crate) fn welcome() -> Self {
        Self::new(Role::Assistant, WELCOME_MESSAGE.to_owned(), Utc::now())
    }

    pub(crate) fn apology() -> Self {
        Self::new(Role::Assistant, APOLOGY_MESSAGE.to_owned(), Utc::now())
    }

    /// Wraps a backend message, attaching what the search returned.
    pub(crate) fn answer(msg: &Message, resp: SearchResponse) -> Self {
        Self {
            results: Some(resp.results),
            has_relevant_results: Some(resp.has_relevant_results),
            generated_query: resp.generated_query,
            suggestions: resp.suggestions,
            ..Self::new(msg.role, msg.content.clone(), msg.timestamp)
        }
    }

    /// Returns the local identifier of this entry.
    #[inline]
    pub fn local_id(&self) -> LocalId {
        self.local_id
    }

    /// Returns the author of this entry.
    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the text of this entry.
    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns when this entry was created.
    #[inline]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the articles attached to this entry.
    ///
    /// Only answers to a successful search carry results.
    #[inline]
    pub fn results(&self) -> Option<&[SearchResult]> {
        self.results.as_deref()
    }

    /// Returns whether the attached results answer the question.
    #[inline]
    pub fn has_relevant_results(&self) -> Option<bool> {
        self.has_relevant_results
    }

    /// Returns the query the backend searched for.
    #[inline]
    pub fn generated_query(&self) -> Option<&str> {
        self.generated_query.as_deref()
    }

    /// Returns the backend's advice for rephrasing the question.
    #[inline]
    pub fn suggestions(&self) -> Option<&str> {
        self.suggestions.as_deref()
    }
}

/// The local, append-only record of a conversation.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Transcript {
    items: Vec<ChatMessage>,
}

impl Transcript {
    #[inline]
    pub(crate) fn push(&mut self, msg: ChatMessage) {
        self.items.push(msg);
    }

    /// Returns the entries in order.
    #[inline]
    pub fn items(&self) -> &[ChatMessage] {
        &self.items
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if there are no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the most recent entry.
    #[inline]
    pub fn last(&self) -> Option<&ChatMessage> {
        self.items.last()
    }

    /// Finds the first assistant message in `messages` whose text does
    /// not appear anywhere in this transcript.
    ///
    /// Matching is by exact content, so an answer whose text repeats an
    /// earlier entry word for word is never considered new.
    pub fn find_unseen_assistant<'a>(
        &self,
        messages: &'a [Message],
    ) -> Option<&'a Message> {
        messages.iter().find(|msg| {
            msg.role == Role::Assistant
                && !self.items.iter().any(|item| item.content == msg.content)
        })
    }
}
