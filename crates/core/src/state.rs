//! The conversation state machine.
//!
//! [`ChatState`] holds everything a chat view shows and changes only
//! through its `on_*` transitions. Transitions are plain functions of the
//! current state and an event; they never perform I/O. The caller issues
//! the request a transition hands back and later feeds the outcome in as
//! another event.

use news_chat_model::{ErrorKind, GatewayError, SearchRequest, SearchResponse, SessionId};

use crate::transcript::{ChatMessage, Transcript};

/// The operation that is currently awaiting the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InFlight {
    /// A search.
    Search,
    /// A remote delete of the conversation.
    Clear,
}

/// A failure as presented to the user.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ErrorReport {
    /// What went wrong.
    pub kind: ErrorKind,
    /// A non-empty description for display.
    pub message: String,
}

impl ErrorReport {
    /// Creates a report, falling back to the kind's description when
    /// `message` is blank.
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            kind.to_string()
        } else {
            message
        };
        Self { kind, message }
    }

    /// Creates a report from a gateway error.
    #[inline]
    pub fn from_error(err: &dyn GatewayError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

/// A transient message about the outcome of a clear.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Notice {
    /// The backend deleted the conversation.
    Cleared,
    /// The backend could not delete the conversation. The local view has
    /// been reset anyway.
    ClearFailed(ErrorReport),
}

impl Notice {
    /// Returns the text to display.
    pub fn text(&self) -> String {
        match self {
            Notice::Cleared => "Conversation cleared".to_owned(),
            Notice::ClearFailed(report) => {
                format!("Failed to clear conversation: {}", report.message)
            }
        }
    }
}

/// Why a query was not submitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum SubmitError {
    /// The query is empty after trimming.
    #[error("query is empty")]
    EmptyInput,
    /// Another request has not been answered yet.
    #[error("a request is already in flight")]
    RequestInFlight,
    /// The session driving this state has stopped.
    #[error("session has been closed")]
    SessionClosed,
}

/// Why a clear was not started.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ClearError {
    /// Another request has not been answered yet.
    #[error("a request is already in flight")]
    RequestInFlight,
    /// The session driving this state has stopped.
    #[error("session has been closed")]
    SessionClosed,
}

/// A read-only copy of [`ChatState`] handed to observers.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    /// The transcript.
    pub transcript: Transcript,
    /// The current session, if the backend has issued one.
    pub session_id: Option<SessionId>,
    /// The outstanding request, if any.
    pub in_flight: Option<InFlight>,
    /// The last search failure, until the next submission.
    pub last_error: Option<ErrorReport>,
    /// The outcome of the last clear.
    pub last_notice: Option<Notice>,
}

impl Snapshot {
    /// Returns `true` if no request is outstanding.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.in_flight.is_none()
    }
}

/// The state of one chat view.
#[derive(Clone, Debug)]
pub struct ChatState {
    transcript: Transcript,
    session_id: Option<SessionId>,
    in_flight: Option<InFlight>,
    last_error: Option<ErrorReport>,
    last_notice: Option<Notice>,
    seed_welcome_message: bool,
}

impl ChatState {
    /// Creates the state of a freshly opened view.
    ///
    /// With `seed_welcome_message`, the transcript starts with (and is
    /// reset to) a greeting from the assistant instead of being empty.
    pub fn new(seed_welcome_message: bool) -> Self {
        let mut state = Self {
            transcript: Transcript::default(),
            session_id: None,
            in_flight: None,
            last_error: None,
            last_notice: None,
            seed_welcome_message,
        };
        state.reset();
        state
    }

    /// Returns the transcript.
    #[inline]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Returns the current session, if the backend has issued one.
    #[inline]
    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    /// Returns the outstanding request, if any.
    #[inline]
    pub fn in_flight(&self) -> Option<InFlight> {
        self.in_flight
    }

    /// Returns the last search failure.
    #[inline]
    pub fn last_error(&self) -> Option<&ErrorReport> {
        self.last_error.as_ref()
    }

    /// Returns the outcome of the last clear.
    #[inline]
    pub fn last_notice(&self) -> Option<&Notice> {
        self.last_notice.as_ref()
    }

    /// Copies the observable parts of the state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            transcript: self.transcript.clone(),
            session_id: self.session_id.clone(),
            in_flight: self.in_flight,
            last_error: self.last_error.clone(),
            last_notice: self.last_notice.clone(),
        }
    }

    /// The user submitted `text`.
    ///
    /// On acceptance the user entry is appended right away and the search
    /// to issue is returned. Rejected submissions leave the state as is.
    pub fn on_submit(&mut self, text: &str) -> Result<SearchRequest, SubmitError> {
        if self.in_flight.is_some() {
            return Err(SubmitError::RequestInFlight);
        }
        if text.trim().is_empty() {
            return Err(SubmitError::EmptyInput);
        }

        self.transcript.push(ChatMessage::user(text));
        self.in_flight = Some(InFlight::Search);
        self.last_error = None;
        Ok(SearchRequest::new(text).with_session(self.session_id.clone()))
    }

    /// The outstanding search returned `resp`.
    ///
    /// Returns the appended assistant entry. Nothing is appended when the
    /// backend's conversation holds no assistant message that is not
    /// already in the transcript.
    pub fn on_search_succeeded(
        &mut self,
        resp: SearchResponse,
    ) -> Option<&ChatMessage> {
        if self.in_flight != Some(InFlight::Search) {
            warn!("discarding a search response nobody waits for");
            return None;
        }
        self.in_flight = None;

        let conversation = resp.conversation.as_ref()?;
        // A blank id names no session, the current one (if any) stays.
        if conversation.session_id.as_str().trim().is_empty() {
            warn!("response carries a blank session id");
        } else {
            self.session_id = Some(conversation.session_id.clone());
        }

        let Some(answer) = self
            .transcript
            .find_unseen_assistant(&conversation.messages)
            .cloned()
        else {
            warn!("response carries no new assistant message");
            return None;
        };
        self.transcript.push(ChatMessage::answer(&answer, resp));
        self.transcript.last()
    }

    /// The outstanding search failed.
    ///
    /// An apology is appended and the session is kept.
    pub fn on_search_failed(&mut self, report: ErrorReport) {
        if self.in_flight != Some(InFlight::Search) {
            warn!("discarding a search failure nobody waits for");
            return;
        }
        self.in_flight = None;
        self.transcript.push(ChatMessage::apology());
        self.last_error = Some(report);
    }

    /// The user asked to clear the conversation.
    ///
    /// Returns the session to delete on the backend. When there is none,
    /// the view is reset immediately and `None` is returned.
    pub fn on_clear_requested(
        &mut self,
    ) -> Result<Option<SessionId>, ClearError> {
        if self.in_flight.is_some() {
            return Err(ClearError::RequestInFlight);
        }
        match self.session_id.clone() {
            Some(session_id) => {
                self.in_flight = Some(InFlight::Clear);
                Ok(Some(session_id))
            }
            None => {
                self.reset();
                self.last_notice = None;
                Ok(None)
            }
        }
    }

    /// The backend deleted the conversation.
    pub fn on_clear_succeeded(&mut self) {
        if self.in_flight != Some(InFlight::Clear) {
            warn!("discarding a clear response nobody waits for");
            return;
        }
        self.in_flight = None;
        self.reset();
        self.last_notice = Some(Notice::Cleared);
    }

    /// The backend could not delete the conversation.
    ///
    /// The view is reset regardless, so it never stays tied to a session
    /// that may be gone.
    pub fn on_clear_failed(&mut self, report: ErrorReport) {
        if self.in_flight != Some(InFlight::Clear) {
            warn!("discarding a clear failure nobody waits for");
            return;
        }
        self.in_flight = None;
        self.reset();
        self.last_notice = Some(Notice::ClearFailed(report));
    }

    fn reset(&mut self) {
        self.transcript = Transcript::default();
        if self.seed_welcome_message {
            self.transcript.push(ChatMessage::welcome());
        }
        self.session_id = None;
        self.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use news_chat_model::Role;
    use news_chat_test_gateway::{article, search_reply};

    use super::*;
    use crate::transcript::{APOLOGY_MESSAGE, WELCOME_MESSAGE};

    fn network_down() -> ErrorReport {
        ErrorReport::new(ErrorKind::NetworkUnavailable, "timed out")
    }

    #[test]
    fn test_submit_appends_user_entry() {
        let mut state = ChatState::new(false);
        let req = state.on_submit("tariffs on steel").unwrap();

        assert_eq!(req, SearchRequest::new("tariffs on steel"));
        assert_eq!(state.transcript().len(), 1);
        let entry = state.transcript().last().unwrap();
        assert_eq!(entry.role(), Role::User);
        assert_eq!(entry.content(), "tariffs on steel");
        assert_eq!(state.in_flight(), Some(InFlight::Search));
    }

    #[test]
    fn test_submit_rejections() {
        let mut state = ChatState::new(false);
        assert_eq!(state.on_submit("   \n"), Err(SubmitError::EmptyInput));
        assert!(state.transcript().is_empty());

        state.on_submit("first").unwrap();
        assert_eq!(state.on_submit("second"), Err(SubmitError::RequestInFlight));
        assert_eq!(state.transcript().len(), 1);
    }

    #[test]
    fn test_search_success() {
        let mut state = ChatState::new(false);
        state.on_submit("tariffs on steel").unwrap();

        let answer = state
            .on_search_succeeded(search_reply(
                "abc",
                &[
                    (Role::User, "tariffs on steel"),
                    (Role::Assistant, "I found 2 articles."),
                ],
                vec![article("Steel tariffs rise", 9.0), article("Markets react", 5.0)],
            ))
            .unwrap();
        assert_eq!(answer.role(), Role::Assistant);
        assert_eq!(answer.content(), "I found 2 articles.");
        assert_eq!(answer.results().unwrap().len(), 2);
        assert_eq!(answer.has_relevant_results(), Some(true));

        assert_eq!(state.transcript().len(), 2);
        assert_eq!(state.session_id(), Some(&SessionId::new("abc")));
        assert_eq!(state.in_flight(), None);
    }

    #[test]
    fn test_session_is_reused() {
        let mut state = ChatState::new(false);
        state.on_submit("steel").unwrap();
        state.on_search_succeeded(search_reply(
            "S1",
            &[(Role::User, "steel"), (Role::Assistant, "Answer 1")],
            vec![],
        ));

        let req = state.on_submit("aluminium").unwrap();
        assert_eq!(req.session_id, Some(SessionId::new("S1")));
    }

    #[test]
    fn test_search_success_without_new_answer() {
        let mut state = ChatState::new(false);
        state.on_submit("steel").unwrap();
        let answer = state.on_search_succeeded(search_reply(
            "abc",
            &[(Role::User, "steel")],
            vec![],
        ));
        assert!(answer.is_none());
        assert_eq!(state.transcript().len(), 1);
        assert_eq!(state.session_id(), Some(&SessionId::new("abc")));
        assert_eq!(state.in_flight(), None);
    }

    #[test]
    fn test_blank_session_id_is_not_adopted() {
        let mut state = ChatState::new(false);
        state.on_submit("steel").unwrap();
        let answer = state.on_search_succeeded(search_reply(
            "",
            &[(Role::User, "steel"), (Role::Assistant, "Answer 1")],
            vec![],
        ));
        assert!(answer.is_some());
        assert_eq!(state.session_id(), None);

        // Nothing to delete remotely, the view resets right away.
        assert_eq!(state.on_clear_requested(), Ok(None));
        assert!(state.transcript().is_empty());

        state.on_submit("aluminium").unwrap();
        state.on_search_succeeded(search_reply(
            "S1",
            &[(Role::User, "aluminium"), (Role::Assistant, "Answer 2")],
            vec![],
        ));
        state.on_submit("copper").unwrap();
        state.on_search_succeeded(search_reply(
            "",
            &[(Role::User, "copper"), (Role::Assistant, "Answer 3")],
            vec![],
        ));
        assert_eq!(state.session_id(), Some(&SessionId::new("S1")));
    }

    #[test]
    fn test_search_failure_keeps_session() {
        let mut state = ChatState::new(false);
        state.on_submit("steel").unwrap();
        state.on_search_succeeded(search_reply(
            "abc",
            &[(Role::User, "steel"), (Role::Assistant, "Answer 1")],
            vec![],
        ));

        state.on_submit("aluminium").unwrap();
        state.on_search_failed(ErrorReport::new(ErrorKind::SearchFailed, "rate limited"));

        assert_eq!(state.transcript().len(), 4);
        assert_eq!(state.transcript().last().unwrap().content(), APOLOGY_MESSAGE);
        assert_eq!(state.session_id(), Some(&SessionId::new("abc")));
        assert_eq!(state.last_error().unwrap().message, "rate limited");

        // The banner goes away with the next submission.
        state.on_submit("copper").unwrap();
        assert!(state.last_error().is_none());
    }

    #[test]
    fn test_blank_error_message_falls_back() {
        let report = ErrorReport::new(ErrorKind::NetworkUnavailable, "");
        assert_eq!(report.message, "Network unavailable");
    }

    #[test]
    fn test_clear_without_session() {
        let mut state = ChatState::new(true);
        state.on_submit("steel").unwrap();
        state.on_search_failed(network_down());
        assert_eq!(state.transcript().len(), 3);

        assert_eq!(state.on_clear_requested(), Ok(None));
        assert_eq!(state.transcript().len(), 1);
        assert_eq!(state.transcript().items()[0].content(), WELCOME_MESSAGE);
        assert!(state.last_error().is_none());

        // Clearing again yields the same shape.
        assert_eq!(state.on_clear_requested(), Ok(None));
        assert_eq!(state.transcript().len(), 1);
    }

    #[test]
    fn test_clear_with_session() {
        let mut state = ChatState::new(false);
        state.on_submit("steel").unwrap();
        state.on_search_succeeded(search_reply(
            "abc",
            &[(Role::User, "steel"), (Role::Assistant, "Answer 1")],
            vec![],
        ));

        assert_eq!(state.on_clear_requested(), Ok(Some(SessionId::new("abc"))));
        assert_eq!(state.in_flight(), Some(InFlight::Clear));
        assert_eq!(state.on_submit("more"), Err(SubmitError::RequestInFlight));
        assert_eq!(state.on_clear_requested(), Err(ClearError::RequestInFlight));

        state.on_clear_succeeded();
        assert!(state.transcript().is_empty());
        assert_eq!(state.session_id(), None);
        assert_eq!(state.last_notice(), Some(&Notice::Cleared));
    }

    #[test]
    fn test_failed_clear_still_resets() {
        let mut state = ChatState::new(false);
        state.on_submit("steel").unwrap();
        state.on_search_succeeded(search_reply(
            "abc",
            &[(Role::User, "steel"), (Role::Assistant, "Answer 1")],
            vec![],
        ));

        state.on_clear_requested().unwrap();
        state.on_clear_failed(network_down());
        assert!(state.transcript().is_empty());
        assert_eq!(state.session_id(), None);
        assert_eq!(state.in_flight(), None);
        let notice = state.last_notice().unwrap();
        assert!(matches!(notice, Notice::ClearFailed(_)));
        assert_eq!(notice.text(), "Failed to clear conversation: timed out");
    }

    #[test]
    fn test_stray_completions_are_ignored() {
        let mut state = ChatState::new(false);
        state.on_search_failed(network_down());
        state.on_clear_succeeded();
        assert!(state.transcript().is_empty());
        assert!(state.last_notice().is_none());
    }
}
