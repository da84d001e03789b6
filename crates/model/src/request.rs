use crate::message::SessionId;

/// A search to be sent to the gateway.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SearchRequest {
    /// The question as typed by the user.
    pub query: String,
    /// The session to continue. A new one is started when absent.
    pub session_id: Option<SessionId>,
}

impl SearchRequest {
    /// Creates a request that starts a new session.
    #[inline]
    pub fn new<S: Into<String>>(query: S) -> Self {
        Self {
            query: query.into(),
            session_id: None,
        }
    }

    /// Continues the given session, if any.
    #[inline]
    pub fn with_session(mut self, session_id: Option<SessionId>) -> Self {
        self.session_id = session_id;
        self
    }
}
