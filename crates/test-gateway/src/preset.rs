use chrono::Utc;
use news_chat_model::{
    ClearResponse, Conversation, ErrorKind, Message, Role, SearchResponse,
    SearchResult,
};

/// A scripted outcome for one gateway call.
#[derive(Clone, Debug, PartialEq)]
pub enum Preset<T> {
    /// The call succeeds with this value.
    Reply(T),
    /// The call fails.
    Failure(PresetFailure),
}

impl<T> From<PresetFailure> for Preset<T> {
    #[inline]
    fn from(failure: PresetFailure) -> Self {
        Preset::Failure(failure)
    }
}

impl From<SearchResponse> for Preset<SearchResponse> {
    #[inline]
    fn from(value: SearchResponse) -> Self {
        Preset::Reply(value)
    }
}

impl From<Conversation> for Preset<Conversation> {
    #[inline]
    fn from(value: Conversation) -> Self {
        Preset::Reply(value)
    }
}

impl From<ClearResponse> for Preset<ClearResponse> {
    #[inline]
    fn from(value: ClearResponse) -> Self {
        Preset::Reply(value)
    }
}

/// A scripted failure.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PresetFailure {
    /// The kind the error reports.
    pub kind: ErrorKind,
    /// The error message.
    pub message: String,
}

impl PresetFailure {
    /// A failure of the given kind.
    #[inline]
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Builds a search response whose conversation holds `messages`, all
/// stamped with the current time.
pub fn search_reply(
    session_id: &str,
    messages: &[(Role, &str)],
    results: Vec<SearchResult>,
) -> SearchResponse {
    let now = Utc::now();
    let original_query = messages
        .iter()
        .rev()
        .find(|(role, _)| *role == Role::User)
        .map(|(_, content)| content.to_string())
        .unwrap_or_default();
    SearchResponse {
        original_query,
        generated_query: None,
        has_relevant_results: !results.is_empty(),
        results,
        suggestions: None,
        conversation: Some(Conversation {
            session_id: session_id.into(),
            messages: messages
                .iter()
                .map(|(role, content)| Message {
                    role: *role,
                    content: content.to_string(),
                    timestamp: now,
                })
                .collect(),
        }),
    }
}

/// Builds a scored article.
pub fn article(title: &str, relevance_score: f64) -> SearchResult {
    let slug = title.to_lowercase().replace(' ', "-");
    SearchResult {
        title: title.to_owned(),
        url: format!("https://news.example.com/{slug}"),
        body: format!("{title}. More details inside."),
        source: "Example News".to_owned(),
        image: None,
        date: Some("2024-05-01T08:00:00+00:00".to_owned()),
        relevance_score: Some(relevance_score),
        relevance_reason: Some("Matches the question".to_owned()),
    }
}

/// Builds a clear confirmation.
#[inline]
pub fn clear_reply() -> ClearResponse {
    ClearResponse {
        message: "Conversation cleared".to_owned(),
    }
}
