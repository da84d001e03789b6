//! A local fake search gateway for testing purpose.

mod preset;

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use news_chat_model::{
    ClearResponse, Conversation, ErrorKind, GatewayError, Message, Role,
    SearchGateway, SearchRequest, SearchResponse, SessionId,
};
use tokio::time::sleep;

pub use preset::*;

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl GatewayError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl From<PresetFailure> for Error {
    #[inline]
    fn from(failure: PresetFailure) -> Self {
        Self {
            message: failure.message,
            kind: failure.kind,
        }
    }
}

#[derive(Default)]
struct Script {
    searches: VecDeque<Preset<SearchResponse>>,
    gets: VecDeque<Preset<Conversation>>,
    clears: VecDeque<Preset<ClearResponse>>,
    recorded_searches: Vec<SearchRequest>,
    recorded_gets: Vec<SessionId>,
    recorded_clears: Vec<SessionId>,
    simulated: Option<SimulatedBackend>,
}

/// Emulates the real backend: sessions are minted on demand and every
/// search appends one user and one assistant message to its session.
#[derive(Default)]
struct SimulatedBackend {
    sessions: HashMap<SessionId, Vec<Message>>,
    next_session: u64,
}

impl SimulatedBackend {
    fn search(&mut self, req: &SearchRequest) -> SearchResponse {
        let session_id = req.session_id.clone().unwrap_or_else(|| {
            self.next_session += 1;
            SessionId::new(format!("session-{}", self.next_session))
        });
        let history = self.sessions.entry(session_id.clone()).or_default();

        let now = Utc::now();
        history.push(Message {
            role: Role::User,
            content: req.query.clone(),
            timestamp: now,
        });
        history.push(Message {
            role: Role::Assistant,
            content: format!("Here is what I found about \"{}\".", req.query),
            timestamp: now,
        });

        let results = vec![article(&req.query, 8.0)];
        SearchResponse {
            original_query: req.query.clone(),
            generated_query: Some(format!("{} news", req.query)),
            results,
            has_relevant_results: true,
            suggestions: None,
            conversation: Some(Conversation {
                session_id,
                messages: history.clone(),
            }),
        }
    }

    fn get(&self, session_id: &SessionId) -> Result<Conversation, Error> {
        let Some(history) = self.sessions.get(session_id) else {
            return Err(Error {
                message: "Session does not exist".to_owned(),
                kind: ErrorKind::SearchFailed,
            });
        };
        Ok(Conversation {
            session_id: session_id.clone(),
            messages: history.clone(),
        })
    }

    fn clear(&mut self, session_id: &SessionId) -> ClearResponse {
        // Unknown sessions are cleared successfully as well.
        self.sessions.remove(session_id);
        clear_reply()
    }
}

/// A local fake gateway for testing purpose.
///
/// Before sending requests, either script the replies for each operation
/// (consumed in order, an exhausted script fails with
/// [`ErrorKind::UnknownClientError`]), or create the gateway with
/// [`TestGateway::simulated`] to get a backend emulation.
///
/// Clones share the same script and recordings, so a test can keep one
/// clone for assertions while the code under test owns another.
///
/// # Note
///
/// This type is not optimized for production use. You should only use it
/// for testing.
#[derive(Clone, Default)]
pub struct TestGateway {
    script: Arc<Mutex<Script>>,
    delay: Option<Duration>,
}

impl TestGateway {
    /// Creates a gateway that emulates the backend instead of following
    /// a script.
    #[inline]
    pub fn simulated() -> Self {
        let gateway = Self::default();
        gateway.script().simulated = Some(SimulatedBackend::default());
        gateway
    }

    /// Queues the outcome of the next unanswered search.
    #[inline]
    pub fn push_search(&self, preset: impl Into<Preset<SearchResponse>>) {
        self.script().searches.push_back(preset.into());
    }

    /// Queues the outcome of the next unanswered conversation fetch.
    #[inline]
    pub fn push_get(&self, preset: impl Into<Preset<Conversation>>) {
        self.script().gets.push_back(preset.into());
    }

    /// Queues the outcome of the next unanswered clear.
    #[inline]
    pub fn push_clear(&self, preset: impl Into<Preset<ClearResponse>>) {
        self.script().clears.push_back(preset.into());
    }

    /// Delays every reply by `duration`.
    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns the searches issued so far.
    #[inline]
    pub fn recorded_searches(&self) -> Vec<SearchRequest> {
        self.script().recorded_searches.clone()
    }

    /// Returns the sessions fetched so far.
    #[inline]
    pub fn recorded_gets(&self) -> Vec<SessionId> {
        self.script().recorded_gets.clone()
    }

    /// Returns the sessions cleared so far.
    #[inline]
    pub fn recorded_clears(&self) -> Vec<SessionId> {
        self.script().recorded_clears.clone()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        // A panicking test thread must not hide the script from others.
        self.script.lock().unwrap_or_else(|err| err.into_inner())
    }

    fn reply<T: Send + 'static>(
        &self,
        result: Result<T, Error>,
    ) -> impl Future<Output = Result<T, Error>> + Send + 'static {
        let delay = self.delay;
        async move {
            if let Some(delay) = delay {
                sleep(delay).await;
            }
            result
        }
    }
}

fn take<T>(queue: &mut VecDeque<Preset<T>>, op: &str) -> Result<T, Error> {
    match queue.pop_front() {
        Some(Preset::Reply(value)) => Ok(value),
        Some(Preset::Failure(failure)) => Err(failure.into()),
        None => Err(Error {
            message: format!("no enough {op} steps"),
            kind: ErrorKind::UnknownClientError,
        }),
    }
}

impl SearchGateway for TestGateway {
    type Error = crate::Error;

    fn search(
        &self,
        req: &SearchRequest,
    ) -> impl Future<Output = Result<SearchResponse, Self::Error>> + Send + 'static
    {
        let result = {
            let mut guard = self.script();
            let script = &mut *guard;
            script.recorded_searches.push(req.clone());
            match script.simulated.as_mut() {
                Some(backend) => Ok(backend.search(req)),
                None => take(&mut script.searches, "search"),
            }
        };
        self.reply(result)
    }

    fn get_conversation(
        &self,
        session_id: &SessionId,
    ) -> impl Future<Output = Result<Conversation, Self::Error>> + Send + 'static
    {
        let result = {
            let mut guard = self.script();
            let script = &mut *guard;
            script.recorded_gets.push(session_id.clone());
            match script.simulated.as_ref() {
                Some(backend) => backend.get(session_id),
                None => take(&mut script.gets, "get"),
            }
        };
        self.reply(result)
    }

    fn clear_conversation(
        &self,
        session_id: &SessionId,
    ) -> impl Future<Output = Result<ClearResponse, Self::Error>> + Send + 'static
    {
        let result = {
            let mut guard = self.script();
            let script = &mut *guard;
            script.recorded_clears.push(session_id.clone());
            match script.simulated.as_mut() {
                Some(backend) => Ok(backend.clear(session_id)),
                None => take(&mut script.clears, "clear"),
            }
        };
        self.reply(result)
    }
}
