//! A search gateway that talks to the news search backend over HTTP/JSON.

#[macro_use]
extern crate tracing;

mod config;
mod proto;

use std::sync::Arc;

use mime::Mime;
use news_chat_model::{
    ClearResponse, Conversation, ErrorKind, GatewayError, SearchGateway,
    SearchRequest, SearchResponse, SessionId,
};
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::Instrument;

pub use config::{GatewayConfig, GatewayConfigBuilder};
use proto::{ConversationData, Operation};

/// Error type for [`HttpGateway`].
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct Error {
    message: String,
    kind: ErrorKind,
    error_code: Option<i64>,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
            error_code: None,
        }
    }

    fn with_error_code(mut self, error_code: i64) -> Self {
        self.error_code = Some(error_code);
        self
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the `error_code` the server reported, if the server
    /// reported the failure itself.
    #[inline]
    pub fn error_code(&self) -> Option<i64> {
        self.error_code
    }
}

impl GatewayError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// Search gateway backed by the HTTP API.
#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
    config: Arc<GatewayConfig>,
}

impl HttpGateway {
    /// Creates a new `HttpGateway` with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, Error> {
        let base_url = Url::parse(&config.base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| {
                Error::new(
                    format!("Invalid base URL: {:?}", config.base_url),
                    ErrorKind::UnknownClientError,
                )
            })?;

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        for (name, value) in &config.default_headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                Error::new(
                    format!("Invalid header name: {name:?}"),
                    ErrorKind::UnknownClientError,
                )
            })?;
            let value = HeaderValue::from_str(value).map_err(|_| {
                Error::new(
                    format!("Invalid value for header {name}"),
                    ErrorKind::UnknownClientError,
                )
            })?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|err| {
                Error::new(
                    format!("Failed to create HTTP client: {err}"),
                    ErrorKind::UnknownClientError,
                )
            })?;

        Ok(Self {
            client,
            base_url,
            config: Arc::new(config),
        })
    }

    /// Returns the configuration this gateway was created with.
    #[inline]
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Base URLs that cannot be a base are rejected in `new`.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn conversation_endpoint(&self, session_id: &SessionId) -> Url {
        self.endpoint(&["api", "conversation", session_id.as_str()])
    }
}

impl SearchGateway for HttpGateway {
    type Error = Error;

    fn search(
        &self,
        req: &SearchRequest,
    ) -> impl Future<Output = Result<SearchResponse, Self::Error>> + Send + 'static
    {
        let request = self
            .client
            .post(self.endpoint(&["api", "search"]))
            .json(&proto::create_search_body(req));
        execute(request, Operation::Search)
    }

    fn get_conversation(
        &self,
        session_id: &SessionId,
    ) -> impl Future<Output = Result<Conversation, Self::Error>> + Send + 'static
    {
        let request = self.client.get(self.conversation_endpoint(session_id));
        let fut = execute::<ConversationData>(request, Operation::GetConversation);
        async move {
            fut.await?.conversation.ok_or_else(|| {
                Error::new(
                    "Response is missing the conversation",
                    ErrorKind::UnknownClientError,
                )
            })
        }
    }

    fn clear_conversation(
        &self,
        session_id: &SessionId,
    ) -> impl Future<Output = Result<ClearResponse, Self::Error>> + Send + 'static
    {
        let request = self.client.delete(self.conversation_endpoint(session_id));
        execute(request, Operation::ClearConversation)
    }
}

fn execute<T: DeserializeOwned + Send + 'static>(
    request: RequestBuilder,
    op: Operation,
) -> impl Future<Output = Result<T, Error>> + Send + 'static {
    let resp_fut = request
        .header(header::ACCEPT, "application/json")
        .send();

    async move {
        let result = async {
            let resp = resp_fut.await.map_err(transport_error)?;
            trace!("got a response with status {}", resp.status());

            let content_type = resp
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(ToOwned::to_owned);
            let json_body = content_type
                .as_deref()
                .map(|v| v.parse().map(|m: Mime| is_json(&m)).unwrap_or(false))
                // Some servers omit the header, let the decoder decide.
                .unwrap_or(true);
            if !json_body {
                return Err(Error::new(
                    format!("Unexpected content type: {content_type:?}"),
                    ErrorKind::UnknownClientError,
                ));
            }

            let body = resp.bytes().await.map_err(transport_error)?;
            proto::unwrap_envelope(&body, op)
        }
        .await;

        if let Err(err) = &result {
            error!("{op:?} failed ({:?}): {err}", err.kind());
        }
        result
    }
    .instrument(debug_span!("gateway req", op = ?op))
}

#[inline]
fn is_json(m: &Mime) -> bool {
    m.subtype() == mime::JSON || m.suffix() == Some(mime::JSON)
}

fn transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() || err.is_connect() || err.is_request() || err.is_body()
    {
        Error::new(
            format!("Network unavailable: {err}"),
            ErrorKind::NetworkUnavailable,
        )
    } else {
        Error::new(format!("{err}"), ErrorKind::UnknownClientError)
    }
}
