use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::future::ready;
use std::time::Duration;

use chrono::Utc;
use news_chat_model::{
    ClearResponse, Conversation, ErrorKind, GatewayError, Message, Role,
    SearchGateway, SearchRequest, SearchResponse, SessionId,
};
use tokio::time::sleep;

#[derive(Debug)]
struct FakeGatewayError(ErrorKind);

impl Display for FakeGatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Error for FakeGatewayError {}

impl GatewayError for FakeGatewayError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

/// Answers every search with "You asked <query>" in a fixed session.
struct FakeGateway;

impl SearchGateway for FakeGateway {
    type Error = FakeGatewayError;

    fn search(
        &self,
        req: &SearchRequest,
    ) -> impl Future<Output = Result<SearchResponse, Self::Error>> + Send + 'static
    {
        let req = req.clone();
        async move {
            if req.query.is_empty() {
                return Err(FakeGatewayError(ErrorKind::SearchFailed));
            }
            sleep(Duration::from_millis(1)).await;

            let session_id = req.session_id.unwrap_or_else(|| "fake".into());
            let now = Utc::now();
            Ok(SearchResponse {
                original_query: req.query.clone(),
                generated_query: None,
                results: vec![],
                has_relevant_results: false,
                suggestions: None,
                conversation: Some(Conversation {
                    session_id,
                    messages: vec![
                        Message {
                            role: Role::User,
                            content: req.query.clone(),
                            timestamp: now,
                        },
                        Message {
                            role: Role::Assistant,
                            content: format!("You asked {}", req.query),
                            timestamp: now,
                        },
                    ],
                }),
            })
        }
    }

    fn get_conversation(
        &self,
        _session_id: &SessionId,
    ) -> impl Future<Output = Result<Conversation, Self::Error>> + Send + 'static
    {
        ready(Err(FakeGatewayError(ErrorKind::NetworkUnavailable)))
    }

    fn clear_conversation(
        &self,
        session_id: &SessionId,
    ) -> impl Future<Output = Result<ClearResponse, Self::Error>> + Send + 'static
    {
        ready(Ok(ClearResponse {
            message: format!("cleared {session_id}"),
        }))
    }
}

mod tests {
    use super::*;

    #[tokio::test]
    async fn test_search() {
        let gateway = FakeGateway;
        let resp = gateway
            .search(&SearchRequest::new("Good morning"))
            .await
            .unwrap();

        let conversation = resp.conversation.unwrap();
        assert_eq!(conversation.session_id.as_str(), "fake");
        assert_eq!(conversation.messages[1].content, "You asked Good morning");
    }

    #[tokio::test]
    async fn test_search_continues_session() {
        let gateway = FakeGateway;
        let req = SearchRequest::new("And today?")
            .with_session(Some(SessionId::new("s-1")));
        let resp = gateway.search(&req).await.unwrap();
        assert_eq!(resp.conversation.unwrap().session_id.as_str(), "s-1");
    }

    #[tokio::test]
    async fn test_error() {
        let gateway = FakeGateway;
        let err = gateway
            .search(&SearchRequest::new(""))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SearchFailed);

        let err = gateway
            .get_conversation(&SessionId::new("s-1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NetworkUnavailable);
    }

    #[tokio::test]
    async fn test_clear() {
        let gateway = FakeGateway;
        let resp = gateway
            .clear_conversation(&SessionId::new("s-1"))
            .await
            .unwrap();
        assert_eq!(resp.message, "cleared s-1");
    }
}
