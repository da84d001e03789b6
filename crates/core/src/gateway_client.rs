use std::pin::Pin;
use std::sync::Arc;

use news_chat_model::{
    ClearResponse, Conversation, GatewayError, SearchGateway, SearchRequest,
    SearchResponse, SessionId,
};
use tracing::Instrument;

pub type GatewayResult<T> = Result<T, Box<dyn GatewayError>>;
type BoxedGatewayFuture<T> =
    Pin<Box<dyn Future<Output = GatewayResult<T>> + Send>>;

/// Object-safe mirror of [`SearchGateway`].
trait ErasedGateway: Send + Sync {
    fn search(&self, req: &SearchRequest) -> BoxedGatewayFuture<SearchResponse>;

    fn get_conversation(
        &self,
        session_id: &SessionId,
    ) -> BoxedGatewayFuture<Conversation>;

    fn clear_conversation(
        &self,
        session_id: &SessionId,
    ) -> BoxedGatewayFuture<ClearResponse>;
}

impl<G: SearchGateway> ErasedGateway for G {
    #[inline]
    fn search(&self, req: &SearchRequest) -> BoxedGatewayFuture<SearchResponse> {
        erase(SearchGateway::search(self, req))
    }

    #[inline]
    fn get_conversation(
        &self,
        session_id: &SessionId,
    ) -> BoxedGatewayFuture<Conversation> {
        erase(SearchGateway::get_conversation(self, session_id))
    }

    #[inline]
    fn clear_conversation(
        &self,
        session_id: &SessionId,
    ) -> BoxedGatewayFuture<ClearResponse> {
        erase(SearchGateway::clear_conversation(self, session_id))
    }
}

fn erase<T: 'static, E: GatewayError>(
    fut: impl Future<Output = Result<T, E>> + Send + 'static,
) -> BoxedGatewayFuture<T> {
    Box::pin(async move {
        fut.await
            .map_err(|err| Box::new(err) as Box<dyn GatewayError>)
    })
}

/// A wrapper around a search gateway that provides a type-erased
/// interface for the other modules, and traces every call.
#[derive(Clone)]
pub struct GatewayClient {
    gateway: Arc<dyn ErasedGateway>,
}

impl GatewayClient {
    #[inline]
    pub fn new<G: SearchGateway + 'static>(gateway: G) -> Self {
        Self {
            gateway: Arc::new(gateway),
        }
    }

    pub async fn search(
        &self,
        req: SearchRequest,
    ) -> GatewayResult<SearchResponse> {
        let fut = self.gateway.search(&req);
        let span = debug_span!("search", session_id = ?req.session_id);
        async move {
            trace!("sending {req:?}");
            let result = fut.await;
            match &result {
                Ok(resp) => debug!(
                    "got {} results, relevant: {}",
                    resp.results.len(),
                    resp.has_relevant_results
                ),
                Err(err) => warn!("search failed ({:?}): {err}", err.kind()),
            }
            result
        }
        .instrument(span)
        .await
    }

    pub async fn get_conversation(
        &self,
        session_id: SessionId,
    ) -> GatewayResult<Conversation> {
        let fut = self.gateway.get_conversation(&session_id);
        async move {
            let result = fut.await;
            if let Err(err) = &result {
                warn!("fetching conversation failed ({:?}): {err}", err.kind());
            }
            result
        }
        .instrument(debug_span!("get conversation", %session_id))
        .await
    }

    pub async fn clear_conversation(
        &self,
        session_id: SessionId,
    ) -> GatewayResult<ClearResponse> {
        let fut = self.gateway.clear_conversation(&session_id);
        async move {
            let result = fut.await;
            match &result {
                Ok(resp) => debug!("cleared: {}", resp.message),
                Err(err) => warn!("clear failed ({:?}): {err}", err.kind()),
            }
            result
        }
        .instrument(debug_span!("clear conversation", %session_id))
        .await
    }
}
