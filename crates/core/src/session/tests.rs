use std::time::Duration;

use news_chat_model::{ErrorKind, Role, SessionId};
use news_chat_test_gateway::{
    PresetFailure, TestGateway, article, clear_reply, search_reply,
};

use super::*;
use crate::state::{InFlight, Notice};
use crate::transcript::{APOLOGY_MESSAGE, WELCOME_MESSAGE};

fn build_session(gateway: &TestGateway) -> ChatSession {
    ChatSessionBuilder::with_gateway(gateway.clone()).build()
}

#[tokio::test(start_paused = true)]
async fn test_simple_search() {
    let mut gateway = TestGateway::default();
    gateway.set_delay(Duration::from_secs(1));
    gateway.push_search(search_reply(
        "abc",
        &[
            (Role::User, "tariffs on steel"),
            (Role::Assistant, "Here are the latest reports on steel tariffs."),
        ],
        vec![article("Steel tariffs rise", 9.0), article("Ports brace", 5.5)],
    ));
    let session = build_session(&gateway);

    session.submit_query("tariffs on steel").await.unwrap();
    let snapshot = session.snapshot();
    assert_eq!(snapshot.transcript.len(), 1);
    assert_eq!(snapshot.in_flight, Some(InFlight::Search));

    let snapshot = session.wait_idle().await;
    assert_eq!(snapshot.transcript.len(), 2);
    assert_eq!(snapshot.session_id, Some(SessionId::new("abc")));
    assert!(snapshot.last_error.is_none());

    let answer = snapshot.transcript.last().unwrap();
    assert_eq!(answer.role(), Role::Assistant);
    assert_eq!(answer.results().unwrap().len(), 2);
    assert_eq!(
        gateway.recorded_searches()[0].session_id,
        None,
        "first search starts a new session"
    );
}

#[tokio::test]
async fn test_search_failure() {
    let gateway = TestGateway::default();
    gateway.push_search(PresetFailure::new(
        ErrorKind::SearchFailed,
        "rate limited",
    ));
    let session = build_session(&gateway);

    session.submit_query("tariffs on steel").await.unwrap();
    let snapshot = session.wait_idle().await;
    assert_eq!(snapshot.transcript.len(), 2);
    assert_eq!(snapshot.transcript.last().unwrap().content(), APOLOGY_MESSAGE);
    assert_eq!(snapshot.session_id, None);

    let report = snapshot.last_error.unwrap();
    assert_eq!(report.kind, ErrorKind::SearchFailed);
    assert_eq!(report.message, "rate limited");
}

#[tokio::test]
async fn test_network_failure_keeps_session() {
    let gateway = TestGateway::default();
    gateway.push_search(search_reply(
        "S1",
        &[(Role::User, "steel"), (Role::Assistant, "Answer 1")],
        vec![],
    ));
    gateway.push_search(PresetFailure::new(ErrorKind::NetworkUnavailable, ""));
    let session = build_session(&gateway);

    session.submit_query("steel").await.unwrap();
    session.wait_idle().await;
    session.submit_query("aluminium").await.unwrap();
    let snapshot = session.wait_idle().await;

    assert_eq!(snapshot.transcript.len(), 4);
    assert_eq!(snapshot.session_id, Some(SessionId::new("S1")));
    let report = snapshot.last_error.unwrap();
    assert_eq!(report.kind, ErrorKind::NetworkUnavailable);
    assert!(!report.message.is_empty());

    let searches = gateway.recorded_searches();
    assert_eq!(searches[1].query, "aluminium");
    assert_eq!(searches[1].session_id, Some(SessionId::new("S1")));
}

#[tokio::test(start_paused = true)]
async fn test_single_request_in_flight() {
    let mut gateway = TestGateway::default();
    gateway.set_delay(Duration::from_secs(1));
    gateway.push_search(search_reply(
        "abc",
        &[(Role::User, "first"), (Role::Assistant, "Answer")],
        vec![],
    ));
    let session = build_session(&gateway);

    session.submit_query("first").await.unwrap();
    assert_eq!(
        session.submit_query("second").await,
        Err(SubmitError::RequestInFlight)
    );
    assert_eq!(
        session.clear_conversation().await,
        Err(ClearError::RequestInFlight)
    );
    assert_eq!(session.snapshot().transcript.len(), 1);

    let snapshot = session.wait_idle().await;
    assert_eq!(snapshot.transcript.len(), 2);
    assert_eq!(gateway.recorded_searches().len(), 1);
    assert!(gateway.recorded_clears().is_empty());
}

#[tokio::test]
async fn test_empty_query() {
    let gateway = TestGateway::default();
    let session = build_session(&gateway);

    assert_eq!(
        session.submit_query("  \t ").await,
        Err(SubmitError::EmptyInput)
    );
    assert!(session.snapshot().transcript.is_empty());
    assert!(gateway.recorded_searches().is_empty());
}

#[tokio::test]
async fn test_clear_with_session() {
    let gateway = TestGateway::default();
    gateway.push_search(search_reply(
        "abc",
        &[(Role::User, "steel"), (Role::Assistant, "Answer")],
        vec![],
    ));
    gateway.push_clear(clear_reply());
    let session = build_session(&gateway);

    session.submit_query("steel").await.unwrap();
    session.wait_idle().await;
    session.clear_conversation().await.unwrap();
    let snapshot = session.wait_idle().await;

    assert!(snapshot.transcript.is_empty());
    assert_eq!(snapshot.session_id, None);
    assert_eq!(snapshot.last_notice, Some(Notice::Cleared));
    assert_eq!(gateway.recorded_clears(), vec![SessionId::new("abc")]);

    // Nothing to delete remotely the second time.
    session.clear_conversation().await.unwrap();
    let snapshot = session.wait_idle().await;
    assert!(snapshot.transcript.is_empty());
    assert_eq!(gateway.recorded_clears().len(), 1);
}

#[tokio::test]
async fn test_failed_clear_resets_view() {
    let gateway = TestGateway::default();
    gateway.push_search(search_reply(
        "abc",
        &[(Role::User, "steel"), (Role::Assistant, "Answer")],
        vec![],
    ));
    gateway.push_clear(PresetFailure::new(
        ErrorKind::NetworkUnavailable,
        "connection refused",
    ));
    let session = ChatSessionBuilder::with_gateway(gateway.clone())
        .seed_welcome_message(true)
        .build();
    assert_eq!(
        session.snapshot().transcript.items()[0].content(),
        WELCOME_MESSAGE
    );

    session.submit_query("steel").await.unwrap();
    session.wait_idle().await;
    session.clear_conversation().await.unwrap();
    let snapshot = session.wait_idle().await;

    assert_eq!(snapshot.transcript.len(), 1);
    assert_eq!(snapshot.transcript.items()[0].content(), WELCOME_MESSAGE);
    assert_eq!(snapshot.session_id, None);
    assert!(matches!(snapshot.last_notice, Some(Notice::ClearFailed(_))));
}

#[tokio::test]
async fn test_remote_conversation() {
    let gateway = TestGateway::simulated();
    let session = build_session(&gateway);
    assert!(session.remote_conversation().await.unwrap().is_none());

    session.submit_query("steel").await.unwrap();
    session.wait_idle().await;
    session.submit_query("aluminium").await.unwrap();
    let snapshot = session.wait_idle().await;
    assert_eq!(snapshot.transcript.len(), 4);
    assert_eq!(
        snapshot.transcript.last().unwrap().content(),
        "Here is what I found about \"aluminium\"."
    );

    let conversation = session.remote_conversation().await.unwrap().unwrap();
    assert_eq!(Some(conversation.session_id), snapshot.session_id);
    assert_eq!(conversation.messages.len(), 4);
    assert_eq!(session.snapshot().in_flight, None);
}

#[tokio::test]
async fn test_subscribe() {
    let gateway = TestGateway::simulated();
    let session = build_session(&gateway);
    let mut snapshot_rx = session.subscribe();

    session.submit_query("steel").await.unwrap();
    let snapshot = snapshot_rx
        .wait_for(|snapshot| snapshot.transcript.len() == 2)
        .await
        .unwrap()
        .clone();
    assert!(snapshot.is_idle());
}

#[tokio::test]
async fn test_session_closed() {
    let gateway = TestGateway::default();
    let session = build_session(&gateway);
    let mut snapshot_rx = session.subscribe();
    drop(session);

    // The driver drops its sender once it stops.
    assert!(snapshot_rx.changed().await.is_err());
}
