//! Integration tests for the acceptance pipeline and live fan-out.
//!
//! Wires the real in-memory store and subscription registry behind a
//! `SessionGateway` and drives it the way the transport adapters do.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use message_relay::adapters::{InMemoryMessageStore, SubscriptionRegistry};
use message_relay::application::{
    GetSessionMessagesQuery, ObserverConnection, SearchMessagesQuery, SessionGateway,
    SubmitMessageCommand,
};
use message_relay::domain::foundation::{DomainError, MessageId, SessionId, Timestamp};
use message_relay::domain::message::{ContentPolicy, Message, MessageError, Sender};
use message_relay::ports::{MessageStore, ObserverEvent, PageRequest};

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Harness {
    gateway: SessionGateway,
    store: Arc<InMemoryMessageStore>,
    registry: Arc<SubscriptionRegistry>,
}

fn harness_with_buffer(observer_buffer: usize) -> Harness {
    let store = Arc::new(InMemoryMessageStore::new());
    let registry = Arc::new(SubscriptionRegistry::new());
    let gateway = SessionGateway::new(
        store.clone(),
        registry.clone(),
        Arc::new(ContentPolicy::default()),
        observer_buffer,
    );
    Harness {
        gateway,
        store,
        registry,
    }
}

fn harness() -> Harness {
    harness_with_buffer(16)
}

fn session(id: &str) -> SessionId {
    SessionId::new(id).unwrap()
}

fn command(message_id: &str, session_id: &str, content: &str) -> SubmitMessageCommand {
    SubmitMessageCommand {
        message_id: MessageId::new(message_id).unwrap(),
        session_id: session(session_id),
        content: content.to_string(),
        sender: Sender::User,
        timestamp: Timestamp::now(),
    }
}

async fn next_event(conn: &mut ObserverConnection) -> Option<ObserverEvent> {
    tokio::time::timeout(Duration::from_millis(200), conn.events.recv())
        .await
        .ok()
        .flatten()
}

// =============================================================================
// Submission
// =============================================================================

#[tokio::test]
async fn accepted_message_is_enriched_and_stored() {
    let h = harness();

    let view = h
        .gateway
        .submit_message(command("m1", "s1", "hola mundo"))
        .await
        .unwrap();

    assert_eq!(view.message_id.as_str(), "m1");
    assert_eq!(view.metadata.word_count, 2);
    assert_eq!(view.metadata.character_count, 10);
    assert_eq!(h.store.len().await, 1);
}

#[tokio::test]
async fn duplicate_message_id_is_rejected_and_not_stored_twice() {
    let h = harness();
    h.gateway
        .submit_message(command("m1", "s1", "hola mundo"))
        .await
        .unwrap();

    let err = h
        .gateway
        .submit_message(command("m1", "s1", "otra vez"))
        .await
        .unwrap_err();

    assert!(matches!(err, MessageError::DuplicateId(_)));
    assert_eq!(h.store.len().await, 1);
}

#[tokio::test]
async fn prohibited_content_is_neither_stored_nor_delivered() {
    let h = harness();
    let mut observer = h.gateway.connect_observer(&session("s1")).await;

    let err = h
        .gateway
        .submit_message(command("m1", "s1", "this is SPAM"))
        .await
        .unwrap_err();

    assert_eq!(err, MessageError::ProhibitedContent);
    assert!(h.store.is_empty().await);
    assert!(next_event(&mut observer).await.is_none());
}

// =============================================================================
// Fan-out
// =============================================================================

#[tokio::test]
async fn observers_receive_only_their_session() {
    let h = harness();
    let mut on_s1 = h.gateway.connect_observer(&session("s1")).await;
    let mut on_s2 = h.gateway.connect_observer(&session("s2")).await;

    h.gateway
        .submit_message(command("m1", "s1", "hola mundo"))
        .await
        .unwrap();

    match next_event(&mut on_s1).await {
        Some(ObserverEvent::NewMessage(view)) => {
            assert_eq!(view.message_id.as_str(), "m1");
            assert_eq!(view.session_id.as_str(), "s1");
        }
        other => panic!("expected new message, got {:?}", other),
    }
    assert!(next_event(&mut on_s2).await.is_none());
}

#[tokio::test]
async fn every_observer_of_a_session_receives_the_message() {
    let h = harness();
    let mut a = h.gateway.connect_observer(&session("s1")).await;
    let mut b = h.gateway.connect_observer(&session("s1")).await;

    h.gateway
        .submit_message(command("m1", "s1", "hola"))
        .await
        .unwrap();

    assert!(next_event(&mut a).await.is_some());
    assert!(next_event(&mut b).await.is_some());
}

#[tokio::test]
async fn sequential_submissions_arrive_in_order() {
    let h = harness();
    let mut observer = h.gateway.connect_observer(&session("s1")).await;

    for i in 1..=5 {
        h.gateway
            .submit_message(command(&format!("m{}", i), "s1", "hola"))
            .await
            .unwrap();
    }

    for i in 1..=5 {
        match next_event(&mut observer).await {
            Some(ObserverEvent::NewMessage(view)) => {
                assert_eq!(view.message_id.as_str(), format!("m{}", i))
            }
            other => panic!("expected m{}, got {:?}", i, other),
        }
    }
}

#[tokio::test]
async fn dropped_observer_does_not_affect_submission_or_others() {
    let h = harness();
    let gone = h.gateway.connect_observer(&session("s1")).await;
    let mut alive = h.gateway.connect_observer(&session("s1")).await;
    drop(gone.events);

    let result = h
        .gateway
        .submit_message(command("m1", "s1", "hola"))
        .await;

    assert!(result.is_ok());
    assert!(next_event(&mut alive).await.is_some());
    assert_eq!(h.registry.total_observers().await, 1);
}

#[tokio::test]
async fn lagging_observer_is_evicted_and_its_queue_closes() {
    let h = harness_with_buffer(1);
    let mut slow = h.gateway.connect_observer(&session("s1")).await;

    h.gateway
        .submit_message(command("m1", "s1", "one"))
        .await
        .unwrap();
    h.gateway
        .submit_message(command("m2", "s1", "two"))
        .await
        .unwrap();

    assert_eq!(h.store.len().await, 2);
    assert!(next_event(&mut slow).await.is_some());
    assert!(slow.events.recv().await.is_none());
    assert!(h.registry.active_sessions().await.is_empty());
}

#[tokio::test]
async fn registry_is_empty_after_last_disconnect() {
    let h = harness();
    let a = h.gateway.connect_observer(&session("s1")).await;
    let b = h.gateway.connect_observer(&session("s1")).await;

    h.gateway.disconnect_observer(&a.subscription).await;
    assert_eq!(h.registry.active_sessions().await, vec![session("s1")]);

    h.gateway.disconnect_observer(&b.subscription).await;
    assert!(h.registry.active_sessions().await.is_empty());

    // A second disconnect is a no-op
    h.gateway.disconnect_observer(&b.subscription).await;
    assert_eq!(h.registry.total_observers().await, 0);
}

#[tokio::test]
async fn concurrent_submissions_all_reach_the_observer() {
    let h = Arc::new(harness_with_buffer(64));
    let mut observer = h.gateway.connect_observer(&session("s1")).await;

    let mut tasks = Vec::new();
    for i in 0..20 {
        let h = h.clone();
        tasks.push(tokio::spawn(async move {
            h.gateway
                .submit_message(command(&format!("m{}", i), "s1", "hola"))
                .await
        }));
    }
    for task in tasks {
        assert!(task.await.unwrap().is_ok());
    }

    let mut received = 0;
    while next_event(&mut observer).await.is_some() {
        received += 1;
    }
    assert_eq!(received, 20);
}

// =============================================================================
// Queries
// =============================================================================

#[tokio::test]
async fn listing_pages_in_arrival_order() {
    let h = harness();
    for id in ["m1", "m2", "m3", "m4"] {
        h.gateway
            .submit_message(command(id, "s1", "hola"))
            .await
            .unwrap();
    }

    let views = h
        .gateway
        .get_messages(GetSessionMessagesQuery {
            session_id: session("s1"),
            page: PageRequest::new(2, 1).unwrap(),
            sender: None,
        })
        .await
        .unwrap();

    let ids: Vec<_> = views.iter().map(|v| v.message_id.as_str()).collect();
    assert_eq!(ids, vec!["m2", "m3"]);
}

#[tokio::test]
async fn listing_filters_by_sender() {
    let h = harness();
    h.gateway
        .submit_message(command("m1", "s1", "from user"))
        .await
        .unwrap();
    let mut system = command("m2", "s1", "from system");
    system.sender = Sender::System;
    h.gateway.submit_message(system).await.unwrap();

    let views = h
        .gateway
        .get_messages(GetSessionMessagesQuery {
            session_id: session("s1"),
            page: PageRequest::from_optional(None, None).unwrap(),
            sender: Some(Sender::System),
        })
        .await
        .unwrap();

    assert_eq!(views.len(), 1);
    assert_eq!(views[0].message_id.as_str(), "m2");
}

#[tokio::test]
async fn search_is_case_insensitive_across_sessions() {
    let h = harness();
    h.gateway
        .submit_message(command("m1", "s1", "Hola Mundo"))
        .await
        .unwrap();
    h.gateway
        .submit_message(command("m2", "s2", "mundial"))
        .await
        .unwrap();
    h.gateway
        .submit_message(command("m3", "s3", "adios"))
        .await
        .unwrap();

    let views = h
        .gateway
        .search_messages(SearchMessagesQuery {
            query: "MUND".to_string(),
            limit: None,
        })
        .await
        .unwrap();

    let ids: Vec<_> = views.iter().map(|v| v.message_id.as_str()).collect();
    assert_eq!(ids, vec!["m1", "m2"]);
}

#[tokio::test]
async fn search_accepts_limits_above_the_listing_maximum() {
    let h = harness();
    for i in 0..3 {
        h.gateway
            .submit_message(command(&format!("m{}", i), "s1", "hola"))
            .await
            .unwrap();
    }

    let views = h
        .gateway
        .search_messages(SearchMessagesQuery {
            query: "hola".to_string(),
            limit: Some(500),
        })
        .await
        .unwrap();

    assert_eq!(views.len(), 3);
}

// =============================================================================
// Cancellation
// =============================================================================

/// Commits immediately, then stalls before answering the caller.
struct SlowAckStore {
    inner: InMemoryMessageStore,
    delay: Duration,
}

#[async_trait]
impl MessageStore for SlowAckStore {
    async fn create(&self, message: &Message) -> Result<Message, DomainError> {
        let stored = self.inner.create(message).await?;
        tokio::time::sleep(self.delay).await;
        Ok(stored)
    }

    async fn list_by_session(
        &self,
        session_id: &SessionId,
        page: PageRequest,
        sender: Option<Sender>,
    ) -> Result<Vec<Message>, DomainError> {
        self.inner.list_by_session(session_id, page, sender).await
    }

    async fn search(&self, keyword: &str, limit: u32) -> Result<Vec<Message>, DomainError> {
        self.inner.search(keyword, limit).await
    }
}

#[tokio::test]
async fn submit_cancelled_after_write_is_still_delivered() {
    let store = Arc::new(SlowAckStore {
        inner: InMemoryMessageStore::new(),
        delay: Duration::from_millis(100),
    });
    let gateway = SessionGateway::new(
        store.clone(),
        Arc::new(SubscriptionRegistry::new()),
        Arc::new(ContentPolicy::default()),
        16,
    );
    let mut observer = gateway.connect_observer(&session("s1")).await;

    let outcome = tokio::time::timeout(
        Duration::from_millis(20),
        gateway.submit_message(command("m1", "s1", "hola mundo")),
    )
    .await;
    assert!(outcome.is_err());

    let event = tokio::time::timeout(Duration::from_millis(500), observer.events.recv())
        .await
        .ok()
        .flatten();

    assert_eq!(store.inner.len().await, 1);
    match event {
        Some(ObserverEvent::NewMessage(view)) => assert_eq!(view.message_id.as_str(), "m1"),
        other => panic!("stored message was not delivered: {:?}", other),
    }
}
