//! End-to-end tests for `FeedSubscription` against an in-process axum server.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{
        IntoResponse, Response,
        sse::{Event, Sse},
    },
    routing::get,
};
use feedchart_core::FeedMessage;
use feedchart_sse::{FeedSubscription, ReadyState, ReconnectPolicy, SseError};
use futures_util::{StreamExt, stream};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Last-Event-ID header seen on each connection, in order.
#[derive(Clone, Default)]
struct Connections(Arc<Mutex<Vec<Option<String>>>>);

impl Connections {
    fn record(&self, headers: &HeaderMap) -> usize {
        let id = headers
            .get("last-event-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let mut seen = self.0.lock().unwrap();
        seen.push(id);
        seen.len()
    }

    fn seen(&self) -> Vec<Option<String>> {
        self.0.lock().unwrap().clone()
    }
}

async fn spawn_server(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn feed_url(addr: SocketAddr) -> Url {
    Url::parse(&format!("http://{addr}/feed")).unwrap()
}

fn event_stream(body: &'static str) -> Response {
    Response::builder()
        .header(header::CONTENT_TYPE, "text/event-stream")
        .body(Body::from(body))
        .unwrap()
}

fn fast_retry() -> ReconnectPolicy {
    ReconnectPolicy::fixed(Duration::from_millis(10))
}

async fn recv(rx: &mut mpsc::Receiver<FeedMessage>) -> FeedMessage {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for feed message")
        .expect("channel closed")
}

#[tokio::test]
async fn delivers_in_order_and_resumes_with_last_event_id() {
    async fn feed(State(conns): State<Connections>, headers: HeaderMap) -> Response {
        match conns.record(&headers) {
            1 => event_stream("retry: 10\nid: 1\ndata: {\"n\":1}\n\nid: 2\ndata: {\"n\":2}\n\n"),
            _ => event_stream("data: {\"n\":3}\n\n"),
        }
    }

    let conns = Connections::default();
    let app = Router::new()
        .route("/feed", get(feed))
        .with_state(conns.clone());
    let addr = spawn_server(app).await;

    let subscription = FeedSubscription::new(feed_url(addr), fast_retry());
    let (tx, mut rx) = mpsc::channel(16);
    let cancel = CancellationToken::new();
    let task = {
        let cancel = cancel.clone();
        tokio::spawn(async move { subscription.run(tx, cancel).await })
    };

    let first = recv(&mut rx).await;
    let second = recv(&mut rx).await;
    let third = recv(&mut rx).await;
    assert_eq!(first.data, r#"{"n":1}"#);
    assert_eq!(first.last_event_id.as_deref(), Some("1"));
    assert_eq!(second.data, r#"{"n":2}"#);
    assert_eq!(third.data, r#"{"n":3}"#);
    assert_eq!(third.last_event_id.as_deref(), Some("2"));

    cancel.cancel();
    task.await.unwrap().unwrap();

    let seen = conns.seen();
    assert!(seen.len() >= 2);
    assert_eq!(seen[0], None);
    assert_eq!(seen[1].as_deref(), Some("2"));
}

#[tokio::test]
async fn accepts_axum_sse_responses() {
    async fn feed() -> impl IntoResponse {
        let events = stream::iter(vec![
            Ok::<_, Infallible>(Event::default().data(
                r#"{"color":"red","timestamp":"2019-07-27T10:19:07Z","cpu":1,"mem":2}"#,
            )),
            Ok(Event::default().event("status").data("up")),
        ]);
        Sse::new(events)
    }

    let addr = spawn_server(Router::new().route("/feed", get(feed))).await;
    let subscription = FeedSubscription::new(feed_url(addr), fast_retry());
    let (tx, mut rx) = mpsc::channel(16);
    let cancel = CancellationToken::new();
    let task = {
        let cancel = cancel.clone();
        tokio::spawn(async move { subscription.run(tx, cancel).await })
    };

    let sample = recv(&mut rx).await;
    assert!(sample.is_message());
    assert!(sample.data.contains("\"red\""));

    let status = recv(&mut rx).await;
    assert_eq!(status.event_type, "status");
    assert_eq!(status.data, "up");

    cancel.cancel();
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn wrong_content_type_fails_permanently() {
    async fn feed(State(conns): State<Connections>, headers: HeaderMap) -> Response {
        conns.record(&headers);
        (
            [(header::CONTENT_TYPE, "application/json")],
            r#"{"color":"red"}"#,
        )
            .into_response()
    }

    let conns = Connections::default();
    let app = Router::new()
        .route("/feed", get(feed))
        .with_state(conns.clone());
    let addr = spawn_server(app).await;

    let subscription = FeedSubscription::new(feed_url(addr), fast_retry());
    let state = subscription.ready_state();
    let (tx, _rx) = mpsc::channel(16);

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        subscription.run(tx, CancellationToken::new()),
    )
    .await
    .unwrap();

    assert!(matches!(result, Err(SseError::Rejected { .. })));
    assert_eq!(*state.borrow(), ReadyState::Closed);
    assert_eq!(conns.seen().len(), 1);
}

#[tokio::test]
async fn missing_endpoint_fails_permanently() {
    let app = Router::new().route("/", get(|| async { StatusCode::OK }));
    let addr = spawn_server(app).await;

    let subscription = FeedSubscription::new(feed_url(addr), fast_retry());
    let (tx, _rx) = mpsc::channel(16);
    let err = subscription
        .run(tx, CancellationToken::new())
        .await
        .unwrap_err();

    assert!(!err.is_retryable());
    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn cancellation_stops_an_idle_stream() {
    async fn feed() -> impl IntoResponse {
        let first = stream::iter(vec![Ok::<_, Infallible>(Event::default().data("hello"))]);
        Sse::new(first.chain(stream::pending::<Result<Event, Infallible>>()))
    }

    let addr = spawn_server(Router::new().route("/feed", get(feed))).await;
    let subscription = FeedSubscription::new(feed_url(addr), fast_retry());
    let mut state = subscription.ready_state();
    let (tx, mut rx) = mpsc::channel(16);
    let cancel = CancellationToken::new();
    let task = {
        let cancel = cancel.clone();
        tokio::spawn(async move { subscription.run(tx, cancel).await })
    };

    assert_eq!(recv(&mut rx).await.data, "hello");
    assert_eq!(*state.borrow_and_update(), ReadyState::Open);

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(*state.borrow(), ReadyState::Closed);
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn unreachable_server_keeps_retrying_until_cancelled() {
    // Bind then drop to get a port with nothing listening.
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let subscription = FeedSubscription::new(feed_url(addr), fast_retry());
    let state = subscription.ready_state();
    let (tx, _rx) = mpsc::channel(16);
    let cancel = CancellationToken::new();
    let task = {
        let cancel = cancel.clone();
        tokio::spawn(async move { subscription.run(tx, cancel).await })
    };

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!task.is_finished());
    assert_eq!(*state.borrow(), ReadyState::Connecting);

    cancel.cancel();
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn dropped_consumer_ends_the_subscription() {
    async fn feed() -> Response {
        event_stream("data: a\n\ndata: b\n\n")
    }

    let addr = spawn_server(Router::new().route("/feed", get(feed))).await;
    let subscription = FeedSubscription::new(feed_url(addr), fast_retry());
    let (tx, rx) = mpsc::channel(1);
    drop(rx);

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        subscription.run(tx, CancellationToken::new()),
    )
    .await
    .unwrap();
    assert!(result.is_ok());
}
