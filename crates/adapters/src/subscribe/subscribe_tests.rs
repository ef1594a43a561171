// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use futures_util::{SinkExt, StreamExt};
use isk_core::test_support::validation_handle;
use isk_core::{BackendConfig, JobHandle, JobId, JobKind, RemoteStatus};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

fn meeting_handle(id: &str) -> JobHandle {
    JobHandle::by_id(JobId::new(id), JobKind::MeetingProcessing, isk_core::Fingerprint::meeting("mtg-1"), 0)
}

/// Accept one WebSocket client, record its first frame, then send `frames`.
async fn ws_server(frames: Vec<&'static str>) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let task = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        let first = match ws.next().await {
            Some(Ok(Message::Text(text))) => text.to_string(),
            other => panic!("unexpected first frame {other:?}"),
        };
        for frame in frames {
            ws.send(Message::Text(frame.into())).await.unwrap();
        }
        // Drain until the client goes away.
        while let Some(Ok(_)) = ws.next().await {}
        first
    });
    (format!("ws://{addr}/jobs"), task)
}

fn adapter(url: &str) -> WsSubscribeAdapter {
    WsSubscribeAdapter::new(&BackendConfig {
        subscribe_url: Some(url.to_string()),
        auth_token: Some("cfg-token".into()),
        ..BackendConfig::default()
    })
}

#[tokio::test]
async fn ws_forwards_status_until_terminal() {
    let (url, server) = ws_server(vec![
        r#"{"type":"subscribed","job_id":"m-1"}"#,
        r#"{"type":"status","job_id":"m-1","status":"PENDING"}"#,
        r#"{"type":"status","job_id":"m-1","status":"COMPLETED","result":{"summary":"ok"}}"#,
    ])
    .await;

    let mut sub = adapter(&url).subscribe(&meeting_handle("m-1")).await.unwrap();

    match sub.updates.recv().await {
        Some(PushUpdate::Status(status)) => assert_eq!(status.status, RemoteStatus::Pending),
        other => panic!("unexpected update {other:?}"),
    }
    match sub.updates.recv().await {
        Some(PushUpdate::Status(status)) => {
            assert_eq!(status.status, RemoteStatus::Completed);
            assert_eq!(status.result, Some(serde_json::json!({"summary": "ok"})));
        }
        other => panic!("unexpected update {other:?}"),
    }
    assert_eq!(sub.updates.recv().await, Some(PushUpdate::Closed { reason: "job finished".into() }));

    let first = server.await.unwrap();
    let frame: serde_json::Value = serde_json::from_str(&first).unwrap();
    assert_eq!(frame["type"], "subscribe");
    assert_eq!(frame["job_id"], "m-1");
    assert_eq!(frame["kind"], "meeting-processing");
    assert_eq!(frame["token"], "cfg-token");
}

#[tokio::test]
async fn ws_server_error_closes_subscription() {
    let (url, _server) = ws_server(vec![r#"{"type":"error","message":"unknown job"}"#]).await;
    let mut sub = adapter(&url).subscribe(&meeting_handle("m-2")).await.unwrap();
    assert_eq!(sub.updates.recv().await, Some(PushUpdate::Closed { reason: "unknown job".into() }));
}

#[tokio::test]
async fn ws_shutdown_ends_without_closed_update() {
    let (url, server) = ws_server(vec![]).await;
    let mut sub = adapter(&url).subscribe(&meeting_handle("m-3")).await.unwrap();
    sub.shutdown.send(()).unwrap();
    assert_eq!(sub.updates.recv().await, None);
    server.await.unwrap();
}

#[tokio::test]
async fn ws_without_url_is_unsupported() {
    let adapter = WsSubscribeAdapter::new(&BackendConfig::default());
    let err = adapter.subscribe(&meeting_handle("m-1")).await.unwrap_err();
    assert_eq!(err, SubscribeError::Unsupported);
}

#[tokio::test]
async fn ws_connect_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let err = adapter(&format!("ws://{addr}/jobs")).subscribe(&meeting_handle("m-1")).await.unwrap_err();
    assert!(matches!(err, SubscribeError::Connect(_)));
}

#[tokio::test]
async fn fake_delivers_pushes_and_tracks_shutdown() {
    let fake = FakeSubscribeAdapter::new();
    let mut sub = fake.subscribe(&validation_handle("job-1", "main")).await.unwrap();

    assert!(fake.is_open("job-1"));
    assert!(fake.push("job-1", RemoteStatus::Pending, None));
    assert!(matches!(sub.updates.recv().await, Some(PushUpdate::Status(_))));

    sub.shutdown.send(()).unwrap();
    assert!(!fake.is_open("job-1"));
    assert_eq!(fake.subscribed(), vec![JobId::new("job-1")]);
}

#[tokio::test]
async fn fake_close_and_failure() {
    let fake = FakeSubscribeAdapter::new();
    let mut sub = fake.subscribe(&validation_handle("job-1", "main")).await.unwrap();
    assert!(fake.close("job-1", "bye"));
    assert_eq!(sub.updates.recv().await, Some(PushUpdate::Closed { reason: "bye".into() }));
    assert!(!fake.push("job-1", RemoteStatus::Pending, None));

    fake.fail_with(SubscribeError::Unsupported);
    assert!(fake.subscribe(&validation_handle("job-2", "main")).await.is_err());
}
