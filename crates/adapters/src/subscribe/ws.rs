// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket push channel: subscribes to one job and forwards its status
//! frames until the server closes the stream or the subscriber shuts it down.

use super::{PushUpdate, SubscribeAdapter, SubscribeError, Subscription};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use isk_core::{BackendConfig, JobHandle, JobId};
use isk_wire::{decode_frame, encode_frame, ClientFrame, ServerFrame};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;

#[derive(Clone, Debug, Default)]
pub struct WsSubscribeAdapter {
    url: Option<String>,
    auth_token: Option<String>,
}

impl WsSubscribeAdapter {
    pub fn new(config: &BackendConfig) -> Self {
        Self { url: config.subscribe_url.clone(), auth_token: config.auth_token.clone() }
    }
}

#[async_trait]
impl SubscribeAdapter for WsSubscribeAdapter {
    async fn subscribe(&self, handle: &JobHandle) -> Result<Subscription, SubscribeError> {
        let url = self.url.as_deref().ok_or(SubscribeError::Unsupported)?;
        let (ws, _) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| SubscribeError::Connect(e.to_string()))?;
        let (mut write, read) = ws.split();

        let frame = ClientFrame::Subscribe {
            job_id: handle.id.clone(),
            kind: handle.kind,
            token: handle.auth_token.clone().or_else(|| self.auth_token.clone()),
        };
        let text = encode_frame(&frame).map_err(|e| SubscribeError::Protocol(e.to_string()))?;
        write.send(Message::Text(text.into())).await.map_err(|e| SubscribeError::Connect(e.to_string()))?;
        tracing::info!(job = %handle.id, %url, "ws subscription opened");

        let (tx, updates) = mpsc::channel(16);
        let (shutdown, shutdown_rx) = oneshot::channel();
        tokio::spawn(bridge(handle.id.clone(), write, read, tx, shutdown_rx));
        Ok(Subscription { updates, shutdown })
    }
}

type WsStream = tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;
type WsWrite = futures_util::stream::SplitSink<WsStream, Message>;
type WsRead = futures_util::stream::SplitStream<WsStream>;

/// Background task forwarding server frames as `PushUpdate`s.
async fn bridge(
    job: JobId,
    mut write: WsWrite,
    mut read: WsRead,
    tx: mpsc::Sender<PushUpdate>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let reason = loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => match decode_frame(&text) {
                        Ok(ServerFrame::Status { status }) => {
                            let terminal = status.status.is_terminal();
                            if tx.send(PushUpdate::Status(status)).await.is_err() {
                                break None;
                            }
                            if terminal {
                                break Some("job finished".to_string());
                            }
                        }
                        Ok(ServerFrame::Subscribed { .. }) => {
                            tracing::debug!(%job, "ws subscription acknowledged");
                        }
                        Ok(ServerFrame::Error { message }) => break Some(message),
                        Err(e) => {
                            tracing::warn!(%job, error = %e, "ws bridge: undecodable frame");
                        }
                    },
                    Some(Ok(Message::Close(frame))) => {
                        tracing::info!(%job, ?frame, "ws bridge: received close frame");
                        break Some("closed by server".to_string());
                    }
                    None => break Some("stream ended".to_string()),
                    Some(Err(e)) => {
                        tracing::warn!(%job, %e, "ws bridge: error");
                        break Some(e.to_string());
                    }
                    _ => {} // Ping/Pong/Binary
                }
            }
            _ = &mut shutdown_rx => {
                if let Ok(text) = encode_frame(&ClientFrame::Unsubscribe { job_id: job.clone() }) {
                    let _ = write.send(Message::Text(text.into())).await;
                }
                break None;
            }
        }
    };

    let _ = write.close().await;
    if let Some(reason) = reason {
        tracing::info!(%job, %reason, "ws subscription closed");
        let _ = tx.send(PushUpdate::Closed { reason }).await;
    }
}
