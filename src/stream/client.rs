//! Low-level stream websocket client.
//!
//! The client opens the connection, sends the subscription request, and
//! exposes the inbound side as tagged connection events so the session loop
//! can tell recoverable frames from terminal transport states.

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::stream::proto::{CommitmentLevel, LogsFilter, SubscribeRequest};

/// Default mainnet websocket endpoint for the Solana RPC node.
pub const SOLANA_MAINNET_WS: &str = "wss://api.mainnet-beta.solana.com";

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Entry point for opening subscribed stream connections.
#[derive(Clone, Debug)]
pub struct StreamClient {
    endpoint: String,
}

impl Default for StreamClient {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamClient {
    /// Creates a client pointed at the mainnet endpoint.
    pub fn new() -> Self {
        Self {
            endpoint: SOLANA_MAINNET_WS.to_string(),
        }
    }

    /// Sets an explicit websocket endpoint override.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        self.endpoint = endpoint.trim_end().to_string();
        self
    }

    /// Returns the endpoint the client will connect to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Opens the websocket and sends the subscription request.
    ///
    /// Exactly one subscribe request is sent, before any receive. Malformed
    /// URLs surface here as connection errors, not at construction time.
    pub async fn connect(
        &self,
        configure: &StreamConfigure,
    ) -> Result<StreamConnection, StreamError> {
        if self.endpoint.trim().is_empty() {
            return Err(StreamError::Protocol(
                "stream endpoint must not be empty".to_string(),
            ));
        }

        let (mut socket, _) = connect_async(self.endpoint.as_str()).await?;

        let request = SubscribeRequest::logs(configure.filter.clone(), configure.commitment);
        let text = request.to_text()?;
        socket.send(Message::Text(text.into())).await?;

        Ok(StreamConnection { socket })
    }
}

/// Subscription parameters sent with the initial request.
#[derive(Clone, Debug, Default)]
pub struct StreamConfigure {
    /// Which transaction logs the node should push.
    pub filter: LogsFilter,
    /// Confirmation depth at which logs are delivered.
    pub commitment: CommitmentLevel,
}

/// One inbound step on an open connection.
#[derive(Debug)]
pub enum ConnectionEvent {
    /// A text frame to hand to the parser.
    Frame(String),
    /// The peer or the transport closed the channel.
    Closed { reason: String },
    /// The transport failed in a way that is not a closure.
    Failed(StreamError),
}

/// An open, subscribed websocket connection.
#[derive(Debug)]
pub struct StreamConnection {
    socket: Socket,
}

impl StreamConnection {
    /// Waits for the next inbound event.
    ///
    /// Ping frames are answered inline; pong and non-text frames are skipped.
    pub async fn next_event(&mut self) -> ConnectionEvent {
        loop {
            match self.socket.next().await {
                Some(Ok(Message::Text(text))) => {
                    return ConnectionEvent::Frame(text.as_str().to_owned());
                }
                Some(Ok(Message::Ping(payload))) => {
                    if let Err(err) = self.socket.send(Message::Pong(payload)).await {
                        return classify_ws_error(err);
                    }
                }
                Some(Ok(Message::Pong(_))) => {}
                Some(Ok(Message::Close(frame))) => {
                    return ConnectionEvent::Closed {
                        reason: close_reason(frame),
                    };
                }
                Some(Ok(_)) => {
                    tracing::debug!("skipping non-text frame");
                }
                Some(Err(err)) => return classify_ws_error(err),
                None => {
                    return ConnectionEvent::Closed {
                        reason: "stream ended without a close frame".to_string(),
                    };
                }
            }
        }
    }

    /// Closes the connection, ignoring errors on an already-dead socket.
    pub async fn close(&mut self) {
        let _ = self.socket.close(None).await;
    }
}

fn classify_ws_error(err: WsError) -> ConnectionEvent {
    match err {
        WsError::ConnectionClosed | WsError::AlreadyClosed => ConnectionEvent::Closed {
            reason: "connection closed".to_string(),
        },
        WsError::Protocol(ProtocolError::ResetWithoutClosingHandshake) => {
            ConnectionEvent::Closed {
                reason: "connection reset without closing handshake".to_string(),
            }
        }
        other => ConnectionEvent::Failed(StreamError::WebSocket(other)),
    }
}

fn close_reason(frame: Option<CloseFrame>) -> String {
    match frame {
        Some(frame) if !frame.reason.as_str().is_empty() => {
            format!("{} (code {})", frame.reason.as_str(), u16::from(frame.code))
        }
        Some(frame) => format!("code {}", u16::from(frame.code)),
        None => "closed without a close frame".to_string(),
    }
}

/// Errors produced by stream transport and protocol handling.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Websocket transport error.
    #[error("websocket error: {0}")]
    WebSocket(#[from] WsError),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Sink or console write error.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Stream contract error.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl StreamError {
    /// Short kind name used in the terminal "Unexpected error" line.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::WebSocket(_) => "WebSocketError",
            Self::Json(_) => "JsonError",
            Self::Io(_) => "IoError",
            Self::Protocol(_) => "ProtocolError",
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

    use super::*;

    #[test]
    fn stream_client_uses_mainnet_endpoint_by_default() {
        let client = StreamClient::new();
        assert_eq!(client.endpoint(), SOLANA_MAINNET_WS);
    }

    #[test]
    fn stream_client_endpoint_override_is_trimmed() {
        let client = StreamClient::new().with_endpoint("wss://rpc-dev.example/ws   \n");
        assert_eq!(client.endpoint(), "wss://rpc-dev.example/ws");
    }

    #[test]
    fn connecting_with_empty_endpoint_is_a_protocol_error() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");

        runtime.block_on(async {
            let client = StreamClient::new().with_endpoint("   ");
            let err = client
                .connect(&StreamConfigure::default())
                .await
                .expect_err("empty endpoint must not connect");
            assert!(matches!(err, StreamError::Protocol(_)));
            assert_eq!(err.kind(), "ProtocolError");
        });
    }

    #[test]
    fn close_reason_includes_peer_reason_and_code() {
        let reason = close_reason(Some(CloseFrame {
            code: CloseCode::Away,
            reason: "going away".into(),
        }));
        assert_eq!(reason, "going away (code 1001)");
    }

    #[test]
    fn close_reason_without_frame_or_reason() {
        assert_eq!(close_reason(None), "closed without a close frame");
        let reason = close_reason(Some(CloseFrame {
            code: CloseCode::Normal,
            reason: "".into(),
        }));
        assert_eq!(reason, "code 1000");
    }

    #[test]
    fn closed_transport_errors_classify_as_closure() {
        assert!(matches!(
            classify_ws_error(WsError::ConnectionClosed),
            ConnectionEvent::Closed { .. }
        ));
        assert!(matches!(
            classify_ws_error(WsError::AlreadyClosed),
            ConnectionEvent::Closed { .. }
        ));
        assert!(matches!(
            classify_ws_error(WsError::Protocol(
                ProtocolError::ResetWithoutClosingHandshake
            )),
            ConnectionEvent::Closed { .. }
        ));
    }

    #[test]
    fn other_transport_errors_classify_as_failure() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe broke mid-frame");
        let event = classify_ws_error(WsError::Io(io));
        match event {
            ConnectionEvent::Failed(err) => assert_eq!(err.kind(), "WebSocketError"),
            other => panic!("expected failure event, got {other:?}"),
        }
    }
}
