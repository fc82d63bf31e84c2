//! WebSocket connection wrapper for the bidirectional synthesis endpoint.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::{HeaderValue, AUTHORIZATION};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::messages::ServerEvent;

/// Default limit for the TCP + TLS + upgrade handshake.
pub const CONN_TIMEOUT: Duration = Duration::from_secs(10);

/// How long `close` waits for the server's side of the close handshake.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Where and how to open the socket.
#[derive(Clone)]
pub struct WsClient {
    url: String,
    api_key: String,
    connect_timeout: Duration,
}

impl std::fmt::Debug for WsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsClient")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl WsClient {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            connect_timeout: CONN_TIMEOUT,
        }
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Opens a new connection with `Authorization: Basic <key>`.
    pub async fn connect(&self) -> Result<WsConnection> {
        info!(url = %self.url, "WebSocket connecting");

        let mut request = self.url.as_str().into_client_request()?;
        request.headers_mut().insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {}", self.api_key))?,
        );

        let (stream, _) = timeout(self.connect_timeout, tokio_tungstenite::connect_async(request))
            .await
            .map_err(|_| Error::ConnectionTimeout)??;

        info!(url = %self.url, "WebSocket connected");
        Ok(WsConnection { stream })
    }
}

/// An open socket speaking JSON text frames.
pub struct WsConnection {
    stream: WsStream,
}

impl WsConnection {
    /// Serializes `message` and sends it as one text frame.
    pub async fn send_json<T: Serialize>(&mut self, message: &T) -> Result<()> {
        let json = serde_json::to_string(message)?;
        debug!(json = %json, "Sending message");
        self.stream.send(Message::Text(json)).await?;
        Ok(())
    }

    /// Waits for the next well-formed server message.
    ///
    /// Control frames and unparseable payloads are skipped. Returns `None`
    /// once the server closes the socket. There is no receive timeout.
    pub async fn next_event(&mut self) -> Result<Option<ServerEvent>> {
        while let Some(msg) = self.stream.next().await {
            let text = match msg? {
                Message::Text(t) => t,
                Message::Binary(b) => match String::from_utf8(b) {
                    Ok(s) => s,
                    Err(e) => {
                        debug!(error = %e, "Skipping non-UTF-8 binary message");
                        continue;
                    }
                },
                Message::Close(frame) => {
                    debug!(frame = ?frame, "Received close");
                    return Ok(None);
                }
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            };

            match ServerEvent::from_json(&text) {
                Ok(event) => return Ok(Some(event)),
                Err(e) => {
                    debug!(error = %e, "Skipping malformed message");
                    continue;
                }
            }
        }
        Ok(None)
    }

    /// Sends a close frame, then discards incoming frames until the server
    /// ends the connection or `CLOSE_TIMEOUT` passes. Failures are logged,
    /// not returned.
    pub async fn close(mut self) {
        info!("WebSocket closing");
        match self.stream.close(None).await {
            Ok(()) => {
                let drain = async { while let Some(Ok(_)) = self.stream.next().await {} };
                if timeout(CLOSE_TIMEOUT, drain).await.is_err() {
                    debug!("No close acknowledgement from server");
                }
            }
            Err(e) => debug!(error = %e, "Close handshake failed"),
        }
        info!("WebSocket closed");
    }
}
