//! WebSocket links to the gateway (tokio-tungstenite).

use crate::relay::connection::{ConnectError, Connector, Transport, TransportError};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

/// Connects with `tokio_tungstenite::connect_async`; `ws://` and `wss://` endpoints.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

#[async_trait]
impl Connector for WebSocketConnector {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn Transport>, ConnectError> {
        let (ws, _) = tokio_tungstenite::connect_async(endpoint)
            .await
            .map_err(|e| connect_error(endpoint, e))?;
        Ok(Box::new(WebSocketTransport { ws }))
    }
}

fn connect_error(endpoint: &str, err: tungstenite::Error) -> ConnectError {
    let endpoint = endpoint.to_string();
    match err {
        tungstenite::Error::Url(e) => ConnectError::InvalidEndpoint {
            endpoint,
            reason: e.to_string(),
        },
        tungstenite::Error::HttpFormat(e) => ConnectError::InvalidEndpoint {
            endpoint,
            reason: e.to_string(),
        },
        tungstenite::Error::Io(e) => ConnectError::Unreachable {
            endpoint,
            reason: e.to_string(),
        },
        other => ConnectError::Handshake {
            endpoint,
            reason: other.to_string(),
        },
    }
}

struct WebSocketTransport {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        self.ws.send(Message::Text(text)).await?;
        Ok(())
    }

    async fn next_text(&mut self) -> Option<Result<String, TransportError>> {
        loop {
            match self.ws.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text)),
                Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                    Ok(text) => return Some(Ok(text)),
                    Err(_) => log::debug!("relay: dropping non-utf8 binary frame"),
                },
                Ok(Message::Close(frame)) => {
                    if let Some(frame) = frame {
                        log::info!(
                            "relay: gateway closed link: {} {}",
                            u16::from(frame.code),
                            frame.reason
                        );
                    }
                    return None;
                }
                // ping/pong are answered by tungstenite
                Ok(_) => {}
                Err(tungstenite::Error::ConnectionClosed) => return None,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        match self.ws.close(None).await {
            Ok(()) | Err(tungstenite::Error::ConnectionClosed) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
