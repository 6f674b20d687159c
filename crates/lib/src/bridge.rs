//! Bridge: wires host events, the gateway connection, and the display sink together.
//!
//! Outbound: `HostEvent` -> `EventMapper` -> `ConnectionManager::send` (best effort).
//! Inbound: raw frame -> `decode_inbound` -> `DisplayFormatter` -> `DisplaySink`.

use crate::config::{self, Config};
use crate::host::{DisplaySink, EventMapper, HostEvent};
use crate::relay::{
    decode_inbound, ConnectionManager, ConnectionState, Connector, DisplayFormatter,
    MessageHandler, RelayMessage, SendError,
};
use std::sync::Arc;

pub struct Bridge {
    connection: ConnectionManager,
    mapper: EventMapper,
    endpoint: String,
    reconnect_delay: u64,
}

impl Bridge {
    /// Build a bridge on the current Tokio runtime. Nothing connects until `start`.
    pub fn new(config: &Config, connector: Arc<dyn Connector>, sink: Arc<dyn DisplaySink>) -> Self {
        let formatter =
            DisplayFormatter::new(config.display.style, config::resolve_default_color(config));
        let on_message: MessageHandler =
            Arc::new(move |raw: String| deliver_inbound(&formatter, sink.as_ref(), &raw));
        Self {
            connection: ConnectionManager::new(connector, on_message),
            mapper: EventMapper::from_config(config),
            endpoint: config::resolve_websocket_url(config),
            reconnect_delay: config.websocket.reconnect_delay,
        }
    }

    /// Use `endpoint` instead of the configured gateway URL. Takes effect on `start`.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn start(&self) {
        self.connection.start(self.endpoint.as_str(), self.reconnect_delay);
    }

    pub async fn stop(&self) {
        self.connection.stop().await;
    }

    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    /// Relay a host event. Events switched off by config are skipped and count as sent.
    pub fn forward(&self, event: &HostEvent) -> Result<(), SendError> {
        let Some(message) = self.mapper.map(event) else {
            log::debug!("bridge: event not relayed: {:?}", event);
            return Ok(());
        };
        self.send(&message)
    }

    /// Send a prepared line. Failures are logged; the line is not retried.
    pub fn send(&self, message: &RelayMessage) -> Result<(), SendError> {
        self.connection.send(message).inspect_err(|e| {
            log::debug!("bridge: dropped line from {}: {}", message.username(), e);
        })
    }
}

fn deliver_inbound(formatter: &DisplayFormatter, sink: &dyn DisplaySink, raw: &str) {
    match decode_inbound(raw.as_bytes()) {
        Ok(message) => sink.broadcast(formatter.format(&message)),
        Err(e) => log::warn!("bridge: ignoring gateway frame: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::{ColorStyle, DisplayColor};
    use std::sync::Mutex;

    fn collecting_sink() -> (Arc<dyn DisplaySink>, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let captured = lines.clone();
        let sink: Arc<dyn DisplaySink> =
            Arc::new(move |line: String| captured.lock().unwrap().push(line));
        (sink, lines)
    }

    #[test]
    fn inbound_frames_are_formatted_for_the_host() {
        let (sink, lines) = collecting_sink();
        let formatter = DisplayFormatter::default();
        deliver_inbound(
            &formatter,
            sink.as_ref(),
            r#"{"username":"Bob","userColor":"red","content":"yo"}"#,
        );
        deliver_inbound(&formatter, sink.as_ref(), r#"{"username":"Eve","content":"hey"}"#);
        assert_eq!(
            *lines.lock().unwrap(),
            vec!["<RED>Bob<RESET>: yo", "<AQUA>Eve<RESET>: hey"]
        );
    }

    #[test]
    fn malformed_frames_never_reach_the_host() {
        let (sink, lines) = collecting_sink();
        let formatter = DisplayFormatter::new(ColorStyle::Legacy, DisplayColor::White);
        deliver_inbound(&formatter, sink.as_ref(), r#"{"content":"no name"}"#);
        deliver_inbound(&formatter, sink.as_ref(), "garbage");
        assert!(lines.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn forward_while_disconnected_reports_not_connected() {
        let (sink, _) = collecting_sink();
        let bridge = Bridge::new(
            &Config::default(),
            Arc::new(crate::relay::WebSocketConnector),
            sink,
        );
        let chat = HostEvent::Chat {
            player: "Steve".into(),
            message: "anyone there?".into(),
        };
        assert!(matches!(bridge.forward(&chat), Err(SendError::NotConnected)));
        assert_eq!(bridge.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn switched_off_events_are_not_sent() {
        let (sink, _) = collecting_sink();
        let mut config = Config::default();
        config.features.join_leave_messages = false;
        let bridge = Bridge::new(&config, Arc::new(crate::relay::WebSocketConnector), sink);
        let joined = HostEvent::PlayerJoined {
            player: "Steve".into(),
        };
        assert!(bridge.forward(&joined).is_ok());
    }
}
