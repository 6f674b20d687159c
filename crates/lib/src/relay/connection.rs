//! Gateway connection: one outbound link, reconnected after a fixed delay whenever it drops.
//!
//! State lives behind a single mutex so `send` never races a reconnect. The link itself is
//! driven by one task that reads frames, writes queued frames in call order, and reports
//! back when the link is lost. Reconnects are timer tasks, cancelled by `stop`.

use crate::relay::protocol::RelayMessage;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// How long `stop` waits for the socket to close before aborting the link task.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("gateway unreachable at {endpoint}: {reason}")]
    Unreachable { endpoint: String, reason: String },
    #[error("handshake with {endpoint} failed: {reason}")]
    Handshake { endpoint: String, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("link closed")]
    Closed,
}

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("not connected to gateway")]
    NotConnected,
    #[error("could not encode payload: {0}")]
    EncodingFailure(#[from] serde_json::Error),
}

/// An established link carrying text frames.
#[async_trait]
pub trait Transport: Send {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError>;

    /// Next text frame. `None` once the remote has closed the link. Must be cancel-safe.
    async fn next_text(&mut self) -> Option<Result<String, TransportError>>;

    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Opens links to an endpoint (WebSocket in production, in-memory in tests).
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn Transport>, ConnectError>;
}

/// Called once per received frame with the raw payload text.
pub type MessageHandler = Arc<dyn Fn(String) + Send + Sync>;

enum Outbound {
    Frame(String),
    Close,
}

struct Shared {
    state: ConnectionState,
    endpoint: String,
    reconnect_delay: Duration,
    /// Bumped by `start` and `stop`; tasks from an older generation leave state alone.
    generation: u64,
    stopped: bool,
    outbound: Option<mpsc::UnboundedSender<Outbound>>,
    link_task: Option<JoinHandle<()>>,
    reconnect_task: Option<JoinHandle<()>>,
}

struct Inner {
    runtime: Handle,
    connector: Arc<dyn Connector>,
    on_message: MessageHandler,
    shared: Mutex<Shared>,
}

/// Owns the single connection to the gateway. Cheap to clone; clones share the connection.
#[derive(Clone)]
pub struct ConnectionManager {
    inner: Arc<Inner>,
}

impl ConnectionManager {
    /// Create a manager that spawns its tasks on the current Tokio runtime.
    ///
    /// Panics when called outside a runtime; use [`ConnectionManager::with_runtime`] from
    /// plain threads.
    pub fn new(connector: Arc<dyn Connector>, on_message: MessageHandler) -> Self {
        Self::with_runtime(Handle::current(), connector, on_message)
    }

    pub fn with_runtime(
        runtime: Handle,
        connector: Arc<dyn Connector>,
        on_message: MessageHandler,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                runtime,
                connector,
                on_message,
                shared: Mutex::new(Shared {
                    state: ConnectionState::Disconnected,
                    endpoint: String::new(),
                    reconnect_delay: Duration::ZERO,
                    generation: 0,
                    stopped: false,
                    outbound: None,
                    link_task: None,
                    reconnect_task: None,
                }),
            }),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.lock().state
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Begin connecting in the background. No-op while connecting, connected, or waiting
    /// to reconnect.
    pub fn start(&self, endpoint: impl Into<String>, reconnect_delay_seconds: u64) {
        let mut shared = self.inner.lock();
        if shared.state != ConnectionState::Disconnected || shared.reconnect_task.is_some() {
            log::debug!("relay: start ignored, link is {:?}", shared.state);
            return;
        }
        shared.endpoint = endpoint.into();
        shared.reconnect_delay = Duration::from_secs(reconnect_delay_seconds);
        shared.stopped = false;
        shared.generation += 1;
        self.inner.spawn_link(&mut shared);
    }

    /// Queue one frame for the gateway. Fails fast with `NotConnected` unless connected.
    pub fn send(&self, message: &RelayMessage) -> Result<(), SendError> {
        let shared = self.inner.lock();
        if shared.state != ConnectionState::Connected {
            return Err(SendError::NotConnected);
        }
        let outbound = shared.outbound.as_ref().ok_or(SendError::NotConnected)?;
        let text = message.to_wire()?;
        outbound
            .send(Outbound::Frame(text))
            .map_err(|_| SendError::NotConnected)
    }

    /// Close the link and cancel any scheduled reconnect. Safe to call repeatedly or
    /// before `start`.
    pub async fn stop(&self) {
        let (outbound, link_task) = {
            let mut shared = self.inner.lock();
            shared.stopped = true;
            shared.generation += 1;
            shared.state = ConnectionState::Disconnected;
            if let Some(task) = shared.reconnect_task.take() {
                task.abort();
            }
            (shared.outbound.take(), shared.link_task.take())
        };
        let Some(mut task) = link_task else {
            return;
        };
        match outbound {
            Some(tx) if tx.send(Outbound::Close).is_ok() => {
                if tokio::time::timeout(CLOSE_TIMEOUT, &mut task).await.is_err() {
                    log::warn!(
                        "relay: link did not close within {}s, aborting",
                        CLOSE_TIMEOUT.as_secs()
                    );
                    task.abort();
                }
            }
            // still connecting, or already gone
            _ => task.abort(),
        }
        log::info!("relay: stopped");
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn spawn_link(self: &Arc<Self>, shared: &mut Shared) {
        shared.state = ConnectionState::Connecting;
        let inner = Arc::clone(self);
        let generation = shared.generation;
        let endpoint = shared.endpoint.clone();
        shared.link_task = Some(
            self.runtime
                .spawn(async move { run_link(inner, generation, endpoint).await }),
        );
    }

    /// Record a fresh link. Returns false when the manager was stopped or restarted meanwhile.
    fn link_up(&self, generation: u64, outbound: mpsc::UnboundedSender<Outbound>) -> bool {
        let mut shared = self.lock();
        if shared.stopped || shared.generation != generation {
            return false;
        }
        shared.state = ConnectionState::Connected;
        shared.outbound = Some(outbound);
        true
    }

    /// Enter `Disconnected` and schedule exactly one reconnect after the fixed delay.
    fn link_lost(self: &Arc<Self>, generation: u64) {
        let mut shared = self.lock();
        if shared.stopped || shared.generation != generation {
            return;
        }
        shared.state = ConnectionState::Disconnected;
        shared.outbound = None;
        let delay = shared.reconnect_delay;
        log::info!("relay: reconnecting in {}s", delay.as_secs());
        let inner = Arc::clone(self);
        shared.reconnect_task = Some(self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            inner.reconnect(generation);
        }));
    }

    fn reconnect(self: &Arc<Self>, generation: u64) {
        let mut shared = self.lock();
        if shared.stopped
            || shared.generation != generation
            || shared.state != ConnectionState::Disconnected
        {
            return;
        }
        shared.reconnect_task = None;
        self.spawn_link(&mut shared);
    }
}

async fn run_link(inner: Arc<Inner>, generation: u64, endpoint: String) {
    log::info!("relay: connecting to {}", endpoint);
    let mut transport = match inner.connector.connect(&endpoint).await {
        Ok(transport) => transport,
        Err(e) => {
            log::warn!("relay: {}", e);
            inner.link_lost(generation);
            return;
        }
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    if !inner.link_up(generation, tx) {
        let _ = transport.close().await;
        return;
    }
    log::info!("relay: connected to {}", endpoint);

    loop {
        tokio::select! {
            frame = transport.next_text() => match frame {
                Some(Ok(text)) => (inner.on_message)(text),
                Some(Err(e)) => {
                    log::warn!("relay: link error: {}", e);
                    break;
                }
                None => {
                    log::warn!("relay: link closed by gateway");
                    break;
                }
            },
            out = rx.recv() => match out {
                Some(Outbound::Frame(text)) => {
                    if let Err(e) = transport.send_text(text).await {
                        log::warn!("relay: send failed: {}", e);
                        break;
                    }
                }
                Some(Outbound::Close) | None => {
                    if let Err(e) = transport.close().await {
                        log::debug!("relay: close failed: {}", e);
                    }
                    return;
                }
            },
        }
    }
    inner.link_lost(generation);
}
