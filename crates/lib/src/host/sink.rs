//! Display sink: where formatted inbound lines go.

use tokio::sync::mpsc;

/// Accepts pre-formatted lines for broadcast on the host.
pub trait DisplaySink: Send + Sync {
    fn broadcast(&self, line: String);
}

impl<F> DisplaySink for F
where
    F: Fn(String) + Send + Sync,
{
    fn broadcast(&self, line: String) {
        self(line)
    }
}

/// Hands lines to the host's own loop over a channel, so broadcast happens on the host's
/// thread rather than the connection task.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl DisplaySink for ChannelSink {
    fn broadcast(&self, line: String) {
        if self.tx.send(line).is_err() {
            log::debug!("display sink closed, dropping line");
        }
    }
}
