//! Relay core: the gateway connection and the wire translation.
//!
//! One persistent link per process. Frames are single JSON objects; see `protocol`.
//! The connection reconnects on a fixed delay and drops traffic while it is down.

mod color;
mod connection;
mod protocol;
mod websocket;

pub use color::{color_tags, ColorStyle, DisplayColor};
pub use connection::{
    ConnectError, ConnectionManager, ConnectionState, Connector, MessageHandler, SendError,
    Transport, TransportError,
};
pub use protocol::{
    decode_inbound, encode_outbound, format_for_display, DecodeError, DisplayFormatter,
    RelayMessage,
};
pub use websocket::WebSocketConnector;
