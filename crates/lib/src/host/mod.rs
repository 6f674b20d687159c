//! Host side of the bridge: game events in, formatted lines out.
//!
//! The game server is a collaborator; the bridge only needs events reduced to
//! `HostEvent` and somewhere to broadcast display text.

mod events;
mod sink;

pub use events::{EventMapper, HostEvent};
pub use sink::{ChannelSink, DisplaySink};
