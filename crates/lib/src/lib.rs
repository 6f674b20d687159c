//! mc-bridge core library: relays Minecraft chat and events to a Discord-facing gateway
//! over one WebSocket link, and broadcasts gateway messages back to the game.

pub mod bridge;
pub mod config;
pub mod host;
pub mod init;
pub mod relay;
