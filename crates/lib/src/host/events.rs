//! Host game events and their outbound relay lines.

use crate::config::{Config, FeaturesConfig, IdentityConfig};
use crate::relay::RelayMessage;

/// A game event the host hands to the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Chat { player: String, message: String },
    PlayerJoined { player: String },
    PlayerLeft { player: String },
    /// `death_message` is the host's rendered message; hosts may have none.
    PlayerDied {
        player: String,
        death_message: Option<String>,
    },
    /// `title` is `None` for advancements without a display (recipes, hidden roots).
    AdvancementDone {
        player: String,
        title: Option<String>,
    },
}

/// Maps host events to relay lines, applying feature toggles and identity settings.
#[derive(Debug, Clone)]
pub struct EventMapper {
    features: FeaturesConfig,
    identity: IdentityConfig,
}

impl EventMapper {
    pub fn new(features: FeaturesConfig, identity: IdentityConfig) -> Self {
        Self { features, identity }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.features, config.identity.clone())
    }

    /// The line to relay for `event`, or `None` when the event is switched off or has
    /// nothing to show.
    pub fn map(&self, event: &HostEvent) -> Option<RelayMessage> {
        match event {
            HostEvent::Chat { player, message } => Some(RelayMessage::new(
                player.as_str(),
                self.player_avatar(player),
                message.as_str(),
            )),
            HostEvent::PlayerJoined { player } => {
                if !self.features.join_leave_messages {
                    return None;
                }
                Some(self.server_line(format!("{} joined the server", player)))
            }
            HostEvent::PlayerLeft { player } => {
                if !self.features.join_leave_messages {
                    return None;
                }
                Some(self.server_line(format!("{} left the server", player)))
            }
            HostEvent::PlayerDied { death_message, .. } => {
                if !self.features.death_messages {
                    return None;
                }
                let text = death_message.as_deref().filter(|m| !m.is_empty())?;
                Some(self.server_line(text))
            }
            HostEvent::AdvancementDone { player, title } => {
                if !self.features.advancements {
                    return None;
                }
                let title = title.as_deref()?;
                Some(RelayMessage::new(
                    player.as_str(),
                    self.player_avatar(player),
                    format!("{} has made the advancement [{}]", player, title),
                ))
            }
        }
    }

    fn player_avatar(&self, player: &str) -> String {
        format!("{}{}", self.identity.player_avatar_base_url, player)
    }

    fn server_line(&self, content: impl Into<String>) -> RelayMessage {
        RelayMessage::new(
            self.identity.server_name.as_str(),
            self.identity.server_avatar_url.as_str(),
            content,
        )
    }
}
