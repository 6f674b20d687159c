//! Console host: turns stdin lines into host events.

use mcbridge::host::HostEvent;

#[derive(Debug, PartialEq, Eq)]
pub enum ConsoleInput {
    Event(HostEvent),
    Quit,
    Empty,
    Usage(&'static str),
}

pub const HELP: &str = "commands: /join NAME, /leave NAME, /death NAME MESSAGE, \
/advancement NAME TITLE, /as NAME TEXT, /quit; anything else is chat";

/// Parse one console line. Plain text is chat from `console_name`.
pub fn parse_line(line: &str, console_name: &str) -> ConsoleInput {
    let line = line.trim();
    if line.is_empty() {
        return ConsoleInput::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return ConsoleInput::Event(HostEvent::Chat {
            player: console_name.to_string(),
            message: line.to_string(),
        });
    };

    let (name, rest) = split_word(command);
    let (player, text) = split_word(rest);
    match name.to_ascii_lowercase().as_str() {
        "quit" | "exit" => ConsoleInput::Quit,
        "join" if !player.is_empty() => ConsoleInput::Event(HostEvent::PlayerJoined {
            player: player.to_string(),
        }),
        "leave" if !player.is_empty() => ConsoleInput::Event(HostEvent::PlayerLeft {
            player: player.to_string(),
        }),
        "death" if !player.is_empty() => ConsoleInput::Event(HostEvent::PlayerDied {
            player: player.to_string(),
            death_message: Some(text.to_string()).filter(|t| !t.is_empty()),
        }),
        "advancement" if !player.is_empty() => ConsoleInput::Event(HostEvent::AdvancementDone {
            player: player.to_string(),
            title: Some(text.to_string()).filter(|t| !t.is_empty()),
        }),
        "as" if !player.is_empty() && !text.is_empty() => ConsoleInput::Event(HostEvent::Chat {
            player: player.to_string(),
            message: text.to_string(),
        }),
        _ => ConsoleInput::Usage(HELP),
    }
}

fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (s, ""),
    }
}
