mod console;

use clap::{Parser, Subcommand};
use console::ConsoleInput;
use mcbridge::bridge::Bridge;
use mcbridge::host::ChannelSink;
use mcbridge::relay::WebSocketConnector;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "mc-bridge")]
#[command(about = "Minecraft to Discord chat bridge", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a default config.json.
    Init {
        /// Config file path (default: BRIDGE_CONFIG_PATH or ~/.mc-bridge/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Run the bridge with this terminal as the game host. Lines typed here are relayed as
    /// chat (or events, see /help); gateway messages are printed.
    Run {
        /// Config file path (default: BRIDGE_CONFIG_PATH or ~/.mc-bridge/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// Gateway URL (overrides websocket.url and BRIDGE_WEBSOCKET_URL)
        #[arg(long, short, value_name = "URL")]
        url: Option<String>,

        /// Player name for plain chat lines
        #[arg(long, short, default_value = "Console")]
        name: String,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("mc-bridge {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Run { config, url, name }) => {
            if let Err(e) = run_bridge(config, url, name).await {
                log::error!("bridge failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(mcbridge::config::default_config_path);
    let dir = mcbridge::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

async fn run_bridge(
    config_path: Option<std::path::PathBuf>,
    url: Option<String>,
    name: String,
) -> anyhow::Result<()> {
    let (config, path) = mcbridge::config::load_config(config_path)?;
    log::info!("using config {}", path.display());

    let (sink, mut lines) = ChannelSink::new();
    let mut bridge = Bridge::new(&config, Arc::new(WebSocketConnector), Arc::new(sink));
    if let Some(url) = url {
        bridge = bridge.with_endpoint(url);
    }
    log::info!("relaying to {}", bridge.endpoint());
    bridge.start();

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some(line) = lines.recv() => println!("{}", line),
            input = stdin.next_line() => {
                let Some(input) = input? else { break };
                match console::parse_line(&input, &name) {
                    ConsoleInput::Event(event) => {
                        if let Err(e) = bridge.forward(&event) {
                            eprintln!("not relayed: {}", e);
                        }
                    }
                    ConsoleInput::Quit => break,
                    ConsoleInput::Usage(help) => eprintln!("{}", help),
                    ConsoleInput::Empty => {}
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    bridge.stop().await;
    Ok(())
}
