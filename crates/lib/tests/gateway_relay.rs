//! Integration tests: run a local WebSocket gateway on a free port and relay through it.

use futures_util::{SinkExt, StreamExt};
use mcbridge::bridge::Bridge;
use mcbridge::config::Config;
use mcbridge::host::{ChannelSink, HostEvent};
use mcbridge::relay::{ConnectionState, RelayMessage, WebSocketConnector};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

async fn gateway_listener() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind free port");
    let port = listener.local_addr().expect("local_addr").port();
    (listener, format!("ws://127.0.0.1:{}", port))
}

fn config_for(url: &str, reconnect_delay: u64) -> Config {
    let mut config = Config::default();
    config.websocket.url = url.to_string();
    config.websocket.reconnect_delay = reconnect_delay;
    config
}

async fn wait_for_state(bridge: &Bridge, want: ConnectionState) {
    for _ in 0..250 {
        if bridge.state() == want {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("bridge did not reach {:?}, still {:?}", want, bridge.state());
}

#[tokio::test]
async fn relays_both_directions() {
    let (listener, url) = gateway_listener().await;
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel::<String>();
    let gateway = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let mut ws = tokio_tungstenite::accept_async(stream).await.expect("handshake");
        while let Some(Ok(msg)) = ws.next().await {
            if let Message::Text(text) = msg {
                seen_tx.send(text).expect("test alive");
                ws.send(Message::Text(
                    r#"{"username":"Bob","userColor":"red","content":"yo"}"#.to_string(),
                ))
                .await
                .expect("reply");
            }
        }
    });

    let (sink, mut lines) = ChannelSink::new();
    let bridge = Bridge::new(
        &config_for(&url, 5),
        Arc::new(WebSocketConnector),
        Arc::new(sink),
    );
    assert_eq!(bridge.state(), ConnectionState::Disconnected);
    bridge.start();
    assert_eq!(bridge.state(), ConnectionState::Connecting);
    wait_for_state(&bridge, ConnectionState::Connected).await;

    bridge
        .send(&RelayMessage::new("Alice", "", "hi"))
        .expect("connected send");
    let sent = tokio::time::timeout(Duration::from_secs(5), seen_rx.recv())
        .await
        .expect("gateway saw frame")
        .expect("gateway alive");
    assert_eq!(sent, r#"{"username":"Alice","avatarURL":"","content":"hi"}"#);

    let line = tokio::time::timeout(Duration::from_secs(5), lines.recv())
        .await
        .expect("inbound line")
        .expect("sink alive");
    assert_eq!(line, "<RED>Bob<RESET>: yo");

    bridge.stop().await;
    assert_eq!(bridge.state(), ConnectionState::Disconnected);
    tokio::time::timeout(Duration::from_secs(5), gateway)
        .await
        .expect("gateway saw close")
        .expect("gateway task");
}

#[tokio::test]
async fn host_events_reach_the_gateway() {
    let (listener, url) = gateway_listener().await;
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel::<String>();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let mut ws = tokio_tungstenite::accept_async(stream).await.expect("handshake");
        while let Some(Ok(Message::Text(text))) = ws.next().await {
            let _ = seen_tx.send(text);
        }
    });

    let (sink, _lines) = ChannelSink::new();
    let bridge = Bridge::new(
        &config_for(&url, 5),
        Arc::new(WebSocketConnector),
        Arc::new(sink),
    );
    bridge.start();
    wait_for_state(&bridge, ConnectionState::Connected).await;

    bridge
        .forward(&HostEvent::PlayerJoined {
            player: "Steve".into(),
        })
        .unwrap();
    bridge
        .forward(&HostEvent::Chat {
            player: "Steve".into(),
            message: "hello".into(),
        })
        .unwrap();

    let mut frames = Vec::new();
    for _ in 0..2 {
        let frame = tokio::time::timeout(Duration::from_secs(5), seen_rx.recv())
            .await
            .expect("frame")
            .expect("gateway alive");
        frames.push(serde_json::from_str::<serde_json::Value>(&frame).unwrap());
    }
    assert_eq!(frames[0]["username"], "Server");
    assert_eq!(frames[0]["content"], "Steve joined the server");
    assert_eq!(frames[1]["username"], "Steve");
    assert_eq!(frames[1]["avatarURL"], "https://mc-heads.net/avatar/Steve");
    assert_eq!(frames[1]["content"], "hello");
    assert!(frames[1].get("userColor").is_none());

    bridge.stop().await;
}

#[tokio::test]
async fn reconnects_after_gateway_drops_link() {
    let (listener, url) = gateway_listener().await;
    let (accepted_tx, mut accepted_rx) = mpsc::unbounded_channel::<usize>();
    tokio::spawn(async move {
        for n in 1.. {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
                continue;
            };
            let _ = accepted_tx.send(n);
            if n == 1 {
                let _ = ws.close(None).await;
            } else {
                while let Some(Ok(_)) = ws.next().await {}
            }
        }
    });

    let (sink, _lines) = ChannelSink::new();
    let bridge = Bridge::new(
        &config_for(&url, 0),
        Arc::new(WebSocketConnector),
        Arc::new(sink),
    );
    bridge.start();

    for expected in 1..=2 {
        let n = tokio::time::timeout(Duration::from_secs(5), accepted_rx.recv())
            .await
            .expect("accept")
            .expect("gateway alive");
        assert_eq!(n, expected);
    }
    wait_for_state(&bridge, ConnectionState::Connected).await;
    bridge.stop().await;
    assert_eq!(bridge.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn unreachable_gateway_is_not_fatal() {
    let url = {
        let (listener, url) = gateway_listener().await;
        drop(listener);
        url
    };
    let (sink, _lines) = ChannelSink::new();
    let bridge = Bridge::new(
        &config_for(&url, 1),
        Arc::new(WebSocketConnector),
        Arc::new(sink),
    );
    bridge.start();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_ne!(bridge.state(), ConnectionState::Connected);
    assert!(bridge.send(&RelayMessage::new("Alice", "", "hi")).is_err());
    bridge.stop().await;
    assert_eq!(bridge.state(), ConnectionState::Disconnected);
}
