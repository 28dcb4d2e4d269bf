//! Minimal terminal chat client driving the realtime channel.
//!
//! Connects to a chat room endpoint, prints inbound frames and peer-call
//! signals, and sends each stdin line as a chat message. Type `/quit` to
//! exit.
//!
//! ```sh
//! cargo run --example chat_client -- ws://127.0.0.1:8000/ws/chat/lobby/
//! ```

use std::sync::Arc;
use std::time::Duration;

use teamdesk_realtime::{bus, ChannelCallbacks, ChannelConfig, Frame, RealtimeChannel};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "teamdesk_realtime=info".into()),
        )
        .init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "ws://127.0.0.1:8000/ws/chat/lobby/".to_string());

    let callbacks = ChannelCallbacks::new()
        .with_on_open(|| println!("* connected"))
        .with_on_close(|| println!("* disconnected"))
        .with_on_message(|frame| println!("<- [{}] {:?}", frame.frame_type, frame.fields));

    let config = ChannelConfig::new(url).with_ping_interval(Duration::from_secs(15));
    let channel = RealtimeChannel::new(config, Arc::new(callbacks))?;
    channel.open();

    // Peer-call signals arrive on the process-wide bus, independent of the
    // channel handle — this is how the call UI subscribes too.
    let mut signals = bus::subscribe_call_signals();
    tokio::spawn(async move {
        while let Ok(signal) = signals.recv().await {
            println!("** call signal: {} from {}", signal.signal_type, signal.user_id);
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line == "/quit" {
            break;
        }
        let frame = Frame::new("chat_message").with_field("text", line);
        if let Err(e) = channel.send(&frame).await {
            eprintln!("send failed: {}", e);
        }
    }

    channel.close();
    Ok(())
}
