//! Live-update subscription.
//!
//! Wraps a websocket client in an iced subscription stream. A dropped or
//! refused connection is re-dialed with capped exponential backoff, and the
//! UI is told about every state change.

use std::sync::OnceLock;
use std::time::Duration;

use iced::futures::channel::mpsc;
use iced::futures::{SinkExt, Stream, StreamExt};
use iced::{stream, Subscription};
use log::{info, warn};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

static SERVER: OnceLock<String> = OnceLock::new();

/// Records the feed server base URL before the subscription first runs.
pub fn set_server(base: &str) {
    let _ = SERVER.set(base.trim_end_matches('/').to_string());
}

#[derive(Debug, Clone)]
pub enum FeedEvent {
    Connected,
    Disconnected,
    /// One raw text frame, handed to the dispatcher undecoded.
    Frame(String),
}

pub fn subscription() -> Subscription<FeedEvent> {
    Subscription::run(feed_stream)
}

/// `http` upgrades to `ws`, `https` to `wss`: a TLS-served feed keeps its
/// transport encrypted.
fn ws_url(base: &str) -> String {
    if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}/ws")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}/ws")
    } else {
        format!("ws://{base}/ws")
    }
}

fn feed_stream() -> impl Stream<Item = FeedEvent> {
    stream::channel(100, |mut output: mpsc::Sender<FeedEvent>| async move {
        let base = SERVER
            .get()
            .map(String::as_str)
            .unwrap_or("http://127.0.0.1:12345");
        let url = ws_url(base);
        let mut backoff = INITIAL_BACKOFF;

        loop {
            match connect_async(url.as_str()).await {
                Ok((socket, _)) => {
                    info!("feed connected: {url}");
                    backoff = INITIAL_BACKOFF;
                    let _ = output.send(FeedEvent::Connected).await;

                    let (_write, mut read) = socket.split();
                    while let Some(item) = read.next().await {
                        match item {
                            Ok(tungstenite::Message::Text(frame)) => {
                                let _ = output.send(FeedEvent::Frame(frame.to_string())).await;
                            }
                            Ok(tungstenite::Message::Close(_)) => break,
                            Ok(_) => continue,
                            Err(err) => {
                                warn!("feed read error: {err}");
                                break;
                            }
                        }
                    }

                    let _ = output.send(FeedEvent::Disconnected).await;
                }
                Err(err) => {
                    warn!("feed connect failed ({url}): {err}");
                    let _ = output.send(FeedEvent::Disconnected).await;
                }
            }

            tokio::time::sleep(backoff).await;
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_url_upgrades_scheme_with_page_protocol() {
        assert_eq!(ws_url("http://127.0.0.1:12345"), "ws://127.0.0.1:12345/ws");
        assert_eq!(ws_url("https://sky.example"), "wss://sky.example/ws");
        assert_eq!(ws_url("127.0.0.1:12345"), "ws://127.0.0.1:12345/ws");
    }
}
