//! HTTP surface of the feed stand-in.
//!
//! Mirrors the upstream collaborators the visualizer expects: a one-shot
//! `GET /points_history` snapshot and a `GET /ws` websocket that pushes one
//! JSON text frame per position update. Fan-out uses a watch channel, so a
//! slow client only ever sees the newest update.

use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

use futures_util::{SinkExt, StreamExt};
use log::{info, warn};
use tokio::sync::watch;
use trailcore::feed::encode_update;
use trailcore::prelude::PointRecord;
use warp::ws::{Message, WebSocket};
use warp::Filter;

/// Ring capacity of the history snapshot, matching the upstream server.
pub const POINTS_HISTORY_LIMIT: usize = 80_000;

#[derive(Clone)]
pub struct FeedState {
    points_seen: Arc<RwLock<VecDeque<PointRecord>>>,
    sender: Arc<watch::Sender<String>>,
}

impl FeedState {
    pub fn new() -> Self {
        let (sender, _receiver) = watch::channel(String::new());
        Self {
            points_seen: Arc::new(RwLock::new(VecDeque::with_capacity(POINTS_HISTORY_LIMIT))),
            sender: Arc::new(sender),
        }
    }

    /// Records a report in the bounded ring and fans it out to every
    /// connected websocket.
    pub fn publish(&self, record: PointRecord) {
        let frame = match encode_update(&record) {
            Ok(frame) => frame,
            Err(err) => {
                warn!("dropping unencodable report: {err}");
                return;
            }
        };

        {
            let mut points = self.points_seen.write().expect("points lock poisoned");
            points.push_back(record);
            while points.len() > POINTS_HISTORY_LIMIT {
                points.pop_front();
            }
        }

        self.sender.send_replace(frame);
    }

    fn history_snapshot(&self) -> Vec<(String, (f64, f64))> {
        self.points_seen
            .read()
            .expect("points lock poisoned")
            .iter()
            .map(|record| {
                (
                    record.mode_s.clone(),
                    (record.position.lat, record.position.lon),
                )
            })
            .collect()
    }

    #[cfg(test)]
    pub fn history_len(&self) -> usize {
        self.points_seen.read().unwrap().len()
    }
}

impl Default for FeedState {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the two feed routes.
pub fn routes(
    state: FeedState,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let history_state = state.clone();
    let history = warp::path("points_history")
        .and(warp::get())
        .map(move || warp::reply::json(&history_state.history_snapshot()));

    let ws_state = state;
    let ws = warp::path("ws")
        .and(warp::ws())
        .map(move |upgrade: warp::ws::Ws| {
            let receiver = ws_state.sender.subscribe();
            upgrade.on_upgrade(move |socket| push_updates(socket, receiver))
        });

    history.or(ws)
}

/// Per-connection push loop; ends when the client goes away or a send fails.
async fn push_updates(socket: WebSocket, mut receiver: watch::Receiver<String>) {
    info!("websocket client connected");
    let (mut tx, mut rx) = socket.split();

    loop {
        tokio::select! {
            changed = receiver.changed() => {
                if changed.is_err() {
                    break;
                }
                let frame = receiver.borrow_and_update().clone();
                if frame.is_empty() {
                    continue;
                }
                if let Err(err) = tx.send(Message::text(frame)).await {
                    warn!("websocket send failed: {err}");
                    break;
                }
            }
            inbound = rx.next() => {
                // The feed is push-only; any inbound close (or error) ends
                // the connection.
                match inbound {
                    Some(Ok(message)) if !message.is_close() => continue,
                    _ => break,
                }
            }
        }
    }

    info!("websocket client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_bounds_the_history_ring() {
        let state = FeedState::new();
        for i in 0..POINTS_HISTORY_LIMIT + 10 {
            state.publish(PointRecord::new(format!("A{i:05X}"), 41.7, 44.78));
        }
        assert_eq!(state.history_len(), POINTS_HISTORY_LIMIT);
    }

    #[test]
    fn snapshot_is_wire_shaped() {
        let state = FeedState::new();
        state.publish(PointRecord::new("AA1111", 41.70, 44.78));
        let snapshot = state.history_snapshot();
        assert_eq!(snapshot, vec![("AA1111".to_string(), (41.70, 44.78))]);

        let json = serde_json::to_string(&snapshot).unwrap();
        let decoded = trailcore::feed::decode_history(&json).unwrap();
        assert_eq!(decoded[0].mode_s, "AA1111");
    }

    #[tokio::test]
    async fn history_route_serves_json_snapshot() {
        let state = FeedState::new();
        state.publish(PointRecord::new("BB2222", 41.71, 44.79));

        let reply = warp::test::request()
            .method("GET")
            .path("/points_history")
            .reply(&routes(state))
            .await;

        assert_eq!(reply.status(), 200);
        let records =
            trailcore::feed::decode_history(std::str::from_utf8(reply.body()).unwrap()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].mode_s, "BB2222");
    }
}
