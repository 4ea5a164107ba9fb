//! Event dispatcher and owned application state.
//!
//! All map, history, and render state lives in one explicit state object
//! with a single `handle` entry point, so every handler can be exercised
//! deterministically without a window, a socket, or a timer.

use std::time::Instant;

use log::{debug, info};

use crate::feed::{decode_update, HistoryStore};
use crate::map::{MapHost, Viewport, WebMercatorMap};
use crate::prelude::PointRecord;
use crate::render::{MarkerSet, OverlayCanvas};
use crate::telemetry::FeedMetrics;

/// Logical pixels moved per arrow-key press.
const PAN_STEP: f32 = 64.0;

/// Keyboard input relevant to the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Character(char),
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Escape,
}

/// Everything that can happen to the application, in one place.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The one-time `/points_history` fetch resolved.
    HistoryLoaded(Vec<PointRecord>),
    /// The window changed size (orientation changes arrive the same way).
    Resized { width: f32, height: f32 },
    /// The view transform changed without a size change.
    ViewportMoved,
    /// One raw text frame from the push socket.
    MessageReceived(String),
    KeyPressed(KeyInput),
    /// Periodic housekeeping; expires transient markers.
    Tick,
}

pub struct TrailApp {
    map: WebMercatorMap,
    overlay: OverlayCanvas,
    history: HistoryStore,
    markers: MarkerSet,
    metrics: FeedMetrics,
    /// Live records that arrived before the history fetch resolved; replayed
    /// after the fetched prefix so arrival order is preserved.
    pending: Vec<PointRecord>,
    ready: bool,
    camera_open: bool,
}

impl TrailApp {
    /// Center is longitude-first, matching the map configuration convention;
    /// the wire format is latitude-first.
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, viewport: Viewport) -> Self {
        let map = WebMercatorMap::new(center_lon, center_lat, zoom, viewport);
        let overlay = OverlayCanvas::new(map.viewport());
        Self {
            map,
            overlay,
            history: HistoryStore::new(),
            markers: MarkerSet::new(),
            metrics: FeedMetrics::new(),
            pending: Vec::new(),
            ready: false,
            camera_open: false,
        }
    }

    pub fn map(&self) -> &WebMercatorMap {
        &self.map
    }

    pub fn overlay(&self) -> &OverlayCanvas {
        &self.overlay
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    pub fn metrics(&self) -> &FeedMetrics {
        &self.metrics
    }

    /// History fetch resolved; nothing is drawn before this.
    pub fn ready(&self) -> bool {
        self.ready
    }

    pub fn camera_open(&self) -> bool {
        self.camera_open
    }

    pub fn close_camera(&mut self) {
        self.camera_open = false;
    }

    pub fn handle(&mut self, event: AppEvent, now: Instant) {
        match event {
            AppEvent::HistoryLoaded(records) => self.on_history_loaded(records, now),
            AppEvent::Resized { width, height } => self.on_resized(width, height),
            AppEvent::ViewportMoved => self.redraw(),
            AppEvent::MessageReceived(frame) => self.on_message(&frame, now),
            AppEvent::KeyPressed(key) => self.on_key(key),
            AppEvent::Tick => self.markers.prune(now),
        }
    }

    fn on_history_loaded(&mut self, records: Vec<PointRecord>, now: Instant) {
        info!(
            "history loaded: {} records ({} live arrived early)",
            records.len(),
            self.pending.len()
        );
        self.history.extend(records);
        for record in std::mem::take(&mut self.pending) {
            self.markers.spawn(record.position, now);
            self.history.push(record);
        }
        self.ready = true;
        self.redraw();
    }

    fn on_resized(&mut self, width: f32, height: f32) {
        let scale = self.map.viewport().scale;
        self.map.set_viewport(Viewport::new(width, height, scale));
        self.redraw();
    }

    fn on_message(&mut self, frame: &str, now: Instant) {
        self.metrics.record_received();
        let Some(record) = decode_update(frame) else {
            self.metrics.record_discarded();
            return;
        };
        self.metrics.record_accepted();

        if !self.ready {
            self.pending.push(record);
            return;
        }

        // Incremental draw: the viewport has not changed, so replaying the
        // whole history would buy nothing.
        if self.overlay.draw_point(&self.map, &record) {
            self.metrics.record_drawn(1);
        }
        self.markers.spawn(record.position, now);
        self.history.push(record);
    }

    fn on_key(&mut self, key: KeyInput) {
        match key {
            KeyInput::Character('c') => {
                debug!("camera view opened");
                self.camera_open = true;
            }
            KeyInput::Escape => self.camera_open = false,
            KeyInput::ArrowUp => self.pan(0.0, -PAN_STEP),
            KeyInput::ArrowDown => self.pan(0.0, PAN_STEP),
            KeyInput::ArrowLeft => self.pan(-PAN_STEP, 0.0),
            KeyInput::ArrowRight => self.pan(PAN_STEP, 0.0),
            KeyInput::Character('+') | KeyInput::Character('=') => {
                self.map.zoom_in();
                self.redraw();
            }
            KeyInput::Character('-') => {
                self.map.zoom_out();
                self.redraw();
            }
            KeyInput::Character(_) => {}
        }
    }

    fn pan(&mut self, dx: f32, dy: f32) {
        self.map.pan_by(dx, dy);
        self.redraw();
    }

    fn redraw(&mut self) {
        if !self.ready {
            return;
        }
        let drawn = self.overlay.redraw_all(&self.map, &self.history);
        self.metrics.record_drawn(drawn);
    }
}
