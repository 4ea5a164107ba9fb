//! Feed counters surfaced in the visualizer status line.
//!
//! Malformed frames are discarded without logging (the feed is noisy by
//! nature); the counters are the only trace they leave.

#[derive(Debug, Default, Clone, Copy)]
pub struct FeedMetrics {
    received: usize,
    accepted: usize,
    discarded: usize,
    drawn: usize,
}

impl FeedMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_received(&mut self) {
        self.received += 1;
    }

    pub fn record_accepted(&mut self) {
        self.accepted += 1;
    }

    pub fn record_discarded(&mut self) {
        self.discarded += 1;
    }

    pub fn record_drawn(&mut self, count: usize) {
        self.drawn += count;
    }

    pub fn received(&self) -> usize {
        self.received
    }

    pub fn accepted(&self) -> usize {
        self.accepted
    }

    pub fn discarded(&self) -> usize {
        self.discarded
    }

    pub fn drawn(&self) -> usize {
        self.drawn
    }
}
