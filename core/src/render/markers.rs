use std::time::{Duration, Instant};

use crate::prelude::GeoPoint;

/// How long a freshly received point stays highlighted.
pub const MARKER_TTL: Duration = Duration::from_millis(1000);

/// Short-lived highlight anchored to a geographic coordinate.
///
/// Markers are decorative: they carry no state the history does not already
/// hold, and they are re-projected every frame so the host keeps them in
/// place while the view moves.
#[derive(Debug, Clone, Copy)]
pub struct Marker {
    pub position: GeoPoint,
    expires_at: Instant,
}

#[derive(Debug, Default)]
pub struct MarkerSet {
    markers: Vec<Marker>,
}

impl MarkerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, position: GeoPoint, now: Instant) {
        self.markers.push(Marker {
            position,
            expires_at: now + MARKER_TTL,
        });
    }

    /// Drops every marker whose lifetime has elapsed.
    pub fn prune(&mut self, now: Instant) {
        self.markers.retain(|marker| marker.expires_at > now);
    }

    pub fn active(&self, now: Instant) -> impl Iterator<Item = &Marker> {
        self.markers
            .iter()
            .filter(move |marker| marker.expires_at > now)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_expires_after_its_ttl() {
        let mut set = MarkerSet::new();
        let start = Instant::now();
        set.spawn(GeoPoint::new(41.70, 44.78), start);

        assert_eq!(set.active(start).count(), 1);
        assert_eq!(set.active(start + MARKER_TTL).count(), 0);
    }

    #[test]
    fn prune_drops_only_expired_markers() {
        let mut set = MarkerSet::new();
        let start = Instant::now();
        set.spawn(GeoPoint::new(41.70, 44.78), start);
        set.spawn(GeoPoint::new(41.71, 44.79), start + Duration::from_millis(600));

        set.prune(start + Duration::from_millis(1100));
        assert_eq!(set.len(), 1);
        set.prune(start + Duration::from_millis(1700));
        assert!(set.is_empty());
    }
}
