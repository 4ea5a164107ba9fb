use crate::prelude::PointRecord;

/// Append-only store of every position report seen this session.
///
/// Insertion order is arrival order and nothing is ever removed; the overlay
/// replays the store front to back on every full redraw.
#[derive(Debug, Default)]
pub struct HistoryStore {
    records: Vec<PointRecord>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: PointRecord) {
        self.records.push(record);
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = PointRecord>) {
        self.records.extend(records);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PointRecord> {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_keeps_arrival_order() {
        let mut store = HistoryStore::new();
        store.extend(vec![
            PointRecord::new("AA1111", 41.70, 44.78),
            PointRecord::new("BB2222", 41.71, 44.79),
        ]);
        store.push(PointRecord::new("AA1111", 41.72, 44.80));

        let codes: Vec<_> = store.iter().map(|r| r.mode_s.as_str()).collect();
        assert_eq!(codes, ["AA1111", "BB2222", "AA1111"]);
        assert_eq!(store.len(), 3);
    }
}
