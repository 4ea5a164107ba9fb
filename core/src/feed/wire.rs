//! Wire format shared with the feed server.
//!
//! A position report travels as a two-element JSON array:
//! `["<mode_s>", [lat, lon]]`. The `/points_history` endpoint returns a JSON
//! array of the same shape. Latitude comes first on the wire.

use crate::prelude::{FeedError, FeedResult, PointRecord};

/// Serde-facing shape of one wire point.
type WirePoint = (String, (f64, f64));

fn from_wire((mode_s, (lat, lon)): WirePoint) -> PointRecord {
    PointRecord::new(mode_s, lat, lon)
}

/// Decodes one live push frame.
///
/// Anything that is not a well-formed two-element array with finite numeric
/// coordinates is discarded: the feed is best-effort and a bad frame must
/// never take the renderer down.
pub fn decode_update(frame: &str) -> Option<PointRecord> {
    let wire: WirePoint = serde_json::from_str(frame).ok()?;
    let record = from_wire(wire);
    if record.position.is_finite() {
        Some(record)
    } else {
        None
    }
}

/// Decodes the initial `/points_history` response.
///
/// The payload as a whole must parse; individual records with non-finite
/// coordinates are dropped while the rest are kept in arrival order.
pub fn decode_history(payload: &str) -> FeedResult<Vec<PointRecord>> {
    let wire: Vec<WirePoint> = serde_json::from_str(payload)
        .map_err(|err| FeedError::MalformedHistory(err.to_string()))?;

    Ok(wire
        .into_iter()
        .map(from_wire)
        .filter(|record| record.position.is_finite())
        .collect())
}

/// Encodes a record the way the upstream server does, one frame per report.
pub fn encode_update(record: &PointRecord) -> FeedResult<String> {
    if !record.position.is_finite() {
        return Err(FeedError::NonFiniteCoordinate(record.mode_s.clone()));
    }
    let wire: WirePoint = (
        record.mode_s.clone(),
        (record.position.lat, record.position.lon),
    );
    // Tuple of strings and finite floats cannot fail to serialize.
    Ok(serde_json::to_string(&wire).expect("wire point serialization"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_update_accepts_wire_frame() {
        let record = decode_update(r#"["AA1111",[41.70,44.78]]"#).unwrap();
        assert_eq!(record.mode_s, "AA1111");
        assert_eq!(record.position.lat, 41.70);
        assert_eq!(record.position.lon, 44.78);
    }

    #[test]
    fn decode_update_discards_non_numeric_coordinate() {
        assert!(decode_update(r#"["A1B2C3",["x",41.7]]"#).is_none());
        assert!(decode_update(r#"["A1B2C3",[null,41.7]]"#).is_none());
    }

    #[test]
    fn decode_update_discards_wrong_shape() {
        assert!(decode_update(r#"["A1B2C3"]"#).is_none());
        assert!(decode_update(r#"["A1B2C3",[41.7]]"#).is_none());
        assert!(decode_update("not json").is_none());
        assert!(decode_update(r#"{"mode_s":"A1B2C3"}"#).is_none());
    }

    #[test]
    fn decode_history_preserves_order() {
        let records =
            decode_history(r#"[["AA1111",[41.70,44.78]],["BB2222",[41.71,44.79]]]"#).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].mode_s, "AA1111");
        assert_eq!(records[1].mode_s, "BB2222");
    }

    #[test]
    fn decode_history_rejects_malformed_payload() {
        assert!(matches!(
            decode_history("{\"oops\":1}"),
            Err(FeedError::MalformedHistory(_))
        ));
    }

    #[test]
    fn encode_update_round_trips_through_decode() {
        let record = PointRecord::new("4B1234", 41.695, 44.801);
        let frame = encode_update(&record).unwrap();
        assert_eq!(decode_update(&frame).unwrap(), record);
    }

    #[test]
    fn encode_update_refuses_non_finite_position() {
        let record = PointRecord::new("4B1234", f64::NAN, 44.801);
        assert!(matches!(
            encode_update(&record),
            Err(FeedError::NonFiniteCoordinate(_))
        ));
    }
}
