use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::{Neighbor, PointId, PositionUpdate, QueryResult};

/// Одна строка JSON на каждое обработанное обновление.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub taxi_id: PointId,
    /// Версия снимка индекса, по которому найдены совпадения.
    pub snapshot: u64,
    /// Метка времени RFC 3339 с точностью до миллисекунд.
    pub matched_at: String,
    pub matches: Vec<MatchEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchEntry {
    pub id: PointId,
    pub lon: f64,
    pub lat: f64,
    pub distance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
}

impl MatchRecord {
    pub fn new(
        update: &PositionUpdate,
        snapshot: u64,
        result: &QueryResult,
    ) -> Self {
        Self {
            taxi_id: update.taxi_id.clone(),
            snapshot,
            matched_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            matches: result.iter().map(MatchEntry::from).collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl From<&Neighbor> for MatchEntry {
    fn from(neighbor: &Neighbor) -> Self {
        let point = &neighbor.point;
        Self {
            id: point.id.clone(),
            lon: point.location.lon(),
            lat: point.location.lat(),
            distance: neighbor.distance,
            payload: (!point.payload.is_empty())
                .then(|| String::from_utf8_lossy(&point.payload).into_owned()),
        }
    }
}
