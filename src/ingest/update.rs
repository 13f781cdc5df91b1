use serde::{Deserialize, Serialize};

use crate::{GeoPoint, LoadError, PointId, QueryRequest};

/// Обновление позиции движущегося объекта, один JSON-объект на сообщение:
/// `{"lon": 8.54, "lat": 47.37, "taxiId": 12}`.
///
/// Неизвестные поля игнорируются.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionUpdate {
    pub lon: f64,
    pub lat: f64,
    pub taxi_id: PointId,
}

impl PositionUpdate {
    pub fn from_json(raw: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(raw.trim())?)
    }

    pub fn location(&self) -> GeoPoint {
        GeoPoint::from_lon_lat(self.lon, self.lat)
    }

    /// Превращает обновление в запрос `k` ближайших от имени такси.
    pub fn into_request(
        self,
        k: usize,
    ) -> QueryRequest {
        QueryRequest::new(self.location(), k, self.taxi_id)
    }
}
