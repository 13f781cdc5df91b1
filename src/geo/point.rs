use std::{fmt, sync::Arc};

use bytes::Bytes;
use proxima_error::{BuildError, DuplicateIdError, InvalidCoordinateError};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Точка на плоскости: `x` — долгота (или планарная X), `y` — широта.
///
/// Неизменяема; равенство — покоординатное.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub x: f64,
    pub y: f64,
}

/// Идентификатор статической точки или отправителя запроса.
///
/// Сериализуется как число или строка без обёртки.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointId {
    Int(i64),
    Name(Arc<str>),
}

/// Элемент статического набора (например, клиент, ожидающий такси).
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedPoint {
    pub id: PointId,
    pub location: GeoPoint,
    /// Непрозрачные данные вызывающей стороны.
    pub payload: Bytes,
}

/// Набор точек, из которого строится индекс.
///
/// Порядок элементов — порядок разрешения равенств расстояний в результатах
/// k-NN.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSet {
    points: Vec<IndexedPoint>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl GeoPoint {
    pub const fn new(
        x: f64,
        y: f64,
    ) -> Self {
        Self { x, y }
    }

    /// Создаёт точку из пары долгота/широта.
    pub const fn from_lon_lat(
        lon: f64,
        lat: f64,
    ) -> Self {
        Self { x: lon, y: lat }
    }

    #[inline]
    pub fn lon(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn lat(&self) -> f64 {
        self.y
    }

    /// Обе координаты конечны (не NaN и не ±∞).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl PointId {
    /// Разбирает текстовый идентификатор: целые числа становятся `Int`,
    /// остальное — `Name`.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<i64>() {
            Ok(n) => Self::Int(n),
            Err(_) => Self::Name(Arc::from(raw)),
        }
    }
}

impl IndexedPoint {
    /// Точка без полезной нагрузки.
    pub fn new(
        id: impl Into<PointId>,
        location: GeoPoint,
    ) -> Self {
        Self {
            id: id.into(),
            location,
            payload: Bytes::new(),
        }
    }

    pub fn with_payload(
        mut self,
        payload: impl Into<Bytes>,
    ) -> Self {
        self.payload = payload.into();
        self
    }
}

impl PointSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    pub fn push(
        &mut self,
        point: IndexedPoint,
    ) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IndexedPoint> {
        self.points.iter()
    }

    pub fn as_slice(&self) -> &[IndexedPoint] {
        &self.points
    }

    pub fn into_vec(self) -> Vec<IndexedPoint> {
        self.points
    }

    /// Проверяет инварианты набора: конечные координаты и уникальные `id`.
    ///
    /// Возвращает первое нарушение в порядке входа; для каждой точки сначала
    /// проверяются координаты, затем идентификатор.
    pub fn validate(&self) -> Result<(), BuildError> {
        let mut seen: FxHashMap<&PointId, usize> = FxHashMap::default();
        seen.reserve(self.points.len());

        for (position, point) in self.points.iter().enumerate() {
            if !point.location.is_finite() {
                return Err(InvalidCoordinateError {
                    id: point.id.to_string(),
                    position,
                    x: point.location.x,
                    y: point.location.y,
                }
                .into());
            }

            if let Some(&first) = seen.get(&point.id) {
                return Err(DuplicateIdError {
                    id: point.id.to_string(),
                    first,
                    second: position,
                }
                .into());
            }
            seen.insert(&point.id, position);
        }

        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов
////////////////////////////////////////////////////////////////////////////////

impl fmt::Display for PointId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Name(s) => f.write_str(s),
        }
    }
}

impl From<i64> for PointId {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for PointId {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<&str> for PointId {
    fn from(s: &str) -> Self {
        Self::Name(Arc::from(s))
    }
}

impl From<String> for PointId {
    fn from(s: String) -> Self {
        Self::Name(Arc::from(s))
    }
}

impl From<Vec<IndexedPoint>> for PointSet {
    fn from(points: Vec<IndexedPoint>) -> Self {
        Self { points }
    }
}

impl FromIterator<IndexedPoint> for PointSet {
    fn from_iter<I: IntoIterator<Item = IndexedPoint>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for PointSet {
    type Item = IndexedPoint;
    type IntoIter = std::vec::IntoIter<IndexedPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

impl<'a> IntoIterator for &'a PointSet {
    type Item = &'a IndexedPoint;
    type IntoIter = std::slice::Iter<'a, IndexedPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_id_parse() {
        assert_eq!(PointId::parse("42"), PointId::Int(42));
        assert_eq!(PointId::parse(" -7 "), PointId::Int(-7));
        assert_eq!(PointId::parse("client-9"), PointId::from("client-9"));
    }

    /// Идентификатор сериализуется без тега варианта.
    #[test]
    fn test_point_id_serde_untagged() {
        assert_eq!(serde_json::to_string(&PointId::Int(3)).unwrap(), "3");
        assert_eq!(
            serde_json::to_string(&PointId::from("a")).unwrap(),
            "\"a\""
        );
        let back: PointId = serde_json::from_str("17").unwrap();
        assert_eq!(back, PointId::Int(17));
    }

    #[test]
    fn test_validate_accepts_unique_finite() {
        let set: PointSet = (0..10)
            .map(|i| IndexedPoint::new(i as i64, GeoPoint::new(i as f64, 0.0)))
            .collect();
        assert!(set.validate().is_ok());
        assert!(PointSet::new().validate().is_ok());
    }

    #[test]
    fn test_validate_reports_duplicate_positions() {
        let set = PointSet::from(vec![
            IndexedPoint::new(1, GeoPoint::new(0.0, 0.0)),
            IndexedPoint::new(2, GeoPoint::new(1.0, 0.0)),
            IndexedPoint::new(1, GeoPoint::new(5.0, 5.0)),
        ]);

        match set.validate() {
            Err(BuildError::DuplicateId(e)) => {
                assert_eq!(e.id, "1");
                assert_eq!((e.first, e.second), (0, 2));
            }
            other => panic!("expected duplicate id, got {other:?}"),
        }
    }

    /// Тест проверяет, что NaN и бесконечности отклоняются.
    #[test]
    fn test_validate_rejects_non_finite() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let set = PointSet::from(vec![
                IndexedPoint::new(1, GeoPoint::new(0.0, 0.0)),
                IndexedPoint::new(2, GeoPoint::new(0.0, bad)),
            ]);
            match set.validate() {
                Err(BuildError::InvalidCoordinate(e)) => assert_eq!(e.position, 1),
                other => panic!("expected invalid coordinate, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_payload_is_kept() {
        let p = IndexedPoint::new("c1", GeoPoint::from_lon_lat(8.54, 47.37))
            .with_payload(&b"waiting since 12:03"[..]);
        assert_eq!(&p.payload[..], b"waiting since 12:03");
        assert_eq!(p.location.lon(), 8.54);
        assert_eq!(p.location.lat(), 47.37);
    }
}
