//! Метрики расстояния для пространственного индекса.
//!
//! Индекс не зашивает метрику: для сопоставления такси с клиентами нужна
//! географическая дистанция, для планарных данных — евклидова. Каждая метрика
//! обязана давать нижнюю оценку расстояния от точки до bounding box, иначе
//! отсечение ветвей в k-NN перестанет быть точным.

use std::{f64::consts::PI, fmt, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{BoundingBox, GeoPoint};

/// Средний радиус Земли в метрах.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Функция расстояния, подключаемая к индексу.
pub trait DistanceMetric: fmt::Debug + Send + Sync {
    /// Короткое имя метрики (для логов и статистики).
    fn name(&self) -> &'static str;

    /// Расстояние между двумя точками.
    fn distance(
        &self,
        a: GeoPoint,
        b: GeoPoint,
    ) -> f64;

    /// Нижняя граница расстояния от `point` до любой точки внутри `bbox`.
    ///
    /// Должна быть не больше `distance(point, p)` для каждой `p` из `bbox` и
    /// равна нулю, если `point` лежит внутри.
    fn min_distance_to_bbox(
        &self,
        point: GeoPoint,
        bbox: &BoundingBox,
    ) -> f64;
}

/// Евклидово расстояние в единицах координат.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Euclidean;

/// Расстояние по большому кругу (формула гаверсинуса) в метрах.
///
/// `x` трактуется как долгота, `y` — как широта, обе в градусах.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Haversine {
    radius: f64,
}

/// Выбор метрики в конфигурации и CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    #[default]
    Euclidean,
    Haversine,
}

////////////////////////////////////////////////////////////////////////////////
// Свободные функции
////////////////////////////////////////////////////////////////////////////////

/// Евклидово расстояние между точками.
#[inline]
pub fn euclidean_distance(
    a: GeoPoint,
    b: GeoPoint,
) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

/// Формула гаверсинуса на сфере со средним радиусом Земли.
pub fn haversine_distance(
    a: GeoPoint,
    b: GeoPoint,
) -> f64 {
    haversine_distance_with_radius(a, b, EARTH_RADIUS_METERS)
}

/// Формула гаверсинуса на сфере радиуса `radius`.
pub fn haversine_distance_with_radius(
    a: GeoPoint,
    b: GeoPoint,
    radius: f64,
) -> f64 {
    let to_rad = PI / 180.0;
    let dlat = (b.y - a.y) * to_rad;
    let dlon = (b.x - a.x) * to_rad;
    let lat1 = a.y * to_rad;
    let lat2 = b.y * to_rad;

    let h = (dlat * 0.5).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon * 0.5).sin().powi(2);
    // h может чуть выйти за 1.0 из-за округления
    let c = 2.0 * h.min(1.0).sqrt().asin();

    radius * c
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl Haversine {
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Минимальное расстояние от `point` до отрезка меридиана `lon` между
    /// широтами `min_lat..=max_lat`.
    ///
    /// Вдоль меридиана `cos d(ψ) = C·cos(ψ − ψ₀)`, поэтому минимум
    /// достигается либо в ψ₀ (если она внутри отрезка), либо на одном из
    /// концов.
    fn distance_to_meridian(
        &self,
        point: GeoPoint,
        lon: f64,
        min_lat: f64,
        max_lat: f64,
    ) -> f64 {
        let phi = point.y.to_radians();
        let dlon = (lon - point.x).to_radians();
        let closest = phi.sin().atan2(phi.cos() * dlon.cos()).to_degrees();

        [closest.clamp(min_lat, max_lat), min_lat, max_lat]
            .into_iter()
            .map(|lat| self.distance(point, GeoPoint::new(lon, lat)))
            .fold(f64::INFINITY, f64::min)
    }
}

impl MetricKind {
    /// Создаёт реализацию метрики.
    pub fn into_metric(self) -> Arc<dyn DistanceMetric> {
        match self {
            MetricKind::Euclidean => Arc::new(Euclidean),
            MetricKind::Haversine => Arc::new(Haversine::default()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MetricKind::Euclidean => "euclidean",
            MetricKind::Haversine => "haversine",
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Реализации DistanceMetric
////////////////////////////////////////////////////////////////////////////////

impl DistanceMetric for Euclidean {
    fn name(&self) -> &'static str {
        "euclidean"
    }

    fn distance(
        &self,
        a: GeoPoint,
        b: GeoPoint,
    ) -> f64 {
        euclidean_distance(a, b)
    }

    fn min_distance_to_bbox(
        &self,
        point: GeoPoint,
        bbox: &BoundingBox,
    ) -> f64 {
        euclidean_distance(point, bbox.clamp_point(point))
    }
}

impl DistanceMetric for Haversine {
    fn name(&self) -> &'static str {
        "haversine"
    }

    fn distance(
        &self,
        a: GeoPoint,
        b: GeoPoint,
    ) -> f64 {
        haversine_distance_with_radius(a, b, self.radius)
    }

    fn min_distance_to_bbox(
        &self,
        point: GeoPoint,
        bbox: &BoundingBox,
    ) -> f64 {
        if bbox.contains_point(point) {
            return 0.0;
        }

        // В полосе долгот bbox ближайшая точка лежит на том же меридиане.
        if bbox.contains_x(point.x) {
            let lat = point.y.clamp(bbox.min_y, bbox.max_y);
            return self.distance(point, GeoPoint::new(point.x, lat));
        }

        // Иначе — на одном из боковых меридианов.
        let west = self.distance_to_meridian(point, bbox.min_x, bbox.min_y, bbox.max_y);
        let east = self.distance_to_meridian(point, bbox.max_x, bbox.min_y, bbox.max_y);
        west.min(east)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов
////////////////////////////////////////////////////////////////////////////////

impl Default for Haversine {
    fn default() -> Self {
        Self::new(EARTH_RADIUS_METERS)
    }
}

impl fmt::Display for MetricKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MetricKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "euclidean" | "planar" => Ok(MetricKind::Euclidean),
            "haversine" | "geo" => Ok(MetricKind::Haversine),
            other => Err(format!(
                "unknown metric '{other}', expected 'euclidean' or 'haversine'"
            )),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
