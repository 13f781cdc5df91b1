use serde::{Deserialize, Serialize};

use crate::GeoPoint;

/// Прямоугольная область (bounding box), выровненная по осям координат.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl BoundingBox {
    /// Создаёт bounding box из одной точки.
    pub fn from_point(point: GeoPoint) -> Self {
        Self {
            min_x: point.x,
            max_x: point.x,
            min_y: point.y,
            max_y: point.y,
        }
    }

    /// Создаёт bounding box из границ.
    pub fn new(
        min_x: f64,
        max_x: f64,
        min_y: f64,
        max_y: f64,
    ) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Минимальный bbox, покрывающий все точки; `None` для пустого итератора.
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        let mut iter = points.into_iter();
        let mut bbox = Self::from_point(iter.next()?);
        for point in iter {
            bbox.expand_point(point);
        }
        Some(bbox)
    }

    /// Расширяет bbox, чтобы включить другой bbox.
    pub fn expand(
        &mut self,
        other: &BoundingBox,
    ) {
        self.min_x = self.min_x.min(other.min_x);
        self.max_x = self.max_x.max(other.max_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_y = self.max_y.max(other.max_y);
    }

    /// Расширяет bbox, чтобы включить точку.
    pub fn expand_point(
        &mut self,
        point: GeoPoint,
    ) {
        self.min_x = self.min_x.min(point.x);
        self.max_x = self.max_x.max(point.x);
        self.min_y = self.min_y.min(point.y);
        self.max_y = self.max_y.max(point.y);
    }

    /// Проверяет, пересекаются ли два bbox.
    pub fn intersects(
        &self,
        other: &BoundingBox,
    ) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Проверяет, содержит ли bbox точку (границы включительно).
    pub fn contains_point(
        &self,
        point: GeoPoint,
    ) -> bool {
        self.contains_x(point.x) && self.contains_y(point.y)
    }

    #[inline]
    pub fn contains_x(
        &self,
        x: f64,
    ) -> bool {
        x >= self.min_x && x <= self.max_x
    }

    #[inline]
    pub fn contains_y(
        &self,
        y: f64,
    ) -> bool {
        y >= self.min_y && y <= self.max_y
    }

    /// Ближайшая к `point` точка bbox (покоординатное зажатие).
    pub fn clamp_point(
        &self,
        point: GeoPoint,
    ) -> GeoPoint {
        GeoPoint {
            x: point.x.clamp(self.min_x, self.max_x),
            y: point.y.clamp(self.min_y, self.max_y),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
