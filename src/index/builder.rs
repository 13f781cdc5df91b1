//! Пакетная сборка [`SpatialIndex`] медианным разбиением.

use std::{cmp::Ordering, sync::Arc};

use proxima_error::BuildError;
use tracing::debug;

use super::{IndexNode, SpatialIndex};
use crate::{BoundingBox, DistanceMetric, Euclidean, IndexedPoint, PointSet};

/// Вместимость листа по умолчанию.
pub const DEFAULT_LEAF_CAPACITY: usize = 16;

/// Параметры сборки индекса.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Максимальное количество точек в листе (не меньше 1).
    pub leaf_capacity: usize,
    /// Метрика, которая сохраняется в собранном индексе.
    pub metric: Arc<dyn DistanceMetric>,
}

/// Строитель индекса. Чистая функция от `PointSet`: одинаковый вход даёт
/// одинаковое дерево.
#[derive(Debug, Clone, Default)]
pub struct IndexBuilder {
    config: IndexConfig,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl IndexConfig {
    pub fn with_leaf_capacity(
        mut self,
        leaf_capacity: usize,
    ) -> Self {
        self.leaf_capacity = leaf_capacity.max(1);
        self
    }

    pub fn with_metric(
        mut self,
        metric: Arc<dyn DistanceMetric>,
    ) -> Self {
        self.metric = metric;
        self
    }
}

impl IndexBuilder {
    pub fn new(config: IndexConfig) -> Self {
        Self {
            config: IndexConfig {
                leaf_capacity: config.leaf_capacity.max(1),
                metric: config.metric,
            },
        }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Собирает индекс из набора точек.
    ///
    /// Сначала проверяются все точки (конечные координаты, уникальные `id`),
    /// и только потом строится дерево. Пустой набор даёт пустой индекс.
    ///
    /// Разбиение идёт по чередующимся осям (`x` на чётной глубине, `y` на
    /// нечётной) по медиане; внутри разбиения порядок задаётся парой
    /// `(координата, номер во входе)`.
    pub fn build(
        &self,
        points: PointSet,
    ) -> Result<SpatialIndex, BuildError> {
        points.validate()?;

        let points = points.into_vec();
        let metric = Arc::clone(&self.config.metric);
        let leaf_capacity = self.config.leaf_capacity;

        if points.is_empty() {
            debug!(metric = metric.name(), "built empty spatial index");
            return Ok(SpatialIndex::from_parts(
                None,
                points,
                metric,
                leaf_capacity,
            ));
        }

        let mut ordinals: Vec<usize> = (0..points.len()).collect();
        let root = build_node(&points, &mut ordinals, 0, leaf_capacity);

        let index = SpatialIndex::from_parts(Some(root), points, metric, leaf_capacity);
        debug!(
            points = index.len(),
            leaf_capacity,
            metric = index.metric().name(),
            depth = index.stats().depth,
            "built spatial index"
        );

        Ok(index)
    }
}

/// Рекурсивное построение поддерева над непустым срезом номеров.
fn build_node(
    points: &[IndexedPoint],
    ordinals: &mut [usize],
    depth: usize,
    leaf_capacity: usize,
) -> IndexNode {
    if ordinals.len() <= leaf_capacity {
        ordinals.sort_unstable();
        let entries = ordinals.to_vec();
        let bbox = leaf_bbox(points, &entries);
        return IndexNode::Leaf { entries, bbox };
    }

    let mid = ordinals.len() / 2;
    ordinals.select_nth_unstable_by(mid, |&a, &b| split_order(points, a, b, depth));

    let (left, right) = ordinals.split_at_mut(mid);
    let left = build_node(points, left, depth + 1, leaf_capacity);
    let right = build_node(points, right, depth + 1, leaf_capacity);

    let mut bbox = *left.bbox();
    bbox.expand(right.bbox());

    IndexNode::Internal {
        children: vec![left, right],
        bbox,
    }
}

fn split_order(
    points: &[IndexedPoint],
    a: usize,
    b: usize,
    depth: usize,
) -> Ordering {
    let (pa, pb) = (points[a].location, points[b].location);
    let by_axis = if depth % 2 == 0 {
        pa.x.total_cmp(&pb.x)
    } else {
        pa.y.total_cmp(&pb.y)
    };
    by_axis.then(a.cmp(&b))
}

fn leaf_bbox(
    points: &[IndexedPoint],
    entries: &[usize],
) -> BoundingBox {
    let mut bbox = BoundingBox::from_point(points[entries[0]].location);
    for &ordinal in &entries[1..] {
        bbox.expand_point(points[ordinal].location);
    }
    bbox
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов
////////////////////////////////////////////////////////////////////////////////

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            leaf_capacity: DEFAULT_LEAF_CAPACITY,
            metric: Arc::new(Euclidean),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
