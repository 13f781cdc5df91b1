//! Статический пространственный индекс с точным поиском k-NN.
//!
//! Индекс неизменяем после сборки: «обновление» — это сборка нового индекса и
//! подмена ссылки в `MatchEngine`. Поэтому любое число запросов может читать
//! один экземпляр без синхронизации.

use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
    fmt,
    sync::Arc,
};

use ordered_float::OrderedFloat;

use super::{Neighbor, QueryResult};
use crate::{BoundingBox, DistanceMetric, GeoPoint, IndexedPoint};

/// Узел дерева (внутренний или листовой).
///
/// Листья хранят порядковые номера точек во входном наборе.
#[derive(Debug, Clone)]
pub(crate) enum IndexNode {
    Leaf {
        entries: Vec<usize>,
        bbox: BoundingBox,
    },
    Internal {
        children: Vec<IndexNode>,
        bbox: BoundingBox,
    },
}

/// Неизменяемый снимок пространственного индекса.
pub struct SpatialIndex {
    root: Option<IndexNode>,
    points: Vec<IndexedPoint>,
    metric: Arc<dyn DistanceMetric>,
    leaf_capacity: usize,
}

/// Статистика дерева.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeStats {
    pub depth: usize,
    pub node_count: usize,
    pub leaf_count: usize,
    pub point_count: usize,
}

/// Элемент очереди обхода: узел и нижняя граница расстояния до него.
struct PqItem<'a> {
    bound: OrderedFloat<f64>,
    node: &'a IndexNode,
}

/// Кандидат результата: `(расстояние, порядковый номер)`.
///
/// Лексикографический порядок кортежа совпадает с порядком ранжирования,
/// поэтому max-heap держит наверху худшего из k лучших.
type Candidate = (OrderedFloat<f64>, usize);

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl IndexNode {
    pub(crate) fn bbox(&self) -> &BoundingBox {
        match self {
            IndexNode::Leaf { bbox, .. } => bbox,
            IndexNode::Internal { bbox, .. } => bbox,
        }
    }
}

impl SpatialIndex {
    pub(crate) fn from_parts(
        root: Option<IndexNode>,
        points: Vec<IndexedPoint>,
        metric: Arc<dyn DistanceMetric>,
        leaf_capacity: usize,
    ) -> Self {
        Self {
            root,
            points,
            metric,
            leaf_capacity,
        }
    }

    /// Пустой индекс: любой запрос возвращает пустой результат.
    pub fn empty(metric: Arc<dyn DistanceMetric>) -> Self {
        Self::from_parts(None, Vec::new(), metric, 1)
    }

    /// k-NN search: `k` ближайших точек к `query`.
    ///
    /// Best-first обход: узлы извлекаются в порядке нижней границы расстояния,
    /// обход останавливается, как только граница превышает k-е лучшее
    /// расстояние. Узлы с границей, равной k-му расстоянию, ещё посещаются:
    /// в них может найтись точка с тем же расстоянием и меньшим номером.
    pub fn knn(
        &self,
        query: GeoPoint,
        k: usize,
    ) -> QueryResult {
        let Some(root) = self.root.as_ref() else {
            return QueryResult::empty();
        };
        if k == 0 {
            return QueryResult::empty();
        }

        let k = k.min(self.points.len());
        let mut frontier: BinaryHeap<PqItem> = BinaryHeap::new();
        frontier.push(PqItem {
            bound: OrderedFloat(self.metric.min_distance_to_bbox(query, root.bbox())),
            node: root,
        });

        let mut best: BinaryHeap<Candidate> = BinaryHeap::with_capacity(k + 1);

        while let Some(item) = frontier.pop() {
            if best.len() == k && best.peek().is_some_and(|worst| item.bound > worst.0) {
                break;
            }

            match item.node {
                IndexNode::Leaf { entries, .. } => {
                    for &ordinal in entries {
                        let distance = self
                            .metric
                            .distance(query, self.points[ordinal].location);
                        Self::offer(&mut best, k, (OrderedFloat(distance), ordinal));
                    }
                }
                IndexNode::Internal { children, .. } => {
                    for child in children {
                        let bound =
                            OrderedFloat(self.metric.min_distance_to_bbox(query, child.bbox()));
                        if best.len() == k && best.peek().is_some_and(|worst| bound > worst.0) {
                            continue;
                        }
                        frontier.push(PqItem { bound, node: child });
                    }
                }
            }
        }

        self.ranked(best.into_vec())
    }

    /// Все точки на расстоянии не больше `radius`, ранжированные как в k-NN.
    pub fn within(
        &self,
        query: GeoPoint,
        radius: f64,
    ) -> QueryResult {
        let Some(root) = self.root.as_ref() else {
            return QueryResult::empty();
        };
        if radius.is_nan() || radius < 0.0 {
            return QueryResult::empty();
        }

        let mut found: Vec<Candidate> = Vec::new();
        let mut stack = vec![root];

        while let Some(node) = stack.pop() {
            if self.metric.min_distance_to_bbox(query, node.bbox()) > radius {
                continue;
            }
            match node {
                IndexNode::Leaf { entries, .. } => {
                    for &ordinal in entries {
                        let distance = self
                            .metric
                            .distance(query, self.points[ordinal].location);
                        if distance <= radius {
                            found.push((OrderedFloat(distance), ordinal));
                        }
                    }
                }
                IndexNode::Internal { children, .. } => stack.extend(children.iter()),
            }
        }

        self.ranked(found)
    }

    /// Range query: все точки внутри `bbox`, в порядке входного набора.
    pub fn range(
        &self,
        bbox: &BoundingBox,
    ) -> Vec<IndexedPoint> {
        let mut ordinals = Vec::new();
        if let Some(ref root) = self.root {
            Self::range_recursive(root, &self.points, bbox, &mut ordinals);
        }
        ordinals.sort_unstable();
        ordinals
            .into_iter()
            .map(|ordinal| self.points[ordinal].clone())
            .collect()
    }

    fn range_recursive(
        node: &IndexNode,
        points: &[IndexedPoint],
        query_bbox: &BoundingBox,
        out: &mut Vec<usize>,
    ) {
        if !node.bbox().intersects(query_bbox) {
            return;
        }

        match node {
            IndexNode::Leaf { entries, .. } => out.extend(
                entries
                    .iter()
                    .copied()
                    .filter(|&ordinal| query_bbox.contains_point(points[ordinal].location)),
            ),
            IndexNode::Internal { children, .. } => {
                for child in children {
                    Self::range_recursive(child, points, query_bbox, out);
                }
            }
        }
    }

    /// Вставляет кандидата в ограниченную кучу из `k` лучших.
    fn offer(
        best: &mut BinaryHeap<Candidate>,
        k: usize,
        candidate: Candidate,
    ) {
        if best.len() < k {
            best.push(candidate);
        } else if best.peek().is_some_and(|worst| candidate < *worst) {
            best.pop();
            best.push(candidate);
        }
    }

    fn ranked(
        &self,
        mut candidates: Vec<Candidate>,
    ) -> QueryResult {
        candidates.sort_unstable();
        QueryResult::from_ranked(
            candidates
                .into_iter()
                .map(|(distance, ordinal)| Neighbor {
                    point: self.points[ordinal].clone(),
                    distance: distance.into_inner(),
                })
                .collect(),
        )
    }

    /// Возвращает количество точек в индексе.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Проверяет, пуст ли индекс.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Точки в порядке входного набора.
    pub fn points(&self) -> &[IndexedPoint] {
        &self.points
    }

    pub fn metric(&self) -> &Arc<dyn DistanceMetric> {
        &self.metric
    }

    pub fn leaf_capacity(&self) -> usize {
        self.leaf_capacity
    }

    /// Bounding box всех точек; `None` для пустого индекса.
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.root.as_ref().map(|root| *root.bbox())
    }

    /// Статистика дерева (глубина, количество узлов).
    pub fn stats(&self) -> TreeStats {
        match self.root {
            Some(ref root) => {
                let mut stats = Self::compute_stats(root, 0);
                stats.point_count = self.points.len();
                stats
            }
            None => TreeStats::default(),
        }
    }

    fn compute_stats(
        node: &IndexNode,
        level: usize,
    ) -> TreeStats {
        match node {
            IndexNode::Leaf { .. } => TreeStats {
                depth: level + 1,
                node_count: 1,
                leaf_count: 1,
                point_count: 0,
            },
            IndexNode::Internal { children, .. } => {
                let mut stats = TreeStats {
                    depth: level + 1,
                    node_count: 1,
                    leaf_count: 0,
                    point_count: 0,
                };
                for child in children {
                    let child_stats = Self::compute_stats(child, level + 1);
                    stats.depth = stats.depth.max(child_stats.depth);
                    stats.node_count += child_stats.node_count;
                    stats.leaf_count += child_stats.leaf_count;
                }
                stats
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для SpatialIndex, PqItem
////////////////////////////////////////////////////////////////////////////////

impl fmt::Debug for SpatialIndex {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("len", &self.points.len())
            .field("metric", &self.metric.name())
            .field("leaf_capacity", &self.leaf_capacity)
            .field("bounds", &self.bounds())
            .finish()
    }
}

impl PartialEq for PqItem<'_> {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.bound == other.bound
    }
}

impl Eq for PqItem<'_> {}

impl PartialOrd for PqItem<'_> {
    fn partial_cmp(
        &self,
        other: &Self,
    ) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PqItem<'_> {
    fn cmp(
        &self,
        other: &Self,
    ) -> Ordering {
        // Min-heap: меньшая граница = выше приоритет
        Reverse(self.bound).cmp(&Reverse(other.bound))
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
