use std::ops::Deref;

use crate::{IndexedPoint, PointId};

/// Найденная точка и расстояние до неё.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub point: IndexedPoint,
    pub distance: f64,
}

/// Ранжированный результат запроса: по возрастанию расстояния, при равенстве —
/// в порядке входного набора точек.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    neighbors: Vec<Neighbor>,
}

impl QueryResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_ranked(neighbors: Vec<Neighbor>) -> Self {
        Self { neighbors }
    }

    /// Ближайшая точка, если есть.
    pub fn nearest(&self) -> Option<&Neighbor> {
        self.neighbors.first()
    }

    /// Идентификаторы в порядке ранжирования.
    pub fn ids(&self) -> Vec<PointId> {
        self.neighbors.iter().map(|n| n.point.id.clone()).collect()
    }

    pub fn into_vec(self) -> Vec<Neighbor> {
        self.neighbors
    }
}

impl Deref for QueryResult {
    type Target = [Neighbor];

    fn deref(&self) -> &Self::Target {
        &self.neighbors
    }
}

impl IntoIterator for QueryResult {
    type Item = Neighbor;
    type IntoIter = std::vec::IntoIter<Neighbor>;

    fn into_iter(self) -> Self::IntoIter {
        self.neighbors.into_iter()
    }
}

impl<'a> IntoIterator for &'a QueryResult {
    type Item = &'a Neighbor;
    type IntoIter = std::slice::Iter<'a, Neighbor>;

    fn into_iter(self) -> Self::IntoIter {
        self.neighbors.iter()
    }
}
