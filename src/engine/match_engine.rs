//! Движок сопоставления: текущий индекс за атомарной ссылкой.
//!
//! Запросы загружают ссылку на снимок без блокировок; подмена индекса — одна
//! атомарная операция. Запрос, начатый до подмены, дорабатывает на старом
//! снимке, который освобождается вместе с последней ссылкой на него.

use std::sync::Arc;

use arc_swap::ArcSwap;
use proxima_error::{QueryError, StatusCode};
use tracing::{info, trace, warn};

use super::{EngineMetrics, EngineStats};
use crate::{DistanceMetric, GeoPoint, PointId, QueryResult, SpatialIndex};

/// Запрос k ближайших соседей.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub location: GeoPoint,
    pub k: usize,
    /// Идентификатор отправителя (например, такси). На поиск не влияет.
    pub requester_id: PointId,
}

/// Опубликованный индекс вместе с его версией.
///
/// Версия хранится рядом с индексом, поэтому пара всегда согласована:
/// читатель не может увидеть новый индекс со старой версией.
#[derive(Debug)]
pub struct IndexSnapshot {
    version: u64,
    index: Arc<SpatialIndex>,
}

/// Движок сопоставления.
pub struct MatchEngine {
    current: ArcSwap<IndexSnapshot>,
    metrics: EngineMetrics,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl QueryRequest {
    pub fn new(
        location: GeoPoint,
        k: usize,
        requester_id: impl Into<PointId>,
    ) -> Self {
        Self {
            location,
            k,
            requester_id: requester_id.into(),
        }
    }

    /// Проверяет запрос: конечные координаты и `k >= 1`.
    pub fn validate(&self) -> Result<(), QueryError> {
        if !self.location.is_finite() {
            return Err(QueryError::InvalidCoordinate {
                x: self.location.x,
                y: self.location.y,
            });
        }
        if self.k == 0 {
            return Err(QueryError::InvalidK { k: self.k });
        }
        Ok(())
    }
}

impl IndexSnapshot {
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn index(&self) -> &Arc<SpatialIndex> {
        &self.index
    }

    /// Состояние снимка: `EmptyIndex` для пустого индекса (ответы будут
    /// пустыми, но это не ошибка), иначе `Success`.
    pub fn status(&self) -> StatusCode {
        if self.index.is_empty() {
            StatusCode::EmptyIndex
        } else {
            StatusCode::Success
        }
    }
}

impl MatchEngine {
    /// Создаёт движок с начальным индексом; версия снимка равна 0.
    pub fn new(index: impl Into<Arc<SpatialIndex>>) -> Self {
        Self {
            current: ArcSwap::from_pointee(IndexSnapshot {
                version: 0,
                index: index.into(),
            }),
            metrics: EngineMetrics::new(),
        }
    }

    /// Движок с пустым индексом: до первой подмены все ответы пусты.
    pub fn empty(metric: Arc<dyn DistanceMetric>) -> Self {
        Self::new(SpatialIndex::empty(metric))
    }

    /// Отвечает на запрос по текущему индексу.
    pub fn query(
        &self,
        request: &QueryRequest,
    ) -> Result<QueryResult, QueryError> {
        self.query_versioned(request).map(|(_, result)| result)
    }

    /// То же, что [`query`](Self::query), но возвращает и версию снимка,
    /// по которому получен ответ.
    pub fn query_versioned(
        &self,
        request: &QueryRequest,
    ) -> Result<(u64, QueryResult), QueryError> {
        self.check(request)?;

        let snapshot = self.current.load();
        let result = snapshot.index.knn(request.location, request.k);
        self.metrics.record_queries(1);

        trace!(
            requester = %request.requester_id,
            k = request.k,
            found = result.len(),
            version = snapshot.version,
            "query answered"
        );

        Ok((snapshot.version, result))
    }

    /// Отвечает на пакет запросов по одному снимку индекса.
    ///
    /// Некорректный запрос не прерывает пакет: его позиция содержит ошибку.
    pub fn query_batch(
        &self,
        requests: &[QueryRequest],
    ) -> Vec<Result<QueryResult, QueryError>> {
        let snapshot = self.current.load_full();

        let results: Vec<_> = requests
            .iter()
            .map(|request| {
                self.check(request)?;
                Ok(snapshot.index.knn(request.location, request.k))
            })
            .collect();

        let answered = results.iter().filter(|r| r.is_ok()).count();
        self.metrics.record_queries(answered as u64);

        results
    }

    /// Атомарно подменяет текущий индекс и увеличивает версию снимка.
    ///
    /// Возвращает предыдущий индекс. Пустой индекс принимается: после
    /// подмены все ответы будут пустыми.
    pub fn swap_index(
        &self,
        new_index: impl Into<Arc<SpatialIndex>>,
    ) -> Arc<SpatialIndex> {
        self.swap_index_versioned(new_index).1
    }

    /// То же, что [`swap_index`](Self::swap_index), но дополнительно
    /// возвращает версию, под которой опубликован именно этот индекс.
    ///
    /// Версия берётся из снимка, заменённого в `rcu`, поэтому конкурентная
    /// подмена не может подставить чужой номер.
    pub fn swap_index_versioned(
        &self,
        new_index: impl Into<Arc<SpatialIndex>>,
    ) -> (u64, Arc<SpatialIndex>) {
        let new_index = new_index.into();
        let empty = new_index.is_empty();
        let points = new_index.len();

        let previous = self.current.rcu(|current| IndexSnapshot {
            version: current.version + 1,
            index: Arc::clone(&new_index),
        });
        let version = previous.version + 1;
        self.metrics.record_swap(empty);

        if empty {
            warn!(
                version,
                code = %StatusCode::EmptyIndex,
                "swapped in empty index, no matches will be produced"
            );
        } else {
            info!(
                version,
                points,
                previous_points = previous.index.len(),
                "swapped spatial index"
            );
        }

        (version, Arc::clone(&previous.index))
    }

    /// Текущая версия снимка: 0 при создании, +1 на каждую подмену.
    pub fn current_snapshot_version(&self) -> u64 {
        self.current.load().version
    }

    /// Закрепляет текущий индекс: ссылка остаётся валидной после подмен.
    pub fn snapshot(&self) -> Arc<SpatialIndex> {
        Arc::clone(&self.current.load().index)
    }

    /// Закрепляет текущий снимок вместе с версией.
    pub fn current(&self) -> Arc<IndexSnapshot> {
        self.current.load_full()
    }

    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    pub fn stats(&self) -> EngineStats {
        let current = self.current.load();
        self.metrics
            .snapshot(current.version, current.index.len())
    }

    fn check(
        &self,
        request: &QueryRequest,
    ) -> Result<(), QueryError> {
        request.validate().inspect_err(|err| {
            self.metrics.record_rejected();
            trace!(requester = %request.requester_id, error = %err, "query rejected");
        })
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов
////////////////////////////////////////////////////////////////////////////////

impl std::fmt::Debug for MatchEngine {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        let current = self.current.load();
        f.debug_struct("MatchEngine")
            .field("version", &current.version)
            .field("index", &current.index)
            .finish()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
