use std::sync::atomic::{AtomicU64, Ordering};

/// Счётчики движка сопоставления.
///
/// Обновляются с `Ordering::Relaxed`: значения приблизительны относительно
/// друг друга, но каждое монотонно.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    /// Кол-во выполненных запросов
    queries: AtomicU64,
    /// Кол-во отклонённых запросов (некорректные координаты или `k`)
    rejected_queries: AtomicU64,
    /// Кол-во подмен индекса
    swaps: AtomicU64,
    /// Кол-во подмен на пустой индекс
    empty_swaps: AtomicU64,
}

/// Снимок счётчиков и состояния текущего индекса.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineStats {
    pub queries: u64,
    pub rejected_queries: u64,
    pub swaps: u64,
    pub empty_swaps: u64,
    /// Версия текущего снимка индекса
    pub version: u64,
    /// Кол-во точек в текущем индексе
    pub points: usize,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_queries(
        &self,
        count: u64,
    ) {
        self.queries.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.rejected_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_swap(
        &self,
        empty: bool,
    ) {
        self.swaps.fetch_add(1, Ordering::Relaxed);
        if empty {
            self.empty_swaps.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn get_queries(&self) -> u64 {
        self.queries.load(Ordering::Relaxed)
    }

    pub fn get_rejected_queries(&self) -> u64 {
        self.rejected_queries.load(Ordering::Relaxed)
    }

    pub fn get_swaps(&self) -> u64 {
        self.swaps.load(Ordering::Relaxed)
    }

    pub fn get_empty_swaps(&self) -> u64 {
        self.empty_swaps.load(Ordering::Relaxed)
    }

    /// Собирает [`EngineStats`] для переданного состояния индекса.
    pub fn snapshot(
        &self,
        version: u64,
        points: usize,
    ) -> EngineStats {
        EngineStats {
            queries: self.get_queries(),
            rejected_queries: self.get_rejected_queries(),
            swaps: self.get_swaps(),
            empty_swaps: self.get_empty_swaps(),
            version,
            points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = EngineMetrics::new();
        metrics.record_queries(3);
        metrics.record_queries(1);
        metrics.record_rejected();
        metrics.record_swap(false);
        metrics.record_swap(true);

        let stats = metrics.snapshot(2, 10);
        assert_eq!(
            stats,
            EngineStats {
                queries: 4,
                rejected_queries: 1,
                swaps: 2,
                empty_swaps: 1,
                version: 2,
                points: 10,
            }
        );
    }
}
