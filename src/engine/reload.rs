//! Периодическая пересборка статического набора точек.
//!
//! [`Reloader`] выполняет один цикл загрузка → сборка → подмена на каждый
//! тик. Неудачный цикл оставляет движок на последнем удачном снимке.

use std::{fmt, sync::Arc, time::Duration};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use super::MatchEngine;
use crate::{ErrorExt, IndexBuilder, LoadError, PointSet, ReloadError};

/// Источник статического набора точек.
pub trait PointSource: Send + Sync + 'static {
    /// Загружает полный набор точек заново.
    fn load(&self) -> Result<PointSet, LoadError>;

    /// Короткое описание источника для логов.
    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

impl<F> PointSource for F
where
    F: Fn() -> Result<PointSet, LoadError> + Send + Sync + 'static,
{
    fn load(&self) -> Result<PointSet, LoadError> {
        self()
    }

    fn describe(&self) -> String {
        "closure".to_string()
    }
}

/// Цикл перезагрузки: источник, строитель и движок, в который идёт подмена.
#[derive(Clone)]
pub struct Reloader {
    engine: Arc<MatchEngine>,
    source: Arc<dyn PointSource>,
    builder: IndexBuilder,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl Reloader {
    pub fn new(
        engine: Arc<MatchEngine>,
        source: Arc<dyn PointSource>,
        builder: IndexBuilder,
    ) -> Self {
        Self {
            engine,
            source,
            builder,
        }
    }

    pub fn engine(&self) -> &Arc<MatchEngine> {
        &self.engine
    }

    /// Один цикл загрузки, сборки и подмены. Возвращает версию
    /// опубликованного снимка.
    ///
    /// При ошибке движок остаётся на текущем индексе; ошибка пишется в лог
    /// на уровне `warn` и возвращается.
    pub fn reload_once(&self) -> Result<u64, ReloadError> {
        let source = self.source.describe();
        debug!(%source, "reloading point set");

        let points = self.source.load().inspect_err(|err| {
            warn!(
                %source,
                error = %err,
                code = %err.status_code(),
                retryable = err.status_code().is_retryable(),
                version = self.engine.current_snapshot_version(),
                "failed to load point set, keeping current index"
            );
        })?;

        let index = self.builder.build(points).inspect_err(|err| {
            warn!(
                %source,
                error = %err,
                code = %err.status_code(),
                version = self.engine.current_snapshot_version(),
                "failed to build index, keeping current index"
            );
        })?;

        let (version, _) = self.engine.swap_index_versioned(index);
        Ok(version)
    }

    /// Запускает [`reload_once`](Self::reload_once) в пуле блокирующих задач.
    pub async fn reload(&self) -> Result<u64, ReloadError> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.reload_once())
            .await
            .map_err(|err| ReloadError::Task(err.to_string()))?
    }

    /// Запускает фоновую задачу периодической перезагрузки.
    ///
    /// Первая перезагрузка происходит через `interval` после вызова. Задача
    /// завершается, когда `shutdown` становится `true` или отправитель
    /// закрыт.
    pub fn spawn(
        self,
        interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let period = interval.max(Duration::from_millis(1));

        tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            info!(interval_ms = period.as_millis() as u64, "reload task started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        // Ошибки уже залогированы в `reload_once`.
                        let _ = self.reload().await;
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }

            info!(
                version = self.engine.current_snapshot_version(),
                "reload task stopped"
            );
        })
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов
////////////////////////////////////////////////////////////////////////////////

impl fmt::Debug for Reloader {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Reloader")
            .field("source", &self.source.describe())
            .field("builder", &self.builder)
            .field("engine", &self.engine)
            .finish()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
