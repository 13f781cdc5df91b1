//! `proxima`: сопоставляет JSON-обновления позиций из stdin со статическим
//! набором клиентов и пишет по одной JSON-записи на обновление в stdout.

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use proxima::{
    init_logging, ErrorExt, MatchEngine, MatchRecord, MetricKind, PositionUpdate, Reloader,
    Settings, StatusCode,
};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter},
    sync::watch,
};
use tracing::{info, warn};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("GIT_COMMIT"),
    ", built ",
    env!("BUILD_TIME"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "proxima")]
#[command(version = env!("CARGO_PKG_VERSION"), long_version = LONG_VERSION)]
#[command(about = "Поиск ближайших клиентов для потока позиций в реальном времени", long_about = None)]
struct Cli {
    /// Файл со строками `id,lon,lat[,payload]`
    #[arg(long, env = "PROXIMA_CLIENTS_PATH")]
    clients: Option<PathBuf>,
    /// Число ближайших клиентов на обновление
    #[arg(short, long)]
    k: Option<usize>,
    /// Метрика расстояния: euclidean или haversine
    #[arg(long)]
    metric: Option<MetricKind>,
    /// Максимум точек в листе индекса
    #[arg(long)]
    leaf_capacity: Option<usize>,
    /// Перечитывать файл клиентов каждые N секунд (0 отключает)
    #[arg(long)]
    reload_secs: Option<u64>,
    /// Файл конфигурации (TOML, YAML или JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Включить подробный вывод (debug)
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn apply(
        self,
        settings: &mut Settings,
    ) {
        if let Some(path) = self.clients {
            settings.clients_path = Some(path);
        }
        if let Some(k) = self.k {
            settings.k = k;
        }
        if let Some(metric) = self.metric {
            settings.metric = metric;
        }
        if let Some(leaf_capacity) = self.leaf_capacity {
            settings.leaf_capacity = leaf_capacity;
        }
        if let Some(reload_secs) = self.reload_secs {
            settings.reload_secs = reload_secs;
        }
        if self.verbose {
            settings.logging.level = "debug".to_string();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;
    cli.apply(&mut settings);
    settings.validate().context("invalid settings")?;

    let logging = init_logging(settings.logging.clone()).map_err(|e| anyhow!(e))?;

    let source = settings
        .point_source()?
        .context("no clients file configured (pass --clients or set PROXIMA_CLIENTS_PATH)")?;

    let engine = Arc::new(MatchEngine::empty(settings.metric.into_metric()));
    let reloader = Reloader::new(engine.clone(), Arc::new(source), settings.index_builder());
    reloader
        .reload()
        .await
        .context("initial load of the clients file failed")?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let reload_task = (settings.reload_secs > 0).then(|| {
        reloader
            .clone()
            .spawn(Duration::from_secs(settings.reload_secs), shutdown_rx)
    });

    info!(
        k = settings.k,
        metric = %settings.metric,
        points = engine.snapshot().len(),
        reload_secs = settings.reload_secs,
        "matching updates from stdin"
    );
    if engine.current().status() == StatusCode::EmptyIndex {
        warn!(
            code = %StatusCode::EmptyIndex,
            "clients file is empty, updates will get no matches"
        );
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut out = BufWriter::new(tokio::io::stdout());

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let update = match PositionUpdate::from_json(&line) {
            Ok(update) => update,
            Err(err) => {
                warn!(error = %err, code = %err.status_code(), "skipping malformed update");
                continue;
            }
        };

        match engine.query_versioned(&update.clone().into_request(settings.k)) {
            Ok((version, result)) => {
                let record = MatchRecord::new(&update, version, &result);
                out.write_all(record.to_json()?.as_bytes()).await?;
                out.write_all(b"\n").await?;
                out.flush().await?;
            }
            Err(err) => warn!(
                taxi = %update.taxi_id,
                error = %err,
                code = %err.status_code(),
                "skipping invalid update"
            ),
        }
    }

    let _ = shutdown_tx.send(true);
    if let Some(task) = reload_task {
        task.await.context("reload task panicked")?;
    }

    info!(stats = ?engine.stats(), "input closed, shutting down");
    logging.shutdown();

    Ok(())
}
