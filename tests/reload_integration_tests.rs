use std::{fs, path::Path, sync::Arc, time::Duration};

use proxima::{
    DelimitedFileSource, Euclidean, GeoPoint, IndexBuilder, LoadError, MatchEngine, PointId,
    QueryRequest, ReloadError, Reloader,
};
use tokio::sync::watch;

fn write_clients(
    path: &Path,
    rows: &str,
) {
    fs::write(path, rows).unwrap();
}

fn nearest_id(engine: &MatchEngine) -> Option<PointId> {
    engine
        .query(&QueryRequest::new(GeoPoint::new(0.0, 0.0), 1, "taxi"))
        .unwrap()
        .nearest()
        .map(|n| n.point.id.clone())
}

fn setup(path: &Path) -> (Arc<MatchEngine>, Reloader) {
    let engine = Arc::new(MatchEngine::empty(Arc::new(Euclidean)));
    let reloader = Reloader::new(
        engine.clone(),
        Arc::new(DelimitedFileSource::new(path)),
        IndexBuilder::default(),
    );
    (engine, reloader)
}

/// Тест проверяет цикл файл → сборка → подмена и сохранение последнего
/// удачного индекса при ошибке в файле.
#[tokio::test]
async fn test_reload_from_file_keeps_last_good_index() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clients.csv");
    let (engine, reloader) = setup(&path);

    write_clients(&path, "1,5,5\n2,1,1\n");
    assert_eq!(reloader.reload().await.unwrap(), 1);
    assert_eq!(nearest_id(&engine), Some(PointId::Int(2)));

    write_clients(&path, "1,5,5\n2,1,1\n3,oops,0\n");
    let err = reloader.reload().await.unwrap_err();
    assert!(matches!(
        err,
        ReloadError::Load(LoadError::InvalidRow { line: 3, .. })
    ));
    assert_eq!(engine.current_snapshot_version(), 1);
    assert_eq!(nearest_id(&engine), Some(PointId::Int(2)));

    write_clients(&path, "1,5,5\n1,0,0\n");
    assert!(matches!(
        reloader.reload().await.unwrap_err(),
        ReloadError::Build(_)
    ));
    assert_eq!(engine.current_snapshot_version(), 1);

    fs::remove_file(&path).unwrap();
    assert!(matches!(
        reloader.reload().await.unwrap_err(),
        ReloadError::Load(LoadError::Io { .. })
    ));
    assert_eq!(nearest_id(&engine), Some(PointId::Int(2)));
}

/// Тест проверяет, что пустой файл принимается: индекс подменяется, ответы
/// становятся пустыми.
#[tokio::test]
async fn test_empty_file_is_swapped_in() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clients.csv");
    let (engine, reloader) = setup(&path);

    write_clients(&path, "7,0,0\n");
    reloader.reload().await.unwrap();
    assert_eq!(nearest_id(&engine), Some(PointId::Int(7)));

    write_clients(&path, "# no clients today\n");
    assert_eq!(reloader.reload().await.unwrap(), 2);
    assert_eq!(nearest_id(&engine), None);
    assert_eq!(engine.stats().empty_swaps, 1);
}

/// Тест проверяет периодическую перезагрузку и остановку задачи по сигналу.
#[tokio::test(start_paused = true)]
async fn test_periodic_reload_and_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clients.csv");
    let (engine, reloader) = setup(&path);

    write_clients(&path, "1,3,3\n");
    reloader.reload().await.unwrap();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = reloader.clone().spawn(Duration::from_secs(10), shutdown_rx);

    write_clients(&path, "1,3,3\n2,0,1\n");
    wait_for_version(&engine, 2).await;
    assert_eq!(nearest_id(&engine), Some(PointId::Int(2)));

    shutdown_tx.send(true).unwrap();
    task.await.unwrap();

    let version = engine.current_snapshot_version();
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(engine.current_snapshot_version(), version);
}

/// Ждёт, пока движок дойдёт до версии `version`, продвигая виртуальное время.
async fn wait_for_version(
    engine: &MatchEngine,
    version: u64,
) {
    for _ in 0..100 {
        if engine.current_snapshot_version() >= version {
            return;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
    panic!(
        "version {version} not reached, current {}",
        engine.current_snapshot_version()
    );
}
