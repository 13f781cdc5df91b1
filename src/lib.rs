//! Real-time point proximity matching.
//!
//! A static set of points (clients) is bulk-loaded into an immutable
//! [`SpatialIndex`]; moving objects (taxis) query it for their `k` nearest
//! points through a [`MatchEngine`]. The static set is refreshed by building a
//! new index and swapping it in atomically, so queries never wait on a
//! rebuild.
//!
//! ```
//! use proxima::{
//!     GeoPoint, IndexBuilder, IndexedPoint, MatchEngine, PointId, PointSet, QueryRequest,
//! };
//!
//! let points = PointSet::from(vec![
//!     IndexedPoint::new(1, GeoPoint::new(0.0, 0.0)),
//!     IndexedPoint::new(2, GeoPoint::new(10.0, 0.0)),
//! ]);
//! let engine = MatchEngine::new(IndexBuilder::default().build(points)?);
//!
//! let result = engine.query(&QueryRequest::new(GeoPoint::new(1.0, 1.0), 1, "taxi-7"))?;
//! assert_eq!(result[0].point.id, PointId::Int(1));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Runtime settings (defaults, config file, environment).
pub mod config;
/// Matching engine, counters and the reload task.
pub mod engine;
/// Errors of the I/O adapter layer.
pub mod error;
/// Points, bounding boxes and distance metrics.
pub mod geo;
/// Static spatial index and its builder.
pub mod index;
/// JSON updates, delimited point files and match records.
pub mod ingest;
/// Logging setup (filters, formatting, sinks).
pub mod logging;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

pub use config::Settings;
pub use engine::{
    EngineMetrics, EngineStats, IndexSnapshot, MatchEngine, PointSource, QueryRequest, Reloader,
};
pub use error::{LoadError, ReloadError, SettingsError};
pub use geo::{
    euclidean_distance, haversine_distance, haversine_distance_with_radius, BoundingBox,
    DistanceMetric, Euclidean, GeoPoint, Haversine, IndexedPoint, MetricKind, PointId, PointSet,
    EARTH_RADIUS_METERS,
};
pub use index::{
    IndexBuilder, IndexConfig, Neighbor, QueryResult, SpatialIndex, TreeStats,
    DEFAULT_LEAF_CAPACITY,
};
pub use ingest::{DelimitedFileSource, MatchEntry, MatchRecord, PositionUpdate};
pub use logging::{init_logging, LoggingConfig, LoggingHandle};
pub use proxima_error::{
    BuildError, DuplicateIdError, ErrorExt, InvalidCoordinateError, QueryError, StatusCode,
};
