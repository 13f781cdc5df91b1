//! Загрузка статического набора точек из файла с разделителями.
//!
//! Формат строки: `id<d>lon<d>lat[<d>payload]`. Пустые строки и строки,
//! начинающиеся с `#`, пропускаются.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use bytes::Bytes;
use tracing::debug;

use crate::{GeoPoint, IndexedPoint, LoadError, PointId, PointSet, PointSource};

/// Источник точек: файл `id,lon,lat[,payload]`.
///
/// Файл перечитывается целиком при каждом вызове [`PointSource::load`].
#[derive(Debug, Clone)]
pub struct DelimitedFileSource {
    path: PathBuf,
    delimiter: char,
    has_header: bool,
}

impl DelimitedFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: ',',
            has_header: false,
        }
    }

    pub fn with_delimiter(
        mut self,
        delimiter: char,
    ) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Пропускать первую значимую строку как заголовок.
    pub fn with_header(
        mut self,
        has_header: bool,
    ) -> Self {
        self.has_header = has_header;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Разбирает набор точек из произвольного читателя.
    pub fn parse<R: BufRead>(
        &self,
        reader: R,
    ) -> Result<PointSet, LoadError> {
        let mut points = PointSet::new();
        let mut header_pending = self.has_header;

        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|err| LoadError::io(&self.path, err))?;
            let row = line.trim();
            if row.is_empty() || row.starts_with('#') {
                continue;
            }
            if header_pending {
                header_pending = false;
                continue;
            }
            points.push(self.parse_row(idx + 1, row)?);
        }

        Ok(points)
    }

    fn parse_row(
        &self,
        line: usize,
        row: &str,
    ) -> Result<IndexedPoint, LoadError> {
        let mut fields = row.splitn(4, self.delimiter).map(str::trim);

        let (Some(id), Some(lon), Some(lat)) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(LoadError::invalid_row(
                line,
                format!("expected at least 3 fields separated by '{}'", self.delimiter),
            ));
        };
        if id.is_empty() {
            return Err(LoadError::invalid_row(line, "empty id"));
        }

        let lon = parse_coordinate(line, "longitude", lon)?;
        let lat = parse_coordinate(line, "latitude", lat)?;

        let point = IndexedPoint::new(PointId::parse(id), GeoPoint::from_lon_lat(lon, lat));
        Ok(match fields.next() {
            Some(payload) if !payload.is_empty() => {
                point.with_payload(Bytes::copy_from_slice(payload.as_bytes()))
            }
            _ => point,
        })
    }
}

fn parse_coordinate(
    line: usize,
    name: &str,
    raw: &str,
) -> Result<f64, LoadError> {
    raw.parse::<f64>()
        .map_err(|err| LoadError::invalid_row(line, format!("invalid {name} '{raw}': {err}")))
}

impl PointSource for DelimitedFileSource {
    fn load(&self) -> Result<PointSet, LoadError> {
        let file = File::open(&self.path).map_err(|err| LoadError::io(&self.path, err))?;
        let points = self.parse(BufReader::new(file))?;
        debug!(path = %self.path.display(), points = points.len(), "loaded point set");
        Ok(points)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
