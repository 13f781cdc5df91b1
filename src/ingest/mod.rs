//! Тонкий слой ввода-вывода вокруг движка.
//!
//! - `update`: JSON-обновления позиций движущихся объектов.
//! - `source`: [`PointSource`](crate::PointSource) из файла с разделителями.
//! - `record`: JSON-записи совпадений, отправляемые обратно в поток.

pub mod record;
pub mod source;
pub mod update;

pub use record::*;
pub use source::*;
pub use update::*;
