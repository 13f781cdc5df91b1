//! Движок сопоставления: подменяемый текущий индекс, его счётчики и задача
//! периодической перезагрузки.
//!
//! - `match_engine`: [`MatchEngine`] с чтением без блокировок и атомарной
//!   подменой.
//! - `metrics`: атомарные счётчики и их снимок [`EngineStats`].
//! - `reload`: [`PointSource`] и цикл [`Reloader`] загрузка → сборка → подмена.

pub mod match_engine;
pub mod metrics;
pub mod reload;

pub use match_engine::*;
pub use metrics::*;
pub use reload::*;
