pub mod build;
pub mod query;

// Публичный экспорт всех типов ошибок из вложенных модулей, чтобы упростить
// доступ к ним из внешнего кода.
pub use build::*;
pub use query::*;
