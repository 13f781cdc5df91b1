pub mod load;
pub mod settings;

pub use load::*;
pub use settings::*;
