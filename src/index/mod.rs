pub mod builder;
pub mod result;
pub mod spatial_index;

// Publicly re-export all types from the submodules to simplify access from
// external code.
pub use builder::*;
pub use result::*;
pub use spatial_index::*;
