pub mod bbox;
pub mod distance;
pub mod point;

// Publicly re-export all types and functions from the submodules to
// simplify access from external code.
pub use bbox::*;
pub use distance::*;
pub use point::*;
