//! Shared fixtures for the unit tests.


pub use hotstream::*;
pub use module::*;
