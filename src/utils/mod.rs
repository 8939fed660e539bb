//! Shared helpers that are not tied to a single metadata structure.

pub mod synchronization;
