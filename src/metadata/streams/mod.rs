//! Metadata streams.
//!
//! The metadata root is followed by a directory of named streams ([`StreamHeader`]). This
//! crate reads the directory itself and the optional hot-table stream (`#!`) found in
//! pre-compiled images; the heaps and the table stream are consumed through
//! [`crate::metadata::module::ModuleContext`].

pub mod hot;
mod streamheader;

pub use streamheader::*;
