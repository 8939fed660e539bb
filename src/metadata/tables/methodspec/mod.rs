//! # `MethodSpec` Table Module
//!
//! This module provides access to the `MethodSpec` metadata table, which represents
//! instantiations of generic methods.
//!
//! The module follows a dual-variant pattern:
//! - `MethodSpecRaw`: Raw table data with unresolved indexes
//! - `MethodSpec`: The entity trait, implemented by `MethodSpecUser` for entities created in
//!   code and by `MethodSpecMd` for entities read from a module
//!
//! ## Usage
//!
//! ```rust
//! use dotmeta::metadata::tables::{MethodSpec, MethodSpecMd, MethodSpecRaw, MethodSpecUser};
//! ```
use crate::metadata::token::Token;
use crossbeam_skiplist::SkipMap;
use std::sync::Arc;

mod loader;
mod md;
mod owned;
mod raw;

pub use loader::*;
pub use md::*;
pub use owned::*;
pub use raw::*;

/// A map that holds the mapping of Token to parsed `MethodSpec`
pub type MethodSpecMap = SkipMap<Token, MethodSpecRc>;
/// A vector that holds a list of `MethodSpec`
pub type MethodSpecList = Arc<boxcar::Vec<MethodSpecRc>>;
/// A reference to a `MethodSpec`
pub type MethodSpecRc = Arc<dyn MethodSpec>;
