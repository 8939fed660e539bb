// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(clippy::too_many_arguments)]

//! # dotmeta
//!
//! The metadata object model core of a .NET (ECMA-335) assembly reader and writer.
//!
//! ## Features
//!
//! - **Signatures** - Decode and encode calling-convention, method, property, field, local
//!   and generic instantiation signatures, bit-exact in both directions
//! - **Lazy entities** - Row-backed `MethodSpec` entities that resolve their columns through
//!   the owning module and materialize custom attributes once, even under concurrent access
//! - **Custom attributes** - Raw or decoded attribute blobs with a deferred source for the
//!   original bytes
//! - **Metadata root** - Parse and write the metadata header and its stream directory
//! - **Hot tables** - Row lookup in the `#!` stream of pre-compiled images, for both the
//!   CLR 2.0 and CLR 4.0 layouts
//!
//! ## Quick Start
//!
//! ```rust
//! use dotmeta::prelude::*;
//!
//! let blob = [0x30, 0x01, 0x02, 0x1E, 0x00, 0x1E, 0x00, 0x08];
//! let sig = parse_method_signature(&blob)?;
//! assert!(sig.generic() && sig.has_this());
//! assert_eq!(sig.gen_param_count, 1);
//! assert_eq!(encode_method_signature(&sig)?, blob);
//! # Ok::<(), dotmeta::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`metadata`] - Tokens, tables, signatures, custom attributes, the metadata root and the
//!   hot-table stream
//! - [`file`] - Byte parsers and cursors the decoders read from
//! - [`writer`] - Fixed-size chunks of the image writer
//! - [`config`] - [`ReaderOptions`] for header verification and decoding limits
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events and never installs a subscriber: `debug` when a corrupt
//! hot-table header is skipped, `warn` when a custom attribute blob is kept undecoded and
//! `trace` when a lazily computed value loses an install race.
//!
//! ### References
//!
//! - [ECMA-335 Standard](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf) - Official CLI specification
#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use dotmeta::prelude::*;
///
/// let sig = MethodSig::create_static(TypeSig::Void, [TypeSig::I4]);
/// assert!(!sig.has_this());
/// ```
pub mod prelude;

/// Options that control how metadata is read
pub mod config;

/// Low-level byte access: the little-endian parser, compressed integers and seekable cursors
pub mod file;

/// Definitions, parsing and encoding of CIL metadata based on ECMA-335
///
/// # Key Components
///
/// - [`metadata::root`] - Metadata root and stream directory
/// - [`metadata::streams::hot`] - Hot-table stream index
/// - [`metadata::signatures`] - Signature model, decoder, encoder and name rendering
/// - [`metadata::tables`] - Table identifiers, coded indices and the `MethodSpec` table
/// - [`metadata::customattributes`] - Custom attribute blobs
/// - [`metadata::module`] - The lookup boundary between entities and their module
pub mod metadata;

/// Utilities shared across modules
pub mod utils;

/// Building blocks of the image writer
pub mod writer;

/// `dotmeta` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `dotmeta` Error type
///
/// The main error type for all operations in this crate.
pub use error::Error;

/// Options for reading metadata, see [`config::ReaderOptions`]
pub use config::{OffsetMask, ReaderOptions};
