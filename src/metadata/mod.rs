//! Metadata parsing and representation for .NET assemblies.
//!
//! # Key Components
//!
//! - [`token`] - Metadata table row references used throughout .NET
//! - [`tables`] - Table identifiers, coded indices and the `MethodSpec` table
//! - [`signatures`] - Method and type signature decoding and encoding
//! - [`customattributes`] - Custom attribute blobs, raw or decoded
//! - [`root`] - The metadata root and its stream directory
//! - [`streams`] - Stream headers and the hot-table stream
//! - [`module`] - Lookups an entity needs from the module it was read from
//!
//! # Examples
//!
//! ```rust
//! use dotmeta::metadata::{root::MetadataHeader, streams::hot::HotTableGeneration};
//!
//! #[rustfmt::skip]
//! let data = [
//!     0x42, 0x53, 0x4A, 0x42, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00,
//!     0x0C, 0x00, 0x00, 0x00, b'v', b'2', b'.', b'0', b'.', b'5', b'0', b'7', b'2', b'7', 0x00, 0x00,
//!     0x00, 0x00, 0x00, 0x00,
//! ];
//!
//! let header = MetadataHeader::read(&data, true)?;
//! assert_eq!(header.version, "v2.0.50727");
//! assert_eq!(HotTableGeneration::from_version(&header.version), HotTableGeneration::Clr20);
//! # Ok::<(), dotmeta::Error>(())
//! ```

/// Implementation of custom attribute parsing and representation
pub mod customattributes;
/// Custom debug information records
pub mod customdebuginformation;
/// The owning-module lookup boundary
pub mod module;
/// Managed PDB records
pub mod pdb;
/// The metadata root
pub mod root;
/// Signature model and codec
pub mod signatures;
/// Metadata streams
pub mod streams;
/// Metadata tables
pub mod tables;
/// Metadata tokens
pub mod token;
