//! Custom debug information attached to metadata rows.
//!
//! Portable PDBs store extra debugging data in `CustomDebugInformation` rows: a kind GUID and
//! a blob whose layout depends on the kind. Values are exposed as [`PdbCustomDebugInfo`];
//! kinds this crate does not interpret keep their raw blob.

use std::sync::Arc;

use crate::{file::parser::Parser, Result};

/// The custom debug information attached to one entity
pub type PdbCustomDebugInfoList = Arc<boxcar::Vec<PdbCustomDebugInfo>>;

/// The kind GUID of a custom debug information record, in on-disk byte order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomDebugKind {
    /// `CC110556-A091-4D38-9FEC-25AB9A351A6A`
    SourceLink,
    /// `0E8A571B-6926-466E-B4AD-8AB04611F5FE`
    EmbeddedSource,
    /// `B5FEEC05-8CD0-4A83-96DA-466284BB4BD8`
    CompilationMetadata,
    /// `B1C2ABE1-8BF0-497A-A9B1-02FA8571E544`
    CompilationOptions,
    /// Any other GUID
    Unknown([u8; 16]),
}

#[rustfmt::skip]
const KNOWN_KINDS: [(CustomDebugKind, [u8; 16]); 4] = [
    (CustomDebugKind::SourceLink, [0x56, 0x05, 0x11, 0xCC, 0x91, 0xA0, 0x38, 0x4D, 0x9F, 0xEC, 0x25, 0xAB, 0x9A, 0x35, 0x1A, 0x6A]),
    (CustomDebugKind::EmbeddedSource, [0x1B, 0x57, 0x8A, 0x0E, 0x26, 0x69, 0x6E, 0x46, 0xB4, 0xAD, 0x8A, 0xB0, 0x46, 0x11, 0xF5, 0xFE]),
    (CustomDebugKind::CompilationMetadata, [0x05, 0xEC, 0xFE, 0xB5, 0xD0, 0x8C, 0x83, 0x4A, 0x96, 0xDA, 0x46, 0x62, 0x84, 0xBB, 0x4B, 0xD8]),
    (CustomDebugKind::CompilationOptions, [0xE1, 0xAB, 0xC2, 0xB1, 0xF0, 0x8B, 0x7A, 0x49, 0xA9, 0xB1, 0x02, 0xFA, 0x85, 0x71, 0xE5, 0x44]),
];

impl CustomDebugKind {
    /// Map a GUID to its kind
    #[must_use]
    pub fn from_guid(guid: [u8; 16]) -> Self {
        KNOWN_KINDS
            .iter()
            .find(|(_, known)| *known == guid)
            .map_or(CustomDebugKind::Unknown(guid), |(kind, _)| *kind)
    }

    /// The GUID of this kind
    #[must_use]
    pub fn guid(&self) -> [u8; 16] {
        match self {
            CustomDebugKind::Unknown(guid) => *guid,
            known => KNOWN_KINDS
                .iter()
                .find(|(kind, _)| kind == known)
                .map_or([0; 16], |(_, guid)| *guid),
        }
    }
}

/// A decoded custom debug information record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdbCustomDebugInfo {
    /// Source Link JSON document
    SourceLink {
        /// The JSON text
        document: String,
    },
    /// Embedded source file; `format` is the leading i32 (0 = uncompressed, > 0 = deflated size)
    EmbeddedSource {
        /// Compression marker
        format: i32,
        /// The (possibly compressed) file bytes
        content: Vec<u8>,
    },
    /// Compiler provided NUL-separated key/value pairs describing referenced metadata
    CompilationMetadata {
        /// Raw text
        metadata: String,
    },
    /// Compiler options as NUL-separated key/value pairs
    CompilationOptions {
        /// Parsed `(key, value)` pairs
        options: Vec<(String, String)>,
    },
    /// A kind this crate does not interpret
    Unknown {
        /// Kind GUID
        kind: CustomDebugKind,
        /// Raw blob
        data: Vec<u8>,
    },
}

impl PdbCustomDebugInfo {
    /// Decode a blob of the given kind
    ///
    /// # Errors
    /// Returns an error if an embedded source blob is shorter than its header
    pub fn parse(kind: CustomDebugKind, blob: &[u8]) -> Result<Self> {
        let text = || String::from_utf8_lossy(blob).into_owned();

        Ok(match kind {
            CustomDebugKind::SourceLink => PdbCustomDebugInfo::SourceLink { document: text() },
            CustomDebugKind::EmbeddedSource => {
                let mut parser = Parser::new(blob);
                let format = parser.read_le::<i32>()?;
                PdbCustomDebugInfo::EmbeddedSource {
                    format,
                    content: blob[parser.pos()..].to_vec(),
                }
            }
            CustomDebugKind::CompilationMetadata => {
                PdbCustomDebugInfo::CompilationMetadata { metadata: text() }
            }
            CustomDebugKind::CompilationOptions => {
                let mut parts = blob
                    .split(|b| *b == 0)
                    .map(|part| String::from_utf8_lossy(part).into_owned());
                let mut options = Vec::new();
                while let (Some(key), Some(value)) = (parts.next(), parts.next()) {
                    options.push((key, value));
                }
                PdbCustomDebugInfo::CompilationOptions { options }
            }
            CustomDebugKind::Unknown(_) => PdbCustomDebugInfo::Unknown {
                kind,
                data: blob.to_vec(),
            },
        })
    }

    /// The kind of this record
    #[must_use]
    pub fn kind(&self) -> CustomDebugKind {
        match self {
            PdbCustomDebugInfo::SourceLink { .. } => CustomDebugKind::SourceLink,
            PdbCustomDebugInfo::EmbeddedSource { .. } => CustomDebugKind::EmbeddedSource,
            PdbCustomDebugInfo::CompilationMetadata { .. } => CustomDebugKind::CompilationMetadata,
            PdbCustomDebugInfo::CompilationOptions { .. } => CustomDebugKind::CompilationOptions,
            PdbCustomDebugInfo::Unknown { kind, .. } => *kind,
        }
    }
}
