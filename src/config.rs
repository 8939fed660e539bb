//! Reader configuration
//!
//! [`ReaderOptions`] collects the knobs that influence how strictly metadata is parsed. It is
//! a plain value: nothing is read from files or the environment.

use crate::metadata::signatures::MAX_RECURSION_DEPTH;

/// Address mask applied when relocating hot-table displacements
///
/// Hot-table headers store signed displacements that are added to the stream base and then
/// masked to the address width of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetMask {
    /// 32-bit images
    #[default]
    Bits32,
    /// 64-bit images
    Bits64,
}

impl OffsetMask {
    /// The mask value
    #[must_use]
    pub fn value(self) -> u64 {
        match self {
            OffsetMask::Bits32 => 0xFFFF_FFFF,
            OffsetMask::Bits64 => u64::MAX,
        }
    }
}

/// Options for reading metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Verify the metadata header magic, version and stream headers
    pub verify_header: bool,
    /// Maximum nesting of type signatures before decoding fails (default: 64)
    pub max_signature_depth: usize,
    /// Address mask for hot-table offsets
    pub hot_table_mask: OffsetMask,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            verify_header: true,
            max_signature_depth: MAX_RECURSION_DEPTH,
            hot_table_mask: OffsetMask::Bits32,
        }
    }
}

impl ReaderOptions {
    /// Verify everything, with a tighter signature nesting limit
    #[must_use]
    pub fn strict() -> Self {
        Self {
            verify_header: true,
            max_signature_depth: 32,
            ..Self::default()
        }
    }

    /// Skip header verification, for damaged or obfuscated images
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            verify_header: false,
            max_signature_depth: 256,
            ..Self::default()
        }
    }

    /// Use the given address mask for hot-table offsets
    #[must_use]
    pub fn with_hot_table_mask(mut self, mask: OffsetMask) -> Self {
        self.hot_table_mask = mask;
        self
    }
}
