//! Building blocks of the image writer.
//!
//! The writer lays out an image as a sequence of [`Chunk`]s. Each chunk is sized before
//! layout, receives its file offset and RVA once layout is done and is then written out in
//! order.

mod chunk;
mod strongname;

pub use chunk::*;
pub use strongname::*;
