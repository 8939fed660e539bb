//! Low-level byte access: little-endian primitives, compressed integers, the slice
//! [`parser::Parser`] used by all decoders and the seekable [`cursor::ByteCursor`].

pub mod cursor;
pub mod io;
pub mod parser;
