//! Little-endian primitive access and ECMA-335 compressed integers.
//!
//! Every read is bounds-checked against the provided slice and advances the caller-supplied
//! offset only on success. Writers append to a `Vec<u8>`, which is how signature and blob
//! encoders build their output.
//!
//! # Reference
//! - [ECMA-335 II.23.2: Blobs and signatures](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{Error::OutOfBounds, Result};

/// Largest value representable by the 4-byte compressed integer form.
pub const MAX_COMPRESSED_UINT: u32 = 0x1FFF_FFFF;

/// Primitive types that can be read from and written to little-endian byte sequences.
pub trait CilIO: Sized {
    /// Fixed-size byte array representation of the type
    type Bytes: Sized + AsRef<[u8]> + for<'a> TryFrom<&'a [u8]>;

    /// Build the value from its little-endian representation
    fn from_le_bytes(bytes: Self::Bytes) -> Self;

    /// Produce the little-endian representation of the value
    fn to_le_bytes(self) -> Self::Bytes;
}

macro_rules! impl_cilio {
    ($($ty:ty),*) => {
        $(
            impl CilIO for $ty {
                type Bytes = [u8; std::mem::size_of::<$ty>()];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }

                fn to_le_bytes(self) -> Self::Bytes {
                    <$ty>::to_le_bytes(self)
                }
            }
        )*
    };
}

impl_cilio!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

/// Read a `T` from the start of `data`
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if `data` is shorter than `T`
pub fn read_le<T: CilIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Read a `T` at `offset`, advancing `offset` past it
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the value does not fit into `data`
pub fn read_le_at<T: CilIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(OutOfBounds);
    };

    *offset = end;
    Ok(T::from_le_bytes(read))
}

/// Read a heap or table index that is either 2 or 4 bytes wide
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the index does not fit into `data`
pub fn read_le_at_dyn(data: &[u8], offset: &mut usize, is_large: bool) -> Result<u32> {
    let res = if is_large {
        read_le_at::<u32>(data, offset)?
    } else {
        u32::from(read_le_at::<u16>(data, offset)?)
    };

    Ok(res)
}

/// Append the little-endian representation of `value` to `buffer`
pub fn write_le<T: CilIO>(buffer: &mut Vec<u8>, value: T) {
    buffer.extend_from_slice(value.to_le_bytes().as_ref());
}

/// Append `value` as a compressed unsigned integer (ECMA-335 II.23.2)
///
/// # Errors
/// Returns [`crate::Error::Encoding`] for values above [`MAX_COMPRESSED_UINT`]
pub fn write_compressed_uint(value: u32, buffer: &mut Vec<u8>) -> Result<()> {
    match value {
        0..=0x7F => buffer.push(value as u8),
        0x80..=0x3FFF => {
            buffer.push(0x80 | (value >> 8) as u8);
            buffer.push(value as u8);
        }
        0x4000..=MAX_COMPRESSED_UINT => {
            buffer.push(0xC0 | (value >> 24) as u8);
            buffer.push((value >> 16) as u8);
            buffer.push((value >> 8) as u8);
            buffer.push(value as u8);
        }
        _ => {
            return Err(crate::Error::Encoding(format!(
                "compressed integer out of range - {value:#x}"
            )))
        }
    }

    Ok(())
}

/// Append `value` as a compressed signed integer (ECMA-335 II.23.2)
///
/// # Errors
/// Returns [`crate::Error::Encoding`] for values outside of `-0x1000_0000..=0x0FFF_FFFF`
pub fn write_compressed_int(value: i32, buffer: &mut Vec<u8>) -> Result<()> {
    #[allow(clippy::cast_sign_loss)]
    let rotated = ((value as u32) << 1) | ((value as u32) >> 31);

    if (-0x40..=0x3F).contains(&value) {
        buffer.push((rotated & 0x7F) as u8);
    } else if (-0x2000..=0x1FFF).contains(&value) {
        let rotated = rotated & 0x3FFF;
        buffer.push(0x80 | (rotated >> 8) as u8);
        buffer.push(rotated as u8);
    } else if (-0x1000_0000..=0x0FFF_FFFF).contains(&value) {
        let rotated = rotated & MAX_COMPRESSED_UINT;
        buffer.push(0xC0 | (rotated >> 24) as u8);
        buffer.push((rotated >> 16) as u8);
        buffer.push((rotated >> 8) as u8);
        buffer.push(rotated as u8);
    } else {
        return Err(crate::Error::Encoding(format!(
            "compressed signed integer out of range - {value}"
        )));
    }

    Ok(())
}
