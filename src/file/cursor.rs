//! Seekable byte cursors.
//!
//! [`ByteCursor`] is the random-access reader abstraction consumed by the hot-table index and
//! by deferred custom attribute blobs. [`SliceCursor`] implements it over shared, immutable
//! image bytes: cloning a cursor (or calling [`SliceCursor::view`]) yields an independent
//! position over the same bytes, which is how concurrent readers avoid stepping on each other.

use std::sync::Arc;

use crate::{
    file::io::read_le,
    Error::{Disposed, OutOfBounds},
    Result,
};

/// A seekable, random-access byte reader.
///
/// Positions are relative to the start of the cursor's window. All reads advance the position
/// by the number of bytes consumed.
pub trait ByteCursor: Send {
    /// Length of the readable window in bytes
    fn len(&self) -> u64;

    /// Returns `true` if the window is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current position
    fn position(&self) -> u64;

    /// Set the current position. Positions past the end are allowed, reads from there fail.
    fn set_position(&mut self, position: u64);

    /// Fill `buffer` from the current position
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if not enough bytes are left, or
    /// [`crate::Error::Disposed`] after [`ByteCursor::dispose`]
    fn read_into(&mut self, buffer: &mut [u8]) -> Result<()>;

    /// Release the underlying bytes. Calling this more than once is a no-op.
    fn dispose(&mut self);

    /// Read one byte
    ///
    /// # Errors
    /// See [`ByteCursor::read_into`]
    fn read_u8(&mut self) -> Result<u8> {
        let mut buffer = [0u8; 1];
        self.read_into(&mut buffer)?;
        Ok(buffer[0])
    }

    /// Read a little-endian `u16`
    ///
    /// # Errors
    /// See [`ByteCursor::read_into`]
    fn read_u16(&mut self) -> Result<u16> {
        let mut buffer = [0u8; 2];
        self.read_into(&mut buffer)?;
        read_le::<u16>(&buffer)
    }

    /// Read a little-endian `u32`
    ///
    /// # Errors
    /// See [`ByteCursor::read_into`]
    fn read_u32(&mut self) -> Result<u32> {
        let mut buffer = [0u8; 4];
        self.read_into(&mut buffer)?;
        read_le::<u32>(&buffer)
    }

    /// Read a little-endian `i32`
    ///
    /// # Errors
    /// See [`ByteCursor::read_into`]
    fn read_i32(&mut self) -> Result<i32> {
        let mut buffer = [0u8; 4];
        self.read_into(&mut buffer)?;
        read_le::<i32>(&buffer)
    }

    /// Read a little-endian `u16` at an absolute position, leaving the cursor after it
    ///
    /// # Errors
    /// See [`ByteCursor::read_into`]
    fn read_u16_at(&mut self, position: u64) -> Result<u16> {
        self.set_position(position);
        self.read_u16()
    }

    /// Read `len` bytes
    ///
    /// # Errors
    /// See [`ByteCursor::read_into`]
    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; len];
        self.read_into(&mut buffer)?;
        Ok(buffer)
    }

    /// Read everything from the current position up to the end of the window
    ///
    /// # Errors
    /// See [`ByteCursor::read_into`]
    fn read_to_end(&mut self) -> Result<Vec<u8>> {
        let remaining = self.len().saturating_sub(self.position());
        let len = usize::try_from(remaining).map_err(|_| OutOfBounds)?;
        self.read_bytes(len)
    }
}

/// A [`ByteCursor`] over a window of shared, immutable bytes.
///
/// # Example
///
/// ```rust
/// use dotmeta::file::cursor::{ByteCursor, SliceCursor};
///
/// let mut cursor = SliceCursor::new(vec![0x01, 0x02, 0x03, 0x04]);
/// let mut view = cursor.view();
/// view.set_position(2);
/// assert_eq!(view.read_u16()?, 0x0403);
/// assert_eq!(cursor.read_u8()?, 0x01);
/// # Ok::<(), dotmeta::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct SliceCursor {
    data: Option<Arc<[u8]>>,
    start: usize,
    end: usize,
    position: u64,
}

impl SliceCursor {
    /// Create a cursor over all of `data`
    pub fn new(data: impl Into<Arc<[u8]>>) -> Self {
        let data: Arc<[u8]> = data.into();
        let end = data.len();
        SliceCursor {
            data: Some(data),
            start: 0,
            end,
            position: 0,
        }
    }

    /// Create a cursor over `len` bytes of `data` starting at `start`
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the window exceeds `data`
    pub fn with_window(data: Arc<[u8]>, start: usize, len: usize) -> Result<Self> {
        match start.checked_add(len) {
            Some(end) if end <= data.len() => Ok(SliceCursor {
                data: Some(data),
                start,
                end,
                position: 0,
            }),
            _ => Err(OutOfBounds),
        }
    }

    /// A new cursor over the same window with its own position, starting at `0`.
    #[must_use]
    pub fn view(&self) -> SliceCursor {
        SliceCursor {
            position: 0,
            ..self.clone()
        }
    }

    /// Returns `true` once [`ByteCursor::dispose`] has been called
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.data.is_none()
    }
}

impl ByteCursor for SliceCursor {
    fn len(&self) -> u64 {
        if self.data.is_some() {
            (self.end - self.start) as u64
        } else {
            0
        }
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn set_position(&mut self, position: u64) {
        self.position = position;
    }

    fn read_into(&mut self, buffer: &mut [u8]) -> Result<()> {
        let Some(data) = &self.data else {
            return Err(Disposed);
        };

        let window = &data[self.start..self.end];
        let start = usize::try_from(self.position).map_err(|_| OutOfBounds)?;
        let Some(end) = start.checked_add(buffer.len()) else {
            return Err(OutOfBounds);
        };
        if end > window.len() {
            return Err(OutOfBounds);
        }

        buffer.copy_from_slice(&window[start..end]);
        self.position = end as u64;
        Ok(())
    }

    fn dispose(&mut self) {
        self.data = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_reads() {
        let mut cursor = SliceCursor::new(vec![0x01, 0x02, 0x03, 0x04, 0xFE, 0xFF, 0xFF, 0xFF]);

        assert_eq!(cursor.read_u8().unwrap(), 0x01);
        assert_eq!(cursor.read_u16().unwrap(), 0x0302);
        cursor.set_position(4);
        assert_eq!(cursor.read_i32().unwrap(), -2);
        assert_eq!(cursor.position(), 8);
        assert!(matches!(cursor.read_u8(), Err(OutOfBounds)));
        assert_eq!(cursor.read_u16_at(0).unwrap(), 0x0201);
    }

    #[test]
    fn window_and_drain() {
        let data: Arc<[u8]> = Arc::from(vec![0xAA, 0x01, 0x02, 0x03, 0xBB]);
        let mut cursor = SliceCursor::with_window(data.clone(), 1, 3).unwrap();

        assert_eq!(cursor.len(), 3);
        cursor.set_position(1);
        assert_eq!(cursor.read_to_end().unwrap(), vec![0x02, 0x03]);
        assert!(cursor.read_to_end().unwrap().is_empty());

        assert!(SliceCursor::with_window(data, 3, 3).is_err());
    }

    #[test]
    fn views_are_independent() {
        let cursor = SliceCursor::new(vec![0x10, 0x20, 0x30]);
        let mut a = cursor.view();
        let mut b = cursor.view();

        a.set_position(2);
        assert_eq!(a.read_u8().unwrap(), 0x30);
        assert_eq!(b.read_u8().unwrap(), 0x10);
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn dispose_is_idempotent() {
        let mut cursor = SliceCursor::new(vec![0x10]);
        cursor.dispose();
        cursor.dispose();

        assert!(cursor.is_disposed());
        assert_eq!(cursor.len(), 0);
        assert!(matches!(cursor.read_u8(), Err(Disposed)));
    }
}
