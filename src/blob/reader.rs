//! Bounds-checked scalar reads over an immutable byte buffer
//!
//! All record blobs are little-endian and carry no checksum, so a truncated
//! blob is indistinguishable from a short one. The policy here is graceful
//! degradation: any read that would cross the end of the buffer returns zero
//! instead of failing. Nothing in this module can panic.

/// A read-only view over a byte slice with safe scalar extraction.
#[derive(Debug, Clone, Copy)]
pub struct BlobReader<'a> {
    bytes: &'a [u8],
}

impl<'a> BlobReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        BlobReader { bytes }
    }

    /// Total length of the underlying buffer
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Borrow `count` bytes starting at `offset`, or None if out of range.
    pub fn slice(&self, offset: usize, count: usize) -> Option<&'a [u8]> {
        let end = offset.checked_add(count)?;
        self.bytes.get(offset..end)
    }

    /// Fixed-width little-endian read; zero when the range is out of bounds.
    fn read_array<const N: usize>(&self, offset: usize) -> [u8; N] {
        match self.slice(offset, N) {
            // The slice is exactly N bytes, so try_into cannot fail
            Some(s) => s.try_into().unwrap_or([0u8; N]),
            None => [0u8; N],
        }
    }

    pub fn u8(&self, offset: usize) -> u8 {
        u8::from_le_bytes(self.read_array::<1>(offset))
    }

    pub fn u16(&self, offset: usize) -> u16 {
        u16::from_le_bytes(self.read_array::<2>(offset))
    }

    pub fn u32(&self, offset: usize) -> u32 {
        u32::from_le_bytes(self.read_array::<4>(offset))
    }

    pub fn u64(&self, offset: usize) -> u64 {
        u64::from_le_bytes(self.read_array::<8>(offset))
    }

    pub fn i8(&self, offset: usize) -> i8 {
        i8::from_le_bytes(self.read_array::<1>(offset))
    }

    pub fn i16(&self, offset: usize) -> i16 {
        i16::from_le_bytes(self.read_array::<2>(offset))
    }

    pub fn i32(&self, offset: usize) -> i32 {
        i32::from_le_bytes(self.read_array::<4>(offset))
    }

    pub fn i64(&self, offset: usize) -> i64 {
        i64::from_le_bytes(self.read_array::<8>(offset))
    }

    pub fn f32(&self, offset: usize) -> f32 {
        f32::from_le_bytes(self.read_array::<4>(offset))
    }
}
