use std::fmt;
use std::io::Cursor;
use std::ops::Deref;
use std::sync::Arc;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use memmap2::Mmap;

/// Byte order of the payloads stored in a container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexByteOrder {
    BigEndian,
    LittleEndian,
}

impl IndexByteOrder {
    const BIG_ENDIAN_MARKER: i32 = 1;
    const LITTLE_ENDIAN_MARKER: i32 = 2;

    /// Byte order of the running host
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            IndexByteOrder::BigEndian
        } else {
            IndexByteOrder::LittleEndian
        }
    }

    pub fn marker(&self) -> i32 {
        match self {
            IndexByteOrder::BigEndian => Self::BIG_ENDIAN_MARKER,
            IndexByteOrder::LittleEndian => Self::LITTLE_ENDIAN_MARKER,
        }
    }

    pub fn from_marker(marker: i32) -> Option<Self> {
        match marker {
            Self::BIG_ENDIAN_MARKER => Some(IndexByteOrder::BigEndian),
            Self::LITTLE_ENDIAN_MARKER => Some(IndexByteOrder::LittleEndian),
            _ => None,
        }
    }
}

/// Read-only view of one record's payload inside the mapped container file.
///
/// Cloning a view is cheap and yields an independent handle over the same
/// mapping; nothing is copied or re-mapped.
#[derive(Clone)]
pub struct IndexData {
    map: Arc<Mmap>,
    start: usize,
    len: usize,
    order: IndexByteOrder,
}

impl IndexData {
    pub(crate) fn new(map: Arc<Mmap>, start: usize, len: usize, order: IndexByteOrder) -> Self {
        Self {
            map,
            start,
            len,
            order,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.map[self.start..self.start + self.len]
    }

    pub fn byte_order(&self) -> IndexByteOrder {
        self.order
    }

    /// Fresh read cursor positioned at the start of the payload
    pub fn cursor(&self) -> Cursor<&[u8]> {
        Cursor::new(self.as_bytes())
    }

    pub fn read_i32_at(&self, pos: usize) -> Option<i32> {
        let bytes = self.as_bytes().get(pos..pos.checked_add(4)?)?;
        Some(match self.order {
            IndexByteOrder::BigEndian => BigEndian::read_i32(bytes),
            IndexByteOrder::LittleEndian => LittleEndian::read_i32(bytes),
        })
    }

    pub fn read_u32_at(&self, pos: usize) -> Option<u32> {
        let bytes = self.as_bytes().get(pos..pos.checked_add(4)?)?;
        Some(match self.order {
            IndexByteOrder::BigEndian => BigEndian::read_u32(bytes),
            IndexByteOrder::LittleEndian => LittleEndian::read_u32(bytes),
        })
    }

    pub fn read_i16_at(&self, pos: usize) -> Option<i16> {
        let bytes = self.as_bytes().get(pos..pos.checked_add(2)?)?;
        Some(match self.order {
            IndexByteOrder::BigEndian => BigEndian::read_i16(bytes),
            IndexByteOrder::LittleEndian => LittleEndian::read_i16(bytes),
        })
    }

    /// True if both views point at the same bytes of the same mapping
    pub fn shares_mapping(&self, other: &IndexData) -> bool {
        Arc::ptr_eq(&self.map, &other.map) && self.start == other.start && self.len == other.len
    }
}

impl Deref for IndexData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl AsRef<[u8]> for IndexData {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for IndexData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexData")
            .field("start", &self.start)
            .field("len", &self.len)
            .field("order", &self.order)
            .finish()
    }
}
