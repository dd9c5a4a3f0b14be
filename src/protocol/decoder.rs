//! Buffer View / Accessor
//!
//! Read-only cursor di atas byte milik pihak lain. Validasi wajib saat
//! konstruksi (berjalan di semua build profile):
//! - panjang buffer >= header
//! - awal buffer 8-byte aligned
//! - magic == [`MAGIC`]
//! - `HEADER_SIZE <= total_size <= buffer.len()`
//!
//! Setelah itu semua akses lewat [`RegionView::bytes_at`], jadi tidak ada
//! byte di luar `[0, total_size)` yang pernah dibaca.
//!
//! View meminjam buffer, sehingga use-after-free ditolak compiler:
//!
//! ```compile_fail
//! let view = {
//!     let mut builder = rift::BufferBuilder::new();
//!     let start = builder.begin_object().unwrap();
//!     builder.end_object(start, 1).unwrap();
//!     let buffer = builder.finish();
//!     rift::BufferView::new(&buffer).unwrap()
//! }; // error: `buffer` does not live long enough
//! let _ = view.schema_id();
//! ```

use tracing::debug;

use crate::core::traits::Pod;

use super::error::{Result, RiftError};
use super::message::{ObjectHeader, OffsetTableEntry, ENTRY_SIZE, HEADER_ALIGN, HEADER_SIZE, MAGIC};
use super::views::{check_aligned, ArrayElement, ArrayView, RegionView, StringView};

/// View tervalidasi atas satu object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferView<'a> {
    region: RegionView<'a>,
    header: ObjectHeader,
}

impl<'a> BufferView<'a> {
    /// Validasi header dan bangun view atas `[0, total_size)`.
    ///
    /// Byte setelah `total_size` (object berikutnya, sisa buffer) diabaikan.
    pub fn new(buffer: &'a [u8]) -> Result<Self> {
        Self::validate(buffer).inspect_err(|err| debug!(%err, "rejected object buffer"))
    }

    fn validate(buffer: &'a [u8]) -> Result<Self> {
        let header_bytes = buffer.get(..HEADER_SIZE).ok_or(RiftError::OutOfBounds {
            offset: 0,
            len: HEADER_SIZE,
            limit: buffer.len(),
        })?;
        check_aligned(header_bytes, HEADER_ALIGN)?;

        let header = ObjectHeader::decode(header_bytes)?;
        if header.magic != MAGIC {
            return Err(RiftError::InvalidMagic {
                expected: MAGIC,
                found: header.magic,
            });
        }
        if (header.total_size as usize) < HEADER_SIZE {
            return Err(RiftError::TotalSizeTooSmall(header.total_size));
        }
        let object = buffer
            .get(..header.total_size as usize)
            .ok_or(RiftError::TruncatedObject {
                declared: header.total_size,
                available: buffer.len(),
            })?;

        Ok(Self {
            region: RegionView::new(object),
            header,
        })
    }

    /// Header dalam host order
    #[inline(always)]
    pub fn header(&self) -> ObjectHeader {
        self.header
    }

    #[inline(always)]
    pub fn schema_id(&self) -> u32 {
        self.header.schema_id
    }

    #[inline(always)]
    pub fn total_size(&self) -> u32 {
        self.header.total_size
    }

    #[inline(always)]
    pub fn version_flags(&self) -> u32 {
        self.header.version_flags
    }

    /// Seluruh byte object, termasuk header
    #[inline(always)]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.region.as_bytes()
    }

    #[inline(always)]
    pub fn region(&self) -> RegionView<'a> {
        self.region
    }

    /// Primitive bounds check: gagal jika `offset + size_needed > total_size`.
    #[inline(always)]
    pub fn bytes_at(&self, offset: usize, size_needed: usize) -> Result<&'a [u8]> {
        self.region.bytes_at(offset, size_needed)
    }

    /// Baca fixed field pada offset yang diketahui schema.
    #[inline(always)]
    pub fn read_fixed<T: Pod>(&self, offset: usize) -> Result<T> {
        self.region.read_fixed(offset)
    }

    /// Cari entry `index` di offset table yang dimulai pada `table_offset`.
    ///
    /// `entry_count` berasal dari schema, tidak disimpan di wire.
    pub fn offset_table_entry(
        &self,
        table_offset: usize,
        index: u32,
        entry_count: u32,
    ) -> Result<OffsetTableEntry> {
        if index >= entry_count {
            return Err(RiftError::IndexOutOfRange {
                index,
                len: entry_count,
            });
        }
        if table_offset < HEADER_SIZE {
            return Err(RiftError::TableOverlapsHeader(table_offset as u32));
        }

        // Seluruh table harus di dalam object, bukan hanya entry yang diminta
        let table_len = (entry_count as usize)
            .checked_mul(ENTRY_SIZE)
            .ok_or(RiftError::OutOfBounds {
                offset: table_offset,
                len: usize::MAX,
                limit: self.region.len(),
            })?;
        let table = self.region.bytes_at(table_offset, table_len)?;
        check_aligned(table, std::mem::align_of::<OffsetTableEntry>())?;

        let entry_offset = index as usize * ENTRY_SIZE;
        OffsetTableEntry::decode(&table[entry_offset..entry_offset + ENTRY_SIZE])
    }

    /// String yang ditunjuk `entry` (size = jumlah karakter).
    pub fn string(&self, entry: OffsetTableEntry) -> Result<StringView<'a>> {
        let offset = entry.offset as usize;
        // size + terminator; overflow hanya mungkin di target 32-bit
        let len = (entry.size as usize)
            .checked_add(1)
            .ok_or(RiftError::OutOfBounds {
                offset,
                len: usize::MAX,
                limit: self.region.len(),
            })?;
        let with_nul = self.region.bytes_at(offset, len)?;
        StringView::new(with_nul, offset)
    }

    /// Array yang ditunjuk `entry` (size = jumlah elemen).
    pub fn array<T: ArrayElement<'a>>(&self, entry: OffsetTableEntry) -> Result<ArrayView<'a, T>> {
        let offset = entry.offset as usize;
        let len = (entry.size as usize)
            .checked_mul(T::STRIDE)
            .ok_or(RiftError::OutOfBounds {
                offset,
                len: usize::MAX,
                limit: self.region.len(),
            })?;

        let bytes = self.region.bytes_at(offset, len)?;
        check_aligned(bytes, T::ALIGN)?;
        Ok(ArrayView::new(bytes, entry.size))
    }

    /// Shortcut: resolve entry lalu bangun [`StringView`].
    pub fn string_field(
        &self,
        table_offset: usize,
        index: u32,
        entry_count: u32,
    ) -> Result<StringView<'a>> {
        let entry = self.offset_table_entry(table_offset, index, entry_count)?;
        self.string(entry)
    }

    /// Shortcut: resolve entry lalu bangun [`ArrayView`].
    pub fn array_field<T: ArrayElement<'a>>(
        &self,
        table_offset: usize,
        index: u32,
        entry_count: u32,
    ) -> Result<ArrayView<'a, T>> {
        let entry = self.offset_table_entry(table_offset, index, entry_count)?;
        self.array(entry)
    }
}

/// Kontrak untuk view hasil generate.
///
/// View hasil generate hanya membungkus [`BufferView`]; tidak ada validasi
/// tambahan di luar yang sudah dijamin base view.
pub trait ObjectView<'a>: Sized {
    /// Hash schema yang diimplementasikan view ini
    const SCHEMA_ID: u32;

    fn from_view(view: BufferView<'a>) -> Self;

    /// Base view yang dibungkus
    fn base(&self) -> &BufferView<'a>;

    /// Bangun view dari awal object.
    fn open(buffer: &'a [u8]) -> Result<Self> {
        BufferView::new(buffer).map(Self::from_view)
    }

    /// `schema_id` di header sama dengan [`Self::SCHEMA_ID`].
    ///
    /// Tidak dipanggil oleh `open`; caller yang memutuskan apakah mismatch
    /// berarti buffer ditolak.
    fn schema_matches(&self) -> bool {
        self.base().schema_id() == Self::SCHEMA_ID
    }
}
