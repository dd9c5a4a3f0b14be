//! Buffer Builder
//!
//! Satu buffer growable, satu write cursor (= panjang buffer saat ini).
//!
//! Protokol penulisan satu object:
//! 1. `begin_object()` -> reserve header (magic langsung ditulis)
//! 2. fixed fields via `write_value` (urutan schema, sudah aligned)
//! 3. `reserve_offset_table_entry()` per field variable
//! 4. `add_string` / `add_array`, lalu `update_offset_table_entry`
//! 5. `end_object()` -> back-patch header dengan `total_size`
//!
//! Semua handle yang dikembalikan adalah offset, bukan alamat: storage boleh
//! pindah saat buffer tumbuh.

use std::ops::{Deref, Range};

use tracing::{debug, trace};
use zerocopy::IntoBytes;

use crate::core::align::{is_aligned, padding_for};
use crate::core::traits::{Pod, VariableSize};

use super::error::{checked_u32, Result, RiftError};
use super::message::{ObjectHeader, OffsetTableEntry, ENTRY_ALIGN, ENTRY_SIZE, HEADER_ALIGN, HEADER_SIZE};

const WORD: usize = std::mem::size_of::<u64>();

/// Builder configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuilderConfig {
    /// Kapasitas awal buffer dalam bytes
    pub initial_capacity: usize,
    /// `version_flags` default untuk setiap header
    pub version_flags: u32,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 1024,
            version_flags: 0,
        }
    }
}

/// Handle object yang sedang dibangun (offset awal header).
///
/// Terikat ke generation builder; tidak berlaku lagi setelah `reset()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectStart {
    offset: usize,
    generation: u32,
}

impl ObjectStart {
    #[inline(always)]
    pub fn offset(self) -> usize {
        self.offset
    }
}

/// Handle slot offset table yang sudah di-reserve.
///
/// Hanya slot ini (dan header object) yang boleh ditulis ulang, dan hanya
/// dalam generation builder yang sama.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntrySlot {
    offset: usize,
    generation: u32,
}

impl EntrySlot {
    #[inline(always)]
    pub fn offset(self) -> usize {
        self.offset
    }
}

/// Buffer Builder
///
/// Storage berupa `Vec<u64>` supaya awal buffer selalu 8-byte aligned;
/// offset yang aligned di buffer juga aligned di memori.
pub struct BufferBuilder {
    words: Vec<u64>,
    len: usize,
    /// Naik setiap `reset()`, handle lama ditolak
    generation: u32,
    config: BuilderConfig,
}

impl Default for BufferBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferBuilder {
    /// Builder dengan konfigurasi default
    pub fn new() -> Self {
        Self::with_config(BuilderConfig::default())
    }

    /// Builder dengan kapasitas awal tertentu
    pub fn with_capacity(initial_capacity: usize) -> Self {
        Self::with_config(BuilderConfig {
            initial_capacity,
            ..BuilderConfig::default()
        })
    }

    pub fn with_config(config: BuilderConfig) -> Self {
        let mut words = Vec::new();
        // Kapasitas awal hanya hint; kalau gagal, growth berikutnya yang akan error
        if words.try_reserve_exact(config.initial_capacity.div_ceil(WORD)).is_ok() {
            words.resize(words.capacity(), 0);
        }

        Self {
            words,
            len: 0,
            generation: 0,
            config,
        }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Jumlah byte yang sudah ditulis
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Posisi write cursor (sama dengan `len`)
    #[inline(always)]
    pub fn current_offset(&self) -> usize {
        self.len
    }

    /// Kapasitas storage saat ini dalam bytes
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.words.len() * WORD
    }

    /// Isi buffer yang sudah ditulis
    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.words.as_bytes()[..self.len]
    }

    /// Reset builder untuk reuse. Storage dipertahankan, semua handle
    /// yang sudah dikeluarkan menjadi stale.
    #[inline(always)]
    pub fn reset(&mut self) {
        self.len = 0;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Serahkan buffer final ke storage/transport.
    pub fn finish(self) -> SerializedBuffer {
        SerializedBuffer {
            words: self.words,
            len: self.len,
        }
    }

    /// Pastikan ada ruang untuk `additional` bytes lagi.
    ///
    /// Growth geometris (minimal 2x) untuk amortisasi realokasi.
    pub fn ensure_capacity(&mut self, additional: usize) -> Result<()> {
        let needed = self
            .len
            .checked_add(additional)
            .ok_or(RiftError::ResourceExhausted {
                requested: additional,
            })?;
        if needed <= self.capacity() {
            return Ok(());
        }

        let needed_words = needed.div_ceil(WORD);
        let new_words = needed_words.max(self.words.len().saturating_mul(2));

        self.words
            .try_reserve_exact(new_words - self.words.len())
            .map_err(|_| RiftError::ResourceExhausted { requested: needed })?;
        self.words.resize(new_words, 0);

        debug!(
            capacity = self.capacity(),
            len = self.len,
            "builder buffer grown"
        );
        Ok(())
    }

    /// Majukan cursor `n` bytes, return range yang harus diisi caller.
    #[inline(always)]
    fn advance(&mut self, n: usize) -> Result<Range<usize>> {
        self.ensure_capacity(n)?;
        let start = self.len;
        self.len += n;
        Ok(start..self.len)
    }

    #[inline(always)]
    fn bytes_mut(&mut self, range: Range<usize>) -> &mut [u8] {
        &mut self.words.as_mut_bytes()[range]
    }

    /// Tulis byte mentah di posisi cursor.
    pub fn write_raw(&mut self, data: &[u8]) -> Result<()> {
        let range = self.advance(data.len())?;
        self.bytes_mut(range).copy_from_slice(data);
        Ok(())
    }

    /// Padding nol sampai cursor kelipatan `alignment` (power of 2).
    pub fn pad_to_alignment(&mut self, alignment: usize) -> Result<()> {
        let padding = padding_for(self.len, alignment);
        if padding > 0 {
            let range = self.advance(padding)?;
            self.bytes_mut(range).fill(0);
        }
        Ok(())
    }

    /// Tulis value dalam canonical endianness.
    ///
    /// Caller bertanggung jawab atas alignment (field ditulis dalam urutan
    /// schema yang sudah aligned).
    pub fn write_value<T: Pod>(&mut self, value: T) -> Result<()> {
        debug_assert!(
            is_aligned(self.len, T::ALIGN),
            "write_value at unaligned offset {}",
            self.len
        );
        let range = self.advance(T::SIZE)?;
        value.encode(self.bytes_mut(range));
        Ok(())
    }

    /// Padding ke alignment `T` lalu tulis value. Return offset value.
    pub fn write_field<T: Pod>(&mut self, value: T) -> Result<usize> {
        self.pad_to_alignment(T::ALIGN)?;
        let offset = self.len;
        self.write_value(value)?;
        Ok(offset)
    }

    /// Mulai object baru: align ke header, reserve header placeholder.
    pub fn begin_object(&mut self) -> Result<ObjectStart> {
        self.pad_to_alignment(HEADER_ALIGN)?;
        let start = self.len;

        let placeholder = ObjectHeader::new(0, 0, 0);
        let range = self.advance(HEADER_SIZE)?;
        placeholder.encode(self.bytes_mut(range));

        trace!(start, "begin object");
        Ok(ObjectStart {
            offset: start,
            generation: self.generation,
        })
    }

    /// Tutup object: back-patch header dengan `schema_id` dan `total_size`.
    ///
    /// Return `total_size` object.
    pub fn end_object(&mut self, start: ObjectStart, schema_id: u32) -> Result<u32> {
        self.end_object_with_flags(start, schema_id, self.config.version_flags)
    }

    /// Sama seperti [`end_object`](Self::end_object) dengan `version_flags` eksplisit.
    pub fn end_object_with_flags(
        &mut self,
        start: ObjectStart,
        schema_id: u32,
        version_flags: u32,
    ) -> Result<u32> {
        self.check_generation(start.generation, start.offset)?;
        let header_end = self.checked_region(start.offset, HEADER_SIZE)?;
        let total_size = checked_u32(self.len - start.offset)?;

        let header = ObjectHeader::new(schema_id, total_size, version_flags);
        header.encode(self.bytes_mut(start.offset..header_end));

        trace!(start = start.offset, schema_id, total_size, "end object");
        Ok(total_size)
    }

    /// Reserve satu slot offset table (zeroed), di-patch nanti.
    pub fn reserve_offset_table_entry(&mut self) -> Result<EntrySlot> {
        self.pad_to_alignment(ENTRY_ALIGN)?;
        let offset = self.len;
        let range = self.advance(ENTRY_SIZE)?;
        self.bytes_mut(range).fill(0);
        Ok(EntrySlot {
            offset,
            generation: self.generation,
        })
    }

    /// Tulis ulang slot yang sudah di-reserve dengan offset dan size final.
    ///
    /// `data_offset` relatif terhadap awal object.
    pub fn update_offset_table_entry(
        &mut self,
        slot: EntrySlot,
        data_offset: u32,
        data_size: u32,
    ) -> Result<()> {
        self.check_generation(slot.generation, slot.offset)?;
        let end = self.checked_region(slot.offset, ENTRY_SIZE)?;
        if !is_aligned(slot.offset, ENTRY_ALIGN) {
            return Err(RiftError::Misaligned {
                address: slot.offset,
                align: ENTRY_ALIGN,
            });
        }

        OffsetTableEntry::new(data_offset, data_size).encode(self.bytes_mut(slot.offset..end));
        trace!(slot = slot.offset, data_offset, data_size, "patched offset table entry");
        Ok(())
    }

    /// Append string + terminator nol. Return offset awal karakter.
    pub fn add_string(&mut self, text: &str) -> Result<usize> {
        let offset = self.len;
        let range = self.advance(text.len() + 1)?;
        let dst = self.bytes_mut(range);
        let (chars, terminator) = dst.split_at_mut(text.len());
        chars.copy_from_slice(text.as_bytes());
        terminator.fill(0);
        Ok(offset)
    }

    /// Append array elemen fixed-size, aligned ke alignment elemen.
    /// Return offset elemen pertama.
    pub fn add_array<T: Pod>(&mut self, elements: &[T]) -> Result<usize> {
        self.pad_to_alignment(T::ALIGN)?;
        let offset = self.len;
        let total = elements
            .len()
            .checked_mul(T::SIZE)
            .ok_or(RiftError::ResourceExhausted {
                requested: usize::MAX,
            })?;

        let range = self.advance(total)?;
        let dst = self.bytes_mut(range);
        for (element, chunk) in elements.iter().zip(dst.chunks_exact_mut(T::SIZE)) {
            element.encode(chunk);
        }
        Ok(offset)
    }

    /// Tulis value variable-size lalu patch slot-nya dengan offset relatif
    /// object dan jumlah karakter/elemen.
    pub fn add_variable<V: VariableSize + ?Sized>(
        &mut self,
        object: ObjectStart,
        slot: EntrySlot,
        value: &V,
    ) -> Result<usize> {
        self.check_generation(object.generation, object.offset)?;
        // Slot harus milik body object ini, bukan object sebelumnya
        if slot.offset < object.offset + HEADER_SIZE {
            return Err(RiftError::SlotOutsideObject {
                slot: slot.offset,
                object: object.offset,
            });
        }

        let absolute = value.append_to(self)?;
        let relative = self.relative_offset(object, absolute)?;
        let count = checked_u32(value.count())?;
        self.update_offset_table_entry(slot, relative, count)?;
        Ok(absolute)
    }

    /// Offset buffer -> offset relatif terhadap awal object.
    pub fn relative_offset(&self, object: ObjectStart, absolute: usize) -> Result<u32> {
        self.check_generation(object.generation, object.offset)?;
        if absolute < object.offset || absolute > self.len {
            return Err(RiftError::OutOfBounds {
                offset: absolute,
                len: 0,
                limit: self.len,
            });
        }
        checked_u32(absolute - object.offset)
    }

    #[inline(always)]
    fn check_generation(&self, generation: u32, offset: usize) -> Result<()> {
        if generation == self.generation {
            Ok(())
        } else {
            Err(RiftError::StaleHandle { offset })
        }
    }

    /// Region `[offset, offset + len)` harus sudah ditulis. Return akhir region.
    #[inline(always)]
    fn checked_region(&self, offset: usize, len: usize) -> Result<usize> {
        match offset.checked_add(len) {
            Some(end) if end <= self.len => Ok(end),
            _ => Err(RiftError::OutOfBounds {
                offset,
                len,
                limit: self.len,
            }),
        }
    }
}

/// Buffer final hasil builder. Awal buffer dijamin 8-byte aligned.
pub struct SerializedBuffer {
    words: Vec<u64>,
    len: usize,
}

impl SerializedBuffer {
    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.words.as_bytes()[..self.len]
    }

    /// Copy ke `Vec<u8>` (alignment tidak lagi dijamin)
    pub fn to_vec(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl Deref for SerializedBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl AsRef<[u8]> for SerializedBuffer {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::message::MAGIC;

    fn read_u32(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
    }

    #[test]
    fn test_begin_end_object() {
        let mut builder = BufferBuilder::new();
        let start = builder.begin_object().unwrap();
        builder.write_value(42u32).unwrap();
        let total = builder.end_object(start, 7).unwrap();

        assert_eq!(start.offset(), 0);
        assert_eq!(total, 20);

        let bytes = builder.as_bytes();
        assert_eq!(read_u32(bytes, 0), MAGIC);
        assert_eq!(read_u32(bytes, 4), 7);
        assert_eq!(read_u32(bytes, 8), 20);
        assert_eq!(read_u32(bytes, 12), 0);
        assert_eq!(read_u32(bytes, 16), 42);
    }

    #[test]
    fn test_magic_written_at_begin() {
        let mut builder = BufferBuilder::new();
        builder.begin_object().unwrap();
        assert_eq!(read_u32(builder.as_bytes(), 0), MAGIC);
        assert_eq!(read_u32(builder.as_bytes(), 8), 0);
    }

    #[test]
    fn test_second_object_aligned_to_header() {
        let mut builder = BufferBuilder::new();
        let first = builder.begin_object().unwrap();
        builder.write_value(1u8).unwrap();
        builder.end_object(first, 1).unwrap();

        let second = builder.begin_object().unwrap();
        assert_eq!(second.offset(), 24);
        assert!(builder.as_bytes()[17..24].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_version_flags_from_config() {
        let mut builder = BufferBuilder::with_config(BuilderConfig {
            initial_capacity: 64,
            version_flags: 0x0000_0102,
        });
        let start = builder.begin_object().unwrap();
        builder.end_object(start, 9).unwrap();
        assert_eq!(read_u32(builder.as_bytes(), 12), 0x0102);

        let start = builder.begin_object().unwrap();
        builder.end_object_with_flags(start, 9, 5).unwrap();
        assert_eq!(read_u32(builder.as_bytes(), 16 + 12), 5);
    }

    #[test]
    fn test_add_string_null_terminated() {
        let mut builder = BufferBuilder::new();
        builder.write_raw(&[0xFF; 3]).unwrap();
        let offset = builder.add_string("hi").unwrap();

        assert_eq!(offset, 3);
        assert_eq!(&builder.as_bytes()[3..], b"hi\0");
    }

    #[test]
    fn test_add_array_aligned() {
        let mut builder = BufferBuilder::new();
        builder.write_raw(&[1]).unwrap();
        let offset = builder.add_array(&[1u32, 2, 3]).unwrap();

        assert_eq!(offset, 4);
        assert_eq!(&builder.as_bytes()[1..4], &[0, 0, 0]);
        assert_eq!(read_u32(builder.as_bytes(), 8), 2);
        assert_eq!(builder.len(), 16);
    }

    #[test]
    fn test_reserve_and_patch_entry() {
        let mut builder = BufferBuilder::new();
        let start = builder.begin_object().unwrap();
        let slot = builder.reserve_offset_table_entry().unwrap();
        assert_eq!(&builder.as_bytes()[16..24], &[0u8; 8]);

        let data = builder.add_string("abc").unwrap();
        let rel = builder.relative_offset(start, data).unwrap();
        builder.update_offset_table_entry(slot, rel, 3).unwrap();

        assert_eq!(read_u32(builder.as_bytes(), 16), 24);
        assert_eq!(read_u32(builder.as_bytes(), 20), 3);
    }

    #[test]
    fn test_add_variable_patches_slot() {
        let mut builder = BufferBuilder::new();
        let start = builder.begin_object().unwrap();
        let name = builder.reserve_offset_table_entry().unwrap();
        let scores = builder.reserve_offset_table_entry().unwrap();

        builder.add_variable(start, name, "rift").unwrap();
        builder.add_variable(start, scores, &vec![10u16, 20]).unwrap();
        builder.end_object(start, 3).unwrap();

        let bytes = builder.as_bytes();
        assert_eq!((read_u32(bytes, 16), read_u32(bytes, 20)), (32, 4));
        // "rift\0" = 32..37, padding ke 38 untuk u16
        assert_eq!((read_u32(bytes, 24), read_u32(bytes, 28)), (38, 2));
    }

    #[test]
    fn test_patch_after_reset_rejected() {
        let mut builder = BufferBuilder::new();
        let slot = builder.reserve_offset_table_entry().unwrap();
        builder.reset();

        let err = builder.update_offset_table_entry(slot, 0, 0).unwrap_err();
        assert_eq!(err, RiftError::StaleHandle { offset: 0 });
    }

    #[test]
    fn test_stale_slot_cannot_overwrite_new_payload() {
        let mut builder = BufferBuilder::new();
        let start = builder.begin_object().unwrap();
        let slot = builder.reserve_offset_table_entry().unwrap();
        builder.end_object(start, 1).unwrap();
        builder.reset();

        let start = builder.begin_object().unwrap();
        builder.add_string("ABCDEFGHIJ").unwrap();
        builder.end_object(start, 1).unwrap();

        // Offset slot lama (16) sekarang berada di tengah string baru
        let err = builder
            .update_offset_table_entry(slot, u32::MAX, u32::MAX)
            .unwrap_err();
        assert_eq!(err, RiftError::StaleHandle { offset: 16 });
        assert_eq!(&builder.as_bytes()[16..27], b"ABCDEFGHIJ\0");
    }

    #[test]
    fn test_stale_object_start_cannot_patch_header() {
        let mut builder = BufferBuilder::new();
        builder.write_raw(&[0u8; 8]).unwrap();
        let old = builder.begin_object().unwrap();
        builder.end_object(old, 1).unwrap();
        builder.reset();

        builder.add_string("0123456789abcdefghijklmnop").unwrap();
        let before = builder.as_bytes().to_vec();
        assert_eq!(
            builder.end_object(old, 9),
            Err(RiftError::StaleHandle { offset: 8 })
        );
        assert_eq!(builder.as_bytes(), &before[..]);
    }

    #[test]
    fn test_slot_from_previous_object_rejected() {
        let mut builder = BufferBuilder::new();
        let first = builder.begin_object().unwrap();
        let slot = builder.reserve_offset_table_entry().unwrap();
        builder.add_variable(first, slot, "a").unwrap();
        builder.end_object(first, 1).unwrap();

        let second = builder.begin_object().unwrap();
        let err = builder.add_variable(second, slot, "b").unwrap_err();
        assert_eq!(
            err,
            RiftError::SlotOutsideObject {
                slot: slot.offset(),
                object: second.offset(),
            }
        );
        assert_eq!(err.kind(), crate::protocol::error::ErrorKind::Bounds);
        // Tidak ada payload yang ditulis untuk slot yang ditolak
        assert_eq!(builder.len(), second.offset() + HEADER_SIZE);
    }

    #[test]
    fn test_end_object_stale_handle_rejected() {
        let mut builder = BufferBuilder::new();
        let start = builder.begin_object().unwrap();
        builder.reset();
        assert_eq!(
            builder.end_object(start, 1),
            Err(RiftError::StaleHandle { offset: 0 })
        );
    }

    #[test]
    fn test_growth_preserves_offsets() {
        let mut builder = BufferBuilder::with_capacity(16);
        let start = builder.begin_object().unwrap();
        let slot = builder.reserve_offset_table_entry().unwrap();
        let before = builder.capacity();

        let payload: Vec<u64> = (0..1000).collect();
        builder.add_variable(start, slot, &payload).unwrap();
        builder.end_object(start, 11).unwrap();

        assert!(builder.capacity() > before);
        assert_eq!(builder.as_bytes().as_ptr() as usize % HEADER_ALIGN, 0);
        let bytes = builder.as_bytes();
        assert_eq!(read_u32(bytes, 16), 24);
        assert_eq!(read_u32(bytes, 20), 1000);
        assert_eq!(read_u32(bytes, 8) as usize, 24 + 8000);
    }

    #[test]
    fn test_geometric_growth() {
        let mut builder = BufferBuilder::with_capacity(64);
        builder.write_raw(&[0u8; 64]).unwrap();
        builder.write_raw(&[1]).unwrap();
        assert!(builder.capacity() >= 128);
    }

    #[test]
    fn test_resource_exhaustion_is_error() {
        let mut builder = BufferBuilder::new();
        builder.write_raw(&[1]).unwrap();
        let err = builder.ensure_capacity(usize::MAX).unwrap_err();
        assert!(matches!(err, RiftError::ResourceExhausted { .. }));
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_reset_reuses_storage() {
        let mut builder = BufferBuilder::new();
        builder.add_string("First").unwrap();
        builder.reset();
        assert!(builder.is_empty());

        let start = builder.begin_object().unwrap();
        builder.pad_to_alignment(8).unwrap();
        builder.end_object(start, 2).unwrap();
        assert_eq!(builder.len(), 16);
    }

    #[test]
    fn test_finish_hands_off_aligned_bytes() {
        let mut builder = BufferBuilder::new();
        let start = builder.begin_object().unwrap();
        builder.end_object(start, 1).unwrap();

        let buffer = builder.finish();
        assert_eq!(buffer.len(), 16);
        assert_eq!(buffer.as_ptr() as usize % HEADER_ALIGN, 0);
        assert_eq!(buffer.to_vec(), buffer.as_bytes());
    }
}
