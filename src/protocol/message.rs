//! Wire Types (bit-exact)
//!
//! Layout object:
//! ┌─────────────────────────────────────────────────────┐
//! │ ObjectHeader (16 bytes, align 8)                    │
//! ├─────────────────────────────────────────────────────┤
//! │ Fixed fields (urutan schema, natural alignment)     │
//! ├─────────────────────────────────────────────────────┤
//! │ Offset table (N x OffsetTableEntry, align 4)        │
//! ├─────────────────────────────────────────────────────┤
//! │ Variable payload (string/array, align per elemen)   │
//! └─────────────────────────────────────────────────────┘
//!
//! Semua field header dan entry disimpan little-endian. Struct di sini
//! memegang nilai host order; konversi terjadi di `Pod::encode`/`Pod::decode`.

use std::mem;

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Magic number untuk validasi ("RFS1" dalam little-endian)
pub const MAGIC: u32 = 0x3153_4652;

/// Object Header - fixed 16 bytes, 8-byte aligned
///
/// Selalu berada di byte pertama setiap object.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct ObjectHeader {
    /// Magic number, harus [`MAGIC`]
    pub magic: u32,
    /// Hash dari schema yang di-generate
    pub schema_id: u32,
    /// Ukuran object termasuk header ini
    pub total_size: u32,
    /// Bit versi dan feature
    pub version_flags: u32,
}

pub const HEADER_SIZE: usize = mem::size_of::<ObjectHeader>();
/// Alignment wire untuk awal object. Lebih ketat dari alignment natural
/// struct-nya (4), sehingga ditegakkan builder dan view secara eksplisit.
pub const HEADER_ALIGN: usize = 8;

const _: () = assert!(HEADER_SIZE == 16);

impl ObjectHeader {
    /// Header dalam byte order host, siap di-encode.
    pub fn new(schema_id: u32, total_size: u32, version_flags: u32) -> Self {
        Self {
            magic: MAGIC,
            schema_id,
            total_size,
            version_flags,
        }
    }
}

/// Offset Table Entry - fixed 8 bytes, 4-byte aligned
///
/// `size` = jumlah karakter (string) atau jumlah elemen (array).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct OffsetTableEntry {
    /// Offset dari awal object ke data variable
    pub offset: u32,
    /// Jumlah karakter/elemen
    pub size: u32,
}

pub const ENTRY_SIZE: usize = mem::size_of::<OffsetTableEntry>();
pub const ENTRY_ALIGN: usize = mem::align_of::<OffsetTableEntry>();

const _: () = assert!(ENTRY_SIZE == 8);
const _: () = assert!(ENTRY_ALIGN == 4);

impl OffsetTableEntry {
    pub fn new(offset: u32, size: u32) -> Self {
        Self { offset, size }
    }
}

crate::rift_pod!(ObjectHeader {
    magic,
    schema_id,
    total_size,
    version_flags,
});

// Entry juga POD: array of entries dipakai untuk field "array of string".
crate::rift_pod!(OffsetTableEntry { offset, size });

/// Base untuk semua struct "serialized" hasil generate.
///
/// Struct hasil generate wajib menaruh header sebagai member pertama.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct GenericSerialized {
    pub header: ObjectHeader,
}

const _: () = assert!(mem::offset_of!(GenericSerialized, header) == 0);

crate::rift_pod!(GenericSerialized { header });
