//! Error taxonomy.
//!
//! Semua pelanggaran dikembalikan sebagai `Result`, tidak ada abort. Keputusan
//! fatal atau tidak ada di caller.

use thiserror::Error;

/// Result alias untuk seluruh crate.
pub type Result<T> = std::result::Result<T, RiftError>;

/// Kategori error kasar, untuk caller yang hanya perlu tahu jenisnya.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Magic salah, `total_size` korup, string tanpa terminator
    Format,
    /// Offset/size melewati batas object, atau index di luar range
    Bounds,
    /// Alamat field/table tidak memenuhi alignment tipe-nya
    Alignment,
    /// Ukuran object melewati range field 32-bit
    CapacityOverflow,
    /// Alokasi buffer gagal
    ResourceExhausted,
}

/// Semua kegagalan builder dan view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RiftError {
    #[error("invalid magic number: expected {expected:#010x}, got {found:#010x}")]
    InvalidMagic { expected: u32, found: u32 },

    #[error("corrupt total_size {0}: smaller than the 16-byte header")]
    TotalSizeTooSmall(u32),

    #[error("object declares {declared} bytes but only {available} are available")]
    TruncatedObject { declared: u32, available: usize },

    #[error("string at offset {offset} is not zero-terminated")]
    MissingTerminator { offset: usize },

    #[error("string at offset {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: usize },

    #[error("offset table at {0} overlaps the object header")]
    TableOverlapsHeader(u32),

    #[error("access out of bounds: offset {offset} + {len} exceeds {limit}")]
    OutOfBounds {
        offset: usize,
        len: usize,
        limit: usize,
    },

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: u32, len: u32 },

    #[error("handle for offset {offset} was issued before the last reset")]
    StaleHandle { offset: usize },

    #[error("offset table slot {slot} lies before the body of object {object}")]
    SlotOutsideObject { slot: usize, object: usize },

    #[error("misaligned access at {address:#x}: required alignment {align}")]
    Misaligned { address: usize, align: usize },

    #[error("size {0} exceeds the 32-bit size field")]
    CapacityOverflow(usize),

    #[error("buffer growth failed: {requested} bytes requested")]
    ResourceExhausted { requested: usize },
}

impl RiftError {
    /// Kategori error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidMagic { .. }
            | Self::TotalSizeTooSmall(_)
            | Self::MissingTerminator { .. }
            | Self::InvalidUtf8 { .. }
            | Self::TableOverlapsHeader(_) => ErrorKind::Format,
            Self::TruncatedObject { .. }
            | Self::OutOfBounds { .. }
            | Self::IndexOutOfRange { .. }
            | Self::StaleHandle { .. }
            | Self::SlotOutsideObject { .. } => ErrorKind::Bounds,
            Self::Misaligned { .. } => ErrorKind::Alignment,
            Self::CapacityOverflow(_) => ErrorKind::CapacityOverflow,
            Self::ResourceExhausted { .. } => ErrorKind::ResourceExhausted,
        }
    }
}

/// Konversi `usize` ke field `u32` di wire.
#[inline(always)]
pub(crate) fn checked_u32(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| RiftError::CapacityOverflow(value))
}
