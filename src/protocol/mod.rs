//! Protocol Layer: Zero-Copy Object Format
//!
//! Prinsip desain:
//! - Flat Binary: field dibaca langsung dari buffer tanpa parsing
//! - Fixed-size header + offset table: layout bisa diprediksi
//! - Builder append-only: object ditulis sekali, lalu immutable
//! - View borrow-only: validasi dulu, baca on demand

mod decoder;
mod encoder;
mod error;
mod message;
mod views;

pub use decoder::{BufferView, ObjectView};
pub use encoder::{BufferBuilder, BuilderConfig, EntrySlot, ObjectStart, SerializedBuffer};
pub use error::{ErrorKind, Result, RiftError};
pub use message::{
    GenericSerialized, ObjectHeader, OffsetTableEntry, ENTRY_ALIGN, ENTRY_SIZE, HEADER_ALIGN,
    HEADER_SIZE, MAGIC,
};
pub use views::{ArrayElement, ArrayIter, ArrayView, RegionView, StringView};
