//! Rift - Zero-Copy Binary Serialization Core
//!
//! Arsitektur:
//! - Wire format: header 16 byte + fixed fields + offset table + payload
//! - Builder: append-only, back-patch header dan offset table
//! - View: validate-then-access, meminjam buffer (tanpa copy)
//! - Canonical little-endian, natural alignment untuk setiap field
//!
//! ```
//! use rift::{BufferBuilder, BufferView};
//!
//! let mut builder = BufferBuilder::new();
//! let start = builder.begin_object()?;
//! builder.write_value(42u32)?;
//! let name = builder.reserve_offset_table_entry()?;
//! builder.add_variable(start, name, "hi")?;
//! builder.end_object(start, 7)?;
//! let buffer = builder.finish();
//!
//! let view = BufferView::new(&buffer)?;
//! assert_eq!(view.schema_id(), 7);
//! assert_eq!(view.read_fixed::<u32>(16)?, 42);
//! assert_eq!(view.string_field(20, 0, 1)?.as_str()?, "hi");
//! # Ok::<(), rift::RiftError>(())
//! ```

pub mod core;
pub mod protocol;

pub use crate::core::{
    classify, is_fixed_size, is_variable_size, kind, Layout, Mat3, Mat4, Pod, Quat, TypeClass,
    Vec2, Vec3, Vec4, VariableSize,
};
pub use crate::protocol::{
    ArrayElement, ArrayView, BufferBuilder, BufferView, BuilderConfig, EntrySlot, ErrorKind,
    ObjectHeader, ObjectStart, ObjectView, OffsetTableEntry, RegionView, Result, RiftError,
    SerializedBuffer, StringView, HEADER_SIZE, MAGIC,
};

#[doc(hidden)]
pub mod __private {
    pub use crate::core::traits::{decode_zerocopy, encode_zerocopy};
}
