//! Core module: Type Classification, Endianness, Alignment
//!
//! Prinsip desain:
//! - Canonical little-endian: format portable antar host
//! - Natural alignment: setiap field dibaca dari alamat yang aligned
//! - Klasifikasi di compile time: POD atau variable, tidak pernah keduanya

pub mod align;
pub mod endian;
pub mod math;
pub mod traits;

pub use align::{align_up, is_aligned};
pub use endian::{from_canonical, to_canonical};
pub use math::{Mat3, Mat4, Quat, Vec2, Vec3, Vec4};
pub use traits::{classify, is_fixed_size, is_variable_size, kind, Layout, Pod, TypeClass, VariableSize};
