//! Type Classification
//!
//! Setiap tipe yang ikut serialisasi menjawab satu pertanyaan: fixed-size
//! (POD, disimpan inline) atau variable-size (lewat offset table).
//!
//! Jawabannya adalah associated type [`Layout::Kind`]. Karena satu tipe hanya
//! bisa punya satu impl `Layout`, tipe yang diklaim fixed *dan* variable
//! ditolak compiler sebelum ada byte yang ditulis:
//!
//! ```compile_fail
//! use rift::{kind, Layout, Pod, VariableSize, BufferBuilder, Result};
//!
//! #[derive(Clone, Copy)]
//! struct Ambiguous(u32);
//!
//! impl Layout for Ambiguous {
//!     type Kind = kind::Fixed;
//! }
//!
//! // error: type mismatch resolving `<Ambiguous as Layout>::Kind == Variable`
//! impl VariableSize for Ambiguous {
//!     fn count(&self) -> usize { 1 }
//!     fn append_to(&self, builder: &mut BufferBuilder) -> Result<usize> {
//!         builder.add_array(&[self.0])
//!     }
//! }
//! ```
//!
//! Tipe composite didaftarkan sebagai POD lewat [`rift_pod!`](crate::rift_pod).
//! Registrasi mewajibkan `zerocopy` layout traits (repr(C), tanpa padding,
//! trivially copyable), jadi tipe yang tidak memenuhi gagal saat build:
//!
//! ```compile_fail
//! #[derive(Clone, Copy)]
//! struct NotRepr {
//!     a: u8,
//!     b: u32,
//! }
//!
//! rift::rift_pod!(NotRepr { a, b });
//! ```

use std::mem;

use zerocopy::{FromBytes, Immutable, IntoBytes};

use crate::core::endian;
use crate::protocol::{BufferBuilder, Result, RiftError};

/// Hasil klasifikasi runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeClass {
    Fixed,
    Variable,
}

/// Marker kind untuk [`Layout::Kind`].
pub mod kind {
    use super::TypeClass;

    mod sealed {
        pub trait Sealed {}
    }

    pub trait Kind: sealed::Sealed {
        const CLASS: TypeClass;
    }

    /// Disimpan inline, ukuran diketahui saat compile
    #[derive(Debug)]
    pub enum Fixed {}

    /// Disimpan di region variable, ditemukan lewat offset table
    #[derive(Debug)]
    pub enum Variable {}

    impl sealed::Sealed for Fixed {}
    impl sealed::Sealed for Variable {}

    impl Kind for Fixed {
        const CLASS: TypeClass = TypeClass::Fixed;
    }

    impl Kind for Variable {
        const CLASS: TypeClass = TypeClass::Variable;
    }
}

/// Klasifikasi tipe. Tepat satu impl per tipe.
pub trait Layout {
    type Kind: kind::Kind;
}

/// Tipe fixed-size: bitwise copy, alignment-respecting, endian-converted.
///
/// `encode`/`decode` bekerja pada slice sepanjang tepat [`Pod::SIZE`].
pub trait Pod: Layout<Kind = kind::Fixed> + Copy + 'static {
    const SIZE: usize = mem::size_of::<Self>();
    const ALIGN: usize = mem::align_of::<Self>();

    /// Host order -> wire order
    fn to_canonical(self) -> Self;

    /// Wire order -> host order
    #[inline(always)]
    fn from_canonical(self) -> Self {
        self.to_canonical()
    }

    /// Tulis representasi wire ke `dst` (`dst.len() == SIZE`).
    fn encode(self, dst: &mut [u8]);

    /// Baca representasi wire dari `src`.
    fn decode(src: &[u8]) -> Result<Self>;
}

/// Tipe variable-size: ukuran hanya diketahui saat write.
pub trait VariableSize: Layout<Kind = kind::Variable> {
    /// Nilai `size` untuk offset table: jumlah karakter atau elemen.
    fn count(&self) -> usize;

    /// Append payload ke builder. Return offset buffer tempat data dimulai.
    fn append_to(&self, builder: &mut BufferBuilder) -> Result<usize>;
}

/// Klasifikasi tipe saat runtime.
pub const fn classify<T: Layout + ?Sized>() -> TypeClass {
    <T::Kind as kind::Kind>::CLASS
}

pub const fn is_fixed_size<T: Layout + ?Sized>() -> bool {
    matches!(classify::<T>(), TypeClass::Fixed)
}

pub const fn is_variable_size<T: Layout + ?Sized>() -> bool {
    matches!(classify::<T>(), TypeClass::Variable)
}

#[doc(hidden)]
#[inline(always)]
pub fn encode_zerocopy<T: IntoBytes + Immutable>(value: &T, dst: &mut [u8]) {
    dst.copy_from_slice(value.as_bytes());
}

#[doc(hidden)]
#[inline(always)]
pub fn decode_zerocopy<T: FromBytes>(src: &[u8]) -> Result<T> {
    T::read_from_bytes(src).map_err(|_| RiftError::OutOfBounds {
        offset: 0,
        len: mem::size_of::<T>(),
        limit: src.len(),
    })
}

/// Daftarkan struct composite sebagai POD.
///
/// Struct harus `#[repr(C)]`, `Copy`, dan derive `zerocopy::{FromBytes,
/// IntoBytes, Immutable}`; semua field disebut (dan masing-masing POD).
/// Konversi endian dilakukan per field.
///
/// ```
/// use zerocopy::{FromBytes, Immutable, IntoBytes};
///
/// #[repr(C)]
/// #[derive(Debug, Clone, Copy, PartialEq, FromBytes, IntoBytes, Immutable)]
/// struct Tick {
///     price: f64,
///     qty: u32,
///     venue: u32,
/// }
///
/// rift::rift_pod!(Tick { price, qty, venue });
///
/// assert!(rift::is_fixed_size::<Tick>());
/// ```
#[macro_export]
macro_rules! rift_pod {
    ($($ty:ident { $($field:ident),+ $(,)? });+ $(;)?) => {
        $(
            impl $crate::Layout for $ty {
                type Kind = $crate::kind::Fixed;
            }

            impl $crate::Pod for $ty {
                #[inline(always)]
                fn to_canonical(self) -> Self {
                    Self { $($field: $crate::Pod::to_canonical(self.$field)),+ }
                }

                #[inline(always)]
                fn from_canonical(self) -> Self {
                    Self { $($field: $crate::Pod::from_canonical(self.$field)),+ }
                }

                #[inline(always)]
                fn encode(self, dst: &mut [u8]) {
                    $crate::__private::encode_zerocopy(&$crate::Pod::to_canonical(self), dst)
                }

                #[inline(always)]
                fn decode(src: &[u8]) -> $crate::Result<Self> {
                    $crate::__private::decode_zerocopy::<Self>(src).map($crate::Pod::from_canonical)
                }
            }
        )+
    };
}

macro_rules! impl_pod_scalar {
    ($($t:ty),* $(,)?) => {
        $(
            impl Layout for $t {
                type Kind = kind::Fixed;
            }

            impl Pod for $t {
                #[inline(always)]
                fn to_canonical(self) -> Self {
                    endian::to_canonical(self)
                }

                #[inline(always)]
                fn from_canonical(self) -> Self {
                    endian::from_canonical(self)
                }

                #[inline(always)]
                fn encode(self, dst: &mut [u8]) {
                    encode_zerocopy(&endian::to_canonical(self), dst);
                }

                #[inline(always)]
                fn decode(src: &[u8]) -> Result<Self> {
                    decode_zerocopy::<$t>(src).map(endian::from_canonical)
                }
            }
        )*
    };
}

impl_pod_scalar!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

// bool = 1 byte (0/1). Bukan FromBytes: byte selain 0 dibaca sebagai true.
impl Layout for bool {
    type Kind = kind::Fixed;
}

impl Pod for bool {
    #[inline(always)]
    fn to_canonical(self) -> Self {
        self
    }

    #[inline(always)]
    fn encode(self, dst: &mut [u8]) {
        dst[0] = u8::from(self);
    }

    #[inline(always)]
    fn decode(src: &[u8]) -> Result<Self> {
        match src.first() {
            Some(&byte) => Ok(byte != 0),
            None => Err(RiftError::OutOfBounds {
                offset: 0,
                len: 1,
                limit: 0,
            }),
        }
    }
}

impl<T: Pod, const N: usize> Layout for [T; N] {
    type Kind = kind::Fixed;
}

impl<T, const N: usize> Pod for [T; N]
where
    T: Pod + FromBytes + IntoBytes + Immutable,
{
    #[inline(always)]
    fn to_canonical(self) -> Self {
        self.map(Pod::to_canonical)
    }

    #[inline(always)]
    fn from_canonical(self) -> Self {
        self.map(Pod::from_canonical)
    }

    #[inline(always)]
    fn encode(self, dst: &mut [u8]) {
        encode_zerocopy(&self.to_canonical(), dst);
    }

    #[inline(always)]
    fn decode(src: &[u8]) -> Result<Self> {
        decode_zerocopy::<Self>(src).map(Pod::from_canonical)
    }
}

impl Layout for str {
    type Kind = kind::Variable;
}

impl VariableSize for str {
    fn count(&self) -> usize {
        self.len()
    }

    fn append_to(&self, builder: &mut BufferBuilder) -> Result<usize> {
        builder.add_string(self)
    }
}

impl Layout for String {
    type Kind = kind::Variable;
}

impl VariableSize for String {
    fn count(&self) -> usize {
        self.len()
    }

    fn append_to(&self, builder: &mut BufferBuilder) -> Result<usize> {
        builder.add_string(self)
    }
}

impl<T: Pod> Layout for [T] {
    type Kind = kind::Variable;
}

impl<T: Pod> VariableSize for [T] {
    fn count(&self) -> usize {
        self.len()
    }

    fn append_to(&self, builder: &mut BufferBuilder) -> Result<usize> {
        builder.add_array(self)
    }
}

impl<T: Pod> Layout for Vec<T> {
    type Kind = kind::Variable;
}

impl<T: Pod> VariableSize for Vec<T> {
    fn count(&self) -> usize {
        self.len()
    }

    fn append_to(&self, builder: &mut BufferBuilder) -> Result<usize> {
        builder.add_array(self)
    }
}
