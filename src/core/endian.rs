//! Canonical Byte Order
//!
//! Semua scalar multi-byte disimpan little-endian di wire, apapun byte order
//! host-nya.
//!
//! - Host little-endian: konversi = identity (zero cost)
//! - Host big-endian: byte swap
//! - Float/double: reinterpret bit lewat integer selebar sama, tidak pernah
//!   lewat konversi numerik
//! - `u8`/`i8`/`bool`: single byte, tidak ada konversi

/// `true` jika host little-endian (byte order wire = byte order host).
pub const HOST_LITTLE_ENDIAN: bool = cfg!(target_endian = "little");

/// Byte swap tanpa syarat.
///
/// Dipakai oleh [`to_canonical`] pada host big-endian. Public supaya jalur
/// big-endian bisa diuji di host little-endian.
pub trait ByteSwap: Copy {
    fn swap_bytes(self) -> Self;
}

macro_rules! impl_byte_swap_int {
    ($($t:ty),* $(,)?) => {
        $(
            impl ByteSwap for $t {
                #[inline(always)]
                fn swap_bytes(self) -> Self {
                    <$t>::swap_bytes(self)
                }
            }
        )*
    };
}

impl_byte_swap_int!(u8, i8, u16, i16, u32, i32, u64, i64);

impl ByteSwap for f32 {
    #[inline(always)]
    fn swap_bytes(self) -> Self {
        f32::from_bits(self.to_bits().swap_bytes())
    }
}

impl ByteSwap for f64 {
    #[inline(always)]
    fn swap_bytes(self) -> Self {
        f64::from_bits(self.to_bits().swap_bytes())
    }
}

impl ByteSwap for bool {
    #[inline(always)]
    fn swap_bytes(self) -> Self {
        self
    }
}

/// Host order -> wire order.
#[inline(always)]
pub fn to_canonical<T: ByteSwap>(value: T) -> T {
    if HOST_LITTLE_ENDIAN {
        value
    } else {
        value.swap_bytes()
    }
}

/// Wire order -> host order. Inverse dari [`to_canonical`] (operasinya sama).
#[inline(always)]
pub fn from_canonical<T: ByteSwap>(value: T) -> T {
    to_canonical(value)
}
