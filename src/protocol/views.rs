//! Zero-copy views: region, string, array.
//!
//! Tidak ada yang di-copy; semua view meminjam (`&'a [u8]`) buffer asal,
//! sehingga view tidak bisa hidup lebih lama dari buffer-nya.

use std::borrow::Cow;
use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;

use crate::core::align::is_ptr_aligned;
use crate::core::traits::Pod;

use super::error::{Result, RiftError};

/// Pastikan alamat awal `bytes` memenuhi `align`.
#[inline(always)]
pub(crate) fn check_aligned(bytes: &[u8], align: usize) -> Result<()> {
    if is_ptr_aligned(bytes.as_ptr(), align) {
        Ok(())
    } else {
        Err(RiftError::Misaligned {
            address: bytes.as_ptr() as usize,
            align,
        })
    }
}

/// Region byte dengan batas tetap. Primitive bounds check untuk semua akses.
///
/// Dipakai [`BufferView`](super::BufferView) untuk seluruh object, dan oleh
/// view hasil generate untuk struct composite yang tertanam di array.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RegionView<'a> {
    bytes: &'a [u8],
}

impl<'a> RegionView<'a> {
    #[inline(always)]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline(always)]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Satu-satunya jalur baca: gagal jika `offset + len` melewati region.
    #[inline(always)]
    pub fn bytes_at(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        offset
            .checked_add(len)
            .and_then(|end| self.bytes.get(offset..end))
            .ok_or(RiftError::OutOfBounds {
                offset,
                len,
                limit: self.bytes.len(),
            })
    }

    /// Baca fixed field: bounds check, alignment check, decode endian.
    #[inline(always)]
    pub fn read_fixed<T: Pod>(&self, offset: usize) -> Result<T> {
        let bytes = self.bytes_at(offset, T::SIZE)?;
        check_aligned(bytes, T::ALIGN)?;
        T::decode(bytes)
    }
}

impl fmt::Debug for RegionView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegionView")
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// String view: pointer + jumlah karakter, tanpa copy.
///
/// Byte setelah karakter terakhir dijamin nol (dicek saat konstruksi).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct StringView<'a> {
    with_nul: &'a [u8],
    offset: usize,
}

impl<'a> StringView<'a> {
    /// `with_nul` = karakter + terminator nol.
    pub(crate) fn new(with_nul: &'a [u8], offset: usize) -> Result<Self> {
        match with_nul.last() {
            Some(0) => Ok(Self { with_nul, offset }),
            _ => Err(RiftError::MissingTerminator { offset }),
        }
    }

    /// Jumlah karakter (byte), tanpa terminator
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.with_nul.len() - 1
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline(always)]
    pub fn as_bytes(&self) -> &'a [u8] {
        &self.with_nul[..self.len()]
    }

    /// Karakter + terminator, untuk interop C-string
    #[inline(always)]
    pub fn as_bytes_with_nul(&self) -> &'a [u8] {
        self.with_nul
    }

    /// Interpretasi UTF-8 (zero-copy).
    pub fn as_str(&self) -> Result<&'a str> {
        std::str::from_utf8(self.as_bytes()).map_err(|_| RiftError::InvalidUtf8 {
            offset: self.offset,
        })
    }

    /// Copy ke `String` milik caller. Byte invalid diganti U+FFFD.
    pub fn to_string_lossy(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.as_bytes())
    }
}

impl fmt::Debug for StringView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.to_string_lossy(), f)
    }
}

impl fmt::Display for StringView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl PartialEq<str> for StringView<'_> {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for StringView<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

/// Tipe elemen yang bisa dibaca dari [`ArrayView`].
///
/// Elemen POD di-decode langsung (blanket impl). Struct composite yang
/// punya view sendiri mengimplementasikan trait ini dan membangun view
/// di atas byte elemen.
pub trait ArrayElement<'a> {
    type Item;
    /// Jarak antar elemen di wire
    const STRIDE: usize;
    const ALIGN: usize;

    /// `bytes.len() == STRIDE`, alamat sudah dicek alignment-nya.
    fn read_element(bytes: &'a [u8]) -> Result<Self::Item>;
}

impl<'a, T: Pod> ArrayElement<'a> for T {
    type Item = T;
    const STRIDE: usize = T::SIZE;
    const ALIGN: usize = T::ALIGN;

    #[inline(always)]
    fn read_element(bytes: &'a [u8]) -> Result<T> {
        T::decode(bytes)
    }
}

/// Array view: pointer ke elemen pertama + jumlah elemen.
pub struct ArrayView<'a, T> {
    bytes: &'a [u8],
    count: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T: ArrayElement<'a>> ArrayView<'a, T> {
    /// `bytes.len() == count * STRIDE`, awal `bytes` sudah aligned.
    pub(crate) fn new(bytes: &'a [u8], count: u32) -> Self {
        Self {
            bytes,
            count,
            _marker: PhantomData,
        }
    }

    #[inline(always)]
    pub fn len(&self) -> u32 {
        self.count
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Byte mentah seluruh array
    #[inline(always)]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Akses elemen: bounds check index, alignment check alamat elemen.
    pub fn get(&self, index: u32) -> Result<T::Item> {
        if index >= self.count {
            return Err(RiftError::IndexOutOfRange {
                index,
                len: self.count,
            });
        }

        let start = index as usize * T::STRIDE;
        let element = self
            .bytes
            .get(start..start + T::STRIDE)
            .ok_or(RiftError::OutOfBounds {
                offset: start,
                len: T::STRIDE,
                limit: self.bytes.len(),
            })?;
        check_aligned(element, T::ALIGN)?;

        T::read_element(element)
    }

    pub fn iter(&self) -> ArrayIter<'a, T> {
        ArrayIter {
            view: *self,
            next: 0,
        }
    }
}

impl<'a, T: ArrayElement<'a>> ArrayView<'a, T>
where
    T::Item: Copy,
{
    /// Copy semua elemen ke `Vec` milik caller.
    pub fn to_vec(&self) -> Result<Vec<T::Item>> {
        self.iter().collect()
    }
}

impl<T> Clone for ArrayView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ArrayView<'_, T> {}

impl<T> fmt::Debug for ArrayView<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayView")
            .field("len", &self.count)
            .field("element", &std::any::type_name::<T>())
            .finish()
    }
}

/// Iterator elemen [`ArrayView`]
pub struct ArrayIter<'a, T> {
    view: ArrayView<'a, T>,
    next: u32,
}

impl<'a, T: ArrayElement<'a>> Iterator for ArrayIter<'a, T> {
    type Item = Result<T::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.view.count {
            return None;
        }
        let item = self.view.get(self.next);
        self.next += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.view.count - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl<'a, T: ArrayElement<'a>> ExactSizeIterator for ArrayIter<'a, T> {}

impl<'a, T: ArrayElement<'a>> FusedIterator for ArrayIter<'a, T> {}

impl<'a, T: ArrayElement<'a>> IntoIterator for ArrayView<'a, T> {
    type Item = Result<T::Item>;
    type IntoIter = ArrayIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
