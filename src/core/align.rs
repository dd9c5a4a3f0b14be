//! Alignment Utilities
//!
//! Setiap field multi-byte harus dimulai pada offset yang memenuhi
//! `is_aligned(offset, align_of::<T>())`. Ini invariant correctness,
//! bukan optimisasi.

/// Naikkan `offset` ke kelipatan `alignment` berikutnya.
///
/// `alignment` harus power of 2. Overflow jika `offset` mendekati
/// `usize::MAX` (panic di debug, wrap di release); untuk offset yang berasal
/// dari input luar pakai [`checked_align_up`].
#[inline(always)]
pub fn align_up(offset: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two(), "alignment must be power of 2");
    (offset + alignment - 1) & !(alignment - 1)
}

/// Versi [`align_up`] yang tidak overflow. `None` jika hasil melewati `usize::MAX`.
#[inline(always)]
pub fn checked_align_up(offset: usize, alignment: usize) -> Option<usize> {
    debug_assert!(alignment.is_power_of_two(), "alignment must be power of 2");
    offset
        .checked_add(alignment - 1)
        .map(|v| v & !(alignment - 1))
}

/// Jumlah byte padding yang dibutuhkan agar `offset` aligned.
#[inline(always)]
pub fn padding_for(offset: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two(), "alignment must be power of 2");
    offset.wrapping_neg() & (alignment - 1)
}

/// Cek apakah offset sudah memenuhi alignment.
#[inline(always)]
pub fn is_aligned(offset: usize, alignment: usize) -> bool {
    debug_assert!(alignment.is_power_of_two(), "alignment must be power of 2");
    offset & (alignment - 1) == 0
}

/// Cek alignment dari alamat memori sebenarnya (bukan offset relatif).
#[inline(always)]
pub fn is_ptr_aligned(ptr: *const u8, alignment: usize) -> bool {
    is_aligned(ptr as usize, alignment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(0, 8), 0);
        assert_eq!(align_up(1, 8), 8);
        assert_eq!(align_up(8, 8), 8);
        assert_eq!(align_up(9, 4), 12);
        assert_eq!(align_up(17, 1), 17);
    }

    #[test]
    fn test_checked_align_up_overflow() {
        assert_eq!(checked_align_up(usize::MAX, 8), None);
        assert_eq!(checked_align_up(13, 16), Some(16));

        // Batas tertinggi yang masih representable: kedua versi sepakat
        let top = usize::MAX - 7;
        assert_eq!(checked_align_up(top, 8), Some(top));
        assert_eq!(align_up(top, 8), top);
        assert_eq!(checked_align_up(top + 1, 8), None);
    }

    #[test]
    fn test_padding_for() {
        assert_eq!(padding_for(0, 8), 0);
        assert_eq!(padding_for(5, 8), 3);
        assert_eq!(padding_for(16, 8), 0);
        assert_eq!(padding_for(6, 4), 2);
    }

    #[test]
    fn test_is_aligned() {
        assert!(is_aligned(0, 8));
        assert!(is_aligned(24, 8));
        assert!(!is_aligned(26, 4));
        assert!(is_aligned(26, 2));
    }

    #[test]
    fn test_ptr_alignment() {
        let words = [0u64; 2];
        let ptr = words.as_ptr() as *const u8;
        assert!(is_ptr_aligned(ptr, 8));
        assert!(!is_ptr_aligned(ptr.wrapping_add(1), 2));
    }
}
