//! Raw memory helpers: bulk copy, compare, fill, and explicit release.
//!
//! These are thin pass-throughs to the engine's byte primitives. Extents
//! are checked against both regions before touching memory — the native
//! convention leaves oversized extents to overrun, which a memory-safe
//! rendition reports as an error instead.

use std::cmp::Ordering;

use crate::buffer::{CBuffer, Ownership};
use crate::engine;
use crate::error::{InteropError, InteropResult};

/// Byte regions usable as a copy source or comparison operand: a native
/// handle or a raw host byte slice.
pub trait AsByteRegion {
    /// Pointer to the first byte of the region
    fn region_ptr(&self) -> *const u8;
    /// Length of the region in bytes
    fn region_len(&self) -> usize;
}

impl AsByteRegion for CBuffer {
    fn region_ptr(&self) -> *const u8 {
        self.as_ptr()
    }

    fn region_len(&self) -> usize {
        self.byte_len()
    }
}

impl AsByteRegion for [u8] {
    fn region_ptr(&self) -> *const u8 {
        self.as_ptr()
    }

    fn region_len(&self) -> usize {
        self.len()
    }
}

/// Copy `size` bytes from `source` into `target`.
///
/// `source` may be a native handle or a host byte slice. The regions must
/// not overlap.
pub fn copy_bytes<S>(target: &mut CBuffer, source: &S, size: usize) -> InteropResult<()>
where
    S: AsByteRegion + ?Sized,
{
    check_extent(size, target.byte_len())?;
    check_extent(size, source.region_len())?;
    // Safety: both extents were checked against their regions.
    unsafe { engine::copy(target.as_mut_ptr(), source.region_ptr(), size) };
    Ok(())
}

/// Compare `size` bytes of `a` and `b`
pub fn compare_bytes<A, B>(a: &A, b: &B, size: usize) -> InteropResult<Ordering>
where
    A: AsByteRegion + ?Sized,
    B: AsByteRegion + ?Sized,
{
    check_extent(size, a.region_len())?;
    check_extent(size, b.region_len())?;
    // Safety: both extents were checked against their regions.
    Ok(unsafe { engine::compare(a.region_ptr(), b.region_ptr(), size) })
}

/// Fill `size` bytes of `target` with `byte`
pub fn fill_bytes(target: &mut CBuffer, byte: u8, size: usize) -> InteropResult<()> {
    check_extent(size, target.byte_len())?;
    // Safety: the extent was checked against the region.
    unsafe { engine::fill(target.as_mut_ptr(), byte, size) };
    Ok(())
}

/// Explicitly release each handle's region, regardless of ownership.
///
/// Element regions kept alive by a handle (string-array elements) are
/// released with it. Because handles are consumed by value, releasing the
/// same handle twice is unrepresentable — the double-free the native
/// convention leaves undefined cannot be written in safe code.
///
/// The caller must guarantee no other handle aliases a released region
/// ([`CBuffer::addr_of`] cells keep only an address, so releasing them is
/// always safe; dereferencing their stored address afterwards is not).
pub fn release<I>(handles: I)
where
    I: IntoIterator<Item = CBuffer>,
{
    for handle in handles {
        release_one(handle);
    }
}

fn release_one(mut handle: CBuffer) {
    for child in std::mem::take(&mut handle.keepalive) {
        release_one(child);
    }
    if handle.ownership == Ownership::Borrowed {
        // Safety: release takes the handle by value, so this region can
        // never be freed through it again; the caller guarantees it is
        // not owned elsewhere.
        unsafe { engine::dealloc(handle.ptr) };
    }
    // Owned regions are freed by Drop right here.
}

fn check_extent(requested: usize, available: usize) -> InteropResult<()> {
    if requested > available {
        return Err(InteropError::SizeExceedsRegion {
            requested,
            available,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_from_slice() {
        let mut buf = CBuffer::uint8_array(&[0; 4]).unwrap();
        copy_bytes(&mut buf, b"abcd".as_slice(), 4).unwrap();
        assert_eq!(buf.bytes(), b"abcd");
    }

    #[test]
    fn test_copy_from_handle() {
        let src = CBuffer::string("hi").unwrap();
        let mut dst = CBuffer::uint8_array(&[0; 3]).unwrap();
        copy_bytes(&mut dst, &src, 3).unwrap();
        assert_eq!(dst.bytes(), b"hi\0");
    }

    #[test]
    fn test_copy_extent_is_checked() {
        let mut buf = CBuffer::uint8_array(&[0; 2]).unwrap();
        let err = copy_bytes(&mut buf, b"abcd".as_slice(), 4).unwrap_err();
        assert_eq!(
            err,
            InteropError::SizeExceedsRegion {
                requested: 4,
                available: 2
            }
        );
    }

    #[test]
    fn test_compare() {
        let a = CBuffer::string("abc").unwrap();
        let b = CBuffer::string("abd").unwrap();
        assert_eq!(compare_bytes(&a, &a, 4).unwrap(), Ordering::Equal);
        assert_eq!(compare_bytes(&a, &b, 3).unwrap(), Ordering::Less);
        assert_eq!(compare_bytes(&b, &a, 3).unwrap(), Ordering::Greater);
        // A host byte slice works as either operand.
        assert_eq!(
            compare_bytes(&a, b"abc\0".as_slice(), 4).unwrap(),
            Ordering::Equal
        );
    }

    #[test]
    fn test_fill() {
        let mut buf = CBuffer::uint8_array(&[1, 2, 3, 4]).unwrap();
        fill_bytes(&mut buf, 0, 2).unwrap();
        assert_eq!(buf.bytes(), &[0, 0, 3, 4]);

        assert!(fill_bytes(&mut buf, 0, 5).is_err());
    }

    #[test]
    fn test_release_owned_and_borrowed() {
        let owned = CBuffer::int32(1).unwrap();
        let borrowed =
            CBuffer::scalar(crate::Primitive::I32, 2i32, Ownership::Borrowed).unwrap();
        release([owned, borrowed]);
    }

    #[test]
    fn test_release_string_array_releases_elements() {
        let array = CBuffer::string_array_with(&["a", "b"], Ownership::Borrowed).unwrap();
        assert_eq!(array.retained().len(), 2);
        release([array]);
    }
}
