//! Constructors for native scalar, array, and string regions.
//!
//! Two generic paths carry the work: [`CBuffer::scalar`] allocates one
//! element and assigns through the typed value accessor, and
//! [`CBuffer::array`] allocates `n` contiguous elements and assigns them
//! positionally in input order. An empty input to the array path yields a
//! bare typed pointer instead of an array — the allocator disallows
//! zero-length fixed arrays.
//!
//! Every primitive kind also gets a pair of named constructors, one
//! scalar and one array, as a convenience layer over the generic paths.
//! The named forms always produce owned handles; ownership is chosen
//! explicitly on the generic paths and the `*_with` string constructors.
//!
//! Each successful call performs exactly one region allocation (plus one
//! per element in the string-array paths) and touches no global state.

use crate::buffer::{CBuffer, Ownership};
use crate::descriptor::{Descriptor, Primitive};
use crate::engine;
use crate::error::{InteropError, InteropResult};
use crate::value::Value;

impl CBuffer {
    /// Allocate one element of `kind` and assign `value` through the
    /// typed accessor, applying the engine's coercion for the kind.
    pub fn scalar(
        kind: Primitive,
        value: impl Into<Value>,
        ownership: Ownership,
    ) -> InteropResult<Self> {
        let mut buf = Self::zeroed(Descriptor::Scalar(kind), ownership)?;
        buf.set_value(value)?;
        Ok(buf)
    }

    /// Allocate `values.len()` contiguous elements of `kind` and assign
    /// them positionally, preserving input order.
    ///
    /// An empty slice yields a zero-length pointer-typed handle of the
    /// kind instead of an array.
    pub fn array<T>(kind: Primitive, values: &[T], ownership: Ownership) -> InteropResult<Self>
    where
        T: Copy + Into<Value>,
    {
        if values.is_empty() {
            return Self::zeroed(Descriptor::Pointer(kind), ownership);
        }
        let mut buf = Self::zeroed(Descriptor::Array(kind, values.len()), ownership)?;
        for (i, v) in values.iter().enumerate() {
            buf.set_index(i, (*v).into())?;
        }
        Ok(buf)
    }

    /// Owned `int8_t` scalar
    pub fn int8(value: i8) -> InteropResult<Self> {
        Self::scalar(Primitive::I8, value, Ownership::Owned)
    }

    /// Owned `int8_t` array
    pub fn int8_array(values: &[i8]) -> InteropResult<Self> {
        Self::array(Primitive::I8, values, Ownership::Owned)
    }

    /// Owned `uint8_t` scalar
    pub fn uint8(value: u8) -> InteropResult<Self> {
        Self::scalar(Primitive::U8, value, Ownership::Owned)
    }

    /// Owned `uint8_t` array
    pub fn uint8_array(values: &[u8]) -> InteropResult<Self> {
        Self::array(Primitive::U8, values, Ownership::Owned)
    }

    /// Owned `int16_t` scalar
    pub fn int16(value: i16) -> InteropResult<Self> {
        Self::scalar(Primitive::I16, value, Ownership::Owned)
    }

    /// Owned `int16_t` array
    pub fn int16_array(values: &[i16]) -> InteropResult<Self> {
        Self::array(Primitive::I16, values, Ownership::Owned)
    }

    /// Owned `uint16_t` scalar
    pub fn uint16(value: u16) -> InteropResult<Self> {
        Self::scalar(Primitive::U16, value, Ownership::Owned)
    }

    /// Owned `uint16_t` array
    pub fn uint16_array(values: &[u16]) -> InteropResult<Self> {
        Self::array(Primitive::U16, values, Ownership::Owned)
    }

    /// Owned `int32_t` scalar
    pub fn int32(value: i32) -> InteropResult<Self> {
        Self::scalar(Primitive::I32, value, Ownership::Owned)
    }

    /// Owned `int32_t` array
    pub fn int32_array(values: &[i32]) -> InteropResult<Self> {
        Self::array(Primitive::I32, values, Ownership::Owned)
    }

    /// Owned `uint32_t` scalar
    pub fn uint32(value: u32) -> InteropResult<Self> {
        Self::scalar(Primitive::U32, value, Ownership::Owned)
    }

    /// Owned `uint32_t` array
    pub fn uint32_array(values: &[u32]) -> InteropResult<Self> {
        Self::array(Primitive::U32, values, Ownership::Owned)
    }

    /// Owned `int64_t` scalar
    pub fn int64(value: i64) -> InteropResult<Self> {
        Self::scalar(Primitive::I64, value, Ownership::Owned)
    }

    /// Owned `int64_t` array
    pub fn int64_array(values: &[i64]) -> InteropResult<Self> {
        Self::array(Primitive::I64, values, Ownership::Owned)
    }

    /// Owned `uint64_t` scalar
    pub fn uint64(value: u64) -> InteropResult<Self> {
        Self::scalar(Primitive::U64, value, Ownership::Owned)
    }

    /// Owned `uint64_t` array
    pub fn uint64_array(values: &[u64]) -> InteropResult<Self> {
        Self::array(Primitive::U64, values, Ownership::Owned)
    }

    /// Owned `float` scalar
    pub fn float(value: f32) -> InteropResult<Self> {
        Self::scalar(Primitive::F32, value, Ownership::Owned)
    }

    /// Owned `float` array
    pub fn float_array(values: &[f32]) -> InteropResult<Self> {
        Self::array(Primitive::F32, values, Ownership::Owned)
    }

    /// Owned `double` scalar
    pub fn double(value: f64) -> InteropResult<Self> {
        Self::scalar(Primitive::F64, value, Ownership::Owned)
    }

    /// Owned `double` array
    pub fn double_array(values: &[f64]) -> InteropResult<Self> {
        Self::array(Primitive::F64, values, Ownership::Owned)
    }

    /// Owned `long double` scalar (marshals through host `f64`)
    pub fn long_double(value: f64) -> InteropResult<Self> {
        Self::scalar(Primitive::F80, value, Ownership::Owned)
    }

    /// Owned `long double` array (marshals through host `f64`)
    pub fn long_double_array(values: &[f64]) -> InteropResult<Self> {
        Self::array(Primitive::F80, values, Ownership::Owned)
    }

    /// Owned `bool` scalar
    pub fn bool(value: bool) -> InteropResult<Self> {
        Self::scalar(Primitive::Bool, value, Ownership::Owned)
    }

    /// Owned `bool` array
    pub fn bool_array(values: &[bool]) -> InteropResult<Self> {
        Self::array(Primitive::Bool, values, Ownership::Owned)
    }

    /// Owned `char` scalar.
    ///
    /// The character must fit a single byte; anything wider is a contract
    /// violation and fails before any allocation.
    pub fn char(value: char) -> InteropResult<Self> {
        if value as u32 > 0xff {
            return Err(InteropError::InvalidChar(value));
        }
        Self::scalar(Primitive::Char, Value::Char(value as u8), Ownership::Owned)
    }

    /// Owned `char` array; no terminator is appended
    pub fn char_array(values: &[u8]) -> InteropResult<Self> {
        Self::array(Primitive::Char, values, Ownership::Owned)
    }

    /// Owned null-terminated string; see [`CBuffer::string_with`]
    pub fn string(value: &str) -> InteropResult<Self> {
        Self::string_with(value, Ownership::Owned)
    }

    /// Null-terminated string: allocates `len + 1` char elements and
    /// bulk-copies the content plus one `\0` in a single copy.
    pub fn string_with(value: &str, ownership: Ownership) -> InteropResult<Self> {
        let mut bytes = Vec::with_capacity(value.len() + 1);
        bytes.extend_from_slice(value.as_bytes());
        bytes.push(0);
        Self::char_region(&bytes, ownership)
    }

    /// Owned wide-terminated string; see [`CBuffer::wide_string_with`]
    pub fn wide_string(value: &str) -> InteropResult<Self> {
        Self::wide_string_with(value, Ownership::Owned)
    }

    /// Wide-terminated string: allocates `len + 2` char elements and
    /// bulk-copies the content plus two `\0` bytes in a single copy.
    pub fn wide_string_with(value: &str, ownership: Ownership) -> InteropResult<Self> {
        let mut bytes = Vec::with_capacity(value.len() + 2);
        bytes.extend_from_slice(value.as_bytes());
        bytes.push(0);
        bytes.push(0);
        Self::char_region(&bytes, ownership)
    }

    /// Owned array of C strings; see [`CBuffer::string_array_with`]
    pub fn string_array(values: &[&str]) -> InteropResult<Self> {
        Self::string_array_with(values, Ownership::Owned)
    }

    /// Array of C strings: one null-terminated char region per element
    /// plus a `char *` pointer array over them.
    ///
    /// The pointer array keeps the element regions alive — their lifetime
    /// is governed by the array, not by handles of their own. Releasing
    /// or dropping the array releases the elements with it.
    pub fn string_array_with(values: &[&str], ownership: Ownership) -> InteropResult<Self> {
        Self::pointer_array(values, ownership, Self::string_with)
    }

    /// Owned array of wide strings; see [`CBuffer::string_array_with`]
    pub fn wide_string_array(values: &[&str]) -> InteropResult<Self> {
        Self::wide_string_array_with(values, Ownership::Owned)
    }

    /// Array of wide strings, with the same entanglement as
    /// [`CBuffer::string_array_with`]
    pub fn wide_string_array_with(values: &[&str], ownership: Ownership) -> InteropResult<Self> {
        Self::pointer_array(values, ownership, Self::wide_string_with)
    }

    fn char_region(bytes: &[u8], ownership: Ownership) -> InteropResult<Self> {
        let mut buf = Self::zeroed(Descriptor::Array(Primitive::Char, bytes.len()), ownership)?;
        // Safety: the region was just allocated with bytes.len() bytes.
        unsafe { engine::copy(buf.as_mut_ptr(), bytes.as_ptr(), bytes.len()) };
        Ok(buf)
    }

    fn pointer_array<F>(values: &[&str], ownership: Ownership, make: F) -> InteropResult<Self>
    where
        F: Fn(&str, Ownership) -> InteropResult<CBuffer>,
    {
        if values.is_empty() {
            return Self::zeroed(Descriptor::Pointer(Primitive::Char), ownership);
        }

        // Element regions share the array's ownership mode so that drop
        // and release compose: an owned array frees its elements when it
        // drops, a borrowed array leaves them for release().
        let mut elements = Vec::with_capacity(values.len());
        for &value in values {
            elements.push(make(value, ownership)?);
        }

        let mut array = Self::zeroed(
            Descriptor::PointerArray(Primitive::Char, values.len()),
            ownership,
        )?;
        for (i, element) in elements.iter().enumerate() {
            array.write_pointer(i, element.as_ptr() as usize);
        }
        array.keepalive = elements;
        Ok(array)
    }
}
