//! Serializers: read a native handle back into a host value.
//!
//! Reading through a mismatched accessor (an integer region through
//! [`CBuffer::to_f64`], say) follows C numeric conversion, not an error.
//! Sizes and terminators, on the other hand, are checked: the engine this
//! layer mirrors would read past the allocation, and a memory-safe
//! rendition reports that as an error instead.

use crate::buffer::CBuffer;
use crate::engine;
use crate::error::{InteropError, InteropResult};
use crate::value::Value;

impl CBuffer {
    /// Read char data up to the null terminator and decode as UTF-8.
    ///
    /// Errors if no terminator exists inside the allocation — the native
    /// convention would keep reading past the region.
    #[allow(clippy::inherent_to_string)]
    pub fn to_string(&self) -> InteropResult<String> {
        // Safety: the scan is bounded by the allocation size.
        let content_len = unsafe { engine::terminated_len(self.as_ptr(), self.byte_len()) }
            .ok_or(InteropError::MissingTerminator(self.byte_len()))?;
        let content = &self.bytes()[..content_len];
        Ok(std::str::from_utf8(content)?.to_owned())
    }

    /// Read the scalar region and coerce to a signed integer
    pub fn to_i64(&self) -> InteropResult<i64> {
        Ok(self.value()?.as_i64())
    }

    /// Read the scalar region and coerce to a float
    pub fn to_f64(&self) -> InteropResult<f64> {
        Ok(self.value()?.as_f64())
    }

    /// Read the scalar region and coerce to a boolean
    pub fn to_bool(&self) -> InteropResult<bool> {
        Ok(self.value()?.as_bool())
    }

    /// Read exactly `size` positional elements, in order, into a fresh
    /// vector.
    ///
    /// Errors if `size` exceeds the element count — the native convention
    /// would read past the allocation.
    pub fn to_vec(&self, size: usize) -> InteropResult<Vec<Value>> {
        if size > self.len() {
            return Err(InteropError::OutOfBounds {
                index: size,
                len: self.len(),
            });
        }
        (0..size).map(|i| self.index(i)).collect()
    }
}
