//! Interop - typed buffer marshaling over native C memory
//!
//! A thin convenience layer over the native allocator: helper
//! constructors for scalar, array, and string regions, serializers to
//! read them back, and a handful of raw memory utilities (copy, compare,
//! fill, release, address-of, record-field assignment). Every operation
//! delegates straight to the underlying memory primitives — there is no
//! scheduler, no caching, and no synchronization in this layer.
//!
//! # Architecture
//!
//! ```text
//! host value
//!      │
//!      ▼
//! CBuffer constructor (scalar / array / string)
//!      │
//!      ▼
//! native region  ──  descriptor + ownership flag
//!      │
//!      ▼
//! serializer (to_string / to_i64 / to_f64 / to_bool / to_vec)
//!      │
//!      ▼
//! host value
//! ```
//!
//! # Ownership
//!
//! Every handle carries an explicit [`Ownership`] flag. `Owned` handles
//! release their region when dropped; `Borrowed` handles never free
//! implicitly and are released manually through [`release`]. Handles are
//! not `Send`/`Sync` — concurrent access to a region is the caller's
//! responsibility.
//!
//! # Example
//!
//! ```rust
//! use interop::CBuffer;
//!
//! let numbers = CBuffer::int32_array(&[1, 2, 3])?;
//! let read: Vec<i64> = numbers.to_vec(3)?.iter().map(|v| v.as_i64()).collect();
//! assert_eq!(read, [1, 2, 3]);
//!
//! let greeting = CBuffer::string("hello")?;
//! assert_eq!(greeting.byte_len(), 6); // content plus terminator
//! assert_eq!(greeting.to_string()?, "hello");
//! # Ok::<(), interop::InteropError>(())
//! ```

#![warn(clippy::all)]

pub mod buffer;
pub mod descriptor;
pub mod error;
pub mod mem;
pub mod record;
pub mod value;

mod construct;
mod engine;
mod serialize;

// Re-export the full marshaling surface
pub use buffer::{CBuffer, Ownership};
pub use descriptor::{Descriptor, Primitive};
pub use error::{InteropError, InteropResult};
pub use mem::{compare_bytes, copy_bytes, fill_bytes, release, AsByteRegion};
pub use record::{RecordField, RecordLayout};
pub use value::Value;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_roundtrip_smoke() {
        let buf = CBuffer::int32(42).unwrap();
        assert_eq!(buf.to_i64().unwrap(), 42);
    }

    #[test]
    fn test_descriptor_grammar_smoke() {
        let d = Descriptor::parse("uint16_t[8]").unwrap();
        assert_eq!(d, Descriptor::Array(Primitive::U16, 8));
        assert_eq!(d.to_string(), "uint16_t[8]");
    }
}
