//! Type descriptors for native memory regions.
//!
//! A descriptor names the layout of a region: a primitive kind, a fixed
//! array of a kind, a typed pointer cell, an array of pointer cells, or a
//! named-field record. Every descriptor maps to a fixed platform byte
//! width and alignment; the marshaler is always told the descriptor
//! explicitly and never infers it from a host value's representation.
//!
//! Descriptor strings follow a C-like grammar: a base kind keyword
//! (`int8_t`, `uint32_t`, `float`, `double`, `long double`, `bool`,
//! `char`), an optional `*` for pointers, and an optional `[n]` suffix
//! for fixed arrays (`int32_t[3]`, `char *`, `char *[2]`).

use std::fmt;
use std::mem;

use crate::error::{InteropError, InteropResult};
use crate::record::RecordLayout;

/// Primitive kinds supported by the marshaler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// 8-bit signed integer
    I8,
    /// 8-bit unsigned integer
    U8,
    /// 16-bit signed integer
    I16,
    /// 16-bit unsigned integer
    U16,
    /// 32-bit signed integer
    I32,
    /// 32-bit unsigned integer
    U32,
    /// 64-bit signed integer
    I64,
    /// 64-bit unsigned integer
    U64,
    /// 32-bit floating point
    F32,
    /// 64-bit floating point
    F64,
    /// Extended float (C `long double`). Occupies a 16-byte slot but
    /// marshals through host `f64`; the extra bits of the native
    /// extended format are not materialized.
    F80,
    /// One-byte boolean
    Bool,
    /// One-byte character
    Char,
}

impl Primitive {
    /// Byte width of one element of this kind
    pub fn width(&self) -> usize {
        match self {
            Primitive::I8 | Primitive::U8 | Primitive::Bool | Primitive::Char => 1,
            Primitive::I16 | Primitive::U16 => 2,
            Primitive::I32 | Primitive::U32 | Primitive::F32 => 4,
            Primitive::I64 | Primitive::U64 | Primitive::F64 => 8,
            // x86-64 SysV long double storage size
            Primitive::F80 => 16,
        }
    }

    /// Required alignment of this kind (widths are powers of two)
    pub fn align(&self) -> usize {
        self.width()
    }

    /// Check if this kind is an integer kind
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Primitive::I8
                | Primitive::U8
                | Primitive::I16
                | Primitive::U16
                | Primitive::I32
                | Primitive::U32
                | Primitive::I64
                | Primitive::U64
        )
    }

    /// Check if this kind is a floating point kind
    pub fn is_float(&self) -> bool {
        matches!(self, Primitive::F32 | Primitive::F64 | Primitive::F80)
    }

    /// Check if this kind is signed
    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            Primitive::I8 | Primitive::I16 | Primitive::I32 | Primitive::I64
        ) || self.is_float()
    }

    /// The C keyword for this kind
    pub fn keyword(&self) -> &'static str {
        match self {
            Primitive::I8 => "int8_t",
            Primitive::U8 => "uint8_t",
            Primitive::I16 => "int16_t",
            Primitive::U16 => "uint16_t",
            Primitive::I32 => "int32_t",
            Primitive::U32 => "uint32_t",
            Primitive::I64 => "int64_t",
            Primitive::U64 => "uint64_t",
            Primitive::F32 => "float",
            Primitive::F64 => "double",
            Primitive::F80 => "long double",
            Primitive::Bool => "bool",
            Primitive::Char => "char",
        }
    }

    /// Parse a base kind keyword
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.trim() {
            "int8_t" | "i8" | "int8" => Some(Primitive::I8),
            "uint8_t" | "u8" | "uint8" => Some(Primitive::U8),
            "int16_t" | "i16" | "int16" => Some(Primitive::I16),
            "uint16_t" | "u16" | "uint16" => Some(Primitive::U16),
            "int32_t" | "i32" | "int32" | "int" => Some(Primitive::I32),
            "uint32_t" | "u32" | "uint32" => Some(Primitive::U32),
            "int64_t" | "i64" | "int64" | "long" => Some(Primitive::I64),
            "uint64_t" | "u64" | "uint64" => Some(Primitive::U64),
            "float" | "f32" => Some(Primitive::F32),
            "double" | "f64" => Some(Primitive::F64),
            "long double" | "ldouble" | "f80" => Some(Primitive::F80),
            "bool" | "_Bool" => Some(Primitive::Bool),
            "char" => Some(Primitive::Char),
            _ => None,
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Layout descriptor for a native memory region
#[derive(Debug, Clone, PartialEq)]
pub enum Descriptor {
    /// One element of a primitive kind
    Scalar(Primitive),
    /// `n` contiguous elements of the same kind, `n > 0`
    Array(Primitive, usize),
    /// One pointer cell typed as pointer-to-kind
    Pointer(Primitive),
    /// `n` contiguous pointer cells typed as pointer-to-kind
    PointerArray(Primitive, usize),
    /// Named-field record with C struct layout
    Record(RecordLayout),
}

impl Descriptor {
    /// Total byte size of a region with this descriptor
    pub fn byte_len(&self) -> usize {
        match self {
            Descriptor::Scalar(p) => p.width(),
            Descriptor::Array(p, n) => p.width() * n,
            Descriptor::Pointer(_) => mem::size_of::<usize>(),
            Descriptor::PointerArray(_, n) => mem::size_of::<usize>() * n,
            Descriptor::Record(r) => r.byte_len(),
        }
    }

    /// Required alignment of a region with this descriptor
    pub fn align(&self) -> usize {
        match self {
            Descriptor::Scalar(p) | Descriptor::Array(p, _) => p.align(),
            Descriptor::Pointer(_) | Descriptor::PointerArray(_, _) => mem::align_of::<usize>(),
            Descriptor::Record(r) => r.align(),
        }
    }

    /// Number of addressable elements.
    ///
    /// Scalars and records count as one. A bare pointer cell counts as
    /// zero: it is the representation of an empty array and has no
    /// indexable elements.
    pub fn len(&self) -> usize {
        match self {
            Descriptor::Scalar(_) | Descriptor::Record(_) => 1,
            Descriptor::Array(_, n) | Descriptor::PointerArray(_, n) => *n,
            Descriptor::Pointer(_) => 0,
        }
    }

    /// Check if the descriptor has no addressable elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Byte distance between consecutive elements
    pub(crate) fn stride(&self) -> usize {
        match self {
            Descriptor::Scalar(p) | Descriptor::Array(p, _) => p.width(),
            Descriptor::Pointer(_) | Descriptor::PointerArray(_, _) => mem::size_of::<usize>(),
            Descriptor::Record(r) => r.byte_len(),
        }
    }

    /// The primitive kind of the elements, if any (records have none)
    pub fn element(&self) -> Option<Primitive> {
        match self {
            Descriptor::Scalar(p)
            | Descriptor::Array(p, _)
            | Descriptor::Pointer(p)
            | Descriptor::PointerArray(p, _) => Some(*p),
            Descriptor::Record(_) => None,
        }
    }

    /// Check if this descriptor is pointer-shaped
    pub fn is_pointer(&self) -> bool {
        matches!(
            self,
            Descriptor::Pointer(_) | Descriptor::PointerArray(_, _)
        )
    }

    /// Parse a descriptor string in the C-like grammar.
    ///
    /// Record descriptors are built programmatically through
    /// [`RecordLayout`] and have no string form here.
    pub fn parse(s: &str) -> InteropResult<Self> {
        let input = s.trim();

        let (head, count) = match input.find('[') {
            Some(i) => {
                let inner = input[i + 1..]
                    .strip_suffix(']')
                    .ok_or_else(|| InteropError::MalformedDescriptor(s.to_string()))?;
                let n: usize = inner
                    .trim()
                    .parse()
                    .map_err(|_| InteropError::MalformedDescriptor(s.to_string()))?;
                (input[..i].trim_end(), Some(n))
            }
            None => (input, None),
        };

        let (base, pointer) = match head.strip_suffix('*') {
            Some(b) => (b.trim_end(), true),
            None => (head, false),
        };

        let kind = Primitive::from_keyword(base)
            .ok_or_else(|| InteropError::MalformedDescriptor(s.to_string()))?;

        match (pointer, count) {
            (false, None) => Ok(Descriptor::Scalar(kind)),
            // The allocator disallows zero-length fixed arrays.
            (_, Some(0)) => Err(InteropError::MalformedDescriptor(s.to_string())),
            (false, Some(n)) => Ok(Descriptor::Array(kind, n)),
            (true, None) => Ok(Descriptor::Pointer(kind)),
            (true, Some(n)) => Ok(Descriptor::PointerArray(kind, n)),
        }
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::Scalar(p) => write!(f, "{}", p),
            Descriptor::Array(p, n) => write!(f, "{}[{}]", p, n),
            Descriptor::Pointer(p) => write!(f, "{} *", p),
            Descriptor::PointerArray(p, n) => write!(f, "{} *[{}]", p, n),
            Descriptor::Record(r) => write!(f, "{}", r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_widths() {
        assert_eq!(Primitive::I8.width(), 1);
        assert_eq!(Primitive::U16.width(), 2);
        assert_eq!(Primitive::F32.width(), 4);
        assert_eq!(Primitive::U64.width(), 8);
        assert_eq!(Primitive::F80.width(), 16);
        assert_eq!(Primitive::Bool.width(), 1);
        assert_eq!(Primitive::Char.width(), 1);
    }

    #[test]
    fn test_primitive_properties() {
        assert!(Primitive::U64.is_integer());
        assert!(!Primitive::U64.is_float());
        assert!(!Primitive::U64.is_signed());

        assert!(Primitive::I32.is_signed());
        assert!(Primitive::F64.is_float());
        assert!(Primitive::F64.is_signed());
        assert!(!Primitive::Char.is_integer());
    }

    #[test]
    fn test_keyword_parsing() {
        assert_eq!(Primitive::from_keyword("int8_t"), Some(Primitive::I8));
        assert_eq!(Primitive::from_keyword("uint32_t"), Some(Primitive::U32));
        assert_eq!(Primitive::from_keyword("double"), Some(Primitive::F64));
        assert_eq!(Primitive::from_keyword("long double"), Some(Primitive::F80));
        assert_eq!(Primitive::from_keyword("int"), Some(Primitive::I32));
        assert_eq!(Primitive::from_keyword("invalid"), None);
    }

    #[test]
    fn test_descriptor_parse() {
        assert_eq!(
            Descriptor::parse("int32_t").unwrap(),
            Descriptor::Scalar(Primitive::I32)
        );
        assert_eq!(
            Descriptor::parse("char[5]").unwrap(),
            Descriptor::Array(Primitive::Char, 5)
        );
        assert_eq!(
            Descriptor::parse("char *").unwrap(),
            Descriptor::Pointer(Primitive::Char)
        );
        assert_eq!(
            Descriptor::parse("char *[2]").unwrap(),
            Descriptor::PointerArray(Primitive::Char, 2)
        );
        assert_eq!(
            Descriptor::parse("uint8_t*").unwrap(),
            Descriptor::Pointer(Primitive::U8)
        );

        assert!(Descriptor::parse("int32_t[0]").is_err());
        assert!(Descriptor::parse("int32_t[").is_err());
        assert!(Descriptor::parse("quux").is_err());
    }

    #[test]
    fn test_descriptor_display_roundtrip() {
        for d in [
            Descriptor::Scalar(Primitive::F80),
            Descriptor::Array(Primitive::I16, 7),
            Descriptor::Pointer(Primitive::Char),
            Descriptor::PointerArray(Primitive::Char, 3),
        ] {
            assert_eq!(Descriptor::parse(&d.to_string()).unwrap(), d);
        }
    }

    #[test]
    fn test_descriptor_sizes() {
        assert_eq!(Descriptor::Scalar(Primitive::I32).byte_len(), 4);
        assert_eq!(Descriptor::Array(Primitive::I16, 3).byte_len(), 6);
        assert_eq!(
            Descriptor::Pointer(Primitive::Char).byte_len(),
            mem::size_of::<usize>()
        );
        assert_eq!(
            Descriptor::PointerArray(Primitive::Char, 2).byte_len(),
            2 * mem::size_of::<usize>()
        );
    }

    #[test]
    fn test_descriptor_len() {
        assert_eq!(Descriptor::Scalar(Primitive::I32).len(), 1);
        assert_eq!(Descriptor::Array(Primitive::I32, 4).len(), 4);
        // A bare pointer is the empty-array representation.
        assert_eq!(Descriptor::Pointer(Primitive::I32).len(), 0);
        assert!(Descriptor::Pointer(Primitive::I32).is_empty());
    }
}
