//! Named-field record regions.
//!
//! A [`RecordLayout`] lays out named primitive fields with C struct
//! rules: each field offset is aligned to the field's alignment, and the
//! total size is rounded up to the struct alignment. Field assignment is
//! applied in the order given and never rolls back — an unknown field
//! name errors mid-way with the earlier writes retained.

use std::fmt;

use crate::buffer::{CBuffer, Ownership};
use crate::descriptor::{Descriptor, Primitive};
use crate::error::{InteropError, InteropResult};
use crate::value::Value;

/// One named field inside a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordField {
    /// Field name
    pub name: String,
    /// Primitive kind of the field
    pub kind: Primitive,
    /// Byte offset from the start of the record
    pub offset: usize,
}

/// C-layout description of a named-field record
#[derive(Debug, Clone, PartialEq)]
pub struct RecordLayout {
    fields: Vec<RecordField>,
    size: usize,
    align: usize,
}

impl RecordLayout {
    /// Lay out `fields` in declaration order with C struct rules
    pub fn new(fields: &[(&str, Primitive)]) -> Self {
        let mut laid_out = Vec::with_capacity(fields.len());
        let mut offset = 0usize;
        let mut align = 1usize;

        for (name, kind) in fields {
            let a = kind.align();
            align = align.max(a);
            offset = (offset + a - 1) / a * a;
            laid_out.push(RecordField {
                name: (*name).to_string(),
                kind: *kind,
                offset,
            });
            offset += kind.width();
        }

        let size = ((offset + align - 1) / align * align).max(1);
        Self {
            fields: laid_out,
            size,
            align,
        }
    }

    /// Total byte size including trailing padding
    pub fn byte_len(&self) -> usize {
        self.size
    }

    /// Struct alignment (the largest field alignment)
    pub fn align(&self) -> usize {
        self.align
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&RecordField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// All fields in declaration order
    pub fn fields(&self) -> &[RecordField] {
        &self.fields
    }
}

impl fmt::Display for RecordLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "struct {{ ")?;
        for field in &self.fields {
            write!(f, "{} {}; ", field.kind, field.name)?;
        }
        write!(f, "}}")
    }
}

impl CBuffer {
    /// Allocate a zeroed record region with the given layout
    pub fn record(layout: RecordLayout, ownership: Ownership) -> InteropResult<Self> {
        Self::zeroed(Descriptor::Record(layout), ownership)
    }

    /// Assign named fields in the order given and return the same handle
    /// for fluent chaining.
    ///
    /// There is no rollback: an unknown field name errors immediately,
    /// and fields assigned before it stay written. A field repeated
    /// across calls is last-write-wins.
    pub fn struct_assign<'a, I, V>(&mut self, fields: I) -> InteropResult<&mut Self>
    where
        I: IntoIterator<Item = (&'a str, V)>,
        V: Into<Value>,
    {
        let layout = match &self.descriptor {
            Descriptor::Record(layout) => layout.clone(),
            _ => {
                return Err(InteropError::DescriptorMismatch(
                    "struct_assign requires a record region",
                ))
            }
        };

        for (name, value) in fields {
            let field = layout
                .field(name)
                .ok_or_else(|| InteropError::UnknownField(name.to_string()))?;
            self.write_at(field.kind, field.offset, value.into());
        }
        Ok(self)
    }

    /// Read a named field of a record region
    pub fn field(&self, name: &str) -> InteropResult<Value> {
        let layout = match &self.descriptor {
            Descriptor::Record(layout) => layout,
            _ => {
                return Err(InteropError::DescriptorMismatch(
                    "field access requires a record region",
                ))
            }
        };
        let field = layout
            .field(name)
            .ok_or_else(|| InteropError::UnknownField(name.to_string()))?;
        Ok(self.read_at(field.kind, field.offset))
    }
}
