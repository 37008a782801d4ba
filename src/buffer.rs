//! Native memory handles.
//!
//! A [`CBuffer`] pairs a contiguous native region with its [`Descriptor`]
//! and an explicit [`Ownership`] flag. Owned handles release their region
//! when dropped; borrowed handles never free implicitly and are released
//! through [`crate::release`] (or deliberately leaked).
//!
//! Handles are not `Send` or `Sync`: this layer imposes no synchronization
//! of its own, and concurrent access to one region is entirely the
//! caller's responsibility.
//!
//! Positional access is bounds-checked. The engine this layer mirrors
//! treats out-of-range access as native array overrun; a memory-safe
//! rendition reports it as an error instead.

use std::fmt;
use std::mem;
use std::ptr::NonNull;

use crate::descriptor::{Descriptor, Primitive};
use crate::engine;
use crate::error::{InteropError, InteropResult};
use crate::value::Value;

/// Whether a handle's lifetime governs its region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Dropping the handle releases the region
    Owned,
    /// The region's lifetime is managed elsewhere; release is manual
    Borrowed,
}

/// A typed, contiguous native memory region
pub struct CBuffer {
    pub(crate) ptr: NonNull<u8>,
    pub(crate) descriptor: Descriptor,
    pub(crate) ownership: Ownership,
    /// Element regions this handle keeps alive (string-array elements);
    /// their lifetime is governed by this handle, not their own.
    pub(crate) keepalive: Vec<CBuffer>,
}

impl CBuffer {
    /// Allocate a zeroed region for `descriptor`.
    ///
    /// This is the bare allocate-without-assign path; the constructors in
    /// this crate all bottom out here.
    pub fn zeroed(descriptor: Descriptor, ownership: Ownership) -> InteropResult<Self> {
        let count = descriptor.len().max(1);
        let size = descriptor
            .stride()
            .checked_mul(count)
            .ok_or(InteropError::SizeOverflow {
                count,
                width: descriptor.stride(),
            })?;
        let ptr = engine::alloc(size)?;
        Ok(Self {
            ptr,
            descriptor,
            ownership,
            keepalive: Vec::new(),
        })
    }

    /// Wrap a foreign region without taking ownership.
    ///
    /// The resulting handle is [`Ownership::Borrowed`]: dropping it never
    /// frees the region. Passing it to [`crate::release`] frees the
    /// region through the C allocator, which is only sound for memory the
    /// C allocator handed out.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a live region of at least
    /// `descriptor.byte_len()` bytes, aligned for the descriptor, and the
    /// region must stay valid for the handle's lifetime.
    pub unsafe fn from_raw(ptr: NonNull<u8>, descriptor: Descriptor) -> Self {
        Self {
            ptr,
            descriptor,
            ownership: Ownership::Borrowed,
            keepalive: Vec::new(),
        }
    }

    /// The descriptor of this region
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// The ownership flag of this handle
    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    /// Check if dropping this handle releases the region
    pub fn is_owned(&self) -> bool {
        self.ownership == Ownership::Owned
    }

    /// Number of addressable elements (zero for a bare pointer cell)
    pub fn len(&self) -> usize {
        self.descriptor.len()
    }

    /// Check if the handle has no addressable elements
    pub fn is_empty(&self) -> bool {
        self.descriptor.is_empty()
    }

    /// Total allocated byte size of the region
    pub fn byte_len(&self) -> usize {
        self.descriptor.byte_len()
    }

    /// Raw pointer to the region
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    /// Raw mutable pointer to the region
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// The region's bytes
    pub fn bytes(&self) -> &[u8] {
        // Safety: the region is live and byte_len() matches the allocation.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.byte_len()) }
    }

    /// Element regions kept alive by this handle (string-array elements)
    pub fn retained(&self) -> &[CBuffer] {
        &self.keepalive
    }

    /// Read the scalar value through the descriptor-typed accessor.
    ///
    /// On an array this reads element zero; on a pointer cell it reads
    /// the stored address. Records have no scalar value.
    pub fn value(&self) -> InteropResult<Value> {
        match &self.descriptor {
            Descriptor::Record(_) => Err(InteropError::DescriptorMismatch(
                "record regions are accessed by field name",
            )),
            Descriptor::Pointer(_) | Descriptor::PointerArray(_, _) => Ok(self.read_pointer(0)),
            Descriptor::Scalar(p) | Descriptor::Array(p, _) => Ok(self.read_at(*p, 0)),
        }
    }

    /// Write the scalar value through the descriptor-typed accessor,
    /// applying the engine's coercion for the region's kind.
    pub fn set_value(&mut self, value: impl Into<Value>) -> InteropResult<()> {
        let value = value.into();
        match &self.descriptor {
            Descriptor::Record(_) => Err(InteropError::DescriptorMismatch(
                "record regions are accessed by field name",
            )),
            Descriptor::Pointer(_) | Descriptor::PointerArray(_, _) => {
                self.write_pointer(0, value.as_u64() as usize);
                Ok(())
            }
            Descriptor::Scalar(p) | Descriptor::Array(p, _) => {
                let kind = *p;
                self.write_at(kind, 0, value);
                Ok(())
            }
        }
    }

    /// Read the element at `index`
    pub fn index(&self, index: usize) -> InteropResult<Value> {
        let len = self.check_indexable(index)?;
        debug_assert!(index < len);
        Ok(match &self.descriptor {
            Descriptor::Scalar(p) | Descriptor::Array(p, _) => {
                self.read_at(*p, index * p.width())
            }
            _ => self.read_pointer(index),
        })
    }

    /// Write the element at `index`
    pub fn set_index(&mut self, index: usize, value: impl Into<Value>) -> InteropResult<()> {
        self.check_indexable(index)?;
        let value = value.into();
        match &self.descriptor {
            Descriptor::Scalar(p) | Descriptor::Array(p, _) => {
                let (kind, offset) = (*p, index * p.width());
                self.write_at(kind, offset, value);
            }
            _ => self.write_pointer(index, value.as_u64() as usize),
        }
        Ok(())
    }

    /// Build a new pointer-typed handle whose cell holds this region's
    /// address.
    ///
    /// The alias never owns the aliased region: dropping or releasing it
    /// frees only its own pointer cell. Releasing `self` and then
    /// dereferencing the stored address is the caller's responsibility,
    /// exactly as with a native address-of.
    pub fn addr_of(&self) -> InteropResult<CBuffer> {
        let pointee = self.descriptor.element().unwrap_or(Primitive::U8);
        let mut cell = CBuffer::zeroed(Descriptor::Pointer(pointee), Ownership::Owned)?;
        cell.write_pointer(0, self.ptr.as_ptr() as usize);
        Ok(cell)
    }

    fn check_indexable(&self, index: usize) -> InteropResult<usize> {
        if matches!(self.descriptor, Descriptor::Record(_)) {
            return Err(InteropError::DescriptorMismatch(
                "record regions are accessed by field name",
            ));
        }
        let len = self.descriptor.len();
        if index >= len {
            return Err(InteropError::OutOfBounds { index, len });
        }
        Ok(len)
    }

    pub(crate) fn read_at(&self, kind: Primitive, offset: usize) -> Value {
        debug_assert!(offset + kind.width() <= self.byte_len());
        let p = unsafe { self.ptr.as_ptr().add(offset) };
        // Safety: callers bounds-check the offset; element and field
        // offsets are aligned for their kind.
        unsafe {
            match kind {
                Primitive::I8 => Value::Int(p.cast::<i8>().read() as i64),
                Primitive::U8 => Value::UInt(p.read() as u64),
                Primitive::I16 => Value::Int(p.cast::<i16>().read() as i64),
                Primitive::U16 => Value::UInt(p.cast::<u16>().read() as u64),
                Primitive::I32 => Value::Int(p.cast::<i32>().read() as i64),
                Primitive::U32 => Value::UInt(p.cast::<u32>().read() as u64),
                Primitive::I64 => Value::Int(p.cast::<i64>().read()),
                Primitive::U64 => Value::UInt(p.cast::<u64>().read()),
                Primitive::F32 => Value::Float(p.cast::<f32>().read() as f64),
                // F80 slots carry a host double in their first eight bytes
                Primitive::F64 | Primitive::F80 => Value::Float(p.cast::<f64>().read()),
                Primitive::Bool => Value::Bool(p.read() != 0),
                Primitive::Char => Value::Char(p.read()),
            }
        }
    }

    pub(crate) fn write_at(&mut self, kind: Primitive, offset: usize, value: Value) {
        debug_assert!(offset + kind.width() <= self.byte_len());
        let p = unsafe { self.ptr.as_ptr().add(offset) };
        // Safety: callers bounds-check the offset; element and field
        // offsets are aligned for their kind.
        unsafe {
            match kind {
                Primitive::I8 => p.cast::<i8>().write(value.as_i64() as i8),
                Primitive::U8 => p.write(value.as_u64() as u8),
                Primitive::I16 => p.cast::<i16>().write(value.as_i64() as i16),
                Primitive::U16 => p.cast::<u16>().write(value.as_u64() as u16),
                Primitive::I32 => p.cast::<i32>().write(value.as_i64() as i32),
                Primitive::U32 => p.cast::<u32>().write(value.as_u64() as u32),
                Primitive::I64 => p.cast::<i64>().write(value.as_i64()),
                Primitive::U64 => p.cast::<u64>().write(value.as_u64()),
                Primitive::F32 => p.cast::<f32>().write(value.as_f64() as f32),
                Primitive::F64 | Primitive::F80 => p.cast::<f64>().write(value.as_f64()),
                Primitive::Bool => p.write(value.as_bool() as u8),
                Primitive::Char => p.write(value.as_u64() as u8),
            }
        }
    }

    fn read_pointer(&self, index: usize) -> Value {
        let offset = index * mem::size_of::<usize>();
        debug_assert!(offset + mem::size_of::<usize>() <= self.byte_len());
        // Safety: pointer cells are usize-aligned and bounds-checked.
        let addr = unsafe { self.ptr.as_ptr().add(offset).cast::<usize>().read() };
        Value::UInt(addr as u64)
    }

    pub(crate) fn write_pointer(&mut self, index: usize, addr: usize) {
        let offset = index * mem::size_of::<usize>();
        debug_assert!(offset + mem::size_of::<usize>() <= self.byte_len());
        // Safety: pointer cells are usize-aligned and bounds-checked.
        unsafe { self.ptr.as_ptr().add(offset).cast::<usize>().write(addr) };
    }
}

impl Drop for CBuffer {
    fn drop(&mut self) {
        if self.ownership == Ownership::Owned {
            // Safety: owned regions come from engine::alloc and are freed
            // exactly once; release() frees borrowed regions before the
            // handle reaches this point with ownership still Borrowed.
            unsafe { engine::dealloc(self.ptr) };
        }
        // keepalive children drop after the region that points at them
    }
}

impl fmt::Debug for CBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = self.byte_len().min(16);
        let window = &self.bytes()[..shown];
        let ellipsis = if self.byte_len() > shown { ".." } else { "" };
        f.debug_struct("CBuffer")
            .field("descriptor", &format_args!("{}", self.descriptor))
            .field("ownership", &self.ownership)
            .field("bytes", &format_args!("{}{}", hex::encode(window), ellipsis))
            .finish()
    }
}
