//! Owned, explicitly aligned native buffers with typed access
//!
//! `NativeBuffer` is a single zero-initialised allocation made through
//! `std::alloc` with a caller-chosen alignment. Elements are read and
//! written in native byte order either at a byte offset or at an element
//! index. Checked accessors return [`MaskError::OutOfBounds`]; the
//! `_unchecked` variants only assert in debug builds.

use crate::error::{check_range, MaskError, Result};
use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::fmt;
use std::mem;
use std::ptr::{self, NonNull};
use std::slice;

/// Default alignment requested for mask and operand buffers
pub const DEFAULT_ALIGNMENT: usize = 8;

/// Largest alignment a buffer may request
pub const MAX_ALIGNMENT: usize = 4096;

mod sealed {
    pub trait Sealed {}
}

/// Plain fixed-width integers that can live inside a [`NativeBuffer`]
///
/// Every bit pattern of an implementor is a valid value, which is what makes
/// the typed slice views on `NativeBuffer` sound. The trait is sealed.
pub trait NativeElement: sealed::Sealed + Copy + Default + PartialEq + fmt::Debug + 'static {
    /// Width of one element in bytes
    const SIZE: usize;

    /// Decode one element from exactly `SIZE` native-order bytes
    fn read_ne(bytes: &[u8]) -> Self;

    /// Encode this element into exactly `SIZE` native-order bytes
    fn write_ne(self, bytes: &mut [u8]);
}

macro_rules! impl_native_element {
    ($($t:ty),* $(,)?) => {
        $(
            impl sealed::Sealed for $t {}

            impl NativeElement for $t {
                const SIZE: usize = mem::size_of::<$t>();

                #[inline]
                fn read_ne(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; mem::size_of::<$t>()];
                    raw.copy_from_slice(&bytes[..Self::SIZE]);
                    <$t>::from_ne_bytes(raw)
                }

                #[inline]
                fn write_ne(self, bytes: &mut [u8]) {
                    bytes[..Self::SIZE].copy_from_slice(&self.to_ne_bytes());
                }
            }
        )*
    };
}

impl_native_element!(u8, i8, u16, i16, u32, i32, u64, i64);

/// Owned contiguous allocation with a fixed byte length and alignment
pub struct NativeBuffer {
    ptr: NonNull<u8>,
    len: usize,
    align: usize,
}

impl NativeBuffer {
    /// Allocate `byte_len` zeroed bytes aligned to `align`
    ///
    /// `align` must be a power of two no larger than [`MAX_ALIGNMENT`].
    pub fn allocate(byte_len: usize, align: usize) -> Result<Self> {
        if !align.is_power_of_two() || align > MAX_ALIGNMENT {
            return Err(MaskError::invalid_data(format!(
                "Alignment {} is not a power of two in [1, {}]",
                align, MAX_ALIGNMENT
            )));
        }

        if byte_len == 0 {
            // Aligned dangling pointer, never dereferenced for a zero-length slice
            let ptr = NonNull::new(align as *mut u8)
                .ok_or_else(|| MaskError::invalid_data("Zero alignment"))?;
            return Ok(Self { ptr, len: 0, align });
        }

        let layout = Layout::from_size_align(byte_len, align)
            .map_err(|_| MaskError::invalid_data("Invalid layout for native buffer"))?;

        let raw = unsafe { alloc_zeroed(layout) };
        let ptr = NonNull::new(raw).ok_or_else(|| MaskError::out_of_memory(byte_len))?;

        Ok(Self {
            ptr,
            len: byte_len,
            align,
        })
    }

    /// Allocate room for `count` elements of `T`
    ///
    /// The effective alignment is at least `align_of::<T>()` so typed slice
    /// views are always available.
    pub fn allocate_elements<T: NativeElement>(count: usize, align: usize) -> Result<Self> {
        let byte_len = count
            .checked_mul(T::SIZE)
            .ok_or_else(|| MaskError::out_of_memory(usize::MAX))?;
        Self::allocate(byte_len, align.max(mem::align_of::<T>()))
    }

    /// Allocate a buffer holding a copy of `values`
    pub fn from_elements<T: NativeElement>(values: &[T], align: usize) -> Result<Self> {
        let mut buffer = Self::allocate_elements::<T>(values.len(), align)?;
        buffer.as_mut_slice::<T>()?.copy_from_slice(values);
        Ok(buffer)
    }

    /// Length in bytes
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.len
    }

    /// Check if the buffer holds no bytes
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Alignment the buffer was allocated with
    #[inline]
    pub fn alignment(&self) -> usize {
        self.align
    }

    /// Number of whole `T` elements that fit in the buffer
    #[inline]
    pub fn element_count<T: NativeElement>(&self) -> usize {
        self.len / T::SIZE
    }

    /// Raw bytes
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Raw bytes, mutable
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Typed view of the whole buffer
    ///
    /// Fails if the byte length is not a multiple of `T::SIZE` or the
    /// allocation is not aligned for `T`.
    pub fn as_slice<T: NativeElement>(&self) -> Result<&[T]> {
        self.check_typed_view::<T>()?;
        Ok(unsafe { slice::from_raw_parts(self.ptr.as_ptr() as *const T, self.len / T::SIZE) })
    }

    /// Mutable typed view of the whole buffer
    pub fn as_mut_slice<T: NativeElement>(&mut self) -> Result<&mut [T]> {
        self.check_typed_view::<T>()?;
        Ok(unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr() as *mut T, self.len / T::SIZE) })
    }

    fn check_typed_view<T: NativeElement>(&self) -> Result<()> {
        if self.len % T::SIZE != 0 {
            return Err(MaskError::invalid_data(format!(
                "Buffer of {} bytes is not a whole number of {}-byte elements",
                self.len,
                T::SIZE
            )));
        }
        if (self.ptr.as_ptr() as usize) % mem::align_of::<T>() != 0 {
            return Err(MaskError::invalid_data(format!(
                "Buffer aligned to {} cannot be viewed as {}-aligned elements",
                self.align,
                mem::align_of::<T>()
            )));
        }
        Ok(())
    }

    /// Read the element stored at `byte_offset`
    #[inline]
    pub fn get<T: NativeElement>(&self, byte_offset: usize) -> Result<T> {
        let end = byte_offset
            .checked_add(T::SIZE)
            .ok_or_else(|| MaskError::out_of_bounds(byte_offset, self.len))?;
        check_range(byte_offset, end, self.len)?;
        Ok(T::read_ne(&self.as_bytes()[byte_offset..end]))
    }

    /// Write `value` at `byte_offset`
    #[inline]
    pub fn set<T: NativeElement>(&mut self, byte_offset: usize, value: T) -> Result<()> {
        let end = byte_offset
            .checked_add(T::SIZE)
            .ok_or_else(|| MaskError::out_of_bounds(byte_offset, self.len))?;
        check_range(byte_offset, end, self.len)?;
        value.write_ne(&mut self.as_bytes_mut()[byte_offset..end]);
        Ok(())
    }

    /// Read the `index`-th element of width `T::SIZE`
    #[inline]
    pub fn get_at_index<T: NativeElement>(&self, index: usize) -> Result<T> {
        let offset = index
            .checked_mul(T::SIZE)
            .ok_or_else(|| MaskError::out_of_bounds(index, self.element_count::<T>()))?;
        self.get(offset)
    }

    /// Write the `index`-th element of width `T::SIZE`
    #[inline]
    pub fn set_at_index<T: NativeElement>(&mut self, index: usize, value: T) -> Result<()> {
        let offset = index
            .checked_mul(T::SIZE)
            .ok_or_else(|| MaskError::out_of_bounds(index, self.element_count::<T>()))?;
        self.set(offset, value)
    }

    /// Read the element at `byte_offset` without bounds checking
    ///
    /// # Safety
    ///
    /// The caller must ensure that `byte_offset + T::SIZE <= self.byte_len()`
    #[inline]
    pub unsafe fn get_unchecked<T: NativeElement>(&self, byte_offset: usize) -> T {
        debug_assert!(byte_offset + T::SIZE <= self.len);
        unsafe { ptr::read_unaligned(self.ptr.as_ptr().add(byte_offset) as *const T) }
    }

    /// Write `value` at `byte_offset` without bounds checking
    ///
    /// # Safety
    ///
    /// The caller must ensure that `byte_offset + T::SIZE <= self.byte_len()`
    #[inline]
    pub unsafe fn set_unchecked<T: NativeElement>(&mut self, byte_offset: usize, value: T) {
        debug_assert!(byte_offset + T::SIZE <= self.len);
        unsafe { ptr::write_unaligned(self.ptr.as_ptr().add(byte_offset) as *mut T, value) }
    }

    /// Allocate a new buffer with the same alignment and contents
    pub fn try_clone(&self) -> Result<Self> {
        let mut copy = Self::allocate(self.len, self.align)?;
        copy.as_bytes_mut().copy_from_slice(self.as_bytes());
        Ok(copy)
    }

    /// Stable address of the allocation, used to check buffer identity
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }
}

impl Drop for NativeBuffer {
    fn drop(&mut self) {
        if self.len == 0 {
            return;
        }
        // Same size and alignment accepted by `allocate`
        if let Ok(layout) = Layout::from_size_align(self.len, self.align) {
            unsafe { dealloc(self.ptr.as_ptr(), layout) };
        }
    }
}

impl fmt::Debug for NativeBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeBuffer")
            .field("byte_len", &self.len)
            .field("align", &self.align)
            .finish()
    }
}

// The buffer exclusively owns its allocation
unsafe impl Send for NativeBuffer {}
unsafe impl Sync for NativeBuffer {}
