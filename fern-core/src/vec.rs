//! Growable vector whose storage lives in an [`Arena`].
//!
//! Growth allocates a fresh region twice the size and copies the live
//! elements over; the old region is simply abandoned until the arena is
//! reset or dropped. Elements are restricted to `Copy` types so that
//! abandoning storage never skips a destructor.

use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ptr::{self, NonNull};
use std::slice;

use crate::arena::Arena;
use crate::error::ArenaError;

/// Capacity of a freshly created vector.
pub const VEC_INITIAL_CAPACITY: usize = 8;

pub struct ArenaVec<'a, T: Copy> {
    arena: &'a Arena,
    data: NonNull<T>,
    len: usize,
    cap: usize,
    _marker: PhantomData<&'a mut [T]>,
}

impl<'a, T: Copy> ArenaVec<'a, T> {
    pub fn new(arena: &'a Arena) -> Result<Self, ArenaError> {
        let data = allocate::<T>(arena, VEC_INITIAL_CAPACITY)?;
        Ok(ArenaVec {
            arena,
            data,
            len: 0,
            cap: VEC_INITIAL_CAPACITY,
            _marker: PhantomData,
        })
    }

    /// Append `item`, doubling the capacity when full.
    ///
    /// On allocation failure the vector is left unchanged.
    pub fn push(&mut self, item: T) -> Result<(), ArenaError> {
        if self.len == self.cap {
            let new_cap = self
                .cap
                .checked_mul(2)
                .ok_or(ArenaError::LayoutOverflow { size: usize::MAX })?;
            let new_data = allocate::<T>(self.arena, new_cap)?;
            // SAFETY: the old region holds `len` initialised elements and the new
            // one has room for `new_cap > len`; distinct arena allocations never
            // overlap.
            unsafe { ptr::copy_nonoverlapping(self.data.as_ptr(), new_data.as_ptr(), self.len) };
            self.data = new_data;
            self.cap = new_cap;
        }
        // SAFETY: `len < cap`, so the slot is inside the allocation.
        unsafe { self.data.as_ptr().add(self.len).write(item) };
        self.len += 1;
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    pub fn last(&self) -> Option<&T> {
        self.as_slice().last()
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Remove the element at `index`, filling the hole with the last
    /// element. Order is not preserved.
    pub fn swap_remove(&mut self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }
        let last = self.len - 1;
        let slice = self.as_mut_slice();
        let item = slice[index];
        slice[index] = slice[last];
        self.len = last;
        Some(item)
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the first `len` slots are initialised and the region outlives `'a`.
        unsafe { slice::from_raw_parts(self.data.as_ptr(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in `as_slice`; `&mut self` makes the access exclusive.
        unsafe { slice::from_raw_parts_mut(self.data.as_ptr(), self.len) }
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }
}

fn allocate<T>(arena: &Arena, cap: usize) -> Result<NonNull<T>, ArenaError> {
    let size = mem::size_of::<T>()
        .checked_mul(cap)
        .ok_or(ArenaError::LayoutOverflow { size: usize::MAX })?;
    Ok(arena.alloc_aligned(size, mem::align_of::<T>())?.cast::<T>())
}

impl<'v, T: Copy> IntoIterator for &'v ArenaVec<'_, T> {
    type Item = &'v T;
    type IntoIter = slice::Iter<'v, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Copy + fmt::Debug> fmt::Debug for ArenaVec<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
