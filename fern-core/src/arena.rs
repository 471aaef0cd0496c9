//! Bump arena with block chaining.
//!
//! Every piece of front-end data (interned source text, token vectors,
//! scheduler queues) is carved out of an [`Arena`]. Allocation takes
//! `&self` and hands back memory whose lifetime is tied to that borrow,
//! so `reset` (which needs `&mut self`) statically invalidates every
//! earlier allocation. Dropping the arena releases the whole chain.
//!
//! Returned memory is always zero-filled, including memory reused after
//! a reset.

use std::alloc::{self, Layout};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::mem;
use std::ptr::{self, NonNull};
use std::slice;

use tracing::debug;

use crate::error::ArenaError;

/// Smallest block the arena will ever allocate.
pub const MIN_BLOCK_SIZE: usize = 4096;

/// Alignment used by [`Arena::alloc`]; every allocation size is also
/// rounded up to a multiple of it.
pub const DEFAULT_ALIGNMENT: usize = 16;

/// Upper bound on the number of blocks in one chain.
pub const MAX_BLOCKS: usize = 10_000;

struct Block {
    data: NonNull<u8>,
    size: usize,
    used: Cell<usize>,
}

impl Block {
    fn new(size: usize) -> Result<Block, ArenaError> {
        let layout = Layout::from_size_align(size, DEFAULT_ALIGNMENT)
            .map_err(|_| ArenaError::LayoutOverflow { size })?;
        // SAFETY: `size` is never zero; callers pass at least MIN_BLOCK_SIZE.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let data = NonNull::new(raw).ok_or(ArenaError::OutOfMemory {
            size,
            align: DEFAULT_ALIGNMENT,
        })?;
        Ok(Block {
            data,
            size,
            used: Cell::new(0),
        })
    }

    /// Offset at which an aligned region of `size` bytes fits, if any.
    fn fit(&self, size: usize, align: usize) -> Option<usize> {
        let base = self.data.as_ptr() as usize;
        let current = base.checked_add(self.used.get())?;
        let aligned = current.checked_add(align - 1)? & !(align - 1);
        let offset = aligned - base;
        let end = offset.checked_add(size)?;
        (end <= self.size).then_some(offset)
    }
}

impl Drop for Block {
    fn drop(&mut self) {
        // SAFETY: `data` was allocated in `Block::new` with exactly this layout.
        unsafe {
            alloc::dealloc(
                self.data.as_ptr(),
                Layout::from_size_align_unchecked(self.size, DEFAULT_ALIGNMENT),
            );
        }
    }
}

/// Region allocator owning a chain of blocks.
pub struct Arena {
    blocks: RefCell<Vec<Block>>,
    current: Cell<usize>,
    block_size: usize,
    total_allocated: Cell<usize>,
}

impl Arena {
    /// Create an arena with the minimum block size.
    pub fn new() -> Result<Arena, ArenaError> {
        Arena::with_block_size(MIN_BLOCK_SIZE)
    }

    /// Create an arena whose blocks hold at least `block_size` bytes.
    ///
    /// Sizes below [`MIN_BLOCK_SIZE`] are raised to it.
    pub fn with_block_size(block_size: usize) -> Result<Arena, ArenaError> {
        let block_size = block_size.max(MIN_BLOCK_SIZE);
        let first = Block::new(block_size)?;
        Ok(Arena {
            blocks: RefCell::new(vec![first]),
            current: Cell::new(0),
            block_size,
            total_allocated: Cell::new(0),
        })
    }

    /// Allocate `size` zeroed bytes at the default alignment.
    pub fn alloc(&self, size: usize) -> Result<NonNull<u8>, ArenaError> {
        self.alloc_aligned(size, DEFAULT_ALIGNMENT)
    }

    /// Allocate `size` zeroed bytes aligned to `align`.
    ///
    /// `align` must be a power of two. When the current block has no
    /// room, a later block left over from a reset is reused if it fits;
    /// otherwise a block of `max(block_size, size + align)` bytes is
    /// appended to the chain.
    pub fn alloc_aligned(&self, size: usize, align: usize) -> Result<NonNull<u8>, ArenaError> {
        if !align.is_power_of_two() {
            return Err(ArenaError::InvalidAlignment(align));
        }
        let aligned_size = align_up(size, DEFAULT_ALIGNMENT).ok_or(ArenaError::LayoutOverflow { size })?;

        let mut blocks = self.blocks.borrow_mut();
        let (index, offset) = match self.find_room(&blocks, aligned_size, align) {
            Some(found) => found,
            None => {
                if blocks.len() >= MAX_BLOCKS {
                    return Err(ArenaError::BlockLimit(MAX_BLOCKS));
                }
                let required = aligned_size
                    .checked_add(align)
                    .ok_or(ArenaError::LayoutOverflow { size })?;
                let block = Block::new(self.block_size.max(required))?;
                let offset = block
                    .fit(aligned_size, align)
                    .ok_or(ArenaError::LayoutOverflow { size })?;
                debug!(
                    block_size = block.size,
                    blocks = blocks.len() + 1,
                    "arena appended block"
                );
                blocks.push(block);
                (blocks.len() - 1, offset)
            }
        };

        let block = &blocks[index];
        block.used.set(offset + aligned_size);
        self.current.set(index);
        self.total_allocated
            .set(self.total_allocated.get().saturating_add(aligned_size));

        // SAFETY: `fit` guarantees `offset + aligned_size <= block.size`, so the
        // region lies inside the block and is not handed out to anyone else
        // until the next `reset`, which requires `&mut self`.
        unsafe {
            let ptr = block.data.as_ptr().add(offset);
            ptr::write_bytes(ptr, 0, size);
            Ok(NonNull::new_unchecked(ptr))
        }
    }

    fn find_room(&self, blocks: &[Block], size: usize, align: usize) -> Option<(usize, usize)> {
        let current = self.current.get();
        blocks
            .iter()
            .enumerate()
            .skip(current)
            .find_map(|(index, block)| block.fit(size, align).map(|offset| (index, offset)))
    }

    /// Allocate a zeroed byte slice of length `len`.
    pub fn alloc_zeroed_bytes(&self, len: usize) -> Result<&mut [u8], ArenaError> {
        let ptr = self.alloc(len)?;
        // SAFETY: `alloc` returned an exclusive, zeroed region of `len` bytes that
        // stays valid for as long as `self` is borrowed.
        Ok(unsafe { slice::from_raw_parts_mut(ptr.as_ptr(), len) })
    }

    /// Copy `bytes` into the arena.
    pub fn alloc_bytes(&self, bytes: &[u8]) -> Result<&mut [u8], ArenaError> {
        let out = self.alloc_zeroed_bytes(bytes.len())?;
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Copy `text` into the arena.
    pub fn alloc_str(&self, text: &str) -> Result<&str, ArenaError> {
        let bytes = self.alloc_bytes(text.as_bytes())?;
        // SAFETY: the bytes were copied verbatim from a `&str`.
        Ok(unsafe { std::str::from_utf8_unchecked(bytes) })
    }

    /// Copy a slice of plain values into the arena.
    pub fn alloc_slice_copy<T: Copy>(&self, items: &[T]) -> Result<&mut [T], ArenaError> {
        let size = mem::size_of_val(items);
        let ptr = self.alloc_aligned(size, mem::align_of::<T>())?.cast::<T>();
        // SAFETY: the region is exclusive, suitably aligned for `T` and large
        // enough for `items.len()` elements; `T: Copy` needs no drop.
        unsafe {
            ptr::copy_nonoverlapping(items.as_ptr(), ptr.as_ptr(), items.len());
            Ok(slice::from_raw_parts_mut(ptr.as_ptr(), items.len()))
        }
    }

    /// Move a single plain value into the arena.
    pub fn alloc_value<T: Copy>(&self, value: T) -> Result<&mut T, ArenaError> {
        let ptr = self
            .alloc_aligned(mem::size_of::<T>(), mem::align_of::<T>())?
            .cast::<T>();
        // SAFETY: exclusive, aligned region sized for one `T`.
        unsafe {
            ptr.as_ptr().write(value);
            Ok(&mut *ptr.as_ptr())
        }
    }

    /// Forget every allocation but keep the blocks for reuse.
    pub fn reset(&mut self) {
        let blocks = self.blocks.get_mut();
        for block in blocks.iter().take(MAX_BLOCKS) {
            block.used.set(0);
        }
        self.current.set(0);
        self.total_allocated.set(0);
        debug!(blocks = blocks.len(), "arena reset");
    }

    /// Release every block. Equivalent to dropping the arena.
    pub fn destroy(self) {
        drop(self);
    }

    /// Bytes handed out since creation or the last reset, counting the
    /// per-allocation rounding to [`DEFAULT_ALIGNMENT`].
    pub fn total_allocated(&self) -> usize {
        self.total_allocated.get()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.borrow().len()
    }

    /// Sum of all block sizes in the chain.
    pub fn capacity(&self) -> usize {
        self.blocks.borrow().iter().map(|block| block.size).sum()
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("blocks", &self.block_count())
            .field("capacity", &self.capacity())
            .field("block_size", &self.block_size)
            .field("total_allocated", &self.total_allocated())
            .finish()
    }
}

fn align_up(n: usize, align: usize) -> Option<usize> {
    Some(n.checked_add(align - 1)? & !(align - 1))
}
