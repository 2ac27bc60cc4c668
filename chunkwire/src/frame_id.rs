//! Frame identifier allocation.
//!
//! Every transfer invocation consumes exactly one identifier, whether it
//! succeeds or not, so datagrams of two transfers can never share a
//! `frame_id` within one process lifetime. The counter never wraps: once
//! `u32::MAX` has been handed out the allocator is exhausted.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// First identifier handed out by a fresh allocator.
pub const FIRST_FRAME_ID: u32 = 1;

/// Monotonic frame identifier counter.
///
/// Owned by whoever dispatches transfers. Allocation is a single atomic
/// update, so the allocator can be shared if transfers ever run
/// concurrently.
#[derive(Debug)]
pub struct FrameIdAllocator {
    next: AtomicU32,
    exhausted: AtomicBool,
}

impl FrameIdAllocator {
    /// Creates an allocator starting at [`FIRST_FRAME_ID`].
    pub const fn new() -> Self {
        Self::starting_at(FIRST_FRAME_ID)
    }

    /// Creates an allocator whose first identifier is `first`.
    pub const fn starting_at(first: u32) -> Self {
        Self {
            next: AtomicU32::new(first),
            exhausted: AtomicBool::new(false),
        }
    }

    /// Allocates the next identifier, or `None` once every id is used up.
    pub fn allocate(&self) -> Option<u32> {
        if self.exhausted.load(Ordering::Acquire) {
            return None;
        }
        match self
            .next
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |id| id.checked_add(1))
        {
            Ok(id) => Some(id),
            // `u32::MAX` itself is still handed out, exactly once.
            Err(last) if !self.exhausted.swap(true, Ordering::AcqRel) => Some(last),
            Err(_) => None,
        }
    }

    /// Returns the identifier the next allocation will hand out, if any.
    pub fn peek(&self) -> Option<u32> {
        if self.exhausted.load(Ordering::Acquire) {
            return None;
        }
        Some(self.next.load(Ordering::Acquire))
    }
}

impl Default for FrameIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
