//! # Dual Heap
//!
//! Two bump cursors sharing one pool: the lower heap grows up from the
//! base, the upper heap grows down from the cap. Only the cursors are
//! tracked; individual allocations leave no record.

use std::fmt;
use std::str::FromStr;

use crate::error::{FrameError, FrameResult};

/// Rounds `value` up to the next multiple of `align`.
///
/// `align` must be a power of two. Returns `None` on overflow.
#[inline]
#[must_use]
pub const fn align_up(value: usize, align: usize) -> Option<usize> {
    debug_assert!(align.is_power_of_two(), "alignment must be a power of two");
    match value.checked_add(align - 1) {
        Some(v) => Some(v & !(align - 1)),
        None => None,
    }
}

/// Which of the two heaps an operation targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HeapSide {
    /// Grows from the pool base upward.
    Lower,
    /// Grows from the pool cap downward.
    Upper,
}

impl HeapSide {
    /// Both heaps, lower first.
    pub const ALL: [Self; 2] = [Self::Lower, Self::Upper];

    /// The heap growing toward this one.
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Lower => Self::Upper,
            Self::Upper => Self::Lower,
        }
    }
}

impl fmt::Display for HeapSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lower => f.write_str("lower"),
            Self::Upper => f.write_str("upper"),
        }
    }
}

impl FromStr for HeapSide {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lower" | "0" => Ok(Self::Lower),
            "upper" | "1" => Ok(Self::Upper),
            other => Err(FrameError::InvalidConfig(format!(
                "unknown heap '{other}', expected 'lower' or 'upper'"
            ))),
        }
    }
}

/// Cursor state for the two heaps of one pool.
///
/// Cursors are byte offsets from the pool base. At all times
/// `0 <= lower <= upper <= capacity`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DualHeap {
    lower: usize,
    upper: usize,
    capacity: usize,
    alignment: usize,
    /// Largest `lower_used + upper_used` seen since creation or reset.
    peak_used: usize,
}

impl DualHeap {
    /// Creates cursors for a pool of `capacity` bytes.
    ///
    /// `alignment` must be a power of two and `capacity` a multiple of it;
    /// [`MemoryPool`](super::MemoryPool) guarantees both.
    #[must_use]
    pub const fn new(capacity: usize, alignment: usize) -> Self {
        debug_assert!(alignment.is_power_of_two(), "alignment must be a power of two");
        debug_assert!(capacity % alignment == 0, "capacity must be a multiple of the alignment");
        Self {
            lower: 0,
            upper: capacity,
            capacity,
            alignment,
            peak_used: 0,
        }
    }

    /// Current cursor offset of `side`.
    #[inline]
    #[must_use]
    pub const fn cursor(&self, side: HeapSide) -> usize {
        match side {
            HeapSide::Lower => self.lower,
            HeapSide::Upper => self.upper,
        }
    }

    /// Bytes currently allocated on `side`.
    #[inline]
    #[must_use]
    pub const fn used(&self, side: HeapSide) -> usize {
        match side {
            HeapSide::Lower => self.lower,
            HeapSide::Upper => self.capacity - self.upper,
        }
    }

    /// Bytes still free between the two cursors.
    #[inline]
    #[must_use]
    pub const fn free(&self) -> usize {
        self.upper - self.lower
    }

    /// Pool capacity in bytes.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Alignment every allocation is rounded to.
    #[inline]
    #[must_use]
    pub const fn alignment(&self) -> usize {
        self.alignment
    }

    /// High-water mark of total bytes in use.
    #[inline]
    #[must_use]
    pub const fn peak_used(&self) -> usize {
        self.peak_used
    }

    /// Moves the cursor of `side` by `requested` bytes rounded up to the
    /// alignment.
    ///
    /// Returns `(offset, reserved)`: the start of the new allocation and
    /// the rounded size. Fails without touching any state if the two
    /// cursors would cross.
    ///
    /// # Errors
    ///
    /// [`FrameError::OutOfMemory`] when the request does not fit.
    pub fn bump(&mut self, side: HeapSide, requested: usize) -> FrameResult<(usize, usize)> {
        let out_of_memory = || FrameError::OutOfMemory {
            heap: side,
            requested,
            available: self.free(),
        };

        let reserved = align_up(requested, self.alignment).ok_or_else(out_of_memory)?;
        if reserved > self.free() {
            return Err(out_of_memory());
        }

        let offset = match side {
            HeapSide::Lower => {
                let offset = self.lower;
                self.lower += reserved;
                offset
            }
            HeapSide::Upper => {
                self.upper -= reserved;
                self.upper
            }
        };

        let used = self.capacity - self.free();
        if used > self.peak_used {
            self.peak_used = used;
        }
        Ok((offset, reserved))
    }

    /// Whether moving the cursor of `side` back to `saved` only returns
    /// memory (never claims any).
    #[inline]
    #[must_use]
    pub const fn can_rewind(&self, side: HeapSide, saved: usize) -> bool {
        match side {
            HeapSide::Lower => saved <= self.lower,
            HeapSide::Upper => saved >= self.upper && saved <= self.capacity,
        }
    }

    /// Moves the cursor of `side` to `saved`.
    ///
    /// Callers check [`can_rewind`](Self::can_rewind) first. An unchecked
    /// `saved` is clamped so the cursors never cross or leave the pool.
    #[inline]
    pub(crate) fn rewind(&mut self, side: HeapSide, saved: usize) {
        match side {
            HeapSide::Lower => self.lower = saved.min(self.upper),
            HeapSide::Upper => self.upper = saved.min(self.capacity).max(self.lower),
        }
    }

    /// Returns both cursors to their initial positions.
    pub fn reset(&mut self) {
        self.lower = 0;
        self.upper = self.capacity;
        self.peak_used = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(0, 16), Some(0));
        assert_eq!(align_up(1, 16), Some(16));
        assert_eq!(align_up(100, 16), Some(112));
        assert_eq!(align_up(112, 16), Some(112));
        assert_eq!(align_up(usize::MAX, 16), None);
    }

    #[test]
    fn test_lower_grows_up_upper_grows_down() {
        let mut heap = DualHeap::new(1024, 16);

        assert_eq!(heap.bump(HeapSide::Lower, 100), Ok((0, 112)));
        assert_eq!(heap.cursor(HeapSide::Lower), 112);

        assert_eq!(heap.bump(HeapSide::Upper, 10), Ok((1008, 16)));
        assert_eq!(heap.cursor(HeapSide::Upper), 1008);

        assert_eq!(heap.used(HeapSide::Lower), 112);
        assert_eq!(heap.used(HeapSide::Upper), 16);
        assert_eq!(heap.free(), 1024 - 128);
    }

    #[test]
    fn test_exact_fit_then_exhaustion() {
        let mut heap = DualHeap::new(64, 16);
        heap.bump(HeapSide::Lower, 32).unwrap();
        heap.bump(HeapSide::Upper, 32).unwrap();
        assert_eq!(heap.free(), 0);

        let err = heap.bump(HeapSide::Lower, 1).unwrap_err();
        assert_eq!(
            err,
            FrameError::OutOfMemory {
                heap: HeapSide::Lower,
                requested: 1,
                available: 0,
            }
        );
        // Zero-byte requests still succeed on a full pool.
        assert_eq!(heap.bump(HeapSide::Upper, 0), Ok((32, 0)));
    }

    #[test]
    fn test_failed_bump_leaves_state_untouched() {
        let mut heap = DualHeap::new(64, 16);
        heap.bump(HeapSide::Lower, 16).unwrap();
        let before = heap.clone();

        assert!(heap.bump(HeapSide::Upper, 64).is_err());
        assert!(heap.bump(HeapSide::Lower, usize::MAX).is_err());
        assert_eq!(heap, before);
    }

    #[test]
    fn test_rewind_direction() {
        let mut heap = DualHeap::new(256, 16);
        heap.bump(HeapSide::Lower, 32).unwrap();
        heap.bump(HeapSide::Upper, 32).unwrap();

        assert!(heap.can_rewind(HeapSide::Lower, 0));
        assert!(heap.can_rewind(HeapSide::Lower, 32));
        assert!(!heap.can_rewind(HeapSide::Lower, 48));

        assert!(heap.can_rewind(HeapSide::Upper, 256));
        assert!(heap.can_rewind(HeapSide::Upper, 224));
        assert!(!heap.can_rewind(HeapSide::Upper, 208));
        assert!(!heap.can_rewind(HeapSide::Upper, 272));
    }

    #[test]
    fn test_peak_survives_rewind_until_reset() {
        let mut heap = DualHeap::new(256, 16);
        heap.bump(HeapSide::Lower, 64).unwrap();
        heap.bump(HeapSide::Upper, 32).unwrap();
        heap.rewind(HeapSide::Lower, 0);
        assert_eq!(heap.peak_used(), 96);

        heap.reset();
        assert_eq!(heap.peak_used(), 0);
        assert_eq!(heap.cursor(HeapSide::Upper), 256);
    }

    #[test]
    fn test_rewind_never_crosses_cursors() {
        let mut heap = DualHeap::new(64, 16);
        heap.bump(HeapSide::Upper, 48).unwrap();

        heap.rewind(HeapSide::Lower, 32);
        assert_eq!(heap.cursor(HeapSide::Lower), 16);

        heap.rewind(HeapSide::Upper, 4096);
        assert_eq!(heap.cursor(HeapSide::Upper), 64);

        heap.rewind(HeapSide::Upper, 0);
        assert_eq!(heap.cursor(HeapSide::Upper), 16);
        assert_eq!(heap.free(), 0);
    }

    #[test]
    #[should_panic(expected = "power of two")]
    #[cfg(debug_assertions)]
    fn test_align_up_rejects_zero_alignment() {
        let _ = align_up(8, 0);
    }

    #[test]
    fn test_heap_side_parsing() {
        assert_eq!("lower".parse::<HeapSide>(), Ok(HeapSide::Lower));
        assert_eq!("Upper".parse::<HeapSide>(), Ok(HeapSide::Upper));
        assert_eq!("1".parse::<HeapSide>(), Ok(HeapSide::Upper));
        assert!("middle".parse::<HeapSide>().is_err());
        assert_eq!(HeapSide::Lower.opposite(), HeapSide::Upper);
    }
}
