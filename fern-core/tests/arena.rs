use fern_core::arena::{DEFAULT_ALIGNMENT, MIN_BLOCK_SIZE};
use fern_core::{Arena, ArenaError, ArenaVec, SourceStr};
use proptest::prelude::*;

fn request() -> impl Strategy<Value = (usize, usize)> {
    (1usize..3000, 0u32..8).prop_map(|(size, shift)| (size, 1usize << shift))
}

proptest! {
    #[test]
    fn allocations_are_aligned_zeroed_and_disjoint(
        requests in proptest::collection::vec(request(), 1..64),
    ) {
        let arena = Arena::new().expect("arena");
        let mut ranges = Vec::new();
        for &(size, align) in &requests {
            let ptr = arena.alloc_aligned(size, align).expect("alloc");
            let start = ptr.as_ptr() as usize;
            prop_assert_eq!(start % align, 0);
            // SAFETY: the arena handed out `size` bytes at `ptr`.
            let bytes = unsafe { std::slice::from_raw_parts(ptr.as_ptr(), size) };
            prop_assert!(bytes.iter().all(|&b| b == 0));
            // SAFETY: same region; mark it so overlap would show up below.
            unsafe { std::ptr::write_bytes(ptr.as_ptr(), 0xEE, size) };
            ranges.push(start..start + size);
        }
        ranges.sort_by_key(|r| r.start);
        for pair in ranges.windows(2) {
            prop_assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn total_allocated_counts_rounded_sizes(sizes in proptest::collection::vec(0usize..512, 0..32)) {
        let arena = Arena::new().expect("arena");
        let mut expected = 0;
        for &size in &sizes {
            arena.alloc(size).expect("alloc");
            expected += size.div_ceil(DEFAULT_ALIGNMENT) * DEFAULT_ALIGNMENT;
        }
        prop_assert_eq!(arena.total_allocated(), expected);
    }

    #[test]
    fn reset_is_idempotent(sizes in proptest::collection::vec(1usize..6000, 1..16)) {
        let mut arena = Arena::new().expect("arena");
        for &size in &sizes {
            arena.alloc(size).expect("alloc");
        }
        let blocks = arena.block_count();
        arena.reset();
        arena.reset();
        prop_assert_eq!(arena.total_allocated(), 0);
        prop_assert_eq!(arena.block_count(), blocks);

        let again = arena.alloc_zeroed_bytes(64).expect("alloc");
        prop_assert!(again.iter().all(|&b| b == 0));
    }

    #[test]
    fn vector_growth_preserves_contents(values in proptest::collection::vec(any::<u64>(), 0..300)) {
        let arena = Arena::new().expect("arena");
        let mut vec = ArenaVec::new(&arena).expect("vec");
        for &value in &values {
            vec.push(value).expect("push");
        }
        prop_assert_eq!(vec.as_slice(), values.as_slice());
        prop_assert!(vec.capacity() >= vec.len());
    }

    #[test]
    fn string_ordering_is_bytewise(a in any::<Vec<u8>>(), b in any::<Vec<u8>>()) {
        let arena = Arena::new().expect("arena");
        let left = SourceStr::from_bytes(&arena, &a).expect("alloc");
        let right = SourceStr::from_bytes(&arena, &b).expect("alloc");
        prop_assert_eq!(left.cmp(&right), a.cmp(&b));
        prop_assert_eq!(left == right, a == b);
    }
}

#[test]
fn block_size_is_raised_to_minimum() {
    let arena = Arena::with_block_size(1).expect("arena");
    assert_eq!(arena.block_size(), MIN_BLOCK_SIZE);
    assert_eq!(arena.capacity(), MIN_BLOCK_SIZE);
}

#[test]
fn oversized_request_gets_its_own_block() {
    let arena = Arena::new().expect("arena");
    arena.alloc(100).expect("alloc");
    let big = arena.alloc_zeroed_bytes(3 * MIN_BLOCK_SIZE).expect("alloc");
    assert_eq!(big.len(), 3 * MIN_BLOCK_SIZE);
    assert_eq!(arena.block_count(), 2);
    assert!(big.iter().all(|&b| b == 0));
}

#[test]
fn absurd_sizes_fail_cleanly() {
    let arena = Arena::new().expect("arena");
    assert!(matches!(
        arena.alloc(usize::MAX),
        Err(ArenaError::LayoutOverflow { .. })
    ));
    assert!(matches!(
        arena.alloc_aligned(16, 12),
        Err(ArenaError::InvalidAlignment(12))
    ));
}

#[test]
fn formatted_strings_are_exact() {
    let arena = Arena::new().expect("arena");
    let loc = SourceStr::format(&arena, format_args!("{}:{}", "lib.fn", 12)).expect("alloc");
    assert_eq!(loc, "lib.fn:12");
    let joined = SourceStr::concat(&arena, loc, SourceStr::borrowed(b":4")).expect("alloc");
    assert_eq!(joined.to_str(), Some("lib.fn:12:4"));
}
