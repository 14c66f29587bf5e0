pub type TagMask = u32;

pub const TAG_COUNT: usize = 9;
pub const SCRATCHPAD_COUNT: usize = 3;

/// Every bit a client may carry: real tags plus the scratchpad tags above them.
pub const TAG_MASK: TagMask = (1 << (TAG_COUNT + SCRATCHPAD_COUNT)) - 1;
pub const SCRATCHPAD_MASK: TagMask = ((1 << SCRATCHPAD_COUNT) - 1) << TAG_COUNT;
pub const REAL_TAG_MASK: TagMask = (1 << TAG_COUNT) - 1;

/// The argument used for "view every tag".
pub const ALL_TAGS: TagMask = !0;

pub const fn tag_bit(index: usize) -> TagMask {
    1 << index
}

pub const fn scratchpad_tag(index: usize) -> TagMask {
    (1 << TAG_COUNT) << index
}

/// 1-based number of the lowest set tag, the pertag slot used for a view.
pub fn lowest_tag_number(mask: TagMask) -> Option<usize> {
    if mask == 0 {
        None
    } else {
        Some(mask.trailing_zeros() as usize + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test]
    fn masks_are_disjoint_and_cover_everything() {
        assert_eq!(REAL_TAG_MASK & SCRATCHPAD_MASK, 0);
        assert_eq!(REAL_TAG_MASK | SCRATCHPAD_MASK, TAG_MASK);
        assert_eq!(scratchpad_tag(0), 1 << 9);
        assert_eq!(scratchpad_tag(2), 1 << 11);
    }

    #[test_case(0, None; "empty")]
    #[test_case(0b1, Some(1); "first tag")]
    #[test_case(0b10100, Some(3); "lowest of several")]
    #[test]
    fn lowest_tag(mask: TagMask, expected: Option<usize>) {
        assert_eq!(lowest_tag_number(mask), expected);
    }
}
