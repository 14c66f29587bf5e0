use crate::geometry::Rect;

pub mod flags {
    pub const P_MIN_SIZE: u32 = 1 << 4;
    pub const P_MAX_SIZE: u32 = 1 << 5;
    pub const P_RESIZE_INC: u32 = 1 << 6;
    pub const P_ASPECT: u32 = 1 << 7;
    pub const P_BASE_SIZE: u32 = 1 << 8;
}

/// Word offsets into a raw WM_NORMAL_HINTS property.
pub mod offset {
    pub const FLAGS: usize = 0;
    pub const MIN_WIDTH: usize = 5;
    pub const MIN_HEIGHT: usize = 6;
    pub const MAX_WIDTH: usize = 7;
    pub const MAX_HEIGHT: usize = 8;
    pub const WIDTH_INC: usize = 9;
    pub const HEIGHT_INC: usize = 10;
    pub const MIN_ASPECT_X: usize = 11;
    pub const MIN_ASPECT_Y: usize = 12;
    pub const MAX_ASPECT_X: usize = 13;
    pub const MAX_ASPECT_Y: usize = 14;
    pub const BASE_WIDTH: usize = 15;
    pub const BASE_HEIGHT: usize = 16;
}

/// Size constraints a client advertises. Zero means "unconstrained" for every field.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SizeHints {
    pub base_width: i32,
    pub base_height: i32,
    pub increment_width: i32,
    pub increment_height: i32,
    pub max_width: i32,
    pub max_height: i32,
    pub min_width: i32,
    pub min_height: i32,
    /// Height over width lower bound.
    pub min_aspect: f32,
    /// Width over height upper bound.
    pub max_aspect: f32,
}

impl SizeHints {
    /// Decode the raw WM_NORMAL_HINTS words. Base size falls back to the minimum and
    /// minimum falls back to the base, as ICCCM 4.1.2.3 asks.
    pub fn from_raw(raw: &[u32]) -> Self {
        let word = |index: usize| raw.get(index).copied().unwrap_or(0) as i32;
        let hint_flags = raw.get(offset::FLAGS).copied().unwrap_or(0);
        let has = |flag: u32| hint_flags & flag != 0;

        let (base_width, base_height) = if has(flags::P_BASE_SIZE) {
            (word(offset::BASE_WIDTH), word(offset::BASE_HEIGHT))
        } else if has(flags::P_MIN_SIZE) {
            (word(offset::MIN_WIDTH), word(offset::MIN_HEIGHT))
        } else {
            (0, 0)
        };

        let (increment_width, increment_height) = if has(flags::P_RESIZE_INC) {
            (word(offset::WIDTH_INC), word(offset::HEIGHT_INC))
        } else {
            (0, 0)
        };

        let (max_width, max_height) = if has(flags::P_MAX_SIZE) {
            (word(offset::MAX_WIDTH), word(offset::MAX_HEIGHT))
        } else {
            (0, 0)
        };

        let (min_width, min_height) = if has(flags::P_MIN_SIZE) {
            (word(offset::MIN_WIDTH), word(offset::MIN_HEIGHT))
        } else if has(flags::P_BASE_SIZE) {
            (word(offset::BASE_WIDTH), word(offset::BASE_HEIGHT))
        } else {
            (0, 0)
        };

        let ratio = |numerator: i32, denominator: i32| {
            if denominator == 0 {
                0.0
            } else {
                numerator as f32 / denominator as f32
            }
        };

        let (min_aspect, max_aspect) = if has(flags::P_ASPECT) {
            (
                ratio(word(offset::MIN_ASPECT_Y), word(offset::MIN_ASPECT_X)),
                ratio(word(offset::MAX_ASPECT_X), word(offset::MAX_ASPECT_Y)),
            )
        } else {
            (0.0, 0.0)
        };

        Self {
            base_width,
            base_height,
            increment_width: increment_width.max(0),
            increment_height: increment_height.max(0),
            max_width,
            max_height,
            min_width,
            min_height,
            min_aspect,
            max_aspect,
        }
    }

    pub fn is_fixed(&self) -> bool {
        self.max_width > 0
            && self.max_height > 0
            && self.max_width == self.min_width
            && self.max_height == self.min_height
    }

    /// Apply aspect, increment and min/max constraints to a candidate size.
    pub fn constrain(&self, mut width: i32, mut height: i32) -> (i32, i32) {
        let base_is_min =
            self.base_width == self.min_width && self.base_height == self.min_height;

        if !base_is_min {
            width -= self.base_width;
            height -= self.base_height;
        }

        if self.min_aspect > 0.0 && self.max_aspect > 0.0 {
            if self.max_aspect < width as f32 / height as f32 {
                width = (height as f32 * self.max_aspect + 0.5) as i32;
            } else if self.min_aspect < height as f32 / width as f32 {
                height = (width as f32 * self.min_aspect + 0.5) as i32;
            }
        }

        if base_is_min {
            width -= self.base_width;
            height -= self.base_height;
        }

        if self.increment_width > 0 {
            width -= width % self.increment_width;
        }
        if self.increment_height > 0 {
            height -= height % self.increment_height;
        }

        width = (width + self.base_width).max(self.min_width);
        height = (height + self.base_height).max(self.min_height);

        if self.max_width > 0 {
            width = width.min(self.max_width);
        }
        if self.max_height > 0 {
            height = height.min(self.max_height);
        }

        (width, height)
    }
}

const MAX_SIZE_PASSES: usize = 4096;

/// Everything outside the client that bounds where it may be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveBounds {
    pub work_area: Rect,
    pub screen_width: i32,
    pub screen_height: i32,
    pub bar_height: i32,
    /// Hints apply when the resizehints policy is on, the client floats, or the
    /// layout does not arrange.
    pub respect_hints: bool,
}

/// Correct a proposed client rect (border excluded) against the client's hints and the
/// screen. Returns the corrected rect and whether it differs from `current`.
///
/// Size is settled before position so the result is a fixed point: resolving a resolved
/// rect again yields the same rect.
pub fn resolve(
    current: Rect,
    border_width: i32,
    hints: &SizeHints,
    proposed: Rect,
    interactive: bool,
    bounds: &ResolveBounds,
) -> (Rect, bool) {
    let Rect {
        mut x,
        mut y,
        mut w,
        mut h,
    } = proposed;

    // aspect and increment corrections can undo each other, keep going until neither moves
    for _ in 0..MAX_SIZE_PASSES {
        let mut next = (
            w.max(1).max(bounds.bar_height),
            h.max(1).max(bounds.bar_height),
        );
        if bounds.respect_hints {
            next = hints.constrain(next.0, next.1);
        }
        if next == (w, h) {
            break;
        }
        (w, h) = next;
    }

    let current_outer_width = current.w + 2 * border_width;
    let current_outer_height = current.h + 2 * border_width;

    if interactive {
        if x > bounds.screen_width {
            x = bounds.screen_width - current_outer_width;
        }
        if y > bounds.screen_height {
            y = bounds.screen_height - current_outer_height;
        }
        if x + w + 2 * border_width < 0 {
            x = 0;
        }
        if y + h + 2 * border_width < 0 {
            y = 0;
        }
    } else {
        let area = bounds.work_area;
        if x >= area.x + area.w {
            x = area.x + area.w - current_outer_width;
        }
        if y >= area.y + area.h {
            y = area.y + area.h - current_outer_height;
        }
        if x + w + 2 * border_width <= area.x {
            x = area.x;
        }
        if y + h + 2 * border_width <= area.y {
            y = area.y;
        }
    }

    let resolved = Rect::new(x, y, w, h);
    (resolved, resolved != current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;
    use simple_test_case::test_case;

    fn bounds(respect_hints: bool) -> ResolveBounds {
        ResolveBounds {
            work_area: Rect::new(0, 23, 1280, 777),
            screen_width: 1280,
            screen_height: 800,
            bar_height: 23,
            respect_hints,
        }
    }

    fn bounded(g: &mut Gen, max: u32) -> i32 {
        (u32::arbitrary(g) % max) as i32
    }

    // Hint sets as a well behaved client advertises them: min and max sit on the
    // increment grid above the base size. Aspect bounds may still contradict the grid.
    #[derive(Debug, Clone)]
    struct GridHints(SizeHints);

    impl Arbitrary for GridHints {
        fn arbitrary(g: &mut Gen) -> Self {
            let axis = |g: &mut Gen| {
                let base = bounded(g, 40);
                let increment = bounded(g, 16);
                let step = increment.max(1);
                let min = base + bounded(g, 10) * step;
                let max = if bool::arbitrary(g) {
                    0
                } else {
                    min + bounded(g, 60) * step
                };
                (base, increment, min, max)
            };
            let (base_width, increment_width, min_width, max_width) = axis(g);
            let (base_height, increment_height, min_height, max_height) = axis(g);
            let ratios = [0.0, 0.5, 0.75, 1.0, 4.0 / 3.0, 16.0 / 9.0, 2.0];
            let min_aspect = *g.choose(&ratios).unwrap();
            let max_aspect = *g.choose(&ratios).unwrap();

            Self(SizeHints {
                base_width,
                base_height,
                increment_width,
                increment_height,
                max_width,
                max_height,
                min_width,
                min_height,
                min_aspect,
                max_aspect,
            })
        }
    }

    #[derive(Debug, Clone, Copy)]
    struct Candidate(Rect);

    impl Arbitrary for Candidate {
        fn arbitrary(g: &mut Gen) -> Self {
            Self(Rect::new(
                bounded(g, 4000) - 2000,
                bounded(g, 4000) - 2000,
                bounded(g, 3000),
                bounded(g, 3000),
            ))
        }
    }

    #[quickcheck]
    fn resolving_is_idempotent(
        hints: GridHints,
        proposed: Candidate,
        current: Candidate,
        interactive: bool,
        respect_hints: bool,
    ) -> bool {
        let current = Rect {
            w: current.0.w.max(1),
            h: current.0.h.max(1),
            ..current.0
        };
        let bounds = bounds(respect_hints);

        let (once, _) = resolve(current, 2, &hints.0, proposed.0, interactive, &bounds);
        let (twice, _) = resolve(current, 2, &hints.0, once, interactive, &bounds);

        once == twice
    }

    #[test]
    fn square_aspect_clamps_wide_rect() {
        let hints = SizeHints {
            min_aspect: 1.0,
            max_aspect: 1.0,
            ..Default::default()
        };
        let current = Rect::new(100, 100, 10, 10);

        let (resolved, changed) = resolve(
            current,
            0,
            &hints,
            Rect::new(100, 100, 200, 50),
            false,
            &bounds(true),
        );

        assert!(changed);
        assert_eq!(resolved.w, resolved.h);
        assert_eq!(resolved, Rect::new(100, 100, 50, 50));
    }

    #[test]
    fn aspect_and_increments_settle_on_one_size() {
        let hints = SizeHints {
            increment_width: 3,
            increment_height: 3,
            min_aspect: 0.5,
            max_aspect: 2.0,
            ..Default::default()
        };
        let current = Rect::new(100, 100, 10, 10);
        let bounds = bounds(true);

        let proposed = Rect::new(100, 100, 141, 71);

        let (once, _) = resolve(current, 0, &hints, proposed, false, &bounds);
        let (twice, _) = resolve(current, 0, &hints, once, false, &bounds);

        assert_eq!((once.w, once.h), (138, 69));
        assert_eq!(once, twice);
    }

    #[test]
    fn zeroed_hints_are_unconstrained() {
        let (width, height) = SizeHints::default().constrain(333, 222);

        assert_eq!((width, height), (333, 222));
    }

    #[test_case(505, 300, (500, 300); "snaps down to increment")]
    #[test_case(30, 30, (100, 50); "raised to minimum")]
    #[test_case(2000, 2000, (810, 610); "capped at maximum")]
    #[test]
    fn increments_and_limits(width: i32, height: i32, expected: (i32, i32)) {
        let hints = SizeHints {
            base_width: 10,
            base_height: 10,
            increment_width: 10,
            increment_height: 10,
            min_width: 100,
            min_height: 50,
            max_width: 810,
            max_height: 610,
            ..Default::default()
        };

        assert_eq!(hints.constrain(width, height), expected);
    }

    #[test]
    fn hints_ignored_when_not_respected() {
        let hints = SizeHints {
            increment_width: 100,
            increment_height: 100,
            ..Default::default()
        };
        let current = Rect::new(0, 23, 10, 10);
        let proposed = Rect::new(0, 23, 555, 444);

        let (resolved, _) = resolve(current, 0, &hints, proposed, false, &bounds(false));

        assert_eq!(resolved, proposed);
    }

    #[test]
    fn never_smaller_than_bar_height() {
        let current = Rect::new(0, 23, 10, 10);
        let (resolved, _) = resolve(
            current,
            0,
            &SizeHints::default(),
            Rect::new(0, 23, 0, 5),
            false,
            &bounds(true),
        );

        assert_eq!((resolved.w, resolved.h), (23, 23));
    }

    #[test_case(Rect::new(5000, 30, 100, 100), Rect::new(1280 - 54, 30, 100, 100); "past the right edge")]
    #[test_case(Rect::new(-500, 30, 100, 100), Rect::new(0, 30, 100, 100); "fully left of the area")]
    #[test_case(Rect::new(10, -400, 100, 100), Rect::new(10, 23, 100, 100); "above the work area")]
    #[test]
    fn non_interactive_clamps_to_work_area(proposed: Rect, expected: Rect) {
        let current = Rect::new(0, 23, 50, 50);
        let (resolved, _) = resolve(
            current,
            2,
            &SizeHints::default(),
            proposed,
            false,
            &bounds(true),
        );

        assert_eq!(resolved, expected);
    }

    #[test]
    fn interactive_moves_may_leave_the_work_area() {
        let current = Rect::new(0, 23, 50, 50);
        let proposed = Rect::new(-40, 0, 100, 100);

        let (resolved, _) = resolve(
            current,
            2,
            &SizeHints::default(),
            proposed,
            true,
            &bounds(true),
        );

        assert_eq!(resolved, proposed);
    }

    #[test]
    fn raw_hints_fall_back_between_base_and_min() {
        let mut raw = vec![0u32; 18];
        raw[offset::FLAGS] = flags::P_MIN_SIZE | flags::P_MAX_SIZE;
        raw[offset::MIN_WIDTH] = 200;
        raw[offset::MIN_HEIGHT] = 100;
        raw[offset::MAX_WIDTH] = 200;
        raw[offset::MAX_HEIGHT] = 100;

        let hints = SizeHints::from_raw(&raw);

        assert_eq!((hints.base_width, hints.base_height), (200, 100));
        assert!(hints.is_fixed());
    }

    #[test]
    fn raw_aspect_is_converted_to_ratios() {
        let mut raw = vec![0u32; 18];
        raw[offset::FLAGS] = flags::P_ASPECT;
        raw[offset::MIN_ASPECT_X] = 4;
        raw[offset::MIN_ASPECT_Y] = 3;
        raw[offset::MAX_ASPECT_X] = 16;
        raw[offset::MAX_ASPECT_Y] = 9;

        let hints = SizeHints::from_raw(&raw);

        assert_eq!(hints.min_aspect, 0.75);
        assert!((hints.max_aspect - 16.0 / 9.0).abs() < f32::EPSILON);
    }
}
