/// A window or screen rectangle in root coordinates.
///
/// Signed throughout: windows are parked at negative x while hidden and
/// intermediate layout maths can dip below zero before clamping.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }

    /// Area of the overlap between two rects, zero when disjoint.
    pub fn intersection_area(&self, other: &Rect) -> i32 {
        let overlap_width = (self.x + self.w).min(other.x + other.w) - self.x.max(other.x);
        let overlap_height = (self.y + self.h).min(other.y + other.h) - self.y.max(other.y);

        overlap_width.max(0) * overlap_height.max(0)
    }

    /// Position a rect of this size centred inside `outer`.
    pub fn centered_in(&self, outer: &Rect) -> Rect {
        Rect {
            x: outer.x + (outer.w - self.w) / 2,
            y: outer.y + (outer.h - self.h) / 2,
            ..*self
        }
    }

    pub fn shrink(&self, horizontal: i32, vertical: i32) -> Rect {
        Rect {
            x: self.x + horizontal,
            y: self.y + vertical,
            w: self.w - 2 * horizontal,
            h: self.h - 2 * vertical,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test_case(Rect::new(0, 0, 10, 10), Rect::new(5, 5, 10, 10), 25; "partial overlap")]
    #[test_case(Rect::new(0, 0, 10, 10), Rect::new(10, 0, 10, 10), 0; "touching edges")]
    #[test_case(Rect::new(0, 0, 10, 10), Rect::new(50, 50, 1, 1), 0; "disjoint")]
    #[test_case(Rect::new(0, 0, 100, 100), Rect::new(10, 10, 5, 5), 25; "contained")]
    #[test]
    fn intersection_area(a: Rect, b: Rect, expected: i32) {
        assert_eq!(a.intersection_area(&b), expected);
        assert_eq!(b.intersection_area(&a), expected);
    }

    #[test]
    fn centered_in_keeps_size() {
        let outer = Rect::new(100, 0, 1000, 800);
        let centered = Rect::new(0, 0, 200, 100).centered_in(&outer);

        assert_eq!(centered, Rect::new(500, 350, 200, 100));
    }

    #[test_case(0, 0, true; "top left corner")]
    #[test_case(99, 49, true; "bottom right inside")]
    #[test_case(100, 10, false; "right edge is exclusive")]
    #[test_case(-1, 10, false; "left of rect")]
    #[test]
    fn contains_point(x: i32, y: i32, expected: bool) {
        assert_eq!(Rect::new(0, 0, 100, 50).contains_point(x, y), expected);
    }
}
