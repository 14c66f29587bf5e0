use super::{Layout, LayoutContext};
use crate::geometry::Rect;

/// No arrangement at all; clients keep their own geometry.
pub struct FloatingLayout;

impl Layout for FloatingLayout {
    fn name(&self) -> &'static str {
        "float"
    }

    fn symbol(&self) -> &'static str {
        "><>"
    }

    fn arrange(&self, _context: &LayoutContext, _factors: &[f32]) -> Vec<Rect> {
        Vec::new()
    }
}
