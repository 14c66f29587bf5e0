use super::{Layout, LayoutContext};
use crate::geometry::Rect;

pub struct MonocleLayout;

impl Layout for MonocleLayout {
    fn name(&self) -> &'static str {
        "monocle"
    }

    fn symbol(&self) -> &'static str {
        "[M]"
    }

    fn arrange(&self, context: &LayoutContext, factors: &[f32]) -> Vec<Rect> {
        vec![context.area; factors.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::GapConfig;
    use crate::layout::test_support::{context, ones};

    #[test]
    fn every_client_fills_the_work_area_without_gaps() {
        let mut ctx = context(1280, 800, 1, 0.55);
        ctx.gaps = GapConfig::uniform(12);
        let rects = MonocleLayout.arrange(&ctx, &ones(3));

        assert_eq!(rects, vec![Rect::new(0, 0, 1280, 800); 3]);
    }
}
