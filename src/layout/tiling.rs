use super::{
    GapConfig, Layout, LayoutContext, extra_pixel, portion, region_facts, split_factors,
};
use crate::geometry::Rect;

pub struct TileLayout;

impl Layout for TileLayout {
    fn name(&self) -> &'static str {
        "tile"
    }

    fn symbol(&self) -> &'static str {
        "[]="
    }

    fn arrange(&self, context: &LayoutContext, factors: &[f32]) -> Vec<Rect> {
        let window_count = factors.len();
        if window_count == 0 {
            return Vec::new();
        }

        let GapConfig {
            inner_horizontal,
            inner_vertical,
            outer_horizontal,
            outer_vertical,
        } = context.gaps;
        let area = context.area;
        let num_master = context.num_master;
        let master_count = window_count.min(num_master) as i32;
        let stack_count = window_count as i32 - master_count;

        let master_x = area.x + outer_vertical;
        let mut master_y = area.y + outer_horizontal;
        let mut master_width = area.w - 2 * outer_vertical;
        let master_height =
            area.h - 2 * outer_horizontal - inner_horizontal * (master_count - 1).max(0);

        let mut stack_x = master_x;
        let mut stack_y = master_y;
        let mut stack_width = master_width;
        let stack_height =
            area.h - 2 * outer_horizontal - inner_horizontal * (stack_count - 1).max(0);

        if num_master > 0 && window_count > num_master {
            stack_width =
                ((master_width - inner_vertical) as f32 * (1.0 - context.master_factor)) as i32;
            master_width = master_width - inner_vertical - stack_width;
            stack_x = master_x + master_width + inner_vertical;
        }

        let (master_factors, stack_factors) = split_factors(factors, num_master);
        let (master_total, master_rest) = region_facts(master_factors, master_height);
        let (stack_total, stack_rest) = region_facts(stack_factors, stack_height);

        let mut geometries = Vec::with_capacity(window_count);

        for (index, factor) in master_factors.iter().enumerate() {
            let height =
                portion(master_height, *factor, master_total) + extra_pixel(index, master_rest);
            geometries.push(Rect::new(master_x, master_y, master_width, height));
            master_y += height + inner_horizontal;
        }

        for (index, factor) in stack_factors.iter().enumerate() {
            let height =
                portion(stack_height, *factor, stack_total) + extra_pixel(index, stack_rest);
            geometries.push(Rect::new(stack_x, stack_y, stack_width, height));
            stack_y += height + inner_horizontal;
        }

        geometries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::test_support::{context, ones};

    #[test]
    fn two_clients_split_the_screen() {
        let ctx = context(1280, 800, 1, 0.5);
        let rects = TileLayout.arrange(&ctx, &ones(2));

        assert_eq!(
            rects,
            vec![Rect::new(0, 0, 640, 800), Rect::new(640, 0, 640, 800)]
        );
    }

    #[test]
    fn fewer_clients_than_masters_use_the_full_width() {
        let ctx = context(1280, 800, 3, 0.55);
        let rects = TileLayout.arrange(&ctx, &ones(2));

        assert_eq!(rects.len(), 2);
        assert!(rects.iter().all(|r| r.x == 0 && r.w == 1280));
        assert_eq!(rects.iter().map(|r| r.h).sum::<i32>(), 800);
        assert_eq!(rects[1].y, rects[0].y + rects[0].h);
    }

    #[test]
    fn client_factors_weight_the_master_column() {
        let ctx = context(1280, 400, 3, 0.55);
        let rects = TileLayout.arrange(&ctx, &[1.0, 1.0, 2.0]);
        let heights: Vec<i32> = rects.iter().map(|r| r.h).collect();

        assert_eq!(heights, vec![100, 100, 200]);
    }

    #[test]
    fn no_masters_means_a_single_stack_column() {
        let ctx = context(1200, 900, 0, 0.55);
        let rects = TileLayout.arrange(&ctx, &ones(3));

        assert!(rects.iter().all(|r| r.x == 0 && r.w == 1200 && r.h == 300));
    }

    #[test]
    fn gaps_surround_and_separate_clients() {
        let mut ctx = context(1000, 600, 1, 0.5);
        ctx.gaps = GapConfig {
            inner_horizontal: 4,
            inner_vertical: 10,
            outer_horizontal: 5,
            outer_vertical: 20,
        };
        let rects = TileLayout.arrange(&ctx, &ones(3));

        assert_eq!(rects[0], Rect::new(20, 5, 475, 590));
        assert_eq!(rects[1], Rect::new(505, 5, 475, 293));
        assert_eq!(rects[2], Rect::new(505, 302, 475, 293));
    }
}
