use super::{
    GapConfig, Layout, LayoutContext, extra_pixel, portion, region_facts, split_factors,
};
use crate::geometry::Rect;

/// Masters as in tile, every stack client stacked on one shared rect.
pub struct DeckLayout;

impl Layout for DeckLayout {
    fn name(&self) -> &'static str {
        "deck"
    }

    fn symbol(&self) -> &'static str {
        "[D]"
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

        let master_x = area.x + outer_vertical;
        let mut master_y = area.y + outer_horizontal;
        let mut master_width = area.w - 2 * outer_vertical;
        let master_height =
            area.h - 2 * outer_horizontal - inner_horizontal * (master_count - 1).max(0);

        let mut stack_x = master_x;
        let stack_y = master_y;
        let mut stack_width = master_width;
        let stack_height = area.h - 2 * outer_horizontal;

        if num_master > 0 && window_count > num_master {
            stack_width =
                ((master_width - inner_vertical) as f32 * (1.0 - context.master_factor)) as i32;
            master_width = master_width - inner_vertical - stack_width;
            stack_x = master_x + master_width + inner_vertical;
        }

        let (master_factors, stack_factors) = split_factors(factors, num_master);
        let (master_total, master_rest) = region_facts(master_factors, master_height);

        let mut geometries = Vec::with_capacity(window_count);

        for (index, factor) in master_factors.iter().enumerate() {
            let height =
                portion(master_height, *factor, master_total) + extra_pixel(index, master_rest);
            geometries.push(Rect::new(master_x, master_y, master_width, height));
            master_y += height + inner_horizontal;
        }

        let card = Rect::new(stack_x, stack_y, stack_width, stack_height);
        geometries.extend(stack_factors.iter().map(|_| card));

        geometries
    }
}
