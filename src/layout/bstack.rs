use super::{
    GapConfig, Layout, LayoutContext, extra_pixel, portion, region_facts, split_factors,
};
use crate::geometry::Rect;

/// Masters side by side on top, the stack side by side below.
pub struct BottomStackLayout;

/// Masters side by side on top, the stack as full-width rows below.
pub struct BottomStackHorizontalLayout;

impl Layout for BottomStackLayout {
    fn name(&self) -> &'static str {
        "bstack"
    }

    fn symbol(&self) -> &'static str {
        "TTT"
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

        let mut master_x = area.x + outer_vertical;
        let master_y = area.y + outer_horizontal;
        let mut master_height = area.h - 2 * outer_horizontal;
        let master_width =
            area.w - 2 * outer_vertical - inner_vertical * (master_count - 1).max(0);

        let mut stack_x = master_x;
        let mut stack_y = master_y;
        let mut stack_height = master_height;
        let stack_width = area.w - 2 * outer_vertical - inner_vertical * (stack_count - 1).max(0);

        if num_master > 0 && window_count > num_master {
            stack_height =
                ((master_height - inner_horizontal) as f32 * (1.0 - context.master_factor)) as i32;
            master_height = master_height - inner_horizontal - stack_height;
            stack_y = master_y + master_height + inner_horizontal;
        }

        let (master_factors, stack_factors) = split_factors(factors, num_master);
        let (master_total, master_rest) = region_facts(master_factors, master_width);
        let (stack_total, stack_rest) = region_facts(stack_factors, stack_width);

        let mut geometries = Vec::with_capacity(window_count);

        for (index, factor) in master_factors.iter().enumerate() {
            let width =
                portion(master_width, *factor, master_total) + extra_pixel(index, master_rest);
            geometries.push(Rect::new(master_x, master_y, width, master_height));
            master_x += width + inner_vertical;
        }

        for (index, factor) in stack_factors.iter().enumerate() {
            let width = portion(stack_width, *factor, stack_total) + extra_pixel(index, stack_rest);
            geometries.push(Rect::new(stack_x, stack_y, width, stack_height));
            stack_x += width + inner_vertical;
        }

        geometries
    }
}

impl Layout for BottomStackHorizontalLayout {
    fn name(&self) -> &'static str {
        "bstackhoriz"
    }

    fn symbol(&self) -> &'static str {
        "==="
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

        let mut master_x = area.x + outer_vertical;
        let master_y = area.y + outer_horizontal;
        let mut master_height = area.h - 2 * outer_horizontal;
        let master_width =
            area.w - 2 * outer_vertical - inner_vertical * (master_count - 1).max(0);

        let stack_x = master_x;
        let mut stack_y = master_y;
        let mut stack_height =
            area.h - 2 * outer_horizontal - inner_horizontal * (stack_count - 1).max(0);
        let stack_width = area.w - 2 * outer_vertical;

        if num_master > 0 && window_count > num_master {
            let stack_region =
                ((master_height - inner_horizontal) as f32 * (1.0 - context.master_factor)) as i32;
            master_height = master_height - inner_horizontal - stack_region;
            stack_y = master_y + master_height + inner_horizontal;
            stack_height = area.h - master_height - 2 * outer_horizontal - inner_horizontal * stack_count;
        }

        let (master_factors, stack_factors) = split_factors(factors, num_master);
        let (master_total, master_rest) = region_facts(master_factors, master_width);
        let (stack_total, stack_rest) = region_facts(stack_factors, stack_height);

        let mut geometries = Vec::with_capacity(window_count);

        for (index, factor) in master_factors.iter().enumerate() {
            let width =
                portion(master_width, *factor, master_total) + extra_pixel(index, master_rest);
            geometries.push(Rect::new(master_x, master_y, width, master_height));
            master_x += width + inner_vertical;
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
