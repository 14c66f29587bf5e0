use super::{GapConfig, Layout, LayoutContext, extra_pixel, portion, region_facts, split_factors};
use crate::geometry::Rect;

/// Masters in a center column, stack clients alternating between the right and left
/// columns.
pub struct CenteredMasterLayout;

/// Masters float centered over a horizontal row of stack clients.
pub struct CenteredFloatingMasterLayout;

/// Vertical column of clients sized by their factors.
fn column(x: i32, mut y: i32, width: i32, height: i32, gap: i32, factors: &[f32]) -> Vec<Rect> {
    let (total, rest) = region_facts(factors, height);
    factors
        .iter()
        .enumerate()
        .map(|(index, factor)| {
            let cell = portion(height, *factor, total) + extra_pixel(index, rest);
            let rect = Rect::new(x, y, width, cell);
            y += cell + gap;
            rect
        })
        .collect()
}

/// Horizontal row of clients sized by their factors.
fn row(mut x: i32, y: i32, width: i32, height: i32, gap: i32, factors: &[f32]) -> Vec<Rect> {
    let (total, rest) = region_facts(factors, width);
    factors
        .iter()
        .enumerate()
        .map(|(index, factor)| {
            let cell = portion(width, *factor, total) + extra_pixel(index, rest);
            let rect = Rect::new(x, y, cell, height);
            x += cell + gap;
            rect
        })
        .collect()
}

impl Layout for CenteredMasterLayout {
    fn name(&self) -> &'static str {
        "centeredmaster"
    }

    fn symbol(&self) -> &'static str {
        "|M|"
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
        // without masters every client goes into the center column
        let master_count = if num_master == 0 {
            window_count
        } else {
            window_count.min(num_master)
        };
        let stack_count = window_count - master_count;
        let left_count = stack_count / 2;
        let right_count = stack_count - left_count;

        let mut master_x = area.x + outer_vertical;
        let master_y = area.y + outer_horizontal;
        let mut master_width = area.w - 2 * outer_vertical;
        let master_height =
            area.h - 2 * outer_horizontal - inner_horizontal * (master_count as i32 - 1);
        let side_height = |count: usize| {
            area.h - 2 * outer_horizontal - inner_horizontal * (count as i32 - 1).max(0)
        };

        let mut left_width = 0;
        let mut right_width = 0;
        let left_x = area.x + outer_vertical;
        let mut right_x = left_x;

        if num_master > 0 && window_count > num_master {
            if stack_count > 1 {
                master_width =
                    ((area.w - 2 * outer_vertical - 2 * inner_vertical) as f32 * context.master_factor) as i32;
                left_width = (area.w - master_width - 2 * outer_vertical - 2 * inner_vertical) / 2;
                right_width =
                    (area.w - master_width - 2 * outer_vertical - 2 * inner_vertical) - left_width;
                master_x += left_width + inner_vertical;
            } else {
                master_width = ((master_width - inner_vertical) as f32 * context.master_factor) as i32;
                right_width = area.w - master_width - inner_vertical - 2 * outer_vertical;
            }
            right_x = master_x + master_width + inner_vertical;
        }

        let (master_factors, stack_factors) = split_factors(factors, master_count);
        // stack client k goes right when k is even, left when odd
        let right_factors: Vec<f32> = stack_factors.iter().copied().step_by(2).collect();
        let left_factors: Vec<f32> = stack_factors.iter().copied().skip(1).step_by(2).collect();

        let masters = column(
            master_x,
            master_y,
            master_width,
            master_height,
            inner_horizontal,
            master_factors,
        );
        let mut right = column(
            right_x,
            master_y,
            right_width,
            side_height(right_count),
            inner_horizontal,
            &right_factors,
        )
        .into_iter();
        let mut left = column(
            left_x,
            master_y,
            left_width,
            side_height(left_count),
            inner_horizontal,
            &left_factors,
        )
        .into_iter();

        let mut geometries = masters;
        for index in 0..stack_count {
            let next = if index % 2 == 0 { right.next() } else { left.next() };
            geometries.extend(next);
        }

        geometries
    }
}

impl Layout for CenteredFloatingMasterLayout {
    fn name(&self) -> &'static str {
        "centeredfloatingmaster"
    }

    fn symbol(&self) -> &'static str {
        ">M>"
    }

    fn arrange(&self, context: &LayoutContext, factors: &[f32]) -> Vec<Rect> {
        let window_count = factors.len();
        if window_count == 0 {
            return Vec::new();
        }

        let GapConfig {
            inner_vertical,
            outer_horizontal,
            outer_vertical,
            ..
        } = context.gaps;
        let area = context.area;
        let num_master = context.num_master;
        let master_count = window_count.min(num_master) as i32;
        let stack_count = window_count as i32 - master_count;

        let mut master_x = area.x + outer_vertical;
        let mut master_y = area.y + outer_horizontal;
        let mut master_width =
            area.w - 2 * outer_vertical - inner_vertical * (window_count as i32 - 1);
        let mut master_height = area.h - 2 * outer_horizontal;
        let mut master_gap = inner_vertical;

        let stack_x = area.x + outer_vertical;
        let stack_y = area.y + outer_horizontal;
        let stack_width = area.w - 2 * outer_vertical - inner_vertical * (stack_count - 1).max(0);
        let stack_height = area.h - 2 * outer_horizontal;

        if num_master > 0 && window_count > num_master {
            // masters sit on top of the stack, so their gaps shrink a little
            let gap_factor = 0.8;
            master_gap = (inner_vertical as f32 * gap_factor) as i32;
            let master_gaps = inner_vertical as f32 * gap_factor * (master_count - 1) as f32;
            if area.w > area.h {
                master_width = (area.w as f32 * context.master_factor - master_gaps) as i32;
                master_height = (area.h as f32 * 0.9) as i32;
            } else {
                master_width = (area.w as f32 * 0.9 - master_gaps) as i32;
                master_height = (area.h as f32 * context.master_factor) as i32;
            }
            master_x = area.x + (area.w - master_width) / 2;
            master_y = area.y + (area.h - master_height - 2 * outer_horizontal) / 2;
        }

        let (master_factors, stack_factors) = split_factors(factors, num_master);
        let mut geometries = row(
            master_x,
            master_y,
            master_width,
            master_height,
            master_gap,
            master_factors,
        );
        geometries.extend(row(
            stack_x,
            stack_y,
            stack_width,
            stack_height,
            inner_vertical,
            stack_factors,
        ));

        geometries
    }
}
