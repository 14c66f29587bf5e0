use super::{GapConfig, Layout, LayoutContext};
use crate::geometry::Rect;

/// Each client takes half of what is left, turning clockwise into the center.
pub struct SpiralLayout;

/// Each client takes half of what is left, always moving right and down.
pub struct DwindleLayout;

impl Layout for SpiralLayout {
    fn name(&self) -> &'static str {
        "spiral"
    }

    fn symbol(&self) -> &'static str {
        "[@]"
    }

    fn arrange(&self, context: &LayoutContext, factors: &[f32]) -> Vec<Rect> {
        fibonacci(context, factors.len(), false)
    }
}

impl Layout for DwindleLayout {
    fn name(&self) -> &'static str {
        "dwindle"
    }

    fn symbol(&self) -> &'static str {
        "[\\]"
    }

    fn arrange(&self, context: &LayoutContext, factors: &[f32]) -> Vec<Rect> {
        fibonacci(context, factors.len(), true)
    }
}

fn fibonacci(context: &LayoutContext, window_count: usize, dwindle: bool) -> Vec<Rect> {
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
    let last = window_count - 1;
    // once a half would be smaller than this, the remaining clients share one rect
    let min_extent = context.bar_height + 2 * context.border_width;

    let mut x = area.x + outer_vertical;
    let mut y = area.y + outer_horizontal;
    let mut width = area.w - 2 * outer_vertical;
    let mut height = area.h - 2 * outer_horizontal;
    let mut height_rest = 0;
    let mut width_rest = 0;
    let mut splitting = true;
    let mut step = 0;

    let mut geometries = Vec::with_capacity(window_count);
    for _ in 0..window_count {
        if splitting {
            let odd = step % 2 == 1;
            if (odd && (height - inner_horizontal) / 2 <= min_extent)
                || (!odd && (width - inner_vertical) / 2 <= min_extent)
            {
                splitting = false;
            }

            if splitting && step < last {
                if odd {
                    let half = (height - inner_horizontal) / 2;
                    height_rest = height - 2 * half - inner_horizontal;
                    height = half;
                } else {
                    let half = (width - inner_vertical) / 2;
                    width_rest = width - 2 * half - inner_vertical;
                    width = half;
                }

                if step % 4 == 2 && !dwindle {
                    x += width + inner_vertical;
                } else if step % 4 == 3 && !dwindle {
                    y += height + inner_horizontal;
                }
            }

            match step % 4 {
                0 if dwindle => {
                    y += height + inner_horizontal;
                    height += height_rest;
                }
                0 => {
                    height -= height_rest;
                    y -= height + inner_horizontal;
                }
                1 => {
                    x += width + inner_vertical;
                    width += width_rest;
                }
                2 => {
                    y += height + inner_horizontal;
                    height += height_rest;
                    if step < last {
                        width += width_rest;
                    }
                }
                _ if dwindle => {
                    x += width + inner_vertical;
                    width -= width_rest;
                }
                _ => {
                    width -= width_rest;
                    x -= width + inner_vertical;
                    height += height_rest;
                }
            }

            if step == 0 {
                if window_count != 1 {
                    let usable = (area.w - inner_vertical - 2 * outer_vertical) as f32;
                    width = (usable - usable * (1.0 - context.master_factor)) as i32;
                    width_rest = 0;
                }
                y = area.y + outer_horizontal;
            } else if step == 1 {
                width = area.w - width - inner_vertical - 2 * outer_vertical;
            }
            step += 1;
        }

        geometries.push(Rect::new(x, y, width, height));
    }

    geometries
}
