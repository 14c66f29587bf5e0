use super::{GapConfig, Layout, LayoutContext, extra_pixel, portion, region_facts};
use crate::geometry::Rect;

/// Near-square grid filled column by column.
pub struct GridLayout;

/// Rows of clients: `nmaster + 1` rows, spread evenly.
pub struct NRowGridLayout;

/// One or two horizontal rows, the top row holding half the clients.
pub struct HorizontalGridLayout;

/// Columns of equal width with the later columns taking one extra row when the clients
/// do not divide evenly.
pub struct GaplessGridLayout;

/// Pixels left after dividing `total` into `parts` equal cells.
fn cell_size(total: i32, parts: i32) -> (i32, i32) {
    let parts = parts.max(1);
    let size = total / parts;
    (size, total - size * parts)
}

impl Layout for GridLayout {
    fn name(&self) -> &'static str {
        "grid"
    }

    fn symbol(&self) -> &'static str {
        "HHH"
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

        let mut rows = 0;
        while rows <= window_count / 2 && rows * rows < window_count {
            rows += 1;
        }
        let cols = if rows > 0 && (rows - 1) * rows >= window_count {
            rows - 1
        } else {
            rows
        };
        let (rows, cols) = (rows as i32, cols as i32);

        let (cell_height, height_rest) = cell_size(
            area.h - 2 * outer_horizontal - inner_horizontal * (rows - 1),
            rows,
        );
        let (cell_width, width_rest) =
            cell_size(area.w - 2 * outer_vertical - inner_vertical * (cols - 1), cols);

        (0..window_count as i32)
            .map(|index| {
                let column = index / rows;
                let row = index % rows;
                Rect::new(
                    area.x
                        + outer_vertical
                        + column * (cell_width + inner_vertical)
                        + column.min(width_rest),
                    area.y
                        + outer_horizontal
                        + row * (cell_height + inner_horizontal)
                        + row.min(height_rest),
                    cell_width + extra_pixel(column as usize, width_rest),
                    cell_height + extra_pixel(row as usize, height_rest),
                )
            })
            .collect()
    }
}

impl Layout for NRowGridLayout {
    fn name(&self) -> &'static str {
        "nrowgrid"
    }

    fn symbol(&self) -> &'static str {
        "###"
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

        let mut rows = context.num_master + 1;
        if context.force_vsplit && window_count == 2 {
            rows = 1;
        }
        let rows = rows.min(window_count);

        let mut cols = window_count / rows;
        let mut used_clients = cols;
        let mut y = area.y + outer_horizontal;
        let row_height =
            (area.h - 2 * outer_horizontal - inner_horizontal * (rows as i32 - 1)) / rows as i32;
        let mut used_height = row_height;
        let mut used_width = 0;
        let mut row = 0;
        let mut column = 0;

        let mut geometries = Vec::with_capacity(window_count);
        for _ in 0..window_count {
            if column == cols {
                used_width = 0;
                column = 0;
                row += 1;

                cols = (window_count - used_clients) / (rows - row);
                used_clients += cols;
                y = area.y + outer_horizontal + used_height + inner_horizontal;
                used_height += row_height + inner_horizontal;
            }

            let x = area.x + outer_vertical + used_width;
            let width = (area.w - 2 * outer_vertical - used_width) / (cols - column) as i32;
            used_width += width + inner_vertical;

            geometries.push(Rect::new(x, y, width, row_height));
            column += 1;
        }

        geometries
    }
}

impl Layout for HorizontalGridLayout {
    fn name(&self) -> &'static str {
        "horizgrid"
    }

    fn symbol(&self) -> &'static str {
        "---"
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

        let top_count = if window_count <= 2 {
            window_count
        } else {
            window_count / 2
        };
        let bottom_count = window_count - top_count;

        let mut top_x = area.x + outer_vertical;
        let top_y = area.y + outer_horizontal;
        let mut top_height = area.h - 2 * outer_horizontal;
        let top_width = area.w - 2 * outer_vertical - inner_vertical * (top_count as i32 - 1);

        let mut bottom_x = top_x;
        let mut bottom_y = top_y;
        let mut bottom_height = top_height;
        let bottom_width =
            area.w - 2 * outer_vertical - inner_vertical * (bottom_count as i32 - 1).max(0);

        if bottom_count > 0 {
            bottom_height = (top_height - inner_horizontal) / 2;
            top_height = top_height - inner_horizontal - bottom_height;
            bottom_y = top_y + top_height + inner_horizontal;
        }

        let (top_factors, bottom_factors) = factors.split_at(top_count);
        let (top_total, top_rest) = region_facts(top_factors, top_width);
        let (bottom_total, bottom_rest) = region_facts(bottom_factors, bottom_width);

        let mut geometries = Vec::with_capacity(window_count);

        for (index, factor) in top_factors.iter().enumerate() {
            let width = portion(top_width, *factor, top_total) + extra_pixel(index, top_rest);
            geometries.push(Rect::new(top_x, top_y, width, top_height));
            top_x += width + inner_vertical;
        }

        for (index, factor) in bottom_factors.iter().enumerate() {
            let width =
                portion(bottom_width, *factor, bottom_total) + extra_pixel(index, bottom_rest);
            geometries.push(Rect::new(bottom_x, bottom_y, width, bottom_height));
            bottom_x += width + inner_vertical;
        }

        geometries
    }
}

impl Layout for GaplessGridLayout {
    fn name(&self) -> &'static str {
        "gaplessgrid"
    }

    fn symbol(&self) -> &'static str {
        ":::"
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

        let mut cols = 0;
        while cols <= window_count / 2 && cols * cols < window_count {
            cols += 1;
        }
        if window_count == 5 {
            cols = 2;
        }
        let mut rows = window_count / cols;

        let usable_height = |rows: usize| area.h - 2 * outer_horizontal - inner_horizontal * (rows as i32 - 1);
        let (mut cell_height, mut height_rest) = cell_size(usable_height(rows), rows as i32);
        let (cell_width, width_rest) = cell_size(
            area.w - 2 * outer_vertical - inner_vertical * (cols as i32 - 1),
            cols as i32,
        );

        let mut x = area.x + outer_vertical;
        let y = area.y + outer_horizontal;
        let mut row = 0;
        let mut column = 0;

        let mut geometries = Vec::with_capacity(window_count);
        for index in 0..window_count {
            // the last `window_count % cols` columns hold one more row
            if index / rows + 1 > cols - window_count % cols {
                rows = window_count / cols + 1;
                (cell_height, height_rest) = cell_size(usable_height(rows), rows as i32);
            }

            let row_offset = row as i32;
            geometries.push(Rect::new(
                x,
                y + row_offset * (cell_height + inner_horizontal) + row_offset.min(height_rest),
                cell_width + extra_pixel(column, width_rest),
                cell_height + extra_pixel(row, height_rest),
            ));

            row += 1;
            if row >= rows {
                row = 0;
                x += cell_width + inner_vertical + extra_pixel(column, width_rest);
                column += 1;
            }
        }

        geometries
    }
}
