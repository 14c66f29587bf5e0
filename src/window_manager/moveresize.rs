//! Keyboard driven moving and resizing of floating clients.
use super::WindowManager;
use crate::client::ClientKey;
use crate::errors::WmResult;
use crate::geometry::Rect;
use crate::x::{ClientConfig, XConn};
use tracing::debug;

/// One component of a move/resize request: lower case suffixes are deltas, upper case
/// ones absolute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Amount {
    Relative(i32),
    Absolute(i32),
}

impl Amount {
    fn value(&self) -> i32 {
        match self {
            Self::Relative(v) | Self::Absolute(v) => *v,
        }
    }
}

/// A parsed request such as `"0x 25y 0w 0h"` or `"20X 20Y 800W 600H"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MoveResizeRequest {
    pub x: Amount,
    pub y: Amount,
    pub w: Amount,
    pub h: Amount,
}

impl MoveResizeRequest {
    pub(crate) fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split_whitespace();
        let mut next = |lower: char| -> Option<Amount> {
            let part = parts.next()?;
            let suffix = part.chars().last()?;
            let value = part[..part.len() - suffix.len_utf8()].parse().ok()?;
            if suffix == lower.to_ascii_uppercase() {
                Some(Amount::Absolute(value))
            } else {
                Some(Amount::Relative(value))
            }
        };

        Some(Self {
            x: next('x')?,
            y: next('y')?,
            w: next('w')?,
            h: next('h')?,
        })
    }

    fn keeps_position(&self) -> bool {
        self.x.value() == 0 && self.y.value() == 0
    }
}

impl<X: XConn> WindowManager<X> {
    /// Float the selection under an arranging layout so it can be moved.
    fn floating_selection(&mut self) -> WmResult<Option<ClientKey>> {
        let Some(key) = self.selected() else {
            return Ok(None);
        };
        let arranges = self.monitors[self.selected_monitor].layout().arranges();
        if arranges && !self.clients[key].is_floating {
            self.toggle_floating(false)?;
        }
        Ok(Some(key))
    }

    pub(crate) fn move_resize(&mut self, request: &str) -> WmResult<()> {
        let Some(key) = self.floating_selection()? else {
            return Ok(());
        };
        let Some(parsed) = MoveResizeRequest::parse(request) else {
            debug!(request, "unparsable move/resize request");
            return Ok(());
        };
        self.apply_move_resize(key, parsed)
    }

    /// Grow the selection by `step` pixels of height and its aspect-kept share of width.
    pub(crate) fn aspect_resize(&mut self, step: i32) -> WmResult<()> {
        let Some(key) = self.selected() else {
            return Ok(());
        };
        let client = &self.clients[key];
        if client.height == 0 {
            return Ok(());
        }
        let request = MoveResizeRequest {
            x: Amount::Relative(0),
            y: Amount::Relative(0),
            w: Amount::Relative(step * client.width / client.height),
            h: Amount::Relative(step),
        };
        if self.floating_selection()?.is_none() {
            return Ok(());
        }
        self.apply_move_resize(key, request)
    }

    fn apply_move_resize(&mut self, key: ClientKey, request: MoveResizeRequest) -> WmResult<()> {
        let screen = self.monitors[self.selected_monitor].screen;
        let (right_edge, bottom_edge) = (screen.x + screen.w, screen.y + screen.h);
        let client = &self.clients[key];
        let border = client.border_width;
        let old = client.geometry();

        let w = match request.w {
            Amount::Absolute(w) => w.min(screen.w - 2 * border),
            Amount::Relative(d) => old.w + d,
        };
        let h = match request.h {
            Amount::Absolute(h) => h.min(screen.h - 2 * border),
            Amount::Relative(d) => old.h + d,
        };
        let mut x = match request.x {
            Amount::Absolute(x) if x < screen.x => screen.x,
            Amount::Absolute(x) if x > right_edge => right_edge - w - 2 * border,
            Amount::Absolute(x) => x,
            Amount::Relative(d) => old.x + d,
        };
        let mut y = match request.y {
            Amount::Absolute(y) if y < screen.y => screen.y,
            Amount::Absolute(y) if y > bottom_edge => bottom_edge - h - 2 * border,
            Amount::Absolute(y) => y,
            Amount::Relative(d) => old.y + d,
        };

        // resizing in place keeps a window that touches the right or bottom edge there
        let (mut snap_right, mut snap_bottom) = (false, false);
        if request.keeps_position() {
            let outer_right = old.x + old.w + 2 * border;
            snap_right = outer_right == right_edge;
            if snap_right || (outer_right <= right_edge && x + w + 2 * border > right_edge) {
                x = right_edge - w - 2 * border;
                snap_right = true;
                if x < screen.x && old.x >= screen.x {
                    x = screen.x;
                    snap_right = false;
                }
            }

            let outer_bottom = old.y + old.h + 2 * border;
            snap_bottom = outer_bottom == bottom_edge;
            if snap_bottom || (outer_bottom <= bottom_edge && y + h + 2 * border > bottom_edge) {
                y = bottom_edge - h - 2 * border;
                snap_bottom = true;
                if y < screen.y && old.y >= screen.y {
                    y = screen.y;
                    snap_bottom = false;
                }
            }
        }

        self.conn.configure(client.window, &[ClientConfig::StackTop])?;
        let pointer = self.conn.query_pointer()?;
        self.resize(key, Rect::new(x, y, w, h), true)?;

        if request.keeps_position() {
            // size hints may have shrunk the window away from the edge
            if snap_right {
                self.pin_to_right(key, right_edge)?;
            }
            if snap_bottom {
                let client = &self.clients[key];
                if client.y_position + client.height + 2 * border != bottom_edge {
                    let y = bottom_edge - client.height - 2 * border;
                    let rect = Rect::new(client.x_position, y, client.width, client.height);
                    self.resize(key, rect, true)?;
                }
            }
            if snap_right {
                self.pin_to_right(key, right_edge)?;
            }
        }

        // carry the pointer along so sloppy focus stays on the window
        if let Some((px, py)) = pointer
            && old.x <= px
            && old.x + old.w + 2 * border > px
            && old.y <= py
            && old.y + old.h + 2 * border > py
        {
            let client = &self.clients[key];
            let mut dx = client.x_position - old.x;
            let mut dy = client.y_position - old.y;
            let room_x = client.x_position + client.width + 2 * border - 25 - (px + dx);
            if room_x < 0 {
                dx = if snap_right { 0 } else { room_x.max(client.width - old.w) };
            }
            let room_y = client.y_position + client.height + 2 * border - 25 - (py + dy);
            if room_y < 0 {
                dy = if snap_bottom { 0 } else { room_y.max(client.height - old.h) };
            }
            self.conn.warp_pointer(self.conn.root(), px + dx, py + dy)?;
        }
        Ok(())
    }

    fn pin_to_right(&mut self, key: ClientKey, right_edge: i32) -> WmResult<()> {
        let client = &self.clients[key];
        let outer = client.width + 2 * client.border_width;
        if client.x_position + outer == right_edge {
            return Ok(());
        }
        let rect = Rect::new(right_edge - outer, client.y_position, client.width, client.height);
        self.resize(key, rect, true)
    }

    /// Move the selection against a screen edge (`t`, `b`, `l`, `r`) or stretch it to one
    /// (`T`, `B`, `L`, `R`). Stretching again towards the same edge restores the old size.
    pub(crate) fn move_resize_edge(&mut self, edge: &str) -> WmResult<()> {
        let Some(key) = self.floating_selection()? else {
            return Ok(());
        };
        let Some(edge) = edge.chars().next() else {
            return Ok(());
        };

        let monitor = &self.monitors[self.selected_monitor];
        let screen = monitor.screen;
        let bar = self.config.bar_height;
        let top = screen.y + if monitor.show_bar && monitor.top_bar { bar } else { 0 };
        let bottom_pad = if monitor.show_bar && !monitor.top_bar { bar } else { 0 };
        let (right_edge, bottom_edge) = (screen.x + screen.w, screen.y + screen.h);

        let client = &self.clients[key];
        let border = client.border_width;
        let old = client.geometry();
        let previous = client.old_geometry();
        let mut rect = old;

        match edge {
            't' => rect.y = top,
            'b' if old.h > screen.h - 2 * border => rect.y = top,
            'b' => rect.y = bottom_edge - old.h - 2 * border - bottom_pad,
            'l' => rect.x = screen.x,
            'r' if old.w > screen.w - 2 * border => rect.x = screen.x,
            'r' => rect.x = right_edge - old.w - 2 * border,
            'T' if old.h + top == previous.h + previous.y => {
                rect.h = previous.h;
                rect.y = previous.y;
            }
            'T' => {
                rect.h = old.h + old.y - top;
                rect.y = top;
            }
            'B' if old.y + old.h + 2 * border + bottom_pad == bottom_edge => rect.h = previous.h,
            'B' => rect.h = bottom_edge - old.y - 2 * border - bottom_pad,
            'L' if screen.x + old.w == previous.w + previous.x => {
                rect.w = previous.w;
                rect.x = previous.x;
            }
            'L' => {
                rect.w = old.w + old.x - screen.x;
                rect.x = screen.x;
            }
            'R' if old.x + old.w + 2 * border == right_edge => rect.w = previous.w,
            'R' => rect.w = right_edge - old.x - 2 * border,
            _ => {
                debug!(%edge, "unknown edge");
                return Ok(());
            }
        }

        self.conn.configure(client.window, &[ClientConfig::StackTop])?;
        let pointer = self.conn.query_pointer()?;
        self.resize(key, rect, true)?;

        if let Some((px, py)) = pointer
            && old.x <= px
            && old.x + old.w >= px
            && old.y <= py
            && old.y + old.h >= py
        {
            let client = &self.clients[key];
            let dx = client.x_position - old.x + client.width - old.w;
            let dy = client.y_position - old.y + client.height - old.h;
            if px + dx > client.x_position && py + dy > client.y_position {
                self.conn.warp_pointer(self.conn.root(), px + dx, py + dy)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window_manager::test_support::*;
    use simple_test_case::test_case;

    fn floating_at(wm: &mut TestWm, window: u32, rect: Rect) -> ClientKey {
        let key = map(wm, window);
        wm.clients[key].is_floating = true;
        wm.resize(key, rect, false).unwrap();
        key
    }

    #[test_case("0x 25y 0w 0h", Some((Amount::Relative(0), Amount::Relative(25), Amount::Relative(0), Amount::Relative(0))); "relative")]
    #[test_case("20X -5Y 800W 600H", Some((Amount::Absolute(20), Amount::Absolute(-5), Amount::Absolute(800), Amount::Absolute(600))); "absolute")]
    #[test_case("0x 25y 0w", None; "too short")]
    #[test_case("ax 0y 0w 0h", None; "not a number")]
    #[test]
    fn parse(text: &str, expected: Option<(Amount, Amount, Amount, Amount)>) {
        let parsed = MoveResizeRequest::parse(text).map(|s| (s.x, s.y, s.w, s.h));
        assert_eq!(parsed, expected);
    }

    #[test_case("10x -20y 0w 0h", Rect::new(110, 80, 300, 200); "relative move")]
    #[test_case("0x 0y 40w -50h", Rect::new(100, 100, 340, 150); "relative resize")]
    #[test_case("0X 0Y 2000W 600H", Rect::new(0, 0, 1280, 600); "absolute clamps to the screen")]
    #[test_case("5000X 0y 0w 0h", Rect::new(980, 100, 300, 200); "past the right edge")]
    #[test]
    fn move_resize_requests(request: &str, expected: Rect) {
        let mut wm = plain_wm();
        let a = floating_at(&mut wm, 10, Rect::new(100, 100, 300, 200));

        wm.move_resize(request).unwrap();

        assert_eq!(wm.clients[a].geometry(), expected);
    }

    #[test]
    fn growing_against_the_right_edge_stays_there() {
        let mut wm = plain_wm();
        let a = floating_at(&mut wm, 10, Rect::new(980, 100, 300, 200));

        wm.move_resize("0x 0y 100w 0h").unwrap();

        assert_eq!(wm.clients[a].geometry(), Rect::new(880, 100, 400, 200));
    }

    #[test]
    fn tiled_selections_are_floated_first() {
        let mut wm = plain_wm();
        let a = map(&mut wm, 10);
        map(&mut wm, 11);
        wm.focus(Some(a)).unwrap();

        wm.move_resize("0x 10y 0w 0h").unwrap();

        assert!(wm.clients[a].is_floating);
        assert_eq!(wm.clients[a].y_position, 10);
    }

    #[test]
    fn the_pointer_moves_with_the_window() {
        let mut wm = plain_wm();
        floating_at(&mut wm, 10, Rect::new(100, 100, 300, 200));
        wm.conn().set_pointer(150, 150);

        wm.move_resize("50x 0y 0w 0h").unwrap();

        assert_eq!(wm.conn().warps(), vec![(0, 200, 150)]);
    }

    #[test]
    fn aspect_resize_keeps_the_ratio() {
        let mut wm = plain_wm();
        let a = floating_at(&mut wm, 10, Rect::new(100, 100, 300, 200));

        wm.aspect_resize(30).unwrap();

        assert_eq!(wm.clients[a].geometry(), Rect::new(100, 100, 345, 230));
    }

    #[test_case("l", Rect::new(0, 100, 300, 200); "left")]
    #[test_case("r", Rect::new(980, 100, 300, 200); "right")]
    #[test_case("t", Rect::new(100, 0, 300, 200); "top")]
    #[test_case("b", Rect::new(100, 600, 300, 200); "bottom")]
    #[test_case("B", Rect::new(100, 100, 300, 700); "stretch down")]
    #[test_case("L", Rect::new(0, 100, 400, 200); "stretch left")]
    #[test_case("q", Rect::new(100, 100, 300, 200); "unknown edge")]
    #[test]
    fn edges(edge: &str, expected: Rect) {
        let mut wm = plain_wm();
        let a = floating_at(&mut wm, 10, Rect::new(100, 100, 300, 200));

        wm.move_resize_edge(edge).unwrap();

        assert_eq!(wm.clients[a].geometry(), expected);
    }

    #[test_case("R"; "right")]
    #[test_case("T"; "top")]
    #[test]
    fn stretching_twice_restores_the_size(edge: &str) {
        let mut wm = plain_wm();
        let a = floating_at(&mut wm, 10, Rect::new(100, 100, 300, 200));

        wm.move_resize_edge(edge).unwrap();
        assert_ne!(wm.clients[a].geometry(), Rect::new(100, 100, 300, 200));

        wm.move_resize_edge(edge).unwrap();
        assert_eq!(wm.clients[a].geometry(), Rect::new(100, 100, 300, 200));
    }

    #[test]
    fn bottom_edge_respects_a_bottom_bar() {
        let mut wm = wm_with(|config| {
            config.show_bar = true;
            config.top_bar = false;
        });
        let a = floating_at(&mut wm, 10, Rect::new(100, 100, 300, 200));

        wm.move_resize_edge("b").unwrap();

        assert_eq!(wm.clients[a].y_position, 800 - 200 - 23);
    }
}
