//! Pointer drags: moving and resizing floating clients, and dragging the master and client
//! factors of tiled layouts.
use super::WindowManager;
use crate::client::{ClientKey, FakeFullscreen};
use crate::errors::WmResult;
use crate::geometry::Rect;
use crate::layout::LayoutType;
use crate::x::{CursorKind, XConn, XEvent};
use tracing::{debug, trace, warn};

/// Minimum milliseconds between handled motion events while moving or resizing.
const MOTION_INTERVAL: u32 = 1000 / 60;
const MASTER_FACTOR_INTERVAL: u32 = 1000 / 40;
const CLIENT_FACTOR_INTERVAL: u32 = 1000 / 60;

impl<X: XConn> WindowManager<X> {
    /// Run a grabbed drag until the button is released. Map and configure requests are
    /// served as they come, motion is throttled to one event per `interval` ms and
    /// anything else waits for the main loop. A failed drag gives the pointer back before
    /// the error is returned.
    fn drag_loop(
        &mut self,
        interval: u32,
        on_motion: impl FnMut(&mut Self, i32, i32) -> WmResult<()>,
    ) -> WmResult<()> {
        let result = self.drag_events(interval, on_motion);
        if result.is_err()
            && let Err(e) = self.end_drag()
        {
            warn!(error = %e, "failed to release the pointer after a broken drag");
        }
        result
    }

    fn drag_events(
        &mut self,
        interval: u32,
        mut on_motion: impl FnMut(&mut Self, i32, i32) -> WmResult<()>,
    ) -> WmResult<()> {
        let mut last_time = 0u32;
        loop {
            match self.conn.next_event()? {
                XEvent::ButtonRelease => return Ok(()),
                event @ (XEvent::MapRequest { .. }
                | XEvent::ConfigureRequest(_)
                | XEvent::Expose { .. }) => {
                    self.handle_event(event)?;
                }
                XEvent::MotionNotify {
                    root_x,
                    root_y,
                    time,
                    ..
                } => {
                    if time.wrapping_sub(last_time) <= interval {
                        continue;
                    }
                    last_time = time;
                    on_motion(self, root_x, root_y)?;
                }
                event => self.deferred.push_back(event),
            }
        }
    }

    fn end_drag(&self) -> WmResult<()> {
        self.conn.ungrab_pointer()?;
        self.conn.discard_enter_events()
    }

    /// The selection, unless it is fullscreen for real and so pinned to its monitor.
    fn draggable_selection(&self) -> Option<ClientKey> {
        let key = self.selected()?;
        let client = &self.clients[key];
        let pinned = client.is_fullscreen && client.fake_fullscreen != FakeFullscreen::On;
        (!pinned).then_some(key)
    }

    /// A client dropped over another monitor moves there.
    fn settle_after_drag(&mut self, key: ClientKey) -> WmResult<()> {
        let target = self.rect_to_monitor(self.clients[key].geometry());
        if target != self.selected_monitor {
            debug!(monitor = target, "client dropped on another monitor");
            self.send_to_monitor(key, target)?;
            self.selected_monitor = target;
            self.focus(None)?;
        }
        Ok(())
    }

    pub(crate) fn move_mouse(&mut self) -> WmResult<()> {
        let Some(key) = self.draggable_selection() else {
            return Ok(());
        };
        self.restack(self.selected_monitor)?;
        let origin = (self.clients[key].x_position, self.clients[key].y_position);

        if !self.conn.grab_pointer(CursorKind::Move)? {
            return Ok(());
        }
        let Some(start) = self.conn.query_pointer()? else {
            return self.end_drag();
        };

        self.drag_loop(MOTION_INTERVAL, |wm, x, y| {
            let target = (origin.0 + x - start.0, origin.1 + y - start.1);
            wm.drag_move(key, target)
        })?;
        self.end_drag()?;
        self.settle_after_drag(key)
    }

    fn drag_move(&mut self, key: ClientKey, (mut x, mut y): (i32, i32)) -> WmResult<()> {
        let monitor = &self.monitors[self.selected_monitor];
        let area = monitor.work_area;
        let arranges = monitor.layout().arranges();
        let snap = self.config.snap;
        let client = &self.clients[key];
        let (width, height) = (client.width_with_border(), client.height_with_border());

        if (area.x - x).abs() < snap {
            x = area.x;
        } else if (area.x + area.w - (x + width)).abs() < snap {
            x = area.x + area.w - width;
        }
        if (area.y - y).abs() < snap {
            y = area.y;
        } else if (area.y + area.h - (y + height)).abs() < snap {
            y = area.y + area.h - height;
        }

        let moved_far = (x - client.x_position).abs() > snap || (y - client.y_position).abs() > snap;
        if !client.is_floating && arranges && moved_far {
            self.toggle_floating(false)?;
        }

        let client = &self.clients[key];
        if !arranges || client.is_floating {
            let rect = Rect::new(x, y, client.width, client.height);
            self.resize(key, rect, true)?;
        }
        Ok(())
    }

    /// Resize from whichever corner is nearest the pointer, warping it onto that corner.
    pub(crate) fn resize_mouse(&mut self) -> WmResult<()> {
        let Some(key) = self.draggable_selection() else {
            return Ok(());
        };
        self.restack(self.selected_monitor)?;
        let original = self.clients[key].geometry();

        if !self.conn.grab_pointer(CursorKind::Resize)? {
            return Ok(());
        }
        let Some((pointer_x, pointer_y)) = self.conn.query_pointer()? else {
            return self.end_drag();
        };
        let left = pointer_x - original.x < original.w / 2;
        let top = pointer_y - original.y < original.h / 2;
        self.warp_to_corner(key, left, top)?;

        self.drag_loop(MOTION_INTERVAL, |wm, x, y| {
            wm.drag_resize(key, original, (left, top), (x, y))
        })?;

        self.warp_to_corner(key, left, top)?;
        self.end_drag()?;
        self.settle_after_drag(key)
    }

    fn warp_to_corner(&self, key: ClientKey, left: bool, top: bool) -> WmResult<()> {
        let client = &self.clients[key];
        let border = client.border_width;
        let x = if left { -border } else { client.width + border - 1 };
        let y = if top { -border } else { client.height + border - 1 };
        self.conn.warp_pointer(client.window, x, y)
    }

    fn drag_resize(
        &mut self,
        key: ClientKey,
        original: Rect,
        (left, top): (bool, bool),
        (pointer_x, pointer_y): (i32, i32),
    ) -> WmResult<()> {
        let client = &self.clients[key];
        let border = client.border_width;
        let x = if left { pointer_x } else { client.x_position };
        let y = if top { pointer_y } else { client.y_position };
        let width = if left {
            original.x + original.w - x
        } else {
            pointer_x - original.x - 2 * border + 1
        }
        .max(1);
        let height = if top {
            original.y + original.h - y
        } else {
            pointer_y - original.y - 2 * border + 1
        }
        .max(1);

        let own_area = self.monitors[client.monitor_index].work_area;
        let selected = &self.monitors[self.selected_monitor];
        let area = selected.work_area;
        let arranges = selected.layout().arranges();
        let snap = self.config.snap;

        let fits = own_area.x + width >= area.x
            && own_area.x + width <= area.x + area.w
            && own_area.y + height >= area.y
            && own_area.y + height <= area.y + area.h;
        let resized_far = (width - client.width).abs() > snap || (height - client.height).abs() > snap;
        if fits && !client.is_floating && arranges && resized_far {
            self.toggle_floating(false)?;
        }

        if !arranges || self.clients[key].is_floating {
            self.resize(key, Rect::new(x, y, width, height), true)?;
        }
        Ok(())
    }

    /// Drag the split between master and stack. The pointer starts on the split and the
    /// factor follows it.
    pub(crate) fn drag_master_factor(&mut self) -> WmResult<()> {
        let index = self.selected_monitor;
        let monitor = &self.monitors[index];
        let count = monitor.tiled(&self.clients).len();
        let layout = monitor.layout();
        let num_master = monitor.num_master;
        if count == 0 {
            return Ok(());
        }

        let center = match layout {
            LayoutType::CenteredMaster => count > num_master + 1,
            LayoutType::CenteredFloatingMaster => true,
            _ => false,
        };
        let horizontal = !center
            && matches!(
                layout,
                LayoutType::BottomStack | LayoutType::BottomStackHorizontal
            );
        let fixed = !layout.arranges()
            || (num_master > 0 && count <= num_master)
            || matches!(
                layout,
                LayoutType::Monocle
                    | LayoutType::Grid
                    | LayoutType::HorizontalGrid
                    | LayoutType::GaplessGrid
                    | LayoutType::NRowGrid
            );
        if fixed {
            return Ok(());
        }

        let gaps = monitor
            .gaps
            .effective(monitor.gaps_enabled, self.config.smart_gaps, count);
        let area = Rect::new(
            monitor.work_area.x + gaps.outer_vertical,
            monitor.work_area.y + gaps.outer_horizontal,
            monitor.work_area.w - 2 * gaps.outer_vertical,
            monitor.work_area.h - 2 * gaps.outer_horizontal,
        );
        let (inner_h, inner_v) = (gaps.inner_horizontal, gaps.inner_vertical);
        let factor = f64::from(monitor.master_factor);
        let (ax, ay, aw, ah) = (
            f64::from(area.x),
            f64::from(area.y),
            f64::from(area.w),
            f64::from(area.h),
        );
        let (ih, iv) = (f64::from(inner_h), f64::from(inner_v));

        let (mut px, mut py) = if center && horizontal {
            (ax + aw / 2.0, ay + ah / 2.0 + (ah - 2.0 * ih) * (factor / 2.0) + ih / 2.0)
        } else if center {
            (ax + aw / 2.0 + (aw - 2.0 * iv) * factor / 2.0 + iv / 2.0, ay + ah / 2.0)
        } else if horizontal {
            (ax + aw / 2.0, ay + (ah - ih) * factor + ih / 2.0)
        } else {
            (ax + (aw - iv) * factor + iv / 2.0, ay + ah / 2.0)
        };

        let cursor = if horizontal {
            CursorKind::ResizeVertical
        } else {
            CursorKind::ResizeHorizontal
        };
        if !self.conn.grab_pointer(cursor)? {
            return Ok(());
        }
        let root = self.conn.root();
        self.conn.warp_pointer(root, px as i32, py as i32)?;
        trace!(layout = layout.as_str(), center, horizontal, "dragging master factor");

        let mut first = true;
        self.drag_loop(MASTER_FACTOR_INTERVAL, |wm, x, y| {
            if !first {
                px = f64::from(x);
                py = f64::from(y);
            }
            first = false;

            let fact = if center && horizontal {
                if py - ay > ah / 2.0 {
                    1.0 - (ay + ah - py - ih / 2.0) * 2.0 / (ah - 2.0 * ih)
                } else {
                    1.0 - (py - ay - ih / 2.0) * 2.0 / (ah - 2.0 * ih)
                }
            } else if center {
                if px - ax > aw / 2.0 {
                    1.0 - (ax + aw - px - iv / 2.0) * 2.0 / (aw - 2.0 * iv)
                } else {
                    1.0 - (px - ax - iv / 2.0) * 2.0 / (aw - 2.0 * iv)
                }
            } else if horizontal {
                (py - ay - ih / 2.0) / (ah - ih)
            } else {
                (px - ax - iv / 2.0) / (aw - iv)
            };

            wm.set_master_factor((1.0 + fact) as f32)?;
            px = f64::from(x);
            py = f64::from(y);
            Ok(())
        })?;

        self.end_drag()
    }

    /// Drag the selection's edge to grow or shrink its share of its column. Floating
    /// clients are resized instead.
    pub(crate) fn drag_client_factor(&mut self) -> WmResult<()> {
        let Some(key) = self.selected() else {
            return Ok(());
        };
        let client = &self.clients[key];
        if client.is_floating {
            return self.resize_mouse();
        }
        if client.is_fullscreen && client.fake_fullscreen == FakeFullscreen::Off {
            return Ok(());
        }
        let own_area = self.monitors[client.monitor_index].work_area;
        let index = self.selected_monitor;
        self.restack(index)?;

        let monitor = &self.monitors[index];
        let tiled = monitor.tiled(&self.clients);
        let count = tiled.len() as i32;
        let position = tiled.iter().position(|k| *k == key).unwrap_or(0) as i32;
        let num_master = (monitor.num_master as i32).min(count);
        let layout = monitor.layout();
        if client_factor_is_fixed(layout, position, count, num_master) {
            return Ok(());
        }
        let (area_w, area_h) = (own_area.w as f32, own_area.h as f32);

        if !self.conn.grab_pointer(CursorKind::Resize)? {
            return Ok(());
        }

        let (push_x, push_y) = edge_direction(layout, position, count, num_master);
        let invert_x = if push_x == 0 { 1 } else { push_x };
        let invert_y = if push_y == 0 { 1 } else { push_y };
        self.warp_to_edge(key, push_x, push_y)?;

        let mut previous: Option<(i32, i32)> = None;
        self.drag_loop(CLIENT_FACTOR_INTERVAL, |wm, x, y| {
            let current = (invert_x * x, invert_y * y);
            let (prev_x, prev_y) = previous.unwrap_or(current);
            let (dist_x, dist_y) = (current.0 - prev_x, current.1 - prev_y);

            let fact = if dist_x.abs() > dist_y.abs() {
                4.0 * dist_x as f32 / area_w
            } else {
                -4.0 * dist_y as f32 / area_h
            };
            if fact != 0.0 {
                wm.set_client_factor(fact)?;
            }
            previous = Some(current);
            Ok(())
        })?;

        self.warp_to_edge(key, push_x, push_y)?;
        self.end_drag()
    }

    fn warp_to_edge(&self, key: ClientKey, push_x: i32, push_y: i32) -> WmResult<()> {
        let client = &self.clients[key];
        let x = match push_x {
            0 => client.width / 2,
            p if p < 0 => 0,
            _ => client.width,
        };
        let y = match push_y {
            0 => client.height / 2,
            p if p > 0 => 0,
            _ => client.height,
        };
        self.conn.warp_pointer(client.window, x, y)
    }
}

/// Whether the client at `position` among `count` tiled clients has no edge whose drag
/// changes its factor under `layout`.
fn client_factor_is_fixed(layout: LayoutType, position: i32, count: i32, num_master: i32) -> bool {
    let (pos, n, nm) = (position, count, num_master);
    if n < 2 {
        true
    } else if layout == LayoutType::HorizontalGrid {
        pos == 0 && n == 3
    } else if (pos == 0 && nm == 1) || (pos == n - 1 && n - nm == 1) {
        true
    } else {
        match layout {
            LayoutType::CenteredMaster => {
                (nm == 1 && (pos == 0 || n < 4 || (n == 4 && pos == n - 2)))
                    || (nm > 0 && pos >= nm && (n - nm < 3 || (n - nm == 3 && pos == n - 2)))
            }
            LayoutType::CenteredFloatingMaster => {
                (nm == 1 && pos == 0) || (n - nm == 1 && pos == n - 1)
            }
            LayoutType::Deck => nm <= 1 || pos >= nm,
            LayoutType::Dwindle
            | LayoutType::GaplessGrid
            | LayoutType::Grid
            | LayoutType::Monocle
            | LayoutType::NRowGrid
            | LayoutType::Spiral
            | LayoutType::Float => true,
            _ => false,
        }
    }
}

/// Which edge of the client the drag holds: -1 or 1 per axis, 0 for the middle.
fn edge_direction(layout: LayoutType, pos: i32, n: i32, nm: i32) -> (i32, i32) {
    let sign = |flag: bool| if flag { -1 } else { 1 };
    match layout {
        LayoutType::BottomStack | LayoutType::CenteredFloatingMaster => {
            (sign(pos > 0 && (pos == n - 1 || pos == nm - 1)), 0)
        }
        LayoutType::BottomStackHorizontal if pos < nm => (sign(pos > 0 && pos == nm - 1), 0),
        LayoutType::BottomStackHorizontal => (0, -sign(pos == n - 1)),
        LayoutType::CenteredMaster if nm > 1 && pos < nm => (0, -sign(pos == nm - 1)),
        LayoutType::CenteredMaster => (0, -sign(pos == n - 1 || (pos == n - 2 && nm > 0))),
        LayoutType::Deck => (0, -sign(pos == nm - 1)),
        LayoutType::HorizontalGrid => (sign(pos > 0 && (pos == n - 1 || pos == n / 2 - 1)), 0),
        LayoutType::Tile => (0, -sign(pos == n - 1 || pos == nm - 1)),
        _ => (0, 0),
    }
}
