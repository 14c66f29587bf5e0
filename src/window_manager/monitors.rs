use super::WindowManager;
use crate::client::ClientKey;
use crate::errors::WmResult;
use crate::geometry::Rect;
use crate::monitor::Monitor;
use crate::x::{XConn, Xid};
use tracing::{debug, info};

impl<X: XConn> WindowManager<X> {
    /// Reconcile the monitor list with the screens the server reports. Returns whether
    /// anything changed.
    pub(crate) fn update_geometry(&mut self) -> WmResult<bool> {
        let mut screens: Vec<Rect> = Vec::new();
        for screen in self.conn.screen_details()? {
            if !screens.contains(&screen) {
                screens.push(screen);
            }
        }
        if screens.is_empty() {
            screens.push(Rect::new(0, 0, self.screen_size.0, self.screen_size.1));
        }

        let right = screens.iter().map(|s| s.x + s.w).max().unwrap_or(0);
        let bottom = screens.iter().map(|s| s.y + s.h).max().unwrap_or(0);
        if self.screen_size == (0, 0) {
            self.screen_size = (right, bottom);
        }

        let mut dirty = false;
        let existing = self.monitors.len();
        for (number, screen) in screens.iter().enumerate() {
            if number >= existing {
                self.monitors.push(Monitor::new(number, *screen, &self.config));
                dirty = true;
                continue;
            }
            let monitor = &mut self.monitors[number];
            if monitor.screen != *screen {
                monitor.number = number;
                monitor.screen = *screen;
                monitor.update_bar_position();
                dirty = true;
            }
        }

        while self.monitors.len() > screens.len() {
            let Some(removed) = self.monitors.pop() else {
                break;
            };
            dirty = true;
            for key in removed.clients {
                if let Some(client) = self.clients.get_mut(key) {
                    client.monitor_index = 0;
                }
                self.monitors[0].attach_top(key);
                self.monitors[0].attach_stack(key);
            }
        }

        if dirty {
            info!(count = self.monitors.len(), "monitor layout changed");
            self.selected_monitor = 0;
            self.selected_monitor = self.window_to_monitor(self.conn.root())?;
        }
        Ok(dirty)
    }

    /// The monitor with the largest overlap with the rect, falling back to the selected one.
    pub(crate) fn rect_to_monitor(&self, rect: Rect) -> usize {
        let mut best = self.selected_monitor;
        let mut area = 0;
        for (index, monitor) in self.monitors.iter().enumerate() {
            let overlap = monitor.work_area.intersection_area(&rect);
            if overlap > area {
                area = overlap;
                best = index;
            }
        }
        best
    }

    /// The root maps to the monitor under the pointer, clients to their own monitor.
    pub(crate) fn window_to_monitor(&self, window: Xid) -> WmResult<usize> {
        if window == self.conn.root() {
            if let Some((x, y)) = self.conn.query_pointer()? {
                return Ok(self.rect_to_monitor(Rect::new(x, y, 1, 1)));
            }
        }
        Ok(self
            .window_to_client(window)
            .map(|key| self.clients[key].monitor_index)
            .unwrap_or(self.selected_monitor))
    }

    /// The next monitor for a positive direction, the previous one otherwise, wrapping.
    pub(crate) fn dir_to_monitor(&self, direction: i32) -> usize {
        let count = self.monitors.len();
        if direction > 0 {
            (self.selected_monitor + 1) % count
        } else {
            (self.selected_monitor + count - 1) % count
        }
    }

    /// Move a client to another monitor, adopting that monitor's current view.
    pub(crate) fn send_to_monitor(&mut self, key: ClientKey, target: usize) -> WmResult<()> {
        let source = self.clients[key].monitor_index;
        if source == target {
            return Ok(());
        }
        debug!(from = source, to = target, "sending client to monitor");

        self.unfocus(key, true)?;
        self.monitors[source].detach(key);
        self.monitors[source].detach_stack(&self.clients, key);

        let client = &mut self.clients[key];
        client.monitor_index = target;
        client.tags = self.monitors[target].current_tagset();
        client.switch_tag = 0;
        self.monitors[target].attach(&self.clients, key);
        self.monitors[target].attach_stack(key);

        self.focus(None)?;
        self.arrange(None)
    }

    /// Re-read the screen layout after the root window changed size.
    pub(crate) fn root_resized(&mut self, width: i32, height: i32) -> WmResult<()> {
        let dirty = self.screen_size != (width, height);
        self.screen_size = (width, height);

        if self.update_geometry()? || dirty {
            let fullscreen: Vec<(ClientKey, Rect)> = self
                .clients
                .iter()
                .filter(|(_, c)| {
                    c.is_fullscreen && c.fake_fullscreen != crate::client::FakeFullscreen::On
                })
                .map(|(key, c)| (key, self.monitors[c.monitor_index].screen))
                .collect();
            for (key, screen) in fullscreen {
                self.resize_client(key, screen)?;
            }
            self.focus(None)?;
            self.arrange(None)?;
        }
        Ok(())
    }
}
