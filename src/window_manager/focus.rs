use super::WindowManager;
use crate::client::{ClientKey, FakeFullscreen};
use crate::errors::WmResult;
use crate::x::{Protocol, XConn, Xid};

/// Weight of the distance along the direction of travel when scoring `focusdir` candidates.
const DIRECTION_WEIGHT: i64 = 20;

impl<X: XConn> WindowManager<X> {
    /// Give input focus to `target`, or to the most recently focused shown client when
    /// `target` is absent or not on screen.
    #[tracing::instrument(level = "trace", skip(self))]
    pub(crate) fn focus(&mut self, target: Option<ClientKey>) -> WmResult<()> {
        let mut target = target.filter(|key| self.is_visible(*key));
        if target.is_none() {
            let monitor = &self.monitors[self.selected_monitor];
            target = monitor.stack.iter().copied().find(|key| {
                self.clients
                    .get(*key)
                    .is_some_and(|c| monitor.is_visible(c) && !c.is_hidden)
            });
        }

        if let Some(previous) = self.selected()
            && Some(previous) != target
        {
            self.lose_fullscreen(target)?;
            let same_monitor = target
                .is_none_or(|key| self.clients[key].monitor_index == self.selected_monitor);
            if self.monitors[self.selected_monitor].hidden_selection && same_monitor {
                self.hide_window(previous)?;
                self.unfocus(previous, false)?;
                let monitor = &mut self.monitors[self.selected_monitor];
                monitor.selected = None;
                monitor.hidden_selection = false;
                self.arrange(Some(self.selected_monitor))?;
            } else {
                self.unfocus(previous, false)?;
            }
        }

        match target {
            Some(key) => {
                let index = self.clients[key].monitor_index;
                self.selected_monitor = index;
                if self.clients[key].is_urgent {
                    self.set_urgent(key, false)?;
                }
                let monitor = &mut self.monitors[index];
                if self.clients[key].is_hidden {
                    monitor.hidden_selection = true;
                }
                monitor.detach_stack(&self.clients, key);
                monitor.attach_stack(key);
                self.conn
                    .grab_buttons(self.clients[key].window, true, &self.config.buttons)?;
                self.set_focus(key)?;
            }
            None => self.conn.focus_root()?,
        }

        self.monitors[self.selected_monitor].selected = target;
        if let Some(key) = target {
            self.set_border_color(key)?;
        }
        Ok(())
    }

    /// Drop the focused look from a client, optionally handing input focus back to the root.
    pub(crate) fn unfocus(&mut self, key: ClientKey, give_up_focus: bool) -> WmResult<()> {
        let Some(client) = self.clients.get(key) else {
            return Ok(());
        };
        self.conn
            .grab_buttons(client.window, false, &self.config.buttons)?;
        self.conn
            .set_border_color(client.window, self.config.normal_border)?;
        if give_up_focus {
            self.conn.focus_root()?;
        }
        Ok(())
    }

    /// Set input focus unless the client refuses it, and offer `WM_TAKE_FOCUS` either way.
    pub(crate) fn set_focus(&self, key: ClientKey) -> WmResult<()> {
        let client = &self.clients[key];
        if !client.never_focus {
            self.conn.focus(client.window)?;
        }
        self.conn.send_protocol(client.window, Protocol::TakeFocus)?;
        Ok(())
    }

    pub(crate) fn set_urgent(&mut self, key: ClientKey, urgent: bool) -> WmResult<()> {
        self.clients[key].is_urgent = urgent;
        self.conn.set_urgency_hint(self.clients[key].window, urgent)
    }

    /// A real fullscreen selection gives way when focus moves to a tiled client next to it.
    pub(crate) fn lose_fullscreen(&mut self, next: Option<ClientKey>) -> WmResult<()> {
        let (Some(selected), Some(next)) = (self.selected(), next) else {
            return Ok(());
        };
        let (sel, other) = (&self.clients[selected], &self.clients[next]);
        if sel.is_fullscreen
            && sel.fake_fullscreen != FakeFullscreen::On
            && self.is_visible(selected)
            && sel.monitor_index == other.monitor_index
            && !other.is_floating
        {
            self.set_fullscreen(selected, false)?;
        }
        Ok(())
    }

    /// Move focus `step` places through the shown clients in list order, wrapping. With
    /// `include_hidden` hidden clients are visited too and shown while they hold focus.
    pub(crate) fn focus_stack(&mut self, step: i32, include_hidden: bool) -> WmResult<()> {
        let monitor = &self.monitors[self.selected_monitor];
        if monitor.clients.is_empty() {
            return Ok(());
        }
        let selected = monitor.selected;
        if selected.is_none() && !include_hidden {
            return Ok(());
        }
        if let Some(client) = self.selected_client()
            && client.is_fullscreen
            && client.fake_fullscreen != FakeFullscreen::On
        {
            return Ok(());
        }

        let candidates: Vec<ClientKey> = monitor
            .clients
            .iter()
            .copied()
            .filter(|key| {
                let client = &self.clients[*key];
                monitor.is_visible(client) && (include_hidden || !client.is_hidden)
            })
            .collect();
        let position = selected.and_then(|key| monitor.clients.iter().position(|k| *k == key));

        let next = if step > 0 {
            position
                .and_then(|p| {
                    monitor.clients[p + 1..]
                        .iter()
                        .find(|key| candidates.contains(key))
                })
                .or_else(|| candidates.first())
        } else {
            position
                .and_then(|p| {
                    monitor.clients[..p]
                        .iter()
                        .rev()
                        .find(|key| candidates.contains(key))
                })
                .or_else(|| candidates.last())
        }
        .copied();

        let Some(next) = next.filter(|key| Some(*key) != selected) else {
            return Ok(());
        };
        self.focus(Some(next))?;
        if self.clients[next].is_hidden {
            self.show_window(next)
        } else {
            self.restack(self.selected_monitor)
        }
    }

    /// Focus the nearest client in a direction: 0 left, 1 right, 2 up, anything else down.
    /// Distances wrap around the work area, so moving off one edge finds clients at the
    /// other.
    pub(crate) fn focus_direction(&mut self, direction: i32) -> WmResult<()> {
        let Some(selected) = self.selected() else {
            return Ok(());
        };
        let origin = &self.clients[selected];
        let monitor = &self.monitors[origin.monitor_index];
        let area = monitor.work_area;
        let Some(start) = monitor.clients.iter().position(|k| *k == selected) else {
            return Ok(());
        };

        let count = monitor.clients.len();
        let mut best: Option<(i64, ClientKey)> = None;
        for offset in 1..count {
            let key = monitor.clients[(start + offset) % count];
            let c = &self.clients[key];
            if !monitor.is_visible(c) || c.is_floating != origin.is_floating || c.is_hidden {
                continue;
            }

            let (s, o) = (origin.geometry(), c.geometry());
            let (distance, span, across) = match direction {
                0 => (s.x - o.x - o.w, area.w, s.y - o.y),
                1 => (o.x - s.x - s.w, area.w, o.y - s.y),
                2 => (s.y - o.y - o.h, area.h, s.x - o.x),
                _ => (o.y - s.y - s.h, area.h, o.x - s.x),
            };
            let (distance, span, across) = (distance as i64, span as i64, across as i64);
            let score =
                DIRECTION_WEIGHT * distance.abs().min((distance + span).abs()) + across.abs();

            let prefer_later = matches!(direction, 0 | 2);
            let better = match best {
                None => true,
                Some((current, _)) => score < current || (prefer_later && score == current),
            };
            if better {
                best = Some((score, key));
            }
        }

        if let Some((_, key)) = best {
            self.focus(Some(key))?;
            let index = self.clients[key].monitor_index;
            self.restack(index)?;
        }
        Ok(())
    }

    pub(crate) fn focus_monitor(&mut self, direction: i32) -> WmResult<()> {
        if self.monitors.len() < 2 {
            return Ok(());
        }
        let target = self.dir_to_monitor(direction);
        if target == self.selected_monitor {
            return Ok(());
        }
        if let Some(selected) = self.selected() {
            self.unfocus(selected, false)?;
        }
        self.selected_monitor = target;
        self.focus(None)
    }

    /// Some clients grab focus on their own. Put it back on the selection.
    pub(crate) fn focus_in(&self, window: Xid) -> WmResult<()> {
        match self.selected() {
            Some(key) if self.clients[key].window != window => self.set_focus(key),
            _ => Ok(()),
        }
    }

    /// The pointer crossed into a window: follow it with focus and the selected monitor.
    pub(crate) fn enter_window(&mut self, window: Xid) -> WmResult<()> {
        let client = self.window_to_client(window);
        let index = match client {
            Some(key) => self.clients[key].monitor_index,
            None => self.window_to_monitor(window)?,
        };

        if index != self.selected_monitor {
            if let Some(selected) = self.selected() {
                self.unfocus(selected, true)?;
            }
            self.selected_monitor = index;
        } else if client.is_none() || client == self.selected() {
            return Ok(());
        }
        self.focus(client)
    }

    /// Pointer motion over the root switches the selected monitor once it leaves the one
    /// it was last seen on.
    pub(crate) fn root_motion(&mut self, x: i32, y: i32) -> WmResult<()> {
        let index = self.rect_to_monitor(crate::geometry::Rect::new(x, y, 1, 1));
        if let Some(previous) = self.motion_monitor
            && previous != index
        {
            if let Some(selected) = self.selected() {
                self.unfocus(selected, true)?;
            }
            self.selected_monitor = index;
            self.focus(None)?;
        }
        self.motion_monitor = Some(index);
        Ok(())
    }
}
