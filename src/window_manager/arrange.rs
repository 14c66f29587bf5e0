use super::WindowManager;
use crate::client::ClientKey;
use crate::errors::WmResult;
use crate::geometry::Rect;
use crate::layout::{LayoutContext, LayoutType};
use crate::size_hints::{ResolveBounds, SizeHints};
use crate::tags::SCRATCHPAD_MASK;
use crate::x::{ClientConfig, XConn};
use tracing::trace;

impl<X: XConn> WindowManager<X> {
    /// Re-tile one monitor and fix its stacking, or re-tile every monitor.
    #[tracing::instrument(level = "trace", skip(self))]
    pub(crate) fn arrange(&mut self, monitor: Option<usize>) -> WmResult<()> {
        match monitor {
            Some(index) => {
                self.show_hide(index)?;
                self.arrange_monitor(index)?;
                self.restack(index)?;
            }
            None => {
                for index in 0..self.monitors.len() {
                    self.show_hide(index)?;
                }
                for index in 0..self.monitors.len() {
                    self.arrange_monitor(index)?;
                }
            }
        }
        Ok(())
    }

    /// Move visible clients on screen, top of the focus stack first, and park the others
    /// off screen to the left, bottom of the stack first.
    fn show_hide(&mut self, index: usize) -> WmResult<()> {
        let stack = self.monitors[index].stack.clone();
        let arranges = self.monitors[index].layout().arranges();
        let work_area = self.monitors[index].work_area;

        for &key in &stack {
            if !self.is_visible(key) {
                continue;
            }
            let client = &mut self.clients[key];
            if client.tags & SCRATCHPAD_MASK != 0 && client.is_floating {
                client.x_position = work_area.x + (work_area.w / 2 - client.width_with_border() / 2);
                client.y_position = work_area.y + (work_area.h / 2 - client.height_with_border() / 2);
            }
            let geometry = client.geometry();
            let needs_resize = (!arranges || client.is_floating) && !client.is_fullscreen;
            self.conn.configure(client.window, &[ClientConfig::Position(geometry)])?;
            if needs_resize {
                self.resize(key, geometry, false)?;
            }
        }

        for &key in stack.iter().rev() {
            if self.is_visible(key) {
                continue;
            }
            let client = &self.clients[key];
            let parked = Rect::new(
                client.width_with_border() * -2,
                client.y_position,
                client.width,
                client.height,
            );
            self.conn.configure(client.window, &[ClientConfig::Position(parked)])?;
        }
        Ok(())
    }

    fn arrange_monitor(&mut self, index: usize) -> WmResult<()> {
        let monitor = &mut self.monitors[index];
        let tiled = monitor.tiled(&self.clients);
        let layout = monitor.layout();
        monitor.layout_symbol = layout.symbol_for(tiled.len(), monitor.num_master);

        if !layout.arranges() || tiled.is_empty() {
            return Ok(());
        }

        let context = LayoutContext {
            area: monitor.work_area,
            num_master: monitor.num_master,
            master_factor: monitor.master_factor,
            gaps: monitor.gaps.effective(
                monitor.gaps_enabled,
                self.config.smart_gaps,
                tiled.len(),
            ),
            bar_height: self.config.bar_height,
            border_width: self.config.border_width,
            force_vsplit: self.config.force_vsplit,
        };
        let factors: Vec<f32> = tiled
            .iter()
            .map(|key| self.clients[*key].client_factor)
            .collect();
        let rects = layout.layout().arrange(&context, &factors);
        debug_assert_eq!(rects.len(), tiled.len());
        trace!(monitor = index, layout = layout.as_str(), count = tiled.len(), "arranging");

        for (key, outer) in tiled.into_iter().zip(rects) {
            let border = self.clients[key].border_width;
            let inner = Rect::new(outer.x, outer.y, outer.w - 2 * border, outer.h - 2 * border);
            if layout == LayoutType::Monocle {
                // always committed so the border is dropped even when the rect is unchanged
                let (resolved, _) = self.apply_size_hints(key, inner, false)?;
                self.resize_client(key, resolved)?;
            } else {
                self.resize(key, inner, false)?;
            }
        }
        Ok(())
    }

    /// Raise the selection when it floats and stack the tiled clients in focus order
    /// underneath everything else.
    pub(crate) fn restack(&mut self, index: usize) -> WmResult<()> {
        let monitor = &self.monitors[index];
        let Some(selected) = monitor.selected.and_then(|key| self.clients.get(key)) else {
            return Ok(());
        };

        let arranges = monitor.layout().arranges();
        if selected.is_floating || !arranges {
            self.conn.configure(selected.window, &[ClientConfig::StackTop])?;
        }

        if arranges {
            let mut previous = None;
            for &key in &monitor.stack {
                let client = &self.clients[key];
                if client.is_floating || !monitor.is_visible(client) {
                    continue;
                }
                let position = match previous {
                    None => ClientConfig::StackBottom,
                    Some(sibling) => ClientConfig::StackBelow(sibling),
                };
                self.conn.configure(client.window, &[position])?;
                previous = Some(client.window);
            }
        }

        self.conn.discard_enter_events()
    }

    /// Move and resize a client after correcting the request against its hints.
    pub(crate) fn resize(&mut self, key: ClientKey, proposed: Rect, interactive: bool) -> WmResult<()> {
        let (resolved, changed) = self.apply_size_hints(key, proposed, interactive)?;
        if changed {
            self.resize_client(key, resolved)?;
        }
        Ok(())
    }

    fn apply_size_hints(
        &mut self,
        key: ClientKey,
        proposed: Rect,
        interactive: bool,
    ) -> WmResult<(Rect, bool)> {
        if !self.clients[key].hints_valid {
            self.update_size_hints(key)?;
        }

        let client = &self.clients[key];
        let monitor = &self.monitors[client.monitor_index];
        let bounds = ResolveBounds {
            work_area: monitor.work_area,
            screen_width: self.screen_size.0,
            screen_height: self.screen_size.1,
            bar_height: self.config.bar_height,
            respect_hints: self.config.resize_hints
                || client.is_floating
                || !monitor.layout().arranges(),
        };

        Ok(client.resolve_geometry(proposed, interactive, &bounds))
    }

    /// Apply a geometry as is. Tiled monocle clients drop their border and take its room.
    pub(crate) fn resize_client(&mut self, key: ClientKey, rect: Rect) -> WmResult<()> {
        let monocle = {
            let client = &self.clients[key];
            self.monitors[client.monitor_index].layout() == LayoutType::Monocle
                && !client.is_floating
        };

        let client = &mut self.clients[key];
        client.set_geometry(rect);
        let mut border = client.border_width;
        if monocle {
            client.width += 2 * border;
            client.height += 2 * border;
            border = 0;
        }

        self.conn.configure(
            client.window,
            &[
                ClientConfig::Position(client.geometry()),
                ClientConfig::BorderPx(border as u32),
            ],
        )?;
        self.configure(key)
    }

    /// Tell the client where it is with a synthetic `ConfigureNotify`.
    pub(crate) fn configure(&self, key: ClientKey) -> WmResult<()> {
        let client = &self.clients[key];
        self.conn
            .send_configure_notify(client.window, client.geometry(), client.border_width)
    }

    pub(crate) fn update_size_hints(&mut self, key: ClientKey) -> WmResult<()> {
        let window = self.clients[key].window;
        let hints = self
            .conn
            .normal_hints(window)?
            .map(|raw| SizeHints::from_raw(&raw))
            .unwrap_or_default();
        self.clients[key].set_size_hints(hints);
        Ok(())
    }

    /// Selected border for the selection, a darker one when it is the only tiled client
    /// on screen, the normal border otherwise.
    pub(crate) fn set_border_color(&self, key: ClientKey) -> WmResult<()> {
        let Some(client) = self.clients.get(key) else {
            return Ok(());
        };

        let mut color = self.config.normal_border;
        if Some(key) == self.selected() {
            color = self.config.selected_border;
            let monitor = &self.monitors[self.selected_monitor];
            if !client.is_floating && monitor.layout().arranges() {
                let alone = !monitor.clients.iter().any(|&other| {
                    other != key
                        && self
                            .clients
                            .get(other)
                            .is_some_and(|c| monitor.is_visible(c) && !c.is_hidden)
                });
                if alone {
                    color = self.config.selected_alone_border;
                }
            }
        }
        self.conn.set_border_color(client.window, color)
    }

    /// Rewrite `_NET_CLIENT_LIST` from scratch.
    pub(crate) fn update_client_list(&self) -> WmResult<()> {
        let windows: Vec<_> = self
            .monitors
            .iter()
            .flat_map(|monitor| monitor.clients.iter())
            .filter_map(|key| self.clients.get(*key).map(|client| client.window))
            .collect();
        self.conn.set_client_list(&windows)
    }
}
