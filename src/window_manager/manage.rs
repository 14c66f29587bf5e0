use super::WindowManager;
use crate::client::{Client, ClientKey, FakeFullscreen};
use crate::errors::WmResult;
use crate::geometry::Rect;
use crate::rules::{self, SwitchRequest};
use crate::tags::{SCRATCHPAD_MASK, TAG_MASK};
use crate::util;
use crate::x::{ClientConfig, WmState, XConn, Xid};
use tracing::{debug, info};

/// Title given to clients that do not set one.
const BROKEN: &str = "broken";

impl<X: XConn> WindowManager<X> {
    /// Adopt windows that were mapped before the window manager started, transients last
    /// so their parents are already managed.
    pub(crate) fn scan(&mut self) -> WmResult<()> {
        let windows = self.conn.existing_windows()?;
        let mut transients = Vec::new();

        for window in windows {
            let Some(attributes) = self.conn.window_attributes(window)? else {
                continue;
            };
            if attributes.override_redirect {
                continue;
            }
            if self.conn.transient_for(window)?.is_some() {
                transients.push((window, attributes.viewable));
                continue;
            }
            if attributes.viewable || self.is_iconic(window)? {
                self.manage(window)?;
            }
        }

        for (window, viewable) in transients {
            if viewable || self.is_iconic(window)? {
                self.manage(window)?;
            }
        }
        debug!(count = self.clients.len(), "scanned existing windows");
        Ok(())
    }

    fn is_iconic(&self, window: Xid) -> WmResult<bool> {
        Ok(self.conn.wm_state(window)? == Some(WmState::Iconic))
    }

    /// Start managing a window: run the rules, place it, attach it and focus.
    #[tracing::instrument(level = "trace", skip(self))]
    pub(crate) fn manage(&mut self, window: Xid) -> WmResult<()> {
        let geometry = self.conn.window_geometry(window)?;
        let mut client = Client::new(window, self.selected_monitor, 0);
        client.pid = self.conn.window_pid(window)?;
        client.set_geometry(geometry.rect);
        client.old_x_position = client.x_position;
        client.old_y_position = client.y_position;
        client.old_width = client.width;
        client.old_height = client.height;
        client.old_border_width = geometry.border_width;
        client.name = self.fetch_title(window)?;
        client.is_hidden = self.is_iconic(window)?;

        let transient = self.conn.transient_for(window)?;
        let parent = transient.and_then(|w| self.window_to_client(w));
        let mut terminal = None;
        match parent {
            Some(parent) => {
                client.monitor_index = self.clients[parent].monitor_index;
                client.tags = self.clients[parent].tags;
            }
            None => {
                self.apply_rules(&mut client)?;
                terminal = self.terminal_for(&client);
            }
        }

        let index = client.monitor_index;
        let work_area = self.monitors[index].work_area;
        let screen = self.monitors[index].screen;
        if client.x_position + client.width_with_border() > work_area.x + work_area.w {
            client.x_position = work_area.x + work_area.w - client.width_with_border();
        }
        if client.y_position + client.height_with_border() > work_area.y + work_area.h {
            client.y_position = work_area.y + work_area.h - client.height_with_border();
        }
        client.x_position = client.x_position.max(work_area.x);
        client.y_position = client.y_position.max(work_area.y);
        client.border_width = self.config.border_width;

        let key = self.clients.insert(client);
        info!(window, ?key, "managing window");

        self.conn
            .configure(window, &[ClientConfig::BorderPx(self.config.border_width as u32)])?;
        self.conn
            .set_border_color(window, self.config.normal_border)?;
        self.configure(key)?;
        self.update_window_type(key)?;
        self.update_size_hints(key)?;
        self.update_wm_hints(key)?;

        let client = &mut self.clients[key];
        client.x_position = screen.x + (screen.w - client.width_with_border()) / 2;
        client.y_position = screen.y + (screen.h - client.height_with_border()) / 2;
        self.conn.select_client_events(window)?;
        self.conn
            .grab_buttons(window, false, &self.config.buttons)?;

        let client = &mut self.clients[key];
        if !client.is_floating {
            client.is_floating = transient.is_some() || client.is_fixed;
        }
        if client.is_floating {
            self.conn.configure(window, &[ClientConfig::StackTop])?;
        }

        self.monitors[index].attach(&self.clients, key);
        self.monitors[index].attach_stack(key);
        self.conn.append_client_list(window)?;

        // parked off screen until arranged, some clients want a configure before mapping
        let client = &self.clients[key];
        let parked = Rect::new(
            client.x_position + 2 * self.screen_size.0,
            client.y_position,
            client.width,
            client.height,
        );
        self.conn.configure(window, &[ClientConfig::Position(parked)])?;
        let hidden = client.is_hidden;
        if !hidden {
            self.conn.set_wm_state(window, WmState::Normal)?;
        }

        if index == self.selected_monitor {
            self.lose_fullscreen(Some(key))?;
            if let Some(selected) = self.selected() {
                self.unfocus(selected, false)?;
            }
        }
        if self.monitors[index].hidden_selection {
            if let Some(selected) = self.monitors[index].selected {
                self.hide_window(selected)?;
                self.unfocus(selected, false)?;
            }
            self.monitors[index].hidden_selection = false;
        }
        self.monitors[index].selected = Some(key);

        let swallowed = match terminal {
            Some(terminal) => self.swallow(terminal, key)?,
            None => false,
        };
        if !swallowed {
            self.arrange(Some(index))?;
            if !hidden {
                self.conn.map(window)?;
            }
        }
        self.focus(None)
    }

    /// Run the rule table over a new client and carry out any view switches the matching
    /// rules ask for.
    fn apply_rules(&mut self, client: &mut Client) -> WmResult<()> {
        let hint = self.conn.class_hint(client.window)?;
        let outcome = rules::apply_rules(
            &self.config.rules,
            hint.class.as_deref(),
            hint.instance.as_deref(),
            &client.name,
            self.monitors.len(),
        );

        let initial_monitor = client.monitor_index;
        client.is_terminal = outcome.is_terminal;
        client.no_swallow = outcome.no_swallow;
        client.is_floating = outcome.is_floating;
        if let Some(index) = outcome.monitor {
            client.monitor_index = index;
        }
        if outcome.center {
            let area = self.monitors[client.monitor_index].work_area;
            client.x_position = area.x + (area.w / 2 - client.width_with_border() / 2);
            client.y_position = area.y + (area.h / 2 - client.height_with_border() / 2);
        }

        for request in &outcome.switches {
            self.apply_switch(client, request, initial_monitor)?;
        }

        let index = client.monitor_index;
        client.tags = if outcome.tags & TAG_MASK != 0 {
            outcome.tags & TAG_MASK
        } else {
            self.monitors[index].current_tagset() & !SCRATCHPAD_MASK
        };
        debug_assert!(client.tags != 0);
        Ok(())
    }

    fn apply_switch(
        &mut self,
        client: &mut Client,
        request: &SwitchRequest,
        initial_monitor: usize,
    ) -> WmResult<()> {
        let index = request.monitor.unwrap_or(initial_monitor);
        self.selected_monitor = index;

        let current = self.monitors[index].current_tagset();
        let Some(target) = rules::switch_target(request, current) else {
            return Ok(());
        };
        debug!(?request.mode, target, "rule switches the view");

        if request.mode.returns() {
            client.switch_tag = current;
        }
        if request.mode.views() {
            self.view(target)
        } else {
            let monitor = &mut self.monitors[index];
            let slot = monitor.selected_tags;
            monitor.tagset[slot] = target;
            self.arrange(Some(index))
        }
    }

    /// Stop managing a client. Destroyed windows are not touched on the server.
    #[tracing::instrument(level = "trace", skip(self))]
    pub(crate) fn unmanage(&mut self, key: ClientKey, destroyed: bool) -> WmResult<()> {
        let Some(client) = self.clients.get(key) else {
            return Ok(());
        };
        if client.swallowing.is_some() {
            return self.unswallow(key);
        }

        let index = client.monitor_index;
        let switch_tag = client.switch_tag;
        let monitor = &mut self.monitors[index];
        if monitor.selected == Some(key) {
            monitor.hidden_selection = false;
        }
        monitor.detach(key);
        monitor.detach_stack(&self.clients, key);
        monitor.pertag.forget(key);

        let Some(client) = self.clients.remove(key) else {
            return Ok(());
        };
        info!(window = client.window, destroyed, "unmanaging window");
        if !destroyed {
            self.conn.configure(
                client.window,
                &[ClientConfig::BorderPx(client.old_border_width.max(0) as u32)],
            )?;
            self.conn.set_wm_state(client.window, WmState::Withdrawn)?;
        }

        self.focus(None)?;
        self.update_client_list()?;
        self.arrange(Some(index))?;
        if switch_tag != 0 {
            self.view(switch_tag)?;
        }
        Ok(())
    }

    /// A terminal whose process started this client's process, when the client may
    /// swallow it.
    fn terminal_for(&self, client: &Client) -> Option<ClientKey> {
        if client.pid == 0 || client.is_terminal {
            return None;
        }
        self.monitors
            .iter()
            .flat_map(|monitor| monitor.clients.iter().copied())
            .find(|key| {
                let candidate = &self.clients[*key];
                candidate.is_terminal
                    && candidate.swallowing.is_none()
                    && candidate.pid != 0
                    && util::is_descendant_process(candidate.pid, client.pid)
            })
    }

    /// Put the new client's window in place of the terminal's. The new client's record
    /// is kept inside the terminal's so the terminal comes back when it goes away.
    /// Returns false when the client may not swallow.
    fn swallow(&mut self, terminal: ClientKey, key: ClientKey) -> WmResult<bool> {
        let client = &self.clients[key];
        if client.no_swallow || client.is_terminal {
            return Ok(false);
        }
        if !self.config.swallow_floating && client.is_floating {
            return Ok(false);
        }

        let index = client.monitor_index;
        let window = client.window;
        self.monitors[index].detach(key);
        self.monitors[index].detach_stack(&self.clients, key);
        self.conn.set_wm_state(window, WmState::Withdrawn)?;
        self.conn.unmap(self.clients[terminal].window)?;

        let Some(mut swallowed) = self.clients.remove(key) else {
            return Ok(false);
        };
        let parent = &mut self.clients[terminal];
        swallowed.monitor_index = parent.monitor_index;
        std::mem::swap(&mut parent.window, &mut swallowed.window);
        parent.swallowing = Some(Box::new(swallowed));
        debug!(window, "swallowed terminal");

        self.update_title(terminal)?;
        let parent = &self.clients[terminal];
        let (window, geometry, index) = (parent.window, parent.geometry(), parent.monitor_index);
        self.conn
            .configure(window, &[ClientConfig::Position(geometry)])?;
        self.arrange(Some(index))?;
        self.configure(terminal)?;
        self.conn.map(window)?;
        self.update_client_list()?;
        Ok(true)
    }

    /// Give a terminal its own window back once the client that swallowed it is gone.
    fn unswallow(&mut self, key: ClientKey) -> WmResult<()> {
        let client = &mut self.clients[key];
        let Some(swallowed) = client.swallowing.take() else {
            return Ok(());
        };
        client.window = swallowed.window;
        let index = client.monitor_index;

        self.set_fullscreen(key, false)?;
        self.update_title(key)?;
        self.arrange(Some(index))?;

        let client = &self.clients[key];
        let (window, geometry) = (client.window, client.geometry());
        self.conn.map(window)?;
        self.conn
            .configure(window, &[ClientConfig::Position(geometry)])?;
        self.conn.set_wm_state(window, WmState::Normal)?;
        self.focus(None)?;
        self.arrange(Some(index))?;
        self.configure(key)?;
        self.update_client_list()
    }

    /// The terminal hidden behind a swallowing client went away: forget it.
    pub(crate) fn drop_swallowed(&mut self, key: ClientKey) -> WmResult<()> {
        let index = self.clients[key].monitor_index;
        self.clients[key].swallowing = None;
        self.arrange(Some(index))?;
        self.focus(None)
    }

    fn fetch_title(&self, window: Xid) -> WmResult<String> {
        Ok(self
            .conn
            .window_title(window)?
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| BROKEN.to_string()))
    }

    pub(crate) fn update_title(&mut self, key: ClientKey) -> WmResult<()> {
        let title = self.fetch_title(self.clients[key].window)?;
        self.clients[key].name = title;
        Ok(())
    }

    /// Read urgency and the input hint. An urgency hint on the selection is cleared
    /// instead of recorded.
    pub(crate) fn update_wm_hints(&mut self, key: ClientKey) -> WmResult<()> {
        let window = self.clients[key].window;
        let Some(hints) = self.conn.wm_hints(window)? else {
            return Ok(());
        };

        if Some(key) == self.selected() && hints.urgent {
            self.conn.set_urgency_hint(window, false)?;
        } else {
            self.clients[key].is_urgent = hints.urgent;
        }
        self.clients[key].never_focus = hints.accepts_input.is_some_and(|input| !input);
        Ok(())
    }

    pub(crate) fn update_window_type(&mut self, key: ClientKey) -> WmResult<()> {
        let kind = self.conn.window_type(self.clients[key].window)?;
        if kind.is_fullscreen {
            self.set_fullscreen(key, true)?;
        }
        if kind.is_dialog {
            self.clients[key].is_floating = true;
        }
        Ok(())
    }

    /// A transient whose parent is managed floats.
    pub(crate) fn update_transient(&mut self, key: ClientKey) -> WmResult<()> {
        if self.clients[key].is_floating {
            return Ok(());
        }
        let parent = self.conn.transient_for(self.clients[key].window)?;
        if parent.and_then(|w| self.window_to_client(w)).is_some() {
            self.clients[key].is_floating = true;
            self.arrange(Some(self.clients[key].monitor_index))?;
        }
        Ok(())
    }

    /// Enter or leave fullscreen, honouring fake fullscreen. The floating state and border
    /// are saved on the way in and restored on the way out, once each.
    pub(crate) fn set_fullscreen(&mut self, key: ClientKey, fullscreen: bool) -> WmResult<()> {
        let client = &mut self.clients[key];
        let fake = client.fake_fullscreen;
        let save = (fake == FakeFullscreen::Off && fullscreen && !client.is_fullscreen)
            || (fake == FakeFullscreen::Promoted && fullscreen);
        let restore = (fake == FakeFullscreen::Off && !fullscreen && client.is_fullscreen)
            || (matches!(fake, FakeFullscreen::Promoted | FakeFullscreen::Releasing)
                && !fullscreen);

        let mut fullscreen = fullscreen;
        if fake == FakeFullscreen::Promoted && !fullscreen && client.is_fullscreen {
            // back to fake: the client keeps believing it is fullscreen
            client.fake_fullscreen = FakeFullscreen::On;
            client.is_fullscreen = true;
            fullscreen = true;
        } else if fake == FakeFullscreen::Releasing {
            client.fake_fullscreen = FakeFullscreen::On;
        }

        let window = client.window;
        if fullscreen != client.is_fullscreen {
            self.conn.set_fullscreen_state(window, fullscreen)?;
        }
        let client = &mut self.clients[key];
        client.is_fullscreen = fullscreen;

        if save && client.fullscreen_restore.is_none() {
            client.old_border_width = client.border_width;
            client.fullscreen_restore = Some(client.is_floating);
            client.border_width = 0;
            client.is_floating = true;
            let screen = self.monitors[client.monitor_index].screen;
            self.resize_client(key, screen)?;
            self.conn.configure(window, &[ClientConfig::StackTop])?;
        } else if restore && client.fullscreen_restore.is_some() {
            client.border_width = client.old_border_width;
            client.is_floating = client.fullscreen_restore.take().unwrap_or(false);
            let previous = client.old_geometry();
            let index = client.monitor_index;
            self.set_border_color(key)?;
            self.resize_client(key, previous)?;
            self.arrange(Some(index))?;
        } else {
            let (current, previous) = (client.geometry(), client.old_geometry());
            self.resize_client(key, current)?;
            let client = &mut self.clients[key];
            client.old_x_position = previous.x;
            client.old_y_position = previous.y;
            client.old_width = previous.w;
            client.old_height = previous.h;
        }

        if !self.clients[key].is_fullscreen {
            self.conn.discard_enter_events()?;
        }
        Ok(())
    }

    /// Iconify a client: unmapped and marked Iconic, still managed.
    pub(crate) fn hide_window(&mut self, key: ClientKey) -> WmResult<()> {
        let Some(client) = self.clients.get_mut(key) else {
            return Ok(());
        };
        if client.is_hidden {
            return Ok(());
        }
        client.is_hidden = true;
        let window = client.window;
        self.conn.unmap(window)?;
        self.conn.set_wm_state(window, WmState::Iconic)
    }

    pub(crate) fn show_window(&mut self, key: ClientKey) -> WmResult<()> {
        let Some(client) = self.clients.get_mut(key) else {
            return Ok(());
        };
        if !client.is_hidden {
            return Ok(());
        }
        client.is_hidden = false;
        let (window, index) = (client.window, client.monitor_index);
        self.conn.map(window)?;
        self.conn.set_wm_state(window, WmState::Normal)?;
        self.arrange(Some(index))
    }
}

#[cfg(test)]
mod tests {
    use crate::client::FakeFullscreen;
    use crate::geometry::Rect;
    use crate::rules::{Rule, SwitchTag};
    use crate::tags::{scratchpad_tag, tag_bit};
    use crate::window_manager::test_support::*;
    use crate::x::{WindowAttributes, WmState};

    #[test]
    fn rules_tag_and_float_new_clients() {
        let mut wm = wm_with(|config| {
            config.rules = vec![Rule::class("Gimp").tags(tag_bit(4)), Rule::class("Gimp").floating()];
        });
        wm.conn().set_class(10, "Gimp", "gimp");
        let a = map(&mut wm, 10);

        assert_eq!(wm.clients[a].tags, tag_bit(4));
        assert!(wm.clients[a].is_floating);
    }

    #[test]
    fn unmatched_clients_take_the_current_view_without_scratchpad_bits() {
        let mut wm = plain_wm();
        wm.monitors[0].tagset[0] = tag_bit(2) | scratchpad_tag(0);
        let a = map(&mut wm, 10);

        assert_eq!(wm.clients[a].tags, tag_bit(2));
    }

    #[test]
    fn view_switching_rules_follow_the_client() {
        let mut wm = wm_with(|config| {
            config.rules = vec![Rule::class("Thunar").tags(tag_bit(2)).switch_tag(SwitchTag::ViewReturn)];
        });
        wm.conn().set_class(10, "Thunar", "thunar");
        let a = map(&mut wm, 10);

        assert_eq!(wm.monitors[0].current_tagset(), tag_bit(2));
        assert_eq!(wm.clients[a].switch_tag, tag_bit(0));

        wm.unmanage(a, true).unwrap();
        assert_eq!(wm.monitors[0].current_tagset(), tag_bit(0));
    }

    #[test]
    fn merging_rules_add_the_tags_to_the_view() {
        let mut wm = wm_with(|config| {
            config.rules = vec![Rule::class("Thunar").tags(tag_bit(2)).switch_tag(SwitchTag::Merge)];
        });
        wm.conn().set_class(10, "Thunar", "thunar");
        map(&mut wm, 10);

        assert_eq!(wm.monitors[0].current_tagset(), tag_bit(0) | tag_bit(2));
    }

    #[test]
    fn transients_inherit_tags_and_float() {
        let mut wm = plain_wm();
        let parent = map(&mut wm, 10);
        wm.clients[parent].tags = tag_bit(0) | tag_bit(1);
        wm.conn().set_transient(11, 10);
        let child = map(&mut wm, 11);

        assert_eq!(wm.clients[child].tags, tag_bit(0) | tag_bit(1));
        assert!(wm.clients[child].is_floating);
    }

    #[test]
    fn unmanage_restores_the_border_unless_destroyed() {
        let mut wm = wm_with(|config| config.border_width = 2);
        let a = map(&mut wm, 10);
        let b = map(&mut wm, 11);

        wm.unmanage(a, false).unwrap();
        wm.unmanage(b, true).unwrap();

        assert_eq!(wm.conn().state_of(10), Some(WmState::Withdrawn));
        assert_eq!(wm.conn().state_of(11), Some(WmState::Normal));
        assert!(wm.clients.is_empty());
        assert!(wm.monitors[0].stack.is_empty());
        assert_eq!(wm.selected(), None);
    }

    #[test]
    fn scan_adopts_viewable_and_iconic_windows() {
        let conn = RecordingConn::default();
        conn.add_existing(1, WindowAttributes { override_redirect: false, viewable: true });
        conn.add_existing(2, WindowAttributes { override_redirect: true, viewable: true });
        conn.add_existing(3, WindowAttributes { override_redirect: false, viewable: false });
        conn.add_existing(4, WindowAttributes { override_redirect: false, viewable: false });
        conn.set_state(4, WmState::Iconic);
        conn.add_existing(5, WindowAttributes { override_redirect: false, viewable: true });
        conn.set_transient(5, 1);
        let mut wm = wm_on(conn, |_| {});

        wm.scan().unwrap();

        let mut managed: Vec<_> = wm.clients.values().map(|c| c.window).collect();
        managed.sort();
        assert_eq!(managed, vec![1, 4, 5]);
        let hidden = wm.window_to_client(4).unwrap();
        assert!(wm.clients[hidden].is_hidden);
    }

    #[test]
    fn terminal_is_swallowed_and_restored() {
        let mut wm = wm_with(|config| {
            config.rules = vec![Rule::class("St").terminal()];
        });
        let own = std::process::id();
        let parent = crate::util::parent_process(own);
        wm.conn().set_class(10, "St", "st");
        wm.conn().set_pid(10, parent);
        wm.conn().set_pid(11, own);
        let terminal = map(&mut wm, 10);
        let geometry = wm.clients[terminal].geometry();

        map(&mut wm, 11);

        assert_eq!(wm.clients.len(), 1);
        assert_eq!(wm.clients[terminal].window, 11);
        assert_eq!(wm.clients[terminal].geometry(), geometry);
        assert!(!wm.conn().is_mapped(10));

        let gui = wm.window_to_client(11).unwrap();
        wm.unmanage(gui, true).unwrap();

        assert_eq!(wm.clients[terminal].window, 10);
        assert!(wm.clients[terminal].swallowing.is_none());
        assert!(wm.conn().is_mapped(10));
    }

    #[test]
    fn terminal_dying_under_a_swallowing_client_is_forgotten() {
        let mut wm = wm_with(|config| {
            config.rules = vec![Rule::class("St").terminal()];
        });
        let own = std::process::id();
        wm.conn().set_class(10, "St", "st");
        wm.conn().set_pid(10, crate::util::parent_process(own));
        wm.conn().set_pid(11, own);
        let terminal = map(&mut wm, 10);
        map(&mut wm, 11);

        let holder = wm.swallowing_client(10).unwrap();
        assert_eq!(holder, terminal);
        wm.drop_swallowed(holder).unwrap();

        assert!(wm.clients[terminal].swallowing.is_none());
        assert_eq!(wm.clients[terminal].window, 11);
    }

    #[test]
    fn fullscreen_saves_and_restores_state() {
        let mut wm = wm_with(|config| config.border_width = 2);
        let a = map(&mut wm, 10);
        let tiled = wm.clients[a].geometry();

        wm.set_fullscreen(a, true).unwrap();
        assert!(wm.clients[a].is_fullscreen);
        assert!(wm.clients[a].is_floating);
        assert_eq!(wm.clients[a].border_width, 0);
        assert_eq!(wm.clients[a].geometry(), Rect::new(0, 0, 1280, 800));
        assert_eq!(wm.conn().fullscreen_state(10), Some(true));

        wm.set_fullscreen(a, false).unwrap();
        assert!(!wm.clients[a].is_fullscreen);
        assert!(!wm.clients[a].is_floating);
        assert_eq!(wm.clients[a].border_width, 2);
        assert_eq!(wm.clients[a].geometry(), tiled);
        assert_eq!(wm.conn().fullscreen_state(10), Some(false));
    }

    #[test]
    fn fake_fullscreen_keeps_the_tiled_geometry() {
        let mut wm = plain_wm();
        let a = map(&mut wm, 10);
        let tiled = wm.clients[a].geometry();
        wm.clients[a].fake_fullscreen = FakeFullscreen::On;

        wm.set_fullscreen(a, true).unwrap();

        assert!(wm.clients[a].is_fullscreen);
        assert!(!wm.clients[a].is_floating);
        assert_eq!(wm.clients[a].geometry(), tiled);
        assert_eq!(wm.conn().fullscreen_state(10), Some(true));
    }

    #[test]
    fn dialogs_float() {
        let mut wm = plain_wm();
        wm.conn().set_dialog(10);
        let a = map(&mut wm, 10);

        assert!(wm.clients[a].is_floating);
    }

    #[test]
    fn hidden_clients_round_trip() {
        let mut wm = plain_wm();
        let a = map(&mut wm, 10);
        let b = map(&mut wm, 11);

        wm.hide_window(a).unwrap();
        assert!(wm.clients[a].is_hidden);
        assert_eq!(wm.conn().state_of(10), Some(WmState::Iconic));
        assert_eq!(wm.monitors[0].tiled(&wm.clients), vec![b]);

        wm.show_window(a).unwrap();
        assert!(!wm.clients[a].is_hidden);
        assert_eq!(wm.conn().state_of(10), Some(WmState::Normal));
        assert_eq!(wm.monitors[0].tiled(&wm.clients).len(), 2);
    }

    #[test]
    fn missing_titles_read_as_broken() {
        let mut wm = plain_wm();
        let a = map(&mut wm, 10);
        assert_eq!(wm.clients[a].name, "broken");

        wm.conn().set_title(10, "editor");
        wm.update_title(a).unwrap();
        assert_eq!(wm.clients[a].name, "editor");
    }
}
