use super::{Control, WindowManager};
use crate::client::FakeFullscreen;
use crate::errors::WmResult;
use crate::keyboard::keysyms::Keysym;
use crate::keyboard::{ClickTarget, KeyAction, handle_button_press, handle_key_press};
use crate::signal::{self, FakeSignal};
use crate::tags::{REAL_TAG_MASK, tag_bit};
use crate::x::{
    ClientConfig, ClientMessage, ConfigureRequest, Property, StateAction, WmState, XConn, XEvent,
    Xid,
};
use tracing::{debug, trace};

const WHEEL_UP: u8 = 4;
const WHEEL_DOWN: u8 = 5;

impl<X: XConn> WindowManager<X> {
    /// Dispatch one event from the server.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn handle_event(&mut self, event: XEvent) -> WmResult<Control> {
        match event {
            XEvent::MapRequest { window } => self.map_request(window)?,
            XEvent::DestroyNotify { window } => {
                if let Some(key) = self.window_to_client(window) {
                    self.unmanage(key, true)?;
                } else if let Some(key) = self.swallowing_client(window) {
                    self.drop_swallowed(key)?;
                }
            }
            XEvent::UnmapNotify { window, synthetic } => {
                if let Some(key) = self.window_to_client(window) {
                    if synthetic {
                        self.conn.set_wm_state(window, WmState::Withdrawn)?;
                    } else {
                        self.unmanage(key, false)?;
                    }
                }
            }
            XEvent::ConfigureRequest(request) => self.configure_request(request)?,
            XEvent::ConfigureNotify {
                window,
                width,
                height,
            } => {
                if window == self.conn.root() {
                    self.root_resized(width, height)?;
                }
            }
            XEvent::PropertyNotify {
                window,
                property,
                deleted,
            } => return self.property_notify(window, property, deleted),
            XEvent::ClientMessage { window, message } => self.client_message(window, message)?,
            XEvent::ButtonPress {
                window,
                button,
                state,
                ..
            } => return self.button_press(window, button, state),
            XEvent::MotionNotify {
                window,
                root_x,
                root_y,
                ..
            } => {
                if window == self.conn.root() {
                    self.root_motion(root_x, root_y)?;
                }
            }
            XEvent::EnterNotify { window, normal } => {
                if normal || window == self.conn.root() {
                    self.enter_window(window)?;
                }
            }
            XEvent::FocusIn { window } => self.focus_in(window)?,
            XEvent::KeyPress { keysym, state } => return self.key_press(keysym, state),
            XEvent::MappingNotify { keyboard } => {
                self.conn.refresh_keyboard_mapping()?;
                if keyboard {
                    self.conn.grab_keys(&self.config.keybindings)?;
                }
            }
            XEvent::ButtonRelease | XEvent::Expose { .. } | XEvent::Other => {}
        }

        Ok(Control::Continue)
    }

    fn map_request(&mut self, window: Xid) -> WmResult<()> {
        let Some(attributes) = self.conn.window_attributes(window)? else {
            return Ok(());
        };
        if attributes.override_redirect || self.window_to_client(window).is_some() {
            return Ok(());
        }
        self.manage(window)
    }

    /// Floating clients, and any client under a floating layout, get what they ask for
    /// within reason. Tiled clients are told where they are instead.
    fn configure_request(&mut self, request: ConfigureRequest) -> WmResult<()> {
        let Some(key) = self.window_to_client(request.window) else {
            trace!(window = request.window, "forwarding configure request");
            return self.conn.forward_configure_request(&request);
        };

        if let Some(border) = request.border_width {
            self.clients[key].border_width = border;
            return Ok(());
        }
        let arranges = self.monitors[self.selected_monitor].layout().arranges();
        if !self.clients[key].is_floating && arranges {
            return self.configure(key);
        }

        let client = &mut self.clients[key];
        let screen = self.monitors[client.monitor_index].screen;
        if let Some(x) = request.x {
            client.old_x_position = client.x_position;
            client.x_position = screen.x + x;
        }
        if let Some(y) = request.y {
            client.old_y_position = client.y_position;
            client.y_position = screen.y + y;
        }
        if let Some(width) = request.width {
            client.old_width = client.width;
            client.width = width;
        }
        if let Some(height) = request.height {
            client.old_height = client.height;
            client.height = height;
        }
        if client.is_floating {
            if client.x_position + client.width > screen.x + screen.w {
                client.x_position = screen.x + (screen.w / 2 - client.width_with_border() / 2);
            }
            if client.y_position + client.height > screen.y + screen.h {
                client.y_position = screen.y + (screen.h / 2 - client.height_with_border() / 2);
            }
        }
        let (window, geometry) = (client.window, client.geometry());

        if request.moves_only() {
            self.configure(key)?;
        }
        if self.is_visible(key) {
            self.conn.configure(window, &[ClientConfig::Position(geometry)])?;
        }
        Ok(())
    }

    fn property_notify(&mut self, window: Xid, property: Property, deleted: bool) -> WmResult<Control> {
        if window == self.conn.root() {
            if property == Property::Name {
                match self.fake_signal()? {
                    Some(control) => return Ok(control),
                    None => self.update_status()?,
                }
            }
            return Ok(Control::Continue);
        }
        if deleted {
            return Ok(Control::Continue);
        }
        let Some(key) = self.window_to_client(window) else {
            return Ok(Control::Continue);
        };

        match property {
            Property::TransientFor => self.update_transient(key)?,
            Property::NormalHints => self.clients[key].hints_valid = false,
            Property::Hints => self.update_wm_hints(key)?,
            Property::Name => self.update_title(key)?,
            Property::WindowType => self.update_window_type(key)?,
            Property::Other => {}
        }
        Ok(Control::Continue)
    }

    fn client_message(&mut self, window: Xid, message: ClientMessage) -> WmResult<()> {
        let Some(key) = self.window_to_client(window) else {
            return Ok(());
        };

        match message {
            ClientMessage::Fullscreen(action) => {
                let client = &mut self.clients[key];
                if client.fake_fullscreen == FakeFullscreen::Promoted && client.is_fullscreen {
                    client.fake_fullscreen = FakeFullscreen::Releasing;
                }
                let fullscreen = match action {
                    StateAction::Add => true,
                    StateAction::Remove => false,
                    StateAction::Toggle => !client.is_fullscreen,
                };
                self.set_fullscreen(key, fullscreen)
            }
            ClientMessage::ActivateWindow => {
                let client = &self.clients[key];
                let Some(lowest) = crate::tags::lowest_tag_number(client.tags & REAL_TAG_MASK)
                else {
                    return Ok(());
                };
                debug!(window, "activating client");
                self.selected_monitor = client.monitor_index;
                self.view(tag_bit(lowest - 1))?;
                self.focus(Some(key))?;
                self.restack(self.selected_monitor)
            }
            ClientMessage::Other => Ok(()),
        }
    }

    fn button_press(&mut self, window: Xid, button: u8, state: u16) -> WmResult<Control> {
        let wheel = button == WHEEL_UP || button == WHEEL_DOWN;
        let follows_click = self.config.focus_on_wheel || !wheel;

        let index = self.window_to_monitor(window)?;
        if index != self.selected_monitor && follows_click {
            if let Some(selected) = self.selected() {
                self.unfocus(selected, true)?;
            }
            self.selected_monitor = index;
            self.focus(None)?;
        }

        let target = match self.window_to_client(window) {
            Some(key) => {
                if follows_click {
                    self.focus(Some(key))?;
                }
                self.conn.replay_pointer()?;
                ClickTarget::ClientWindow
            }
            None => ClickTarget::RootWindow,
        };

        let actions: Vec<_> =
            handle_button_press(&self.config.buttons, target, button, state, self.numlock_mask)
                .map(|binding| (binding.func, binding.arg.clone()))
                .collect();
        self.run_actions(actions)
    }

    fn key_press(&mut self, keysym: Keysym, state: u16) -> WmResult<Control> {
        let actions: Vec<_> =
            handle_key_press(&self.config.keybindings, keysym, state, self.numlock_mask)
                .map(|binding| (binding.func, binding.arg.clone()))
                .collect();
        self.run_actions(actions)
    }

    fn run_actions(
        &mut self,
        actions: Vec<(KeyAction, crate::keyboard::Arg)>,
    ) -> WmResult<Control> {
        let mut control = Control::Continue;
        for (action, arg) in actions {
            if self.handle_key_action(action, &arg)? == Control::Quit {
                control = Control::Quit;
            }
        }
        Ok(control)
    }

    /// Read the root window name as status text. Fake signals are left alone.
    pub(crate) fn update_status(&mut self) -> WmResult<()> {
        match self.conn.root_name()? {
            Some(text) if text.starts_with(signal::PREFIX) => {}
            Some(text) => self.status_text = text,
            None => self.status_text = format!("flexwm-{}", env!("CARGO_PKG_VERSION")),
        }
        Ok(())
    }

    /// Run the actions a fake signal in the root window name asks for. `None` means the
    /// name is ordinary status text.
    fn fake_signal(&mut self) -> WmResult<Option<Control>> {
        let Some(text) = self.conn.root_name()? else {
            return Ok(None);
        };

        match signal::parse(&text) {
            None => Ok(None),
            Some(FakeSignal::Ignored) => {
                debug!(%text, "ignoring malformed fake signal");
                Ok(Some(Control::Continue))
            }
            Some(FakeSignal::Invoke { name, arg }) => match signal::matching_action(&name) {
                Some(action) => self.handle_key_action(action, &arg).map(Some),
                None => {
                    debug!(%name, "fake signal matches no action");
                    Ok(Some(Control::Continue))
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::keyboard::{Arg, ButtonBinding};
    use crate::layout::LayoutType;
    use crate::window_manager::test_support::*;
    use crate::x::WindowAttributes;
    use simple_test_case::test_case;
    use x11rb::protocol::xproto::KeyButMask;

    fn root_name_changed(wm: &mut TestWm, name: &str) -> Control {
        wm.conn().set_root_name(name);
        let root = wm.conn().root();
        wm.handle_event(XEvent::PropertyNotify {
            window: root,
            property: Property::Name,
            deleted: false,
        })
        .unwrap()
    }

    #[test]
    fn root_name_becomes_status_text() {
        let mut wm = plain_wm();
        assert!(wm.status_text.starts_with("flexwm-"));

        root_name_changed(&mut wm, "cpu 3%");

        assert_eq!(wm.status_text, "cpu 3%");
    }

    #[test]
    fn fake_signals_run_actions_without_touching_the_status() {
        let mut wm = plain_wm();
        root_name_changed(&mut wm, "idle");

        root_name_changed(&mut wm, "fsignal:setmfact f 0.25");

        assert!((wm.monitors[0].master_factor - 0.75).abs() < 1e-6);
        assert_eq!(wm.status_text, "idle");
    }

    #[test_case("fsignal:setlayout", LayoutType::Monocle; "bare name flips the layout")]
    #[test_case("fsignal:setlayout x 3", LayoutType::Tile; "unknown argument type is dropped")]
    #[test_case("fsignal:nosuchthing", LayoutType::Tile; "unknown name does nothing")]
    #[test]
    fn fake_signal_dispatch(name: &str, expected: LayoutType) {
        let mut wm = plain_wm();

        let control = root_name_changed(&mut wm, name);

        assert_eq!(control, Control::Continue);
        assert_eq!(wm.monitors[0].layout(), expected);
    }

    #[test]
    fn fake_zoom_promotes_the_selection_and_stays_there() {
        let mut wm = plain_wm();
        map(&mut wm, 10);
        let b = map(&mut wm, 11);
        wm.focus(Some(b)).unwrap();

        root_name_changed(&mut wm, "fsignal:zoom");

        assert_eq!(wm.monitors[0].clients[0], b);
    }

    #[test]
    fn fake_quit_stops_the_loop() {
        let mut wm = plain_wm();

        let control = root_name_changed(&mut wm, "fsignal:quit");

        assert_eq!(control, Control::Quit);
    }

    #[test]
    fn override_redirect_windows_are_not_managed() {
        let mut wm = plain_wm();
        let attributes = WindowAttributes {
            override_redirect: true,
            ..WindowAttributes::default()
        };
        wm.conn().add_existing(30, attributes);

        wm.handle_event(XEvent::MapRequest { window: 30 }).unwrap();

        assert_eq!(wm.window_to_client(30), None);
    }

    #[test]
    fn destroy_and_unmap_release_clients() {
        let mut wm = plain_wm();
        map(&mut wm, 10);
        map(&mut wm, 11);

        wm.handle_event(XEvent::DestroyNotify { window: 10 }).unwrap();
        wm.handle_event(XEvent::UnmapNotify { window: 11, synthetic: false })
            .unwrap();

        assert!(wm.clients.is_empty());
        assert_eq!(wm.conn().state_of(11), Some(WmState::Withdrawn));
    }

    #[test]
    fn synthetic_unmaps_only_withdraw() {
        let mut wm = plain_wm();
        let a = map(&mut wm, 10);

        wm.handle_event(XEvent::UnmapNotify { window: 10, synthetic: true })
            .unwrap();

        assert!(wm.clients.contains_key(a));
        assert_eq!(wm.conn().state_of(10), Some(WmState::Withdrawn));
    }

    #[test]
    fn tiled_clients_cannot_move_themselves() {
        let mut wm = plain_wm();
        let a = map(&mut wm, 10);
        let before = wm.clients[a].geometry();

        wm.handle_event(XEvent::ConfigureRequest(ConfigureRequest {
            window: 10,
            x: Some(50),
            width: Some(100),
            ..ConfigureRequest::default()
        }))
        .unwrap();

        assert_eq!(wm.clients[a].geometry(), before);
    }

    #[test]
    fn floating_clients_move_and_recentre_on_overflow() {
        let mut wm = plain_wm();
        let a = map(&mut wm, 10);
        wm.clients[a].is_floating = true;

        wm.handle_event(XEvent::ConfigureRequest(ConfigureRequest {
            window: 10,
            x: Some(50),
            y: Some(60),
            width: Some(200),
            height: Some(100),
            ..ConfigureRequest::default()
        }))
        .unwrap();
        assert_eq!(wm.clients[a].geometry(), Rect::new(50, 60, 200, 100));
        assert_eq!(wm.conn().last_position(10), Some(Rect::new(50, 60, 200, 100)));

        wm.handle_event(XEvent::ConfigureRequest(ConfigureRequest {
            window: 10,
            x: Some(1200),
            ..ConfigureRequest::default()
        }))
        .unwrap();
        assert_eq!(wm.clients[a].x_position, 540);
    }

    #[test]
    fn fullscreen_requests_follow_the_state_action() {
        let mut wm = plain_wm();
        let a = map(&mut wm, 10);
        let message = |action| XEvent::ClientMessage {
            window: 10,
            message: ClientMessage::Fullscreen(action),
        };

        wm.handle_event(message(StateAction::Toggle)).unwrap();
        assert!(wm.clients[a].is_fullscreen);
        assert_eq!(wm.conn().fullscreen_state(10), Some(true));

        wm.handle_event(message(StateAction::Add)).unwrap();
        assert!(wm.clients[a].is_fullscreen);

        wm.handle_event(message(StateAction::Remove)).unwrap();
        assert!(!wm.clients[a].is_fullscreen);
    }

    #[test]
    fn promoted_fake_fullscreen_falls_back_when_the_client_leaves() {
        let mut wm = plain_wm();
        let a = map(&mut wm, 10);
        wm.handle_key_action(KeyAction::ToggleFakeFullScreen, &Arg::None)
            .unwrap();
        wm.handle_key_action(KeyAction::ToggleFullScreen, &Arg::None)
            .unwrap();

        wm.handle_event(XEvent::ClientMessage {
            window: 10,
            message: ClientMessage::Fullscreen(StateAction::Remove),
        })
        .unwrap();

        assert_eq!(wm.clients[a].fake_fullscreen, FakeFullscreen::On);
    }

    #[test]
    fn activation_views_the_client_and_focuses_it() {
        let mut wm = plain_wm();
        let a = map(&mut wm, 10);
        wm.clients[a].tags = tag_bit(6);
        map(&mut wm, 11);

        wm.handle_event(XEvent::ClientMessage {
            window: 10,
            message: ClientMessage::ActivateWindow,
        })
        .unwrap();

        assert_eq!(wm.monitors[0].current_tagset(), tag_bit(6));
        assert_eq!(wm.selected(), Some(a));
    }

    #[test]
    fn urgency_hints_mark_unfocused_clients() {
        let mut wm = plain_wm();
        let a = map(&mut wm, 10);
        map(&mut wm, 11);
        let hints = crate::x::WmHints {
            urgent: true,
            ..Default::default()
        };
        wm.conn().set_wm_hints(10, hints);

        wm.handle_event(XEvent::PropertyNotify {
            window: 10,
            property: Property::Hints,
            deleted: false,
        })
        .unwrap();

        assert!(wm.clients[a].is_urgent);
    }

    #[test]
    fn title_changes_are_picked_up() {
        let mut wm = plain_wm();
        let a = map(&mut wm, 10);
        wm.conn().set_title(10, "vim");

        wm.handle_event(XEvent::PropertyNotify {
            window: 10,
            property: Property::Name,
            deleted: false,
        })
        .unwrap();

        assert_eq!(wm.clients[a].name, "vim");
    }

    #[test]
    fn clicks_focus_and_run_client_bindings() {
        let mut wm = wm_with(|config| {
            config.buttons = vec![ButtonBinding::new(
                ClickTarget::ClientWindow,
                vec![KeyButMask::MOD4],
                1,
                KeyAction::ToggleFloating,
                Arg::None,
            )];
        });
        let a = map(&mut wm, 10);
        map(&mut wm, 11);

        wm.handle_event(XEvent::ButtonPress {
            window: 10,
            root_x: 5,
            root_y: 5,
            button: 1,
            state: u16::from(KeyButMask::MOD4),
        })
        .unwrap();

        assert_eq!(wm.selected(), Some(a));
        assert!(wm.clients[a].is_floating);
    }

    #[test_case(false, 0; "wheel leaves focus alone")]
    #[test_case(true, 1; "wheel focuses when asked")]
    #[test]
    fn wheel_focus(focus_on_wheel: bool, expected: usize) {
        let mut wm = wm_with(|config| config.focus_on_wheel = focus_on_wheel);
        let keys = [map(&mut wm, 10), map(&mut wm, 11)];
        wm.focus(Some(keys[0])).unwrap();

        wm.handle_event(XEvent::ButtonPress {
            window: 11,
            root_x: 700,
            root_y: 5,
            button: WHEEL_UP,
            state: 0,
        })
        .unwrap();

        assert_eq!(wm.selected(), Some(keys[expected]));
    }

    #[test]
    fn key_presses_run_bound_actions() {
        let mut wm = plain_wm();
        let modkey = u16::from(KeyButMask::MOD4);
        let keysym = wm
            .config
            .keybindings
            .iter()
            .find(|binding| binding.func == KeyAction::Quit)
            .map(|binding| (binding.keysym, binding.modifier_mask()));
        let Some((keysym, state)) = keysym else {
            panic!("default bindings should include quit");
        };
        assert_ne!(state & modkey, 0);

        let control = wm.handle_event(XEvent::KeyPress { keysym, state }).unwrap();

        assert_eq!(control, Control::Quit);
    }

    #[test]
    fn root_resizes_reshape_the_monitor() {
        let mut wm = plain_wm();
        wm.conn().set_screens(vec![Rect::new(0, 0, 1920, 1080)]);
        let root = wm.conn().root();

        wm.handle_event(XEvent::ConfigureNotify {
            window: root,
            width: 1920,
            height: 1080,
        })
        .unwrap();

        assert_eq!(wm.monitors[0].screen, Rect::new(0, 0, 1920, 1080));
    }
}
