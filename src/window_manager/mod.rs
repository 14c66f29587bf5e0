//! The orchestrator: owns the client registry and the monitors, and turns X events and
//! bound actions into model changes and display server requests.
mod actions;
mod arrange;
mod events;
mod focus;
mod manage;
mod monitors;
mod mouse;
mod moveresize;
#[cfg(test)]
mod test_support;

use crate::Config;
use crate::client::{Client, ClientArena, ClientKey};
use crate::errors::WmResult;
use crate::monitor::Monitor;
use crate::util;
use crate::x::{XConn, XEvent, Xid};
use std::collections::VecDeque;
use tracing::{error, info, warn};

/// Whether the event loop should keep going after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

pub struct WindowManager<X: XConn> {
    conn: X,
    pub config: Config,
    pub clients: ClientArena,
    pub monitors: Vec<Monitor>,
    pub selected_monitor: usize,
    /// Size of the whole X screen, spanning every monitor.
    screen_size: (i32, i32),
    numlock_mask: u16,
    /// Root window name when it is not a fake signal, for an external bar to show.
    pub status_text: String,
    running: bool,
    exit_code: i32,
    /// Monitor the pointer was last seen on while moving over the root window.
    motion_monitor: Option<usize>,
    /// Events that arrived during a drag and wait for the main loop.
    deferred: VecDeque<XEvent>,
}

impl<X: XConn> WindowManager<X> {
    pub fn new(conn: X, config: Config) -> WmResult<Self> {
        let mut wm = Self {
            conn,
            config,
            clients: ClientArena::with_key(),
            monitors: Vec::new(),
            selected_monitor: 0,
            screen_size: (0, 0),
            numlock_mask: 0,
            status_text: String::new(),
            running: true,
            exit_code: 0,
            motion_monitor: None,
            deferred: VecDeque::new(),
        };

        wm.update_geometry()?;
        wm.numlock_mask = wm.conn.numlock_mask()?;
        wm.conn.grab_keys(&wm.config.keybindings)?;
        wm.update_status()?;
        wm.focus(None)?;
        wm.conn.flush()?;

        Ok(wm)
    }

    pub fn conn(&self) -> &X {
        &self.conn
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Adopt existing windows, start the autostart commands and dispatch events until a
    /// quit action. Returns the exit code that action asked for.
    pub fn run(&mut self) -> WmResult<i32> {
        self.scan()?;
        for command in &self.config.autostart {
            util::spawn_shell(command);
        }
        info!(monitors = self.monitors.len(), "flexwm running");

        while self.running {
            let event = match self.deferred.pop_front() {
                Some(event) => event,
                None => self.conn.next_event()?,
            };

            match self.handle_event(event) {
                Ok(Control::Quit) => break,
                Ok(Control::Continue) => {}
                Err(e) if e.is_fatal() => {
                    error!(error = %e, "fatal error in event loop");
                    return Err(e);
                }
                Err(e) => warn!(error = %e, "error handling event"),
            }
            self.conn.flush()?;
        }

        self.kill_scratchpads()?;
        self.cleanup()?;
        Ok(self.exit_code)
    }

    /// Release every client so the windows survive the window manager going away.
    fn cleanup(&mut self) -> WmResult<()> {
        self.view(crate::tags::ALL_TAGS)?;
        let selected = self.selected_monitor;
        let monitor = &mut self.monitors[selected];
        let slot = monitor.selected_layout;
        monitor.layouts[slot] = crate::layout::LayoutType::Float;

        for client in self.clients.values_mut() {
            client.switch_tag = 0;
        }
        for index in 0..self.monitors.len() {
            while let Some(&key) = self.monitors[index].stack.first() {
                self.unmanage(key, false)?;
            }
        }

        self.conn.focus_root()?;
        self.conn.flush()
    }

    pub(crate) fn selected(&self) -> Option<ClientKey> {
        self.monitors[self.selected_monitor].selected
    }

    pub(crate) fn selected_client(&self) -> Option<&Client> {
        self.selected().and_then(|key| self.clients.get(key))
    }

    pub(crate) fn window_to_client(&self, window: Xid) -> Option<ClientKey> {
        self.clients
            .iter()
            .find(|(_, client)| client.window == window)
            .map(|(key, _)| key)
    }

    /// The terminal whose record holds the swallowed client owning `window`.
    pub(crate) fn swallowing_client(&self, window: Xid) -> Option<ClientKey> {
        self.clients
            .iter()
            .find(|(_, client)| {
                client
                    .swallowing
                    .as_ref()
                    .is_some_and(|swallowed| swallowed.window == window)
            })
            .map(|(key, _)| key)
    }

    pub(crate) fn is_visible(&self, key: ClientKey) -> bool {
        self.clients
            .get(key)
            .is_some_and(|client| self.monitors[client.monitor_index].is_visible(client))
    }

    /// The selection, unless it is fullscreen for real: most operations leave those alone.
    pub(crate) fn selected_unless_fullscreen(&self) -> Option<ClientKey> {
        let key = self.selected()?;
        let client = self.clients.get(key)?;
        let real_fullscreen = client.is_fullscreen
            && client.fake_fullscreen != crate::client::FakeFullscreen::On;
        (!real_fullscreen).then_some(key)
    }
}
