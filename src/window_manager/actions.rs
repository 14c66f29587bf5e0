use super::{Control, WindowManager};
use crate::EXIT_POWEROFF;
use crate::EXIT_REBOOT;
use crate::EXIT_RESTART;
use crate::attach::AttachMode;
use crate::client::{ClientKey, FakeFullscreen};
use crate::errors::WmResult;
use crate::keyboard::{Arg, KeyAction};
use crate::layout::{GapConfig, LayoutType};
use crate::tags::{REAL_TAG_MASK, SCRATCHPAD_COUNT, SCRATCHPAD_MASK, TAG_COUNT, TAG_MASK, TagMask, scratchpad_tag};
use crate::util;
use crate::x::{ClientConfig, Protocol, XConn, Xid};
use tracing::{debug, info, warn};

const MIN_MASTER_FACTOR: f32 = 0.05;
const MAX_MASTER_FACTOR: f32 = 0.95;

impl<X: XConn> WindowManager<X> {
    /// Run one bound operation. Every key, button and fake signal ends up here.
    pub(crate) fn handle_key_action(&mut self, action: KeyAction, arg: &Arg) -> WmResult<Control> {
        debug!(?action, ?arg, "running action");

        match action {
            KeyAction::Spawn => self.spawn(arg),
            KeyAction::KillClient => self.kill_client()?,
            KeyAction::FocusStack => self.focus_stack(arg.as_int(), false)?,
            KeyAction::FocusStackHidden => self.focus_stack(arg.as_int(), true)?,
            KeyAction::FocusDirection => self.focus_direction(arg.as_int())?,
            KeyAction::FocusMonitor => self.focus_monitor(arg.as_int())?,
            KeyAction::TagMonitor => self.tag_monitor(arg.as_int())?,
            KeyAction::PushClient => self.push_client(arg.as_int())?,
            KeyAction::InplaceRotate => self.inplace_rotate(arg.as_int())?,
            KeyAction::MoveResize => self.move_resize(arg.as_str().unwrap_or_default())?,
            KeyAction::MoveResizeEdge => {
                self.move_resize_edge(arg.as_str().unwrap_or_default())?
            }
            KeyAction::AspectResize => self.aspect_resize(arg.as_int())?,
            KeyAction::IncNumMaster => self.inc_num_master(arg.as_int())?,
            KeyAction::SetMasterFactor => self.set_master_factor(arg.as_float())?,
            KeyAction::SetClientFactor => self.set_client_factor(arg.as_float())?,
            KeyAction::Zoom => self.zoom()?,
            KeyAction::ZoomSwap => self.zoom_swap()?,
            KeyAction::IncGaps => self.adjust_gaps(GapConfig::uniform(arg.as_int()))?,
            KeyAction::IncInnerGaps => self.adjust_gaps(GapConfig {
                inner_horizontal: arg.as_int(),
                inner_vertical: arg.as_int(),
                ..GapConfig::default()
            })?,
            KeyAction::IncOuterGaps => self.adjust_gaps(GapConfig {
                outer_horizontal: arg.as_int(),
                outer_vertical: arg.as_int(),
                ..GapConfig::default()
            })?,
            KeyAction::IncInnerHorizontalGaps => self.adjust_gaps(GapConfig {
                inner_horizontal: arg.as_int(),
                ..GapConfig::default()
            })?,
            KeyAction::IncInnerVerticalGaps => self.adjust_gaps(GapConfig {
                inner_vertical: arg.as_int(),
                ..GapConfig::default()
            })?,
            KeyAction::IncOuterHorizontalGaps => self.adjust_gaps(GapConfig {
                outer_horizontal: arg.as_int(),
                ..GapConfig::default()
            })?,
            KeyAction::IncOuterVerticalGaps => self.adjust_gaps(GapConfig {
                outer_vertical: arg.as_int(),
                ..GapConfig::default()
            })?,
            KeyAction::ToggleGaps => self.toggle_gaps()?,
            KeyAction::DefaultGaps => self.default_gaps()?,
            KeyAction::View => self.view(arg.as_uint())?,
            KeyAction::ToggleView => self.toggle_view(arg.as_uint())?,
            KeyAction::Tag => self.tag(arg.as_uint())?,
            KeyAction::ToggleTag => self.toggle_tag(arg.as_uint())?,
            KeyAction::ShiftViewClients => self.shift_view_clients(arg.as_int())?,
            KeyAction::CycleLayout => {
                let next = self.monitors[self.selected_monitor].layout().cycle(arg.as_int());
                self.set_layout(Some(next))?
            }
            KeyAction::SetLayout => self.set_layout(match arg {
                Arg::Layout(layout) => Some(*layout),
                _ => None,
            })?,
            KeyAction::SetAttach => self.set_attach(match arg {
                Arg::Attach(mode) => Some(*mode),
                _ => None,
            }),
            KeyAction::CycleAttach => {
                let monitor = &self.monitors[self.selected_monitor];
                let next = monitor.attach_mode().cycle(arg.as_int());
                self.set_attach(Some(next))
            }
            KeyAction::ToggleFloating => self.toggle_floating(arg.as_int() == 1)?,
            KeyAction::ToggleSticky => self.toggle_sticky()?,
            KeyAction::ToggleFullScreen => self.toggle_fullscreen()?,
            KeyAction::ToggleFakeFullScreen => self.toggle_fake_fullscreen()?,
            KeyAction::ToggleBar => self.toggle_bar()?,
            KeyAction::Hide => self.hide()?,
            KeyAction::Show => self.show()?,
            KeyAction::ShowAll => self.show_all()?,
            KeyAction::ToggleWindow => self.toggle_window(arg)?,
            KeyAction::ToggleScratch => self.toggle_scratch(arg.as_uint() as usize)?,
            KeyAction::Quit => return self.quit(arg.as_int()),
            KeyAction::Restart => return self.quit(EXIT_RESTART),
            KeyAction::Poweroff => return self.quit(EXIT_POWEROFF),
            KeyAction::Reboot => return self.quit(EXIT_REBOOT),
            KeyAction::MoveMouse => self.move_mouse()?,
            KeyAction::ResizeMouse => self.resize_mouse()?,
            KeyAction::DragMasterFactor => self.drag_master_factor()?,
            KeyAction::DragClientFactor => self.drag_client_factor()?,
            KeyAction::None => {}
        }

        Ok(Control::Continue)
    }

    fn spawn(&self, arg: &Arg) {
        match arg {
            Arg::Array(argv) => {
                if let Err(error) = util::spawn(argv) {
                    warn!(?argv, %error, "failed to spawn");
                }
            }
            Arg::Str(command) => util::spawn_shell(command),
            _ => warn!(?arg, "spawn needs a command"),
        }
    }

    /// Stop the event loop with `code`. Hidden clients are shown first so they are not
    /// lost to the next window manager.
    pub(crate) fn quit(&mut self, code: i32) -> WmResult<Control> {
        let hidden: Vec<ClientKey> = self
            .clients
            .iter()
            .filter(|(_, client)| client.is_hidden)
            .map(|(key, _)| key)
            .collect();
        for key in hidden {
            self.show_window(key)?;
        }

        info!(code, "quitting");
        self.exit_code = code;
        self.running = false;
        Ok(Control::Quit)
    }

    /// Ask a window to close with `WM_DELETE_WINDOW`, killing its client when it does not
    /// speak the protocol.
    fn close_window(&self, window: Xid) -> WmResult<()> {
        if !self.conn.send_protocol(window, Protocol::DeleteWindow)? {
            debug!(window, "client ignores WM_DELETE_WINDOW, killing it");
            self.conn.kill(window)?;
        }
        Ok(())
    }

    pub(crate) fn kill_client(&mut self) -> WmResult<()> {
        match self.selected_client() {
            Some(client) => self.close_window(client.window),
            None => Ok(()),
        }
    }

    /// Close every scratchpad client on the way out, unless restarting.
    pub(crate) fn kill_scratchpads(&mut self) -> WmResult<()> {
        if self.exit_code == EXIT_RESTART {
            return Ok(());
        }

        let windows: Vec<Xid> = self
            .monitors
            .iter()
            .flat_map(|monitor| monitor.clients.iter())
            .filter_map(|key| self.clients.get(*key))
            .filter(|client| client.tags & SCRATCHPAD_MASK != 0)
            .map(|client| client.window)
            .collect();
        for window in windows {
            self.conn.unmap(window)?;
            self.close_window(window)?;
        }
        Ok(())
    }

    pub(crate) fn view(&mut self, mask: TagMask) -> WmResult<()> {
        let index = self.selected_monitor;
        if self.monitors[index].view(mask) {
            self.focus(None)?;
            self.arrange(Some(index))?;
        }
        Ok(())
    }

    pub(crate) fn toggle_view(&mut self, mask: TagMask) -> WmResult<()> {
        let index = self.selected_monitor;
        let monitor = &mut self.monitors[index];
        monitor.regroup_tiled(&self.clients);
        if monitor.toggle_view(mask) {
            self.focus(None)?;
            self.arrange(Some(index))?;
        }
        Ok(())
    }

    pub(crate) fn tag(&mut self, mask: TagMask) -> WmResult<()> {
        let Some(key) = self.selected() else {
            return Ok(());
        };
        if mask & TAG_MASK == 0 {
            return Ok(());
        }

        let client = &mut self.clients[key];
        client.tags = mask & TAG_MASK;
        client.switch_tag = 0;
        self.focus(None)?;
        self.arrange(Some(self.selected_monitor))
    }

    pub(crate) fn toggle_tag(&mut self, mask: TagMask) -> WmResult<()> {
        let Some(key) = self.selected() else {
            return Ok(());
        };

        let tags = self.clients[key].tags ^ (mask & TAG_MASK);
        if tags != 0 {
            self.clients[key].tags = tags;
            self.focus(None)?;
            self.arrange(Some(self.selected_monitor))?;
        }
        Ok(())
    }

    /// Rotate the view `step` tags along, skipping tags without clients. Scratchpad bits
    /// never take part.
    pub(crate) fn shift_view_clients(&mut self, step: i32) -> WmResult<()> {
        let monitor = &self.monitors[self.selected_monitor];
        let occupied = monitor
            .clients
            .iter()
            .filter_map(|key| self.clients.get(*key))
            .filter(|client| client.tags & SCRATCHPAD_MASK == 0)
            .fold(0, |mask, client| mask | client.tags);

        let mut shifted = monitor.current_tagset() & REAL_TAG_MASK;
        if shifted == 0 {
            return Ok(());
        }
        let count = TAG_COUNT as u32;
        let left = step.rem_euclid(TAG_COUNT as i32) as u32;
        for _ in 0..TAG_COUNT {
            shifted = ((shifted << left) | (shifted >> (count - left))) & REAL_TAG_MASK;
            if occupied == 0 || shifted & occupied != 0 {
                break;
            }
        }
        self.view(shifted)
    }

    /// The first tiled client after `key` in insertion order, or the first tiled client
    /// when `key` is absent.
    fn next_tiled(&self, index: usize, key: Option<ClientKey>, with_hidden: bool) -> Option<ClientKey> {
        let monitor = &self.monitors[index];
        let start = match key {
            Some(key) => monitor.clients.iter().position(|k| *k == key)? + 1,
            None => 0,
        };
        monitor.clients[start..].iter().copied().find(|k| {
            self.clients.get(*k).is_some_and(|c| {
                !c.is_floating && monitor.is_visible(c) && (with_hidden || !c.is_hidden)
            })
        })
    }

    fn selected_tiled_in_arranged_layout(&self) -> Option<ClientKey> {
        let monitor = &self.monitors[self.selected_monitor];
        let key = monitor.selected?;
        let tiled = !self.clients.get(key)?.is_floating;
        (tiled && monitor.layout().arranges()).then_some(key)
    }

    fn pop(&mut self, key: ClientKey) -> WmResult<()> {
        let index = self.clients[key].monitor_index;
        self.monitors[index].detach(key);
        self.monitors[index].attach_top(key);
        self.focus(Some(key))?;
        self.arrange(Some(index))
    }

    /// Move the selection to the master area. The master itself trades places with the
    /// next tiled client.
    pub(crate) fn zoom(&mut self) -> WmResult<()> {
        let Some(mut key) = self.selected_tiled_in_arranged_layout() else {
            return Ok(());
        };
        let index = self.selected_monitor;

        if self.next_tiled(index, None, false) == Some(key) {
            match self.next_tiled(index, Some(key), false) {
                Some(next) => key = next,
                None => return Ok(()),
            }
        }
        self.pop(key)?;

        let previous = self.next_tiled(index, Some(key), false);
        self.monitors[index].set_previous_zoom(previous);
        Ok(())
    }

    /// Swap the selection with the master. From the master, swap back with whatever was
    /// last zoomed out of the way.
    pub(crate) fn zoom_swap(&mut self) -> WmResult<()> {
        let Some(selected) = self.selected_tiled_in_arranged_layout() else {
            return Ok(());
        };
        let index = self.selected_monitor;
        let first = self.next_tiled(index, None, false);

        let (master, other) = if first == Some(selected) {
            let monitor = &self.monitors[index];
            let after: Vec<ClientKey> = monitor
                .tiled_with_hidden(&self.clients)
                .into_iter()
                .skip_while(|k| *k != selected)
                .collect();
            let previous = monitor
                .previous_zoom()
                .filter(|p| *p != selected && after.contains(p));
            (
                Some(selected),
                previous.or_else(|| self.next_tiled(index, Some(selected), false)),
            )
        } else {
            (first, Some(selected))
        };

        let (Some(master), Some(other)) = (master, other) else {
            return Ok(());
        };
        if self.monitors[index].swap(master, other) {
            self.focus(Some(other))?;
            if self.clients[other].is_hidden {
                self.show_window(other)?;
            } else {
                self.arrange(Some(index))?;
            }
            self.monitors[index].set_previous_zoom(Some(master));
        }
        Ok(())
    }

    /// Swap the selection with its tiled neighbour, wrapping at either end.
    pub(crate) fn push_client(&mut self, direction: i32) -> WmResult<()> {
        let Some(selected) = self.selected_tiled_in_arranged_layout() else {
            return Ok(());
        };
        if self.selected_unless_fullscreen().is_none() {
            return Ok(());
        }
        let index = self.selected_monitor;
        let tiled = self.monitors[index].tiled(&self.clients);

        let target = if direction > 0 {
            self.next_tiled(index, Some(selected), false)
                .or_else(|| tiled.first().copied())
        } else {
            match tiled.iter().position(|k| *k == selected) {
                Some(position) if position > 0 => Some(tiled[position - 1]),
                _ => tiled.last().copied(),
            }
        };

        if let Some(target) = target
            && self.monitors[index].swap(selected, target)
        {
            self.arrange(Some(index))?;
        }
        Ok(())
    }

    /// Rotate the clients of the selection's group (masters or stack) one place, or all
    /// tiled clients for ±2, keeping focus on the same slot.
    pub(crate) fn inplace_rotate(&mut self, direction: i32) -> WmResult<()> {
        let Some(selected) = self.selected_tiled_in_arranged_layout() else {
            return Ok(());
        };
        let index = self.selected_monitor;
        self.monitors[index].hidden_selection = false;

        let monitor = &self.monitors[index];
        let tiled = monitor.tiled(&self.clients);
        let num_master = monitor.num_master;
        let deck = monitor.layout() == LayoutType::Deck;
        let selected_slot = tiled.iter().position(|k| *k == selected).unwrap_or(0);
        let deck_slot = deck
            .then(|| {
                monitor.stack.iter().find_map(|key| {
                    tiled.iter().position(|k| k == key).filter(|slot| *slot >= num_master)
                })
            })
            .flatten();

        let group = if direction.abs() == 2 || num_master == 0 {
            0..tiled.len()
        } else if selected_slot < num_master && num_master > 1 {
            0..num_master.min(tiled.len())
        } else {
            num_master.min(tiled.len())..tiled.len()
        };
        self.rotate_group(index, &tiled[group], direction);

        let tiled = self.monitors[index].tiled(&self.clients);
        if deck
            && num_master == 1
            && selected_slot == 0
            && let Some(deck_slot) = deck_slot
            && deck_slot != selected_slot
            && let Some(&top) = tiled.get(deck_slot)
        {
            let monitor = &mut self.monitors[index];
            let keep = monitor.selected;
            monitor.detach_stack(&self.clients, top);
            monitor.attach_stack(top);
            monitor.selected = keep;
        }

        self.focus(tiled.get(selected_slot).copied())?;
        self.arrange(Some(index))
    }

    /// Shift `group` one place through the insertion-order slots it occupies: towards the
    /// front for a negative direction, towards the back otherwise.
    fn rotate_group(&mut self, index: usize, group: &[ClientKey], direction: i32) {
        if group.len() < 2 {
            return;
        }
        let monitor = &mut self.monitors[index];
        let slots: Vec<usize> = group
            .iter()
            .filter_map(|key| monitor.clients.iter().position(|k| k == key))
            .collect();
        let mut keys = group.to_vec();
        if direction < 0 {
            keys.rotate_left(1);
        } else {
            keys.rotate_right(1);
        }
        for (slot, key) in slots.into_iter().zip(keys) {
            monitor.clients[slot] = key;
        }
    }

    pub(crate) fn tag_monitor(&mut self, direction: i32) -> WmResult<()> {
        let Some(key) = self.selected() else {
            return Ok(());
        };
        if self.monitors.len() < 2 {
            return Ok(());
        }
        let target = self.dir_to_monitor(direction);

        if !self.clients[key].is_fullscreen {
            return self.send_to_monitor(key, target);
        }
        self.clients[key].is_fullscreen = false;
        self.send_to_monitor(key, target)?;
        self.clients[key].is_fullscreen = true;
        if self.clients[key].fake_fullscreen != FakeFullscreen::On {
            let screen = self.monitors[target].screen;
            self.resize_client(key, screen)?;
            self.conn
                .configure(self.clients[key].window, &[ClientConfig::StackTop])?;
        }
        Ok(())
    }

    pub(crate) fn set_layout(&mut self, layout: Option<LayoutType>) -> WmResult<()> {
        let index = self.selected_monitor;
        self.monitors[index].set_layout(layout);
        debug!(layout = self.monitors[index].layout().as_str(), "layout set");

        if let Some(key) = self.selected() {
            self.set_border_color(key)?;
            self.arrange(Some(index))?;
        }
        Ok(())
    }

    fn set_attach(&mut self, mode: Option<AttachMode>) {
        let monitor = &mut self.monitors[self.selected_monitor];
        monitor.set_attach(mode);
        debug!(attach = monitor.attach_mode().as_str(), "attach mode set");
    }

    pub(crate) fn inc_num_master(&mut self, delta: i32) -> WmResult<()> {
        let index = self.selected_monitor;
        let monitor = &mut self.monitors[index];
        let num_master = (monitor.num_master as i32 + delta).max(0) as usize;
        monitor.set_num_master(num_master);
        self.arrange(Some(index))
    }

    /// Values below 1.0 are deltas, larger ones set the factor to `factor - 1.0`. A result
    /// outside the allowed range leaves the factor alone.
    pub(crate) fn set_master_factor(&mut self, factor: f32) -> WmResult<()> {
        let index = self.selected_monitor;
        let monitor = &mut self.monitors[index];
        if !monitor.layout().arranges() {
            return Ok(());
        }

        let next = if factor < 1.0 {
            factor + monitor.master_factor
        } else {
            factor - 1.0
        };
        if !(MIN_MASTER_FACTOR..=MAX_MASTER_FACTOR).contains(&next) {
            return Ok(());
        }
        monitor.set_master_factor(next);
        self.arrange(Some(index))
    }

    pub(crate) fn set_client_factor(&mut self, factor: f32) -> WmResult<()> {
        let index = self.selected_monitor;
        let Some(key) = self.selected() else {
            return Ok(());
        };
        if !self.monitors[index].layout().arranges() {
            return Ok(());
        }
        self.clients[key].adjust_client_factor(factor);
        self.arrange(Some(index))
    }

    fn adjust_gaps(&mut self, delta: GapConfig) -> WmResult<()> {
        let index = self.selected_monitor;
        let monitor = &mut self.monitors[index];
        monitor.set_gaps(monitor.gaps.adjusted(delta));
        self.arrange(Some(index))
    }

    fn toggle_gaps(&mut self) -> WmResult<()> {
        let index = self.selected_monitor;
        self.monitors[index].toggle_gaps();
        self.arrange(Some(index))
    }

    fn default_gaps(&mut self) -> WmResult<()> {
        let index = self.selected_monitor;
        self.monitors[index].set_gaps(self.config.gaps);
        self.arrange(Some(index))
    }

    /// Float or tile the selection. A client floated again with `restore_saved` gets the
    /// geometry it had when it was last tiled.
    pub(crate) fn toggle_floating(&mut self, restore_saved: bool) -> WmResult<()> {
        let Some(key) = self.selected_unless_fullscreen() else {
            return Ok(());
        };
        let index = self.selected_monitor;
        let work_area = self.monitors[index].work_area;

        let client = &mut self.clients[key];
        client.is_floating = !client.is_floating || client.is_fixed;
        if client.is_floating {
            match client.saved_float_geometry.filter(|_| restore_saved) {
                Some(saved) => self.resize(key, saved, false)?,
                None => {
                    let mut rect = client.geometry();
                    let border = client.border_width;
                    if rect.w > work_area.w - 2 * border {
                        rect.w = work_area.w - 2 * border;
                        rect.x = work_area.x;
                    }
                    if rect.h > work_area.h - 2 * border {
                        rect.h = work_area.h - 2 * border;
                        rect.y = work_area.y;
                    }
                    self.resize(key, rect, false)?;
                }
            }
        } else {
            client.save_float_geometry();
        }

        self.set_border_color(key)?;
        self.arrange(Some(index))
    }

    pub(crate) fn toggle_fullscreen(&mut self) -> WmResult<()> {
        let Some(key) = self.selected() else {
            return Ok(());
        };
        let client = &mut self.clients[key];
        if client.fake_fullscreen == FakeFullscreen::On {
            client.fake_fullscreen = FakeFullscreen::Promoted;
            self.set_fullscreen(key, true)
        } else {
            let fullscreen = !client.is_fullscreen;
            self.set_fullscreen(key, fullscreen)
        }
    }

    pub(crate) fn toggle_fake_fullscreen(&mut self) -> WmResult<()> {
        let Some(key) = self.selected() else {
            return Ok(());
        };
        let client = &mut self.clients[key];
        if client.fake_fullscreen != FakeFullscreen::On && client.is_fullscreen {
            client.fake_fullscreen = FakeFullscreen::Promoted;
            self.set_fullscreen(key, false)
        } else if client.fake_fullscreen == FakeFullscreen::On {
            self.set_fullscreen(key, false)?;
            self.clients[key].fake_fullscreen = FakeFullscreen::Off;
            Ok(())
        } else {
            client.fake_fullscreen = FakeFullscreen::On;
            self.set_fullscreen(key, true)
        }
    }

    pub(crate) fn toggle_sticky(&mut self) -> WmResult<()> {
        let Some(key) = self.selected() else {
            return Ok(());
        };
        self.clients[key].is_sticky = !self.clients[key].is_sticky;
        self.focus(None)?;
        self.arrange(Some(self.selected_monitor))
    }

    pub(crate) fn toggle_bar(&mut self) -> WmResult<()> {
        let index = self.selected_monitor;
        self.monitors[index].toggle_bar();
        self.arrange(Some(index))
    }

    fn hide(&mut self) -> WmResult<()> {
        if let Some(key) = self.selected() {
            self.hide_window(key)?;
        }
        self.focus(None)?;
        self.arrange(Some(self.selected_monitor))
    }

    fn show(&mut self) -> WmResult<()> {
        let monitor = &mut self.monitors[self.selected_monitor];
        monitor.hidden_selection = false;
        let selected = monitor.selected;
        match selected {
            Some(key) => self.show_window(key),
            None => Ok(()),
        }
    }

    fn show_all(&mut self) -> WmResult<()> {
        let index = self.selected_monitor;
        self.monitors[index].hidden_selection = false;
        let hidden: Vec<ClientKey> = self.monitors[index]
            .clients
            .iter()
            .copied()
            .filter(|key| self.clients.get(*key).is_some_and(|c| c.is_hidden))
            .collect();
        for key in hidden {
            self.show_window(key)?;
        }
        if self.selected().is_none() {
            self.focus(None)?;
        }
        Ok(())
    }

    /// Hide the client when it is the selection, otherwise show and focus it. An unsigned
    /// argument names the window, anything else means the selection.
    fn toggle_window(&mut self, arg: &Arg) -> WmResult<()> {
        let target = match arg {
            Arg::UInt(window) => self.window_to_client(*window),
            _ => self.selected(),
        };
        let Some(key) = target else {
            return Ok(());
        };

        if Some(key) == self.selected() {
            self.hide_window(key)?;
            self.focus(None)?;
            self.arrange(Some(self.clients[key].monitor_index))
        } else {
            if self.clients[key].is_hidden {
                self.show_window(key)?;
            }
            self.focus(Some(key))?;
            self.restack(self.selected_monitor)
        }
    }

    /// Bring scratchpad `index` into view or send it away, spawning it the first time.
    pub(crate) fn toggle_scratch(&mut self, index: usize) -> WmResult<()> {
        if index >= SCRATCHPAD_COUNT {
            return Ok(());
        }
        let Some(command) = self.config.scratchpads.get(index).map(|pad| pad.command.clone())
        else {
            return Ok(());
        };

        let bit = scratchpad_tag(index);
        let monitor_index = self.selected_monitor;
        let monitor = &self.monitors[monitor_index];
        let found = monitor
            .clients
            .iter()
            .copied()
            .find(|key| self.clients.get(*key).is_some_and(|c| c.tags & bit != 0));

        match found {
            Some(key) => {
                let monitor = &mut self.monitors[monitor_index];
                let tagset = monitor.current_tagset() ^ bit;
                if tagset != 0 {
                    let slot = monitor.selected_tags;
                    monitor.tagset[slot] = tagset;
                    self.focus(None)?;
                    self.arrange(Some(monitor_index))?;
                }
                if self.is_visible(key) {
                    self.focus(Some(key))?;
                    self.restack(monitor_index)?;
                }
            }
            None => {
                let monitor = &mut self.monitors[monitor_index];
                let slot = monitor.selected_tags;
                monitor.tagset[slot] |= bit;
                self.spawn(&Arg::Array(command));
            }
        }
        Ok(())
    }
}
