use crate::Config;
use crate::attach::{self, AttachMode};
use crate::client::{Client, ClientArena, ClientKey};
use crate::geometry::Rect;
use crate::layout::{GapConfig, LayoutType};
use crate::pertag::{Pertag, TagSettings};
use crate::tags::{TAG_MASK, TagMask};

/// One screen and the clients assigned to it.
///
/// `clients` is insertion order, which the layouts read front to back with the masters
/// first. `stack` is focus order with the most recently focused client at the front.
#[derive(Debug, Clone)]
pub struct Monitor {
    pub number: usize,
    pub screen: Rect,
    pub work_area: Rect,
    pub bar_y: i32,
    pub bar_height: i32,
    pub show_bar: bool,
    pub top_bar: bool,
    pub master_factor: f32,
    pub num_master: usize,
    pub gaps_enabled: bool,
    pub gaps: GapConfig,
    pub selected_layout: usize,
    pub layouts: [LayoutType; 2],
    pub selected_attach: usize,
    pub attach_modes: [AttachMode; 2],
    pub selected_tags: usize,
    pub tagset: [TagMask; 2],
    pub selected: Option<ClientKey>,
    /// The selection is hidden but keeps focus, set when cycling onto hidden clients.
    pub hidden_selection: bool,
    pub clients: Vec<ClientKey>,
    pub stack: Vec<ClientKey>,
    pub pertag: Pertag,
    pub layout_symbol: String,
}

impl Monitor {
    pub fn new(number: usize, screen: Rect, config: &Config) -> Self {
        let defaults = TagSettings {
            num_master: config.num_master,
            master_factor: config.master_factor,
            selected_layout: 0,
            layouts: config.layouts,
            selected_attach: 0,
            attach_modes: [config.attach_mode; 2],
            show_bar: config.show_bar,
            gaps_enabled: true,
            gaps: config.gaps,
            previous_zoom: None,
        };
        let pertag = Pertag::new(defaults, &config.tag_rules);

        // the first tag's rule also decides what the monitor starts with
        let first = pertag.slot(1).copied().unwrap_or(defaults);
        let mut monitor = Self {
            number,
            screen,
            work_area: screen,
            bar_y: 0,
            bar_height: config.bar_height,
            show_bar: config.show_bar,
            top_bar: config.top_bar,
            master_factor: first.master_factor,
            num_master: config.num_master,
            gaps_enabled: true,
            gaps: first.gaps,
            selected_layout: 0,
            layouts: [first.layouts[0], config.layouts[1]],
            selected_attach: 0,
            attach_modes: [config.attach_mode; 2],
            selected_tags: 0,
            tagset: [1, 1],
            selected: None,
            hidden_selection: false,
            clients: Vec::new(),
            stack: Vec::new(),
            pertag,
            layout_symbol: String::new(),
        };
        monitor.layout_symbol = monitor.layout().layout().symbol().to_string();
        monitor.update_bar_position();
        monitor
    }

    pub fn current_tagset(&self) -> TagMask {
        self.tagset[self.selected_tags]
    }

    pub fn layout(&self) -> LayoutType {
        self.layouts[self.selected_layout]
    }

    pub fn attach_mode(&self) -> AttachMode {
        self.attach_modes[self.selected_attach]
    }

    pub fn is_visible(&self, client: &Client) -> bool {
        client.is_visible_on(self.current_tagset())
    }

    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        self.screen.contains_point(x, y)
    }

    pub fn update_bar_position(&mut self) {
        self.work_area = self.screen;
        if self.show_bar {
            self.work_area.h -= self.bar_height;
            if self.top_bar {
                self.bar_y = self.work_area.y;
                self.work_area.y += self.bar_height;
            } else {
                self.bar_y = self.work_area.y + self.work_area.h;
            }
        } else {
            self.bar_y = -self.bar_height;
        }
    }

    pub fn attach(&mut self, clients: &ClientArena, key: ClientKey) {
        attach::attach(self.attach_mode(), self, clients, key);
    }

    pub fn attach_top(&mut self, key: ClientKey) {
        debug_assert!(!self.clients.contains(&key));
        self.clients.insert(0, key);
    }

    pub fn detach(&mut self, key: ClientKey) {
        debug_assert!(self.clients.contains(&key));
        self.clients.retain(|k| *k != key);
    }

    pub fn attach_stack(&mut self, key: ClientKey) {
        debug_assert!(!self.stack.contains(&key));
        self.stack.insert(0, key);
    }

    /// Remove `key` from the focus stack. Detaching the selection hands it to the most
    /// recently focused client that is visible and not hidden.
    pub fn detach_stack(&mut self, clients: &ClientArena, key: ClientKey) {
        debug_assert!(self.stack.contains(&key));
        self.stack.retain(|k| *k != key);

        if self.selected == Some(key) {
            self.selected = self
                .stack
                .iter()
                .copied()
                .find(|k| clients.get(*k).is_some_and(|c| self.is_visible(c) && !c.is_hidden));
        }
    }

    /// Exchange two clients' places in insertion order. Returns false when either is
    /// missing or both are the same client.
    pub fn swap(&mut self, a: ClientKey, b: ClientKey) -> bool {
        if a == b {
            return false;
        }
        let (Some(first), Some(second)) = (
            self.clients.iter().position(|k| *k == a),
            self.clients.iter().position(|k| *k == b),
        ) else {
            return false;
        };
        self.clients.swap(first, second);
        true
    }

    /// Visible, non-floating, non-hidden clients in insertion order: what layouts arrange.
    pub fn tiled(&self, clients: &ClientArena) -> Vec<ClientKey> {
        self.clients
            .iter()
            .copied()
            .filter(|k| {
                clients
                    .get(*k)
                    .is_some_and(|c| !c.is_floating && !c.is_hidden && self.is_visible(c))
            })
            .collect()
    }

    /// Like [`Monitor::tiled`] but keeping hidden clients.
    pub fn tiled_with_hidden(&self, clients: &ClientArena) -> Vec<ClientKey> {
        self.clients
            .iter()
            .copied()
            .filter(|k| {
                clients
                    .get(*k)
                    .is_some_and(|c| !c.is_floating && self.is_visible(c))
            })
            .collect()
    }

    /// Gather the tiled clients on screen before tags are toggled in, so the arrivals
    /// end up behind them. Bottom attach moves them all to the front; the other modes
    /// move masters to the front and the stack to the back.
    pub fn regroup_tiled(&mut self, clients: &ClientArena) {
        let mut front = self.tiled_with_hidden(clients);
        let back = if self.attach_mode() == AttachMode::Bottom {
            Vec::new()
        } else {
            let mut shown = 0;
            let split = front
                .iter()
                .position(|k| {
                    if shown >= self.num_master {
                        return true;
                    }
                    if !clients[*k].is_hidden {
                        shown += 1;
                    }
                    false
                })
                .unwrap_or(front.len());
            front.split_off(split)
        };

        self.clients.retain(|k| !front.contains(k) && !back.contains(k));
        self.clients.splice(0..0, front);
        self.clients.extend(back);
    }

    pub fn visible_clients<'a>(
        &'a self,
        clients: &'a ClientArena,
    ) -> impl Iterator<Item = ClientKey> + 'a {
        self.clients
            .iter()
            .copied()
            .filter(move |k| clients.get(*k).is_some_and(|c| self.is_visible(c)))
    }

    pub fn set_num_master(&mut self, num_master: usize) {
        self.num_master = num_master;
        self.pertag.current_mut().num_master = num_master;
    }

    pub fn set_master_factor(&mut self, master_factor: f32) {
        self.master_factor = master_factor;
        self.pertag.current_mut().master_factor = master_factor;
    }

    /// Switch layout slots when `layout` is absent or differs from the active one, then put
    /// `layout` into the active slot.
    pub fn set_layout(&mut self, layout: Option<LayoutType>) {
        if layout != Some(self.layout()) {
            self.selected_layout ^= 1;
            self.pertag.current_mut().selected_layout = self.selected_layout;
        }
        if let Some(layout) = layout {
            self.layouts[self.selected_layout] = layout;
            self.pertag.current_mut().layouts[self.selected_layout] = layout;
        }
        self.layout_symbol = self.layout().layout().symbol().to_string();
    }

    pub fn set_attach(&mut self, mode: Option<AttachMode>) {
        if mode != Some(self.attach_mode()) {
            self.selected_attach ^= 1;
            self.pertag.current_mut().selected_attach = self.selected_attach;
        }
        if let Some(mode) = mode {
            self.attach_modes[self.selected_attach] = mode;
            self.pertag.current_mut().attach_modes[self.selected_attach] = mode;
        }
    }

    pub fn toggle_bar(&mut self) {
        self.show_bar = !self.show_bar;
        self.pertag.current_mut().show_bar = self.show_bar;
        self.update_bar_position();
    }

    pub fn set_gaps(&mut self, gaps: GapConfig) {
        self.gaps = gaps;
        self.pertag.current_mut().gaps = gaps;
    }

    pub fn toggle_gaps(&mut self) {
        self.gaps_enabled = !self.gaps_enabled;
        self.pertag.current_mut().gaps_enabled = self.gaps_enabled;
    }

    pub fn previous_zoom(&self) -> Option<ClientKey> {
        self.pertag.current().previous_zoom
    }

    pub fn set_previous_zoom(&mut self, key: Option<ClientKey>) {
        self.pertag.current_mut().previous_zoom = key;
    }

    /// Show the tags in `mask`, or the previous view for an empty mask. Returns false when
    /// `mask` is already on screen.
    pub fn view(&mut self, mask: TagMask) -> bool {
        if mask & TAG_MASK == self.current_tagset() {
            return false;
        }

        self.selected_tags ^= 1;
        if mask & TAG_MASK != 0 {
            self.tagset[self.selected_tags] = mask & TAG_MASK;
        }
        self.pertag.select_for_view(mask);
        self.load_tag_settings();
        true
    }

    /// Flip the tags in `mask` in or out of the view. Returns false when that would leave
    /// nothing on screen.
    pub fn toggle_view(&mut self, mask: TagMask) -> bool {
        let tagset = self.current_tagset() ^ (mask & TAG_MASK);
        if tagset == 0 {
            return false;
        }

        self.tagset[self.selected_tags] = tagset;
        self.pertag.select_for_toggle(tagset);
        self.load_tag_settings();
        true
    }

    /// Copy the current tag's remembered settings onto the monitor.
    pub fn load_tag_settings(&mut self) {
        let settings = *self.pertag.current();
        self.num_master = settings.num_master;
        self.master_factor = settings.master_factor;
        self.selected_layout = settings.selected_layout;
        self.layouts = settings.layouts;
        self.selected_attach = settings.selected_attach;
        self.attach_modes = settings.attach_modes;
        self.gaps_enabled = settings.gaps_enabled;
        self.gaps = settings.gaps;
        self.layout_symbol = self.layout().layout().symbol().to_string();

        if self.show_bar != settings.show_bar {
            self.show_bar = settings.show_bar;
            self.update_bar_position();
        }
    }
}
