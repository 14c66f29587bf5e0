use crate::geometry::Rect;
use crate::size_hints::{self, ResolveBounds, SizeHints};
use crate::tags::TagMask;
use slotmap::SlotMap;
use x11rb::protocol::xproto::Window;

slotmap::new_key_type! {
    /// Stable handle for a managed client. Survives swallowing, which swaps the
    /// window a client record points at.
    pub struct ClientKey;
}

pub type ClientArena = SlotMap<ClientKey, Client>;

pub const MIN_CLIENT_FACTOR: f32 = 0.25;
pub const MAX_CLIENT_FACTOR: f32 = 4.0;

/// Fake fullscreen lets a client believe it is fullscreen while it stays tiled.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FakeFullscreen {
    #[default]
    Off,
    /// Client was told it is fullscreen, geometry untouched.
    On,
    /// Was fake, then went fullscreen for real.
    Promoted,
    /// Leaving real fullscreen and dropping back to fake.
    Releasing,
}

#[derive(Debug, Clone)]
pub struct Client {
    pub name: String,
    pub x_position: i32,
    pub y_position: i32,
    pub width: i32,
    pub height: i32,
    pub old_x_position: i32,
    pub old_y_position: i32,
    pub old_width: i32,
    pub old_height: i32,
    /// Last floating geometry, restored when the client floats again.
    pub saved_float_geometry: Option<Rect>,
    pub size_hints: SizeHints,
    pub hints_valid: bool,
    pub border_width: i32,
    pub old_border_width: i32,
    pub client_factor: f32,
    pub tags: TagMask,
    /// Tagset to return to when this client goes away, set by "switch with return" rules.
    pub switch_tag: TagMask,
    pub is_fixed: bool,
    pub is_floating: bool,
    pub is_urgent: bool,
    pub never_focus: bool,
    pub is_fullscreen: bool,
    pub fake_fullscreen: FakeFullscreen,
    /// Floating state captured when entering fullscreen, `None` when nothing is saved.
    pub fullscreen_restore: Option<bool>,
    pub is_sticky: bool,
    pub is_terminal: bool,
    pub no_swallow: bool,
    pub is_hidden: bool,
    pub pid: u32,
    /// The client whose window was substituted into this record.
    pub swallowing: Option<Box<Client>>,
    pub monitor_index: usize,
    pub window: Window,
}

impl Client {
    pub fn new(window: Window, monitor_index: usize, tags: TagMask) -> Self {
        Self {
            name: String::new(),
            x_position: 0,
            y_position: 0,
            width: 0,
            height: 0,
            old_x_position: 0,
            old_y_position: 0,
            old_width: 0,
            old_height: 0,
            saved_float_geometry: None,
            size_hints: SizeHints::default(),
            hints_valid: false,
            border_width: 0,
            old_border_width: 0,
            client_factor: 1.0,
            tags,
            switch_tag: 0,
            is_fixed: false,
            is_floating: false,
            is_urgent: false,
            never_focus: false,
            is_fullscreen: false,
            fake_fullscreen: FakeFullscreen::Off,
            fullscreen_restore: None,
            is_sticky: false,
            is_terminal: false,
            no_swallow: false,
            is_hidden: false,
            pid: 0,
            swallowing: None,
            monitor_index,
            window,
        }
    }

    pub fn geometry(&self) -> Rect {
        Rect::new(self.x_position, self.y_position, self.width, self.height)
    }

    pub fn old_geometry(&self) -> Rect {
        Rect::new(
            self.old_x_position,
            self.old_y_position,
            self.old_width,
            self.old_height,
        )
    }

    /// Record a committed geometry, keeping the previous one for restores.
    pub fn set_geometry(&mut self, rect: Rect) {
        self.old_x_position = self.x_position;
        self.old_y_position = self.y_position;
        self.old_width = self.width;
        self.old_height = self.height;
        self.x_position = rect.x;
        self.y_position = rect.y;
        self.width = rect.w;
        self.height = rect.h;
    }

    pub fn width_with_border(&self) -> i32 {
        self.width + 2 * self.border_width
    }

    pub fn height_with_border(&self) -> i32 {
        self.height + 2 * self.border_width
    }

    pub fn is_visible_on(&self, tagset: TagMask) -> bool {
        self.tags & tagset != 0 || self.is_sticky
    }

    pub fn set_size_hints(&mut self, hints: SizeHints) {
        self.size_hints = hints;
        self.is_fixed = hints.is_fixed();
        self.hints_valid = true;
    }

    /// Correct a proposed geometry against this client's hints.
    pub fn resolve_geometry(
        &self,
        proposed: Rect,
        interactive: bool,
        bounds: &ResolveBounds,
    ) -> (Rect, bool) {
        size_hints::resolve(
            self.geometry(),
            self.border_width,
            &self.size_hints,
            proposed,
            interactive,
            bounds,
        )
    }

    /// Apply a cfact change: zero resets, values above the maximum set absolutely,
    /// anything else is a delta.
    pub fn adjust_client_factor(&mut self, factor: f32) {
        let next = if factor == 0.0 {
            1.0
        } else if factor > MAX_CLIENT_FACTOR {
            factor - MAX_CLIENT_FACTOR
        } else {
            factor + self.client_factor
        };
        self.client_factor = next.clamp(MIN_CLIENT_FACTOR, MAX_CLIENT_FACTOR);
    }

    pub fn save_float_geometry(&mut self) {
        self.saved_float_geometry = Some(self.geometry());
    }
}
