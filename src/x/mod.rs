//! The display server seam.
//!
//! Everything the window manager asks of the X server goes through [`XConn`], so the
//! orchestration logic can run against [`connection::X11rbConnection`] in production and
//! against a mock in tests.
use crate::errors::WmResult;
use crate::geometry::Rect;
use crate::keyboard::keysyms::Keysym;
use crate::keyboard::{ButtonBinding, KeyBinding};

pub mod connection;
#[cfg(test)]
pub mod mock;

pub use connection::X11rbConnection;

pub type Xid = u32;

/// ICCCM `WM_STATE` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WmState {
    Withdrawn,
    Normal,
    Iconic,
}

impl WmState {
    pub fn as_u32(&self) -> u32 {
        match self {
            Self::Withdrawn => 0,
            Self::Normal => 1,
            Self::Iconic => 3,
        }
    }

    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Withdrawn),
            1 => Some(Self::Normal),
            3 => Some(Self::Iconic),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WindowAttributes {
    pub override_redirect: bool,
    pub viewable: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WindowGeometry {
    pub rect: Rect,
    pub border_width: i32,
}

/// The parts of `WM_HINTS` the window manager reads.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WmHints {
    pub urgent: bool,
    /// The input field, `None` when the client does not set it.
    pub accepts_input: Option<bool>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClassHint {
    pub class: Option<String>,
    pub instance: Option<String>,
}

/// What `_NET_WM_STATE` and `_NET_WM_WINDOW_TYPE` say about a window.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WindowType {
    pub is_dialog: bool,
    pub is_fullscreen: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    DeleteWindow,
    TakeFocus,
}

/// On screen configuration for a client window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientConfig {
    /// Position and size, border excluded.
    Position(Rect),
    BorderPx(u32),
    /// Stack directly below the given sibling.
    StackBelow(Xid),
    /// Stack above every sibling.
    StackTop,
    /// Stack below every sibling.
    StackBottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorKind {
    Normal,
    Move,
    Resize,
    ResizeHorizontal,
    ResizeVertical,
}

/// Properties whose changes the window manager reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    Name,
    NormalHints,
    Hints,
    TransientFor,
    WindowType,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateAction {
    Remove,
    Add,
    Toggle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMessage {
    /// `_NET_WM_STATE` touching `_NET_WM_STATE_FULLSCREEN`.
    Fullscreen(StateAction),
    ActivateWindow,
    Other,
}

/// A pending `ConfigureRequest`. Fields the client did not ask to change are `None`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConfigureRequest {
    pub window: Xid,
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub border_width: Option<i32>,
    pub sibling: Option<Xid>,
    pub stack_mode: Option<u8>,
}

impl ConfigureRequest {
    pub fn moves_only(&self) -> bool {
        (self.x.is_some() || self.y.is_some()) && self.width.is_none() && self.height.is_none()
    }
}

/// Events the window manager handles, already decoded from the wire format.
#[derive(Debug, Clone, PartialEq)]
pub enum XEvent {
    MapRequest {
        window: Xid,
    },
    DestroyNotify {
        window: Xid,
    },
    UnmapNotify {
        window: Xid,
        /// Synthetic unmaps announce a client withdrawing itself.
        synthetic: bool,
    },
    ConfigureRequest(ConfigureRequest),
    ConfigureNotify {
        window: Xid,
        width: i32,
        height: i32,
    },
    PropertyNotify {
        window: Xid,
        property: Property,
        deleted: bool,
    },
    ClientMessage {
        window: Xid,
        message: ClientMessage,
    },
    ButtonPress {
        window: Xid,
        root_x: i32,
        root_y: i32,
        button: u8,
        state: u16,
    },
    ButtonRelease,
    MotionNotify {
        window: Xid,
        root_x: i32,
        root_y: i32,
        time: u32,
    },
    EnterNotify {
        window: Xid,
        /// Only normal, non-inferior crossings into a window count.
        normal: bool,
    },
    FocusIn {
        window: Xid,
    },
    KeyPress {
        keysym: Keysym,
        state: u16,
    },
    MappingNotify {
        keyboard: bool,
    },
    Expose {
        window: Xid,
    },
    Other,
}

/// A handle on a running X connection.
///
/// Calls are synchronous from the caller's point of view. Errors the server raises because
/// a window vanished between request and reply are swallowed by the implementation.
pub trait XConn {
    /// The root window.
    fn root(&self) -> Xid;
    /// One rect per distinct physical screen.
    fn screen_details(&self) -> WmResult<Vec<Rect>>;
    /// Block until the next event arrives.
    fn next_event(&self) -> WmResult<XEvent>;
    fn flush(&self) -> WmResult<()>;
    /// Drop queued pointer crossing events so a restack does not steal focus.
    fn discard_enter_events(&self) -> WmResult<()>;

    /// Top level windows that existed before the window manager started.
    fn existing_windows(&self) -> WmResult<Vec<Xid>>;
    fn window_attributes(&self, window: Xid) -> WmResult<Option<WindowAttributes>>;
    fn window_geometry(&self, window: Xid) -> WmResult<WindowGeometry>;

    /// `_NET_WM_NAME`, falling back to `WM_NAME`.
    fn window_title(&self, window: Xid) -> WmResult<Option<String>>;
    /// The root window's `WM_NAME`, used for status text and fake signals.
    fn root_name(&self) -> WmResult<Option<String>>;
    fn class_hint(&self, window: Xid) -> WmResult<ClassHint>;
    fn transient_for(&self, window: Xid) -> WmResult<Option<Xid>>;
    /// Raw `WM_NORMAL_HINTS` words.
    fn normal_hints(&self, window: Xid) -> WmResult<Option<Vec<u32>>>;
    fn wm_hints(&self, window: Xid) -> WmResult<Option<WmHints>>;
    fn set_urgency_hint(&self, window: Xid, urgent: bool) -> WmResult<()>;
    fn wm_state(&self, window: Xid) -> WmResult<Option<WmState>>;
    fn set_wm_state(&self, window: Xid, state: WmState) -> WmResult<()>;
    fn window_type(&self, window: Xid) -> WmResult<WindowType>;
    fn set_fullscreen_state(&self, window: Xid, fullscreen: bool) -> WmResult<()>;
    /// Client pid, 0 when unknown.
    fn window_pid(&self, window: Xid) -> WmResult<u32>;

    /// Send a `WM_PROTOCOLS` message if the client advertises the protocol. Returns whether
    /// it did.
    fn send_protocol(&self, window: Xid, protocol: Protocol) -> WmResult<bool>;
    fn configure(&self, window: Xid, data: &[ClientConfig]) -> WmResult<()>;
    /// Forward a configure request for a window that is not managed, untouched.
    fn forward_configure_request(&self, request: &ConfigureRequest) -> WmResult<()>;
    /// Tell a client its geometry with a synthetic `ConfigureNotify`.
    fn send_configure_notify(&self, window: Xid, rect: Rect, border_width: i32) -> WmResult<()>;
    fn set_border_color(&self, window: Xid, color: u32) -> WmResult<()>;
    /// Start tracking a new client: event mask and save set.
    fn select_client_events(&self, window: Xid) -> WmResult<()>;
    fn map(&self, window: Xid) -> WmResult<()>;
    /// Unmap without the resulting `UnmapNotify` reaching the event loop.
    fn unmap(&self, window: Xid) -> WmResult<()>;
    /// Forcefully disconnect the client owning `window`.
    fn kill(&self, window: Xid) -> WmResult<()>;

    fn focus(&self, window: Xid) -> WmResult<()>;
    fn focus_root(&self) -> WmResult<()>;
    fn set_client_list(&self, windows: &[Xid]) -> WmResult<()>;
    fn append_client_list(&self, window: Xid) -> WmResult<()>;

    /// Modifier bit currently carrying Num Lock.
    fn numlock_mask(&self) -> WmResult<u16>;
    fn grab_keys(&self, bindings: &[KeyBinding]) -> WmResult<()>;
    /// Grab client window buttons. Unfocused clients also grab every button so a click
    /// focuses them.
    fn grab_buttons(&self, window: Xid, focused: bool, bindings: &[ButtonBinding])
    -> WmResult<()>;
    /// Let a click that focused a client through to the client.
    fn replay_pointer(&self) -> WmResult<()>;
    fn refresh_keyboard_mapping(&self) -> WmResult<()>;

    /// Grab the pointer for a drag. Returns false when someone else holds it.
    fn grab_pointer(&self, cursor: CursorKind) -> WmResult<bool>;
    fn ungrab_pointer(&self) -> WmResult<()>;
    fn query_pointer(&self) -> WmResult<Option<(i32, i32)>>;
    fn warp_pointer(&self, window: Xid, x: i32, y: i32) -> WmResult<()>;
}
