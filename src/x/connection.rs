use crate::errors::{WmError, WmResult, X11Error};
use crate::geometry::Rect;
use crate::keyboard::keysyms::Keysym;
use crate::keyboard::{ButtonBinding, ClickTarget, KeyBinding};
use crate::x::{
    ClassHint, ClientConfig, ClientMessage, ConfigureRequest, CursorKind, Property, Protocol,
    StateAction, WindowAttributes, WindowGeometry, WindowType, WmHints, WmState, XConn, XEvent,
    Xid,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use tracing::{debug, error, trace};
use x11rb::connection::Connection;
use x11rb::cursor::Handle as CursorHandle;
use x11rb::errors::ReplyError;
use x11rb::protocol::res::{ClientIdMask, ClientIdSpec, ConnectionExt as _};
use x11rb::protocol::xinerama::ConnectionExt as _;
use x11rb::protocol::xproto::{
    Allow, AtomEnum, ButtonIndex, ChangeWindowAttributesAux, ClientMessageEvent, CloseDown,
    ConfigWindow, ConfigureNotifyEvent, ConfigureWindowAux, ConnectionExt as _,
    CreateWindowAux, EventMask, Grab, GrabMode, GrabStatus, InputFocus, MapState, Mapping,
    ModMask, NotifyDetail, NotifyMode, PropMode, StackMode, WindowClass,
    CLIENT_MESSAGE_EVENT, CONFIGURE_NOTIFY_EVENT,
};
use x11rb::protocol::{ErrorKind, Event};
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;
use x11rb::x11_utils::X11Error as ProtocolError;
use x11rb::{CURRENT_TIME, NONE};

x11rb::atom_manager! {
    pub Atoms: AtomsCookie {
        UTF8_STRING,
        WM_PROTOCOLS,
        WM_DELETE_WINDOW,
        WM_STATE,
        WM_TAKE_FOCUS,
        _NET_ACTIVE_WINDOW,
        _NET_SUPPORTED,
        _NET_WM_NAME,
        _NET_WM_STATE,
        _NET_SUPPORTING_WM_CHECK,
        _NET_WM_STATE_FULLSCREEN,
        _NET_WM_WINDOW_TYPE,
        _NET_WM_WINDOW_TYPE_DIALOG,
        _NET_CLIENT_LIST,
    }
}

const WM_NAME: &str = "flexwm";
const XK_NUM_LOCK: Keysym = 0xff7f;

const INPUT_HINT: u32 = 1;
const URGENCY_HINT: u32 = 1 << 8;

// Core protocol request codes that may legitimately race a dying window.
const X_CONFIGURE_WINDOW: u8 = 12;
const X_GRAB_BUTTON: u8 = 28;
const X_GRAB_KEY: u8 = 33;
const X_SET_INPUT_FOCUS: u8 = 42;
const X_COPY_AREA: u8 = 62;
const X_POLY_SEGMENT: u8 = 66;
const X_POLY_FILL_RECTANGLE: u8 = 70;
const X_POLY_TEXT8: u8 = 74;

/// Errors caused by a window disappearing between a request and its processing.
fn is_ignorable(error: &ProtocolError) -> bool {
    match error.error_kind {
        ErrorKind::Window => true,
        ErrorKind::Match => matches!(error.major_opcode, X_SET_INPUT_FOCUS | X_CONFIGURE_WINDOW),
        ErrorKind::Drawable => matches!(
            error.major_opcode,
            X_POLY_TEXT8 | X_POLY_FILL_RECTANGLE | X_POLY_SEGMENT | X_COPY_AREA
        ),
        ErrorKind::Access => matches!(error.major_opcode, X_GRAB_BUTTON | X_GRAB_KEY),
        _ => false,
    }
}

/// Turn an ignorable reply error into `None`.
fn tolerate<T>(result: Result<T, ReplyError>) -> WmResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ReplyError::X11Error(e)) if is_ignorable(&e) => {
            debug!(kind = ?e.error_kind, request = e.major_opcode, "ignoring protocol error");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn root_event_mask() -> EventMask {
    EventMask::SUBSTRUCTURE_REDIRECT
        | EventMask::SUBSTRUCTURE_NOTIFY
        | EventMask::BUTTON_PRESS
        | EventMask::POINTER_MOTION
        | EventMask::ENTER_WINDOW
        | EventMask::LEAVE_WINDOW
        | EventMask::STRUCTURE_NOTIFY
        | EventMask::PROPERTY_CHANGE
}

fn client_event_mask() -> EventMask {
    EventMask::ENTER_WINDOW
        | EventMask::FOCUS_CHANGE
        | EventMask::PROPERTY_CHANGE
        | EventMask::STRUCTURE_NOTIFY
}

fn button_mask() -> EventMask {
    EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE
}

fn drag_mask() -> EventMask {
    button_mask() | EventMask::POINTER_MOTION
}

struct Cursors {
    normal: u32,
    moving: u32,
    resize: u32,
    horizontal: u32,
    vertical: u32,
}

impl Cursors {
    fn get(&self, kind: CursorKind) -> u32 {
        match kind {
            CursorKind::Normal => self.normal,
            CursorKind::Move => self.moving,
            CursorKind::Resize => self.resize,
            CursorKind::ResizeHorizontal => self.horizontal,
            CursorKind::ResizeVertical => self.vertical,
        }
    }
}

#[derive(Debug, Default)]
struct KeyboardMapping {
    min_keycode: u8,
    keysyms_per_keycode: u8,
    keysyms: Vec<Keysym>,
}

impl KeyboardMapping {
    fn keysym(&self, keycode: u8) -> Keysym {
        let index = keycode.saturating_sub(self.min_keycode) as usize
            * self.keysyms_per_keycode as usize;
        self.keysyms.get(index).copied().unwrap_or(0)
    }

    /// Keycodes whose unshifted keysym is `keysym`.
    fn keycodes(&self, keysym: Keysym) -> impl Iterator<Item = u8> + '_ {
        let per = self.keysyms_per_keycode.max(1) as usize;
        self.keysyms
            .chunks(per)
            .enumerate()
            .filter(move |(_, syms)| syms.first() == Some(&keysym))
            .map(|(i, _)| self.min_keycode.saturating_add(i as u8))
    }
}

/// The production [`XConn`] on top of x11rb.
pub struct X11rbConnection {
    conn: RustConnection,
    root: Xid,
    root_size: (i32, i32),
    atoms: Atoms,
    cursors: Cursors,
    check_window: Xid,
    keyboard: RefCell<KeyboardMapping>,
    /// Events read ahead while discarding crossing events.
    pending: RefCell<VecDeque<Event>>,
}

impl X11rbConnection {
    /// Connect to `$DISPLAY` and take over the root window.
    pub fn new() -> WmResult<Self> {
        let (conn, screen_number) = x11rb::connect(None)?;
        let screen = conn.setup().roots[screen_number].clone();
        let root = screen.root;

        let became_wm = conn
            .change_window_attributes(
                root,
                &ChangeWindowAttributesAux::new().event_mask(EventMask::SUBSTRUCTURE_REDIRECT),
            )?
            .check();
        match became_wm {
            Err(ReplyError::X11Error(e)) if e.error_kind == ErrorKind::Access => {
                return Err(WmError::OtherWmRunning);
            }
            other => other?,
        }

        let atoms = Atoms::new(&conn)?.reply()?;

        let resource_db = x11rb::resource_manager::new_from_default(&conn)?;
        let cursor_handle = CursorHandle::new(&conn, screen_number, &resource_db)?.reply()?;
        let cursors = Cursors {
            normal: cursor_handle.load_cursor(&conn, "left_ptr")?,
            moving: cursor_handle.load_cursor(&conn, "fleur")?,
            resize: cursor_handle.load_cursor(&conn, "sizing")?,
            horizontal: cursor_handle.load_cursor(&conn, "sb_h_double_arrow")?,
            vertical: cursor_handle.load_cursor(&conn, "sb_v_double_arrow")?,
        };

        let check_window = conn.generate_id()?;
        conn.create_window(
            x11rb::COPY_DEPTH_FROM_PARENT,
            check_window,
            root,
            0,
            0,
            1,
            1,
            0,
            WindowClass::INPUT_OUTPUT,
            x11rb::COPY_FROM_PARENT,
            &CreateWindowAux::new(),
        )?;

        let connection = Self {
            conn,
            root,
            root_size: (
                screen.width_in_pixels as i32,
                screen.height_in_pixels as i32,
            ),
            atoms,
            cursors,
            check_window,
            keyboard: RefCell::new(KeyboardMapping::default()),
            pending: RefCell::new(VecDeque::new()),
        };

        connection.init_properties()?;
        connection.refresh_keyboard_mapping()?;
        connection
            .conn
            .change_window_attributes(
                root,
                &ChangeWindowAttributesAux::new()
                    .event_mask(root_event_mask())
                    .cursor(connection.cursors.normal),
            )?
            .check()?;
        connection.conn.flush()?;

        debug!(screen = screen_number, root, "connected to X server");
        Ok(connection)
    }

    fn init_properties(&self) -> WmResult<()> {
        let atoms = &self.atoms;
        self.conn.change_property32(
            PropMode::REPLACE,
            self.check_window,
            atoms._NET_SUPPORTING_WM_CHECK,
            AtomEnum::WINDOW,
            &[self.check_window],
        )?;
        self.conn.change_property8(
            PropMode::REPLACE,
            self.check_window,
            atoms._NET_WM_NAME,
            atoms.UTF8_STRING,
            WM_NAME.as_bytes(),
        )?;
        self.conn.change_property32(
            PropMode::REPLACE,
            self.root,
            atoms._NET_SUPPORTING_WM_CHECK,
            AtomEnum::WINDOW,
            &[self.check_window],
        )?;
        self.conn.change_property32(
            PropMode::REPLACE,
            self.root,
            atoms._NET_SUPPORTED,
            AtomEnum::ATOM,
            &[
                atoms._NET_ACTIVE_WINDOW,
                atoms._NET_SUPPORTED,
                atoms._NET_WM_NAME,
                atoms._NET_WM_STATE,
                atoms._NET_SUPPORTING_WM_CHECK,
                atoms._NET_WM_STATE_FULLSCREEN,
                atoms._NET_WM_WINDOW_TYPE,
                atoms._NET_WM_WINDOW_TYPE_DIALOG,
                atoms._NET_CLIENT_LIST,
            ],
        )?;
        self.conn
            .delete_property(self.root, atoms._NET_CLIENT_LIST)?;
        Ok(())
    }

    fn atom_list(&self, window: Xid, property: u32) -> WmResult<Vec<u32>> {
        let cookie = self
            .conn
            .get_property(false, window, property, AtomEnum::ATOM, 0, u32::MAX)?;
        Ok(tolerate(cookie.reply())?
            .and_then(|reply| reply.value32().map(|values| values.collect()))
            .unwrap_or_default())
    }

    fn text_property(&self, window: Xid, property: u32, kind: u32) -> WmResult<Option<String>> {
        let cookie = self
            .conn
            .get_property(false, window, property, kind, 0, u32::MAX)?;
        Ok(tolerate(cookie.reply())?
            .filter(|reply| !reply.value.is_empty())
            .map(|reply| String::from_utf8_lossy(&reply.value).into_owned()))
    }

    fn raw_wm_hints(&self, window: Xid) -> WmResult<Option<Vec<u32>>> {
        let cookie = self.conn.get_property(
            false,
            window,
            AtomEnum::WM_HINTS,
            AtomEnum::WM_HINTS,
            0,
            9,
        )?;
        Ok(tolerate(cookie.reply())?
            .and_then(|reply| reply.value32().map(|values| values.collect::<Vec<u32>>()))
            .filter(|words| !words.is_empty()))
    }

    fn property_kind(&self, atom: u32) -> Property {
        let atoms = &self.atoms;
        if atom == u32::from(AtomEnum::WM_NAME) || atom == atoms._NET_WM_NAME {
            Property::Name
        } else if atom == u32::from(AtomEnum::WM_NORMAL_HINTS) {
            Property::NormalHints
        } else if atom == u32::from(AtomEnum::WM_HINTS) {
            Property::Hints
        } else if atom == u32::from(AtomEnum::WM_TRANSIENT_FOR) {
            Property::TransientFor
        } else if atom == atoms._NET_WM_WINDOW_TYPE {
            Property::WindowType
        } else {
            Property::Other
        }
    }

    fn client_message(&self, event: &ClientMessageEvent) -> ClientMessage {
        let data = event.data.as_data32();
        if event.type_ == self.atoms._NET_WM_STATE {
            let fullscreen = self.atoms._NET_WM_STATE_FULLSCREEN;
            if data[1] != fullscreen && data[2] != fullscreen {
                return ClientMessage::Other;
            }
            match data[0] {
                0 => ClientMessage::Fullscreen(StateAction::Remove),
                1 => ClientMessage::Fullscreen(StateAction::Add),
                2 => ClientMessage::Fullscreen(StateAction::Toggle),
                _ => ClientMessage::Other,
            }
        } else if event.type_ == self.atoms._NET_ACTIVE_WINDOW {
            ClientMessage::ActivateWindow
        } else {
            ClientMessage::Other
        }
    }

    /// Decode a wire event. `Ok(None)` for events that carry nothing for us, including
    /// ignorable protocol errors.
    fn convert(&self, event: Event) -> WmResult<Option<XEvent>> {
        let converted = match event {
            Event::Error(e) => {
                if is_ignorable(&e) {
                    debug!(kind = ?e.error_kind, request = e.major_opcode, "ignoring protocol error");
                    return Ok(None);
                }
                error!(kind = ?e.error_kind, request = e.major_opcode, "fatal protocol error");
                return Err(X11Error::Protocol {
                    request_code: e.major_opcode,
                    error_kind: format!("{:?}", e.error_kind),
                }
                .into());
            }
            Event::MapRequest(e) => XEvent::MapRequest { window: e.window },
            Event::DestroyNotify(e) => XEvent::DestroyNotify { window: e.window },
            Event::UnmapNotify(e) => XEvent::UnmapNotify {
                window: e.window,
                synthetic: e.response_type & 0x80 != 0,
            },
            Event::ConfigureRequest(e) => {
                let has = |flag: ConfigWindow| e.value_mask.contains(flag);
                XEvent::ConfigureRequest(ConfigureRequest {
                    window: e.window,
                    x: has(ConfigWindow::X).then_some(e.x as i32),
                    y: has(ConfigWindow::Y).then_some(e.y as i32),
                    width: has(ConfigWindow::WIDTH).then_some(e.width as i32),
                    height: has(ConfigWindow::HEIGHT).then_some(e.height as i32),
                    border_width: has(ConfigWindow::BORDER_WIDTH)
                        .then_some(e.border_width as i32),
                    sibling: has(ConfigWindow::SIBLING).then_some(e.sibling),
                    stack_mode: has(ConfigWindow::STACK_MODE).then_some(u32::from(e.stack_mode) as u8),
                })
            }
            Event::ConfigureNotify(e) => XEvent::ConfigureNotify {
                window: e.window,
                width: e.width as i32,
                height: e.height as i32,
            },
            Event::PropertyNotify(e) => XEvent::PropertyNotify {
                window: e.window,
                property: self.property_kind(e.atom),
                deleted: e.state == x11rb::protocol::xproto::Property::DELETE,
            },
            Event::ClientMessage(e) => XEvent::ClientMessage {
                window: e.window,
                message: self.client_message(&e),
            },
            Event::ButtonPress(e) => XEvent::ButtonPress {
                window: e.event,
                root_x: e.root_x as i32,
                root_y: e.root_y as i32,
                button: e.detail,
                state: u16::from(e.state),
            },
            Event::ButtonRelease(_) => XEvent::ButtonRelease,
            Event::MotionNotify(e) => XEvent::MotionNotify {
                window: e.event,
                root_x: e.root_x as i32,
                root_y: e.root_y as i32,
                time: e.time,
            },
            Event::EnterNotify(e) => XEvent::EnterNotify {
                window: e.event,
                normal: (e.mode == NotifyMode::NORMAL && e.detail != NotifyDetail::INFERIOR)
                    || e.event == self.root,
            },
            Event::FocusIn(e) => XEvent::FocusIn { window: e.event },
            Event::KeyPress(e) => XEvent::KeyPress {
                keysym: self.keyboard.borrow().keysym(e.detail),
                state: u16::from(e.state),
            },
            Event::MappingNotify(e) => {
                let keyboard = e.request == Mapping::KEYBOARD;
                if keyboard {
                    self.refresh_keyboard_mapping()?;
                }
                XEvent::MappingNotify { keyboard }
            }
            Event::Expose(e) if e.count == 0 => XEvent::Expose { window: e.window },
            _ => return Ok(None),
        };
        Ok(Some(converted))
    }

    fn set_event_mask(&self, window: Xid, mask: EventMask) -> WmResult<()> {
        self.conn.change_window_attributes(
            window,
            &ChangeWindowAttributesAux::new().event_mask(mask),
        )?;
        Ok(())
    }
}

impl XConn for X11rbConnection {
    fn root(&self) -> Xid {
        self.root
    }

    fn screen_details(&self) -> WmResult<Vec<Rect>> {
        let fallback = vec![Rect::new(0, 0, self.root_size.0, self.root_size.1)];

        let active = self
            .conn
            .xinerama_is_active()
            .ok()
            .and_then(|cookie| cookie.reply().ok())
            .is_some_and(|reply| reply.state != 0);
        if !active {
            return Ok(fallback);
        }

        let reply = self.conn.xinerama_query_screens()?.reply()?;
        let mut screens: Vec<Rect> = Vec::new();
        for info in &reply.screen_info {
            if info.width == 0 || info.height == 0 {
                continue;
            }
            let rect = Rect::new(
                info.x_org as i32,
                info.y_org as i32,
                info.width as i32,
                info.height as i32,
            );
            if !screens.contains(&rect) {
                screens.push(rect);
            }
        }

        if screens.is_empty() {
            return Ok(fallback);
        }
        Ok(screens)
    }

    fn next_event(&self) -> WmResult<XEvent> {
        loop {
            let queued = self.pending.borrow_mut().pop_front();
            let event = match queued {
                Some(event) => event,
                None => self.conn.wait_for_event()?,
            };
            if let Some(event) = self.convert(event)? {
                trace!(?event, "event");
                return Ok(event);
            }
        }
    }

    fn flush(&self) -> WmResult<()> {
        self.conn.flush()?;
        Ok(())
    }

    fn discard_enter_events(&self) -> WmResult<()> {
        self.conn.sync()?;
        let mut pending = self.pending.borrow_mut();
        while let Some(event) = self.conn.poll_for_event()? {
            pending.push_back(event);
        }
        pending.retain(|event| !matches!(event, Event::EnterNotify(_)));
        Ok(())
    }

    fn existing_windows(&self) -> WmResult<Vec<Xid>> {
        Ok(self.conn.query_tree(self.root)?.reply()?.children)
    }

    fn window_attributes(&self, window: Xid) -> WmResult<Option<WindowAttributes>> {
        let reply = tolerate(self.conn.get_window_attributes(window)?.reply())?;
        Ok(reply.map(|attrs| WindowAttributes {
            override_redirect: attrs.override_redirect,
            viewable: attrs.map_state == MapState::VIEWABLE,
        }))
    }

    fn window_geometry(&self, window: Xid) -> WmResult<WindowGeometry> {
        let reply = tolerate(self.conn.get_geometry(window)?.reply())?;
        Ok(reply
            .map(|geometry| WindowGeometry {
                rect: Rect::new(
                    geometry.x as i32,
                    geometry.y as i32,
                    geometry.width as i32,
                    geometry.height as i32,
                ),
                border_width: geometry.border_width as i32,
            })
            .unwrap_or_default())
    }

    fn window_title(&self, window: Xid) -> WmResult<Option<String>> {
        if let Some(title) =
            self.text_property(window, self.atoms._NET_WM_NAME, self.atoms.UTF8_STRING)?
        {
            return Ok(Some(title));
        }
        self.text_property(window, AtomEnum::WM_NAME.into(), AtomEnum::ANY.into())
    }

    fn root_name(&self) -> WmResult<Option<String>> {
        self.text_property(self.root, AtomEnum::WM_NAME.into(), AtomEnum::ANY.into())
    }

    fn class_hint(&self, window: Xid) -> WmResult<ClassHint> {
        let Some(raw) =
            self.text_property(window, AtomEnum::WM_CLASS.into(), AtomEnum::STRING.into())?
        else {
            return Ok(ClassHint::default());
        };

        let mut parts = raw.split('\0').map(str::to_string);
        let instance = parts.next().filter(|s| !s.is_empty());
        let class = parts.next().filter(|s| !s.is_empty());
        Ok(ClassHint { class, instance })
    }

    fn transient_for(&self, window: Xid) -> WmResult<Option<Xid>> {
        let cookie = self.conn.get_property(
            false,
            window,
            AtomEnum::WM_TRANSIENT_FOR,
            AtomEnum::WINDOW,
            0,
            1,
        )?;
        Ok(tolerate(cookie.reply())?
            .and_then(|reply| reply.value32().and_then(|mut values| values.next()))
            .filter(|parent| *parent != NONE))
    }

    fn normal_hints(&self, window: Xid) -> WmResult<Option<Vec<u32>>> {
        let cookie = self.conn.get_property(
            false,
            window,
            AtomEnum::WM_NORMAL_HINTS,
            AtomEnum::WM_SIZE_HINTS,
            0,
            18,
        )?;
        Ok(tolerate(cookie.reply())?
            .and_then(|reply| reply.value32().map(|values| values.collect::<Vec<u32>>()))
            .filter(|words| !words.is_empty()))
    }

    fn wm_hints(&self, window: Xid) -> WmResult<Option<WmHints>> {
        Ok(self.raw_wm_hints(window)?.map(|words| {
            let flags = words[0];
            WmHints {
                urgent: flags & URGENCY_HINT != 0,
                accepts_input: (flags & INPUT_HINT != 0)
                    .then(|| words.get(1).is_some_and(|input| *input != 0)),
            }
        }))
    }

    fn set_urgency_hint(&self, window: Xid, urgent: bool) -> WmResult<()> {
        let Some(mut words) = self.raw_wm_hints(window)? else {
            return Ok(());
        };
        if urgent {
            words[0] |= URGENCY_HINT;
        } else {
            words[0] &= !URGENCY_HINT;
        }
        self.conn.change_property32(
            PropMode::REPLACE,
            window,
            AtomEnum::WM_HINTS,
            AtomEnum::WM_HINTS,
            &words,
        )?;
        Ok(())
    }

    fn wm_state(&self, window: Xid) -> WmResult<Option<WmState>> {
        let cookie = self.conn.get_property(
            false,
            window,
            self.atoms.WM_STATE,
            self.atoms.WM_STATE,
            0,
            2,
        )?;
        Ok(tolerate(cookie.reply())?
            .and_then(|reply| reply.value32().and_then(|mut values| values.next()))
            .and_then(WmState::from_u32))
    }

    fn set_wm_state(&self, window: Xid, state: WmState) -> WmResult<()> {
        self.conn.change_property32(
            PropMode::REPLACE,
            window,
            self.atoms.WM_STATE,
            self.atoms.WM_STATE,
            &[state.as_u32(), NONE],
        )?;
        Ok(())
    }

    fn window_type(&self, window: Xid) -> WmResult<WindowType> {
        let states = self.atom_list(window, self.atoms._NET_WM_STATE)?;
        let types = self.atom_list(window, self.atoms._NET_WM_WINDOW_TYPE)?;
        Ok(WindowType {
            is_dialog: types.contains(&self.atoms._NET_WM_WINDOW_TYPE_DIALOG),
            is_fullscreen: states.contains(&self.atoms._NET_WM_STATE_FULLSCREEN),
        })
    }

    fn set_fullscreen_state(&self, window: Xid, fullscreen: bool) -> WmResult<()> {
        let data: &[u32] = if fullscreen {
            &[self.atoms._NET_WM_STATE_FULLSCREEN]
        } else {
            &[]
        };
        self.conn.change_property32(
            PropMode::REPLACE,
            window,
            self.atoms._NET_WM_STATE,
            AtomEnum::ATOM,
            data,
        )?;
        Ok(())
    }

    fn window_pid(&self, window: Xid) -> WmResult<u32> {
        let spec = ClientIdSpec {
            client: window,
            mask: ClientIdMask::LOCAL_CLIENT_PID,
        };
        let Some(reply) = tolerate(self.conn.res_query_client_ids(&[spec])?.reply())? else {
            return Ok(0);
        };

        let pid = reply
            .ids
            .iter()
            .find(|id| id.spec.mask.contains(ClientIdMask::LOCAL_CLIENT_PID))
            .and_then(|id| id.value.first().copied())
            .filter(|pid| *pid != u32::MAX)
            .unwrap_or(0);
        Ok(pid)
    }

    fn send_protocol(&self, window: Xid, protocol: Protocol) -> WmResult<bool> {
        let atom = match protocol {
            Protocol::DeleteWindow => self.atoms.WM_DELETE_WINDOW,
            Protocol::TakeFocus => self.atoms.WM_TAKE_FOCUS,
        };
        if !self.atom_list(window, self.atoms.WM_PROTOCOLS)?.contains(&atom) {
            return Ok(false);
        }

        let event = ClientMessageEvent {
            response_type: CLIENT_MESSAGE_EVENT,
            format: 32,
            sequence: 0,
            window,
            type_: self.atoms.WM_PROTOCOLS,
            data: [atom, CURRENT_TIME, 0, 0, 0].into(),
        };
        self.conn
            .send_event(false, window, EventMask::NO_EVENT, event)?;
        Ok(true)
    }

    fn configure(&self, window: Xid, data: &[ClientConfig]) -> WmResult<()> {
        let mut aux = ConfigureWindowAux::new();
        for config in data {
            aux = match *config {
                ClientConfig::Position(rect) => aux
                    .x(rect.x)
                    .y(rect.y)
                    .width(rect.w.max(1) as u32)
                    .height(rect.h.max(1) as u32),
                ClientConfig::BorderPx(px) => aux.border_width(px),
                ClientConfig::StackBelow(sibling) => {
                    aux.sibling(sibling).stack_mode(StackMode::BELOW)
                }
                ClientConfig::StackTop => aux.stack_mode(StackMode::ABOVE),
                ClientConfig::StackBottom => aux.stack_mode(StackMode::BELOW),
            };
        }
        self.conn.configure_window(window, &aux)?;
        Ok(())
    }

    fn forward_configure_request(&self, request: &ConfigureRequest) -> WmResult<()> {
        let mut aux = ConfigureWindowAux::new();
        aux.x = request.x;
        aux.y = request.y;
        aux.width = request.width.map(|w| w as u32);
        aux.height = request.height.map(|h| h as u32);
        aux.border_width = request.border_width.map(|bw| bw as u32);
        aux.sibling = request.sibling;
        aux.stack_mode = request.stack_mode.map(StackMode::from);
        self.conn.configure_window(request.window, &aux)?;
        Ok(())
    }

    fn send_configure_notify(&self, window: Xid, rect: Rect, border_width: i32) -> WmResult<()> {
        let event = ConfigureNotifyEvent {
            response_type: CONFIGURE_NOTIFY_EVENT,
            sequence: 0,
            event: window,
            window,
            above_sibling: NONE,
            x: rect.x as i16,
            y: rect.y as i16,
            width: rect.w as u16,
            height: rect.h as u16,
            border_width: border_width as u16,
            override_redirect: false,
        };
        self.conn
            .send_event(false, window, EventMask::STRUCTURE_NOTIFY, event)?;
        Ok(())
    }

    fn set_border_color(&self, window: Xid, color: u32) -> WmResult<()> {
        self.conn.change_window_attributes(
            window,
            &ChangeWindowAttributesAux::new().border_pixel(color),
        )?;
        Ok(())
    }

    fn select_client_events(&self, window: Xid) -> WmResult<()> {
        self.set_event_mask(window, client_event_mask())?;
        self.conn
            .change_save_set(x11rb::protocol::xproto::SetMode::INSERT, window)?;
        Ok(())
    }

    fn map(&self, window: Xid) -> WmResult<()> {
        self.conn.map_window(window)?;
        Ok(())
    }

    fn unmap(&self, window: Xid) -> WmResult<()> {
        let quiet_root = EventMask::SUBSTRUCTURE_REDIRECT
            | EventMask::BUTTON_PRESS
            | EventMask::POINTER_MOTION
            | EventMask::ENTER_WINDOW
            | EventMask::LEAVE_WINDOW
            | EventMask::STRUCTURE_NOTIFY
            | EventMask::PROPERTY_CHANGE;
        let quiet_client =
            EventMask::ENTER_WINDOW | EventMask::FOCUS_CHANGE | EventMask::PROPERTY_CHANGE;

        self.conn.grab_server()?;
        self.set_event_mask(self.root, quiet_root)?;
        self.set_event_mask(window, quiet_client)?;
        self.conn.unmap_window(window)?;
        self.set_event_mask(window, client_event_mask())?;
        self.set_event_mask(self.root, root_event_mask())?;
        self.conn.ungrab_server()?;
        Ok(())
    }

    fn kill(&self, window: Xid) -> WmResult<()> {
        self.conn.grab_server()?;
        self.conn.set_close_down_mode(CloseDown::DESTROY_ALL)?;
        self.conn.kill_client(window)?;
        self.conn.ungrab_server()?;
        Ok(())
    }

    fn focus(&self, window: Xid) -> WmResult<()> {
        self.conn
            .set_input_focus(InputFocus::POINTER_ROOT, window, CURRENT_TIME)?;
        self.conn.change_property32(
            PropMode::REPLACE,
            self.root,
            self.atoms._NET_ACTIVE_WINDOW,
            AtomEnum::WINDOW,
            &[window],
        )?;
        Ok(())
    }

    fn focus_root(&self) -> WmResult<()> {
        self.conn
            .set_input_focus(InputFocus::POINTER_ROOT, self.root, CURRENT_TIME)?;
        self.conn
            .delete_property(self.root, self.atoms._NET_ACTIVE_WINDOW)?;
        Ok(())
    }

    fn set_client_list(&self, windows: &[Xid]) -> WmResult<()> {
        self.conn.change_property32(
            PropMode::REPLACE,
            self.root,
            self.atoms._NET_CLIENT_LIST,
            AtomEnum::WINDOW,
            windows,
        )?;
        Ok(())
    }

    fn append_client_list(&self, window: Xid) -> WmResult<()> {
        self.conn.change_property32(
            PropMode::APPEND,
            self.root,
            self.atoms._NET_CLIENT_LIST,
            AtomEnum::WINDOW,
            &[window],
        )?;
        Ok(())
    }

    fn numlock_mask(&self) -> WmResult<u16> {
        let reply = self.conn.get_modifier_mapping()?.reply()?;
        let per_modifier = reply.keycodes_per_modifier() as usize;
        let keyboard = self.keyboard.borrow();
        let numlock_codes: Vec<u8> = keyboard.keycodes(XK_NUM_LOCK).collect();

        let mask = reply
            .keycodes
            .chunks(per_modifier.max(1))
            .position(|codes| codes.iter().any(|code| numlock_codes.contains(code)))
            .map_or(0, |modifier| 1 << modifier);
        Ok(mask)
    }

    fn grab_keys(&self, bindings: &[KeyBinding]) -> WmResult<()> {
        let numlock = self.numlock_mask()?;
        let ignored = [
            0,
            u16::from(ModMask::LOCK),
            numlock,
            numlock | u16::from(ModMask::LOCK),
        ];

        self.conn.ungrab_key(Grab::ANY, self.root, ModMask::ANY)?;
        let keyboard = self.keyboard.borrow();
        for binding in bindings {
            for keycode in keyboard.keycodes(binding.keysym) {
                for extra in ignored {
                    self.conn.grab_key(
                        true,
                        self.root,
                        ModMask::from(binding.modifier_mask() | extra),
                        keycode,
                        GrabMode::ASYNC,
                        GrabMode::ASYNC,
                    )?;
                }
            }
        }
        Ok(())
    }

    fn grab_buttons(
        &self,
        window: Xid,
        focused: bool,
        bindings: &[ButtonBinding],
    ) -> WmResult<()> {
        let numlock = self.numlock_mask()?;
        let ignored = [
            0,
            u16::from(ModMask::LOCK),
            numlock,
            numlock | u16::from(ModMask::LOCK),
        ];

        self.conn
            .ungrab_button(ButtonIndex::ANY, window, ModMask::ANY)?;
        if !focused {
            self.conn.grab_button(
                false,
                window,
                button_mask(),
                GrabMode::SYNC,
                GrabMode::SYNC,
                NONE,
                NONE,
                ButtonIndex::ANY,
                ModMask::ANY,
            )?;
        }

        let client_bindings = bindings
            .iter()
            .filter(|binding| binding.target == ClickTarget::ClientWindow);
        for binding in client_bindings {
            for extra in ignored {
                self.conn.grab_button(
                    false,
                    window,
                    button_mask(),
                    GrabMode::ASYNC,
                    GrabMode::SYNC,
                    NONE,
                    NONE,
                    ButtonIndex::from(binding.button),
                    ModMask::from(binding.modifier_mask() | extra),
                )?;
            }
        }
        Ok(())
    }

    fn replay_pointer(&self) -> WmResult<()> {
        self.conn.allow_events(Allow::REPLAY_POINTER, CURRENT_TIME)?;
        Ok(())
    }

    fn refresh_keyboard_mapping(&self) -> WmResult<()> {
        let setup = self.conn.setup();
        let (min_keycode, max_keycode) = (setup.min_keycode, setup.max_keycode);
        let reply = self
            .conn
            .get_keyboard_mapping(min_keycode, max_keycode - min_keycode + 1)?
            .reply()?;

        *self.keyboard.borrow_mut() = KeyboardMapping {
            min_keycode,
            keysyms_per_keycode: reply.keysyms_per_keycode,
            keysyms: reply.keysyms,
        };
        Ok(())
    }

    fn grab_pointer(&self, cursor: CursorKind) -> WmResult<bool> {
        let reply = self
            .conn
            .grab_pointer(
                false,
                self.root,
                drag_mask(),
                GrabMode::ASYNC,
                GrabMode::ASYNC,
                NONE,
                self.cursors.get(cursor),
                CURRENT_TIME,
            )?
            .reply()?;
        Ok(reply.status == GrabStatus::SUCCESS)
    }

    fn ungrab_pointer(&self) -> WmResult<()> {
        self.conn.ungrab_pointer(CURRENT_TIME)?;
        Ok(())
    }

    fn query_pointer(&self) -> WmResult<Option<(i32, i32)>> {
        let reply = self.conn.query_pointer(self.root)?.reply()?;
        Ok(reply
            .same_screen
            .then_some((reply.root_x as i32, reply.root_y as i32)))
    }

    fn warp_pointer(&self, window: Xid, x: i32, y: i32) -> WmResult<()> {
        self.conn
            .warp_pointer(NONE, window, 0, 0, 0, 0, x as i16, y as i16)?;
        Ok(())
    }
}

impl Drop for X11rbConnection {
    fn drop(&mut self) {
        let _ = self.conn.ungrab_key(Grab::ANY, self.root, ModMask::ANY);
        let _ = self.conn.destroy_window(self.check_window);
        let _ = self.focus_root();
        let _ = self.conn.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    fn protocol_error(error_kind: ErrorKind, major_opcode: u8) -> ProtocolError {
        ProtocolError {
            error_kind,
            error_code: 0,
            sequence: 0,
            bad_value: 0,
            minor_opcode: 0,
            major_opcode,
            extension_name: None,
            request_name: None,
        }
    }

    #[test_case(ErrorKind::Window, 18, true; "bad window on anything")]
    #[test_case(ErrorKind::Match, X_SET_INPUT_FOCUS, true; "bad match on focus")]
    #[test_case(ErrorKind::Match, X_CONFIGURE_WINDOW, true; "bad match on configure")]
    #[test_case(ErrorKind::Match, 18, false; "bad match elsewhere")]
    #[test_case(ErrorKind::Drawable, X_COPY_AREA, true; "bad drawable on copy area")]
    #[test_case(ErrorKind::Access, X_GRAB_KEY, true; "bad access on grab key")]
    #[test_case(ErrorKind::Access, 2, false; "bad access elsewhere")]
    #[test_case(ErrorKind::Value, X_CONFIGURE_WINDOW, false; "bad value")]
    #[test]
    fn error_allow_list(kind: ErrorKind, request: u8, expected: bool) {
        assert_eq!(is_ignorable(&protocol_error(kind, request)), expected);
    }

    #[test]
    fn keyboard_mapping_reads_the_first_column() {
        let mapping = KeyboardMapping {
            min_keycode: 8,
            keysyms_per_keycode: 2,
            keysyms: vec![0x61, 0x41, 0x62, 0x42, 0x61, 0x41],
        };

        assert_eq!(mapping.keysym(9), 0x62);
        assert_eq!(mapping.keycodes(0x61).collect::<Vec<_>>(), vec![8, 10]);
        assert_eq!(mapping.keycodes(0x41).count(), 0);
    }
}
