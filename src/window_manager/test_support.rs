//! A recording X connection and helpers for driving a window manager in tests.
use super::WindowManager;
use crate::Config;
use crate::client::ClientKey;
use crate::errors::WmResult;
use crate::geometry::Rect;
use crate::layout::GapConfig;
use crate::x::mock::MockXConn;
use crate::x::{
    ClassHint, ClientConfig, CursorKind, Protocol, WindowAttributes, WindowType, WmHints,
    WmState, XEvent, Xid,
};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use x11rb::errors::ConnectionError;

pub type TestWm = WindowManager<RecordingConn>;

#[derive(Debug, Default)]
struct State {
    screens: Option<Vec<Rect>>,
    configs: Vec<(Xid, ClientConfig)>,
    borders: HashMap<Xid, u32>,
    client_list: Vec<Xid>,
    focused: Option<Xid>,
    titles: HashMap<Xid, String>,
    root_name: Option<String>,
    classes: HashMap<Xid, ClassHint>,
    pids: HashMap<Xid, u32>,
    transients: HashMap<Xid, Xid>,
    states: HashMap<Xid, WmState>,
    existing: Vec<(Xid, WindowAttributes)>,
    mapped: HashSet<Xid>,
    fullscreen: HashMap<Xid, bool>,
    types: HashMap<Xid, WindowType>,
    hints: HashMap<Xid, WmHints>,
    normal_hints: HashMap<Xid, Vec<u32>>,
    protocols: HashSet<(Xid, Protocol)>,
    sent: Vec<(Xid, Protocol)>,
    killed: Vec<Xid>,
    events: VecDeque<XEvent>,
    pointer: Option<(i32, i32)>,
    warps: Vec<(Xid, i32, i32)>,
    grabbed: bool,
    disconnected: bool,
}

/// Remembers what the window manager asked of the server and answers queries from
/// whatever a test seeded.
#[derive(Debug, Default)]
pub struct RecordingConn {
    state: RefCell<State>,
}

impl RecordingConn {
    pub fn set_screens(&self, screens: Vec<Rect>) {
        self.state.borrow_mut().screens = Some(screens);
    }

    pub fn set_title(&self, window: Xid, title: &str) {
        self.state.borrow_mut().titles.insert(window, title.to_string());
    }

    pub fn set_root_name(&self, name: &str) {
        self.state.borrow_mut().root_name = Some(name.to_string());
    }

    pub fn set_class(&self, window: Xid, class: &str, instance: &str) {
        let hint = ClassHint {
            class: Some(class.to_string()),
            instance: Some(instance.to_string()),
        };
        self.state.borrow_mut().classes.insert(window, hint);
    }

    pub fn set_pid(&self, window: Xid, pid: u32) {
        self.state.borrow_mut().pids.insert(window, pid);
    }

    pub fn set_transient(&self, window: Xid, parent: Xid) {
        self.state.borrow_mut().transients.insert(window, parent);
    }

    pub fn set_state(&self, window: Xid, state: WmState) {
        self.state.borrow_mut().states.insert(window, state);
    }

    pub fn set_dialog(&self, window: Xid) {
        self.state.borrow_mut().types.entry(window).or_default().is_dialog = true;
    }

    pub fn set_wm_hints(&self, window: Xid, hints: WmHints) {
        self.state.borrow_mut().hints.insert(window, hints);
    }

    pub fn set_normal_hints(&self, window: Xid, raw: Vec<u32>) {
        self.state.borrow_mut().normal_hints.insert(window, raw);
    }

    pub fn support(&self, window: Xid, protocol: Protocol) {
        self.state.borrow_mut().protocols.insert((window, protocol));
    }

    pub fn add_existing(&self, window: Xid, attributes: WindowAttributes) {
        self.state.borrow_mut().existing.push((window, attributes));
    }

    pub fn push_event(&self, event: XEvent) {
        self.state.borrow_mut().events.push_back(event);
    }

    /// Once the queued events run out, reading another one fails as if the server went away.
    pub fn disconnect(&self) {
        self.state.borrow_mut().disconnected = true;
    }

    pub fn pointer_grabbed(&self) -> bool {
        self.state.borrow().grabbed
    }

    pub fn set_pointer(&self, x: i32, y: i32) {
        self.state.borrow_mut().pointer = Some((x, y));
    }

    pub fn clear_focus(&self) {
        self.state.borrow_mut().focused = None;
    }

    pub fn focused(&self) -> Option<Xid> {
        self.state.borrow().focused
    }

    pub fn configs_for(&self, window: Xid) -> Vec<ClientConfig> {
        self.state
            .borrow()
            .configs
            .iter()
            .filter(|(w, _)| *w == window)
            .map(|(_, config)| *config)
            .collect()
    }

    pub fn last_position(&self, window: Xid) -> Option<Rect> {
        self.configs_for(window)
            .into_iter()
            .rev()
            .find_map(|config| match config {
                ClientConfig::Position(rect) => Some(rect),
                _ => None,
            })
    }

    pub fn border_of(&self, window: Xid) -> Option<u32> {
        self.state.borrow().borders.get(&window).copied()
    }

    pub fn client_list(&self) -> Vec<Xid> {
        self.state.borrow().client_list.clone()
    }

    pub fn state_of(&self, window: Xid) -> Option<WmState> {
        self.state.borrow().states.get(&window).copied()
    }

    pub fn is_mapped(&self, window: Xid) -> bool {
        self.state.borrow().mapped.contains(&window)
    }

    pub fn fullscreen_state(&self, window: Xid) -> Option<bool> {
        self.state.borrow().fullscreen.get(&window).copied()
    }

    pub fn sent(&self) -> Vec<(Xid, Protocol)> {
        self.state.borrow().sent.clone()
    }

    pub fn killed(&self) -> Vec<Xid> {
        self.state.borrow().killed.clone()
    }

    pub fn warps(&self) -> Vec<(Xid, i32, i32)> {
        self.state.borrow().warps.clone()
    }
}

impl MockXConn for RecordingConn {
    fn mock_screen_details(&self) -> WmResult<Vec<Rect>> {
        Ok(self
            .state
            .borrow()
            .screens
            .clone()
            .unwrap_or_else(|| vec![Rect::new(0, 0, 1280, 800)]))
    }

    fn mock_next_event(&self) -> WmResult<XEvent> {
        let mut state = self.state.borrow_mut();
        match state.events.pop_front() {
            Some(event) => Ok(event),
            None if state.disconnected => Err(ConnectionError::UnknownError.into()),
            None => Ok(XEvent::ButtonRelease),
        }
    }

    fn mock_existing_windows(&self) -> WmResult<Vec<Xid>> {
        Ok(self.state.borrow().existing.iter().map(|(w, _)| *w).collect())
    }

    fn mock_window_attributes(&self, window: Xid) -> WmResult<Option<WindowAttributes>> {
        let state = self.state.borrow();
        let found = state.existing.iter().find(|(w, _)| *w == window);
        Ok(Some(found.map(|(_, a)| *a).unwrap_or_default()))
    }

    fn mock_window_title(&self, window: Xid) -> WmResult<Option<String>> {
        Ok(self.state.borrow().titles.get(&window).cloned())
    }

    fn mock_root_name(&self) -> WmResult<Option<String>> {
        Ok(self.state.borrow().root_name.clone())
    }

    fn mock_class_hint(&self, window: Xid) -> WmResult<ClassHint> {
        Ok(self.state.borrow().classes.get(&window).cloned().unwrap_or_default())
    }

    fn mock_transient_for(&self, window: Xid) -> WmResult<Option<Xid>> {
        Ok(self.state.borrow().transients.get(&window).copied())
    }

    fn mock_normal_hints(&self, window: Xid) -> WmResult<Option<Vec<u32>>> {
        Ok(self.state.borrow().normal_hints.get(&window).cloned())
    }

    fn mock_wm_hints(&self, window: Xid) -> WmResult<Option<WmHints>> {
        Ok(self.state.borrow().hints.get(&window).copied())
    }

    fn mock_set_urgency_hint(&self, window: Xid, urgent: bool) -> WmResult<()> {
        self.state.borrow_mut().hints.entry(window).or_default().urgent = urgent;
        Ok(())
    }

    fn mock_wm_state(&self, window: Xid) -> WmResult<Option<WmState>> {
        Ok(self.state_of(window))
    }

    fn mock_set_wm_state(&self, window: Xid, state: WmState) -> WmResult<()> {
        self.set_state(window, state);
        Ok(())
    }

    fn mock_window_type(&self, window: Xid) -> WmResult<WindowType> {
        Ok(self.state.borrow().types.get(&window).copied().unwrap_or_default())
    }

    fn mock_set_fullscreen_state(&self, window: Xid, fullscreen: bool) -> WmResult<()> {
        self.state.borrow_mut().fullscreen.insert(window, fullscreen);
        Ok(())
    }

    fn mock_window_pid(&self, window: Xid) -> WmResult<u32> {
        Ok(self.state.borrow().pids.get(&window).copied().unwrap_or(0))
    }

    fn mock_send_protocol(&self, window: Xid, protocol: Protocol) -> WmResult<bool> {
        let mut state = self.state.borrow_mut();
        if !state.protocols.contains(&(window, protocol)) {
            return Ok(false);
        }
        state.sent.push((window, protocol));
        Ok(true)
    }

    fn mock_configure(&self, window: Xid, data: &[ClientConfig]) -> WmResult<()> {
        let mut state = self.state.borrow_mut();
        state.configs.extend(data.iter().map(|config| (window, *config)));
        Ok(())
    }

    fn mock_set_border_color(&self, window: Xid, color: u32) -> WmResult<()> {
        self.state.borrow_mut().borders.insert(window, color);
        Ok(())
    }

    fn mock_map(&self, window: Xid) -> WmResult<()> {
        self.state.borrow_mut().mapped.insert(window);
        Ok(())
    }

    fn mock_unmap(&self, window: Xid) -> WmResult<()> {
        self.state.borrow_mut().mapped.remove(&window);
        Ok(())
    }

    fn mock_kill(&self, window: Xid) -> WmResult<()> {
        self.state.borrow_mut().killed.push(window);
        Ok(())
    }

    fn mock_focus(&self, window: Xid) -> WmResult<()> {
        self.state.borrow_mut().focused = Some(window);
        Ok(())
    }

    fn mock_focus_root(&self) -> WmResult<()> {
        self.clear_focus();
        Ok(())
    }

    fn mock_set_client_list(&self, windows: &[Xid]) -> WmResult<()> {
        self.state.borrow_mut().client_list = windows.to_vec();
        Ok(())
    }

    fn mock_append_client_list(&self, window: Xid) -> WmResult<()> {
        self.state.borrow_mut().client_list.push(window);
        Ok(())
    }

    fn mock_grab_pointer(&self, _cursor: CursorKind) -> WmResult<bool> {
        self.state.borrow_mut().grabbed = true;
        Ok(true)
    }

    fn mock_ungrab_pointer(&self) -> WmResult<()> {
        self.state.borrow_mut().grabbed = false;
        Ok(())
    }

    fn mock_query_pointer(&self) -> WmResult<Option<(i32, i32)>> {
        Ok(self.state.borrow().pointer)
    }

    fn mock_warp_pointer(&self, window: Xid, x: i32, y: i32) -> WmResult<()> {
        self.state.borrow_mut().warps.push((window, x, y));
        Ok(())
    }
}

/// No borders, gaps or bar, an even split and no rules, so geometry is easy to predict.
pub fn plain_config() -> Config {
    Config {
        border_width: 0,
        gaps: GapConfig::uniform(0),
        show_bar: false,
        master_factor: 0.5,
        num_master: 1,
        rules: Vec::new(),
        tag_rules: Vec::new(),
        autostart: Vec::new(),
        ..Config::default()
    }
}

pub fn wm_on(conn: RecordingConn, adjust: impl FnOnce(&mut Config)) -> TestWm {
    let mut config = plain_config();
    adjust(&mut config);
    WindowManager::new(conn, config).unwrap()
}

pub fn wm_with(adjust: impl FnOnce(&mut Config)) -> TestWm {
    wm_on(RecordingConn::default(), adjust)
}

pub fn plain_wm() -> TestWm {
    wm_with(|_| {})
}

/// Map `window` the way a client would and return the record now holding it.
pub fn map(wm: &mut TestWm, window: Xid) -> ClientKey {
    wm.handle_event(XEvent::MapRequest { window }).unwrap();
    wm.window_to_client(window).unwrap()
}
