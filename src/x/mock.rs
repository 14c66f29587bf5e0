//! A mock implementation of XConn that is easier to implement for use in tests.
//!
//! Every method has a harmless default: queries report nothing and commands succeed.
//! Any implementation of `MockXConn` automatically implements `XConn` by forwarding calls
//! to `$method` on to `mock_$method`.
use crate::errors::WmResult;
use crate::geometry::Rect;
use crate::keyboard::{ButtonBinding, KeyBinding};
use crate::x::{
    ClassHint, ClientConfig, ConfigureRequest, CursorKind, Protocol, WindowAttributes,
    WindowGeometry, WindowType, WmHints, WmState, XConn, XEvent, Xid,
};

#[allow(unused_variables)]
pub trait MockXConn {
    fn mock_root(&self) -> Xid {
        0
    }

    fn mock_screen_details(&self) -> WmResult<Vec<Rect>> {
        Ok(vec![Rect::new(0, 0, 1280, 800)])
    }

    fn mock_next_event(&self) -> WmResult<XEvent> {
        Ok(XEvent::ButtonRelease)
    }

    fn mock_flush(&self) -> WmResult<()> {
        Ok(())
    }

    fn mock_discard_enter_events(&self) -> WmResult<()> {
        Ok(())
    }

    fn mock_existing_windows(&self) -> WmResult<Vec<Xid>> {
        Ok(Vec::new())
    }

    fn mock_window_attributes(&self, window: Xid) -> WmResult<Option<WindowAttributes>> {
        Ok(Some(WindowAttributes::default()))
    }

    fn mock_window_geometry(&self, window: Xid) -> WmResult<WindowGeometry> {
        Ok(WindowGeometry {
            rect: Rect::new(0, 0, 400, 300),
            border_width: 0,
        })
    }

    fn mock_window_title(&self, window: Xid) -> WmResult<Option<String>> {
        Ok(None)
    }

    fn mock_root_name(&self) -> WmResult<Option<String>> {
        Ok(None)
    }

    fn mock_class_hint(&self, window: Xid) -> WmResult<ClassHint> {
        Ok(ClassHint::default())
    }

    fn mock_transient_for(&self, window: Xid) -> WmResult<Option<Xid>> {
        Ok(None)
    }

    fn mock_normal_hints(&self, window: Xid) -> WmResult<Option<Vec<u32>>> {
        Ok(None)
    }

    fn mock_wm_hints(&self, window: Xid) -> WmResult<Option<WmHints>> {
        Ok(None)
    }

    fn mock_set_urgency_hint(&self, window: Xid, urgent: bool) -> WmResult<()> {
        Ok(())
    }

    fn mock_wm_state(&self, window: Xid) -> WmResult<Option<WmState>> {
        Ok(None)
    }

    fn mock_set_wm_state(&self, window: Xid, state: WmState) -> WmResult<()> {
        Ok(())
    }

    fn mock_window_type(&self, window: Xid) -> WmResult<WindowType> {
        Ok(WindowType::default())
    }

    fn mock_set_fullscreen_state(&self, window: Xid, fullscreen: bool) -> WmResult<()> {
        Ok(())
    }

    fn mock_window_pid(&self, window: Xid) -> WmResult<u32> {
        Ok(0)
    }

    fn mock_send_protocol(&self, window: Xid, protocol: Protocol) -> WmResult<bool> {
        Ok(false)
    }

    fn mock_configure(&self, window: Xid, data: &[ClientConfig]) -> WmResult<()> {
        Ok(())
    }

    fn mock_forward_configure_request(&self, request: &ConfigureRequest) -> WmResult<()> {
        Ok(())
    }

    fn mock_send_configure_notify(
        &self,
        window: Xid,
        rect: Rect,
        border_width: i32,
    ) -> WmResult<()> {
        Ok(())
    }

    fn mock_set_border_color(&self, window: Xid, color: u32) -> WmResult<()> {
        Ok(())
    }

    fn mock_select_client_events(&self, window: Xid) -> WmResult<()> {
        Ok(())
    }

    fn mock_map(&self, window: Xid) -> WmResult<()> {
        Ok(())
    }

    fn mock_unmap(&self, window: Xid) -> WmResult<()> {
        Ok(())
    }

    fn mock_kill(&self, window: Xid) -> WmResult<()> {
        Ok(())
    }

    fn mock_focus(&self, window: Xid) -> WmResult<()> {
        Ok(())
    }

    fn mock_focus_root(&self) -> WmResult<()> {
        Ok(())
    }

    fn mock_set_client_list(&self, windows: &[Xid]) -> WmResult<()> {
        Ok(())
    }

    fn mock_append_client_list(&self, window: Xid) -> WmResult<()> {
        Ok(())
    }

    fn mock_numlock_mask(&self) -> WmResult<u16> {
        Ok(0)
    }

    fn mock_grab_keys(&self, bindings: &[KeyBinding]) -> WmResult<()> {
        Ok(())
    }

    fn mock_grab_buttons(
        &self,
        window: Xid,
        focused: bool,
        bindings: &[ButtonBinding],
    ) -> WmResult<()> {
        Ok(())
    }

    fn mock_replay_pointer(&self) -> WmResult<()> {
        Ok(())
    }

    fn mock_refresh_keyboard_mapping(&self) -> WmResult<()> {
        Ok(())
    }

    fn mock_grab_pointer(&self, cursor: CursorKind) -> WmResult<bool> {
        Ok(false)
    }

    fn mock_ungrab_pointer(&self) -> WmResult<()> {
        Ok(())
    }

    fn mock_query_pointer(&self) -> WmResult<Option<(i32, i32)>> {
        Ok(None)
    }

    fn mock_warp_pointer(&self, window: Xid, x: i32, y: i32) -> WmResult<()> {
        Ok(())
    }
}

impl<T> XConn for T
where
    T: MockXConn,
{
    fn root(&self) -> Xid {
        self.mock_root()
    }

    fn screen_details(&self) -> WmResult<Vec<Rect>> {
        self.mock_screen_details()
    }

    fn next_event(&self) -> WmResult<XEvent> {
        self.mock_next_event()
    }

    fn flush(&self) -> WmResult<()> {
        self.mock_flush()
    }

    fn discard_enter_events(&self) -> WmResult<()> {
        self.mock_discard_enter_events()
    }

    fn existing_windows(&self) -> WmResult<Vec<Xid>> {
        self.mock_existing_windows()
    }

    fn window_attributes(&self, window: Xid) -> WmResult<Option<WindowAttributes>> {
        self.mock_window_attributes(window)
    }

    fn window_geometry(&self, window: Xid) -> WmResult<WindowGeometry> {
        self.mock_window_geometry(window)
    }

    fn window_title(&self, window: Xid) -> WmResult<Option<String>> {
        self.mock_window_title(window)
    }

    fn root_name(&self) -> WmResult<Option<String>> {
        self.mock_root_name()
    }

    fn class_hint(&self, window: Xid) -> WmResult<ClassHint> {
        self.mock_class_hint(window)
    }

    fn transient_for(&self, window: Xid) -> WmResult<Option<Xid>> {
        self.mock_transient_for(window)
    }

    fn normal_hints(&self, window: Xid) -> WmResult<Option<Vec<u32>>> {
        self.mock_normal_hints(window)
    }

    fn wm_hints(&self, window: Xid) -> WmResult<Option<WmHints>> {
        self.mock_wm_hints(window)
    }

    fn set_urgency_hint(&self, window: Xid, urgent: bool) -> WmResult<()> {
        self.mock_set_urgency_hint(window, urgent)
    }

    fn wm_state(&self, window: Xid) -> WmResult<Option<WmState>> {
        self.mock_wm_state(window)
    }

    fn set_wm_state(&self, window: Xid, state: WmState) -> WmResult<()> {
        self.mock_set_wm_state(window, state)
    }

    fn window_type(&self, window: Xid) -> WmResult<WindowType> {
        self.mock_window_type(window)
    }

    fn set_fullscreen_state(&self, window: Xid, fullscreen: bool) -> WmResult<()> {
        self.mock_set_fullscreen_state(window, fullscreen)
    }

    fn window_pid(&self, window: Xid) -> WmResult<u32> {
        self.mock_window_pid(window)
    }

    fn send_protocol(&self, window: Xid, protocol: Protocol) -> WmResult<bool> {
        self.mock_send_protocol(window, protocol)
    }

    fn configure(&self, window: Xid, data: &[ClientConfig]) -> WmResult<()> {
        self.mock_configure(window, data)
    }

    fn forward_configure_request(&self, request: &ConfigureRequest) -> WmResult<()> {
        self.mock_forward_configure_request(request)
    }

    fn send_configure_notify(&self, window: Xid, rect: Rect, border_width: i32) -> WmResult<()> {
        self.mock_send_configure_notify(window, rect, border_width)
    }

    fn set_border_color(&self, window: Xid, color: u32) -> WmResult<()> {
        self.mock_set_border_color(window, color)
    }

    fn select_client_events(&self, window: Xid) -> WmResult<()> {
        self.mock_select_client_events(window)
    }

    fn map(&self, window: Xid) -> WmResult<()> {
        self.mock_map(window)
    }

    fn unmap(&self, window: Xid) -> WmResult<()> {
        self.mock_unmap(window)
    }

    fn kill(&self, window: Xid) -> WmResult<()> {
        self.mock_kill(window)
    }

    fn focus(&self, window: Xid) -> WmResult<()> {
        self.mock_focus(window)
    }

    fn focus_root(&self) -> WmResult<()> {
        self.mock_focus_root()
    }

    fn set_client_list(&self, windows: &[Xid]) -> WmResult<()> {
        self.mock_set_client_list(windows)
    }

    fn append_client_list(&self, window: Xid) -> WmResult<()> {
        self.mock_append_client_list(window)
    }

    fn numlock_mask(&self) -> WmResult<u16> {
        self.mock_numlock_mask()
    }

    fn grab_keys(&self, bindings: &[KeyBinding]) -> WmResult<()> {
        self.mock_grab_keys(bindings)
    }

    fn grab_buttons(
        &self,
        window: Xid,
        focused: bool,
        bindings: &[ButtonBinding],
    ) -> WmResult<()> {
        self.mock_grab_buttons(window, focused, bindings)
    }

    fn replay_pointer(&self) -> WmResult<()> {
        self.mock_replay_pointer()
    }

    fn refresh_keyboard_mapping(&self) -> WmResult<()> {
        self.mock_refresh_keyboard_mapping()
    }

    fn grab_pointer(&self, cursor: CursorKind) -> WmResult<bool> {
        self.mock_grab_pointer(cursor)
    }

    fn ungrab_pointer(&self) -> WmResult<()> {
        self.mock_ungrab_pointer()
    }

    fn query_pointer(&self) -> WmResult<Option<(i32, i32)>> {
        self.mock_query_pointer()
    }

    fn warp_pointer(&self, window: Xid, x: i32, y: i32) -> WmResult<()> {
        self.mock_warp_pointer(window, x, y)
    }
}
