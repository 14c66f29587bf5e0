use crate::attach::AttachMode;
use crate::keyboard::keysyms::Keysym;
use crate::layout::LayoutType;
use serde::Deserialize;
use x11rb::protocol::xproto::{KeyButMask, ModMask};

/// Every operation a key, button or fake signal can trigger.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize)]
pub enum KeyAction {
    Spawn,
    KillClient,
    FocusStack,
    FocusStackHidden,
    FocusDirection,
    FocusMonitor,
    TagMonitor,
    PushClient,
    InplaceRotate,
    MoveResize,
    MoveResizeEdge,
    AspectResize,
    IncNumMaster,
    SetMasterFactor,
    SetClientFactor,
    Zoom,
    ZoomSwap,
    IncGaps,
    IncInnerGaps,
    IncOuterGaps,
    IncInnerHorizontalGaps,
    IncInnerVerticalGaps,
    IncOuterHorizontalGaps,
    IncOuterVerticalGaps,
    ToggleGaps,
    DefaultGaps,
    View,
    ToggleView,
    Tag,
    ToggleTag,
    ShiftViewClients,
    CycleLayout,
    SetLayout,
    SetAttach,
    CycleAttach,
    ToggleFloating,
    ToggleSticky,
    ToggleFullScreen,
    ToggleFakeFullScreen,
    ToggleBar,
    Hide,
    Show,
    ShowAll,
    ToggleWindow,
    ToggleScratch,
    Quit,
    Restart,
    Poweroff,
    Reboot,
    MoveMouse,
    ResizeMouse,
    DragMasterFactor,
    DragClientFactor,
    None,
}

impl KeyAction {
    pub const ALL: [KeyAction; 53] = [
        Self::Spawn,
        Self::KillClient,
        Self::FocusStack,
        Self::FocusStackHidden,
        Self::FocusDirection,
        Self::FocusMonitor,
        Self::TagMonitor,
        Self::PushClient,
        Self::InplaceRotate,
        Self::MoveResize,
        Self::MoveResizeEdge,
        Self::AspectResize,
        Self::IncNumMaster,
        Self::SetMasterFactor,
        Self::SetClientFactor,
        Self::Zoom,
        Self::ZoomSwap,
        Self::IncGaps,
        Self::IncInnerGaps,
        Self::IncOuterGaps,
        Self::IncInnerHorizontalGaps,
        Self::IncInnerVerticalGaps,
        Self::IncOuterHorizontalGaps,
        Self::IncOuterVerticalGaps,
        Self::ToggleGaps,
        Self::DefaultGaps,
        Self::View,
        Self::ToggleView,
        Self::Tag,
        Self::ToggleTag,
        Self::ShiftViewClients,
        Self::CycleLayout,
        Self::SetLayout,
        Self::SetAttach,
        Self::CycleAttach,
        Self::ToggleFloating,
        Self::ToggleSticky,
        Self::ToggleFullScreen,
        Self::ToggleFakeFullScreen,
        Self::ToggleBar,
        Self::Hide,
        Self::Show,
        Self::ShowAll,
        Self::ToggleWindow,
        Self::ToggleScratch,
        Self::Quit,
        Self::Restart,
        Self::Poweroff,
        Self::Reboot,
        Self::MoveMouse,
        Self::ResizeMouse,
        Self::DragMasterFactor,
        Self::DragClientFactor,
    ];

    /// The short name used by fake signals, e.g. `setmfact` or `togglescratch`.
    pub fn signal_name(&self) -> &'static str {
        match self {
            Self::Spawn => "spawn",
            Self::KillClient => "killclient",
            Self::FocusStack => "focusstack",
            Self::FocusStackHidden => "focusstackhid",
            Self::FocusDirection => "focusdir",
            Self::FocusMonitor => "focusmon",
            Self::TagMonitor => "tagmon",
            Self::PushClient => "pushclient",
            Self::InplaceRotate => "inplacerotate",
            Self::MoveResize => "moveresize",
            Self::MoveResizeEdge => "moveresizeedge",
            Self::AspectResize => "aspectresize",
            Self::IncNumMaster => "incnmaster",
            Self::SetMasterFactor => "setmfact",
            Self::SetClientFactor => "setcfact",
            Self::Zoom => "zoom",
            Self::ZoomSwap => "zoomswap",
            Self::IncGaps => "incrgaps",
            Self::IncInnerGaps => "incrigaps",
            Self::IncOuterGaps => "incrogaps",
            Self::IncInnerHorizontalGaps => "incrihgaps",
            Self::IncInnerVerticalGaps => "incrivgaps",
            Self::IncOuterHorizontalGaps => "incrohgaps",
            Self::IncOuterVerticalGaps => "incrovgaps",
            Self::ToggleGaps => "togglegaps",
            Self::DefaultGaps => "defaultgaps",
            Self::View => "view",
            Self::ToggleView => "toggleview",
            Self::Tag => "tag",
            Self::ToggleTag => "toggletag",
            Self::ShiftViewClients => "shiftviewclients",
            Self::CycleLayout => "cyclelayout",
            Self::SetLayout => "setlayout",
            Self::SetAttach => "setattach",
            Self::CycleAttach => "cycleattach",
            Self::ToggleFloating => "togglefloating",
            Self::ToggleSticky => "togglesticky",
            Self::ToggleFullScreen => "togglefullscreen",
            Self::ToggleFakeFullScreen => "togglefakefullscreen",
            Self::ToggleBar => "togglebar",
            Self::Hide => "hide",
            Self::Show => "show",
            Self::ShowAll => "showall",
            Self::ToggleWindow => "togglewin",
            Self::ToggleScratch => "togglescratch",
            Self::Quit => "quit",
            Self::Restart => "restart",
            Self::Poweroff => "poweroff",
            Self::Reboot => "reboot",
            Self::MoveMouse => "movemouse",
            Self::ResizeMouse => "resizemouse",
            Self::DragMasterFactor => "dragmfact",
            Self::DragClientFactor => "dragcfact",
            Self::None => "",
        }
    }
}

/// The single argument every action takes. Numeric accessors read any numeric variant
/// and give zero for everything else, so an action bound without an argument sees 0.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    None,
    Int(i32),
    UInt(u32),
    Float(f32),
    Str(String),
    Array(Vec<String>),
    Layout(LayoutType),
    Attach(AttachMode),
}

impl Arg {
    pub const fn none() -> Self {
        Arg::None
    }

    pub fn as_int(&self) -> i32 {
        match self {
            Self::Int(value) => *value,
            Self::UInt(value) => *value as i32,
            Self::Float(value) => *value as i32,
            _ => 0,
        }
    }

    pub fn as_uint(&self) -> u32 {
        match self {
            Self::Int(value) => *value as u32,
            Self::UInt(value) => *value,
            Self::Float(value) => *value as u32,
            _ => 0,
        }
    }

    pub fn as_float(&self) -> f32 {
        match self {
            Self::Int(value) => *value as f32,
            Self::UInt(value) => *value as f32,
            Self::Float(value) => *value,
            _ => 0.0,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyBinding {
    pub modifiers: Vec<KeyButMask>,
    pub keysym: Keysym,
    pub func: KeyAction,
    pub arg: Arg,
}

impl KeyBinding {
    pub fn new(modifiers: Vec<KeyButMask>, keysym: Keysym, func: KeyAction, arg: Arg) -> Self {
        Self {
            modifiers,
            keysym,
            func,
            arg,
        }
    }

    pub fn modifier_mask(&self) -> u16 {
        modifiers_to_mask(&self.modifiers)
    }
}

/// Where a button press landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ClickTarget {
    ClientWindow,
    RootWindow,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ButtonBinding {
    pub target: ClickTarget,
    pub modifiers: Vec<KeyButMask>,
    pub button: u8,
    pub func: KeyAction,
    pub arg: Arg,
}

impl ButtonBinding {
    pub fn new(
        target: ClickTarget,
        modifiers: Vec<KeyButMask>,
        button: u8,
        func: KeyAction,
        arg: Arg,
    ) -> Self {
        Self {
            target,
            modifiers,
            button,
            func,
            arg,
        }
    }

    pub fn modifier_mask(&self) -> u16 {
        modifiers_to_mask(&self.modifiers)
    }
}

pub fn modifiers_to_mask(modifiers: &[KeyButMask]) -> u16 {
    modifiers
        .iter()
        .fold(0u16, |acc, &modifier| acc | u16::from(modifier))
}

/// Keep only the real modifiers, so bindings match regardless of caps or num lock state
/// and of held pointer buttons.
pub fn clean_mask(state: u16, numlock: u16) -> u16 {
    state
        & !(numlock | u16::from(ModMask::LOCK))
        & (u16::from(ModMask::SHIFT)
            | u16::from(ModMask::CONTROL)
            | u16::from(ModMask::M1)
            | u16::from(ModMask::M2)
            | u16::from(ModMask::M3)
            | u16::from(ModMask::M4)
            | u16::from(ModMask::M5))
}

/// The bindings a key press triggers, in table order.
pub fn handle_key_press<'a>(
    keybindings: &'a [KeyBinding],
    keysym: Keysym,
    state: u16,
    numlock: u16,
) -> impl Iterator<Item = &'a KeyBinding> + 'a {
    let state = clean_mask(state, numlock);
    keybindings
        .iter()
        .filter(move |kb| kb.keysym == keysym && clean_mask(kb.modifier_mask(), numlock) == state)
}

/// The bindings a button press triggers, in table order.
pub fn handle_button_press<'a>(
    buttons: &'a [ButtonBinding],
    target: ClickTarget,
    button: u8,
    state: u16,
    numlock: u16,
) -> impl Iterator<Item = &'a ButtonBinding> + 'a {
    let state = clean_mask(state, numlock);
    buttons.iter().filter(move |b| {
        b.target == target
            && b.button == button
            && clean_mask(b.modifier_mask(), numlock) == state
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::keysyms::XK_RETURN;
    use std::collections::HashSet;

    const NUMLOCK: u16 = 1 << 4;
    const XK_J: Keysym = 0x006a;

    fn bindings() -> Vec<KeyBinding> {
        vec![
            KeyBinding::new(vec![KeyButMask::MOD4], XK_RETURN, KeyAction::Spawn, Arg::None),
            KeyBinding::new(
                vec![KeyButMask::MOD4, KeyButMask::SHIFT],
                XK_J,
                KeyAction::PushClient,
                Arg::Int(1),
            ),
            KeyBinding::new(vec![KeyButMask::MOD4], XK_J, KeyAction::FocusStack, Arg::Int(1)),
        ]
    }

    #[test]
    fn key_press_matches_exact_modifiers() {
        let bindings = bindings();
        let state = u16::from(KeyButMask::MOD4);
        let actions: Vec<KeyAction> = handle_key_press(&bindings, XK_J, state, NUMLOCK)
            .map(|kb| kb.func)
            .collect();

        assert_eq!(actions, vec![KeyAction::FocusStack]);
    }

    #[test]
    fn lock_modifiers_are_ignored() {
        let bindings = bindings();
        let state = u16::from(KeyButMask::MOD4) | u16::from(KeyButMask::LOCK) | NUMLOCK;

        assert_eq!(handle_key_press(&bindings, XK_RETURN, state, NUMLOCK).count(), 1);
    }

    #[test]
    fn buttons_match_on_target() {
        let buttons = vec![ButtonBinding::new(
            ClickTarget::ClientWindow,
            vec![KeyButMask::MOD4],
            1,
            KeyAction::MoveMouse,
            Arg::None,
        )];
        let state = u16::from(KeyButMask::MOD4) | u16::from(KeyButMask::BUTTON1);

        assert_eq!(
            handle_button_press(&buttons, ClickTarget::ClientWindow, 1, state, NUMLOCK).count(),
            1
        );
        assert_eq!(
            handle_button_press(&buttons, ClickTarget::RootWindow, 1, state, NUMLOCK).count(),
            0
        );
    }

    #[test]
    fn missing_numeric_arguments_read_as_zero() {
        assert_eq!(Arg::None.as_int(), 0);
        assert_eq!(Arg::Str("x".into()).as_float(), 0.0);
        assert_eq!(Arg::Int(-1).as_uint(), u32::MAX);
        assert_eq!(Arg::Float(0.05).as_float(), 0.05);
    }

    #[test]
    fn signal_names_are_unique() {
        let names: HashSet<&str> = KeyAction::ALL.iter().map(|a| a.signal_name()).collect();

        assert_eq!(names.len(), KeyAction::ALL.len());
        assert!(!names.contains(""));
    }
}
